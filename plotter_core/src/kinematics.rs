//! Analytic inverse kinematics for the two-link planar arm.
//!
//! ## Angle convention
//!
//! Angles are bearings measured at the anchor from its downward vertical axis
//! (`-y`), positive toward `+x`. With shoulder angle `alpha` and elbow bend `beta`:
//!
//! ```text
//! elbow = anchor + L1 * ( sin(alpha),        -cos(alpha)       )
//! pen   = elbow  + L2 * (-sin(alpha - beta),  cos(alpha - beta) )
//! ```
//!
//! `beta` is the interior angle between the two links: 180° is fully stretched,
//! 0° is folded back onto the shoulder link.
//!
//! ## Elbow branch
//!
//! Every reachable target (except the annulus boundary) has two solutions. The
//! solver returns the principal `acos` branch (`beta >= 0`) unless
//! `ElbowBend::Mirrored` is requested, in which case the shoulder swings to the
//! other side of the target line and `beta` is reported negative.

use crate::error::MotionError;
use crate::geometry::{ArmGeometry, JointAngles, Point2D};

/// Which of the two elbow configurations to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElbowBend {
    /// `alpha = bearing - BAC`, `beta = acos(..) >= 0`.
    #[default]
    Principal,
    /// `alpha = bearing + BAC`, `beta = -acos(..) <= 0`.
    Mirrored,
}

/// Bearing of `target` seen from `anchor`, in radians.
///
/// Uses the two-argument arctangent over the full displacement so every quadrant
/// is resolved; `asin(dx / AC)` folds targets above the anchor onto targets below it.
#[inline]
pub fn bearing(anchor: Point2D, target: Point2D) -> f64 {
    let dx = target.x - anchor.x;
    let dy_ref = anchor.y - target.y;
    dx.atan2(dy_ref)
}

/// Solve for the principal elbow branch.
pub fn solve(target: Point2D, geometry: &ArmGeometry) -> Result<JointAngles, MotionError> {
    solve_with(target, geometry, ElbowBend::Principal)
}

/// Solve for the requested elbow branch.
///
/// Fails with `MotionError::Unreachable` when the anchor-to-target distance lies
/// outside `[|L1 - L2|, L1 + L2]`, or is zero (direction undefined).
pub fn solve_with(
    target: Point2D,
    geometry: &ArmGeometry,
    bend: ElbowBend,
) -> Result<JointAngles, MotionError> {
    let anchor = geometry.anchor();
    let (l1, l2) = (geometry.link1(), geometry.link2());
    let ac = anchor.distance_to(target);
    let (min_reach, max_reach) = (geometry.min_reach(), geometry.max_reach());

    if !ac.is_finite() || ac == 0.0 || ac > max_reach || ac < min_reach {
        return Err(MotionError::Unreachable {
            x: target.x,
            y: target.y,
            distance: ac,
            min_reach,
            max_reach,
        });
    }

    let to_target = bearing(anchor, target);
    // Law of cosines; arguments hit exactly +-1 on the annulus boundary and may
    // overshoot by an ulp, hence the clamp.
    let angle_bac = clamped_acos((l1 * l1 + ac * ac - l2 * l2) / (2.0 * l1 * ac));
    let elbow = clamped_acos((l1 * l1 + l2 * l2 - ac * ac) / (2.0 * l1 * l2));

    let (alpha, beta) = match bend {
        ElbowBend::Principal => (to_target - angle_bac, elbow),
        ElbowBend::Mirrored => (to_target + angle_bac, -elbow),
    };
    Ok(JointAngles::new(alpha.to_degrees(), beta.to_degrees()))
}

/// Pen position reached by `angles` (degrees); inverse of `solve_with`.
pub fn forward(angles: JointAngles, geometry: &ArmGeometry) -> Point2D {
    let alpha = angles.alpha.to_radians();
    let beta = angles.beta.to_radians();
    let elbow = geometry.anchor()
        + Point2D::new(alpha.sin(), -alpha.cos()) * geometry.link1();
    elbow + Point2D::new(-(alpha - beta).sin(), (alpha - beta).cos()) * geometry.link2()
}

/// Elbow joint position for `angles`; useful for drawing or collision checks.
pub fn elbow_position(angles: JointAngles, geometry: &ArmGeometry) -> Point2D {
    let alpha = angles.alpha.to_radians();
    geometry.anchor() + Point2D::new(alpha.sin(), -alpha.cos()) * geometry.link1()
}

#[inline]
fn clamped_acos(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).acos()
}
