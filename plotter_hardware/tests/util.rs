use plotter_hardware::util::{
    ADC_FULL_SCALE_10BIT, clamp_servo, normalize_adc, normalize_counts, servo_pulse_us,
};
use rstest::rstest;

#[rstest]
#[case(0, 0.0)]
#[case(u16::MAX, 1.0)]
fn normalize_adc_endpoints(#[case] raw: u16, #[case] want: f64) {
    assert_eq!(normalize_adc(raw), want);
}

#[test]
fn normalize_adc_midscale() {
    let mid = normalize_adc(32768);
    assert!((mid - 0.5).abs() < 1e-4);
}

#[test]
fn normalize_counts_clamps_overshoot() {
    assert_eq!(normalize_counts(ADC_FULL_SCALE_10BIT, ADC_FULL_SCALE_10BIT), 1.0);
    assert_eq!(normalize_counts(2000, ADC_FULL_SCALE_10BIT), 1.0);
    assert_eq!(normalize_counts(5, 0), 0.0);
}

#[rstest]
#[case(-5.0, 0.0)]
#[case(45.5, 45.5)]
#[case(181.0, 180.0)]
fn clamp_servo_range(#[case] deg: f64, #[case] want: f64) {
    assert_eq!(clamp_servo(deg, 0.0, 180.0).unwrap(), want);
}

#[test]
fn clamp_servo_rejects_infinity() {
    assert!(clamp_servo(f64::INFINITY, 0.0, 180.0).is_err());
}

#[rstest]
#[case(0.0, 500)]
#[case(90.0, 1500)]
#[case(180.0, 2500)]
#[case(270.0, 2500)]
fn servo_pulse_widths(#[case] deg: f64, #[case] want: u64) {
    assert_eq!(servo_pulse_us(deg), want);
}
