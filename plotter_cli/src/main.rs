#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod cli;
mod commands;
mod error_fmt;

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;
use eyre::{WrapErr, eyre};
use serde_json::json;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

use crate::cli::{Cli, Commands, FILE_GUARD};
use crate::commands::{Loaded, RunArgs};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};
use plotter_core::{JointAngles, Point2D};

fn main() {
    let cli = Cli::parse();
    let _ = color_eyre::install();

    if let Err(err) = real_main(&cli) {
        if cli.json {
            eprintln!("{}", format_error_json(&err));
        } else {
            eprintln!("{}", humanize(&err));
        }
        std::process::exit(exit_code_for_error(&err));
    }
}

fn real_main(cli: &Cli) -> eyre::Result<()> {
    let cfg = commands::load_config(&cli.config)?;
    init_tracing(cli, &cfg.logging)?;
    tracing::debug!(config = %cli.config.display(), "config loaded");

    let loaded = commands::load(cli, cfg)?;

    match &cli.cmd {
        Commands::Run {
            ticks,
            max_run_ms,
            stick_x,
            stick_y,
        } => {
            let shutdown = Arc::new(AtomicBool::new(false));
            {
                let flag = Arc::clone(&shutdown);
                ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))
                    .wrap_err("install Ctrl-C handler")?;
            }
            let stick = match (stick_x, stick_y) {
                (None, None) => None,
                (x, y) => Some((x.unwrap_or(0.5), y.unwrap_or(0.5))),
            };
            let args = RunArgs {
                ticks: *ticks,
                max_run_ms: *max_run_ms,
                stick,
            };
            let summary = commands::run_plot(&loaded, &args, shutdown)?;
            if cli.json {
                println!(
                    "{}",
                    json!({
                        "ticks": summary.ticks,
                        "commands": summary.commands,
                        "held": summary.held,
                        "skipped": summary.skipped,
                        "stop": summary.stop.as_str(),
                        "final_position": summary.final_position.map(point_json),
                        "last_command": summary.last_command.map(angles_json),
                    })
                );
            } else {
                println!(
                    "run stopped ({}): {} ticks, {} commands, {} held, {} skipped",
                    summary.stop.as_str(),
                    summary.ticks,
                    summary.commands,
                    summary.held,
                    summary.skipped
                );
                if let Some(cmd) = summary.last_command {
                    println!(
                        "last command: shoulder {:.2} deg, elbow {:.2} deg",
                        cmd.alpha, cmd.beta
                    );
                }
            }
        }
        Commands::Solve { x, y, mirrored } => {
            let solved = commands::solve(&loaded, Point2D::new(*x, *y), *mirrored)?;
            if cli.json {
                println!(
                    "{}",
                    json!({
                        "target": point_json(solved.target),
                        "joints": angles_json(solved.joints),
                        "servo": angles_json(solved.servo),
                        "reached": point_json(solved.reached),
                    })
                );
            } else {
                println!(
                    "target ({:.2}, {:.2}): alpha {:.3} deg, beta {:.3} deg",
                    solved.target.x, solved.target.y, solved.joints.alpha, solved.joints.beta
                );
                println!(
                    "servo: shoulder {:.2} deg, elbow {:.2} deg",
                    solved.servo.alpha, solved.servo.beta
                );
                println!(
                    "forward check: ({:.3}, {:.3})",
                    solved.reached.x, solved.reached.y
                );
            }
        }
        Commands::Lookup { x, y } => {
            let target = Point2D::new(*x, *y);
            let angles = commands::lookup(&loaded, target)?;
            if cli.json {
                println!(
                    "{}",
                    json!({ "target": point_json(target), "servo": angles_json(angles) })
                );
            } else {
                println!(
                    "grid ({:.2}, {:.2}): shoulder {:.3} deg, elbow {:.3} deg",
                    target.x, target.y, angles.alpha, angles.beta
                );
            }
        }
        Commands::SelfCheck => self_check(cli, &loaded)?,
    }
    Ok(())
}

fn self_check(cli: &Cli, loaded: &Loaded) -> eyre::Result<()> {
    // Assemble once so builder validation runs against the real config.
    let controller = commands::build_controller(loaded)?;
    let resolver = controller.resolver().name();
    let linear_rows = loaded.linear.as_ref().map(|(_, _, n)| *n);
    let grid_points = loaded.grid.as_ref().map(|(_, g, _)| g.len());
    let grid_dropped = loaded.grid.as_ref().map(|(_, _, d)| *d);

    if cli.json {
        println!(
            "{}",
            json!({
                "ok": true,
                "config": loaded.config_path.display().to_string(),
                "resolver": resolver,
                "tick_hz": loaded.cfg.runner.tick_hz,
                "linear_rows": linear_rows,
                "grid_points": grid_points,
                "grid_dropped": grid_dropped,
            })
        );
    } else {
        println!("config OK: {}", loaded.config_path.display());
        println!("resolver: {resolver} at {} Hz", loaded.cfg.runner.tick_hz);
        if let Some((path, _, n)) = &loaded.linear {
            println!("linear calibration: {n} rows from {}", path.display());
        }
        if let Some((path, grid, dropped)) = &loaded.grid {
            println!(
                "grid calibration: {} points ({dropped} dropped) from {}",
                grid.len(),
                path.display()
            );
        }
    }
    Ok(())
}

fn point_json(p: Point2D) -> serde_json::Value {
    json!({ "x": p.x, "y": p.y })
}

fn angles_json(a: JointAngles) -> serde_json::Value {
    json!({ "alpha": a.alpha, "beta": a.beta })
}

/// Console logs go to stderr (text or JSON lines); `[logging] file` adds a JSON file sink.
fn init_tracing(cli: &Cli, logging: &plotter_config::Logging) -> eyre::Result<()> {
    let console_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .wrap_err("invalid --log-level")?;

    let (json_console, text_console) = if cli.json {
        let layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(console_filter);
        (Some(layer), None)
    } else {
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(console_filter);
        (None, Some(layer))
    };

    let file_layer = match logging.file.as_deref() {
        Some(file) => {
            let path = Path::new(file);
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre!("logging.file has no file name: {file}"))?;
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            let filter = EnvFilter::try_new(logging.level.as_deref().unwrap_or("info"))
                .wrap_err("invalid logging.level")?;
            Some(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_writer(writer)
                    .with_filter(filter),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(json_console)
        .with(text_console)
        .with(file_layer)
        .try_init()
        .map_err(|e| eyre!("init tracing: {e}"))?;
    Ok(())
}
