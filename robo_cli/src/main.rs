mod arm;
mod bearing;
mod cli;
mod error_fmt;

use clap::Parser;
use eyre::WrapErr;
use std::path::Path;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(e) = run(cli) {
        if JSON_MODE.get().copied().unwrap_or(false) {
            eprintln!("{}", format_error_json(&e));
        } else {
            eprintln!("{}", humanize(&e));
        }
        std::process::exit(exit_code_for_error(&e));
    }
}

fn run(cli: Cli) -> eyre::Result<()> {
    let _ = color_eyre::install();
    let cfg = load_config(cli.config.as_deref(), cli.calibration.as_deref())?;
    init_tracing(cli.json, &cli.log_level, &cfg.logging)?;
    tracing::debug!(?cfg, "config loaded");

    match cli.cmd {
        Commands::Arm {
            commands,
            duration_ms,
            port,
            baud,
            publish_hz,
            stats,
        } => {
            let mut cfg = cfg;
            if let Some(p) = port {
                cfg.bus.port = p;
            }
            if let Some(b) = baud {
                cfg.bus.baud = b;
            }
            if let Some(hz) = publish_hz {
                cfg.arm.publish_hz = hz;
            }
            cfg.validate()?;
            arm::run_arm(
                &cfg,
                arm::ArmRunOpts {
                    commands,
                    duration: duration_ms.map(std::time::Duration::from_millis),
                    stats,
                    json: cli.json,
                },
            )
        }
        Commands::Bearing {
            image,
            synthetic,
            width,
            height,
            radius,
        } => {
            let source = match (image, synthetic) {
                (Some(path), _) => bearing::FrameInput::Image(path),
                (None, Some(xy)) => bearing::FrameInput::Synthetic {
                    center: (xy[0], xy[1]),
                    width,
                    height,
                    radius,
                },
                (None, None) => eyre::bail!("either --image or --synthetic is required"),
            };
            bearing::run_bearing(&cfg, source, cli.json)
        }
        Commands::Convert {
            joint,
            radians,
            ticks,
        } => arm::run_convert(&cfg, joint, radians, ticks, cli.json),
        Commands::SelfCheck => self_check(&cfg),
    }
}

/// Read, merge and validate the TOML config and optional calibration CSV.
fn load_config(path: Option<&Path>, calibration: Option<&Path>) -> eyre::Result<robo_config::Config> {
    let mut cfg = match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .wrap_err_with(|| format!("read config {}", p.display()))?;
            robo_config::load_toml(&text)
                .wrap_err_with(|| format!("parse config {}", p.display()))?
        }
        None => robo_config::Config::default(),
    };
    if let Some(csv) = calibration {
        cfg.calibration = robo_config::load_calibration_csv(csv)?;
    }
    cfg.validate().wrap_err("invalid configuration")?;
    Ok(cfg)
}

fn init_tracing(json: bool, level: &str, logging: &robo_config::Logging) -> eyre::Result<()> {
    let level = logging.level.as_deref().unwrap_or(level);
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .wrap_err_with(|| format!("invalid log level {level:?}"))?;

    // Console logs go to stderr; stdout carries results only.
    let console = if json {
        fmt::layer().json().with_writer(std::io::stderr).boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    let file = match logging.file.as_deref() {
        Some(path) => {
            let path = Path::new(path);
            let dir = path.parent().filter(|d| !d.as_os_str().is_empty()).unwrap_or(Path::new("."));
            let name = path
                .file_name()
                .ok_or_else(|| eyre::eyre!("logging.file has no file name: {}", path.display()))?;
            let appender = match logging.rotation.as_deref() {
                Some("daily") => tracing_appender::rolling::daily(dir, name),
                Some("hourly") => tracing_appender::rolling::hourly(dir, name),
                _ => tracing_appender::rolling::never(dir, name),
            };
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().json().with_ansi(false).with_writer(writer).boxed())
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| eyre::eyre!("init tracing: {e}"))
}

fn self_check(cfg: &robo_config::Config) -> eyre::Result<()> {
    let cycle = arm::self_check_arm(cfg)?;
    tracing::info!(degraded = cycle.degraded.len(), "arm self-check ok");
    let response = bearing::self_check_bearing(cfg)?;
    tracing::info!(?response, "bearing self-check ok");
    println!("OK");
    Ok(())
}
