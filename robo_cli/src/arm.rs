//! `arm` and `convert` subcommands: config mapping, simulated bus assembly,
//! command ingestion and publish-cycle output.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant, UNIX_EPOCH};

use crossbeam_channel as xch;
use robo_core::{ArmBuilder, ArmCfg, ArmController, ArmRunner, CalibrationTable, PublishCycle};
use robo_hardware::SimulatedBus;
use robo_traits::clock::MonotonicClock;
use serde_json::json;

pub struct ArmRunOpts {
    pub commands: Option<PathBuf>,
    pub duration: Option<Duration>,
    pub stats: bool,
    pub json: bool,
}

/// Controller over a simulated bus whose servos rest at their zero offsets.
fn build_sim_arm(cfg: &robo_config::Config) -> eyre::Result<ArmController<SimulatedBus>> {
    let table = CalibrationTable::try_from(&cfg.calibration)?;
    let rest: Vec<i32> = table.channels().map(|j| j.zero_offset_ticks).collect();
    let arm = ArmBuilder::new()
        .with_bus(SimulatedBus::with_positions(&rest))
        .with_calibration(table)
        .with_cfg(ArmCfg::from(cfg))
        .build()?;
    Ok(arm)
}

fn cycle_json(cycle: &PublishCycle) -> serde_json::Value {
    let stamp_ms = cycle
        .joint_state
        .stamp
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    json!({
        "stamp_ms": stamp_ms,
        "names": cycle.joint_state.names,
        "positions": cycle.joint_state.positions,
        "gripper": cycle.current_gripper,
        "degraded": cycle.degraded,
    })
}

/// Forward one JSON array per line into `tx`. Unparseable lines are logged
/// and skipped; the controller rejects arrays of the wrong shape.
fn pump_commands(reader: impl BufRead, tx: &xch::Sender<Vec<f64>>) {
    for (idx, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                tracing::warn!(error = %e, "command input closed");
                return;
            }
        };
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match serde_json::from_str::<Vec<f64>>(trimmed) {
            Ok(angles) => {
                if tx.send(angles).is_err() {
                    return;
                }
            }
            Err(e) => tracing::warn!(line = idx + 1, error = %e, "malformed command line dropped"),
        }
    }
    tracing::debug!("command input exhausted");
}

pub fn run_arm(cfg: &robo_config::Config, opts: ArmRunOpts) -> eyre::Result<()> {
    tracing::info!(
        port = %cfg.bus.port,
        baud = cfg.bus.baud,
        publish_hz = cfg.arm.publish_hz,
        "starting arm loop on simulated bus"
    );
    let arm = build_sim_arm(cfg)?;

    let running = Arc::new(AtomicBool::new(true));
    {
        let r = running.clone();
        ctrlc::set_handler(move || r.store(false, Ordering::SeqCst))
            .map_err(|e| eyre::eyre!("install Ctrl-C handler: {e}"))?;
    }

    let (cmd_tx, cmd_rx) = xch::unbounded::<Vec<f64>>();
    match opts.commands.filter(|p| p.as_os_str() != "-") {
        Some(path) => {
            let file = std::fs::File::open(&path)
                .map_err(|e| eyre::eyre!("open command file {}: {e}", path.display()))?;
            std::thread::spawn(move || pump_commands(std::io::BufReader::new(file), &cmd_tx));
        }
        None => {
            std::thread::spawn(move || pump_commands(std::io::stdin().lock(), &cmd_tx));
        }
    }

    let (cycle_tx, cycle_rx) = xch::bounded::<PublishCycle>(64);
    let runner = ArmRunner::spawn(arm, cycle_tx, cmd_rx, MonotonicClock::new());

    let deadline = opts.duration.map(|d| Instant::now() + d);
    let print = |cycle: &PublishCycle| {
        if opts.json {
            println!("{}", cycle_json(cycle));
        } else {
            let pose: Vec<String> = cycle
                .current_pose
                .iter()
                .map(|p| format!("{p:+.4}"))
                .collect();
            println!(
                "pose [{}] gripper {}{}",
                pose.join(", "),
                cycle
                    .current_gripper
                    .map_or_else(|| "-".to_string(), |g| format!("{g:+.4}")),
                if cycle.is_degraded() {
                    format!(" (stale: {:?})", cycle.degraded)
                } else {
                    String::new()
                }
            );
        }
    };

    while running.load(Ordering::SeqCst) && deadline.is_none_or(|d| Instant::now() < d) {
        match cycle_rx.recv_timeout(Duration::from_millis(50)) {
            Ok(cycle) => print(&cycle),
            Err(xch::RecvTimeoutError::Timeout) => continue,
            Err(xch::RecvTimeoutError::Disconnected) => break,
        }
    }

    let stats = runner.stats();
    let counters = (
        stats.cycles.load(Ordering::Relaxed),
        stats.degraded_cycles.load(Ordering::Relaxed),
        stats.commands_applied.load(Ordering::Relaxed),
        stats.commands_rejected.load(Ordering::Relaxed),
    );
    let outcome = runner.stop();
    if !outcome.is_clean() {
        tracing::warn!(failures = outcome.failures.len(), "torque disable incomplete");
    }
    while let Ok(cycle) = cycle_rx.try_recv() {
        print(&cycle);
    }

    if opts.stats {
        let (cycles, degraded, applied, rejected) = counters;
        if opts.json {
            eprintln!(
                "{}",
                json!({
                    "cycles": cycles,
                    "degraded_cycles": degraded,
                    "commands_applied": applied,
                    "commands_rejected": rejected,
                })
            );
        } else {
            eprintln!(
                "stats: cycles={cycles} degraded={degraded} commands_applied={applied} commands_rejected={rejected}"
            );
        }
    }
    Ok(())
}

pub fn run_convert(
    cfg: &robo_config::Config,
    joint: usize,
    radians: Option<f64>,
    ticks: Option<i32>,
    json: bool,
) -> eyre::Result<()> {
    let table = CalibrationTable::try_from(&cfg.calibration)?;
    match (radians, ticks) {
        (Some(rad), _) => {
            if !rad.is_finite() {
                eyre::bail!("--radians must be finite");
            }
            let t = table.to_ticks(joint, rad)?;
            if json {
                println!("{}", json!({ "joint": joint, "radians": rad, "ticks": t }));
            } else {
                println!("joint {joint}: {rad} rad -> {t} ticks");
            }
        }
        (None, Some(t)) => {
            let rad = table.to_radians(joint, t)?;
            if json {
                println!("{}", json!({ "joint": joint, "ticks": t, "radians": rad }));
            } else {
                println!("joint {joint}: {t} ticks -> {rad:.6} rad");
            }
        }
        (None, None) => eyre::bail!("either --radians or --ticks is required"),
    }
    Ok(())
}

/// Startup, one zero command and one read-back on the simulated bus.
pub fn self_check_arm(cfg: &robo_config::Config) -> eyre::Result<PublishCycle> {
    let mut arm = build_sim_arm(cfg)?;
    let startup = arm.startup();
    let zeros = vec![0.0; arm.calibration().joint_count()];
    let applied = arm.apply_command(&zeros)?;
    let cycle = arm.poll(std::time::SystemTime::now());
    let shutdown = arm.shutdown();
    let failures = startup.failures.len() + applied.failures.len() + shutdown.failures.len();
    if failures > 0 || cycle.is_degraded() {
        eyre::bail!("simulated bus reported {failures} write failures");
    }
    Ok(cycle)
}
