//! Two-task orchestration of an `ArmController`.
//!
//! The command task blocks on the command channel and applies each vector as
//! it arrives. The publish task reads the arm back on a fixed period and hands
//! each cycle to a `StateSink`. Both share the controller behind a mutex; the
//! publish task never waits for a command, only for the lock around one bus
//! transaction.
//!
//! Each `ArmRunner` owns exactly two threads. `stop()` (or drop) signals both,
//! joins them, and `stop()` then disables torque as its last action.
use crossbeam_channel as xch;
use robo_traits::ActuatorBus;
use robo_traits::clock::Clock;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::control::ArmController;
use crate::publish::StateSink;
use crate::status::CommandOutcome;

/// Guarded state shared by the two tasks.
pub type SharedArm<B> = Arc<Mutex<ArmController<B>>>;

/// Counters exposed for stats output and tests.
#[derive(Debug, Default)]
pub struct RunnerStats {
    pub cycles: AtomicU64,
    pub degraded_cycles: AtomicU64,
    pub commands_applied: AtomicU64,
    pub commands_rejected: AtomicU64,
}

pub struct ArmRunner<B: ActuatorBus + Send + 'static> {
    shared: SharedArm<B>,
    stats: Arc<RunnerStats>,
    shutdown: Arc<AtomicBool>,
    publisher: Option<JoinHandle<()>>,
    commander: Option<JoinHandle<()>>,
}

fn lock<B: ActuatorBus>(shared: &Mutex<ArmController<B>>) -> MutexGuard<'_, ArmController<B>> {
    match shared.lock() {
        Ok(g) => g,
        Err(poisoned) => {
            tracing::warn!("arm state lock poisoned; continuing with inner state");
            poisoned.into_inner()
        }
    }
}

impl<B: ActuatorBus + Send + 'static> ArmRunner<B> {
    /// Run `startup()` on the controller, then spawn the command and publish tasks.
    ///
    /// The publish rate comes from the controller's `ArmCfg::publish_hz`.
    pub fn spawn<S, C>(
        mut controller: ArmController<B>,
        mut sink: S,
        commands: xch::Receiver<Vec<f64>>,
        clock: C,
    ) -> Self
    where
        S: StateSink + Send + 'static,
        C: Clock + Send + 'static,
    {
        let startup = controller.startup();
        if !startup.is_clean() {
            tracing::warn!(failures = startup.failures.len(), "startup writes failed");
        }
        let period = crate::util::period(controller.cfg().publish_hz);
        let shared: SharedArm<B> = Arc::new(Mutex::new(controller));
        let stats = Arc::new(RunnerStats::default());
        let shutdown = Arc::new(AtomicBool::new(false));

        let publisher = {
            let shared = shared.clone();
            let stats = stats.clone();
            let shutdown = shutdown.clone();
            std::thread::spawn(move || {
                loop {
                    if shutdown.load(Ordering::Relaxed) {
                        tracing::debug!("publish task received shutdown signal");
                        break;
                    }
                    let started = clock.now();
                    let cycle = {
                        let mut arm = lock(&shared);
                        arm.poll(clock.stamp())
                    };
                    sink.publish(&cycle);
                    stats.cycles.fetch_add(1, Ordering::Relaxed);
                    if cycle.is_degraded() {
                        stats.degraded_cycles.fetch_add(1, Ordering::Relaxed);
                    }

                    if shutdown.load(Ordering::Relaxed) {
                        break;
                    }
                    let spent = clock.now().saturating_duration_since(started);
                    clock.sleep(crate::util::remaining(period, spent));
                }
                tracing::trace!("publish task exiting cleanly");
            })
        };

        let commander = {
            let shared = shared.clone();
            let stats = stats.clone();
            let shutdown = shutdown.clone();
            // Bounded wait so the shutdown flag is observed promptly.
            let wait = period.min(Duration::from_millis(50));
            std::thread::spawn(move || {
                loop {
                    if shutdown.load(Ordering::Relaxed) {
                        tracing::debug!("command task received shutdown signal");
                        break;
                    }
                    match commands.recv_timeout(wait) {
                        Ok(angles) => {
                            let result = lock(&shared).apply_command(&angles);
                            match result {
                                Ok(_) => stats.commands_applied.fetch_add(1, Ordering::Relaxed),
                                Err(_) => stats.commands_rejected.fetch_add(1, Ordering::Relaxed),
                            };
                        }
                        Err(xch::RecvTimeoutError::Timeout) => continue,
                        Err(xch::RecvTimeoutError::Disconnected) => {
                            tracing::debug!("command source disconnected");
                            break;
                        }
                    }
                }
                tracing::trace!("command task exiting cleanly");
            })
        };

        tracing::info!(period_ms = period.as_millis() as u64, "arm runner started");
        Self {
            shared,
            stats,
            shutdown,
            publisher: Some(publisher),
            commander: Some(commander),
        }
    }

    pub fn stats(&self) -> &RunnerStats {
        &self.stats
    }

    /// Run `f` against the controller under the shared lock.
    pub fn with_controller<R>(&self, f: impl FnOnce(&mut ArmController<B>) -> R) -> R {
        f(&mut lock(&self.shared))
    }

    /// Stop both tasks, then disable torque on every channel.
    pub fn stop(mut self) -> CommandOutcome {
        self.join_tasks();
        lock(&self.shared).shutdown()
    }

    fn join_tasks(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        for handle in [self.publisher.take(), self.commander.take()]
            .into_iter()
            .flatten()
        {
            if let Err(e) = handle.join() {
                tracing::warn!(?e, "arm task panicked during shutdown");
            }
        }
    }
}

impl<B: ActuatorBus + Send + 'static> Drop for ArmRunner<B> {
    fn drop(&mut self) {
        // Torque is left as-is here; only `stop()` disables it.
        self.join_tasks();
    }
}
