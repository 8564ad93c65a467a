use crate::reconciler::Reconciler;
use crate::schedule::{Jitter, rng_for};
use rand::rngs::StdRng;
use std::future::Future;
use std::pin::pin;
use tracing::{error, info};
use zb_domain::config::ScheduleConfig;

/// Drives [`Reconciler::run_cycle`] forever with a random pause in between.
#[derive(Debug)]
pub struct ReconciliationLoop {
    reconciler: Reconciler,
    jitter: Jitter,
    rng: StdRng,
}

impl ReconciliationLoop {
    #[must_use]
    pub const fn new(reconciler: Reconciler, jitter: Jitter, rng: StdRng) -> Self {
        Self { reconciler, jitter, rng }
    }

    #[must_use]
    pub fn from_config(reconciler: Reconciler, config: &ScheduleConfig) -> Self {
        Self::new(reconciler, Jitter::from_config(config), rng_for(config))
    }

    /// Cycles until `shutdown` resolves and returns the number of cycles run.
    ///
    /// Shutdown is only observed during the pause: a started cycle always
    /// finishes and persists.
    pub async fn run_until<F>(mut self, shutdown: F) -> u64
    where
        F: Future<Output = ()>,
    {
        let mut shutdown = pin!(shutdown);
        let mut cycles = 0;

        loop {
            cycles += 1;
            match self.reconciler.run_cycle().await {
                Ok(report) => info!(
                    cycle = cycles,
                    tasks = report.tasks,
                    snapshots = report.snapshots,
                    registered = report.registered,
                    kept = report.kept,
                    dropped = report.dropped,
                    "Cycle finished"
                ),
                Err(err) => error!(cycle = cycles, error = %err, "Cycle aborted, retrying after the pause"),
            }

            let delay = self.jitter.next_delay(&mut self.rng);
            info!(delay_secs = delay.as_secs(), "Sleeping until next cycle");

            tokio::select! {
                () = tokio::time::sleep(delay) => {},
                () = &mut shutdown => {
                    info!(cycles, "Shutdown requested, stopping");
                    return cycles;
                },
            }
        }
    }
}
