use std::time::Duration;

use tokio::{
    task::JoinSet,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;

/// What a background task did between spawn and cancellation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskReport {
    pub name: &'static str,
    pub runs: u64,
    pub failures: u64,
}

pub struct Scheduler {
    cancel_token: CancellationToken,
    tasks: JoinSet<TaskReport>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a background task, running it immediately and then every `period`
    ///
    /// A failing run is logged and counted, the task keeps its schedule.
    pub fn spawn_task<P, F, Fut>(
        &mut self,
        period: Duration,
        name: &'static str,
        params: P,
        mut task: F,
    ) where
        P: Clone + Send + Sync + 'static,
        F: FnMut(P) -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let cancel = self.cancel_token.clone();
        self.tasks.spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut report = TaskReport {
                name,
                runs: 0,
                failures: 0,
            };

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        report.runs += 1;
                        if let Err(e) = task(params.clone()).await {
                            report.failures += 1;
                            tracing::error!(error = %e, "Task {name} failed");
                        }
                    }
                }
            }

            report
        });
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Cancels all tasks and collects the reports of those finishing within `timeout_s` seconds
    ///
    /// Tasks still running at the deadline are left behind, the process is expected to exit.
    pub async fn shutdown(mut self, timeout_s: u64) -> Vec<TaskReport> {
        self.cancel_token.cancel();

        let deadline = Instant::now() + Duration::from_secs(timeout_s);
        let mut reports = Vec::with_capacity(self.tasks.len());

        loop {
            match time::timeout_at(deadline, self.tasks.join_next()).await {
                Ok(Some(Ok(report))) => {
                    tracing::info!(
                        runs = report.runs,
                        failures = report.failures,
                        "Task {} stopped",
                        report.name
                    );
                    reports.push(report);
                }
                Ok(Some(Err(e))) => tracing::error!(error = %e, "Task join error"),
                Ok(None) => break,
                Err(_) => {
                    tracing::error!(
                        pending = self.tasks.len(),
                        "Scheduler timed out when shutting down"
                    );
                    break;
                }
            }
        }

        reports
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            cancel_token: CancellationToken::new(),
            tasks: JoinSet::new(),
        }
    }
}
