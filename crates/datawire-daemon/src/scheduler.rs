//! Periodic background tasks.

use crate::UsageMonitor;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handles to the periodic persistence, rollover and alert tasks.
///
/// Each task runs to completion once started; [`shutdown`](Self::shutdown)
/// stops them between ticks and performs a final flush.
#[derive(Debug)]
pub struct Scheduler {
    monitor: Arc<UsageMonitor>,
    tasks: Vec<JoinHandle<()>>,
}

impl Scheduler {
    /// Spawns the periodic tasks on the current tokio runtime.
    ///
    /// The first tick of each task fires one full interval after spawning.
    #[must_use]
    pub fn spawn(monitor: Arc<UsageMonitor>) -> Self {
        let config = *monitor.config();

        let tasks = vec![
            every(config.persist_interval, Arc::clone(&monitor), |m| async move {
                m.persist_logged().await;
            }),
            every(config.rollover_interval, Arc::clone(&monitor), |m| async move {
                m.roll_over().await;
            }),
            every(config.alert_interval, Arc::clone(&monitor), |m| async move {
                m.check_alerts().await;
            }),
        ];

        tracing::debug!(
            persist = ?config.persist_interval,
            rollover = ?config.rollover_interval,
            alerts = ?config.alert_interval,
            "background tasks started"
        );

        Self { monitor, tasks }
    }

    /// Stops the periodic tasks and flushes state one last time.
    pub async fn shutdown(self) {
        for task in &self.tasks {
            task.abort();
        }
        for task in self.tasks {
            match task.await {
                Err(e) if !e.is_cancelled() => {
                    tracing::error!(error = %e, "background task failed");
                }
                _ => {}
            }
        }

        self.monitor.persist_logged().await;
        tracing::info!("background tasks stopped");
    }
}

fn every<F, Fut>(period: Duration, monitor: Arc<UsageMonitor>, mut task: F) -> JoinHandle<()>
where
    F: FnMut(Arc<UsageMonitor>) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        ticker.tick().await;

        loop {
            ticker.tick().await;
            task(Arc::clone(&monitor)).await;
        }
    })
}
