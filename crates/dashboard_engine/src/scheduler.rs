//! Refresh loop and atomic publication of the latest dashboard model.
//!
//! The published model lives in a `tokio::sync::watch` slot as an
//! `Arc<DashboardModel>`, so readers always see a whole model and a new one
//! replaces the old in a single store. A model is only published when its
//! generation is newer than the one already in the slot, so a slow load that
//! finishes after a faster, later one is dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::MissedTickBehavior;

use crate::model::DashboardModel;
use crate::orchestrator::DashboardOrchestrator;

type Slot = Option<Arc<DashboardModel>>;

pub struct DashboardScheduler {
    orchestrator: Arc<DashboardOrchestrator>,
    interval: Duration,
    slot: watch::Sender<Slot>,
}

/// Cheap, cloneable read access to the latest published model.
#[derive(Clone)]
pub struct DashboardHandle {
    rx: watch::Receiver<Slot>,
}

impl DashboardHandle {
    /// `None` until the first load has been published.
    pub fn current(&self) -> Option<Arc<DashboardModel>> {
        self.rx.borrow().clone()
    }

    /// Wait for the next publication. Errors once the scheduler is gone.
    pub async fn changed(&mut self) -> Result<Option<Arc<DashboardModel>>, watch::error::RecvError> {
        self.rx.changed().await?;
        Ok(self.rx.borrow_and_update().clone())
    }
}

impl DashboardScheduler {
    pub fn new(orchestrator: Arc<DashboardOrchestrator>) -> Self {
        let interval = orchestrator.config().refresh_interval;
        Self::with_interval(orchestrator, interval)
    }

    pub fn with_interval(orchestrator: Arc<DashboardOrchestrator>, interval: Duration) -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            orchestrator,
            interval,
            slot,
        }
    }

    pub fn handle(&self) -> DashboardHandle {
        DashboardHandle {
            rx: self.slot.subscribe(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one load and try to publish it. Returns the freshly built model
    /// whether or not a newer one had already been published.
    pub async fn refresh(&self) -> Arc<DashboardModel> {
        let model = Arc::new(self.orchestrator.load().await);
        if !self.publish(Arc::clone(&model)) {
            tracing::debug!(
                generation = model.generation,
                "discarding superseded dashboard load"
            );
        }
        model
    }

    /// Replace the published model if `model` is newer. Returns whether it
    /// was published.
    pub fn publish(&self, model: Arc<DashboardModel>) -> bool {
        self.slot.send_if_modified(|slot| {
            if slot
                .as_ref()
                .is_some_and(|current| current.generation >= model.generation)
            {
                return false;
            }
            *slot = Some(model);
            true
        })
    }

    /// Load immediately, then on every tick, until `shutdown` turns true or
    /// its sender is dropped.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!(interval_secs = self.interval.as_secs(), "dashboard scheduler started");
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.refresh().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        tracing::info!("dashboard scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::model::{SourcePayloads, assemble};
    use crate::test_utils::MockUpstreamClient;
    use chrono::Utc;
    use dashboard_client::Source;
    use serde_json::json;

    fn scheduler(client: MockUpstreamClient) -> DashboardScheduler {
        let orchestrator = DashboardOrchestrator::new(Arc::new(client), EngineConfig::default());
        DashboardScheduler::with_interval(Arc::new(orchestrator), Duration::from_secs(60))
    }

    fn model(generation: u64) -> Arc<DashboardModel> {
        Arc::new(assemble(
            &SourcePayloads::new(),
            Utc::now(),
            generation,
            &EngineConfig::default(),
        ))
    }

    #[test]
    fn stale_generation_is_not_published() {
        let scheduler = scheduler(MockUpstreamClient::new());
        let handle = scheduler.handle();
        assert!(handle.current().is_none());

        assert!(scheduler.publish(model(2)));
        assert!(!scheduler.publish(model(1)));
        assert!(!scheduler.publish(model(2)));
        assert_eq!(handle.current().map(|m| m.generation), Some(2));

        assert!(scheduler.publish(model(3)));
        assert_eq!(handle.current().map(|m| m.generation), Some(3));
    }

    #[tokio::test]
    async fn refresh_publishes_to_handles() {
        let scheduler =
            scheduler(MockUpstreamClient::new().with(Source::Projects, json!({"projects": []})));
        let mut handle = scheduler.handle();
        let model = scheduler.refresh().await;
        let seen = handle.changed().await.expect("published").expect("model");
        assert_eq!(seen.generation, model.generation);
        assert!(seen.sources.projects.is_ready());
    }

    #[tokio::test]
    async fn concurrent_refreshes_keep_the_newest() {
        let scheduler = scheduler(MockUpstreamClient::new());
        let (a, b) = tokio::join!(scheduler.refresh(), scheduler.refresh());
        let newest = a.generation.max(b.generation);
        assert_eq!(scheduler.handle().current().map(|m| m.generation), Some(newest));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_older_load_does_not_replace_newer() {
        let client = Arc::new(
            MockUpstreamClient::new()
                .with(Source::Projects, json!([]))
                .slow_for(Source::ALL.len(), Duration::from_secs(5)),
        );
        let orchestrator = DashboardOrchestrator::new(client.clone(), EngineConfig::default());
        let scheduler = Arc::new(DashboardScheduler::with_interval(
            Arc::new(orchestrator),
            Duration::from_secs(60),
        ));
        let handle = scheduler.handle();

        let slow = {
            let scheduler = Arc::clone(&scheduler);
            tokio::spawn(async move { scheduler.refresh().await })
        };
        while client.requested().await.len() < Source::ALL.len() {
            tokio::task::yield_now().await;
        }

        let fast = scheduler.refresh().await;
        assert_eq!(fast.generation, 2);
        assert_eq!(handle.current().map(|m| m.generation), Some(2));

        let slow = slow.await.expect("slow load joined");
        assert_eq!(slow.generation, 1);
        assert_eq!(handle.current().map(|m| m.generation), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn run_loads_on_start_and_stops_on_shutdown() {
        let scheduler = Arc::new(scheduler(MockUpstreamClient::new()));
        let handle = scheduler.handle();
        let (stop_tx, stop_rx) = watch::channel(false);

        let runner = {
            let scheduler = Arc::clone(&scheduler);
            tokio::spawn(async move { scheduler.run(stop_rx).await })
        };

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(handle.current().map(|m| m.generation), Some(1));

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(handle.current().map(|m| m.generation), Some(2));

        stop_tx.send(true).expect("runner alive");
        runner.await.expect("runner joined");
    }
}
