use std::{sync::Arc, time::Duration};
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::ingest::{Pipeline, RoundReport, run_round};

/// Periodic ingestion driver.
///
/// The first round starts immediately, later rounds every `interval`. A round
/// is awaited inside the loop, so rounds never overlap; a slow round delays
/// the next tick instead of stacking a second one.
pub struct Scheduler {
    pipeline: Arc<Pipeline>,
    sources: Vec<String>,
    interval: Duration,
}

impl Scheduler {
    pub fn new(pipeline: Arc<Pipeline>, sources: Vec<String>, interval: Duration) -> Self {
        Self {
            pipeline,
            sources,
            interval,
        }
    }

    pub async fn run_once(&self) -> RoundReport {
        run_round(self.pipeline.clone(), &self.sources).await
    }

    /// Run rounds until `shutdown` is cancelled. An in-flight round is
    /// finished before returning.
    pub async fn run(self, shutdown: CancellationToken) {
        info!(
            "Starting scheduler - sources: {}, interval: {}s",
            self.sources.len(),
            self.interval.as_secs()
        );

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Scheduler shutting down");
                    break;
                }
                _ = ticker.tick() => {
                    self.run_once().await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        extractor::LanguageFilter,
        fetcher::{FeedClient, client::DEFAULT_TIMEOUT},
        repositories::article::MockArticleStore,
        scoring::{CategoryClassifier, KeywordTable},
    };

    fn scheduler(sources: Vec<String>) -> Scheduler {
        let mut store = MockArticleStore::new();
        store.expect_insert().times(0);
        let pipeline = Pipeline::new(
            FeedClient::new(DEFAULT_TIMEOUT).unwrap(),
            LanguageFilter::english(),
            CategoryClassifier::default(),
            KeywordTable::default(),
            None,
            Arc::new(store),
        );
        Scheduler::new(Arc::new(pipeline), sources, Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn test_run_returns_once_cancelled() {
        let token = CancellationToken::new();
        token.cancel();

        tokio::time::timeout(
            Duration::from_secs(5),
            scheduler(vec!["not a url".to_string()]).run(token),
        )
        .await
        .expect("scheduler did not stop");
    }

    #[tokio::test]
    async fn test_run_once_counts_failed_sources() {
        let report = scheduler(vec!["not a url".to_string(), "ftp://".to_string()])
            .run_once()
            .await;
        assert_eq!(report.sources_failed, 2);
        assert_eq!(report.sources_ok, 0);
    }

    #[tokio::test]
    async fn test_empty_source_list_is_a_noop_round() {
        let report = scheduler(Vec::new()).run_once().await;
        assert_eq!(report, RoundReport::default());
    }
}
