use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{Instrument, error, info, info_span, warn};

use crate::ingest::{Pipeline, SourceReport};

/// Totals for one ingestion round across every configured source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundReport {
    pub sources_ok: usize,
    pub sources_failed: usize,
    pub stored: usize,
    pub duplicates: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RoundReport {
    fn absorb(&mut self, source: &SourceReport) {
        self.sources_ok += 1;
        self.stored += source.stored;
        self.duplicates += source.duplicates;
        self.skipped += source.skipped;
        self.failed += source.failed;
    }
}

/// Process every source concurrently and wait for all of them.
///
/// A failing source is logged and counted; it never aborts the round or
/// affects the other sources.
pub async fn run_round(pipeline: Arc<Pipeline>, sources: &[String]) -> RoundReport {
    info!(sources = sources.len(), "Starting news caching job");

    let mut tasks = JoinSet::new();
    for source in sources {
        let pipeline = pipeline.clone();
        let source = source.clone();
        let span = info_span!("source", source = %source);
        tasks.spawn(
            async move {
                let result = pipeline.process_source(&source).await;
                (source, result)
            }
            .instrument(span),
        );
    }

    let mut report = RoundReport::default();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((_, Ok(source_report))) => report.absorb(&source_report),
            Ok((source, Err(e))) => {
                report.sources_failed += 1;
                warn!(
                    transient = e.is_transient(),
                    "Error parsing feed from {}: {}", source, e
                );
            }
            Err(e) => {
                report.sources_failed += 1;
                error!("Source task failed to complete: {}", e);
            }
        }
    }

    info!(
        sources_ok = report.sources_ok,
        sources_failed = report.sources_failed,
        stored = report.stored,
        duplicates = report.duplicates,
        "News caching job completed"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorb_accumulates_source_counts() {
        let mut report = RoundReport::default();
        let source = SourceReport {
            items: 5,
            stored: 2,
            duplicates: 1,
            skipped: 1,
            failed: 1,
        };
        report.absorb(&source);
        report.absorb(&source);

        assert_eq!(report.sources_ok, 2);
        assert_eq!(report.stored, 4);
        assert_eq!(report.duplicates, 2);
        assert_eq!(report.skipped, 2);
        assert_eq!(report.failed, 2);
        assert_eq!(report.sources_failed, 0);
    }
}
