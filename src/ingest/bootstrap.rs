use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    config::Config,
    extractor::{GeminiSummarizer, LanguageError, LanguageFilter, Summarizer},
    fetcher::{FeedClient, FetchError},
    ingest::Pipeline,
    repositories::ArticleStore,
    scoring::{CategoryClassifier, KeywordConfigError, KeywordTable},
};

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error(transparent)]
    Client(#[from] FetchError),

    #[error(transparent)]
    Language(#[from] LanguageError),

    #[error(transparent)]
    Keywords(#[from] KeywordConfigError),
}

/// Assemble an ingestion pipeline from configuration.
///
/// A missing or unusable summarizer key is not an error; summaries then
/// fall back to truncation.
pub fn build_pipeline(
    config: &Config,
    store: Arc<dyn ArticleStore>,
) -> Result<Pipeline, BootstrapError> {
    let client = FeedClient::new(config.fetch_timeout())?;
    let language = LanguageFilter::new(config.allowed_languages())?;

    let keywords = match config.keywords_path() {
        Some(path) => {
            info!("Loading keyword table from {}", path.display());
            KeywordTable::from_path(path)?
        }
        None => KeywordTable::default(),
    };

    let summarizer: Option<Arc<dyn Summarizer>> = match config.gemini_api_key() {
        Some(key) => match GeminiSummarizer::new(key) {
            Ok(summarizer) => Some(Arc::new(summarizer)),
            Err(e) => {
                warn!("Summarizer disabled: {}", e);
                None
            }
        },
        None => {
            info!("No summarizer key configured, summaries will be truncated descriptions");
            None
        }
    };

    Ok(Pipeline::new(
        client,
        language,
        CategoryClassifier::default(),
        keywords,
        summarizer,
        store,
    ))
}
