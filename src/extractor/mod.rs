//! Content normalization for feed items: markup stripping, language
//! admission and summary derivation.

pub mod cleaner;
pub mod language;
pub mod summarizer;

pub use cleaner::sanitize;
pub use language::{LanguageError, LanguageFilter};
pub use summarizer::{GeminiSummarizer, SummarizeError, Summarizer, summarize_or_truncate};
