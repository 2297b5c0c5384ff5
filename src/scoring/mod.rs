//! Relevance scoring: keyword-weighted rank, source classification and the
//! rolling threat aggregate policy.

pub mod category;
pub mod keywords;
pub mod threat;

pub use category::CategoryClassifier;
pub use keywords::{Keyword, KeywordConfigError, KeywordTable, rank_score};
pub use threat::ThreatPolicy;
