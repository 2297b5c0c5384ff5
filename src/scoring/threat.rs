use chrono::Duration;

use crate::entities::{ThreatLevel, ThreatScore};

/// Fixed thresholds for turning recent article ranks into a threat level.
///
/// The aggregate is the mean rank over the trailing `window`. Fewer than
/// `min_articles` qualifying articles yields the insufficient-data sentinel.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreatPolicy {
    pub window: Duration,
    pub min_articles: u64,
    /// Mean at or above this is `Attention`.
    pub attention_from: f64,
    /// Mean at or above this is `CodeRed`.
    pub code_red_from: f64,
}

impl Default for ThreatPolicy {
    fn default() -> Self {
        Self {
            window: Duration::hours(24),
            min_articles: 5,
            attention_from: 1.6,
            code_red_from: 3.5,
        }
    }
}

impl ThreatPolicy {
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn with_min_articles(mut self, min_articles: u64) -> Self {
        self.min_articles = min_articles;
        self
    }

    /// Build the snapshot from the count and rank sum of qualifying articles.
    pub fn evaluate(&self, article_count: u64, rank_sum: u64) -> ThreatScore {
        if article_count == 0 || article_count < self.min_articles {
            return ThreatScore {
                score: 0.0,
                phrase: phrase_for(ThreatLevel::InsufficientData).to_string(),
                level: ThreatLevel::InsufficientData,
                article_count,
            };
        }

        let mean = rank_sum as f64 / article_count as f64;
        let level = if mean >= self.code_red_from {
            ThreatLevel::CodeRed
        } else if mean >= self.attention_from {
            ThreatLevel::Attention
        } else {
            ThreatLevel::NoWorries
        };

        ThreatScore {
            score: mean,
            phrase: phrase_for(level).to_string(),
            level,
            article_count,
        }
    }
}

fn phrase_for(level: ThreatLevel) -> &'static str {
    match level {
        ThreatLevel::InsufficientData => "No Worries (Insufficient Data)",
        ThreatLevel::NoWorries => "No Worries",
        ThreatLevel::Attention => "Attention!",
        ThreatLevel::CodeRed => "Code Red",
    }
}
