use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::Path};
use thiserror::Error;

use crate::entities::Category;

/// A keyword phrase and the weight it adds when present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword(pub String, pub u32);

impl Keyword {
    pub fn phrase(&self) -> &str {
        &self.0
    }

    pub fn weight(&self) -> u32 {
        self.1
    }
}

#[derive(Error, Debug)]
pub enum KeywordConfigError {
    #[error("failed to read keyword table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed keyword table: {0}")]
    Json(#[from] serde_json::Error),

    #[error("empty keyword phrase in category {0}")]
    EmptyPhrase(Category),
}

/// Category-keyed keyword weights.
///
/// Phrases are stored lower-cased and deduplicated per category, so each
/// phrase can contribute to a score at most once. Categories without their
/// own table are scored against the `General` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeywordTable {
    tables: BTreeMap<Category, Vec<Keyword>>,
}

impl KeywordTable {
    pub fn new(
        tables: impl IntoIterator<Item = (Category, Vec<Keyword>)>,
    ) -> Result<Self, KeywordConfigError> {
        let mut normalized = BTreeMap::new();

        for (category, keywords) in tables {
            let mut seen: Vec<Keyword> = Vec::with_capacity(keywords.len());
            for Keyword(phrase, weight) in keywords {
                let phrase = phrase.trim().to_lowercase();
                if phrase.is_empty() {
                    return Err(KeywordConfigError::EmptyPhrase(category));
                }
                if seen.iter().any(|k| k.phrase() == phrase) {
                    continue;
                }
                seen.push(Keyword(phrase, weight));
            }
            normalized.insert(category, seen);
        }

        Ok(Self { tables: normalized })
    }

    pub fn from_json(json: &str) -> Result<Self, KeywordConfigError> {
        let raw: BTreeMap<Category, Vec<Keyword>> = serde_json::from_str(json)?;
        Self::new(raw)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, KeywordConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| KeywordConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Keywords used for `category`, falling back to the generic table.
    pub fn keywords_for(&self, category: Category) -> &[Keyword] {
        self.tables
            .get(&category)
            .or_else(|| self.tables.get(&Category::General))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        fn band(weight: u32, phrases: &[&str]) -> impl Iterator<Item = Keyword> {
            phrases.iter().map(move |p| Keyword(p.to_string(), weight))
        }

        let cybersecurity = band(
            5,
            &[
                "zero-day",
                "exploit in the wild",
                "active attack",
                "critical vulnerability",
                "alert",
                "warning",
                "patch now",
                "ransomware attack",
                "breach confirmed",
            ],
        )
        .chain(band(
            3,
            &[
                "vulnerability",
                "exploit",
                "breach",
                "attack",
                "malware",
                "ransomware",
                "phishing",
                "threat",
                "advisory",
            ],
        ))
        .chain(band(
            1,
            &[
                "security",
                "cybersecurity",
                "data",
                "privacy",
                "risk",
                "compliance",
                "encryption",
                "patch",
            ],
        ))
        .collect();

        let tech = band(
            5,
            &[
                "ai",
                "artificial intelligence",
                "quantum computing",
                "breakthrough",
                "major update",
                "new chip",
                "innovation",
                "future of tech",
            ],
        )
        .chain(band(
            3,
            &[
                "startup",
                "funding",
                "acquisition",
                "cloud",
                "5g",
                "machine learning",
                "data science",
                "web3",
                "metaverse",
                "robotics",
            ],
        ))
        .chain(band(
            1,
            &[
                "review", "gadget", "app", "software", "hardware", "update", "guide", "tips",
            ],
        ))
        .collect();

        let general = band(1, &["news", "update", "report"]).collect();

        // built-in phrases are non-empty and already lower-case
        Self {
            tables: BTreeMap::from([
                (Category::Cybersecurity, cybersecurity),
                (Category::Tech, tech),
                (Category::General, general),
            ]),
        }
    }
}

/// Sum the weights of every keyword phrase found in the lower-cased
/// `title + " " + description`. Pure and total: no match yields 0.
pub fn rank_score(title: &str, description: &str, category: Category, table: &KeywordTable) -> u32 {
    let content = format!("{} {}", title, description).to_lowercase();

    table
        .keywords_for(category)
        .iter()
        .filter(|k| content.contains(k.phrase()))
        .fold(0u32, |rank, k| rank.saturating_add(k.weight()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_weight_phrase_scores() {
        let table = KeywordTable::default();
        let rank = rank_score(
            "Hospital hit by ransomware attack",
            "",
            Category::Cybersecurity,
            &table,
        );
        // "ransomware attack" (5) + "ransomware" (3) + "attack" (3)
        assert_eq!(rank, 11);
    }

    #[test]
    fn test_each_keyword_counts_once() {
        let table = KeywordTable::default();
        let once = rank_score("malware", "", Category::Cybersecurity, &table);
        let many = rank_score("malware malware", "MALWARE everywhere", Category::Cybersecurity, &table);
        assert_eq!(once, 3);
        assert_eq!(once, many);
    }

    #[test]
    fn test_case_insensitive_match() {
        let table = KeywordTable::default();
        assert_eq!(rank_score("PHISHING", "", Category::Cybersecurity, &table), 3);
    }

    #[test]
    fn test_no_match_is_zero() {
        let table = KeywordTable::default();
        assert_eq!(rank_score("Gardening", "tomatoes", Category::Cybersecurity, &table), 0);
        assert_eq!(rank_score("", "", Category::Tech, &table), 0);
    }

    #[test]
    fn test_adding_keyword_never_decreases_score() {
        let table = KeywordTable::default();
        let base = rank_score("New phishing kit", "", Category::Cybersecurity, &table);
        let more = rank_score("New phishing kit", "privacy advisory", Category::Cybersecurity, &table);
        assert!(more >= base);
        assert_eq!(more, base + 1 + 3);
    }

    #[test]
    fn test_deterministic_across_calls() {
        let table = KeywordTable::default();
        let first = rank_score("Cloud startup funding", "review", Category::Tech, &table);
        let _ = rank_score("something else entirely", "", Category::General, &table);
        let second = rank_score("Cloud startup funding", "review", Category::Tech, &table);
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_category_falls_back_to_general() {
        let table = KeywordTable::new([(
            Category::General,
            vec![Keyword("report".into(), 2)],
        )])
        .unwrap();
        assert_eq!(rank_score("Quarterly report", "", Category::Tech, &table), 2);
    }

    #[test]
    fn test_from_json_normalizes_and_dedups() {
        let table = KeywordTable::from_json(
            r#"{"Cybersecurity": [["Zero-Day", 7], ["zero-day", 1], ["worm", 2]]}"#,
        )
        .unwrap();
        let keywords = table.keywords_for(Category::Cybersecurity);
        assert_eq!(keywords.len(), 2);
        assert_eq!(keywords[0], Keyword("zero-day".into(), 7));
        assert_eq!(rank_score("ZERO-DAY worm", "", Category::Cybersecurity, &table), 9);
    }

    #[test]
    fn test_from_json_rejects_empty_phrase() {
        let err = KeywordTable::from_json(r#"{"Tech": [["  ", 3]]}"#).unwrap_err();
        assert!(matches!(err, KeywordConfigError::EmptyPhrase(Category::Tech)));
    }

    #[test]
    fn test_from_json_rejects_negative_weight() {
        assert!(KeywordTable::from_json(r#"{"Tech": [["ai", -1]]}"#).is_err());
    }

    #[test]
    fn test_default_round_trips_through_json() {
        let table = KeywordTable::default();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(KeywordTable::from_json(&json).unwrap(), table);
    }
}

#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_appending_text_never_decreases_rank(
            title in ".*",
            description in ".*",
            extra in ".*",
        ) {
            let table = KeywordTable::default();
            let base = rank_score(&title, &description, Category::Cybersecurity, &table);
            let extended = rank_score(
                &title,
                &format!("{} {}", description, extra),
                Category::Cybersecurity,
                &table,
            );
            prop_assert!(extended >= base);
        }
    }
}
