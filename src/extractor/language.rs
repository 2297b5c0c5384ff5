use std::fmt;
use thiserror::Error;
use tracing::debug;
use whatlang::{Detector, Lang};

/// Languages the detector chooses between, beyond the admitted set.
const CANDIDATE_LANGUAGES: &[Lang] = &[
    Lang::Eng,
    Lang::Deu,
    Lang::Fra,
    Lang::Spa,
    Lang::Rus,
    Lang::Cmn,
];

const CODES: &[(Lang, &str)] = &[
    (Lang::Eng, "en"),
    (Lang::Rus, "ru"),
    (Lang::Cmn, "zh"),
    (Lang::Spa, "es"),
    (Lang::Fra, "fr"),
    (Lang::Deu, "de"),
    (Lang::Jpn, "ja"),
    (Lang::Kor, "ko"),
    (Lang::Por, "pt"),
    (Lang::Ita, "it"),
    (Lang::Nld, "nl"),
    (Lang::Pol, "pl"),
    (Lang::Tur, "tr"),
    (Lang::Swe, "sv"),
    (Lang::Dan, "da"),
    (Lang::Fin, "fi"),
    (Lang::Heb, "he"),
    (Lang::Ara, "ar"),
    (Lang::Hin, "hi"),
    (Lang::Tha, "th"),
    (Lang::Vie, "vi"),
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum LanguageError {
    #[error("unsupported language code: {0}")]
    Unsupported(String),

    #[error("at least one language must be admitted")]
    Empty,
}

pub fn lang_to_code(lang: Lang) -> &'static str {
    CODES
        .iter()
        .find(|(l, _)| *l == lang)
        .map(|(_, code)| *code)
        .unwrap_or_else(|| lang.code())
}

/// Accepts ISO 639-1 (`en`) and ISO 639-3 (`eng`) codes.
pub fn code_to_lang(code: &str) -> Option<Lang> {
    let code = code.trim().to_lowercase();
    CODES
        .iter()
        .find(|(_, c)| *c == code)
        .map(|(l, _)| *l)
        .or_else(|| Lang::from_code(&code))
}

/// Admits text whose detected language is in a configured set.
///
/// The detector is built once, restricted to the candidate languages plus
/// the admitted ones. When nothing can be detected (no letters at all) the
/// text is treated as the first admitted language.
pub struct LanguageFilter {
    detector: Detector,
    admitted: Vec<Lang>,
}

impl LanguageFilter {
    pub fn new<S: AsRef<str>>(admitted_codes: &[S]) -> Result<Self, LanguageError> {
        let admitted = admitted_codes
            .iter()
            .map(|c| {
                code_to_lang(c.as_ref())
                    .ok_or_else(|| LanguageError::Unsupported(c.as_ref().to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if admitted.is_empty() {
            return Err(LanguageError::Empty);
        }

        let mut candidates = CANDIDATE_LANGUAGES.to_vec();
        for lang in &admitted {
            if !candidates.contains(lang) {
                candidates.push(*lang);
            }
        }

        Ok(Self {
            detector: Detector::with_allowlist(candidates),
            admitted,
        })
    }

    /// English only.
    pub fn english() -> Self {
        Self {
            detector: Detector::with_allowlist(CANDIDATE_LANGUAGES.to_vec()),
            admitted: vec![Lang::Eng],
        }
    }

    /// Best-effort detection; may be wrong for very short or mixed input.
    pub fn detect(&self, text: &str) -> Lang {
        match self.detector.detect(text) {
            Some(info) => {
                if !info.is_reliable() {
                    debug!(
                        lang = lang_to_code(info.lang()),
                        confidence = info.confidence(),
                        "Low-confidence language detection"
                    );
                }
                info.lang()
            }
            None => self.admitted[0],
        }
    }

    pub fn admits(&self, text: &str) -> bool {
        self.admitted.contains(&self.detect(text))
    }
}

impl fmt::Debug for LanguageFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LanguageFilter")
            .field("admitted", &self.admitted)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_english() {
        let filter = LanguageFilter::english();
        let text = "Critical vulnerability in popular VPN appliance is being exploited by attackers";
        assert_eq!(filter.detect(text), Lang::Eng);
        assert!(filter.admits(text));
    }

    #[test]
    fn test_rejects_spanish() {
        let filter = LanguageFilter::english();
        let text = "Esto es una prueba del sistema de detección de idiomas en español. Debería funcionar bien.";
        assert_eq!(filter.detect(text), Lang::Spa);
        assert!(!filter.admits(text));
    }

    #[test]
    fn test_configured_set_admits_german() {
        let filter = LanguageFilter::new(&["en", "de"]).unwrap();
        let text = "Die Sicherheitslücke wird bereits aktiv ausgenutzt, Administratoren sollten sofort aktualisieren.";
        assert!(filter.admits(text));
    }

    #[test]
    fn test_undetectable_text_falls_back_to_admitted() {
        let filter = LanguageFilter::english();
        assert!(filter.admits("1234 5678 !!!"));
        assert!(filter.admits(""));
    }

    #[test]
    fn test_unknown_code_rejected() {
        assert_eq!(
            LanguageFilter::new(&["klingon"]).unwrap_err(),
            LanguageError::Unsupported("klingon".to_string())
        );
        assert_eq!(
            LanguageFilter::new::<&str>(&[]).unwrap_err(),
            LanguageError::Empty
        );
    }

    #[test]
    fn test_code_mapping() {
        assert_eq!(code_to_lang("EN"), Some(Lang::Eng));
        assert_eq!(code_to_lang("deu"), Some(Lang::Deu));
        assert_eq!(lang_to_code(Lang::Fra), "fr");
    }
}
