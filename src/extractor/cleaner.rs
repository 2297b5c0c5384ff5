use ammonia::Builder;
use regex::Regex;
use scraper::Html;
use std::{collections::HashSet, sync::LazyLock};

static WHITESPACE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Failed to compile whitespace regex"));

/// Strip all markup from feed text and return plain text.
///
/// Tags are dropped but their text content is kept, except for `script` and
/// `style` whose content is dropped with them. Entities are decoded and
/// whitespace runs collapse to a single space. Malformed markup is parsed
/// leniently, so this never fails.
pub fn sanitize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    // Ammonia with no allowed tags leaves entity-escaped text only
    let mut builder = Builder::empty();
    builder.clean_content_tags(HashSet::from(["script", "style"]));
    let escaped = builder.clean(raw).to_string();

    // Parse the escaped text back to decode entities
    let fragment = Html::parse_fragment(&escaped);
    let text: String = fragment.root_element().text().collect();

    normalize_whitespace(&text)
}

pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_REGEX.replace_all(text.trim(), " ").into_owned()
}


#[cfg(feature = "fuzz")]
mod fuzz {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_sanitize_never_panics(raw in ".*") {
            let _ = sanitize(&raw);
        }

        #[test]
        fn test_sanitize_is_idempotent_on_plain_words(raw in "[a-zA-Z ]{0,64}") {
            let once = sanitize(&raw);
            prop_assert_eq!(sanitize(&once), once);
        }
    }
}
