use crate::entities::Category;

pub const CYBERSECURITY_SOURCES: &[&str] = &[
    "https://www.bleepingcomputer.com/feed/",
    "https://feeds.feedburner.com/TheHackersNews",
    "https://blogs.cisco.com/security/feed",
    "https://www.wired.com/feed/category/security/latest/rss",
    "https://www.securityweek.com/feed/",
    "https://news.sophos.com/en-us/feed/",
    "https://www.csoonline.com/feed/",
];

pub const TECH_SOURCES: &[&str] = &[
    "https://www.theverge.com/rss/index.xml",
    "https://techcrunch.com/feed/",
    "https://arstechnica.com/feed/",
    "http://www.engadget.com/rss-full.xml",
    "http://www.fastcodesign.com/rss.xml",
    "http://www.forbes.com/entrepreneurs/index.xml",
    "https://blog.pragmaticengineer.com/rss/",
    "https://browser.engineering/rss.xml",
    "https://githubengineering.com/atom.xml",
    "https://joshwcomeau.com/rss.xml",
    "https://jvns.ca/atom.xml",
    "https://overreacted.io/rss.xml",
    "https://signal.org/blog/rss.xml",
    "https://slack.engineering/feed",
    "https://shopifyengineering.myshopify.com/blogs/engineering.atom",
    "https://stripe.com/blog/feed.rss",
    "https://www.uber.com/blog/engineering/rss/",
];

/// Maps a feed URL to its category by exact membership in fixed source lists.
#[derive(Debug, Clone)]
pub struct CategoryClassifier {
    lists: Vec<(Category, Vec<String>)>,
    fallback: Category,
}

impl CategoryClassifier {
    /// Lists are checked in order; the first containing the source wins.
    pub fn new(lists: Vec<(Category, Vec<String>)>, fallback: Category) -> Self {
        Self { lists, fallback }
    }

    pub fn classify(&self, source_url: &str) -> Category {
        self.lists
            .iter()
            .find(|(_, sources)| sources.iter().any(|s| s == source_url))
            .map(|(category, _)| *category)
            .unwrap_or(self.fallback)
    }
}

impl Default for CategoryClassifier {
    fn default() -> Self {
        let owned = |list: &[&str]| -> Vec<String> { list.iter().map(|s| s.to_string()).collect() };
        Self::new(
            vec![
                (Category::Cybersecurity, owned(CYBERSECURITY_SOURCES)),
                (Category::Tech, owned(TECH_SOURCES)),
            ],
            Category::General,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_sources() {
        let classifier = CategoryClassifier::default();
        assert_eq!(
            classifier.classify("https://www.bleepingcomputer.com/feed/"),
            Category::Cybersecurity
        );
        assert_eq!(classifier.classify("https://jvns.ca/atom.xml"), Category::Tech);
    }

    #[test]
    fn test_unknown_source_is_general() {
        let classifier = CategoryClassifier::default();
        assert_eq!(classifier.classify("https://example.com/rss"), Category::General);
    }

    #[test]
    fn test_match_is_exact() {
        let classifier = CategoryClassifier::default();
        // trailing slash and scheme differences are distinct sources
        assert_eq!(
            classifier.classify("https://www.bleepingcomputer.com/feed"),
            Category::General
        );
        assert_eq!(
            classifier.classify("http://www.bleepingcomputer.com/feed/"),
            Category::General
        );
    }
}
