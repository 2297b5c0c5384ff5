use crate::entities::Article;

pub const HEADER: &str = "Title,Description,URL,Source,Category,Published At,Rank\r\n";

/// One CRLF-terminated CSV record.
pub fn record(article: &Article) -> String {
    let fields = [
        escape(&article.title),
        escape(&article.description),
        escape(&article.url),
        escape(&article.source_url),
        escape(article.category.as_str()),
        article.published_at.to_rfc3339(),
        article.rank.to_string(),
    ];
    let mut line = fields.join(",");
    line.push_str("\r\n");
    line
}

/// Quote a field when it contains a delimiter, quote or line break.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Category;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("a,b"), "\"a,b\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(escape("two\nlines"), "\"two\nlines\"");
    }

    #[test]
    fn test_record_layout() {
        let article = Article {
            title: "Patch now, or else".to_string(),
            description: "Details".to_string(),
            summary: None,
            image_url: None,
            url: "https://example.com/a".to_string(),
            source_url: "https://example.com/feed".to_string(),
            published_at: Utc.with_ymd_and_hms(2025, 1, 7, 10, 30, 0).unwrap(),
            rank: 8,
            category: Category::Cybersecurity,
        };
        assert_eq!(
            record(&article),
            "\"Patch now, or else\",Details,https://example.com/a,https://example.com/feed,Cybersecurity,2025-01-07T10:30:00+00:00,8\r\n"
        );
    }
}
