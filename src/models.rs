// Core data structures for the gale crawler

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Languages the crawler accepts for keyword targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    De,
    Fr,
    Es,
}

impl Language {
    /// Create from a language code
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "en" => Some(Self::En),
            "de" => Some(Self::De),
            "fr" => Some(Self::Fr),
            "es" => Some(Self::Es),
            _ => None,
        }
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::De => "de",
            Self::Fr => "fr",
            Self::Es => "es",
        }
    }

    /// Get all supported languages
    pub fn all() -> Vec<Self> {
        vec![Self::En, Self::De, Self::Fr, Self::Es]
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Canonical crawl target resolved by the keyword repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub id: i64,
    pub keyword_string: String,
    pub language: Language,
}

/// Normalized article produced from one raw search document
///
/// `text` is always non-empty and `article_id` is the segment after the
/// final `/` of the provider identifier; documents that cannot satisfy
/// either are dropped during normalization, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub article_id: String,
    pub keyword_string: String,
    pub language: Language,
    pub text: String,
}

impl ArticleRecord {
    /// Calculate content hash using SHA256
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.text.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Persisted crawl row handed to the downstream processing queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredCrawl {
    pub id: i64,
    pub article_id: String,
    pub keyword_string: String,
    pub language: Language,
    pub text: String,
    pub content_hash: String,
    pub crawled_at: DateTime<Utc>,
}

/// Outcome counters for one keyword crawl
#[derive(Debug, Clone, Default, Serialize)]
pub struct CrawlSummary {
    pub keyword_string: String,
    pub language: Option<Language>,
    pub pages_fetched: u32,
    pub documents_seen: u32,
    pub skipped: u32,
    pub stored: u32,
    pub dispatched: u32,
    pub dispatch_failures: u32,
    /// Pagination stopped early on an aborted page chain
    pub aborted: bool,
}

impl CrawlSummary {
    /// Fraction of seen documents that were dropped during normalization
    pub fn skip_rate(&self) -> f64 {
        if self.documents_seen == 0 {
            0.0
        } else {
            self.skipped as f64 / self.documents_seen as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parse() {
        assert_eq!(Language::parse("en"), Some(Language::En));
        assert_eq!(Language::parse("EN"), Some(Language::En));
        assert_eq!(Language::parse("de"), Some(Language::De));
        assert_eq!(Language::parse("xx"), None);
        assert_eq!(Language::parse(""), None);
    }

    #[test]
    fn test_language_roundtrip() {
        for language in Language::all() {
            assert_eq!(Language::parse(language.as_str()), Some(language));
        }
    }

    #[test]
    fn test_language_serde_lowercase() {
        let json = serde_json::to_string(&Language::En).unwrap();
        assert_eq!(json, "\"en\"");

        let parsed: Language = serde_json::from_str("\"de\"").unwrap();
        assert_eq!(parsed, Language::De);
    }

    #[test]
    fn test_content_hash() {
        let record = ArticleRecord {
            article_id: "84e7a531-986a-5293-b7a7-c343466738a0".to_string(),
            keyword_string: "House".to_string(),
            language: Language::En,
            text: "some snippet".to_string(),
        };
        let hash = record.content_hash();
        assert_eq!(hash.len(), 64); // SHA256 hex = 64 chars

        // Equal text yields equal hashes
        let other = ArticleRecord {
            article_id: "different".to_string(),
            ..record.clone()
        };
        assert_eq!(hash, other.content_hash());
    }

    #[test]
    fn test_skip_rate() {
        let summary = CrawlSummary {
            documents_seen: 10,
            skipped: 3,
            ..Default::default()
        };
        assert_eq!(summary.skip_rate(), 0.3);

        let empty = CrawlSummary::default();
        assert_eq!(empty.skip_rate(), 0.0);
    }
}
