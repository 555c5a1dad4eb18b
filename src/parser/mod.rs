//! Raw document normalization
//!
//! This module converts raw search documents into [`ArticleRecord`]s. A
//! document that cannot produce a record is skipped with an explicit reason,
//! never an error: malformed documents must not abort the page or the crawl.

use crate::crawler::response::RawDocument;
use crate::models::{ArticleRecord, Language};

/// Why a raw document produced no record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Identifier field absent
    MissingId,

    /// Snippet field absent
    MissingText,

    /// Snippet present but empty
    EmptyText,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Self::MissingId => "missing id",
            Self::MissingText => "missing text",
            Self::EmptyText => "empty text",
        };
        write!(f, "{reason}")
    }
}

/// Normalization result: a valid record or an explained skip
#[derive(Debug, Clone)]
pub enum Normalized {
    Record(ArticleRecord),
    Skipped(SkipReason),
}

impl Normalized {
    /// Extract the record, discarding skip information
    pub fn into_record(self) -> Option<ArticleRecord> {
        match self {
            Self::Record(record) => Some(record),
            Self::Skipped(_) => None,
        }
    }
}

/// Normalize one raw search document
///
/// The article id is the segment after the final `/` of the provider
/// identifier (`nyt://article/84e7a531-...` yields `84e7a531-...`). A
/// document without an id or text, or with empty text, is skipped.
pub fn normalize_document(
    keyword_string: &str,
    language: Language,
    doc: &RawDocument,
) -> Normalized {
    let Some(raw_id) = doc.id.as_deref() else {
        return Normalized::Skipped(SkipReason::MissingId);
    };

    let Some(text) = doc.snippet.as_deref() else {
        return Normalized::Skipped(SkipReason::MissingText);
    };

    if text.is_empty() {
        return Normalized::Skipped(SkipReason::EmptyText);
    }

    let article_id = raw_id.rsplit('/').next().unwrap_or(raw_id);

    Normalized::Record(ArticleRecord {
        article_id: article_id.to_string(),
        keyword_string: keyword_string.to_string(),
        language,
        text: text.to_string(),
    })
}
