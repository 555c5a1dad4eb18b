//! Article search response classification
//!
//! The provider answers every search request with a JSON body that is one of
//! three things: a fault envelope (rate limit or quota rejection), a status
//! envelope that is not `OK`, or a result page. Classification is pure; it
//! never looks at the HTTP status line, because fault bodies arrive on
//! non-success codes and must still be read.

use serde::Deserialize;

/// Parsed search response body
///
/// Only the fields the classifier consumes are deserialized; everything else
/// in the provider payload is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchBody {
    #[serde(default)]
    pub fault: Option<Fault>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub response: Option<SearchResults>,
}

/// Provider-signaled rejection (rate limit, quota exceeded)
#[derive(Debug, Clone, Deserialize)]
pub struct Fault {
    /// Human-readable rejection reason
    #[serde(rename = "faultstring", default)]
    pub faultstring: String,
}

/// Result payload carrying the per-page document list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub docs: Vec<RawDocument>,
}

/// One raw article document as returned by the provider
///
/// Opaque beyond the two fields the normalizer consumes: the identifier of
/// the form `scheme://type/UUID` and the snippet text.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDocument {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,

    #[serde(default)]
    pub snippet: Option<String>,
}

/// Classification of one search response body
#[derive(Debug, Clone)]
pub enum PageOutcome {
    /// Provider rejected the request; carries the fault string
    Fault(String),

    /// Status field present and not `"OK"`
    UnexpectedStatus(String),

    /// Valid result page with its ordered document list
    Ok(Vec<RawDocument>),
}

/// Classify a parsed response body
///
/// A `fault` entry wins over everything else; a non-`OK` status is
/// unrecoverable for the page; otherwise the documents at `response.docs`
/// are exposed (an absent path reads as an empty page).
pub fn classify(body: SearchBody) -> PageOutcome {
    if let Some(fault) = body.fault {
        return PageOutcome::Fault(fault.faultstring);
    }

    if let Some(status) = body.status {
        if status != "OK" {
            return PageOutcome::UnexpectedStatus(status);
        }
    }

    let docs = body.response.map(|r| r.docs).unwrap_or_default();
    PageOutcome::Ok(docs)
}
