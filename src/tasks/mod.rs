//! Crawl task entry points
//!
//! This module glues the crawl pipeline together: validate input, resolve the
//! canonical keyword, crawl the search API, persist every record, and hand
//! each stored row to the downstream processing queue.

use anyhow::{Context, Result};

use crate::crawler::NytCrawler;
use crate::models::{CrawlSummary, Language};
use crate::queue::ProcessQueue;
use crate::storage::{CrawlRepository, KeywordRepository};
use crate::utils::error::ValidationError;
use crate::utils::truncate_text;

/// Crawl one keyword and feed the results downstream
///
/// Input is validated before any network call: an empty keyword or an
/// unsupported language code fails fast with a [`ValidationError`]. The crawl
/// itself never fails: an aborted page chain yields a partial record list,
/// and the summary reflects whatever was fetched. Each record is
/// persisted and then dispatched as a `process-crawl` task; dispatch failures
/// are counted, not fatal.
///
/// # Errors
///
/// Returns an error for invalid input or when persistence fails.
pub async fn crawl_keyword<R, Q>(
    crawler: &NytCrawler,
    repository: &R,
    queue: &Q,
    keyword_string: &str,
    language: &str,
    limit: usize,
) -> Result<CrawlSummary>
where
    R: KeywordRepository + CrawlRepository + ?Sized,
    Q: ProcessQueue + ?Sized,
{
    let trimmed = keyword_string.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidKeyword.into());
    }

    let language = Language::parse(language)
        .ok_or_else(|| ValidationError::UnsupportedLanguage(language.to_string()))?;

    let keyword = repository
        .resolve_keyword(trimmed, language)
        .context("Failed to resolve keyword")?;

    tracing::info!(
        keyword = %keyword.keyword_string,
        language = %keyword.language,
        limit,
        "Starting keyword crawl"
    );

    let outcome = crawler
        .crawl(&keyword.keyword_string, keyword.language, limit)
        .await;

    let mut summary = CrawlSummary {
        keyword_string: keyword.keyword_string.clone(),
        language: Some(keyword.language),
        pages_fetched: outcome.pages_fetched,
        documents_seen: outcome.documents_seen,
        skipped: outcome.skipped,
        aborted: outcome.aborted,
        ..Default::default()
    };

    for record in &outcome.records {
        let stored = repository
            .save_crawl(record)
            .context("Failed to persist crawl record")?;
        summary.stored += 1;

        tracing::debug!(
            article_id = %stored.article_id,
            text = %truncate_text(&stored.text, 60),
            "Stored crawl record"
        );

        match queue.dispatch(&stored).await {
            Ok(()) => summary.dispatched += 1,
            Err(e) => {
                tracing::warn!(
                    article_id = %stored.article_id,
                    error = %e,
                    "Failed to dispatch process-crawl task"
                );
                summary.dispatch_failures += 1;
            }
        }
    }

    tracing::info!(
        keyword = %summary.keyword_string,
        pages_fetched = summary.pages_fetched,
        stored = summary.stored,
        skipped = summary.skipped,
        dispatched = summary.dispatched,
        aborted = summary.aborted,
        "Keyword crawl complete"
    );

    Ok(summary)
}
