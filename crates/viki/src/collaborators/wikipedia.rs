//! Encyclopedia lookup through the MediaWiki query API.
//!
//! One search request per call: the best match for the topic comes back with
//! its plain-text intro and page properties, which tell disambiguation pages
//! apart from articles.

use crate::config::KnowledgeConfig;

use std::{panic::Location, time::Duration};

use error_location::ErrorLocation;
use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{debug, instrument, warn};
use url::Url;
use viki_core::{CoreError, CoreResult, dialog::KnowledgeLookup};

const USER_AGENT: &str = concat!("viki/", env!("CARGO_PKG_VERSION"));

/// [`KnowledgeLookup`] backed by Wikipedia.
///
/// Requests block, so calls must come from worker threads, never from the
/// async runtime.
#[derive(Debug, Clone)]
pub struct WikipediaLookup {
    api_endpoint: String,
    article_base: String,
    timeout: Duration,
}

/// The best search hit for a topic.
struct Article {
    title: String,
    extract: String,
}

impl WikipediaLookup {
    /// Lookup against the configured endpoint.
    pub fn new(config: &KnowledgeConfig) -> Self {
        Self {
            api_endpoint: config.api_endpoint.clone(),
            article_base: config.article_base.clone(),
            timeout: Duration::from_secs(config.timeout_secs.max(1)),
        }
    }

    #[track_caller]
    fn search(&self, topic: &str) -> CoreResult<Article> {
        let caller = Location::caller();
        let unavailable = |reason: String| CoreError::ServiceUnavailable {
            reason,
            location: ErrorLocation::from(caller),
        };

        // Built per request: the blocking client owns a runtime that must not
        // be dropped inside the shell's async thread.
        let client = Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| unavailable(format!("HTTP client: {}", e)))?;

        let body: Value = client
            .get(&self.api_endpoint)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("generator", "search"),
                ("gsrsearch", topic),
                ("gsrlimit", "1"),
                ("prop", "extracts|pageprops"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("redirects", "1"),
            ])
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.json())
            .map_err(|e| unavailable(e.to_string()))?;

        parse_article(&body, topic)
    }
}

impl KnowledgeLookup for WikipediaLookup {
    #[instrument(skip(self))]
    fn summarize(&self, topic: &str, sentences: usize) -> CoreResult<String> {
        let article = self.search(topic).inspect_err(|e| {
            if !matches!(e, CoreError::NotFound { .. } | CoreError::Ambiguous { .. }) {
                warn!(error = %e, "Summary request failed");
            }
        })?;
        debug!(title = %article.title, "Summary found");
        Ok(first_sentences(&article.extract, sentences))
    }

    #[instrument(skip(self))]
    fn resolve_link(&self, topic: &str) -> CoreResult<String> {
        let article = self.search(topic)?;
        let raw = format!("{}{}", self.article_base, article.title.replace(' ', "_"));
        // Url percent-encodes titles with spaces or non-ASCII characters.
        Ok(Url::parse(&raw).map(String::from).unwrap_or(raw))
    }
}

/// Summary text of the best hit in a query response.
#[cfg(test)]
#[track_caller]
pub(crate) fn parse_summary(body: &Value, topic: &str, sentences: usize) -> CoreResult<String> {
    parse_article(body, topic).map(|article| first_sentences(&article.extract, sentences))
}

#[track_caller]
fn parse_article(body: &Value, topic: &str) -> CoreResult<Article> {
    let caller = Location::caller();
    let not_found = || CoreError::NotFound {
        item: topic.to_string(),
        location: ErrorLocation::from(caller),
    };

    let page = body
        .pointer("/query/pages")
        .and_then(Value::as_array)
        .and_then(|pages| {
            pages
                .iter()
                .min_by_key(|page| page.get("index").and_then(Value::as_u64).unwrap_or(u64::MAX))
        })
        .ok_or_else(not_found)?;

    if page.get("missing").is_some() {
        return Err(not_found());
    }

    if page.pointer("/pageprops/disambiguation").is_some() {
        return Err(CoreError::Ambiguous {
            topic: topic.to_string(),
            location: ErrorLocation::from(caller),
        });
    }

    let title = page
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or(topic)
        .to_string();
    let extract = page
        .get("extract")
        .and_then(Value::as_str)
        .map(str::trim)
        .unwrap_or_default();
    if extract.is_empty() {
        return Err(not_found());
    }

    Ok(Article {
        title,
        extract: extract.to_string(),
    })
}

/// The first `count` sentences of `text`.
///
/// A sentence ends at `.`, `!` or `?` followed by whitespace or the end of
/// the text.
pub(crate) fn first_sentences(text: &str, count: usize) -> String {
    let text = text.trim();
    if count == 0 {
        return String::new();
    }

    let mut seen = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if !matches!(c, '.' | '!' | '?') {
            continue;
        }
        let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
        if at_boundary {
            seen += 1;
            if seen == count {
                return text[..i + c.len_utf8()].to_string();
            }
        }
    }

    text.to_string()
}
