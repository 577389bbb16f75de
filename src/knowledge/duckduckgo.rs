//! DuckDuckGo instant answers

use async_trait::async_trait;
use serde::Deserialize;
use tracing::trace;

use super::{non_empty, KnowledgeError, KnowledgeSource};

/// Public instant-answer endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.duckduckgo.com";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    abstract_text: Option<String>,
    #[serde(default)]
    related_topics: Vec<RelatedTopic>,
}

/// Related topics are either entries with `Text` or named groups of entries
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RelatedTopic {
    #[serde(default)]
    text: Option<String>,
}

impl InstantAnswer {
    /// The abstract, else the first related topic's text
    fn best_text(self) -> Option<String> {
        non_empty(self.abstract_text).or_else(|| {
            self.related_topics
                .into_iter()
                .next()
                .and_then(|topic| non_empty(topic.text))
        })
    }
}

/// Instant-answer lookups against the DuckDuckGo JSON API
pub struct DuckDuckGoSource {
    client: reqwest::Client,
    base_url: String,
}

impl DuckDuckGoSource {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl KnowledgeSource for DuckDuckGoSource {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn lookup(&self, query: &str) -> Result<Option<String>, KnowledgeError> {
        trace!(query, "duckduckgo instant answer request");

        let response = self
            .client
            .get(format!("{}/", self.base_url))
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await
            .map_err(|e| KnowledgeError::Http(format!("duckduckgo request failed: {e}")))?
            .error_for_status()
            .map_err(|e| KnowledgeError::Http(format!("duckduckgo HTTP error: {e}")))?;

        // Served as application/x-javascript, so decode the text by hand.
        let body = response
            .text()
            .await
            .map_err(|e| KnowledgeError::Http(format!("duckduckgo response read failed: {e}")))?;

        let answer: InstantAnswer = serde_json::from_str(&body)
            .map_err(|e| KnowledgeError::Parse(format!("duckduckgo answer: {e}")))?;

        Ok(answer.best_text())
    }
}
