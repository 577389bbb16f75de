//! Wikipedia REST page summaries

use async_trait::async_trait;
use serde::Deserialize;
use tracing::trace;

use super::{non_empty, KnowledgeError, KnowledgeSource};

/// Public REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://en.wikipedia.org/api/rest_v1";

#[derive(Debug, Deserialize)]
struct PageSummary {
    #[serde(default)]
    extract: Option<String>,
}

/// Looks queries up as page titles and returns the summary extract
pub struct WikipediaSource {
    client: reqwest::Client,
    base_url: String,
}

impl WikipediaSource {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn summary_url(&self, query: &str) -> String {
        format!(
            "{}/page/summary/{}",
            self.base_url,
            urlencoding::encode(query)
        )
    }
}

#[async_trait]
impl KnowledgeSource for WikipediaSource {
    fn name(&self) -> &str {
        "wikipedia"
    }

    async fn lookup(&self, query: &str) -> Result<Option<String>, KnowledgeError> {
        let url = self.summary_url(query);
        trace!(%url, "wikipedia summary request");

        // A missing page still answers with JSON, just without an extract.
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| KnowledgeError::Http(format!("wikipedia request failed: {e}")))?;

        let body = response
            .text()
            .await
            .map_err(|e| KnowledgeError::Http(format!("wikipedia response read failed: {e}")))?;

        let summary: PageSummary = serde_json::from_str(&body)
            .map_err(|e| KnowledgeError::Parse(format!("wikipedia summary: {e}")))?;

        Ok(non_empty(summary.extract))
    }
}
