//! Knowledge module for open-domain questions
//!
//! Questions that match no command are looked up against two external
//! sources in order: an encyclopedic summary first, an instant-answer
//! service second. The first usable text wins.

mod chain;
mod duckduckgo;
mod wikipedia;

use std::time::Duration;

use async_trait::async_trait;

pub use chain::KnowledgeChain;
pub use duckduckgo::{DuckDuckGoSource, DEFAULT_BASE_URL as DEFAULT_DUCKDUCKGO_URL};
pub use wikipedia::{WikipediaSource, DEFAULT_BASE_URL as DEFAULT_WIKIPEDIA_URL};

#[cfg(test)]
pub(crate) use chain::tests::StubSource;

/// Outcome of a lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryResult {
    Found(String),
    NotFound,
}

/// Errors a knowledge source can report
#[derive(Debug, thiserror::Error)]
pub enum KnowledgeError {
    /// The request could not be sent or the server returned an error status
    #[error("HTTP error: {0}")]
    Http(String),

    /// The response body was not the expected JSON
    #[error("parse error: {0}")]
    Parse(String),
}

/// An external source of short textual answers
#[async_trait]
pub trait KnowledgeSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Look a normalized query up; `Ok(None)` means the source had nothing
    async fn lookup(&self, query: &str) -> Result<Option<String>, KnowledgeError>;
}

/// Build the HTTP client shared by both sources
pub fn build_client(user_agent: &str) -> Result<reqwest::Client, KnowledgeError> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|e| KnowledgeError::Http(format!("failed to build HTTP client: {e}")))
}

/// Treat whitespace-only text as missing
fn non_empty(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}
