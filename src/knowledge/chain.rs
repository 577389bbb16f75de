//! Two-stage short-circuiting lookup

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{KnowledgeError, KnowledgeSource, QueryResult};

/// Primary source first, secondary only when the primary has nothing
///
/// A failing primary is logged and skipped. A failing secondary is returned
/// to the caller, since there is nothing left to fall back to.
pub struct KnowledgeChain {
    primary: Arc<dyn KnowledgeSource>,
    secondary: Arc<dyn KnowledgeSource>,
}

impl KnowledgeChain {
    pub fn new(primary: Arc<dyn KnowledgeSource>, secondary: Arc<dyn KnowledgeSource>) -> Self {
        Self { primary, secondary }
    }

    pub async fn lookup(&self, query: &str) -> Result<QueryResult, KnowledgeError> {
        if query.is_empty() {
            debug!("empty query, skipping lookup");
            return Ok(QueryResult::NotFound);
        }

        match self.primary.lookup(query).await {
            Ok(Some(text)) => {
                info!(source = self.primary.name(), "knowledge lookup answered");
                return Ok(QueryResult::Found(text));
            }
            Ok(None) => {
                debug!(source = self.primary.name(), "no answer, falling back");
            }
            Err(e) => {
                warn!(%e, source = self.primary.name(), "knowledge source failed, falling back");
            }
        }

        match self.secondary.lookup(query).await? {
            Some(text) => {
                info!(source = self.secondary.name(), "knowledge lookup answered");
                Ok(QueryResult::Found(text))
            }
            None => {
                info!("knowledge lookup found nothing");
                Ok(QueryResult::NotFound)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    /// Canned reply plus a call counter
    pub(crate) struct StubSource {
        reply: Result<Option<String>, String>,
        pub calls: AtomicUsize,
    }

    impl StubSource {
        pub(crate) fn answering(text: &str) -> Arc<Self> {
            Self::with(Ok(Some(text.to_string())))
        }

        pub(crate) fn empty() -> Arc<Self> {
            Self::with(Ok(None))
        }

        pub(crate) fn failing() -> Arc<Self> {
            Self::with(Err("connection refused".to_string()))
        }

        fn with(reply: Result<Option<String>, String>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: AtomicUsize::new(0),
            })
        }

        pub(crate) fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl KnowledgeSource for StubSource {
        fn name(&self) -> &str {
            "stub"
        }

        async fn lookup(&self, _query: &str) -> Result<Option<String>, KnowledgeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().map_err(KnowledgeError::Http)
        }
    }

    #[tokio::test]
    async fn test_primary_answer_short_circuits() {
        let primary = StubSource::answering("Alan Turing was a mathematician.");
        let secondary = StubSource::answering("unused");
        let chain = KnowledgeChain::new(primary.clone(), secondary.clone());

        let result = chain.lookup("turing").await.unwrap();

        assert_eq!(
            result,
            QueryResult::Found("Alan Turing was a mathematician.".into())
        );
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_primary_falls_back() {
        let primary = StubSource::empty();
        let secondary = StubSource::answering("From the instant answer.");
        let chain = KnowledgeChain::new(primary.clone(), secondary.clone());

        let result = chain.lookup("turing").await.unwrap();

        assert_eq!(result, QueryResult::Found("From the instant answer.".into()));
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn test_failing_primary_falls_back() {
        let primary = StubSource::failing();
        let secondary = StubSource::answering("Fallback answer.");
        let chain = KnowledgeChain::new(primary.clone(), secondary.clone());

        let result = chain.lookup("turing").await.unwrap();

        assert_eq!(result, QueryResult::Found("Fallback answer.".into()));
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 1);
    }

    #[tokio::test]
    async fn test_both_empty_is_not_found() {
        let chain = KnowledgeChain::new(StubSource::empty(), StubSource::empty());
        assert_eq!(chain.lookup("turing").await.unwrap(), QueryResult::NotFound);
    }

    #[tokio::test]
    async fn test_failing_secondary_is_reported() {
        let chain = KnowledgeChain::new(StubSource::failing(), StubSource::failing());
        assert!(chain.lookup("turing").await.is_err());
    }

    #[tokio::test]
    async fn test_empty_query_skips_sources() {
        let primary = StubSource::answering("unused");
        let secondary = StubSource::answering("unused");
        let chain = KnowledgeChain::new(primary.clone(), secondary.clone());

        assert_eq!(chain.lookup("").await.unwrap(), QueryResult::NotFound);
        assert_eq!(primary.calls() + secondary.calls(), 0);
    }
}
