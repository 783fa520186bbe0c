//! Strategy trait abstraction
//!
//! Defines a common interface for all answer-producing strategies, enabling
//! fair benchmarking. The adapter wrapper normalizes every failure mode into
//! an error-carrying result so the runner never has to handle a panic or an
//! `Err` from a strategy call.

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// One FAQ entry consulted while producing an answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerSource {
    /// FAQ entry id
    pub source_id: String,
    /// FAQ entry question text
    pub source_question: String,
    /// Retrieval score for this entry, in [0, 1]
    pub score: f64,
}

/// Result of one strategy invocation on one question
///
/// `error` present means the call failed and `answer` is unusable; scoring
/// treats such a result as all-zero. Failure is always a fault, never a
/// positive signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerResult {
    /// Answer text (may be empty)
    pub answer: String,
    /// Strategy-reported confidence in [0, 1]; meaning is strategy-specific
    pub confidence: f64,
    /// Name of the strategy that produced this result
    pub strategy_name: String,
    /// FAQ entries consulted, best first (possibly empty)
    #[serde(default)]
    pub sources: Vec<AnswerSource>,
    /// Failure description, present when the call failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnswerResult {
    /// Error-carrying result for a failed or unavailable strategy call
    pub fn failed(strategy_name: &str, error: impl Into<String>) -> Self {
        Self {
            answer: String::new(),
            confidence: 0.0,
            strategy_name: strategy_name.to_string(),
            sources: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Unified trait for answer-producing strategies
///
/// All strategy implementations must implement this trait to participate in
/// the benchmark. This ensures fair comparison across different approaches.
#[async_trait::async_trait]
pub trait Strategy: Send + Sync {
    /// Get the name of this strategy
    fn name(&self) -> &str;

    /// One-line description for `list-strategies`
    fn description(&self) -> &str;

    /// Produce an answer for a question
    ///
    /// Implementations may fail; the adapter converts any `Err` into an
    /// error-carrying `AnswerResult` before it reaches the runner.
    async fn answer(&self, question: &str) -> Result<AnswerResult>;
}

/// Fault-normalizing wrapper around a strategy
///
/// The runner relies on this invariant: `answer()` never fails. Any `Err`
/// from the inner strategy is caught here and converted into an
/// `AnswerResult` with `error` set, empty answer, and zero confidence.
pub struct StrategyAdapter {
    inner: Box<dyn Strategy>,
}

impl StrategyAdapter {
    pub fn new(inner: Box<dyn Strategy>) -> Self {
        Self { inner }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn description(&self) -> &str {
        self.inner.description()
    }

    /// Invoke the inner strategy, absorbing any failure
    pub async fn answer(&self, question: &str) -> AnswerResult {
        match self.inner.answer(question).await {
            Ok(mut result) => {
                // Keep the reported confidence inside [0, 1]
                result.confidence = result.confidence.clamp(0.0, 1.0);
                result
            }
            Err(e) => {
                tracing::warn!("strategy '{}' failed: {:#}", self.inner.name(), e);
                AnswerResult::failed(self.inner.name(), format!("{:#}", e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStrategy;

    #[async_trait::async_trait]
    impl Strategy for FailingStrategy {
        fn name(&self) -> &str {
            "failing"
        }

        fn description(&self) -> &str {
            "always fails"
        }

        async fn answer(&self, _question: &str) -> Result<AnswerResult> {
            anyhow::bail!("backend exploded")
        }
    }

    struct OverconfidentStrategy;

    #[async_trait::async_trait]
    impl Strategy for OverconfidentStrategy {
        fn name(&self) -> &str {
            "overconfident"
        }

        fn description(&self) -> &str {
            "reports confidence above 1"
        }

        async fn answer(&self, _question: &str) -> Result<AnswerResult> {
            Ok(AnswerResult {
                answer: "Bien sûr.".to_string(),
                confidence: 3.7,
                strategy_name: "overconfident".to_string(),
                sources: Vec::new(),
                error: None,
            })
        }
    }

    #[tokio::test]
    async fn test_adapter_absorbs_strategy_failure() {
        let adapter = StrategyAdapter::new(Box::new(FailingStrategy));
        let result = adapter.answer("peu importe ?").await;

        assert!(result.is_error());
        assert_eq!(result.answer, "");
        assert_eq!(result.confidence, 0.0);
        assert!(result.error.unwrap().contains("backend exploded"));
    }

    #[tokio::test]
    async fn test_adapter_clamps_confidence() {
        let adapter = StrategyAdapter::new(Box::new(OverconfidentStrategy));
        let result = adapter.answer("peu importe ?").await;

        assert!(!result.is_error());
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn test_failed_result_shape() {
        let result = AnswerResult::failed("rag", "strategy unavailable");
        assert!(result.is_error());
        assert!(result.answer.is_empty());
        assert!(result.sources.is_empty());
        assert_eq!(result.strategy_name, "rag");
    }
}
