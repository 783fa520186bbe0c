//! Benchmark configuration
//!
//! All tuning lives in one explicit structure loaded once at startup from
//! TOML; every field has a documented default so an empty file is valid.
//!
//! ```toml
//! strategies = ["retrieval", "extractive"]
//! top_k = 3
//! confidence_threshold = 0.5
//! timeout_ms = 30000
//!
//! [weights]
//! correctness = 0.30
//! relevance = 0.20
//! non_hallucination = 0.20
//! latency = 0.15
//! ignorance_admission = 0.15
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::scoring::ScoringWeights;

/// Top-level configuration for a benchmark + evaluation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchConfig {
    /// Strategy names to benchmark, in execution order
    #[serde(default = "default_strategies")]
    pub strategies: Vec<String>,

    /// FAQ entries retrieved per question by the built-in strategies
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Retrieval score below which a strategy answers with the
    /// no-information sentence instead of a FAQ answer
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,

    /// Hard per-call timeout in milliseconds; a slower strategy call is
    /// recorded as an error result and the run continues
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Criterion weights for the overall score (must sum to 1.00)
    #[serde(default)]
    pub weights: ScoringWeights,
}

fn default_strategies() -> Vec<String> {
    vec!["retrieval".to_string(), "extractive".to_string()]
}
fn default_top_k() -> usize {
    3
}
fn default_confidence_threshold() -> f64 {
    0.5
}
fn default_timeout_ms() -> u64 {
    30_000
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            strategies: default_strategies(),
            top_k: default_top_k(),
            confidence_threshold: default_confidence_threshold(),
            timeout_ms: default_timeout_ms(),
            weights: ScoringWeights::default(),
        }
    }
}

impl BenchConfig {
    /// Load config from a TOML file and validate it
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from the given path if it exists, otherwise return defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration invariants (fatal before any run begins)
    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        if self.top_k == 0 {
            anyhow::bail!("top_k must be at least 1");
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            anyhow::bail!(
                "confidence_threshold must be in [0, 1], got {}",
                self.confidence_threshold
            );
        }
        Ok(())
    }
}
