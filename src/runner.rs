//! Benchmark runner
//!
//! Iterates the cross-product of golden-set questions and configured
//! strategies, invoking each adapter under wall-clock timing, and produces
//! one immutable `BenchmarkRecord` per pair. A fault in one pair never
//! aborts the run; the record carries the error and execution continues.
//!
//! Iteration is question-major, strategy-minor (all strategies run per
//! question before advancing). The ordering is not semantically required
//! but keeps logs reproducible; records are additionally sorted by
//! (question_id, strategy_name) before persisting.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::config::BenchConfig;
use crate::golden::{GoldenQuestion, GoldenSet, QuestionType};
use crate::strategies::StrategyAdapter;

/// One strategy execution on one question, the run's durable artifact unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkRecord {
    pub question_id: String,
    pub question: String,
    pub question_type: QuestionType,
    pub strategy_name: String,
    /// Answer text (empty when the call failed)
    pub answer_text: String,
    /// Wall-clock duration of the strategy call only
    pub latency_ms: f64,
    /// Strategy-reported confidence, absent for synthesized failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Failure description; present means the answer is unusable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// RFC 3339 creation time
    pub timestamp: String,
}

/// Persisted output of one benchmark run: metadata plus the flat record list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunArtifact {
    /// RFC 3339 run timestamp
    pub timestamp: String,
    pub question_count: usize,
    /// Strategy names attempted, in configured order
    pub strategies: Vec<String>,
    pub results: Vec<BenchmarkRecord>,
}

impl RunArtifact {
    /// Save as pretty JSON under the output directory, timestamped filename
    pub fn save(&self, output_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;

        let stamp = chrono::DateTime::parse_from_rfc3339(&self.timestamp)
            .map(|t| t.format("%Y%m%d_%H%M%S").to_string())
            .unwrap_or_else(|_| "run".to_string());
        let path = output_dir.join(format!("benchmark_{}.json", stamp));

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Load a previously saved artifact
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read benchmark results: {}", path.display()))?;
        let artifact: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse benchmark results: {}", path.display()))?;
        Ok(artifact)
    }
}

/// Per-strategy run statistics, informational and recomputable
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyRunStats {
    pub question_count: usize,
    pub error_count: usize,
    /// Percentage of records carrying an error
    pub error_rate: f64,
    pub latency_min_ms: f64,
    pub latency_mean_ms: f64,
    pub latency_max_ms: f64,
}

/// Aggregate statistics for a completed run, keyed by strategy name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub record_count: usize,
    pub by_strategy: BTreeMap<String, StrategyRunStats>,
}

impl RunSummary {
    /// Derive the summary from the record list
    pub fn from_records(records: &[BenchmarkRecord]) -> Self {
        let mut by_strategy: BTreeMap<String, Vec<&BenchmarkRecord>> = BTreeMap::new();
        for record in records {
            by_strategy
                .entry(record.strategy_name.clone())
                .or_default()
                .push(record);
        }

        let by_strategy = by_strategy
            .into_iter()
            .map(|(name, records)| {
                let count = records.len();
                let error_count = records.iter().filter(|r| r.error.is_some()).count();
                let latencies: Vec<f64> = records.iter().map(|r| r.latency_ms).collect();
                let stats = StrategyRunStats {
                    question_count: count,
                    error_count,
                    error_rate: 100.0 * error_count as f64 / count as f64,
                    latency_min_ms: latencies.iter().copied().fold(f64::INFINITY, f64::min),
                    latency_mean_ms: latencies.iter().sum::<f64>() / count as f64,
                    latency_max_ms: latencies.iter().copied().fold(0.0, f64::max),
                };
                (name, stats)
            })
            .collect();

        Self {
            record_count: records.len(),
            by_strategy,
        }
    }
}

/// Executes the benchmark cross-product and collects records
pub struct BenchmarkRunner<'a> {
    golden: &'a GoldenSet,
    registry: &'a BTreeMap<String, StrategyAdapter>,
    config: &'a BenchConfig,
}

impl<'a> BenchmarkRunner<'a> {
    pub fn new(
        golden: &'a GoldenSet,
        registry: &'a BTreeMap<String, StrategyAdapter>,
        config: &'a BenchConfig,
    ) -> Self {
        Self {
            golden,
            registry,
            config,
        }
    }

    /// Run every configured strategy on every golden question
    ///
    /// Zero configured strategies is not an error; the artifact just carries
    /// an empty record list. Records come back sorted by (question_id,
    /// strategy_name).
    pub async fn run(&self) -> RunArtifact {
        let timeout = Duration::from_millis(self.config.timeout_ms);
        let mut records =
            Vec::with_capacity(self.golden.len() * self.config.strategies.len());

        tracing::info!(
            "benchmark start: {} questions x {} strategies",
            self.golden.len(),
            self.config.strategies.len()
        );

        for (i, question) in self.golden.questions.iter().enumerate() {
            for strategy_name in &self.config.strategies {
                let record = self.run_single(question, strategy_name, timeout).await;
                records.push(record);
            }
            if (i + 1) % 5 == 0 || i + 1 == self.golden.len() {
                tracing::info!("progress: {}/{} questions", i + 1, self.golden.len());
            }
        }

        records.sort_by(|a, b| {
            a.question_id
                .cmp(&b.question_id)
                .then_with(|| a.strategy_name.cmp(&b.strategy_name))
        });

        RunArtifact {
            timestamp: chrono::Utc::now().to_rfc3339(),
            question_count: self.golden.len(),
            strategies: self.config.strategies.clone(),
            results: records,
        }
    }

    /// Execute one (question, strategy) pair
    ///
    /// The timed interval wraps only the adapter call. An unavailable
    /// strategy is synthesized as an error record without invoking anything;
    /// a call outlasting the timeout is recorded as an error at the timeout's
    /// duration.
    async fn run_single(
        &self,
        question: &GoldenQuestion,
        strategy_name: &str,
        timeout: Duration,
    ) -> BenchmarkRecord {
        let Some(adapter) = self.registry.get(strategy_name) else {
            return BenchmarkRecord {
                question_id: question.id.clone(),
                question: question.question.clone(),
                question_type: question.question_type,
                strategy_name: strategy_name.to_string(),
                answer_text: String::new(),
                latency_ms: 0.0,
                confidence: None,
                error: Some("strategy unavailable".to_string()),
                timestamp: chrono::Utc::now().to_rfc3339(),
            };
        };

        let start = Instant::now();
        let outcome = tokio::time::timeout(timeout, adapter.answer(&question.question)).await;
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;

        let (answer_text, confidence, error) = match outcome {
            Ok(result) => {
                let confidence = if result.is_error() {
                    None
                } else {
                    Some(result.confidence)
                };
                (result.answer, confidence, result.error)
            }
            Err(_) => {
                tracing::warn!(
                    "strategy '{}' timed out after {}ms on '{}'",
                    strategy_name,
                    timeout.as_millis(),
                    question.id
                );
                (
                    String::new(),
                    None,
                    Some(format!("timed out after {}ms", timeout.as_millis())),
                )
            }
        };

        BenchmarkRecord {
            question_id: question.id.clone(),
            question: question.question.clone(),
            question_type: question.question_type,
            strategy_name: strategy_name.to_string(),
            answer_text,
            latency_ms,
            confidence,
            error,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
