//! Scoring engine
//!
//! Turns each benchmark record into a `QuestionEvaluation`: five criterion
//! scores computed against the matching golden-set entry, combined into one
//! weighted overall score.
//!
//! ## Modules
//!
//! - `criteria` - the five criterion functions and their shared helpers

pub mod criteria;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::errors::BenchError;
use crate::golden::{GoldenQuestion, GoldenSet, QuestionType};
use crate::runner::BenchmarkRecord;

/// Criterion weights for the overall score
///
/// The fixed rubric: correctness 0.30, relevance 0.20, non-hallucination
/// 0.20, latency 0.15, ignorance admission 0.15. The sum must be exactly
/// 1.00; `validate()` is called before any scoring begins.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoringWeights {
    #[serde(default = "default_correctness_weight")]
    pub correctness: f64,
    #[serde(default = "default_relevance_weight")]
    pub relevance: f64,
    #[serde(default = "default_non_hallucination_weight")]
    pub non_hallucination: f64,
    #[serde(default = "default_latency_weight")]
    pub latency: f64,
    #[serde(default = "default_ignorance_weight")]
    pub ignorance_admission: f64,
}

fn default_correctness_weight() -> f64 {
    0.30
}
fn default_relevance_weight() -> f64 {
    0.20
}
fn default_non_hallucination_weight() -> f64 {
    0.20
}
fn default_latency_weight() -> f64 {
    0.15
}
fn default_ignorance_weight() -> f64 {
    0.15
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            correctness: default_correctness_weight(),
            relevance: default_relevance_weight(),
            non_hallucination: default_non_hallucination_weight(),
            latency: default_latency_weight(),
            ignorance_admission: default_ignorance_weight(),
        }
    }
}

impl ScoringWeights {
    pub fn sum(&self) -> f64 {
        self.correctness
            + self.relevance
            + self.non_hallucination
            + self.latency
            + self.ignorance_admission
    }

    /// Reject weights that do not sum to 1.00 (at f64 precision)
    pub fn validate(&self) -> Result<(), BenchError> {
        let sum = self.sum();
        if (sum - 1.0).abs() > 1e-9 {
            return Err(BenchError::InconsistentWeights { sum });
        }
        Ok(())
    }
}

/// The five criterion scores for one record, all in [0, 1]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CriterionScores {
    pub correctness: f64,
    pub relevance: f64,
    pub non_hallucination: f64,
    pub latency_score: f64,
    pub ignorance_admission: f64,
    /// Per-criterion diagnostics: matched/missing keywords, detected
    /// phrases, red flags
    pub details: Value,
}

impl CriterionScores {
    /// All-zero scores for a record whose strategy call failed
    fn zeroed(error: &str) -> Self {
        Self {
            correctness: 0.0,
            relevance: 0.0,
            non_hallucination: 0.0,
            latency_score: 0.0,
            ignorance_admission: 0.0,
            details: json!({ "error": error }),
        }
    }
}

/// One scored benchmark record: the unit the aggregator consumes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionEvaluation {
    pub question_id: String,
    pub strategy_name: String,
    pub question_type: QuestionType,
    pub latency_ms: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub scores: CriterionScores,
    pub overall_score: f64,
}

/// Scores benchmark records against the golden set
pub struct ScoringEngine {
    index: HashMap<String, GoldenQuestion>,
    weights: ScoringWeights,
}

impl ScoringEngine {
    /// Build an engine over a golden set; validates the weights up front
    pub fn new(golden: &GoldenSet, weights: ScoringWeights) -> Result<Self, BenchError> {
        weights.validate()?;
        let index = golden
            .questions
            .iter()
            .map(|q| (q.id.clone(), q.clone()))
            .collect();
        Ok(Self { index, weights })
    }

    /// Score one record. Fails only when the record's question id has no
    /// golden-set entry; a failed strategy call scores all-zero without
    /// failing.
    pub fn evaluate_record(
        &self,
        record: &BenchmarkRecord,
    ) -> Result<QuestionEvaluation, BenchError> {
        let golden = self
            .index
            .get(&record.question_id)
            .ok_or_else(|| BenchError::ReferenceNotFound {
                question_id: record.question_id.clone(),
            })?;

        let scores = match &record.error {
            Some(error) => CriterionScores::zeroed(error),
            None => self.score_answer(record, golden),
        };
        let overall_score = self.weighted_sum(&scores);

        Ok(QuestionEvaluation {
            question_id: record.question_id.clone(),
            strategy_name: record.strategy_name.clone(),
            question_type: golden.question_type,
            latency_ms: record.latency_ms,
            error: record.error.clone(),
            scores,
            overall_score,
        })
    }

    /// Score every record, propagating the first reference-lookup fault
    pub fn evaluate_all(
        &self,
        records: &[BenchmarkRecord],
    ) -> Result<Vec<QuestionEvaluation>, BenchError> {
        let mut evaluations = Vec::with_capacity(records.len());
        for record in records {
            evaluations.push(self.evaluate_record(record)?);
        }
        tracing::info!("scored {} records", evaluations.len());
        Ok(evaluations)
    }

    fn score_answer(&self, record: &BenchmarkRecord, golden: &GoldenQuestion) -> CriterionScores {
        let answer = &record.answer_text;
        let qtype = golden.question_type;

        let (correctness, correctness_details) =
            criteria::correctness(answer, &golden.expected_keywords);
        let (relevance, relevance_details) = criteria::relevance(answer, &golden.question, qtype);
        let (non_hallucination, hallucination_details) =
            criteria::non_hallucination(answer, &golden.expected_summary, qtype);
        let (latency_score, latency_details) = criteria::latency_score(record.latency_ms);
        let (ignorance_admission, ignorance_details) =
            criteria::ignorance_admission(answer, qtype);

        CriterionScores {
            correctness,
            relevance,
            non_hallucination,
            latency_score,
            ignorance_admission,
            details: json!({
                "correctness": correctness_details,
                "relevance": relevance_details,
                "non_hallucination": hallucination_details,
                "latency": latency_details,
                "ignorance_admission": ignorance_details,
            }),
        }
    }

    fn weighted_sum(&self, scores: &CriterionScores) -> f64 {
        scores.correctness * self.weights.correctness
            + scores.relevance * self.weights.relevance
            + scores.non_hallucination * self.weights.non_hallucination
            + scores.latency_score * self.weights.latency
            + scores.ignorance_admission * self.weights.ignorance_admission
    }
}
