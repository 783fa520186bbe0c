//! Aggregation and recommendation
//!
//! Groups scored evaluations by strategy, computes per-criterion means, and
//! derives a ranked recommendation with strengths and weaknesses. Both
//! operations are pure functions of the evaluation set: running them twice
//! on the same input yields identical output.
//!
//! ## Modules
//!
//! - `export` - CSV and JSON report serialization

pub mod export;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::scoring::QuestionEvaluation;

/// Criterion mean at or above which a strategy is called strong
const STRENGTH_THRESHOLD: f64 = 0.8;

/// Criterion mean below which a strategy is called weak
const WEAKNESS_THRESHOLD: f64 = 0.5;

/// Winner-vs-runner-up criterion gap worth naming in the justification
const JUSTIFICATION_MARGIN: f64 = 0.05;

/// The five criterion names, display order
const CRITERIA: &[&str] = &[
    "correctness",
    "relevance",
    "non_hallucination",
    "latency",
    "ignorance_admission",
];

/// Per-strategy means over all its evaluations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyAggregate {
    pub strategy_name: String,
    pub question_count: usize,
    pub error_count: usize,
    pub mean_correctness: f64,
    pub mean_relevance: f64,
    pub mean_non_hallucination: f64,
    pub mean_latency_score: f64,
    pub mean_ignorance_admission: f64,
    pub mean_overall_score: f64,
    /// Mean raw latency in ms, used by the recommendation tie-break
    pub mean_latency_ms: f64,
}

impl StrategyAggregate {
    /// Criterion mean by name, in `CRITERIA` order
    fn criterion_mean(&self, criterion: &str) -> f64 {
        match criterion {
            "correctness" => self.mean_correctness,
            "relevance" => self.mean_relevance,
            "non_hallucination" => self.mean_non_hallucination,
            "latency" => self.mean_latency_score,
            "ignorance_admission" => self.mean_ignorance_admission,
            _ => 0.0,
        }
    }

    /// Criteria with a mean at or above the strength threshold
    pub fn strengths(&self) -> Vec<&'static str> {
        CRITERIA
            .iter()
            .filter(|c| self.criterion_mean(c) >= STRENGTH_THRESHOLD)
            .copied()
            .collect()
    }

    /// Criteria with a mean below the weakness threshold
    pub fn weaknesses(&self) -> Vec<&'static str> {
        CRITERIA
            .iter()
            .filter(|c| self.criterion_mean(c) < WEAKNESS_THRESHOLD)
            .copied()
            .collect()
    }

    /// One summary line for the console table
    pub fn format_summary(&self) -> String {
        format!(
            "overall: {:.3} | correctness: {:.3} | relevance: {:.3} | non-hallucination: {:.3} | latency: {:.3} | ignorance: {:.3} | errors: {}/{}",
            self.mean_overall_score,
            self.mean_correctness,
            self.mean_relevance,
            self.mean_non_hallucination,
            self.mean_latency_score,
            self.mean_ignorance_admission,
            self.error_count,
            self.question_count,
        )
    }
}

/// Group evaluations by strategy and compute arithmetic means
///
/// Strategies with zero evaluations are simply absent from the map. The
/// `BTreeMap` keeps iteration order deterministic.
pub fn aggregate(evaluations: &[QuestionEvaluation]) -> BTreeMap<String, StrategyAggregate> {
    let mut by_strategy: BTreeMap<String, Vec<&QuestionEvaluation>> = BTreeMap::new();
    for eval in evaluations {
        by_strategy
            .entry(eval.strategy_name.clone())
            .or_default()
            .push(eval);
    }

    by_strategy
        .into_iter()
        .map(|(name, evals)| {
            let n = evals.len() as f64;
            let mean = |f: &dyn Fn(&QuestionEvaluation) -> f64| {
                evals.iter().map(|e| f(*e)).sum::<f64>() / n
            };
            let aggregate = StrategyAggregate {
                strategy_name: name.clone(),
                question_count: evals.len(),
                error_count: evals.iter().filter(|e| e.error.is_some()).count(),
                mean_correctness: mean(&|e| e.scores.correctness),
                mean_relevance: mean(&|e| e.scores.relevance),
                mean_non_hallucination: mean(&|e| e.scores.non_hallucination),
                mean_latency_score: mean(&|e| e.scores.latency_score),
                mean_ignorance_admission: mean(&|e| e.scores.ignorance_admission),
                mean_overall_score: mean(&|e| e.overall_score),
                mean_latency_ms: mean(&|e| e.latency_ms),
            };
            (name, aggregate)
        })
        .collect()
}

/// Strengths and weaknesses of one strategy, for the report document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyProfile {
    pub strategy_name: String,
    pub mean_overall_score: f64,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

/// Ranked recommendation derived from the aggregates
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    /// Winning strategy name
    pub recommended_strategy: String,
    /// One-paragraph justification naming the separating criteria
    pub justification: String,
    /// All strategies, best first
    pub ranking: Vec<StrategyProfile>,
}

/// Rank strategies and derive the recommendation
///
/// Winner is the highest mean overall score; ties break by lower mean
/// latency, then lexicographic name, so the output is deterministic.
/// Returns `None` when there is nothing to rank.
pub fn recommend(aggregates: &BTreeMap<String, StrategyAggregate>) -> Option<Recommendation> {
    if aggregates.is_empty() {
        return None;
    }

    let mut ranked: Vec<&StrategyAggregate> = aggregates.values().collect();
    ranked.sort_by(|a, b| {
        b.mean_overall_score
            .partial_cmp(&a.mean_overall_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                a.mean_latency_ms
                    .partial_cmp(&b.mean_latency_ms)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.strategy_name.cmp(&b.strategy_name))
    });

    let winner = ranked[0];
    let justification = match ranked.get(1) {
        Some(runner_up) => justify(winner, runner_up),
        None => format!(
            "'{}' is the only evaluated strategy, with a mean overall score of {:.3}.",
            winner.strategy_name, winner.mean_overall_score
        ),
    };

    let ranking = ranked
        .iter()
        .map(|a| StrategyProfile {
            strategy_name: a.strategy_name.clone(),
            mean_overall_score: a.mean_overall_score,
            strengths: a.strengths().iter().map(|s| s.to_string()).collect(),
            weaknesses: a.weaknesses().iter().map(|s| s.to_string()).collect(),
        })
        .collect();

    Some(Recommendation {
        recommended_strategy: winner.strategy_name.clone(),
        justification,
        ranking,
    })
}

/// Name the criteria that separate the winner from the runner-up
fn justify(winner: &StrategyAggregate, runner_up: &StrategyAggregate) -> String {
    let mut gaps: Vec<(&str, f64)> = CRITERIA
        .iter()
        .map(|c| (*c, winner.criterion_mean(c) - runner_up.criterion_mean(c)))
        .filter(|(_, gap)| *gap >= JUSTIFICATION_MARGIN)
        .collect();
    gaps.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    gaps.truncate(3);

    let overall_gap = winner.mean_overall_score - runner_up.mean_overall_score;
    if gaps.is_empty() {
        format!(
            "'{}' ranks first with a mean overall score of {:.3}, ahead of '{}' at {:.3}. \
             No single criterion separates them decisively ({} ms vs {} ms mean latency \
             decided the ordering).",
            winner.strategy_name,
            winner.mean_overall_score,
            runner_up.strategy_name,
            runner_up.mean_overall_score,
            winner.mean_latency_ms.round(),
            runner_up.mean_latency_ms.round(),
        )
    } else {
        let named: Vec<String> = gaps
            .iter()
            .map(|(c, gap)| format!("{} (+{:.3})", c, gap))
            .collect();
        format!(
            "'{}' ranks first with a mean overall score of {:.3}, {:.3} ahead of '{}'. \
             The separation comes from {}.",
            winner.strategy_name,
            winner.mean_overall_score,
            overall_gap,
            runner_up.strategy_name,
            named.join(", "),
        )
    }
}
