//! Built-in answer strategies
//!
//! Two deterministic strategies built on the lexical retrieval index, so the
//! full pipeline runs and is testable without any hosted model:
//!
//! - `retrieval`: answer with the best-matching FAQ entry's answer, or the
//!   fixed no-information sentence when the best score is below the
//!   confidence threshold.
//! - `extractive`: retrieve the best entry, then extract the sentence of its
//!   answer with the highest lexical overlap with the question.

use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::config::BenchConfig;
use crate::golden::FaqBase;
use crate::scoring::criteria::significant_words;
use crate::strategies::retrieval::{RankedEntry, RetrievalIndex};
use crate::strategies::traits::{AnswerResult, AnswerSource, Strategy, StrategyAdapter};

/// Fallback answer when retrieval finds nothing above the threshold
pub const NO_INFORMATION_ANSWER: &str =
    "Je n'ai pas trouvé d'information pertinente dans notre FAQ.";

fn sources_of(ranked: &[RankedEntry]) -> Vec<AnswerSource> {
    ranked
        .iter()
        .map(|r| AnswerSource {
            source_id: r.entry.id.clone(),
            source_question: r.entry.question.clone(),
            score: (r.score * 1000.0).round() / 1000.0,
        })
        .collect()
}

/// Answer with the best-matching FAQ entry's full answer
pub struct RetrievalStrategy {
    index: Arc<RetrievalIndex>,
    top_k: usize,
    confidence_threshold: f64,
}

impl RetrievalStrategy {
    pub fn new(index: Arc<RetrievalIndex>, top_k: usize, confidence_threshold: f64) -> Self {
        Self {
            index,
            top_k,
            confidence_threshold,
        }
    }
}

#[async_trait::async_trait]
impl Strategy for RetrievalStrategy {
    fn name(&self) -> &str {
        "retrieval"
    }

    fn description(&self) -> &str {
        "best FAQ match by lexical similarity, fallback below the confidence threshold"
    }

    async fn answer(&self, question: &str) -> Result<AnswerResult> {
        let ranked = self.index.search(question, self.top_k);
        let best_score = ranked.first().map(|r| r.score).unwrap_or(0.0);

        if best_score < self.confidence_threshold {
            return Ok(AnswerResult {
                answer: NO_INFORMATION_ANSWER.to_string(),
                confidence: best_score,
                strategy_name: self.name().to_string(),
                sources: Vec::new(),
                error: None,
            });
        }

        Ok(AnswerResult {
            answer: ranked[0].entry.answer.clone(),
            confidence: best_score,
            strategy_name: self.name().to_string(),
            sources: sources_of(&ranked),
            error: None,
        })
    }
}

/// Extract the most relevant sentence from the best-matching FAQ answer
pub struct ExtractiveStrategy {
    index: Arc<RetrievalIndex>,
    top_k: usize,
    confidence_threshold: f64,
}

impl ExtractiveStrategy {
    pub fn new(index: Arc<RetrievalIndex>, top_k: usize, confidence_threshold: f64) -> Self {
        Self {
            index,
            top_k,
            confidence_threshold,
        }
    }
}

/// Split an answer into sentences on terminal punctuation
fn sentences(text: &str) -> Vec<&str> {
    text.split_inclusive(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Overlap between the question's significant words and a sentence's words
fn sentence_overlap(question_words: &std::collections::HashSet<String>, sentence: &str) -> f64 {
    if question_words.is_empty() {
        return 0.0;
    }
    let words = significant_words(sentence);
    let hits = question_words.iter().filter(|w| words.contains(*w)).count();
    hits as f64 / question_words.len() as f64
}

#[async_trait::async_trait]
impl Strategy for ExtractiveStrategy {
    fn name(&self) -> &str {
        "extractive"
    }

    fn description(&self) -> &str {
        "best-overlap sentence extracted from the top FAQ match"
    }

    async fn answer(&self, question: &str) -> Result<AnswerResult> {
        let ranked = self.index.search(question, self.top_k);
        let best_score = ranked.first().map(|r| r.score).unwrap_or(0.0);

        if best_score < self.confidence_threshold {
            return Ok(AnswerResult {
                answer: NO_INFORMATION_ANSWER.to_string(),
                confidence: best_score,
                strategy_name: self.name().to_string(),
                sources: Vec::new(),
                error: None,
            });
        }

        let best_answer = &ranked[0].entry.answer;
        let question_words = significant_words(question);

        // Pick the highest-overlap sentence; first sentence wins ties
        let mut extracted = "";
        let mut extract_score = f64::MIN;
        for sentence in sentences(best_answer) {
            let overlap = sentence_overlap(&question_words, sentence);
            if overlap > extract_score {
                extract_score = overlap;
                extracted = sentence;
            }
        }

        // No extractable sentence: fall back to the full answer at reduced
        // confidence
        let (answer, extract_score) = if extracted.is_empty() {
            (best_answer.clone(), best_score * 0.5)
        } else {
            (extracted.to_string(), extract_score)
        };

        Ok(AnswerResult {
            answer,
            confidence: (best_score + extract_score) / 2.0,
            strategy_name: self.name().to_string(),
            sources: sources_of(&ranked),
            error: None,
        })
    }
}

/// Build the adapter registry for the configured strategies
///
/// Keyed by strategy name; iteration order is deterministic. Configured
/// names with no registered strategy are absent from the map — the runner
/// synthesizes an "unavailable" record for them without invoking anything.
pub fn build_registry(faq: &FaqBase, config: &BenchConfig) -> BTreeMap<String, StrategyAdapter> {
    let index = Arc::new(RetrievalIndex::new(faq));
    let mut registry = BTreeMap::new();

    for name in &config.strategies {
        let strategy: Option<Box<dyn Strategy>> = match name.as_str() {
            "retrieval" => Some(Box::new(RetrievalStrategy::new(
                Arc::clone(&index),
                config.top_k,
                config.confidence_threshold,
            ))),
            "extractive" => Some(Box::new(ExtractiveStrategy::new(
                Arc::clone(&index),
                config.top_k,
                config.confidence_threshold,
            ))),
            other => {
                tracing::warn!("unknown strategy '{}' in config, will record as unavailable", other);
                None
            }
        };
        if let Some(strategy) = strategy {
            registry.insert(name.clone(), StrategyAdapter::new(strategy));
        }
    }

    registry
}
