//! Report serialization
//!
//! Two independent projections of the same evaluation set: a flat CSV table
//! (one row per evaluation, original French column names) and a structured
//! JSON report (metadata, per-strategy aggregates, recommendation, full
//! detail). No computation happens here.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::report::{Recommendation, StrategyAggregate};
use crate::scoring::QuestionEvaluation;

/// One CSV row per evaluation
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    question_id: &'a str,
    strategy: &'a str,
    question_type: &'a str,
    exactitude: String,
    pertinence: String,
    hallucination: String,
    latence: String,
    aveu_ignorance: String,
    score_global: String,
}

fn fmt3(score: f64) -> String {
    format!("{:.3}", score)
}

/// Write the flat evaluation table as CSV
pub fn export_csv(
    evaluations: &[QuestionEvaluation],
    output_dir: &Path,
    filename: &str,
) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;
    let path = output_dir.join(filename);

    let mut writer = csv::Writer::from_path(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    for eval in evaluations {
        writer.serialize(CsvRow {
            question_id: &eval.question_id,
            strategy: &eval.strategy_name,
            question_type: eval.question_type.name(),
            exactitude: fmt3(eval.scores.correctness),
            pertinence: fmt3(eval.scores.relevance),
            hallucination: fmt3(eval.scores.non_hallucination),
            latence: fmt3(eval.scores.latency_score),
            aveu_ignorance: fmt3(eval.scores.ignorance_admission),
            score_global: fmt3(eval.overall_score),
        })?;
    }
    writer.flush()?;

    tracing::info!("CSV report written to {}", path.display());
    Ok(path)
}

/// Report metadata: when and from what the report was generated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// RFC 3339 generation time
    pub generated_at: String,
    /// Benchmark artifact the evaluations came from
    pub benchmark_file: String,
    pub question_count: usize,
    pub evaluation_count: usize,
}

/// The complete structured evaluation report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub metadata: ReportMetadata,
    pub scores_by_strategy: BTreeMap<String, StrategyAggregate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Recommendation>,
    pub evaluations: Vec<QuestionEvaluation>,
}

impl EvaluationReport {
    /// Save as pretty JSON
    pub fn save(&self, output_dir: &Path, filename: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(output_dir)
            .with_context(|| format!("Failed to create {}", output_dir.display()))?;
        let path = output_dir.join(filename);

        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;

        tracing::info!("JSON report written to {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::golden::QuestionType;
    use crate::report::{aggregate, recommend};
    use crate::scoring::CriterionScores;

    fn evaluation(strategy: &str, question_id: &str) -> QuestionEvaluation {
        QuestionEvaluation {
            question_id: question_id.to_string(),
            strategy_name: strategy.to_string(),
            question_type: QuestionType::DirectMatch,
            latency_ms: 120.0,
            error: None,
            scores: CriterionScores {
                correctness: 1.0,
                relevance: 0.65,
                non_hallucination: 0.8,
                latency_score: 1.0,
                ignorance_admission: 1.0,
                details: serde_json::json!({}),
            },
            overall_score: 0.89,
        }
    }

    #[test]
    fn test_csv_export_columns_and_rows() {
        let evals = vec![
            evaluation("retrieval", "Q1"),
            evaluation("extractive", "Q1"),
        ];
        let dir = tempfile::tempdir().unwrap();
        let path = export_csv(&evals, dir.path(), "evaluation_results.csv").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "question_id,strategy,question_type,exactitude,pertinence,hallucination,latence,aveu_ignorance,score_global"
        );
        let first = lines.next().unwrap();
        assert!(first.starts_with("Q1,retrieval,direct_match,1.000,0.650,0.800,1.000,1.000,0.890"));
        assert_eq!(lines.count(), 1);
    }

    #[test]
    fn test_csv_export_empty_set_writes_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = export_csv(&[], dir.path(), "empty.csv").unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        // serde-based writer emits no header without rows; file exists and is
        // readable either way
        assert!(content.lines().count() <= 1);
    }

    #[test]
    fn test_report_save_round_trip() {
        let evals = vec![
            evaluation("retrieval", "Q1"),
            evaluation("extractive", "Q1"),
        ];
        let aggregates = aggregate(&evals);
        let recommendation = recommend(&aggregates);

        let report = EvaluationReport {
            metadata: ReportMetadata {
                generated_at: "2025-01-15T14:30:22Z".to_string(),
                benchmark_file: "results/benchmark_20250115_143022.json".to_string(),
                question_count: 1,
                evaluation_count: evals.len(),
            },
            scores_by_strategy: aggregates,
            recommendation,
            evaluations: evals,
        };

        let dir = tempfile::tempdir().unwrap();
        let path = report.save(dir.path(), "evaluation_report.json").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let loaded: EvaluationReport = serde_json::from_str(&content).unwrap();
        assert_eq!(loaded.evaluations.len(), 2);
        assert_eq!(loaded.scores_by_strategy.len(), 2);
        assert!(loaded.recommendation.is_some());
        assert_eq!(loaded.metadata.question_count, 1);
    }
}
