//! Named error types for the benchmark pipeline.
//!
//! General I/O and parse failures travel as `anyhow::Error` with context;
//! the variants here are the faults callers need to match on by name.

use thiserror::Error;

/// Domain faults surfaced by name rather than as plain strings.
#[derive(Error, Debug)]
pub enum BenchError {
    /// A benchmark record references a question missing from the golden set.
    /// Fatal for the evaluation run: a record cannot be scored without its
    /// ground truth.
    #[error("no golden-set entry matches question id '{question_id}'")]
    ReferenceNotFound { question_id: String },

    /// Scoring weights were edited inconsistently.
    #[error("scoring weights sum to {sum:.4} instead of 1.00")]
    InconsistentWeights { sum: f64 },

    /// Two golden-set questions share the same id.
    #[error("duplicate question id '{question_id}' in golden set")]
    DuplicateQuestionId { question_id: String },
}
