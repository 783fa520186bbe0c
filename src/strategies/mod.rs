//! Answer-producing strategies
//!
//! ## Modules
//!
//! - `traits` - the `Strategy` capability, `AnswerResult`, and the
//!   fault-normalizing adapter
//! - `retrieval` - lexical similarity search over the FAQ corpus
//! - `builtin` - the deterministic built-in strategies and the registry

pub mod builtin;
pub mod retrieval;
pub mod traits;

pub use builtin::{build_registry, NO_INFORMATION_ANSWER};
pub use retrieval::{RankedEntry, RetrievalIndex};
pub use traits::{AnswerResult, AnswerSource, Strategy, StrategyAdapter};
