//! Reference corpus: golden set and FAQ base
//!
//! The golden set is the fixed set of reference questions the benchmark
//! runs against; the FAQ base is the knowledge corpus the built-in
//! strategies retrieve from. Both are loaded once at startup and never
//! mutated afterwards.
//!
//! ## Golden set format (JSON)
//!
//! ```json
//! {
//!   "golden_set": [
//!     {
//!       "id": "Q1",
//!       "question": "Quel est le délai pour obtenir un acte de naissance ?",
//!       "type": "direct_match",
//!       "expected_keywords": ["5 jours"],
//!       "expected_summary": "Le délai de délivrance est de 5 jours ouvrés."
//!     }
//!   ]
//! }
//! ```
//!
//! ## FAQ base format (JSON)
//!
//! ```json
//! {
//!   "faq": [
//!     { "id": "FAQ_001", "question": "...", "answer": "..." }
//!   ]
//! }
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::errors::BenchError;

/// Category of a golden-set question
///
/// Unrecognized inbound values map to `Unknown`, which downstream scoring
/// treats as non-off-topic. The load path logs every unknown value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QuestionType {
    /// Question phrased exactly like a FAQ entry
    #[default]
    DirectMatch,
    /// Same intent as a FAQ entry, different wording
    Reformulation,
    /// Off-topic: the only correct behavior is to admit ignorance
    HorsSujet,
    /// Needs information combined from several FAQ entries
    Complexe,
    /// Anything else found in the data
    Unknown,
}

impl QuestionType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::DirectMatch => "direct_match",
            Self::Reformulation => "reformulation",
            Self::HorsSujet => "hors_sujet",
            Self::Complexe => "complexe",
            Self::Unknown => "unknown",
        }
    }

    /// Parse from the raw string found in the data (case-insensitive)
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "direct_match" => Self::DirectMatch,
            "reformulation" => Self::Reformulation,
            "hors_sujet" => Self::HorsSujet,
            "complexe" => Self::Complexe,
            _ => Self::Unknown,
        }
    }

    /// Off-topic questions get the binary admission-based scoring path
    pub fn is_off_topic(&self) -> bool {
        matches!(self, Self::HorsSujet)
    }
}

impl Serialize for QuestionType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for QuestionType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

/// One reference test case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldenQuestion {
    /// Unique identifier across the golden set
    pub id: String,
    /// Question text
    pub question: String,
    /// Question category
    #[serde(rename = "type", default)]
    pub question_type: QuestionType,
    /// Keywords expected in a correct answer (order-irrelevant, may be empty)
    #[serde(default)]
    pub expected_keywords: Vec<String>,
    /// Summary of the ideal answer, used by the hallucination heuristics
    #[serde(default)]
    pub expected_summary: String,
}

/// The complete golden set as loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoldenSet {
    #[serde(rename = "golden_set")]
    pub questions: Vec<GoldenQuestion>,
}

impl GoldenSet {
    /// Load the golden set from a JSON file and validate it
    ///
    /// Fatal on empty/duplicate ids or empty question text; unknown
    /// question types are logged and kept.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read golden set: {}", path.display()))?;
        let set: GoldenSet = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse golden set: {}", path.display()))?;
        set.validate()?;
        Ok(set)
    }

    /// Validate golden-set invariants
    pub fn validate(&self) -> Result<()> {
        let mut seen: HashSet<&str> = HashSet::new();
        for (i, q) in self.questions.iter().enumerate() {
            if q.id.is_empty() {
                anyhow::bail!("golden-set question {} has an empty id", i);
            }
            if q.question.is_empty() {
                anyhow::bail!("golden-set question '{}' has empty question text", q.id);
            }
            if !seen.insert(&q.id) {
                return Err(BenchError::DuplicateQuestionId {
                    question_id: q.id.clone(),
                }
                .into());
            }
            if q.question_type == QuestionType::Unknown {
                tracing::warn!(
                    "golden-set question '{}' has unrecognized type, treating as non-off-topic",
                    q.id
                );
            }
        }
        Ok(())
    }

    /// Index questions by id for scoring lookups
    pub fn index(&self) -> HashMap<&str, &GoldenQuestion> {
        self.questions.iter().map(|q| (q.id.as_str(), q)).collect()
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }
}

/// One knowledge-base record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqEntry {
    pub id: String,
    pub question: String,
    pub answer: String,
}

/// The FAQ corpus as loaded from JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqBase {
    #[serde(rename = "faq")]
    pub entries: Vec<FaqEntry>,
}

impl FaqBase {
    /// Load the FAQ base from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read FAQ base: {}", path.display()))?;
        let base: FaqBase = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse FAQ base: {}", path.display()))?;

        for (i, entry) in base.entries.iter().enumerate() {
            if entry.question.is_empty() || entry.answer.is_empty() {
                anyhow::bail!(
                    "FAQ entry {} ('{}') has an empty question or answer",
                    i,
                    entry.id
                );
            }
        }
        Ok(base)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_question_type_parse() {
        assert_eq!(QuestionType::parse("direct_match"), QuestionType::DirectMatch);
        assert_eq!(QuestionType::parse("HORS_SUJET"), QuestionType::HorsSujet);
        assert_eq!(QuestionType::parse("complexe"), QuestionType::Complexe);
        assert_eq!(QuestionType::parse("banana"), QuestionType::Unknown);
        assert!(!QuestionType::Unknown.is_off_topic());
        assert!(QuestionType::HorsSujet.is_off_topic());
    }

    #[test]
    fn test_question_type_serde_round_trip() {
        let json = serde_json::to_string(&QuestionType::HorsSujet).unwrap();
        assert_eq!(json, "\"hors_sujet\"");
        let back: QuestionType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, QuestionType::HorsSujet);

        // Unrecognized strings deserialize to Unknown instead of failing
        let odd: QuestionType = serde_json::from_str("\"trick\"").unwrap();
        assert_eq!(odd, QuestionType::Unknown);
    }

    #[test]
    fn test_golden_set_load() {
        let file = write_temp(
            r#"{
  "golden_set": [
    {
      "id": "Q1",
      "question": "Quel est le délai pour obtenir un acte de naissance ?",
      "type": "direct_match",
      "expected_keywords": ["5 jours"],
      "expected_summary": "Le délai est de 5 jours ouvrés."
    },
    {
      "id": "Q2",
      "question": "Quelle est la capitale de l'Australie ?",
      "type": "hors_sujet"
    }
  ]
}"#,
        );

        let set = GoldenSet::load(file.path()).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.questions[0].expected_keywords, vec!["5 jours"]);
        assert_eq!(set.questions[1].question_type, QuestionType::HorsSujet);
        // Missing optional fields default to empty
        assert!(set.questions[1].expected_keywords.is_empty());
        assert!(set.questions[1].expected_summary.is_empty());

        let index = set.index();
        assert!(index.contains_key("Q1"));
        assert!(!index.contains_key("Q3"));
    }

    #[test]
    fn test_golden_set_rejects_duplicate_ids() {
        let file = write_temp(
            r#"{
  "golden_set": [
    { "id": "Q1", "question": "a ?", "type": "direct_match" },
    { "id": "Q1", "question": "b ?", "type": "reformulation" }
  ]
}"#,
        );
        let err = GoldenSet::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("duplicate question id"));
    }

    #[test]
    fn test_golden_set_missing_file() {
        let err = GoldenSet::load(Path::new("/nonexistent/golden.json")).unwrap_err();
        assert!(err.to_string().contains("golden"));
    }

    #[test]
    fn test_faq_base_load() {
        let file = write_temp(
            r#"{
  "faq": [
    {
      "id": "FAQ_001",
      "question": "Comment obtenir un acte de naissance ?",
      "answer": "Vous pouvez faire la demande en ligne. Le délai est de 5 jours ouvrés."
    }
  ]
}"#,
        );
        let base = FaqBase::load(file.path()).unwrap();
        assert_eq!(base.len(), 1);
        assert_eq!(base.entries[0].id, "FAQ_001");
    }

    #[test]
    fn test_faq_base_rejects_empty_answer() {
        let file = write_temp(r#"{ "faq": [ { "id": "F1", "question": "q ?", "answer": "" } ] }"#);
        assert!(FaqBase::load(file.path()).is_err());
    }
}
