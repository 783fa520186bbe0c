//! The five evaluation criteria
//!
//! Each criterion is a pure function of `(answer, golden question)` and is
//! computable in isolation; none depends on another's output. Every
//! function returns a score in [0, 1] plus a JSON details object recording
//! what was matched or detected.
//!
//! The hallucination and relevance heuristics are approximate by nature:
//! they never fail, they produce a best-effort score with explanatory
//! details, and the exact formulas below are the documented contract.

use regex::Regex;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::OnceLock;

use crate::golden::QuestionType;

/// Minimum answer length (chars) below which relevance is 0 for on-topic
/// questions
pub const MIN_ANSWER_CHARS: usize = 20;

/// Relevance floor for a non-trivial on-topic answer: score = floor +
/// (1 - floor) * overlap, so lexical overlap alone never zeroes an answer
const RELEVANCE_FLOOR: f64 = 0.3;

/// Significant-word minimum length (chars, after lowercasing)
const MIN_SIGNIFICANT_LEN: usize = 3;

/// Benefit-of-the-doubt hallucination score when no red flag is detected
const HALLUCINATION_DEFAULT: f64 = 0.8;

/// Score deducted per detected red flag
const RED_FLAG_PENALTY: f64 = 0.4;

/// Phrases recognized as an admission of ignorance (case-insensitive
/// substring match)
const IGNORANCE_PHRASES: &[&str] = &[
    "je ne sais pas",
    "je ne peux pas répondre",
    "je ne peux pas vous répondre",
    "cette question ne concerne pas",
    "hors de mon domaine",
    "je n'ai pas trouvé d'information",
    "je n'ai pas cette information",
    "ne relève pas de mes compétences",
    "en dehors de mon périmètre",
];

/// High-frequency French function words excluded from lexical overlap.
/// Tokens shorter than `MIN_SIGNIFICANT_LEN` are dropped before this list
/// is consulted, which already covers most articles and pronouns.
const STOP_WORDS: &[&str] = &[
    "les", "des", "une", "est", "son", "ses", "pour", "que", "qui", "quoi", "comment", "quel",
    "quelle", "quels", "quelles", "combien", "vous", "nous", "ils", "elle", "elles", "dans",
    "sur", "avec", "sans", "par", "aux", "pas", "mais", "donc", "car", "cette", "ces", "mes",
    "tes", "notre", "votre", "leur", "leurs", "ont", "sont", "être", "avoir", "faire", "fait",
    "peut", "peux", "dois", "doit", "faut", "plus", "moins", "très", "bien", "tout", "tous",
    "toute", "toutes", "aussi", "comme", "ainsi", "alors", "été", "avez", "avons",
];

/// Lowercase Unicode-alphanumeric tokens of a text
pub fn tokens(text: &str) -> HashSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(String::from)
        .collect()
}

/// Significant words of a text: tokens of length >= 3 not in the stop-word
/// list. Shared by relevance scoring and the lexical retrieval index.
pub fn significant_words(text: &str) -> HashSet<String> {
    tokens(text)
        .into_iter()
        .filter(|w| w.chars().count() >= MIN_SIGNIFICANT_LEN && !STOP_WORDS.contains(&w.as_str()))
        .collect()
}

/// Detect an ignorance admission; returns the first matched phrase
pub fn admits_ignorance(answer: &str) -> Option<&'static str> {
    let lower = answer.to_lowercase();
    IGNORANCE_PHRASES
        .iter()
        .find(|phrase| lower.contains(*phrase))
        .copied()
}

/// Correctness: fraction of expected keywords found as case-insensitive
/// substrings of the answer. Empty keyword list scores 1.0 (vacuously
/// satisfied, not penalized).
pub fn correctness(answer: &str, expected_keywords: &[String]) -> (f64, Value) {
    if expected_keywords.is_empty() {
        return (1.0, json!({ "keywords_expected": 0 }));
    }

    let lower = answer.to_lowercase();
    let mut found = Vec::new();
    let mut missing = Vec::new();
    for keyword in expected_keywords {
        if lower.contains(&keyword.to_lowercase()) {
            found.push(keyword.as_str());
        } else {
            missing.push(keyword.as_str());
        }
    }

    let score = found.len() as f64 / expected_keywords.len() as f64;
    (
        score,
        json!({ "keywords_found": found, "keywords_missing": missing }),
    )
}

/// Relevance: binary admission check for off-topic questions; otherwise a
/// length gate (< 20 chars scores 0) followed by floored lexical overlap
/// between the question's significant words and the answer's tokens.
pub fn relevance(answer: &str, question: &str, question_type: QuestionType) -> (f64, Value) {
    if question_type.is_off_topic() {
        return match admits_ignorance(answer) {
            Some(phrase) => (1.0, json!({ "off_topic": true, "matched_phrase": phrase })),
            None => (0.0, json!({ "off_topic": true, "matched_phrase": null })),
        };
    }

    let answer_chars = answer.trim().chars().count();
    if answer_chars < MIN_ANSWER_CHARS {
        return (
            0.0,
            json!({
                "reason": "answer empty or below minimum length",
                "answer_chars": answer_chars,
                "min_chars": MIN_ANSWER_CHARS,
            }),
        );
    }

    let question_words = significant_words(question);
    if question_words.is_empty() {
        return (0.5, json!({ "reason": "question has no significant words" }));
    }

    let answer_tokens = tokens(answer);
    let mut matched: Vec<&str> = Vec::new();
    let mut missing: Vec<&str> = Vec::new();
    for word in &question_words {
        if answer_tokens.contains(word) {
            matched.push(word);
        } else {
            missing.push(word);
        }
    }
    matched.sort_unstable();
    missing.sort_unstable();

    let overlap = matched.len() as f64 / question_words.len() as f64;
    let score = RELEVANCE_FLOOR + (1.0 - RELEVANCE_FLOOR) * overlap;
    (
        score,
        json!({ "overlap": overlap, "matched_words": matched, "missing_words": missing }),
    )
}

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"0\d(?:[ .\-]?\d{2}){4}").unwrap())
}

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)(?:https?://|www\.)[^\s)]+").unwrap())
}

fn amount_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\d+(?:[.,]\d+)?\s?(?:€|euros?)").unwrap())
}

fn digits_of(text: &str) -> String {
    text.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Structured data in the answer that the expected summary does not back:
/// phone numbers, URLs, and euro amounts absent from the summary.
fn detect_red_flags(answer: &str, expected_summary: &str) -> Vec<String> {
    let mut flags = Vec::new();
    let summary_digits = digits_of(expected_summary);
    let summary_lower = expected_summary.to_lowercase();

    for m in phone_regex().find_iter(answer) {
        let digits = digits_of(m.as_str());
        if !summary_digits.contains(&digits) {
            flags.push(format!("unexpected phone number '{}'", m.as_str()));
        }
    }

    for m in url_regex().find_iter(answer) {
        let url = m.as_str().trim_end_matches(['.', ',', ';']);
        if !summary_lower.contains(&url.to_lowercase()) {
            flags.push(format!("unexpected URL '{}'", url));
        }
    }

    for m in amount_regex().find_iter(answer) {
        let digits = digits_of(m.as_str());
        if !summary_digits.contains(&digits) {
            flags.push(format!("unexpected amount '{}'", m.as_str().trim()));
        }
    }

    flags
}

/// Non-hallucination: binary admission check for off-topic questions;
/// otherwise 0.8 minus 0.4 per red flag, floored at 0. The 0.8 default is
/// benefit of the doubt: automatic detection is approximate.
pub fn non_hallucination(
    answer: &str,
    expected_summary: &str,
    question_type: QuestionType,
) -> (f64, Value) {
    if question_type.is_off_topic() {
        return match admits_ignorance(answer) {
            Some(phrase) => (1.0, json!({ "off_topic": true, "matched_phrase": phrase })),
            None => (0.0, json!({ "off_topic": true, "asserted_content": true })),
        };
    }

    let flags = detect_red_flags(answer, expected_summary);
    let score = (HALLUCINATION_DEFAULT - RED_FLAG_PENALTY * flags.len() as f64).max(0.0);
    (score, json!({ "red_flags": flags }))
}

/// Latency: step function over milliseconds. Boundaries are half-open on
/// the lower bound: exactly 500ms scores 0.8, not 1.0.
pub fn latency_score(latency_ms: f64) -> (f64, Value) {
    let (score, band) = if latency_ms < 500.0 {
        (1.0, "excellent")
    } else if latency_ms < 1000.0 {
        (0.8, "good")
    } else if latency_ms < 2000.0 {
        (0.5, "acceptable")
    } else {
        (0.2, "slow")
    };
    (score, json!({ "latency_ms": latency_ms, "band": band }))
}

/// Ignorance admission: only applicable to off-topic questions; all other
/// types score a neutral 1.0.
pub fn ignorance_admission(answer: &str, question_type: QuestionType) -> (f64, Value) {
    if !question_type.is_off_topic() {
        return (1.0, json!({ "applicable": false }));
    }
    match admits_ignorance(answer) {
        Some(phrase) => (1.0, json!({ "applicable": true, "matched_phrase": phrase })),
        None => (0.0, json!({ "applicable": true, "matched_phrase": null })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // CORRECTNESS
    // =========================================================================

    #[test]
    fn test_correctness_empty_keywords_scores_one() {
        let (score, _) = correctness("n'importe quoi", &[]);
        assert_eq!(score, 1.0);
        let (score, _) = correctness("", &[]);
        assert_eq!(score, 1.0);
    }

    #[test]
    fn test_correctness_fraction_of_keywords() {
        let keywords = vec!["5 jours".to_string(), "en ligne".to_string()];
        let (score, details) = correctness("Le délai est de 5 jours ouvrés.", &keywords);
        assert!((score - 0.5).abs() < 1e-9);
        assert_eq!(details["keywords_found"], json!(["5 jours"]));
        assert_eq!(details["keywords_missing"], json!(["en ligne"]));
    }

    #[test]
    fn test_correctness_is_case_insensitive() {
        let keywords = vec!["Mairie".to_string()];
        let (score, _) = correctness("rendez-vous à la MAIRIE centrale", &keywords);
        assert_eq!(score, 1.0);
    }

    // =========================================================================
    // RELEVANCE
    // =========================================================================

    #[test]
    fn test_relevance_off_topic_is_binary() {
        let (admit, _) = relevance(
            "Je ne sais pas répondre à cette question.",
            "Quelle est la capitale ?",
            QuestionType::HorsSujet,
        );
        assert_eq!(admit, 1.0);

        let (assertive, _) = relevance(
            "La capitale de la France est Paris.",
            "Quelle est la capitale ?",
            QuestionType::HorsSujet,
        );
        assert_eq!(assertive, 0.0);
    }

    #[test]
    fn test_relevance_short_answer_scores_zero() {
        let (score, details) = relevance("Oui.", "Quel est le délai ?", QuestionType::DirectMatch);
        assert_eq!(score, 0.0);
        assert_eq!(details["min_chars"], json!(MIN_ANSWER_CHARS));

        let (score, _) = relevance("", "Quel est le délai ?", QuestionType::DirectMatch);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_relevance_nontrivial_answer_never_zero() {
        // No lexical overlap at all, but long enough to clear the gate
        let (score, _) = relevance(
            "Cette phrase parle uniquement de jardinage urbain.",
            "Quel est le délai pour obtenir un passeport ?",
            QuestionType::Reformulation,
        );
        assert!(score > 0.0);
        assert!((score - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_relevance_full_overlap_scores_one() {
        let (score, _) = relevance(
            "Le délai pour obtenir un passeport est court.",
            "Quel délai pour obtenir un passeport ?",
            QuestionType::DirectMatch,
        );
        assert!((score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_significant_words_drop_stop_words() {
        let words = significant_words("Quel est le délai pour obtenir un acte ?");
        assert!(words.contains("délai"));
        assert!(words.contains("obtenir"));
        assert!(words.contains("acte"));
        assert!(!words.contains("quel"));
        assert!(!words.contains("pour"));
        assert!(!words.contains("le"));
    }

    // =========================================================================
    // NON-HALLUCINATION
    // =========================================================================

    #[test]
    fn test_hallucination_off_topic_follows_admission() {
        let (score, _) = non_hallucination(
            "Je ne sais pas répondre à cette question.",
            "",
            QuestionType::HorsSujet,
        );
        assert_eq!(score, 1.0);

        let (score, _) = non_hallucination(
            "La capitale de la France est Paris.",
            "",
            QuestionType::HorsSujet,
        );
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_hallucination_default_without_red_flags() {
        let (score, details) = non_hallucination(
            "Le délai est de 5 jours ouvrés.",
            "Le délai est de 5 jours ouvrés.",
            QuestionType::DirectMatch,
        );
        assert!((score - 0.8).abs() < 1e-9);
        assert_eq!(details["red_flags"], json!([]));
    }

    #[test]
    fn test_hallucination_flags_invented_phone_number() {
        let (score, details) = non_hallucination(
            "Appelez le 01 23 45 67 89 pour plus d'informations.",
            "La demande se fait en ligne.",
            QuestionType::DirectMatch,
        );
        assert!((score - 0.4).abs() < 1e-9);
        let flags = details["red_flags"].as_array().unwrap();
        assert_eq!(flags.len(), 1);
        assert!(flags[0].as_str().unwrap().contains("phone"));
    }

    #[test]
    fn test_hallucination_accepts_phone_number_from_summary() {
        let (score, _) = non_hallucination(
            "Appelez le 01 23 45 67 89.",
            "Contact au 01 23 45 67 89.",
            QuestionType::DirectMatch,
        );
        assert!((score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_hallucination_flags_invented_url_and_amount() {
        let (score, details) = non_hallucination(
            "Rendez-vous sur https://exemple.invalide/page, le tarif est de 150 €.",
            "La carte est gratuite, demande au guichet.",
            QuestionType::DirectMatch,
        );
        assert!((score - 0.0).abs() < 1e-9);
        assert_eq!(details["red_flags"].as_array().unwrap().len(), 2);
    }

    // =========================================================================
    // LATENCY (exact boundary semantics)
    // =========================================================================

    #[test]
    fn test_latency_step_function_boundaries() {
        assert_eq!(latency_score(499.0).0, 1.0);
        assert_eq!(latency_score(500.0).0, 0.8);
        assert_eq!(latency_score(999.0).0, 0.8);
        assert_eq!(latency_score(1000.0).0, 0.5);
        assert_eq!(latency_score(1999.0).0, 0.5);
        assert_eq!(latency_score(2000.0).0, 0.2);
        assert_eq!(latency_score(0.0).0, 1.0);
        assert_eq!(latency_score(10_000.0).0, 0.2);
    }

    // =========================================================================
    // IGNORANCE ADMISSION
    // =========================================================================

    #[test]
    fn test_ignorance_neutral_for_on_topic_questions() {
        for qtype in [
            QuestionType::DirectMatch,
            QuestionType::Reformulation,
            QuestionType::Complexe,
            QuestionType::Unknown,
        ] {
            let (score, details) = ignorance_admission("peu importe", qtype);
            assert_eq!(score, 1.0);
            assert_eq!(details["applicable"], json!(false));
        }
    }

    #[test]
    fn test_ignorance_detects_admission_phrases() {
        let admissions = [
            "Je ne sais pas.",
            "Désolé, je ne peux pas répondre à cela.",
            "Cette question ne concerne pas nos services.",
            "C'est hors de mon domaine de compétence.",
            "Je n'ai pas trouvé d'information pertinente dans notre FAQ.",
        ];
        for answer in admissions {
            let (score, _) = ignorance_admission(answer, QuestionType::HorsSujet);
            assert_eq!(score, 1.0, "should admit: {}", answer);
        }

        let (score, _) =
            ignorance_admission("La réponse est 42, c'est certain.", QuestionType::HorsSujet);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_off_topic_triple_is_consistent() {
        // For hors_sujet the three admission-driven criteria agree
        for answer in [
            "Je ne sais pas répondre à cette question.",
            "La capitale de la France est Paris.",
        ] {
            let (rel, _) = relevance(answer, "question ?", QuestionType::HorsSujet);
            let (hall, _) = non_hallucination(answer, "", QuestionType::HorsSujet);
            let (ign, _) = ignorance_admission(answer, QuestionType::HorsSujet);
            assert_eq!(rel, hall);
            assert_eq!(hall, ign);
            assert!(rel == 0.0 || rel == 1.0);
        }
    }
}
