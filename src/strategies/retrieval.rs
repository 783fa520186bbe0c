//! Lexical retrieval over the FAQ corpus
//!
//! Ranks FAQ entries by significant-word overlap with a query and returns
//! the top-K with scores. Deterministic by construction: ties sort by entry
//! id, so the same corpus and query always produce the same ranking.

use std::collections::HashSet;

use crate::golden::{FaqBase, FaqEntry};
use crate::scoring::criteria::significant_words;

/// One ranked FAQ entry
#[derive(Debug, Clone)]
pub struct RankedEntry {
    pub entry: FaqEntry,
    /// Fraction of the query's significant words found in the entry, in [0, 1]
    pub score: f64,
}

/// Index of the FAQ corpus for lexical similarity search
///
/// Built once at startup, queried for every question. Each entry is indexed
/// by the significant words of its question and answer combined.
pub struct RetrievalIndex {
    entries: Vec<(FaqEntry, HashSet<String>)>,
}

impl RetrievalIndex {
    /// Index every entry of the FAQ base
    pub fn new(faq: &FaqBase) -> Self {
        let entries = faq
            .entries
            .iter()
            .map(|entry| {
                let text = format!("{} {}", entry.question, entry.answer);
                (entry.clone(), significant_words(&text))
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Rank entries by similarity to the query, best first, at most `top_k`
    ///
    /// Score is the fraction of the query's significant words present in the
    /// entry's indexed words. A query with no significant words matches
    /// nothing (empty result).
    pub fn search(&self, query: &str, top_k: usize) -> Vec<RankedEntry> {
        let query_words = significant_words(query);
        if query_words.is_empty() {
            return Vec::new();
        }

        let mut ranked: Vec<RankedEntry> = self
            .entries
            .iter()
            .map(|(entry, words)| {
                let hits = query_words.iter().filter(|w| words.contains(*w)).count();
                RankedEntry {
                    entry: entry.clone(),
                    score: hits as f64 / query_words.len() as f64,
                }
            })
            .filter(|r| r.score > 0.0)
            .collect();

        // Score descending, id ascending on ties
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.entry.id.cmp(&b.entry.id))
        });
        ranked.truncate(top_k);
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faq() -> FaqBase {
        serde_json::from_str(
            r#"{
  "faq": [
    {
      "id": "FAQ_001",
      "question": "Comment obtenir un acte de naissance ?",
      "answer": "Vous pouvez faire la demande en ligne. Le délai est de 5 jours ouvrés."
    },
    {
      "id": "FAQ_002",
      "question": "Quels sont les horaires de la mairie ?",
      "answer": "La mairie est ouverte du lundi au vendredi de 8h30 à 17h00."
    },
    {
      "id": "FAQ_003",
      "question": "Comment obtenir une place en crèche ?",
      "answer": "La demande se fait en ligne, les attributions ont lieu en commission."
    }
  ]
}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_search_ranks_best_match_first() {
        let index = RetrievalIndex::new(&faq());
        let results = index.search("Comment obtenir un acte de naissance ?", 3);

        assert!(!results.is_empty());
        assert_eq!(results[0].entry.id, "FAQ_001");
        assert!(results[0].score > results.last().unwrap().score || results.len() == 1);
    }

    #[test]
    fn test_search_respects_top_k() {
        let index = RetrievalIndex::new(&faq());
        let results = index.search("Comment obtenir un acte de naissance ?", 1);
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_search_no_match_returns_empty() {
        let index = RetrievalIndex::new(&faq());
        let results = index.search("Quelle est la capitale de l'Australie ?", 3);
        assert!(results.is_empty());
    }

    #[test]
    fn test_search_tie_break_is_deterministic() {
        // Both "obtenir" questions tie on a one-word query; lower id wins
        let index = RetrievalIndex::new(&faq());
        let results = index.search("obtenir", 3);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].entry.id, "FAQ_001");
        assert_eq!(results[1].entry.id, "FAQ_003");
        assert_eq!(results[0].score, results[1].score);
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        let index = RetrievalIndex::new(&faq());
        assert!(index.search("", 3).is_empty());
        assert!(index.search("le la de", 3).is_empty());
    }
}
