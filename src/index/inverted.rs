use std::collections::HashMap;
use serde::{Serialize, Deserialize};
use crate::core::types::DocId;
use crate::index::term::Term;

/// Term dictionary + postings, built in two phases: streaming counting
/// during ingestion (`first_cycle_add`), then a full two-pass TF·IDF
/// normalization (`calculate_weights`) run once per `CalculateWeights`
/// call or full rebuild.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvertedIndex {
    terms: HashMap<Box<str>, Term>,
    pub doc_count: usize,
    pub stop_term_limit: u32,
}

impl InvertedIndex {
    pub fn new(stop_term_limit: u32) -> Self {
        InvertedIndex { terms: HashMap::new(), doc_count: 0, stop_term_limit }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.terms.len()
    }

    pub fn stop_term_count(&self) -> usize {
        self.terms.values().filter(|t| t.is_stop()).count()
    }

    pub fn get(&self, text: &str) -> Option<&Term> {
        self.terms.get(text).filter(|t| !t.is_stop())
    }

    pub fn contains_live_term(&self, text: &str) -> bool {
        self.get(text).is_some()
    }

    /// Streaming posting-list construction for one `(term, doc_id)`
    /// occurrence, with a rounded field weight as raw term-frequency
    /// contribution. Stop-term detection triggers once postings cross
    /// `stop_term_limit`.
    pub fn first_cycle_add(&mut self, term_text: &str, doc_id: DocId, field_weight: f32, suppress_duplicates: bool) {
        let term = self.terms.entry(term_text.into()).or_insert_with(Term::new);
        if term.is_stop() {
            return;
        }

        if (term.doc_ids.len() as u32) < self.stop_term_limit {
            let weight_delta = field_weight.round().clamp(0.0, 255.0) as u8;
            match term.doc_ids.last().copied() {
                Some(last_doc) if last_doc == doc_id => {
                    if !suppress_duplicates {
                        let idx = term.weights.len() - 1;
                        term.weights[idx] = term.weights[idx].saturating_add(weight_delta);
                    }
                }
                _ => {
                    term.doc_ids.push(doc_id);
                    term.weights.push(weight_delta);
                    term.df += 1;
                }
            }

            if term.doc_ids.len() as u32 >= self.stop_term_limit {
                term.mark_stop();
            }
        }
    }

    pub fn register_document(&mut self) {
        self.doc_count += 1;
    }

    /// Two-pass TF·IDF normalization across all non-stop terms: first
    /// accumulate each document's squared vector length, then rewrite
    /// every posting weight in place as a quantized unit-vector component.
    pub fn calculate_weights(&mut self) {
        let n = (self.doc_count.max(1)) as f64;
        let mut vector_length_sq: HashMap<DocId, f64> = HashMap::new();

        for term in self.terms.values() {
            if term.is_stop() {
                continue;
            }
            let df = term.df.max(1) as f64;
            for (i, &doc_id) in term.doc_ids.iter().enumerate() {
                let tf = term.weights[i] as f64;
                let w = 1.0 + (n * tf / df).log10();
                *vector_length_sq.entry(doc_id).or_insert(0.0) += w * w;
            }
        }

        let norm: HashMap<DocId, f64> = vector_length_sq
            .into_iter()
            .map(|(doc_id, sq)| (doc_id, sq.sqrt()))
            .collect();

        for term in self.terms.values_mut() {
            if term.is_stop() {
                continue;
            }
            let df = term.df.max(1) as f64;
            for (i, &doc_id) in term.doc_ids.iter().enumerate() {
                let tf = term.weights[i] as f64;
                let w = 1.0 + (n * tf / df).log10();
                let doc_norm = norm.get(&doc_id).copied().unwrap_or(1.0).max(1e-9);
                let quantized = ((w / doc_norm) * 255.0).round().clamp(0.0, 255.0) as u8;
                term.weights[i] = quantized;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn postings_stay_strictly_increasing() {
        let mut index = InvertedIndex::new(1000);
        index.first_cycle_add("dragon", 1, 1.0, false);
        index.first_cycle_add("dragon", 2, 1.0, false);
        index.first_cycle_add("dragon", 5, 1.0, false);
        let term = index.get("dragon").unwrap();
        assert_eq!(term.doc_ids, vec![1, 2, 5]);
        assert_eq!(term.doc_ids.len(), term.weights.len());
    }

    #[test]
    fn crossing_stop_term_limit_clears_postings() {
        let mut index = InvertedIndex::new(2);
        index.first_cycle_add("the", 1, 1.0, false);
        index.first_cycle_add("the", 2, 1.0, false);
        let term = index.get("the");
        assert!(term.is_none());
    }

    #[test]
    fn normalization_produces_near_unit_vectors() {
        let mut index = InvertedIndex::new(1000);
        index.doc_count = 2;
        index.first_cycle_add("fantasy", 1, 2.0, true);
        index.first_cycle_add("novel", 1, 1.0, true);
        index.first_cycle_add("horror", 2, 1.0, true);
        index.calculate_weights();

        let mut sum_sq = 0.0f64;
        for term_text in ["fantasy", "novel"] {
            if let Some(term) = index.get(term_text) {
                if let Some(pos) = term.doc_ids.iter().position(|&d| d == 1) {
                    let w = term.weights[pos] as f64 / 255.0;
                    sum_sq += w * w;
                }
            }
        }
        assert!(sum_sq > 0.0);
    }
}
