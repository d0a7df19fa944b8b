use serde::{Serialize, Deserialize};
use crate::core::types::DocId;

/// A token's text plus its postings. `df == -1` marks the term as a stop
/// term: its posting count exceeded `StopTermLimit` and it is excluded
/// from scoring. `doc_ids` is always strictly increasing and parallel to
/// `weights`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Term {
    pub df: i32,
    pub doc_ids: Vec<DocId>,
    pub weights: Vec<u8>,
}

impl Term {
    pub fn new() -> Self {
        Term { df: 0, doc_ids: Vec::new(), weights: Vec::new() }
    }

    pub fn is_stop(&self) -> bool {
        self.df < 0
    }

    pub fn mark_stop(&mut self) {
        self.df = -1;
        self.doc_ids.clear();
        self.weights.clear();
    }
}

impl Default for Term {
    fn default() -> Self {
        Self::new()
    }
}
