use std::collections::HashMap;
use crate::core::document::Document;
use crate::core::types::{DocId, DocumentKey};
use crate::index::score_array::ScoreArray;

#[derive(Debug, Clone, Copy)]
pub struct ConsolidatedEntry {
    pub key: DocumentKey,
    pub score: u8,
}

/// Groups Stage-1 entries by `DocumentKey`, keeping the maximum score per
/// key. Because `ScoreArray::iter_desc` yields highest-scored entries
/// first, the first occurrence of a key is already its maximum.
pub fn consolidate(scores: &ScoreArray) -> Vec<ConsolidatedEntry> {
    let mut seen: HashMap<DocumentKey, u8> = HashMap::new();
    let mut ordered = Vec::new();
    for entry in scores.iter_desc() {
        if seen.insert(entry.key, entry.score).is_none() {
            ordered.push(ConsolidatedEntry { key: entry.key, score: entry.score });
        }
    }
    ordered
}

/// Resolves the document to run coverage scoring against for a given key:
/// the segment recorded as having the family's best Stage-1 score, falling
/// back to the document the key was looked up under if no entry exists.
pub fn resolve_best_segment<'a>(doc: &'a Document, best_segments: &HashMap<DocId, i32>, by_id: &HashMap<DocId, &'a Document>) -> &'a Document {
    let base_id = doc.base_id();
    match best_segments.get(&base_id) {
        Some(&segment_number) => {
            by_id
                .values()
                .find(|candidate| candidate.base_id() == base_id && candidate.segment_number == segment_number)
                .copied()
                .unwrap_or(doc)
        }
        None => doc,
    }
}

/// Scans the (already score-descending) candidate list from tail to head
/// and returns the largest index worth keeping, or `None` if nothing
/// qualifies (no truncation).
pub fn truncation_index(scores: &[u8], word_hits: &[u32], lcs: &[u8], min_hits_abs: u32, min_hits_rel: u32, truncation_score: u8) -> Option<usize> {
    debug_assert_eq!(scores.len(), word_hits.len());
    debug_assert_eq!(scores.len(), lcs.len());

    let max_word_hits = word_hits.iter().copied().max().unwrap_or(0);
    let min_hits = min_hits_abs.max(max_word_hits.saturating_sub(min_hits_rel));

    for i in (0..scores.len()).rev() {
        if word_hits[i] >= min_hits || lcs[i] > 0 || scores[i] >= truncation_score {
            return Some(i);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consolidate_keeps_max_score_per_key() {
        let mut scores = ScoreArray::new();
        scores.add(DocumentKey(1), 50, Some(0));
        scores.add(DocumentKey(1), 200, Some(1));
        scores.add(DocumentKey(2), 10, Some(0));

        let consolidated = consolidate(&scores);
        let doc1 = consolidated.iter().find(|e| e.key == DocumentKey(1)).unwrap();
        assert_eq!(doc1.score, 200);
    }

    #[test]
    fn truncation_index_finds_last_qualifying_entry() {
        let scores = vec![255, 250, 10, 9, 8];
        let word_hits = vec![3, 3, 0, 0, 0];
        let lcs = vec![0, 0, 0, 0, 0];
        let idx = truncation_index(&scores, &word_hits, &lcs, 1, 0, 254);
        assert_eq!(idx, Some(1));
    }

    #[test]
    fn truncation_index_none_when_nothing_qualifies() {
        let scores = vec![10, 9];
        let word_hits = vec![0, 0];
        let lcs = vec![0, 0];
        let idx = truncation_index(&scores, &word_hits, &lcs, 5, 0, 254);
        assert_eq!(idx, None);
    }
}
