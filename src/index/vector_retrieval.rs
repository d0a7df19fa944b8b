use std::collections::HashMap;
use crate::analysis::token::Token;
use crate::core::document::Document;
use crate::core::types::DocId;
use crate::index::inverted::InvertedIndex;
use crate::index::score_array::ScoreArray;

/// Stage-1 vector-space retrieval: walks each query n-gram's postings,
/// accumulating a signed partial product per document, then clamps to a
/// byte score. Ranking order approximates cosine similarity against the
/// normalized query vector without computing an explicit query norm.
pub struct Stage1Retrieval<'a> {
    index: &'a InvertedIndex,
}

/// Per-family best-segment tracking, keyed by `Document::base_id()`.
struct BestSegmentTracker {
    best: HashMap<DocId, (u8, i32)>,
}

impl BestSegmentTracker {
    fn new() -> Self {
        BestSegmentTracker { best: HashMap::new() }
    }

    fn observe(&mut self, base_id: DocId, score: u8, segment_number: i32) {
        self.best
            .entry(base_id)
            .and_modify(|(best_score, best_segment)| {
                if score > *best_score {
                    *best_score = score;
                    *best_segment = segment_number;
                }
            })
            .or_insert((score, segment_number));
    }

    fn into_map(self) -> HashMap<DocId, i32> {
        self.best.into_iter().map(|(base, (_, seg))| (base, seg)).collect()
    }
}

impl<'a> Stage1Retrieval<'a> {
    pub fn new(index: &'a InvertedIndex) -> Self {
        Stage1Retrieval { index }
    }

    pub fn retrieve(&self, query_ngrams: &[Token], documents: &[Document]) -> (ScoreArray, HashMap<DocId, i32>) {
        let mut query_tf: HashMap<&str, i32> = HashMap::new();
        for token in query_ngrams {
            *query_tf.entry(token.text.as_str()).or_insert(0) += 1;
        }

        let mut accumulator: HashMap<DocId, i32> = HashMap::new();
        for (text, &tf) in &query_tf {
            let Some(term) = self.index.get(text) else { continue };
            let query_weight = tf.min(255);
            for (i, &doc_id) in term.doc_ids.iter().enumerate() {
                let doc_weight = term.weights[i] as i32;
                *accumulator.entry(doc_id).or_insert(0) += query_weight * doc_weight;
            }
        }

        let by_id: HashMap<DocId, &Document> = documents.iter().map(|d| (d.id, d)).collect();
        let mut scores = ScoreArray::new();
        let mut tracker = BestSegmentTracker::new();

        for (doc_id, raw) in accumulator {
            let Some(doc) = by_id.get(&doc_id) else { continue };
            if doc.deleted {
                continue;
            }
            let clamped = raw.clamp(0, 255) as u8;
            scores.add(doc.key, clamped, Some(doc.segment_number));
            tracker.observe(doc.base_id(), clamped, doc.segment_number);
        }

        (scores, tracker.into_map())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::token::TokenKind;
    use crate::core::document::DocumentFields;
    use crate::core::types::DocumentKey;

    fn doc(key: i64, id: DocId, segment: i32) -> Document {
        let mut d = Document::new(DocumentKey(key), id, DocumentFields::new());
        d.segment_number = segment;
        d
    }

    #[test]
    fn ranks_documents_by_accumulated_product() {
        let mut index = InvertedIndex::new(1000);
        index.first_cycle_add("fa", 1, 1.0, true);
        index.first_cycle_add("fa", 2, 1.0, true);
        index.calculate_weights();
        // bump doc 2's weight above doc 1's by adding a second occurrence
        let mut index = InvertedIndex::new(1000);
        index.first_cycle_add("fa", 1, 1.0, true);
        index.first_cycle_add("fa", 2, 3.0, true);
        index.calculate_weights();

        let docs = vec![doc(1, 1, 0), doc(2, 2, 0)];
        let query = vec![Token::new("fa".into(), 0, TokenKind::NGram(2))];
        let retrieval = Stage1Retrieval::new(&index);
        let (scores, _) = retrieval.retrieve(&query, &docs);
        let top = scores.top_k(2);
        assert_eq!(top[0].key, DocumentKey(2));
    }

    #[test]
    fn tracks_best_segment_per_family() {
        let mut index = InvertedIndex::new(1000);
        index.first_cycle_add("dr", 10, 1.0, true);
        index.first_cycle_add("dr", 11, 5.0, true);
        index.calculate_weights();

        let docs = vec![doc(100, 10, 0), doc(100, 11, 1)];
        let query = vec![Token::new("dr".into(), 0, TokenKind::NGram(2))];
        let retrieval = Stage1Retrieval::new(&index);
        let (_, best_segments) = retrieval.retrieve(&query, &docs);
        assert_eq!(best_segments.get(&10), Some(&1));
    }
}
