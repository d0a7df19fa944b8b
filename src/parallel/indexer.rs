use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use rayon::prelude::*;
use crate::analysis::tokenizer::Tokenizer;
use crate::core::cancellation::CancellationToken;
use crate::core::config::ConfigurationSet;
use crate::core::document::{Document, FieldBoundary, FIELD_DELIMITER};
use crate::core::types::DocId;
use crate::index::inverted::InvertedIndex;

/// One document's tokenization output: n-gram occurrences ready to feed
/// `InvertedIndex::first_cycle_add`, plus the distinct whole words that
/// populate the word-matcher vocabulary. Tokenization touches no shared
/// state, so a batch's fragments can be built concurrently; only the
/// merge into the shared index needs the writer's exclusive lock.
struct DocumentFragment {
    doc_id: DocId,
    ngram_occurrences: Vec<(String, f32)>,
    words: Vec<String>,
}

/// Chunk-and-merge parallel document indexer: tokenizes a batch across
/// worker threads, then merges each document's fragment into the shared
/// `InvertedIndex` sequentially (document id order matters to
/// `first_cycle_add`'s same-doc accumulation check). Mirrors the
/// reference engine's `ParallelIndexer::index_batch` chunking pattern.
pub struct ParallelIndexer {
    pub workers: usize,
    pub batch_size: usize,
    pub progress: Arc<AtomicUsize>,
}

impl ParallelIndexer {
    pub fn new(workers: usize) -> Self {
        ParallelIndexer {
            workers: workers.max(1),
            batch_size: 1000,
            progress: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn progress(&self) -> usize {
        self.progress.load(Ordering::Relaxed)
    }

    /// Tokenizes and merges `documents` into `index`, populating
    /// `vocabulary` with each document's distinct whole words for the
    /// word matcher. Returns `false` if cancellation was observed before
    /// the batch finished; already-merged postings are left in place per
    /// the documented cancellation semantics (the caller marks the engine
    /// not-indexed).
    pub fn index_batch(
        &self,
        documents: &mut [Document],
        config: &ConfigurationSet,
        index: &mut InvertedIndex,
        vocabulary: &mut HashMap<String, Vec<DocId>>,
        cancellation: &CancellationToken,
    ) -> bool {
        self.progress.store(0, Ordering::Relaxed);
        let total = documents.len();
        let tokenizer = Tokenizer::from_config(config);
        let pool = rayon::ThreadPoolBuilder::new().num_threads(self.workers).build();

        for chunk in documents.chunks_mut(self.batch_size) {
            if cancellation.is_cancelled() {
                return false;
            }

            let fragments: Vec<DocumentFragment> = match &pool {
                Ok(pool) => pool.install(|| Self::build_fragments(chunk, &tokenizer, config)),
                Err(_) => Self::build_fragments(chunk, &tokenizer, config),
            };

            for fragment in fragments {
                for (term, weight) in &fragment.ngram_occurrences {
                    index.first_cycle_add(term, fragment.doc_id, *weight, config.tokenizer.suppress_duplicate_tokens);
                }
                for word in fragment.words {
                    vocabulary.entry(word).or_default().push(fragment.doc_id);
                }
                index.register_document();

                let done = self.progress.fetch_add(1, Ordering::Relaxed) + 1;
                if done % 1000 == 0 {
                    eprintln!("indexing progress: {done}/{total} documents");
                }
                if done % 100 == 0 && cancellation.is_cancelled() {
                    return false;
                }
            }
        }

        true
    }

    fn build_fragments(chunk: &mut [Document], tokenizer: &Tokenizer, config: &ConfigurationSet) -> Vec<DocumentFragment> {
        chunk
            .par_iter_mut()
            .map(|doc| Self::build_fragment(doc, tokenizer, config))
            .collect()
    }

    fn build_fragment(doc: &mut Document, tokenizer: &Tokenizer, config: &ConfigurationSet) -> DocumentFragment {
        let (text, boundaries) = doc.fields.concatenate_for_indexing(FIELD_DELIMITER, &config.field_weights);
        let truncated: String = text.chars().take(config.max_index_text_length).collect();
        doc.indexed_text = truncated.clone();

        let is_continuation = doc.segment_number > 0;
        let start_pad_offset = if is_continuation { 0 } else { config.start_pad_size as u32 };
        let out = tokenizer.tokenize(&truncated, is_continuation, false);

        let mut ngram_occurrences = Vec::with_capacity(out.ngrams.len());
        for token in &out.ngrams {
            let text_position = token.position.saturating_sub(start_pad_offset);
            let weight = weight_at_position(&boundaries, text_position);
            ngram_occurrences.push((token.text.clone(), weight));
        }

        let mut seen = HashSet::new();
        let mut words = Vec::new();
        for token in &out.words {
            let lowered = token.text.to_lowercase();
            if seen.insert(lowered.clone()) {
                words.push(lowered);
            }
        }

        DocumentFragment { doc_id: doc.id, ngram_occurrences, words }
    }
}

/// The weight in force at `position`: the last field boundary at or before
/// it, defaulting to 1.0 for text preceding any recorded boundary (should
/// not happen for non-empty documents, but keeps this total).
fn weight_at_position(boundaries: &[FieldBoundary], position: u32) -> f32 {
    boundaries
        .iter()
        .rev()
        .find(|b| b.position as u32 <= position)
        .map(|b| b.weight)
        .unwrap_or(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::{DocumentFields, Field};
    use crate::core::types::DocumentKey;

    fn doc(key: i64, id: DocId, text: &str) -> Document {
        let mut fields = DocumentFields::new();
        fields.insert("body", Field::text(text));
        Document::new(DocumentKey(key), id, fields)
    }

    #[test]
    fn batch_indexing_populates_postings_and_vocabulary() {
        let config = ConfigurationSet::default();
        let indexer = ParallelIndexer::new(2);
        let mut docs = vec![doc(1, 0, "fantasy novel"), doc(2, 1, "horror story")];
        let mut index = InvertedIndex::new(config.stop_term_limit);
        let mut vocabulary = HashMap::new();
        let cancellation = CancellationToken::new();

        let completed = indexer.index_batch(&mut docs, &config, &mut index, &mut vocabulary, &cancellation);
        assert!(completed);
        assert_eq!(index.doc_count, 2);
        assert!(vocabulary.contains_key("fantasy"));
        assert!(vocabulary.contains_key("horror"));
        assert!(!docs[0].indexed_text.is_empty());
    }

    #[test]
    fn cancellation_observed_between_chunks_stops_the_batch() {
        let config = ConfigurationSet::default();
        let indexer = ParallelIndexer::new(1);
        let mut docs = vec![doc(1, 0, "fantasy novel")];
        let mut index = InvertedIndex::new(config.stop_term_limit);
        let mut vocabulary = HashMap::new();
        let cancellation = CancellationToken::new();
        cancellation.cancel();

        let completed = indexer.index_batch(&mut docs, &config, &mut index, &mut vocabulary, &cancellation);
        assert!(!completed);
    }
}
