use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;
use roaring::RoaringBitmap;
use serde::{Serialize, Deserialize};

use crate::analysis::normalizer::TextNormalizer;
use crate::analysis::tokenizer::Tokenizer;
use crate::core::cancellation::{CancellationToken, Deadline};
use crate::core::config::{ConfigRegistry, ConfigurationSet};
use crate::core::document::Document;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::stats::EngineStatistics;
use crate::core::types::{DocId, DocumentKey};
use crate::filter::cache::FilterCache;
use crate::filter::vm::FilterVm;
use crate::index::inverted::InvertedIndex;
use crate::index::vector_retrieval::Stage1Retrieval;
use crate::memory::ScratchArena;
use crate::parallel::indexer::ParallelIndexer;
use crate::scoring::coverage::{CoverageScorer, CoverageSetup, LcsCache};
use crate::search::facets::compute_facets;
use crate::search::results::{Query, SearchResult};
use crate::search::segment::{consolidate, resolve_best_segment, truncation_index};
use crate::search::sort::sort_documents;
use crate::search::word_matcher::WordMatcher;

const PERSIST_MAGIC: &[u8] = b"GLYPHDEX-ENGINE-V1";
const PERSIST_VERSION: u16 = 1;

/// Everything the read/write lock guards. Mutated only while holding the
/// write half; `Search` holds only the read half for its whole duration,
/// so it always sees a consistent snapshot (§5).
struct EngineState {
    config: ConfigurationSet,
    index: InvertedIndex,
    vocabulary: HashMap<String, Vec<DocId>>,
    word_matcher: Option<WordMatcher>,
    documents: Vec<Document>,
    key_index: HashMap<DocumentKey, Vec<DocId>>,
    /// Mirrors every document's `deleted` flag as a compressed bitmap of
    /// internal ids, the way the reference engine's reader pool keeps a
    /// `RoaringBitmap` of deleted docs alongside its segment readers for
    /// cheap visibility checks without touching the document table itself.
    deleted_ids: RoaringBitmap,
    is_indexed: bool,
    next_id: DocId,
}

impl EngineState {
    fn new(config: ConfigurationSet) -> Self {
        let stop_term_limit = config.stop_term_limit;
        EngineState {
            config,
            index: InvertedIndex::new(stop_term_limit),
            vocabulary: HashMap::new(),
            word_matcher: None,
            documents: Vec::new(),
            key_index: HashMap::new(),
            deleted_ids: RoaringBitmap::new(),
            is_indexed: false,
            next_id: 0,
        }
    }

    fn register_document(&mut self, doc: Document) {
        self.key_index.entry(doc.key).or_default().push(doc.id);
        self.documents.push(doc);
    }

    fn is_deleted(&self, doc_id: DocId) -> bool {
        self.deleted_ids.contains(doc_id)
    }
}

#[derive(Serialize, Deserialize)]
struct PersistedState {
    index: InvertedIndex,
    documents: Vec<Document>,
    vocabulary: HashMap<String, Vec<DocId>>,
    is_indexed: bool,
    next_id: DocId,
}

/// A single candidate surviving retrieval, before filter/boost/sort/clip.
/// `doc_id` is the representative (best-segment-resolved) internal id used
/// for field lookups; `key` is what's reported back to the caller.
struct CandidateRecord {
    key: DocumentKey,
    doc_id: DocId,
    score: u8,
    word_hits: u32,
    lcs: u8,
}

/// The orchestrator. Owns a shared, rw-lock-gated `EngineState`, a
/// compiled-filter cache, and a scratch-buffer arena for per-search
/// allocations. Cloning an `Engine` is cheap — every field is an `Arc` — so
/// callers can hand out handles to the same underlying index freely;
/// coordination is entirely the `RwLock`'s job, following the reference
/// engine's single-lock-per-shard concurrency shape (REDESIGN FLAG 2).
#[derive(Clone)]
pub struct Engine {
    state: Arc<RwLock<EngineState>>,
    filter_cache: Arc<FilterCache>,
    arena: Arc<ScratchArena>,
    indexing_cancellation: CancellationToken,
}

impl Engine {
    pub fn new(config: ConfigurationSet) -> Self {
        let cache_size = config.filter_cache_size;
        Engine {
            state: Arc::new(RwLock::new(EngineState::new(config))),
            filter_cache: Arc::new(FilterCache::new(cache_size)),
            arena: Arc::new(ScratchArena::new()),
            indexing_cancellation: CancellationToken::new(),
        }
    }

    pub fn from_registry(registry: &ConfigRegistry, config_id: u32) -> Result<Self> {
        let config = registry.get(config_id)?;
        Ok(Engine::new((*config).clone()))
    }

    /// Cooperative cancellation for an in-flight `IndexDocuments` call,
    /// checked at the suspension points documented in §5.
    pub fn cancel_indexing(&self) {
        self.indexing_cancellation.cancel();
    }

    pub fn scratch_arena(&self) -> Arc<ScratchArena> {
        Arc::clone(&self.arena)
    }

    /// Batch ingest + full (re)build: assigns ids, tokenizes and merges the
    /// whole batch via `ParallelIndexer`, runs two-pass normalization, and
    /// rebuilds the word matcher. Marks the engine indexed on success.
    pub fn index_documents(&self, docs: Vec<Document>) -> Result<()> {
        if docs.is_empty() {
            return Ok(());
        }

        let mut state = self.state.write();
        if state.documents.len() + docs.len() > state.config.max_documents {
            return Err(Error::new(ErrorKind::InvalidArgument, "document collection would exceed MaxDocuments".into()));
        }

        let mut batch = docs;
        for doc in &mut batch {
            doc.id = state.next_id;
            state.next_id += 1;
        }

        self.indexing_cancellation.reset();
        let workers = num_cpus::get().max(1);
        let indexer = ParallelIndexer::new(workers);
        let completed = indexer.index_batch(
            &mut batch,
            &state.config,
            &mut state.index,
            &mut state.vocabulary,
            &self.indexing_cancellation,
        );

        for doc in batch {
            state.register_document(doc);
        }

        if !completed {
            state.is_indexed = false;
            return Ok(());
        }

        self.rebuild_after_mutation(&mut state)
    }

    /// Incremental single-document add: tokenizes and merges the one
    /// document immediately, but defers two-pass renormalization and the
    /// word-matcher rebuild to the next `CalculateWeights` call, marking
    /// the engine not-indexed in the meantime (§4.3, §6).
    pub fn index_document(&self, mut doc: Document) -> Result<()> {
        let mut state = self.state.write();
        if state.documents.len() + 1 > state.config.max_documents {
            return Err(Error::new(ErrorKind::InvalidArgument, "document collection would exceed MaxDocuments".into()));
        }

        doc.id = state.next_id;
        state.next_id += 1;

        let mut single = [doc];
        let indexer = ParallelIndexer::new(1);
        let cancellation = CancellationToken::new();
        indexer.index_batch(&mut single, &state.config, &mut state.index, &mut state.vocabulary, &cancellation);

        let [doc] = single;
        state.register_document(doc);
        state.is_indexed = false;
        Ok(())
    }

    /// Runs two-pass TF·IDF normalization and rebuilds the word matcher
    /// from the accumulated vocabulary, marking the engine indexed.
    pub fn calculate_weights(&self) -> Result<()> {
        let mut state = self.state.write();
        self.rebuild_after_mutation(&mut state)
    }

    /// Async wrapper around `index_documents`: schedules the blocking
    /// ingest on a worker thread (§5 — async entry points are thin
    /// wrappers, not a second implementation). `cancel_indexing` remains
    /// the only way to interrupt it once scheduled.
    pub async fn index_documents_async(&self, docs: Vec<Document>) -> Result<()> {
        let engine = self.clone();
        tokio::task::spawn_blocking(move || engine.index_documents(docs))
            .await
            .map_err(|err| Error::new(ErrorKind::Internal, format!("index_documents task panicked: {err}")))?
    }

    /// Async wrapper around `index_document`.
    pub async fn index_document_async(&self, doc: Document) -> Result<()> {
        let engine = self.clone();
        tokio::task::spawn_blocking(move || engine.index_document(doc))
            .await
            .map_err(|err| Error::new(ErrorKind::Internal, format!("index_document task panicked: {err}")))?
    }

    /// Async wrapper around `calculate_weights`.
    pub async fn calculate_weights_async(&self) -> Result<()> {
        let engine = self.clone();
        tokio::task::spawn_blocking(move || engine.calculate_weights())
            .await
            .map_err(|err| Error::new(ErrorKind::Internal, format!("calculate_weights task panicked: {err}")))?
    }

    /// Async wrapper around `search`. The read lock is acquired on the
    /// worker thread, not the caller's; cooperative cancellation inside a
    /// single search still relies on `TimeOutLimitMilliseconds`, not on
    /// dropping the returned future (§5: scoring loops have no cooperative
    /// yield points of their own).
    pub async fn search_async(&self, query: Query) -> Result<SearchResult> {
        let engine = self.clone();
        tokio::task::spawn_blocking(move || engine.search(&query))
            .await
            .map_err(|err| Error::new(ErrorKind::Internal, format!("search task panicked: {err}")))?
    }

    fn rebuild_after_mutation(&self, state: &mut EngineState) -> Result<()> {
        if self.indexing_cancellation.is_cancelled() {
            state.is_indexed = false;
            return Ok(());
        }
        state.index.calculate_weights();
        state.word_matcher = Some(build_word_matcher(&state.vocabulary, state.config.stop_term_limit, state.config.word_matcher.clone())?);
        state.is_indexed = true;
        Ok(())
    }

    /// Soft-deletes every internal document stored under `key`. Returns the
    /// number of documents marked. Deleted documents are excluded from
    /// retrieval but remain resolvable via `GetDocument`/`GetDocuments`.
    pub fn delete_document(&self, key: DocumentKey) -> usize {
        let mut state = self.state.write();
        let Some(ids) = state.key_index.get(&key).cloned() else { return 0 };
        let mut count = 0;
        for doc in state.documents.iter_mut() {
            if ids.contains(&doc.id) && !doc.deleted {
                doc.deleted = true;
                state.deleted_ids.insert(doc.id);
                count += 1;
            }
        }
        count
    }

    pub fn get_document(&self, key: DocumentKey) -> Option<Document> {
        let state = self.state.read();
        let id = state.key_index.get(&key)?.first().copied()?;
        state.documents.iter().find(|d| d.id == id).cloned()
    }

    pub fn get_documents(&self, key: DocumentKey) -> Vec<Document> {
        let state = self.state.read();
        let Some(ids) = state.key_index.get(&key) else { return Vec::new() };
        state.documents.iter().filter(|d| ids.contains(&d.id)).cloned().collect()
    }

    pub fn statistics(&self) -> EngineStatistics {
        let state = self.state.read();
        EngineStatistics {
            document_count: state.documents.len(),
            vocabulary_size: state.index.vocabulary_size(),
            stop_term_count: state.index.stop_term_count(),
            deleted_document_count: state.documents.iter().filter(|d| d.deleted).count(),
            is_indexed: state.is_indexed,
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let state = self.state.read();
        let persisted = PersistedState {
            index: state.index.clone(),
            documents: state.documents.clone(),
            vocabulary: state.vocabulary.clone(),
            is_indexed: state.is_indexed,
            next_id: state.next_id,
        };
        let has_word_matcher = state.word_matcher.is_some();
        drop(state);

        let payload = bincode::serialize(&persisted)?;
        let mut out = Vec::with_capacity(PERSIST_MAGIC.len() + 2 + 1 + payload.len());
        out.extend_from_slice(PERSIST_MAGIC);
        out.extend_from_slice(&PERSIST_VERSION.to_le_bytes());
        out.push(has_word_matcher as u8);
        out.extend_from_slice(&payload);

        std::fs::write(path, out)?;
        Ok(())
    }

    /// Loads an engine dump against a caller-supplied `config` (the dump
    /// itself carries no configuration — §3a's `ConfigRegistry` note keeps
    /// that choice with the caller, not the file). Rejects a dump whose
    /// word-matcher-presence flag claims a vocabulary that isn't there.
    pub fn load(path: impl AsRef<Path>, config: ConfigurationSet) -> Result<Engine> {
        let bytes = std::fs::read(path)?;
        if bytes.len() < PERSIST_MAGIC.len() + 3 || &bytes[..PERSIST_MAGIC.len()] != PERSIST_MAGIC {
            return Err(Error::new(ErrorKind::InvalidConfiguration, "bad engine dump magic".into()));
        }
        let mut cursor = PERSIST_MAGIC.len();
        let version = u16::from_le_bytes([bytes[cursor], bytes[cursor + 1]]);
        cursor += 2;
        if version != PERSIST_VERSION {
            return Err(Error::new(ErrorKind::InvalidConfiguration, format!("unsupported engine dump version {}", version)));
        }
        let had_word_matcher = bytes[cursor] != 0;
        cursor += 1;

        let persisted: PersistedState = bincode::deserialize(&bytes[cursor..])?;
        if had_word_matcher && persisted.vocabulary.is_empty() && !persisted.documents.is_empty() {
            return Err(Error::new(ErrorKind::InvalidConfiguration, "word-matcher presence flag set but vocabulary payload is missing".into()));
        }

        let engine = Engine::new(config);
        {
            let mut state = engine.state.write();
            state.index = persisted.index;
            state.vocabulary = persisted.vocabulary;
            state.next_id = persisted.next_id;
            for doc in persisted.documents {
                state.key_index.entry(doc.key).or_default().push(doc.id);
                if doc.deleted {
                    state.deleted_ids.insert(doc.id);
                }
                state.documents.push(doc);
            }
            state.is_indexed = persisted.is_indexed;
            if had_word_matcher {
                state.word_matcher = Some(build_word_matcher(&state.vocabulary, state.config.stop_term_limit, state.config.word_matcher.clone())?);
            }
        }
        Ok(engine)
    }

    /// Runs the full retrieval pipeline: Stage-1 vector retrieval, the word
    /// matcher, Stage-2 coverage scoring and fusion, segment consolidation,
    /// truncation, filter/boost/sort, facets, and top-K clipping.
    pub fn search(&self, query: &Query) -> Result<SearchResult> {
        let started = Instant::now();
        let state = self.state.read();

        if !state.is_indexed {
            return Ok(SearchResult::default());
        }

        let normalizer = TextNormalizer::new(state.config.text_normalizer.clone());
        let tokenizer = Tokenizer::from_config(&state.config);
        let normalized_query = normalizer.normalize(&query.text);
        let by_id: HashMap<DocId, &Document> = state.documents.iter().map(|d| (d.id, d)).collect();

        let mut did_time_out = false;
        let mut candidates: Vec<CandidateRecord>;

        if normalized_query.trim().is_empty() {
            if !query.enable_facets {
                return Ok(SearchResult::default());
            }
            candidates = state
                .documents
                .iter()
                .filter(|d| !state.is_deleted(d.id))
                .map(|d| CandidateRecord { key: d.key, doc_id: d.id, score: 255, word_hits: 0, lcs: 0 })
                .collect();
        } else {
            let tokenized = tokenizer.tokenize(&normalized_query, false, true);
            let (score_array, best_segments) = Stage1Retrieval::new(&state.index).retrieve(&tokenized.ngrams, &state.documents);
            let consolidated = consolidate(&score_array);

            let mut ordered_keys: Vec<DocumentKey> = Vec::new();
            let mut seen_keys: HashSet<DocumentKey> = HashSet::new();
            let mut stage1_score: HashMap<DocumentKey, u8> = HashMap::new();
            for entry in consolidated.iter().take(query.coverage_depth.max(1)) {
                stage1_score.insert(entry.key, entry.score);
                if seen_keys.insert(entry.key) {
                    ordered_keys.push(entry.key);
                }
            }

            if query.enable_coverage {
                if let Some(matcher) = &state.word_matcher {
                    let raw_words = tokenizer.word_tokens_for_coverage(&normalized_query, 1);
                    let mut wm_keys: Vec<DocumentKey> = Vec::new();
                    for word in &raw_words {
                        for &doc_id in matcher.exact(word) {
                            if let Some(doc) = by_id.get(&doc_id) {
                                wm_keys.push(doc.key);
                            }
                        }
                        for doc_id in matcher.ld1(word) {
                            if let Some(doc) = by_id.get(&doc_id) {
                                wm_keys.push(doc.key);
                            }
                        }
                        for doc_id in matcher.affix(word) {
                            if let Some(doc) = by_id.get(&doc_id) {
                                wm_keys.push(doc.key);
                            }
                        }
                    }
                    for key in wm_keys {
                        if seen_keys.insert(key) {
                            ordered_keys.push(key);
                        }
                    }
                }
            }

            candidates = Vec::with_capacity(ordered_keys.len());
            if query.enable_coverage {
                let coverage_setup = query.coverage_setup.clone().unwrap_or_default();
                let scorer = CoverageScorer::new(coverage_setup.clone());
                let mut lcs_cache = LcsCache::new();
                let query_words = tokenizer.word_tokens_for_coverage(&normalized_query, coverage_setup.min_word_size);
                let deadline = Deadline::from_millis(query.clamped_timeout_millis());

                for key in ordered_keys {
                    if deadline.is_expired() {
                        did_time_out = true;
                        break;
                    }
                    let Some(&doc_id) = state.key_index.get(&key).and_then(|ids| ids.first()) else { continue };
                    let Some(&doc) = by_id.get(&doc_id) else { continue };
                    if state.is_deleted(doc_id) {
                        continue;
                    }
                    let resolved = resolve_best_segment(doc, &best_segments, &by_id);
                    let doc_words = tokenizer.word_tokens_for_coverage(&resolved.indexed_text, coverage_setup.min_word_size);
                    let s2 = scorer.score(&query_words, &doc_words, &mut lcs_cache, key, &normalized_query, &resolved.indexed_text);
                    let (lcs, word_hits) = lcs_cache.get(key).unwrap_or((0, 0));
                    if lcs == 0 && word_hits == 0 {
                        // No lexical overlap at all: drop rather than leak a
                        // Stage-1-only match through to the final ranking.
                        continue;
                    }
                    let score = match stage1_score.get(&key) {
                        Some(&s1) => s1.max(s2),
                        None => s2,
                    };
                    candidates.push(CandidateRecord { key, doc_id: resolved.id, score, word_hits, lcs });
                }
            } else {
                for key in ordered_keys {
                    let Some(&score) = stage1_score.get(&key) else { continue };
                    let Some(&doc_id) = state.key_index.get(&key).and_then(|ids| ids.first()) else { continue };
                    if state.is_deleted(doc_id) {
                        continue;
                    }
                    candidates.push(CandidateRecord { key, doc_id, score, word_hits: 0, lcs: 0 });
                }
            }
        }

        candidates.sort_by(|a, b| b.score.cmp(&a.score));

        if let Some(filter) = &query.filter {
            let compiled = self.filter_cache.compile(filter)?;
            let vm = FilterVm::new(&compiled);
            candidates.retain(|c| by_id.get(&c.doc_id).map(|doc| vm.run(doc)).unwrap_or(false));
        }

        let mut truncation_index_value = None;
        if query.truncate {
            let scores: Vec<u8> = candidates.iter().map(|c| c.score).collect();
            let word_hits: Vec<u32> = candidates.iter().map(|c| c.word_hits).collect();
            let lcs: Vec<u8> = candidates.iter().map(|c| c.lcs).collect();
            let coverage_setup = query.coverage_setup.clone().unwrap_or_default();
            let idx = truncation_index(&scores, &word_hits, &lcs, coverage_setup.min_word_hits_abs, coverage_setup.min_word_hits_relative, query.truncation_score);
            truncation_index_value = idx;
            match idx {
                Some(i) => candidates.truncate(i + 1),
                None => candidates.clear(),
            }
        }

        if query.enable_boost && !query.boosts.is_empty() {
            for candidate in &mut candidates {
                let Some(doc) = by_id.get(&candidate.doc_id) else { continue };
                let mut strength_sum: u32 = 0;
                for boost in &query.boosts {
                    let compiled = self.filter_cache.compile(&boost.filter)?;
                    let vm = FilterVm::new(&compiled);
                    if vm.run(doc) {
                        strength_sum += boost.strength as u32;
                    }
                }
                candidate.score = candidate.score.saturating_add(strength_sum.min(255) as u8);
            }
            candidates.sort_by(|a, b| b.score.cmp(&a.score));
        }

        if let Some(spec) = &query.sort_by {
            let mut refs: Vec<&Document> = candidates.iter().filter_map(|c| by_id.get(&c.doc_id).copied()).collect();
            sort_documents(&mut refs, spec);
            let order: HashMap<DocId, usize> = refs.iter().enumerate().map(|(i, d)| (d.id, i)).collect();
            candidates.sort_by_key(|c| order.get(&c.doc_id).copied().unwrap_or(usize::MAX));
        }

        let facets = if query.enable_facets {
            let refs: Vec<&Document> = candidates.iter().filter_map(|c| by_id.get(&c.doc_id).copied()).collect();
            Some(compute_facets(&refs, None))
        } else {
            None
        };

        let total_candidates = candidates.len();
        candidates.truncate(query.max_records);

        let records = candidates
            .iter()
            .map(|c| {
                let segment = by_id.get(&c.doc_id).map(|d| d.segment_number);
                crate::index::score_array::ScoreEntry { score: c.score, key: c.key, segment }
            })
            .collect();

        Ok(SearchResult {
            records,
            facets,
            truncation_index: truncation_index_value,
            truncation_score: query.truncation_score,
            did_time_out,
            total_candidates,
            execution_time_ms: started.elapsed().as_millis() as u64,
        })
    }
}

/// Builds the word matcher from the accumulated per-document vocabulary,
/// excluding any word whose posting count has crossed `stop_term_limit` —
/// the same threshold the inverted index applies to n-gram terms, applied
/// here directly to whole-word frequency so an overwhelmingly common word
/// (the kind of query that should match nothing lexically distinctive)
/// can't surface word-matcher candidates either.
fn build_word_matcher(vocabulary: &HashMap<String, Vec<DocId>>, stop_term_limit: u32, setup: crate::core::config::WordMatcherSetup) -> Result<WordMatcher> {
    let filtered: HashMap<String, Vec<DocId>> = vocabulary
        .iter()
        .filter(|(_, doc_ids)| (doc_ids.len() as u32) < stop_term_limit)
        .map(|(word, doc_ids)| (word.clone(), doc_ids.clone()))
        .collect();
    WordMatcher::build(&filtered, setup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::{DocumentFields, Field};
    use crate::filter::ast::{CompareOp, Constant, Filter};
    use crate::search::results::{Boost, Query};

    fn doc(key: i64, genre: &str, year: f64, body: &str) -> Document {
        let mut fields = DocumentFields::new();
        fields.insert("body", Field::text(body));
        fields.insert("genre", Field::keyword(genre));
        let mut year_field = Field::keyword("");
        year_field.value = crate::core::types::FieldValue::Number(year);
        year_field.indexable = false;
        year_field.word_indexing = false;
        fields.insert("year", year_field);
        Document::new(DocumentKey(key), 0, fields)
    }

    #[test]
    fn exact_query_scores_the_matching_document_at_255() {
        let engine = Engine::new(ConfigurationSet::default());
        engine
            .index_documents(vec![doc(1, "Fantasy", 2005.0, "fantasy novel"), doc(2, "Horror", 2010.0, "horror story")])
            .unwrap();

        let result = engine.search(&Query::new("fantasy")).unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].key, DocumentKey(1));
        assert_eq!(result.records[0].score, 255);
    }

    #[test]
    fn misspelled_query_still_matches_via_ngram_overlap_and_lcs() {
        let engine = Engine::new(ConfigurationSet::default());
        engine.index_documents(vec![doc(1, "Tech", 2000.0, "algorithm")]).unwrap();

        let result = engine.search(&Query::new("algro")).unwrap();
        assert!(result.records.iter().any(|r| r.key == DocumentKey(1) && r.score > 0));
    }

    #[test]
    fn empty_query_with_facets_returns_all_live_documents_and_facet_counts() {
        let engine = Engine::new(ConfigurationSet::default());
        engine
            .index_documents(vec![
                doc(1, "Fantasy", 2005.0, "fantasy novel"),
                doc(2, "Fantasy", 1990.0, "fantasy epic"),
                doc(3, "Horror", 2010.0, "horror story"),
            ])
            .unwrap();

        let mut query = Query::new("");
        query.enable_facets = true;
        query.filter = Some(Filter::Value { field: "genre".into(), op: CompareOp::Eq, value: Constant::String("Fantasy".into()) }.and(
            Filter::Value { field: "year".into(), op: CompareOp::Gte, value: Constant::Number(2000.0) },
        ));

        let result = engine.search(&query).unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].key, DocumentKey(1));
        let facets = result.facets.unwrap();
        assert_eq!(facets["genre"], vec![("Fantasy".to_string(), 1)]);
    }

    #[test]
    fn boosted_documents_outrank_unboosted_equal_matches() {
        let engine = Engine::new(ConfigurationSet::default());
        engine
            .index_documents(vec![doc(1, "Fantasy", 2005.0, "fantasy story"), doc(2, "Fantasy", 1990.0, "fantasy story")])
            .unwrap();

        // Two-word query where only "fantasy" matches: keeps the base
        // coverage score below 255 so the boost can actually move the
        // ranking instead of saturating into a tie.
        let mut query = Query::new("fantasy mystery");
        query.boosts.push(Boost {
            filter: Filter::Value { field: "year".into(), op: CompareOp::Gte, value: Constant::Number(2000.0) },
            strength: 3,
        });

        let result = engine.search(&query).unwrap();
        assert_eq!(result.records[0].key, DocumentKey(1));
        assert!(result.records[0].score > result.records[1].score);
    }

    #[test]
    fn search_before_calculate_weights_returns_empty_not_an_error() {
        let engine = Engine::new(ConfigurationSet::default());
        let result = engine.search(&Query::new("anything")).unwrap();
        assert!(result.records.is_empty());
    }

    #[test]
    fn incremental_add_marks_engine_not_indexed_until_recalculated() {
        let engine = Engine::new(ConfigurationSet::default());
        engine.index_documents(vec![doc(1, "Fantasy", 2005.0, "fantasy novel")]).unwrap();
        assert!(engine.statistics().is_indexed);

        engine.index_document(doc(2, "Horror", 2011.0, "horror tale")).unwrap();
        assert!(!engine.statistics().is_indexed);

        engine.calculate_weights().unwrap();
        assert!(engine.statistics().is_indexed);
    }

    #[test]
    fn deleted_documents_are_excluded_from_search() {
        let engine = Engine::new(ConfigurationSet::default());
        engine.index_documents(vec![doc(1, "Fantasy", 2005.0, "fantasy novel")]).unwrap();
        assert_eq!(engine.delete_document(DocumentKey(1)), 1);

        let result = engine.search(&Query::new("fantasy")).unwrap();
        assert!(result.records.is_empty());
    }

    #[tokio::test]
    async fn async_wrappers_produce_the_same_result_as_their_blocking_counterparts() {
        let engine = Engine::new(ConfigurationSet::default());
        engine
            .index_documents_async(vec![doc(1, "Fantasy", 2005.0, "fantasy novel")])
            .await
            .unwrap();
        assert!(engine.statistics().is_indexed);

        engine.index_document_async(doc(2, "Horror", 2011.0, "horror tale")).await.unwrap();
        assert!(!engine.statistics().is_indexed);

        engine.calculate_weights_async().await.unwrap();
        assert!(engine.statistics().is_indexed);

        let result = engine.search_async(Query::new("fantasy")).await.unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].key, DocumentKey(1));
    }

    #[test]
    fn save_and_load_round_trips_document_and_query_behavior() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("glyphdex-engine-test-{}.bin", std::process::id()));

        let engine = Engine::new(ConfigurationSet::default());
        engine.index_documents(vec![doc(1, "Fantasy", 2005.0, "fantasy novel")]).unwrap();
        engine.save(&path).unwrap();

        let loaded = Engine::load(&path, ConfigurationSet::default()).unwrap();
        let result = loaded.search(&Query::new("fantasy")).unwrap();
        assert_eq!(result.records.len(), 1);
        assert_eq!(result.records[0].key, DocumentKey(1));

        let _ = std::fs::remove_file(&path);
    }
}
