pub mod core;
pub mod analysis;
pub mod index;
pub mod scoring;
pub mod search;
pub mod filter;
pub mod parallel;
pub mod memory;
pub mod engine;

pub use engine::Engine;
pub use core::error::{Error, ErrorKind, Result};

/*
┌────────────────────────────────────────────────────────────────────────────────────────────┐
│                             GLYPHDEX STRUCT ARCHITECTURE                                     │
└────────────────────────────────────────────────────────────────────────────────────────────┘

┌─────────────────────────────────────── CORE LAYER ──────────────────────────────────────────┐
│                                                                                              │
│  ┌────────────────────────────────────────────────────────────────────────────────────┐    │
│  │                               struct Engine                                         │    │
│  │  ┌──────────────────────────────────────────────────────────────────────────────┐ │    │
│  │  │ config: ConfigurationSet          // Tokenizer/coverage/word-matcher knobs    │ │    │
│  │  │ registry: Arc<ConfigRegistry>     // Process-wide named configuration sets   │ │    │
│  │  │ state: Arc<RwLock<EngineState>>   // Index + documents, gated read/write     │ │    │
│  │  │ filter_cache: Arc<FilterCache>    // Compiled-bytecode cache                 │ │    │
│  │  │ arena: Arc<ScratchArena>          // Pooled search scratch buffers           │ │    │
│  │  └──────────────────────────────────────────────────────────────────────────────┘ │    │
│  └────────────────────────────────────────────────────────────────────────────────────┘    │
│                                                                                              │
│  ┌──────────────────┐  ┌──────────────────┐  ┌───────────────────────────────────────┐    │
│  │ struct EngineState│  │ struct Document  │  │ struct EngineStatistics               │    │
│  │ • index: Inverted │  │ • key: DocumentKey│  │ • document_count                     │    │
│  │ • word_matcher    │  │ • fields: DocFields│ │ • vocabulary_size                     │    │
│  │ • documents       │  │ • segment_number  │  │ • stop_term_count                     │    │
│  │ • is_indexed      │  │ • deleted         │  │ • is_indexed                          │    │
│  └──────────────────┘  └──────────────────┘  └───────────────────────────────────────┘    │
│                                                                                              │
│  ┌──────────────────┐  ┌──────────────────┐                                                │
│  │ struct DocumentKey│  │ enum FieldValue │                                                │
│  │ • 0: i64          │  │ • Text(String)   │                                                │
│  └──────────────────┘  │ • List(Vec<Str>) │                                                │
│                        │ • Number(f64)    │                                                │
│                        │ • Boolean(bool)  │                                                │
│                        │ • Null           │                                                │
│                        └──────────────────┘                                                │
└──────────────────────────────────────────────────────────────────────────────────────────────┘

┌───────────────────────────────────── INDEXING LAYER ────────────────────────────────────────┐
│                                                                                              │
│  ┌────────────────────────────────────────────────────────────────────────────────────┐    │
│  │                           struct InvertedIndex                                      │    │
│  │  ┌──────────────────────────────────────────────────────────────────────────────┐ │    │
│  │  │ terms: HashMap<Box<str>, Term>    // token text -> postings                  │ │    │
│  │  │ doc_count: usize                  // total indexed documents                 │ │    │
│  │  │ stop_term_limit: u32              // postings cap before stop-term cutover   │ │    │
│  │  └──────────────────────────────────────────────────────────────────────────────┘ │    │
│  └────────────────────────────────────────────────────────────────────────────────────┘    │
│                                                                                              │
│  ┌──────────────────┐  ┌────────────────────────────────────┐                              │
│  │ struct Term      │  │ struct ScoreArray                  │                              │
│  │ • df: i32        │  │ • buckets: [Vec<ScoreEntry>; 256]  │                              │
│  │ • doc_ids: Vec<u32>│ │ • len: usize                       │                              │
│  │ • weights: Vec<u8>│  └────────────────────────────────────┘                              │
│  └──────────────────┘                                                                       │
│                                                                                              │
│  ┌────────────────────────────────────┐                                                     │
│  │ struct ParallelIndexer              │                                                     │
│  │ • workers: usize                    │                                                     │
│  │ • batch_size: usize                 │                                                     │
│  │ • progress: Arc<AtomicUsize>        │                                                     │
│  └────────────────────────────────────┘                                                     │
└──────────────────────────────────────────────────────────────────────────────────────────────┘

┌────────────────────────────────────── SEARCH LAYER ─────────────────────────────────────────┐
│                                                                                              │
│  ┌─────────────────────┐  ┌──────────────────────┐  ┌────────────────────────────┐        │
│  │ struct WordMatcher  │  │ struct CoverageScorer│  │ struct ScoreEntry          │        │
│  │ • forward_fst       │  │ • setup: CoverageSetup│  │ • score: u8                │        │
│  │ • reverse_fst       │  │ • lcs_cache           │  │ • key: DocumentKey         │        │
│  │ • vocab_per_doc     │  └──────────────────────┘  │ • segment: Option<i32>     │        │
│  └─────────────────────┘                            └────────────────────────────┘        │
│                                                                                              │
│  ┌─────────────────────┐  ┌──────────────────────┐  ┌────────────────────────────┐        │
│  │ struct SearchResult │  │ struct FacetCounter  │  │ struct SortSpec            │        │
│  │ • records           │  │ • counts: HashMap    │  │ • field: String            │        │
│  │ • facets            │  └──────────────────────┘  │ • ascending: bool          │        │
│  │ • truncation_index  │                            └────────────────────────────┘        │
│  │ • did_time_out      │                                                                    │
│  └─────────────────────┘                                                                    │
└──────────────────────────────────────────────────────────────────────────────────────────────┘

┌──────────────────────────────────── FILTER LAYER ────────────────────────────────────────────┐
│                                                                                              │
│  ┌─────────────────────┐  ┌──────────────────────┐  ┌────────────────────────────┐        │
│  │ enum Filter (AST)   │  │ struct CompiledFilter│  │ struct FilterVm            │        │
│  │ • Value/Range/In    │  │ • constants: ConstPool│ │ • stack: Vec<VmValue>      │        │
│  │ • String/Regex/Null │  │ • instructions: Vec  │  │ • run()                   │        │
│  │ • Ternary/Composite │  └──────────────────────┘  └────────────────────────────┘        │
│  └─────────────────────┘                                                                    │
│                                                                                              │
│  ┌─────────────────────┐  ┌──────────────────────┐                                         │
│  │ struct FilterCache  │  │ struct Boost         │                                         │
│  │ • cache: LruCache   │  │ • filter: Filter     │                                         │
│  └─────────────────────┘  │ • strength: u8       │                                         │
│                            └──────────────────────┘                                         │
└──────────────────────────────────────────────────────────────────────────────────────────────┘

┌────────────────────────────────── RELATIONSHIPS ────────────────────────────────────────────┐
│                                                                                              │
│  Engine ──owns──> EngineState ──owns──> InvertedIndex ──contains──> Term                   │
│     │                  │                                                                    │
│     │                  └──owns──> WordMatcher ──built from──> InvertedIndex vocabulary      │
│     │                                                                                       │
│     ├──owns──> FilterCache ──stores──> CompiledFilter ──executed by──> FilterVm            │
│     │                                                                                       │
│     └──owns──> ScratchArena ──lends to──> Search (bestSegments, LCS cache)                  │
│                                                                                              │
│  Search(query) ─► Stage1(vector retrieval) ─► ScoreArray ─┐                                 │
│                                              WordMatcher ─┤► CoverageScorer ─► fuse ─►       │
│                                              segment consolidate ─► truncate ─►              │
│                                              Filter/Boost/Sort/Facet ─► SearchResult         │
│                                                                                              │
│  ParallelIndexer ──parallelizes──> Document ──analysis──> Token ──indexing──> Term          │
│                                                                                              │
└──────────────────────────────────────────────────────────────────────────────────────────────┘
*/
