use std::collections::HashMap;
use crate::filter::ast::Filter;
use crate::index::score_array::ScoreEntry;
use crate::scoring::coverage::CoverageSetup;
use crate::search::sort::SortSpec;

#[derive(Debug, Clone)]
pub struct Boost {
    pub filter: Filter,
    pub strength: u8,
}

/// Caller-supplied search request. Constructed directly rather than
/// parsed from a query string; filter-expression grammar parsing is an
/// external concern.
#[derive(Clone)]
pub struct Query {
    pub text: String,
    pub max_records: usize,
    pub timeout_millis: u32,
    pub enable_coverage: bool,
    pub enable_facets: bool,
    pub enable_boost: bool,
    pub coverage_depth: usize,
    pub coverage_setup: Option<CoverageSetup>,
    pub filter: Option<Filter>,
    pub boosts: Vec<Boost>,
    pub sort_by: Option<SortSpec>,
    pub truncate: bool,
    pub truncation_score: u8,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Query {
            text: text.into(),
            max_records: 20,
            timeout_millis: 5000,
            enable_coverage: true,
            enable_facets: false,
            enable_boost: true,
            coverage_depth: 256,
            coverage_setup: None,
            filter: None,
            boosts: Vec::new(),
            sort_by: None,
            truncate: false,
            truncation_score: 0,
        }
    }

    pub fn clamped_timeout_millis(&self) -> u32 {
        self.timeout_millis.min(10_000)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchResult {
    pub records: Vec<ScoreEntry>,
    pub facets: Option<HashMap<String, Vec<(String, usize)>>>,
    pub truncation_index: Option<usize>,
    pub truncation_score: u8,
    pub did_time_out: bool,
    pub total_candidates: usize,
    pub execution_time_ms: u64,
}
