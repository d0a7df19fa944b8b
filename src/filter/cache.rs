use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicUsize, Ordering};
use lru::LruCache;
use parking_lot::Mutex;
use crate::core::document::Document;
use crate::core::error::Result;
use crate::filter::ast::Filter;
use crate::filter::bytecode::CompiledFilter;
use crate::filter::compiler::compile;
use crate::filter::vm::FilterVm;

/// Identifies a `Filter` AST for caching purposes. Filters are supplied
/// pre-built by callers rather than parsed, so there is no stable pointer
/// or interned id to key on; the structural `Debug` rendering of the AST
/// is deterministic and stands in for "AST identity".
fn identity_key(filter: &Filter) -> String {
    format!("{:?}", filter)
}

/// Compiled-bytecode cache, keyed by AST identity. Concurrent map shared
/// across threads; the filter compiler and VM themselves stay per-thread
/// (each `Search` call owns its scratch stack and compile buffers).
pub struct FilterCache {
    cache: Mutex<LruCache<String, CompiledFilter>>,
    hit_count: AtomicUsize,
    miss_count: AtomicUsize,
}

impl FilterCache {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).unwrap();
        FilterCache {
            cache: Mutex::new(LruCache::new(cap)),
            hit_count: AtomicUsize::new(0),
            miss_count: AtomicUsize::new(0),
        }
    }

    /// Returns the compiled form of `filter`, compiling and caching it on
    /// first use.
    pub fn compile(&self, filter: &Filter) -> Result<CompiledFilter> {
        let key = identity_key(filter);
        {
            let mut cache = self.cache.lock();
            if let Some(hit) = cache.get(&key) {
                self.hit_count.fetch_add(1, Ordering::Relaxed);
                return Ok(hit.clone());
            }
        }
        self.miss_count.fetch_add(1, Ordering::Relaxed);
        let compiled = compile(filter)?;
        self.cache.lock().put(key, compiled.clone());
        Ok(compiled)
    }

    pub fn stats(&self) -> FilterCacheStats {
        FilterCacheStats {
            hits: self.hit_count.load(Ordering::Relaxed),
            misses: self.miss_count.load(Ordering::Relaxed),
            len: self.cache.lock().len(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FilterCacheStats {
    pub hits: usize,
    pub misses: usize,
    pub len: usize,
}

/// Runs a (possibly cached) compiled filter against every non-deleted
/// document, computing `NumberOfDocumentsInFilter` lazily on first use.
/// Cheap enough to recompute per call; callers that need it repeatedly
/// should cache the count themselves alongside the filter.
pub fn count_matching(filter: &CompiledFilter, documents: &[Document]) -> usize {
    let vm = FilterVm::new(filter);
    documents.iter().filter(|doc| !doc.deleted).filter(|doc| vm.run(doc)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ast::{CompareOp, Constant};

    #[test]
    fn repeated_compiles_of_equal_filters_hit_the_cache() {
        let cache = FilterCache::new(8);
        let filter = Filter::Value { field: "genre".into(), op: CompareOp::Eq, value: Constant::String("Fantasy".into()) };
        cache.compile(&filter).unwrap();
        cache.compile(&filter).unwrap();
        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }
}
