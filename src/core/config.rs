use std::collections::HashMap;
use std::sync::Arc;
use serde::{Serialize, Deserialize};
use crate::core::error::{Error, ErrorKind, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldWeights {
    pub high: f32,
    pub med: f32,
    pub low: f32,
}

impl Default for FieldWeights {
    fn default() -> Self {
        FieldWeights { high: 1.5, med: 1.25, low: 1.0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenizerSetup {
    pub delimiters: Vec<char>,
    pub high_resolution_mode: bool,
    pub suppress_duplicate_tokens: bool,
}

impl Default for TokenizerSetup {
    fn default() -> Self {
        TokenizerSetup {
            delimiters: vec![' ', '\t', '\n', '\r', '-', '_', '/', '\\', ','],
            high_resolution_mode: true,
            suppress_duplicate_tokens: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordMatcherSetup {
    pub min_word_size: usize,
    pub max_word_size: usize,
    pub enable_ld1: bool,
    pub enable_affix: bool,
}

impl Default for WordMatcherSetup {
    fn default() -> Self {
        WordMatcherSetup {
            min_word_size: 3,
            max_word_size: 24,
            enable_ld1: true,
            enable_affix: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AutoSegmentationSetup {
    pub target_segment_size: usize,
    pub overlap_ratio: f32,
}

impl Default for AutoSegmentationSetup {
    fn default() -> Self {
        AutoSegmentationSetup { target_segment_size: 2000, overlap_ratio: 0.1 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextNormalizerSetup {
    pub case_sensitive: bool,
    pub char_replacements: HashMap<char, char>,
    pub string_replacements: Vec<(String, String)>,
}

impl Default for TextNormalizerSetup {
    fn default() -> Self {
        TextNormalizerSetup {
            case_sensitive: false,
            char_replacements: HashMap::new(),
            string_replacements: Vec::new(),
        }
    }
}

/// A full named bundle of tunables for one engine configuration. Selected
/// by integer id from a process-wide `ConfigRegistry`, or constructed
/// directly and handed to an `Engine` as its mutable per-instance set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigurationSet {
    pub index_sizes: Vec<usize>,
    pub start_pad_size: usize,
    pub stop_pad_size: usize,
    pub stop_term_limit: u32,
    pub max_index_text_length: usize,
    pub max_client_text_length: usize,
    pub max_documents: usize,
    pub text_normalizer: TextNormalizerSetup,
    pub tokenizer: TokenizerSetup,
    pub auto_segmentation: AutoSegmentationSetup,
    pub filter_cache_size: usize,
    pub field_weights: FieldWeights,
    pub word_matcher: WordMatcherSetup,
}

impl Default for ConfigurationSet {
    fn default() -> Self {
        ConfigurationSet {
            index_sizes: vec![2, 3],
            start_pad_size: 1,
            stop_pad_size: 1,
            stop_term_limit: 100_000,
            max_index_text_length: 1_000_000,
            max_client_text_length: 4_096,
            max_documents: 10_000_000,
            text_normalizer: TextNormalizerSetup::default(),
            tokenizer: TokenizerSetup::default(),
            auto_segmentation: AutoSegmentationSetup::default(),
            filter_cache_size: 256,
            field_weights: FieldWeights::default(),
            word_matcher: WordMatcherSetup::default(),
        }
    }
}

/// Immutable, process-wide registry of named configuration sets, built
/// once at startup and never mutated afterward. Individual `Engine`
/// instances hold their own mutable `ConfigurationSet` independent of
/// this registry.
pub struct ConfigRegistry {
    sets: HashMap<u32, Arc<ConfigurationSet>>,
}

impl ConfigRegistry {
    pub fn new() -> Self {
        let mut sets = HashMap::new();
        sets.insert(0, Arc::new(ConfigurationSet::default()));
        ConfigRegistry { sets }
    }

    pub fn with_entries(entries: impl IntoIterator<Item = (u32, ConfigurationSet)>) -> Self {
        let mut registry = Self::new();
        for (id, set) in entries {
            registry.sets.insert(id, Arc::new(set));
        }
        registry
    }

    pub fn get(&self, id: u32) -> Result<Arc<ConfigurationSet>> {
        self.sets.get(&id).cloned().ok_or_else(|| {
            Error::new(ErrorKind::InvalidConfiguration, format!("no configuration registered for id {}", id))
        })
    }
}

impl Default for ConfigRegistry {
    fn default() -> Self {
        Self::new()
    }
}
