use std::collections::HashMap;
use fst::{IntoStreamer, Map, MapBuilder, Streamer};
use crate::core::config::WordMatcherSetup;
use crate::core::error::Result;
use crate::core::types::DocId;
use crate::scoring::coverage::bounded_edit_distance;

/// Per-document vocabulary supporting exact, edit-distance-1, and
/// prefix/suffix lookups. Backed by a frozen forward FST (exact + prefix)
/// and a frozen reverse FST (suffix), both built once at index time from
/// the sorted term set; lookups are read-only and thread-safe.
pub struct WordMatcher {
    forward: Map<Vec<u8>>,
    reverse: Map<Vec<u8>>,
    postings: Vec<Vec<DocId>>,
    deletions: HashMap<String, Vec<u32>>,
    terms: Vec<String>,
    setup: WordMatcherSetup,
}

impl WordMatcher {
    pub fn build(vocabulary: &HashMap<String, Vec<DocId>>, setup: WordMatcherSetup) -> Result<Self> {
        let mut sorted: Vec<(&String, &Vec<DocId>)> = vocabulary.iter().collect();
        sorted.sort_by(|a, b| a.0.cmp(b.0));

        let mut forward_builder = MapBuilder::memory();
        let mut postings = Vec::with_capacity(sorted.len());
        let mut terms = Vec::with_capacity(sorted.len());
        for (index, (term, doc_ids)) in sorted.iter().enumerate() {
            forward_builder.insert(term.as_bytes(), index as u64)?;
            postings.push((*doc_ids).clone());
            terms.push((*term).clone());
        }
        let forward = forward_builder.into_map();

        let mut reversed: Vec<(String, u64)> = terms
            .iter()
            .enumerate()
            .map(|(index, term)| (term.chars().rev().collect::<String>(), index as u64))
            .collect();
        reversed.sort_by(|a, b| a.0.cmp(&b.0));
        let mut reverse_builder = MapBuilder::memory();
        for (rev_term, index) in &reversed {
            reverse_builder.insert(rev_term.as_bytes(), *index)?;
        }
        let reverse = reverse_builder.into_map();

        let mut deletions: HashMap<String, Vec<u32>> = HashMap::new();
        if setup.enable_ld1 {
            for (index, term) in terms.iter().enumerate() {
                if term.chars().count() < setup.min_word_size {
                    continue;
                }
                for variant in single_char_deletions(term) {
                    deletions.entry(variant).or_default().push(index as u32);
                }
                deletions.entry(term.clone()).or_default().push(index as u32);
            }
        }

        Ok(WordMatcher { forward, reverse, postings, deletions, terms, setup })
    }

    fn in_word_size_band(&self, word: &str) -> bool {
        let len = word.chars().count();
        len >= self.setup.min_word_size && len <= self.setup.max_word_size
    }

    /// Word present verbatim.
    pub fn exact(&self, word: &str) -> &[DocId] {
        match self.forward.get(word.as_bytes()) {
            Some(index) => self.postings[index as usize].as_slice(),
            None => &[],
        }
    }

    /// Word present with Levenshtein distance <= 1, via the symmetric
    /// delete scheme: candidates are found by intersecting the deletion
    /// variants of the query word against the deletion-variants dictionary
    /// built from every indexed term, then validated with a direct
    /// distance check to discard the rare two-deletion false positive.
    pub fn ld1(&self, word: &str) -> Vec<DocId> {
        if !self.setup.enable_ld1 || !self.in_word_size_band(word) {
            return Vec::new();
        }

        let mut candidate_indices: Vec<u32> = Vec::new();
        if let Some(indices) = self.deletions.get(word) {
            candidate_indices.extend(indices.iter().copied());
        }
        for variant in single_char_deletions(word) {
            if let Some(indices) = self.deletions.get(&variant) {
                candidate_indices.extend(indices.iter().copied());
            }
        }
        candidate_indices.sort_unstable();
        candidate_indices.dedup();

        let mut doc_ids = Vec::new();
        for index in candidate_indices {
            let term = &self.terms[index as usize];
            if term == word {
                continue;
            }
            if bounded_edit_distance(word, term, 1).is_some() {
                doc_ids.extend(self.postings[index as usize].iter().copied());
            }
        }
        doc_ids.sort_unstable();
        doc_ids.dedup();
        doc_ids
    }

    /// Prefix/suffix match, enabled only when `enable_affix` is set.
    pub fn affix(&self, word: &str) -> Vec<DocId> {
        if !self.setup.enable_affix || !self.in_word_size_band(word) {
            return Vec::new();
        }

        let mut doc_ids = Vec::new();
        let mut prefix_stream = self.forward.range().ge(word.as_bytes()).into_stream();
        while let Some((term_bytes, index)) = prefix_stream.next() {
            if !term_bytes.starts_with(word.as_bytes()) {
                break;
            }
            doc_ids.extend(self.postings[index as usize].iter().copied());
        }

        let reversed_word: String = word.chars().rev().collect();
        let mut suffix_stream = self.reverse.range().ge(reversed_word.as_bytes()).into_stream();
        while let Some((rev_term_bytes, index)) = suffix_stream.next() {
            if !rev_term_bytes.starts_with(reversed_word.as_bytes()) {
                break;
            }
            doc_ids.extend(self.postings[index as usize].iter().copied());
        }

        doc_ids.sort_unstable();
        doc_ids.dedup();
        doc_ids
    }
}

fn single_char_deletions(word: &str) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    if chars.len() <= 1 {
        return Vec::new();
    }
    (0..chars.len())
        .map(|skip| chars.iter().enumerate().filter(|(i, _)| *i != skip).map(|(_, c)| *c).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab() -> HashMap<String, Vec<DocId>> {
        let mut v = HashMap::new();
        v.insert("algorithm".to_string(), vec![1]);
        v.insert("algorithms".to_string(), vec![2]);
        v.insert("fantasy".to_string(), vec![3]);
        v
    }

    #[test]
    fn exact_lookup_finds_verbatim_word() {
        let matcher = WordMatcher::build(&vocab(), WordMatcherSetup::default()).unwrap();
        assert_eq!(matcher.exact("fantasy"), &[3]);
        assert!(matcher.exact("fantasi").is_empty());
    }

    #[test]
    fn ld1_finds_one_edit_away_terms() {
        let matcher = WordMatcher::build(&vocab(), WordMatcherSetup::default()).unwrap();
        let hits = matcher.ld1("algro");
        assert!(hits.is_empty(), "length difference of 4 exceeds edit distance 1");
        let hits = matcher.ld1("algorithn");
        assert!(hits.contains(&1));
    }

    #[test]
    fn affix_finds_prefix_matches() {
        let matcher = WordMatcher::build(&vocab(), WordMatcherSetup::default()).unwrap();
        let hits = matcher.affix("algorithm");
        assert!(hits.contains(&1));
        assert!(hits.contains(&2));
    }
}
