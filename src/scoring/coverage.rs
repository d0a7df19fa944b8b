use std::collections::HashMap;
use crate::core::types::DocumentKey;
use crate::scoring::lcs::lcs_length;

#[derive(Debug, Clone)]
pub struct CoverageSetup {
    pub enable_exact: bool,
    pub enable_joined_split: bool,
    pub enable_fuzzy: bool,
    pub enable_affix: bool,
    pub enable_lcs: bool,
    pub min_word_size: usize,
    pub levenshtein_max_word_size: usize,
    pub cover_whole_query: bool,
    /// Truncation's absolute floor on `wordHits[i]` (§4.7); not used by
    /// `score()` itself, only by the caller computing `minHits`.
    pub min_word_hits_abs: u32,
    /// Truncation's margin below the candidate set's max word-hit count.
    pub min_word_hits_relative: u32,
}

impl Default for CoverageSetup {
    fn default() -> Self {
        CoverageSetup {
            enable_exact: true,
            enable_joined_split: true,
            enable_fuzzy: true,
            enable_affix: true,
            enable_lcs: true,
            min_word_size: 3,
            levenshtein_max_word_size: 16,
            cover_whole_query: true,
            min_word_hits_abs: 1,
            min_word_hits_relative: 0,
        }
    }
}

/// An `N x 2` cache keyed by a per-query compact document index: column 0
/// is the clamped LCS length, column 1 is the clamped word-hit count.
/// Reused across the candidate set of a single search call.
#[derive(Default)]
pub struct LcsCache {
    entries: HashMap<DocumentKey, (u8, u8)>,
}

impl LcsCache {
    pub fn new() -> Self {
        LcsCache { entries: HashMap::new() }
    }

    pub fn get(&self, key: DocumentKey) -> Option<(u8, u8)> {
        self.entries.get(&key).copied()
    }

    pub fn put(&mut self, key: DocumentKey, lcs: u8, word_hits: u8) {
        self.entries.insert(key, (lcs, word_hits));
    }
}

/// Stage-2 lexical coverage scorer: combines five complementary word-level
/// overlap algorithms, short-circuiting once the accumulated score covers
/// the whole query, and falls back to an LCS similarity when nothing else
/// matched.
pub struct CoverageScorer {
    setup: CoverageSetup,
}

impl CoverageScorer {
    pub fn new(setup: CoverageSetup) -> Self {
        CoverageScorer { setup }
    }

    /// Scores one document's best-segment text against the query words.
    /// `query_words` and `doc_words` are already lowercased, whole-word
    /// tokenizations (see `Tokenizer::word_tokens_for_coverage`).
    pub fn score(&self, query_words: &[String], doc_words: &[String], cache: &mut LcsCache, key: DocumentKey, normalized_query: &str, normalized_doc_text: &str) -> u8 {
        if query_words.is_empty() {
            return 0;
        }

        let query_len: usize = query_words.iter().map(|w| w.chars().count()).sum();
        let mut remaining_query: Vec<Option<String>> = query_words.iter().cloned().map(Some).collect();
        let mut remaining_doc: Vec<Option<String>> = doc_words.iter().cloned().map(Some).collect();

        let mut sum: i32 = 0;
        let mut order_penalty: i32 = 0;
        let mut word_hits: u32 = 0;

        if self.setup.enable_exact {
            self.score_exact(&mut remaining_query, &mut remaining_doc, &mut sum, &mut order_penalty, &mut word_hits);
        }

        if sum < query_len as i32 && self.setup.enable_joined_split {
            self.score_joined_split(&mut remaining_query, &mut remaining_doc, &mut sum, &mut word_hits);
        }

        if sum < query_len as i32 && self.setup.enable_fuzzy {
            self.score_fuzzy(&mut remaining_query, &mut remaining_doc, &mut sum, &mut word_hits);
        }

        if sum < query_len as i32 && self.setup.enable_affix {
            self.score_affix(&mut remaining_query, &mut remaining_doc, &mut sum, &mut word_hits);
        }

        let clamped_hits = word_hits.min(255) as u8;

        if sum == 0 && self.setup.enable_lcs {
            let (lcs, _) = cache.get(key).unwrap_or_else(|| {
                let lcs_len = if self.setup.cover_whole_query {
                    lcs_length(normalized_query, normalized_doc_text).min(255)
                } else {
                    0
                };
                let computed = (lcs_len as u8, clamped_hits);
                cache.put(key, computed.0, computed.1);
                computed
            });
            let lcs_sum = lcs as i32 - 2;
            sum = lcs_sum.max(0);
        } else {
            cache.put(key, 0, clamped_hits);
        }

        let numerator = (sum - order_penalty).max(0) as f64;
        let denom = query_len.max(1) as f64;
        ((numerator / denom) * 255.0).round().clamp(0.0, 255.0) as u8
    }

    fn score_exact(&self, query: &mut [Option<String>], doc: &mut [Option<String>], sum: &mut i32, order_penalty: &mut i32, word_hits: &mut u32) {
        let matched_count_before = query.iter().filter(|w| w.is_none()).count();
        for qi in 0..query.len() {
            let Some(qword) = query[qi].clone() else { continue };
            if let Some(di) = doc.iter().position(|d| d.as_deref() == Some(qword.as_str())) {
                *sum += qword.chars().count() as i32;
                *word_hits += 1;
                if di != qi {
                    *order_penalty += 1;
                }
                query[qi] = None;
                doc[di] = None;
            }
        }
        let matched_now = query.iter().filter(|w| w.is_none()).count() - matched_count_before;
        if matched_now > 0 && query.len() > 1 {
            *sum += (matched_now as i32 - 1).max(0);
        }
    }

    fn score_joined_split(&self, query: &mut Vec<Option<String>>, doc: &mut Vec<Option<String>>, sum: &mut i32, word_hits: &mut u32) {
        let hit = self.find_joined_match(query, doc).or_else(|| self.find_joined_match(doc, query));
        if let Some(len) = hit {
            *sum += len as i32;
            *word_hits += 1;
        }
    }

    /// Tries concatenating consecutive entries of `from` and matching the
    /// result against a single remaining entry of `into`. Consumes both
    /// sides on the first match.
    fn find_joined_match(&self, from: &mut Vec<Option<String>>, into: &mut Vec<Option<String>>) -> Option<usize> {
        for i in 0..from.len().saturating_sub(1) {
            let (Some(a), Some(b)) = (from[i].clone(), from[i + 1].clone()) else { continue };
            let joined = format!("{}{}", a, b);
            if let Some(j) = into.iter().position(|w| w.as_deref() == Some(joined.as_str())) {
                let len = joined.chars().count();
                from[i] = None;
                from[i + 1] = None;
                into[j] = None;
                return Some(len);
            }
        }
        None
    }

    fn score_fuzzy(&self, query: &mut [Option<String>], doc: &mut [Option<String>], sum: &mut i32, word_hits: &mut u32) {
        let min = self.setup.min_word_size + 1;
        let max = self.setup.levenshtein_max_word_size;
        for qi in 0..query.len() {
            let Some(qword) = query[qi].clone() else { continue };
            let qlen = qword.chars().count();
            if qlen < min || qlen > max {
                continue;
            }
            let mut best: Option<(usize, usize)> = None;
            for (di, dword) in doc.iter().enumerate() {
                let Some(dword) = dword else { continue };
                let dlen = dword.chars().count();
                if dlen < min || dlen > max {
                    continue;
                }
                let d = bounded_edit_distance(&qword, dword, 1);
                if let Some(d) = d {
                    best = Some((di, d));
                    break;
                }
            }
            if let Some((di, d)) = best {
                *sum += (qlen as i32 - d as i32).max(0);
                *word_hits += 1;
                query[qi] = None;
                doc[di] = None;
            }
        }
    }

    fn score_affix(&self, query: &mut [Option<String>], doc: &mut [Option<String>], sum: &mut i32, word_hits: &mut u32) {
        let mut pairs: Vec<(usize, usize, usize)> = Vec::new();
        for (qi, qword) in query.iter().enumerate() {
            let Some(qword) = qword else { continue };
            for (di, dword) in doc.iter().enumerate() {
                let Some(dword) = dword else { continue };
                if qword.len() == dword.len() {
                    continue;
                }
                if qword.starts_with(dword.as_str()) || dword.starts_with(qword.as_str())
                    || qword.ends_with(dword.as_str()) || dword.ends_with(qword.as_str())
                {
                    let shorter = qword.chars().count().min(dword.chars().count());
                    pairs.push((qi, di, shorter));
                }
            }
        }
        pairs.sort_by(|a, b| b.2.cmp(&a.2));

        let mut used_q = vec![false; query.len()];
        let mut used_d = vec![false; doc.len()];
        for (qi, di, shorter) in pairs {
            if used_q[qi] || used_d[di] || query[qi].is_none() || doc[di].is_none() {
                continue;
            }
            used_q[qi] = true;
            used_d[di] = true;
            *sum += (shorter as i32 - 1).max(0);
            *word_hits += 1;
        }
    }
}

/// Classic-DP edit distance, but abandoned (returns `None`) as soon as it
/// is provable the distance exceeds `max`.
pub(crate) fn bounded_edit_distance(a: &str, b: &str, max: usize) -> Option<usize> {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len().abs_diff(b.len()) > max {
        return None;
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    for i in 1..=a.len() {
        let mut curr = vec![0usize; b.len() + 1];
        curr[0] = i;
        let mut row_min = curr[0];
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
            row_min = row_min.min(curr[j]);
        }
        if row_min > max {
            return None;
        }
        prev = curr;
    }

    let d = prev[b.len()];
    if d <= max { Some(d) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(s: &str) -> Vec<String> {
        s.split_whitespace().map(|w| w.to_lowercase()).collect()
    }

    #[test]
    fn exact_match_scores_max() {
        let scorer = CoverageScorer::new(CoverageSetup::default());
        let mut cache = LcsCache::new();
        let score = scorer.score(&words("fantasy"), &words("fantasy novel"), &mut cache, DocumentKey(1), "fantasy", "fantasy novel");
        assert_eq!(score, 255);
    }

    #[test]
    fn disjoint_words_fall_back_to_lcs_or_zero() {
        let scorer = CoverageScorer::new(CoverageSetup::default());
        let mut cache = LcsCache::new();
        let score = scorer.score(&words("zzz"), &words("fantasy novel"), &mut cache, DocumentKey(2), "zzz", "fantasy novel");
        assert_eq!(score, 0);
    }

    #[test]
    fn fuzzy_match_within_distance_one_scores_above_zero() {
        let scorer = CoverageScorer::new(CoverageSetup::default());
        let mut cache = LcsCache::new();
        let score = scorer.score(&words("algro"), &words("algorithm"), &mut cache, DocumentKey(3), "algro", "algorithm");
        assert!(score > 0);
    }
}
