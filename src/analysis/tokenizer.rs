use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;
use crate::analysis::token::{Token, TokenKind};
use crate::core::config::ConfigurationSet;

/// Reserved private-use code points prepended/appended to indexed text so
/// that n-grams at string edges carry a boundary signal.
pub const START_PAD: char = '\u{E000}';
pub const STOP_PAD: char = '\u{E001}';

pub struct TokenizeOutput {
    pub ngrams: Vec<Token>,
    pub words: Vec<Token>,
}

/// Produces character n-grams and whole-word tokens from already-normalized
/// text, honoring padding and field-continuation semantics.
pub struct Tokenizer {
    index_sizes: Vec<usize>,
    start_pad_size: usize,
    stop_pad_size: usize,
    delimiters: HashSet<char>,
    high_resolution_mode: bool,
    suppress_duplicate_tokens: bool,
}

impl Tokenizer {
    pub fn from_config(config: &ConfigurationSet) -> Self {
        Tokenizer {
            index_sizes: config.index_sizes.clone(),
            start_pad_size: config.start_pad_size,
            stop_pad_size: config.stop_pad_size,
            delimiters: config.tokenizer.delimiters.iter().copied().collect(),
            high_resolution_mode: config.tokenizer.high_resolution_mode,
            suppress_duplicate_tokens: config.tokenizer.suppress_duplicate_tokens,
        }
    }

    fn min_word_size(&self) -> usize {
        self.index_sizes.first().copied().unwrap_or(2)
    }

    /// `is_continuation` marks a segment with `SegmentNumber > 0`, which
    /// omits start padding. `search_pass` gates the high-resolution joined
    /// pass, which only runs at query time.
    pub fn tokenize(&self, normalized_text: &str, is_continuation: bool, search_pass: bool) -> TokenizeOutput {
        let mut padded = String::new();
        if !is_continuation {
            for _ in 0..self.start_pad_size {
                padded.push(START_PAD);
            }
        }
        padded.push_str(normalized_text);
        for _ in 0..self.stop_pad_size {
            padded.push(STOP_PAD);
        }

        let chars: Vec<char> = padded.chars().collect();
        let mut ngrams = self.extract_ngrams(&chars);
        let words = self.extract_words(&chars);

        if self.high_resolution_mode && search_pass {
            ngrams.extend(self.joined_ngrams(normalized_text));
        }

        if self.suppress_duplicate_tokens {
            let mut seen = HashSet::new();
            ngrams.retain(|t| seen.insert(t.text.clone()));
        }

        TokenizeOutput { ngrams, words }
    }

    fn extract_ngrams(&self, chars: &[char]) -> Vec<Token> {
        let mut ngrams = Vec::new();
        for &n in &self.index_sizes {
            if n == 0 || chars.len() < n {
                continue;
            }
            for start in 0..=chars.len() - n {
                let slice = &chars[start..start + n];
                if slice.iter().all(|c| *c == START_PAD || *c == STOP_PAD) {
                    continue;
                }
                let text: String = slice.iter().collect();
                ngrams.push(Token::new(text, start as u32, TokenKind::NGram(n)));
            }
        }
        ngrams
    }

    fn extract_words(&self, chars: &[char]) -> Vec<Token> {
        let min_len = self.min_word_size();
        let mut words = Vec::new();
        let mut word_start: Option<usize> = None;

        let mut flush = |start: usize, end: usize, words: &mut Vec<Token>| {
            let word: String = chars[start..end].iter().collect();
            if word.chars().count() >= min_len {
                words.push(Token::new(word, start as u32, TokenKind::Word));
            }
        };

        for (i, &c) in chars.iter().enumerate() {
            let is_boundary = c == START_PAD || c == STOP_PAD || c.is_whitespace() || self.delimiters.contains(&c);
            if is_boundary {
                if let Some(start) = word_start.take() {
                    flush(start, i, &mut words);
                }
            } else if word_start.is_none() {
                word_start = Some(i);
            }
        }
        if let Some(start) = word_start {
            flush(start, chars.len(), &mut words);
        }

        words
    }

    /// Second tokenization pass over delimiter-stripped text, producing
    /// n-grams that span what were originally separate words (e.g. so
    /// "fire fly" and "firefly" share shingles).
    fn joined_ngrams(&self, normalized_text: &str) -> Vec<Token> {
        let joined: Vec<char> = normalized_text
            .chars()
            .filter(|c| !c.is_whitespace() && !self.delimiters.contains(c))
            .collect();

        let mut ngrams = Vec::new();
        for &n in &self.index_sizes {
            if joined.len() < n {
                continue;
            }
            for start in 0..=joined.len() - n {
                let text: String = joined[start..start + n].iter().collect();
                ngrams.push(Token::new(text, start as u32, TokenKind::NGram(n)));
            }
        }
        ngrams
    }

    /// Case-insensitive set of whole words at least `min_word_size` long,
    /// used by the coverage scorer rather than the inverted index. Word
    /// boundaries come from Unicode's word-segmentation algorithm rather
    /// than a manual delimiter scan, so multi-script and combining-mark
    /// text segments the same way a human reader would; the configured
    /// delimiter set still gets a pass in case it adds characters (e.g.
    /// `_`) that Unicode itself treats as part of a word.
    pub fn word_tokens_for_coverage(&self, text: &str, min_word_size: usize) -> Vec<String> {
        let lowered = text.to_lowercase();
        lowered
            .unicode_words()
            .flat_map(|word| word.split(|c: char| self.delimiters.contains(&c)))
            .filter(|word| word.chars().count() >= min_word_size)
            .map(|word| word.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenizer() -> Tokenizer {
        Tokenizer::from_config(&ConfigurationSet::default())
    }

    #[test]
    fn ngrams_drop_pure_padding_windows() {
        let out = tokenizer().tokenize("ab", false, false);
        assert!(out.ngrams.iter().all(|t| !t.text.chars().all(|c| c == START_PAD || c == STOP_PAD)));
    }

    #[test]
    fn whole_words_respect_minimum_length() {
        let out = tokenizer().tokenize("a bb ccc", false, false);
        assert!(out.words.iter().all(|t| t.text.len() >= 2));
    }

    #[test]
    fn continuation_segments_omit_start_padding() {
        let tok = tokenizer();
        let continuation = tok.tokenize("dragon", true, false);
        let first = tok.tokenize("dragon", false, false);
        assert!(continuation.ngrams.len() <= first.ngrams.len());
    }
}
