use serde::{Serialize, Deserialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    NGram(usize),
    Word,
}

/// A single n-gram or whole-word token produced by the tokenizer, carrying
/// its absolute character position in the padded, normalized text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub position: u32,
    pub kind: TokenKind,
}

impl Token {
    pub fn new(text: String, position: u32, kind: TokenKind) -> Self {
        Token { text, position, kind }
    }
}
