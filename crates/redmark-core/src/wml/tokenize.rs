//! Word-level tokenization for paragraph diffing.
//!
//! Text splits on whitespace, then each chunk splits again at every
//! boundary between word characters and non-word characters, so
//! `"12,34"` becomes `["12", ",", "34"]` and `"Test."` becomes
//! `["Test", "."]`. Tokens hash as themselves (case-sensitive).

use crate::lcs::Hashable;

pub const STRUCTURAL_PREFIXES: &[&str] =
    &["FOOTNOTE_REF_", "ENDNOTE_REF_", "DRAWING_", "PICT_"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// Whether whitespace preceded this token in the original text; used
    /// to rebuild spacing when runs are re-emitted.
    pub leading_space: bool,
}

impl Token {
    pub fn new(text: &str, leading_space: bool) -> Self {
        Self {
            text: text.to_string(),
            leading_space,
        }
    }

    pub fn is_structural(&self) -> bool {
        is_structural_token(&self.text)
    }
}

impl Hashable for Token {
    fn key(&self) -> &str {
        &self.text
    }
}

pub fn is_structural_token(text: &str) -> bool {
    STRUCTURAL_PREFIXES
        .iter()
        .any(|prefix| text.starts_with(prefix))
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

pub fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();

    let mut chunk = String::new();
    let mut chunk_leads = false;
    let mut pending_space = false;

    let mut flush = |chunk: &mut String, leads: bool, tokens: &mut Vec<Token>| {
        if chunk.is_empty() {
            return;
        }
        // Split the chunk at word/non-word boundaries; only the first
        // piece inherits the leading space.
        let mut first = true;
        let mut piece = String::new();
        let mut piece_is_word = false;
        for c in chunk.chars() {
            let word = is_word_char(c);
            if !piece.is_empty() && word != piece_is_word {
                tokens.push(Token::new(&piece, first && leads));
                first = false;
                piece.clear();
            }
            piece_is_word = word;
            piece.push(c);
        }
        if !piece.is_empty() {
            tokens.push(Token::new(&piece, first && leads));
        }
        chunk.clear();
    };

    for c in text.chars() {
        if c.is_whitespace() {
            flush(&mut chunk, chunk_leads, &mut tokens);
            pending_space = true;
            continue;
        }
        if chunk.is_empty() {
            chunk_leads = pending_space;
            pending_space = false;
        }
        chunk.push(c);
    }
    flush(&mut chunk, chunk_leads, &mut tokens);

    tokens
}

/// Rebuilds the surface text of a token run, re-inserting single spaces
/// where the tokenizer recorded them.
pub fn join_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if token.leading_space && i > 0 {
            out.push(' ');
        } else if token.leading_space && i == 0 {
            out.push(' ');
        }
        out.push_str(&token.text);
    }
    out
}
