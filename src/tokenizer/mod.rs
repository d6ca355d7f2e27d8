// tokenizer/ - BERT WordPiece tokenization.
//
// Provides:
// - Vocabulary loading and lookup
// - Basic (clean/split) and WordPiece (subword) word tokenizers
// - Sentence tokenizer that adds [CLS]/[SEP] and pads encodings

pub mod basic;
pub mod bert;
pub mod vocab;
pub mod wordpiece;

use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::TokenizerError;

pub use basic::BasicTokenizer;
pub use bert::BertTokenizer;
pub use vocab::Vocabulary;
pub use wordpiece::WordpieceTokenizer;

/// Word-level stage: text in, string pieces out.
pub trait WordTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Sentence-level stage: text in, vocabulary-resolved tokens and padded
/// encodings out.
pub trait SentenceTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>, TokenizerError>;

    /// Encode `text` padded to `target_len` positions.
    fn encode(&self, target_len: usize, text: &str) -> Result<Vec<EncodedToken>, TokenizerError> {
        let tokens = self.tokenize(text)?;
        encode_tokens(target_len, &tokens)
    }
}

/// One tokenizer output position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub value: String,
    pub segment_index: i64,
    pub vocabulary_index: i64,
}

/// One model input position. Padding is `{0, 0, 0}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedToken {
    pub input_id: i64,
    pub token_type_id: i64,
    pub attention_mask: i64,
}

impl EncodedToken {
    const PAD: Self = Self {
        input_id: config::tokenizer::PAD_ID,
        token_type_id: 0,
        attention_mask: 0,
    };
}

/// Per-sentence model input: three equal-length id rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BertInput {
    pub input_ids: Vec<i64>,
    pub attention_mask: Vec<i64>,
    pub type_ids: Vec<i64>,
}

impl BertInput {
    pub fn from_encoded(encoded: &[EncodedToken]) -> Self {
        Self {
            input_ids: encoded.iter().map(|t| t.input_id).collect(),
            attention_mask: encoded.iter().map(|t| t.attention_mask).collect(),
            type_ids: encoded.iter().map(|t| t.token_type_id).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.input_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.input_ids.is_empty()
    }
}

/// Encode real tokens (mask 1) followed by padding up to `target_len`.
/// Never truncates: a `target_len` below `tokens.len()` is an error.
pub fn encode_tokens(target_len: usize, tokens: &[Token]) -> Result<Vec<EncodedToken>, TokenizerError> {
    if target_len < tokens.len() {
        return Err(TokenizerError::TargetTooShort {
            target: target_len,
            required: tokens.len(),
        });
    }

    let mut encoded: Vec<EncodedToken> = tokens
        .iter()
        .map(|token| EncodedToken {
            input_id: token.vocabulary_index,
            token_type_id: token.segment_index,
            attention_mask: 1,
        })
        .collect();
    encoded.resize(target_len, EncodedToken::PAD);
    Ok(encoded)
}

/// Tokenizer knobs; missing JSON fields fall back to the BERT-uncased defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerOptions {
    pub lowercase: bool,
    pub unknown_token: String,
    pub max_input_chars_per_word: usize,
}

impl Default for TokenizerOptions {
    fn default() -> Self {
        Self {
            lowercase: true,
            unknown_token: config::tokenizer::UNKNOWN_TOKEN.to_string(),
            max_input_chars_per_word: config::tokenizer::MAX_INPUT_CHARS_PER_WORD,
        }
    }
}
