// wordpiece.rs - Greedy longest-match-first subword segmentation.

use std::sync::Arc;

use super::vocab::Vocabulary;
use super::WordTokenizer;
use crate::config;

/// Splits words into vocabulary pieces; continuation pieces carry `##`.
#[derive(Debug, Clone)]
pub struct WordpieceTokenizer {
    vocab: Arc<Vocabulary>,
    unknown_token: String,
    max_input_chars_per_word: usize,
}

impl WordpieceTokenizer {
    pub fn new(vocab: Arc<Vocabulary>, unknown_token: &str, max_input_chars_per_word: usize) -> Self {
        Self {
            vocab,
            unknown_token: unknown_token.to_string(),
            max_input_chars_per_word,
        }
    }

    /// Segment one word. A word with any unmatched span maps to a single
    /// unknown token; its partial pieces are discarded.
    fn tokenize_word(&self, word: &str) -> Vec<String> {
        let chars: Vec<char> = word.chars().collect();
        if chars.len() > self.max_input_chars_per_word {
            return vec![self.unknown_token.clone()];
        }

        let mut pieces = Vec::new();
        let mut start = 0;
        while start < chars.len() {
            let Some((piece, end)) = self.longest_match(&chars, start) else {
                return vec![self.unknown_token.clone()];
            };
            pieces.push(piece);
            start = end;
        }
        pieces
    }

    fn longest_match(&self, chars: &[char], start: usize) -> Option<(String, usize)> {
        (start + 1..=chars.len()).rev().find_map(|end| {
            let body: String = chars[start..end].iter().collect();
            let candidate = if start > 0 {
                format!("{}{body}", config::tokenizer::CONTINUATION_PREFIX)
            } else {
                body
            };
            self.vocab.contains(&candidate).then_some((candidate, end))
        })
    }
}

impl WordTokenizer for WordpieceTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split_whitespace()
            .flat_map(|word| self.tokenize_word(word))
            .collect()
    }
}
