// bert.rs - Full BERT sentence tokenizer: basic split, WordPiece, [CLS]/[SEP].

use std::path::Path;
use std::sync::Arc;

use super::{
    BasicTokenizer, SentenceTokenizer, Token, TokenizerOptions, Vocabulary, WordTokenizer,
    WordpieceTokenizer,
};
use crate::config;
use crate::error::TokenizerError;

/// Sentence tokenizer for BERT-style models. Cheap to clone; the vocabulary is shared.
#[derive(Debug, Clone)]
pub struct BertTokenizer {
    vocab: Arc<Vocabulary>,
    basic: BasicTokenizer,
    wordpiece: WordpieceTokenizer,
    cls_id: i64,
    sep_id: i64,
}

impl BertTokenizer {
    /// Build over a loaded vocabulary. The sentinels and the unknown token must
    /// all be present.
    pub fn new(vocab: Vocabulary, options: &TokenizerOptions) -> Result<Self, TokenizerError> {
        let cls_id = vocab.lookup(config::tokenizer::CLS_TOKEN)? as i64;
        let sep_id = vocab.lookup(config::tokenizer::SEP_TOKEN)? as i64;
        vocab.lookup(&options.unknown_token)?;

        let vocab = Arc::new(vocab);
        Ok(Self {
            basic: BasicTokenizer::new(options.lowercase),
            wordpiece: WordpieceTokenizer::new(
                Arc::clone(&vocab),
                &options.unknown_token,
                options.max_input_chars_per_word,
            ),
            vocab,
            cls_id,
            sep_id,
        })
    }

    pub fn from_vocab_file(path: &Path, options: &TokenizerOptions) -> Result<Self, TokenizerError> {
        Self::new(Vocabulary::load(path)?, options)
    }

    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    pub fn convert_tokens_to_ids<S: AsRef<str>>(&self, tokens: &[S]) -> Result<Vec<usize>, TokenizerError> {
        tokens.iter().map(|t| self.vocab.lookup(t.as_ref())).collect()
    }

    pub fn convert_ids_to_tokens(&self, ids: &[usize]) -> Result<Vec<String>, TokenizerError> {
        ids.iter()
            .map(|&id| self.convert_id_to_token(id).map(str::to_string))
            .collect()
    }

    pub fn convert_id_to_token(&self, id: usize) -> Result<&str, TokenizerError> {
        self.vocab.reverse_lookup(id)
    }
}

impl SentenceTokenizer for BertTokenizer {
    fn tokenize(&self, text: &str) -> Result<Vec<Token>, TokenizerError> {
        let mut tokens = vec![Token {
            value: config::tokenizer::CLS_TOKEN.to_string(),
            segment_index: 0,
            vocabulary_index: self.cls_id,
        }];

        let mut segment_index = 0;
        for word in self.basic.tokenize(text) {
            let is_separator = word == config::tokenizer::SEP_TOKEN;
            for piece in self.wordpiece.tokenize(&word) {
                let id = self.vocab.lookup(&piece)?;
                tokens.push(Token {
                    value: piece,
                    segment_index,
                    vocabulary_index: id as i64,
                });
                if is_separator {
                    segment_index += 1;
                }
            }
        }

        tokens.push(Token {
            value: config::tokenizer::SEP_TOKEN.to_string(),
            segment_index,
            vocabulary_index: self.sep_id,
        });

        log::debug!("Tokenized {} chars into {} tokens", text.len(), tokens.len());
        Ok(tokens)
    }
}
