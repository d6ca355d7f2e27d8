// embedder.rs - Text -> unit-norm sentence embeddings.
//
// Tokenize (optionally truncating), pad every row to the batch's longest
// sequence, run the inference engine once, then mean-pool and L2-normalize
// each row independently.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use super::engine::{BatchInput, BertEngine, InferenceEngine};
use crate::config;
use crate::error::EngineError;
use crate::pooling;
use crate::tokenizer::{encode_tokens, BertInput, BertTokenizer, SentenceTokenizer, Token, TokenizerOptions};

/// Sentence embedding capability.
pub trait Embed {
    /// Embed one sentence. Returns a unit vector of the engine's hidden size.
    fn embed_one(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    /// Embed many sentences in one engine call. Output order matches input.
    fn embed_batch(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Embedding options. Missing JSON fields take the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbedderOptions {
    pub tokenizer: TokenizerOptions,

    /// Cut token sequences (including [CLS]/[SEP]) to `max_sequence_length`
    /// before encoding. When off, overlong input reaches the engine, which
    /// may reject it.
    pub truncate: bool,
    pub max_sequence_length: usize,
}

impl Default for EmbedderOptions {
    fn default() -> Self {
        Self {
            tokenizer: TokenizerOptions::default(),
            truncate: true,
            max_sequence_length: config::embedding::MAX_SEQUENCE_LENGTH,
        }
    }
}

impl EmbedderOptions {
    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        serde_json::from_str(json).context("parse embedder options")
    }

    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("parse {}", path.display()))
    }
}

/// Tokenizer + inference engine + pooling.
pub struct Embedder<T, E> {
    tokenizer: T,
    engine: E,
    options: EmbedderOptions,
}

impl Embedder<BertTokenizer, BertEngine> {
    /// Load vocab.txt, config.json and model.safetensors from one directory.
    pub fn from_model_dir(model_dir: &Path, options: EmbedderOptions) -> anyhow::Result<Self> {
        let vocab_path = model_dir.join(config::embedding::VOCAB_FILE);
        let tokenizer = BertTokenizer::from_vocab_file(&vocab_path, &options.tokenizer)
            .with_context(|| format!("load tokenizer from {}", vocab_path.display()))?;
        let engine = BertEngine::load(model_dir)?;
        Ok(Self::new(tokenizer, engine, options))
    }
}

impl<T: SentenceTokenizer, E: InferenceEngine> Embedder<T, E> {
    pub fn new(tokenizer: T, engine: E, options: EmbedderOptions) -> Self {
        Self {
            tokenizer,
            engine,
            options,
        }
    }

    pub fn tokenizer(&self) -> &T {
        &self.tokenizer
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn options(&self) -> &EmbedderOptions {
        &self.options
    }

    fn prepare(&self, text: &str) -> anyhow::Result<Vec<Token>> {
        let mut tokens = self.tokenizer.tokenize(text).context("tokenize")?;
        let max = self.options.max_sequence_length;
        if self.options.truncate && tokens.len() > max {
            log::warn!("Truncating input from {} to {} tokens", tokens.len(), max);
            tokens.truncate(max);
        }
        Ok(tokens)
    }

    fn embed_token_rows(&self, token_rows: &[Vec<Token>]) -> anyhow::Result<Vec<Vec<f32>>> {
        // Batch-uniform padding: every row gets the longest row's length.
        let seq_len = token_rows.iter().map(Vec::len).max().unwrap_or(0);

        let rows = token_rows
            .iter()
            .map(|tokens| encode_tokens(seq_len, tokens).map(|encoded| BertInput::from_encoded(&encoded)))
            .collect::<Result<Vec<_>, _>>()?;
        let input = BatchInput::from_rows(&rows)?;

        log::debug!("Running engine on batch [{}, {}]", input.batch, input.seq_len);
        let output = self.engine.run(&input)?;

        let expected = vec![input.batch, input.seq_len, self.engine.hidden_size()];
        if output.dims() != expected.as_slice() {
            return Err(EngineError::OutputShape {
                expected,
                actual: output.dims().to_vec(),
            }
            .into());
        }

        Ok(pooling::pool_batch(&output, &input.attention_mask)?)
    }
}

impl<T: SentenceTokenizer, E: InferenceEngine> Embed for Embedder<T, E> {
    fn embed_one(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let tokens = self.prepare(text)?;
        self.embed_token_rows(&[tokens])?
            .pop()
            .context("engine returned no rows")
    }

    fn embed_batch(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let token_rows = texts
            .iter()
            .map(|text| self.prepare(text))
            .collect::<anyhow::Result<Vec<_>>>()?;
        self.embed_token_rows(&token_rows)
    }
}
