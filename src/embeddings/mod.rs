// embeddings/ - Sentence embedding pipeline.
//
// Provides:
// - The inference engine boundary and a candle BERT implementation
// - The embedder: tokenize, pad, infer, mean-pool, normalize

pub mod embedder;
pub mod engine;

pub use embedder::{Embed, Embedder, EmbedderOptions};
pub use engine::{BatchInput, BertEngine, InferenceEngine};
