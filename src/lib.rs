// minilm-embed - Sentence embeddings for BERT-family models (all-MiniLM-L6-v2).
//
// text -> BertTokenizer (basic split + WordPiece + [CLS]/[SEP]) -> padded ids
//      -> InferenceEngine -> masked mean pooling -> L2 normalization

pub mod config;
pub mod embeddings;
pub mod error;
pub mod logging;
pub mod pooling;
pub mod tensor;
pub mod tokenizer;

pub use embeddings::{BatchInput, BertEngine, Embed, Embedder, EmbedderOptions, InferenceEngine};
pub use error::{EngineError, TensorError, TokenizerError};
pub use tensor::NdArray;
pub use tokenizer::{
    BertTokenizer, EncodedToken, SentenceTokenizer, Token, TokenizerOptions, Vocabulary,
};
