// error.rs - Typed errors for the tokenizer, tensor and inference layers.
//
// The embedding layer works in anyhow::Result; these convert with `?` and can be
// recovered with `downcast_ref`.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading a vocabulary or turning text into ids.
#[derive(Debug, Error)]
pub enum TokenizerError {
    /// Vocabulary file missing or unreadable.
    #[error("failed to load vocabulary from {}: {source}", .path.display())]
    VocabLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Vocabulary content violates the one-unique-token-per-line format.
    #[error("malformed vocabulary at line {line}: {reason}")]
    MalformedVocab { line: usize, reason: String },

    /// A token has no id. Only reachable when the unknown-token fallback
    /// itself (or one of the sentinels) is missing from the vocabulary.
    #[error("token {0:?} is not in the vocabulary")]
    UnknownToken(String),

    #[error("token id {id} out of range for vocabulary of {len} entries")]
    IdOutOfRange { id: usize, len: usize },

    /// Encoding was asked to pad to fewer positions than there are real tokens.
    #[error("target length {target} is shorter than the {required} tokens to encode")]
    TargetTooShort { target: usize, required: usize },
}

/// Shape errors from the tensor primitives. These indicate programming errors.
#[derive(Debug, Error)]
pub enum TensorError {
    #[error("shape mismatch in {op}: {detail}")]
    ShapeMismatch { op: &'static str, detail: String },

    #[error("axis {axis} out of range for {rank}-dimensional tensor")]
    AxisOutOfRange { axis: isize, rank: usize },
}

impl TensorError {
    pub(crate) fn shape(op: &'static str, detail: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            op,
            detail: detail.into(),
        }
    }
}

/// Errors raised at the inference boundary.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The model cannot attend over a sequence this long.
    #[error("sequence length {len} exceeds the model maximum of {max}")]
    SequenceLengthExceeded { len: usize, max: usize },

    #[error("engine returned shape {actual:?}, expected {expected:?}")]
    OutputShape {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },
}
