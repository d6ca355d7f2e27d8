// engine.rs - Inference boundary: padded id tensors in, token embeddings out.
//
// `InferenceEngine` is the seam the embedder talks to. `BertEngine` implements it
// with candle, loading a BERT checkpoint (all-MiniLM-L6-v2 by default) from
// safetensors. Pooling is not done here; the engine returns raw per-token
// vectors [batch, seq_len, hidden].

use std::path::Path;

use anyhow::Context;
use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};

use crate::config;
use crate::error::{EngineError, TensorError};
use crate::tensor::NdArray;
use crate::tokenizer::BertInput;

/// Three row-major `[batch, seq_len]` id buffers, as the model consumes them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchInput {
    pub input_ids: Vec<i64>,
    pub attention_mask: Vec<i64>,
    pub token_type_ids: Vec<i64>,
    pub batch: usize,
    pub seq_len: usize,
}

impl BatchInput {
    /// Stack per-sentence inputs. All rows must share one padded length.
    pub fn from_rows(rows: &[BertInput]) -> Result<Self, TensorError> {
        let seq_len = rows.first().map_or(0, BertInput::len);
        if let Some(bad) = rows.iter().find(|r| r.len() != seq_len) {
            return Err(TensorError::shape(
                "stack",
                format!("row of length {} in batch padded to {seq_len}", bad.len()),
            ));
        }

        Ok(Self {
            input_ids: rows.iter().flat_map(|r| r.input_ids.iter().copied()).collect(),
            attention_mask: rows.iter().flat_map(|r| r.attention_mask.iter().copied()).collect(),
            token_type_ids: rows.iter().flat_map(|r| r.type_ids.iter().copied()).collect(),
            batch: rows.len(),
            seq_len,
        })
    }
}

/// Anything that maps a padded batch to per-token embeddings.
///
/// Errors are returned as-is to the embedding caller (e.g. a sequence longer
/// than the model supports).
pub trait InferenceEngine {
    fn hidden_size(&self) -> usize;

    /// Returns a `[batch, seq_len, hidden_size]` tensor.
    fn run(&self, input: &BatchInput) -> anyhow::Result<NdArray>;
}

/// Candle BERT encoder on CPU.
pub struct BertEngine {
    model: BertModel,
    device: Device,
    hidden_size: usize,
    max_position_embeddings: usize,
}

impl BertEngine {
    /// Load the model from a local directory containing model.safetensors and config.json.
    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let device = Device::Cpu;

        let config_path = model_dir.join(config::embedding::CONFIG_FILE);
        let config_str = std::fs::read_to_string(&config_path)
            .with_context(|| format!("read {}", config_path.display()))?;
        let bert_config: BertConfig = serde_json::from_str(&config_str)
            .with_context(|| format!("parse {}", config_path.display()))?;

        log::info!(
            "Loading BERT model: hidden_size={}, layers={}, heads={}, max_positions={}",
            bert_config.hidden_size,
            bert_config.num_hidden_layers,
            bert_config.num_attention_heads,
            bert_config.max_position_embeddings,
        );

        if bert_config.hidden_size != config::embedding::EMBEDDING_DIMS {
            log::warn!(
                "Model hidden_size {} differs from {} dims of {}",
                bert_config.hidden_size,
                config::embedding::EMBEDDING_DIMS,
                config::embedding::EMBEDDING_MODEL_NAME,
            );
        }

        let weights_path = model_dir.join(config::embedding::WEIGHTS_FILE);
        // SAFETY: the weights file is memory-mapped read-only and must not be
        // modified while the model is alive.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path.clone()], DType::F32, &device)
                .with_context(|| format!("load weights from {}", weights_path.display()))?
        };

        let model = BertModel::load(vb, &bert_config).context("load BERT model")?;

        log::info!("BERT model loaded (dims={})", bert_config.hidden_size);

        Ok(Self {
            model,
            device,
            hidden_size: bert_config.hidden_size,
            max_position_embeddings: bert_config.max_position_embeddings,
        })
    }

    fn ids_tensor(&self, ids: &[i64], input: &BatchInput) -> anyhow::Result<Tensor> {
        Ok(Tensor::from_vec(ids.to_vec(), (input.batch, input.seq_len), &self.device)?)
    }
}

impl InferenceEngine for BertEngine {
    fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    fn run(&self, input: &BatchInput) -> anyhow::Result<NdArray> {
        if input.seq_len > self.max_position_embeddings {
            return Err(EngineError::SequenceLengthExceeded {
                len: input.seq_len,
                max: self.max_position_embeddings,
            }
            .into());
        }

        let input_ids = self.ids_tensor(&input.input_ids, input)?;
        let attention_mask = self.ids_tensor(&input.attention_mask, input)?;
        let token_type_ids = self.ids_tensor(&input.token_type_ids, input)?;

        // Forward pass -> [batch, seq_len, hidden_size]
        let output = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        let (batch, seq_len, hidden) = output.dims3()?;
        let data: Vec<f32> = output.to_dtype(DType::F32)?.flatten_all()?.to_vec1()?;
        log::debug!("Engine output [{batch}, {seq_len}, {hidden}]");

        Ok(NdArray::new(data, vec![batch, seq_len, hidden])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(ids: &[i64], mask: &[i64]) -> BertInput {
        BertInput {
            input_ids: ids.to_vec(),
            attention_mask: mask.to_vec(),
            type_ids: vec![0; ids.len()],
        }
    }

    #[test]
    fn test_batch_input_stacks_rows() {
        let rows = vec![row(&[101, 7, 102], &[1, 1, 1]), row(&[101, 102, 0], &[1, 1, 0])];
        let batch = BatchInput::from_rows(&rows).unwrap();
        assert_eq!(batch.batch, 2);
        assert_eq!(batch.seq_len, 3);
        assert_eq!(batch.input_ids, vec![101, 7, 102, 101, 102, 0]);
        assert_eq!(batch.attention_mask, vec![1, 1, 1, 1, 1, 0]);
    }

    #[test]
    fn test_batch_input_rejects_ragged_rows() {
        let rows = vec![row(&[101, 102], &[1, 1]), row(&[101, 7, 102], &[1, 1, 1])];
        assert!(BatchInput::from_rows(&rows).is_err());
    }

    #[test]
    fn test_load_missing_model_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = BertEngine::load(dir.path()).err().unwrap();
        assert!(format!("{err:#}").contains("config.json"));
    }
}
