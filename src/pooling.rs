// pooling.rs - Attention-mask-aware mean pooling + L2 normalization.
//
// Turns raw token embeddings [rows, seq_len, hidden] into one unit vector per
// row. Padding positions (mask 0) contribute nothing to the mean.

use crate::config;
use crate::error::TensorError;
use crate::tensor::NdArray;

/// Masked mean over the sequence axis.
///
/// token_embeddings: [rows, seq_len, hidden]
/// attention_mask: [rows, seq_len] (1 for real tokens, 0 for padding)
/// output: [rows, hidden]
pub fn mean_pool(token_embeddings: &NdArray, attention_mask: &NdArray) -> Result<NdArray, TensorError> {
    if token_embeddings.dims().len() != 3 {
        return Err(TensorError::shape(
            "mean_pool",
            format!("token embeddings must be 3-d, got {:?}", token_embeddings.dims()),
        ));
    }

    // [rows, seq_len] -> [rows, seq_len, 1] -> [rows, seq_len, hidden]
    let mask_expanded = attention_mask.unsqueeze(-1)?.expand(token_embeddings.dims())?;

    let sum_embeddings = token_embeddings.mul(&mask_expanded)?.sum(1, false)?;

    // Token count per row, broadcast over hidden; floored so an all-padding
    // row divides by a tiny positive number instead of zero.
    let sum_mask = mask_expanded
        .sum(1, false)?
        .clamp(config::embedding::MASK_SUM_MIN, f32::MAX);

    sum_embeddings.div(&sum_mask)
}

/// L2-normalize each row of a [rows, hidden] tensor.
///
/// The norm is floored at `NORM_MIN`, so an all-zero row stays zero rather
/// than turning into NaN.
pub fn l2_normalize(pooled: &NdArray) -> Result<NdArray, TensorError> {
    let norm = pooled
        .lp_norm(2.0, 1)?
        .clamp(config::embedding::NORM_MIN, f32::MAX)
        .expand(pooled.dims())?;
    pooled.div(&norm)
}

/// Pool a stacked engine output row by row, in input order.
///
/// Each row is sliced out (stride seq_len * hidden for embeddings, seq_len for
/// the mask) and pooled on its own, so rows never see each other's values.
pub fn pool_batch(output: &NdArray, attention_mask: &[i64]) -> Result<Vec<Vec<f32>>, TensorError> {
    let &[rows, seq_len, _hidden] = output.dims() else {
        return Err(TensorError::shape(
            "pool_batch",
            format!("engine output must be 3-d, got {:?}", output.dims()),
        ));
    };
    if attention_mask.len() != rows * seq_len {
        return Err(TensorError::shape(
            "pool_batch",
            format!(
                "attention mask has {} entries, expected {rows} x {seq_len}",
                attention_mask.len()
            ),
        ));
    }

    (0..rows)
        .map(|row| {
            let tokens = output.row(row)?;
            let mask_row = &attention_mask[row * seq_len..(row + 1) * seq_len];
            let mask = NdArray::from_mask(mask_row, vec![1, seq_len])?;
            let pooled = mean_pool(&tokens, &mask)?;
            Ok(l2_normalize(&pooled)?.into_data())
        })
        .collect()
}
