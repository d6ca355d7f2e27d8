// tensor.rs - Minimal row-major f32 N-dimensional array for the pooling stage.
//
// Every operation returns a fresh array and checks shapes up front. Only the
// handful of ops mean pooling needs are provided.

use crate::error::TensorError;

/// Dense row-major f32 tensor. Invariant: `data.len() == dims.iter().product()`.
#[derive(Debug, Clone, PartialEq)]
pub struct NdArray {
    data: Vec<f32>,
    dims: Vec<usize>,
}

impl NdArray {
    pub fn new(data: Vec<f32>, dims: Vec<usize>) -> Result<Self, TensorError> {
        let expected: usize = dims.iter().product();
        if data.len() != expected {
            return Err(TensorError::shape(
                "new",
                format!("{} elements do not fill dims {dims:?} ({expected})", data.len()),
            ));
        }
        Ok(Self { data, dims })
    }

    /// Cast an integer attention mask to float.
    pub fn from_mask(mask: &[i64], dims: Vec<usize>) -> Result<Self, TensorError> {
        Self::new(mask.iter().map(|&m| m as f32).collect(), dims)
    }

    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn data(&self) -> &[f32] {
        &self.data
    }

    pub fn into_data(self) -> Vec<f32> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Insert a size-1 axis. Negative axes count from the end (-1 appends).
    pub fn unsqueeze(&self, axis: isize) -> Result<Self, TensorError> {
        let rank = self.dims.len();
        let pos = if axis < 0 { rank as isize + 1 + axis } else { axis };
        if pos < 0 || pos as usize > rank {
            return Err(TensorError::AxisOutOfRange { axis, rank });
        }
        let mut dims = self.dims.clone();
        dims.insert(pos as usize, 1);
        Ok(Self {
            data: self.data.clone(),
            dims,
        })
    }

    /// Broadcast size-1 axes up to `target`. Other axes must already match.
    pub fn expand(&self, target: &[usize]) -> Result<Self, TensorError> {
        if target.len() != self.dims.len() {
            return Err(TensorError::shape(
                "expand",
                format!("cannot expand {:?} to {target:?}: rank differs", self.dims),
            ));
        }
        for (&have, &want) in self.dims.iter().zip(target) {
            if have != want && have != 1 {
                return Err(TensorError::shape(
                    "expand",
                    format!("cannot expand {:?} to {target:?}", self.dims),
                ));
            }
        }

        let src_strides = strides(&self.dims);
        let total: usize = target.iter().product();
        let mut data = Vec::with_capacity(total);
        for flat in 0..total {
            let mut rem = flat;
            let mut src = 0;
            for axis in (0..target.len()).rev() {
                let idx = rem % target[axis];
                rem /= target[axis];
                if self.dims[axis] != 1 {
                    src += idx * src_strides[axis];
                }
            }
            data.push(self.data[src]);
        }

        Ok(Self {
            data,
            dims: target.to_vec(),
        })
    }

    /// Sum along `axis`, dropping it unless `keepdim`.
    pub fn sum(&self, axis: usize, keepdim: bool) -> Result<Self, TensorError> {
        self.reduce(axis, keepdim, |lane| lane.iter().sum())
    }

    pub fn sum_all(&self) -> f32 {
        self.data.iter().sum()
    }

    pub fn mul(&self, other: &Self) -> Result<Self, TensorError> {
        self.zip_with(other, "mul", |a, b| a * b)
    }

    /// Position-wise division. Zero denominators are not guarded.
    pub fn div(&self, other: &Self) -> Result<Self, TensorError> {
        self.zip_with(other, "div", |a, b| a / b)
    }

    pub fn clamp(&self, min: f32, max: f32) -> Self {
        Self {
            data: self.data.iter().map(|v| v.max(min).min(max)).collect(),
            dims: self.dims.clone(),
        }
    }

    /// Lp norm along `axis`, kept as a size-1 axis.
    pub fn lp_norm(&self, p: f32, axis: usize) -> Result<Self, TensorError> {
        self.reduce(axis, true, |lane| {
            if p == 2.0 {
                lane.iter().map(|v| v * v).sum::<f32>().sqrt()
            } else {
                lane.iter().map(|v| v.abs().powf(p)).sum::<f32>().powf(1.0 / p)
            }
        })
    }

    /// Divide each element by the Lp norm of its lane along `axis`.
    /// A zero norm yields non-finite values.
    pub fn lp_normalize(&self, p: f32, axis: usize) -> Result<Self, TensorError> {
        let norms = self.lp_norm(p, axis)?.expand(&self.dims)?;
        self.div(&norms)
    }

    /// Slice `[i]` along the first axis, keeping that axis as size 1.
    pub fn row(&self, i: usize) -> Result<Self, TensorError> {
        let rows = *self
            .dims
            .first()
            .ok_or(TensorError::AxisOutOfRange { axis: 0, rank: 0 })?;
        if i >= rows {
            return Err(TensorError::shape(
                "row",
                format!("row {i} out of range for dims {:?}", self.dims),
            ));
        }
        let stride = self.data.len() / rows;
        let mut dims = self.dims.clone();
        dims[0] = 1;
        Ok(Self {
            data: self.data[i * stride..(i + 1) * stride].to_vec(),
            dims,
        })
    }

    fn zip_with(&self, other: &Self, op: &'static str, f: impl Fn(f32, f32) -> f32) -> Result<Self, TensorError> {
        if self.dims != other.dims {
            return Err(TensorError::shape(
                op,
                format!("{:?} vs {:?}", self.dims, other.dims),
            ));
        }
        Ok(Self {
            data: self.data.iter().zip(&other.data).map(|(&a, &b)| f(a, b)).collect(),
            dims: self.dims.clone(),
        })
    }

    // Apply `f` to every lane along `axis`.
    fn reduce(&self, axis: usize, keepdim: bool, f: impl Fn(&[f32]) -> f32) -> Result<Self, TensorError> {
        if axis >= self.dims.len() {
            return Err(TensorError::AxisOutOfRange {
                axis: axis as isize,
                rank: self.dims.len(),
            });
        }
        let outer: usize = self.dims[..axis].iter().product();
        let n = self.dims[axis];
        let inner: usize = self.dims[axis + 1..].iter().product();

        let mut data = Vec::with_capacity(outer * inner);
        let mut lane = Vec::with_capacity(n);
        for o in 0..outer {
            for i in 0..inner {
                lane.clear();
                lane.extend((0..n).map(|k| self.data[(o * n + k) * inner + i]));
                data.push(f(&lane));
            }
        }

        let mut dims = self.dims.clone();
        if keepdim {
            dims[axis] = 1;
        } else {
            dims.remove(axis);
        }
        Ok(Self { data, dims })
    }
}

fn strides(dims: &[usize]) -> Vec<usize> {
    let mut strides = vec![1; dims.len()];
    for axis in (0..dims.len().saturating_sub(1)).rev() {
        strides[axis] = strides[axis + 1] * dims[axis + 1];
    }
    strides
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arr(data: &[f32], dims: &[usize]) -> NdArray {
        NdArray::new(data.to_vec(), dims.to_vec()).unwrap()
    }

    #[test]
    fn test_new_rejects_wrong_length() {
        assert!(NdArray::new(vec![1.0, 2.0, 3.0], vec![2, 2]).is_err());
    }

    #[test]
    fn test_sum_middle_axis() {
        let t = arr(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], &[1, 2, 4]);
        let summed = t.sum(1, false).unwrap();
        assert_eq!(summed.dims(), &[1, 4]);
        assert_eq!(summed.data(), &[6.0, 8.0, 10.0, 12.0]);

        let kept = t.sum(1, true).unwrap();
        assert_eq!(kept.dims(), &[1, 1, 4]);
        assert_eq!(t.sum_all(), 36.0);
    }

    #[test]
    fn test_sum_last_axis() {
        let t = arr(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]);
        assert_eq!(t.sum(1, false).unwrap().data(), &[6.0, 15.0]);
        assert_eq!(t.sum(0, false).unwrap().data(), &[5.0, 7.0, 9.0]);
        assert!(t.sum(2, false).is_err());
    }

    #[test]
    fn test_unsqueeze() {
        let t = arr(&[1.0, 1.0, 1.0, 1.0], &[1, 4]);
        assert_eq!(t.unsqueeze(-1).unwrap().dims(), &[1, 4, 1]);
        assert_eq!(t.unsqueeze(0).unwrap().dims(), &[1, 1, 4]);
        assert!(t.unsqueeze(3).is_err());
        assert!(t.unsqueeze(-4).is_err());
    }

    #[test]
    fn test_expand() {
        let t = arr(&[1.0, 1.0, 1.0, 1.0], &[1, 4]);
        let expanded = t.expand(&[2, 4]).unwrap();
        assert_eq!(expanded.dims(), &[2, 4]);
        assert_eq!(expanded.data(), &[1.0; 8]);
    }

    #[test]
    fn test_expand_trailing_axis_replicates_values() {
        let mask = arr(&[1.0, 0.0], &[1, 2, 1]);
        let expanded = mask.expand(&[1, 2, 3]).unwrap();
        assert_eq!(expanded.data(), &[1.0, 1.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_expand_rejects_mismatch() {
        let t = arr(&[1.0, 2.0], &[1, 2]);
        assert!(t.expand(&[1, 3]).is_err());
        assert!(t.expand(&[1, 2, 1]).is_err());
    }

    #[test]
    fn test_elementwise_ops() {
        let x = arr(&[1.0, 2.0, 3.0, 4.0], &[1, 4]);
        let y = arr(&[5.0, 6.0, 7.0, 8.0], &[1, 4]);
        assert_eq!(x.mul(&y).unwrap().data(), &[5.0, 12.0, 21.0, 32.0]);
        assert_eq!(
            x.div(&y).unwrap().data(),
            &[0.2, 0.333_333_34, 0.428_571_43, 0.5]
        );
        assert!(x.mul(&arr(&[1.0, 2.0], &[1, 2])).is_err());
    }

    #[test]
    fn test_clamp() {
        let x = arr(&[1.0, 2.0, 3.0, 4.0], &[1, 4]);
        assert_eq!(x.clamp(2.0, f32::MAX).data(), &[2.0, 2.0, 3.0, 4.0]);
        assert_eq!(x.clamp(f32::MIN, 3.0).data(), &[1.0, 2.0, 3.0, 3.0]);
        assert_eq!(x.clamp(2.0, 3.0).data(), &[2.0, 2.0, 3.0, 3.0]);
    }

    #[test]
    fn test_lp_normalize() {
        let x = arr(&[1.0, 2.0, 3.0, 4.0], &[1, 4]);
        let normalized = x.lp_normalize(2.0, 1).unwrap();
        let expected = [0.182_574_18, 0.365_148_37, 0.547_722_5, 0.730_296_73];
        for (got, want) in normalized.data().iter().zip(expected) {
            assert!((got - want).abs() < 1e-6, "{got} vs {want}");
        }
    }

    #[test]
    fn test_lp_normalize_per_row() {
        let x = arr(&[3.0, 4.0, 0.0, 2.0], &[2, 2]);
        let normalized = x.lp_normalize(2.0, 1).unwrap();
        for (got, want) in normalized.data().iter().zip([0.6, 0.8, 0.0, 1.0]) {
            assert!((got - want).abs() < 1e-6, "{got} vs {want}");
        }
    }

    #[test]
    fn test_lp_normalize_zero_norm_is_not_finite() {
        let x = arr(&[0.0, 0.0], &[1, 2]);
        let normalized = x.lp_normalize(2.0, 1).unwrap();
        assert!(normalized.data().iter().all(|v| !v.is_finite()));
    }

    #[test]
    fn test_row_slices_first_axis() {
        let t = arr(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[3, 2]);
        let row = t.row(1).unwrap();
        assert_eq!(row.dims(), &[1, 2]);
        assert_eq!(row.data(), &[3.0, 4.0]);
        assert!(t.row(3).is_err());
    }

    #[test]
    fn test_from_mask() {
        let mask = NdArray::from_mask(&[1, 1, 0], vec![1, 3]).unwrap();
        assert_eq!(mask.data(), &[1.0, 1.0, 0.0]);
    }
}
