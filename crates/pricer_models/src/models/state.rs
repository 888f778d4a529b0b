//! Row-major batches of asset-price vectors.
//!
//! A [`StateBatch`] holds `n` states of dimension `d` contiguously:
//! `data[row * d + asset]`.

/// Batch of `n_rows` asset-price vectors of dimension `dim`.
///
/// # Examples
///
/// ```
/// use pricer_models::models::StateBatch;
///
/// let batch = StateBatch::repeat_row(&[100.0, 90.0], 3);
/// assert_eq!(batch.n_rows(), 3);
/// assert_eq!(batch.dim(), 2);
/// assert_eq!(batch.row(2), &[100.0, 90.0]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct StateBatch {
    data: Vec<f64>,
    n_rows: usize,
    dim: usize,
}

impl StateBatch {
    /// Wraps a row-major buffer.
    ///
    /// # Panics
    ///
    /// Panics if `dim == 0` or `data.len()` is not a multiple of `dim`.
    pub fn from_vec(data: Vec<f64>, dim: usize) -> Self {
        assert!(dim > 0, "State dimension must be positive");
        assert!(
            data.len() % dim == 0,
            "Buffer length {} is not a multiple of dimension {}",
            data.len(),
            dim
        );
        let n_rows = data.len() / dim;
        Self { data, n_rows, dim }
    }

    /// Builds a batch from individual rows.
    ///
    /// # Panics
    ///
    /// Panics if the rows have differing lengths or zero length.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Self {
        let dim = rows.first().map_or(1, |r| r.as_ref().len());
        let mut data = Vec::with_capacity(rows.len() * dim);
        for row in rows {
            let row = row.as_ref();
            assert_eq!(row.len(), dim, "All rows must share the same dimension");
            data.extend_from_slice(row);
        }
        Self::from_vec(data, dim)
    }

    /// Builds a batch holding `n` copies of `row`.
    pub fn repeat_row(row: &[f64], n: usize) -> Self {
        let mut data = Vec::with_capacity(row.len() * n);
        for _ in 0..n {
            data.extend_from_slice(row);
        }
        Self::from_vec(data, row.len())
    }

    /// Number of states in the batch.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of assets per state.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Returns `true` when the batch holds no states.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Returns state `i`.
    #[inline]
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    /// Iterates over states in order.
    #[inline]
    pub fn rows(&self) -> std::slice::ChunksExact<'_, f64> {
        self.data.chunks_exact(self.dim)
    }

    /// Flat row-major view.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Consumes the batch and returns the row-major buffer.
    #[inline]
    pub fn into_vec(self) -> Vec<f64> {
        self.data
    }

    /// Gathers the given rows, in the given order, into a new batch.
    pub fn select_rows(&self, indices: &[usize]) -> Self {
        let mut data = Vec::with_capacity(indices.len() * self.dim);
        for &i in indices {
            data.extend_from_slice(self.row(i));
        }
        Self {
            data,
            n_rows: indices.len(),
            dim: self.dim,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_vec_shape() {
        let batch = StateBatch::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 3);
        assert_eq!(batch.n_rows(), 2);
        assert_eq!(batch.row(1), &[4.0, 5.0, 6.0]);
    }

    #[test]
    #[should_panic(expected = "not a multiple")]
    fn test_from_vec_ragged_panics() {
        let _ = StateBatch::from_vec(vec![1.0, 2.0, 3.0], 2);
    }

    #[test]
    fn test_from_rows_and_iteration() {
        let batch = StateBatch::from_rows(&[[1.0, 2.0], [3.0, 4.0]]);
        let rows: Vec<&[f64]> = batch.rows().collect();
        assert_eq!(rows, vec![&[1.0, 2.0][..], &[3.0, 4.0][..]]);
    }

    #[test]
    fn test_select_rows_preserves_order() {
        let batch = StateBatch::from_rows(&[[1.0], [2.0], [3.0]]);
        let picked = batch.select_rows(&[2, 0]);
        assert_eq!(picked.as_slice(), &[3.0, 1.0]);
        assert_eq!(picked.dim(), 1);
    }

    #[test]
    fn test_empty_selection() {
        let batch = StateBatch::from_rows(&[[1.0, 2.0]]);
        let empty = batch.select_rows(&[]);
        assert!(empty.is_empty());
        assert_eq!(empty.dim(), 2);
    }
}
