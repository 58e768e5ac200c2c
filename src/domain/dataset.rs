//! Samples × dimensions input matrix.
//!
//! Storage is a column-major `nalgebra::DMatrix<f64>`: row `i` is sample `i`,
//! column `d` is dimension `d`, and every dimension is one contiguous slice of
//! the backing buffer. `f32` inputs are widened once at construction.

use nalgebra::DMatrix;

use crate::error::{ExtractError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    matrix: DMatrix<f64>,
}

impl Dataset {
    /// Build from row-major samples (`rows[sample][dimension]`).
    ///
    /// Rows must be non-empty and all of the same length.
    pub fn from_rows<T: Copy + Into<f64>>(rows: &[Vec<T>]) -> Result<Self> {
        let Some(first) = rows.first() else {
            return Err(ExtractError::invalid("dataset has no samples"));
        };
        let dims = first.len();
        if dims == 0 {
            return Err(ExtractError::invalid("dataset rows have no dimensions"));
        }
        if let Some((idx, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != dims) {
            return Err(ExtractError::invalid(format!(
                "ragged dataset: row {idx} has {} dimensions, expected {dims}",
                row.len()
            )));
        }

        let matrix = DMatrix::from_fn(rows.len(), dims, |r, c| rows[r][c].into());
        Ok(Self { matrix })
    }

    /// Build from per-dimension columns (`columns[dimension][sample]`).
    pub fn from_columns<T: Copy + Into<f64>>(columns: &[Vec<T>]) -> Result<Self> {
        let Some(first) = columns.first() else {
            return Err(ExtractError::invalid("dataset has no dimensions"));
        };
        let samples = first.len();
        if samples == 0 {
            return Err(ExtractError::invalid("dataset columns have no samples"));
        }
        if let Some((idx, col)) = columns.iter().enumerate().find(|(_, c)| c.len() != samples) {
            return Err(ExtractError::invalid(format!(
                "ragged dataset: dimension {idx} has {} samples, expected {samples}",
                col.len()
            )));
        }

        let data: Vec<f64> = columns
            .iter()
            .flat_map(|c| c.iter().map(|&v| v.into()))
            .collect();
        let matrix = DMatrix::from_vec(samples, columns.len(), data);
        Ok(Self { matrix })
    }

    pub fn from_matrix(matrix: DMatrix<f64>) -> Result<Self> {
        if matrix.nrows() == 0 || matrix.ncols() == 0 {
            return Err(ExtractError::invalid(format!(
                "dataset must be non-empty, got {}x{}",
                matrix.nrows(),
                matrix.ncols()
            )));
        }
        Ok(Self { matrix })
    }

    pub fn num_samples(&self) -> usize {
        self.matrix.nrows()
    }

    pub fn num_dimensions(&self) -> usize {
        self.matrix.ncols()
    }

    /// All samples of one dimension.
    ///
    /// # Panics
    /// Panics if `dimension >= self.num_dimensions()`.
    pub fn dimension(&self, dimension: usize) -> &[f64] {
        let n = self.matrix.nrows();
        &self.matrix.as_slice()[dimension * n..(dimension + 1) * n]
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_and_columns_agree() {
        let rows = vec![vec![1.0f32, 10.0, 100.0], vec![2.0, 20.0, 200.0]];
        let a = Dataset::from_rows(&rows).unwrap();
        let b = Dataset::from_columns(&[
            vec![1.0f64, 2.0],
            vec![10.0, 20.0],
            vec![100.0, 200.0],
        ])
        .unwrap();

        assert_eq!(a, b);
        assert_eq!(a.num_samples(), 2);
        assert_eq!(a.num_dimensions(), 3);
        assert_eq!(a.dimension(1), &[10.0, 20.0]);
    }

    #[test]
    fn rejects_empty_and_ragged() {
        let empty: Vec<Vec<f64>> = Vec::new();
        assert!(Dataset::from_rows(&empty).is_err());
        assert!(Dataset::from_rows(&[Vec::<f64>::new()]).is_err());
        assert!(Dataset::from_rows(&[vec![1.0f64, 2.0], vec![3.0]]).is_err());
        assert!(Dataset::from_matrix(DMatrix::<f64>::zeros(0, 3)).is_err());
    }
}
