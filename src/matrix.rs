//! Packed problem data in the form the native loaders consume
//!
//! The native `loadProblem` entry points take a sparse matrix in
//! compressed-column form (start offsets, row indices, values) plus the
//! bounds and objective arrays. [`PackedMatrix`] owns the column-major
//! arrays and validates their internal consistency up front, so shape
//! faults surface as typed errors here instead of undefined behavior
//! inside the native call.

use itertools::Itertools;

use crate::error::{CoinError, Result};
use crate::ffi::CoinBigIndex;

/// Sparse matrix in compressed-column (CSC) storage.
#[derive(Debug, Clone, PartialEq)]
pub struct PackedMatrix {
    num_rows: usize,
    starts: Vec<CoinBigIndex>,
    indices: Vec<i32>,
    values: Vec<f64>,
}

impl PackedMatrix {
    /// An empty matrix with a fixed row count, ready for column appends.
    pub fn new(num_rows: usize) -> Self {
        PackedMatrix {
            num_rows,
            starts: vec![0],
            indices: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Build from raw compressed-column arrays, validating their
    /// internal consistency.
    pub fn from_csc(
        num_rows: usize,
        starts: Vec<CoinBigIndex>,
        indices: Vec<i32>,
        values: Vec<f64>,
    ) -> Result<Self> {
        if starts.is_empty() {
            return Err(CoinError::InvalidMatrix(
                "start array must hold at least one offset".into(),
            ));
        }
        if starts[0] != 0 {
            return Err(CoinError::InvalidMatrix(format!(
                "start array must begin at 0, found {}",
                starts[0]
            )));
        }
        if let Some((a, b)) = starts.iter().tuple_windows().find(|(a, b)| a > b) {
            return Err(CoinError::InvalidMatrix(format!(
                "start offsets must be non-decreasing, found {a} followed by {b}"
            )));
        }

        let num_elements = *starts.last().unwrap() as usize;
        crate::marshal::check_len("index", num_elements, indices.len())?;
        crate::marshal::check_len("value", num_elements, values.len())?;

        if let Some(&row) = indices.iter().find(|&&row| row < 0 || row as usize >= num_rows) {
            return Err(CoinError::InvalidMatrix(format!(
                "row index {row} out of range for {num_rows} rows"
            )));
        }

        Ok(PackedMatrix {
            num_rows,
            starts,
            indices,
            values,
        })
    }

    /// Append one column given its (row, value) entries; returns the new
    /// column's index.
    pub fn add_column(&mut self, entries: &[(i32, f64)]) -> Result<usize> {
        for &(row, _) in entries {
            if row < 0 || row as usize >= self.num_rows {
                return Err(CoinError::InvalidMatrix(format!(
                    "row index {row} out of range for {} rows",
                    self.num_rows
                )));
            }
        }
        for &(row, value) in entries {
            self.indices.push(row);
            self.values.push(value);
        }
        self.starts.push(self.indices.len() as CoinBigIndex);
        Ok(self.num_cols() - 1)
    }

    pub fn num_rows(&self) -> usize {
        self.num_rows
    }

    pub fn num_cols(&self) -> usize {
        self.starts.len() - 1
    }

    pub fn num_elements(&self) -> usize {
        self.values.len()
    }

    pub fn starts(&self) -> &[CoinBigIndex] {
        &self.starts
    }

    pub fn indices(&self) -> &[i32] {
        &self.indices
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Borrowed sparse (index, value) view used for single row/column
/// additions and row cuts.
#[derive(Debug, Clone, Copy)]
pub struct PackedVector<'a> {
    indices: &'a [i32],
    values: &'a [f64],
}

impl<'a> PackedVector<'a> {
    pub fn new(indices: &'a [i32], values: &'a [f64]) -> Result<Self> {
        crate::marshal::check_len("values", indices.len(), values.len())?;
        Ok(PackedVector { indices, values })
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn indices(&self) -> &'a [i32] {
        self.indices
    }

    pub fn values(&self) -> &'a [f64] {
        self.values
    }
}

/// A complete problem: matrix, column bounds, objective and row bounds,
/// cross-checked so every array matches the matrix dimensions.
#[derive(Debug, Clone, PartialEq)]
pub struct ProblemData {
    matrix: PackedMatrix,
    col_lower: Vec<f64>,
    col_upper: Vec<f64>,
    objective: Vec<f64>,
    row_lower: Vec<f64>,
    row_upper: Vec<f64>,
}

impl ProblemData {
    pub fn new(
        matrix: PackedMatrix,
        col_lower: Vec<f64>,
        col_upper: Vec<f64>,
        objective: Vec<f64>,
        row_lower: Vec<f64>,
        row_upper: Vec<f64>,
    ) -> Result<Self> {
        let cols = matrix.num_cols();
        let rows = matrix.num_rows();
        crate::marshal::check_len("collb", cols, col_lower.len())?;
        crate::marshal::check_len("colub", cols, col_upper.len())?;
        crate::marshal::check_len("obj", cols, objective.len())?;
        crate::marshal::check_len("rowlb", rows, row_lower.len())?;
        crate::marshal::check_len("rowub", rows, row_upper.len())?;

        Ok(ProblemData {
            matrix,
            col_lower,
            col_upper,
            objective,
            row_lower,
            row_upper,
        })
    }

    pub fn matrix(&self) -> &PackedMatrix {
        &self.matrix
    }

    pub fn col_lower(&self) -> &[f64] {
        &self.col_lower
    }

    pub fn col_upper(&self) -> &[f64] {
        &self.col_upper
    }

    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    pub fn row_lower(&self) -> &[f64] {
        &self.row_lower
    }

    pub fn row_upper(&self) -> &[f64] {
        &self.row_upper
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ffi::INFINITY;

    fn two_var_three_row() -> PackedMatrix {
        PackedMatrix::from_csc(
            3,
            vec![0, 2, 4],
            vec![0, 1, 0, 2],
            vec![1.0, 1.0, 1.0, 1.0],
        )
        .unwrap()
    }

    #[test]
    fn test_from_csc_accepts_consistent_data() {
        let matrix = two_var_three_row();
        assert_eq!(matrix.num_cols(), 2);
        assert_eq!(matrix.num_rows(), 3);
        assert_eq!(matrix.num_elements(), 4);
    }

    #[test]
    fn test_from_csc_rejects_short_value_array() {
        let err =
            PackedMatrix::from_csc(3, vec![0, 2, 4], vec![0, 1, 0, 2], vec![1.0, 1.0, 1.0])
                .unwrap_err();
        assert!(matches!(
            err,
            CoinError::ArgumentShape {
                argument: "value",
                expected: 4,
                actual: 3,
            }
        ));
    }

    #[test]
    fn test_from_csc_rejects_decreasing_starts() {
        let err = PackedMatrix::from_csc(3, vec![0, 3, 2], vec![0, 1, 2], vec![1.0; 3])
            .unwrap_err();
        assert!(matches!(err, CoinError::InvalidMatrix(_)));
    }

    #[test]
    fn test_from_csc_rejects_row_out_of_range() {
        let err = PackedMatrix::from_csc(2, vec![0, 1], vec![5], vec![1.0]).unwrap_err();
        assert!(matches!(err, CoinError::InvalidMatrix(_)));
    }

    #[test]
    fn test_add_column_extends_starts() {
        let mut matrix = PackedMatrix::new(3);
        assert_eq!(matrix.add_column(&[(0, 1.0), (1, 1.0)]).unwrap(), 0);
        assert_eq!(matrix.add_column(&[(0, 1.0), (2, 1.0)]).unwrap(), 1);
        assert_eq!(matrix, two_var_three_row());
    }

    #[test]
    fn test_packed_vector_requires_matching_lengths() {
        let err = PackedVector::new(&[0, 1], &[1.0]).unwrap_err();
        assert!(matches!(err, CoinError::ArgumentShape { .. }));
    }

    #[test]
    fn test_problem_data_cross_checks_every_array() {
        let matrix = two_var_three_row();
        let err = ProblemData::new(
            matrix,
            vec![0.0, 0.0],
            vec![INFINITY, INFINITY],
            vec![1.0, 1.0],
            vec![-INFINITY; 3],
            vec![10.0, 10.0], // one row bound short
        )
        .unwrap_err();
        assert!(matches!(
            err,
            CoinError::ArgumentShape {
                argument: "rowub",
                expected: 3,
                actual: 2,
            }
        ));
    }
}
