//! Basis matrix storage, generic over the exact integer scalar

use crate::core::error::{LatticeError, Result};
use crate::core::scalar::IntScalar;

/// Row-major matrix of exact integer entries. Rows are the lattice vectors;
/// reduction mutates rows in place and never reallocates the storage.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<Z: IntScalar> {
    data: Vec<Vec<Z>>,
    rows: usize,
    cols: usize,
}

impl<Z: IntScalar> Matrix<Z> {
    /// Create a new matrix from 2D vector
    pub fn new(data: Vec<Vec<Z>>) -> Result<Self> {
        if data.is_empty() {
            return Err(LatticeError::invalid_parameters("Matrix cannot be empty"));
        }

        let rows = data.len();
        let cols = data[0].len();

        // Verify all rows have the same length
        for (i, row) in data.iter().enumerate() {
            if row.len() != cols {
                return Err(LatticeError::invalid_dimensions((rows, cols), (i + 1, row.len())));
            }
        }

        Ok(Matrix { data, rows, cols })
    }

    /// Convenience constructor from machine integers
    pub fn from_i64(data: Vec<Vec<i64>>) -> Result<Self> {
        let converted = data
            .into_iter()
            .map(|row| row.into_iter().map(Z::from_i64).collect())
            .collect();
        Matrix::new(converted)
    }

    /// Create a matrix with given dimensions, filled with zeros
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Matrix {
            data: vec![vec![Z::zero(); cols]; rows],
            rows,
            cols,
        }
    }

    /// Create an identity matrix
    pub fn identity(n: usize) -> Result<Self> {
        if n == 0 {
            return Err(LatticeError::invalid_parameters("Dimension cannot be zero"));
        }

        let mut data = vec![vec![Z::zero(); n]; n];
        for (i, row) in data.iter_mut().enumerate() {
            row[i] = Z::one();
        }

        Ok(Matrix { data, rows: n, cols: n })
    }

    /// Get the number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Get the number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Get the dimension of the matrix
    pub fn dimension(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Get a reference to a specific element
    pub fn get(&self, row: usize, col: usize) -> Option<&Z> {
        self.data.get(row)?.get(col)
    }

    /// Set a specific element
    pub fn set(&mut self, row: usize, col: usize, value: Z) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(LatticeError::invalid_dimensions(
                (self.rows, self.cols),
                (row + 1, col + 1),
            ));
        }

        self.data[row][col] = value;
        Ok(())
    }

    /// Borrow a row as a slice
    pub fn row(&self, row: usize) -> &[Z] {
        debug_assert!(row < self.rows);
        &self.data[row]
    }

    /// Get a row as an owned vector
    pub fn get_row(&self, row: usize) -> Result<Vec<Z>> {
        if row >= self.rows {
            return Err(LatticeError::invalid_dimensions(
                (self.rows, self.cols),
                (row + 1, self.cols),
            ));
        }

        Ok(self.data[row].clone())
    }

    /// Swap two rows
    pub fn swap_rows(&mut self, i: usize, j: usize) -> Result<()> {
        if i >= self.rows || j >= self.rows {
            return Err(LatticeError::invalid_parameters(format!(
                "Row indices {} and {} out of bounds for {} rows",
                i, j, self.rows
            )));
        }
        self.data.swap(i, j);
        Ok(())
    }

    /// `row[k] -= c * row[i]`, computed exactly. Requires `k != i`.
    pub fn sub_mul_row(&mut self, k: usize, i: usize, c: &Z) {
        debug_assert!(k < self.rows && i < self.rows && k != i);
        let (src, dst) = if i < k {
            let (head, tail) = self.data.split_at_mut(k);
            (&head[i], &mut tail[0])
        } else {
            let (head, tail) = self.data.split_at_mut(i);
            (&tail[0], &mut head[k])
        };
        for (d, s) in dst.iter_mut().zip(src.iter()) {
            d.sub_mul_assign(c, s);
        }
    }

    /// Exact squared Euclidean norm of a row
    pub fn row_norm_square(&self, row: usize) -> Z {
        debug_assert!(row < self.rows);
        Z::dot(&self.data[row], &self.data[row])
    }

    /// Compute the determinant (only for square matrices)
    pub fn determinant(&self) -> Result<Z> {
        if self.rows != self.cols {
            return Err(LatticeError::invalid_parameters(
                "Determinant only defined for square matrices",
            ));
        }

        Ok(self.det_recursive())
    }

    /// Recursive cofactor expansion
    fn det_recursive(&self) -> Z {
        let n = self.rows;

        if n == 1 {
            return self.data[0][0].clone();
        }

        if n == 2 {
            return self.data[0][0]
                .mul(&self.data[1][1])
                .sub(&self.data[0][1].mul(&self.data[1][0]));
        }

        let mut det = Z::zero();
        for j in 0..n {
            let mut minor_data = Vec::with_capacity(n - 1);
            for i in 1..n {
                let mut minor_row = Vec::with_capacity(n - 1);
                for k in 0..n {
                    if k != j {
                        minor_row.push(self.data[i][k].clone());
                    }
                }
                minor_data.push(minor_row);
            }

            let minor = Matrix {
                data: minor_data,
                rows: n - 1,
                cols: n - 1,
            };
            let term = self.data[0][j].mul(&minor.det_recursive());
            det = if j % 2 == 0 { det.add(&term) } else { det.sub(&term) };
        }

        det
    }
}

impl<Z: IntScalar> std::fmt::Display for Matrix<Z> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Matrix {}x{}:", self.rows, self.cols)?;
        for row in &self.data {
            writeln!(
                f,
                "[{}]",
                row.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(", ")
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_creation() {
        let matrix = Matrix::<i64>::from_i64(vec![vec![1, 2], vec![3, 4]]).unwrap();
        assert_eq!(matrix.rows(), 2);
        assert_eq!(matrix.cols(), 2);
        assert_eq!(matrix.get(1, 0), Some(&3));
    }

    #[test]
    fn test_irregular_rows_rejected() {
        let result = Matrix::<i64>::from_i64(vec![vec![1, 2, 3], vec![4, 5]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_swap_rows() {
        let mut matrix = Matrix::<i64>::from_i64(vec![vec![1, 2], vec![3, 4]]).unwrap();
        matrix.swap_rows(0, 1).unwrap();
        assert_eq!(matrix.row(0), &[3, 4]);
        assert_eq!(matrix.row(1), &[1, 2]);
    }

    #[test]
    fn test_sub_mul_row() {
        let mut matrix = Matrix::<i64>::from_i64(vec![vec![1, 2], vec![5, 9]]).unwrap();
        matrix.sub_mul_row(1, 0, &4);
        assert_eq!(matrix.row(1), &[1, 1]);
        assert_eq!(matrix.row(0), &[1, 2]);
    }

    #[test]
    fn test_row_norm_square() {
        let matrix = Matrix::<i64>::from_i64(vec![vec![3, 4]]).unwrap();
        assert_eq!(matrix.row_norm_square(0), 25);
    }

    #[test]
    fn test_determinant_2x2() {
        let matrix = Matrix::<i64>::from_i64(vec![vec![2, 3], vec![1, 4]]).unwrap();
        assert_eq!(matrix.determinant().unwrap(), 5);
    }

    #[test]
    fn test_determinant_3x3() {
        let matrix =
            Matrix::<i64>::from_i64(vec![vec![1, 2, 3], vec![0, 1, 4], vec![5, 6, 0]]).unwrap();
        assert_eq!(matrix.determinant().unwrap(), 1);
    }

    #[cfg(feature = "high-precision")]
    #[test]
    fn test_bigint_matrix() {
        use rug::Integer;

        let matrix = Matrix::<Integer>::from_i64(vec![vec![2, 3], vec![5, 7]]).unwrap();
        assert_eq!(matrix.determinant().unwrap(), Integer::from(-1));
        assert_eq!(matrix.row_norm_square(0), Integer::from(13));
    }
}
