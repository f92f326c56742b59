//! Lattice representation and basis input/output

use crate::core::error::{LatticeError, Result};
use crate::core::matrix::Matrix;
use crate::core::scalar::IntScalar;
use std::fs;

/// A lattice represented by its basis matrix
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice<Z: IntScalar> {
    basis: Matrix<Z>,
    dimension: (usize, usize),
}

impl<Z: IntScalar> Lattice<Z> {
    /// Create a new lattice from a basis matrix
    pub fn new(basis: Matrix<Z>) -> Result<Self> {
        let rows = basis.rows();
        let cols = basis.cols();

        if rows == 0 || cols == 0 {
            return Err(LatticeError::invalid_parameters("Basis matrix cannot be empty"));
        }

        Ok(Lattice {
            basis,
            dimension: (rows, cols),
        })
    }

    /// Create a lattice from a 2D vector of machine integers
    pub fn from_matrix(data: Vec<Vec<i64>>) -> Result<Self> {
        Lattice::new(Matrix::from_i64(data)?)
    }

    /// Get the dimension of the lattice (rows, cols)
    pub fn dimension(&self) -> (usize, usize) {
        self.dimension
    }

    /// Get the rank of the lattice (number of basis vectors)
    pub fn rank(&self) -> usize {
        self.basis.rows()
    }

    /// Get the ambient dimension (length of basis vectors)
    pub fn ambient_dimension(&self) -> usize {
        self.basis.cols()
    }

    /// Get a reference to the basis matrix
    pub fn basis(&self) -> &Matrix<Z> {
        &self.basis
    }

    /// Get a mutable reference to the basis matrix, for in-place reduction
    pub fn basis_mut(&mut self) -> &mut Matrix<Z> {
        &mut self.basis
    }

    /// Check if the lattice is full rank (shape-level check)
    pub fn is_full_rank(&self) -> bool {
        self.rank() == self.ambient_dimension()
    }

    /// Exact determinant of the basis (square lattices only)
    pub fn determinant(&self) -> Result<Z> {
        self.basis.determinant()
    }

    /// Convert to string representation (fplll format)
    pub fn to_fplll_format(&self) -> String {
        let mut output = format!("{} {}\n", self.rank(), self.ambient_dimension());
        for i in 0..self.rank() {
            let row = self.basis.row(i);
            output.push_str(
                &row.iter().map(|x| x.to_string()).collect::<Vec<_>>().join(" "),
            );
            output.push('\n');
        }
        output
    }

    /// Parse from fplll format: a "rows cols" header followed by one row of
    /// integers per line. Blank lines and '#' comments are skipped.
    pub fn from_fplll_format(input: &str) -> Result<Self> {
        let mut lines = input
            .lines()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty() && !l.starts_with('#'));

        let header = lines
            .next()
            .ok_or_else(|| LatticeError::invalid_parameters("Empty input"))?;

        let dimensions: Vec<usize> = header
            .split_whitespace()
            .filter_map(|x| x.parse().ok())
            .collect();

        if dimensions.len() != 2 {
            return Err(LatticeError::invalid_parameters(
                "First line must contain two integers: rows and cols",
            ));
        }

        let (rows, cols) = (dimensions[0], dimensions[1]);
        let mut data = Vec::with_capacity(rows);

        for row_idx in 0..rows {
            let line = lines.next().ok_or_else(|| {
                LatticeError::invalid_parameters(format!(
                    "File ended after {} rows, but the header specifies {} rows",
                    row_idx, rows
                ))
            })?;
            let row = Self::parse_row(line, row_idx + 1)?;
            if row.len() != cols {
                return Err(LatticeError::invalid_parameters(format!(
                    "Row {} has {} entries, but the header specifies {} columns",
                    row_idx + 1,
                    row.len(),
                    cols
                )));
            }
            data.push(row);
        }

        if lines.next().is_some() {
            return Err(LatticeError::invalid_parameters(format!(
                "File contains more than {} rows; remove extra data after the lattice definition",
                rows
            )));
        }

        Lattice::new(Matrix::new(data)?)
    }

    /// Load a lattice from a file, accepting either a JSON array of integer
    /// rows or the fplll text format.
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            LatticeError::io_error(format!("Failed to read lattice file {}: {}", path, e))
        })?;

        let trimmed = content.trim();
        if trimmed.starts_with('[') {
            if let Ok(data) = serde_json::from_str::<Vec<Vec<i64>>>(trimmed) {
                return Self::from_matrix(data);
            }
            return Err(LatticeError::invalid_parameters(format!(
                "Failed to parse {} as a JSON integer matrix",
                path
            )));
        }

        Self::from_fplll_format(trimmed)
    }

    /// Save to file in fplll format
    pub fn save_to_file(&self, path: &str) -> Result<()> {
        fs::write(path, self.to_fplll_format()).map_err(|e| LatticeError::io_error(e.to_string()))
    }

    /// Parse a single row of decimal integers
    fn parse_row(line: &str, line_no: usize) -> Result<Vec<Z>> {
        let tokens: Vec<&str> = line
            .split(|c: char| c.is_whitespace() || c == ',' || c == ';')
            .filter(|t| !t.is_empty())
            .collect();

        let mut row = Vec::with_capacity(tokens.len());
        for tok in tokens {
            let val = Z::parse_decimal(tok).ok_or_else(|| {
                LatticeError::invalid_parameters(format!(
                    "Failed to parse integer at row {}: '{}'",
                    line_no, tok
                ))
            })?;
            row.push(val);
        }
        Ok(row)
    }
}

impl<Z: IntScalar> std::fmt::Display for Lattice<Z> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Lattice of dimension {}x{}:",
            self.rank(),
            self.ambient_dimension()
        )?;
        write!(f, "{}", self.basis)
    }
}
