//! Core error types for lattice operations

use thiserror::Error;

/// Error types for lattice reduction operations
#[derive(Debug, Clone, Error)]
pub enum LatticeError {
    /// Invalid matrix dimensions
    #[error("invalid dimensions: expected {expected:?}, found {found:?}")]
    InvalidDimensions {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// High precision arithmetic error
    #[error("precision error: {0}")]
    PrecisionError(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Result type for lattice operations
pub type Result<T> = std::result::Result<T, LatticeError>;

impl LatticeError {
    /// Create an invalid dimensions error
    pub fn invalid_dimensions(expected: (usize, usize), found: (usize, usize)) -> Self {
        LatticeError::InvalidDimensions { expected, found }
    }

    /// Create an invalid parameters error
    pub fn invalid_parameters(msg: impl Into<String>) -> Self {
        LatticeError::InvalidParameters(msg.into())
    }

    /// Create a precision error
    pub fn precision_error(msg: impl Into<String>) -> Self {
        LatticeError::PrecisionError(msg.into())
    }

    /// Create an I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        LatticeError::IoError(msg.into())
    }
}

impl From<std::io::Error> for LatticeError {
    fn from(e: std::io::Error) -> Self {
        LatticeError::io_error(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_dimensions_error() {
        let err = LatticeError::invalid_dimensions((3, 3), (2, 2));
        assert_eq!(
            format!("{}", err),
            "invalid dimensions: expected (3, 3), found (2, 2)"
        );
    }

    #[test]
    fn test_invalid_parameters_error() {
        let err = LatticeError::invalid_parameters("delta out of range");
        assert_eq!(format!("{}", err), "invalid parameters: delta out of range");
    }
}
