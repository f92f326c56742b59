//! Householder-based LLL (HLLL) lattice basis reduction
//!
//! This crate reduces integer lattice bases with the HLLL algorithm: the
//! orthogonalization of the basis is maintained through Householder
//! reflections instead of Gram-Schmidt projections, which keeps the
//! floating-point state well conditioned over many reduction steps. The
//! basis itself is always manipulated with exact integer arithmetic, so row
//! swaps and size-reduction combinations never lose information; only the
//! orthogonalization is approximate.
//!
//! Backends are pluggable on both sides: the exact integers default to
//! `i64`, the approximation to `f64`, and the `high-precision` feature adds
//! `rug::Integer` and `rug::Float` for bases whose entries or precision
//! requirements exceed the machine types. Bases with huge entries can also
//! stay on `f64` by enabling per-row power-of-two scaling.
//!
//! # Examples
//!
//! Basic reduction with the default backends:
//! ```rust
//! use lattice_hlll::{HLLLParams, HLLLReducer, Matrix};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut basis = Matrix::<i64>::from_i64(vec![
//!     vec![2, 1],
//!     vec![1, 1],
//! ])?;
//!
//! let reducer = HLLLReducer::with_params(HLLLParams::new(0.99));
//! let status = reducer.reduce::<i64, f64>(&mut basis)?;
//! println!("reduced after {} swaps", status.swap_count);
//! # Ok(())
//! # }
//! ```
//!
//! Checking whether a basis is already reduced:
//! ```rust
//! use lattice_hlll::{is_reduced_basis, Matrix};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let basis = Matrix::<i64>::from_i64(vec![
//!     vec![1, 0],
//!     vec![0, 1],
//! ])?;
//! assert!(is_reduced_basis::<i64, f64>(&basis, 0.99, 53));
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod hlll;
pub mod householder;
pub mod utils;

// Re-export commonly used types
// The arbitrary-precision backends are part of the public API surface.
#[cfg(feature = "high-precision")]
pub use rug;

pub use crate::core::error::{LatticeError, Result};
pub use crate::core::lattice::Lattice;
pub use crate::core::matrix::Matrix;
pub use crate::core::scalar::{FloatScalar, IntScalar};
pub use crate::hlll::{is_reduced, is_reduced_basis, HLLLParams, HLLLReducer, HLLLStatus};
pub use crate::householder::MatHouseholder;

/// Feature flag utilities
pub mod features {
    /// Check if the arbitrary-precision backends are enabled
    pub fn high_precision_enabled() -> bool {
        cfg!(feature = "high-precision")
    }
}
