//! Utility helpers for generating test lattices

use crate::core::error::Result;
use crate::core::matrix::Matrix;

/// Matrix utilities
pub mod matrix_utils {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{rng, Rng, SeedableRng};

    /// Generate a random integer basis with entries in [-100, 100]
    pub fn generate_random_basis(n: usize, m: usize, seed: Option<u64>) -> Result<Matrix<i64>> {
        let mut rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => {
                let mut entropy = rng();
                <StdRng as SeedableRng>::from_rng(&mut entropy)
            }
        };

        let mut data = Vec::with_capacity(n);
        for _ in 0..n {
            let mut row = Vec::with_capacity(m);
            for _ in 0..m {
                row.push(rng.random_range(-100..=100));
            }
            data.push(row);
        }

        Matrix::from_i64(data)
    }

    /// Generate a subset-sum style basis: row i is the i-th unit vector
    /// with a random weight of up to `bits` bits prepended. These bases mix
    /// one huge column with unit entries and are the standard stress case
    /// for row-exponent scaling.
    pub fn generate_subset_sum_basis(n: usize, bits: u32, seed: u64) -> Result<Matrix<i64>> {
        let mut rng = StdRng::seed_from_u64(seed);
        let bound = 1i64 << bits.min(62);

        let mut data = Vec::with_capacity(n);
        for i in 0..n {
            let mut row = vec![0i64; n + 1];
            row[0] = rng.random_range(1..bound);
            row[i + 1] = 1;
            data.push(row);
        }

        Matrix::from_i64(data)
    }
}

#[cfg(test)]
mod tests {
    use super::matrix_utils::*;

    #[test]
    fn test_random_basis_shape() {
        let basis = generate_random_basis(4, 6, Some(7)).unwrap();
        assert_eq!(basis.dimension(), (4, 6));
    }

    #[test]
    fn test_random_basis_deterministic_with_seed() {
        let a = generate_random_basis(3, 3, Some(42)).unwrap();
        let b = generate_random_basis(3, 3, Some(42)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_subset_sum_basis() {
        let basis = generate_subset_sum_basis(5, 40, 1).unwrap();
        assert_eq!(basis.dimension(), (5, 6));
        for i in 0..5 {
            assert!(*basis.get(i, 0).unwrap() > 0);
            assert_eq!(*basis.get(i, i + 1).unwrap(), 1);
        }
    }
}
