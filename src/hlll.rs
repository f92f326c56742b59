//! HLLL (Householder LLL) reduction driver and reduced-basis predicate

use crate::core::error::{LatticeError, Result};
use crate::core::matrix::Matrix;
use crate::core::scalar::{FloatScalar, IntScalar};
use crate::householder::MatHouseholder;
use serde::{Deserialize, Serialize};

/// Parameters for HLLL reduction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HLLLParams {
    /// Reduction quality (0.25 < delta < 1), typically 0.99
    pub delta: f64,
    /// Shrink-margin exponent: a size-reduction pass repeats only while it
    /// still shrinks the exact row norm below `2^(-c * d)`
    pub c: f64,
    /// Significand bits of the floating approximation
    pub precision: u32,
    /// Per-row power-of-two normalization of the floating state, for bases
    /// whose entries exceed the floating backend's safe range
    pub row_expo: bool,
}

impl Default for HLLLParams {
    fn default() -> Self {
        HLLLParams {
            delta: 0.99,
            c: 0.1,
            precision: 53,
            row_expo: false,
        }
    }
}

impl HLLLParams {
    /// Create new parameters with a custom delta
    pub fn new(delta: f64) -> Self {
        HLLLParams {
            delta,
            ..Default::default()
        }
    }

    /// Create parameters with a custom floating precision
    pub fn with_precision(bits: u32) -> Self {
        HLLLParams {
            precision: bits,
            ..Default::default()
        }
    }

    /// Validate parameters
    pub fn validate(&self) -> Result<()> {
        if !(0.25 < self.delta && self.delta < 1.0) {
            return Err(LatticeError::invalid_parameters(format!(
                "Delta must be in (0.25, 1.0), got {}",
                self.delta
            )));
        }

        if self.c <= 0.0 {
            return Err(LatticeError::invalid_parameters(format!(
                "Shrink exponent c must be positive, got {}",
                self.c
            )));
        }

        if self.precision < 2 {
            return Err(LatticeError::invalid_parameters(format!(
                "Precision must be at least 2 bits, got {}",
                self.precision
            )));
        }

        Ok(())
    }
}

/// Counters reported by a reduction run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HLLLStatus {
    /// Number of adjacent-row swaps performed
    pub swap_count: usize,
    /// Main-loop iterations
    pub iterations: usize,
    /// Total size-reduction passes across all iterations
    pub size_reduction_passes: usize,
}

/// HLLL reducer implementation
pub struct HLLLReducer {
    params: HLLLParams,
}

impl Default for HLLLReducer {
    fn default() -> Self {
        Self::new()
    }
}

impl HLLLReducer {
    /// Create new reducer with default parameters
    pub fn new() -> Self {
        Self::with_params(HLLLParams::default())
    }

    /// Create new reducer with custom parameters
    pub fn with_params(params: HLLLParams) -> Self {
        HLLLReducer { params }
    }

    /// Reduce a basis in place so that it satisfies the size-reduction and
    /// Lovász conditions for the configured delta.
    pub fn reduce<Z, F>(&self, basis: &mut Matrix<Z>) -> Result<HLLLStatus>
    where
        Z: IntScalar,
        F: FloatScalar<Z>,
    {
        self.params.validate()?;

        if basis.rows() > basis.cols() {
            return Err(LatticeError::invalid_dimensions(
                (basis.rows(), basis.rows()),
                (basis.rows(), basis.cols()),
            ));
        }

        let mut m = MatHouseholder::<Z, F>::new(basis, self.params.precision, self.params.row_expo);
        Ok(self.lll(&mut m))
    }

    /// Main swap loop: size-reduce the vector at the cursor, test the
    /// Lovász condition against its predecessor, and either advance or
    /// swap and retreat.
    fn lll<Z, F>(&self, m: &mut MatHouseholder<Z, F>) -> HLLLStatus
    where
        Z: IntScalar,
        F: FloatScalar<Z>,
    {
        let d = m.rows();
        let prec = self.params.precision;
        let delta = F::from_f64(self.params.delta, prec);
        let sr = F::from_f64(2f64.powf(-self.params.c * d as f64), prec);

        let mut status = HLLLStatus::default();
        let mut k = 1;
        let mut k_max = 0;
        // Row 0 has no predecessor to extend from, so its R row is computed
        // directly here and again after any swap that touches it.
        let mut update_r_row_0 = true;

        while k < d {
            status.iterations += 1;

            if update_r_row_0 {
                m.update_r_row(0);
                update_r_row_0 = false;
            }
            if k > k_max {
                log::debug!("discovering vector {}/{}", k + 1, d);
                k_max = k;
            }

            status.size_reduction_passes += self.size_reduction(m, k, &sr);

            let (r_k_k1, _) = m.get_r(k, k - 1);
            let (r_k_k, expo_k_k) = m.get_r(k, k);
            // s = R(k, k-1)^2 + R(k, k)^2
            let mut s = r_k_k1.mul(&r_k_k1).add(&r_k_k.mul(&r_k_k));
            let (r_k1_k1, expo_k1_k1) = m.get_r(k - 1, k - 1);
            let t = delta.mul(&r_k1_k1.mul(&r_k1_k1));
            if expo_k1_k1 > -1 {
                s = s.mul_2exp(2 * (expo_k_k - expo_k1_k1));
            }

            if t <= s {
                k += 1;
            } else {
                if k - 1 == 0 {
                    update_r_row_0 = true;
                }
                m.swap(k - 1, k);
                status.swap_count += 1;
                k = std::cmp::max(k - 1, 1);
            }
        }

        log::info!(
            "reduction finished: {} swaps, {} size-reduction passes over {} iterations",
            status.swap_count,
            status.size_reduction_passes,
            status.iterations
        );
        status
    }

    /// Size-reduce `b[k]` against all previous rows. Each pass extends R
    /// through column k-1, picks rounded projection coefficients from
    /// largest predecessor down, folds their effect into R column by
    /// column, and applies them to the basis in one exact combination.
    /// The pass repeats only while the exact norm of `b[k]` keeps shrinking
    /// below the `sr` margin; the norm is an exact, strictly decreasing
    /// quantity, so floating rounding cannot loop forever. Returns the
    /// number of passes.
    fn size_reduction<Z, F>(&self, m: &mut MatHouseholder<Z, F>, k: usize, sr: &F) -> usize
    where
        Z: IntScalar,
        F: FloatScalar<Z>,
    {
        let prec = self.params.precision;
        let mut x = vec![F::zero(prec); k];
        let mut passes = 0;

        loop {
            passes += 1;
            m.update_r(k, k - 1);

            for i in (0..k).rev() {
                let (r_ki, expo_k) = m.get_r(k, i);
                let (r_ii, expo_i) = m.get_r(i, i);
                // x[i] = -round(R(k, i) / R(i, i)), rounded at the rows'
                // common scale. The shift is zero unless row exponents are
                // enabled.
                x[i] = r_ki.div(&r_ii).round_with_exp(expo_k - expo_i).neg();

                if !x[i].is_zero() {
                    for j in 0..i {
                        let (r_ij, _) = m.get_r(i, j);
                        let (r_kj, _) = m.get_r(k, j);
                        m.set_r(r_kj.add(&x[i].mul(&r_ij)), k, j);
                    }
                }
            }

            let (old_norm, expo_old) = m.norm_square_b_row(k);
            m.add_mul_b_rows(k, &x);
            let (mut new_norm, expo_new) = m.norm_square_b_row(k);
            let bound = sr.mul(&old_norm);
            if expo_new > -1 {
                new_norm = new_norm.mul_2exp(expo_new - expo_old);
            }
            if new_norm > bound {
                break;
            }
        }

        m.update_r_row(k);
        passes
    }
}

/// Checks whether the basis wrapped by `m` already satisfies the
/// size-reduction and Lovász conditions for `delta`.
///
/// Recomputes the full R factor first, so the answer is independent of any
/// driver bookkeeping. Restriction: assumes row-exponent scaling is
/// disabled; the checks compare raw R values without aligning exponents.
pub fn is_reduced<Z, F>(m: &mut MatHouseholder<Z, F>, delta: f64) -> bool
where
    Z: IntScalar,
    F: FloatScalar<Z>,
{
    let prec = m.precision();
    let delta = F::from_f64(delta, prec);
    let half = F::from_f64(0.5, prec);
    m.update_r_all();
    let d = m.rows();

    for i in 0..d {
        for j in 0..i {
            let (r_ij, _) = m.get_r(i, j);
            let (r_jj, _) = m.get_r(j, j);
            if r_ij.div(&r_jj).abs() > half {
                return false;
            }
        }
    }

    for i in 1..d {
        // The squared norm of the component of b[i] orthogonal to the
        // first i-1 directions is ||b[i]||^2 - sum_{j < i-1} R(i, j)^2.
        let (norm_b, _) = m.norm_square_b_row(i);
        let (norm_r, _) = m.norm_square_r_row(i, i - 1);
        let rhs = norm_b.sub(&norm_r);
        let (r_prev, _) = m.get_r(i - 1, i - 1);
        let lhs = delta.mul(&r_prev.mul(&r_prev));
        if lhs > rhs {
            return false;
        }
    }

    true
}

/// Convenience wrapper for [`is_reduced`] that works on a copy of the
/// basis, leaving the caller's data untouched.
pub fn is_reduced_basis<Z, F>(basis: &Matrix<Z>, delta: f64, precision: u32) -> bool
where
    Z: IntScalar,
    F: FloatScalar<Z>,
{
    let mut copy = basis.clone();
    let mut m = MatHouseholder::<Z, F>::new(&mut copy, precision, false);
    is_reduced(&mut m, delta)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_validation() {
        assert!(HLLLParams::new(0.99).validate().is_ok());
        assert!(HLLLParams::new(0.75).validate().is_ok());

        assert!(HLLLParams::new(0.2).validate().is_err());
        assert!(HLLLParams::new(1.0).validate().is_err());
        assert!(HLLLParams::new(0.25).validate().is_err());

        let mut params = HLLLParams::default();
        params.c = 0.0;
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_reduce_rejects_wide_rank() {
        // more rows than columns cannot be linearly independent
        let mut basis =
            Matrix::<i64>::from_i64(vec![vec![1, 0], vec![0, 1], vec![1, 1]]).unwrap();
        let reducer = HLLLReducer::new();
        assert!(reducer.reduce::<i64, f64>(&mut basis).is_err());
    }

    #[test]
    fn test_reduction_2d() {
        let mut basis = Matrix::<i64>::from_i64(vec![vec![2, 1], vec![1, 1]]).unwrap();
        let det_before = basis.determinant().unwrap().abs();

        let reducer = HLLLReducer::new();
        let status = reducer.reduce::<i64, f64>(&mut basis).unwrap();

        assert!(status.swap_count >= 1);
        assert!(is_reduced_basis::<i64, f64>(&basis, 0.99, 53));
        assert_eq!(basis.determinant().unwrap().abs(), det_before);
        // the reduced basis of Z^2 consists of unit-length vectors
        assert_eq!(basis.row_norm_square(0), 1);
        assert_eq!(basis.row_norm_square(1), 1);
    }

    #[test]
    fn test_reduction_3d() {
        let mut basis =
            Matrix::<i64>::from_i64(vec![vec![1, 1, 1], vec![-1, 0, 2], vec![3, 5, 6]]).unwrap();
        let det_before = basis.determinant().unwrap().abs();

        let reducer = HLLLReducer::new();
        reducer.reduce::<i64, f64>(&mut basis).unwrap();

        assert!(is_reduced_basis::<i64, f64>(&basis, 0.99, 53));
        assert_eq!(basis.determinant().unwrap().abs(), det_before);
    }

    #[test]
    fn test_predicate_rejects_unreduced() {
        let basis = Matrix::<i64>::from_i64(vec![vec![1, 0], vec![7, 1]]).unwrap();
        assert!(!is_reduced_basis::<i64, f64>(&basis, 0.99, 53));
    }

    #[test]
    fn test_single_vector() {
        let mut basis = Matrix::<i64>::from_i64(vec![vec![42, 7]]).unwrap();
        let reducer = HLLLReducer::new();
        let status = reducer.reduce::<i64, f64>(&mut basis).unwrap();
        assert_eq!(status.swap_count, 0);
        assert_eq!(basis.row(0), &[42, 7]);
    }

    #[test]
    fn test_status_counters() {
        let mut basis = Matrix::<i64>::from_i64(vec![vec![5, 3], vec![3, 2]]).unwrap();
        let reducer = HLLLReducer::new();
        let status = reducer.reduce::<i64, f64>(&mut basis).unwrap();
        assert!(status.iterations >= 1);
        assert!(status.size_reduction_passes >= status.iterations);
    }
}
