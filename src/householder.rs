//! Householder orthogonalization of an integer basis
//!
//! [`MatHouseholder`] performs elementary row operations on a mutable basis
//! and maintains the R factor of its implicit QR-style factorization through
//! Householder reflections: `b = R · Q` with R lower triangular, diagonal
//! `>= 0`, and Q never materialized. Rows of R are computed lazily and
//! incrementally; a row swap invalidates all derived state from the swap
//! point onward.
//!
//! The floating state can optionally be kept under per-row power-of-two
//! normalization (row exponents) so that bases with entries far beyond the
//! floating backend's safe range still orthogonalize without overflow. When
//! enabled, row `i` of R is the true value divided by `2^row_expo[i]`, and
//! every caller combining values across rows must align exponents first.

use crate::core::matrix::Matrix;
use crate::core::scalar::{FloatScalar, IntScalar};

/// Marks a row whose floating state must be reloaded from the basis.
const STALE: usize = usize::MAX;

/// Maintains the Householder R factor of a mutable basis and provides the
/// numeric primitives the reduction driver needs.
///
/// The floating precision is fixed at construction and must stay the same
/// for the lifetime of the instance. The basis must not be mutated from the
/// outside while an instance is live over it; the cached state would
/// desynchronize with no detection beyond debug assertions.
pub struct MatHouseholder<'a, Z: IntScalar, F: FloatScalar<Z>> {
    /// Basis of the lattice; rows are the lattice vectors.
    b: &'a mut Matrix<Z>,
    /// b = R * Q. Only entries at column <= row are meaningful; the tail of
    /// a row buffer is working storage for the reflections.
    r: Vec<Vec<F>>,
    /// Householder vectors, one per completed row.
    v: Vec<Vec<F>>,
    /// Reflection scale factors: row j's reflection maps x to
    /// `x - sigma[j] * (V[j]·x) * V[j]`.
    sigma: Vec<F>,
    /// Per-row normalization exponents; every entry is -1 when scaling is
    /// disabled.
    row_expo: Vec<i64>,
    /// R rows at index >= n_known_rows are invalid.
    n_known_rows: usize,
    /// Number of reflections already applied to each loaded row buffer;
    /// STALE forces a reload from the basis.
    applied: Vec<usize>,
    /// Scratch column exponents used while normalizing a row.
    col_expo: Vec<i64>,
    d: usize,
    n: usize,
    prec: u32,
    enable_row_expo: bool,
}

impl<'a, Z: IntScalar, F: FloatScalar<Z>> MatHouseholder<'a, Z, F> {
    /// Wrap a basis. `prec` is the significand width of the floating
    /// backend; `enable_row_expo` turns on per-row power-of-two scaling.
    pub fn new(b: &'a mut Matrix<Z>, prec: u32, enable_row_expo: bool) -> Self {
        let d = b.rows();
        let n = b.cols();
        MatHouseholder {
            b,
            r: vec![vec![F::zero(prec); n]; d],
            v: vec![vec![F::zero(prec); n]; d],
            sigma: vec![F::zero(prec); d],
            row_expo: vec![-1; d],
            n_known_rows: 0,
            applied: vec![STALE; d],
            col_expo: vec![0; n],
            d,
            n,
            prec,
            enable_row_expo,
        }
    }

    /// Number of basis rows (lattice vectors).
    pub fn rows(&self) -> usize {
        self.d
    }

    /// Ambient dimension (basis columns).
    pub fn cols(&self) -> usize {
        self.n
    }

    /// Significand width of the floating backend.
    pub fn precision(&self) -> u32 {
        self.prec
    }

    pub fn is_row_expo_enabled(&self) -> bool {
        self.enable_row_expo
    }

    /// Read-only access to the wrapped basis.
    pub fn basis(&self) -> &Matrix<Z> {
        self.b
    }

    /// Returns `R(i, j)` together with row i's exponent. The true value is
    /// the entry times `2^expo`; combining entries from different rows
    /// requires aligning exponents first.
    pub fn get_r(&self, i: usize, j: usize) -> (F, i64) {
        debug_assert!(i < self.d && j <= i);
        debug_assert!(self.applied[i] != STALE);
        (self.r[i][j].clone(), self.row_expo[i])
    }

    /// Returns R row `i` (meaningful through column `i`) together with its
    /// exponent.
    pub fn get_r_row(&self, i: usize) -> (&[F], i64) {
        debug_assert!(i < self.d);
        debug_assert!(self.applied[i] != STALE);
        (&self.r[i], self.row_expo[i])
    }

    /// Overwrite `R(i, j)`. Used by size reduction to fold a row
    /// combination into R for exactly the affected columns instead of
    /// recomputing the row from the basis.
    pub fn set_r(&mut self, f: F, i: usize, j: usize) {
        debug_assert!(i < self.d && j <= i);
        self.r[i][j] = f;
    }

    /// Apply the Householder transformation on row `i` using columns
    /// `0..=last_j`. Restriction: `last_j == i - 1` (extend a partially
    /// computed row) or `last_j == i` (finish the row). Extension reuses
    /// the projections already computed against earlier rows.
    pub fn update_r(&mut self, i: usize, last_j: usize) {
        debug_assert!(i < self.d);
        debug_assert!(last_j == i || last_j + 1 == i);

        if self.applied[i] == STALE {
            self.load_row(i);
        }
        for j in self.applied[i]..i {
            self.apply_reflection(j, i);
        }
        self.applied[i] = i;

        if last_j == i && i >= self.n_known_rows {
            self.compute_reflection(i);
            self.n_known_rows = i + 1;
        }
    }

    /// Apply the full Householder transformation on row `i`.
    pub fn update_r_row(&mut self, i: usize) {
        self.update_r(i, i);
    }

    /// Full recomputation of R from the basis, row by row.
    pub fn update_r_all(&mut self) {
        self.invalidate_row(0);
        for i in 0..self.d {
            self.update_r_row(i);
        }
    }

    /// Exact squared norm of basis row `k`, converted to the floating
    /// backend with its own exponent (`-1` when scaling is disabled).
    pub fn norm_square_b_row(&self, k: usize) -> (F, i64) {
        debug_assert!(k < self.d);
        let dot = self.b.row_norm_square(k);
        if self.enable_row_expo {
            F::from_int_exp(&dot, self.prec)
        } else {
            (F::from_int(&dot, self.prec), -1)
        }
    }

    /// Squared norm of `R(k, 0..end)`, at scale `2^(2 * row_expo[k])`.
    pub fn norm_square_r_row(&self, k: usize, end: usize) -> (F, i64) {
        debug_assert!(k < self.d && end <= k);
        debug_assert!(self.applied[k] != STALE);
        let f = if end == 0 {
            F::zero(self.prec)
        } else {
            F::dot(&self.r[k], &self.r[k], 0, end, self.prec)
        };
        (f, 2 * self.row_expo[k])
    }

    /// Fold size-reduction coefficients into the basis:
    /// `b[k] += sum_i x[i] * b[i]` over `i < k`, computed exactly. The
    /// coefficients are interpreted at the rows' exponent scales; each
    /// `x[i] * 2^(row_expo[k] - row_expo[i])` must be integral, which the
    /// driver's exponent-aware rounding guarantees. Mutating the basis
    /// marks row `k`'s floating state for recomputation.
    pub fn add_mul_b_rows(&mut self, k: usize, x: &[F]) {
        debug_assert!(k < self.d);
        debug_assert_eq!(x.len(), k);
        let mut mutated = false;
        for i in 0..k {
            if x[i].is_zero() {
                continue;
            }
            let shift = if self.enable_row_expo {
                self.row_expo[k] - self.row_expo[i]
            } else {
                0
            };
            let c = x[i].mul_2exp(shift).neg().to_int();
            if c.is_zero() {
                continue;
            }
            self.b.sub_mul_row(k, i, &c);
            mutated = true;
        }
        if mutated {
            self.invalidate_row(k);
        }
    }

    /// Swap basis rows `i` and `j` (requires `i < j`) and invalidate all
    /// derived state from row `i` onward.
    pub fn swap(&mut self, i: usize, j: usize) {
        debug_assert!(i < j && j < self.d);
        self.invalidate_row(i);
        // rows are in range, checked above
        let _ = self.b.swap_rows(i, j);
    }

    /// Lower the validity cursor to `k` if it currently exceeds it; rows at
    /// index >= `k` must be recomputed before their next read.
    pub fn invalidate_row(&mut self, k: usize) {
        if k < self.n_known_rows {
            self.n_known_rows = k;
        }
        for i in k..self.d {
            self.applied[i] = STALE;
        }
    }

    /// Load row `i` of the basis into the floating working buffer,
    /// normalizing by a fresh row exponent when scaling is enabled.
    fn load_row(&mut self, i: usize) {
        if self.enable_row_expo {
            let mut max_expo = i64::MIN;
            for j in 0..self.n {
                let (m, e) = F::from_int_exp(&self.b.row(i)[j], self.prec);
                self.r[i][j] = m;
                self.col_expo[j] = e;
                max_expo = max_expo.max(e);
            }
            let expo = max_expo.max(0);
            for j in 0..self.n {
                self.r[i][j] = self.r[i][j].mul_2exp(self.col_expo[j] - expo);
            }
            self.row_expo[i] = expo;
        } else {
            for j in 0..self.n {
                self.r[i][j] = F::from_int(&self.b.row(i)[j], self.prec);
            }
        }
        self.applied[i] = 0;
    }

    /// Apply row `j`'s stored reflection to row `i`'s working coordinates.
    /// Only coordinates `j..n` are touched; coordinate `j` of the result is
    /// the final `R(i, j)`.
    fn apply_reflection(&mut self, j: usize, i: usize) {
        let s = F::dot(&self.r[i], &self.v[j], j, self.n, self.prec).mul(&self.sigma[j]);
        for t in j..self.n {
            let delta = s.mul(&self.v[j][t]);
            self.r[i][t] = self.r[i][t].sub(&delta);
        }
    }

    /// Build row `i`'s own reflection from its residual coordinates
    /// `i..n`, mapping the residual onto `+norm * e_i` so that the diagonal
    /// stays non-negative. The pivot entry of V is computed as
    /// `-tail^2 / (r_ii + norm)` when `r_ii >= 0` to avoid cancellation.
    fn compute_reflection(&mut self, i: usize) {
        let zero = F::zero(self.prec);
        let tail_sq = F::dot(&self.r[i], &self.r[i], i + 1, self.n, self.prec);
        let r_ii = self.r[i][i].clone();
        let norm = r_ii.mul(&r_ii).add(&tail_sq).sqrt();

        if norm.is_zero() {
            self.sigma[i] = zero.clone();
            for t in i..self.n {
                self.v[i][t] = zero.clone();
            }
            self.r[i][i] = zero;
            return;
        }

        let v_i = if r_ii < zero {
            r_ii.sub(&norm)
        } else {
            tail_sq.div(&r_ii.add(&norm)).neg()
        };
        for t in (i + 1)..self.n {
            self.v[i][t] = self.r[i][t].clone();
        }
        self.sigma[i] = if v_i.is_zero() {
            zero
        } else {
            F::from_f64(-1.0, self.prec).div(&norm.mul(&v_i))
        };
        self.v[i][i] = v_i;
        self.r[i][i] = norm;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_r_matches_gram_schmidt_2d() {
        // b0 = (3, 4), b1 = (1, 2): R(0,0) = 5, R(1,0) = <b1,b0>/5 = 2.2,
        // R(1,1) = |b1 - (11/25) b0| = 0.4
        let mut basis = Matrix::<i64>::from_i64(vec![vec![3, 4], vec![1, 2]]).unwrap();
        let mut m = MatHouseholder::<i64, f64>::new(&mut basis, 53, false);
        m.update_r_all();

        assert!(approx_eq(m.get_r(0, 0).0, 5.0));
        assert!(approx_eq(m.get_r(1, 0).0, 2.2));
        assert!(approx_eq(m.get_r(1, 1).0, 0.4));
    }

    #[test]
    fn test_diagonal_non_negative() {
        let mut basis =
            Matrix::<i64>::from_i64(vec![vec![-3, 1, 2], vec![4, -7, 1], vec![2, 2, -9]]).unwrap();
        let mut m = MatHouseholder::<i64, f64>::new(&mut basis, 53, false);
        m.update_r_all();
        for i in 0..3 {
            assert!(m.get_r(i, i).0 >= 0.0, "negative diagonal at {}", i);
        }
    }

    #[test]
    fn test_r_norm_preserved() {
        // Reflections are orthogonal, so each R row has the norm of its
        // basis row.
        let mut basis =
            Matrix::<i64>::from_i64(vec![vec![1, 2, 2], vec![3, 0, 4], vec![1, 1, 1]]).unwrap();
        let mut m = MatHouseholder::<i64, f64>::new(&mut basis, 53, false);
        m.update_r_all();
        for i in 0..3 {
            let (r_norm_sq, _) = m.norm_square_r_row(i, i);
            let diag = m.get_r(i, i).0;
            let b_norm_sq = m.norm_square_b_row(i).0;
            assert!(approx_eq(r_norm_sq + diag * diag, b_norm_sq));
        }
    }

    #[test]
    fn test_swap_invalidates() {
        let mut basis = Matrix::<i64>::from_i64(vec![vec![1, 0], vec![3, 4]]).unwrap();
        let mut m = MatHouseholder::<i64, f64>::new(&mut basis, 53, false);
        m.update_r_all();
        assert_eq!(m.n_known_rows, 2);

        m.swap(0, 1);
        assert_eq!(m.n_known_rows, 0);

        m.update_r_all();
        assert!(approx_eq(m.get_r(0, 0).0, 5.0));
        assert!(approx_eq(m.get_r(1, 1).0, 0.8));
    }

    #[test]
    fn test_incremental_extension() {
        let mut basis =
            Matrix::<i64>::from_i64(vec![vec![2, 0, 0], vec![1, 3, 0], vec![1, 1, 4]]).unwrap();
        let mut m = MatHouseholder::<i64, f64>::new(&mut basis, 53, false);
        m.update_r_row(0);
        m.update_r_row(1);

        // Extend row 2 through column 1 only, then finish it.
        m.update_r(2, 1);
        assert!(approx_eq(m.get_r(2, 0).0, 1.0));
        assert_eq!(m.n_known_rows, 2);

        m.update_r_row(2);
        assert_eq!(m.n_known_rows, 3);
        assert!(approx_eq(m.get_r(2, 2).0, 4.0));
    }

    #[test]
    fn test_get_r_row() {
        let mut basis = Matrix::<i64>::from_i64(vec![vec![3, 4], vec![1, 2]]).unwrap();
        let mut m = MatHouseholder::<i64, f64>::new(&mut basis, 53, false);
        m.update_r_all();

        let (row, expo) = m.get_r_row(1);
        assert_eq!(expo, -1);
        assert!(approx_eq(row[0], 2.2));
        assert!(approx_eq(row[1], 0.4));
    }

    #[test]
    fn test_set_r_write_through() {
        let mut basis = Matrix::<i64>::from_i64(vec![vec![1, 0], vec![0, 1]]).unwrap();
        let mut m = MatHouseholder::<i64, f64>::new(&mut basis, 53, false);
        m.update_r_all();
        m.set_r(0.25, 1, 0);
        assert_eq!(m.get_r(1, 0).0, 0.25);
    }

    #[test]
    fn test_add_mul_b_rows() {
        let mut basis = Matrix::<i64>::from_i64(vec![vec![1, 1], vec![3, 2]]).unwrap();
        let mut m = MatHouseholder::<i64, f64>::new(&mut basis, 53, false);
        m.update_r_all();

        // x[0] = -2 subtracts 2*b[0] from b[1]
        m.add_mul_b_rows(1, &[-2.0]);
        assert_eq!(m.basis().row(1), &[1, 0]);
        // the mutated row is stale until recomputed
        assert_eq!(m.applied[1], STALE);
        m.update_r_row(1);
        assert!(approx_eq(m.get_r(1, 1).0, 2.0f64.sqrt() / 2.0));
    }

    #[test]
    fn test_norm_square_r_row_empty_prefix() {
        let mut basis = Matrix::<i64>::from_i64(vec![vec![5, 0], vec![0, 5]]).unwrap();
        let mut m = MatHouseholder::<i64, f64>::new(&mut basis, 53, false);
        m.update_r_all();
        let (f, _) = m.norm_square_r_row(1, 0);
        assert_eq!(f, 0.0);
    }

    #[test]
    fn test_row_expo_normalization() {
        let mut basis = Matrix::<i64>::from_i64(vec![vec![1 << 30, 0], vec![3, 1]]).unwrap();
        let mut m = MatHouseholder::<i64, f64>::new(&mut basis, 53, true);
        m.update_r_all();

        // row 0: entries scaled by 2^-31, diagonal = 2^30 * 2^-31 = 0.5
        let (diag, expo) = m.get_r(0, 0);
        assert_eq!(expo, 31);
        assert_eq!(diag, 0.5);
        assert_eq!(diag * 2f64.powi(expo as i32), (1u64 << 30) as f64);

        // exact norm carries its own exponent: m * 2^e == 2^60
        let (f, e) = m.norm_square_b_row(0);
        assert_eq!(f * 2f64.powi(e as i32), 2f64.powi(60));
    }

    #[test]
    fn test_row_expo_matches_unscaled() {
        let rows = vec![vec![1 << 30, 7, -5], vec![3, 1 << 20, 2], vec![-4, 9, 1 << 10]];
        let mut scaled_basis = Matrix::<i64>::from_i64(rows.clone()).unwrap();
        let mut plain_basis = Matrix::<i64>::from_i64(rows).unwrap();

        let mut scaled = MatHouseholder::<i64, f64>::new(&mut scaled_basis, 53, true);
        let mut plain = MatHouseholder::<i64, f64>::new(&mut plain_basis, 53, false);
        scaled.update_r_all();
        plain.update_r_all();

        for i in 0..3 {
            for j in 0..=i {
                let (s, expo) = scaled.get_r(i, j);
                let (p, _) = plain.get_r(i, j);
                let unscaled = s * 2f64.powi(expo as i32);
                assert!(
                    (unscaled - p).abs() <= 1e-6 * p.abs().max(1.0),
                    "mismatch at ({}, {}): {} vs {}",
                    i,
                    j,
                    unscaled,
                    p
                );
            }
        }
    }

    #[test]
    fn test_zero_row() {
        let mut basis = Matrix::<i64>::from_i64(vec![vec![0, 0], vec![1, 1]]).unwrap();
        let mut m = MatHouseholder::<i64, f64>::new(&mut basis, 53, false);
        m.update_r_all();
        assert_eq!(m.get_r(0, 0).0, 0.0);
    }
}
