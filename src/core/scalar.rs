//! Scalar abstractions over the exact-integer and floating-point backends.
//!
//! The reduction engine mixes exact integer arithmetic on the basis with a
//! floating approximation of its orthogonalization. Both sides are modeled
//! as capability traits so the engine and driver are written once and
//! instantiated per backend: the default build pairs `i64` with `f64`, and
//! the `high-precision` feature adds the `rug` arbitrary-precision integer
//! and configurable-precision float.

use std::fmt::{Debug, Display};

#[cfg(feature = "high-precision")]
use rug::{Float, Integer};

/// Exact integer scalar used for basis entries.
pub trait IntScalar: Clone + PartialEq + PartialOrd + Debug + Display {
    fn zero() -> Self;
    fn one() -> Self;
    fn from_i64(v: i64) -> Self;
    /// Nearest exact integer to a (pre-rounded) `f64`.
    fn from_f64_rounded(x: f64) -> Self;
    fn is_zero(&self) -> bool;

    fn add(&self, rhs: &Self) -> Self;
    fn sub(&self, rhs: &Self) -> Self;
    fn mul(&self, rhs: &Self) -> Self;
    fn neg(&self) -> Self;
    fn abs(&self) -> Self;

    /// `self -= c * rhs`, the row-combination primitive.
    fn sub_mul_assign(&mut self, c: &Self, rhs: &Self);

    /// Nearest `f64`, possibly losing precision.
    fn to_f64(&self) -> f64;

    /// Mantissa/exponent split: `(m, e)` with value ≈ `m · 2^e` and
    /// `0.5 <= |m| < 1`. Zero maps to `(0.0, 0)`.
    fn to_f64_exp(&self) -> (f64, i64);

    /// Parse a decimal integer literal.
    fn parse_decimal(s: &str) -> Option<Self>
    where
        Self: Sized;

    /// Exact dot product of two equal-length slices.
    fn dot(a: &[Self], b: &[Self]) -> Self
    where
        Self: Sized,
    {
        debug_assert_eq!(a.len(), b.len());
        let mut acc = Self::zero();
        for (x, y) in a.iter().zip(b) {
            acc = acc.add(&x.mul(y));
        }
        acc
    }
}

impl IntScalar for i64 {
    fn zero() -> Self {
        0
    }

    fn one() -> Self {
        1
    }

    fn from_i64(v: i64) -> Self {
        v
    }

    fn from_f64_rounded(x: f64) -> Self {
        debug_assert!(x.is_finite());
        x.round() as i64
    }

    fn is_zero(&self) -> bool {
        *self == 0
    }

    fn add(&self, rhs: &Self) -> Self {
        self + rhs
    }

    fn sub(&self, rhs: &Self) -> Self {
        self - rhs
    }

    fn mul(&self, rhs: &Self) -> Self {
        self * rhs
    }

    fn neg(&self) -> Self {
        -self
    }

    fn abs(&self) -> Self {
        i64::abs(*self)
    }

    fn sub_mul_assign(&mut self, c: &Self, rhs: &Self) {
        *self -= c * rhs;
    }

    fn to_f64(&self) -> f64 {
        *self as f64
    }

    fn to_f64_exp(&self) -> (f64, i64) {
        if *self == 0 {
            return (0.0, 0);
        }
        let bits = (64 - self.unsigned_abs().leading_zeros()) as i64;
        ((*self as f64) * 2f64.powi(-bits as i32), bits)
    }

    fn parse_decimal(s: &str) -> Option<Self> {
        s.parse().ok()
    }

    fn dot(a: &[Self], b: &[Self]) -> Self {
        debug_assert_eq!(a.len(), b.len());
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }
}

#[cfg(feature = "high-precision")]
impl IntScalar for Integer {
    fn zero() -> Self {
        Integer::new()
    }

    fn one() -> Self {
        Integer::from(1)
    }

    fn from_i64(v: i64) -> Self {
        Integer::from(v)
    }

    fn from_f64_rounded(x: f64) -> Self {
        debug_assert!(x.is_finite());
        Integer::from_f64(x.round()).unwrap_or_default()
    }

    fn is_zero(&self) -> bool {
        *self == 0
    }

    fn add(&self, rhs: &Self) -> Self {
        Integer::from(self + rhs)
    }

    fn sub(&self, rhs: &Self) -> Self {
        Integer::from(self - rhs)
    }

    fn mul(&self, rhs: &Self) -> Self {
        Integer::from(self * rhs)
    }

    fn neg(&self) -> Self {
        Integer::from(-self)
    }

    fn abs(&self) -> Self {
        Integer::from(self.abs_ref())
    }

    fn sub_mul_assign(&mut self, c: &Self, rhs: &Self) {
        *self -= c * rhs;
    }

    fn to_f64(&self) -> f64 {
        Integer::to_f64(self)
    }

    fn to_f64_exp(&self) -> (f64, i64) {
        let (m, e) = Integer::to_f64_exp(self);
        (m, e as i64)
    }

    fn parse_decimal(s: &str) -> Option<Self> {
        Integer::from_str_radix(s, 10).ok()
    }

    fn dot(a: &[Self], b: &[Self]) -> Self {
        debug_assert_eq!(a.len(), b.len());
        let mut acc = Integer::new();
        for (x, y) in a.iter().zip(b) {
            acc += x * y;
        }
        acc
    }
}

/// Floating approximation scalar, paired with the exact integer type it
/// approximates.
///
/// `prec` is the significand width in bits for backends with configurable
/// precision; fixed-width backends ignore it.
pub trait FloatScalar<Z: IntScalar>: Clone + PartialOrd + Debug + Display {
    fn zero(prec: u32) -> Self;
    fn from_f64(x: f64, prec: u32) -> Self;

    /// Exact entry converted to the approximation.
    fn from_int(z: &Z, prec: u32) -> Self;

    /// Normalized conversion: `(m, e)` with `z ≈ m · 2^e` and `|m| < 1`.
    fn from_int_exp(z: &Z, prec: u32) -> (Self, i64);

    /// Round to the nearest integer and convert back to the exact type.
    fn to_int(&self) -> Z;

    fn add(&self, rhs: &Self) -> Self;
    fn sub(&self, rhs: &Self) -> Self;
    fn mul(&self, rhs: &Self) -> Self;
    fn div(&self, rhs: &Self) -> Self;
    fn neg(&self) -> Self;
    fn abs(&self) -> Self;
    fn sqrt(&self) -> Self;
    fn is_zero(&self) -> bool;

    /// `self · 2^k`.
    fn mul_2exp(&self, k: i64) -> Self;

    /// Round to the nearest integer at scale `2^shift`: returns
    /// `round(self · 2^shift) · 2^(−shift)`, so the result times `2^shift`
    /// is integral. Callers must pass `shift = 0` unless they carry
    /// explicit exponent alignment (row-exponent scaling); rounding two
    /// values at different scales without the shift is meaningless.
    fn round_with_exp(&self, shift: i64) -> Self;

    /// Dot product of `a[start..end]` with `b[start..end]`.
    fn dot(a: &[Self], b: &[Self], start: usize, end: usize, prec: u32) -> Self
    where
        Self: Sized,
    {
        debug_assert!(start <= end && end <= a.len() && end <= b.len());
        let mut acc = Self::zero(prec);
        for (x, y) in a[start..end].iter().zip(&b[start..end]) {
            acc = acc.add(&x.mul(y));
        }
        acc
    }
}

impl<Z: IntScalar> FloatScalar<Z> for f64 {
    fn zero(_prec: u32) -> Self {
        0.0
    }

    fn from_f64(x: f64, _prec: u32) -> Self {
        x
    }

    fn from_int(z: &Z, _prec: u32) -> Self {
        z.to_f64()
    }

    fn from_int_exp(z: &Z, _prec: u32) -> (Self, i64) {
        z.to_f64_exp()
    }

    fn to_int(&self) -> Z {
        Z::from_f64_rounded(*self)
    }

    fn add(&self, rhs: &Self) -> Self {
        self + rhs
    }

    fn sub(&self, rhs: &Self) -> Self {
        self - rhs
    }

    fn mul(&self, rhs: &Self) -> Self {
        self * rhs
    }

    fn div(&self, rhs: &Self) -> Self {
        self / rhs
    }

    fn neg(&self) -> Self {
        -self
    }

    fn abs(&self) -> Self {
        f64::abs(*self)
    }

    fn sqrt(&self) -> Self {
        f64::sqrt(*self)
    }

    fn is_zero(&self) -> bool {
        *self == 0.0
    }

    fn mul_2exp(&self, k: i64) -> Self {
        self * 2f64.powi(k as i32)
    }

    fn round_with_exp(&self, shift: i64) -> Self {
        if shift == 0 {
            self.round()
        } else {
            let scale = 2f64.powi(shift as i32);
            (self * scale).round() / scale
        }
    }
}

#[cfg(feature = "high-precision")]
impl FloatScalar<Integer> for Float {
    fn zero(prec: u32) -> Self {
        Float::new(prec)
    }

    fn from_f64(x: f64, prec: u32) -> Self {
        Float::with_val(prec, x)
    }

    fn from_int(z: &Integer, prec: u32) -> Self {
        Float::with_val(prec, z)
    }

    fn from_int_exp(z: &Integer, prec: u32) -> (Self, i64) {
        let f = Float::with_val(prec, z);
        match f.get_exp() {
            Some(e) => {
                let m = Float::with_val(prec, &f >> e);
                (m, e as i64)
            }
            None => (f, 0),
        }
    }

    fn to_int(&self) -> Integer {
        self.clone().round().to_integer().unwrap_or_default()
    }

    fn add(&self, rhs: &Self) -> Self {
        Float::with_val(self.prec(), self + rhs)
    }

    fn sub(&self, rhs: &Self) -> Self {
        Float::with_val(self.prec(), self - rhs)
    }

    fn mul(&self, rhs: &Self) -> Self {
        Float::with_val(self.prec(), self * rhs)
    }

    fn div(&self, rhs: &Self) -> Self {
        Float::with_val(self.prec(), self / rhs)
    }

    fn neg(&self) -> Self {
        Float::with_val(self.prec(), -self)
    }

    fn abs(&self) -> Self {
        self.clone().abs()
    }

    fn sqrt(&self) -> Self {
        self.clone().sqrt()
    }

    fn is_zero(&self) -> bool {
        Float::is_zero(self)
    }

    fn mul_2exp(&self, k: i64) -> Self {
        Float::with_val(self.prec(), self << k as i32)
    }

    fn round_with_exp(&self, shift: i64) -> Self {
        if shift == 0 {
            self.clone().round()
        } else {
            let shifted = Float::with_val(self.prec(), self << shift as i32).round();
            Float::with_val(self.prec(), &shifted >> shift as i32)
        }
    }

    fn dot(a: &[Self], b: &[Self], start: usize, end: usize, prec: u32) -> Self {
        debug_assert!(start <= end && end <= a.len() && end <= b.len());
        let mut acc = Float::new(prec);
        for (x, y) in a[start..end].iter().zip(&b[start..end]) {
            acc += x * y;
        }
        acc
    }
}
