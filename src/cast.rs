//! This module contains the conversions between `Real` and the other numeric
//! types, and the operations that round numbers to integers.

use crate::error::Error;
use crate::real::{Real, DEFAULT_PRECISION};
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};

/// The kinds of values that a `Real` can be constructed from. The kind is
/// resolved once, by `Real::from_input`.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    /// An integer, loaded exactly.
    Integer(BigInt),
    /// A binary floating point literal, loaded exactly.
    Float(f64),
    /// A decimal string, such as "-12.5e-3".
    Decimal(String),
    /// The number `coefficient * 2^exponent`.
    Raw {
        coefficient: BigInt,
        exponent: BigInt,
    },
}

impl From<i64> for Input {
    fn from(val: i64) -> Self {
        Input::Integer(BigInt::from(val))
    }
}

impl From<i32> for Input {
    fn from(val: i32) -> Self {
        Input::Integer(BigInt::from(val))
    }
}

impl From<u64> for Input {
    fn from(val: u64) -> Self {
        Input::Integer(BigInt::from(val))
    }
}

impl From<BigInt> for Input {
    fn from(val: BigInt) -> Self {
        Input::Integer(val)
    }
}

impl From<f64> for Input {
    fn from(val: f64) -> Self {
        Input::Float(val)
    }
}

impl From<&str> for Input {
    fn from(val: &str) -> Self {
        Input::Decimal(String::from(val))
    }
}

impl From<String> for Input {
    fn from(val: String) -> Self {
        Input::Decimal(val)
    }
}

impl From<(BigInt, BigInt)> for Input {
    fn from(val: (BigInt, BigInt)) -> Self {
        Input::Raw {
            coefficient: val.0,
            exponent: val.1,
        }
    }
}

impl Real {
    /// Construct a number with `precision` bits from `input`.
    pub fn from_input(
        input: impl Into<Input>,
        precision: usize,
    ) -> Result<Self, Error> {
        match input.into() {
            Input::Integer(val) => Self::from_bigint(val, precision),
            Input::Float(val) => Self::from_f64(val, precision),
            Input::Decimal(val) => Self::parse(&val, precision),
            Input::Raw {
                coefficient,
                exponent,
            } => Self::new(coefficient, exponent, precision),
        }
    }

    /// Load the integer `val`. The number is truncated if it does not fit in
    /// `precision` bits.
    pub fn from_bigint(val: BigInt, precision: usize) -> Result<Self, Error> {
        Self::new(val, BigInt::zero(), precision)
    }

    /// Load the integer `val`.
    pub fn from_i64(val: i64, precision: usize) -> Result<Self, Error> {
        Self::new(val, 0, precision)
    }

    /// Load the integer `val`.
    pub fn from_u64(val: u64, precision: usize) -> Result<Self, Error> {
        Self::new(val, 0, precision)
    }

    /// Load the exact binary value of the double `val`.
    pub fn from_f64(val: f64, precision: usize) -> Result<Self, Error> {
        if !val.is_finite() {
            return Err(Error::NonFinite(val));
        }
        let (mantissa, exp) = decompose_f64(val);
        Self::new(mantissa, exp, precision)
    }

    /// Returns true if the number has no fractional part.
    pub fn is_integer(&self) -> bool {
        if self.is_zero() || !self.exponent().is_negative() {
            return true;
        }
        let tz = self.coefficient().trailing_zeros().unwrap_or(0);
        BigInt::from(tz) >= -self.exponent()
    }

    /// Returns the number of fraction bits in the coefficient, for numbers
    /// with a negative exponent. Shifting by more than the width of the
    /// coefficient gives the same result, so the count is capped.
    fn fraction_bits(&self) -> usize {
        debug_assert!(self.exponent().is_negative());
        let limit = self.bit_length() + 2;
        (-self.exponent()).to_usize().map_or(limit, |s| s.min(limit))
    }

    /// Returns the largest integer that is not larger than the number.
    pub fn floor(&self) -> Self {
        if !self.exponent().is_negative() {
            return self.clone();
        }
        if self.is_negative() {
            return self.neg().ceil().neg();
        }
        let int = self.coefficient() >> self.fraction_bits();
        Self::normalized(int, BigInt::zero(), self.precision())
    }

    /// Returns the smallest integer that is not smaller than the number.
    pub fn ceil(&self) -> Self {
        if !self.exponent().is_negative() {
            return self.clone();
        }
        if self.is_negative() {
            return self.neg().floor().neg();
        }
        let shift = self.fraction_bits();
        let mut int = self.coefficient() >> shift;
        // Round up if any of the fraction bits is set.
        if &(&int << shift) != self.coefficient() {
            int += BigInt::one();
        }
        Self::normalized(int, BigInt::zero(), self.precision())
    }

    /// Rounds the number to the nearest integer. Halfway cases are rounded
    /// toward positive infinity, so this is `floor(x + 1/2)`.
    pub fn round(&self) -> Self {
        if !self.exponent().is_negative() {
            return self.clone();
        }
        // Keep one fraction bit. The shift rounds toward negative infinity,
        // also for negative coefficients.
        let mut int = self.coefficient() >> (self.fraction_bits() - 1);
        if int.is_odd() {
            int += BigInt::one();
        }
        Self::normalized(int >> 1usize, BigInt::zero(), self.precision())
    }

    /// Returns the integer part of the number (rounds toward zero).
    pub fn trunc(&self) -> Self {
        if self.is_negative() {
            self.ceil()
        } else {
            self.floor()
        }
    }

    /// Returns the integer part of the number (rounded toward zero) as a
    /// big integer.
    pub fn to_integer(&self) -> Result<BigInt, Error> {
        let int = self.trunc();
        if !int.exponent().is_negative() {
            let shift = int.exponent().to_usize().ok_or_else(|| {
                Error::Unsupported(format!(
                    "the integer 2^{} is too large to materialize",
                    int.exponent()
                ))
            })?;
            return Ok(int.coefficient() << shift);
        }
        // The remaining fraction bits are zero.
        let shift = (-int.exponent()).to_usize().unwrap_or(usize::MAX);
        Ok(int.coefficient() >> shift.min(int.bit_length()))
    }

    /// Returns the integer part of the number (rounded toward zero).
    pub fn to_i64(&self) -> Result<i64, Error> {
        self.to_integer()?.to_i64().ok_or_else(|| {
            Error::Unsupported(format!("{} does not fit in an i64", self))
        })
    }

    /// Returns an approximation of the number as a double. Numbers that are
    /// out of the range of the double saturate to infinity or zero.
    pub fn to_f64(&self) -> f64 {
        if self.is_zero() {
            return 0.0;
        }
        // Keep the 64 most significant bits.
        let shift = self.bit_length().saturating_sub(64);
        let mantissa =
            (self.coefficient().abs() >> shift).to_f64().unwrap_or(0.0);
        let saturated = if self.exponent().is_negative() {
            i64::MIN
        } else {
            i64::MAX
        };
        let exp = (self.exponent() + BigInt::from(shift))
            .to_i64()
            .unwrap_or(saturated)
            .clamp(-2200, 2200) as i32;
        // Scale in two steps to allow results in the denormal range.
        let half = exp / 2;
        let val = mantissa * 2f64.powi(half) * 2f64.powi(exp - half);
        if self.is_negative() {
            -val
        } else {
            val
        }
    }
}

/// Returns the exact value of the finite double `val` as a pair of an odd
/// integer mantissa and a power-of-two exponent.
fn decompose_f64(val: f64) -> (i64, i64) {
    let bits = val.to_bits();
    let sign = (bits >> 63) == 1;
    let biased_exp = ((bits >> 52) & 0x7ff) as i64;
    let mut mantissa = bits & ((1u64 << 52) - 1);

    // Remove the bias, and refer the exponent to bit zero of the mantissa.
    let mut exp = biased_exp - 1075;

    // Add the implicit bit for normal numbers.
    if biased_exp != 0 {
        mantissa |= 1u64 << 52;
    } else {
        // Denormals share the exponent of the smallest normal number.
        exp += 1;
    }

    if mantissa == 0 {
        return (0, 0);
    }

    // Drop the trailing zeros, to get the shortest mantissa.
    let tz = mantissa.trailing_zeros();
    mantissa >>= tz;
    exp += tz as i64;

    let mantissa = mantissa as i64;
    (if sign { -mantissa } else { mantissa }, exp)
}

impl From<i64> for Real {
    fn from(val: i64) -> Self {
        Self::normalized(BigInt::from(val), BigInt::zero(), DEFAULT_PRECISION)
    }
}

impl From<u64> for Real {
    fn from(val: u64) -> Self {
        Self::normalized(BigInt::from(val), BigInt::zero(), DEFAULT_PRECISION)
    }
}

impl From<i32> for Real {
    fn from(val: i32) -> Self {
        Self::normalized(BigInt::from(val), BigInt::zero(), DEFAULT_PRECISION)
    }
}

impl From<BigInt> for Real {
    fn from(val: BigInt) -> Self {
        Self::normalized(val, BigInt::zero(), DEFAULT_PRECISION)
    }
}

impl TryFrom<f64> for Real {
    type Error = Error;

    fn try_from(val: f64) -> Result<Self, Self::Error> {
        Self::from_f64(val, DEFAULT_PRECISION)
    }
}

#[test]
fn test_decompose_f64() {
    assert_eq!(decompose_f64(0.0), (0, 0));
    assert_eq!(decompose_f64(-0.0), (0, 0));
    assert_eq!(decompose_f64(1.0), (1, 0));
    assert_eq!(decompose_f64(-6.0), (-3, 1));
    assert_eq!(decompose_f64(0.375), (3, -3));
    assert_eq!(decompose_f64(f64::from_bits(1)), (1, -1074));
    assert_eq!(decompose_f64(f64::MAX), ((1i64 << 53) - 1, 971));
}

#[test]
fn test_from_f64() {
    use crate::utils;

    for v in utils::get_special_test_values() {
        let x = Real::from_f64(v, 64).unwrap();
        assert_eq!(x.to_f64(), v);
    }

    // Low precisions truncate toward zero.
    let x = Real::from_f64(0.1, 8).unwrap();
    assert!(x.to_f64() < 0.1);
    let x = Real::from_f64(-0.1, 8).unwrap();
    assert!(x.to_f64() > -0.1);

    assert_eq!(
        Real::from_f64(f64::NAN, 8).unwrap_err().to_string(),
        "cannot construct a real from the non-finite value NaN"
    );
    assert!(Real::try_from(f64::INFINITY).is_err());
    assert!(Real::from_f64(1.5, 0).is_err());
}

#[test]
fn test_from_input() {
    let a = Real::from_input(12, 16).unwrap();
    let b = Real::from_input(12.0, 16).unwrap();
    let c = Real::from_input("1.2e1", 16).unwrap();
    let d = Real::from_input((BigInt::from(3), BigInt::from(2)), 16).unwrap();
    assert!(a.is_identical(&b));
    assert!(a.is_identical(&c));
    assert!(a.is_identical(&d));
    assert!(Real::from_input("twelve", 16).is_err());
    assert!(Real::from_input(12, 0).is_err());
}

#[test]
fn test_round_integers() {
    use crate::utils::Lfsr;

    let mut lfsr = Lfsr::new();
    for _ in 0..300 {
        let i = BigInt::from(lfsr.get64() as i64 >> (lfsr.get64() % 60));
        let precision = (i.bits() as usize).max(1);
        let x = Real::from_bigint(i.clone(), precision).unwrap();
        assert!(x.is_integer());
        assert_eq!(x.floor().to_integer().unwrap(), i);
        assert_eq!(x.ceil().to_integer().unwrap(), i);
        assert_eq!(x.round().to_integer().unwrap(), i);
        assert_eq!(x.trunc().to_integer().unwrap(), i);
    }
}

#[test]
fn test_floor_ceil_round() {
    // -2.5 = -5 * 2^-1.
    let x = Real::new(-5, -1, 8).unwrap();
    assert_eq!(x.floor().to_i64().unwrap(), -3);
    assert_eq!(x.ceil().to_i64().unwrap(), -2);
    assert_eq!(x.round().to_i64().unwrap(), -2);
    assert_eq!(x.trunc().to_i64().unwrap(), -2);
    assert_eq!(x.floor().precision(), 8);

    // 2.5 rounds up as well.
    let x = Real::new(5, -1, 8).unwrap();
    assert_eq!(x.floor().to_i64().unwrap(), 2);
    assert_eq!(x.ceil().to_i64().unwrap(), 3);
    assert_eq!(x.round().to_i64().unwrap(), 3);

    fn check(val: f64) {
        let x = Real::from_f64(val, 64).unwrap();
        assert_eq!(x.floor().to_f64(), val.floor(), "floor {}", val);
        assert_eq!(x.ceil().to_f64(), val.ceil(), "ceil {}", val);
        assert_eq!(x.trunc().to_f64(), val.trunc(), "trunc {}", val);
        assert_eq!(x.round().to_f64(), (val + 0.5).floor(), "round {}", val);
    }
    for val in [
        -2.6, -2.4, -1.5, -0.75, -0.5, -0.25, 0.25, 0.5, 0.75, 1.5, 2.4, 2.6,
        1e-30, -1e-30, 1e30, -1e30, 12345.678,
    ] {
        check(val);
    }
}

#[test]
fn test_floor_ceil_bracket() {
    use crate::utils::Lfsr;

    let mut lfsr = Lfsr::new();
    for _ in 0..200 {
        let x = lfsr.get_real(40, 60);
        let (lo, hi) = (x.floor(), x.ceil());
        assert!(lo <= x && x <= hi);
        assert!(lo.is_integer() && hi.is_integer());
        if x.is_integer() {
            assert!(lo.is_identical(&x) && hi.is_identical(&x));
        }
    }
}

#[test]
fn test_to_integer() {
    let x = Real::new(-7, -1, 8).unwrap(); // -3.5
    assert_eq!(x.to_integer().unwrap(), BigInt::from(-3));
    let x = Real::new(1, 100, 8).unwrap();
    assert_eq!(x.to_integer().unwrap(), BigInt::one() << 100usize);
    assert!(x.to_i64().is_err());
    let x = Real::new(1, -100, 8).unwrap();
    assert!(x.to_integer().unwrap().is_zero());
}

#[test]
fn test_is_integer() {
    assert!(Real::new(6, -1, 8).unwrap().is_integer());
    assert!(!Real::new(5, -1, 8).unwrap().is_integer());
    assert!(Real::new(0, -1, 8).unwrap().is_integer());
    assert!(Real::new(3, 40, 8).unwrap().is_integer());
}
