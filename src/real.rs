//! This module contains the definition of the `Real` data structure, the
//! normalization rules that maintain its precision invariant, and the basic
//! accessors.

use crate::error::Error;
use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};

/// The precision (in bits) of numbers that are created without an explicit
/// precision.
pub const DEFAULT_PRECISION: usize = 256;

/// The number of units in the last place that two numbers may differ by and
/// still compare equal. Truncating arithmetic leaves a few units of noise in
/// the low bits of the result.
pub const EPSILON: u64 = 4;

/// The number of extra bits that the transcendental functions carry on top of
/// the requested precision.
pub const GUARD_BITS: usize = 32;

/// This is the main data structure of this library. It represents the
/// arbitrary-precision number `coefficient * 2^exponent`, where the number of
/// bits in the coefficient is limited by `precision`.
///
/// Non-zero numbers are always normalized: the coefficient has exactly
/// `precision` bits. Bits that don't fit are truncated (the magnitude is
/// rounded toward zero). Zero is stored as `0 * 2^0`.
///
/// Numbers are immutable. All of the operations return new numbers, and the
/// precision of the result of a binary operation is the smaller of the two
/// input precisions, which mimics the propagation of significant figures.
///
/// # Examples
///
/// ```
///    use bigreal::Real;
///
///    let x = Real::from_i64(1, 64).unwrap();
///    let y = Real::from_i64(3, 64).unwrap();
///    let z = (&x / &y).unwrap();
///
///    // Prints the truncated digits of 1/3.
///    println!("{}", z);
///    assert!(z.to_string().starts_with("3.33333333333333333"));
/// ```
#[derive(Debug, Clone)]
pub struct Real {
    // The signed mantissa.
    coefficient: BigInt,
    // The power of two that scales the coefficient.
    exponent: BigInt,
    // The number of bits in the coefficient.
    precision: usize,
}

impl Real {
    /// Create a new number with the value `coefficient * 2^exponent`, and
    /// normalize it to `precision` bits.
    pub fn new(
        coefficient: impl Into<BigInt>,
        exponent: impl Into<BigInt>,
        precision: usize,
    ) -> Result<Self, Error> {
        if precision == 0 {
            return Err(Error::InvalidPrecision);
        }
        Ok(Self::normalized(coefficient.into(), exponent.into(), precision))
    }

    /// Create a normalized number. The caller guarantees that the precision
    /// is positive.
    pub(crate) fn normalized(
        coefficient: BigInt,
        exponent: BigInt,
        precision: usize,
    ) -> Self {
        debug_assert!(precision > 0, "invalid precision");
        let (coefficient, exponent) =
            normalize(coefficient, exponent, precision);
        Real {
            coefficient,
            exponent,
            precision,
        }
    }

    /// Returns a new zero number.
    pub(crate) fn zero(precision: usize) -> Self {
        Self::normalized(BigInt::zero(), BigInt::zero(), precision)
    }

    /// Returns a new number with the value one.
    pub(crate) fn one(precision: usize) -> Self {
        Self::normalized(BigInt::one(), BigInt::zero(), precision)
    }

    /// Returns the coefficient of the number.
    pub fn coefficient(&self) -> &BigInt {
        &self.coefficient
    }

    /// Returns the exponent of the number.
    pub fn exponent(&self) -> &BigInt {
        &self.exponent
    }

    /// Returns the precision of the number, in bits.
    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Returns the number of bits in the coefficient.
    pub fn bit_length(&self) -> usize {
        self.coefficient.bits() as usize
    }

    /// Returns true if the number is zero.
    pub fn is_zero(&self) -> bool {
        self.coefficient.is_zero()
    }

    /// Returns true if the number is smaller than zero.
    pub fn is_negative(&self) -> bool {
        self.coefficient.is_negative()
    }

    /// Returns true if the number is larger than zero.
    pub fn is_positive(&self) -> bool {
        self.coefficient.is_positive()
    }

    /// Returns the position of the leading bit: `exponent + bit_length`.
    /// Non-zero numbers satisfy `2^(magnitude-1) <= |x| < 2^magnitude`.
    pub fn magnitude(&self) -> BigInt {
        &self.exponent + BigInt::from(self.bit_length())
    }

    /// Returns true if the magnitude of the coefficient is a power of two.
    pub(crate) fn is_power_of_two(&self) -> bool {
        match self.coefficient.trailing_zeros() {
            Some(tz) => tz + 1 == self.coefficient.bits(),
            None => false,
        }
    }

    /// Returns true if the two numbers have the same representation. Unlike
    /// `==`, this comparison is exact and includes the precision.
    pub fn is_identical(&self, other: &Self) -> bool {
        self.precision == other.precision
            && self.exponent == other.exponent
            && self.coefficient == other.coefficient
    }

    /// Replace the precision of the number and normalize it. Lowering the
    /// precision drops the low bits. Raising the precision pads the number
    /// with zeros, and does not recover bits that were lost.
    pub fn set_precision(&mut self, precision: usize) -> Result<(), Error> {
        if precision == 0 {
            return Err(Error::InvalidPrecision);
        }
        let coefficient = core::mem::take(&mut self.coefficient);
        let exponent = core::mem::take(&mut self.exponent);
        *self = Self::normalized(coefficient, exponent, precision);
        Ok(())
    }

    /// Returns a copy of the number that is normalized to `precision` bits.
    pub fn with_precision(&self, precision: usize) -> Result<Self, Error> {
        if precision == 0 {
            return Err(Error::InvalidPrecision);
        }
        Ok(self.cast(precision))
    }

    /// Normalize a copy of the number to `precision`, which must be positive.
    pub(crate) fn cast(&self, precision: usize) -> Self {
        Self::normalized(
            self.coefficient.clone(),
            self.exponent.clone(),
            precision,
        )
    }

    /// Returns the number multiplied by `2^bits`. This operation is exact.
    pub fn scale(&self, bits: i64) -> Self {
        if self.is_zero() {
            return self.clone();
        }
        Real {
            coefficient: self.coefficient.clone(),
            exponent: &self.exponent + BigInt::from(bits),
            precision: self.precision,
        }
    }

    /// Returns the smallest number with the same precision that is larger
    /// than this number.
    pub fn next(&self) -> Self {
        self.step(true)
    }

    /// Returns the largest number with the same precision that is smaller
    /// than this number.
    pub fn prev(&self) -> Self {
        self.step(false)
    }

    fn step(&self, up: bool) -> Self {
        let unit = if up { BigInt::one() } else { -BigInt::one() };
        if self.is_zero() {
            return Self::normalized(unit, BigInt::zero(), self.precision);
        }

        let mut coefficient = self.coefficient.clone();
        let mut exponent = self.exponent.clone();

        // Moving toward zero from a power of two enters the lower binade,
        // where the distance between numbers is half as large.
        let toward_zero = up == self.is_negative();
        if toward_zero && self.is_power_of_two() {
            coefficient <<= 1usize;
            exponent -= BigInt::one();
        }
        Self::normalized(coefficient + unit, exponent, self.precision)
    }
}

/// Shift `val` right by `bits`, truncating the magnitude (round toward zero).
pub(crate) fn shift_right_truncating(val: &BigInt, bits: usize) -> BigInt {
    if val.is_negative() {
        -((-val) >> bits)
    } else {
        val >> bits
    }
}

/// Adjust the coefficient to `precision` bits, and update the exponent to
/// keep the value. When the coefficient is too wide the low bits are
/// dropped. When it is too narrow it is padded with zeros.
pub(crate) fn normalize(
    coefficient: BigInt,
    exponent: BigInt,
    precision: usize,
) -> (BigInt, BigInt) {
    if coefficient.is_zero() {
        return (BigInt::zero(), BigInt::zero());
    }

    let bits = coefficient.bits() as usize;
    if bits > precision {
        let excess = bits - precision;
        let coefficient = shift_right_truncating(&coefficient, excess);
        (coefficient, exponent + BigInt::from(excess))
    } else if bits < precision {
        let deficit = precision - bits;
        (coefficient << deficit, exponent - BigInt::from(deficit))
    } else {
        (coefficient, exponent)
    }
}

#[test]
fn test_normalize() {
    let (c, e) = normalize(BigInt::from(0b1011_0111), BigInt::from(0), 4);
    assert_eq!(c, BigInt::from(0b1011));
    assert_eq!(e, BigInt::from(4));

    // Negative numbers are truncated toward zero.
    let (c, e) = normalize(BigInt::from(-0b1011_0111), BigInt::from(0), 4);
    assert_eq!(c, BigInt::from(-0b1011));
    assert_eq!(e, BigInt::from(4));

    // Narrow numbers are padded.
    let (c, e) = normalize(BigInt::from(3), BigInt::from(2), 8);
    assert_eq!(c, BigInt::from(0b1100_0000));
    assert_eq!(e, BigInt::from(-4));

    // Zero is canonical.
    let (c, e) = normalize(BigInt::from(0), BigInt::from(-17), 8);
    assert!(c.is_zero() && e.is_zero());
}

#[test]
fn test_normalize_idempotent() {
    use crate::utils::Lfsr;

    let mut lfsr = Lfsr::new();
    for _ in 0..200 {
        let c = BigInt::from(lfsr.get64() as i64);
        let e = BigInt::from((lfsr.get64() % 200) as i64 - 100);
        let precision = 1 + (lfsr.get64() % 90) as usize;
        let x = Real::new(c, e, precision).unwrap();
        assert!(x.is_zero() || x.bit_length() == precision);
        let y = Real::new(x.coefficient().clone(), x.exponent().clone(), x.precision())
            .unwrap();
        assert!(x.is_identical(&y));
    }
}

#[test]
fn test_invalid_precision() {
    assert_eq!(Real::new(1, 0, 0).unwrap_err(), Error::InvalidPrecision);
    let mut x = Real::new(1, 0, 8).unwrap();
    assert_eq!(x.set_precision(0).unwrap_err(), Error::InvalidPrecision);
    assert!(x.with_precision(0).is_err());
}

#[test]
fn test_set_precision() {
    // 0b1011011 * 2^0 = 91.
    let mut x = Real::new(91, 0, 7).unwrap();
    x.set_precision(3).unwrap();
    // Truncated to 0b101 * 2^4 = 80.
    assert_eq!(x.coefficient(), &BigInt::from(0b101));
    assert_eq!(x.exponent(), &BigInt::from(4));

    // Raising the precision does not recover the lost bits.
    x.set_precision(7).unwrap();
    assert_eq!(x.coefficient(), &BigInt::from(0b1010000));
    assert_eq!(x.exponent(), &BigInt::from(0));
    assert_eq!(x.precision(), 7);
}

#[test]
fn test_next_prev() {
    // 0b1010 * 2^0 at 4 bits.
    let x = Real::new(10, 0, 4).unwrap();
    assert_eq!(x.next().coefficient(), &BigInt::from(11));
    assert_eq!(x.prev().coefficient(), &BigInt::from(9));
    assert!(x.next().prev().is_identical(&x));

    // Overflow into the next binade: 0b1111 + 1 = 0b1000 * 2^1.
    let x = Real::new(15, 0, 4).unwrap();
    let n = x.next();
    assert_eq!(n.coefficient(), &BigInt::from(8));
    assert_eq!(n.exponent(), &BigInt::from(1));
}

#[test]
fn test_next_prev_power_of_two_edge() {
    // 8 = 0b1000 * 2^0. The number below it is 7.5 = 0b1111 * 2^-1.
    let x = Real::new(8, 0, 4).unwrap();
    let p = x.prev();
    assert_eq!(p.coefficient(), &BigInt::from(15));
    assert_eq!(p.exponent(), &BigInt::from(-1));
    assert_eq!(p.bit_length(), 4);
    assert!(p.next().is_identical(&x));

    // And the mirror image for negative numbers.
    let x = Real::new(-8, 0, 4).unwrap();
    let n = x.next();
    assert_eq!(n.coefficient(), &BigInt::from(-15));
    assert_eq!(n.exponent(), &BigInt::from(-1));
    assert!(n.prev().is_identical(&x));

    // Moving away from zero does not change the binade.
    let n = Real::new(8, 0, 4).unwrap().next();
    assert_eq!(n.coefficient(), &BigInt::from(9));
    assert_eq!(n.exponent(), &BigInt::from(0));

    // Precision of one bit: the number below 1 is 0.5.
    let x = Real::new(1, 0, 1).unwrap();
    let p = x.prev();
    assert_eq!(p.coefficient(), &BigInt::from(1));
    assert_eq!(p.exponent(), &BigInt::from(-1));
}

#[test]
fn test_zero_next() {
    let z = Real::new(0, 0, 8).unwrap();
    assert!(z.next().is_positive());
    assert!(z.prev().is_negative());
}

#[test]
fn test_magnitude() {
    let x = Real::new(5, 3, 8).unwrap(); // 40.
    assert_eq!(x.magnitude(), BigInt::from(6)); // 32 <= 40 < 64.
    let x = Real::new(1, -3, 16).unwrap(); // 0.125.
    assert_eq!(x.magnitude(), BigInt::from(-2));
    assert_eq!(x.scale(3).magnitude(), BigInt::from(1));
}
