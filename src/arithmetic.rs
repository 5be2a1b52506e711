//! This module contains the implementation of the basic arithmetic operations
//! and of the tolerant comparison.

use crate::error::Error;
use crate::real::{Real, EPSILON};
use core::cmp::Ordering;
use core::ops::{Add, Div, Mul, Neg, Sub};
use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};

/// The coefficients of two numbers, shifted to a common exponent.
struct Aligned {
    lhs: BigInt,
    rhs: BigInt,
    exponent: BigInt,
    // Set when the smaller operand was replaced by a sticky unit.
    sticky: bool,
}

/// Align the non-zero numbers `a` and `b` on the smaller exponent, keeping
/// the order of the operands.
///
/// When the exponents are far apart the number with the smaller exponent is
/// below the last bit of the other number. In that case it is replaced with a
/// single unit, with the same sign, two bits below the last bit of the larger
/// number. This keeps the shift bounded and gives the same truncated result,
/// because both values are strictly between the same two multiples of half a
/// unit of the larger number.
fn align(a: &Real, b: &Real) -> Aligned {
    debug_assert!(!a.is_zero() && !b.is_zero());
    let swap = a.exponent() < b.exponent();
    let (big, small) = if swap { (b, a) } else { (a, b) };

    let diff = big.exponent() - small.exponent();
    let limit = small.bit_length() + 2;
    let (big_c, small_c, exponent, sticky) = match diff.to_usize() {
        Some(shift) if shift <= limit => (
            big.coefficient() << shift,
            small.coefficient().clone(),
            small.exponent().clone(),
            false,
        ),
        _ => {
            let unit = if small.is_negative() {
                -BigInt::one()
            } else {
                BigInt::one()
            };
            let exponent = big.exponent() - BigInt::from(2);
            (big.coefficient() << 2usize, unit, exponent, true)
        }
    };

    let (lhs, rhs) = if swap {
        (small_c, big_c)
    } else {
        (big_c, small_c)
    };
    Aligned {
        lhs,
        rhs,
        exponent,
        sticky,
    }
}

impl Real {
    /// Returns the number with the sign flipped.
    pub fn neg(&self) -> Self {
        Self::normalized(
            -self.coefficient(),
            self.exponent().clone(),
            self.precision(),
        )
    }

    /// Returns the absolute value of the number.
    pub fn abs(&self) -> Self {
        if self.is_negative() {
            self.neg()
        } else {
            self.clone()
        }
    }

    /// Computes self + other. The precision of the result is the smaller of
    /// the two precisions, and the exact sum is truncated to that precision.
    pub fn add(&self, other: &Self) -> Self {
        let precision = self.precision().min(other.precision());
        if self.is_zero() {
            return other.cast(precision);
        }
        if other.is_zero() {
            return self.cast(precision);
        }
        let Aligned {
            lhs, rhs, exponent, ..
        } = align(self, other);
        Self::normalized(lhs + rhs, exponent, precision)
    }

    /// Computes self - other.
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// Computes self * other. The exact product is truncated to the smaller
    /// of the two precisions.
    pub fn mul(&self, other: &Self) -> Self {
        let precision = self.precision().min(other.precision());
        Self::normalized(
            self.coefficient() * other.coefficient(),
            self.exponent() + other.exponent(),
            precision,
        )
    }

    /// Computes self / other. Returns an error if `other` is zero.
    pub fn div(&self, other: &Self) -> Result<Self, Error> {
        if other.is_zero() {
            return Err(Error::InvalidOperation("division by zero"));
        }
        let precision = self.precision().min(other.precision());
        if self.is_zero() {
            return Ok(Self::zero(precision));
        }

        // Widen the dividend so that the integer quotient carries more bits
        // than the result can hold. The integer division truncates toward
        // zero, like the normalization that follows it.
        let k = 2 * self.precision().max(other.precision()) + 1;
        let coefficient = (self.coefficient() << k) / other.coefficient();
        let exponent = self.exponent() - other.exponent() - BigInt::from(k);
        Ok(Self::normalized(coefficient, exponent, precision))
    }

    /// Computes floor(self / other).
    pub fn div_floor(&self, other: &Self) -> Result<Self, Error> {
        Ok(self.div(other)?.floor())
    }

    /// Compare two numbers. The numbers are first truncated to the smaller of
    /// the two precisions. Numbers that differ by at most `EPSILON` units of
    /// the smaller exponent are considered equal.
    pub fn compare(&self, other: &Self) -> Ordering {
        let precision = self.precision().min(other.precision());
        let a = self.cast(precision);
        let b = other.cast(precision);

        if a.is_zero() || b.is_zero() {
            return a.coefficient().signum().cmp(&b.coefficient().signum());
        }

        let aligned = align(&a, &b);
        let diff = aligned.lhs - aligned.rhs;
        if !aligned.sticky && diff.abs() <= BigInt::from(EPSILON) {
            return Ordering::Equal;
        }
        diff.cmp(&BigInt::zero())
    }
}

impl PartialEq for Real {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl PartialOrd for Real {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

macro_rules! impl_binary_operator {
    ($trait_name:ident, $method:ident) => {
        impl $trait_name<&Real> for &Real {
            type Output = Real;

            fn $method(self, rhs: &Real) -> Real {
                Real::$method(self, rhs)
            }
        }

        impl $trait_name for Real {
            type Output = Real;

            fn $method(self, rhs: Real) -> Real {
                Real::$method(&self, &rhs)
            }
        }
    };
}

impl_binary_operator!(Add, add);
impl_binary_operator!(Sub, sub);
impl_binary_operator!(Mul, mul);

// Division can fail, so the operator returns a result.
impl Div<&Real> for &Real {
    type Output = Result<Real, Error>;

    fn div(self, rhs: &Real) -> Self::Output {
        Real::div(self, rhs)
    }
}

impl Div for Real {
    type Output = Result<Real, Error>;

    fn div(self, rhs: Real) -> Self::Output {
        Real::div(&self, &rhs)
    }
}

impl Neg for &Real {
    type Output = Real;

    fn neg(self) -> Real {
        Real::neg(self)
    }
}

impl Neg for Real {
    type Output = Real;

    fn neg(self) -> Real {
        Real::neg(&self)
    }
}

#[test]
fn test_add_small_integers() {
    let three = Real::new(3, 0, 8).unwrap();
    let one = Real::new(1, 0, 8).unwrap();
    let four = &three + &one;
    assert!(four.is_identical(&Real::new(4, 0, 8).unwrap()));
    assert_eq!(four.coefficient(), &BigInt::from(128));
    assert_eq!(four.exponent(), &BigInt::from(-5));

    let two = &three - &one;
    assert!(two.is_identical(&Real::new(2, 0, 8).unwrap()));
    let minus_two = &one - &three;
    assert!(minus_two.is_identical(&Real::new(-2, 0, 8).unwrap()));
}

#[test]
fn test_operators() {
    let a = Real::from_i64(8, 64).unwrap();
    let b = Real::from_i64(2, 64).unwrap();
    assert_eq!((&a + &b).to_f64(), 10.0);
    assert_eq!((&a - &b).to_f64(), 6.0);
    assert_eq!((&a * &b).to_f64(), 16.0);
    assert_eq!((&a / &b).unwrap().to_f64(), 4.0);
    assert_eq!((-a.clone()).to_f64(), -8.0);
    assert_eq!((a.clone() * b.clone()).to_f64(), 16.0);
    assert_eq!((a / b).unwrap().to_f64(), 4.0);
}

#[test]
fn test_div_mul_recovers_one() {
    let one = Real::new(1, 0, 16).unwrap();
    let three = Real::new(3, 0, 16).unwrap();
    let third = (&one / &three).unwrap();
    assert_eq!(third.coefficient(), &BigInt::from(0xAAAA));
    let res = &third * &three;
    assert!(!res.is_identical(&one));
    assert!(res == one);
}

#[test]
fn test_zero_operands() {
    let x = Real::new(5, -2, 32).unwrap();
    let zero = Real::new(0, 0, 16).unwrap();

    let sum = &x + &zero;
    assert!(sum.is_identical(&x.with_precision(16).unwrap()));
    assert!((&zero - &x).is_identical(&(-&x).with_precision(16).unwrap()));
    assert!((&x * &zero).is_zero());
    assert!((&zero / &x).unwrap().is_zero());
    assert_eq!(
        (&x / &zero).unwrap_err(),
        Error::InvalidOperation("division by zero")
    );
    assert!(x.div_floor(&zero).is_err());
    assert!(zero == Real::new(0, 0, 64).unwrap());
    assert!(zero.neg().is_zero());
}

#[test]
fn test_mixed_precision() {
    let a = Real::new(1, 0, 64).unwrap();
    let b = Real::new(3, -1, 8).unwrap();
    assert_eq!((&a + &b).precision(), 8);
    assert_eq!((&a * &b).precision(), 8);
    assert_eq!((&a / &b).unwrap().precision(), 8);
    assert_eq!((&b - &a).precision(), 8);
}

#[test]
fn test_far_apart_exponents() {
    let one = Real::new(1, 0, 8).unwrap();
    let tiny = Real::new(1, -1000, 8).unwrap();

    // The tiny number is below the last bit and is truncated away.
    assert!((&one + &tiny).is_identical(&one));
    assert!((&tiny + &one).is_identical(&one));

    // Subtracting it moves the result to the number below one.
    let below = &one - &tiny;
    assert_eq!(below.coefficient(), &BigInt::from(255));
    assert_eq!(below.exponent(), &BigInt::from(-8));
    assert!(below.is_identical(&one.prev()));

    // Huge exponents don't require huge shifts.
    let huge = Real::new(1, BigInt::from(1) << 80usize, 8).unwrap();
    assert!((&huge + &one).is_identical(&huge));
    assert!(huge > one);
    assert!(tiny < one);
    assert!(-&tiny < tiny);
    assert!(tiny != Real::new(1, -999, 8).unwrap());
}

#[test]
fn test_tolerant_compare() {
    let x = Real::new(10, 0, 8).unwrap();
    let mut y = x.clone();
    for _ in 0..4 {
        y = y.next();
        assert!(x == y);
    }
    y = y.next();
    assert!(x != y);
    assert!(x < y);
    assert!(y > x);

    // Equality is tested at the smaller precision.
    let a = Real::from_f64(0.1, 53).unwrap();
    let b = Real::parse("0.1", 200).unwrap();
    assert!(a == b);
    assert!(Real::parse("0.2", 200).unwrap() > a);
}

#[test]
fn test_compare_signs() {
    let zero = Real::new(0, 0, 32).unwrap();
    let tiny = Real::new(1, -500, 32).unwrap();
    assert!(zero < tiny);
    assert!(tiny.neg() < zero);
    assert!(Real::from(-1) < Real::from(1));
    assert!(Real::from(-2) < Real::from(-1));
    assert!(Real::from(3) > Real::from(2));
    assert_eq!(Real::from(7).partial_cmp(&Real::from(7)), Some(Ordering::Equal));
}

#[test]
fn test_div_floor() {
    let seven = Real::from(7);
    let two = Real::from(2);
    assert!(seven.div_floor(&two).unwrap().is_identical(&Real::from(3)));
    assert!(seven
        .neg()
        .div_floor(&two)
        .unwrap()
        .is_identical(&Real::from(-4)));
    assert!(Real::from(8).div_floor(&two).unwrap() == Real::from(4));
}

#[test]
fn test_div_sign_symmetry() {
    use crate::utils::Lfsr;

    // The quotient is truncated toward zero, so the sign of the operands
    // doesn't change the bits of the result.
    let one = Real::new(1, 0, 16).unwrap();
    let three = Real::new(3, 0, 16).unwrap();
    let third = (&-&one / &three).unwrap();
    assert_eq!(third.coefficient(), &BigInt::from(-0xAAAA));

    let mut lfsr = Lfsr::new();
    for precision in [8, 53, 100] {
        for _ in 0..50 {
            let a = lfsr.get_real(precision, 50);
            let b = lfsr.get_real(precision, 50);
            let q = (&a / &b).unwrap();
            assert!((&-&a / &b).unwrap().is_identical(&-&q));
            assert!((&a / &-&b).unwrap().is_identical(&-&q));
            assert!((&-&a / &-&b).unwrap().is_identical(&q));
        }
    }
}

#[test]
fn test_abs() {
    let x = Real::new(-5, 3, 16).unwrap();
    assert!(x.abs().is_identical(&Real::new(5, 3, 16).unwrap()));
    assert!(x.abs().abs().is_identical(&x.abs()));
}

#[test]
fn test_add_random_vals() {
    use crate::utils::Lfsr;

    let mut lfsr = Lfsr::new();
    for precision in [8, 53, 64, 200] {
        for _ in 0..50 {
            let a = lfsr.get_real(precision, 100);
            let b = lfsr.get_real(precision, 100);
            assert!((&a + &b).is_identical(&(&b + &a)));
            assert!((&a * &b).is_identical(&(&b * &a)));
            assert!((&a - &b).is_identical(&(&b - &a).neg()));

            // Dividing the product recovers the number, up to the noise in
            // the last few bits.
            let res = (&(&a * &b) / &b).unwrap();
            let p = precision - 4;
            assert!(res.with_precision(p).unwrap() == a.with_precision(p).unwrap());
        }
    }
}

#[test]
fn test_compare_to_f64() {
    use crate::utils::get_special_test_values;

    for a in get_special_test_values() {
        for b in get_special_test_values() {
            let x = Real::from_f64(a, 64).unwrap();
            let y = Real::from_f64(b, 64).unwrap();
            assert_eq!(x.partial_cmp(&y), a.partial_cmp(&b), "{} {}", a, b);
            let sum = (&x + &y).to_f64();
            assert!(sum == a + b || ((sum - (a + b)) / (a + b)).abs() < 1e-15);
        }
    }
}
