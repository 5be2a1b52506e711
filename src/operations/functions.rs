//! This module contains the implementation of powers and roots.

use super::{
    convergence_failure, integer, iteration_limit, working_precision, Constants,
};
use crate::error::Error;
use crate::real::Real;
use core::cmp::Ordering;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, ToPrimitive, Zero};

/// Returns the smaller of the two iterates of a decreasing sequence.
fn smaller(x: Real, next: Real) -> Real {
    if next.sub(&x).is_negative() {
        next
    } else {
        x
    }
}

impl Real {
    /// Return this number raised to the integer power `n`. Negative powers
    /// compute the reciprocal, so zero to a negative power is an invalid
    /// operation.
    pub fn powi(&self, n: impl Into<BigInt>) -> Result<Self, Error> {
        let n = n.into();
        let precision = self.precision();
        if n.is_zero() {
            return Ok(Self::one(precision));
        }
        if self.is_zero() {
            if n.is_negative() {
                return Err(Error::InvalidOperation(
                    "zero raised to a negative power",
                ));
            }
            return Ok(self.clone());
        }

        // This algorithm is similar to binary conversion. Each bit in 'n'
        // represents a power-of-two number, like 1,2,4,8 ... We know how to
        // generate numbers to the power of an even number by squaring the
        // number log2 times. So, we just multiply all of the numbers together
        // to get the result.
        // Each squaring doubles the relative error, so the error grows with
        // the size of 'n'.
        let bits = n.magnitude();
        let wp = working_precision(precision) + bits.bits() as usize;
        let mut val = self.cast(wp);
        let mut elem = Self::one(wp);
        for i in 0..bits.bits() {
            if bits.bit(i) {
                elem = elem.mul(&val);
            }
            if i + 1 < bits.bits() {
                val = val.mul(&val);
            }
        }

        if n.is_negative() {
            elem = Self::one(wp).div(&elem)?;
        }
        Ok(elem.cast(precision))
    }

    /// Calculates the power of two.
    pub fn sqr(&self) -> Self {
        self.mul(self)
    }

    /// Computes self^y. Zero raised to a negative power is an invalid
    /// operation, and zero to the power of zero is one.
    pub fn pow(&self, y: &Self) -> Result<Self, Error> {
        self.pow_with(y, Constants::global())
    }

    /// Computes self^y, using the constants in `constants`.
    pub fn pow_with(&self, y: &Self, constants: &Constants) -> Result<Self, Error> {
        let precision = self.precision().min(y.precision());
        if y.is_zero() {
            return Ok(Self::one(precision));
        }
        if self.is_zero() {
            if y.is_negative() {
                return Err(Error::InvalidOperation(
                    "zero raised to a negative power",
                ));
            }
            return Ok(self.cast(precision));
        }

        if y.is_integer() {
            let n = y.to_integer()?;
            return Ok(self.powi(n)?.cast(precision));
        }

        if self.is_negative() {
            return Err(Error::InvalidOperation(
                "negative base with a non-integer exponent",
            ));
        }

        // exp(y * log(x)) loses as many bits as the magnitude of the
        // exponent, so compute the product with extra bits.
        let log_bits = self.magnitude().bits() as usize + 1;
        let extra = y.magnitude().to_usize().unwrap_or(0) + log_bits;
        let wp = working_precision(precision) + extra;
        let log = self.cast(wp).log_with(constants)?;
        let product = log.mul(&y.cast(wp));
        Ok(product.exp_with(constants)?.cast(precision))
    }

    /// Calculates the square root of the number.
    pub fn sqrt(&self) -> Result<Self, Error> {
        if self.is_negative() {
            return Err(Error::InvalidOperation(
                "square root of a negative number",
            ));
        }
        if self.is_zero() {
            return Ok(self.clone());
        }

        let precision = self.precision();
        let wp = working_precision(precision);
        let target = self.cast(wp);

        // Start at 2^ceil(magnitude/2), which is not smaller than the root.
        let half = (self.magnitude() + BigInt::one()).div_floor(&BigInt::from(2));
        let mut x = Self::normalized(BigInt::one(), half, wp);

        // Use the Newton Raphson method. The iterates decrease toward the
        // root. Stop when the value did not change or regressed.
        let limit = iteration_limit(wp);
        for i in 0..limit {
            let next = x.add(&target.div(&x)?).scale(-1);
            if next.compare(&x) != Ordering::Less {
                tracing::trace!(routine = "sqrt", iterations = i, "converged");
                return Ok(smaller(x, next).cast(precision));
            }
            x = next;
        }
        Err(convergence_failure("sqrt", limit))
    }

    /// Calculates the n-th root of the number. Negative numbers have roots
    /// only for odd `n`.
    pub fn root(&self, n: u64) -> Result<Self, Error> {
        match n {
            0 => return Err(Error::InvalidOperation("zeroth root")),
            1 => return Ok(self.clone()),
            _ => {}
        }
        if self.is_zero() {
            return Ok(self.clone());
        }
        if self.is_negative() {
            if n % 2 == 0 {
                return Err(Error::InvalidOperation(
                    "even root of a negative number",
                ));
            }
            return Ok(self.neg().root(n)?.neg());
        }

        let precision = self.precision();
        let wp = working_precision(precision);
        let target = self.cast(wp);
        let order = integer(n, wp);
        let order_minus_one = integer(n - 1, wp);

        // Start at 2^ceil(magnitude/n), which is not smaller than the root.
        let big_n = BigInt::from(n);
        let start = (self.magnitude() + &big_n - BigInt::one()).div_floor(&big_n);
        let mut x = Self::normalized(BigInt::one(), start, wp);

        // Newton's method: x = ((n-1) * x + target / x^(n-1)) / n.
        // Far from the root each step shrinks x by about 1/n, so the bound
        // grows with n.
        let limit = iteration_limit(wp).saturating_add(2 * n as usize);
        for i in 0..limit {
            let quotient = target.div(&x.powi(n - 1)?)?;
            let next = order_minus_one.mul(&x).add(&quotient).div(&order)?;
            if next.compare(&x) != Ordering::Less {
                tracing::trace!(routine = "root", iterations = i, "converged");
                return Ok(smaller(x, next).cast(precision));
            }
            x = next;
        }
        Err(convergence_failure("root", limit))
    }
}

#[test]
fn test_sqrt_two() {
    let two = Real::from_i64(2, 64).unwrap();
    let root = two.sqrt().unwrap();
    assert_eq!(root.precision(), 64);
    assert!(root.sqr() == two);
    assert!((root.to_f64() - std::f64::consts::SQRT_2).abs() < 1e-15);
}

#[test]
fn test_sqrt() {
    for val in [0.25, 1., 4., 9., 1e10, 1e-10, 3.3, 1234567.8, 1e200] {
        let x = Real::from_f64(val, 128).unwrap();
        let root = x.sqrt().unwrap();
        let expected = val.sqrt();
        assert!(((root.to_f64() - expected) / expected).abs() < 1e-15);
        assert!(root.sqr().with_precision(120).unwrap() == x.with_precision(120).unwrap());
    }

    // Perfect squares are exact.
    let x = Real::from_i64(144, 32).unwrap();
    assert!(x.sqrt().unwrap() == Real::from_i64(12, 32).unwrap());

    let zero = Real::new(0, 0, 32).unwrap();
    assert!(zero.sqrt().unwrap().is_zero());
    assert_eq!(
        Real::from_i64(-4, 32).unwrap().sqrt().unwrap_err(),
        Error::InvalidOperation("square root of a negative number")
    );
}

#[test]
fn test_powi() {
    let x = Real::from_i64(3, 64).unwrap();
    assert!(x.powi(0).unwrap().is_identical(&Real::from_i64(1, 64).unwrap()));
    assert!(x.powi(1).unwrap() == x);
    assert!(x.powi(5).unwrap() == Real::from_i64(243, 64).unwrap());
    assert!(x.powi(40).unwrap() == Real::from_u64(12157665459056928801, 64).unwrap());

    let inv = x.powi(-2).unwrap();
    let ninth = (&Real::from_i64(1, 64).unwrap() / &Real::from_i64(9, 64).unwrap()).unwrap();
    assert!(inv == ninth);

    let half = Real::new(1, -1, 16).unwrap();
    assert!(half.powi(-10).unwrap() == Real::from_i64(1024, 16).unwrap());
    assert!(half.powi(BigInt::from(100)).unwrap() == Real::new(1, -100, 16).unwrap());

    // Large powers keep the precision of the result.
    let n = BigInt::from(1) << 40usize;
    let big = x.powi(n.clone()).unwrap();
    let small = x.powi(-n).unwrap();
    let one = Real::from_i64(1, 60).unwrap();
    assert!((&big * &small).with_precision(60).unwrap() == one);

    let zero = Real::new(0, 0, 8).unwrap();
    assert!(zero.powi(3).unwrap().is_zero());
    assert!(zero.powi(-3).is_err());
}

#[test]
fn test_pow() {
    let p = 128;
    let two = Real::from_i64(2, p).unwrap();
    let zero = Real::new(0, 0, p).unwrap();

    // Special cases.
    assert!(two.pow(&zero).unwrap().is_identical(&Real::from_i64(1, p).unwrap()));
    assert!(zero.pow(&two).unwrap().is_zero());
    assert_eq!(
        zero.pow(&two.neg()).unwrap_err(),
        Error::InvalidOperation("zero raised to a negative power")
    );
    assert!(zero.pow(&zero).unwrap().is_identical(&Real::from_i64(1, p).unwrap()));
    assert!(two.pow(&Real::from_i64(10, p).unwrap()).unwrap() == Real::from_i64(1024, p).unwrap());
    assert!(two.neg().pow(&Real::from_i64(3, p).unwrap()).unwrap() == Real::from_i64(-8, p).unwrap());
    assert_eq!(
        two.neg().pow(&Real::from_f64(0.5, p).unwrap()).unwrap_err(),
        Error::InvalidOperation("negative base with a non-integer exponent")
    );

    // Fractional powers.
    let sqrt2 = two.pow(&Real::from_f64(0.5, p).unwrap()).unwrap();
    assert!(sqrt2.with_precision(120).unwrap() == two.sqrt().unwrap().with_precision(120).unwrap());

    for (base, exponent) in [(2.5, 1.5), (10., -0.3), (0.7, 12.25), (123.4, 0.01)] {
        let b = Real::from_f64(base, p).unwrap();
        let e = Real::from_f64(exponent, p).unwrap();
        let res = b.pow(&e).unwrap().to_f64();
        let expected = f64::powf(base, exponent);
        assert!(((res - expected) / expected).abs() < 1e-14, "{} {}", base, exponent);
    }
}

#[test]
fn test_root() {
    let p = 128;
    let x = Real::from_i64(27, p).unwrap();
    assert!(x.root(3).unwrap() == Real::from_i64(3, p).unwrap());
    let x = Real::from_i64(-32, p).unwrap();
    assert!(x.root(5).unwrap() == Real::from_i64(-2, p).unwrap());
    assert!(x.root(4).is_err());
    assert!(x.root(0).is_err());
    assert!(x.root(1).unwrap().is_identical(&x));

    for n in [2, 3, 7, 20] {
        for val in [2., 0.001, 1e50] {
            let x = Real::from_f64(val, p).unwrap();
            let root = x.root(n).unwrap();
            let expected = f64::powf(val, 1. / n as f64);
            assert!(((root.to_f64() - expected) / expected).abs() < 1e-14);
            let back = root.powi(n).unwrap();
            assert!(back.with_precision(112).unwrap() == x.with_precision(112).unwrap());
        }
    }
}
