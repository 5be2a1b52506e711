//! This module contains the implementation of log- and exp-related methods.

use super::{
    convergence_failure, integer, is_negligible, iteration_limit,
    working_precision, Constants,
};
use crate::error::Error;
use crate::real::Real;
use num_bigint::BigInt;
use num_traits::{ToPrimitive, Zero};

/// The maximal number of square roots that shrink the argument of the log
/// series. Each root costs one bit of precision and halves the argument.
pub const LOG_SQRT_STEPS: usize = 6;

/// The exp series is evaluated for arguments below 2^-EXP_REDUCTION_BITS.
pub const EXP_REDUCTION_BITS: i64 = 8;

/// Computes the series ln(1+u) = u - u^2/2 + u^3/3 - u^4/4 ...
/// which converges fast for small u.
fn log_series(u: &Real, precision: usize) -> Result<Real, Error> {
    let mut power = u.cast(precision);
    let mut sum = Real::zero(precision);
    let limit = iteration_limit(precision);
    for k in 1..limit {
        let term = power.div(&integer(k, precision))?;
        if is_negligible(&term, &sum, precision) {
            tracing::trace!(routine = "log", iterations = k, "converged");
            return Ok(sum);
        }
        sum = if k % 2 == 1 {
            sum.add(&term)
        } else {
            sum.sub(&term)
        };
        // Prepare the next iteration.
        power = power.mul(u);
    }
    Err(convergence_failure("log", limit))
}

/// Computes the taylor series:
/// exp(x) = 1 + x/1! + x^2/2! + x^3/3! ...
fn exp_series(x: &Real, precision: usize) -> Result<Real, Error> {
    let mut term = Real::one(precision);
    let mut sum = Real::one(precision);
    let limit = iteration_limit(precision);
    for k in 1..limit {
        term = term.mul(x).div(&integer(k, precision))?;
        if is_negligible(&term, &sum, precision) {
            tracing::trace!(routine = "exp", iterations = k, "converged");
            return Ok(sum);
        }
        sum = sum.add(&term);
    }
    Err(convergence_failure("exp", limit))
}

/// Computes the natural logarithm of the positive number `x` with
/// `precision` bits, without adding guard bits.
pub(crate) fn log_at(
    x: &Real,
    precision: usize,
    constants: &Constants,
) -> Result<Real, Error> {
    debug_assert!(x.is_positive());

    // Split x into m * 2^q, where m is in the range [1, 2).
    let mut q = x.magnitude() - BigInt::from(1);
    let top = -BigInt::from(x.bit_length() - 1);
    let mut m = Real::normalized(x.coefficient().clone(), top, precision);

    // Move m into [3/4, 3/2], which is centered around 1.
    if m > Real::new(3, -1, precision)? {
        m = m.scale(-1);
        q += BigInt::from(1);
    }

    // Reduce the range with the identity: ln(x) = 2 * ln(sqrt(x)). The
    // subtraction is exact, so arguments that are already close to one are
    // left alone.
    let one = Real::one(precision);
    let mut u = m.sub(&one);
    let mut steps = 0;
    let threshold = -BigInt::from(LOG_SQRT_STEPS);
    while steps < LOG_SQRT_STEPS && !u.is_zero() && u.magnitude() > threshold {
        m = m.sqrt()?;
        u = m.sub(&one);
        steps += 1;
    }
    let log_m = log_series(&u, precision)?.scale(steps as i64);

    if q.is_zero() {
        return Ok(log_m);
    }

    // ln(x) = ln(m) + q * ln(2). The product needs the bits of q on top of
    // the precision of the result.
    let wide = precision + q.bits() as usize;
    let ln2 = constants.ln2(wide)?;
    let scaled = ln2.mul(&Real::normalized(q, BigInt::zero(), wide));
    Ok(log_m.add(&scaled))
}

/// Computes exp(x) with `precision` bits, without adding guard bits.
pub(crate) fn exp_at(
    x: &Real,
    precision: usize,
    constants: &Constants,
) -> Result<Real, Error> {
    if x.is_zero() {
        return Ok(Real::one(precision));
    }

    // Reduce the range with the identity: exp(x) = 2^n * exp(x - n*ln(2)),
    // where n is the integer that is nearest to x/ln(2).
    let ln2 = constants.ln2(precision)?;
    let n = x.cast(precision).div(&ln2)?.round().to_integer()?;
    let wide = precision + n.bits() as usize;
    let ln2 = constants.ln2(wide)?;
    let offset = ln2.mul(&Real::normalized(n.clone(), BigInt::zero(), wide));
    let r = x.cast(wide).sub(&offset);

    // Reduce further with the identity: exp(x) = exp(x/2^k)^(2^k). Each
    // squaring doubles the relative error, so the series gets k extra bits.
    let k = (r.magnitude() + BigInt::from(EXP_REDUCTION_BITS))
        .to_i64()
        .unwrap_or(0)
        .max(0);
    let series_precision = precision + k as usize;
    let r = r.scale(-k).cast(series_precision);
    let mut sum = exp_series(&r, series_precision)?;
    for _ in 0..k {
        sum = sum.sqr();
    }

    let exponent = sum.exponent() + n;
    Ok(Real::normalized(sum.coefficient().clone(), exponent, precision))
}

impl Real {
    /// Computes the natural logarithm of the number.
    pub fn log(&self) -> Result<Self, Error> {
        self.log_with(Constants::global())
    }

    /// Computes the natural logarithm of the number, using the constants in
    /// `constants`.
    pub fn log_with(&self, constants: &Constants) -> Result<Self, Error> {
        if !self.is_positive() {
            return Err(Error::InvalidOperation(
                "logarithm of a non-positive number",
            ));
        }
        let precision = self.precision();
        let wp = working_precision(precision);
        Ok(log_at(self, wp, constants)?.cast(precision))
    }

    /// Computes the base-2 logarithm of the number.
    pub fn log2(&self) -> Result<Self, Error> {
        self.log2_with(Constants::global())
    }

    /// Computes the base-2 logarithm of the number, using the constants in
    /// `constants`.
    pub fn log2_with(&self, constants: &Constants) -> Result<Self, Error> {
        self.log_base(constants.ln2(working_precision(self.precision()))?, constants)
    }

    /// Computes the base-10 logarithm of the number.
    pub fn log10(&self) -> Result<Self, Error> {
        self.log10_with(Constants::global())
    }

    /// Computes the base-10 logarithm of the number, using the constants in
    /// `constants`.
    pub fn log10_with(&self, constants: &Constants) -> Result<Self, Error> {
        self.log_base(constants.ln10(working_precision(self.precision()))?, constants)
    }

    /// Computes log(x) / log(base), given the natural log of the base.
    fn log_base(&self, log_of_base: Real, constants: &Constants) -> Result<Self, Error> {
        if !self.is_positive() {
            return Err(Error::InvalidOperation(
                "logarithm of a non-positive number",
            ));
        }
        let precision = self.precision();
        let wp = log_of_base.precision();
        let log = log_at(self, wp, constants)?;
        Ok(log.div(&log_of_base)?.cast(precision))
    }

    /// Computes e^x.
    pub fn exp(&self) -> Result<Self, Error> {
        self.exp_with(Constants::global())
    }

    /// Computes e^x, using the constants in `constants`.
    pub fn exp_with(&self, constants: &Constants) -> Result<Self, Error> {
        let precision = self.precision();
        let wp = working_precision(precision);
        Ok(exp_at(self, wp, constants)?.cast(precision))
    }
}

#[cfg(test)]
fn assert_close(val: &Real, expected: f64) {
    let res = val.to_f64();
    let err = if expected == 0. {
        res.abs()
    } else {
        ((res - expected) / expected).abs()
    };
    assert!(err < 1e-15, "{} vs {}", res, expected);
}

#[test]
fn test_log() {
    let x = Real::from_f64(0.1, 128).unwrap().log().unwrap();
    assert_close(&x, -2.3025850929940455);

    for x in [
        0.1, 0.5, 0.75, 1.4, 2.3, 4.5, 9.8, 11.2, 15.2, 91.2, 102.2, 192.4,
        1024.2, 90210.2, 1e-300, 1e300,
    ] {
        let res = Real::from_f64(x, 128).unwrap().log().unwrap();
        assert_close(&res, x.ln());
    }

    let one = Real::from_i64(1, 64).unwrap();
    assert!(one.log().unwrap().is_zero());

    let zero = Real::new(0, 0, 64).unwrap();
    assert_eq!(
        zero.log().unwrap_err(),
        Error::InvalidOperation("logarithm of a non-positive number")
    );
    assert!(one.neg().log().is_err());
}

#[test]
fn test_log2_log10() {
    for x in [0.3, 2., 8., 1000., 12345.678] {
        let val = Real::from_f64(x, 128).unwrap();
        assert_close(&val.log2().unwrap(), x.log2());
        assert_close(&val.log10().unwrap(), x.log10());
    }
    let x = Real::from_i64(1024, 128).unwrap();
    assert!(x.log2().unwrap() == Real::from_i64(10, 128).unwrap());
    let x = Real::parse("1e50", 256).unwrap();
    assert!(x.log10().unwrap() == Real::from_i64(50, 256).unwrap());
}

#[test]
fn test_exp() {
    assert!(Real::new(0, 0, 32).unwrap().exp().unwrap().is_identical(&Real::one(32)));

    for x in [
        -700., -20.5, -1., -0.001, 1e-20, 0.5, 1., 2.3, 10., 100.5, 700.,
    ] {
        let res = Real::from_f64(x, 128).unwrap().exp().unwrap();
        assert_close(&res, x.exp());
    }

    // Results that are out of the range of double.
    let x = Real::from_i64(100000, 128).unwrap().exp().unwrap();
    let y = Real::from_i64(-100000, 128).unwrap().exp().unwrap();
    let one = Real::from_i64(1, 120).unwrap();
    assert!((&x * &y).with_precision(120).unwrap() == one);
}

#[test]
fn test_exp_log_identity() {
    use crate::utils::Lfsr;

    let mut lfsr = Lfsr::new();
    for precision in [16, 64, 200] {
        for _ in 0..10 {
            let x = lfsr.get_real(precision, 40).abs();
            let res = x.log().unwrap().exp().unwrap();
            // The log throws away the bits of the magnitude.
            let p = precision - 12;
            assert!(res.with_precision(p).unwrap() == x.with_precision(p).unwrap());
        }
    }
}

#[test]
fn test_series_divergence() {
    // The log series diverges outside of the unit interval, and the loop
    // gives up after the iteration limit.
    let u = Real::from_i64(3, 64).unwrap();
    let err = log_series(&u, 64).unwrap_err();
    assert!(err.is_convergence_failure());
    assert_eq!(
        err,
        Error::Convergence {
            routine: "log",
            iterations: iteration_limit(64),
        }
    );
}
