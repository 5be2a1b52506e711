//! This module contains the implementation of the trigonometric functions.

use super::{
    convergence_failure, integer, is_negligible, iteration_limit,
    working_precision, Constants,
};
use crate::error::Error;
use crate::real::Real;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{ToPrimitive, Zero};

/// sin(x) = x - x^3 / 3! + x^5 / 5! - x^7/7! ....
fn sin_series(x: &Real, precision: usize) -> Result<Real, Error> {
    let x2 = x.sqr();
    let mut term = x.cast(precision);
    let mut sum = term.clone();
    let limit = iteration_limit(precision);
    for i in 1..limit {
        // Prepare the next element.
        let bottom = integer((2 * i) * (2 * i + 1), precision);
        term = term.mul(&x2).div(&bottom)?.neg();
        if is_negligible(&term, &sum, precision) {
            tracing::trace!(routine = "sin", iterations = i, "converged");
            return Ok(sum);
        }
        sum = sum.add(&term);
    }
    Err(convergence_failure("sin", limit))
}

/// cos(x) = 1 - x^2 / 2! + x^4 / 4! - x^6/6! ....
fn cos_series(x: &Real, precision: usize) -> Result<Real, Error> {
    let x2 = x.sqr();
    let mut term = Real::one(precision);
    let mut sum = term.clone();
    let limit = iteration_limit(precision);
    for i in 1..limit {
        let bottom = integer((2 * i - 1) * (2 * i), precision);
        term = term.mul(&x2).div(&bottom)?.neg();
        if is_negligible(&term, &sum, precision) {
            tracing::trace!(routine = "cos", iterations = i, "converged");
            return Ok(sum);
        }
        sum = sum.add(&term);
    }
    Err(convergence_failure("cos", limit))
}

/// Reduce `x` to the range [-pi/4, pi/4] with the identity
/// x = r + q * pi/2. Returns r and q mod 4.
fn reduce(
    x: &Real,
    precision: usize,
    constants: &Constants,
) -> Result<(Real, u8), Error> {
    // The quotient needs all of the integer bits of x / (pi/2).
    let integer_bits = x
        .magnitude()
        .max(BigInt::zero())
        .to_usize()
        .ok_or_else(|| {
            Error::Unsupported("argument too large for range reduction".to_string())
        })?;
    let quotient_bits = precision + integer_bits;
    let half_pi = constants.pi(quotient_bits)?.scale(-1);
    let q = x.cast(quotient_bits).div(&half_pi)?.round().to_integer()?;
    if q.is_zero() {
        return Ok((x.cast(precision), 0));
    }
    let quadrant = q.mod_floor(&BigInt::from(4)).to_u8().unwrap_or(0);

    // The subtraction cancels the leading bits of x when x is close to a
    // multiple of pi/2. The error of q * pi/2 is below 2^(bits(q) + 2 - wide),
    // so repeat with more bits of pi until r has `precision` correct bits.
    let mut wide = precision + q.bits() as usize;
    let limit = iteration_limit(precision);
    for _ in 0..limit {
        let half_pi = constants.pi(wide)?.scale(-1);
        let r = x.cast(wide).sub(&half_pi.mul(&integer(q.clone(), wide)));
        let needed = if r.is_zero() {
            2 * wide
        } else {
            let bits = BigInt::from(precision + q.bits() as usize + 3);
            (bits - r.magnitude()).to_usize().unwrap_or(2 * wide)
        };
        if needed <= wide {
            return Ok((r.cast(precision), quadrant));
        }
        tracing::trace!(wide, needed, "range reduction lost bits");
        wide = needed;
    }
    Err(convergence_failure("reduce", limit))
}

/// Computes sin(x) with `precision` bits, without adding guard bits.
fn sin_at(x: &Real, precision: usize, constants: &Constants) -> Result<Real, Error> {
    let (r, quadrant) = reduce(x, precision, constants)?;
    Ok(match quadrant {
        0 => sin_series(&r, precision)?,
        1 => cos_series(&r, precision)?,
        2 => sin_series(&r, precision)?.neg(),
        _ => cos_series(&r, precision)?.neg(),
    })
}

/// Computes cos(x) with `precision` bits, without adding guard bits.
fn cos_at(x: &Real, precision: usize, constants: &Constants) -> Result<Real, Error> {
    let (r, quadrant) = reduce(x, precision, constants)?;
    Ok(match quadrant {
        0 => cos_series(&r, precision)?,
        1 => sin_series(&r, precision)?.neg(),
        2 => cos_series(&r, precision)?.neg(),
        _ => sin_series(&r, precision)?,
    })
}

impl Real {
    /// Computes the sine of the number (in radians).
    pub fn sin(&self) -> Result<Self, Error> {
        self.sin_with(Constants::global())
    }

    /// Computes the sine of the number (in radians), using the constants in
    /// `constants`.
    pub fn sin_with(&self, constants: &Constants) -> Result<Self, Error> {
        if self.is_zero() {
            return Ok(self.clone());
        }
        let wp = working_precision(self.precision());
        Ok(sin_at(self, wp, constants)?.cast(self.precision()))
    }

    /// Computes the cosine of the number (in radians).
    pub fn cos(&self) -> Result<Self, Error> {
        self.cos_with(Constants::global())
    }

    /// Computes the cosine of the number (in radians), using the constants in
    /// `constants`.
    pub fn cos_with(&self, constants: &Constants) -> Result<Self, Error> {
        if self.is_zero() {
            return Ok(Self::one(self.precision()));
        }
        let wp = working_precision(self.precision());
        Ok(cos_at(self, wp, constants)?.cast(self.precision()))
    }

    /// Computes the tangent of the number (in radians).
    pub fn tan(&self) -> Result<Self, Error> {
        self.tan_with(Constants::global())
    }

    /// Computes the tangent of the number (in radians), using the constants
    /// in `constants`.
    pub fn tan_with(&self, constants: &Constants) -> Result<Self, Error> {
        if self.is_zero() {
            return Ok(self.clone());
        }
        let wp = working_precision(self.precision());
        let sin = sin_at(self, wp, constants)?;
        let cos = cos_at(self, wp, constants)?;
        Ok(sin.div(&cos)?.cast(self.precision()))
    }
}

#[cfg(test)]
fn assert_close(val: &Real, expected: f64) {
    let res = val.to_f64();
    assert!((res - expected).abs() < 1e-15, "{} vs {}", res, expected);
}

#[test]
fn test_sin_cos() {
    for x in [
        -10., -3.5, -1., -0.1, 1e-10, 0.3, 0.785, 1., 1.5707, 2., 3.14159,
        4., 5.5, 6.28, 10., 100., 1000.25,
    ] {
        let val = Real::from_f64(x, 128).unwrap();
        assert_close(&val.sin().unwrap(), x.sin());
        assert_close(&val.cos().unwrap(), x.cos());
    }

    let zero = Real::new(0, 0, 64).unwrap();
    assert!(zero.sin().unwrap().is_zero());
    assert!(zero.cos().unwrap().is_identical(&Real::one(64)));
}

#[test]
fn test_tan() {
    for x in [-1.2, -0.5, 0.1, 0.7, 1., 1.5, 3., 20.] {
        let val = Real::from_f64(x, 128).unwrap();
        let res = val.tan().unwrap().to_f64();
        assert!(((res - x.tan()) / x.tan()).abs() < 1e-14, "{}", x);
    }
}

#[test]
fn test_sin_cos_identity() {
    use crate::utils::Lfsr;

    let mut lfsr = Lfsr::new();
    for precision in [32, 100, 256] {
        let one = Real::one(precision);
        for _ in 0..10 {
            let x = lfsr.get_real(precision, 8).scale(-(precision as i64));
            let sin = x.sin().unwrap();
            let cos = x.cos().unwrap();
            let sum = &sin.sqr() + &cos.sqr();
            let p = precision - 4;
            assert!(sum.with_precision(p).unwrap() == one.with_precision(p).unwrap());
        }
    }
}

#[test]
fn test_sin_near_pi() {
    // sin(pi) is the distance between pi and its truncated value.
    let pi = Constants::global().pi(256).unwrap();
    let sin = pi.sin().unwrap();
    assert!(sin.is_positive());
    assert!(sin.magnitude() < BigInt::from(-240));
    let cos = pi.cos().unwrap();
    assert!(cos == Real::from_i64(-1, 256).unwrap());
}

#[test]
fn test_sin_cos_large_arguments() {
    // The quotient of the reduction has more bits than the argument.
    for precision in [64, 256] {
        let x = Real::from_f64(1e100, precision).unwrap();
        assert_close(&x.sin().unwrap(), 1e100f64.sin());
        assert_close(&x.cos().unwrap(), 1e100f64.cos());
        let tan = x.tan().unwrap().to_f64();
        assert!(((tan - 1e100f64.tan()) / 1e100f64.tan()).abs() < 1e-14);

        let x = Real::from_f64(-3e200, precision).unwrap();
        assert_close(&x.sin().unwrap(), (-3e200f64).sin());
    }

    // The low precision result is the truncation of the precise one.
    let x = Real::new(0x5DEECE66Di64, 4000, 64).unwrap();
    let sin64 = x.sin().unwrap();
    let sin256 = x.with_precision(256).unwrap().sin().unwrap();
    assert!(sin64.with_precision(60).unwrap() == sin256.with_precision(60).unwrap());
}

#[test]
fn test_sin_cos_near_multiples_of_half_pi() {
    // Near a multiple of pi/2 the reduction cancels most of the bits of the
    // argument. Compare with the same argument evaluated with many more bits.
    let constants = Constants::new();
    let pi = constants.pi(256).unwrap();
    for k in [1, 2, 3, 4, 7, 1000] {
        let x = pi.mul(&Real::from_i64(k, 256).unwrap());
        let wide = x.with_precision(2048).unwrap();

        let sin = x.sin_with(&constants).unwrap();
        let expected = wide.sin_with(&constants).unwrap().with_precision(256).unwrap();
        assert!(sin.with_precision(252).unwrap() == expected.with_precision(252).unwrap());

        let half = x.scale(-1);
        let cos = half.cos_with(&constants).unwrap();
        let expected = half
            .with_precision(2048)
            .unwrap()
            .cos_with(&constants)
            .unwrap()
            .with_precision(256)
            .unwrap();
        assert!(cos.with_precision(252).unwrap() == expected.with_precision(252).unwrap());
    }
}
