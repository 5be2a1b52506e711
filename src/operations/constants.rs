//! This module contains the implementation of methods that compute mathematical
//! constants, and the caches that keep them.
//!
use super::{
    convergence_failure, integer, is_negligible, iteration_limit,
    working_precision,
};
use crate::error::Error;
use crate::real::Real;
use once_cell::sync::Lazy;
use parking_lot::RwLock;

/// Keeps the most precise value of a constant that was computed so far.
#[derive(Debug)]
struct Cache {
    name: &'static str,
    value: RwLock<Option<Real>>,
}

impl Cache {
    fn new(name: &'static str) -> Self {
        Cache {
            name,
            value: RwLock::new(None),
        }
    }

    /// Returns the constant with `precision` bits. Requests that are covered
    /// by the cached value truncate it. Other requests call `compute`, and
    /// the cache keeps the new value if it is still the most precise one.
    fn get(
        &self,
        precision: usize,
        compute: impl FnOnce(usize) -> Result<Real, Error>,
    ) -> Result<Real, Error> {
        if precision == 0 {
            return Err(Error::InvalidPrecision);
        }

        let previous = {
            let guard = self.value.read();
            match guard.as_ref() {
                Some(val) if val.precision() >= precision => {
                    return Ok(val.cast(precision));
                }
                Some(val) => Some(val.precision()),
                None => None,
            }
        };

        // Compute without holding the lock. Computing one constant may need
        // the value of another one.
        let val = compute(precision)?;
        tracing::debug!(
            constant = self.name,
            precision,
            previous,
            "computed constant"
        );

        let mut guard = self.value.write();
        if guard.as_ref().map_or(true, |v| v.precision() < precision) {
            *guard = Some(val.clone());
        }
        Ok(val)
    }

    /// Returns the precision of the cached value.
    fn precision(&self) -> Option<usize> {
        self.value.read().as_ref().map(Real::precision)
    }
}

/// Computes and caches the constants pi, e, ln(2) and ln(10). The functions
/// that need a constant get it from an instance of this struct. The
/// `*_with` variants of the functions take an explicit instance, and the
/// other functions use the process-wide instance that is returned by
/// [`Constants::global`].
///
/// # Examples
///
/// ```
///    use bigreal::Constants;
///
///    let constants = Constants::new();
///    let pi = constants.pi(128).unwrap();
///    assert!(pi.to_string().starts_with("3.14159265358979323846"));
/// ```
#[derive(Debug)]
pub struct Constants {
    pi: Cache,
    e: Cache,
    ln2: Cache,
    ln10: Cache,
}

impl Default for Constants {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: Lazy<Constants> = Lazy::new(Constants::new);

impl Constants {
    /// Create a new set of empty caches.
    pub fn new() -> Self {
        Constants {
            pi: Cache::new("pi"),
            e: Cache::new("e"),
            ln2: Cache::new("ln2"),
            ln10: Cache::new("ln10"),
        }
    }

    /// Returns the process-wide instance.
    pub fn global() -> &'static Constants {
        &GLOBAL
    }

    /// Returns pi with `precision` bits.
    pub fn pi(&self, precision: usize) -> Result<Real, Error> {
        self.pi.get(precision, compute_pi)
    }

    /// Returns e with `precision` bits.
    pub fn e(&self, precision: usize) -> Result<Real, Error> {
        self.e.get(precision, |p| Real::one(p).exp_with(self))
    }

    /// Returns ln(2) with `precision` bits.
    pub fn ln2(&self, precision: usize) -> Result<Real, Error> {
        self.ln2.get(precision, compute_ln2)
    }

    /// Returns ln(10) with `precision` bits.
    pub fn ln10(&self, precision: usize) -> Result<Real, Error> {
        self.ln10.get(precision, |p| integer(10, p).log_with(self))
    }

    /// Returns the precision of the cached values of pi, e, ln(2) and
    /// ln(10), or None for constants that were not computed yet.
    pub fn cached_precision(&self) -> [Option<usize>; 4] {
        [
            self.pi.precision(),
            self.e.precision(),
            self.ln2.precision(),
            self.ln10.precision(),
        ]
    }
}

/// Computes pi.
fn compute_pi(precision: usize) -> Result<Real, Error> {
    // Algorithm description in Pg 246:
    // Fast Multiple-Precision Evaluation of Elementary Functions
    // by Richard P. Brent.

    // Increase the precision, because the arithmetic operations below
    // truncate, so if we want to get the accurate results we need
    // to operate with increased precision.
    let wp = working_precision(precision);

    let one = Real::one(wp);
    let two = integer(2, wp);

    let mut a = one.clone();
    let mut b = one.div(&two.sqrt()?)?;
    let mut t = Real::new(1, -2, wp)?;
    let mut x = one;

    let limit = iteration_limit(wp);
    for i in 0..limit {
        if a == b {
            tracing::trace!(routine = "pi", iterations = i, "converged");
            return Ok(a.sqr().div(&t)?.cast(precision));
        }
        let y = a.clone();
        a = a.add(&b).scale(-1);
        b = b.mul(&y).sqrt()?;
        t = t.sub(&x.mul(&a.sub(&y).sqr()));
        x = x.scale(1);
    }
    Err(convergence_failure("pi", limit))
}

/// Compute log(2).
fn compute_ln2(precision: usize) -> Result<Real, Error> {
    let wp = working_precision(precision);

    // Represent log(2) using the sum 1/k*2^k
    let one = Real::one(wp);
    let mut sum = Real::zero(wp);
    let limit = iteration_limit(wp);
    for k in 1..limit {
        let term = one.div(&integer(k, wp))?.scale(-(k as i64));
        if is_negligible(&term, &sum, wp) {
            tracing::trace!(routine = "ln2", iterations = k, "converged");
            return Ok(sum.cast(precision));
        }
        sum = sum.add(&term);
    }
    Err(convergence_failure("ln2", limit))
}

#[cfg(test)]
const PI_DIGITS: &str = "3.14159265358979323846264338327950288419716939937510";
#[cfg(test)]
const E_DIGITS: &str = "2.71828182845904523536028747135266249775724709369995";
#[cfg(test)]
const LN2_DIGITS: &str = "6.93147180559945309417232121458176568075500134360255";
#[cfg(test)]
const LN10_DIGITS: &str = "2.30258509299404568401799145468436420760110148862877";

#[test]
fn test_constants_digits() {
    let constants = Constants::new();
    let p = 256;
    // The last digits can be off because of the truncation.
    let check = |val: Real, digits: &str| {
        let text = val.to_string();
        assert!(text.starts_with(&digits[..45]), "{} vs {}", text, digits);
    };
    check(constants.pi(p).unwrap(), PI_DIGITS);
    check(constants.e(p).unwrap(), E_DIGITS);
    check(constants.ln2(p).unwrap(), LN2_DIGITS);
    check(constants.ln10(p).unwrap(), LN10_DIGITS);
    assert!(constants.ln2(p).unwrap().to_string().ends_with("e-1"));
}

#[test]
fn test_constants_f64() {
    let constants = Constants::new();
    assert_eq!(constants.pi(53).unwrap().to_f64(), std::f64::consts::PI);
    assert_eq!(constants.e(53).unwrap().to_f64(), std::f64::consts::E);
    assert_eq!(constants.ln2(53).unwrap().to_f64(), std::f64::consts::LN_2);
    // The double is rounded up.
    let ln10 = constants.ln10(53).unwrap().to_f64();
    assert!((ln10 - std::f64::consts::LN_10).abs() < 1e-15);
}

#[test]
fn test_constants_cache() {
    let constants = Constants::new();
    assert_eq!(constants.cached_precision(), [None; 4]);

    let pi128 = constants.pi(128).unwrap();
    assert_eq!(constants.cached_precision()[0], Some(128));

    // Lower precision requests truncate the cached value.
    let pi64 = constants.pi(64).unwrap();
    assert!(pi64.is_identical(&pi128.with_precision(64).unwrap()));
    assert_eq!(constants.cached_precision()[0], Some(128));

    // Higher precision requests replace it.
    let pi200 = constants.pi(200).unwrap();
    assert_eq!(constants.cached_precision()[0], Some(200));
    assert!(pi200 == pi128);

    // ln(10) is computed with the log, which needs ln(2).
    constants.ln10(100).unwrap();
    assert!(constants.cached_precision()[2].is_some());

    assert_eq!(constants.e(0).unwrap_err(), Error::InvalidPrecision);
}

#[test]
fn test_constants_shared() {
    use std::sync::Arc;

    let constants = Arc::new(Constants::new());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let constants = Arc::clone(&constants);
            std::thread::spawn(move || constants.pi(64 + 32 * i).unwrap())
        })
        .collect();
    for handle in handles {
        let pi = handle.join().unwrap();
        assert!(pi.to_string().starts_with("3.14159265358979323"));
    }
    assert_eq!(constants.cached_precision()[0], Some(160));
}
