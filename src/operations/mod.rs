//! Contains the implementations of various mathematical functions and
//! constants.

mod constants;
mod exp;
mod functions;
mod trig;

pub use constants::Constants;
pub use exp::{EXP_REDUCTION_BITS, LOG_SQRT_STEPS};

use crate::error::Error;
use crate::real::{Real, GUARD_BITS};
use num_bigint::BigInt;

/// Returns the precision that the functions use internally for computing a
/// result with `precision` bits.
pub(crate) fn working_precision(precision: usize) -> usize {
    let bits = (usize::BITS - precision.leading_zeros()) as usize;
    precision + GUARD_BITS + bits
}

/// Returns the maximal number of iterations of a loop that computes a value
/// with `precision` bits.
pub(crate) fn iteration_limit(precision: usize) -> usize {
    4 * precision + 64
}

/// Returns true if adding `term` to `sum` can't change the `precision` most
/// significant bits of the sum.
pub(crate) fn is_negligible(term: &Real, sum: &Real, precision: usize) -> bool {
    if term.is_zero() {
        return true;
    }
    !sum.is_zero() && term.magnitude() + BigInt::from(precision) < sum.magnitude()
}

/// Report that the loop in `routine` did not converge.
pub(crate) fn convergence_failure(routine: &'static str, iterations: usize) -> Error {
    tracing::error!(routine, iterations, "iteration limit exceeded");
    Error::Convergence {
        routine,
        iterations,
    }
}

/// Returns the integer `val` as a number with `precision` bits.
pub(crate) fn integer(val: impl Into<BigInt>, precision: usize) -> Real {
    Real::normalized(val.into(), BigInt::from(0), precision)
}

#[test]
fn test_working_precision() {
    assert_eq!(working_precision(1), 1 + GUARD_BITS + 1);
    assert_eq!(working_precision(64), 64 + GUARD_BITS + 7);
    assert_eq!(working_precision(256), 256 + GUARD_BITS + 9);
}

#[test]
fn test_is_negligible() {
    let sum = Real::new(1, 0, 64).unwrap();
    assert!(is_negligible(&Real::new(0, 0, 64).unwrap(), &sum, 64));
    assert!(is_negligible(&Real::new(1, -70, 64).unwrap(), &sum, 64));
    assert!(!is_negligible(&Real::new(1, -10, 64).unwrap(), &sum, 64));
    // Nothing is negligible compared to zero.
    let zero = Real::new(0, 0, 64).unwrap();
    assert!(!is_negligible(&sum, &zero, 64));
}
