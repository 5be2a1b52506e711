//! This module contains the error type that is returned by the fallible
//! operations of the library.

use thiserror::Error;

/// Describes why a decimal string could not be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("the input provided was empty")]
    InputEmpty,
    #[error("the number has no digits")]
    MissingDigits,
    #[error("unexpected character {0:?} in number")]
    InvalidDigit(char),
    #[error("the number has more than one sign")]
    MultipleSigns,
    #[error("failed parsing the exponent of the number")]
    ExponentParseFailed,
}

/// The errors reported by the library.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// The precision of a number must be at least one bit.
    #[error("precision must be a positive number of bits")]
    InvalidPrecision,

    /// NaN and infinities have no finite binary representation.
    #[error("cannot construct a real from the non-finite value {0}")]
    NonFinite(f64),

    #[error("failed parsing real number: {0}")]
    Parse(#[from] ParseErrorKind),

    /// Division by zero, logarithm of a negative number, etc.
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),

    #[error("unsupported operation: {0}")]
    Unsupported(String),

    /// An iterative method ran out of iterations before reaching the
    /// requested accuracy. This is a bug in the library, not a user error.
    #[error("{routine} did not converge after {iterations} iterations")]
    Convergence {
        routine: &'static str,
        iterations: usize,
    },
}

impl Error {
    /// Returns true if this error reports an internal convergence failure.
    pub fn is_convergence_failure(&self) -> bool {
        matches!(self, Error::Convergence { .. })
    }
}

#[test]
fn test_error_messages() {
    use std::string::ToString;

    let err = Error::from(ParseErrorKind::InvalidDigit('x'));
    assert_eq!(
        err.to_string(),
        "failed parsing real number: unexpected character 'x' in number"
    );
    assert_eq!(
        Error::InvalidOperation("division by zero").to_string(),
        "invalid operation: division by zero"
    );

    let err = Error::Convergence {
        routine: "sqrt",
        iterations: 12,
    };
    assert!(err.is_convergence_failure());
    assert_eq!(err.to_string(), "sqrt did not converge after 12 iterations");
}
