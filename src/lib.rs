//! Arbitrary-precision binary real numbers.
//!
//! A [`Real`] is the number `coefficient * 2^exponent`, where the coefficient
//! is a big integer with exactly `precision` bits. Operations truncate their
//! results to the precision of the operands, and comparisons tolerate a few
//! units of noise in the last bits. The library implements the basic
//! arithmetic operations, conversions to and from strings, integers and
//! doubles, and the functions log, exp, sqrt, root, pow, sin, cos and tan.
//!
//! ```
//!    use bigreal::Real;
//!
//!    let two = Real::from_i64(2, 128).unwrap();
//!    let root = two.sqrt().unwrap();
//!    assert!(&root * &root == two);
//!    assert!(root.to_string().starts_with("1.41421356237309504880"));
//! ```

mod arithmetic;
mod cast;
mod error;
mod operations;
mod real;
mod string;

#[cfg(test)]
mod utils;

#[cfg(feature = "python")]
mod py;

pub use self::cast::Input;
pub use self::error::{Error, ParseErrorKind};
pub use self::operations::{Constants, EXP_REDUCTION_BITS, LOG_SQRT_STEPS};
pub use self::real::{Real, DEFAULT_PRECISION, EPSILON, GUARD_BITS};
pub use self::string::PARSE_GUARD_BITS;
