//! This module contains the implementation of string conversion.

use crate::error::{Error, ParseErrorKind};
use crate::operations::{integer, working_precision};
use crate::real::{Real, DEFAULT_PRECISION};
use core::fmt::Display;
use core::str::FromStr;
use num_bigint::{BigInt, BigUint};
use num_traits::{One, ToPrimitive, Zero};

/// Extra bits that are computed when scaling by a power of five or ten,
/// before the result is truncated to the requested precision.
pub const PARSE_GUARD_BITS: usize = 16;

/// log10(2) * 2^64, rounded down.
const LOG10_2_FIXED: i128 = 5553023288523357132;

/// The error of a scaled approximation, in units of its last bit, is below
/// 2^SCALE_ERROR_BITS.
const SCALE_ERROR_BITS: usize = 8;

/// The number of times an approximate scaling is repeated with twice the
/// bits when the result is too close to a truncation boundary.
const WIDENING_STEPS: usize = 4;

/// Scaling with exact integers is used while the integers it builds have at
/// most this many bits.
fn exact_limit(precision: usize) -> u64 {
    4 * precision as u64 + 1024
}

impl Real {
    /// Parse the decimal string `value`, and construct a number with
    /// `precision` bits. The accepted syntax is an optional sign, digits with
    /// an optional decimal point, and an optional exponent, as in "-12.5e-3".
    /// The exponent scales the whole number, so "123.456e2" is 12345.6.
    /// The result is the exact decimal value truncated to `precision` bits.
    pub fn parse(value: &str, precision: usize) -> Result<Self, Error> {
        if precision == 0 {
            return Err(Error::InvalidPrecision);
        }
        let (digits, exp) = parse_decimal(value)?;
        Self::from_decimal(digits, exp, precision)
    }

    /// Convert the decimal number `digits * 10^exp` to binary.
    fn from_decimal(
        digits: BigInt,
        exp: i64,
        precision: usize,
    ) -> Result<Self, Error> {
        if digits.is_zero() {
            return Ok(Self::zero(precision));
        }

        // 5^k has less than 3k bits.
        let k = exp.unsigned_abs();
        let limit = exact_limit(precision + digits.bits() as usize);
        if k.saturating_mul(3) <= limit {
            return Ok(Self::from_decimal_exact(digits, exp, precision));
        }

        // Large exponents are scaled with truncated arithmetic. The exact
        // value is not close to a truncation boundary, so adding bits
        // eventually decides the truncated result.
        let mut wp = working_precision(precision) + PARSE_GUARD_BITS;
        let mut approx = Self::from_decimal_scaled(&digits, exp, wp)?;
        for _ in 1..WIDENING_STEPS {
            if let Some(val) = settle(&approx, precision) {
                return Ok(val);
            }
            wp *= 2;
            approx = Self::from_decimal_scaled(&digits, exp, wp)?;
        }
        Ok(approx.cast(precision))
    }

    /// Convert `digits * 10^exp` to binary with exact integer arithmetic.
    fn from_decimal_exact(digits: BigInt, exp: i64, precision: usize) -> Self {
        // d * 10^e == (d * 5^e) * 2^e, which is exact for positive e.
        if exp >= 0 {
            let coefficient = digits * pow5(exp.unsigned_abs());
            return Self::normalized(coefficient, BigInt::from(exp), precision);
        }

        // For negative e we divide by 5^-e. Shift the dividend so that the
        // quotient is wider than the requested precision.
        let k = exp.unsigned_abs();
        let divisor = pow5(k);
        let wanted = precision + PARSE_GUARD_BITS + divisor.bits() as usize;
        let shift = wanted.saturating_sub(digits.bits() as usize);
        let quotient = (digits << shift) / divisor;
        let exponent = -(BigInt::from(k) + BigInt::from(shift));
        Self::normalized(quotient, exponent, precision)
    }

    /// Computes `digits * 5^exp * 2^exp` with `wp` bits.
    fn from_decimal_scaled(
        digits: &BigInt,
        exp: i64,
        wp: usize,
    ) -> Result<Self, Error> {
        let scale = integer(5, wp).powi(exp)?;
        let value = Self::normalized(digits.clone(), BigInt::from(exp), wp);
        Ok(value.mul(&scale))
    }

    /// Returns the number of decimal digits that are needed for representing
    /// the bits of the coefficient.
    pub fn get_decimal_accuracy(&self) -> usize {
        // Matula, David W. “A Formalization of Floating-Point Numeric Base
        // N = 2 + floor(n / log_b(B)) = 2 + floor(n / log(10, 2))
        // We convert from bits to base-10 digits: log(2)/log(10) ==> 59/196.
        // A continuous fraction of 5 iteration gives the ratio.
        2 + (self.precision() * 59) / 196
    }

    /// Convert the number to a string in scientific notation. The digits are
    /// truncated (not rounded) to the decimal accuracy of the number.
    fn convert_to_string(&self) -> Result<String, Error> {
        if self.is_zero() {
            return Ok("0".to_string());
        }

        let Some(exp) = self.exponent().to_i64() else {
            // There is no practical way to print the decimal digits.
            return Ok(format!("{}*2^{}", self.coefficient(), self.exponent()));
        };

        let (decimal, e10) = to_decimal_digits(
            self.coefficient().magnitude(),
            exp,
            self.get_decimal_accuracy(),
        )?;

        let digits = decimal.to_string();
        let (head, tail) = digits.split_at(1);
        // Correct the exponent to match the position of the decimal point.
        let exp = e10 + tail.len() as i64;
        let tail = tail.trim_end_matches('0');

        let sign = if self.is_negative() { "-" } else { "" };
        Ok(if tail.is_empty() {
            format!("{}{}e{:+}", sign, head, exp)
        } else {
            format!("{}{}.{}e{:+}", sign, head, tail, exp)
        })
    }
}

/// Returns 5^k.
fn pow5(k: u64) -> BigInt {
    num_traits::pow(BigInt::from(5u32), k as usize)
}

/// Returns 10^k.
fn pow10(k: u64) -> BigUint {
    num_traits::pow(BigUint::from(10u32), k as usize)
}

/// Returns floor(mantissa * 2^exp / 10^shift).
fn scaled_integer(mantissa: &BigUint, exp: i64, shift: i64) -> BigUint {
    let mut num = mantissa.clone();
    let mut den = BigUint::one();
    if exp >= 0 {
        num <<= exp as usize;
    } else {
        den <<= exp.unsigned_abs() as usize;
    }
    if shift >= 0 {
        den *= pow10(shift as u64);
    } else {
        num *= pow10(shift.unsigned_abs());
    }
    num / den
}

/// Truncates `approx` to `precision` bits. Returns None when the dropped bits
/// are so close to a multiple of the last kept bit that the error of the
/// approximation could change the truncated result.
fn settle(approx: &Real, precision: usize) -> Option<Real> {
    let dropped = approx.precision().checked_sub(precision)?;
    if dropped <= SCALE_ERROR_BITS + 1 {
        return None;
    }
    let unit = BigUint::one() << dropped;
    let low = approx.coefficient().magnitude() % &unit;
    let margin = BigUint::one() << SCALE_ERROR_BITS;
    if low < margin || &low + &margin >= unit {
        return None;
    }
    Some(approx.cast(precision))
}

/// Returns floor(mantissa * 2^exp / 10^shift) computed with `wp` bits, and
/// whether the value is far enough from an integer for the floor to be
/// exact.
fn approx_scaled_integer(
    mantissa: &BigUint,
    exp: i64,
    shift: i64,
    wp: usize,
) -> Result<(BigUint, bool), Error> {
    let value =
        Real::normalized(BigInt::from(mantissa.clone()), BigInt::from(exp), wp);
    let scaled = value.div(&integer(10, wp).powi(shift)?)?;
    let floor = scaled.floor();
    let fraction = scaled.sub(&floor);
    let rest = Real::one(wp).sub(&fraction);

    // The absolute error is below 2^(magnitude - wp + SCALE_ERROR_BITS).
    let error = scaled.magnitude() - BigInt::from(wp - SCALE_ERROR_BITS);
    let settled = !fraction.is_zero()
        && fraction.magnitude() > error
        && rest.magnitude() > error;
    Ok((floor.to_integer()?.magnitude().clone(), settled))
}

/// Returns floor(mantissa * 2^exp / 10^shift), where the result has about
/// `digit_bits` bits.
fn scaled_digits(
    mantissa: &BigUint,
    exp: i64,
    shift: i64,
    digit_bits: usize,
) -> Result<BigUint, Error> {
    let cost = exp
        .unsigned_abs()
        .saturating_add(shift.unsigned_abs().saturating_mul(4));
    if cost <= exact_limit(mantissa.bits() as usize) {
        return Ok(scaled_integer(mantissa, exp, shift));
    }

    let mut wp = working_precision(digit_bits) + PARSE_GUARD_BITS;
    let mut last = BigUint::zero();
    for _ in 0..WIDENING_STEPS {
        let (val, settled) = approx_scaled_integer(mantissa, exp, shift, wp)?;
        if settled {
            return Ok(val);
        }
        last = val;
        wp *= 2;
    }
    Ok(last)
}

/// Returns an estimate of floor(log10(2^magnitude)), which is off by at most
/// one.
fn leading_digit(magnitude: i128) -> i64 {
    let estimate = (magnitude * LOG10_2_FIXED) >> 64;
    estimate as i64
}

/// Convert the number `mantissa * 2^exp` to the decimal integer `I` with
/// exactly `digits` digits and the decimal exponent `e`, such that
/// `I * 10^e` is the number truncated to `digits` decimal digits.
fn to_decimal_digits(
    mantissa: &BigUint,
    exp: i64,
    digits: usize,
) -> Result<(BigUint, i64), Error> {
    debug_assert!(digits > 0 && !mantissa.is_zero());
    let upper = pow10(digits as u64);
    let lower = pow10(digits as u64 - 1);

    // Estimate the position of the leading decimal digit, and correct the
    // estimate using the scaled digits.
    let magnitude = exp as i128 + mantissa.bits() as i128;
    let mut shift = leading_digit(magnitude) - digits as i64 + 1;

    loop {
        let val = scaled_digits(mantissa, exp, shift, upper.bits() as usize)?;
        if val >= upper {
            shift += 1;
        } else if val < lower {
            shift -= 1;
        } else {
            return Ok((val, shift));
        }
    }
}

/// Parse a decimal number into the integer digits and a base-10 exponent.
fn parse_decimal(value: &str) -> Result<(BigInt, i64), ParseErrorKind> {
    if value.is_empty() {
        return Err(ParseErrorKind::InputEmpty);
    }

    // Handle the plus or minus in front of the number.
    let (negative, body) = if let Some(rest) = value.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = value.strip_prefix('+') {
        (false, rest)
    } else {
        (false, value)
    };
    if body.starts_with(|c: char| c == '-' || c == '+') {
        return Err(ParseErrorKind::MultipleSigns);
    }

    // Split the number to the digits and the exponent.
    let (mantissa, explicit_exp) = match body.find(|c: char| c == 'e' || c == 'E') {
        Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
        None => (body, None),
    };

    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(ParseErrorKind::MissingDigits);
    }
    let all_digits = [int_part, frac_part].concat();
    if let Some(chr) = all_digits.chars().find(|c| !c.is_ascii_digit()) {
        return Err(ParseErrorKind::InvalidDigit(chr));
    }
    let digits = all_digits
        .parse::<BigInt>()
        .map_err(|_| ParseErrorKind::MissingDigits)?;

    // Parse the right side (the exponent expression).
    let exp = match explicit_exp {
        Some(exp) => exp
            .parse::<i64>()
            .map_err(|_| ParseErrorKind::ExponentParseFailed)?,
        None => 0,
    };

    // Move the decimal point to the right of the fractional digits.
    let exp = i64::try_from(frac_part.len())
        .ok()
        .and_then(|len| exp.checked_sub(len))
        .ok_or(ParseErrorKind::ExponentParseFailed)?;

    Ok((if negative { -digits } else { digits }, exp))
}

impl FromStr for Real {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value, DEFAULT_PRECISION)
    }
}

impl TryFrom<&str> for Real {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value, DEFAULT_PRECISION)
    }
}

impl Display for Real {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let text = self.convert_to_string().map_err(|_| core::fmt::Error)?;
        write!(f, "{}", text)
    }
}

#[test]
fn test_convert_to_string() {
    fn to_str(val: f64, precision: usize) -> String {
        Real::from_f64(val, precision).unwrap().to_string()
    }

    assert_eq!("0", to_str(0., 64));
    assert_eq!("0", to_str(-0., 8));
    assert_eq!("1e+0", to_str(1., 64));
    assert_eq!("-2.5e+0", to_str(-2.5, 64));
    assert_eq!("1.25e-1", to_str(0.125, 32));
    assert_eq!("1.024e+3", to_str(1024., 64));
    assert_eq!("4.5e+0", to_str(4.5, 8));
    assert_eq!("2.251799813685248e+15", to_str((1u64 << 51) as f64, 64));

    // Truncated binary fractions print as truncated decimals.
    assert_eq!("1e-1", to_str(0.1, 53));
    let tenth = Real::parse("0.1", 64).unwrap().to_string();
    assert!(tenth.starts_with("9.99999999999999999"), "{}", tenth);
    assert!(tenth.ends_with("e-2"), "{}", tenth);
}

#[test]
fn test_decimal_accuracy() {
    let x = |p: usize| Real::new(1, 0, p).unwrap().get_decimal_accuracy();
    assert_eq!(x(11), 5);
    assert_eq!(x(24), 9);
    assert_eq!(x(53), 17);
    assert_eq!(x(113), 36);
    assert_eq!(x(256), 79);
}

#[test]
fn test_from_string() {
    fn parse(s: &str) -> String {
        Real::parse(s, 64).unwrap().to_string()
    }
    assert_eq!("-3e+0", parse("-3.0"));
    assert_eq!("-3e+0", parse("-3.00"));
    assert_eq!("3e+1", parse("30"));
    assert_eq!("3e+1", parse("+30"));
    assert_eq!("5e-1", parse(".5"));
    assert_eq!("5e+0", parse("5."));
    assert_eq!("3.2e+1", parse("3.2e1"));
    assert_eq!(parse("54e-1"), parse("5.4"));
    assert_eq!("1e+100", Real::parse("1e100", 512).unwrap().to_string());
    assert_eq!("0", parse("-0.000e7"));
    assert_eq!("1.5e+0", parse("15E-1"));
}

#[test]
fn test_parse_errors() {
    use ParseErrorKind::*;

    fn err(s: &str) -> Error {
        Real::parse(s, 64).unwrap_err()
    }
    assert_eq!(err(""), Error::Parse(InputEmpty));
    assert_eq!(err("-"), Error::Parse(MissingDigits));
    assert_eq!(err("."), Error::Parse(MissingDigits));
    assert_eq!(err("e5"), Error::Parse(MissingDigits));
    assert_eq!(err("+-3"), Error::Parse(MultipleSigns));
    assert_eq!(err("--3"), Error::Parse(MultipleSigns));
    assert_eq!(err("abc.de"), Error::Parse(InvalidDigit('a')));
    assert_eq!(err("1.2.3"), Error::Parse(InvalidDigit('.')));
    assert_eq!(err("1-2"), Error::Parse(InvalidDigit('-')));
    assert_eq!(err("1e"), Error::Parse(ExponentParseFailed));
    assert_eq!(err("1e+"), Error::Parse(ExponentParseFailed));
    assert_eq!(err("1e1.5"), Error::Parse(ExponentParseFailed));
    assert_eq!(err("1e99999999999999999999"), Error::Parse(ExponentParseFailed));
    assert_eq!(Real::parse("1", 0).unwrap_err(), Error::InvalidPrecision);
    assert!("nan".parse::<Real>().is_err());
}

#[test]
fn test_parse_scaled_decimal() {
    let x: Real = "123.456e2".parse().unwrap();
    let y: Real = "12345.6".parse().unwrap();
    assert!(x.is_identical(&y));
    let ten = Real::from(10);
    let expected = (&Real::from(123456) / &ten).unwrap();
    assert!(x == expected);

    let x: Real = "123.456e5".parse().unwrap();
    assert!(x.is_identical(&Real::from(12345600)));
    assert!(x == Real::from(12345600));
}

#[test]
fn test_string_round_trip() {
    use crate::utils::Lfsr;

    let mut lfsr = Lfsr::new();
    for precision in [1, 2, 8, 24, 53, 64, 100, 256] {
        for range in [10, 300, 5000] {
            for _ in 0..10 {
                let x = lfsr.get_real(precision, range);
                let text = x.to_string();
                let y = Real::parse(&text, precision).unwrap();
                assert!(x == y, "{} {} {:?} {:?}", precision, text, x, y);
            }
        }
    }

    // Exponents that are too large for exact scaling.
    for precision in [8, 64, 256] {
        for exp in [10_000_000i64, -10_000_000, 1 << 40, -(1 << 40), 1 << 60] {
            let x = lfsr.get_real(precision, 10).scale(exp);
            let text = x.to_string();
            let y = Real::parse(&text, precision).unwrap();
            assert!(x == y, "{} {} {:?} {:?}", precision, text, x, y);
        }
    }

    let zero = Real::new(0, 0, 32).unwrap();
    assert_eq!(zero.to_string(), "0");
    assert!(Real::parse("0", 32).unwrap() == zero);
}

#[test]
fn test_large_decimal_exponents() {
    let x = Real::new(1, 1i64 << 40, 64).unwrap();
    assert_eq!(x.to_string(), "8.05723224506582382563e+330985980541");
    let y = Real::new(-1, -(1i64 << 40), 64).unwrap();
    assert!(y.to_string().starts_with("-1.241120982471854349"), "{}", y);
    assert!(y.to_string().ends_with("e-330985980542"), "{}", y);

    // Parsing scales by the power of ten with truncated arithmetic.
    let big = Real::parse("1e1000000000000", 64).unwrap();
    let small = Real::parse("1e-1000000000000", 64).unwrap();
    let one = Real::one(60);
    assert!((&big * &small).with_precision(60).unwrap() == one);
    let text = big.to_string();
    assert!(text.starts_with("9.9999999999999999"), "{}", text);
    assert!(text.ends_with("e+999999999999"), "{}", text);

    // Scaled parsing agrees with the exact conversion.
    let text = "1.2345678901234567890123e-3000";
    let digits = BigInt::from(12345678901234567890123u128);
    for precision in [16, 64, 200] {
        let exact = Real::from_decimal_exact(digits.clone(), -3022, precision);
        let wp = 4 * precision;
        let scaled = Real::from_decimal_scaled(&digits, -3022, wp).unwrap();
        assert!(scaled.with_precision(precision).unwrap() == exact);
        assert!(Real::parse(text, precision).unwrap().is_identical(&exact));
    }
}
