//! This file contains test helpers.

use crate::Real;

/// Returns list of interesting values that various tests use to catch edge
/// cases.
pub fn get_special_test_values() -> [f64; 16] {
    [
        f64::EPSILON,
        -f64::EPSILON,
        0.000000000000000000000000000000000000001,
        f64::MIN_POSITIVE,
        f64::MAX,
        std::f64::consts::PI,
        std::f64::consts::LN_2,
        std::f64::consts::SQRT_2,
        std::f64::consts::E,
        0.0,
        10.,
        -10.,
        -0.00001,
        0.1,
        355. / 113.,
        -1e300,
    ]
}

// Linear-feedback shift register. We use this as a random number generator for
// tests.
pub struct Lfsr {
    state: u32,
}

impl Lfsr {
    /// Generate a new LFSR number generator.
    pub fn new() -> Lfsr {
        Lfsr { state: 0x13371337 }
    }

    fn next(&mut self) {
        let a = (self.state >> 24) & 1;
        let b = (self.state >> 23) & 1;
        let c = (self.state >> 22) & 1;
        let d = (self.state >> 17) & 1;
        let n = a ^ b ^ c ^ d ^ 1;
        self.state <<= 1;
        self.state |= n;
    }

    fn get(&mut self) -> u32 {
        let mut res: u32 = 0;
        for _ in 0..32 {
            self.next();
            res <<= 1;
            res ^= self.state & 0x1;
        }
        res
    }

    pub fn get64(&mut self) -> u64 {
        ((self.get() as u64) << 32) | self.get() as u64
    }

    /// Returns a random non-zero number with `precision` bits, and an
    /// exponent in the range `[-range, range)`.
    pub fn get_real(&mut self, precision: usize, range: i64) -> Real {
        use num_bigint::BigInt;
        let negative = self.get() & 1 == 1;
        let mut coefficient = BigInt::from(self.get64() | 1);
        while (coefficient.bits() as usize) < precision {
            coefficient = (coefficient << 64usize) + BigInt::from(self.get64());
        }
        let exponent = (self.get64() % (2 * range as u64)) as i64 - range;
        if negative {
            coefficient = -coefficient;
        }
        Real::new(coefficient, exponent, precision).unwrap()
    }
}

#[test]
fn test_lfsr_balance() {
    let mut lfsr = Lfsr::new();

    // Count the number of items, and the number of 1s.
    let mut items = 0;
    let mut ones = 0;

    for _ in 0..10000 {
        let mut u = lfsr.get();
        for _ in 0..32 {
            items += 1;
            ones += u & 1;
            u >>= 1;
        }
    }
    // Make sure that we have around 50% 1s and 50% zeros.
    assert!((ones as f64) < (0.55 * items as f64));
    assert!((ones as f64) > (0.45 * items as f64));
}

#[test]
fn test_random_reals() {
    let mut lfsr = Lfsr::new();
    for p in [1, 7, 64, 65, 300] {
        let x = lfsr.get_real(p, 50);
        assert_eq!(x.precision(), p);
        assert_eq!(x.bit_length(), p);
    }
}
