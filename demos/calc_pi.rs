use bigreal::{Constants, Error, Real};
use tracing_subscriber::EnvFilter;

///! Calculate the value of PI using the Chudnovsky_algorithm.
///!  RUST_LOG=debug cargo run --example calc_pi --release

const PRECISION: usize = 256;

fn int(val: i64) -> Result<Real, Error> {
    Real::from_i64(val, PRECISION)
}

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // https://en.wikipedia.org/wiki/Chudnovsky_algorithm
    let iterations = 8;

    // Constants:
    let c1 = int(10005)?.sqrt()?;
    let c2 = int(545140134)?;
    let c3 = int(-262537412640768000)?;
    let c16 = int(16)?;
    let c12 = int(12)?;

    // Initial state.
    let mut kc = int(6)?;
    let mut m = int(1)?;
    let mut l = int(13591409)?;
    let mut x = int(1)?;
    let mut s = int(13591409)?;

    for q in 1..iterations + 1 {
        let q3 = int(q * q * q)?;
        let k3 = &kc * &(&kc * &kc);
        m = ((k3 - (&kc * &c16)) * m / q3)?;
        l = &l + &c2;
        x = &x * &c3;
        s = s + (&(&m * &l) / &x)?;
        kc = &kc + &c12;
    }
    let pi = int(426880)? * (c1 / s)?;
    println!("pi = {}", pi);

    let expected = Constants::global().pi(PRECISION)?;
    println!("ref = {}", expected);
    // The last few bits are noise from the truncating arithmetic.
    assert!(pi.with_precision(240)? == expected.with_precision(240)?);
    Ok(())
}
