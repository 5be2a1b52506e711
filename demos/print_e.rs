use bigreal::{Constants, Error};
use tracing_subscriber::EnvFilter;

///! Calculates long numbers and prints them.
///!  RUST_LOG=debug cargo run --example print_e --release

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let val = Constants::global().e(5000)?;
    println!("F64: {}", val.to_f64());
    println!("FP*: {}", val);
    Ok(())
}
