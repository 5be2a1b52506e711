use bigreal::{Constants, Real};

fn test_e() {
    black_box(Constants::new().e(2000).unwrap());
}

fn test_sqrt() {
    let two = Real::from_i64(2, 10000).unwrap();
    black_box(two.sqrt().unwrap());
}

fn test_pi() {
    black_box(Constants::new().pi(2000).unwrap());
}

fn test_powi() {
    let a = Real::from_u64(1275563424, 512).unwrap();
    black_box(a.powi(11000).unwrap());
}

fn test_to_string() {
    let a = Real::from_u64(197123, 2000).unwrap().powi(100).unwrap();
    black_box(a.to_string());
}

fn test_parse() {
    let text = "3.14159265358979323846264338327950288419716939937510582097494459e-12";
    black_box(Real::parse(text, 1000).unwrap());
}

fn test_div() {
    let a = Real::from_u64(1000003, 1000).unwrap();
    let b = Real::from_u64(3, 1000).unwrap();
    black_box((&a / &b).unwrap());
}

fn test_log_exp() {
    let x = Real::from_f64(12.75, 256).unwrap();
    black_box(x.log().unwrap().exp().unwrap());
}

fn test_sin_cos() {
    for i in 0..100 {
        let a = Real::from_u64(i, 90).unwrap().sin().unwrap();
        let b = Real::from_u64(i, 90).unwrap().cos().unwrap();
        black_box(&a + &b);
    }
}

use criterion::{black_box, criterion_group, criterion_main, Criterion};

pub fn criterion_benchmark(c: &mut Criterion) {
    c.bench_function("test_pi", |b| b.iter(test_pi));
    c.bench_function("test_e", |b| b.iter(test_e));
    c.bench_function("test_sqrt", |b| b.iter(test_sqrt));
    c.bench_function("test_powi", |b| b.iter(test_powi));
    c.bench_function("test_to_string", |b| b.iter(test_to_string));
    c.bench_function("test_parse", |b| b.iter(test_parse));
    c.bench_function("test_div", |b| b.iter(test_div));
    c.bench_function("test_log_exp", |b| b.iter(test_log_exp));
    c.bench_function("test_sin_cos", |b| b.iter(test_sin_cos));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
