//! Benchmarks for the factorization and solve paths.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use solvr::algorithm::{getrf, getrs, Operation};
use solvr::matrix::{InfoArray, MatrixBatch, PivotBatch, Storage};
use solvr::dtype::DType;
use solvr::runtime::cpu::{CpuDevice, CpuRuntime};
use solvr::runtime::Runtime;

/// Diagonally dominant matrix (guaranteed non-singular), row-major
fn dominant(n: usize) -> Vec<f64> {
    let mut a = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..n {
            a[i * n + j] = if i == j {
                n as f64 + 1.0
            } else {
                1.0 / ((i as f64 - j as f64).abs() + 1.0)
            };
        }
    }
    a
}

fn bench_getrf(c: &mut Criterion) {
    let mut group = c.benchmark_group("getrf");
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    for size in [64, 128, 256] {
        let data = dominant(size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |bencher, &n| {
            bencher.iter(|| {
                let storage =
                    Storage::<CpuRuntime>::from_slice(&data, &device).expect("storage");
                let a = MatrixBatch::<CpuRuntime, f64>::single(storage, n).expect("a");
                let ipiv = PivotBatch::<CpuRuntime, i32>::single(
                    Storage::<CpuRuntime>::new(n, DType::I32, &device).expect("ipiv"),
                )
                .expect("ipiv");
                let info = InfoArray::<CpuRuntime, i32>::new(
                    Storage::<CpuRuntime>::new(1, DType::I32, &device).expect("info"),
                )
                .expect("info");
                getrf(&client, n, n, black_box(&a), &ipiv, &info, 1).expect("getrf");
            });
        });
    }

    group.finish();
}

fn bench_getrf_batched(c: &mut Criterion) {
    let mut group = c.benchmark_group("getrf_strided_batched");
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    let n = 32;
    for bc in [8, 64, 256] {
        let single = dominant(n);
        let mut packed = Vec::with_capacity(bc * n * n);
        for _ in 0..bc {
            packed.extend_from_slice(&single);
        }
        group.bench_with_input(BenchmarkId::from_parameter(bc), &bc, |bencher, &bc| {
            bencher.iter(|| {
                let storage =
                    Storage::<CpuRuntime>::from_slice(&packed, &device).expect("storage");
                let a =
                    MatrixBatch::<CpuRuntime, f64>::strided(storage, n, n * n).expect("a");
                let ipiv = PivotBatch::<CpuRuntime, i32>::strided(
                    Storage::<CpuRuntime>::new(bc * n, DType::I32, &device).expect("ipiv"),
                    n,
                )
                .expect("ipiv");
                let info = InfoArray::<CpuRuntime, i32>::new(
                    Storage::<CpuRuntime>::new(bc, DType::I32, &device).expect("info"),
                )
                .expect("info");
                getrf(&client, n, n, black_box(&a), &ipiv, &info, bc).expect("getrf");
            });
        });
    }

    group.finish();
}

fn bench_factor_and_solve(c: &mut Criterion) {
    let mut group = c.benchmark_group("getrf_getrs");
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);

    for size in [64, 256] {
        let data = dominant(size);
        let rhs: Vec<f64> = (0..size).map(|i| (i + 1) as f64).collect();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |bencher, &n| {
            bencher.iter(|| {
                let a_storage =
                    Storage::<CpuRuntime>::from_slice(&data, &device).expect("storage");
                let b_storage =
                    Storage::<CpuRuntime>::from_slice(&rhs, &device).expect("storage");
                let a = MatrixBatch::<CpuRuntime, f64>::single(a_storage, n).expect("a");
                let b = MatrixBatch::<CpuRuntime, f64>::single(b_storage, 1).expect("b");
                let ipiv = PivotBatch::<CpuRuntime, i32>::single(
                    Storage::<CpuRuntime>::new(n, DType::I32, &device).expect("ipiv"),
                )
                .expect("ipiv");
                let info = InfoArray::<CpuRuntime, i32>::new(
                    Storage::<CpuRuntime>::new(1, DType::I32, &device).expect("info"),
                )
                .expect("info");
                getrf(&client, n, n, &a, &ipiv, &info, 1).expect("getrf");
                getrs(&client, Operation::None, n, 1, &a, &ipiv, &b, 1).expect("getrs");
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_getrf, bench_getrf_batched, bench_factor_and_solve);
criterion_main!(benches);
