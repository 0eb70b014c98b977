//! Common test utilities
#![allow(dead_code)]

use num_traits::Float;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use solvr::dtype::{DType, Element};
use solvr::matrix::Storage;
use solvr::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
use solvr::runtime::Runtime;

/// Create a CPU client and device for testing
pub fn create_cpu_client() -> (CpuClient, CpuDevice) {
    let device = CpuDevice::new();
    let client = CpuRuntime::default_client(&device);
    (client, device)
}

/// Upload a host slice as device storage
pub fn storage_from<T: Element>(data: &[T], device: &CpuDevice) -> Storage<CpuRuntime> {
    Storage::<CpuRuntime>::from_slice(data, device).expect("storage upload should succeed")
}

/// Zero-initialized i32 storage (pivot / info arrays)
pub fn int_storage(len: usize, device: &CpuDevice) -> Storage<CpuRuntime> {
    Storage::<CpuRuntime>::new(len, DType::I32, device).expect("storage alloc should succeed")
}

/// Assert two float slices are close within tolerance
///
/// Uses the formula: |a - b| <= atol + rtol * |b|
pub fn assert_allclose<T: Float + std::fmt::Display>(
    a: &[T],
    b: &[T],
    rtol: T,
    atol: T,
    msg: &str,
) {
    assert_eq!(a.len(), b.len(), "{}: length mismatch", msg);
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        let diff = (*x - *y).abs();
        let tol = atol + rtol * y.abs();
        assert!(
            diff <= tol,
            "{}: element {} differs: {} vs {} (diff={}, tol={})",
            msg,
            i,
            x,
            y,
            diff,
            tol
        );
    }
}

/// Random column-diagonally-dominant n×n matrix, row-major
///
/// Dominance keeps the condition number modest and makes partial pivoting
/// select the diagonal, so pivoted and unpivoted factorizations agree.
pub fn rand_dominant_f64(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut a = vec![0.0f64; n * n];
    for v in a.iter_mut() {
        *v = rng.gen_range(-1.0..1.0);
    }
    for j in 0..n {
        let col_sum: f64 = (0..n).map(|i| a[i * n + j].abs()).sum();
        a[j * n + j] = col_sum + 1.0;
    }
    a
}

/// f32 variant of [`rand_dominant_f64`]
pub fn rand_dominant_f32(n: usize, seed: u64) -> Vec<f32> {
    rand_dominant_f64(n, seed)
        .iter()
        .map(|&v| v as f32)
        .collect()
}

/// Host row-major matmul: C (m×n) = A (m×k) · B (k×n)
pub fn host_matmul_f64(a: &[f64], b: &[f64], m: usize, n: usize, k: usize) -> Vec<f64> {
    let mut c = vec![0.0; m * n];
    for i in 0..m {
        for kk in 0..k {
            let av = a[i * k + kk];
            for j in 0..n {
                c[i * n + j] += av * b[kk * n + j];
            }
        }
    }
    c
}

/// Frobenius norm
pub fn fro_norm(x: &[f64]) -> f64 {
    x.iter().map(|v| v * v).sum::<f64>().sqrt()
}

/// Split packed LU factors into explicit L (unit diagonal) and U, row-major
pub fn split_lu(lu: &[f64], n: usize) -> (Vec<f64>, Vec<f64>) {
    let mut l = vec![0.0; n * n];
    let mut u = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..n {
            let v = lu[i * n + j];
            if i > j {
                l[i * n + j] = v;
            } else {
                u[i * n + j] = v;
            }
        }
        l[i * n + i] = 1.0;
    }
    (l, u)
}

/// Apply the recorded row interchanges to a copy of A, producing P·A
pub fn permute_rows(a: &[f64], ipiv: &[i32], n: usize) -> Vec<f64> {
    let mut pa = a.to_vec();
    for i in 0..ipiv.len() {
        let jp = ipiv[i] as usize - 1;
        if jp != i {
            for c in 0..n {
                pa.swap(i * n + c, jp * n + c);
            }
        }
    }
    pa
}
