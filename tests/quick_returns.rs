//! Zero-size and zero-batch quick-return behavior
//!
//! Degenerate shapes are successes, not errors; the getrf family still
//! resets info to 0 on these paths, and no data buffer is ever read.
//! Argument validation still applies: leading dimensions must be valid even
//! when a dimension is zero.

mod common;

use common::*;
use solvr::algorithm::{getf2, getrf, getri, getrs, gesv_outofplace, Operation};
use solvr::matrix::{InfoArray, MatrixBatch, PivotBatch};
use solvr::runtime::cpu::{CpuDevice, CpuRuntime};

/// A descriptor over an empty buffer; only usable where the described
/// region is itself empty
fn empty_matrix(device: &CpuDevice, lda: usize) -> MatrixBatch<CpuRuntime, f64> {
    MatrixBatch::<CpuRuntime, f64>::strided(storage_from::<f64>(&[], device), lda, 0)
        .expect("empty descriptor")
}

#[test]
fn test_getrf_zero_rows_resets_stale_info() {
    let (client, device) = create_cpu_client();
    let bc = 4;
    let info_storage = storage_from(&[3i32, -1, 9, 2], &device);
    let a = empty_matrix(&device, 10);
    let ipiv = PivotBatch::<CpuRuntime, i32>::strided(int_storage(0, &device), 0).expect("ipiv");
    let info = InfoArray::<CpuRuntime, i32>::new(info_storage.clone()).expect("info");

    // the empty data storage is never dereferenced
    getrf(&client, 0, 10, &a, &ipiv, &info, bc).expect("m=0 is a no-op success");
    assert_eq!(info_storage.to_vec::<i32>(), vec![0; bc]);
}

#[test]
fn test_getrf_zero_cols() {
    let (client, device) = create_cpu_client();
    let info_storage = storage_from(&[5i32], &device);
    let a = empty_matrix(&device, 1);
    let ipiv = PivotBatch::<CpuRuntime, i32>::strided(int_storage(0, &device), 0).expect("ipiv");
    let info = InfoArray::<CpuRuntime, i32>::new(info_storage.clone()).expect("info");

    getrf(&client, 10, 0, &a, &ipiv, &info, 1).expect("n=0 is a no-op success");
    assert_eq!(info_storage.to_vec::<i32>(), vec![0]);
}

#[test]
fn test_getf2_zero_batch() {
    let (client, device) = create_cpu_client();
    let a = empty_matrix(&device, 5);
    let ipiv = PivotBatch::<CpuRuntime, i32>::strided(int_storage(0, &device), 0).expect("ipiv");
    let info = InfoArray::<CpuRuntime, i32>::new(int_storage(0, &device)).expect("info");

    getf2(&client, 5, 5, &a, &ipiv, &info, 0).expect("batch_count=0 is a no-op success");
}

#[test]
fn test_getrs_zero_n() {
    let (client, device) = create_cpu_client();
    let a = empty_matrix(&device, 1);
    let b = empty_matrix(&device, 4);
    let ipiv = PivotBatch::<CpuRuntime, i32>::strided(int_storage(0, &device), 0).expect("ipiv");

    getrs(&client, Operation::None, 0, 4, &a, &ipiv, &b, 2).expect("n=0 is a no-op success");
}

#[test]
fn test_getrs_zero_nrhs_requires_only_factors() {
    let (client, device) = create_cpu_client();
    let n = 4;
    // factors must still be a real buffer when n > 0; B may be empty
    let a_storage = storage_from(&rand_dominant_f64(n, 60), &device);
    let a = MatrixBatch::<CpuRuntime, f64>::single(a_storage.clone(), n).expect("a");
    let b = empty_matrix(&device, 1);
    let ipiv = PivotBatch::<CpuRuntime, i32>::single(int_storage(n, &device)).expect("ipiv");

    let before: Vec<f64> = a_storage.to_vec();
    getrs(&client, Operation::Transpose, n, 0, &a, &ipiv, &b, 1).expect("nrhs=0");
    assert_eq!(a_storage.to_vec::<f64>(), before, "factors untouched");
}

#[test]
fn test_getrs_zero_batch() {
    let (client, device) = create_cpu_client();
    let a = empty_matrix(&device, 3);
    let b = empty_matrix(&device, 3);
    let ipiv = PivotBatch::<CpuRuntime, i32>::strided(int_storage(0, &device), 0).expect("ipiv");

    getrs(&client, Operation::None, 3, 3, &a, &ipiv, &b, 0).expect("batch=0");
}

#[test]
fn test_gesv_zero_n_resets_info() {
    let (client, device) = create_cpu_client();
    let a = empty_matrix(&device, 1);
    let b = empty_matrix(&device, 7);
    let x = empty_matrix(&device, 7);
    let ipiv = PivotBatch::<CpuRuntime, i32>::strided(int_storage(0, &device), 0).expect("ipiv");
    let info_storage = storage_from(&[1i32, 1], &device);
    let info = InfoArray::<CpuRuntime, i32>::new(info_storage.clone()).expect("info");

    gesv_outofplace(&client, 0, 7, &a, &ipiv, &b, &x, &info, 2).expect("n=0");
    assert_eq!(info_storage.to_vec::<i32>(), vec![0, 0], "info reset on n=0");
}

#[test]
fn test_gesv_zero_nrhs_and_zero_batch() {
    let (client, device) = create_cpu_client();
    let n = 5;
    let a_storage = storage_from(&rand_dominant_f64(n, 61), &device);
    let a = MatrixBatch::<CpuRuntime, f64>::single(a_storage, n).expect("a");
    let b = empty_matrix(&device, 1);
    let x = empty_matrix(&device, 1);
    let ipiv = PivotBatch::<CpuRuntime, i32>::single(int_storage(n, &device)).expect("ipiv");
    let info_storage = storage_from(&[4i32], &device);
    let info = InfoArray::<CpuRuntime, i32>::new(info_storage.clone()).expect("info");

    gesv_outofplace(&client, n, 0, &a, &ipiv, &b, &x, &info, 1).expect("nrhs=0");
    assert_eq!(info_storage.to_vec::<i32>(), vec![0], "info reset on nrhs=0");

    let e = empty_matrix(&device, 3);
    let epiv = PivotBatch::<CpuRuntime, i32>::strided(int_storage(0, &device), 0).expect("ipiv");
    let einfo = InfoArray::<CpuRuntime, i32>::new(int_storage(0, &device)).expect("info");
    gesv_outofplace(&client, 3, 3, &e, &epiv, &e, &e, &einfo, 0).expect("batch=0");
}

#[test]
fn test_getri_zero_n() {
    let (client, device) = create_cpu_client();
    let a = empty_matrix(&device, 1);
    let ipiv = PivotBatch::<CpuRuntime, i32>::strided(int_storage(0, &device), 0).expect("ipiv");
    let info_storage = storage_from(&[6i32], &device);
    let info = InfoArray::<CpuRuntime, i32>::new(info_storage.clone()).expect("info");

    getri(&client, 0, &a, &ipiv, &info, 1).expect("n=0 inversion");
    assert_eq!(info_storage.to_vec::<i32>(), vec![0]);
}
