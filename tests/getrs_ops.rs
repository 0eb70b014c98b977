//! Integration tests for the triangular solver (getrs)

mod common;

use common::*;
use solvr::algorithm::{getrf, getrs, Operation};
use solvr::dtype::{Complex128, DType};
use solvr::matrix::{InfoArray, MatrixBatch, PivotBatch, Storage};
use solvr::runtime::cpu::CpuRuntime;

/// Factor A and solve op(A)·X = B; returns the solution
fn factor_and_solve(
    a_data: &[f64],
    b_data: &[f64],
    n: usize,
    nrhs: usize,
    trans: Operation,
) -> Vec<f64> {
    let (client, device) = create_cpu_client();
    let a_storage = storage_from(a_data, &device);
    let b_storage = storage_from(b_data, &device);
    let a = MatrixBatch::<CpuRuntime, f64>::single(a_storage, n).expect("a");
    let b = MatrixBatch::<CpuRuntime, f64>::single(b_storage.clone(), nrhs).expect("b");
    let ipiv = PivotBatch::<CpuRuntime, i32>::single(int_storage(n, &device)).expect("ipiv");
    let info = InfoArray::<CpuRuntime, i32>::new(int_storage(1, &device)).expect("info");

    getrf(&client, n, n, &a, &ipiv, &info, 1).expect("getrf should succeed");
    assert_eq!(info.storage().to_vec::<i32>()[0], 0, "matrix must be regular");
    getrs(&client, trans, n, nrhs, &a, &ipiv, &b, 1).expect("getrs should succeed");

    b_storage.to_vec()
}

#[test]
fn test_solve_reproduces_known_solution() {
    let n = 50;
    let nrhs = 3;
    let a = rand_dominant_f64(n, 21);
    // build B = A · X_true so the expected solution is exact
    let x_true: Vec<f64> = (0..n * nrhs).map(|i| (i % 13) as f64 - 6.0).collect();
    let b = host_matmul_f64(&a, &x_true, n, nrhs, n);

    let x = factor_and_solve(&a, &b, n, nrhs, Operation::None);
    assert_allclose(&x, &x_true, 1e-9, 1e-9, "solution vs known");
}

#[test]
fn test_residual_bound_scales_with_epsilon() {
    let n = 200;
    let a = rand_dominant_f64(n, 33);
    let b: Vec<f64> = (0..n).map(|i| ((i * 31) % 17) as f64 - 8.0).collect();

    let x = factor_and_solve(&a, &b, n, 1, Operation::None);
    let ax = host_matmul_f64(&a, &x, n, 1, n);
    let resid: Vec<f64> = ax.iter().zip(b.iter()).map(|(p, q)| p - q).collect();

    let bound = n as f64 * f64::EPSILON * fro_norm(&a) * fro_norm(&x);
    assert!(
        fro_norm(&resid) < 100.0 * bound,
        "residual {} exceeds bound {}",
        fro_norm(&resid),
        bound
    );
}

#[test]
fn test_transpose_solve_2x2() {
    // Aᵀ·x = b for A = [[1,2],[3,4]], b = [5,6]: direct computation gives
    // x = [-1, 2]
    let a = vec![1.0f64, 2.0, 3.0, 4.0];
    let b = vec![5.0f64, 6.0];
    let x = factor_and_solve(&a, &b, 2, 1, Operation::Transpose);
    assert_allclose(&x, &[-1.0, 2.0], 1e-12, 1e-12, "transpose solve");
}

#[test]
fn test_transpose_matches_explicit_transpose() {
    let n = 40;
    let a = rand_dominant_f64(n, 55);
    let b: Vec<f64> = (0..n).map(|i| (i as f64).sin()).collect();

    // solving Aᵀx = b must match solving with Aᵀ materialized
    let mut at = vec![0.0; n * n];
    for i in 0..n {
        for j in 0..n {
            at[j * n + i] = a[i * n + j];
        }
    }
    let x1 = factor_and_solve(&a, &b, n, 1, Operation::Transpose);
    let x2 = factor_and_solve(&at, &b, n, 1, Operation::None);
    assert_allclose(&x1, &x2, 1e-9, 1e-10, "Aᵀ solve vs materialized transpose");
}

#[test]
fn test_conj_transpose_solve_complex() {
    let (client, device) = create_cpu_client();
    let n = 2;
    // A = [[1, i], [0, 2]] (upper triangular), solve Aᴴ·x = b with
    // b = [1+i, 2]: x₁ = 1+i, 2·x₂ = 2 + i·x₁ ⇒ x₂ = (1+i)/2
    let a_data = vec![
        Complex128::new(1.0, 0.0),
        Complex128::new(0.0, 1.0),
        Complex128::new(0.0, 0.0),
        Complex128::new(2.0, 0.0),
    ];
    let b_data = vec![Complex128::new(1.0, 1.0), Complex128::new(2.0, 0.0)];

    let a_storage = storage_from(&a_data, &device);
    let b_storage = storage_from(&b_data, &device);
    let a = MatrixBatch::<CpuRuntime, Complex128>::single(a_storage, n).expect("a");
    let b = MatrixBatch::<CpuRuntime, Complex128>::single(b_storage.clone(), 1).expect("b");
    let ipiv = PivotBatch::<CpuRuntime, i32>::single(int_storage(n, &device)).expect("ipiv");
    let info = InfoArray::<CpuRuntime, i32>::new(int_storage(1, &device)).expect("info");

    getrf(&client, n, n, &a, &ipiv, &info, 1).expect("complex getrf");
    getrs(&client, Operation::ConjTranspose, n, 1, &a, &ipiv, &b, 1).expect("conj solve");

    let x: Vec<Complex128> = b_storage.to_vec();
    assert!((x[0] - Complex128::new(1.0, 1.0)).magnitude() < 1e-12);
    assert!((x[1] - Complex128::new(0.5, 0.5)).magnitude() < 1e-12);
}

#[test]
fn test_quick_return_leaves_b_untouched() {
    let (client, device) = create_cpu_client();
    let n = 4;
    let a_data = rand_dominant_f64(n, 70);
    let b_data = vec![1.5f64, -2.5, 3.5, -4.5];

    let a_storage = storage_from(&a_data, &device);
    let b_storage = storage_from(&b_data, &device);
    let a = MatrixBatch::<CpuRuntime, f64>::single(a_storage, n).expect("a");
    let b = MatrixBatch::<CpuRuntime, f64>::single(b_storage.clone(), 1).expect("b");
    let ipiv = PivotBatch::<CpuRuntime, i32>::single(int_storage(n, &device)).expect("ipiv");

    // nrhs = 0 is a no-op success
    getrs(&client, Operation::None, n, 0, &a, &ipiv, &b, 1).expect("nrhs=0 quick return");
    assert_eq!(b_storage.to_vec::<f64>(), b_data);
}

#[test]
fn test_singular_factors_propagate_nonfinite() {
    let (client, device) = create_cpu_client();
    let n = 2;
    // rank-1 matrix: getrf flags info = 2 and still completes
    let a_data = vec![1.0f64, 0.0, 0.0, 0.0];
    let b_data = vec![1.0f64, 1.0];

    let a_storage = storage_from(&a_data, &device);
    let b_storage = storage_from(&b_data, &device);
    let a = MatrixBatch::<CpuRuntime, f64>::single(a_storage, n).expect("a");
    let b = MatrixBatch::<CpuRuntime, f64>::single(b_storage.clone(), 1).expect("b");
    let ipiv = PivotBatch::<CpuRuntime, i32>::single(int_storage(n, &device)).expect("ipiv");
    let info = InfoArray::<CpuRuntime, i32>::new(int_storage(1, &device)).expect("info");

    getrf(&client, n, n, &a, &ipiv, &info, 1).expect("singular getrf still succeeds");
    assert_eq!(info.storage().to_vec::<i32>()[0], 2);

    // the solver trusts the caller to have checked info: solving anyway is
    // Ok at the call level and yields non-finite values, not an error
    getrs(&client, Operation::None, n, 1, &a, &ipiv, &b, 1)
        .expect("solving with singular factors is not a call-level error");
    let x: Vec<f64> = b_storage.to_vec();
    assert!(x.iter().any(|v| !v.is_finite()), "expected Inf/NaN, got {:?}", x);
}

#[test]
fn test_strided_batched_solve() {
    let (client, device) = create_cpu_client();
    let n = 24;
    let nrhs = 2;
    let bc = 4;

    let mut a_packed = Vec::new();
    let mut b_packed = Vec::new();
    let mut x_expected = Vec::new();
    for s in 0..bc as u64 {
        let a = rand_dominant_f64(n, 300 + s);
        let x: Vec<f64> = (0..n * nrhs).map(|i| ((i + s as usize) % 9) as f64 - 4.0).collect();
        b_packed.extend(host_matmul_f64(&a, &x, n, nrhs, n));
        a_packed.extend(a);
        x_expected.push(x);
    }

    let a_storage = storage_from(&a_packed, &device);
    let b_storage = storage_from(&b_packed, &device);
    let a = MatrixBatch::<CpuRuntime, f64>::strided(a_storage, n, n * n).expect("a");
    let b = MatrixBatch::<CpuRuntime, f64>::strided(b_storage.clone(), nrhs, n * nrhs).expect("b");
    let ipiv =
        PivotBatch::<CpuRuntime, i32>::strided(int_storage(bc * n, &device), n).expect("ipiv");
    let info = InfoArray::<CpuRuntime, i32>::new(int_storage(bc, &device)).expect("info");

    getrf(&client, n, n, &a, &ipiv, &info, bc).expect("batched getrf");
    getrs(&client, Operation::None, n, nrhs, &a, &ipiv, &b, bc).expect("batched getrs");

    let solved: Vec<f64> = b_storage.to_vec();
    for (s, expected) in x_expected.iter().enumerate() {
        assert_allclose(
            &solved[s * n * nrhs..(s + 1) * n * nrhs],
            expected,
            1e-9,
            1e-9,
            "batched solution",
        );
    }
}

#[test]
fn test_i64_index_solve() {
    let (client, device) = create_cpu_client();
    let n = 12;
    let a_data = rand_dominant_f64(n, 91);
    let x_true: Vec<f64> = (0..n).map(|i| i as f64 - 5.0).collect();
    let b_data = host_matmul_f64(&a_data, &x_true, n, 1, n);

    let a_storage = storage_from(&a_data, &device);
    let b_storage = storage_from(&b_data, &device);
    let a = MatrixBatch::<CpuRuntime, f64>::single(a_storage, n).expect("a");
    let b = MatrixBatch::<CpuRuntime, f64>::single(b_storage.clone(), 1).expect("b");
    let ipiv = PivotBatch::<CpuRuntime, i64>::single(
        Storage::<CpuRuntime>::new(n, DType::I64, &device).expect("pivots"),
    )
    .expect("ipiv");
    let info = InfoArray::<CpuRuntime, i64>::new(
        Storage::<CpuRuntime>::new(1, DType::I64, &device).expect("info storage"),
    )
    .expect("info");

    getrf(&client, n, n, &a, &ipiv, &info, 1).expect("getrf");
    getrs(&client, Operation::None, n, 1, &a, &ipiv, &b, 1).expect("getrs");
    assert_allclose(&b_storage.to_vec::<f64>(), &x_true, 1e-10, 1e-10, "i64 solve");
}
