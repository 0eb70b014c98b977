//! Factor a small system and solve it, printing the residual.
//!
//! Run with: cargo run --example solve_lu

use solvr::prelude::*;

fn main() -> Result<()> {
    let device = CpuRuntime::default_device();
    let client = CpuRuntime::default_client(&device);

    let n = 4;
    #[rustfmt::skip]
    let a_data = vec![
        4.0f64, 1.0, 0.0, 2.0,
        1.0,    5.0, 1.0, 0.0,
        0.0,    1.0, 6.0, 1.0,
        2.0,    0.0, 1.0, 7.0,
    ];
    let b_data = vec![1.0f64, 2.0, 3.0, 4.0];

    let a_storage = Storage::<CpuRuntime>::from_slice(&a_data, &device)?;
    let b_storage = Storage::<CpuRuntime>::from_slice(&b_data, &device)?;
    let a = MatrixBatch::<CpuRuntime, f64>::single(a_storage, n)?;
    let b = MatrixBatch::<CpuRuntime, f64>::single(b_storage.clone(), 1)?;
    let ipiv = PivotBatch::<CpuRuntime, i32>::single(Storage::<CpuRuntime>::new(
        n,
        DType::I32,
        &device,
    )?)?;
    let info = InfoArray::<CpuRuntime, i32>::new(Storage::<CpuRuntime>::new(
        1,
        DType::I32,
        &device,
    )?)?;

    // factor in place, then solve in place in b
    getrf(&client, n, n, &a, &ipiv, &info, 1)?;
    let info_val = info.storage().to_vec::<i32>()[0];
    println!("factorization info: {}", info_val);
    assert_eq!(info_val, 0, "matrix is singular");

    getrs(&client, Operation::None, n, 1, &a, &ipiv, &b, 1)?;
    client.synchronize();

    let x: Vec<f64> = b_storage.to_vec();
    println!("solution: {:?}", x);

    // residual check against the original data
    let mut max_resid = 0.0f64;
    for i in 0..n {
        let ax: f64 = (0..n).map(|j| a_data[i * n + j] * x[j]).sum();
        max_resid = max_resid.max((ax - b_data[i]).abs());
    }
    println!("max residual: {:.3e}", max_resid);

    Ok(())
}
