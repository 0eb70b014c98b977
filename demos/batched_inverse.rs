//! Invert a strided batch of matrices in one call.
//!
//! Run with: cargo run --example batched_inverse

use solvr::prelude::*;

fn main() -> Result<()> {
    let device = CpuRuntime::default_device();
    let client = CpuRuntime::default_client(&device);

    let n = 3;
    let bc = 2;
    // two well-conditioned 3×3 matrices back to back
    #[rustfmt::skip]
    let packed = vec![
        // instance 0
        5.0f64, 1.0, 0.0,
        1.0,    4.0, 1.0,
        0.0,    1.0, 6.0,
        // instance 1
        3.0,    0.0, 1.0,
        0.0,    2.0, 0.0,
        1.0,    0.0, 4.0,
    ];

    let storage = Storage::<CpuRuntime>::from_slice(&packed, &device)?;
    let a = MatrixBatch::<CpuRuntime, f64>::strided(storage.clone(), n, n * n)?;
    let ipiv = PivotBatch::<CpuRuntime, i32>::strided(
        Storage::<CpuRuntime>::new(bc * n, DType::I32, &device)?,
        n,
    )?;
    let info = InfoArray::<CpuRuntime, i32>::new(Storage::<CpuRuntime>::new(
        bc,
        DType::I32,
        &device,
    )?)?;

    getri(&client, n, &a, &ipiv, &info, bc)?;
    client.synchronize();

    println!("info: {:?}", info.storage().to_vec::<i32>());

    let out: Vec<f64> = storage.to_vec();
    for b in 0..bc {
        println!("inverse of instance {}:", b);
        for i in 0..n {
            let row = &out[b * n * n + i * n..b * n * n + (i + 1) * n];
            println!("  {:?}", row);
        }
    }

    Ok(())
}
