//! # solvr
//!
//! **Batched dense LU factorization and linear solvers for Rust with
//! pluggable compute runtimes.**
//!
//! solvr implements the getrf / getrs / gesv / getri routine families —
//! panel-blocked LU decomposition with partial pivoting, triangular solves
//! with pivot application, combined factor-and-solve, and inversion — over
//! an abstract device runtime, for one matrix or for batches of many
//! independent matrices.
//!
//! ## Why solvr?
//!
//! - **Batched first**: single, strided-batched, and offset-table batched
//!   layouts share one algorithmic core; instances execute independently
//! - **Query-then-allocate**: pure workspace planners report every scratch
//!   requirement before a single byte is allocated
//! - **LAPACK semantics**: 1-based pivot vectors, per-instance info codes,
//!   singularity that never aborts the batch
//! - **No vendor lock-in**: native kernels behind trait seams, not
//!   cuSOLVER/MKL wrappers
//! - **Pure Rust**: no FFI, single binary deployment
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use solvr::prelude::*;
//!
//! let device = CpuRuntime::default_device();
//! let client = CpuRuntime::default_client(&device);
//!
//! // factor a 3×3 system and solve it
//! let a = MatrixBatch::<CpuRuntime, f64>::single(a_storage, 3)?;
//! let ipiv = PivotBatch::<CpuRuntime, i32>::single(piv_storage)?;
//! let info = InfoArray::<CpuRuntime, i32>::new(info_storage)?;
//! getrf(&client, 3, 3, &a, &ipiv, &info, 1)?;
//! getrs(&client, Operation::None, 3, 1, &a, &ipiv, &b, 1)?;
//! ```
//!
//! ## Feature Flags
//!
//! - `rayon` (default): parallel fan-out across batch instances on the CPU
//!   backend

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod algorithm;
pub mod dtype;
pub mod error;
pub mod matrix;
pub mod runtime;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::algorithm::{
        getf2, getf2_npvt, getrf, getrf_npvt, getri, getri_npvt, getri_outofplace, getrs,
        gesv_outofplace, Operation,
    };
    pub use crate::dtype::{Complex64, Complex128, DType, Element, IndexInt, LinalgElement};
    pub use crate::error::{Error, Result};
    pub use crate::matrix::{InfoArray, MatrixBatch, PivotBatch, Storage};
    pub use crate::runtime::{Device, Runtime, RuntimeClient};

    pub use crate::runtime::cpu::{CpuClient, CpuDevice, CpuRuntime};
}

/// Default runtime for the reference backend
pub type DefaultRuntime = runtime::cpu::CpuRuntime;
