//! Device matrix storage and batch descriptors
//!
//! - [`Storage`]: Arc-shared device buffer
//! - [`MatrixBatch`] / [`PivotBatch`] / [`InfoArray`]: caller-owned handles
//!   describing how the routines address one matrix or a batch
//! - [`MatrixArgs`] / [`VectorArgs`]: the plain-integer kernel ABI derived
//!   from the handles

mod batch;
mod storage;

pub use batch::{BatchLayout, InfoArray, MatrixArgs, MatrixBatch, PivotBatch, VectorArgs};
pub use storage::Storage;
