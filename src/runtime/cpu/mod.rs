//! CPU runtime implementation
//!
//! The CPU runtime uses standard heap allocation and provides the reference
//! implementation for every solver and BLAS-3 kernel. Launches are
//! synchronous; batch instances fan out across rayon when the `rayon`
//! feature is enabled.

mod blas;
mod client;
mod device;
mod kernels;
mod runtime;

pub use client::{CpuAllocator, CpuClient};
pub use device::CpuDevice;
pub use runtime::CpuRuntime;
