//! Dense LU factorization and solve orchestration
//!
//! This module is the core of the crate: panel-blocked LU decomposition
//! ([`getrf`]), the unblocked base case ([`getf2`]), triangular solving with
//! pivot application ([`getrs`]), the combined out-of-place solve
//! ([`gesv_outofplace`]), and inversion ([`getri`] and friends) — plus the
//! workspace planner they all share.
//!
//! # Call protocol
//!
//! Every entry point follows the same sequence:
//!
//! 1. argument validation — unsupported-value checks first, then size
//!    checks, then buffer-coverage checks, in that fixed order so a call
//!    violating several conditions reports one deterministic error;
//! 2. workspace planning via the pure `*_workspace` functions (callers may
//!    invoke these directly to query sizes without executing anything);
//! 3. allocation through the client's allocator — failure surfaces as
//!    [`Error::OutOfMemory`](crate::error::Error) before any caller buffer
//!    is touched;
//! 4. execution on the client's logical stream.
//!
//! Numerical singularity is reported per batch instance through the info
//! array and never becomes a call-level error. Zero-sized problems are
//! no-op successes, with info still reset to 0 in the getrf family.
//!
//! Batch layout (single / strided / offset-table) is carried by the
//! descriptors, so each routine has one entry point per pivoting/transpose
//! variant rather than one per layout family.

mod getf2;
mod getrf;
mod getri;
mod getrs;
mod gesv;
pub mod workspace;

pub use getf2::{getf2, getf2_npvt};
pub use getrf::{getrf, getrf_npvt};
pub use getri::{getri, getri_npvt, getri_outofplace};
pub use getrs::getrs;
pub use gesv::gesv_outofplace;
pub use workspace::{Workspace, WorkspaceReq};

// Re-export the operand enums used by the public API
pub use crate::runtime::blas::{Diag, Fill, Operation, Side};

use crate::dtype::{Element, IndexInt, LinalgElement};
use crate::error::{Error, Result};
use crate::matrix::{InfoArray, MatrixBatch, PivotBatch};
use crate::runtime::blas::BlasKernels;
use crate::runtime::kernel::SolverKernels;
use crate::runtime::{Runtime, RuntimeClient};

/// Panel width for the blocked factorizer. Tuned for throughput,
/// independent of problem size.
pub(crate) const GETRF_BLOCKSIZE: usize = 64;

/// Problems with min(m, n) at or below this route directly to the
/// unblocked base case.
pub(crate) const GETF2_SWITCHSIZE: usize = 64;

/// Column-block width for the blocked inversion.
pub(crate) const GETRI_BLOCKSIZE: usize = 64;

/// Right-hand sides at or below this solve in place; larger panels are
/// staged through workspace.
pub(crate) const TRSM_SUBST_LIMIT: usize = 64;

/// Everything a client must provide to run the solver routines: stream and
/// allocator access plus the solver and BLAS-3 kernel seams.
pub trait SolverClient<R, T, I>:
    RuntimeClient<R> + SolverKernels<T, I> + BlasKernels<T>
where
    R: Runtime,
    T: LinalgElement,
    I: IndexInt,
{
}

impl<R, T, I, C> SolverClient<R, T, I> for C
where
    R: Runtime,
    T: LinalgElement,
    I: IndexInt,
    C: RuntimeClient<R> + SolverKernels<T, I> + BlasKernels<T>,
{
}

/// Minimum leading dimension for a row of `n` elements spaced `inca` apart
pub(crate) fn min_lda(n: usize, inca: usize) -> usize {
    if n == 0 {
        1
    } else {
        (n - 1) * inca + 1
    }
}

/// Size check: leading dimension must cover the row extent
pub(crate) fn check_lda(arg: &'static str, lda: usize, min: usize) -> Result<()> {
    if lda < min.max(1) {
        return Err(Error::invalid_size(
            arg,
            format!("leading dimension {} is below the minimum {}", lda, min.max(1)),
        ));
    }
    Ok(())
}

/// Coverage check: a required matrix buffer must span the described region
pub(crate) fn check_matrix<R: Runtime, T: Element>(
    arg: &'static str,
    a: &MatrixBatch<R, T>,
    m: usize,
    n: usize,
    batch_count: usize,
) -> Result<()> {
    if !a.covers(m, n, batch_count) {
        return Err(Error::invalid_pointer(arg));
    }
    Ok(())
}

/// Coverage check: a pivot buffer must hold `len` entries per instance
pub(crate) fn check_pivots<R: Runtime, I: IndexInt>(
    arg: &'static str,
    ipiv: &PivotBatch<R, I>,
    len: usize,
    batch_count: usize,
) -> Result<()> {
    if !ipiv.covers(len, batch_count) {
        return Err(Error::invalid_pointer(arg));
    }
    Ok(())
}

/// Coverage check: the info array must hold one entry per instance
pub(crate) fn check_info<R: Runtime, I: IndexInt>(
    arg: &'static str,
    info: &InfoArray<R, I>,
    batch_count: usize,
) -> Result<()> {
    if !info.covers(batch_count) {
        return Err(Error::invalid_pointer(arg));
    }
    Ok(())
}

/// Write the device-side scalar constants (-1, 0, 1) the BLAS calls may
/// take by pointer. A zero handle means the planner skipped the slot.
pub(crate) fn init_scalars<R: Runtime, T: LinalgElement>(ptr: u64, device: &R::Device) {
    if ptr != 0 {
        let vals = [-T::one(), T::zero(), T::one()];
        R::copy_to_device(bytemuck::cast_slice(&vals), ptr, device);
    }
}
