//! Typed device kernel traits for the factorization/solve orchestration
//!
//! These are the elementwise/blockwise kernels the LU paths launch on the
//! execution engine: info resets, rectangular copies, row interchanges,
//! pivot search, and the unblocked elimination steps. Backends implement
//! `SolverKernels<T, I>` per element type `T` and index width `I`; missing
//! implementations are compile errors, not runtime `UnsupportedDType`s
//! (same enforcement pattern as [`super::blas::BlasKernels`]).
//!
//! Ordering contract: kernels issued through one client run in FIFO issue
//! order on its logical stream, so a pivot search, the row swaps it decides,
//! and the trailing update that depends on them are ordered by construction.
//! Batch instances are independent throughout and may run in parallel.

use crate::dtype::{Element, IndexInt};
use crate::error::Result;
use crate::matrix::{MatrixArgs, VectorArgs};

/// Typed solver kernels
///
/// Buffer handles inside [`MatrixArgs`] / [`VectorArgs`] are raw device
/// pointers; `pivot_val` and `pivot_idx` are planner-provided scratch
/// buffers holding one candidate per batch instance.
pub trait SolverKernels<T: Element, I: IndexInt>: Send + Sync {
    /// Set every info entry to `value`
    ///
    /// Used as the unconditional pre-pass so stale info never leaks, even on
    /// zero-size quick returns.
    fn reset_info(&self, info: &VectorArgs, batch_count: usize, value: I) -> Result<()>;

    /// Rectangular copy: dst[i, j] ← src[i, j] for an m×n region
    fn copy_mat(
        &self,
        m: usize,
        n: usize,
        src: &MatrixArgs,
        dst: &MatrixArgs,
        batch_count: usize,
    ) -> Result<()>;

    /// Apply a sequence of row interchanges to `n` columns of `a`
    ///
    /// For i in `k1..=k2` (1-based, forward order; reverse when `forward` is
    /// false): swap row i with row `ipiv[i-1]` (1-based). This matches how
    /// pivots were recorded during factorization, so the forward pass applies
    /// the permutation and the reverse pass applies its inverse.
    #[allow(clippy::too_many_arguments)]
    fn apply_row_swaps(
        &self,
        n: usize,
        a: &MatrixArgs,
        k1: usize,
        k2: usize,
        ipiv: &VectorArgs,
        forward: bool,
        batch_count: usize,
    ) -> Result<()>;

    /// Column pivot search for elimination step `j`
    ///
    /// Scans rows `j..m` of column `j` for the largest-magnitude element;
    /// ties break to the lowest row index (deterministic under IEEE
    /// comparison). Writes the candidate element to `pivot_val[b]` and its
    /// offset from row `j` to `pivot_idx[b]`.
    #[allow(clippy::too_many_arguments)]
    fn find_pivot(
        &self,
        j: usize,
        m: usize,
        a: &MatrixArgs,
        pivot_val: u64,
        pivot_idx: u64,
        batch_count: usize,
    ) -> Result<()>;

    /// Pivot application + column scale for elimination step `j`
    ///
    /// Per instance: read the candidate from `pivot_idx`/`pivot_val` (when
    /// pivoting; the diagonal element otherwise), record the 1-based pivot
    /// row in `ipiv[j]`, swap rows `j` and `j + idx` across all `n` columns,
    /// then either flag info = j+1 on an exactly-zero pivot (first failure
    /// wins) or scale the subdiagonal of column `j` by the pivot reciprocal.
    /// A zero pivot skips the scale but not the rest of the factorization.
    #[allow(clippy::too_many_arguments)]
    fn pivot_and_scale(
        &self,
        j: usize,
        m: usize,
        n: usize,
        a: &MatrixArgs,
        ipiv: Option<&VectorArgs>,
        pivot_val: u64,
        pivot_idx: u64,
        info: &VectorArgs,
        batch_count: usize,
    ) -> Result<()>;

    /// Rank-1 trailing update for elimination step `j`
    ///
    /// A[j+1.., j+1..] ← A[j+1.., j+1..] − A[j+1.., j] · A[j, j+1..]
    fn rank1_update(
        &self,
        j: usize,
        m: usize,
        n: usize,
        a: &MatrixArgs,
        batch_count: usize,
    ) -> Result<()>;

    /// Fold a panel factorization's local pivots and info into the caller's
    /// arrays after the panel at column offset `j` completes
    ///
    /// ipiv[j+k] ← iipiv[k] + j for k in 0..jb, and info ← iinfo + j for
    /// instances not already flagged.
    #[allow(clippy::too_many_arguments)]
    fn finalize_panel(
        &self,
        j: usize,
        jb: usize,
        ipiv: Option<&VectorArgs>,
        iipiv: &VectorArgs,
        info: &VectorArgs,
        iinfo: &VectorArgs,
        batch_count: usize,
    ) -> Result<()>;

    /// Apply pivot column interchanges in reverse order (inverse permutation)
    ///
    /// For j from n-1 down to 0: swap columns j and `ipiv[j] - 1` across all
    /// n rows. Un-permutes the columns of a computed inverse.
    fn apply_column_swaps(
        &self,
        n: usize,
        a: &MatrixArgs,
        ipiv: &VectorArgs,
        batch_count: usize,
    ) -> Result<()>;

    /// Extract the strictly-lower panel for blocked inversion
    ///
    /// Copies columns `j..j+jb` of the strictly-lower triangle of the n×n
    /// matrix `a` into `tmp` (an n×jb panel per instance) and zeroes the
    /// copied region in `a`.
    #[allow(clippy::too_many_arguments)]
    fn extract_lower_panel(
        &self,
        j: usize,
        jb: usize,
        n: usize,
        a: &MatrixArgs,
        tmp: &MatrixArgs,
        batch_count: usize,
    ) -> Result<()>;
}
