//! Unblocked base-case LU factorization
//!
//! Column-by-column elimination with partial pivoting: per column, search
//! the subdiagonal for the largest-magnitude pivot candidate (ties break to
//! the lowest row index), apply the row interchange across the full panel
//! width, scale the subdiagonal by the pivot reciprocal, and rank-1-update
//! the trailing columns. A pivot computed as exactly zero flags info with
//! the 1-based column and skips the scale; the factorization continues so
//! the factors stay usable for their mathematical definition.
//!
//! The blocked factorizer recurses into this routine for each panel; the
//! public entry points expose it directly for small problems.

use super::workspace::{getf2_workspace, Workspace};
use super::{
    check_info, check_lda, check_matrix, check_pivots, init_scalars, min_lda, SolverClient,
};
use crate::dtype::{IndexInt, LinalgElement};
use crate::error::Result;
use crate::matrix::{InfoArray, MatrixArgs, MatrixBatch, PivotBatch, VectorArgs};
use crate::runtime::kernel::SolverKernels;
use crate::runtime::{Allocator, Runtime, RuntimeClient};

/// Unblocked LU factorization with partial pivoting
///
/// Factors each m×n instance of `a` in place as P·A = L·U, recording the
/// row interchanges in `ipiv` (1-based, LAPACK convention) and per-instance
/// singularity in `info`.
pub fn getf2<R, T, I, C>(
    client: &C,
    m: usize,
    n: usize,
    a: &MatrixBatch<R, T>,
    ipiv: &PivotBatch<R, I>,
    info: &InfoArray<R, I>,
    batch_count: usize,
) -> Result<()>
where
    R: Runtime,
    T: LinalgElement,
    I: IndexInt,
    C: SolverClient<R, T, I>,
{
    // 1. unsupported values: none for this routine
    // 2. sizes
    check_lda("a", a.lda(), min_lda(n, a.inca()))?;
    // 3. buffer coverage
    check_matrix("a", a, m, n, batch_count)?;
    check_pivots("ipiv", ipiv, m.min(n), batch_count)?;
    check_info("info", info, batch_count)?;

    let req = getf2_workspace::<T, I>(m, n, true, batch_count);
    let ws = Workspace::allocate(client.allocator(), &req)?;
    init_scalars::<R, T>(ws.scalars, client.device());

    getf2_template::<T, I, C, _>(
        client,
        m,
        n,
        &a.args(),
        Some(&ipiv.args()),
        &info.args(),
        batch_count,
        &ws,
    )
}

/// Unblocked LU factorization without pivoting
///
/// Mathematically an LU decomposition with no numerical-stability
/// guarantee; skips the pivot search and row interchanges entirely.
pub fn getf2_npvt<R, T, I, C>(
    client: &C,
    m: usize,
    n: usize,
    a: &MatrixBatch<R, T>,
    info: &InfoArray<R, I>,
    batch_count: usize,
) -> Result<()>
where
    R: Runtime,
    T: LinalgElement,
    I: IndexInt,
    C: SolverClient<R, T, I>,
{
    check_lda("a", a.lda(), min_lda(n, a.inca()))?;
    check_matrix("a", a, m, n, batch_count)?;
    check_info("info", info, batch_count)?;

    let req = getf2_workspace::<T, I>(m, n, false, batch_count);
    let ws = Workspace::allocate(client.allocator(), &req)?;
    init_scalars::<R, T>(ws.scalars, client.device());

    getf2_template::<T, I, C, _>(client, m, n, &a.args(), None, &info.args(), batch_count, &ws)
}

/// Shared execution body: info pre-pass, quick return, elimination loop
#[allow(clippy::too_many_arguments)]
pub(crate) fn getf2_template<T, I, C, A>(
    client: &C,
    m: usize,
    n: usize,
    a: &MatrixArgs,
    ipiv: Option<&VectorArgs>,
    info: &VectorArgs,
    batch_count: usize,
    ws: &Workspace<A>,
) -> Result<()>
where
    T: LinalgElement,
    I: IndexInt,
    C: SolverKernels<T, I>,
    A: Allocator,
{
    // info=0 pre-pass runs even on the degenerate path so stale values
    // never leak
    client.reset_info(info, batch_count, I::zero())?;
    if m == 0 || n == 0 || batch_count == 0 {
        return Ok(());
    }
    getf2_loop::<T, I, C, A>(client, m, n, a, ipiv, info, batch_count, ws)
}

/// The elimination loop itself, with info assumed already reset
///
/// Split out so the panel factorizer can drive it against a fresh internal
/// info array per panel.
#[allow(clippy::too_many_arguments)]
pub(crate) fn getf2_loop<T, I, C, A>(
    client: &C,
    m: usize,
    n: usize,
    a: &MatrixArgs,
    ipiv: Option<&VectorArgs>,
    info: &VectorArgs,
    batch_count: usize,
    ws: &Workspace<A>,
) -> Result<()>
where
    T: LinalgElement,
    I: IndexInt,
    C: SolverKernels<T, I>,
    A: Allocator,
{
    let dims = m.min(n);
    let pivot = ipiv.is_some();

    for j in 0..dims {
        if pivot {
            client.find_pivot(j, m, a, ws.pivot_val, ws.pivot_idx, batch_count)?;
        }
        let (pv, pi) = if pivot {
            (ws.pivot_val, ws.pivot_idx)
        } else {
            (0, 0)
        };
        // swap + scale must complete before the trailing update; both run
        // on the client's stream in issue order
        client.pivot_and_scale(j, m, n, a, ipiv, pv, pi, info, batch_count)?;
        client.rank1_update(j, m, n, a, batch_count)?;
    }
    Ok(())
}
