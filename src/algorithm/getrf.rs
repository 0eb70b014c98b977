//! Panel-blocked LU factorization
//!
//! Processes the matrix in column panels of [`GETRF_BLOCKSIZE`] columns.
//! Each iteration factors the current panel with the unblocked base case,
//! folds the panel-local pivots and info into the caller's arrays, applies
//! the discovered row interchanges to the columns on both sides of the
//! panel, solves the block row against the panel's unit-lower factor, and
//! removes the panel's contribution from the trailing matrix with a rank-jb
//! multiply. Small problems skip the panel machinery and run the base case
//! directly.
//!
//! The minimal synchronization structure: pivot search and swap application
//! for a panel complete before that panel's trailing update starts (stream
//! issue order), while batch instances stay independent and parallel
//! throughout.

use super::getf2::getf2_loop;
use super::workspace::{getrf_workspace, Workspace};
use super::{
    check_info, check_lda, check_matrix, check_pivots, init_scalars, min_lda, SolverClient,
    GETF2_SWITCHSIZE, GETRF_BLOCKSIZE,
};
use crate::dtype::{IndexInt, LinalgElement};
use crate::error::Result;
use crate::matrix::{InfoArray, MatrixArgs, MatrixBatch, PivotBatch, VectorArgs};
use crate::runtime::blas::{BlasKernels, Diag, Fill, Operation, Side};
use crate::runtime::kernel::SolverKernels;
use crate::runtime::{Allocator, Runtime, RuntimeClient};

/// Blocked LU factorization with partial pivoting
///
/// Factors each m×n instance of `a` in place: the unit-lower factor L lands
/// in the subdiagonal, the upper factor U (including diagonal) overwrites
/// the rest. `ipiv` receives the 1-based row interchanges; `info[b]` is 0
/// for a clean factorization or the 1-based column of the first exactly-zero
/// pivot (the factorization still completes for its mathematical use).
pub fn getrf<R, T, I, C>(
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

    let req = getrf_workspace::<T, I>(m, n, true, batch_count);
    let ws = Workspace::allocate(client.allocator(), &req)?;
    init_scalars::<R, T>(ws.scalars, client.device());

    getrf_template::<T, I, C, _>(
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

/// Blocked LU factorization without pivoting
pub fn getrf_npvt<R, T, I, C>(
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

    let req = getrf_workspace::<T, I>(m, n, false, batch_count);
    let ws = Workspace::allocate(client.allocator(), &req)?;
    init_scalars::<R, T>(ws.scalars, client.device());

    getrf_template::<T, I, C, _>(client, m, n, &a.args(), None, &info.args(), batch_count, &ws)
}

/// Shared execution body for the blocked factorization
#[allow(clippy::too_many_arguments)]
pub(crate) fn getrf_template<T, I, C, A>(
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
    C: SolverKernels<T, I> + BlasKernels<T>,
    A: Allocator,
{
    // info=0 pre-pass, independent of the factorization; runs even on the
    // zero-size path
    client.reset_info(info, batch_count, I::zero())?;
    if m == 0 || n == 0 || batch_count == 0 {
        return Ok(());
    }

    let dims = m.min(n);
    if dims <= GETF2_SWITCHSIZE {
        return getf2_loop::<T, I, C, A>(client, m, n, a, ipiv, info, batch_count, ws);
    }

    let nb = GETRF_BLOCKSIZE;
    let work = ws.trsm_buffers();

    let mut j = 0;
    while j < dims {
        let jb = nb.min(dims - j);

        // factor panel A[j.., j..j+jb] against fresh panel-local arrays
        let panel = a.shifted(j as i64, j as i64);
        let iinfo = ws.iinfo_args();
        let iipiv = ws.iipiv_args(jb);
        client.reset_info(&iinfo, batch_count, I::zero())?;
        getf2_loop::<T, I, C, A>(
            client,
            m - j,
            jb,
            &panel,
            ipiv.is_some().then_some(&iipiv),
            &iinfo,
            batch_count,
            ws,
        )?;

        // fold panel-local pivots and first-failure info into the caller's
        // arrays (only the first singular column per instance wins)
        client.finalize_panel(j, jb, ipiv, &iipiv, info, &iinfo, batch_count)?;

        if let Some(piv) = ipiv {
            // the panel's interchanges apply matrix-wide: already-completed
            // columns on the left, untouched columns on the right
            if j > 0 {
                client.apply_row_swaps(j, a, j + 1, j + jb, piv, true, batch_count)?;
            }
            if j + jb < n {
                client.apply_row_swaps(
                    n - j - jb,
                    &a.shifted(0, (j + jb) as i64),
                    j + 1,
                    j + jb,
                    piv,
                    true,
                    batch_count,
                )?;
            }
        }

        if j + jb < n {
            // block-row solve: A[j, j+jb..] ← L[j,j]⁻¹ · A[j, j+jb..]
            let a11 = a.shifted(j as i64, j as i64);
            let a12 = a.shifted(j as i64, (j + jb) as i64);
            client.trsm(
                Side::Left,
                Fill::Lower,
                Operation::None,
                Diag::Unit,
                jb,
                n - j - jb,
                T::one(),
                &a11,
                &a12,
                batch_count,
                &work,
            )?;

            if j + jb < m {
                // trailing update: A22 ← A22 − A21 · A12
                let a21 = a.shifted((j + jb) as i64, j as i64);
                let a22 = a.shifted((j + jb) as i64, (j + jb) as i64);
                client.gemm(
                    Operation::None,
                    Operation::None,
                    m - j - jb,
                    n - j - jb,
                    jb,
                    -T::one(),
                    &a21,
                    &a12,
                    T::one(),
                    &a22,
                    batch_count,
                )?;
            }
        }

        j += jb;
    }
    Ok(())
}
