//! Combined factor-and-solve, out of place
//!
//! Composes the factorizer and the triangular solver: factor A in place
//! (always pivoted), copy B into the separate result buffer X, then solve
//! into X using the factors. The ordering matters — the solver mutates its
//! right-hand-side buffer, so the copy is what preserves the caller's B.
//! Net effect: A holds its LU factors, B is untouched, X holds the
//! solution.

use super::getrf::getrf_template;
use super::getrs::getrs_template;
use super::workspace::{gesv_outofplace_workspace, Workspace};
use super::{
    check_info, check_lda, check_matrix, check_pivots, init_scalars, min_lda, SolverClient,
};
use crate::dtype::{IndexInt, LinalgElement};
use crate::error::Result;
use crate::matrix::{InfoArray, MatrixBatch, PivotBatch};
use crate::runtime::blas::Operation;
use crate::runtime::kernel::SolverKernels;
use crate::runtime::{Runtime, RuntimeClient};

/// Solve A·X = B, leaving B unchanged
///
/// `a` is factored destructively (LU factors remain as a documented side
/// effect), `b` is read-only, `x` receives the solutions. Singularity is
/// reported per instance through `info` exactly as in the factorizer; the
/// solve still runs for flagged instances and propagates non-finite values.
#[allow(clippy::too_many_arguments)]
pub fn gesv_outofplace<R, T, I, C>(
    client: &C,
    n: usize,
    nrhs: usize,
    a: &MatrixBatch<R, T>,
    ipiv: &PivotBatch<R, I>,
    b: &MatrixBatch<R, T>,
    x: &MatrixBatch<R, T>,
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
    check_lda("b", b.lda(), min_lda(nrhs, b.inca()))?;
    check_lda("x", x.lda(), min_lda(nrhs, x.inca()))?;
    // 3. buffer coverage
    check_matrix("a", a, n, n, batch_count)?;
    check_pivots("ipiv", ipiv, n, batch_count)?;
    check_matrix("b", b, n, nrhs, batch_count)?;
    check_matrix("x", x, n, nrhs, batch_count)?;
    check_info("info", info, batch_count)?;

    let req = gesv_outofplace_workspace::<T, I>(n, nrhs, batch_count);
    let ws = Workspace::allocate(client.allocator(), &req)?;
    init_scalars::<R, T>(ws.scalars, client.device());

    if batch_count == 0 {
        return Ok(());
    }

    // info=0 before anything else (also covers the empty-problem path)
    client.reset_info(&info.args(), batch_count, I::zero())?;
    if n == 0 || nrhs == 0 {
        return Ok(());
    }

    // factor A in place
    getrf_template::<T, I, C, _>(
        client,
        n,
        n,
        &a.args(),
        Some(&ipiv.args()),
        &info.args(),
        batch_count,
        &ws,
    )?;

    // preserve B: solve happens in the copy
    client.copy_mat(n, nrhs, &b.args(), &x.args(), batch_count)?;

    getrs_template::<T, I, C, _>(
        client,
        Operation::None,
        n,
        nrhs,
        &a.args(),
        &ipiv.args(),
        &x.args(),
        batch_count,
        &ws,
    )
}
