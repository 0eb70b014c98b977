//! Triangular solving from LU factors
//!
//! Given factors packed in A and the pivot vector from the factorizer,
//! solves op(A)·X = B in place in B. For op = None the permutation is
//! applied to B first (forward order, matching how the pivots were
//! recorded), followed by the unit-lower forward solve and the upper
//! backward solve. The transpose variants solve with Uᵀ (or Uᴴ) first, then
//! Lᵀ (Lᴴ), and apply the inverse permutation last.
//!
//! This routine does not re-check factorization info: a zero diagonal
//! flagged by getrf produces non-finite values here, by contract. Checking
//! info first is the caller's responsibility.

use super::workspace::{getrs_workspace, Workspace};
use super::{check_lda, check_matrix, check_pivots, min_lda, SolverClient};
use crate::dtype::{IndexInt, LinalgElement};
use crate::error::Result;
use crate::matrix::{MatrixArgs, MatrixBatch, PivotBatch, VectorArgs};
use crate::runtime::blas::{BlasKernels, Diag, Fill, Operation, Side};
use crate::runtime::kernel::SolverKernels;
use crate::runtime::{Allocator, Runtime, RuntimeClient};

/// Solve op(A)·X = B using factors and pivots from the factorizer
///
/// `a` holds the packed L/U factors of each n×n instance, `b` holds the
/// n×nrhs right-hand sides and is overwritten with the solutions.
#[allow(clippy::too_many_arguments)]
pub fn getrs<R, T, I, C>(
    client: &C,
    trans: Operation,
    n: usize,
    nrhs: usize,
    a: &MatrixBatch<R, T>,
    ipiv: &PivotBatch<R, I>,
    b: &MatrixBatch<R, T>,
    batch_count: usize,
) -> Result<()>
where
    R: Runtime,
    T: LinalgElement,
    I: IndexInt,
    C: SolverClient<R, T, I>,
{
    // 1. unsupported values: none (trans is a closed enum)
    // 2. sizes
    check_lda("a", a.lda(), min_lda(n, a.inca()))?;
    check_lda("b", b.lda(), min_lda(nrhs, b.inca()))?;
    // 3. buffer coverage
    check_matrix("a", a, n, n, batch_count)?;
    check_pivots("ipiv", ipiv, n, batch_count)?;
    check_matrix("b", b, n, nrhs, batch_count)?;

    let req = getrs_workspace::<T>(n, nrhs, batch_count);
    let ws = Workspace::allocate(client.allocator(), &req)?;

    getrs_template::<T, I, C, _>(
        client,
        trans,
        n,
        nrhs,
        &a.args(),
        &ipiv.args(),
        &b.args(),
        batch_count,
        &ws,
    )
}

/// Shared execution body for the triangular solver
#[allow(clippy::too_many_arguments)]
pub(crate) fn getrs_template<T, I, C, A>(
    client: &C,
    trans: Operation,
    n: usize,
    nrhs: usize,
    a: &MatrixArgs,
    ipiv: &VectorArgs,
    b: &MatrixArgs,
    batch_count: usize,
    ws: &Workspace<A>,
) -> Result<()>
where
    T: LinalgElement,
    I: IndexInt,
    C: SolverKernels<T, I> + BlasKernels<T>,
    A: Allocator,
{
    if n == 0 || nrhs == 0 || batch_count == 0 {
        return Ok(());
    }
    let work = ws.trsm_buffers();

    match trans {
        Operation::None => {
            // B ← P·B, then L·Y = B, then U·X = Y
            client.apply_row_swaps(nrhs, b, 1, n, ipiv, true, batch_count)?;
            client.trsm(
                Side::Left,
                Fill::Lower,
                Operation::None,
                Diag::Unit,
                n,
                nrhs,
                T::one(),
                a,
                b,
                batch_count,
                &work,
            )?;
            client.trsm(
                Side::Left,
                Fill::Upper,
                Operation::None,
                Diag::NonUnit,
                n,
                nrhs,
                T::one(),
                a,
                b,
                batch_count,
                &work,
            )?;
        }
        t => {
            // op(U)·Y = B, then op(L)·X = Y, then X ← P⁻¹·X
            client.trsm(
                Side::Left,
                Fill::Upper,
                t,
                Diag::NonUnit,
                n,
                nrhs,
                T::one(),
                a,
                b,
                batch_count,
                &work,
            )?;
            client.trsm(
                Side::Left,
                Fill::Lower,
                t,
                Diag::Unit,
                n,
                nrhs,
                T::one(),
                a,
                b,
                batch_count,
                &work,
            )?;
            client.apply_row_swaps(nrhs, b, 1, n, ipiv, false, batch_count)?;
        }
    }
    Ok(())
}
