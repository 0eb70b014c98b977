//! Matrix inversion via LU factorization
//!
//! Factors A, inverts the upper-triangular factor U directly, then solves
//! L·X = U⁻¹ by blocked back-substitution: column blocks are processed
//! right to left, each block's strictly-lower panel staged out to workspace
//! and zeroed in A, the trailing contribution removed with a multiply, and
//! the block solved against the staged unit-lower diagonal block. The
//! pivoted form finishes by un-permuting columns in reverse order.
//!
//! Instances flagged singular keep their info value and skip the
//! triangular inversion; their inverse is undefined but the batch always
//! completes.

use super::getrf::getrf_template;
use super::workspace::{getri_outofplace_workspace, getri_workspace, Workspace};
use super::{
    check_info, check_lda, check_matrix, check_pivots, init_scalars, min_lda, SolverClient,
    GETRI_BLOCKSIZE,
};
use crate::dtype::{IndexInt, LinalgElement};
use crate::error::Result;
use crate::matrix::{InfoArray, MatrixArgs, MatrixBatch, PivotBatch, VectorArgs};
use crate::runtime::blas::{BlasKernels, Diag, Fill, Operation, Side};
use crate::runtime::kernel::SolverKernels;
use crate::runtime::{Allocator, Runtime, RuntimeClient};

/// Invert each n×n instance of `a` in place (factor + invert)
///
/// On return `a` holds A⁻¹ for every instance with info 0; `ipiv` holds the
/// factorization's interchanges and `info` its singularity report.
pub fn getri<R, T, I, C>(
    client: &C,
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
    check_matrix("a", a, n, n, batch_count)?;
    check_pivots("ipiv", ipiv, n, batch_count)?;
    check_info("info", info, batch_count)?;

    let req = getri_workspace::<T, I>(n, true, batch_count);
    let ws = Workspace::allocate(client.allocator(), &req)?;
    init_scalars::<R, T>(ws.scalars, client.device());

    let a_args = a.args();
    getrf_template::<T, I, C, _>(
        client,
        n,
        n,
        &a_args,
        Some(&ipiv.args()),
        &info.args(),
        batch_count,
        &ws,
    )?;
    invert_template::<T, I, C, _>(
        client,
        n,
        &a_args,
        Some(&ipiv.args()),
        &info.args(),
        batch_count,
        &ws,
    )
}

/// Invert in place without pivoting
pub fn getri_npvt<R, T, I, C>(
    client: &C,
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
    check_matrix("a", a, n, n, batch_count)?;
    check_info("info", info, batch_count)?;

    let req = getri_workspace::<T, I>(n, false, batch_count);
    let ws = Workspace::allocate(client.allocator(), &req)?;
    init_scalars::<R, T>(ws.scalars, client.device());

    let a_args = a.args();
    getrf_template::<T, I, C, _>(client, n, n, &a_args, None, &info.args(), batch_count, &ws)?;
    invert_template::<T, I, C, _>(client, n, &a_args, None, &info.args(), batch_count, &ws)
}

/// Invert out of place: factor `a`, write the inverse to `c`
///
/// On return `a` holds the raw LU factors (a documented, caller-visible
/// side effect) and `c` holds the inverse.
#[allow(clippy::too_many_arguments)]
pub fn getri_outofplace<R, T, I, C>(
    client: &C,
    n: usize,
    a: &MatrixBatch<R, T>,
    ipiv: &PivotBatch<R, I>,
    c: &MatrixBatch<R, T>,
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
    check_lda("c", c.lda(), min_lda(n, c.inca()))?;
    check_matrix("a", a, n, n, batch_count)?;
    check_pivots("ipiv", ipiv, n, batch_count)?;
    check_matrix("c", c, n, n, batch_count)?;
    check_info("info", info, batch_count)?;

    let req = getri_outofplace_workspace::<T, I>(n, true, batch_count);
    let ws = Workspace::allocate(client.allocator(), &req)?;
    init_scalars::<R, T>(ws.scalars, client.device());

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
    if n == 0 || batch_count == 0 {
        return Ok(());
    }
    // A keeps the factors; the inversion proceeds on the copy
    client.copy_mat(n, n, &a.args(), &c.args(), batch_count)?;
    invert_template::<T, I, C, _>(
        client,
        n,
        &c.args(),
        Some(&ipiv.args()),
        &info.args(),
        batch_count,
        &ws,
    )
}

/// Inversion stage: factors already in place, info already populated
#[allow(clippy::too_many_arguments)]
fn invert_template<T, I, C, A>(
    client: &C,
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
    if n == 0 || batch_count == 0 {
        return Ok(());
    }
    let work = ws.trsm_buffers();

    // invert U in place; singular instances are flagged and skipped
    client.trtri::<I>(Fill::Upper, Diag::NonUnit, n, a, info, batch_count, &work)?;

    // blocked solve of L·X = U⁻¹, column blocks right to left
    let nb = GETRI_BLOCKSIZE.min(n);
    let tmp = MatrixArgs {
        ptr: ws.tmpcopy,
        shift: 0,
        lda: nb as i64,
        inca: 1,
        stride: (n * nb) as i64,
        offsets: 0,
    };

    let nblocks = n.div_ceil(nb);
    for blk in (0..nblocks).rev() {
        let j = blk * nb;
        let jb = nb.min(n - j);

        // stage the strictly-lower panel out of A and zero it there
        client.extract_lower_panel(j, jb, n, a, &tmp, batch_count)?;

        if j + jb < n {
            // remove the trailing blocks' contribution:
            // A[:, j..j+jb] −= A[:, j+jb..] · L[j+jb.., j..j+jb]
            client.gemm(
                Operation::None,
                Operation::None,
                n,
                jb,
                n - j - jb,
                -T::one(),
                &a.shifted(0, (j + jb) as i64),
                &tmp.shifted((j + jb) as i64, 0),
                T::one(),
                &a.shifted(0, j as i64),
                batch_count,
            )?;
        }

        // A[:, j..j+jb] ← A[:, j..j+jb] · L₁₁⁻¹
        client.trsm(
            Side::Right,
            Fill::Lower,
            Operation::None,
            Diag::Unit,
            n,
            jb,
            T::one(),
            &tmp.shifted(j as i64, 0),
            &a.shifted(0, j as i64),
            batch_count,
            &work,
        )?;
    }

    // undo the factorization's row interchanges as column interchanges
    if let Some(piv) = ipiv {
        client.apply_column_swaps(n, a, piv, batch_count)?;
    }
    Ok(())
}
