//! CPU BLAS-3 kernel implementations
//!
//! Reference gemm/trsm/trtri over the batch descriptors. These are the
//! shape-and-semantics collaborators the orchestration layer calls into;
//! they make no attempt at microarchitectural tuning.

use super::client::CpuClient;
use super::kernels::{at, for_each_instance, mat_ptr, vec_ptr};
use crate::dtype::{IndexInt, LinalgElement};
use crate::error::Result;
use crate::matrix::{MatrixArgs, VectorArgs};
use crate::runtime::blas::{BlasKernels, Diag, Fill, Operation, Side, WorkBuffers};

/// Element (r, c) of op(A)
///
/// # Safety
/// The transposed/untransposed index must lie within A's region.
#[inline]
unsafe fn op_elem<T: LinalgElement>(
    base: *mut T,
    args: &MatrixArgs,
    trans: Operation,
    r: usize,
    c: usize,
) -> T {
    match trans {
        Operation::None => *at(base, r, c, args),
        Operation::Transpose => *at(base, c, r, args),
        Operation::ConjTranspose => (*at(base, c, r, args)).conj_val(),
    }
}

impl<T: LinalgElement> BlasKernels<T> for CpuClient {
    fn gemm(
        &self,
        transa: Operation,
        transb: Operation,
        m: usize,
        n: usize,
        k: usize,
        alpha: T,
        a: &MatrixArgs,
        b: &MatrixArgs,
        beta: T,
        c: &MatrixArgs,
        batch_count: usize,
    ) -> Result<()> {
        if m == 0 || n == 0 || batch_count == 0 {
            return Ok(());
        }
        let (a, b, c) = (*a, *b, *c);
        for_each_instance(batch_count, |bi| unsafe {
            let ab = mat_ptr::<T>(&a, bi);
            let bb = mat_ptr::<T>(&b, bi);
            let cb = mat_ptr::<T>(&c, bi);
            for i in 0..m {
                for j in 0..n {
                    let mut acc = T::zero();
                    for kk in 0..k {
                        acc = acc
                            + op_elem(ab, &a, transa, i, kk) * op_elem(bb, &b, transb, kk, j);
                    }
                    let cp = at(cb, i, j, &c);
                    // beta = 0 means C is not read
                    *cp = if beta == T::zero() {
                        alpha * acc
                    } else {
                        alpha * acc + beta * *cp
                    };
                }
            }
        });
        Ok(())
    }

    fn trsm(
        &self,
        side: Side,
        uplo: Fill,
        trans: Operation,
        diag: Diag,
        m: usize,
        n: usize,
        alpha: T,
        a: &MatrixArgs,
        b: &MatrixArgs,
        batch_count: usize,
        work: &WorkBuffers,
    ) -> Result<()> {
        if m == 0 || n == 0 || batch_count == 0 {
            return Ok(());
        }
        let (a, bargs) = (*a, *b);
        let work1 = work.work1;
        // the stored triangle referenced after applying op(A)
        let eff_upper = matches!(
            (uplo, trans.is_transposed()),
            (Fill::Upper, false) | (Fill::Lower, true)
        );
        for_each_instance(batch_count, |bi| unsafe {
            let ab = mat_ptr::<T>(&a, bi);
            let bb = mat_ptr::<T>(&bargs, bi);

            // stage B out of place when the planner provided a buffer
            let staged = work1 != 0;
            let stage_args = MatrixArgs {
                ptr: work1 + (bi * m * n * std::mem::size_of::<T>()) as u64,
                shift: 0,
                lda: n as i64,
                inca: 1,
                stride: 0,
                offsets: 0,
            };
            let (xb, xargs) = if staged {
                let sp = stage_args.ptr as *mut T;
                for i in 0..m {
                    for j in 0..n {
                        *at(sp, i, j, &stage_args) = *at(bb, i, j, &bargs);
                    }
                }
                (sp, stage_args)
            } else {
                (bb, bargs)
            };

            if alpha != T::one() {
                for i in 0..m {
                    for j in 0..n {
                        let p = at(xb, i, j, &xargs);
                        *p = alpha * *p;
                    }
                }
            }

            match side {
                Side::Left => {
                    // op(A) X = B, A is m×m
                    for j in 0..n {
                        if eff_upper {
                            for i in (0..m).rev() {
                                let mut sum = T::zero();
                                for kk in (i + 1)..m {
                                    sum = sum
                                        + op_elem(ab, &a, trans, i, kk) * *at(xb, kk, j, &xargs);
                                }
                                let mut v = *at(xb, i, j, &xargs) - sum;
                                if diag == Diag::NonUnit {
                                    v = v / op_elem(ab, &a, trans, i, i);
                                }
                                *at(xb, i, j, &xargs) = v;
                            }
                        } else {
                            for i in 0..m {
                                let mut sum = T::zero();
                                for kk in 0..i {
                                    sum = sum
                                        + op_elem(ab, &a, trans, i, kk) * *at(xb, kk, j, &xargs);
                                }
                                let mut v = *at(xb, i, j, &xargs) - sum;
                                if diag == Diag::NonUnit {
                                    v = v / op_elem(ab, &a, trans, i, i);
                                }
                                *at(xb, i, j, &xargs) = v;
                            }
                        }
                    }
                }
                Side::Right => {
                    // X op(A) = B, A is n×n
                    if eff_upper {
                        for j in 0..n {
                            for i in 0..m {
                                let mut sum = T::zero();
                                for kk in 0..j {
                                    sum = sum
                                        + *at(xb, i, kk, &xargs) * op_elem(ab, &a, trans, kk, j);
                                }
                                let mut v = *at(xb, i, j, &xargs) - sum;
                                if diag == Diag::NonUnit {
                                    v = v / op_elem(ab, &a, trans, j, j);
                                }
                                *at(xb, i, j, &xargs) = v;
                            }
                        }
                    } else {
                        for j in (0..n).rev() {
                            for i in 0..m {
                                let mut sum = T::zero();
                                for kk in (j + 1)..n {
                                    sum = sum
                                        + *at(xb, i, kk, &xargs) * op_elem(ab, &a, trans, kk, j);
                                }
                                let mut v = *at(xb, i, j, &xargs) - sum;
                                if diag == Diag::NonUnit {
                                    v = v / op_elem(ab, &a, trans, j, j);
                                }
                                *at(xb, i, j, &xargs) = v;
                            }
                        }
                    }
                }
            }

            if staged {
                for i in 0..m {
                    for j in 0..n {
                        *at(bb, i, j, &bargs) = *at(xb, i, j, &xargs);
                    }
                }
            }
        });
        Ok(())
    }

    fn trtri<I: IndexInt>(
        &self,
        uplo: Fill,
        diag: Diag,
        n: usize,
        a: &MatrixArgs,
        info: &VectorArgs,
        batch_count: usize,
        _work: &WorkBuffers,
    ) -> Result<()> {
        if n == 0 || batch_count == 0 {
            return Ok(());
        }
        let (a, info) = (*a, *info);
        for_each_instance(batch_count, |bi| unsafe {
            let ab = mat_ptr::<T>(&a, bi);

            if diag == Diag::NonUnit {
                // singularity scan: a zero diagonal flags info and skips the
                // instance; the batch always completes
                for i in 0..n {
                    if (*at(ab, i, i, &a)).magnitude() == 0.0 {
                        let ip = vec_ptr::<I>(&info, bi);
                        if *ip == I::zero() {
                            *ip = I::from_index(i + 1);
                        }
                        return;
                    }
                }
            }

            match uplo {
                Fill::Upper => {
                    for j in 0..n {
                        let ajj = if diag == Diag::NonUnit {
                            let d = at(ab, j, j, &a);
                            *d = T::one() / *d;
                            -*d
                        } else {
                            -T::one()
                        };
                        // column j above the diagonal: x ← -inv(a_jj) · U⁻¹(0..j) · x,
                        // ascending so x_k (k > i) is read pre-update
                        for i in 0..j {
                            let mut sum = if diag == Diag::NonUnit {
                                *at(ab, i, i, &a) * *at(ab, i, j, &a)
                            } else {
                                *at(ab, i, j, &a)
                            };
                            for kk in (i + 1)..j {
                                sum = sum + *at(ab, i, kk, &a) * *at(ab, kk, j, &a);
                            }
                            *at(ab, i, j, &a) = ajj * sum;
                        }
                    }
                }
                Fill::Lower => {
                    for j in (0..n).rev() {
                        let ajj = if diag == Diag::NonUnit {
                            let d = at(ab, j, j, &a);
                            *d = T::one() / *d;
                            -*d
                        } else {
                            -T::one()
                        };
                        // column j below the diagonal, descending
                        for i in ((j + 1)..n).rev() {
                            let mut sum = if diag == Diag::NonUnit {
                                *at(ab, i, i, &a) * *at(ab, i, j, &a)
                            } else {
                                *at(ab, i, j, &a)
                            };
                            for kk in (j + 1)..i {
                                sum = sum + *at(ab, i, kk, &a) * *at(ab, kk, j, &a);
                            }
                            *at(ab, i, j, &a) = ajj * sum;
                        }
                    }
                }
            }
        });
        Ok(())
    }
}
