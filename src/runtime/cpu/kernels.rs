//! CPU solver kernel implementations
//!
//! Reference implementations of the [`SolverKernels`] trait: raw-pointer
//! kernels over the batch descriptors, with rayon fan-out across batch
//! instances when the `rayon` feature is enabled. Instances write disjoint
//! memory, which is what makes the parallel fan-out sound.

use super::client::CpuClient;
use crate::dtype::{IndexInt, LinalgElement};
use crate::error::Result;
use crate::matrix::{MatrixArgs, VectorArgs};
use crate::runtime::kernel::SolverKernels;

/// Run `f` once per batch instance, in parallel when rayon is enabled
#[cfg(feature = "rayon")]
pub(crate) fn for_each_instance<F>(batch_count: usize, f: F)
where
    F: Fn(usize) + Send + Sync,
{
    use rayon::prelude::*;
    (0..batch_count).into_par_iter().for_each(f);
}

/// Run `f` once per batch instance, in parallel when rayon is enabled
#[cfg(not(feature = "rayon"))]
pub(crate) fn for_each_instance<F>(batch_count: usize, f: F)
where
    F: Fn(usize) + Send + Sync,
{
    for b in 0..batch_count {
        f(b);
    }
}

/// Element offset of instance `b` relative to the descriptor's shift
///
/// # Safety
/// For offset-table layouts the table must hold at least `b + 1` entries.
#[inline]
pub(crate) unsafe fn instance_offset(args: &MatrixArgs, b: usize) -> i64 {
    if args.offsets != 0 {
        *(args.offsets as *const i64).add(b)
    } else {
        args.stride * b as i64
    }
}

/// Base pointer of instance `b`
///
/// # Safety
/// The descriptor must address valid memory for instance `b`.
#[inline]
pub(crate) unsafe fn mat_ptr<T>(args: &MatrixArgs, b: usize) -> *mut T {
    (args.ptr as *mut T).offset((args.shift + instance_offset(args, b)) as isize)
}

/// Pointer to element (i, j) of an instance
///
/// # Safety
/// (i, j) must lie within the region the descriptor describes.
#[inline]
pub(crate) unsafe fn at<T>(base: *mut T, i: usize, j: usize, args: &MatrixArgs) -> *mut T {
    base.offset((i as i64 * args.lda + j as i64 * args.inca) as isize)
}

/// Base pointer of instance `b` of a batched vector
///
/// # Safety
/// The descriptor must address valid memory for instance `b`.
#[inline]
pub(crate) unsafe fn vec_ptr<T>(args: &VectorArgs, b: usize) -> *mut T {
    (args.ptr as *mut T).offset((args.shift + args.stride * b as i64) as isize)
}

impl<T: LinalgElement, I: IndexInt> SolverKernels<T, I> for CpuClient {
    fn reset_info(&self, info: &VectorArgs, batch_count: usize, value: I) -> Result<()> {
        let info = *info;
        for_each_instance(batch_count, |b| unsafe {
            *vec_ptr::<I>(&info, b) = value;
        });
        Ok(())
    }

    fn copy_mat(
        &self,
        m: usize,
        n: usize,
        src: &MatrixArgs,
        dst: &MatrixArgs,
        batch_count: usize,
    ) -> Result<()> {
        let (src, dst) = (*src, *dst);
        for_each_instance(batch_count, |b| unsafe {
            let s = mat_ptr::<T>(&src, b);
            let d = mat_ptr::<T>(&dst, b);
            for i in 0..m {
                for j in 0..n {
                    *at(d, i, j, &dst) = *at(s, i, j, &src);
                }
            }
        });
        Ok(())
    }

    fn apply_row_swaps(
        &self,
        n: usize,
        a: &MatrixArgs,
        k1: usize,
        k2: usize,
        ipiv: &VectorArgs,
        forward: bool,
        batch_count: usize,
    ) -> Result<()> {
        if n == 0 || k2 < k1 {
            return Ok(());
        }
        let (a, ipiv) = (*a, *ipiv);
        for_each_instance(batch_count, |b| unsafe {
            let base = mat_ptr::<T>(&a, b);
            let piv = vec_ptr::<I>(&ipiv, b);
            let swap_row = |i: usize| unsafe {
                let jp = (*piv.add(i - 1)).to_index();
                if jp != i {
                    for c in 0..n {
                        let x = at(base, i - 1, c, &a);
                        let y = at(base, jp - 1, c, &a);
                        std::ptr::swap(x, y);
                    }
                }
            };
            if forward {
                for i in k1..=k2 {
                    swap_row(i);
                }
            } else {
                for i in (k1..=k2).rev() {
                    swap_row(i);
                }
            }
        });
        Ok(())
    }

    fn find_pivot(
        &self,
        j: usize,
        m: usize,
        a: &MatrixArgs,
        pivot_val: u64,
        pivot_idx: u64,
        batch_count: usize,
    ) -> Result<()> {
        let a = *a;
        for_each_instance(batch_count, |b| unsafe {
            let base = mat_ptr::<T>(&a, b);
            let mut best = (*at(base, j, j, &a)).magnitude();
            let mut best_off = 0usize;
            // strict > keeps the lowest row index on ties
            for i in (j + 1)..m {
                let v = (*at(base, i, j, &a)).magnitude();
                if v > best {
                    best = v;
                    best_off = i - j;
                }
            }
            *(pivot_val as *mut T).add(b) = *at(base, j + best_off, j, &a);
            *(pivot_idx as *mut I).add(b) = I::from_index(best_off);
        });
        Ok(())
    }

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
    ) -> Result<()> {
        let a = *a;
        let ipiv = ipiv.copied();
        let info = *info;
        for_each_instance(batch_count, |b| unsafe {
            let base = mat_ptr::<T>(&a, b);

            let (off, pivot) = if pivot_idx != 0 {
                (
                    (*(pivot_idx as *const I).add(b)).to_index(),
                    *(pivot_val as *const T).add(b),
                )
            } else {
                (0, *at(base, j, j, &a))
            };

            if let Some(p) = &ipiv {
                *vec_ptr::<I>(p, b).add(j) = I::from_index(j + off + 1);
            }

            if off != 0 {
                for c in 0..n {
                    std::ptr::swap(at(base, j, c, &a), at(base, j + off, c, &a));
                }
            }

            if pivot.magnitude() == 0.0 {
                let ip = vec_ptr::<I>(&info, b);
                if *ip == I::zero() {
                    *ip = I::from_index(j + 1);
                }
                // zero pivot: column left unscaled, factorization continues
            } else {
                let inv = T::one() / pivot;
                for i in (j + 1)..m {
                    let p = at(base, i, j, &a);
                    *p = *p * inv;
                }
            }
        });
        Ok(())
    }

    fn rank1_update(
        &self,
        j: usize,
        m: usize,
        n: usize,
        a: &MatrixArgs,
        batch_count: usize,
    ) -> Result<()> {
        if j + 1 >= m || j + 1 >= n {
            return Ok(());
        }
        let a = *a;
        for_each_instance(batch_count, |b| unsafe {
            let base = mat_ptr::<T>(&a, b);
            for i in (j + 1)..m {
                let l = *at(base, i, j, &a);
                for c in (j + 1)..n {
                    let p = at(base, i, c, &a);
                    *p = *p - l * *at(base, j, c, &a);
                }
            }
        });
        Ok(())
    }

    fn finalize_panel(
        &self,
        j: usize,
        jb: usize,
        ipiv: Option<&VectorArgs>,
        iipiv: &VectorArgs,
        info: &VectorArgs,
        iinfo: &VectorArgs,
        batch_count: usize,
    ) -> Result<()> {
        let ipiv = ipiv.copied();
        let (iipiv, info, iinfo) = (*iipiv, *info, *iinfo);
        for_each_instance(batch_count, |b| unsafe {
            if let Some(p) = &ipiv {
                let dst = vec_ptr::<I>(p, b);
                let src = vec_ptr::<I>(&iipiv, b);
                for k in 0..jb {
                    *dst.add(j + k) = I::from_index((*src.add(k)).to_index() + j);
                }
            }
            let sub = *vec_ptr::<I>(&iinfo, b);
            if sub != I::zero() {
                let ip = vec_ptr::<I>(&info, b);
                if *ip == I::zero() {
                    *ip = I::from_index(sub.to_index() + j);
                }
            }
        });
        Ok(())
    }

    fn apply_column_swaps(
        &self,
        n: usize,
        a: &MatrixArgs,
        ipiv: &VectorArgs,
        batch_count: usize,
    ) -> Result<()> {
        let (a, ipiv) = (*a, *ipiv);
        for_each_instance(batch_count, |b| unsafe {
            let base = mat_ptr::<T>(&a, b);
            let piv = vec_ptr::<I>(&ipiv, b);
            for j in (0..n).rev() {
                let jp = (*piv.add(j)).to_index() - 1;
                if jp != j {
                    for i in 0..n {
                        std::ptr::swap(at(base, i, j, &a), at(base, i, jp, &a));
                    }
                }
            }
        });
        Ok(())
    }

    fn extract_lower_panel(
        &self,
        j: usize,
        jb: usize,
        n: usize,
        a: &MatrixArgs,
        tmp: &MatrixArgs,
        batch_count: usize,
    ) -> Result<()> {
        let (a, tmp) = (*a, *tmp);
        for_each_instance(batch_count, |b| unsafe {
            let ab = mat_ptr::<T>(&a, b);
            let tb = mat_ptr::<T>(&tmp, b);
            for i in (j + 1)..n {
                let cmax = (j + jb).min(i);
                for c in j..cmax {
                    let src = at(ab, i, c, &a);
                    *at(tb, i, c - j, &tmp) = *src;
                    *src = T::zero();
                }
            }
        });
        Ok(())
    }
}
