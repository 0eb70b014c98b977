//! Workspace planning and allocation
//!
//! The routines follow a two-phase, query-then-allocate memory protocol:
//! the `*_workspace` functions are pure — they map a problem shape to the
//! byte sizes of every named scratch role without touching the device, and
//! calling one twice with identical inputs always yields identical results.
//! Callers use them to query requirements ahead of time; the entry points
//! call the same functions again immediately before allocating, so the two
//! phases can never disagree.
//!
//! Composite routines (gesv, getri) take the elementwise maximum of their
//! constituents' sizes and AND their `optim_mem` flags: a composite can only
//! claim optimal-memory mode if every constituent can.
//!
//! Quick-return rule: if any dimension or the batch count is zero, every
//! size is 0 and `optim_mem` is true — no allocation is needed.

use super::{GETF2_SWITCHSIZE, GETRF_BLOCKSIZE, GETRI_BLOCKSIZE, TRSM_SUBST_LIMIT};
use crate::dtype::{Element, IndexInt};
use crate::error::Result;
use crate::matrix::VectorArgs;
use crate::runtime::blas::WorkBuffers;
use crate::runtime::Allocator;

/// Byte sizes of every named scratch role a routine may need
///
/// Roles a given shape does not need are 0. `optim_mem` is true when the
/// four general-purpose buffers may safely alias in-place operands (no
/// staging is required for this shape).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkspaceReq {
    /// Device-side scalar constants for BLAS calls
    pub scalars: usize,
    /// General scratch: staged triangular-solve / trailing-update operand
    pub work1: usize,
    /// General scratch: inverted diagonal blocks
    pub work2: usize,
    /// General scratch: per-instance operand table
    pub work3: usize,
    /// General scratch: per-instance operand table
    pub work4: usize,
    /// Candidate pivot values, one per instance
    pub pivot_val: usize,
    /// Candidate pivot offsets, one per instance
    pub pivot_idx: usize,
    /// Panel-local pivot array for internal sub-calls
    pub iipiv: usize,
    /// Internal info array for sub-call error capture
    pub iinfo: usize,
    /// Staging panel for blocked inversion
    pub tmpcopy: usize,
    /// Per-instance pointer table for batched layouts
    pub work_arr: usize,
    /// True when scratch buffers may alias ("optimal memory" mode)
    pub optim_mem: bool,
}

impl WorkspaceReq {
    /// The empty requirement: nothing to allocate, optimal-memory mode
    pub const fn none() -> Self {
        Self {
            scalars: 0,
            work1: 0,
            work2: 0,
            work3: 0,
            work4: 0,
            pivot_val: 0,
            pivot_idx: 0,
            iipiv: 0,
            iinfo: 0,
            tmpcopy: 0,
            work_arr: 0,
            optim_mem: true,
        }
    }

    /// Elementwise maximum of two requirements; `optim_mem` holds only when
    /// it holds for both
    pub fn max(self, other: &Self) -> Self {
        Self {
            scalars: self.scalars.max(other.scalars),
            work1: self.work1.max(other.work1),
            work2: self.work2.max(other.work2),
            work3: self.work3.max(other.work3),
            work4: self.work4.max(other.work4),
            pivot_val: self.pivot_val.max(other.pivot_val),
            pivot_idx: self.pivot_idx.max(other.pivot_idx),
            iipiv: self.iipiv.max(other.iipiv),
            iinfo: self.iinfo.max(other.iinfo),
            tmpcopy: self.tmpcopy.max(other.tmpcopy),
            work_arr: self.work_arr.max(other.work_arr),
            optim_mem: self.optim_mem && other.optim_mem,
        }
    }

    /// Total bytes across every role
    pub fn total_bytes(&self) -> usize {
        self.scalars
            + self.work1
            + self.work2
            + self.work3
            + self.work4
            + self.pivot_val
            + self.pivot_idx
            + self.iipiv
            + self.iinfo
            + self.tmpcopy
            + self.work_arr
    }
}

/// Sizes of the four general scratch roles for a triangular solve on an
/// m×n right-hand-side panel
fn trsm_sizes<T: Element>(
    m: usize,
    n: usize,
    batch_count: usize,
) -> (usize, usize, usize, usize, bool) {
    if m == 0 || n == 0 || batch_count == 0 {
        return (0, 0, 0, 0, true);
    }
    if m <= TRSM_SUBST_LIMIT && n <= TRSM_SUBST_LIMIT {
        // small panels substitute in place
        return (0, 0, 0, 0, true);
    }
    let elem = std::mem::size_of::<T>();
    let blk = m.min(TRSM_SUBST_LIMIT);
    let work1 = batch_count * m * n * elem;
    let work2 = batch_count * blk * blk * elem;
    let work3 = batch_count * std::mem::size_of::<u64>();
    let work4 = batch_count * std::mem::size_of::<u64>();
    (work1, work2, work3, work4, false)
}

/// Workspace required by the unblocked base-case factorization
pub fn getf2_workspace<T: Element, I: IndexInt>(
    m: usize,
    n: usize,
    pivot: bool,
    batch_count: usize,
) -> WorkspaceReq {
    if m == 0 || n == 0 || batch_count == 0 {
        return WorkspaceReq::none();
    }
    let mut req = WorkspaceReq::none();
    req.scalars = 3 * std::mem::size_of::<T>();
    if pivot {
        req.pivot_val = batch_count * std::mem::size_of::<T>();
        req.pivot_idx = batch_count * std::mem::size_of::<I>();
    }
    req
}

/// Workspace required by the panel-blocked factorization
pub fn getrf_workspace<T: Element, I: IndexInt>(
    m: usize,
    n: usize,
    pivot: bool,
    batch_count: usize,
) -> WorkspaceReq {
    if m == 0 || n == 0 || batch_count == 0 {
        return WorkspaceReq::none();
    }
    let mut req = getf2_workspace::<T, I>(m, n, pivot, batch_count);

    let dims = m.min(n);
    if dims > GETF2_SWITCHSIZE {
        let nb = GETRF_BLOCKSIZE;
        // worst-case trailing panel solved per iteration
        let (w1, w2, w3, w4, opt) = trsm_sizes::<T>(nb, n.saturating_sub(nb), batch_count);
        req.work1 = w1;
        req.work2 = w2;
        req.work3 = w3;
        req.work4 = w4;
        req.optim_mem = req.optim_mem && opt;
        req.iipiv = batch_count * nb.min(dims) * std::mem::size_of::<I>();
        req.iinfo = batch_count * std::mem::size_of::<I>();
    }
    req
}

/// Workspace required by the triangular solver
pub fn getrs_workspace<T: Element>(n: usize, nrhs: usize, batch_count: usize) -> WorkspaceReq {
    if n == 0 || nrhs == 0 || batch_count == 0 {
        return WorkspaceReq::none();
    }
    let mut req = WorkspaceReq::none();
    let (w1, w2, w3, w4, opt) = trsm_sizes::<T>(n, nrhs, batch_count);
    req.work1 = w1;
    req.work2 = w2;
    req.work3 = w3;
    req.work4 = w4;
    req.optim_mem = opt;
    req
}

/// Workspace required by the combined out-of-place solve
///
/// The composite takes the elementwise max of the factorization and solve
/// requirements and ANDs their optimal-memory flags.
pub fn gesv_outofplace_workspace<T: Element, I: IndexInt>(
    n: usize,
    nrhs: usize,
    batch_count: usize,
) -> WorkspaceReq {
    if n == 0 || nrhs == 0 || batch_count == 0 {
        return WorkspaceReq::none();
    }
    getrf_workspace::<T, I>(n, n, true, batch_count)
        .max(&getrs_workspace::<T>(n, nrhs, batch_count))
}

/// Workspace required by the inversion stage alone (factors already in place)
fn invert_workspace<T: Element>(n: usize, batch_count: usize) -> WorkspaceReq {
    let mut req = WorkspaceReq::none();
    let nb = GETRI_BLOCKSIZE.min(n);
    let (w1, w2, w3, w4, opt) = trsm_sizes::<T>(n, nb, batch_count);
    req.work1 = w1;
    req.work2 = w2;
    req.work3 = w3;
    req.work4 = w4;
    req.optim_mem = opt;
    req.tmpcopy = batch_count * n * nb * std::mem::size_of::<T>();
    req.work_arr = batch_count * std::mem::size_of::<u64>();
    req
}

/// Workspace required by matrix inversion (factor + invert)
pub fn getri_workspace<T: Element, I: IndexInt>(
    n: usize,
    pivot: bool,
    batch_count: usize,
) -> WorkspaceReq {
    if n == 0 || batch_count == 0 {
        return WorkspaceReq::none();
    }
    getrf_workspace::<T, I>(n, n, pivot, batch_count).max(&invert_workspace::<T>(n, batch_count))
}

/// Workspace required by out-of-place inversion
///
/// Identical to [`getri_workspace`]: the extra copy stage needs no scratch.
pub fn getri_outofplace_workspace<T: Element, I: IndexInt>(
    n: usize,
    pivot: bool,
    batch_count: usize,
) -> WorkspaceReq {
    getri_workspace::<T, I>(n, pivot, batch_count)
}

/// Allocated workspace buffers for one in-flight call
///
/// Buffers are owned by the external allocator for the call's duration and
/// released on drop. Each named role has its own handle — no numeric slot
/// indexing — and a handle of 0 means the role was not needed.
pub struct Workspace<A: Allocator> {
    alloc: A,
    owned: Vec<(u64, usize)>,
    /// Device-side scalar constants
    pub scalars: u64,
    /// General scratch role 1
    pub work1: u64,
    /// General scratch role 2
    pub work2: u64,
    /// General scratch role 3
    pub work3: u64,
    /// General scratch role 4
    pub work4: u64,
    /// Candidate pivot values
    pub pivot_val: u64,
    /// Candidate pivot offsets
    pub pivot_idx: u64,
    /// Panel-local pivot array
    pub iipiv: u64,
    /// Internal info array
    pub iinfo: u64,
    /// Inversion staging panel
    pub tmpcopy: u64,
    /// Per-instance pointer table
    pub work_arr: u64,
}

impl<A: Allocator> Workspace<A> {
    /// Allocate every non-zero role of `req`
    ///
    /// On failure, already-acquired buffers are returned to the allocator
    /// and the error surfaces with no caller-visible side effects.
    pub fn allocate(alloc: &A, req: &WorkspaceReq) -> Result<Self> {
        let sizes = [
            req.scalars,
            req.work1,
            req.work2,
            req.work3,
            req.work4,
            req.pivot_val,
            req.pivot_idx,
            req.iipiv,
            req.iinfo,
            req.tmpcopy,
            req.work_arr,
        ];

        let mut owned: Vec<(u64, usize)> = Vec::with_capacity(sizes.len());
        let mut handles = [0u64; 11];
        for (slot, &size) in handles.iter_mut().zip(sizes.iter()) {
            if size == 0 {
                continue;
            }
            match alloc.allocate(size) {
                Ok(ptr) => {
                    *slot = ptr;
                    owned.push((ptr, size));
                }
                Err(e) => {
                    for &(ptr, sz) in &owned {
                        alloc.deallocate(ptr, sz);
                    }
                    return Err(e);
                }
            }
        }

        Ok(Self {
            alloc: alloc.clone(),
            owned,
            scalars: handles[0],
            work1: handles[1],
            work2: handles[2],
            work3: handles[3],
            work4: handles[4],
            pivot_val: handles[5],
            pivot_idx: handles[6],
            iipiv: handles[7],
            iinfo: handles[8],
            tmpcopy: handles[9],
            work_arr: handles[10],
        })
    }

    /// The four general scratch roles, packaged for the BLAS-3 calls
    pub fn trsm_buffers(&self) -> WorkBuffers {
        WorkBuffers {
            work1: self.work1,
            work2: self.work2,
            work3: self.work3,
            work4: self.work4,
        }
    }

    /// Panel-local pivot array as a batched vector with `stride` entries
    /// per instance
    pub(crate) fn iipiv_args(&self, stride: usize) -> VectorArgs {
        VectorArgs {
            ptr: self.iipiv,
            shift: 0,
            stride: stride as i64,
        }
    }

    /// Internal info array as a batched vector
    pub(crate) fn iinfo_args(&self) -> VectorArgs {
        VectorArgs {
            ptr: self.iinfo,
            shift: 0,
            stride: 1,
        }
    }
}

impl<A: Allocator> Drop for Workspace<A> {
    fn drop(&mut self) {
        for (ptr, size) in self.owned.drain(..) {
            self.alloc.deallocate(ptr, size);
        }
    }
}
