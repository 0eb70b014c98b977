//! Matrix, pivot, and info descriptors for single and batched problems
//!
//! A descriptor ties a [`Storage`] buffer to an addressing scheme: element
//! offset ("shift"), leading dimension, row/column increments, and the batch
//! layout. Matrices are row-major: element (i, j) of instance `b` lives at
//!
//! ```text
//! base(b) + shift + i * lda + j * inca
//! ```
//!
//! where `base(b)` is 0 for a single matrix, `b * stride` for strided
//! batches, or the b-th entry of a per-instance offset table. `inca` is
//! normally 1; other values give transposed or interleaved access.
//!
//! Descriptors are typed by element: constructing one checks the storage
//! dtype once, so the solver entry points are specialized at compile time
//! and never re-dispatch on a runtime dtype. They are cheap to clone
//! (storage is Arc-shared) and carry no problem dimensions: rows, columns,
//! and batch count are call arguments, validated against the descriptor at
//! every entry point.

use super::storage::Storage;
use crate::dtype::{DType, Element, IndexInt};
use crate::error::{Error, Result};
use crate::runtime::Runtime;
use std::fmt;
use std::marker::PhantomData;

/// How instances of a batch are addressed within storage
pub enum BatchLayout<R: Runtime> {
    /// One matrix, no batch dimension
    Single,
    /// Constant element stride between consecutive instances
    Strided {
        /// Elements between instance b and instance b+1
        stride: usize,
    },
    /// Per-instance element offsets (the pointer-array family): entry b of
    /// the I64 table is the base offset of instance b, allowing non-uniform
    /// spacing and reordering without moving data
    Offsets {
        /// I64 offset table with one entry per instance
        table: Storage<R>,
    },
}

impl<R: Runtime> Clone for BatchLayout<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Single => Self::Single,
            Self::Strided { stride } => Self::Strided { stride: *stride },
            Self::Offsets { table } => Self::Offsets {
                table: table.clone(),
            },
        }
    }
}

/// Raw kernel arguments describing a (possibly batched) matrix
///
/// This is the ABI between the orchestration layer and device kernels: plain
/// integers only, so it is `Copy + Send + Sync` and can cross into parallel
/// kernel bodies without borrowing device handles.
#[derive(Clone, Copy, Debug)]
pub struct MatrixArgs {
    /// Base device pointer
    pub ptr: u64,
    /// Element offset applied to every instance
    pub shift: i64,
    /// Leading dimension: elements between consecutive rows
    pub lda: i64,
    /// Increment between consecutive columns within a row (normally 1)
    pub inca: i64,
    /// Elements between consecutive instances (strided layouts; 0 otherwise)
    pub stride: i64,
    /// Device pointer to the per-instance offset table, or 0 if none
    pub offsets: u64,
}

impl MatrixArgs {
    /// Shift the descriptor to submatrix origin (i, j) of every instance
    #[inline]
    pub fn shifted(mut self, i: i64, j: i64) -> Self {
        self.shift += i * self.lda + j * self.inca;
        self
    }
}

/// Raw kernel arguments describing a batched integer vector (pivots, info)
#[derive(Clone, Copy, Debug)]
pub struct VectorArgs {
    /// Base device pointer
    pub ptr: u64,
    /// Element offset applied to every instance
    pub shift: i64,
    /// Elements between consecutive instances
    pub stride: i64,
}

impl VectorArgs {
    /// Shift the descriptor by `k` elements in every instance
    #[inline]
    pub fn shifted(mut self, k: i64) -> Self {
        self.shift += k;
        self
    }
}

fn check_dtype(got: DType, expected: DType) -> Result<()> {
    if got == expected {
        Ok(())
    } else {
        Err(Error::DTypeMismatch { expected, got })
    }
}

/// Handle to one matrix or a batch of matrices on a device
pub struct MatrixBatch<R: Runtime, T: Element> {
    storage: Storage<R>,
    shift: usize,
    lda: usize,
    inca: usize,
    layout: BatchLayout<R>,
    _elem: PhantomData<T>,
}

impl<R: Runtime, T: Element> MatrixBatch<R, T> {
    /// Single matrix with leading dimension `lda`
    pub fn single(storage: Storage<R>, lda: usize) -> Result<Self> {
        check_dtype(storage.dtype(), T::DTYPE)?;
        Ok(Self {
            storage,
            shift: 0,
            lda,
            inca: 1,
            layout: BatchLayout::Single,
            _elem: PhantomData,
        })
    }

    /// Strided batch: instance b starts at `b * stride`
    pub fn strided(storage: Storage<R>, lda: usize, stride: usize) -> Result<Self> {
        check_dtype(storage.dtype(), T::DTYPE)?;
        Ok(Self {
            storage,
            shift: 0,
            lda,
            inca: 1,
            layout: BatchLayout::Strided { stride },
            _elem: PhantomData,
        })
    }

    /// Batch addressed through a per-instance offset table
    pub fn by_offsets(storage: Storage<R>, lda: usize, table: Storage<R>) -> Result<Self> {
        check_dtype(storage.dtype(), T::DTYPE)?;
        check_dtype(table.dtype(), DType::I64)?;
        Ok(Self {
            storage,
            shift: 0,
            lda,
            inca: 1,
            layout: BatchLayout::Offsets { table },
            _elem: PhantomData,
        })
    }

    /// Apply an element offset to every instance
    pub fn with_shift(mut self, shift: usize) -> Self {
        self.shift = shift;
        self
    }

    /// Override the column increment (transposed-layout access)
    pub fn with_inca(mut self, inca: usize) -> Self {
        self.inca = inca;
        self
    }

    /// The underlying storage buffer
    #[inline]
    pub fn storage(&self) -> &Storage<R> {
        &self.storage
    }

    /// Leading dimension
    #[inline]
    pub fn lda(&self) -> usize {
        self.lda
    }

    /// Element offset
    #[inline]
    pub fn shift(&self) -> usize {
        self.shift
    }

    /// Column increment
    #[inline]
    pub fn inca(&self) -> usize {
        self.inca
    }

    /// Batch layout
    #[inline]
    pub fn layout(&self) -> &BatchLayout<R> {
        &self.layout
    }

    /// Build the raw kernel arguments for this descriptor
    pub fn args(&self) -> MatrixArgs {
        let (stride, offsets) = match &self.layout {
            BatchLayout::Single => (0, 0),
            BatchLayout::Strided { stride } => (*stride as i64, 0),
            BatchLayout::Offsets { table } => (0, table.ptr()),
        };
        MatrixArgs {
            ptr: self.storage.ptr(),
            shift: self.shift as i64,
            lda: self.lda as i64,
            inca: self.inca as i64,
            stride,
            offsets,
        }
    }

    /// Whether the storage covers an m×n region for every instance.
    ///
    /// For offset-table layouts only the table length is checked host-side;
    /// per-instance offsets are device-resident and trusted, mirroring the
    /// pointer-array contract where per-instance pointers cannot be validated
    /// without device work.
    pub(crate) fn covers(&self, m: usize, n: usize, batch_count: usize) -> bool {
        if m == 0 || n == 0 || batch_count == 0 {
            return true;
        }
        let extent = (m - 1) * self.lda + (n - 1) * self.inca + 1;
        match &self.layout {
            BatchLayout::Single => {
                batch_count <= 1 && self.shift + extent <= self.storage.len()
            }
            BatchLayout::Strided { stride } => {
                self.shift + (batch_count - 1) * stride + extent <= self.storage.len()
            }
            BatchLayout::Offsets { table } => {
                table.len() >= batch_count && self.shift + extent <= self.storage.len()
            }
        }
    }
}

impl<R: Runtime, T: Element> Clone for MatrixBatch<R, T> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            shift: self.shift,
            lda: self.lda,
            inca: self.inca,
            layout: self.layout.clone(),
            _elem: PhantomData,
        }
    }
}

impl<R: Runtime, T: Element> fmt::Debug for MatrixBatch<R, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatrixBatch")
            .field("shift", &self.shift)
            .field("lda", &self.lda)
            .field("inca", &self.inca)
            .finish()
    }
}

/// Handle to per-instance pivot vectors
///
/// Entry i of an instance records which (1-based) row was swapped into row i
/// during factorization; values lie in `[i+1, m]`.
pub struct PivotBatch<R: Runtime, I: IndexInt> {
    storage: Storage<R>,
    shift: usize,
    stride: usize,
    _elem: PhantomData<I>,
}

impl<R: Runtime, I: IndexInt> PivotBatch<R, I> {
    /// Pivot vectors packed `stride` elements apart
    pub fn strided(storage: Storage<R>, stride: usize) -> Result<Self> {
        check_dtype(storage.dtype(), I::DTYPE)?;
        Ok(Self {
            storage,
            shift: 0,
            stride,
            _elem: PhantomData,
        })
    }

    /// Single pivot vector (stride 0)
    pub fn single(storage: Storage<R>) -> Result<Self> {
        Self::strided(storage, 0)
    }

    /// The underlying storage buffer
    #[inline]
    pub fn storage(&self) -> &Storage<R> {
        &self.storage
    }

    /// Elements between consecutive instances
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Build the raw kernel arguments for this descriptor
    pub fn args(&self) -> VectorArgs {
        VectorArgs {
            ptr: self.storage.ptr(),
            shift: self.shift as i64,
            stride: self.stride as i64,
        }
    }

    /// Whether the storage holds `len` entries for every instance
    pub(crate) fn covers(&self, len: usize, batch_count: usize) -> bool {
        if len == 0 || batch_count == 0 {
            return true;
        }
        self.shift + (batch_count - 1) * self.stride + len <= self.storage.len()
    }
}

impl<R: Runtime, I: IndexInt> Clone for PivotBatch<R, I> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            shift: self.shift,
            stride: self.stride,
            _elem: PhantomData,
        }
    }
}

impl<R: Runtime, I: IndexInt> fmt::Debug for PivotBatch<R, I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PivotBatch")
            .field("shift", &self.shift)
            .field("stride", &self.stride)
            .finish()
    }
}

/// Handle to the per-instance info array (one entry per instance)
///
/// 0 means success; a positive value k means the matrix was found singular
/// at (1-based) column k. Singularity never aborts the batch.
pub struct InfoArray<R: Runtime, I: IndexInt> {
    storage: Storage<R>,
    _elem: PhantomData<I>,
}

impl<R: Runtime, I: IndexInt> InfoArray<R, I> {
    /// Wrap an integer buffer as an info array
    pub fn new(storage: Storage<R>) -> Result<Self> {
        check_dtype(storage.dtype(), I::DTYPE)?;
        Ok(Self {
            storage,
            _elem: PhantomData,
        })
    }

    /// The underlying storage buffer
    #[inline]
    pub fn storage(&self) -> &Storage<R> {
        &self.storage
    }

    /// Build the raw kernel arguments for this descriptor
    pub fn args(&self) -> VectorArgs {
        VectorArgs {
            ptr: self.storage.ptr(),
            shift: 0,
            stride: 1,
        }
    }

    /// Whether the storage holds one entry for every instance
    pub(crate) fn covers(&self, batch_count: usize) -> bool {
        self.storage.len() >= batch_count
    }
}

impl<R: Runtime, I: IndexInt> Clone for InfoArray<R, I> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            _elem: PhantomData,
        }
    }
}
