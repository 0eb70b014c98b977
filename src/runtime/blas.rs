//! Typed BLAS-3 kernel traits
//!
//! The dense matrix-multiply, triangular-solve, and triangular-inverse
//! kernels are external capabilities: the orchestration layer invokes them by
//! shape and semantics only and never reaches into their numerics. Each
//! backend implements `BlasKernels<T>` for every element type it supports,
//! so missing coverage is a compile error rather than a runtime surprise.

use crate::dtype::{Element, IndexInt};
use crate::error::Result;
use crate::matrix::{MatrixArgs, VectorArgs};

/// Operation applied to a matrix operand
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Use the matrix as stored
    None,
    /// Use the transpose
    Transpose,
    /// Use the conjugate transpose (same as Transpose for real types)
    ConjTranspose,
}

impl Operation {
    /// True for either transpose variant
    #[inline]
    pub fn is_transposed(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Which side a triangular operand appears on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// op(A) · X = B
    Left,
    /// X · op(A) = B
    Right,
}

/// Which triangle of a matrix is referenced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// Upper triangle (including diagonal)
    Upper,
    /// Lower triangle (including diagonal)
    Lower,
}

impl Fill {
    /// The opposite triangle
    #[inline]
    pub fn flip(self) -> Self {
        match self {
            Self::Upper => Self::Lower,
            Self::Lower => Self::Upper,
        }
    }
}

/// Whether the diagonal is taken as all-ones or read from storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diag {
    /// Implicit unit diagonal (diagonal entries are not referenced)
    Unit,
    /// Diagonal read from storage
    NonUnit,
}

/// The four reusable general-purpose scratch buffers threaded through the
/// BLAS-3 calls. Roles rotate between triangular-solve staging and
/// trailing-update operands depending on call phase; a zero pointer means
/// the planner decided the role is not needed for this shape ("optimal
/// memory" mode).
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkBuffers {
    /// Staged right-hand-side / trailing operand
    pub work1: u64,
    /// Inverted diagonal blocks
    pub work2: u64,
    /// Per-instance operand table
    pub work3: u64,
    /// Per-instance operand table
    pub work4: u64,
}

/// Typed BLAS-3 kernels
///
/// All operands are described by [`MatrixArgs`]; dimensions are passed
/// explicitly. Batch instances are independent and may execute in parallel;
/// every call runs on the client's logical stream in issue order.
pub trait BlasKernels<T: Element>: Send + Sync {
    /// General matrix multiply: C ← α·op(A)·op(B) + β·C
    ///
    /// `a` is m×k after op, `b` is k×n after op, `c` is m×n.
    /// When β = 0, C is not read.
    #[allow(clippy::too_many_arguments)]
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
    ) -> Result<()>;

    /// Triangular solve: B ← α·op(A)⁻¹·B (left) or α·B·op(A)⁻¹ (right)
    ///
    /// `a` is the triangular factor (m×m for left, n×n for right), `b` is
    /// m×n and is overwritten with the solution. The planner-provided
    /// `work` buffers stage operands when `work1` is nonzero; otherwise the
    /// substitution runs in place.
    #[allow(clippy::too_many_arguments)]
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
    ) -> Result<()>;

    /// Triangular matrix inversion in place: A ← A⁻¹
    ///
    /// `a` is n×n triangular per `uplo`/`diag`. For every instance whose
    /// diagonal contains an exact zero at (1-based) position k, info is set
    /// to k (first failure wins, existing nonzero info is kept) and that
    /// instance's inversion is skipped; the batch always completes. `I` is
    /// the index width of the info array.
    #[allow(clippy::too_many_arguments)]
    fn trtri<I: IndexInt>(
        &self,
        uplo: Fill,
        diag: Diag,
        n: usize,
        a: &MatrixArgs,
        info: &VectorArgs,
        batch_count: usize,
        work: &WorkBuffers,
    ) -> Result<()>;
}
