//! Error types for solvr

use crate::dtype::DType;
use thiserror::Error;

/// Result type alias using solvr's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in solvr operations
///
/// Numerical singularity is deliberately NOT represented here: it is reported
/// per batch instance through the info array and never escalates to a
/// call-level error.
#[derive(Error, Debug)]
pub enum Error {
    /// Negative, inconsistent, or out-of-range problem dimensions
    #[error("Invalid size for '{arg}': {reason}")]
    InvalidSize {
        /// The offending argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// A required buffer is missing or does not cover the described region
    #[error("Invalid buffer for '{arg}': storage does not cover the described region")]
    InvalidPointer {
        /// The offending argument name
        arg: &'static str,
    },

    /// Out of memory
    #[error("Out of memory: failed to allocate {size} bytes")]
    OutOfMemory {
        /// Requested size in bytes
        size: usize,
    },

    /// Unsupported dtype for an operation
    #[error("Unsupported dtype {dtype:?} for operation '{op}'")]
    UnsupportedDType {
        /// The unsupported dtype
        dtype: DType,
        /// The operation name
        op: &'static str,
    },

    /// DType mismatch between a typed call and the storage it addresses
    #[error("DType mismatch: expected {expected:?}, got {got:?}")]
    DTypeMismatch {
        /// Expected dtype
        expected: DType,
        /// Actual dtype
        got: DType,
    },

    /// Device mismatch between operands
    #[error("Device mismatch: buffers must be on the same device")]
    DeviceMismatch,

    /// Backend-specific error
    #[error("Backend error: {0}")]
    Backend(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Feature not yet implemented
    #[error("Not implemented: {feature}")]
    NotImplemented {
        /// Description of the unimplemented feature
        feature: &'static str,
    },
}

impl Error {
    /// Create an invalid size error
    pub fn invalid_size(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidSize {
            arg,
            reason: reason.into(),
        }
    }

    /// Create an invalid buffer error
    pub fn invalid_pointer(arg: &'static str) -> Self {
        Self::InvalidPointer { arg }
    }

    /// Create an unsupported dtype error
    pub fn unsupported_dtype(dtype: DType, op: &'static str) -> Self {
        Self::UnsupportedDType { dtype, op }
    }
}
