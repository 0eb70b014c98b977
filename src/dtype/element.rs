//! Element trait for mapping Rust types to DType

use super::complex::{Complex64, Complex128};
use super::DType;
use bytemuck::{Pod, Zeroable};
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Trait for types that can be elements of a device buffer
///
/// This trait connects Rust's type system to solvr's runtime dtype system.
///
/// # Bounds
/// - `Copy + Clone + Send + Sync + 'static` - Basic trait requirements
/// - `Pod + Zeroable` - Safe memory transmutation (bytemuck)
/// - `Add + Sub + Mul + Div` - Arithmetic operations (Output = Self)
/// - `PartialOrd` - Comparison for pivot selection
pub trait Element:
    Copy
    + Clone
    + Send
    + Sync
    + Pod
    + Zeroable
    + 'static
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + PartialOrd
{
    /// The corresponding DType for this Rust type
    const DTYPE: DType;

    /// Convert to f64 for generic numeric operations
    ///
    /// For complex types this returns the **magnitude** (|z|), not the real
    /// part, consistent with PartialOrd using magnitude for comparison.
    fn to_f64(self) -> f64;

    /// Convert from f64 to this type
    ///
    /// For complex types this creates a real number (imaginary part = 0).
    fn from_f64(v: f64) -> Self;

    /// Zero value
    fn zero() -> Self;

    /// One value
    fn one() -> Self;
}

macro_rules! impl_real_element {
    ($t:ty, $dtype:expr) => {
        impl Element for $t {
            const DTYPE: DType = $dtype;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn from_f64(v: f64) -> Self {
                v as $t
            }

            #[inline]
            fn zero() -> Self {
                0 as $t
            }

            #[inline]
            fn one() -> Self {
                1 as $t
            }
        }
    };
}

impl_real_element!(f32, DType::F32);
impl_real_element!(f64, DType::F64);
impl_real_element!(i32, DType::I32);
impl_real_element!(i64, DType::I64);

impl Element for Complex64 {
    const DTYPE: DType = DType::Complex64;

    #[inline]
    fn to_f64(self) -> f64 {
        self.magnitude() as f64
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        Self::new(v as f32, 0.0)
    }

    #[inline]
    fn zero() -> Self {
        Self::ZERO
    }

    #[inline]
    fn one() -> Self {
        Self::ONE
    }
}

impl Element for Complex128 {
    const DTYPE: DType = DType::Complex128;

    #[inline]
    fn to_f64(self) -> f64 {
        self.magnitude()
    }

    #[inline]
    fn from_f64(v: f64) -> Self {
        Self::new(v, 0.0)
    }

    #[inline]
    fn zero() -> Self {
        Self::ZERO
    }

    #[inline]
    fn one() -> Self {
        Self::ONE
    }
}

/// Trait for elements that support the factorization/solve routines.
///
/// This trait extends `Element` with the operations the LU paths need:
/// magnitude comparison for pivot selection, conjugation for the
/// conjugate-transpose variants, and machine epsilon for residual scaling.
pub trait LinalgElement: Element + Neg<Output = Self> {
    /// Returns machine epsilon of the underlying real type
    fn epsilon_val() -> f64;

    /// Magnitude as f64 (|x| for real, |z| for complex)
    fn magnitude(&self) -> f64;

    /// Complex conjugate (identity for real types)
    fn conj_val(&self) -> Self;

    /// Square root (principal branch for complex)
    fn sqrt_val(&self) -> Self;
}

impl LinalgElement for f32 {
    #[inline]
    fn epsilon_val() -> f64 {
        f32::EPSILON as f64
    }
    #[inline]
    fn magnitude(&self) -> f64 {
        self.abs() as f64
    }
    #[inline]
    fn conj_val(&self) -> Self {
        *self
    }
    #[inline]
    fn sqrt_val(&self) -> Self {
        self.sqrt()
    }
}

impl LinalgElement for f64 {
    #[inline]
    fn epsilon_val() -> f64 {
        f64::EPSILON
    }
    #[inline]
    fn magnitude(&self) -> f64 {
        self.abs()
    }
    #[inline]
    fn conj_val(&self) -> Self {
        *self
    }
    #[inline]
    fn sqrt_val(&self) -> Self {
        self.sqrt()
    }
}

impl LinalgElement for Complex64 {
    #[inline]
    fn epsilon_val() -> f64 {
        f32::EPSILON as f64
    }
    #[inline]
    fn magnitude(&self) -> f64 {
        Complex64::magnitude(*self) as f64
    }
    #[inline]
    fn conj_val(&self) -> Self {
        self.conj()
    }
    #[inline]
    fn sqrt_val(&self) -> Self {
        Complex64::sqrt(*self)
    }
}

impl LinalgElement for Complex128 {
    #[inline]
    fn epsilon_val() -> f64 {
        f64::EPSILON
    }
    #[inline]
    fn magnitude(&self) -> f64 {
        Complex128::magnitude(*self)
    }
    #[inline]
    fn conj_val(&self) -> Self {
        self.conj()
    }
    #[inline]
    fn sqrt_val(&self) -> Self {
        Complex128::sqrt(*self)
    }
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
}

/// Index width for pivot and info arrays.
///
/// The solver entry points are instantiated over both 32-bit and 64-bit
/// index widths; pivot vectors and info arrays are stored with this type.
/// Sealed: only `i32` and `i64` are valid index widths.
pub trait IndexInt: Element + sealed::Sealed {
    /// Convert a host index to the stored width
    fn from_index(v: usize) -> Self;

    /// Convert a stored value back to a host index
    ///
    /// Values are produced by the factorization and are always non-negative.
    fn to_index(self) -> usize;
}

impl IndexInt for i32 {
    #[inline]
    fn from_index(v: usize) -> Self {
        v as i32
    }
    #[inline]
    fn to_index(self) -> usize {
        self as usize
    }
}

impl IndexInt for i64 {
    #[inline]
    fn from_index(v: usize) -> Self {
        v as i64
    }
    #[inline]
    fn to_index(self) -> usize {
        self as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_dtype_mapping() {
        assert_eq!(f32::DTYPE, DType::F32);
        assert_eq!(f64::DTYPE, DType::F64);
        assert_eq!(Complex64::DTYPE, DType::Complex64);
        assert_eq!(Complex128::DTYPE, DType::Complex128);
        assert_eq!(i32::DTYPE, DType::I32);
        assert_eq!(i64::DTYPE, DType::I64);
    }

    #[test]
    fn test_complex_magnitude_comparison() {
        let a = Complex128::new(3.0, 4.0);
        assert_eq!(LinalgElement::magnitude(&a), 5.0);
        assert_eq!(a.conj_val(), Complex128::new(3.0, -4.0));
    }

    #[test]
    fn test_index_roundtrip() {
        assert_eq!(i32::from_index(7).to_index(), 7);
        assert_eq!(i64::from_index(123).to_index(), 123);
    }
}
