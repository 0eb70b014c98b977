//! Storage: device memory management with Arc-based sharing

use crate::dtype::{DType, Element};
use crate::error::Result;
use crate::runtime::Runtime;
use std::sync::Arc;

/// Storage for matrix data on a device
///
/// Storage wraps device memory with reference counting, enabling descriptors
/// (matrix batches, pivot vectors) that share the underlying buffer.
///
/// Memory is automatically deallocated when the last reference is dropped.
pub struct Storage<R: Runtime> {
    inner: Arc<StorageInner<R>>,
}

struct StorageInner<R: Runtime> {
    /// Raw device pointer (GPU address or CPU ptr cast to u64)
    ptr: u64,
    /// Number of elements (not bytes)
    len: usize,
    /// Element type
    dtype: DType,
    /// Device where memory is allocated
    device: R::Device,
    /// If true, we own this memory and should deallocate on drop
    owned: bool,
}

impl<R: Runtime> Storage<R> {
    /// Create new zero-initialized storage
    ///
    /// Allocates `len` elements of type `dtype` on the specified device.
    pub fn new(len: usize, dtype: DType, device: &R::Device) -> Result<Self> {
        let size_bytes = len * dtype.size_in_bytes();
        let ptr = R::allocate(size_bytes, device)?;

        Ok(Self {
            inner: Arc::new(StorageInner {
                ptr,
                len,
                dtype,
                device: device.clone(),
                owned: true,
            }),
        })
    }

    /// Create storage from existing data with inferred dtype
    ///
    /// Copies `data` to the device. The dtype is inferred from the Element type.
    pub fn from_slice<T: Element>(data: &[T], device: &R::Device) -> Result<Self> {
        let bytes = bytemuck::cast_slice(data);
        let ptr = R::allocate(bytes.len(), device)?;
        R::copy_to_device(bytes, ptr, device);

        Ok(Self {
            inner: Arc::new(StorageInner {
                ptr,
                len: data.len(),
                dtype: T::DTYPE,
                device: device.clone(),
                owned: true,
            }),
        })
    }

    /// Read the full buffer back to the host
    ///
    /// Synchronizes implicitly through the runtime's copy path; the caller is
    /// responsible for making sure pending kernels have completed (on the CPU
    /// backend every launch is synchronous so this is always safe).
    pub fn to_vec<T: Element>(&self) -> Vec<T> {
        debug_assert_eq!(T::DTYPE, self.inner.dtype);
        let mut out = vec![T::zeroed(); self.inner.len];
        if self.inner.len > 0 {
            R::copy_from_device(
                self.inner.ptr,
                bytemuck::cast_slice_mut(&mut out),
                &self.inner.device,
            );
        }
        out
    }

    /// Overwrite a range of elements from a host slice
    ///
    /// `offset` is in elements. The range must lie within the buffer.
    pub fn write_slice<T: Element>(&self, offset: usize, data: &[T]) {
        debug_assert!(offset + data.len() <= self.inner.len);
        let dst = self.inner.ptr + (offset * self.inner.dtype.size_in_bytes()) as u64;
        R::copy_to_device(bytemuck::cast_slice(data), dst, &self.inner.device);
    }

    /// Raw device pointer
    #[inline]
    pub fn ptr(&self) -> u64 {
        self.inner.ptr
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len
    }

    /// True if the buffer holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.len == 0
    }

    /// Element type of the buffer
    #[inline]
    pub fn dtype(&self) -> DType {
        self.inner.dtype
    }

    /// Device where the buffer lives
    #[inline]
    pub fn device(&self) -> &R::Device {
        &self.inner.device
    }
}

impl<R: Runtime> Clone for Storage<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Runtime> Drop for StorageInner<R> {
    fn drop(&mut self) {
        if self.owned && self.ptr != 0 {
            let size_bytes = self.len * self.dtype.size_in_bytes();
            R::deallocate(self.ptr, size_bytes, &self.device);
        }
    }
}
