//! Bounds-checked little-endian reading and writing of primitive values.
//!
//! Every heap captured from the managed runtime is stored in the byte order of the host that
//! produced it, which for all supported producers is little-endian. This module provides the
//! [`HeapIO`] trait and the free functions built on it that the [`crate::memory::Cursor`] uses
//! for every typed access.
//!
//! ## Supported Types
//! The [`HeapIO`] trait is implemented for:
//! - **Unsigned integers**: `u8`, `u16`, `u32`, `u64`
//! - **Signed integers**: `i8`, `i16`, `i32`, `i64`
//! - **Floating point**: `f32`, `f64`
//!
//! # Error Handling
//!
//! All functions return [`crate::Result<T>`] and fail with [`crate::Error::OutOfBounds`] when
//! the buffer holds fewer bytes than the value requires. A short read is never padded with
//! zeros.

use crate::Result;

/// Trait for primitive types that can be decoded from, and encoded into, heap bytes.
///
/// Each implementation names the fixed-size byte array it converts from. The conversion itself
/// is delegated to the standard `from_le_bytes`/`to_le_bytes` methods of the primitive.
pub trait HeapIO: Sized + Copy {
    /// Associated type representing the byte array type for this numeric type.
    type Bytes: Sized + AsRef<[u8]> + for<'a> TryFrom<&'a [u8]>;

    /// Size of the encoded value in bytes.
    const WIDTH: usize;

    /// Read T from a byte buffer in little-endian
    fn from_le_bytes(bytes: Self::Bytes) -> Self;

    /// Write T to a byte buffer in little-endian
    fn to_le_bytes(self) -> Self::Bytes;
}

macro_rules! impl_heap_io {
    ($($ty:ty => $n:literal),* $(,)?) => {
        $(
            impl HeapIO for $ty {
                type Bytes = [u8; $n];

                const WIDTH: usize = $n;

                fn from_le_bytes(bytes: Self::Bytes) -> Self {
                    <$ty>::from_le_bytes(bytes)
                }

                fn to_le_bytes(self) -> Self::Bytes {
                    <$ty>::to_le_bytes(self)
                }
            }
        )*
    };
}

impl_heap_io! {
    u8 => 1,
    i8 => 1,
    u16 => 2,
    i16 => 2,
    u32 => 4,
    i32 => 4,
    u64 => 8,
    i64 => 8,
    f32 => 4,
    f64 => 8,
}

/// Reads a `T` in little-endian from `data` at `offset` without moving any cursor.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if `offset + size_of::<T>()` exceeds `data.len()`.
pub fn read_le_at<T: HeapIO>(data: &[u8], offset: usize) -> Result<T> {
    let Some(end) = offset.checked_add(T::WIDTH) else {
        return Err(out_of_bounds_error!(offset, T::WIDTH, data.len()));
    };
    if end > data.len() {
        return Err(out_of_bounds_error!(offset, T::WIDTH, data.len()));
    }

    match T::Bytes::try_from(&data[offset..end]) {
        Ok(bytes) => Ok(T::from_le_bytes(bytes)),
        Err(_) => Err(out_of_bounds_error!(offset, T::WIDTH, data.len())),
    }
}

/// Writes `value` in little-endian into `data` at `offset`.
///
/// # Errors
/// Returns [`crate::Error::OutOfBounds`] if the value does not fit in the remaining buffer.
pub fn write_le_at<T: HeapIO>(data: &mut [u8], offset: usize, value: T) -> Result<()> {
    let len = data.len();
    let Some(end) = offset.checked_add(T::WIDTH) else {
        return Err(out_of_bounds_error!(offset, T::WIDTH, len));
    };
    if end > len {
        return Err(out_of_bounds_error!(offset, T::WIDTH, len));
    }

    data[offset..end].copy_from_slice(value.to_le_bytes().as_ref());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    const TEST_BUFFER: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];

    #[test]
    fn read_le_u8() {
        let result: u8 = read_le_at(&TEST_BUFFER, 0).unwrap();
        assert_eq!(result, 0x01);
    }

    #[test]
    fn read_le_u16() {
        let result: u16 = read_le_at(&TEST_BUFFER, 0).unwrap();
        assert_eq!(result, 0x0201);
    }

    #[test]
    fn read_le_u32_at_offset() {
        let result: u32 = read_le_at(&TEST_BUFFER, 4).unwrap();
        assert_eq!(result, 0x0807_0605);
    }

    #[test]
    fn read_le_u64() {
        let result: u64 = read_le_at(&TEST_BUFFER, 0).unwrap();
        assert_eq!(result, 0x0807_0605_0403_0201);
    }

    #[test]
    fn read_le_signed() {
        let data = (-2i32).to_le_bytes();
        let result: i32 = read_le_at(&data, 0).unwrap();
        assert_eq!(result, -2);
    }

    #[test]
    fn read_le_float() {
        let data = 1.5f64.to_le_bytes();
        let result: f64 = read_le_at(&data, 0).unwrap();
        assert!((result - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn read_past_end_fails() {
        let result = read_le_at::<u32>(&TEST_BUFFER, 6);
        assert!(matches!(
            result,
            Err(Error::OutOfBounds {
                offset: 6,
                width: 4,
                len: 8
            })
        ));
    }

    #[test]
    fn read_with_overflowing_offset_fails() {
        let result = read_le_at::<u16>(&TEST_BUFFER, usize::MAX);
        assert!(matches!(result, Err(Error::OutOfBounds { .. })));
    }

    #[test]
    fn write_le_u32() {
        let mut data = [0u8; 6];
        write_le_at(&mut data, 2, 0xAABB_CCDDu32).unwrap();
        assert_eq!(data, [0x00, 0x00, 0xDD, 0xCC, 0xBB, 0xAA]);
    }

    #[test]
    fn write_past_end_fails() {
        let mut data = [0u8; 4];
        assert!(write_le_at(&mut data, 1, 0u32).is_err());
        assert_eq!(data, [0u8; 4]);
    }
}
