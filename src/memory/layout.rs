//! Object layout constants of the producing runtime.
//!
//! Decoding a heap capture requires knowing how the runtime that produced it lays out its
//! objects. Two kinds of facts are involved:
//!
//! - [`VmLayout`] carries the constants the producer reports alongside every capture: pointer
//!   width, object and array header sizes and the offsets of the array header fields.
//! - [`RuntimeAbi`] carries the facts the producer does *not* report but which changed between
//!   producer versions: how wide the array length fields are, the stride of the
//!   multi-dimensional bounds table and how native objects refer to their class.
//!
//! [`RuntimeAbi`] is plain data, selected once per snapshot from the declared
//! [`ProducerVersion`] via [`RuntimeAbi::for_producer`], and passed to every decode call that
//! depends on it.
//!
//! # Examples
//!
//! ```rust
//! use snapscope::{HeaderField, ProducerVersion, RuntimeAbi};
//!
//! let abi = RuntimeAbi::for_producer(ProducerVersion::new(2018, 4), 8);
//! assert_eq!(abi.array_size_field, HeaderField::Pointer);
//! assert_eq!(abi.bounds_stride, 16);
//!
//! let old = RuntimeAbi::for_producer(ProducerVersion::new(5, 4), 8);
//! assert_eq!(old.bounds_stride, 8);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{memory::cursor::Cursor, Error, Result};

/// Layout constants reported by the producing virtual machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmLayout {
    /// Width of a pointer in bytes, 4 or 8
    pub pointer_size: u32,
    /// Size of the header preceding every managed object's fields
    pub object_header_size: u32,
    /// Size of the header preceding every array's elements
    pub array_header_size: u32,
    /// Offset of the bounds-table pointer within an array header
    pub array_bounds_offset_in_header: u32,
    /// Offset of the length field within an array header
    pub array_size_offset_in_header: u32,
    /// Allocation granularity of the managed heap
    pub allocation_granularity: u32,
    /// Version of the heap format written by the producer
    pub heap_format_version: u32,
}

impl VmLayout {
    /// Layout of a 64-bit Mono runtime.
    #[must_use]
    pub const fn mono_64() -> Self {
        VmLayout {
            pointer_size: 8,
            object_header_size: 16,
            array_header_size: 32,
            array_bounds_offset_in_header: 16,
            array_size_offset_in_header: 24,
            allocation_granularity: 16,
            heap_format_version: 2017,
        }
    }

    /// Layout of a 32-bit Mono runtime.
    #[must_use]
    pub const fn mono_32() -> Self {
        VmLayout {
            pointer_size: 4,
            object_header_size: 8,
            array_header_size: 16,
            array_bounds_offset_in_header: 8,
            array_size_offset_in_header: 12,
            allocation_granularity: 8,
            heap_format_version: 2017,
        }
    }

    /// Checks that the declared pointer width is supported.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidPointerSize`] unless the width is 4 or 8.
    pub fn validate(&self) -> Result<()> {
        match self.pointer_size {
            4 | 8 => Ok(()),
            other => Err(Error::InvalidPointerSize(other)),
        }
    }
}

impl Default for VmLayout {
    fn default() -> Self {
        Self::mono_64()
    }
}

/// Version of the engine that produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ProducerVersion {
    /// Major version, e.g. `2017` or `5`
    pub major: u32,
    /// Minor version
    pub minor: u32,
}

impl ProducerVersion {
    /// First producer that stores array lengths and bounds as pointer-width integers.
    pub const POINTER_SIZED_ARRAY_FIELDS: ProducerVersion = ProducerVersion::new(2017, 2);

    /// First producer whose native objects reference their class by native type table index.
    pub const NATIVE_TYPE_ARRAY_INDEX: ProducerVersion = ProducerVersion::new(5, 6);

    /// Creates a version from its components.
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        ProducerVersion { major, minor }
    }
}

impl Default for ProducerVersion {
    fn default() -> Self {
        Self::POINTER_SIZED_ARRAY_FIELDS
    }
}

impl fmt::Display for ProducerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Storage width of an integer field in an array header or bounds table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    /// A 32-bit signed integer
    Int32,
    /// An unsigned integer of the runtime's pointer width
    Pointer,
}

impl HeaderField {
    /// Reads the field at `cursor` and widens it to `i64`.
    ///
    /// Pointer-width values beyond `i64::MAX` saturate; callers range-check the result.
    ///
    /// # Errors
    /// Returns a decode error if the field runs off its section.
    pub fn read(self, cursor: &Cursor<'_>) -> Result<i64> {
        match self {
            HeaderField::Int32 => Ok(i64::from(cursor.read_i32()?)),
            HeaderField::Pointer => {
                Ok(i64::try_from(cursor.read_pointer()?).unwrap_or(i64::MAX))
            }
        }
    }
}

/// How a packed native object identifies its class in the native type table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeClassIndex {
    /// The object's `class_id` is the index into the native type table
    ClassId,
    /// The object's `native_type_array_index` is the index into the native type table
    NativeTypeArrayIndex,
}

/// Runtime-version-dependent decoding rules that the producer does not report itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeAbi {
    /// Width of the length field of single-dimensional arrays
    pub array_size_field: HeaderField,
    /// Width of each extent in a multi-dimensional bounds table
    pub bounds_extent: HeaderField,
    /// Distance in bytes between consecutive bounds table entries
    pub bounds_stride: usize,
    /// Which packed field selects a native object's class
    pub native_class_index: NativeClassIndex,
}

impl RuntimeAbi {
    /// Rules for producers that predate pointer-width array fields.
    #[must_use]
    pub const fn legacy() -> Self {
        RuntimeAbi {
            array_size_field: HeaderField::Int32,
            bounds_extent: HeaderField::Int32,
            bounds_stride: 8,
            native_class_index: NativeClassIndex::ClassId,
        }
    }

    /// Rules for current producers with the given pointer width.
    #[must_use]
    pub const fn modern(pointer_size: u32) -> Self {
        RuntimeAbi {
            array_size_field: HeaderField::Pointer,
            bounds_extent: HeaderField::Pointer,
            bounds_stride: if pointer_size == 4 { 8 } else { 16 },
            native_class_index: NativeClassIndex::NativeTypeArrayIndex,
        }
    }

    /// Selects the rules matching `version`.
    #[must_use]
    pub fn for_producer(version: ProducerVersion, pointer_size: u32) -> Self {
        let mut abi = if version >= ProducerVersion::POINTER_SIZED_ARRAY_FIELDS {
            Self::modern(pointer_size)
        } else {
            Self::legacy()
        };

        abi.native_class_index = if version >= ProducerVersion::NATIVE_TYPE_ARRAY_INDEX {
            NativeClassIndex::NativeTypeArrayIndex
        } else {
            NativeClassIndex::ClassId
        };
        abi
    }
}

impl Default for RuntimeAbi {
    fn default() -> Self {
        Self::modern(8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn producer_versions_order() {
        assert!(ProducerVersion::new(2017, 2) > ProducerVersion::new(2017, 1));
        assert!(ProducerVersion::new(2017, 1) > ProducerVersion::new(5, 6));
        assert_eq!(ProducerVersion::new(2019, 3).to_string(), "2019.3");
    }

    #[test]
    fn abi_selection_by_version() {
        let modern = RuntimeAbi::for_producer(ProducerVersion::new(2017, 2), 4);
        assert_eq!(modern.bounds_stride, 8);
        assert_eq!(modern.bounds_extent, HeaderField::Pointer);
        assert_eq!(
            modern.native_class_index,
            NativeClassIndex::NativeTypeArrayIndex
        );

        let middle = RuntimeAbi::for_producer(ProducerVersion::new(5, 6), 8);
        assert_eq!(middle.array_size_field, HeaderField::Int32);
        assert_eq!(middle.bounds_stride, 8);
        assert_eq!(
            middle.native_class_index,
            NativeClassIndex::NativeTypeArrayIndex
        );

        let old = RuntimeAbi::for_producer(ProducerVersion::new(5, 5), 8);
        assert_eq!(old, RuntimeAbi::legacy());
    }

    #[test]
    fn layout_validation() {
        assert!(VmLayout::mono_64().validate().is_ok());
        assert!(VmLayout::mono_32().validate().is_ok());

        let broken = VmLayout {
            pointer_size: 2,
            ..VmLayout::default()
        };
        assert!(matches!(
            broken.validate(),
            Err(Error::InvalidPointerSize(2))
        ));
    }

    #[test]
    fn header_field_widths() {
        let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0x00];
        let cursor = Cursor::new(&bytes, 0, 8);
        assert_eq!(HeaderField::Int32.read(&cursor).unwrap(), -1);
        assert_eq!(HeaderField::Pointer.read(&cursor).unwrap(), 0xFFFF_FFFF);
    }
}
