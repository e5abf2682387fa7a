//! Raw heap access and primitive decoding.
//!
//! This module is the lowest layer of the crate. It knows nothing about the object graph; it
//! only turns virtual addresses into bytes and bytes into values, following the layout rules of
//! the runtime that produced the capture.
//!
//! # Key Components
//!
//! - [`Cursor`] / [`CursorMut`] - Positioned views into captured bytes
//! - [`Heap`] / [`MemorySection`] - Address resolution across disjoint heap sections
//! - [`VmLayout`] / [`RuntimeAbi`] - Producer layout constants and version-dependent rules
//! - [`PrimitiveReader`] - Address-based reads bundling heap, layout and ABI
//! - [`read_array_length`], [`read_array_byte_size`] - Array decoding
//! - [`read_string`], [`read_string_byte_size`] - String decoding
//!
//! # Failure Policy
//!
//! A read that runs past the end of a section fails with [`crate::Error::OutOfBounds`]; nothing
//! in this module substitutes zero for unreadable data. [`Heap::resolve`] reports unmapped
//! addresses as `None`, while the structured readers, which cannot continue without data,
//! surface them as [`crate::Error::Unmapped`].

mod array;
mod cursor;
mod heap;
mod io;
mod layout;
mod reader;
mod string;

pub use array::{read_array_byte_size, read_array_length};
pub use cursor::{Cursor, CursorMut};
pub use heap::{Heap, MemorySection};
pub use io::{read_le_at, write_le_at, HeapIO};
pub use layout::{HeaderField, NativeClassIndex, ProducerVersion, RuntimeAbi, VmLayout};
pub use reader::PrimitiveReader;
pub use string::{read_string, read_string_byte_size};
