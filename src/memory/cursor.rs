//! Positioned views into captured heap bytes.
//!
//! A [`Cursor`] pairs a borrowed byte buffer with an offset and the pointer width of the
//! runtime that produced the buffer. Unlike a stream parser, a cursor never moves: every
//! navigation method returns a new cursor, so a single resolved address can be used as the
//! base for several independent field reads.
//!
//! [`CursorMut`] is the writable counterpart used by snapshot editing tools to patch pointer
//! fields in place. It is deliberately not produced by [`crate::memory::Heap::resolve`]; the
//! read path never holds mutable access to heap bytes.
//!
//! # Examples
//!
//! ```rust
//! use snapscope::Cursor;
//!
//! let bytes = [0x10, 0x00, 0x00, 0x00, 0x2A, 0x00, 0x00, 0x00];
//! let cursor = Cursor::new(&bytes, 0, 4);
//!
//! assert_eq!(cursor.read_pointer()?, 0x10);
//! assert_eq!(cursor.next_pointer().read_i32()?, 42);
//! # Ok::<(), snapscope::Error>(())
//! ```

use crate::{
    memory::io::{read_le_at, write_le_at, HeapIO},
    Error, Result,
};

/// A read-only position within a captured memory section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
    pointer_size: u32,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor over `bytes` positioned at `offset`.
    ///
    /// The pointer width is not validated here; [`Cursor::read_pointer`] reports an
    /// unsupported width when it is first used.
    #[must_use]
    pub fn new(bytes: &'a [u8], offset: usize, pointer_size: u32) -> Self {
        Cursor {
            bytes,
            offset,
            pointer_size,
        }
    }

    /// The complete backing buffer, independent of the current offset.
    #[must_use]
    pub fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Offset of this cursor within [`Cursor::bytes`].
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Pointer width, in bytes, of the runtime that produced the buffer.
    #[must_use]
    pub fn pointer_size(&self) -> u32 {
        self.pointer_size
    }

    /// Bytes remaining between the cursor and the end of the buffer.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.offset)
    }

    /// Returns a cursor over the same buffer moved forward by `count` bytes.
    ///
    /// Advancing past the end is allowed; the error surfaces on the next read.
    #[must_use]
    pub fn advance(&self, count: usize) -> Self {
        Cursor {
            bytes: self.bytes,
            offset: self.offset.saturating_add(count),
            pointer_size: self.pointer_size,
        }
    }

    /// Returns a cursor moved forward by one pointer width.
    #[must_use]
    pub fn next_pointer(&self) -> Self {
        self.advance(self.pointer_size as usize)
    }

    /// Decodes a little-endian `T` at the cursor.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value extends past the buffer.
    pub fn read<T: HeapIO>(&self) -> Result<T> {
        read_le_at::<T>(self.bytes, self.offset)
    }

    /// Decodes an unsigned pointer-width integer at the cursor.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidPointerSize`] unless the pointer width is 4 or 8, and
    /// [`crate::Error::OutOfBounds`] if the pointer extends past the buffer.
    pub fn read_pointer(&self) -> Result<u64> {
        match self.pointer_size {
            4 => Ok(u64::from(self.read::<u32>()?)),
            8 => self.read::<u64>(),
            other => Err(Error::InvalidPointerSize(other)),
        }
    }

    /// Decodes an `i32` at the cursor.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value extends past the buffer.
    pub fn read_i32(&self) -> Result<i32> {
        self.read::<i32>()
    }

    /// Decodes an `i64` at the cursor.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value extends past the buffer.
    pub fn read_i64(&self) -> Result<i64> {
        self.read::<i64>()
    }

    /// Decodes a `u16` at the cursor.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value extends past the buffer.
    pub fn read_u16(&self) -> Result<u16> {
        self.read::<u16>()
    }

    /// Decodes a one-byte boolean; any non-zero byte is `true`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the cursor is at the end of the buffer.
    pub fn read_bool(&self) -> Result<bool> {
        Ok(self.read::<u8>()? != 0)
    }

    /// Decodes a single UTF-16 code unit as a `char`.
    ///
    /// Unpaired surrogates decode to [`char::REPLACEMENT_CHARACTER`].
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the unit extends past the buffer.
    pub fn read_char(&self) -> Result<char> {
        let unit = self.read_u16()?;
        Ok(char::decode_utf16([unit])
            .next()
            .and_then(std::result::Result::ok)
            .unwrap_or(char::REPLACEMENT_CHARACTER))
    }

    /// Decodes an `f32` at the cursor.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value extends past the buffer.
    pub fn read_f32(&self) -> Result<f32> {
        self.read::<f32>()
    }

    /// Decodes an `f64` at the cursor.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value extends past the buffer.
    pub fn read_f64(&self) -> Result<f64> {
        self.read::<f64>()
    }
}

/// A writable position within a memory section, used to patch pointers in edited snapshots.
#[derive(Debug)]
pub struct CursorMut<'a> {
    bytes: &'a mut [u8],
    offset: usize,
    pointer_size: u32,
}

impl<'a> CursorMut<'a> {
    /// Creates a writable cursor over `bytes` positioned at `offset`.
    #[must_use]
    pub fn new(bytes: &'a mut [u8], offset: usize, pointer_size: u32) -> Self {
        CursorMut {
            bytes,
            offset,
            pointer_size,
        }
    }

    /// Reborrows this cursor as a read-only [`Cursor`] at the same position.
    #[must_use]
    pub fn as_cursor(&self) -> Cursor<'_> {
        Cursor::new(self.bytes, self.offset, self.pointer_size)
    }

    /// Encodes `value` little-endian at the cursor, truncated to the pointer width.
    ///
    /// # Errors
    /// Returns [`crate::Error::InvalidPointerSize`] unless the pointer width is 4 or 8, and
    /// [`crate::Error::OutOfBounds`] if the pointer does not fit in the buffer. The buffer is
    /// left untouched on error.
    pub fn write_pointer(&mut self, value: u64) -> Result<()> {
        match self.pointer_size {
            #[allow(clippy::cast_possible_truncation)]
            4 => write_le_at(self.bytes, self.offset, value as u32),
            8 => write_le_at(self.bytes, self.offset, value),
            other => Err(Error::InvalidPointerSize(other)),
        }
    }
}
