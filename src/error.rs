use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

macro_rules! out_of_bounds_error {
    ($offset:expr, $width:expr, $len:expr) => {
        crate::Error::OutOfBounds {
            offset: $offset,
            width: $width,
            len: $len,
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// The variants fall into three groups with different recovery policies:
///
/// ## Decode Errors
/// - [`Error::OutOfBounds`] - A read ran past the end of a memory section
/// - [`Error::InvalidPointerSize`] - The snapshot declares a pointer width other than 4 or 8
/// - [`Error::Unmapped`] - A structured read targeted an address no heap section contains
/// - [`Error::InvalidLength`] - A string or array header carried a negative length
///
/// Decode errors are fatal for the field being read, but recoverable for the snapshot as a
/// whole: the unpacker keeps the affected node with best-effort values and carries on.
///
/// ## Shape Errors
/// - [`Error::CorruptConnection`] - A connection indexes outside the node table
/// - [`Error::Malformed`] - A packed table row refers to a type or class that does not exist
///
/// Shape errors mean the producer and this crate disagree on the layout of the packed
/// tables. They abort the whole unpack and no partial graph is returned.
///
/// # Examples
///
/// ```rust
/// use snapscope::{Cursor, Error};
///
/// let bytes = [0u8; 2];
/// let cursor = Cursor::new(&bytes, 0, 8);
/// match cursor.read::<u32>() {
///     Err(Error::OutOfBounds { offset, width, len }) => {
///         assert_eq!((offset, width, len), (0, 4, 2));
///     }
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// An out of bound access was attempted while decoding a memory section.
    ///
    /// # Fields
    ///
    /// * `offset` - Offset within the section at which the read started
    /// * `width` - Number of bytes the read required
    /// * `len` - Total length of the section
    #[error("Out of bound read of {width} bytes at offset {offset} (section length {len})")]
    OutOfBounds {
        /// Offset within the backing buffer
        offset: usize,
        /// Width of the attempted read in bytes
        width: usize,
        /// Length of the backing buffer
        len: usize,
    },

    /// The configured pointer width is neither 4 nor 8 bytes.
    #[error("Unexpected pointer size: {0}")]
    InvalidPointerSize(u32),

    /// No heap section contains the requested address.
    ///
    /// Callers treat this as a dangling reference rather than a corruption of the snapshot.
    #[error("Address {0:#x} is not mapped by any heap section")]
    Unmapped(u64),

    /// A string or array header declared a negative element count.
    #[error("Invalid length {length} for object at {address:#x}")]
    InvalidLength {
        /// Address of the object, or its offset within the section for cursor-relative reads
        address: u64,
        /// The length value found in the header
        length: i64,
    },

    /// A connection refers to a node index outside the unpacked node table.
    ///
    /// # Fields
    ///
    /// * `position` - Index of the offending entry in the connection list
    /// * `from` - Source node index of the connection
    /// * `to` - Target node index of the connection
    /// * `node_count` - Number of nodes in the concatenated table
    #[error("Connection #{position} ({from} -> {to}) is outside the node table of {node_count} entries")]
    CorruptConnection {
        /// Position of the connection within the connection list
        position: usize,
        /// Source index
        from: usize,
        /// Target index
        to: usize,
        /// Size of the node table
        node_count: usize,
    },

    /// The packed snapshot is damaged and could not be unpacked.
    ///
    /// The error includes the source location where the malformation was detected.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },
}

impl Error {
    /// Returns `true` for errors that only invalidate a single decoded field.
    ///
    /// Such errors are safe to recover from at the node level; all others indicate that the
    /// packed tables themselves are inconsistent.
    #[must_use]
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            Error::OutOfBounds { .. }
                | Error::InvalidPointerSize(_)
                | Error::Unmapped(_)
                | Error::InvalidLength { .. }
        )
    }
}
