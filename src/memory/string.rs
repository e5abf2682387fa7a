//! Decoding of managed strings.
//!
//! A managed string is an object header followed by an `i32` character count and that many
//! UTF-16 code units. The runtime additionally stores a zero terminator, which is accounted for
//! by [`read_string_byte_size`] but never decoded.

use widestring::U16Str;

use crate::{
    memory::{Cursor, VmLayout},
    Error, Result,
};

fn read_length<'a>(cursor: &Cursor<'a>, layout: &VmLayout) -> Result<(Cursor<'a>, i32)> {
    let length_field = cursor.advance(layout.object_header_size as usize);
    let length = length_field.read_i32()?;
    if length < 0 {
        return Err(Error::InvalidLength {
            address: cursor.offset() as u64,
            length: i64::from(length),
        });
    }
    Ok((length_field, length))
}

/// Decodes the string object starting at `cursor`.
///
/// Exactly `length` UTF-16 units are decoded; unpaired surrogates become
/// [`char::REPLACEMENT_CHARACTER`].
///
/// # Errors
/// Returns [`crate::Error::InvalidLength`] for a negative length and
/// [`crate::Error::OutOfBounds`] if the character data runs off the section.
///
/// # Examples
///
/// ```rust
/// use snapscope::{memory::read_string, Cursor, VmLayout};
///
/// let layout = VmLayout::mono_32();
/// let mut bytes = vec![0u8; 8];
/// bytes.extend_from_slice(&2i32.to_le_bytes());
/// bytes.extend_from_slice(&[b'o', 0, b'k', 0, 0, 0]);
///
/// let cursor = Cursor::new(&bytes, 0, 4);
/// assert_eq!(read_string(&cursor, &layout)?, "ok");
/// # Ok::<(), snapscope::Error>(())
/// ```
pub fn read_string(cursor: &Cursor<'_>, layout: &VmLayout) -> Result<String> {
    let (length_field, length) = read_length(cursor, layout)?;
    let first_char = length_field.advance(4);

    let byte_len = length as usize * 2;
    let start = first_char.offset();
    let data = first_char.bytes();
    let Some(end) = start.checked_add(byte_len).filter(|end| *end <= data.len()) else {
        return Err(out_of_bounds_error!(start, byte_len, data.len()));
    };

    let units: Vec<u16> = data[start..end]
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    Ok(U16Str::from_slice(&units).to_string_lossy())
}

/// Size in bytes the runtime attributes to the string object starting at `cursor`.
///
/// The size is `object_header_size + 1 + 2 * length + 2`. The extra byte and the two
/// terminator bytes match the producer's own accounting and are kept as-is so totals agree
/// with the engine.
///
/// # Errors
/// Returns [`crate::Error::InvalidLength`] for a negative length and a decode error if the
/// length field is not readable.
pub fn read_string_byte_size(cursor: &Cursor<'_>, layout: &VmLayout) -> Result<i32> {
    let (_, length) = read_length(cursor, layout)?;

    let size = i64::from(layout.object_header_size) + 1 + i64::from(length) * 2 + 2;
    i32::try_from(size).map_err(|_| Error::InvalidLength {
        address: cursor.offset() as u64,
        length: i64::from(length),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string_object(layout: &VmLayout, text: &str) -> Vec<u8> {
        let units: Vec<u16> = text.encode_utf16().collect();
        let mut bytes = vec![0u8; layout.object_header_size as usize];
        bytes.extend_from_slice(&(units.len() as i32).to_le_bytes());
        for unit in units {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        bytes.extend_from_slice(&[0, 0]);
        bytes
    }

    #[test]
    fn decodes_cat() {
        let layout = VmLayout::mono_64();
        let bytes = string_object(&layout, "cat");
        let cursor = Cursor::new(&bytes, 0, 8);

        assert_eq!(read_string(&cursor, &layout).unwrap(), "cat");
        assert_eq!(
            read_string_byte_size(&cursor, &layout).unwrap(),
            layout.object_header_size as i32 + 1 + 6 + 2
        );
    }

    #[test]
    fn decodes_at_offset_and_non_ascii() {
        let layout = VmLayout::mono_32();
        let mut bytes = vec![0xEE; 5];
        bytes.extend(string_object(&layout, "größe ✓"));
        let cursor = Cursor::new(&bytes, 5, 4);

        assert_eq!(read_string(&cursor, &layout).unwrap(), "größe ✓");
    }

    #[test]
    fn empty_string() {
        let layout = VmLayout::mono_64();
        let bytes = string_object(&layout, "");
        let cursor = Cursor::new(&bytes, 0, 8);

        assert_eq!(read_string(&cursor, &layout).unwrap(), "");
        assert_eq!(read_string_byte_size(&cursor, &layout).unwrap(), 16 + 1 + 2);
    }

    #[test]
    fn truncated_character_data_is_an_error() {
        let layout = VmLayout::mono_64();
        let mut bytes = string_object(&layout, "truncated");
        bytes.truncate(24);
        let cursor = Cursor::new(&bytes, 0, 8);

        assert!(matches!(
            read_string(&cursor, &layout),
            Err(Error::OutOfBounds { offset: 20, .. })
        ));
        assert!(read_string_byte_size(&cursor, &layout).is_ok());
    }

    #[test]
    fn negative_length_is_rejected() {
        let layout = VmLayout::mono_64();
        let mut bytes = vec![0u8; 16];
        bytes.extend_from_slice(&(-1i32).to_le_bytes());
        let cursor = Cursor::new(&bytes, 0, 8);

        assert!(matches!(
            read_string(&cursor, &layout),
            Err(Error::InvalidLength { length: -1, .. })
        ));
        assert!(read_string_byte_size(&cursor, &layout).is_err());
    }
}
