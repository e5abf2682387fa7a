//! Length and size decoding for managed arrays.
//!
//! A managed array starts with a header of [`VmLayout::array_header_size`] bytes. Two fields of
//! that header matter here:
//!
//! - the *bounds pointer* at [`VmLayout::array_bounds_offset_in_header`], which is zero for
//!   single-dimensional arrays and otherwise points to a side table with one entry per
//!   dimension,
//! - the *size field* at [`VmLayout::array_size_offset_in_header`], holding the element count
//!   of single-dimensional arrays.
//!
//! The width of both the size field and the bounds table entries, as well as the distance
//! between bounds table entries, depend on the producer version and come from [`RuntimeAbi`].

use crate::{
    memory::{Heap, RuntimeAbi, VmLayout},
    snapshot::TypeDescription,
    Error, Result,
};

/// Reads the total element count of the array at `address`.
///
/// For multi-dimensional arrays the count is the product of `array_type.array_rank` extents
/// read from the bounds table.
///
/// # Errors
/// Returns [`crate::Error::Unmapped`] if the array header or its bounds table is not on the
/// captured heap, [`crate::Error::InvalidLength`] if the count is negative or exceeds `i32`,
/// and a decode error if a field runs off its section.
///
/// # Examples
///
/// ```rust
/// use snapscope::{memory::read_array_length, Heap, MemorySection, RuntimeAbi, TypeDescription, VmLayout};
///
/// let layout = VmLayout::mono_64();
/// let mut bytes = vec![0u8; 32];
/// bytes[24] = 10; // size field, bounds pointer left at zero
/// let sections = vec![MemorySection::new(0x1000, bytes)];
/// let heap = Heap::new(&sections, 8);
///
/// let int_array = TypeDescription { is_array: true, array_rank: 1, ..Default::default() };
/// let length = read_array_length(&heap, 0x1000, &int_array, &layout, &RuntimeAbi::default())?;
/// assert_eq!(length, 10);
/// # Ok::<(), snapscope::Error>(())
/// ```
pub fn read_array_length(
    heap: &Heap<'_>,
    address: u64,
    array_type: &TypeDescription,
    layout: &VmLayout,
    abi: &RuntimeAbi,
) -> Result<i32> {
    let header = heap.resolve(address).ok_or(Error::Unmapped(address))?;

    let bounds = header
        .advance(layout.array_bounds_offset_in_header as usize)
        .read_pointer()?;

    if bounds == 0 {
        let length = abi
            .array_size_field
            .read(&header.advance(layout.array_size_offset_in_header as usize))?;
        return checked_length(address, length);
    }

    let mut cursor = heap.resolve(bounds).ok_or(Error::Unmapped(bounds))?;
    let mut length: i64 = 1;
    for _ in 0..array_type.array_rank {
        let extent = abi.bounds_extent.read(&cursor)?;
        length = length.saturating_mul(extent);
        cursor = cursor.advance(abi.bounds_stride);
    }

    checked_length(address, length)
}

/// Reads the size in bytes of the array at `address`, header included.
///
/// Value-type elements are stored inline and contribute their own size; reference-type
/// elements contribute one pointer each.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the element type index is outside `types`, plus every
/// error of [`read_array_length`].
pub fn read_array_byte_size(
    heap: &Heap<'_>,
    address: u64,
    array_type: &TypeDescription,
    types: &[TypeDescription],
    layout: &VmLayout,
    abi: &RuntimeAbi,
) -> Result<i32> {
    let length = read_array_length(heap, address, array_type, layout, abi)?;

    let element_type = usize::try_from(array_type.base_or_element_type_index)
        .ok()
        .and_then(|index| types.get(index))
        .ok_or_else(|| {
            malformed_error!(
                "Array type '{}' has element type index {} outside the type table of {} entries",
                array_type.name,
                array_type.base_or_element_type_index,
                types.len()
            )
        })?;

    let element_size = if element_type.is_value_type {
        i64::from(element_type.size)
    } else {
        i64::from(layout.pointer_size)
    };

    let total = i64::from(layout.array_header_size) + element_size * i64::from(length);
    checked_length(address, total)
}

fn checked_length(address: u64, length: i64) -> Result<i32> {
    i32::try_from(length)
        .ok()
        .filter(|value| *value >= 0)
        .ok_or(Error::InvalidLength { address, length })
}
