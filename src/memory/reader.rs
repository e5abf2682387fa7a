//! Address-based value reading over one snapshot's heap.
//!
//! [`PrimitiveReader`] bundles the three things every structured read needs, the heap view,
//! the VM layout and the runtime ABI, so callers working with a single snapshot can read by
//! virtual address without threading the configuration through each call.

use crate::{
    memory::{
        array::{read_array_byte_size, read_array_length},
        string::{read_string, read_string_byte_size},
        Cursor, Heap, HeapIO, RuntimeAbi, VmLayout,
    },
    snapshot::TypeDescription,
    Error, Result,
};

/// Reads primitive and structured values from a snapshot's heap by virtual address.
#[derive(Debug, Clone, Copy)]
pub struct PrimitiveReader<'a> {
    heap: Heap<'a>,
    layout: VmLayout,
    abi: RuntimeAbi,
}

impl<'a> PrimitiveReader<'a> {
    /// Creates a reader over `heap`.
    #[must_use]
    pub fn new(heap: Heap<'a>, layout: VmLayout, abi: RuntimeAbi) -> Self {
        PrimitiveReader { heap, layout, abi }
    }

    /// The heap this reader resolves addresses against.
    #[must_use]
    pub fn heap(&self) -> &Heap<'a> {
        &self.heap
    }

    /// The VM layout used for structured reads.
    #[must_use]
    pub fn layout(&self) -> &VmLayout {
        &self.layout
    }

    /// The runtime ABI used for structured reads.
    #[must_use]
    pub fn abi(&self) -> &RuntimeAbi {
        &self.abi
    }

    fn cursor_at(&self, address: u64) -> Result<Cursor<'a>> {
        self.heap.resolve(address).ok_or(Error::Unmapped(address))
    }

    /// Reads a `T` stored at `address`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Unmapped`] for an address outside the heap and a decode error if
    /// the value runs off its section.
    pub fn read_at<T: HeapIO>(&self, address: u64) -> Result<T> {
        self.cursor_at(address)?.read::<T>()
    }

    /// Reads a pointer stored at `address`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Unmapped`] for an address outside the heap and a decode error if
    /// the pointer runs off its section.
    pub fn read_pointer_at(&self, address: u64) -> Result<u64> {
        self.cursor_at(address)?.read_pointer()
    }

    /// Decodes the string object at `address`.
    ///
    /// # Errors
    /// See [`crate::memory::read_string`]; additionally fails for unmapped addresses.
    pub fn read_string_at(&self, address: u64) -> Result<String> {
        read_string(&self.cursor_at(address)?, &self.layout)
    }

    /// Element count of the array at `address`.
    ///
    /// # Errors
    /// See [`crate::memory::read_array_length`].
    pub fn read_array_length(&self, address: u64, array_type: &TypeDescription) -> Result<i32> {
        read_array_length(&self.heap, address, array_type, &self.layout, &self.abi)
    }

    /// Size in bytes of the array at `address`.
    ///
    /// # Errors
    /// See [`crate::memory::read_array_byte_size`].
    pub fn read_array_byte_size(
        &self,
        address: u64,
        array_type: &TypeDescription,
        types: &[TypeDescription],
    ) -> Result<i32> {
        read_array_byte_size(&self.heap, address, array_type, types, &self.layout, &self.abi)
    }

    /// Size in bytes of the object at `address`.
    ///
    /// Arrays and strings are measured from their headers; every other type has the fixed size
    /// recorded in its description.
    ///
    /// # Errors
    /// Returns a decode error if a variable-length object's header cannot be read.
    pub fn size_of_object(
        &self,
        address: u64,
        object_type: &TypeDescription,
        types: &[TypeDescription],
    ) -> Result<i32> {
        if object_type.is_array {
            return self.read_array_byte_size(address, object_type, types);
        }
        if object_type.is_string() {
            return read_string_byte_size(&self.cursor_at(address)?, &self.layout);
        }
        Ok(object_type.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemorySection;

    fn string_type() -> TypeDescription {
        TypeDescription {
            name: "System.String".to_string(),
            size: 20,
            ..TypeDescription::default()
        }
    }

    fn sections() -> Vec<MemorySection> {
        let mut string = vec![0u8; 16];
        string.extend_from_slice(&2i32.to_le_bytes());
        string.extend_from_slice(&[b'h', 0, b'i', 0, 0, 0]);

        let mut array = vec![0u8; 32];
        array[24] = 3;

        vec![
            MemorySection::new(0x1000, string),
            MemorySection::new(0x2000, array),
            MemorySection::new(0x3000, 0x1000u64.to_le_bytes().to_vec()),
        ]
    }

    #[test]
    fn reads_by_address() {
        let sections = sections();
        let reader = PrimitiveReader::new(
            Heap::new(&sections, 8),
            VmLayout::mono_64(),
            RuntimeAbi::default(),
        );

        assert_eq!(reader.read_pointer_at(0x3000).unwrap(), 0x1000);
        assert_eq!(reader.read_at::<i32>(0x1010).unwrap(), 2);
        assert_eq!(reader.read_string_at(0x1000).unwrap(), "hi");
        assert!(matches!(
            reader.read_pointer_at(0x5000),
            Err(Error::Unmapped(0x5000))
        ));
    }

    #[test]
    fn sizes_objects_by_kind() {
        let sections = sections();
        let reader = PrimitiveReader::new(
            Heap::new(&sections, 8),
            VmLayout::mono_64(),
            RuntimeAbi::default(),
        );
        let types = vec![
            string_type(),
            TypeDescription {
                name: "System.Object[]".to_string(),
                is_array: true,
                array_rank: 1,
                base_or_element_type_index: 2,
                ..TypeDescription::default()
            },
            TypeDescription {
                name: "System.Object".to_string(),
                size: 16,
                ..TypeDescription::default()
            },
        ];

        assert_eq!(
            reader.size_of_object(0x1000, &types[0], &types).unwrap(),
            16 + 1 + 4 + 2
        );
        assert_eq!(reader.read_array_length(0x2000, &types[1]).unwrap(), 3);
        assert_eq!(
            reader.size_of_object(0x2000, &types[1], &types).unwrap(),
            32 + 3 * 8
        );
        assert_eq!(reader.size_of_object(0x9999, &types[2], &types).unwrap(), 16);
        assert!(reader.size_of_object(0x9999, &types[0], &types).is_err());
    }
}
