//! Address resolution across captured heap sections.
//!
//! The managed heap of the producing process is captured as a handful of disjoint
//! [`MemorySection`]s, each a flat copy of bytes tagged with the virtual address it started at.
//! [`Heap`] is a borrowed view over those sections that turns a virtual address back into a
//! [`Cursor`] positioned inside the right section.
//!
//! Sections are few (tens to low hundreds), so resolution is a linear scan in capture order.
//! An address no section covers is reported as `None`: a dangling or foreign pointer is a
//! normal occurrence in a live heap and never a reason to abandon a snapshot.

use serde::{Deserialize, Serialize};

use crate::{memory::cursor::Cursor, Result};

/// One contiguous range of captured heap bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemorySection {
    /// Virtual address of the first byte in `bytes`
    pub start_address: u64,
    /// Raw captured bytes
    pub bytes: Vec<u8>,
}

impl MemorySection {
    /// Creates a section starting at `start_address`.
    #[must_use]
    pub fn new(start_address: u64, bytes: Vec<u8>) -> Self {
        MemorySection {
            start_address,
            bytes,
        }
    }

    /// One past the last address covered by this section.
    #[must_use]
    pub fn end_address(&self) -> u64 {
        self.start_address.saturating_add(self.bytes.len() as u64)
    }

    /// Returns `true` if `address` lies within `[start_address, end_address)`.
    #[must_use]
    pub fn contains(&self, address: u64) -> bool {
        address >= self.start_address && address < self.end_address()
    }
}

/// A read-only view over the heap sections of one snapshot.
#[derive(Debug, Clone, Copy)]
pub struct Heap<'a> {
    sections: &'a [MemorySection],
    pointer_size: u32,
}

impl<'a> Heap<'a> {
    /// Creates a view over `sections` for a runtime with the given pointer width.
    #[must_use]
    pub fn new(sections: &'a [MemorySection], pointer_size: u32) -> Self {
        Heap {
            sections,
            pointer_size,
        }
    }

    /// The underlying sections, in capture order.
    #[must_use]
    pub fn sections(&self) -> &'a [MemorySection] {
        self.sections
    }

    /// Pointer width of cursors produced by this heap.
    #[must_use]
    pub fn pointer_size(&self) -> u32 {
        self.pointer_size
    }

    /// Total number of captured bytes across all sections.
    #[must_use]
    pub fn total_bytes(&self) -> usize {
        self.sections.iter().map(|s| s.bytes.len()).sum()
    }

    /// Resolves a virtual address to a cursor inside the first section that contains it.
    ///
    /// Returns `None` when the address is unmapped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use snapscope::{Heap, MemorySection};
    ///
    /// let sections = vec![MemorySection::new(0x1000, vec![0xAA; 16])];
    /// let heap = Heap::new(&sections, 8);
    ///
    /// let cursor = heap.resolve(0x1004).unwrap();
    /// assert_eq!(cursor.offset(), 4);
    /// assert!(heap.resolve(0x1010).is_none());
    /// ```
    #[must_use]
    pub fn resolve(&self, address: u64) -> Option<Cursor<'a>> {
        self.sections
            .iter()
            .find(|section| section.contains(address))
            .and_then(|section| {
                let offset = usize::try_from(address - section.start_address).ok()?;
                Some(Cursor::new(&section.bytes, offset, self.pointer_size))
            })
    }

    /// Reads a pointer stored at `address`.
    ///
    /// Returns `Ok(None)` when the address is unmapped.
    ///
    /// # Errors
    /// Returns a decode error if the pointer runs off the end of its section or the pointer
    /// width is unsupported.
    pub fn read_pointer_at(&self, address: u64) -> Result<Option<u64>> {
        match self.resolve(address) {
            Some(cursor) => cursor.read_pointer().map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_sections() -> Vec<MemorySection> {
        vec![
            MemorySection::new(0x1000, (0u8..32).collect()),
            MemorySection::new(0x8000, vec![0x78, 0x56, 0x34, 0x12, 0, 0, 0, 0]),
        ]
    }

    #[test]
    fn resolve_maps_back_to_address() {
        let sections = sample_sections();
        let heap = Heap::new(&sections, 8);

        for address in [0x1000u64, 0x1001, 0x101F, 0x8000, 0x8007] {
            let cursor = heap.resolve(address).unwrap();
            let section = sections
                .iter()
                .find(|s| std::ptr::eq(s.bytes.as_slice(), cursor.bytes()))
                .unwrap();
            assert_eq!(section.start_address + cursor.offset() as u64, address);
        }
    }

    #[test]
    fn resolve_reports_unmapped() {
        let sections = sample_sections();
        let heap = Heap::new(&sections, 8);

        assert!(heap.resolve(0x0FFF).is_none());
        assert!(heap.resolve(0x1020).is_none());
        assert!(heap.resolve(0x8008).is_none());
        assert!(heap.resolve(0).is_none());
    }

    #[test]
    fn empty_sections_never_match() {
        let sections = vec![MemorySection::new(0x2000, Vec::new())];
        let heap = Heap::new(&sections, 4);
        assert!(heap.resolve(0x2000).is_none());
        assert_eq!(heap.total_bytes(), 0);
    }

    #[test]
    fn read_pointer_at_mapped_and_unmapped() {
        let sections = sample_sections();
        let heap = Heap::new(&sections, 8);

        assert_eq!(heap.read_pointer_at(0x8000).unwrap(), Some(0x1234_5678));
        assert_eq!(heap.read_pointer_at(0x9000).unwrap(), None);
        assert!(heap.read_pointer_at(0x8004).is_err());
    }

    #[test]
    fn end_address_and_contains() {
        let section = MemorySection::new(0x10, vec![0; 4]);
        assert_eq!(section.end_address(), 0x14);
        assert!(section.contains(0x13));
        assert!(!section.contains(0x14));
    }
}
