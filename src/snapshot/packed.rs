//! The packed, index-addressed snapshot format produced by the heap crawler.
//!
//! Everything in this module is plain data: parallel tables that refer to each other through
//! small integer indices rather than references. This keeps the format compact and trivially
//! serializable, which is why every type derives `serde`'s traits; storing and loading packed
//! snapshots is left to the embedding tool.
//!
//! The tables fall into two groups:
//!
//! - [`PackedMemorySnapshot`] is what the engine reports on its own: native objects and types,
//!   GC handles, managed type descriptions, raw managed heap sections and the VM layout.
//! - [`PackedCrawlerData`] adds what the crawler discovered by walking the managed heap: the
//!   managed objects it found and the connections between all nodes.
//!
//! Connection indices address the concatenated node table described by [`StartIndices`], not
//! the individual per-variant tables.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::{
    memory::{MemorySection, ProducerVersion, VmLayout},
    snapshot::StartIndices,
};

bitflags! {
    /// Engine object visibility and lifetime flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct HideFlags: u32 {
        /// The object is not shown in the hierarchy
        const HIDE_IN_HIERARCHY = 0x01;
        /// The object is not shown in the inspector
        const HIDE_IN_INSPECTOR = 0x02;
        /// The object is not saved to the scene in the editor
        const DONT_SAVE_IN_EDITOR = 0x04;
        /// The object is not editable
        const NOT_EDITABLE = 0x08;
        /// The object is not saved when building a player
        const DONT_SAVE_IN_BUILD = 0x10;
        /// The object is never unloaded by the unused asset sweep
        const DONT_UNLOAD_UNUSED_ASSET = 0x20;
        /// Combination of all "don't save" flags and the unload exemption
        const DONT_SAVE = 0x34;
        /// Hidden and never saved
        const HIDE_AND_DONT_SAVE = 0x3D;
    }
}

/// Description of one managed type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescription {
    /// Fully qualified type name
    pub name: String,
    /// Assembly the type is defined in
    pub assembly: String,
    /// `true` for value types, whose instances are stored inline
    pub is_value_type: bool,
    /// `true` for array types
    pub is_array: bool,
    /// Number of dimensions for array types
    pub array_rank: i32,
    /// Index of the element type for arrays, or of the base type otherwise; `-1` if none
    pub base_or_element_type_index: i32,
    /// Instance size in bytes
    pub size: i32,
    /// Storage of the type's static fields, empty when it has none
    pub static_field_bytes: Vec<u8>,
    /// Address of the runtime's type info for this type
    pub type_info_address: u64,
    /// Position of this type in the type table
    pub type_index: i32,
}

impl TypeDescription {
    /// Returns `true` if the type owns static field storage.
    #[must_use]
    pub fn has_static_fields(&self) -> bool {
        !self.static_field_bytes.is_empty()
    }

    /// Returns `true` for the runtime's string type.
    #[must_use]
    pub fn is_string(&self) -> bool {
        self.name == "System.String"
    }
}

/// A class in the engine's native type table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedNativeType {
    /// Class name
    pub name: String,
    /// Index of the base class in the native type table, `-1` for the root class
    pub native_base_type_array_index: i32,
}

/// An engine-native object as reported by the producer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct PackedNativeObject {
    /// Object name
    pub name: String,
    /// Instance identifier, stable for the lifetime of the object
    pub instance_id: i32,
    /// Native memory attributed to the object
    pub size: i32,
    /// Class identifier used by older producers
    pub class_id: i32,
    /// Index into the native type table used by newer producers
    pub native_type_array_index: i32,
    /// Visibility and lifetime flags
    pub hide_flags: HideFlags,
    /// `true` if the object is backed by an asset on disk
    pub is_persistent: bool,
    /// `true` if the object survives scene loads
    pub is_dont_destroy_on_load: bool,
    /// `true` for engine manager singletons
    pub is_manager: bool,
    /// Address of the native object
    pub native_object_address: u64,
}

/// A GC handle reported by the producer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedGcHandle {
    /// Address of the managed object the handle keeps alive
    pub target: u64,
}

/// A managed object discovered by the crawler.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackedManagedObject {
    /// Address of the object on the managed heap
    pub address: u64,
    /// Index of the object's type in the type table
    pub type_index: i32,
    /// Size in bytes as measured by the crawler, `0` if unknown
    pub size: i32,
}

/// A directed edge between two nodes of the concatenated node table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    /// Index of the referencing node
    pub from: usize,
    /// Index of the referenced node
    pub to: usize,
}

impl Connection {
    /// Creates a connection from `from` to `to`.
    #[must_use]
    pub const fn new(from: usize, to: usize) -> Self {
        Connection { from, to }
    }
}

/// The tables an engine reports for one capture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PackedMemorySnapshot {
    /// Version of the engine that produced the capture
    pub producer_version: ProducerVersion,
    /// Native class table
    pub native_types: Vec<PackedNativeType>,
    /// Native objects
    pub native_objects: Vec<PackedNativeObject>,
    /// GC handles
    pub gc_handles: Vec<PackedGcHandle>,
    /// Managed type table
    pub type_descriptions: Vec<TypeDescription>,
    /// Raw managed heap
    pub managed_heap_sections: Vec<MemorySection>,
    /// Layout constants of the virtual machine
    pub virtual_machine_information: VmLayout,
}

/// A packed snapshot together with the crawler's findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackedCrawlerData {
    /// The engine-reported tables
    pub packed_memory_snapshot: PackedMemorySnapshot,
    /// First index of each node variant in the concatenated table
    pub start_indices: StartIndices,
    /// Managed objects found on the heap
    pub managed_objects: Vec<PackedManagedObject>,
    /// Indices of types that own static field storage, in type table order
    pub types_with_static_fields: Vec<usize>,
    /// Edges between nodes of the concatenated table
    pub connections: Vec<Connection>,
}

impl PackedCrawlerData {
    /// Wraps a packed snapshot, deriving the static-field type list and start indices.
    ///
    /// Managed objects and connections start out empty; the crawler fills them in.
    #[must_use]
    pub fn new(packed_memory_snapshot: PackedMemorySnapshot) -> Self {
        let types_with_static_fields: Vec<usize> = packed_memory_snapshot
            .type_descriptions
            .iter()
            .enumerate()
            .filter(|(_, t)| t.has_static_fields())
            .map(|(index, _)| index)
            .collect();

        let start_indices = StartIndices::new(
            packed_memory_snapshot.gc_handles.len(),
            packed_memory_snapshot.native_objects.len(),
            types_with_static_fields.len(),
        );

        PackedCrawlerData {
            packed_memory_snapshot,
            start_indices,
            managed_objects: Vec::new(),
            types_with_static_fields,
            connections: Vec::new(),
        }
    }

    /// Sets the managed objects found by the crawler.
    #[must_use]
    pub fn with_managed_objects(mut self, managed_objects: Vec<PackedManagedObject>) -> Self {
        self.start_indices = self
            .start_indices
            .with_managed_object_count(managed_objects.len());
        self.managed_objects = managed_objects;
        self
    }

    /// Sets the connections found by the crawler.
    #[must_use]
    pub fn with_connections(mut self, connections: Vec<Connection>) -> Self {
        self.connections = connections;
        self
    }

    /// Number of nodes in the concatenated table.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.start_indices.node_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::NodeKind;

    fn type_with_statics(name: &str, statics: usize) -> TypeDescription {
        TypeDescription {
            name: name.to_string(),
            static_field_bytes: vec![0; statics],
            ..TypeDescription::default()
        }
    }

    #[test]
    fn crawler_data_derives_static_types_and_indices() {
        let snapshot = PackedMemorySnapshot {
            gc_handles: vec![PackedGcHandle::default(); 2],
            native_objects: vec![PackedNativeObject::default(); 3],
            type_descriptions: vec![
                type_with_statics("A", 0),
                type_with_statics("B", 8),
                type_with_statics("C", 0),
                type_with_statics("D", 4),
            ],
            ..PackedMemorySnapshot::default()
        };

        let data = PackedCrawlerData::new(snapshot)
            .with_managed_objects(vec![PackedManagedObject::default(); 4]);

        assert_eq!(data.types_with_static_fields, vec![1, 3]);
        assert_eq!(data.start_indices.first_native_object(), 2);
        assert_eq!(data.start_indices.first_static_fields(), 5);
        assert_eq!(data.start_indices.first_managed_object(), 7);
        assert_eq!(data.node_count(), 11);
        assert_eq!(data.start_indices.kind_of(10), Some(NodeKind::ManagedObject));
    }

    #[test]
    fn hide_flags_composites() {
        assert!(HideFlags::DONT_SAVE.contains(HideFlags::DONT_UNLOAD_UNUSED_ASSET));
        assert!(HideFlags::HIDE_AND_DONT_SAVE.contains(HideFlags::HIDE_IN_HIERARCHY));
        assert!(!HideFlags::HIDE_AND_DONT_SAVE.contains(HideFlags::HIDE_IN_INSPECTOR));
    }

    #[test]
    fn string_type_detection() {
        assert!(type_with_statics("System.String", 0).is_string());
        assert!(!type_with_statics("System.Object", 0).is_string());
    }
}
