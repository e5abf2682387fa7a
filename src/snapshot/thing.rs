//! Nodes of the unpacked object graph.
//!
//! Every node is a [`Thing`]: the size, caption, edges and filter flag shared by all nodes,
//! plus a [`ThingKind`] carrying the variant-specific payload. The variant set is closed; code
//! that needs to treat variants differently matches on [`ThingKind`] exhaustively.

use crate::{
    snapshot::{HideFlags, NodeKind},
    utils::graph::NodeId,
};

/// An engine-native object.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct NativeObject {
    /// Instance identifier, unique and stable within one capture
    pub instance_id: i32,
    /// Index of the object's class in the native type table
    pub class_id: i32,
    /// Name of the object's class
    pub class_name: String,
    /// Object name
    pub name: String,
    /// `true` if the object is backed by an asset on disk
    pub is_persistent: bool,
    /// `true` if the object survives scene loads
    pub is_dont_destroy_on_load: bool,
    /// `true` for engine manager singletons
    pub is_manager: bool,
    /// Visibility and lifetime flags
    pub hide_flags: HideFlags,
    /// Address of the native object
    pub native_object_address: u64,
}

/// An object on the managed heap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManagedObject {
    /// Address of the object, its identity within one capture
    pub address: u64,
    /// Index of the object's type in the snapshot's type table
    pub type_index: usize,
}

/// A GC handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcHandle {
    /// Address of the managed object the handle keeps alive
    pub target: u64,
}

/// The static field storage of one managed type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaticFields {
    /// Index of the owning type in the snapshot's type table
    pub type_index: usize,
}

/// Variant-specific payload of a [`Thing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThingKind {
    /// See [`GcHandle`]
    GcHandle(GcHandle),
    /// See [`NativeObject`]
    Native(NativeObject),
    /// See [`StaticFields`]
    StaticFields(StaticFields),
    /// See [`ManagedObject`]
    Managed(ManagedObject),
}

/// One node of the object graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thing {
    size: i64,
    caption: String,
    kind: ThingKind,
    references: Vec<NodeId>,
    referenced_by: Vec<NodeId>,
    ignored: bool,
}

impl Thing {
    pub(crate) fn new(size: i64, caption: String, kind: ThingKind) -> Self {
        Thing {
            size,
            caption,
            kind,
            references: Vec::new(),
            referenced_by: Vec::new(),
            ignored: false,
        }
    }

    pub(crate) fn set_edges(&mut self, references: Vec<NodeId>, referenced_by: Vec<NodeId>) {
        self.references = references;
        self.referenced_by = referenced_by;
    }

    pub(crate) fn set_ignored(&mut self, ignored: bool) {
        self.ignored = ignored;
    }

    /// Bytes attributed to this node.
    #[must_use]
    pub fn size(&self) -> i64 {
        self.size
    }

    /// Human-readable label.
    #[must_use]
    pub fn caption(&self) -> &str {
        &self.caption
    }

    /// Variant payload.
    #[must_use]
    pub fn kind(&self) -> &ThingKind {
        &self.kind
    }

    /// The variant of this node.
    #[must_use]
    pub fn node_kind(&self) -> NodeKind {
        match self.kind {
            ThingKind::GcHandle(_) => NodeKind::GcHandle,
            ThingKind::Native(_) => NodeKind::NativeObject,
            ThingKind::StaticFields(_) => NodeKind::StaticFields,
            ThingKind::Managed(_) => NodeKind::ManagedObject,
        }
    }

    /// Nodes this node references, in connection order and with multiplicity.
    #[must_use]
    pub fn references(&self) -> &[NodeId] {
        &self.references
    }

    /// Nodes referencing this node, in connection order and with multiplicity.
    #[must_use]
    pub fn referenced_by(&self) -> &[NodeId] {
        &self.referenced_by
    }

    /// `true` if the active filter hides this node.
    #[must_use]
    pub fn is_ignored(&self) -> bool {
        self.ignored
    }

    /// The native payload, if this is a native object.
    #[must_use]
    pub fn as_native(&self) -> Option<&NativeObject> {
        match &self.kind {
            ThingKind::Native(native) => Some(native),
            _ => None,
        }
    }

    /// The managed payload, if this is a managed object.
    #[must_use]
    pub fn as_managed(&self) -> Option<&ManagedObject> {
        match &self.kind {
            ThingKind::Managed(managed) => Some(managed),
            _ => None,
        }
    }

    /// The GC handle payload, if this is a GC handle.
    #[must_use]
    pub fn as_gc_handle(&self) -> Option<&GcHandle> {
        match &self.kind {
            ThingKind::GcHandle(handle) => Some(handle),
            _ => None,
        }
    }

    /// The static fields payload, if this is a static fields node.
    #[must_use]
    pub fn as_static_fields(&self) -> Option<&StaticFields> {
        match &self.kind {
            ThingKind::StaticFields(statics) => Some(statics),
            _ => None,
        }
    }
}
