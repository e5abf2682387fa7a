//! Positional layout of the concatenated node table.
//!
//! The unpacked node table is always the concatenation
//! `GcHandles ++ NativeObjects ++ StaticFields ++ ManagedObjects`. Both the crawler's
//! connection list and all downstream consumers rely on that order, and determine a node's
//! variant purely from its position. [`StartIndices`] records where each run begins.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// The four node variants, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter)]
pub enum NodeKind {
    /// A GC handle anchoring a managed object
    #[strum(to_string = "GC handle")]
    GcHandle,
    /// An engine-native object
    #[strum(to_string = "native object")]
    NativeObject,
    /// The static storage of one managed type
    #[strum(to_string = "static fields")]
    StaticFields,
    /// An object on the managed heap
    #[strum(to_string = "managed object")]
    ManagedObject,
}

/// First index of every node variant within the concatenated table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartIndices {
    gc_handle_count: usize,
    native_object_count: usize,
    static_fields_count: usize,
    managed_object_count: usize,
}

impl StartIndices {
    /// Creates start indices for the given variant counts; the managed object count is zero.
    #[must_use]
    pub const fn new(
        gc_handle_count: usize,
        native_object_count: usize,
        static_fields_count: usize,
    ) -> Self {
        StartIndices {
            gc_handle_count,
            native_object_count,
            static_fields_count,
            managed_object_count: 0,
        }
    }

    /// Returns a copy with the managed object count set.
    #[must_use]
    pub const fn with_managed_object_count(mut self, count: usize) -> Self {
        self.managed_object_count = count;
        self
    }

    /// Index of the first GC handle, always `0`.
    #[must_use]
    pub const fn first_gc_handle(&self) -> usize {
        0
    }

    /// Index of the first native object.
    #[must_use]
    pub const fn first_native_object(&self) -> usize {
        self.first_gc_handle() + self.gc_handle_count
    }

    /// Index of the first static fields node.
    #[must_use]
    pub const fn first_static_fields(&self) -> usize {
        self.first_native_object() + self.native_object_count
    }

    /// Index of the first managed object.
    #[must_use]
    pub const fn first_managed_object(&self) -> usize {
        self.first_static_fields() + self.static_fields_count
    }

    /// Total number of nodes.
    #[must_use]
    pub const fn node_count(&self) -> usize {
        self.first_managed_object() + self.managed_object_count
    }

    /// Number of nodes of the given kind.
    #[must_use]
    pub const fn count_of(&self, kind: NodeKind) -> usize {
        match kind {
            NodeKind::GcHandle => self.gc_handle_count,
            NodeKind::NativeObject => self.native_object_count,
            NodeKind::StaticFields => self.static_fields_count,
            NodeKind::ManagedObject => self.managed_object_count,
        }
    }

    /// Index range occupied by nodes of the given kind.
    #[must_use]
    pub fn range_of(&self, kind: NodeKind) -> std::ops::Range<usize> {
        let start = match kind {
            NodeKind::GcHandle => self.first_gc_handle(),
            NodeKind::NativeObject => self.first_native_object(),
            NodeKind::StaticFields => self.first_static_fields(),
            NodeKind::ManagedObject => self.first_managed_object(),
        };
        start..start + self.count_of(kind)
    }

    /// Variant of the node at `index`, or `None` past the end of the table.
    #[must_use]
    pub const fn kind_of(&self, index: usize) -> Option<NodeKind> {
        if index < self.first_native_object() {
            Some(NodeKind::GcHandle)
        } else if index < self.first_static_fields() {
            Some(NodeKind::NativeObject)
        } else if index < self.first_managed_object() {
            Some(NodeKind::StaticFields)
        } else if index < self.node_count() {
            Some(NodeKind::ManagedObject)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn ranges_partition_the_table() {
        let indices = StartIndices::new(2, 3, 1).with_managed_object_count(4);

        let mut next = 0;
        for kind in NodeKind::iter() {
            let range = indices.range_of(kind);
            assert_eq!(range.start, next);
            next = range.end;
            for index in range {
                assert_eq!(indices.kind_of(index), Some(kind));
            }
        }
        assert_eq!(next, indices.node_count());
        assert_eq!(indices.kind_of(indices.node_count()), None);
    }

    #[test]
    fn empty_runs_are_skipped() {
        let indices = StartIndices::new(0, 0, 0).with_managed_object_count(1);
        assert_eq!(indices.kind_of(0), Some(NodeKind::ManagedObject));
        assert!(indices.range_of(NodeKind::GcHandle).is_empty());
    }

    #[test]
    fn kind_display() {
        assert_eq!(NodeKind::GcHandle.to_string(), "GC handle");
        assert_eq!(NodeKind::StaticFields.to_string(), "static fields");
    }
}
