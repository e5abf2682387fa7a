//! The unpacked, reference-linked snapshot.
//!
//! A [`CrawledSnapshot`] owns one immutable node table together with the tables needed to
//! interpret it: managed type descriptions, native types, the raw managed heap and the layout
//! rules it was decoded with. Nodes are stored in a single arena ordered
//! `GcHandles ++ NativeObjects ++ StaticFields ++ ManagedObjects`; edges are [`NodeId`]s into
//! that arena, resolved once at unpack time.
//!
//! The only state that changes after construction is the per-node `ignored` flag, which is
//! owned by the filter passes in [`crate::filter`].

use crate::{
    memory::{Heap, MemorySection, PrimitiveReader, RuntimeAbi, VmLayout},
    snapshot::{NodeKind, PackedNativeType, StartIndices, Thing, ThingKind, TypeDescription},
    utils::graph::{NodeId, Successors},
    Result,
};

/// One capture, unpacked into a typed object graph.
#[derive(Debug, Clone)]
pub struct CrawledSnapshot {
    all_objects: Vec<Thing>,
    start_indices: StartIndices,
    total_size: i64,
    type_descriptions: Vec<TypeDescription>,
    native_types: Vec<PackedNativeType>,
    managed_heap: Vec<MemorySection>,
    layout: VmLayout,
    abi: RuntimeAbi,
}

impl CrawledSnapshot {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        all_objects: Vec<Thing>,
        start_indices: StartIndices,
        type_descriptions: Vec<TypeDescription>,
        native_types: Vec<PackedNativeType>,
        managed_heap: Vec<MemorySection>,
        layout: VmLayout,
        abi: RuntimeAbi,
    ) -> Self {
        let total_size = all_objects.iter().map(Thing::size).sum();
        CrawledSnapshot {
            all_objects,
            start_indices,
            total_size,
            type_descriptions,
            native_types,
            managed_heap,
            layout,
            abi,
        }
    }

    /// Every node, in table order.
    #[must_use]
    pub fn all_objects(&self) -> &[Thing] {
        &self.all_objects
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.all_objects.len()
    }

    /// Returns `true` if the snapshot has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all_objects.is_empty()
    }

    /// The node with the given id.
    #[must_use]
    pub fn get(&self, node: NodeId) -> Option<&Thing> {
        self.all_objects.get(node.index())
    }

    /// Iterates over `(id, node)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Thing)> + '_ {
        self.all_objects
            .iter()
            .enumerate()
            .map(|(index, thing)| (NodeId::new(index), thing))
    }

    /// Sum of every node's size, fixed at construction.
    #[must_use]
    pub fn total_size(&self) -> i64 {
        self.total_size
    }

    /// Positions of each variant within the node table.
    #[must_use]
    pub fn start_indices(&self) -> &StartIndices {
        &self.start_indices
    }

    /// Nodes of one variant, as a contiguous slice of the node table.
    #[must_use]
    pub fn things_of(&self, kind: NodeKind) -> &[Thing] {
        &self.all_objects[self.start_indices.range_of(kind)]
    }

    /// GC handle nodes.
    #[must_use]
    pub fn gc_handles(&self) -> &[Thing] {
        self.things_of(NodeKind::GcHandle)
    }

    /// Native object nodes.
    #[must_use]
    pub fn native_objects(&self) -> &[Thing] {
        self.things_of(NodeKind::NativeObject)
    }

    /// Static fields nodes.
    #[must_use]
    pub fn static_fields(&self) -> &[Thing] {
        self.things_of(NodeKind::StaticFields)
    }

    /// Managed object nodes.
    #[must_use]
    pub fn managed_objects(&self) -> &[Thing] {
        self.things_of(NodeKind::ManagedObject)
    }

    /// Nodes referenced by `node`.
    pub fn references_of(&self, node: NodeId) -> impl Iterator<Item = &Thing> + '_ {
        self.get(node)
            .into_iter()
            .flat_map(|thing| thing.references().iter())
            .filter_map(|id| self.get(*id))
    }

    /// Nodes referencing `node`.
    pub fn referenced_by_of(&self, node: NodeId) -> impl Iterator<Item = &Thing> + '_ {
        self.get(node)
            .into_iter()
            .flat_map(|thing| thing.referenced_by().iter())
            .filter_map(|id| self.get(*id))
    }

    /// Managed type table.
    #[must_use]
    pub fn type_descriptions(&self) -> &[TypeDescription] {
        &self.type_descriptions
    }

    /// Native type table.
    #[must_use]
    pub fn native_types(&self) -> &[PackedNativeType] {
        &self.native_types
    }

    /// The managed type of a managed object or static fields node.
    #[must_use]
    pub fn type_of(&self, thing: &Thing) -> Option<&TypeDescription> {
        match thing.kind() {
            ThingKind::Managed(managed) => self.type_descriptions.get(managed.type_index),
            ThingKind::StaticFields(statics) => self.type_descriptions.get(statics.type_index),
            ThingKind::GcHandle(_) | ThingKind::Native(_) => None,
        }
    }

    /// Raw static field storage of a static fields node.
    #[must_use]
    pub fn static_storage(&self, thing: &Thing) -> Option<&[u8]> {
        let statics = thing.as_static_fields()?;
        self.type_descriptions
            .get(statics.type_index)
            .map(|t| t.static_field_bytes.as_slice())
    }

    /// View over the captured managed heap.
    #[must_use]
    pub fn heap(&self) -> Heap<'_> {
        Heap::new(&self.managed_heap, self.layout.pointer_size)
    }

    /// Reader over the captured managed heap using this snapshot's layout rules.
    #[must_use]
    pub fn reader(&self) -> PrimitiveReader<'_> {
        PrimitiveReader::new(self.heap(), self.layout, self.abi)
    }

    /// Layout constants reported by the producer.
    #[must_use]
    pub fn layout(&self) -> &VmLayout {
        &self.layout
    }

    /// Version-dependent decoding rules in effect for this snapshot.
    #[must_use]
    pub fn abi(&self) -> &RuntimeAbi {
        &self.abi
    }

    /// Decodes the contents of a managed string node.
    ///
    /// Returns `Ok(None)` for nodes that are not managed strings.
    ///
    /// # Errors
    /// Returns a decode error if the string's bytes are not readable from the captured heap.
    pub fn managed_string(&self, thing: &Thing) -> Result<Option<String>> {
        let Some(managed) = thing.as_managed() else {
            return Ok(None);
        };
        match self.type_descriptions.get(managed.type_index) {
            Some(t) if t.is_string() => self.reader().read_string_at(managed.address).map(Some),
            _ => Ok(None),
        }
    }

    /// Number of nodes hidden by the active filter.
    #[must_use]
    pub fn ignored_count(&self) -> usize {
        self.all_objects.iter().filter(|t| t.is_ignored()).count()
    }

    /// Total size of nodes hidden by the active filter.
    #[must_use]
    pub fn ignored_size(&self) -> i64 {
        self.all_objects
            .iter()
            .filter(|t| t.is_ignored())
            .map(Thing::size)
            .sum()
    }

    /// Total size of nodes left visible by the active filter.
    #[must_use]
    pub fn visible_size(&self) -> i64 {
        self.total_size - self.ignored_size()
    }

    pub(crate) fn things_mut(&mut self) -> &mut [Thing] {
        &mut self.all_objects
    }
}

impl Successors for CrawledSnapshot {
    fn node_count(&self) -> usize {
        self.all_objects.len()
    }

    fn successors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.get(node)
            .map(Thing::references)
            .unwrap_or_default()
            .iter()
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        snapshot::{
            unpack, Connection, PackedCrawlerData, PackedGcHandle, PackedManagedObject,
            PackedMemorySnapshot,
        },
        utils::graph::bfs_from,
    };

    fn snapshot() -> CrawledSnapshot {
        let packed = PackedMemorySnapshot {
            gc_handles: vec![PackedGcHandle { target: 0x10 }],
            type_descriptions: vec![TypeDescription {
                name: "System.Object".to_string(),
                size: 16,
                ..TypeDescription::default()
            }],
            ..PackedMemorySnapshot::default()
        };
        let managed = (0..3)
            .map(|i| PackedManagedObject {
                address: 0x10 * (i + 1),
                type_index: 0,
                size: 16,
            })
            .collect();
        let data = PackedCrawlerData::new(packed)
            .with_managed_objects(managed)
            .with_connections(vec![Connection::new(0, 1), Connection::new(1, 2)]);
        unpack(data).unwrap()
    }

    #[test]
    fn slices_and_lookups() {
        let snapshot = snapshot();
        assert_eq!(snapshot.gc_handles().len(), 1);
        assert!(snapshot.native_objects().is_empty());
        assert_eq!(snapshot.things_of(NodeKind::ManagedObject).len(), 3);
        assert!(snapshot.get(NodeId::new(4)).is_none());
        assert!(snapshot.type_of(&snapshot.gc_handles()[0]).is_none());
        assert_eq!(
            snapshot.references_of(NodeId::new(1)).map(Thing::caption).collect::<Vec<_>>(),
            vec!["System.Object"]
        );
        assert_eq!(snapshot.heap().pointer_size(), 8);
    }

    #[test]
    fn graph_view_follows_references() {
        let snapshot = snapshot();
        let reached: Vec<usize> = bfs_from(&snapshot, [NodeId::new(0)])
            .map(NodeId::index)
            .collect();
        assert_eq!(reached, vec![0, 1, 2]);
    }

    #[test]
    fn ignored_aggregates() {
        let mut snapshot = snapshot();
        assert_eq!(snapshot.total_size(), 8 + 3 * 16);
        snapshot.things_mut()[3].set_ignored(true);
        assert_eq!(snapshot.ignored_count(), 1);
        assert_eq!(snapshot.ignored_size(), 16);
        assert_eq!(snapshot.visible_size(), 8 + 2 * 16);
    }
}
