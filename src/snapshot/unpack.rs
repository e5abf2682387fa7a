//! Conversion of packed crawler output into a linked object graph.
//!
//! Unpacking runs in three passes over the packed tables:
//!
//! 1. **Materialize** every variant into [`Thing`]s, resolving type and class indices into
//!    names and captions. Rows whose indices fall outside their tables are rejected.
//! 2. **Concatenate** the variants in table order, so that a node's position in the result
//!    equals the index the crawler used for it in the connection list.
//! 3. **Link** every connection into the outgoing list of its source and the incoming list
//!    of its target. A single out-of-range connection fails the whole unpack; no partially
//!    linked graph is ever returned.
//!
//! # Examples
//!
//! ```rust
//! use snapscope::snapshot::{unpack, Connection, PackedCrawlerData, PackedGcHandle, PackedMemorySnapshot};
//!
//! let snapshot = PackedMemorySnapshot {
//!     gc_handles: vec![PackedGcHandle { target: 0x1000 }; 2],
//!     ..PackedMemorySnapshot::default()
//! };
//! let data = PackedCrawlerData::new(snapshot).with_connections(vec![Connection::new(0, 1)]);
//!
//! let crawled = unpack(data)?;
//! assert_eq!(crawled.len(), 2);
//! assert_eq!(crawled.all_objects()[1].referenced_by().len(), 1);
//! # Ok::<(), snapscope::Error>(())
//! ```

use tracing::{debug, warn};

use crate::{
    memory::{Heap, NativeClassIndex, PrimitiveReader, RuntimeAbi, VmLayout},
    snapshot::{
        Connection, CrawledSnapshot, GcHandle, ManagedObject, NativeObject, PackedCrawlerData,
        PackedGcHandle, PackedManagedObject, PackedMemorySnapshot, PackedNativeObject,
        PackedNativeType, StartIndices, StaticFields, Thing, ThingKind, TypeDescription,
        UnpackConfig,
    },
    utils::graph::NodeId,
    Error, Result,
};

/// Initial capacity of every node's edge lists.
const EDGE_CAPACITY_HINT: usize = 4;

/// Unpacks crawler output with the default [`UnpackConfig`].
///
/// # Errors
/// See [`unpack_with`].
pub fn unpack(data: PackedCrawlerData) -> Result<CrawledSnapshot> {
    unpack_with(data, &UnpackConfig::default())
}

/// Unpacks crawler output into a [`CrawledSnapshot`].
///
/// # Errors
/// - [`Error::Malformed`] if the start indices disagree with the table sizes, or a row refers
///   to a type or native class that does not exist
/// - [`Error::CorruptConnection`] if a connection indexes outside the node table
///
/// An unsupported pointer width or an object the heap cannot describe never fails the
/// unpack. With [`UnpackConfig::measure_unsized`] such objects keep size 0.
pub fn unpack_with(data: PackedCrawlerData, config: &UnpackConfig) -> Result<CrawledSnapshot> {
    let PackedCrawlerData {
        packed_memory_snapshot,
        start_indices,
        managed_objects,
        types_with_static_fields,
        connections,
    } = data;
    let PackedMemorySnapshot {
        producer_version,
        native_types,
        native_objects,
        gc_handles,
        type_descriptions,
        managed_heap_sections,
        virtual_machine_information: layout,
    } = packed_memory_snapshot;

    let expected = StartIndices::new(
        gc_handles.len(),
        native_objects.len(),
        types_with_static_fields.len(),
    )
    .with_managed_object_count(managed_objects.len());
    if start_indices != expected {
        return Err(malformed_error!(
            "Start indices {:?} do not match the packed tables {:?}",
            start_indices,
            expected
        ));
    }

    let abi = config
        .abi
        .unwrap_or_else(|| RuntimeAbi::for_producer(producer_version, layout.pointer_size));

    let mut things = Vec::with_capacity(start_indices.node_count());
    things.extend(gc_handles.iter().map(|handle| gc_handle_thing(handle, &layout)));
    for (row, native) in native_objects.iter().enumerate() {
        things.push(native_thing(row, native, &native_types, &abi)?);
    }
    for &type_index in &types_with_static_fields {
        things.push(static_fields_thing(type_index, &type_descriptions)?);
    }

    let reader = config.measure_unsized.then(|| {
        PrimitiveReader::new(
            Heap::new(&managed_heap_sections, layout.pointer_size),
            layout,
            abi,
        )
    });
    for (row, managed) in managed_objects.iter().enumerate() {
        things.push(managed_thing(
            row,
            managed,
            &type_descriptions,
            reader.as_ref(),
        )?);
    }

    link(&mut things, &connections)?;

    debug!(
        "Unpacked snapshot from producer {}: {} GC handles, {} native objects, {} static fields, {} managed objects, {} connections",
        producer_version,
        gc_handles.len(),
        native_objects.len(),
        types_with_static_fields.len(),
        managed_objects.len(),
        connections.len()
    );

    Ok(CrawledSnapshot::new(
        things,
        start_indices,
        type_descriptions,
        native_types,
        managed_heap_sections,
        layout,
        abi,
    ))
}

fn gc_handle_thing(handle: &PackedGcHandle, layout: &VmLayout) -> Thing {
    Thing::new(
        i64::from(layout.pointer_size),
        "gchandle".to_string(),
        ThingKind::GcHandle(GcHandle {
            target: handle.target,
        }),
    )
}

fn native_thing(
    row: usize,
    native: &PackedNativeObject,
    native_types: &[PackedNativeType],
    abi: &RuntimeAbi,
) -> Result<Thing> {
    let class_index = match abi.native_class_index {
        NativeClassIndex::ClassId => native.class_id,
        NativeClassIndex::NativeTypeArrayIndex => native.native_type_array_index,
    };
    let Some(class) = usize::try_from(class_index)
        .ok()
        .and_then(|index| native_types.get(index))
    else {
        return Err(malformed_error!(
            "Native object #{} ({}) refers to native type {} of {}",
            row,
            native.name,
            class_index,
            native_types.len()
        ));
    };

    Ok(Thing::new(
        i64::from(native.size),
        format!("{}({})", native.name, class.name),
        ThingKind::Native(NativeObject {
            instance_id: native.instance_id,
            class_id: class_index,
            class_name: class.name.clone(),
            name: native.name.clone(),
            is_persistent: native.is_persistent,
            is_dont_destroy_on_load: native.is_dont_destroy_on_load,
            is_manager: native.is_manager,
            hide_flags: native.hide_flags,
            native_object_address: native.native_object_address,
        }),
    ))
}

fn static_fields_thing(type_index: usize, types: &[TypeDescription]) -> Result<Thing> {
    let Some(owner) = types.get(type_index) else {
        return Err(malformed_error!(
            "Static fields refer to type {} of {}",
            type_index,
            types.len()
        ));
    };

    Ok(Thing::new(
        i64::try_from(owner.static_field_bytes.len()).unwrap_or(i64::MAX),
        format!("static fields of {}", owner.name),
        ThingKind::StaticFields(StaticFields { type_index }),
    ))
}

fn managed_thing(
    row: usize,
    managed: &PackedManagedObject,
    types: &[TypeDescription],
    reader: Option<&PrimitiveReader<'_>>,
) -> Result<Thing> {
    let Some((type_index, object_type)) = usize::try_from(managed.type_index)
        .ok()
        .and_then(|index| types.get(index).map(|t| (index, t)))
    else {
        return Err(malformed_error!(
            "Managed object #{} at {:#x} refers to type {} of {}",
            row,
            managed.address,
            managed.type_index,
            types.len()
        ));
    };

    let mut size = i64::from(managed.size);
    if size == 0 {
        if let Some(reader) = reader {
            match reader.size_of_object(managed.address, object_type, types) {
                Ok(measured) => size = i64::from(measured),
                Err(error) => {
                    warn!(
                        "Could not measure {} at {:#x}: {}",
                        object_type.name, managed.address, error
                    );
                }
            }
        }
    }

    Ok(Thing::new(
        size,
        object_type.name.clone(),
        ThingKind::Managed(ManagedObject {
            address: managed.address,
            type_index,
        }),
    ))
}

fn link(things: &mut [Thing], connections: &[Connection]) -> Result<()> {
    let node_count = things.len();
    let mut references: Vec<Vec<NodeId>> = (0..node_count)
        .map(|_| Vec::with_capacity(EDGE_CAPACITY_HINT))
        .collect();
    let mut referenced_by: Vec<Vec<NodeId>> = (0..node_count)
        .map(|_| Vec::with_capacity(EDGE_CAPACITY_HINT))
        .collect();

    for (position, connection) in connections.iter().enumerate() {
        if connection.from >= node_count || connection.to >= node_count {
            return Err(Error::CorruptConnection {
                position,
                from: connection.from,
                to: connection.to,
                node_count,
            });
        }
        references[connection.from].push(NodeId::new(connection.to));
        referenced_by[connection.to].push(NodeId::new(connection.from));
    }

    for ((thing, outgoing), incoming) in things.iter_mut().zip(references).zip(referenced_by) {
        thing.set_edges(outgoing, incoming);
    }
    Ok(())
}
