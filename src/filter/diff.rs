//! The differential ("new only") filter, which hides everything a baseline capture already had.

use std::collections::HashSet;

use crate::snapshot::{CrawledSnapshot, ThingKind};

/// Marks every node that already existed in `baseline` as ignored.
///
/// Native objects are matched by instance id and managed objects by address. GC handles and
/// static fields have no identity across captures and are never marked. Without a baseline
/// nothing is marked. Returns the number of nodes marked.
pub fn new_only(snapshot: &mut CrawledSnapshot, baseline: Option<&CrawledSnapshot>) -> usize {
    let Some(baseline) = baseline else {
        return 0;
    };

    let old_instance_ids: HashSet<i32> = baseline
        .native_objects()
        .iter()
        .filter_map(|thing| thing.as_native().map(|native| native.instance_id))
        .collect();
    let old_addresses: HashSet<u64> = baseline
        .managed_objects()
        .iter()
        .filter_map(|thing| thing.as_managed().map(|managed| managed.address))
        .collect();

    let mut marked = 0;
    for thing in snapshot.things_mut() {
        let existed = match thing.kind() {
            ThingKind::Native(native) => old_instance_ids.contains(&native.instance_id),
            ThingKind::Managed(managed) => old_addresses.contains(&managed.address),
            ThingKind::GcHandle(_) | ThingKind::StaticFields(_) => false,
        };
        if existed {
            thing.set_ignored(true);
            marked += 1;
        }
    }
    marked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{
        unpack, PackedCrawlerData, PackedGcHandle, PackedManagedObject, PackedMemorySnapshot,
        PackedNativeObject, PackedNativeType, TypeDescription,
    };

    fn capture(instance_ids: &[i32], addresses: &[u64]) -> CrawledSnapshot {
        let packed = PackedMemorySnapshot {
            native_types: vec![PackedNativeType {
                name: "Texture2D".to_string(),
                native_base_type_array_index: -1,
            }],
            native_objects: instance_ids
                .iter()
                .map(|&instance_id| PackedNativeObject {
                    instance_id,
                    ..PackedNativeObject::default()
                })
                .collect(),
            gc_handles: vec![PackedGcHandle { target: 0x1000 }],
            type_descriptions: vec![TypeDescription {
                name: "System.Object".to_string(),
                size: 16,
                ..TypeDescription::default()
            }],
            ..PackedMemorySnapshot::default()
        };
        let managed = addresses
            .iter()
            .map(|&address| PackedManagedObject {
                address,
                type_index: 0,
                size: 16,
            })
            .collect();
        unpack(PackedCrawlerData::new(packed).with_managed_objects(managed)).unwrap()
    }

    #[test]
    fn existing_identities_are_ignored() {
        let baseline = capture(&[42], &[0x1000]);
        let mut current = capture(&[42, 43], &[0x1000, 0x2000]);

        let marked = new_only(&mut current, Some(&baseline));
        assert_eq!(marked, 2);

        let ignored: Vec<bool> = current.all_objects().iter().map(|t| t.is_ignored()).collect();
        // gc handle, native 42, native 43, managed 0x1000, managed 0x2000
        assert_eq!(ignored, vec![false, true, false, true, false]);
    }

    #[test]
    fn no_baseline_is_a_no_op() {
        let mut current = capture(&[42], &[0x1000]);
        assert_eq!(new_only(&mut current, None), 0);
        assert_eq!(current.ignored_count(), 0);
    }
}
