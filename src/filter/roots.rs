//! Liveness roots for the reachability filter.

use crate::{
    snapshot::{CrawledSnapshot, HideFlags, Thing, ThingKind},
    utils::graph::NodeId,
};

/// Decides which nodes are inherently alive.
///
/// Any `Fn(&CrawledSnapshot, NodeId) -> bool` is a `RootPredicate`, so ad-hoc root sets can
/// be passed as closures:
///
/// ```rust
/// use snapscope::{filter::RootPredicate, snapshot::NodeKind, CrawledSnapshot, NodeId};
///
/// fn handles_only(snapshot: &CrawledSnapshot, node: NodeId) -> bool {
///     snapshot.start_indices().kind_of(node.index()) == Some(NodeKind::GcHandle)
/// }
///
/// fn takes_roots(_roots: &impl RootPredicate) {}
/// takes_roots(&handles_only);
/// ```
pub trait RootPredicate {
    /// Returns `true` if `node` is alive regardless of incoming references.
    fn is_root(&self, snapshot: &CrawledSnapshot, node: NodeId) -> bool;
}

impl<F> RootPredicate for F
where
    F: Fn(&CrawledSnapshot, NodeId) -> bool,
{
    fn is_root(&self, snapshot: &CrawledSnapshot, node: NodeId) -> bool {
        self(snapshot, node)
    }
}

/// The roots the producing engine itself treats as alive.
///
/// - every GC handle and every static fields node
/// - non-persistent native objects that are managers, survive scene loads, are exempt from
///   the unused asset sweep, are asset bundles, or are game objects living in a scene
///
/// Managed objects are never roots on their own; they stay alive only through references.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultRoots;

impl DefaultRoots {
    /// Explains why `thing` is a root, or returns `None` if it is not one.
    #[must_use]
    pub fn reason(&self, thing: &Thing) -> Option<&'static str> {
        match thing.kind() {
            ThingKind::GcHandle(_) => Some("GC handles keep their target alive"),
            ThingKind::StaticFields(_) => {
                Some("Static fields are global; everything they reference stays loaded")
            }
            ThingKind::Managed(_) => None,
            ThingKind::Native(native) => {
                if native.is_persistent {
                    None
                } else if native.is_manager {
                    Some("Internal engine manager")
                } else if native.is_dont_destroy_on_load {
                    Some("Marked to survive scene loads")
                } else if native
                    .hide_flags
                    .contains(HideFlags::DONT_UNLOAD_UNUSED_ASSET)
                {
                    Some("Hide flags exempt it from the unused asset sweep")
                } else if native.class_name == "AssetBundle" {
                    Some("Asset bundles stay loaded until unloaded explicitly")
                } else if native.class_name == "GameObject" {
                    Some("Game object living in a scene")
                } else {
                    None
                }
            }
        }
    }
}

impl RootPredicate for DefaultRoots {
    fn is_root(&self, snapshot: &CrawledSnapshot, node: NodeId) -> bool {
        snapshot
            .get(node)
            .is_some_and(|thing| self.reason(thing).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{
        unpack, PackedCrawlerData, PackedGcHandle, PackedManagedObject, PackedMemorySnapshot,
        PackedNativeObject, PackedNativeType, TypeDescription,
    };

    fn native(name: &str, class: i32) -> PackedNativeObject {
        PackedNativeObject {
            name: name.to_string(),
            native_type_array_index: class,
            ..PackedNativeObject::default()
        }
    }

    fn snapshot() -> CrawledSnapshot {
        let classes = ["Texture2D", "GameObject", "AssetBundle"];
        let mut persistent_manager = native("InputManager", 0);
        persistent_manager.is_manager = true;
        persistent_manager.is_persistent = true;
        let mut manager = native("TimeManager", 0);
        manager.is_manager = true;
        let mut survivor = native("Music", 0);
        survivor.is_dont_destroy_on_load = true;
        let mut pinned = native("Atlas", 0);
        pinned.hide_flags = HideFlags::HIDE_AND_DONT_SAVE;

        let packed = PackedMemorySnapshot {
            native_types: classes
                .iter()
                .map(|name| PackedNativeType {
                    name: (*name).to_string(),
                    native_base_type_array_index: -1,
                })
                .collect(),
            native_objects: vec![
                native("Plain", 0),
                persistent_manager,
                manager,
                survivor,
                pinned,
                native("Player", 1),
                native("Bundle", 2),
            ],
            gc_handles: vec![PackedGcHandle { target: 0x10 }],
            type_descriptions: vec![TypeDescription {
                name: "Game.Settings".to_string(),
                static_field_bytes: vec![0; 8],
                ..TypeDescription::default()
            }],
            ..PackedMemorySnapshot::default()
        };
        let data = PackedCrawlerData::new(packed).with_managed_objects(vec![PackedManagedObject {
            address: 0x10,
            type_index: 0,
            size: 16,
        }]);
        unpack(data).unwrap()
    }

    #[test]
    fn default_roots_per_variant() {
        let snapshot = snapshot();
        let roots: Vec<bool> = (0..snapshot.len())
            .map(|index| DefaultRoots.is_root(&snapshot, NodeId::new(index)))
            .collect();

        // gc handle, 7 natives, static fields, managed
        assert_eq!(
            roots,
            vec![true, false, false, true, true, true, true, true, true, false]
        );
        assert!(!DefaultRoots.is_root(&snapshot, NodeId::new(snapshot.len())));
    }

    #[test]
    fn reasons_are_reported() {
        let snapshot = snapshot();
        let manager = &snapshot.all_objects()[3];
        assert_eq!(DefaultRoots.reason(manager), Some("Internal engine manager"));
        let plain = &snapshot.all_objects()[1];
        assert_eq!(DefaultRoots.reason(plain), None);
    }

    #[test]
    fn closures_are_predicates() {
        let snapshot = snapshot();
        let only_first = |_: &CrawledSnapshot, node: NodeId| node.index() == 0;
        assert!(only_first.is_root(&snapshot, NodeId::new(0)));
        assert!(!only_first.is_root(&snapshot, NodeId::new(1)));
    }
}
