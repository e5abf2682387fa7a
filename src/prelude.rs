//! # snapscope Prelude
//!
//! This module provides the types needed to unpack a capture, filter it and inspect the
//! result. Import it with a glob to get all of them at once.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all snapscope operations
pub use crate::Error;

/// The result type used throughout snapscope
pub use crate::Result;

// ================================================================================================
// Heap Access
// ================================================================================================

/// Positioned views into captured bytes
pub use crate::memory::{Cursor, CursorMut};

/// Heap sections and address resolution
pub use crate::memory::{Heap, MemorySection, PrimitiveReader};

/// Layout constants and version-dependent decoding rules
pub use crate::memory::{ProducerVersion, RuntimeAbi, VmLayout};

// ================================================================================================
// Snapshots
// ================================================================================================

/// Packed producer tables
pub use crate::snapshot::{
    Connection, HideFlags, PackedCrawlerData, PackedGcHandle, PackedManagedObject,
    PackedMemorySnapshot, PackedNativeObject, PackedNativeType, TypeDescription,
};

/// The unpacked object graph
pub use crate::snapshot::{CrawledSnapshot, NodeKind, Thing, ThingKind};

/// Unpacking
pub use crate::snapshot::{unpack, unpack_with, UnpackConfig};

/// Node identifiers
pub use crate::utils::graph::NodeId;

// ================================================================================================
// Filters and History
// ================================================================================================

/// Filter selection and composition
pub use crate::filter::{apply_filter, clear_filter, DefaultRoots, FilterSet, RootPredicate};

/// Two-slot capture history
pub use crate::session::SnapshotHistory;
