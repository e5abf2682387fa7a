// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # snapscope
//!
//! Unpacking and analysis of managed-runtime memory snapshots.
//!
//! A memory profiler captures two things from a running engine: the tables the engine reports
//! about itself (native objects, GC handles, managed type descriptions, raw managed heap
//! sections) and the references a heap crawler discovered between them. `snapscope` turns
//! that packed, index-addressed form into a typed object graph and answers the two questions a
//! memory inspector keeps asking: what is actually alive, and what is new since the last
//! capture.
//!
//! ## Features
//!
//! - **Bounds-checked heap decoding** - Little-endian primitive, pointer, string and array
//!   reads over captured heap sections, with runtime-version-dependent layout rules
//! - **Linked object graph** - One arena of nodes with outgoing and incoming edges resolved
//!   once at unpack time
//! - **Reachability filter** - Multi-source breadth-first liveness from a pluggable root set
//! - **Differential filter** - Hides everything that already existed in a baseline capture
//! - **Capture history** - A two-slot current/baseline holder with composable filters
//!
//! ## Architecture
//!
//! - [`memory`] - Cursors, heap sections, layout rules and structured readers
//! - [`snapshot`] - Packed tables, unpacking and the [`CrawledSnapshot`] graph
//! - [`filter`] - Reachability and differential filters and their composition
//! - [`session`] - The [`session::SnapshotHistory`] holder
//! - [`utils`] - Graph traversal and bit sets
//!
//! Data flows strictly downward: heap sections are decoded by [`memory`], [`snapshot`] builds
//! the graph, and [`filter`] only ever flips the per-node `ignored` flag.
//!
//! ## Quick Start
//!
//! ```rust
//! use snapscope::prelude::*;
//!
//! let packed = PackedMemorySnapshot {
//!     gc_handles: vec![PackedGcHandle { target: 0x1000 }],
//!     type_descriptions: vec![TypeDescription {
//!         name: "System.Object".to_string(),
//!         size: 16,
//!         ..TypeDescription::default()
//!     }],
//!     ..PackedMemorySnapshot::default()
//! };
//! let data = PackedCrawlerData::new(packed)
//!     .with_managed_objects(vec![
//!         PackedManagedObject { address: 0x1000, type_index: 0, size: 16 },
//!         PackedManagedObject { address: 0x2000, type_index: 0, size: 16 },
//!     ])
//!     .with_connections(vec![Connection::new(0, 1)]);
//!
//! let mut snapshot = unpack(data)?;
//! assert_eq!(snapshot.total_size(), 8 + 16 + 16);
//!
//! // The GC handle keeps 0x1000 alive; nothing references 0x2000
//! let summary = apply_filter(&mut snapshot, FilterSet::IGNORE_UNUSED, None, &DefaultRoots);
//! assert_eq!(summary.ignored_count, 1);
//! assert!(snapshot.all_objects()[2].is_ignored());
//! # Ok::<(), snapscope::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! All fallible operations return [`Result<T>`]. Decode errors ([`Error::is_decode_error`])
//! concern a single field or object and are recoverable; a corrupt connection list fails the
//! whole unpack.
//!
//! ## Logging
//!
//! The crate emits `tracing` events at unpack and filter boundaries and never installs a
//! subscriber.

#[macro_use]
pub(crate) mod error;

/// Convenient re-exports of the most commonly used types and traits.
///
/// ```rust
/// use snapscope::prelude::*;
///
/// let history = SnapshotHistory::new();
/// assert!(!history.can_diff());
/// ```
pub mod prelude;

pub mod filter;
pub mod memory;
pub mod session;
pub mod snapshot;
pub mod utils;

/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// This is used consistently throughout the crate for all fallible operations.
///
/// # Examples
///
/// ```rust
/// use snapscope::{Cursor, Result};
///
/// fn first_word(bytes: &[u8]) -> Result<i32> {
///     Cursor::new(bytes, 0, 8).read_i32()
/// }
/// assert_eq!(first_word(&[7, 0, 0, 0]).unwrap(), 7);
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `snapscope` Error type
///
/// The main error type for all operations in this crate.
pub use error::Error;

pub use memory::{
    Cursor, CursorMut, HeaderField, Heap, MemorySection, PrimitiveReader, ProducerVersion,
    RuntimeAbi, VmLayout,
};
pub use snapshot::{
    unpack, unpack_with, CrawledSnapshot, PackedCrawlerData, PackedMemorySnapshot, Thing,
    ThingKind, TypeDescription, UnpackConfig,
};
pub use utils::graph::NodeId;
