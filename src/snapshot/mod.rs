//! Packed snapshot tables and their unpacked object graph.
//!
//! A capture arrives as a [`PackedCrawlerData`]: index-addressed tables plus a flat list of
//! [`Connection`]s. [`unpack`] turns it into a [`CrawledSnapshot`], where every node is a
//! [`Thing`] with resolved outgoing and incoming edges.
//!
//! # Key Components
//!
//! - [`PackedMemorySnapshot`], [`PackedCrawlerData`] - The producer-side tables
//! - [`StartIndices`], [`NodeKind`] - Positional layout of the concatenated node table
//! - [`Thing`], [`ThingKind`] - Nodes of the unpacked graph
//! - [`CrawledSnapshot`] - The unpacked graph with its type tables and heap
//! - [`unpack`], [`unpack_with`], [`UnpackConfig`] - Conversion between the two

mod config;
mod crawled;
mod indices;
mod packed;
mod thing;
mod unpack;

pub use config::UnpackConfig;
pub use crawled::CrawledSnapshot;
pub use indices::{NodeKind, StartIndices};
pub use packed::{
    Connection, HideFlags, PackedCrawlerData, PackedGcHandle, PackedManagedObject,
    PackedMemorySnapshot, PackedNativeObject, PackedNativeType, TypeDescription,
};
pub use thing::{GcHandle, ManagedObject, NativeObject, StaticFields, Thing, ThingKind};
pub use unpack::{unpack, unpack_with};
