//! Visibility filters over an unpacked snapshot.
//!
//! Filters never remove nodes; they set each node's `ignored` flag so consumers can hide it.
//! Two filters exist and may be combined:
//!
//! - [`FilterSet::IGNORE_UNUSED`] hides everything no root reaches ([`ignore_unused`])
//! - [`FilterSet::NEW_ONLY`] hides everything that already existed in a baseline capture
//!   ([`new_only`])
//!
//! Filters are composable flags rather than accumulated facts: [`apply_filter`] always starts
//! from a snapshot with every flag cleared, then hides the union of what each selected filter
//! hides.
//!
//! # Examples
//!
//! ```rust
//! use snapscope::{
//!     filter::{apply_filter, DefaultRoots, FilterSet},
//!     snapshot::{unpack, PackedCrawlerData, PackedGcHandle, PackedMemorySnapshot},
//! };
//!
//! let packed = PackedMemorySnapshot {
//!     gc_handles: vec![PackedGcHandle { target: 0x1000 }],
//!     ..PackedMemorySnapshot::default()
//! };
//! let mut snapshot = unpack(PackedCrawlerData::new(packed))?;
//!
//! let summary = apply_filter(&mut snapshot, FilterSet::IGNORE_UNUSED, None, &DefaultRoots);
//! assert_eq!(summary.ignored_count, 0);
//! # Ok::<(), snapscope::Error>(())
//! ```

mod diff;
mod reachability;
mod roots;

pub use diff::new_only;
pub use reachability::ignore_unused;
pub use roots::{DefaultRoots, RootPredicate};

use bitflags::bitflags;
use tracing::debug;

use crate::snapshot::CrawledSnapshot;

bitflags! {
    /// Selection of filters to apply. The empty set shows everything.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FilterSet: u32 {
        /// Hide nodes unreachable from any root
        const IGNORE_UNUSED = 0x01;
        /// Hide nodes that existed in the baseline capture
        const NEW_ONLY = 0x02;
    }
}

/// Outcome of [`apply_filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterSummary {
    /// The filters that were applied
    pub filters: FilterSet,
    /// Nodes hidden after all filters ran
    pub ignored_count: usize,
    /// Total size of hidden nodes
    pub ignored_size: i64,
    /// Total size of nodes left visible
    pub visible_size: i64,
}

impl FilterSummary {
    fn of(snapshot: &CrawledSnapshot, filters: FilterSet) -> Self {
        FilterSummary {
            filters,
            ignored_count: snapshot.ignored_count(),
            ignored_size: snapshot.ignored_size(),
            visible_size: snapshot.visible_size(),
        }
    }
}

/// Clears every flag, then runs each filter selected in `filters`.
///
/// `baseline` is only consulted by [`FilterSet::NEW_ONLY`]; without one that filter hides
/// nothing. `roots` is only consulted by [`FilterSet::IGNORE_UNUSED`].
pub fn apply_filter<R>(
    snapshot: &mut CrawledSnapshot,
    filters: FilterSet,
    baseline: Option<&CrawledSnapshot>,
    roots: &R,
) -> FilterSummary
where
    R: RootPredicate + ?Sized,
{
    clear_filter(snapshot);

    if filters.contains(FilterSet::IGNORE_UNUSED) {
        let marked = ignore_unused(snapshot, roots);
        debug!("Unreachable from roots: {marked} nodes");
    }
    if filters.contains(FilterSet::NEW_ONLY) {
        if baseline.is_none() {
            debug!("No baseline capture, skipping new-only filter");
        }
        let marked = new_only(snapshot, baseline);
        debug!("Present in baseline: {marked} nodes");
    }

    let summary = FilterSummary::of(snapshot, filters);
    debug!(
        "Applied {:?}: {} of {} nodes hidden, {} bytes visible",
        filters,
        summary.ignored_count,
        snapshot.len(),
        summary.visible_size
    );
    summary
}

/// Makes every node visible again.
pub fn clear_filter(snapshot: &mut CrawledSnapshot) {
    for thing in snapshot.things_mut() {
        thing.set_ignored(false);
    }
}
