//! Two-slot capture history.
//!
//! A profiling session keeps the most recent capture as `current` and the one before it as
//! `baseline`, so that the differential filter always has something to compare against once
//! a second capture has been taken. [`SnapshotHistory`] owns both slots together with the
//! filter selection last applied to `current`.
//!
//! # Examples
//!
//! ```rust
//! use snapscope::{
//!     filter::{DefaultRoots, FilterSet},
//!     session::SnapshotHistory,
//!     snapshot::{unpack, PackedCrawlerData, PackedMemorySnapshot},
//! };
//!
//! let mut history = SnapshotHistory::new();
//! history.push(unpack(PackedCrawlerData::new(PackedMemorySnapshot::default()))?);
//! assert!(!history.can_diff());
//!
//! history.push(unpack(PackedCrawlerData::new(PackedMemorySnapshot::default()))?);
//! assert!(history.can_diff());
//!
//! history.apply_filter(FilterSet::NEW_ONLY, &DefaultRoots);
//! assert_eq!(history.filters(), FilterSet::NEW_ONLY);
//! # Ok::<(), snapscope::Error>(())
//! ```

use tracing::debug;

use crate::{
    filter::{self, FilterSet, FilterSummary, RootPredicate},
    snapshot::CrawledSnapshot,
};

/// The current capture, the capture before it, and the active filter selection.
#[derive(Debug, Default)]
pub struct SnapshotHistory {
    current: Option<CrawledSnapshot>,
    baseline: Option<CrawledSnapshot>,
    filters: FilterSet,
}

impl SnapshotHistory {
    /// Creates an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a new capture.
    ///
    /// The previous `current` becomes the baseline and the old baseline is dropped. The new
    /// capture starts unfiltered and the filter selection is reset.
    pub fn push(&mut self, snapshot: CrawledSnapshot) {
        if let Some(mut previous) = self.current.take() {
            filter::clear_filter(&mut previous);
            self.baseline = Some(previous);
        }
        debug!("New capture with {} nodes", snapshot.len());
        self.current = Some(snapshot);
        self.filters = FilterSet::empty();
    }

    /// The most recent capture.
    #[must_use]
    pub fn current(&self) -> Option<&CrawledSnapshot> {
        self.current.as_ref()
    }

    /// The capture before the most recent one.
    #[must_use]
    pub fn baseline(&self) -> Option<&CrawledSnapshot> {
        self.baseline.as_ref()
    }

    /// The filter selection last applied to `current`.
    #[must_use]
    pub fn filters(&self) -> FilterSet {
        self.filters
    }

    /// Returns `true` if a baseline exists for [`FilterSet::NEW_ONLY`] to compare against.
    #[must_use]
    pub fn can_diff(&self) -> bool {
        self.baseline.is_some()
    }

    /// Replaces the filter selection and reapplies it to `current`.
    ///
    /// Returns `None` if there is no capture yet.
    pub fn apply_filter<R>(&mut self, filters: FilterSet, roots: &R) -> Option<FilterSummary>
    where
        R: RootPredicate + ?Sized,
    {
        self.filters = filters;
        let current = self.current.as_mut()?;
        Some(filter::apply_filter(
            current,
            filters,
            self.baseline.as_ref(),
            roots,
        ))
    }

    /// Adds `filter` to the active selection and reapplies it.
    pub fn add_filter<R>(&mut self, filter: FilterSet, roots: &R) -> Option<FilterSummary>
    where
        R: RootPredicate + ?Sized,
    {
        self.apply_filter(self.filters | filter, roots)
    }

    /// Drops the filter selection and makes every node of `current` visible.
    pub fn clear_filter(&mut self) {
        self.filters = FilterSet::empty();
        if let Some(current) = self.current.as_mut() {
            filter::clear_filter(current);
        }
    }
}
