//! Window selection over the rooted records.
//!
//! # Design
//!
//! Two windowing strategies are supported:
//!
//! - **Count-bounded** (default): records are sorted by parent reference so
//!   siblings land together, then cut into fixed-size windows. The first
//!   window has its own size (`first_window`); every later window holds
//!   `partition_limit` records. Each window is later closed over its
//!   ancestors by [`crate::closure::ClosureResolver`].
//! - **Size-bounded**: records stay in load order and a window is cut when
//!   the next record would push either the node count or the cumulative
//!   payload size past its maximum. No ancestor closure is performed; a single
//!   base record is prepended to every window after the first instead.

use std::ops::Range;
use std::sync::Arc;

use crate::error::{Result, SplitError};
use crate::record::Record;

/// Which windowing policy to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Strategy {
    /// Parent-sorted fixed-count windows with ancestor closure
    #[default]
    Count,
    /// Load-order windows bounded by node count and payload bytes
    Size,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Count => "count",
            Strategy::Size => "size",
        }
    }
}

/// Limits of the count-bounded strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountLimits {
    /// Maximum records per output page
    pub page_limit: usize,
    /// Records per window after the first
    pub partition_limit: usize,
    /// Records in the first window
    pub first_window: usize,
}

impl CountLimits {
    /// Validate limits. `first_window` defaults to twice the page limit.
    pub fn new(
        page_limit: usize,
        partition_limit: usize,
        first_window: Option<usize>,
    ) -> Result<Self> {
        if page_limit == 0 {
            return Err(SplitError::invalid_limit(
                "max_page_nodes",
                "must be greater than zero",
            ));
        }
        if partition_limit == 0 {
            return Err(SplitError::invalid_limit(
                "max_partition_nodes",
                "must be greater than zero",
            ));
        }
        let first_window = first_window.unwrap_or(page_limit.saturating_mul(2));
        if first_window == 0 {
            return Err(SplitError::invalid_limit(
                "first_window_nodes",
                "must be greater than zero",
            ));
        }
        Ok(Self {
            page_limit,
            partition_limit,
            first_window,
        })
    }
}

/// Limits of the size-bounded strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeLimits {
    /// Maximum records per window
    pub max_nodes: usize,
    /// Maximum cumulative payload bytes per window (unbounded when `None`)
    pub max_bytes: Option<u64>,
}

impl SizeLimits {
    pub fn new(max_nodes: usize, max_bytes: Option<u64>) -> Result<Self> {
        if max_nodes == 0 {
            return Err(SplitError::invalid_limit(
                "max_partition_nodes",
                "must be greater than zero",
            ));
        }
        if max_bytes == Some(0) {
            return Err(SplitError::invalid_limit(
                "max_partition_bytes",
                "must be greater than zero",
            ));
        }
        Ok(Self {
            max_nodes,
            max_bytes,
        })
    }
}

/// Stable sort of rooted records by parent reference (root sentinel first).
pub fn sort_by_parent(rooted: &[Arc<Record>]) -> Vec<Arc<Record>> {
    let mut sorted = rooted.to_vec();
    sorted.sort_by_key(|record| record.parent());
    sorted
}

/// Window ranges of the count-bounded strategy.
///
/// window₀ = `[0, first_window)`,
/// windowₖ = `[(k-1)·partition_limit + first_window, k·partition_limit + first_window)`.
/// Stops at the first empty window.
#[derive(Debug, Clone)]
pub struct CountWindows {
    len: usize,
    limits: CountLimits,
    next: usize,
}

impl CountWindows {
    pub fn new(len: usize, limits: CountLimits) -> Self {
        Self {
            len,
            limits,
            next: 0,
        }
    }
}

impl Iterator for CountWindows {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let CountLimits {
            partition_limit,
            first_window,
            ..
        } = self.limits;

        let (start, end) = if self.next == 0 {
            (0, first_window)
        } else {
            let k = self.next;
            (
                (k - 1).saturating_mul(partition_limit).saturating_add(first_window),
                k.saturating_mul(partition_limit).saturating_add(first_window),
            )
        };

        let end = end.min(self.len);
        if start >= end {
            return None;
        }
        self.next += 1;
        Some(start..end)
    }
}

/// Window ranges of the size-bounded strategy over records in load order.
#[derive(Debug, Clone)]
pub struct SizeWindows<'a> {
    records: &'a [Arc<Record>],
    limits: SizeLimits,
    pos: usize,
}

impl<'a> SizeWindows<'a> {
    pub fn new(records: &'a [Arc<Record>], limits: SizeLimits) -> Self {
        Self {
            records,
            limits,
            pos: 0,
        }
    }
}

impl Iterator for SizeWindows<'_> {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.records.len() {
            return None;
        }

        let start = self.pos;
        let mut bytes: u64 = 0;
        let mut end = start;

        while end < self.records.len() {
            let size = self.records[end].payload_size();
            let count = end - start;
            let over_nodes = count + 1 > self.limits.max_nodes;
            let over_bytes = self
                .limits
                .max_bytes
                .is_some_and(|max| bytes.saturating_add(size) > max);

            // A window always takes at least one record
            if count > 0 && (over_nodes || over_bytes) {
                break;
            }
            bytes = bytes.saturating_add(size);
            end += 1;
        }

        self.pos = end;
        Some(start..end)
    }
}
