//! Ancestor closure of candidate windows.
//!
//! A window cut from the parent-sorted record list usually references
//! parents that landed in a different window. Closing the window appends
//! every missing parent together with its whole ancestor chain, so the
//! resulting partition resolves every parent reference internally.
//!
//! Backfill order for a window:
//! 1. for each missing parent (ascending identity), its ancestors from the
//!    nearest upwards, skipping identities already queued;
//! 2. the missing parents themselves, ascending.
//!
//! Ancestors are not checked against the records already in the window, so a
//! record can appear twice in a closed partition.

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use tracing::trace;

use crate::error::{Result, SplitError};
use crate::index::RecordIndex;
use crate::record::{ParentRef, Record};

/// Parent references of `records` that resolve neither to the root sentinel
/// nor to a record in the same set.
pub fn missing_parents<'r>(records: impl IntoIterator<Item = &'r Record> + Clone) -> BTreeSet<u64> {
    let present: HashSet<u64> = records
        .clone()
        .into_iter()
        .filter_map(Record::node_id)
        .collect();

    records
        .into_iter()
        .filter_map(|record| record.parent().and_then(ParentRef::node))
        .filter(|parent| !present.contains(parent))
        .collect()
}

/// A window after ancestor backfill.
#[derive(Debug, Clone)]
pub struct ClosedWindow {
    /// Window records followed by the backfilled records
    pub records: Vec<Arc<Record>>,
    /// Number of records in the original window
    pub window_len: usize,
    /// Identities appended by backfill, in append order
    pub backfill: Vec<u64>,
}

impl ClosedWindow {
    pub fn backfilled(&self) -> usize {
        self.backfill.len()
    }
}

/// Closes candidate windows using a shared [`RecordIndex`].
#[derive(Debug, Clone, Copy)]
pub struct ClosureResolver<'a> {
    index: &'a RecordIndex,
}

impl<'a> ClosureResolver<'a> {
    pub fn new(index: &'a RecordIndex) -> Self {
        Self { index }
    }

    /// Compute the backfill list for a set of missing parents.
    ///
    /// Fails with [`SplitError::NotFound`] when a chain reaches an identity
    /// that is absent from the whole collection.
    pub fn backfill_chain(&self, missing: &BTreeSet<u64>) -> Result<Vec<u64>> {
        let mut backfill: Vec<u64> = Vec::new();
        let mut queued: HashSet<u64> = HashSet::new();

        for &id in missing {
            let mut steps = 0usize;
            let mut current = self.index.resolve_parent(id)?;

            while let ParentRef::Node(ancestor) = current {
                steps += 1;
                if steps > self.index.len() {
                    return Err(SplitError::malformed(
                        format!("scanNode-{}", id),
                        "parent references form a cycle",
                    ));
                }
                if queued.insert(ancestor) {
                    backfill.push(ancestor);
                }
                current = self.index.resolve_parent(ancestor)?;
            }
        }

        backfill.extend(missing.iter().copied());
        Ok(backfill)
    }

    /// Close a window over its ancestors.
    pub fn close(&self, window: Vec<Arc<Record>>) -> Result<ClosedWindow> {
        let window_len = window.len();
        let missing = missing_parents(window.iter().map(Arc::as_ref));
        trace!("Window of {} records misses {:?}", window_len, missing);

        let backfill = self.backfill_chain(&missing)?;

        let mut records = window;
        records.reserve(backfill.len());
        for &id in &backfill {
            records.push(Arc::clone(self.index.get(id)?));
        }

        Ok(ClosedWindow {
            records,
            window_len,
            backfill,
        })
    }
}
