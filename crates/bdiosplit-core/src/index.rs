//! Identity lookup over the rooted records of a scan graph.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Result, SplitError};
use crate::record::{ParentRef, Record};

/// Read-only identity → record and identity → parent maps.
///
/// Built once per run. Ancestor walks resolve one step per hash lookup.
#[derive(Debug, Default)]
pub struct RecordIndex {
    records: HashMap<u64, Arc<Record>>,
    parents: HashMap<u64, ParentRef>,
}

impl RecordIndex {
    /// Index the given rooted records.
    ///
    /// Fails with [`SplitError::DuplicateIdentity`] when two records share an
    /// identity. Records without a numeric identity or parent reference
    /// (unrooted records) are rejected as malformed.
    pub fn build(rooted: &[Arc<Record>]) -> Result<Self> {
        let mut records = HashMap::with_capacity(rooted.len());
        let mut parents = HashMap::with_capacity(rooted.len());

        for record in rooted {
            let (Some(id), Some(parent)) = (record.node_id(), record.parent()) else {
                return Err(SplitError::malformed(
                    record.id(),
                    "only rooted scan nodes can be indexed",
                ));
            };
            if records.insert(id, Arc::clone(record)).is_some() {
                return Err(SplitError::DuplicateIdentity(id));
            }
            parents.insert(id, parent);
        }

        debug!("Indexed {} rooted records", records.len());
        Ok(Self { records, parents })
    }

    /// Parent reference of `id`.
    pub fn resolve_parent(&self, id: u64) -> Result<ParentRef> {
        self.parents
            .get(&id)
            .copied()
            .ok_or(SplitError::NotFound(id))
    }

    /// Record with identity `id`.
    pub fn get(&self, id: u64) -> Result<&Arc<Record>> {
        self.records.get(&id).ok_or(SplitError::NotFound(id))
    }

    pub fn contains(&self, id: u64) -> bool {
        self.records.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
