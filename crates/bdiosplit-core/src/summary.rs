//! Statistics over a loaded collection.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::error::Result;
use crate::index::RecordIndex;
use crate::record::{Collection, ParentRef};

/// Shape of a scan graph, as reported by `bdiosplit inspect`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectionSummary {
    pub rooted_records: usize,
    pub unrooted_records: usize,
    /// Rooted records whose parent is the root sentinel
    pub root_level_records: usize,
    /// Sum of `hasByteCount` over rooted records
    pub total_payload_bytes: u64,
    /// Longest ancestor chain (root-level records have depth 0)
    pub max_depth: usize,
    /// Distinct parent references absent from the collection
    pub dangling_references: usize,
}

impl CollectionSummary {
    /// Summarize a collection. Fails on duplicate identities.
    pub fn compute(collection: &Collection) -> Result<Self> {
        let index = RecordIndex::build(collection.rooted())?;

        let mut depths: HashMap<u64, usize> = HashMap::with_capacity(index.len());
        let mut dangling: HashSet<u64> = HashSet::new();
        let mut summary = Self {
            rooted_records: collection.rooted().len(),
            unrooted_records: collection.unrooted().len(),
            ..Default::default()
        };

        for record in collection.rooted() {
            summary.total_payload_bytes += record.payload_size();
            if record.parent() == Some(ParentRef::Root) {
                summary.root_level_records += 1;
            }
            if let Some(id) = record.node_id() {
                let depth = depth_of(id, &index, &mut depths, &mut dangling);
                summary.max_depth = summary.max_depth.max(depth);
            }
        }

        summary.dangling_references = dangling.len();
        Ok(summary)
    }
}

/// Memoized ancestor depth. A chain ending at an unknown identity, or looping
/// back on itself, stops there.
fn depth_of(
    id: u64,
    index: &RecordIndex,
    depths: &mut HashMap<u64, usize>,
    dangling: &mut HashSet<u64>,
) -> usize {
    let mut chain = Vec::new();
    let mut seen = HashSet::new();
    let mut current = id;

    let base = loop {
        if let Some(&known) = depths.get(&current) {
            break known + 1;
        }
        if !seen.insert(current) {
            break 0;
        }
        chain.push(current);
        match index.resolve_parent(current) {
            Ok(ParentRef::Node(parent)) if index.contains(parent) => current = parent,
            Ok(ParentRef::Node(parent)) => {
                dangling.insert(parent);
                break 0;
            }
            Ok(ParentRef::Root) | Err(_) => break 0,
        }
    };

    // chain[last] sits at depth `base`, its children one deeper, and so on
    let mut depth = base;
    for node in chain.iter().rev() {
        depths.insert(*node, depth);
        depth += 1;
    }
    depths.get(&id).copied().unwrap_or(0)
}
