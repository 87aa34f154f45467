//! Scan graph record model.
//!
//! A BDIO scan graph is a flat JSON-LD `@graph` array. Nodes that carry a
//! `bdio#hasParentId` predicate form a forest (the *rooted* records); the
//! remaining nodes describe the project itself (the *unrooted* records).
//!
//! Records keep their original JSON object verbatim so that every attribute
//! the core does not interpret is written back unchanged.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{Result, SplitError};

/// Parent reference predicate of a scan node.
pub const HAS_PARENT_ID: &str = "https://blackducksoftware.github.io/bdio#hasParentId";

/// Name predicate (headers and project records).
pub const HAS_NAME: &str = "https://blackducksoftware.github.io/bdio#hasName";

/// Version predicate (project records).
pub const HAS_VERSION: &str = "https://blackducksoftware.github.io/bdio#hasVersion";

/// File size predicate of file content nodes.
pub const HAS_BYTE_COUNT: &str = "https://blackducksoftware.github.io/bdio#hasByteCount";

/// Type tag of the canonical project record.
pub const TYPE_PROJECT: &str = "https://blackducksoftware.github.io/bdio#Project";

/// Identity marker preceding the numeric part of a rooted node's `@id`.
pub const SCAN_NODE_PREFIX: &str = "scanNode-";

/// Raw value of the root sentinel in `hasParentId`.
pub const ROOT_SENTINEL: i64 = -1;

/// Parent reference of a rooted record.
///
/// Ordering puts [`ParentRef::Root`] before every node reference, matching a
/// numeric sort on the raw value where the sentinel is `-1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParentRef {
    /// No parent: the record sits at the top of its tree
    Root,
    /// Numeric identity of the parent scan node
    Node(u64),
}

impl ParentRef {
    /// Interpret a raw `hasParentId` value. Any negative value is the sentinel.
    pub fn from_raw(raw: i64) -> Self {
        if raw < 0 {
            Self::Root
        } else {
            Self::Node(raw as u64)
        }
    }

    /// The raw value as written in the graph.
    pub fn to_raw(self) -> i64 {
        match self {
            Self::Root => ROOT_SENTINEL,
            Self::Node(id) => id as i64,
        }
    }

    /// The referenced identity, or `None` for the sentinel.
    pub fn node(self) -> Option<u64> {
        match self {
            Self::Root => None,
            Self::Node(id) => Some(id),
        }
    }
}

impl fmt::Display for ParentRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => write!(f, "root"),
            Self::Node(id) => write!(f, "{}{}", SCAN_NODE_PREFIX, id),
        }
    }
}

/// Extract the numeric identity from a node `@id` such as `_:scanNode-42`.
pub fn parse_scan_node_id(id: &str) -> Option<u64> {
    let start = id.find(SCAN_NODE_PREFIX)? + SCAN_NODE_PREFIX.len();
    id[start..].parse().ok()
}

/// Return the first `@value` of a JSON-LD predicate.
///
/// Accepts the expanded form `[{"@value": x}]`, a bare `{"@value": x}` and a
/// plain scalar.
pub fn first_value<'a>(node: &'a Value, predicate: &str) -> Option<&'a Value> {
    let raw = node.get(predicate)?;
    let first = match raw {
        Value::Array(items) => items.first()?,
        other => other,
    };
    match first {
        Value::Object(map) => map.get("@value"),
        Value::Null => None,
        scalar => Some(scalar),
    }
}

/// Overwrite the first `@value` of a predicate, creating it when absent.
pub fn set_first_value(node: &mut Value, predicate: &str, value: Value) {
    let Some(map) = node.as_object_mut() else {
        return;
    };
    let slot = map
        .entry(predicate.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));

    match slot {
        Value::Array(items) if items.is_empty() => {
            items.push(serde_json::json!({ "@value": value }));
        }
        Value::Array(items) => match &mut items[0] {
            Value::Object(inner) => {
                inner.insert("@value".to_string(), value);
            }
            other => *other = value,
        },
        Value::Object(inner) => {
            inner.insert("@value".to_string(), value);
        }
        other => *other = serde_json::json!([{ "@value": value }]),
    }
}

fn value_as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// A single scan graph node.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: String,
    node_id: Option<u64>,
    parent: Option<ParentRef>,
    payload_size: u64,
    value: Value,
}

impl Record {
    /// Build a record from a raw `@graph` entry.
    ///
    /// A node is rooted when it carries a non-empty `hasParentId`. Rooted
    /// nodes must have a `scanNode-<n>` identity and an integer parent value.
    pub fn from_value(value: Value) -> Result<Self> {
        if !value.is_object() {
            return Err(SplitError::malformed(
                value.to_string(),
                "graph entry is not a JSON object",
            ));
        }

        let id = value
            .get("@id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let has_parent = match value.get(HAS_PARENT_ID) {
            None | Some(Value::Null) => false,
            Some(Value::Array(items)) => !items.is_empty(),
            Some(_) => true,
        };

        let parent = if has_parent {
            let raw = first_value(&value, HAS_PARENT_ID)
                .and_then(value_as_i64)
                .ok_or_else(|| SplitError::malformed(&id, "parent reference is not an integer"))?;
            Some(ParentRef::from_raw(raw))
        } else {
            None
        };

        let node_id = parse_scan_node_id(&id);
        if parent.is_some() && node_id.is_none() {
            return Err(SplitError::malformed(
                &id,
                format!("rooted node identity lacks a '{}<n>' suffix", SCAN_NODE_PREFIX),
            ));
        }

        let payload_size = first_value(&value, HAS_BYTE_COUNT)
            .and_then(value_as_i64)
            .map(|n| n.max(0) as u64)
            .unwrap_or(0);

        Ok(Self {
            id,
            node_id,
            parent,
            payload_size,
            value,
        })
    }

    /// Raw `@id` string.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Numeric scan node identity, always present for rooted records.
    pub fn node_id(&self) -> Option<u64> {
        self.node_id
    }

    /// Parent reference, `None` for unrooted records.
    pub fn parent(&self) -> Option<ParentRef> {
        self.parent
    }

    pub fn is_rooted(&self) -> bool {
        self.parent.is_some()
    }

    /// Payload size in bytes (0 when the node is not file content).
    pub fn payload_size(&self) -> u64 {
        self.payload_size
    }

    /// The original JSON object.
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// The full record collection of a scan graph, split into rooted and
/// unrooted subsets. Both keep load order.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    rooted: Vec<Arc<Record>>,
    unrooted: Vec<Arc<Record>>,
}

impl Collection {
    /// Parse raw `@graph` entries into a collection.
    pub fn from_graph(nodes: impl IntoIterator<Item = Value>) -> Result<Self> {
        let records = nodes
            .into_iter()
            .map(Record::from_value)
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: impl IntoIterator<Item = Record>) -> Self {
        let mut collection = Self::default();
        for record in records {
            if record.is_rooted() {
                collection.rooted.push(Arc::new(record));
            } else {
                collection.unrooted.push(Arc::new(record));
            }
        }
        collection
    }

    /// Records carrying a parent reference, in load order.
    pub fn rooted(&self) -> &[Arc<Record>] {
        &self.rooted
    }

    /// Project-level records, in load order.
    pub fn unrooted(&self) -> &[Arc<Record>] {
        &self.unrooted
    }

    /// The project record copied into every output page.
    pub fn project_record(&self) -> Option<&Arc<Record>> {
        self.unrooted.first()
    }

    pub fn len(&self) -> usize {
        self.rooted.len() + self.unrooted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooted.is_empty() && self.unrooted.is_empty()
    }
}
