//! Closed partitions and their labels.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::record::Record;

static UNSAFE_LABEL_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^A-Za-z0-9._-]+").expect("label sanitizer pattern is valid")
});

/// Replace runs of characters that are unsafe in directory names with `_`.
pub fn sanitize_label_part(raw: &str) -> String {
    UNSAFE_LABEL_CHARS.replace_all(raw.trim(), "_").into_owned()
}

/// Build the label of partition `index`.
///
/// `_part03`, `_1.2_part03` with a version override, and
/// `_demo_1.2_part03` with both name and version overrides.
pub fn partition_label(index: usize, name: Option<&str>, version: Option<&str>) -> String {
    let mut label = format!("_part{:02}", index);
    if let Some(version) = version {
        label = format!("_{}{}", sanitize_label_part(version), label);
    }
    if let Some(name) = name {
        label = format!("_{}{}", sanitize_label_part(name), label);
    }
    label
}

/// One independently valid output unit.
#[derive(Debug, Clone)]
pub struct Partition {
    /// Logical position in the output sequence
    pub index: usize,
    /// Directory name and header name infix
    pub label: String,
    /// Records to write, backfilled ones included
    pub records: Vec<Arc<Record>>,
    /// Number of records that came from the window itself
    pub window_len: usize,
}

impl Partition {
    pub fn new(index: usize, label: String, records: Vec<Arc<Record>>, window_len: usize) -> Self {
        Self {
            index,
            label,
            records,
            window_len,
        }
    }

    /// Records appended to the window (ancestors or the base record).
    pub fn backfilled(&self) -> usize {
        self.records.len().saturating_sub(self.window_len)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Split the records into page-sized slices.
    pub fn pages(&self, page_limit: usize) -> std::slice::Chunks<'_, Arc<Record>> {
        self.records.chunks(page_limit.max(1))
    }
}
