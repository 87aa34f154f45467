//! Read-back verification of written partitions.
//!
//! Checks what a downstream consumer relies on when it loads a single
//! partition in isolation: every parent reference resolves inside the
//! partition, pages respect the page limit, and each page is tied to the
//! header by `@id`/`@type` and starts with the project record.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;
use walkdir::WalkDir;

use crate::closure::missing_parents;
use crate::error::{Result, SplitError};
use crate::loader::read_json;
use crate::record::Record;
use crate::writer::OutputLayout;

/// Findings for one partition directory.
#[derive(Debug, Clone, Default)]
pub struct VerifyReport {
    pub dir: PathBuf,
    pub pages: usize,
    /// Rooted records across all pages, duplicates included
    pub records: usize,
    /// Parent references that resolve nowhere in the partition
    pub dangling: BTreeSet<u64>,
    /// Pages holding more records than the page limit
    pub oversize_pages: Vec<String>,
    /// Pages whose `@id` or `@type` differ from the header
    pub mismatched_pages: Vec<String>,
    /// Pages that do not start with an unrooted project record
    pub pages_without_project: Vec<String>,
}

impl VerifyReport {
    pub fn is_valid(&self) -> bool {
        self.pages > 0
            && self.dangling.is_empty()
            && self.oversize_pages.is_empty()
            && self.mismatched_pages.is_empty()
            && self.pages_without_project.is_empty()
    }

    /// Human readable list of problems.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.pages == 0 {
            problems.push("no entry documents".to_string());
        }
        for id in &self.dangling {
            problems.push(format!("dangling parent reference scanNode-{}", id));
        }
        for page in &self.oversize_pages {
            problems.push(format!("{} exceeds the page limit", page));
        }
        for page in &self.mismatched_pages {
            problems.push(format!("{} does not match the header @id/@type", page));
        }
        for page in &self.pages_without_project {
            problems.push(format!("{} does not start with the project record", page));
        }
        problems
    }
}

fn entry_files(dir: &Path, layout: &OutputLayout) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if entry.file_type().is_file()
            && layout.is_entry_file_name(&entry.file_name().to_string_lossy())
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

/// Verify one partition directory.
pub fn verify_partition_dir(
    dir: &Path,
    layout: &OutputLayout,
    page_limit: Option<usize>,
) -> Result<VerifyReport> {
    if !dir.is_dir() {
        return Err(SplitError::InputNotFound(dir.to_path_buf()));
    }

    let header = read_json(&dir.join(&layout.header_file))?;
    let mut report = VerifyReport {
        dir: dir.to_path_buf(),
        ..Default::default()
    };
    let mut records: Vec<Record> = Vec::new();

    for path in entry_files(dir, layout)? {
        let page_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut page = read_json(&path)?;
        report.pages += 1;

        if page.get("@id") != header.get("@id") || page.get("@type") != header.get("@type") {
            report.mismatched_pages.push(page_name.clone());
        }

        let graph = match page.get_mut("@graph").map(Value::take) {
            Some(Value::Array(graph)) => graph,
            _ => Vec::new(),
        };

        let mut entries = graph.into_iter();
        match entries.next().map(Record::from_value).transpose()? {
            Some(first) if !first.is_rooted() => {}
            _ => report.pages_without_project.push(page_name.clone()),
        }

        let before = records.len();
        for value in entries {
            let record = Record::from_value(value)?;
            if record.is_rooted() {
                records.push(record);
            }
        }
        let on_page = records.len() - before;
        if page_limit.is_some_and(|limit| on_page > limit) {
            report.oversize_pages.push(page_name);
        }
    }

    report.records = records.len();
    report.dangling = missing_parents(records.iter());
    debug!(
        "Verified {:?}: {} pages, {} records, {} dangling",
        dir,
        report.pages,
        report.records,
        report.dangling.len()
    );
    Ok(report)
}

/// Verify every partition directory (`*_partNN`) under `output_dir`.
pub fn verify_output_dir(
    output_dir: &Path,
    layout: &OutputLayout,
    page_limit: Option<usize>,
) -> Result<Vec<VerifyReport>> {
    if !output_dir.is_dir() {
        return Err(SplitError::InputNotFound(output_dir.to_path_buf()));
    }

    let mut reports = Vec::new();
    for entry in WalkDir::new(output_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy();
        if entry.file_type().is_dir() && name.contains("_part") {
            reports.push(verify_partition_dir(entry.path(), layout, page_limit)?);
        }
    }
    Ok(reports)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::HAS_PARENT_ID;
    use crate::writer::write_json_file;
    use serde_json::json;
    use tempfile::TempDir;

    fn node(id: u64, parent: i64) -> Value {
        json!({ "@id": format!("_:scanNode-{}", id), HAS_PARENT_ID: [{ "@value": parent }] })
    }

    fn write_partition(dir: &Path, pages: &[Vec<Value>]) {
        std::fs::create_dir_all(dir).unwrap();
        write_json_file(
            &dir.join("bdio-header.jsonld"),
            &json!({ "@id": "urn:uuid:h", "@type": "t" }),
        )
        .unwrap();
        for (n, records) in pages.iter().enumerate() {
            let mut graph = vec![json!({ "@id": "urn:uuid:project" })];
            graph.extend(records.iter().cloned());
            write_json_file(
                &dir.join(format!("bdio-entry-{:02}.jsonld", n)),
                &json!({ "@id": "urn:uuid:h", "@type": "t", "@graph": graph }),
            )
            .unwrap();
        }
    }

    #[test]
    fn test_valid_partition() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("_part00");
        write_partition(&dir, &[vec![node(1, -1), node(2, 1)], vec![node(3, 2)]]);

        let report = verify_partition_dir(&dir, &OutputLayout::default(), Some(2)).unwrap();
        assert!(report.is_valid(), "{:?}", report.problems());
        assert_eq!(report.pages, 2);
        assert_eq!(report.records, 3);
    }

    #[test]
    fn test_dangling_reference_detected() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("_part00");
        write_partition(&dir, &[vec![node(2, 1), node(3, 2)]]);

        let report = verify_partition_dir(&dir, &OutputLayout::default(), None).unwrap();
        assert!(!report.is_valid());
        assert_eq!(report.dangling.iter().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_oversize_page_detected() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("_part00");
        write_partition(&dir, &[vec![node(1, -1), node(2, 1), node(3, 1)]]);

        let report = verify_partition_dir(&dir, &OutputLayout::default(), Some(2)).unwrap();
        assert_eq!(report.oversize_pages, vec!["bdio-entry-00.jsonld"]);
    }

    #[test]
    fn test_verify_output_dir_walks_partitions() {
        let temp = TempDir::new().unwrap();
        write_partition(&temp.path().join("_part00"), &[vec![node(1, -1)]]);
        write_partition(&temp.path().join("_part01"), &[vec![node(2, -1)]]);
        std::fs::create_dir_all(temp.path().join("unrelated")).unwrap();

        let reports = verify_output_dir(temp.path(), &OutputLayout::default(), None).unwrap();
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(VerifyReport::is_valid));
    }
}
