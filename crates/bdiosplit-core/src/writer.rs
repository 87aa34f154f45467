//! Partition output.
//!
//! Each partition becomes a directory holding one header document and one or
//! more entry (page) documents:
//!
//! ```text
//! <output>/_part00/
//! |- bdio-header.jsonld
//! |- bdio-entry-00.jsonld
//! |- bdio-entry-01.jsonld
//! ```
//!
//! Entry documents carry the header's `@id` and `@type`, and their `@graph`
//! starts with a copy of the project record.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;
use walkdir::WalkDir;

use crate::error::{Result, SplitError};
use crate::loader::DEFAULT_HEADER_FILE;
use crate::partition::Partition;
use crate::record::{first_value, set_first_value, HAS_NAME, HAS_VERSION, TYPE_PROJECT};

/// File name prefix of entry documents.
pub const DEFAULT_ENTRY_PREFIX: &str = "bdio-entry-";

/// Substring of the header name in front of which the partition label goes.
pub const DEFAULT_NAME_MARKER: &str = " signature";

/// File names and header naming used for output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    pub header_file: String,
    pub entry_prefix: String,
    pub name_marker: String,
}

impl Default for OutputLayout {
    fn default() -> Self {
        Self {
            header_file: DEFAULT_HEADER_FILE.to_string(),
            entry_prefix: DEFAULT_ENTRY_PREFIX.to_string(),
            name_marker: DEFAULT_NAME_MARKER.to_string(),
        }
    }
}

impl OutputLayout {
    /// File name of entry document `number`.
    pub fn entry_file_name(&self, number: usize) -> String {
        format!("{}{:02}.jsonld", self.entry_prefix, number)
    }

    /// Whether `name` looks like an entry document of this layout.
    pub fn is_entry_file_name(&self, name: &str) -> bool {
        name.starts_with(&self.entry_prefix) && name.ends_with(".jsonld")
    }
}

/// Remove entry documents left in `dir` by an earlier run.
///
/// Returns the number of files removed.
pub fn remove_stale_entries(dir: &Path, layout: &OutputLayout) -> Result<usize> {
    let mut removed = 0;
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if entry.file_type().is_file()
            && layout.is_entry_file_name(&entry.file_name().to_string_lossy())
        {
            let path = entry.path();
            std::fs::remove_file(path).map_err(|e| SplitError::write(path, e))?;
            removed += 1;
        }
    }
    Ok(removed)
}

/// Optional project name/version replacements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectOverrides {
    pub name: Option<String>,
    pub version: Option<String>,
}

impl ProjectOverrides {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.version.is_none()
    }
}

/// Rewrite the project record's name and version.
///
/// Records typed exactly `bdio#Project` are left untouched. Returns whether
/// anything was rewritten.
pub fn apply_project_overrides(project: &mut Value, overrides: &ProjectOverrides) -> bool {
    if project.get("@type").and_then(Value::as_str) == Some(TYPE_PROJECT) {
        return false;
    }

    let mut changed = false;
    if let Some(name) = &overrides.name {
        set_first_value(project, HAS_NAME, Value::String(name.clone()));
        changed = true;
    }
    if let Some(version) = &overrides.version {
        set_first_value(project, HAS_VERSION, Value::String(version.clone()));
        changed = true;
    }
    changed
}

/// Give a header copy a new identity and a partition-qualified name.
///
/// The label is spliced in front of `marker`; when the marker is missing it
/// is appended to the name.
pub fn rename_header(header: &mut Value, label: &str, header_id: &str, marker: &str) {
    if let Some(map) = header.as_object_mut() {
        map.insert("@id".to_string(), Value::String(header_id.to_string()));
    }

    let Some(name) = first_value(header, HAS_NAME)
        .and_then(Value::as_str)
        .map(str::to_string)
    else {
        warn!("Header has no name, leaving it unlabelled");
        return;
    };

    let renamed = match name.find(marker) {
        Some(pos) if !marker.is_empty() => format!("{}{}{}", &name[..pos], label, &name[pos..]),
        _ => {
            warn!(
                "Header name {:?} has no {:?} marker, appending label",
                name, marker
            );
            format!("{}{}", name, label)
        }
    };
    set_first_value(header, HAS_NAME, Value::String(renamed));
}

/// Write a JSON value with one-space indentation.
pub fn write_json_file(path: &Path, value: &Value) -> Result<()> {
    let file = File::create(path).map_err(|e| SplitError::write(path, e))?;
    let mut writer = BufWriter::new(file);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    value
        .serialize(&mut serializer)
        .map_err(|source| SplitError::Serialize {
            path: path.to_path_buf(),
            source,
        })?;
    writer.flush().map_err(|e| SplitError::write(path, e))
}

/// Result of writing one partition.
#[derive(Debug, Clone)]
pub struct WrittenPartition {
    pub dir: PathBuf,
    pub header_id: String,
    pub pages: usize,
}

/// Serializes closed partitions.
#[derive(Debug, Clone)]
pub struct PartitionWriter {
    output_dir: PathBuf,
    page_limit: usize,
    layout: OutputLayout,
    header: Value,
    project: Value,
}

impl PartitionWriter {
    /// Create a writer. Overrides are applied to the project copy once here.
    pub fn new(
        output_dir: impl Into<PathBuf>,
        page_limit: usize,
        layout: OutputLayout,
        header: Value,
        project: Value,
        overrides: &ProjectOverrides,
    ) -> Self {
        let mut project = project;
        if !overrides.is_empty() && !apply_project_overrides(&mut project, overrides) {
            debug!("Project record is typed bdio#Project, overrides not applied");
        }
        Self {
            output_dir: output_dir.into(),
            page_limit: page_limit.max(1),
            layout,
            header,
            project,
        }
    }

    /// Write a partition's header and pages under `<output>/<label>/`.
    pub fn write(&self, partition: &Partition) -> Result<WrittenPartition> {
        let dir = self.output_dir.join(&partition.label);
        std::fs::create_dir_all(&dir).map_err(|e| SplitError::write(&dir, e))?;
        let stale = remove_stale_entries(&dir, &self.layout)?;
        if stale > 0 {
            debug!("Removed {} stale entry files from {}", stale, dir.display());
        }

        let header_id = Uuid::new_v4().urn().to_string();
        let mut header = self.header.clone();
        rename_header(
            &mut header,
            &partition.label,
            &header_id,
            &self.layout.name_marker,
        );
        write_json_file(&dir.join(&self.layout.header_file), &header)?;

        let header_type = header.get("@type").cloned().unwrap_or(Value::Null);
        let mut pages = 0;
        for (number, slice) in partition.pages(self.page_limit).enumerate() {
            let mut graph = Vec::with_capacity(slice.len() + 1);
            graph.push(self.project.clone());
            graph.extend(slice.iter().map(|record| record.value().clone()));

            let mut entry = Map::with_capacity(3);
            entry.insert("@id".to_string(), Value::String(header_id.clone()));
            entry.insert("@type".to_string(), header_type.clone());
            entry.insert("@graph".to_string(), Value::Array(graph));
            let entry = Value::Object(entry);
            write_json_file(&dir.join(self.layout.entry_file_name(number)), &entry)?;
            pages += 1;
        }

        debug!(
            "Wrote {} ({} records, {} pages)",
            partition.label,
            partition.len(),
            pages
        );

        Ok(WrittenPartition {
            dir,
            header_id,
            pages,
        })
    }
}
