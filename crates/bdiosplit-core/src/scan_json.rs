//! Splitter for legacy single-file scan JSON documents.
//!
//! Older signature scanners emit one JSON document with a flat
//! `scanNodeList`. This format has no ancestor closure: every chunk after the
//! first starts with the first scan node (the scan base directory) instead.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::info;

use crate::error::{Result, SplitError};
use crate::loader::read_json;

/// Default number of scan nodes per output document.
pub const DEFAULT_SCAN_SPLIT_STEP: usize = 200_000;

const SCAN_NODE_LIST: &str = "scanNodeList";
const SCAN_PROBLEM_LIST: &str = "scanProblemList";

/// Splits `scanNodeList` documents into fixed-size chunks.
#[derive(Debug, Clone, Copy)]
pub struct ScanJsonSplitter {
    step: usize,
}

impl Default for ScanJsonSplitter {
    fn default() -> Self {
        Self {
            step: DEFAULT_SCAN_SPLIT_STEP,
        }
    }
}

impl ScanJsonSplitter {
    pub fn new(step: usize) -> Result<Self> {
        if step == 0 {
            return Err(SplitError::invalid_limit("step", "must be greater than zero"));
        }
        Ok(Self { step })
    }

    /// Split a parsed document into `(offset, chunk)` pairs.
    ///
    /// Each chunk keeps every top-level field of the source, with `project`
    /// suffixed `-more`, `name` suffixed `-<offset>`, an empty
    /// `scanProblemList`, and the chunk's scan nodes.
    pub fn split_document(&self, mut doc: Value) -> Result<Vec<(usize, Value)>> {
        let Some(map) = doc.as_object_mut() else {
            return Err(SplitError::malformed("<document>", "scan document is not an object"));
        };

        let nodes = match map.remove(SCAN_NODE_LIST) {
            Some(Value::Array(nodes)) => nodes,
            _ => {
                return Err(SplitError::malformed(
                    "<document>",
                    "scanNodeList is missing or not an array",
                ))
            }
        };

        if let Some(Value::String(project)) = map.get_mut("project") {
            project.push_str("-more");
        }
        map.insert(SCAN_PROBLEM_LIST.to_string(), Value::Array(Vec::new()));
        let scan_name = map
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let Some(base) = nodes.first().cloned() else {
            return Ok(Vec::new());
        };

        let mut chunks = Vec::new();
        for (n, window) in nodes.chunks(self.step).enumerate() {
            let offset = n * self.step;
            let mut list = Vec::with_capacity(window.len() + 1);
            if offset > 0 {
                list.push(base.clone());
            }
            list.extend(window.iter().cloned());

            let mut chunk = map.clone();
            chunk.insert(
                "name".to_string(),
                Value::String(format!("{}-{}", scan_name, offset)),
            );
            chunk.insert(SCAN_NODE_LIST.to_string(), Value::Array(list));
            chunks.push((offset, Value::Object(chunk)));
        }
        Ok(chunks)
    }

    /// Split `path`, writing `<path>-<offset>.json` next to it.
    pub fn split_file(&self, path: &Path) -> Result<Vec<PathBuf>> {
        let doc = read_json(path)?;
        let chunks = self.split_document(doc)?;

        let mut written = Vec::with_capacity(chunks.len());
        for (offset, chunk) in chunks {
            let mut target = path.as_os_str().to_owned();
            target.push(format!("-{}.json", offset));
            let target = PathBuf::from(target);

            let file = File::create(&target).map_err(|e| SplitError::write(&target, e))?;
            let mut out = BufWriter::new(file);
            serde_json::to_writer(&mut out, &chunk).map_err(|source| SplitError::Serialize {
                path: target.clone(),
                source,
            })?;
            out.flush().map_err(|e| SplitError::write(&target, e))?;
            written.push(target);
        }

        info!("Split {:?} into {} documents", path, written.len());
        Ok(written)
    }
}
