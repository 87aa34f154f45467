//! Shard loading.
//!
//! An uncompressed BDIO document is a directory of JSON-LD shards: one
//! header document plus any number of entry documents. Every shard
//! contributes its `@graph` array; the concatenation (in file-name order)
//! is the record collection.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::error::{Result, SplitError};
use crate::record::Collection;

/// File name of the header shard.
pub const DEFAULT_HEADER_FILE: &str = "bdio-header.jsonld";

/// File extensions considered shard documents.
const SHARD_EXTENSIONS: &[&str] = &["jsonld", "json"];

/// Read and parse a JSON document.
pub fn read_json(path: &Path) -> Result<Value> {
    let file = File::open(path).map_err(|e| SplitError::read(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| SplitError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// The raw content of a shard directory.
#[derive(Debug, Clone)]
pub struct ShardSet {
    /// Header document without its `@graph`
    pub header: Value,
    /// Concatenated `@graph` entries of all shards
    pub graph: Vec<Value>,
    /// Number of shard files read
    pub shard_count: usize,
}

/// A loaded scan graph ready for partitioning.
#[derive(Debug, Clone)]
pub struct LoadedGraph {
    pub header: Value,
    pub collection: Collection,
    pub shard_count: usize,
}

/// Loads shard directories into a single record collection.
#[derive(Debug, Clone)]
pub struct GraphLoader {
    header_file: String,
}

impl Default for GraphLoader {
    fn default() -> Self {
        Self::new(DEFAULT_HEADER_FILE)
    }
}

impl GraphLoader {
    pub fn new(header_file: impl Into<String>) -> Self {
        Self {
            header_file: header_file.into(),
        }
    }

    /// List shard files directly under `dir`, sorted by file name.
    ///
    /// Hidden files and files without a JSON extension are skipped.
    pub fn shard_paths(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(SplitError::InputNotFound(dir.to_path_buf()));
        }

        let mut paths = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            let is_shard = !name.starts_with('.')
                && entry
                    .path()
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|ext| SHARD_EXTENSIONS.contains(&ext));
            if is_shard {
                paths.push(entry.into_path());
            } else {
                debug!("Skipping non-shard file {:?}", entry.path());
            }
        }
        Ok(paths)
    }

    /// Read every shard of `dir`.
    pub fn load_shards(&self, dir: &Path) -> Result<ShardSet> {
        let paths = self.shard_paths(dir)?;
        let mut header = None;
        let mut graph = Vec::new();

        for path in &paths {
            let mut doc = read_json(path)?;
            let entries = match doc.get_mut("@graph").map(Value::take) {
                Some(Value::Array(entries)) => entries,
                Some(Value::Null) | None => Vec::new(),
                Some(_) => {
                    return Err(SplitError::malformed(
                        path.display().to_string(),
                        "@graph is not an array",
                    ))
                }
            };
            debug!("Read {} graph entries from {:?}", entries.len(), path);
            graph.extend(entries);

            if path.file_name().and_then(|n| n.to_str()) == Some(self.header_file.as_str()) {
                if let Some(map) = doc.as_object_mut() {
                    map.remove("@graph");
                }
                header = Some(doc);
            }
        }

        let header = header.ok_or_else(|| SplitError::MissingHeader {
            dir: dir.to_path_buf(),
            file: self.header_file.clone(),
        })?;

        info!(
            "Loaded {} graph entries from {} shards in {:?}",
            graph.len(),
            paths.len(),
            dir
        );

        Ok(ShardSet {
            header,
            graph,
            shard_count: paths.len(),
        })
    }

    /// Read every shard of `dir` and build the record collection.
    pub fn load(&self, dir: &Path) -> Result<LoadedGraph> {
        let shards = self.load_shards(dir)?;
        let collection = Collection::from_graph(shards.graph)?;
        info!(
            "Collection has {} rooted and {} unrooted records",
            collection.rooted().len(),
            collection.unrooted().len()
        );
        Ok(LoadedGraph {
            header: shards.header,
            collection,
            shard_count: shards.shard_count,
        })
    }
}
