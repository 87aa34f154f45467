//! bdiosplit Core - Scan graph partitioning with ancestor closure
//!
//! This crate splits oversized BDIO scan graphs into partitions that a
//! downstream consumer can process one at a time:
//! - Shard loading and record model for JSON-LD `@graph` documents
//! - Identity index for O(1) ancestor resolution
//! - Count-bounded and size-bounded windowing
//! - Ancestor backfill so every partition resolves its parent references
//! - Header/entry document output and read-back verification
//! - Splitting of legacy single-file scan JSON documents

pub mod closure;
pub mod error;
pub mod index;
pub mod loader;
pub mod partition;
pub mod partitioner;
pub mod record;
pub mod scan_json;
pub mod split;
pub mod summary;
pub mod verify;
pub mod writer;

// Re-exports for convenience
pub use closure::{missing_parents, ClosedWindow, ClosureResolver};
pub use error::{ErrorKind, Result, SplitError};
pub use index::RecordIndex;
pub use loader::{GraphLoader, LoadedGraph, ShardSet, DEFAULT_HEADER_FILE};
pub use partition::{partition_label, sanitize_label_part, Partition};
pub use partitioner::{CountLimits, CountWindows, SizeLimits, SizeWindows, Strategy};
pub use record::{Collection, ParentRef, Record, ROOT_SENTINEL};
pub use scan_json::{ScanJsonSplitter, DEFAULT_SCAN_SPLIT_STEP};
pub use split::{
    PartitionPlan, PartitionSummary, SplitOptions, SplitReport, Splitter,
    DEFAULT_MAX_PAGE_NODES, DEFAULT_MAX_PARTITION_NODES,
};
pub use summary::CollectionSummary;
pub use verify::{verify_output_dir, verify_partition_dir, VerifyReport};
pub use writer::{OutputLayout, PartitionWriter, ProjectOverrides, WrittenPartition};
