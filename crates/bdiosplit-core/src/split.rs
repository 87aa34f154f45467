//! Split pipeline: load → index → window → close → write.
//!
//! # Example
//!
//! ```no_run
//! use bdiosplit_core::split::{SplitOptions, Splitter};
//! use std::path::Path;
//!
//! let splitter = Splitter::new(SplitOptions::default()).unwrap();
//! let report = splitter
//!     .run(Path::new("scan-bdio"), Path::new("out"))
//!     .unwrap();
//! println!("{} partitions", report.partitions.len());
//! ```

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::closure::ClosureResolver;
use crate::error::{Result, SplitError};
use crate::index::RecordIndex;
use crate::loader::GraphLoader;
use crate::partition::{partition_label, Partition};
use crate::partitioner::{
    sort_by_parent, CountLimits, CountWindows, SizeLimits, SizeWindows, Strategy,
};
use crate::record::{Collection, Record};
use crate::writer::{OutputLayout, PartitionWriter, ProjectOverrides};

/// Default maximum records per partition window.
pub const DEFAULT_MAX_PARTITION_NODES: usize = 100_000;

/// Default maximum records per entry document.
pub const DEFAULT_MAX_PAGE_NODES: usize = 3_000;

/// Immutable settings of a split run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOptions {
    /// Windowing policy
    pub strategy: Strategy,
    /// Maximum records per entry document
    pub page_limit: usize,
    /// Records per window after the first (count) or maximum per window (size)
    pub partition_limit: usize,
    /// Size of the first count window; twice `page_limit` when unset
    pub first_window: Option<usize>,
    /// Maximum payload bytes per window (size strategy only)
    pub max_partition_bytes: Option<u64>,
    /// Output file naming
    pub layout: OutputLayout,
    /// Project name/version replacements
    pub overrides: ProjectOverrides,
    /// Close and write partitions on the rayon pool
    pub parallel: bool,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            strategy: Strategy::Count,
            page_limit: DEFAULT_MAX_PAGE_NODES,
            partition_limit: DEFAULT_MAX_PARTITION_NODES,
            first_window: None,
            max_partition_bytes: None,
            layout: OutputLayout::default(),
            overrides: ProjectOverrides::default(),
            parallel: false,
        }
    }
}

impl SplitOptions {
    /// Check every limit; all configuration errors surface here.
    pub fn validate(&self) -> Result<()> {
        match self.strategy {
            Strategy::Count => self.count_limits().map(|_| ()),
            Strategy::Size => {
                if self.page_limit == 0 {
                    return Err(SplitError::invalid_limit(
                        "max_page_nodes",
                        "must be greater than zero",
                    ));
                }
                self.size_limits().map(|_| ())
            }
        }
    }

    pub fn count_limits(&self) -> Result<CountLimits> {
        CountLimits::new(self.page_limit, self.partition_limit, self.first_window)
    }

    pub fn size_limits(&self) -> Result<SizeLimits> {
        SizeLimits::new(self.partition_limit, self.max_partition_bytes)
    }

    fn label(&self, index: usize) -> String {
        partition_label(
            index,
            self.overrides.name.as_deref(),
            self.overrides.version.as_deref(),
        )
    }
}

/// Windows planned over a collection, materialized one partition at a time.
#[derive(Debug)]
pub struct PartitionPlan {
    options: SplitOptions,
    ordered: Vec<Arc<Record>>,
    windows: Vec<Range<usize>>,
    index: RecordIndex,
}

impl PartitionPlan {
    /// Number of partitions.
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    /// Materialize partition `i`.
    pub fn build(&self, i: usize) -> Result<Partition> {
        let window = &self.ordered[self.windows[i].clone()];
        let label = self.options.label(i);

        match self.options.strategy {
            Strategy::Count => {
                let closed = ClosureResolver::new(&self.index).close(window.to_vec())?;
                debug!(
                    "{}: {} window records, backfilled {:?}",
                    label, closed.window_len, closed.backfill
                );
                Ok(Partition::new(i, label, closed.records, closed.window_len))
            }
            Strategy::Size => {
                let mut records = Vec::with_capacity(window.len() + 1);
                if i > 0 {
                    if let Some(base) = self.ordered.first() {
                        records.push(Arc::clone(base));
                    }
                }
                records.extend(window.iter().cloned());
                Ok(Partition::new(i, label, records, window.len()))
            }
        }
    }

    /// Partitions in logical order.
    pub fn iter(&self) -> impl Iterator<Item = Result<Partition>> + '_ {
        (0..self.len()).map(move |i| self.build(i))
    }
}

/// Outcome of one written partition.
#[derive(Debug, Clone)]
pub struct PartitionSummary {
    pub index: usize,
    pub label: String,
    pub header_id: String,
    pub window_records: usize,
    pub backfilled: usize,
    pub records: usize,
    pub pages: usize,
    pub dir: PathBuf,
}

/// Outcome of a split run.
#[derive(Debug, Clone, Default)]
pub struct SplitReport {
    pub shard_count: usize,
    pub rooted_records: usize,
    pub unrooted_records: usize,
    pub partitions: Vec<PartitionSummary>,
}

impl SplitReport {
    pub fn total_backfilled(&self) -> usize {
        self.partitions.iter().map(|p| p.backfilled).sum()
    }

    pub fn total_pages(&self) -> usize {
        self.partitions.iter().map(|p| p.pages).sum()
    }
}

/// Drives a complete split run.
#[derive(Debug, Clone)]
pub struct Splitter {
    options: SplitOptions,
}

impl Splitter {
    /// Create a splitter, rejecting invalid limits up front.
    pub fn new(options: SplitOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { options })
    }

    pub fn options(&self) -> &SplitOptions {
        &self.options
    }

    pub fn loader(&self) -> GraphLoader {
        GraphLoader::new(self.options.layout.header_file.clone())
    }

    /// Index the collection and plan its windows.
    pub fn plan(&self, collection: &Collection) -> Result<PartitionPlan> {
        let index = RecordIndex::build(collection.rooted())?;

        let (ordered, windows) = match self.options.strategy {
            Strategy::Count => {
                let ordered = sort_by_parent(collection.rooted());
                let windows = CountWindows::new(ordered.len(), self.options.count_limits()?)
                    .collect::<Vec<_>>();
                (ordered, windows)
            }
            Strategy::Size => {
                let ordered = collection.rooted().to_vec();
                let windows = SizeWindows::new(&ordered, self.options.size_limits()?)
                    .collect::<Vec<_>>();
                (ordered, windows)
            }
        };

        info!(
            "Planned {} {} windows over {} rooted records",
            windows.len(),
            self.options.strategy.as_str(),
            ordered.len()
        );

        Ok(PartitionPlan {
            options: self.options.clone(),
            ordered,
            windows,
            index,
        })
    }

    /// All closed partitions of a collection, without writing them.
    pub fn partitions(&self, collection: &Collection) -> Result<Vec<Partition>> {
        self.plan(collection)?.iter().collect()
    }

    /// Split the shard directory `input_dir` into `output_dir`.
    pub fn run(&self, input_dir: &Path, output_dir: &Path) -> Result<SplitReport> {
        self.run_with(input_dir, output_dir, &|_: &PartitionSummary| {})
    }

    /// Like [`Splitter::run`], calling `on_partition` after each partition is
    /// written.
    pub fn run_with(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        on_partition: &(dyn Fn(&PartitionSummary) + Sync),
    ) -> Result<SplitReport> {
        if !input_dir.is_dir() {
            return Err(SplitError::InputNotFound(input_dir.to_path_buf()));
        }

        let loaded = self.loader().load(input_dir)?;
        let project = loaded
            .collection
            .project_record()
            .ok_or(SplitError::MissingProjectRecord)?
            .value()
            .clone();

        let plan = self.plan(&loaded.collection)?;

        std::fs::create_dir_all(output_dir).map_err(|e| SplitError::write(output_dir, e))?;
        let writer = PartitionWriter::new(
            output_dir,
            self.options.page_limit,
            self.options.layout.clone(),
            loaded.header,
            project,
            &self.options.overrides,
        );

        let write_one = |i: usize| -> Result<PartitionSummary> {
            let partition = plan.build(i)?;
            let written = writer.write(&partition)?;
            info!(
                "{}: {} records ({} backfilled) in {} pages",
                partition.label,
                partition.len(),
                partition.backfilled(),
                written.pages
            );
            let summary = PartitionSummary {
                index: i,
                label: partition.label,
                header_id: written.header_id,
                window_records: partition.window_len,
                backfilled: partition.records.len() - partition.window_len,
                records: partition.records.len(),
                pages: written.pages,
                dir: written.dir,
            };
            on_partition(&summary);
            Ok(summary)
        };

        let partitions = if self.options.parallel {
            (0..plan.len())
                .into_par_iter()
                .map(write_one)
                .collect::<Result<Vec<_>>>()?
        } else {
            let mut partitions = Vec::with_capacity(plan.len());
            for i in 0..plan.len() {
                partitions.push(write_one(i)?);
            }
            partitions
        };

        Ok(SplitReport {
            shard_count: loaded.shard_count,
            rooted_records: loaded.collection.rooted().len(),
            unrooted_records: loaded.collection.unrooted().len(),
            partitions,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::HAS_PARENT_ID;
    use serde_json::json;

    fn collection(nodes: &[(u64, i64)]) -> Collection {
        Collection::from_graph(nodes.iter().map(|(id, parent)| {
            json!({
                "@id": format!("_:scanNode-{}", id),
                HAS_PARENT_ID: [{ "@value": parent }],
            })
        }))
        .unwrap()
    }

    fn ids(partition: &Partition) -> Vec<u64> {
        partition
            .records
            .iter()
            .filter_map(|r| r.node_id())
            .collect()
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = SplitOptions {
            page_limit: 0,
            ..Default::default()
        };
        let err = Splitter::new(options).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);

        let options = SplitOptions {
            strategy: Strategy::Size,
            max_partition_bytes: Some(0),
            ..Default::default()
        };
        assert!(Splitter::new(options).is_err());
    }

    #[test]
    fn test_window_sizes_without_backfill() {
        // 10 root-level records: nothing to backfill
        let nodes: Vec<_> = (1..=10).map(|i| (i, -1)).collect();
        let c = collection(&nodes);
        let splitter = Splitter::new(SplitOptions {
            page_limit: 2,
            partition_limit: 3,
            ..Default::default()
        })
        .unwrap();

        let sizes: Vec<_> = splitter
            .partitions(&c)
            .unwrap()
            .iter()
            .map(Partition::len)
            .collect();
        assert_eq!(sizes, vec![4, 3, 3]);
    }

    #[test]
    fn test_partitions_are_labelled_in_order() {
        let nodes: Vec<_> = (1..=7).map(|i| (i, -1)).collect();
        let splitter = Splitter::new(SplitOptions {
            page_limit: 1,
            partition_limit: 2,
            overrides: ProjectOverrides {
                name: Some("demo".into()),
                version: None,
            },
            ..Default::default()
        })
        .unwrap();

        let labels: Vec<_> = splitter
            .partitions(&collection(&nodes))
            .unwrap()
            .into_iter()
            .map(|p| p.label)
            .collect();
        assert_eq!(
            labels,
            vec!["_demo_part00", "_demo_part01", "_demo_part02", "_demo_part03"]
        );
    }

    #[test]
    fn test_count_strategy_backfills_ancestors() {
        // Sorted by parent: 1(-1) 2(1) 3(2) 4(3)
        let c = collection(&[(4, 3), (3, 2), (2, 1), (1, -1)]);
        let splitter = Splitter::new(SplitOptions {
            page_limit: 1,
            partition_limit: 2,
            ..Default::default()
        })
        .unwrap();

        let partitions = splitter.partitions(&c).unwrap();
        assert_eq!(partitions.len(), 2);
        assert_eq!(ids(&partitions[0]), vec![1, 2]);
        // window {3, 4}; missing {2}; chain of 2 = [1]; then 2
        assert_eq!(ids(&partitions[1]), vec![3, 4, 1, 2]);
        assert_eq!(partitions[1].backfilled(), 2);
    }

    #[test]
    fn test_size_strategy_prepends_base_record() {
        let c = collection(&[(1, -1), (2, 1), (3, 1), (4, 1), (5, 1)]);
        let splitter = Splitter::new(SplitOptions {
            strategy: Strategy::Size,
            partition_limit: 2,
            ..Default::default()
        })
        .unwrap();

        let partitions = splitter.partitions(&c).unwrap();
        let all: Vec<_> = partitions.iter().map(ids).collect();
        assert_eq!(all, vec![vec![1, 2], vec![1, 3, 4], vec![1, 5]]);
    }

    #[test]
    fn test_duplicate_identity_aborts_plan() {
        let c = collection(&[(1, -1), (1, -1)]);
        let splitter = Splitter::new(SplitOptions::default()).unwrap();
        assert!(matches!(
            splitter.plan(&c),
            Err(SplitError::DuplicateIdentity(1))
        ));
    }

    #[test]
    fn test_empty_collection_has_no_partitions() {
        let splitter = Splitter::new(SplitOptions::default()).unwrap();
        assert!(splitter.partitions(&Collection::default()).unwrap().is_empty());
    }

    #[test]
    fn test_run_missing_input_dir() {
        let splitter = Splitter::new(SplitOptions::default()).unwrap();
        let temp = tempfile::TempDir::new().unwrap();
        let err = splitter
            .run(&temp.path().join("absent"), &temp.path().join("out"))
            .unwrap_err();
        assert!(matches!(err, SplitError::InputNotFound(_)));
        assert!(!temp.path().join("out").exists());
    }
}
