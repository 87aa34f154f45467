//! End-to-end split runs over shard directories on disk.
//!
//! Each test writes a synthetic BDIO directory, splits it, and reads the
//! output back the way a downstream consumer would.

mod common;

use std::path::Path;

use bdiosplit_core::loader::read_json;
use bdiosplit_core::record::{first_value, HAS_NAME, HAS_VERSION, TYPE_PROJECT};
use bdiosplit_core::split::{SplitOptions, Splitter};
use bdiosplit_core::{verify_output_dir, OutputLayout, ProjectOverrides, SplitError};
use pretty_assertions::assert_eq;
use serde_json::Value;
use tempfile::TempDir;

use common::{chain, random_forest, write_shards, COMPONENT_TYPE};

// ============================================================================
// Helpers
// ============================================================================

fn options(page_limit: usize, partition_limit: usize) -> SplitOptions {
    SplitOptions {
        page_limit,
        partition_limit,
        ..Default::default()
    }
}

fn page(dir: &Path, n: usize) -> Value {
    read_json(&dir.join(format!("bdio-entry-{:02}.jsonld", n))).unwrap()
}

/// Scan node ids of every page in a partition directory, in page order.
fn partition_ids(dir: &Path) -> Vec<String> {
    let mut ids = Vec::new();
    let mut n = 0;
    while dir.join(format!("bdio-entry-{:02}.jsonld", n)).exists() {
        let doc = page(dir, n);
        for entry in doc["@graph"].as_array().unwrap().iter().skip(1) {
            ids.push(entry["@id"].as_str().unwrap().to_string());
        }
        n += 1;
    }
    ids
}

// ============================================================================
// Full runs
// ============================================================================

#[test]
fn test_split_produces_verifiable_partitions() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in");
    let output = temp.path().join("out");
    write_shards(&input, &random_forest(400, 6, 3), 90, COMPONENT_TYPE);

    let report = Splitter::new(options(7, 40))
        .unwrap()
        .run(&input, &output)
        .unwrap();

    assert_eq!(report.shard_count, 6);
    assert_eq!(report.rooted_records, 400);
    assert_eq!(report.unrooted_records, 1);
    assert!(report.partitions.len() > 1);

    let reports = verify_output_dir(&output, &OutputLayout::default(), Some(7)).unwrap();
    assert_eq!(reports.len(), report.partitions.len());
    for r in &reports {
        assert!(r.is_valid(), "{:?}: {:?}", r.dir, r.problems());
    }
}

#[test]
fn test_headers_get_unique_ids_and_labelled_names() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in");
    let output = temp.path().join("out");
    write_shards(&input, &chain(10), 4, COMPONENT_TYPE);

    let report = Splitter::new(options(2, 3))
        .unwrap()
        .run(&input, &output)
        .unwrap();

    let mut seen = std::collections::HashSet::new();
    for summary in &report.partitions {
        let header = read_json(&summary.dir.join("bdio-header.jsonld")).unwrap();
        assert_eq!(header["@id"], summary.header_id.as_str());
        assert!(summary.header_id.starts_with("urn:uuid:"));
        assert!(seen.insert(summary.header_id.clone()));
        assert_eq!(
            first_value(&header, HAS_NAME).unwrap(),
            format!("demo/1.0{} signature 8.4.0", summary.label).as_str()
        );

        // Pages share the header's identity and type
        let first_page = page(&summary.dir, 0);
        assert_eq!(first_page["@id"], header["@id"]);
        assert_eq!(first_page["@type"], header["@type"]);
    }

    let dirs: Vec<_> = report
        .partitions
        .iter()
        .map(|p| p.dir.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(dirs, vec!["_part00", "_part01", "_part02"]);
}

#[test]
fn test_pagination_within_partition() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in");
    let output = temp.path().join("out");
    let nodes: Vec<_> = (1..=12).map(|id| (id, -1)).collect();
    write_shards(&input, &nodes, 100, COMPONENT_TYPE);

    let report = Splitter::new(SplitOptions {
        first_window: Some(12),
        ..options(5, 12)
    })
    .unwrap()
    .run(&input, &output)
    .unwrap();

    assert_eq!(report.partitions.len(), 1);
    assert_eq!(report.total_pages(), 3);

    let dir = &report.partitions[0].dir;
    let sizes: Vec<_> = (0..3)
        .map(|n| page(dir, n)["@graph"].as_array().unwrap().len() - 1)
        .collect();
    assert_eq!(sizes, vec![5, 5, 2]);
    assert!(!dir.join("bdio-entry-03.jsonld").exists());
}

#[test]
fn test_resplit_into_same_output_drops_old_pages() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in");
    let output = temp.path().join("out");
    write_shards(&input, &chain(12), 100, COMPONENT_TYPE);

    let first = Splitter::new(options(1, 20))
        .unwrap()
        .run(&input, &output)
        .unwrap();
    assert_eq!(first.partitions[1].pages, 12);

    let second = Splitter::new(options(5, 20))
        .unwrap()
        .run(&input, &output)
        .unwrap();
    assert_eq!(second.partitions.len(), 2);
    assert_eq!(second.partitions[1].pages, 3);

    let reports = verify_output_dir(&output, &OutputLayout::default(), Some(5)).unwrap();
    for (r, written) in reports.iter().zip(&second.partitions) {
        assert!(r.is_valid(), "{:?}: {:?}", r.dir, r.problems());
        assert_eq!(r.pages, written.pages);
        assert_eq!(r.records, written.records);
    }
    assert!(!second.partitions[1].dir.join("bdio-entry-03.jsonld").exists());
}

#[test]
fn test_overrides_skip_project_typed_records() {
    let overrides = ProjectOverrides {
        name: Some("renamed".into()),
        version: Some("2.0".into()),
    };

    for (project_type, expected_name, expected_version) in [
        (COMPONENT_TYPE, "renamed", "2.0"),
        (TYPE_PROJECT, "demo", "1.0"),
    ] {
        let temp = TempDir::new().unwrap();
        let input = temp.path().join("in");
        let output = temp.path().join("out");
        write_shards(&input, &chain(5), 10, project_type);

        let report = Splitter::new(SplitOptions {
            overrides: overrides.clone(),
            ..options(2, 2)
        })
        .unwrap()
        .run(&input, &output)
        .unwrap();

        // Labels always carry the overrides, version first
        assert_eq!(report.partitions[0].label, "_renamed_2.0_part00");

        for summary in &report.partitions {
            let project = &page(&summary.dir, 0)["@graph"][0];
            assert_eq!(first_value(project, HAS_NAME).unwrap(), expected_name);
            assert_eq!(first_value(project, HAS_VERSION).unwrap(), expected_version);
        }
    }
}

#[test]
fn test_parallel_matches_serial() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in");
    write_shards(&input, &random_forest(600, 4, 21), 150, COMPONENT_TYPE);

    let serial = Splitter::new(options(10, 55))
        .unwrap()
        .run(&input, &temp.path().join("serial"))
        .unwrap();
    let parallel = Splitter::new(SplitOptions {
        parallel: true,
        ..options(10, 55)
    })
    .unwrap()
    .run(&input, &temp.path().join("parallel"))
    .unwrap();

    assert_eq!(serial.partitions.len(), parallel.partitions.len());
    for (a, b) in serial.partitions.iter().zip(&parallel.partitions) {
        assert_eq!(a.index, b.index);
        assert_eq!(a.label, b.label);
        assert_eq!(a.records, b.records);
        assert_eq!(partition_ids(&a.dir), partition_ids(&b.dir));
    }
}

#[test]
fn test_missing_header_is_fatal() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in");
    write_shards(&input, &chain(3), 10, COMPONENT_TYPE);
    std::fs::remove_file(input.join("bdio-header.jsonld")).unwrap();

    let err = Splitter::new(SplitOptions::default())
        .unwrap()
        .run(&input, &temp.path().join("out"))
        .unwrap_err();
    assert!(matches!(err, SplitError::MissingHeader { .. }));
}

#[test]
fn test_dangling_parent_is_fatal() {
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in");
    // Window 2 holds node 4 whose parent 9 does not exist anywhere
    write_shards(&input, &[(1, -1), (2, 1), (3, 1), (4, 9)], 10, COMPONENT_TYPE);

    let err = Splitter::new(options(1, 1))
        .unwrap()
        .run(&input, &temp.path().join("out"))
        .unwrap_err();
    assert!(matches!(err, SplitError::NotFound(9)));
}
