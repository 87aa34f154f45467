//! Common test utilities for integration tests.
//!
//! Synthetic scan graph builders and shard fixtures shared across
//! integration test files.

#![allow(dead_code)]

use std::path::Path;

use bdiosplit_core::record::{
    Collection, HAS_BYTE_COUNT, HAS_NAME, HAS_PARENT_ID, HAS_VERSION,
};
use serde_json::{json, Value};

// ============================================================================
// Node builders
// ============================================================================

pub const FILE_TYPE: &str = "https://blackducksoftware.github.io/bdio#File";
pub const COMPONENT_TYPE: &str = "https://blackducksoftware.github.io/bdio#Component";

/// A rooted scan node.
pub fn scan_node(id: u64, parent: i64) -> Value {
    json!({
        "@id": format!("_:scanNode-{}", id),
        "@type": FILE_TYPE,
        HAS_PARENT_ID: [{ "@value": parent }],
        HAS_BYTE_COUNT: [{ "@value": id * 10 }],
    })
}

/// The project-level record.
pub fn project_node(type_tag: &str) -> Value {
    json!({
        "@id": "urn:uuid:project",
        "@type": type_tag,
        HAS_NAME: [{ "@value": "demo" }],
        HAS_VERSION: [{ "@value": "1.0" }],
    })
}

/// A header document as produced by the signature scanner.
pub fn header() -> Value {
    json!({
        "@id": "urn:uuid:00000000-0000-0000-0000-000000000000",
        "@type": "https://blackducksoftware.github.io/bdio#Container",
        HAS_NAME: [{ "@value": "demo/1.0 signature 8.4.0" }],
    })
}

pub fn collection(nodes: &[(u64, i64)]) -> Collection {
    let mut graph = vec![project_node(COMPONENT_TYPE)];
    graph.extend(nodes.iter().map(|(id, parent)| scan_node(*id, *parent)));
    Collection::from_graph(graph).expect("synthetic graph is well formed")
}

// ============================================================================
// Forest generators
// ============================================================================

/// Small deterministic generator so forests are reproducible per seed.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407))
    }

    pub fn next_u64(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    pub fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n.max(1)
    }
}

/// A complete tree of the given depth and branching factor, ids breadth-first
/// from 1. `trees` copies are generated side by side.
pub fn full_forest(trees: usize, depth: usize, branching: usize) -> Vec<(u64, i64)> {
    let mut nodes = Vec::new();
    let mut next_id = 1u64;

    for _ in 0..trees {
        let root = next_id;
        next_id += 1;
        nodes.push((root, -1));

        let mut level = vec![root];
        for _ in 0..depth {
            let mut next_level = Vec::new();
            for parent in &level {
                for _ in 0..branching {
                    nodes.push((next_id, *parent as i64));
                    next_level.push(next_id);
                    next_id += 1;
                }
            }
            level = next_level;
        }
    }
    nodes
}

/// A random forest of `n` nodes. Each node picks the root sentinel with
/// probability 1/`root_odds`, otherwise a random earlier node. The result is
/// shuffled so load order differs from id order.
pub fn random_forest(n: u64, root_odds: u64, seed: u64) -> Vec<(u64, i64)> {
    let mut rng = Lcg::new(seed);
    let mut nodes: Vec<(u64, i64)> = Vec::with_capacity(n as usize);

    for id in 1..=n {
        let parent = if id == 1 || rng.below(root_odds) == 0 {
            -1
        } else {
            (1 + rng.below(id - 1)) as i64
        };
        nodes.push((id, parent));
    }

    for i in (1..nodes.len()).rev() {
        let j = rng.below(i as u64 + 1) as usize;
        nodes.swap(i, j);
    }
    nodes
}

/// A single chain 1 <- 2 <- ... <- n.
pub fn chain(n: u64) -> Vec<(u64, i64)> {
    (1..=n)
        .map(|id| (id, if id == 1 { -1 } else { id as i64 - 1 }))
        .collect()
}

// ============================================================================
// Shard fixtures
// ============================================================================

/// Write an uncompressed BDIO directory: a header plus entry shards of
/// `per_shard` nodes. The project record goes first in the first shard.
pub fn write_shards(dir: &Path, nodes: &[(u64, i64)], per_shard: usize, project_type: &str) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(
        dir.join("bdio-header.jsonld"),
        serde_json::to_string_pretty(&header()).unwrap(),
    )
    .unwrap();

    let mut graph = vec![project_node(project_type)];
    graph.extend(nodes.iter().map(|(id, parent)| scan_node(*id, *parent)));

    for (n, chunk) in graph.chunks(per_shard.max(1)).enumerate() {
        let shard = json!({
            "@id": "urn:uuid:00000000-0000-0000-0000-000000000000",
            "@type": "https://blackducksoftware.github.io/bdio#Container",
            "@graph": chunk,
        });
        std::fs::write(
            dir.join(format!("bdio-entry-{:02}.jsonld", n)),
            serde_json::to_string(&shard).unwrap(),
        )
        .unwrap();
    }
}
