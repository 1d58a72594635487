//! Shared test utilities for integration tests.
//!
//! Import from integration test files as:
//! ```ignore
//! mod common;
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use tempfile::TempDir;

use pubnet_core::network::{EdgeSet, Network, NodeSet};
use pubnet_core::properties::{FeatureColumn, Representation};

/// Initialize tracing for tests, respecting RUST_LOG env var.
///
/// Safe to call multiple times — subsequent calls are no-ops.
#[allow(dead_code)]
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
}

/// Write the fixture graph as TSV files under `<temp_dir>/<name>/`.
///
/// The directory gets publication and author node files and two edge files.
/// There is intentionally no chemical node file: the type is referenced by an
/// edge file only, and loading must produce an empty node set for it.
#[allow(dead_code)]
pub fn write_fixture_graph(temp_dir: &TempDir, name: &str) -> PathBuf {
    let graph_dir = temp_dir.path().join(name);
    std::fs::create_dir(&graph_dir).unwrap();

    let publications = "id:ID(Publication)\tYear:int\n\
         1\t2018\n\
         2\t2018\n\
         3\t2019\n\
         4\t2020\n\
         5\t2020\n\
         6\t2021\n";
    std::fs::write(graph_dir.join("Publication_nodes.tsv"), publications).unwrap();

    let authors = "id:ID(Author)\tForeName:string\tLastName:string\n\
         1\tJohn\tSmith\n\
         2\tJohn\tKim\n\
         3\tJane\tSmith\n\
         4\tJane\tDoe\n";
    std::fs::write(graph_dir.join("Author_nodes.tsv"), authors).unwrap();

    let author_edges = ":START_ID(Author)\t:END_ID(Publication)\n\
         1\t1\n2\t1\n3\t1\n1\t2\n2\t2\n1\t3\n3\t3\n2\t4\n4\t4\n1\t5\n4\t5\n4\t6\n";
    std::fs::write(graph_dir.join("Author_Publication_edges.tsv"), author_edges).unwrap();

    let chemical_edges = ":START_ID(Chemical)\t:END_ID(Publication)\n\
         1\t1\n2\t1\n1\t2\n2\t2\n1\t3\n2\t3\n1\t4\n2\t4\n1\t5\n2\t6\n";
    std::fs::write(graph_dir.join("Chemical_Publication_edges.tsv"), chemical_edges).unwrap();

    graph_dir
}

/// The same graph the fixture files describe, built in memory, plus a
/// directed citation edge set between publications.
#[allow(dead_code)]
pub fn build_fixture_network(representation: Representation) -> Network {
    let publications = NodeSet::new(
        "Publication".to_string(),
        vec![1, 2, 3, 4, 5, 6],
        BTreeMap::from([(
            "Year".to_string(),
            FeatureColumn::Int(vec![2018, 2018, 2019, 2020, 2020, 2021]),
        )]),
    )
    .unwrap();
    let authors = NodeSet::new(
        "Author".to_string(),
        vec![1, 2, 3, 4],
        BTreeMap::from([
            (
                "ForeName".to_string(),
                FeatureColumn::Text(
                    ["John", "John", "Jane", "Jane"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                ),
            ),
            (
                "LastName".to_string(),
                FeatureColumn::Text(
                    ["Smith", "Kim", "Smith", "Doe"]
                        .iter()
                        .map(|s| s.to_string())
                        .collect(),
                ),
            ),
        ]),
    )
    .unwrap();

    let author_publication = EdgeSet::from_pairs(
        "Author",
        "Publication",
        false,
        vec![
            (1, 1),
            (2, 1),
            (3, 1),
            (1, 2),
            (2, 2),
            (1, 3),
            (3, 3),
            (2, 4),
            (4, 4),
            (1, 5),
            (4, 5),
            (4, 6),
        ],
        representation,
    );
    let chemical_publication = EdgeSet::from_pairs(
        "Chemical",
        "Publication",
        false,
        vec![
            (1, 1),
            (2, 1),
            (1, 2),
            (2, 2),
            (1, 3),
            (2, 3),
            (1, 4),
            (2, 4),
            (1, 5),
            (2, 6),
        ],
        representation,
    );
    // Newer publications citing older ones; direction matters here.
    let citations = EdgeSet::from_columns(
        "Publication",
        "Publication",
        true,
        vec![3, 4, 5, 6],
        vec![1, 2, 1, 5],
        BTreeMap::from([(
            "confidence".to_string(),
            FeatureColumn::Float(vec![1.0, 0.9, 0.8, 1.0]),
        )]),
        representation,
    )
    .unwrap();

    Network::from_parts(
        "Publication",
        Some("fixture".to_string()),
        vec![publications, authors],
        vec![author_publication, chemical_publication, citations],
    )
    .unwrap()
}
