//! Integration tests for directory-based persistence.

mod common;

use std::collections::BTreeSet;

use tempfile::TempDir;

use pubnet_core::config::{FileFormat, StorageConfig};
use pubnet_core::naming::EdgeSelector;
use pubnet_core::network::NodeSet;
use pubnet_core::properties::{
    EdgeKey, FeatureColumn, FeatureValue, NodeId, OverlapMetric, Representation, FEATURE_OVERLAP,
};
use pubnet_core::storage::{
    delete_graph, graph_exists, list_graphs, load_graph, save_graph_as, LoadOptions,
};

fn ids(values: &[NodeId]) -> BTreeSet<NodeId> {
    values.iter().copied().collect()
}

#[test]
fn load_reads_tsv_fixture_files() {
    common::init_logging();
    let temp_dir = TempDir::new().unwrap();
    common::write_fixture_graph(&temp_dir, "simple");
    let config = StorageConfig::new(temp_dir.path());

    let net = load_graph(&config, "simple", &LoadOptions::default()).unwrap();
    assert_eq!(net.root(), "Publication");
    assert_eq!(net.node("Publication").unwrap().len(), 6);
    assert_eq!(net.node("Author").unwrap().len(), 4);
    assert_eq!(net.edge("Author", "Publication").unwrap().len(), 12);
    assert_eq!(net.edge("Chemical", "Publication").unwrap().len(), 10);
    assert_eq!(
        net.node("Publication").unwrap().feature("Year").unwrap(),
        &FeatureColumn::Int(vec![2018, 2018, 2019, 2020, 2020, 2021])
    );
    assert_eq!(
        net.node("Author")
            .unwrap()
            .feature_value("LastName", 2)
            .unwrap(),
        FeatureValue::Text("Kim".to_string())
    );
}

#[test]
fn missing_node_file_loads_as_empty_node_set() {
    common::init_logging();
    let temp_dir = TempDir::new().unwrap();
    common::write_fixture_graph(&temp_dir, "simple");
    let config = StorageConfig::new(temp_dir.path());

    let net = load_graph(&config, "simple", &LoadOptions::default()).unwrap();
    // There is no Chemical_nodes.tsv, only an edge file referencing the type.
    assert!(net.node("Chemical").unwrap().is_empty());

    // Slicing against the empty type's ids gives an empty subnetwork, not an
    // error.
    let subnet = net.slice_type("Chemical", &ids(&[1])).unwrap();
    assert!(subnet.node("Publication").unwrap().is_empty());
    assert!(subnet.edge("Author", "Publication").unwrap().is_empty());
}

#[test]
fn missing_edge_file_loads_as_empty_edge_set() {
    common::init_logging();
    let temp_dir = TempDir::new().unwrap();
    common::write_fixture_graph(&temp_dir, "simple");
    let config = StorageConfig::new(temp_dir.path());

    let options = LoadOptions {
        edges: Some(vec![
            EdgeSelector::parse("Author-Publication").unwrap(),
            EdgeSelector::parse("Journal-Publication").unwrap(),
        ]),
        ..LoadOptions::default()
    };
    let net = load_graph(&config, "simple", &options).unwrap();
    assert_eq!(net.edge("Author", "Publication").unwrap().len(), 12);
    assert!(net.edge("Journal", "Publication").unwrap().is_empty());
    assert!(net.node("Journal").unwrap().is_empty());
}

#[test]
fn wildcard_selector_resolves_to_incident_edge_sets() {
    common::init_logging();
    let temp_dir = TempDir::new().unwrap();
    common::write_fixture_graph(&temp_dir, "simple");
    let config = StorageConfig::new(temp_dir.path());

    let options = LoadOptions {
        edges: Some(vec![EdgeSelector::parse("Publication*").unwrap()]),
        ..LoadOptions::default()
    };
    let net = load_graph(&config, "simple", &options).unwrap();
    let mut keys: Vec<EdgeKey> = net.edge_keys().into_iter().cloned().collect();
    keys.sort();
    assert_eq!(
        keys,
        vec![
            EdgeKey::new("Author", "Publication"),
            EdgeKey::new("Chemical", "Publication"),
        ]
    );
}

#[test]
fn save_and_load_round_trip_both_formats_and_backends() {
    common::init_logging();
    let temp_dir = TempDir::new().unwrap();
    for format in [FileFormat::Tsv, FileFormat::Json] {
        for representation in [Representation::Array, Representation::Graph] {
            let config = StorageConfig::new(temp_dir.path()).with_format(format);
            let net = common::build_fixture_network(representation);
            let name = format!("rt_{}_{representation}", format.ext());
            save_graph_as(&net, &config, &name).unwrap();

            let options = LoadOptions::default().with_representation(representation);
            let loaded = load_graph(&config, &name, &options).unwrap();
            assert_eq!(loaded, net, "{format:?} / {representation:?}");

            // Directed and bipartite flags survive the trip.
            let citations = loaded.edge("Publication", "Publication").unwrap();
            assert!(citations.is_directed());
            assert!(!citations.is_bipartite());
            assert_eq!(citations.representation(), representation);
        }
    }
}

#[test]
fn backends_give_identical_results_after_loading() {
    common::init_logging();
    let temp_dir = TempDir::new().unwrap();
    common::write_fixture_graph(&temp_dir, "simple");
    let config = StorageConfig::new(temp_dir.path());

    let array_net = load_graph(
        &config,
        "simple",
        &LoadOptions::default().with_representation(Representation::Array),
    )
    .unwrap();
    let graph_net = load_graph(
        &config,
        "simple",
        &LoadOptions::default().with_representation(Representation::Graph),
    )
    .unwrap();

    let keep = ids(&[1, 2]);
    assert_eq!(
        array_net.slice(&keep).unwrap(),
        graph_net.slice(&keep).unwrap()
    );
    let array_overlap = array_net.overlap("Author", OverlapMetric::Count).unwrap();
    let graph_overlap = graph_net.overlap("Author", OverlapMetric::Count).unwrap();
    assert_eq!(array_overlap, graph_overlap);
    assert!(array_overlap.feature(FEATURE_OVERLAP).is_ok());
}

#[test]
fn format_preference_picks_the_machine_format() {
    common::init_logging();
    let temp_dir = TempDir::new().unwrap();
    let graph_dir = temp_dir.path().join("preferred");
    std::fs::create_dir(&graph_dir).unwrap();

    // A TSV file and a JSON file describe the same type with different rows;
    // the JSON one must win.
    std::fs::write(
        graph_dir.join("Publication_nodes.tsv"),
        "id:ID(Publication)\n1\n",
    )
    .unwrap();
    let richer = NodeSet::new(
        "Publication".to_string(),
        vec![1, 2, 3],
        Default::default(),
    )
    .unwrap();
    let json = serde_json::to_string(&richer).unwrap();
    std::fs::write(graph_dir.join("Publication_nodes.json"), json).unwrap();

    let config = StorageConfig::new(temp_dir.path());
    let net = load_graph(&config, "preferred", &LoadOptions::default()).unwrap();
    assert_eq!(net.node("Publication").unwrap().len(), 3);
}

#[test]
fn malformed_tsv_rows_are_healed_or_dropped() {
    common::init_logging();
    let temp_dir = TempDir::new().unwrap();
    let graph_dir = temp_dir.path().join("messy");
    std::fs::create_dir(&graph_dir).unwrap();

    // Row 2 has a non-integer id, row 3 is missing its feature cell, row 4
    // has an extra tab that folds into the trailing text column.
    std::fs::write(
        graph_dir.join("Publication_nodes.tsv"),
        "id:ID(Publication)\tTitle:string\n\
         1\tGene expression atlas\n\
         oops\tBroken row\n\
         3\n\
         4\tTitle\twith a stray tab\n",
    )
    .unwrap();

    let config = StorageConfig::new(temp_dir.path());
    let net = load_graph(&config, "messy", &LoadOptions::default()).unwrap();
    let publications = net.node("Publication").unwrap();
    assert_eq!(publications.ids(), &[1, 4]);
    assert_eq!(
        publications.feature_value("Title", 4).unwrap(),
        FeatureValue::Text("Title\twith a stray tab".to_string())
    );
}

#[test]
fn graph_existence_requires_a_non_empty_data_file() {
    common::init_logging();
    let temp_dir = TempDir::new().unwrap();
    let config = StorageConfig::new(temp_dir.path());

    // An empty directory is not a saved graph.
    std::fs::create_dir(temp_dir.path().join("hollow")).unwrap();
    assert!(!graph_exists(&config, "hollow"));

    // Neither is one holding only a zero-byte placeholder.
    std::fs::write(
        temp_dir.path().join("hollow").join("Publication_nodes.tsv"),
        "",
    )
    .unwrap();
    assert!(!graph_exists(&config, "hollow"));
    assert!(load_graph(&config, "hollow", &LoadOptions::default()).is_err());

    common::write_fixture_graph(&temp_dir, "real");
    assert!(graph_exists(&config, "real"));
}

#[test]
fn list_and_delete_graphs() {
    common::init_logging();
    let temp_dir = TempDir::new().unwrap();
    let config = StorageConfig::new(temp_dir.path());

    common::write_fixture_graph(&temp_dir, "one");
    common::write_fixture_graph(&temp_dir, "two");
    std::fs::create_dir(temp_dir.path().join("hollow")).unwrap();

    let mut names = list_graphs(&config);
    names.sort();
    assert_eq!(names, vec!["one".to_string(), "two".to_string()]);

    delete_graph(&config, "one").unwrap();
    assert_eq!(list_graphs(&config), vec!["two".to_string()]);
    assert!(delete_graph(&config, "one").is_err());
}

#[test]
fn storage_config_round_trips_through_toml() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("pubnet.toml");
    let config = StorageConfig::new("/var/data/graphs").with_format(FileFormat::Json);
    config.to_file(&path).unwrap();
    let read_back = StorageConfig::from_file(&path).unwrap();
    assert_eq!(read_back, config);
}
