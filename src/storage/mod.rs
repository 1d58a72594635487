//! Directory-based persistence for networks.
//!
//! A graph is a directory holding one file per node set
//! (`<Type>_nodes.<ext>`) and one per edge set (`<TypeA>_<TypeB>_edges.<ext>`).
//! Plain TSV files are easy to modify by hand or with tools outside this
//! crate; JSON files are faster to read back for larger data. Where both
//! exist for one set, [crate::config::FORMAT_PREFERENCE] decides.
//!
//! Missing files are not errors: a referenced type without a node file loads
//! as an empty node set, a requested pair without an edge file as an empty
//! edge set. A directory only counts as a saved graph when it holds at least
//! one non-empty data file.

mod tsv;

use std::collections::{BTreeMap, BTreeSet};
use std::fs::{create_dir_all, remove_dir_all, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{
    config::{FileFormat, StorageConfig, FORMAT_PREFERENCE},
    error::PubNetError,
    naming::{edge_file_name, edge_file_parts, node_file_name, node_file_parts, EdgeSelector},
    network::{EdgeSet, Network, NodeSet},
    properties::{EdgeKey, Representation},
};

/// What [load_graph] should read and how to anchor it.
#[derive(Clone, Debug)]
pub struct LoadOptions {
    pub root: String,
    pub representation: Representation,
    /// Node types to read; `None` means every type implied by the directory
    /// and the selected edges.
    pub nodes: Option<Vec<String>>,
    /// Edge selectors to read; `None` means every edge file present.
    pub edges: Option<Vec<EdgeSelector>>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        LoadOptions {
            root: "Publication".to_string(),
            representation: Representation::default(),
            nodes: None,
            edges: None,
        }
    }
}

impl LoadOptions {
    pub fn with_root(mut self, root: &str) -> Self {
        self.root = root.to_string();
        self
    }

    pub fn with_representation(mut self, representation: Representation) -> Self {
        self.representation = representation;
        self
    }
}

fn data_files(dir: &Path) -> (BTreeMap<String, BTreeMap<String, PathBuf>>, BTreeMap<EdgeKey, BTreeMap<String, PathBuf>>) {
    let mut node_files: BTreeMap<String, BTreeMap<String, PathBuf>> = BTreeMap::new();
    let mut edge_files: BTreeMap<EdgeKey, BTreeMap<String, PathBuf>> = BTreeMap::new();
    for entry in WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
    {
        let Some(file_name) = entry.file_name().to_str() else {
            continue;
        };
        if let Some((node, ext)) = node_file_parts(file_name) {
            node_files
                .entry(node)
                .or_default()
                .insert(ext, entry.path().to_path_buf());
        } else if let Some((key, ext)) = edge_file_parts(file_name) {
            edge_files
                .entry(key)
                .or_default()
                .insert(ext, entry.path().to_path_buf());
        }
    }
    (node_files, edge_files)
}

fn preferred_file(available: &BTreeMap<String, PathBuf>) -> Option<(FileFormat, &PathBuf)> {
    FORMAT_PREFERENCE
        .iter()
        .find_map(|format| available.get(format.ext()).map(|path| (*format, path)))
}

fn non_empty(path: &Path) -> bool {
    path.metadata().map(|meta| meta.len() > 0).unwrap_or(false)
}

/// Whether a saved graph exists at this location. True only when the
/// directory holds at least one non-empty node or edge file; a bare or
/// placeholder-only directory does not count.
pub fn graph_exists(config: &StorageConfig, name: &str) -> bool {
    let dir = config.graph_dir(name);
    if !dir.is_dir() {
        return false;
    }
    let (node_files, edge_files) = data_files(&dir);
    node_files
        .values()
        .chain(edge_files.values())
        .flat_map(|by_ext| by_ext.values())
        .any(|path| non_empty(path))
}

/// Names of all graphs saved under the config's data directory.
pub fn list_graphs(config: &StorageConfig) -> Vec<String> {
    WalkDir::new(&config.data_dir)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_dir())
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| graph_exists(config, name))
        .collect()
}

/// Delete a saved graph and its directory.
pub fn delete_graph(config: &StorageConfig, name: &str) -> Result<(), PubNetError> {
    let dir = config.graph_dir(name);
    if !dir.is_dir() {
        return Err(PubNetError::NotFound(format!(
            "graph '{name}' not found in {:?}",
            config.data_dir
        )));
    }
    remove_dir_all(dir)?;
    Ok(())
}

fn read_nodes(
    node_type: &str,
    format: FileFormat,
    path: &Path,
) -> Result<NodeSet, PubNetError> {
    tracing::debug!("reading node set '{node_type}' from {path:?}");
    match format {
        FileFormat::Tsv => tsv::read_nodes(path),
        FileFormat::Json => {
            let reader = BufReader::new(File::open(path)?);
            Ok(serde_json::from_reader(reader)?)
        }
    }
}

fn read_edges(
    key: &EdgeKey,
    format: FileFormat,
    path: &Path,
    representation: Representation,
) -> Result<EdgeSet, PubNetError> {
    tracing::debug!("reading edge set '{key}' from {path:?}");
    let edges = match format {
        FileFormat::Tsv => tsv::read_edges(path)?,
        FileFormat::Json => {
            let reader = BufReader::new(File::open(path)?);
            serde_json::from_reader::<_, EdgeSet>(reader)?
        }
    };
    Ok(edges.convert_to(representation))
}

/// Load a saved graph as a [Network].
pub fn load_graph(
    config: &StorageConfig,
    name: &str,
    options: &LoadOptions,
) -> Result<Network, PubNetError> {
    if !graph_exists(config, name) {
        let available = list_graphs(config).join("\n\t");
        return Err(PubNetError::NotFound(format!(
            "graph '{name}' not found; available graphs are:\n\t{available}"
        )));
    }
    let dir = config.graph_dir(name);
    let (node_files, edge_files) = data_files(&dir);
    let found_keys: Vec<EdgeKey> = edge_files.keys().cloned().collect();

    // Which edge sets to materialize. A pair selector naming an absent file
    // still yields an (empty) edge set; wildcards only match what exists.
    let mut requested_edges: Vec<EdgeKey> = Vec::new();
    let mut missing_pairs: Vec<EdgeKey> = Vec::new();
    match (&options.edges, &options.nodes) {
        (Some(selectors), _) => {
            for selector in selectors {
                let matched = selector.resolve(&found_keys);
                if matched.is_empty() {
                    if let EdgeSelector::Pair(key) = selector {
                        missing_pairs.push(key.clone());
                    }
                } else {
                    requested_edges.extend(matched);
                }
            }
            requested_edges.sort();
            requested_edges.dedup();
        }
        (None, Some(node_list)) => {
            let wanted: BTreeSet<&str> = node_list.iter().map(String::as_str).collect();
            requested_edges = found_keys
                .iter()
                .filter(|key| {
                    let (first, second) = key.parts();
                    wanted.contains(first) && wanted.contains(second)
                })
                .cloned()
                .collect();
        }
        (None, None) => requested_edges = found_keys.clone(),
    }

    // Which node types to materialize.
    let requested_nodes: BTreeSet<String> = match (&options.nodes, &options.edges) {
        (Some(node_list), _) => node_list.iter().cloned().collect(),
        (None, Some(_)) => requested_edges
            .iter()
            .chain(missing_pairs.iter())
            .flat_map(|key| {
                let (first, second) = key.parts();
                [first.to_string(), second.to_string()]
            })
            .collect(),
        (None, None) => node_files
            .keys()
            .cloned()
            .chain(requested_edges.iter().flat_map(|key| {
                let (first, second) = key.parts();
                [first.to_string(), second.to_string()]
            }))
            .collect(),
    };

    let mut nodes = Vec::new();
    for node_type in &requested_nodes {
        let loaded = node_files
            .get(node_type)
            .and_then(|by_ext| preferred_file(by_ext))
            .map(|(format, path)| read_nodes(node_type, format, path))
            .transpose()?;
        match loaded {
            Some(node_set) => nodes.push(node_set),
            None => {
                tracing::debug!("no node file for '{node_type}', using an empty node set");
                nodes.push(NodeSet::empty(node_type));
            }
        }
    }

    let mut edges = Vec::new();
    for key in &requested_edges {
        let loaded = edge_files
            .get(key)
            .and_then(|by_ext| preferred_file(by_ext))
            .map(|(format, path)| read_edges(key, format, path, options.representation))
            .transpose()?;
        match loaded {
            Some(edge_set) => edges.push(edge_set),
            None => tracing::debug!("no readable edge file for '{key}', skipping"),
        }
    }
    for key in &missing_pairs {
        tracing::debug!("no edge file for '{key}', using an empty edge set");
        let (first, second) = key.parts();
        edges.push(EdgeSet::empty(
            first,
            second,
            false,
            options.representation,
        ));
    }

    Network::from_parts(&options.root, Some(name.to_string()), nodes, edges)
}

/// Save a network under its own name.
pub fn save_graph(network: &Network, config: &StorageConfig) -> Result<(), PubNetError> {
    let name = network.name().ok_or_else(|| {
        PubNetError::Construction(
            "network has no name; pass one to save_graph_as or name the network".to_string(),
        )
    })?;
    let name = name.to_string();
    save_graph_as(network, config, &name)
}

/// Save a network's non-empty node and edge sets into the graph directory,
/// one file per set.
pub fn save_graph_as(
    network: &Network,
    config: &StorageConfig,
    name: &str,
) -> Result<(), PubNetError> {
    let dir = config.graph_dir(name);
    create_dir_all(&dir)?;
    let ext = config.format.ext();

    for node_set in network.node_sets().filter(|nodes| !nodes.is_empty()) {
        let path = dir.join(node_file_name(node_set.name(), ext));
        tracing::debug!("writing node set '{}' to {path:?}", node_set.name());
        match config.format {
            FileFormat::Tsv => tsv::write_nodes(node_set, &path)?,
            FileFormat::Json => {
                let writer = BufWriter::new(File::create(path)?);
                serde_json::to_writer(writer, node_set)?;
            }
        }
    }

    for edge_set in network.edge_sets().filter(|edges| !edges.is_empty()) {
        let path = dir.join(edge_file_name(&edge_set.key(), ext));
        tracing::debug!("writing edge set '{}' to {path:?}", edge_set.key());
        match config.format {
            FileFormat::Tsv => tsv::write_edges(edge_set, &path)?,
            FileFormat::Json => {
                let writer = BufWriter::new(File::create(path)?);
                serde_json::to_writer(writer, edge_set)?;
            }
        }
    }
    Ok(())
}
