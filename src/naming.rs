//! Naming conventions shared by the storage layer and the selector syntax.
//!
//! Graphs are stored as directories with one file per node set, named
//! `<Type>_nodes.<ext>`, and one file per edge set, named
//! `<TypeA>_<TypeB>_edges.<ext>`. The order types appear in an edge file name
//! does not matter; column orientation is declared by the header inside the
//! file, Neo4j style: `:START_ID(TypeA)` / `:END_ID(TypeB)`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{
    error::PubNetError,
    properties::{EdgeKey, FeatureKind},
};

static NODE_PATH_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<node>\w+)_nodes\.(?P<ext>[\w.]+)$").expect("static pattern"));

static EDGE_PATH_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<n1>\w+)_(?P<n2>\w+)_edges\.(?P<ext>[\w.]+)$").expect("static pattern")
});

static ID_LABEL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<id>\w+):ID\((?P<namespace>\w+)\)$").expect("static pattern"));

static EDGE_ID_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^:(?P<which>START|END)_ID\((?P<namespace>\w+)\)$").expect("static pattern"));

/// Marker token appended to an edge header when the relation is directed.
/// Directedness is an explicit input; it is never inferred from the ids.
pub const DIRECTED_MARKER: &str = ":DIRECTED";

pub fn node_file_name(node: &str, ext: &str) -> String {
    format!("{node}_nodes.{ext}")
}

pub fn edge_file_name(key: &EdgeKey, ext: &str) -> String {
    let (n1, n2) = key.parts();
    format!("{n1}_{n2}_edges.{ext}")
}

/// Split a node file name into its type name and extension. `None` when the
/// name does not follow the convention.
pub fn node_file_parts(file_name: &str) -> Option<(String, String)> {
    let caps = NODE_PATH_REGEX.captures(file_name)?;
    Some((caps["node"].to_string(), caps["ext"].to_string()))
}

/// Split an edge file name into its type-pair key and extension.
pub fn edge_file_parts(file_name: &str) -> Option<(EdgeKey, String)> {
    let caps = EDGE_PATH_REGEX.captures(file_name)?;
    Some((EdgeKey::new(&caps["n1"], &caps["n2"]), caps["ext"].to_string()))
}

/// Label for a node file's id column, e.g. `id:ID(Publication)`.
pub fn node_id_label(id: &str, namespace: &str) -> String {
    format!("{id}:ID({namespace})")
}

/// Parse a node id label back into `(id, namespace)`.
pub fn node_id_label_parts(label: &str) -> Result<(String, String), PubNetError> {
    let caps = ID_LABEL_REGEX.captures(label.trim()).ok_or_else(|| {
        PubNetError::MalformedRecord(format!("'{label}' does not match the id label convention"))
    })?;
    Ok((caps["id"].to_string(), caps["namespace"].to_string()))
}

/// Label for a stored feature column, e.g. `weight:float`. Columns without a
/// type tag are read back as text.
pub fn feature_label(name: &str, kind: FeatureKind) -> String {
    format!("{}:{}", name, kind.tag())
}

pub(crate) fn feature_label_parts(label: &str) -> (String, FeatureKind) {
    match label.rsplit_once(':') {
        Some((name, tag)) => match FeatureKind::from_tag(tag) {
            Some(kind) => (name.to_string(), kind),
            None => (label.to_string(), FeatureKind::Text),
        },
        None => (label.to_string(), FeatureKind::Text),
    }
}

/// Header line for an edge file.
pub fn edge_header(
    start_type: &str,
    end_type: &str,
    features: &[(String, FeatureKind)],
    directed: bool,
) -> String {
    let mut columns = vec![
        format!(":START_ID({start_type})"),
        format!(":END_ID({end_type})"),
    ];
    for (name, kind) in features {
        columns.push(feature_label(name, *kind));
    }
    if directed {
        columns.push(DIRECTED_MARKER.to_string());
    }
    columns.join("\t")
}

/// Parsed contents of an edge file header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeHeader {
    pub start_type: String,
    pub end_type: String,
    pub features: Vec<(String, FeatureKind)>,
    /// True when the first column holds the end ids (columns stored flipped).
    pub reverse: bool,
    pub directed: bool,
}

pub fn edge_header_parts(header: &str) -> Result<EdgeHeader, PubNetError> {
    let mut start_type = None;
    let mut end_type = None;
    let mut features = Vec::new();
    let mut reverse = false;
    let mut directed = false;

    for (position, column) in header.trim_end_matches(['\r', '\n']).split('\t').enumerate() {
        if column == DIRECTED_MARKER {
            directed = true;
        } else if let Some(caps) = EDGE_ID_REGEX.captures(column) {
            let namespace = caps["namespace"].to_string();
            if &caps["which"] == "START" {
                start_type = Some(namespace);
            } else {
                if position == 0 {
                    reverse = true;
                }
                end_type = Some(namespace);
            }
        } else {
            features.push(feature_label_parts(column));
        }
    }

    match (start_type, end_type) {
        (Some(start_type), Some(end_type)) => Ok(EdgeHeader {
            start_type,
            end_type,
            features,
            reverse,
            directed,
        }),
        _ => Err(PubNetError::MalformedRecord(format!(
            "edge header '{header}' is missing a START_ID or END_ID column"
        ))),
    }
}

/// Selects edge sets by type pair, with an optional one-sided wildcard.
///
/// `"TypeA-TypeB"` names one pair; `"Type*"` names every pair incident to
/// `Type`; `"*"` names everything. Resolution is deterministic: matching keys
/// come back sorted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EdgeSelector {
    All,
    Pair(EdgeKey),
    Incident(String),
}

impl EdgeSelector {
    pub fn parse(raw: &str) -> Result<Self, PubNetError> {
        let raw = raw.trim();
        if raw == "*" {
            return Ok(EdgeSelector::All);
        }
        if let Some(node) = raw.strip_suffix('*') {
            if node.is_empty() || node.contains('-') {
                return Err(PubNetError::Construction(format!(
                    "'{raw}' is not a valid edge selector"
                )));
            }
            return Ok(EdgeSelector::Incident(node.to_string()));
        }
        Ok(EdgeSelector::Pair(raw.parse()?))
    }

    /// The fixed, ordered list of keys from `available` this selector names.
    pub fn resolve<'a, I>(&self, available: I) -> Vec<EdgeKey>
    where
        I: IntoIterator<Item = &'a EdgeKey>,
    {
        let mut matches: Vec<EdgeKey> = available
            .into_iter()
            .filter(|key| match self {
                EdgeSelector::All => true,
                EdgeSelector::Pair(pair) => *key == pair,
                EdgeSelector::Incident(node) => key.contains(node),
            })
            .cloned()
            .collect();
        matches.sort();
        matches.dedup();
        matches
    }
}
