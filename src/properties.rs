/// [crate::properties] contains the basic building blocks for assembling and
/// manipulating [crate::network::Network]s and associated structures.
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    fmt::{Display, Formatter},
    str::FromStr,
};

use crate::error::PubNetError;

/// Identifier referencing a row of a [crate::network::NodeSet]. Identifiers
/// are dense but not necessarily contiguous; [crate::network::repack]
/// renumbers them onto `[0, n)`.
pub type NodeId = i64;

/// Feature column name carrying the overlap score produced by
/// [crate::network::EdgeSet::overlap].
pub const FEATURE_OVERLAP: &str = "overlap";

/// Feature column name carrying the shortest-path distance produced by
/// [crate::network::EdgeSet::similarity].
pub const FEATURE_DISTANCE: &str = "distance";

/// The concrete storage backing an [crate::network::EdgeSet]. New backends
/// are added here, behind the same contract, never by special-casing callers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Representation {
    /// Flat parallel id arrays with a side table of feature columns.
    #[default]
    Array,
    /// Adjacency structure with vertex ids and per-edge row pointers.
    Graph,
}

impl Display for Representation {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            Representation::Array => write!(f, "array"),
            Representation::Graph => write!(f, "graph"),
        }
    }
}

/// Set operation applied by [crate::network::EdgeSet::reduce].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SetOp {
    Union,
    Intersection,
    Difference,
}

/// How [crate::network::EdgeSet::reduce] resolves rows whose feature values
/// disagree between the two inputs. Without a resolution the reduce fails
/// with [PubNetError::FeatureConflict].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    KeepLeft,
    KeepRight,
}

/// Whether composition retains `(a, a)` rows when the composed pair starts
/// and ends on the same node type. Consulted only in that case; there is no
/// default.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelfPairs {
    Keep,
    Suppress,
}

/// Scoring metric for [crate::network::EdgeSet::overlap].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverlapMetric {
    /// Size of the shared-neighbor set (integer feature).
    Count,
    /// Intersection over union of the two neighbor sets (float feature).
    Jaccard,
}

/// Scalar type of a feature column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureKind {
    Int,
    Float,
    Text,
}

impl FeatureKind {
    /// Short tag used in stored column headers, e.g. `weight:float`.
    pub fn tag(&self) -> &'static str {
        match self {
            FeatureKind::Int => "int",
            FeatureKind::Float => "float",
            FeatureKind::Text => "string",
        }
    }

    pub fn from_tag(tag: &str) -> Option<FeatureKind> {
        match tag {
            "int" => Some(FeatureKind::Int),
            "float" => Some(FeatureKind::Float),
            "string" => Some(FeatureKind::Text),
            _ => None,
        }
    }
}

/// A single feature cell.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FeatureValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FeatureValue {
    pub fn kind(&self) -> FeatureKind {
        match self {
            FeatureValue::Int(_) => FeatureKind::Int,
            FeatureValue::Float(_) => FeatureKind::Float,
            FeatureValue::Text(_) => FeatureKind::Text,
        }
    }
}

impl Display for FeatureValue {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            FeatureValue::Int(v) => write!(f, "{v}"),
            FeatureValue::Float(v) => write!(f, "{v}"),
            FeatureValue::Text(v) => write!(f, "{v}"),
        }
    }
}

/// A typed column of per-row feature values, aligned to the id rows of the
/// owning node or edge set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum FeatureColumn {
    Int(Vec<i64>),
    Float(Vec<f64>),
    Text(Vec<String>),
}

impl FeatureColumn {
    pub fn empty(kind: FeatureKind) -> Self {
        match kind {
            FeatureKind::Int => FeatureColumn::Int(Vec::new()),
            FeatureKind::Float => FeatureColumn::Float(Vec::new()),
            FeatureKind::Text => FeatureColumn::Text(Vec::new()),
        }
    }

    pub fn kind(&self) -> FeatureKind {
        match self {
            FeatureColumn::Int(_) => FeatureKind::Int,
            FeatureColumn::Float(_) => FeatureKind::Float,
            FeatureColumn::Text(_) => FeatureKind::Text,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            FeatureColumn::Int(v) => v.len(),
            FeatureColumn::Float(v) => v.len(),
            FeatureColumn::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn value(&self, row: usize) -> Option<FeatureValue> {
        match self {
            FeatureColumn::Int(v) => v.get(row).map(|x| FeatureValue::Int(*x)),
            FeatureColumn::Float(v) => v.get(row).map(|x| FeatureValue::Float(*x)),
            FeatureColumn::Text(v) => v.get(row).map(|x| FeatureValue::Text(x.clone())),
        }
    }

    pub fn push(&mut self, value: FeatureValue) -> Result<(), PubNetError> {
        match (self, value) {
            (FeatureColumn::Int(v), FeatureValue::Int(x)) => v.push(x),
            (FeatureColumn::Float(v), FeatureValue::Float(x)) => v.push(x),
            (FeatureColumn::Text(v), FeatureValue::Text(x)) => v.push(x),
            (col, value) => {
                return Err(PubNetError::Construction(format!(
                    "cannot push {:?} value into {:?} column",
                    value.kind(),
                    col.kind()
                )))
            }
        }
        Ok(())
    }

    /// Parse a raw stored cell according to the column's type and append it.
    pub fn push_parse(&mut self, raw: &str) -> Result<(), PubNetError> {
        match self {
            FeatureColumn::Int(v) => v.push(raw.trim().parse::<i64>().map_err(|e| {
                PubNetError::MalformedRecord(format!("expected integer, got '{raw}': {e}"))
            })?),
            FeatureColumn::Float(v) => v.push(raw.trim().parse::<f64>().map_err(|e| {
                PubNetError::MalformedRecord(format!("expected float, got '{raw}': {e}"))
            })?),
            FeatureColumn::Text(v) => v.push(raw.to_string()),
        }
        Ok(())
    }

    /// A new column containing the given rows, in the given order.
    pub fn gather(&self, rows: &[usize]) -> FeatureColumn {
        match self {
            FeatureColumn::Int(v) => {
                FeatureColumn::Int(rows.iter().map(|r| v[*r]).collect())
            }
            FeatureColumn::Float(v) => {
                FeatureColumn::Float(rows.iter().map(|r| v[*r]).collect())
            }
            FeatureColumn::Text(v) => {
                FeatureColumn::Text(rows.iter().map(|r| v[*r].clone()).collect())
            }
        }
    }
}

/// Canonical dictionary key for the pair of node types an edge set connects.
///
/// The pair is unordered: `EdgeKey::new("Publication", "Author")` and
/// `EdgeKey::new("Author", "Publication")` are the same key. Column
/// orientation (which type is the start) lives on the edge set itself.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeKey {
    first: String,
    second: String,
}

pub const EDGE_KEY_DELIM: &str = "-";

impl EdgeKey {
    pub fn new(node_1: &str, node_2: &str) -> Self {
        if node_1 <= node_2 {
            EdgeKey {
                first: node_1.to_string(),
                second: node_2.to_string(),
            }
        } else {
            EdgeKey {
                first: node_2.to_string(),
                second: node_1.to_string(),
            }
        }
    }

    pub fn parts(&self) -> (&str, &str) {
        (&self.first, &self.second)
    }

    pub fn contains(&self, node: &str) -> bool {
        self.first == node || self.second == node
    }

    /// The other end of the pair, or `None` when `node` is not part of the
    /// key. For a self-pair key both ends are the same type.
    pub fn other(&self, node: &str) -> Option<&str> {
        if self.first == node {
            Some(&self.second)
        } else if self.second == node {
            Some(&self.first)
        } else {
            None
        }
    }

    pub fn is_self_pair(&self) -> bool {
        self.first == self.second
    }
}

impl Ord for EdgeKey {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.first, &self.second).cmp(&(&other.first, &other.second))
    }
}

impl PartialOrd for EdgeKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Display for EdgeKey {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}{}{}", self.first, EDGE_KEY_DELIM, self.second)
    }
}

impl FromStr for EdgeKey {
    type Err = PubNetError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = key.split(EDGE_KEY_DELIM).collect();
        if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() {
            return Err(PubNetError::Construction(format!(
                "'{key}' has the wrong number of parts; a key has exactly one '{EDGE_KEY_DELIM}'"
            )));
        }
        Ok(EdgeKey::new(parts[0], parts[1]))
    }
}

/// Name given to the end type of a composed edge set. The derived relation is
/// not interchangeable with a direct relation to the original end type, so it
/// gets its own alias, e.g. composing through Author onto Publication yields
/// `PublicationViaAuthor`.
pub fn compose_alias(end_type: &str, middle_type: &str) -> String {
    format!("{end_type}Via{middle_type}")
}
