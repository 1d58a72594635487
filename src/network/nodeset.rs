//! Typed tables of same-kind entities, keyed by unique identifier.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::{
    error::PubNetError,
    properties::{FeatureColumn, FeatureValue, NodeId},
};

use super::indexer::Indexer;

/// A table of entities of one kind: a unique integer identifier column plus
/// zero or more feature columns aligned to the id rows.
///
/// Node sets are immutable value objects; every transformation produces a new
/// instance. An empty set is a legal stand-in for missing source data.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(into = "NodeSetData", try_from = "NodeSetData")]
pub struct NodeSet {
    name: String,
    ids: Vec<NodeId>,
    features: BTreeMap<String, FeatureColumn>,
    index: Indexer,
}

/// Serialized shape of a [NodeSet]; the id index is rebuilt on load.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct NodeSetData {
    name: String,
    ids: Vec<NodeId>,
    features: BTreeMap<String, FeatureColumn>,
}

impl From<NodeSet> for NodeSetData {
    fn from(nodes: NodeSet) -> Self {
        NodeSetData {
            name: nodes.name,
            ids: nodes.ids,
            features: nodes.features,
        }
    }
}

impl TryFrom<NodeSetData> for NodeSet {
    type Error = PubNetError;

    fn try_from(data: NodeSetData) -> Result<Self, Self::Error> {
        NodeSet::new(data.name, data.ids, data.features)
    }
}

impl NodeSet {
    /// Construct a node set, verifying identifier uniqueness and feature
    /// column alignment.
    pub fn new(
        name: String,
        ids: Vec<NodeId>,
        features: BTreeMap<String, FeatureColumn>,
    ) -> Result<Self, PubNetError> {
        let index = Indexer::from_ids(&ids)
            .map_err(|e| PubNetError::Construction(format!("node set '{name}': {e}")))?;
        for (feature, column) in &features {
            if column.len() != ids.len() {
                return Err(PubNetError::Construction(format!(
                    "node set '{name}': feature '{feature}' has {} rows, expected {}",
                    column.len(),
                    ids.len()
                )));
            }
        }
        Ok(NodeSet {
            name,
            ids,
            features,
            index,
        })
    }

    /// Internal constructor for callers that produced the columns themselves
    /// and already guarantee the invariants (repack, filtering).
    pub(crate) fn from_columns_unchecked(
        name: String,
        ids: Vec<NodeId>,
        features: BTreeMap<String, FeatureColumn>,
    ) -> Self {
        let index = Indexer::from_ids(&ids).expect("caller guarantees unique identifiers");
        NodeSet {
            name,
            ids,
            features,
            index,
        }
    }

    pub fn empty(name: &str) -> Self {
        NodeSet {
            name: name.to_string(),
            ids: Vec::new(),
            features: BTreeMap::new(),
            index: Indexer::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn ids(&self) -> &[NodeId] {
        &self.ids
    }

    pub fn id_set(&self) -> BTreeSet<NodeId> {
        self.ids.iter().copied().collect()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.index.contains(id)
    }

    pub fn position_of(&self, id: NodeId) -> Option<usize> {
        self.index.position_of(id)
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.features.keys().map(String::as_str).collect()
    }

    pub fn features(&self) -> &BTreeMap<String, FeatureColumn> {
        &self.features
    }

    pub(crate) fn features_cloned(&self) -> BTreeMap<String, FeatureColumn> {
        self.features.clone()
    }

    pub fn feature(&self, name: &str) -> Result<&FeatureColumn, PubNetError> {
        self.features
            .get(name)
            .ok_or_else(|| PubNetError::UnknownFeature {
                owner: format!("node set '{}'", self.name),
                feature: name.to_string(),
            })
    }

    /// The feature cell for one identifier.
    pub fn feature_value(&self, name: &str, id: NodeId) -> Result<FeatureValue, PubNetError> {
        let column = self.feature(name)?;
        let row = self.position_of(id).ok_or_else(|| {
            PubNetError::NotFound(format!("id {id} not in node set '{}'", self.name))
        })?;
        column.value(row).ok_or_else(|| {
            PubNetError::Construction(format!(
                "feature '{name}' shorter than id column in node set '{}'",
                self.name
            ))
        })
    }

    /// A copy of this node set with one feature column added or replaced.
    pub fn with_feature(&self, name: &str, column: FeatureColumn) -> Result<NodeSet, PubNetError> {
        if column.len() != self.ids.len() {
            return Err(PubNetError::Construction(format!(
                "node set '{}': feature '{name}' has {} rows, expected {}",
                self.name,
                column.len(),
                self.ids.len()
            )));
        }
        let mut features = self.features.clone();
        features.insert(name.to_string(), column);
        Ok(NodeSet {
            name: self.name.clone(),
            ids: self.ids.clone(),
            features,
            index: self.index.clone(),
        })
    }

    /// Restrict to the identifiers in `keep`, preserving row order. Ids in
    /// `keep` that are not present are ignored.
    pub fn restrict(&self, keep: &BTreeSet<NodeId>) -> NodeSet {
        let rows: Vec<usize> = self
            .ids
            .iter()
            .enumerate()
            .filter_map(|(row, id)| keep.contains(id).then_some(row))
            .collect();
        let ids: Vec<NodeId> = rows.iter().map(|row| self.ids[*row]).collect();
        let features: BTreeMap<String, FeatureColumn> = self
            .features
            .iter()
            .map(|(name, column)| (name.clone(), column.gather(&rows)))
            .collect();
        NodeSet::from_columns_unchecked(self.name.clone(), ids, features)
    }

    /// A copy of this node set under a new type name. Used when a composed
    /// edge set introduces an alias for an existing type.
    pub fn renamed(&self, name: &str) -> NodeSet {
        let mut out = self.clone();
        out.name = name.to_string();
        out
    }

    /// Identifiers whose cell in `feature` equals `value`.
    pub fn ids_matching(
        &self,
        feature: &str,
        value: &FeatureValue,
    ) -> Result<Vec<NodeId>, PubNetError> {
        let column = self.feature(feature)?;
        Ok(self
            .ids
            .iter()
            .enumerate()
            .filter_map(|(row, id)| (column.value(row).as_ref() == Some(value)).then_some(*id))
            .collect())
    }
}

impl PartialEq for NodeSet {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.ids == other.ids && self.features == other.features
    }
}
