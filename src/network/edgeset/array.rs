//! Edge storage as flat parallel id arrays.

use once_cell::sync::OnceCell;
use std::collections::BTreeMap;

use crate::properties::{FeatureColumn, NodeId};

use super::{graph::GraphEdgeSet, EdgeSet};

/// Dense representation: two parallel id columns plus a side table of feature
/// columns aligned to the same rows. The cheapest backend for row scans and
/// filtering; the adjacency view is derived lazily when first needed and
/// cached for the lifetime of this instance.
///
/// No feature precision is lost converting to or from this variant.
#[derive(Clone, Debug)]
pub struct ArrayEdgeSet {
    pub(crate) start_type: String,
    pub(crate) end_type: String,
    pub(crate) directed: bool,
    pub(crate) starts: Vec<NodeId>,
    pub(crate) ends: Vec<NodeId>,
    pub(crate) features: BTreeMap<String, FeatureColumn>,
    pub(crate) graph_cache: OnceCell<Box<GraphEdgeSet>>,
    pub(crate) overlap_cache: OnceCell<Box<EdgeSet>>,
}

impl ArrayEdgeSet {
    pub(crate) fn new(
        start_type: String,
        end_type: String,
        directed: bool,
        starts: Vec<NodeId>,
        ends: Vec<NodeId>,
        features: BTreeMap<String, FeatureColumn>,
    ) -> Self {
        debug_assert_eq!(starts.len(), ends.len());
        ArrayEdgeSet {
            start_type,
            end_type,
            directed,
            starts,
            ends,
            features,
            graph_cache: OnceCell::new(),
            overlap_cache: OnceCell::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// A new array edge set holding the given rows, in the given order, with
    /// features gathered alongside.
    pub(crate) fn keep_rows(&self, rows: &[usize]) -> ArrayEdgeSet {
        ArrayEdgeSet::new(
            self.start_type.clone(),
            self.end_type.clone(),
            self.directed,
            rows.iter().map(|row| self.starts[*row]).collect(),
            rows.iter().map(|row| self.ends[*row]).collect(),
            self.features
                .iter()
                .map(|(name, column)| (name.clone(), column.gather(rows)))
                .collect(),
        )
    }

    pub(crate) fn to_graph(&self) -> GraphEdgeSet {
        GraphEdgeSet::from_pairs(
            self.start_type.clone(),
            self.end_type.clone(),
            self.directed,
            self.starts.iter().copied().zip(self.ends.iter().copied()),
            self.features.clone(),
        )
    }

    /// The adjacency view of this edge set, converted on first use.
    pub(crate) fn graph(&self) -> &GraphEdgeSet {
        self.graph_cache.get_or_init(|| Box::new(self.to_graph()))
    }
}
