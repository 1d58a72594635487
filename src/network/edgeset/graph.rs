//! Edge storage as an adjacency graph.

use once_cell::sync::OnceCell;
use petgraph::graph::{Graph, NodeIndex};
use std::collections::{BTreeMap, HashMap};

use crate::properties::{FeatureColumn, NodeId};

use super::{array::ArrayEdgeSet, EdgeSet};

/// Adjacency representation built on [petgraph]. Vertices carry node
/// identifiers; edge weights are row positions into the shared feature
/// columns, so features stay aligned with the flat row order.
///
/// The petgraph graph is always constructed `Directed`, whatever the logical
/// `directed` flag says. Treating the adjacency structure as directed keeps
/// the start ids in column 0 and the end ids in column 1; an undirected
/// adjacency layer would be free to flip them.
///
/// No feature precision is lost converting to or from this variant.
#[derive(Clone, Debug)]
pub struct GraphEdgeSet {
    pub(crate) start_type: String,
    pub(crate) end_type: String,
    pub(crate) directed: bool,
    pub(crate) graph: Graph<NodeId, usize>,
    pub(crate) node_lookup: HashMap<NodeId, NodeIndex>,
    pub(crate) features: BTreeMap<String, FeatureColumn>,
    pub(crate) array_cache: OnceCell<Box<ArrayEdgeSet>>,
    pub(crate) overlap_cache: OnceCell<Box<EdgeSet>>,
}

impl GraphEdgeSet {
    pub(crate) fn from_pairs<I>(
        start_type: String,
        end_type: String,
        directed: bool,
        pairs: I,
        features: BTreeMap<String, FeatureColumn>,
    ) -> Self
    where
        I: IntoIterator<Item = (NodeId, NodeId)>,
    {
        let mut graph = Graph::new();
        let mut node_lookup: HashMap<NodeId, NodeIndex> = HashMap::new();
        for (row, (start, end)) in pairs.into_iter().enumerate() {
            let start_idx = *node_lookup
                .entry(start)
                .or_insert_with(|| graph.add_node(start));
            let end_idx = *node_lookup.entry(end).or_insert_with(|| graph.add_node(end));
            graph.add_edge(start_idx, end_idx, row);
        }
        GraphEdgeSet {
            start_type,
            end_type,
            directed,
            graph,
            node_lookup,
            features,
            array_cache: OnceCell::new(),
            overlap_cache: OnceCell::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.edge_count() == 0
    }

    /// Whether the given id participates in any edge.
    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node_lookup.contains_key(&id)
    }

    /// Row pairs in stored row order. Edge indices are assigned in insertion
    /// order and this set never removes edges in place, so the order is
    /// stable and restartable.
    pub(crate) fn pair_iter(&self) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        self.graph
            .raw_edges()
            .iter()
            .map(|edge| (self.graph[edge.source()], self.graph[edge.target()]))
    }

    /// A new graph edge set holding the given rows, in the given order, with
    /// features gathered alongside.
    pub(crate) fn keep_rows(&self, rows: &[usize]) -> GraphEdgeSet {
        let all: Vec<(NodeId, NodeId)> = self.pair_iter().collect();
        GraphEdgeSet::from_pairs(
            self.start_type.clone(),
            self.end_type.clone(),
            self.directed,
            rows.iter().map(|row| all[*row]),
            self.features
                .iter()
                .map(|(name, column)| (name.clone(), column.gather(rows)))
                .collect(),
        )
    }

    pub(crate) fn to_array(&self) -> ArrayEdgeSet {
        let (starts, ends) = self.pair_iter().unzip();
        ArrayEdgeSet::new(
            self.start_type.clone(),
            self.end_type.clone(),
            self.directed,
            starts,
            ends,
            self.features.clone(),
        )
    }

    /// The flat-array view of this edge set, converted on first use.
    pub(crate) fn array(&self) -> &ArrayEdgeSet {
        self.array_cache.get_or_init(|| Box::new(self.to_array()))
    }
}
