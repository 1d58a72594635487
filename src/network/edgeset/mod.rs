//! Relations between two node types, polymorphic over storage backend.
//!
//! An [EdgeSet] is a closed set of variants behind one capability contract:
//! - [array::ArrayEdgeSet]: flat parallel id arrays with a feature side table
//! - [graph::GraphEdgeSet]: petgraph adjacency structure
//!
//! Both variants produce identical `(start_id, end_id)` pairs, feature values
//! and directedness through the shared operations; only their internal
//! storage differs. New backends are added as variants here, never by
//! special-casing callers.

mod array;
mod graph;

pub use array::ArrayEdgeSet;
pub use graph::GraphEdgeSet;

use petgraph::graph::{Graph, NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt::{Display, Formatter};

use crate::{
    error::PubNetError,
    properties::{
        compose_alias, EdgeKey, FeatureColumn, FeatureValue, NodeId, OverlapMetric,
        Representation, Resolution, SelfPairs, SetOp, FEATURE_DISTANCE, FEATURE_OVERLAP,
    },
};

/// A relation between two node types.
///
/// Edge sets are immutable value objects: every transformation returns a new
/// instance in the same backend variant as its receiver. The `directed` and
/// `bipartite` flags are declared at construction; id equality of start and
/// end columns is never used to infer either.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(into = "EdgeSetData", try_from = "EdgeSetData")]
pub enum EdgeSet {
    Array(ArrayEdgeSet),
    Graph(GraphEdgeSet),
}

/// Serialized, representation-independent shape of an [EdgeSet].
#[derive(Clone, Debug, Serialize, Deserialize)]
struct EdgeSetData {
    start_type: String,
    end_type: String,
    directed: bool,
    representation: Representation,
    starts: Vec<NodeId>,
    ends: Vec<NodeId>,
    features: BTreeMap<String, FeatureColumn>,
}

impl From<EdgeSet> for EdgeSetData {
    fn from(edges: EdgeSet) -> Self {
        let (starts, ends) = edges.rows().unzip();
        EdgeSetData {
            start_type: edges.start_type().to_string(),
            end_type: edges.end_type().to_string(),
            directed: edges.is_directed(),
            representation: edges.representation(),
            starts,
            ends,
            features: edges.features().clone(),
        }
    }
}

impl TryFrom<EdgeSetData> for EdgeSet {
    type Error = PubNetError;

    fn try_from(data: EdgeSetData) -> Result<Self, Self::Error> {
        EdgeSet::from_columns(
            &data.start_type,
            &data.end_type,
            data.directed,
            data.starts,
            data.ends,
            data.features,
            data.representation,
        )
    }
}

/// Lazy, restartable row cursor over an edge set's `(start_id, end_id)`
/// pairs, in the backend's stable row order.
pub enum Rows<'a> {
    Array(std::iter::Zip<std::slice::Iter<'a, NodeId>, std::slice::Iter<'a, NodeId>>),
    Graph {
        graph: &'a Graph<NodeId, usize>,
        edges: std::slice::Iter<'a, petgraph::graph::Edge<usize>>,
    },
}

impl Iterator for Rows<'_> {
    type Item = (NodeId, NodeId);

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            Rows::Array(iter) => iter.next().map(|(start, end)| (*start, *end)),
            Rows::Graph { graph, edges } => edges
                .next()
                .map(|edge| (graph[edge.source()], graph[edge.target()])),
        }
    }
}

fn build(
    representation: Representation,
    start_type: String,
    end_type: String,
    directed: bool,
    starts: Vec<NodeId>,
    ends: Vec<NodeId>,
    features: BTreeMap<String, FeatureColumn>,
) -> EdgeSet {
    match representation {
        Representation::Array => EdgeSet::Array(ArrayEdgeSet::new(
            start_type, end_type, directed, starts, ends, features,
        )),
        Representation::Graph => EdgeSet::Graph(GraphEdgeSet::from_pairs(
            start_type,
            end_type,
            directed,
            starts.into_iter().zip(ends),
            features,
        )),
    }
}

impl EdgeSet {
    /// Construct an edge set from row pairs, without features.
    pub fn from_pairs<I>(
        start_type: &str,
        end_type: &str,
        directed: bool,
        pairs: I,
        representation: Representation,
    ) -> EdgeSet
    where
        I: IntoIterator<Item = (NodeId, NodeId)>,
    {
        let (starts, ends) = pairs.into_iter().unzip();
        build(
            representation,
            start_type.to_string(),
            end_type.to_string(),
            directed,
            starts,
            ends,
            BTreeMap::new(),
        )
    }

    /// Construct an edge set from id columns and aligned feature columns,
    /// verifying alignment.
    pub fn from_columns(
        start_type: &str,
        end_type: &str,
        directed: bool,
        starts: Vec<NodeId>,
        ends: Vec<NodeId>,
        features: BTreeMap<String, FeatureColumn>,
        representation: Representation,
    ) -> Result<EdgeSet, PubNetError> {
        if starts.len() != ends.len() {
            return Err(PubNetError::Construction(format!(
                "edge set ({start_type}, {end_type}): {} start ids but {} end ids",
                starts.len(),
                ends.len()
            )));
        }
        for (feature, column) in &features {
            if column.len() != starts.len() {
                return Err(PubNetError::Construction(format!(
                    "edge set ({start_type}, {end_type}): feature '{feature}' has {} rows, expected {}",
                    column.len(),
                    starts.len()
                )));
            }
        }
        Ok(build(
            representation,
            start_type.to_string(),
            end_type.to_string(),
            directed,
            starts,
            ends,
            features,
        ))
    }

    pub fn empty(
        start_type: &str,
        end_type: &str,
        directed: bool,
        representation: Representation,
    ) -> EdgeSet {
        EdgeSet::from_pairs(start_type, end_type, directed, Vec::new(), representation)
    }

    pub fn start_type(&self) -> &str {
        match self {
            EdgeSet::Array(edges) => &edges.start_type,
            EdgeSet::Graph(edges) => &edges.start_type,
        }
    }

    pub fn end_type(&self) -> &str {
        match self {
            EdgeSet::Array(edges) => &edges.end_type,
            EdgeSet::Graph(edges) => &edges.end_type,
        }
    }

    pub fn key(&self) -> EdgeKey {
        EdgeKey::new(self.start_type(), self.end_type())
    }

    pub fn is_directed(&self) -> bool {
        match self {
            EdgeSet::Array(edges) => edges.directed,
            EdgeSet::Graph(edges) => edges.directed,
        }
    }

    /// True when the relation connects two distinct node types. Declared by
    /// the type pair at construction, never derived from the id columns.
    pub fn is_bipartite(&self) -> bool {
        self.start_type() != self.end_type()
    }

    pub fn representation(&self) -> Representation {
        match self {
            EdgeSet::Array(_) => Representation::Array,
            EdgeSet::Graph(_) => Representation::Graph,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            EdgeSet::Array(edges) => edges.len(),
            EdgeSet::Graph(edges) => edges.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lazy cursor over `(start_id, end_id)` pairs in stable row order.
    pub fn rows(&self) -> Rows<'_> {
        match self {
            EdgeSet::Array(edges) => Rows::Array(edges.starts.iter().zip(edges.ends.iter())),
            EdgeSet::Graph(edges) => Rows::Graph {
                graph: &edges.graph,
                edges: edges.graph.raw_edges().iter(),
            },
        }
    }

    /// The id column belonging to `node_type`. For a self-pair relation the
    /// start column answers first.
    pub fn column(&self, node_type: &str) -> Result<Vec<NodeId>, PubNetError> {
        if node_type == self.start_type() {
            Ok(self.rows().map(|(start, _)| start).collect())
        } else if node_type == self.end_type() {
            Ok(self.rows().map(|(_, end)| end).collect())
        } else {
            Err(PubNetError::TypeMismatch(format!(
                "'{node_type}' is not one of '{}' or '{}'",
                self.start_type(),
                self.end_type()
            )))
        }
    }

    pub fn features(&self) -> &BTreeMap<String, FeatureColumn> {
        match self {
            EdgeSet::Array(edges) => &edges.features,
            EdgeSet::Graph(edges) => &edges.features,
        }
    }

    pub fn feature_names(&self) -> Vec<&str> {
        self.features().keys().map(String::as_str).collect()
    }

    pub fn feature(&self, name: &str) -> Result<&FeatureColumn, PubNetError> {
        self.features()
            .get(name)
            .ok_or_else(|| PubNetError::UnknownFeature {
                owner: format!("edge set '{}'", self.key()),
                feature: name.to_string(),
            })
    }

    /// A copy of this edge set with one feature column added or replaced.
    pub fn with_feature(&self, name: &str, column: FeatureColumn) -> Result<EdgeSet, PubNetError> {
        if column.len() != self.len() {
            return Err(PubNetError::Construction(format!(
                "edge set '{}': feature '{name}' has {} rows, expected {}",
                self.key(),
                column.len(),
                self.len()
            )));
        }
        let (starts, ends) = self.rows().unzip();
        let mut features = self.features().clone();
        features.insert(name.to_string(), column);
        Ok(build(
            self.representation(),
            self.start_type().to_string(),
            self.end_type().to_string(),
            self.is_directed(),
            starts,
            ends,
            features,
        ))
    }

    fn keep_rows(&self, rows: &[usize]) -> EdgeSet {
        match self {
            EdgeSet::Array(edges) => EdgeSet::Array(edges.keep_rows(rows)),
            EdgeSet::Graph(edges) => EdgeSet::Graph(edges.keep_rows(rows)),
        }
    }

    /// Restrict to rows whose start id is in `by_start` (when given) and end
    /// id is in `by_end` (when given). Features follow the surviving rows.
    /// Passing neither set is a no-op copy.
    pub fn filter(
        &self,
        by_start: Option<&BTreeSet<NodeId>>,
        by_end: Option<&BTreeSet<NodeId>>,
    ) -> EdgeSet {
        if by_start.is_none() && by_end.is_none() {
            return self.clone();
        }
        let rows: Vec<usize> = self
            .rows()
            .enumerate()
            .filter_map(|(row, (start, end))| {
                let keep = by_start.map_or(true, |ids| ids.contains(&start))
                    && by_end.map_or(true, |ids| ids.contains(&end));
                keep.then_some(row)
            })
            .collect();
        self.keep_rows(&rows)
    }

    /// An equivalent edge set in the requested backend variant. Conversion is
    /// computed lazily on the source instance and cached there, so repeated
    /// requests do not pay for it twice.
    pub fn convert_to(&self, representation: Representation) -> EdgeSet {
        match (self, representation) {
            (EdgeSet::Array(_), Representation::Array) => self.clone(),
            (EdgeSet::Graph(_), Representation::Graph) => self.clone(),
            (EdgeSet::Array(edges), Representation::Graph) => {
                EdgeSet::Graph(edges.graph().clone())
            }
            (EdgeSet::Graph(edges), Representation::Array) => {
                EdgeSet::Array(edges.array().clone())
            }
        }
    }

    /// The flat-array view, converting and caching when this set is stored as
    /// a graph.
    pub fn as_array(&self) -> &ArrayEdgeSet {
        match self {
            EdgeSet::Array(edges) => edges,
            EdgeSet::Graph(edges) => edges.array(),
        }
    }

    /// The adjacency view, converting and caching when this set is stored as
    /// arrays.
    pub fn as_graph(&self) -> &GraphEdgeSet {
        match self {
            EdgeSet::Graph(edges) => edges,
            EdgeSet::Array(edges) => edges.graph(),
        }
    }

    /// Inner join on the shared middle type: for `self` over `(A, B)` and
    /// `other` over `(B, C)`, the result relates `(a, c)` for every `b` with
    /// `(a, b)` here and `(b, c)` there. Nodes with no path produce no row,
    /// and joined duplicates are collapsed.
    ///
    /// The result's end type is the alias `{C}Via{B}`: the derived relation
    /// is not interchangeable with a direct `(A, C)` relation in later joins.
    /// `self_pairs` is consulted only when `A` and `C` name the same type, to
    /// decide whether `(a, a)` rows are retained.
    pub fn compose(&self, other: &EdgeSet, self_pairs: SelfPairs) -> Result<EdgeSet, PubNetError> {
        let middle = self.end_type();
        if middle != other.start_type() {
            return Err(PubNetError::TypeMismatch(format!(
                "cannot compose ({}, {}) with ({}, {}): end type of the first must be the start type of the second",
                self.start_type(),
                self.end_type(),
                other.start_type(),
                other.end_type()
            )));
        }
        let mut by_middle: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        for (b, c) in other.rows() {
            by_middle.entry(b).or_default().push(c);
        }
        let suppress =
            self.start_type() == other.end_type() && self_pairs == SelfPairs::Suppress;

        let mut seen: BTreeSet<(NodeId, NodeId)> = BTreeSet::new();
        let mut starts = Vec::new();
        let mut ends = Vec::new();
        let mut collapsed = 0usize;
        for (a, b) in self.rows() {
            let Some(reachable) = by_middle.get(&b) else {
                continue;
            };
            for c in reachable {
                if suppress && a == *c {
                    continue;
                }
                if seen.insert((a, *c)) {
                    starts.push(a);
                    ends.push(*c);
                } else {
                    collapsed += 1;
                }
            }
        }
        if collapsed > 0 {
            tracing::debug!(
                "compose through {middle} collapsed {collapsed} duplicate pairs"
            );
        }
        Ok(build(
            self.representation(),
            self.start_type().to_string(),
            compose_alias(other.end_type(), middle),
            self.is_directed() || other.is_directed(),
            starts,
            ends,
            BTreeMap::new(),
        ))
    }

    /// Combine two edge sets over the same oriented type pair with a set
    /// operation on `(start_id, end_id)` pairs.
    ///
    /// Features present in both inputs are preserved for surviving rows; a
    /// row whose two values disagree fails with
    /// [PubNetError::FeatureConflict] unless `resolve` picks a side. A
    /// difference keeps the left input's columns. Union reports how many
    /// duplicate pairs it collapsed.
    pub fn reduce(
        &self,
        other: &EdgeSet,
        op: SetOp,
        resolve: Option<Resolution>,
    ) -> Result<EdgeSet, PubNetError> {
        if self.start_type() != other.start_type()
            || self.end_type() != other.end_type()
            || self.is_directed() != other.is_directed()
        {
            return Err(PubNetError::TypeMismatch(format!(
                "cannot reduce ({}, {}, directed: {}) with ({}, {}, directed: {})",
                self.start_type(),
                self.end_type(),
                self.is_directed(),
                other.start_type(),
                other.end_type(),
                other.is_directed()
            )));
        }

        fn first_rows(edges: &EdgeSet) -> (Vec<(NodeId, NodeId)>, BTreeMap<(NodeId, NodeId), usize>) {
            let mut order = Vec::new();
            let mut rows = BTreeMap::new();
            for (row, pair) in edges.rows().enumerate() {
                if let std::collections::btree_map::Entry::Vacant(entry) = rows.entry(pair) {
                    entry.insert(row);
                    order.push(pair);
                }
            }
            (order, rows)
        }

        let (left_order, left_rows) = first_rows(self);
        let (right_order, right_rows) = first_rows(other);

        let pairs: Vec<(NodeId, NodeId)> = match op {
            SetOp::Union => {
                let shared = right_order
                    .iter()
                    .filter(|pair| left_rows.contains_key(pair))
                    .count();
                let collapsed = (self.len() - left_order.len())
                    + (other.len() - right_order.len())
                    + shared;
                if collapsed > 0 {
                    tracing::info!(
                        "union of '{}' edge sets collapsed {collapsed} duplicate pairs",
                        self.key()
                    );
                }
                left_order
                    .iter()
                    .copied()
                    .chain(
                        right_order
                            .iter()
                            .copied()
                            .filter(|pair| !left_rows.contains_key(pair)),
                    )
                    .collect()
            }
            SetOp::Intersection => left_order
                .into_iter()
                .filter(|pair| right_rows.contains_key(pair))
                .collect(),
            SetOp::Difference => left_order
                .into_iter()
                .filter(|pair| !right_rows.contains_key(pair))
                .collect(),
        };

        let feature_names: Vec<String> = match op {
            SetOp::Difference => self.features().keys().cloned().collect(),
            _ => self
                .features()
                .keys()
                .filter(|name| other.features().contains_key(*name))
                .cloned()
                .collect(),
        };

        let mut features: BTreeMap<String, FeatureColumn> = BTreeMap::new();
        for name in feature_names {
            let left_column = self.feature(&name)?;
            let right_column = other.features().get(&name);
            if let Some(right_column) = right_column {
                if left_column.kind() != right_column.kind() {
                    return Err(PubNetError::FeatureConflict(format!(
                        "feature '{name}' is {:?} on one input and {:?} on the other",
                        left_column.kind(),
                        right_column.kind()
                    )));
                }
            }
            let mut column = FeatureColumn::empty(left_column.kind());
            for pair in &pairs {
                let left_value = left_rows
                    .get(pair)
                    .and_then(|row| left_column.value(*row));
                let right_value = right_rows
                    .get(pair)
                    .and_then(|row| right_column.and_then(|column| column.value(*row)));
                let value = match (left_value, right_value) {
                    (Some(left), Some(right)) => {
                        if left == right {
                            left
                        } else {
                            match resolve {
                                Some(Resolution::KeepLeft) => left,
                                Some(Resolution::KeepRight) => right,
                                None => {
                                    return Err(PubNetError::FeatureConflict(format!(
                                        "feature '{name}' disagrees for pair {pair:?}: {left} vs {right}"
                                    )))
                                }
                            }
                        }
                    }
                    (Some(left), None) => left,
                    (None, Some(right)) => right,
                    (None, None) => unreachable!("pair came from one of the inputs"),
                };
                column.push(value)?;
            }
            features.insert(name, column);
        }

        let (starts, ends) = pairs.into_iter().unzip();
        Ok(build(
            self.representation(),
            self.start_type().to_string(),
            self.end_type().to_string(),
            self.is_directed(),
            starts,
            ends,
            features,
        ))
    }

    /// Pairwise shared-neighbor similarity over one side of this relation.
    ///
    /// `via` names the neighbor type; the other end of the pair is the entity
    /// side being compared (for a self-pair relation the start column is the
    /// entity side and the end column the neighbor side). Every unordered
    /// entity pair sharing at least one neighbor yields one row, smaller id
    /// first, with the score in the `overlap` feature; pairs with nothing in
    /// common are omitted and ids with no neighbors contribute no pairs.
    ///
    /// The count-metric result for the canonical orientation is cached on
    /// this instance.
    pub fn overlap(&self, via: &str, metric: OverlapMetric) -> Result<EdgeSet, PubNetError> {
        let entities_are_start = if via == self.end_type() {
            true
        } else if via == self.start_type() {
            false
        } else {
            return Err(PubNetError::TypeMismatch(format!(
                "'{via}' is not one of '{}' or '{}'",
                self.start_type(),
                self.end_type()
            )));
        };
        let canonical = entities_are_start && metric == OverlapMetric::Count;
        if canonical {
            if let Some(cached) = self.overlap_cache().get() {
                return Ok(cached.as_ref().clone());
            }
        }

        let entity_type = if entities_are_start {
            self.start_type()
        } else {
            self.end_type()
        };

        let mut neighbors: BTreeMap<NodeId, BTreeSet<NodeId>> = BTreeMap::new();
        for (start, end) in self.rows() {
            let (entity, neighbor) = if entities_are_start {
                (start, end)
            } else {
                (end, start)
            };
            neighbors.entry(entity).or_default().insert(neighbor);
        }

        // Entities are pushed in ascending id order, so every co-occurrence
        // list is sorted and emitted pairs are always (smaller, larger).
        let mut by_neighbor: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
        for (entity, shared) in &neighbors {
            for neighbor in shared {
                by_neighbor.entry(*neighbor).or_default().push(*entity);
            }
        }

        let mut counts: BTreeMap<(NodeId, NodeId), usize> = BTreeMap::new();
        for entities in by_neighbor.values() {
            for (position, first) in entities.iter().enumerate() {
                for second in &entities[position + 1..] {
                    *counts.entry((*first, *second)).or_default() += 1;
                }
            }
        }

        let mut starts = Vec::with_capacity(counts.len());
        let mut ends = Vec::with_capacity(counts.len());
        let column = match metric {
            OverlapMetric::Count => {
                let mut values = Vec::with_capacity(counts.len());
                for ((first, second), count) in &counts {
                    starts.push(*first);
                    ends.push(*second);
                    values.push(*count as i64);
                }
                FeatureColumn::Int(values)
            }
            OverlapMetric::Jaccard => {
                let mut values = Vec::with_capacity(counts.len());
                for ((first, second), count) in &counts {
                    let first_degree = neighbors[first].len();
                    let second_degree = neighbors[second].len();
                    let union = first_degree + second_degree - count;
                    starts.push(*first);
                    ends.push(*second);
                    values.push(*count as f64 / union as f64);
                }
                FeatureColumn::Float(values)
            }
        };

        let mut features = BTreeMap::new();
        features.insert(FEATURE_OVERLAP.to_string(), column);
        let result = build(
            self.representation(),
            entity_type.to_string(),
            entity_type.to_string(),
            false,
            starts,
            ends,
            features,
        );
        if canonical {
            self.overlap_cache().set(Box::new(result.clone())).ok();
        }
        Ok(result)
    }

    fn overlap_cache(&self) -> &once_cell::sync::OnceCell<Box<EdgeSet>> {
        match self {
            EdgeSet::Array(edges) => &edges.overlap_cache,
            EdgeSet::Graph(edges) => &edges.overlap_cache,
        }
    }

    /// Shortest-path similarity between `targets` over the count-overlap
    /// graph of this relation, with edge weights `1 / overlap`.
    ///
    /// Only finite, non-self target pairs are emitted, smaller id first, with
    /// the path length in the `distance` feature. Output is identical
    /// whichever backend variant stores `self`.
    pub fn similarity(
        &self,
        via: &str,
        targets: &BTreeSet<NodeId>,
    ) -> Result<EdgeSet, PubNetError> {
        let overlap = self.overlap(via, OverlapMetric::Count)?;
        let entity_type = overlap.start_type().to_string();
        let scores = overlap.feature(FEATURE_OVERLAP)?;

        let mut weighted: UnGraph<NodeId, f64> = UnGraph::new_undirected();
        let mut lookup: HashMap<NodeId, NodeIndex> = HashMap::new();
        for (row, (first, second)) in overlap.rows().enumerate() {
            let weight = match scores.value(row) {
                Some(FeatureValue::Int(count)) => 1.0 / count as f64,
                Some(FeatureValue::Float(score)) => 1.0 / score,
                _ => 1.0,
            };
            let first_idx = *lookup
                .entry(first)
                .or_insert_with(|| weighted.add_node(first));
            let second_idx = *lookup
                .entry(second)
                .or_insert_with(|| weighted.add_node(second));
            weighted.add_edge(first_idx, second_idx, weight);
        }

        let present: Vec<NodeId> = targets
            .iter()
            .copied()
            .filter(|id| lookup.contains_key(id))
            .collect();

        let mut starts = Vec::new();
        let mut ends = Vec::new();
        let mut distances = Vec::new();
        for (position, source) in present.iter().enumerate() {
            let reachable =
                petgraph::algo::dijkstra(&weighted, lookup[source], None, |edge| *edge.weight());
            for sink in &present[position + 1..] {
                if let Some(distance) = reachable.get(&lookup[sink]) {
                    starts.push(*source);
                    ends.push(*sink);
                    distances.push(*distance);
                }
            }
        }

        let mut features = BTreeMap::new();
        features.insert(FEATURE_DISTANCE.to_string(), FeatureColumn::Float(distances));
        Ok(build(
            self.representation(),
            entity_type.clone(),
            entity_type,
            false,
            starts,
            ends,
            features,
        ))
    }

    /// Occurrence count of every id in the given column.
    pub fn distribution(&self, node_type: &str) -> Result<BTreeMap<NodeId, usize>, PubNetError> {
        let mut counts = BTreeMap::new();
        for id in self.column(node_type)? {
            *counts.entry(id).or_default() += 1;
        }
        Ok(counts)
    }

    /// Remove duplicate `(start, end)` rows, keeping the first occurrence and
    /// its features. Returns the surviving set and how many rows were
    /// removed; callers report the count.
    pub fn deduplicate(&self) -> (EdgeSet, usize) {
        let mut seen: BTreeSet<(NodeId, NodeId)> = BTreeSet::new();
        let rows: Vec<usize> = self
            .rows()
            .enumerate()
            .filter_map(|(row, pair)| seen.insert(pair).then_some(row))
            .collect();
        let removed = self.len() - rows.len();
        (self.keep_rows(&rows), removed)
    }

    /// This relation viewed with `start` as the start type, transposing the
    /// columns when it is stored the other way around. Fails with
    /// [PubNetError::TypeMismatch] when `start` is not an endpoint.
    pub fn oriented(&self, start: &str) -> Result<EdgeSet, PubNetError> {
        if start == self.start_type() {
            return Ok(self.clone());
        }
        if start != self.end_type() {
            return Err(PubNetError::TypeMismatch(format!(
                "'{start}' is not one of '{}' or '{}'",
                self.start_type(),
                self.end_type()
            )));
        }
        let (old_starts, old_ends): (Vec<NodeId>, Vec<NodeId>) = self.rows().unzip();
        Ok(build(
            self.representation(),
            self.end_type().to_string(),
            self.start_type().to_string(),
            self.is_directed(),
            old_ends,
            old_starts,
            self.features().clone(),
        ))
    }

    /// Rewrite ids through renumbering maps; ids absent from a map pass
    /// through unchanged. Used by network-level repacking.
    pub fn relabel(
        &self,
        start_map: &BTreeMap<NodeId, NodeId>,
        end_map: &BTreeMap<NodeId, NodeId>,
    ) -> EdgeSet {
        let (starts, ends) = self
            .rows()
            .map(|(start, end)| {
                (
                    start_map.get(&start).copied().unwrap_or(start),
                    end_map.get(&end).copied().unwrap_or(end),
                )
            })
            .unzip();
        build(
            self.representation(),
            self.start_type().to_string(),
            self.end_type().to_string(),
            self.is_directed(),
            starts,
            ends,
            self.features().clone(),
        )
    }
}

/// Logical equality: same type pair, directedness, row sequence and features,
/// whichever backend stores either side.
impl PartialEq for EdgeSet {
    fn eq(&self, other: &Self) -> bool {
        self.start_type() == other.start_type()
            && self.end_type() == other.end_type()
            && self.is_directed() == other.is_directed()
            && self.len() == other.len()
            && self.rows().eq(other.rows())
            && self.features() == other.features()
    }
}

impl Display for EdgeSet {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        writeln!(
            f,
            "Edge set ({}, {}) with {} edges",
            self.start_type(),
            self.end_type(),
            self.len()
        )?;
        for (row, (start, end)) in self.rows().take(10).enumerate() {
            writeln!(f, "{row}: {start}\t{end}")?;
        }
        if self.len() > 10 {
            writeln!(f, "...")?;
        }
        Ok(())
    }
}
