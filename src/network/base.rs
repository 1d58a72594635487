//! The network: one root type, a node set per type name, an edge set per
//! type pair, and the recursive algorithms that operate across them.

use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    fmt::{Display, Formatter},
    sync::Arc,
};

use crate::{
    error::PubNetError,
    properties::{EdgeKey, FeatureValue, NodeId, OverlapMetric, SelfPairs},
};

use super::{edgeset::EdgeSet, indexer, nodeset::NodeSet};

/// A typed, multi-relational graph: a root type name, a mapping from type
/// name to [NodeSet] and a mapping from unordered type pair to [EdgeSet].
///
/// Networks are immutable value objects once built; every transformation
/// (slice, compose, overlap, sanitize, repack) returns a new `Network`.
/// Untouched node and edge sets are shared by reference between the original
/// and the derived network, so transforming a corner of a large graph does
/// not copy the rest.
#[derive(Clone, Debug)]
pub struct Network {
    name: Option<String>,
    root: String,
    nodes: BTreeMap<String, Arc<NodeSet>>,
    edges: BTreeMap<EdgeKey, Arc<EdgeSet>>,
}

impl Network {
    pub fn new(root: &str) -> Self {
        Network {
            name: None,
            root: root.to_string(),
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
        }
    }

    /// Assemble a network from already-built sets.
    ///
    /// Every type referenced by an edge set ends up with a node set: missing
    /// ones become empty placeholders rather than being absent. A network
    /// without nodes for its root still works, but most of the interesting
    /// operations anchor there, so it is worth a warning.
    pub fn from_parts<N, E>(
        root: &str,
        name: Option<String>,
        nodes: N,
        edges: E,
    ) -> Result<Self, PubNetError>
    where
        N: IntoIterator<Item = NodeSet>,
        E: IntoIterator<Item = EdgeSet>,
    {
        let mut net = Network::new(root);
        net.name = name;
        for node_set in nodes {
            net.add_node(node_set)?;
        }
        for edge_set in edges {
            net.add_edge(edge_set)?;
        }
        if !net.nodes.contains_key(root) {
            tracing::warn!(
                "constructing network without '{root}' nodes; \
                 this will limit the functionality of the data type"
            );
            net.nodes.insert(root.to_string(), Arc::new(NodeSet::empty(root)));
        }
        Ok(net)
    }

    /// Register a node set. Fails if the type name is already present.
    pub fn add_node(&mut self, nodes: NodeSet) -> Result<(), PubNetError> {
        if self.nodes.contains_key(nodes.name()) {
            return Err(PubNetError::Construction(format!(
                "the node type {} is already in the network",
                nodes.name()
            )));
        }
        self.nodes.insert(nodes.name().to_string(), Arc::new(nodes));
        Ok(())
    }

    /// Register an edge set, inserting empty placeholder node sets for any
    /// endpoint type not yet present. Fails if the type pair is already
    /// present.
    pub fn add_edge(&mut self, edges: EdgeSet) -> Result<(), PubNetError> {
        let key = edges.key();
        if self.edges.contains_key(&key) {
            return Err(PubNetError::Construction(format!(
                "the edge set {key} is already in the network"
            )));
        }
        let (first, second) = key.parts();
        for node_type in [first, second] {
            if !self.nodes.contains_key(node_type) {
                tracing::debug!("adding placeholder node set for '{node_type}'");
                self.nodes
                    .insert(node_type.to_string(), Arc::new(NodeSet::empty(node_type)));
            }
        }
        self.edges.insert(key, Arc::new(edges));
        Ok(())
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    /// The same network anchored at a different root type.
    pub fn select_root(&self, new_root: &str) -> Result<Network, PubNetError> {
        if !self.nodes.contains_key(new_root) {
            let available = self
                .nodes
                .keys()
                .cloned()
                .collect::<Vec<String>>()
                .join("\n\t");
            return Err(PubNetError::NotFound(format!(
                "{new_root} not in the network's node types; must be one of\n\t{available}"
            )));
        }
        let mut out = self.clone();
        out.root = new_root.to_string();
        Ok(out)
    }

    pub fn node_names(&self) -> Vec<&str> {
        self.nodes.keys().map(String::as_str).collect()
    }

    pub fn edge_keys(&self) -> Vec<&EdgeKey> {
        self.edges.keys().collect()
    }

    /// Edge keys incident to the given type, in sorted order. This is the
    /// resolution target of the `Type*` selector.
    pub fn edges_incident(&self, node_type: &str) -> Vec<EdgeKey> {
        self.edges
            .keys()
            .filter(|key| key.contains(node_type))
            .cloned()
            .collect()
    }

    pub fn node(&self, name: &str) -> Result<&NodeSet, PubNetError> {
        self.nodes
            .get(name)
            .map(Arc::as_ref)
            .ok_or_else(|| PubNetError::NotFound(format!("no node set named '{name}'")))
    }

    /// The edge set for a type pair, in whichever backend variant currently
    /// stores it. Order of the two names does not matter.
    pub fn edge(&self, node_1: &str, node_2: &str) -> Result<&EdgeSet, PubNetError> {
        self.edge_by_key(&EdgeKey::new(node_1, node_2))
    }

    pub fn edge_by_key(&self, key: &EdgeKey) -> Result<&EdgeSet, PubNetError> {
        self.edges
            .get(key)
            .map(Arc::as_ref)
            .ok_or_else(|| PubNetError::NotFound(format!("no edge set for '{key}'")))
    }

    pub(crate) fn node_sets(&self) -> impl Iterator<Item = &NodeSet> {
        self.nodes.values().map(Arc::as_ref)
    }

    pub(crate) fn edge_sets(&self) -> impl Iterator<Item = &EdgeSet> {
        self.edges.values().map(Arc::as_ref)
    }

    /// Filter the network to the subgraph consistent with keeping only the
    /// given root ids. Equivalent to indexing the network with an id set.
    pub fn slice(&self, ids: &BTreeSet<NodeId>) -> Result<Network, PubNetError> {
        let root = self.root.clone();
        self.slice_type(&root, ids)
    }

    /// Recursive filter anchored at any type.
    ///
    /// Runs a breadth-first worklist over the type-graph (types as nodes,
    /// edge sets as edges), with a visited set keyed by type name so cycles
    /// and self-pair relations terminate and each type is expanded exactly
    /// once. While a type is queued, every incident edge set from a type
    /// being expanded unions reachable ids into its accumulated set; the set
    /// freezes when the type is dequeued.
    ///
    /// After the traversal every edge set whose endpoint types were both
    /// visited is filtered on both columns with the frozen sets, and every
    /// visited type's node set is restricted to its frozen set. Types not
    /// reached from the starting type pass through untouched and shared —
    /// slicing never prunes a disconnected component of the type-graph. A
    /// type reached with an empty id set propagates emptiness outward; that
    /// is a result, not an error.
    pub fn slice_type(
        &self,
        node_type: &str,
        ids: &BTreeSet<NodeId>,
    ) -> Result<Network, PubNetError> {
        let start_nodes = self.node(node_type)?;
        let start_ids: BTreeSet<NodeId> = ids
            .iter()
            .copied()
            .filter(|id| start_nodes.contains(*id))
            .collect();

        let mut surviving: BTreeMap<String, BTreeSet<NodeId>> = BTreeMap::new();
        surviving.insert(node_type.to_string(), start_ids);

        let mut frozen: BTreeSet<String> = BTreeSet::new();
        let mut queued: BTreeSet<String> = BTreeSet::new();
        let mut worklist: VecDeque<String> = VecDeque::new();
        queued.insert(node_type.to_string());
        worklist.push_back(node_type.to_string());

        while let Some(current) = worklist.pop_front() {
            frozen.insert(current.clone());
            let current_ids = surviving.get(&current).cloned().unwrap_or_default();

            for (key, edge) in &self.edges {
                let Some(neighbor) = key.other(&current) else {
                    continue;
                };
                if frozen.contains(neighbor) {
                    continue;
                }
                let mut reachable = BTreeSet::new();
                for (start, end) in edge.rows() {
                    if edge.start_type() == current && current_ids.contains(&start) {
                        reachable.insert(end);
                    } else if edge.end_type() == current && current_ids.contains(&end) {
                        reachable.insert(start);
                    }
                }
                surviving
                    .entry(neighbor.to_string())
                    .or_default()
                    .extend(reachable);
                if queued.insert(neighbor.to_string()) {
                    worklist.push_back(neighbor.to_string());
                }
            }
        }

        tracing::debug!(
            "slice from '{node_type}' visited {} of {} types",
            frozen.len(),
            self.nodes.len()
        );

        let nodes: BTreeMap<String, Arc<NodeSet>> = self
            .nodes
            .iter()
            .map(|(name, node_set)| {
                let restricted = match (frozen.contains(name), surviving.get(name)) {
                    (true, Some(keep)) => Arc::new(node_set.restrict(keep)),
                    _ => Arc::clone(node_set),
                };
                (name.clone(), restricted)
            })
            .collect();

        let empty = BTreeSet::new();
        let edges: BTreeMap<EdgeKey, Arc<EdgeSet>> = self
            .edges
            .iter()
            .map(|(key, edge)| {
                let (first, second) = key.parts();
                let filtered = if frozen.contains(first) && frozen.contains(second) {
                    let by_start = surviving.get(edge.start_type()).unwrap_or(&empty);
                    let by_end = surviving.get(edge.end_type()).unwrap_or(&empty);
                    Arc::new(edge.filter(Some(by_start), Some(by_end)))
                } else {
                    Arc::clone(edge)
                };
                (key.clone(), filtered)
            })
            .collect();

        Ok(Network {
            name: self.name.clone(),
            root: self.root.clone(),
            nodes,
            edges,
        })
    }

    /// Compose two adjacent edge sets into a derived relation, registering
    /// the result and a node-type alias for its end type.
    ///
    /// `first` and `second` name oriented traversals: `(A, B)` then `(B, C)`.
    /// Stored column order does not have to match; each edge set is oriented
    /// before joining. The derived edge set lands under `(A, {C}Via{B})` and
    /// the alias type shares the original `C` rows.
    pub fn compose(
        &self,
        first: (&str, &str),
        second: (&str, &str),
        self_pairs: SelfPairs,
    ) -> Result<Network, PubNetError> {
        let first_edges = self.edge(first.0, first.1)?.oriented(first.0)?;
        let second_edges = self.edge(second.0, second.1)?.oriented(second.0)?;
        let composed = first_edges.compose(&second_edges, self_pairs)?;

        let alias = composed.end_type().to_string();
        let alias_nodes = self.node(second.1)?.renamed(&alias);

        let mut out = self.clone();
        out.nodes.insert(alias, Arc::new(alias_nodes));
        out.edges.insert(composed.key(), Arc::new(composed));
        Ok(out)
    }

    /// Shared-neighbor overlap between ids of `node_type`, through the edge
    /// set connecting it to the root.
    pub fn overlap(
        &self,
        node_type: &str,
        metric: OverlapMetric,
    ) -> Result<EdgeSet, PubNetError> {
        self.edge(node_type, &self.root)?.overlap(&self.root, metric)
    }

    /// Drop dangling edge rows (ids with no row in the endpoint node set) and
    /// duplicate edge rows, reporting what was removed. Dangling ids are
    /// legal in an edge set, so this is an explicit cleanup step rather than
    /// something transformations do behind the caller's back.
    pub fn sanitize(&self) -> Network {
        let empty = BTreeSet::new();
        let edges: BTreeMap<EdgeKey, Arc<EdgeSet>> = self
            .edges
            .iter()
            .map(|(key, edge)| {
                let start_ids = self
                    .nodes
                    .get(edge.start_type())
                    .map(|nodes| nodes.id_set())
                    .unwrap_or_else(|| empty.clone());
                let end_ids = self
                    .nodes
                    .get(edge.end_type())
                    .map(|nodes| nodes.id_set())
                    .unwrap_or_else(|| empty.clone());
                let filtered = edge.filter(Some(&start_ids), Some(&end_ids));
                let dangling = edge.len() - filtered.len();
                let (deduped, duplicates) = filtered.deduplicate();
                if dangling > 0 || duplicates > 0 {
                    tracing::warn!(
                        "sanitize '{key}': dropped {dangling} dangling rows and {duplicates} duplicate rows"
                    );
                    (key.clone(), Arc::new(deduped))
                } else {
                    (key.clone(), Arc::clone(edge))
                }
            })
            .collect();

        Network {
            name: self.name.clone(),
            root: self.root.clone(),
            nodes: self.nodes.clone(),
            edges,
        }
    }

    /// Renumber every node set's identifiers onto `[0, n)` and rewrite every
    /// edge set through the same mappings, so each `(start_id, end_id)` pair
    /// survives up to relabeling.
    ///
    /// Dangling edge ids cannot come from a node set's mapping; they are
    /// assigned fresh ids past the packed range, in first-encounter row
    /// order, so they stay consistently renumbered across all edge sets of
    /// the type instead of being dropped.
    pub fn repack(&self) -> Network {
        let mut mappings: BTreeMap<String, BTreeMap<NodeId, NodeId>> = BTreeMap::new();
        let mut next_id: BTreeMap<String, NodeId> = BTreeMap::new();
        let mut nodes: BTreeMap<String, Arc<NodeSet>> = BTreeMap::new();

        for (name, node_set) in &self.nodes {
            let (packed, mapping) = indexer::repack(node_set);
            mappings.insert(name.clone(), mapping);
            next_id.insert(name.clone(), node_set.len() as NodeId);
            nodes.insert(name.clone(), Arc::new(packed));
        }

        for (key, edge) in &self.edges {
            let mut dangling = 0usize;
            for (start, end) in edge.rows() {
                for (node_type, id) in [(edge.start_type(), start), (edge.end_type(), end)] {
                    let mapping = mappings.entry(node_type.to_string()).or_default();
                    if !mapping.contains_key(&id) {
                        let fresh = next_id.entry(node_type.to_string()).or_default();
                        mapping.insert(id, *fresh);
                        *fresh += 1;
                        dangling += 1;
                    }
                }
            }
            if dangling > 0 {
                tracing::warn!("repack '{key}': renumbered {dangling} dangling ids past the packed range");
            }
        }

        let edges: BTreeMap<EdgeKey, Arc<EdgeSet>> = self
            .edges
            .iter()
            .map(|(key, edge)| {
                let start_map = &mappings[edge.start_type()];
                let end_map = &mappings[edge.end_type()];
                (key.clone(), Arc::new(edge.relabel(start_map, end_map)))
            })
            .collect();

        Network {
            name: self.name.clone(),
            root: self.root.clone(),
            nodes,
            edges,
        }
    }

    /// Root ids connected to the given `node_type` ids through the edge set
    /// between them.
    fn root_ids_connected_to(
        &self,
        node_type: &str,
        node_ids: &BTreeSet<NodeId>,
    ) -> Result<BTreeSet<NodeId>, PubNetError> {
        let edges = self.edge(&self.root, node_type)?.oriented(&self.root)?;
        Ok(edges
            .rows()
            .filter_map(|(root_id, node_id)| node_ids.contains(&node_id).then_some(root_id))
            .collect())
    }

    /// The reverse direction: `node_type` ids connected to the given root
    /// ids.
    fn type_ids_connected_to(
        &self,
        node_type: &str,
        root_ids: &BTreeSet<NodeId>,
    ) -> Result<BTreeSet<NodeId>, PubNetError> {
        let edges = self.edge(&self.root, node_type)?.oriented(&self.root)?;
        Ok(edges
            .rows()
            .filter_map(|(root_id, node_id)| root_ids.contains(&root_id).then_some(node_id))
            .collect())
    }

    /// Root ids whose rows in the `(root, node_type)` edge set touch a node
    /// matched by `predicate`.
    pub fn ids_where<F>(&self, node_type: &str, predicate: F) -> Result<Vec<NodeId>, PubNetError>
    where
        F: Fn(&NodeSet) -> Vec<NodeId>,
    {
        let matched: BTreeSet<NodeId> = predicate(self.node(node_type)?).into_iter().collect();
        Ok(self
            .root_ids_connected_to(node_type, &matched)?
            .into_iter()
            .collect())
    }

    /// Root ids connected to nodes carrying a feature value, within `steps`
    /// hops of shared-neighbor expansion.
    ///
    /// `steps = 1` returns roots directly connected to a matching node. Each
    /// further step widens the result to roots sharing a `node_type`
    /// neighbor with the previous round.
    pub fn ids_containing(
        &self,
        node_type: &str,
        feature: &str,
        value: &FeatureValue,
        steps: usize,
    ) -> Result<Vec<NodeId>, PubNetError> {
        if steps == 0 {
            return Err(PubNetError::Construction(
                "steps must be a positive integer".to_string(),
            ));
        }
        let matched: BTreeSet<NodeId> = self
            .node(node_type)?
            .ids_matching(feature, value)?
            .into_iter()
            .collect();
        let mut root_ids = self.root_ids_connected_to(node_type, &matched)?;
        for _ in 1..steps {
            let node_ids = self.type_ids_connected_to(node_type, &root_ids)?;
            root_ids = self.root_ids_connected_to(node_type, &node_ids)?;
        }
        Ok(root_ids.into_iter().collect())
    }

    /// The subnetwork of roots connected to nodes carrying a feature value.
    pub fn containing(
        &self,
        node_type: &str,
        feature: &str,
        value: &FeatureValue,
        steps: usize,
    ) -> Result<Network, PubNetError> {
        let ids: BTreeSet<NodeId> = self
            .ids_containing(node_type, feature, value, steps)?
            .into_iter()
            .collect();
        self.slice(&ids)
    }

    /// A copy without the named node types and edge sets. Dropping a node
    /// type also drops its incident edge sets, keeping the network invariant
    /// intact.
    pub fn without(
        &self,
        nodes: &[&str],
        edges: &[EdgeKey],
    ) -> Result<Network, PubNetError> {
        for name in nodes {
            if !self.nodes.contains_key(*name) {
                return Err(PubNetError::NotFound(format!("no node set named '{name}'")));
            }
        }
        for key in edges {
            if !self.edges.contains_key(key) {
                return Err(PubNetError::NotFound(format!("no edge set for '{key}'")));
            }
        }
        let dropped_edges: BTreeSet<EdgeKey> = edges
            .iter()
            .cloned()
            .chain(
                nodes
                    .iter()
                    .flat_map(|name| self.edges_incident(name)),
            )
            .collect();
        let mut out = self.clone();
        for name in nodes {
            out.nodes.remove(*name);
            tracing::debug!("dropping node set '{name}'");
        }
        for key in &dropped_edges {
            out.edges.remove(key);
        }
        Ok(out)
    }

    /// Overlay another network's node and edge sets, replacing entries that
    /// collide. Shared sets stay shared.
    pub fn update(&self, other: &Network) -> Network {
        let mut out = self.clone();
        for (name, node_set) in &other.nodes {
            out.nodes.insert(name.clone(), Arc::clone(node_set));
        }
        for (key, edge_set) in &other.edges {
            out.edges.insert(key.clone(), Arc::clone(edge_set));
        }
        out
    }
}

/// Content equality across root, node sets and edge sets; the display name
/// does not matter.
impl PartialEq for Network {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root
            && self.nodes.len() == other.nodes.len()
            && self.edges.len() == other.edges.len()
            && self
                .nodes
                .iter()
                .all(|(name, node_set)| {
                    other
                        .nodes
                        .get(name)
                        .is_some_and(|theirs| node_set.as_ref() == theirs.as_ref())
                })
            && self
                .edges
                .iter()
                .all(|(key, edge_set)| {
                    other
                        .edges
                        .get(key)
                        .is_some_and(|theirs| edge_set.as_ref() == theirs.as_ref())
                })
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match &self.name {
            Some(name) => writeln!(f, "{name} network")?,
            None => writeln!(f, "Unnamed network")?,
        }
        writeln!(f, "\nNode types:")?;
        for (name, node_set) in &self.nodes {
            writeln!(f, "\t{name}\t({})", node_set.len())?;
        }
        writeln!(f, "\nEdge sets:")?;
        for (key, edge_set) in &self.edges {
            writeln!(f, "\t{key}\t({})", edge_set.len())?;
        }
        Ok(())
    }
}
