//! Identifier indexing and renumbering.
//!
//! Node identifiers are dense but not contiguous; edge rows reference them
//! constantly while filtering and composing, so the id→row lookup is kept in
//! a hash index rather than re-scanned.

use std::collections::{BTreeMap, HashMap};

use crate::{error::PubNetError, properties::NodeId};

use super::nodeset::NodeSet;

/// O(1) amortized id→row translation for one node set.
#[derive(Clone, Debug, Default)]
pub struct Indexer {
    positions: HashMap<NodeId, usize>,
}

impl Indexer {
    /// Build the index, rejecting duplicate identifiers.
    pub fn from_ids(ids: &[NodeId]) -> Result<Self, PubNetError> {
        let mut positions = HashMap::with_capacity(ids.len());
        for (row, id) in ids.iter().enumerate() {
            if positions.insert(*id, row).is_some() {
                return Err(PubNetError::Construction(format!(
                    "duplicate identifier {id}"
                )));
            }
        }
        Ok(Indexer { positions })
    }

    pub fn position_of(&self, id: NodeId) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.positions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Renumber a node set's identifiers onto the contiguous range `[0, n)`,
/// preserving row order.
///
/// Returns the renumbered set together with the old→new mapping so every
/// edge set referencing this type can be rewritten to match. Repacking one
/// node set without rewriting its referencing edge sets breaks the network
/// invariant; normal use is [crate::network::Network::repack].
pub fn repack(nodes: &NodeSet) -> (NodeSet, BTreeMap<NodeId, NodeId>) {
    let mapping: BTreeMap<NodeId, NodeId> = nodes
        .ids()
        .iter()
        .enumerate()
        .map(|(row, id)| (*id, row as NodeId))
        .collect();
    let packed_ids: Vec<NodeId> = (0..nodes.len() as NodeId).collect();
    let packed = NodeSet::from_columns_unchecked(
        nodes.name().to_string(),
        packed_ids,
        nodes.features_cloned(),
    );
    (packed, mapping)
}
