//! Network module: typed multi-relational graph structures.
//!
//! # Module Organization
//!
//! - [`nodeset`]: typed entity tables keyed by unique id ([NodeSet])
//! - [`edgeset`]: backend-polymorphic relations ([EdgeSet] and its variants)
//! - [`indexer`]: id↔position translation and renumbering ([Indexer], [repack])
//! - [`base`]: the [Network] itself with slicing, composition and overlap
//!
//! # Public API
//!
//! ```rust
//! use pubnet_core::network::{EdgeSet, Network, NodeSet};
//! ```

mod base;
mod edgeset;
mod indexer;
mod nodeset;


pub use base::Network;
pub use edgeset::{ArrayEdgeSet, EdgeSet, GraphEdgeSet, Rows};
pub use indexer::{repack, Indexer};
pub use nodeset::NodeSet;
