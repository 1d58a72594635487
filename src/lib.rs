//! # pubnet-core
//!
//! A Rust library for modeling publication and citation collections as typed,
//! multi-relational graphs.
//!
//! ## Overview
//!
//! pubnet-core stores a bibliographic corpus as a [`network::Network`]: one
//! node set per entity type (publications, authors, descriptors, ...) and one
//! edge set per related type pair. Callers filter, transform and compare
//! slices of that graph without knowing how the edges are physically stored —
//! each [`network::EdgeSet`] is backed by either flat id arrays or a petgraph
//! adjacency structure, behind one contract that produces identical results
//! for both.
//!
//! ### Key Features
//!
//! - **Backend-polymorphic edges**: array and graph variants, convertible in
//!   place with lazy, cached conversion
//! - **Recursive slicing**: restricting one type's ids propagates across the
//!   reachable type-graph, so no surviving edge dangles
//! - **Derived relations**: inner-join composition of adjacent edge sets and
//!   shared-neighbor overlap/similarity scoring
//! - **Copy-on-write networks**: derived networks share untouched node and
//!   edge sets by reference
//! - **Directory storage**: one plain TSV or JSON file per set, tolerant of
//!   missing files and malformed rows
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::collections::BTreeSet;
//! use pubnet_core::storage::{load_graph, LoadOptions};
//! use pubnet_core::config::StorageConfig;
//!
//! fn main() -> Result<(), pubnet_core::PubNetError> {
//!     let config = StorageConfig::new("./graphs");
//!     let net = load_graph(&config, "pubmed_sample", &LoadOptions::default())?;
//!
//!     // Keep three publications and everything consistent with them.
//!     let keep: BTreeSet<i64> = [10, 20, 30].into();
//!     let subnet = net.slice(&keep)?;
//!
//!     for name in subnet.node_names() {
//!         println!("{}: {} rows", name, subnet.node(name)?.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Module Guide
//!
//! - [`network`]: the core data model — [`network::Network`],
//!   [`network::NodeSet`], [`network::EdgeSet`] and its backends
//! - [`properties`]: building-block value types (ids, keys, feature columns)
//! - [`storage`]: directory-based load/save
//! - [`naming`]: file-name and selector conventions
//! - [`config`]: explicit storage configuration
//!
//! Start with [`storage::load_graph`] for saved data or
//! [`network::Network::from_parts`] for sets built in memory.

pub mod config;
pub mod error;
pub mod naming;
pub mod network;
pub mod properties;
pub mod storage;

pub use error::*;
