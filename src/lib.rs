//! # dynpathway-core
//!
//! Focus-centered composition of biological pathway graphs.
//!
//! ## Overview
//!
//! A pathway is a directed multigraph of vertex representations (VReps), each denoting one or more
//! biological entities such as genes or compounds. The same entity usually appears in many
//! pathways. dynpathway-core composes several pathways into one view centered on a chosen focus
//! vertex:
//!
//! - **Environment extraction**: a bounded-radius neighborhood of the focus vertex is cut out of
//!   each context pathway, keeping edge orientation and multiplicity.
//! - **Node merging**: VReps that denote the same entity, within one pathway or across several, are
//!   collapsed into a single presentation node that remembers every VRep it subsumes.
//! - **Edge redirection**: presentation edges follow their nodes through merges, and pathway edges
//!   are translated into presentation edges without duplicate or self pairs.
//!
//! ## Architecture
//!
//! - **[`properties`]**: UUID-backed keys (`Pid`, `Vid`, `Eid`, `Nid`), entities, VReps, edge records
//! - **[`pathway`]**: the per-pathway graph store (`PathwayGraph`), the registry of stored pathways
//!   (`PathwayStore`) and the pathway filter
//! - **[`environment`]**: bounded breadth-first extraction around a focus node
//! - **[`merge`]**: presentation nodes and `merge_nodes`
//! - **[`redirect`]**: presentation edges, `redirect`, `copy_with_redirect` and
//!   `compose_edges_for_graph`
//! - **[`compose`]**: the `PathwayComposer` orchestrator and its composition pass
//! - **[`codec`]**: TOML pathway descriptions
//! - **[`config`]** and **[`event`]**: composer settings and view notifications
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dynpathway_core::{compose::PathwayComposer, config::ComposerConfig, pathway::PathwayStore};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut store = PathwayStore::new();
//!     let pids = store.load_toml(&std::fs::read_to_string("pathways.toml")?)?;
//!
//!     let mut config = ComposerConfig::default();
//!     config.environment_radius = 2;
//!     let mut composer = PathwayComposer::new(store, config);
//!
//!     composer.add_pathway(pids[0])?;
//!     composer.focus_on_entity("hsa:7157")?;
//!     for pid in pids.iter().skip(1) {
//!         composer.add_pathway(*pid)?;
//!     }
//!
//!     for node in composer.composition().nodes() {
//!         println!("{node}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **default**: the library
//! - **bin**: the `dynpath` command line tool

pub mod codec;
pub mod compose;
pub mod config;
pub mod environment;
pub mod error;
pub mod event;
pub mod merge;
pub mod pathway;
pub mod properties;
pub mod redirect;
#[cfg(test)]
mod tests;

pub use error::*;
