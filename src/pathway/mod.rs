//! Pathway graphs and the registry holding them.

pub mod filter;
pub mod graph;
pub mod store;

pub use filter::CommonEntityFilter;
pub use graph::{EdgeEnds, PathwayGraph};
pub use store::PathwayStore;
