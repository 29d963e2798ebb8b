#![deny(missing_docs)]

//! Labelled digraph model, structural predicates and the textual interchange
//! format used by the HRA enumeration engine.

pub mod dot;
mod graph;
mod predicates;

pub use dot::{
    count_blocks, open_container, read_block_at, read_container, write_container, BlockProvenance, DotReader,
    DotWriter, ParsedBlock,
};
pub use graph::RegulatoryGraph;
pub use predicates::{is_heritable_regulatory, is_heritable_topology, is_hra, is_weakly_connected};
