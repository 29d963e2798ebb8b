#![deny(missing_docs)]
#![doc = "Enumeration of heritable regulatory architectures: exhaustive generation \
for a fixed node count and incremental single-node expansion of base graphs."]

/// Incremental expansion of a base graph.
pub mod expand;
/// Exhaustive generation for a fixed node count.
pub mod generate;

pub use expand::{
    expand, expand_base_graph, expand_from_container, write_expansion, ExpandOpts,
    ExpandedHra, ExpansionResult, ExpansionStrategy,
};
pub use generate::{census, generate_hras, write_generation, CensusRow, GeneratedHra, GenerationReport};
