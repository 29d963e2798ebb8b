//! Fixed bounds of the graph model.

use crate::errors::{ErrorInfo, HraError};

/// Largest node count any graph may carry.
pub const MAX_NODES: usize = 10;

/// Largest edge count any graph may carry (no self-loops, one edge per ordered pair).
pub const MAX_EDGES: usize = MAX_NODES * (MAX_NODES - 1);

/// Largest node count accepted by the brute-force canonical form (n! permutations).
pub const MAX_CANONICAL_NODES: usize = 7;

/// Upper bound on concurrent expansion workers.
pub const MAX_WORKERS: usize = 16;

/// Fails with a capacity error when `nodes` exceeds [`MAX_NODES`].
pub fn ensure_node_capacity(nodes: usize) -> Result<(), HraError> {
    if nodes > MAX_NODES {
        return Err(HraError::Capacity(
            ErrorInfo::new("node-capacity", "node count exceeds the model maximum")
                .with_context("requested", nodes)
                .with_context("max", MAX_NODES),
        ));
    }
    Ok(())
}

/// Fails with a capacity error when `nodes` cannot be canonicalised exhaustively.
pub fn ensure_canonical_capacity(nodes: usize) -> Result<(), HraError> {
    if nodes > MAX_CANONICAL_NODES {
        return Err(HraError::Capacity(
            ErrorInfo::new(
                "canonical-capacity",
                "brute-force canonical form is limited to small graphs",
            )
            .with_context("requested", nodes)
            .with_context("max", MAX_CANONICAL_NODES)
            .with_hint("enumerate smaller node counts"),
        ));
    }
    Ok(())
}
