#![deny(missing_docs)]
#![doc = "Brute-force canonical forms and automorphism group orders for small \
regulatory graphs. Canonical forms are pure functions of the adjacency matrix \
and are safe to compute concurrently."]

/// Canonical representation of a graph's isomorphism class.
pub mod canonical;

pub use canonical::{
    are_isomorphic, canonicalize, canonicalize_with_automorphisms, CanonicalForm, CanonicalRep,
};
