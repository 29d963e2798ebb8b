#![deny(missing_docs)]
#![doc = "Core error model, bounds and provenance types for the HRA enumeration engine."]

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

pub mod errors;
pub mod limits;
pub mod provenance;
pub mod rng;

pub use errors::{ErrorInfo, HraError};
pub use limits::{MAX_CANONICAL_NODES, MAX_EDGES, MAX_NODES, MAX_WORKERS};
pub use provenance::{RunProvenance, SourceTag};
pub use rng::{derive_substream_seed, RngHandle};

/// Regulation label carried by a directed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Regulation {
    /// Label `0`.
    Gray,
    /// Label `1`.
    Black,
}

impl Regulation {
    /// Both labels in ascending order.
    pub const ALL: [Regulation; 2] = [Regulation::Gray, Regulation::Black];

    /// Returns the numeric label used by the interchange format.
    pub fn as_label(self) -> u8 {
        match self {
            Regulation::Gray => 0,
            Regulation::Black => 1,
        }
    }

    /// Parses a numeric label.
    pub fn from_label(label: u8) -> Result<Self, HraError> {
        match label {
            0 => Ok(Regulation::Gray),
            1 => Ok(Regulation::Black),
            other => Err(HraError::Format(
                ErrorInfo::new("invalid-regulation", "regulation label must be 0 or 1")
                    .with_context("label", other),
            )),
        }
    }

    /// Label selected by bit `bit` of `pattern` (clear = gray).
    pub fn from_bit(pattern: u64, bit: usize) -> Self {
        if (pattern >> bit) & 1 == 0 {
            Regulation::Gray
        } else {
            Regulation::Black
        }
    }
}

impl Display for Regulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_label())
    }
}

/// Directed, labelled edge between two dense node indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Source node.
    pub from: usize,
    /// Destination node.
    pub to: usize,
    /// Regulation label.
    pub regulation: Regulation,
}

impl Edge {
    /// Creates a new edge descriptor.
    pub fn new(from: usize, to: usize, regulation: Regulation) -> Self {
        Self {
            from,
            to,
            regulation,
        }
    }
}
