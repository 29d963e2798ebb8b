//! Provenance tags and run metadata attached to HRA artifacts.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Identifier recording which base graph or file produced a result graph.
///
/// Tags order by kind first (`Source` before `File`) and then numerically so
/// provenance sets iterate deterministically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "kebab-case")]
pub enum SourceTag {
    /// Index of the base graph inside the input container.
    Source(usize),
    /// Fallback derived from the artifact file name when no comment is present.
    File(usize),
}

impl Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceTag::Source(id) => write!(f, "Source:{id}"),
            SourceTag::File(id) => write!(f, "File:{id:03}"),
        }
    }
}

/// Metadata describing how a summary artifact was produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunProvenance {
    /// Path of the container the base graphs were loaded from.
    pub input: String,
    /// Node count of the base graphs.
    pub start_size: usize,
    /// Node count of the expanded graphs.
    pub target_size: usize,
    /// ISO-8601 timestamp recording when the artifact was generated.
    pub created_at: String,
    /// Version map for all tools involved in the run.
    pub tool_versions: BTreeMap<String, String>,
}
