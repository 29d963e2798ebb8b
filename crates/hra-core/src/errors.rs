//! Structured error types shared across HRA crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`HraError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (node ids, sizes, paths, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the HRA engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum HraError {
    /// Structural violations while building a graph.
    #[error("graph error: {0}")]
    Graph(ErrorInfo),
    /// Node, edge or canonicalisation bounds exceeded.
    #[error("capacity error: {0}")]
    Capacity(ErrorInfo),
    /// Bad caller input: missing containers, out of range indices, failed preconditions.
    #[error("input error: {0}")]
    Input(ErrorInfo),
    /// Malformed interchange text.
    #[error("format error: {0}")]
    Format(ErrorInfo),
    /// Filesystem and export failures.
    #[error("io error: {0}")]
    Io(ErrorInfo),
    /// A search was aborted by its deadline or cancellation flag.
    #[error("cancelled: {0}")]
    Cancelled(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl HraError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            HraError::Graph(info)
            | HraError::Capacity(info)
            | HraError::Input(info)
            | HraError::Format(info)
            | HraError::Io(info)
            | HraError::Cancelled(info) => info,
        }
    }

    /// Returns the stable machine readable code of the error.
    pub fn code(&self) -> &str {
        &self.info().code
    }

    /// Adds a context entry to the payload regardless of the error family.
    pub fn with_context(self, key: impl Into<String>, value: impl ToString) -> Self {
        match self {
            HraError::Graph(info) => HraError::Graph(info.with_context(key, value)),
            HraError::Capacity(info) => HraError::Capacity(info.with_context(key, value)),
            HraError::Input(info) => HraError::Input(info.with_context(key, value)),
            HraError::Format(info) => HraError::Format(info.with_context(key, value)),
            HraError::Io(info) => HraError::Io(info.with_context(key, value)),
            HraError::Cancelled(info) => HraError::Cancelled(info.with_context(key, value)),
        }
    }

    /// Shorthand for an [`HraError::Io`] carrying the display form of `err`.
    pub fn io(code: &str, err: impl ToString) -> Self {
        HraError::Io(ErrorInfo::new(code, err.to_string()))
    }
}
