//! Textual interchange format: `digraph` blocks of labelled edge lines.
//!
//! ```text
//! // Source:3 Nodes:4 Canonical:-0--...
//! digraph HRA_from_3_graph_000 {
//!   0 -> 1 [label="0"];
//! }
//! ```
//!
//! The node count of a block is the largest referenced node id plus one,
//! raised to the `Nodes:` value of its provenance comment when present.

use std::fmt::{self, Display};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Lines, Write};
use std::path::Path;

use hra_core::errors::{ErrorInfo, HraError};
use hra_core::limits::{ensure_node_capacity, MAX_NODES};
use hra_core::{Edge, Regulation};
use serde::{Deserialize, Serialize};

use crate::graph::RegulatoryGraph;

/// Provenance recorded in the optional comment preceding a block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockProvenance {
    /// Index of the base graph the block was grown from.
    pub source: Option<usize>,
    /// Declared node count.
    pub nodes: Option<usize>,
    /// Canonical representation rendered as text.
    pub canonical: Option<String>,
}

impl BlockProvenance {
    /// Returns whether no provenance key is set.
    pub fn is_empty(&self) -> bool {
        self.source.is_none() && self.nodes.is_none() && self.canonical.is_none()
    }

    fn parse(comment: &str) -> Result<Option<Self>, HraError> {
        let mut tokens = comment.split_whitespace().peekable();
        let is_provenance = tokens
            .peek()
            .is_some_and(|first| KEYS.iter().any(|key| first.starts_with(key)));
        if !is_provenance {
            return Ok(None);
        }
        let mut provenance = Self::default();
        for token in tokens {
            if let Some(value) = token.strip_prefix("Source:") {
                provenance.source = Some(parse_number(value, "Source")?);
            } else if let Some(value) = token.strip_prefix("Nodes:") {
                provenance.nodes = Some(parse_number(value, "Nodes")?);
            } else if let Some(value) = token.strip_prefix("Canonical:") {
                provenance.canonical = Some(value.to_string());
            }
        }
        Ok(Some(provenance))
    }
}

const KEYS: [&str; 3] = ["Source:", "Nodes:", "Canonical:"];

impl Display for BlockProvenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(3);
        if let Some(source) = self.source {
            parts.push(format!("Source:{source}"));
        }
        if let Some(nodes) = self.nodes {
            parts.push(format!("Nodes:{nodes}"));
        }
        if let Some(canonical) = &self.canonical {
            parts.push(format!("Canonical:{canonical}"));
        }
        write!(f, "{}", parts.join(" "))
    }
}

/// One graph read from a container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedBlock {
    /// Token following `digraph` on the header line.
    pub identifier: String,
    /// The parsed graph.
    pub graph: RegulatoryGraph,
    /// Provenance comment that preceded the block, if any.
    pub provenance: BlockProvenance,
}

/// Streaming reader over the blocks of a container.
///
/// Provenance comments are attached to the block that follows them and are
/// never carried past it.
pub struct DotReader<R> {
    lines: Lines<R>,
    line_no: usize,
}

impl<R: BufRead> DotReader<R> {
    /// Wraps a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }

    /// Reads the next block, returning `None` at end of input.
    pub fn next_block(&mut self) -> Result<Option<ParsedBlock>, HraError> {
        let mut pending = BlockProvenance::default();
        while let Some(line) = self.next_line()? {
            let trimmed = line.trim();
            if let Some(comment) = trimmed.strip_prefix("//") {
                if let Some(provenance) = BlockProvenance::parse(comment)? {
                    pending = provenance;
                }
                continue;
            }
            if let Some(header) = trimmed.strip_prefix("digraph") {
                let identifier = header.trim().trim_end_matches('{').trim().to_string();
                return self.read_body(identifier, pending).map(Some);
            }
        }
        Ok(None)
    }

    fn read_body(
        &mut self,
        identifier: String,
        provenance: BlockProvenance,
    ) -> Result<ParsedBlock, HraError> {
        let mut edges = Vec::new();
        let mut inferred = 0usize;
        while let Some(line) = self.next_line()? {
            let trimmed = line.trim();
            if trimmed.contains("->") {
                let edge = parse_edge_line(trimmed).map_err(|err| {
                    err.with_context("line", self.line_no)
                        .with_context("block", &identifier)
                })?;
                inferred = inferred.max(edge.from + 1).max(edge.to + 1);
                edges.push(edge);
            } else if trimmed.contains('}') {
                let node_count = inferred.max(provenance.nodes.unwrap_or(0));
                ensure_node_capacity(node_count)
                    .map_err(|err| err.with_context("block", &identifier))?;
                let graph = RegulatoryGraph::from_edges(node_count, edges)
                    .map_err(|err| err.with_context("block", &identifier))?;
                return Ok(ParsedBlock {
                    identifier,
                    graph,
                    provenance,
                });
            }
        }
        Err(HraError::Format(
            ErrorInfo::new("unterminated-block", "input ended inside a digraph block")
                .with_context("block", identifier),
        ))
    }

    fn next_line(&mut self) -> Result<Option<String>, HraError> {
        match self.lines.next() {
            None => Ok(None),
            Some(line) => {
                self.line_no += 1;
                line.map(Some).map_err(|err| HraError::io("container-read", err))
            }
        }
    }
}

impl<R: BufRead> Iterator for DotReader<R> {
    type Item = Result<ParsedBlock, HraError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_block().transpose()
    }
}

/// Writer emitting blocks in the interchange format.
pub struct DotWriter<W: Write> {
    inner: W,
    blocks: usize,
}

impl<W: Write> DotWriter<W> {
    /// Wraps a writer.
    pub fn new(inner: W) -> Self {
        Self { inner, blocks: 0 }
    }

    /// Writes a free-form `//` comment line.
    pub fn write_comment(&mut self, text: &str) -> Result<(), HraError> {
        writeln!(self.inner, "// {text}").map_err(|err| HraError::io("artifact-write", err))
    }

    /// Writes one block, preceded by its provenance comment when non-empty.
    pub fn write_block(
        &mut self,
        identifier: &str,
        graph: &RegulatoryGraph,
        provenance: &BlockProvenance,
    ) -> Result<(), HraError> {
        let mut text = String::new();
        if self.blocks > 0 {
            text.push('\n');
        }
        if !provenance.is_empty() {
            text.push_str(&format!("// {provenance}\n"));
        }
        text.push_str(&format!("digraph {identifier} {{\n"));
        for edge in graph.edges() {
            text.push_str(&format!(
                "  {} -> {} [label=\"{}\"];\n",
                edge.from, edge.to, edge.regulation
            ));
        }
        text.push_str("}\n");
        self.inner
            .write_all(text.as_bytes())
            .map_err(|err| HraError::io("artifact-write", err))?;
        self.blocks += 1;
        Ok(())
    }

    /// Returns the number of blocks written so far.
    pub fn blocks_written(&self) -> usize {
        self.blocks
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(mut self) -> Result<W, HraError> {
        self.inner
            .flush()
            .map_err(|err| HraError::io("artifact-flush", err))?;
        Ok(self.inner)
    }
}

/// Opens a container file for streaming.
pub fn open_container(path: &Path) -> Result<DotReader<BufReader<File>>, HraError> {
    let file = File::open(path).map_err(|err| {
        HraError::Input(
            ErrorInfo::new("container-open", err.to_string())
                .with_context("path", path.display()),
        )
    })?;
    Ok(DotReader::new(BufReader::new(file)))
}

/// Reads every block of a container.
pub fn read_container(path: &Path) -> Result<Vec<ParsedBlock>, HraError> {
    let blocks: Result<Vec<_>, _> = open_container(path)?.collect();
    let blocks = blocks.map_err(|err| err.with_context("path", path.display()))?;
    tracing::debug!(path = %path.display(), blocks = blocks.len(), "container loaded");
    Ok(blocks)
}

/// Reads the block at position `index` (zero based) of a container.
pub fn read_block_at(path: &Path, index: usize) -> Result<ParsedBlock, HraError> {
    let mut reader = open_container(path)?;
    let mut position = 0usize;
    while let Some(block) = reader.next_block()? {
        if position == index {
            return Ok(block);
        }
        position += 1;
    }
    Err(HraError::Input(
        ErrorInfo::new("index-out-of-range", "container has no graph at this index")
            .with_context("index", index)
            .with_context("available", position)
            .with_context("path", path.display()),
    ))
}

/// Writes a container through a `.partial` sibling that is renamed into place
/// only when `fill` succeeds. Returns the number of blocks written.
pub fn write_container<F>(path: &Path, fill: F) -> Result<usize, HraError>
where
    F: FnOnce(&mut DotWriter<BufWriter<File>>) -> Result<(), HraError>,
{
    let staging = staging_path(path);
    let file = File::create(&staging).map_err(|err| {
        HraError::io("artifact-create", err).with_context("path", staging.display())
    })?;
    let mut writer = DotWriter::new(BufWriter::new(file));
    let written = fill(&mut writer).and_then(|()| {
        let blocks = writer.blocks_written();
        writer.into_inner()?;
        Ok(blocks)
    });
    match written {
        Ok(blocks) => {
            fs::rename(&staging, path).map_err(|err| {
                HraError::io("artifact-rename", err).with_context("path", path.display())
            })?;
            Ok(blocks)
        }
        Err(err) => {
            let _ = fs::remove_file(&staging);
            Err(err)
        }
    }
}

fn staging_path(path: &Path) -> std::path::PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

/// Counts the block headers of a container without building graphs.
pub fn count_blocks(path: &Path) -> Result<usize, HraError> {
    let file = File::open(path).map_err(|err| {
        HraError::Input(
            ErrorInfo::new("container-open", err.to_string())
                .with_context("path", path.display()),
        )
    })?;
    let mut count = 0usize;
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|err| HraError::io("container-read", err))?;
        if line.trim_start().starts_with("digraph") {
            count += 1;
        }
    }
    Ok(count)
}

fn parse_edge_line(line: &str) -> Result<Edge, HraError> {
    let (lhs, rhs) = line
        .split_once("->")
        .ok_or_else(|| format_error("missing-arrow", "edge line has no `->`"))?;
    let from = parse_node(lhs)?;
    let (to, attributes) = rhs
        .split_once('[')
        .ok_or_else(|| format_error("missing-label", "edge line has no attribute list"))?;
    let to = parse_node(to)?;
    let start = attributes
        .find("label=\"")
        .ok_or_else(|| format_error("missing-label", "edge line has no label attribute"))?
        + "label=\"".len();
    let rest = &attributes[start..];
    let end = rest
        .find('"')
        .ok_or_else(|| format_error("missing-label", "label attribute is not terminated"))?;
    let label: u8 = rest[..end].trim().parse().map_err(|_| {
        format_error("invalid-regulation", "label is not numeric")
            .with_context("label", &rest[..end])
    })?;
    Ok(Edge::new(from, to, Regulation::from_label(label)?))
}

fn parse_node(token: &str) -> Result<usize, HraError> {
    let node: usize = token.trim().parse().map_err(|_| {
        format_error("invalid-node", "node id is not a non-negative integer")
            .with_context("token", token.trim())
    })?;
    if node >= MAX_NODES {
        return Err(HraError::Capacity(
            ErrorInfo::new("node-capacity", "node id exceeds the node maximum")
                .with_context("node", node)
                .with_context("max", MAX_NODES),
        ));
    }
    Ok(node)
}

fn parse_number(value: &str, key: &str) -> Result<usize, HraError> {
    value.parse().map_err(|_| {
        format_error("invalid-provenance", "provenance value is not numeric")
            .with_context("key", key)
            .with_context("value", value)
    })
}

fn format_error(code: &str, message: &str) -> HraError {
    HraError::Format(ErrorInfo::new(code, message))
}
