use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use hra_aut::{canonicalize, canonicalize_with_automorphisms, CanonicalForm, CanonicalRep};
use hra_core::errors::HraError;
use hra_core::{RunProvenance, SourceTag};
use hra_graph::read_container;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Provenance of one canonical-distinct architecture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueEntry {
    /// Distinct tags of the base graphs or files that produced it.
    pub sources: BTreeSet<SourceTag>,
    /// Number of parsed graphs carrying this canonical form.
    pub occurrences: usize,
    /// Automorphism group order of the architecture.
    pub automorphism_order: u64,
}

/// Global dedup record keyed by canonical representation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniqueSet {
    entries: BTreeMap<CanonicalRep, UniqueEntry>,
}

impl UniqueSet {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one occurrence of `form` produced by `tag`; returns whether
    /// the form was new.
    pub fn record(&mut self, form: CanonicalForm, tag: SourceTag) -> bool {
        let mut inserted = false;
        let entry = self.entries.entry(form.rep).or_insert_with(|| {
            inserted = true;
            UniqueEntry {
                sources: BTreeSet::new(),
                occurrences: 0,
                automorphism_order: form.automorphism_order,
            }
        });
        entry.sources.insert(tag);
        entry.occurrences += 1;
        inserted
    }

    /// Number of distinct architectures.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Looks up the entry of one canonical form.
    pub fn get(&self, rep: &CanonicalRep) -> Option<&UniqueEntry> {
        self.entries.get(rep)
    }

    /// Iterates entries in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalRep, &UniqueEntry)> {
        self.entries.iter()
    }

    /// Architectures reached from more than one distinct source.
    pub fn multi_source_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.sources.len() > 1)
            .count()
    }

    /// Architectures reached from exactly one source.
    pub fn singleton_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| entry.sources.len() == 1)
            .count()
    }

    /// Architectures with at least one base-graph tag.
    pub fn via_expansion_count(&self) -> usize {
        self.entries
            .values()
            .filter(|entry| {
                entry
                    .sources
                    .iter()
                    .any(|tag| matches!(tag, SourceTag::Source(_)))
            })
            .count()
    }

    /// Number of architectures per automorphism group order.
    pub fn automorphism_histogram(&self) -> BTreeMap<u64, usize> {
        let mut histogram = BTreeMap::new();
        for entry in self.entries.values() {
            *histogram.entry(entry.automorphism_order).or_insert(0) += 1;
        }
        histogram
    }
}

/// Merged state of a set of artefacts.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    /// Deduplicated architectures.
    pub unique: UniqueSet,
    /// Artefacts read successfully.
    pub files_processed: usize,
    /// Artefacts that could not be read.
    pub files_failed: usize,
    /// Graphs parsed across all artefacts.
    pub graphs_parsed: usize,
    /// Parsed graphs that could not be canonicalised.
    pub graphs_skipped: usize,
}

/// Coverage of a reference enumeration by the expansion results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageStats {
    /// Reference container that was compared against.
    pub path: PathBuf,
    /// Canonical-distinct architectures in the reference.
    pub reference_total: usize,
    /// Expansion results also present in the reference.
    pub found_in_reference: usize,
    /// Expansion results absent from the reference.
    pub outside_reference: usize,
    /// `found_in_reference / reference_total`, absent for an empty reference.
    pub coverage: Option<f64>,
}

/// Statistics written next to the frequency export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// Run metadata.
    pub provenance: RunProvenance,
    /// Artefacts read successfully.
    pub files_processed: usize,
    /// Artefacts that could not be read.
    pub files_failed: usize,
    /// Graphs parsed across all artefacts.
    pub graphs_parsed: usize,
    /// Parsed graphs that could not be canonicalised.
    pub graphs_skipped: usize,
    /// Canonical-distinct architectures found.
    pub unique_total: usize,
    /// Architectures carrying at least one base-graph tag.
    pub via_expansion: usize,
    /// Architectures reached from more than one source.
    pub multi_source: usize,
    /// Architectures reached from exactly one source.
    pub singletons: usize,
    /// Comparison with the reference enumeration, when one was found.
    pub reference: Option<CoverageStats>,
    /// Architectures per automorphism group order.
    pub automorphism_orders: BTreeMap<u64, usize>,
}

/// Lists the `worker_*.dot` artefacts of `dir` in name order.
pub fn collect_artifacts(dir: &Path) -> Result<Vec<PathBuf>, HraError> {
    let entries = fs::read_dir(dir)
        .map_err(|err| HraError::io("artifact-dir", err).with_context("path", dir.display()))?;
    let mut paths = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|err| HraError::io("artifact-dir", err))?
            .path();
        let is_artifact = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.starts_with("worker_") && name.ends_with(".dot"));
        if is_artifact {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Fallback tag for blocks without a `Source:` comment: the base graph index
/// encoded in `worker_<w>_graph_<index>.dot`, else the file's position.
pub fn file_tag(path: &Path, ordinal: usize) -> SourceTag {
    let index = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(|stem| stem.rsplit_once("_graph_"))
        .and_then(|(_, index)| index.parse().ok());
    SourceTag::File(index.unwrap_or(ordinal))
}

/// Re-canonicalises every graph of `paths` into one dedup record.
///
/// Unreadable artefacts and graphs that cannot be canonicalised are logged
/// and counted, not fatal.
pub fn aggregate(paths: &[PathBuf]) -> Aggregation {
    let mut aggregation = Aggregation::default();
    for (ordinal, path) in paths.iter().enumerate() {
        let blocks = match read_container(path) {
            Ok(blocks) => blocks,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable artifact");
                aggregation.files_failed += 1;
                continue;
            }
        };
        let fallback = file_tag(path, ordinal);
        let mut fresh = 0usize;
        for block in &blocks {
            let tag = block
                .provenance
                .source
                .map(SourceTag::Source)
                .unwrap_or(fallback);
            let form = match canonicalize_with_automorphisms(&block.graph) {
                Ok(form) => form,
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        block = %block.identifier,
                        error = %err,
                        "skipping graph"
                    );
                    aggregation.graphs_skipped += 1;
                    continue;
                }
            };
            if aggregation.unique.record(form, tag) {
                fresh += 1;
            }
        }
        aggregation.files_processed += 1;
        aggregation.graphs_parsed += blocks.len();
        debug!(path = %path.display(), graphs = blocks.len(), fresh, "artifact merged");
    }
    info!(
        files = aggregation.files_processed,
        failed = aggregation.files_failed,
        graphs = aggregation.graphs_parsed,
        skipped = aggregation.graphs_skipped,
        unique = aggregation.unique.len(),
        "aggregation complete"
    );
    aggregation
}

/// Canonical forms of a reference container; `None` when the file is absent.
pub fn load_reference(path: &Path) -> Result<Option<BTreeSet<CanonicalRep>>, HraError> {
    if !path.exists() {
        info!(path = %path.display(), "no reference enumeration, coverage not computed");
        return Ok(None);
    }
    let blocks = read_container(path)?;
    let reference = blocks
        .iter()
        .map(|block| canonicalize(&block.graph))
        .collect::<Result<BTreeSet<_>, _>>()?;
    Ok(Some(reference))
}

/// Builds the run summary from merged artefacts and an optional reference.
pub fn summarize(
    aggregation: &Aggregation,
    reference: Option<(&Path, &BTreeSet<CanonicalRep>)>,
    mut provenance: RunProvenance,
) -> Summary {
    let unique = &aggregation.unique;
    let reference = reference.map(|(path, reference)| {
        let found = unique.iter().filter(|(rep, _)| reference.contains(*rep)).count();
        CoverageStats {
            path: path.to_path_buf(),
            reference_total: reference.len(),
            found_in_reference: found,
            outside_reference: unique.len() - found,
            coverage: (!reference.is_empty()).then(|| found as f64 / reference.len() as f64),
        }
    });
    if provenance.created_at.is_empty() {
        provenance.created_at = Utc::now().to_rfc3339();
    }
    provenance
        .tool_versions
        .entry("hra-land".to_string())
        .or_insert_with(|| env!("CARGO_PKG_VERSION").to_string());
    Summary {
        provenance,
        files_processed: aggregation.files_processed,
        files_failed: aggregation.files_failed,
        graphs_parsed: aggregation.graphs_parsed,
        graphs_skipped: aggregation.graphs_skipped,
        unique_total: unique.len(),
        via_expansion: unique.via_expansion_count(),
        multi_source: unique.multi_source_count(),
        singletons: unique.singleton_count(),
        reference,
        automorphism_orders: unique.automorphism_histogram(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_tags_prefer_the_encoded_index() {
        assert_eq!(
            file_tag(Path::new("out/worker_1_graph_42.dot"), 3),
            SourceTag::File(42)
        );
        assert_eq!(file_tag(Path::new("out/stray.dot"), 3), SourceTag::File(3));
    }

    #[test]
    fn record_counts_sources_and_occurrences() {
        let rep: CanonicalRep = "-00-".parse().unwrap();
        let form = CanonicalForm {
            rep: rep.clone(),
            automorphism_order: 2,
        };
        let mut unique = UniqueSet::new();
        assert!(unique.record(form.clone(), SourceTag::Source(0)));
        assert!(!unique.record(form.clone(), SourceTag::Source(1)));
        assert!(!unique.record(form, SourceTag::Source(1)));
        let entry = unique.get(&rep).unwrap();
        assert_eq!(entry.sources.len(), 2);
        assert_eq!(entry.occurrences, 3);
        assert_eq!(unique.multi_source_count(), 1);
        assert_eq!(unique.singleton_count(), 0);
        assert_eq!(unique.automorphism_histogram().get(&2), Some(&1));
    }
}
