use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};

use hra_core::errors::{ErrorInfo, HraError};
use hra_enum::{expand_base_graph, write_expansion, ExpandOpts};
use hra_graph::{count_blocks, open_container, ParsedBlock};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::RunConfig;

/// One artefact written by a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    /// Worker that produced the artefact.
    pub worker: usize,
    /// Base graph index inside the container.
    pub index: usize,
    /// Artefact location.
    pub path: PathBuf,
    /// HRAs written.
    pub graphs: usize,
    /// Candidate extensions visited.
    pub candidates: u64,
    /// Expansion time in milliseconds.
    pub elapsed_ms: u64,
}

/// A base graph that could not be expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedBase {
    /// Worker the index was assigned to.
    pub worker: usize,
    /// Base graph index inside the container.
    pub index: usize,
    /// Reason the expansion failed.
    pub error: HraError,
}

/// Outcome of dispatching expansions over a container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DispatchReport {
    /// Base graphs available in the container.
    pub base_graphs: usize,
    /// Worker count used.
    pub workers: usize,
    /// Artefacts written, ordered by base graph index.
    pub artifacts: Vec<ArtifactRecord>,
    /// Base graphs skipped, ordered by index.
    pub skipped: Vec<SkippedBase>,
}

#[derive(Default)]
struct WorkerOutcome {
    artifacts: Vec<ArtifactRecord>,
    skipped: Vec<SkippedBase>,
}

/// Splits `0..total` into contiguous ranges of `ceil(total / workers)` items.
///
/// Only the last range may be shorter; empty ranges are dropped, so fewer
/// than `workers` ranges come back when there is not enough work.
pub fn partition(total: usize, workers: usize) -> Vec<Range<usize>> {
    if total == 0 || workers == 0 {
        return Vec::new();
    }
    let chunk = (total + workers - 1) / workers;
    (0..workers)
        .map(|worker| (worker * chunk).min(total)..((worker + 1) * chunk).min(total))
        .filter(|range| !range.is_empty())
        .collect()
}

/// File name of the artefact holding the results of one base graph.
pub fn artifact_name(worker: usize, index: usize) -> String {
    format!("worker_{worker}_graph_{index}.dot")
}

/// Reads every block of `container`, keeping per-block parse failures so a
/// malformed graph only costs its own index.
pub fn load_base_graphs(container: &Path) -> Result<Vec<Result<ParsedBlock, HraError>>, HraError> {
    let mut reader = open_container(container)?;
    let mut blocks = Vec::new();
    loop {
        match reader.next_block() {
            Ok(Some(block)) => blocks.push(Ok(block)),
            Ok(None) => break,
            Err(err @ HraError::Io(_)) => return Err(err),
            Err(err) => blocks.push(Err(err)),
        }
    }
    Ok(blocks)
}

/// Expands every base graph of `container` across the configured workers.
pub fn dispatch(container: &Path, config: &RunConfig) -> Result<DispatchReport, HraError> {
    let bases = load_base_graphs(container)?;
    let indices: Vec<usize> = (0..bases.len()).collect();
    dispatch_indices(container, &bases, &indices, config)
}

/// Expands the selected base graphs across the configured workers.
///
/// `indices` is partitioned contiguously; each worker walks its share in
/// order and writes one artefact per base graph into `config.out_dir`.
/// Failures are logged and reported as skipped without stopping any worker.
pub fn dispatch_indices(
    container: &Path,
    bases: &[Result<ParsedBlock, HraError>],
    indices: &[usize],
    config: &RunConfig,
) -> Result<DispatchReport, HraError> {
    config.validate()?;
    fs::create_dir_all(&config.out_dir).map_err(|err| {
        HraError::io("out-dir", err).with_context("path", config.out_dir.display())
    })?;
    let declared = count_blocks(container)?;
    if declared != bases.len() {
        warn!(
            declared,
            parsed = bases.len(),
            "block count differs from parsed entries"
        );
    }
    let workers = config.effective_workers();
    let ranges = partition(indices.len(), workers);
    info!(
        container = %container.display(),
        base_graphs = bases.len(),
        selected = indices.len(),
        workers,
        start = config.start_size,
        target = config.target_size,
        "dispatching expansions"
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|err| HraError::io("thread-pool", err))?;
    let opts = config.expand_opts();
    let outcomes: Vec<WorkerOutcome> = pool.install(|| {
        ranges
            .par_iter()
            .enumerate()
            .map(|(worker, range)| run_worker(worker, &indices[range.clone()], bases, config, &opts))
            .collect()
    });

    let mut artifacts = Vec::new();
    let mut skipped = Vec::new();
    for outcome in outcomes {
        artifacts.extend(outcome.artifacts);
        skipped.extend(outcome.skipped);
    }
    artifacts.sort_by_key(|record| record.index);
    skipped.sort_by_key(|entry| entry.index);
    info!(
        artifacts = artifacts.len(),
        skipped = skipped.len(),
        "all workers finished"
    );
    Ok(DispatchReport {
        base_graphs: bases.len(),
        workers,
        artifacts,
        skipped,
    })
}

fn run_worker(
    worker: usize,
    indices: &[usize],
    bases: &[Result<ParsedBlock, HraError>],
    config: &RunConfig,
    opts: &ExpandOpts,
) -> WorkerOutcome {
    let mut outcome = WorkerOutcome::default();
    for &index in indices {
        match expand_one(worker, index, bases, config, opts) {
            Ok(record) => outcome.artifacts.push(record),
            Err(error) => {
                warn!(worker, index, %error, "skipping base graph");
                outcome.skipped.push(SkippedBase {
                    worker,
                    index,
                    error,
                });
            }
        }
    }
    debug!(
        worker,
        written = outcome.artifacts.len(),
        skipped = outcome.skipped.len(),
        "worker done"
    );
    outcome
}

fn expand_one(
    worker: usize,
    index: usize,
    bases: &[Result<ParsedBlock, HraError>],
    config: &RunConfig,
    opts: &ExpandOpts,
) -> Result<ArtifactRecord, HraError> {
    let block = match bases.get(index) {
        Some(Ok(block)) => block,
        Some(Err(err)) => return Err(err.clone()),
        None => {
            return Err(HraError::Input(
                ErrorInfo::new("index-out-of-range", "container has no graph at this index")
                    .with_context("index", index)
                    .with_context("available", bases.len()),
            ))
        }
    };
    let result = expand_base_graph(
        &block.graph,
        index,
        config.start_size,
        config.target_size,
        opts,
    )?;
    let path = config.out_dir.join(artifact_name(worker, index));
    let graphs = write_expansion(&result, &path)?;
    debug!(worker, index, graphs, path = %path.display(), "artifact written");
    Ok(ArtifactRecord {
        worker,
        index,
        path,
        graphs,
        candidates: result.candidates,
        elapsed_ms: result.elapsed.as_millis() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_matches_the_classic_split() {
        assert_eq!(partition(10, 4), vec![0..3, 3..6, 6..9, 9..10]);
        assert_eq!(partition(3, 4), vec![0..1, 1..2, 2..3]);
        assert_eq!(partition(9, 2), vec![0..5, 5..9]);
        assert!(partition(0, 4).is_empty());
    }

    #[test]
    fn artifact_names_encode_worker_and_index() {
        assert_eq!(artifact_name(2, 17), "worker_2_graph_17.dot");
    }
}
