use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use hra_core::errors::HraError;
use hra_core::RunProvenance;
use tracing::info;

use crate::aggregate::{aggregate, load_reference, summarize, Summary};
use crate::config::RunConfig;
use crate::dispatch::{dispatch, dispatch_indices, load_base_graphs, DispatchReport};
use crate::export::{write_frequency_csv, write_summary_json, write_unique_container};
use crate::sample::sample_indices;

/// Name of the JSON summary inside the output directory.
pub const SUMMARY_FILE: &str = "summary.json";
/// Name of the merged container of unique architectures.
pub const UNIQUE_FILE: &str = "unique_hras.dot";

/// Files and statistics produced from a set of artefacts.
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    /// Aggregated statistics.
    pub summary: Summary,
    /// Frequency export.
    pub csv_path: PathBuf,
    /// JSON summary.
    pub summary_path: PathBuf,
    /// Container of unique architectures.
    pub unique_path: PathBuf,
}

/// Result of a full campaign.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Worker results.
    pub dispatch: DispatchReport,
    /// Aggregated results.
    pub report: ReportOutcome,
}

/// Expands every base graph of `container`, then aggregates the artefacts.
pub fn run_evolution(container: &Path, config: &RunConfig) -> Result<RunOutcome, HraError> {
    let dispatch = dispatch(container, config)?;
    finish(container, config, dispatch)
}

/// Expands `count` seeded picks from `container`, then aggregates them.
pub fn run_sampled(
    container: &Path,
    config: &RunConfig,
    seed: u64,
    count: usize,
) -> Result<RunOutcome, HraError> {
    let bases = load_base_graphs(container)?;
    let indices = sample_indices(bases.len(), count, seed);
    info!(seed, requested = count, picked = ?indices, "sampled base graphs");
    let dispatch = dispatch_indices(container, &bases, &indices, config)?;
    finish(container, config, dispatch)
}

fn finish(
    container: &Path,
    config: &RunConfig,
    dispatch: DispatchReport,
) -> Result<RunOutcome, HraError> {
    let paths: Vec<PathBuf> = dispatch
        .artifacts
        .iter()
        .map(|record| record.path.clone())
        .collect();
    let report = report_artifacts(&paths, &container.display().to_string(), config)?;
    Ok(RunOutcome { dispatch, report })
}

/// Aggregates `paths`, compares them with the configured reference and
/// writes the frequency export, the JSON summary and the unique container.
pub fn report_artifacts(
    paths: &[PathBuf],
    input: &str,
    config: &RunConfig,
) -> Result<ReportOutcome, HraError> {
    fs::create_dir_all(&config.out_dir).map_err(|err| {
        HraError::io("out-dir", err).with_context("path", config.out_dir.display())
    })?;
    let aggregation = aggregate(paths);
    let reference_path = config.reference_path();
    let reference = load_reference(&reference_path)?;
    let provenance = RunProvenance {
        input: input.to_string(),
        start_size: config.start_size,
        target_size: config.target_size,
        created_at: Utc::now().to_rfc3339(),
        tool_versions: BTreeMap::new(),
    };
    let summary = summarize(
        &aggregation,
        reference
            .as_ref()
            .map(|reference| (reference_path.as_path(), reference)),
        provenance,
    );

    let csv_path = config.stats_csv_path();
    write_frequency_csv(&aggregation.unique, &csv_path)?;
    let summary_path = config.out_dir.join(SUMMARY_FILE);
    write_summary_json(&summary, &summary_path)?;
    let unique_path = config.out_dir.join(UNIQUE_FILE);
    write_unique_container(&aggregation.unique, &unique_path)?;
    info!(
        unique = summary.unique_total,
        multi_source = summary.multi_source,
        csv = %csv_path.display(),
        "reports written"
    );
    Ok(ReportOutcome {
        summary,
        csv_path,
        summary_path,
        unique_path,
    })
}
