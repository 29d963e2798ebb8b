#![deny(missing_docs)]
#![doc = "Parallel expansion campaigns over a corpus of base graphs, global \
deduplication of their artefacts and the resulting coverage reports."]

/// Merging of expansion artefacts into one deduplicated population.
pub mod aggregate;
/// Run configuration loading and validation.
pub mod config;
/// Partitioning and worker-pool execution of expansions.
pub mod dispatch;
/// CSV, JSON and container exports of aggregated results.
pub mod export;
/// End-to-end campaign entry points.
pub mod runner;
/// Seeded selection of base graphs.
pub mod sample;
/// Canonical JSON and YAML serde helpers.
pub mod serde;

pub use aggregate::{
    aggregate, collect_artifacts, file_tag, load_reference, summarize, Aggregation, CoverageStats,
    Summary, UniqueEntry, UniqueSet,
};
pub use config::{load_config, RunConfig, DEFAULT_WORKERS};
pub use dispatch::{
    artifact_name, dispatch, dispatch_indices, load_base_graphs, partition, ArtifactRecord,
    DispatchReport, SkippedBase,
};
pub use export::{write_frequency_csv, write_summary_json, write_unique_container};
pub use runner::{
    report_artifacts, run_evolution, run_sampled, ReportOutcome, RunOutcome, SUMMARY_FILE,
    UNIQUE_FILE,
};
pub use sample::sample_indices;
