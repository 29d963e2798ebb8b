use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use hra_core::errors::{ErrorInfo, HraError};
use hra_core::limits::{MAX_NODES, MAX_WORKERS};
use hra_enum::{ExpandOpts, ExpansionStrategy};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::serde::{from_yaml_slice, to_yaml_string};

/// Worker count used when none, or an out-of-range one, is requested.
pub const DEFAULT_WORKERS: usize = 4;

/// Parameters of an expansion campaign.
///
/// Every field has a default so a YAML file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Concurrent expansion workers.
    pub workers: usize,
    /// Node count of the base graphs.
    pub start_size: usize,
    /// Node count of the expanded graphs.
    pub target_size: usize,
    /// Directory receiving per-base-graph artefacts and reports.
    pub out_dir: PathBuf,
    /// Exhaustive enumeration of the target size used for coverage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<PathBuf>,
    /// Frequency export, relative paths resolved against `out_dir`.
    pub stats_csv: PathBuf,
    /// Edge selection strategy for new nodes.
    pub strategy: ExpansionStrategy,
    /// Per-base-graph time limit in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            start_size: 3,
            target_size: 4,
            out_dir: PathBuf::from("hra_evolution_results"),
            reference: None,
            stats_csv: PathBuf::from("hra_stats.csv"),
            strategy: ExpansionStrategy::Exhaustive,
            timeout_secs: None,
        }
    }
}

impl RunConfig {
    /// Rejects configurations no campaign can run with.
    pub fn validate(&self) -> Result<(), HraError> {
        if self.workers == 0 {
            return Err(HraError::Input(
                ErrorInfo::new("invalid-workers", "worker count must be positive")
                    .with_context("workers", self.workers),
            ));
        }
        if self.target_size < self.start_size {
            return Err(HraError::Input(
                ErrorInfo::new("invalid-sizes", "target size is below the start size")
                    .with_context("start", self.start_size)
                    .with_context("target", self.target_size),
            ));
        }
        if self.target_size > MAX_NODES {
            return Err(HraError::Capacity(
                ErrorInfo::new("target-capacity", "target size exceeds the node maximum")
                    .with_context("target", self.target_size)
                    .with_context("max", MAX_NODES),
            ));
        }
        Ok(())
    }

    /// Worker count actually used: out-of-range requests fall back to
    /// [`DEFAULT_WORKERS`].
    pub fn effective_workers(&self) -> usize {
        if (1..=MAX_WORKERS).contains(&self.workers) {
            self.workers
        } else {
            warn!(
                requested = self.workers,
                fallback = DEFAULT_WORKERS,
                "worker count out of range"
            );
            DEFAULT_WORKERS
        }
    }

    /// Reference container, defaulting to `hras_dot_files/hras_n<target>.dot`.
    pub fn reference_path(&self) -> PathBuf {
        self.reference.clone().unwrap_or_else(|| {
            PathBuf::from("hras_dot_files").join(format!("hras_n{}.dot", self.target_size))
        })
    }

    /// Location of the frequency export.
    pub fn stats_csv_path(&self) -> PathBuf {
        if self.stats_csv.is_absolute() {
            self.stats_csv.clone()
        } else {
            self.out_dir.join(&self.stats_csv)
        }
    }

    /// Expansion options shared by every base graph of the campaign.
    pub fn expand_opts(&self) -> ExpandOpts {
        ExpandOpts {
            strategy: self.strategy,
            timeout: self.timeout_secs.map(Duration::from_secs),
            cancel: None,
        }
    }

    /// Serializes the configuration to YAML.
    pub fn to_yaml_string(&self) -> Result<String, HraError> {
        to_yaml_string(self)
    }
}

/// Loads a configuration file; missing fields take their defaults.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RunConfig, HraError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|err| {
        HraError::Input(
            ErrorInfo::new("config-read", err.to_string()).with_context("path", path.display()),
        )
    })?;
    from_yaml_slice(&bytes).map_err(|err| err.with_context("path", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_classic_runner() {
        let config = RunConfig::default();
        assert_eq!(config.effective_workers(), 4);
        assert_eq!(
            config.reference_path(),
            PathBuf::from("hras_dot_files/hras_n4.dot")
        );
        assert_eq!(
            config.stats_csv_path(),
            PathBuf::from("hra_evolution_results/hra_stats.csv")
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn out_of_range_workers_fall_back() {
        let config = RunConfig {
            workers: MAX_WORKERS + 1,
            ..RunConfig::default()
        };
        assert_eq!(config.effective_workers(), DEFAULT_WORKERS);
        let zero = RunConfig {
            workers: 0,
            ..RunConfig::default()
        };
        assert_eq!(zero.validate().unwrap_err().code(), "invalid-workers");
    }

    #[test]
    fn size_ordering_and_capacity_are_validated() {
        let shrinking = RunConfig {
            start_size: 4,
            target_size: 3,
            ..RunConfig::default()
        };
        assert_eq!(shrinking.validate().unwrap_err().code(), "invalid-sizes");
        let huge = RunConfig {
            target_size: MAX_NODES + 1,
            ..RunConfig::default()
        };
        assert!(matches!(huge.validate(), Err(HraError::Capacity(_))));
    }
}
