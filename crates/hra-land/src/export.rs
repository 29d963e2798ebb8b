use std::fs;
use std::path::Path;

use hra_core::errors::{ErrorInfo, HraError};
use hra_graph::{write_container, BlockProvenance};

use crate::aggregate::{Summary, UniqueSet};
use crate::serde::to_canonical_json_bytes;

fn export_error(path: &Path, err: impl ToString) -> HraError {
    HraError::Io(
        ErrorInfo::new("hra-land.export", err.to_string()).with_context("path", path.display()),
    )
}

/// Writes the `CanonicalForm,SourceCount` table, one row per architecture in
/// canonical order.
pub fn write_frequency_csv(unique: &UniqueSet, path: &Path) -> Result<(), HraError> {
    let mut wtr = csv::Writer::from_path(path).map_err(|err| export_error(path, err))?;
    wtr.write_record(["CanonicalForm", "SourceCount"])
        .map_err(|err| export_error(path, err))?;
    for (rep, entry) in unique.iter() {
        wtr.write_record([rep.to_string(), entry.sources.len().to_string()])
            .map_err(|err| export_error(path, err))?;
    }
    wtr.flush().map_err(|err| export_error(path, err))
}

/// Writes `summary` as canonical JSON.
pub fn write_summary_json(summary: &Summary, path: &Path) -> Result<(), HraError> {
    let bytes = to_canonical_json_bytes(summary)?;
    fs::write(path, bytes).map_err(|err| export_error(path, err))
}

/// Writes one canonically labelled block per architecture, named by digest.
pub fn write_unique_container(unique: &UniqueSet, path: &Path) -> Result<usize, HraError> {
    write_container(path, |writer| {
        writer.write_comment(&format!("Unique HRAs: {}", unique.len()))?;
        for (rep, _) in unique.iter() {
            let provenance = BlockProvenance {
                source: None,
                nodes: Some(rep.node_count()),
                canonical: Some(rep.to_string()),
            };
            writer.write_block(&format!("HRA_{}", rep.digest()), &rep.to_graph()?, &provenance)?;
        }
        Ok(())
    })
}
