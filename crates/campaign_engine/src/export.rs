use std::path::{Path, PathBuf};

use campaign_core::Campaign;
use engine_logging::engine_info;
use serde_json::json;

use crate::persist::{AtomicFileWriter, PersistError};

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub results_filename: String,
    pub errors_filename: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            results_filename: "results.json".to_string(),
            errors_filename: "errors.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub node_count: usize,
    pub row_count: usize,
    pub error_count: usize,
    pub results_path: PathBuf,
    pub errors_path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("persist error: {0}")]
    Persist(#[from] PersistError),
    #[error("export filenames must differ, both are {0:?}")]
    FilenameClash(String),
}

/// Write the campaign's per-node results and its error table to `output_dir`.
pub fn export_campaign(
    output_dir: &Path,
    campaign: &Campaign,
    options: &ExportOptions,
) -> Result<ExportSummary, ExportError> {
    if options.results_filename == options.errors_filename {
        return Err(ExportError::FilenameClash(options.results_filename.clone()));
    }

    let writer = AtomicFileWriter::new(output_dir);
    let results = json!({
        "campaign_id": campaign.id,
        "status": campaign.status,
        "created_at": campaign.created_at,
        "updated_at": campaign.updated_at,
        "nodes_count": campaign.nodes_count,
        "totals": campaign.totals,
        "nodes": campaign.nodes,
    });
    let results_path = writer.write_json(&options.results_filename, &results)?;
    let errors_path = writer.write_json(&options.errors_filename, &campaign.errors)?;

    engine_info!(
        "Exported campaign {} to {:?}: nodes={} rows={} errors={}",
        campaign.id,
        output_dir,
        campaign.nodes.len(),
        campaign.query_results.len(),
        campaign.errors.len()
    );

    Ok(ExportSummary {
        node_count: campaign.nodes.len(),
        row_count: campaign.query_results.len(),
        error_count: campaign.errors.len(),
        results_path,
        errors_path,
    })
}
