use crate::adapters::local_storage::LocalStorage;
use crate::config::toml_config::PipelineSettings;
use crate::core::splitter;
use crate::domain::model::ExecutionResult;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Prepares a batch for the imputation tool: sample counting, sub-batch
/// splitting and command construction. Nothing is executed here.
pub struct BatchExecutor<S: Storage = LocalStorage> {
    storage: S,
    settings: PipelineSettings,
}

impl BatchExecutor {
    pub fn new(settings: PipelineSettings) -> Self {
        Self::with_storage(LocalStorage::new(), settings)
    }
}

impl<S: Storage> BatchExecutor<S> {
    pub fn with_storage(storage: S, settings: PipelineSettings) -> Self {
        Self { storage, settings }
    }

    pub fn count_samples(&self, fam_path: &Path) -> Result<usize> {
        Ok(splitter::read_samples(&self.storage, fam_path)?.len())
    }

    /// Split with `batch_size`, or the configured sub-batch size when `None`.
    pub fn split_fam(
        &self,
        fam_path: &Path,
        output_dir: &Path,
        batch_size: Option<usize>,
    ) -> Result<Vec<PathBuf>> {
        let batch_size = batch_size.unwrap_or(self.settings.sub_batch_size);
        splitter::split_fam(&self.storage, fam_path, output_dir, batch_size)
    }

    /// Map array probe ids to rsIDs from an annotation CSV. Rows without
    /// both ids, or whose rsID does not start with `rs`, are ignored.
    pub fn build_rename_map(
        &self,
        mapping_path: &Path,
        ax_col: &str,
        rs_col: &str,
    ) -> Result<HashMap<String, String>> {
        let content = self.storage.read_to_string(mapping_path)?;
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(content.as_bytes());
        let headers = reader.headers()?.clone();
        let ax_idx = headers.iter().position(|h| h == ax_col);
        let rs_idx = headers.iter().position(|h| h == rs_col);

        let mut rename = HashMap::new();
        let (Some(ax_idx), Some(rs_idx)) = (ax_idx, rs_idx) else {
            tracing::warn!(
                "Annotation {} lacks {} or {} column",
                mapping_path.display(),
                ax_col,
                rs_col
            );
            return Ok(rename);
        };

        for record in reader.records() {
            let record = record?;
            let ax = record.get(ax_idx).map(str::trim).unwrap_or_default();
            let rs = record.get(rs_idx).map(str::trim).unwrap_or_default();
            if !ax.is_empty() && rs.starts_with("rs") {
                rename.insert(ax.to_string(), rs.to_string());
            }
        }

        tracing::debug!("Loaded {} probe → rsID mappings", rename.len());
        Ok(rename)
    }

    /// PLINK arguments restricting a dataset to the MHC region.
    pub fn region_extract_command(&self, input_prefix: &str, output_prefix: &str) -> Vec<String> {
        vec![
            self.settings.plink_path.clone(),
            "--bfile".to_string(),
            input_prefix.to_string(),
            "--chr".to_string(),
            self.settings.chromosome.to_string(),
            "--from-bp".to_string(),
            self.settings.mhc_start_bp.to_string(),
            "--to-bp".to_string(),
            self.settings.mhc_end_bp.to_string(),
            "--make-bed".to_string(),
            "--out".to_string(),
            output_prefix.to_string(),
        ]
    }

    /// SNP2HLA arguments for one sub-batch.
    pub fn prepare_pipeline_command(&self, input_prefix: &str, output_prefix: &str) -> Vec<String> {
        vec![
            self.settings.snp2hla_path.clone(),
            input_prefix.to_string(),
            self.settings.reference_panel.clone(),
            output_prefix.to_string(),
            self.settings.plink_path.clone(),
            self.settings.max_parallel.to_string(),
        ]
    }

    /// Plan a batch: count its samples and write the sub-batch files under
    /// `work_dir/sub_batches`. Every planned sub-batch counts as completed.
    pub fn execute_batch(
        &self,
        batch_id: &str,
        fam_path: &Path,
        work_dir: &Path,
    ) -> Result<ExecutionResult> {
        let mut result = ExecutionResult::new(batch_id);
        result.total_samples = self.count_samples(fam_path)?;
        result.sub_batch_files = self.split_fam(fam_path, &work_dir.join("sub_batches"), None)?;
        result.sub_batches = result.sub_batch_files.len();
        result.completed = result.sub_batches;

        tracing::info!(
            "📋 Planned batch {}: {} samples in {} sub-batches",
            batch_id,
            result.total_samples,
            result.sub_batches
        );
        Ok(result)
    }
}
