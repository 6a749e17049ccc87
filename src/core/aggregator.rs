use crate::core::verifier::ArtifactVerifier;
use crate::domain::model::{BatchReport, SubBatchUnit};
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

/// Discovers the sub-batches of a batch directory and verifies each one.
pub struct BatchAggregator<S: Storage> {
    verifier: ArtifactVerifier<S>,
}

impl<S: Storage> BatchAggregator<S> {
    pub fn new(verifier: ArtifactVerifier<S>) -> Self {
        Self { verifier }
    }

    /// Sub-batch prefixes in `batch_dir`, one per sample (`.fam`) file,
    /// sorted by file name.
    pub fn discover_prefixes(&self, batch_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut fams: Vec<PathBuf> = self
            .verifier
            .storage()
            .list_files(batch_dir)?
            .into_iter()
            .filter(|path| {
                path.file_name()
                    .map(|n| n.to_string_lossy().ends_with(".fam"))
                    .unwrap_or(false)
            })
            .collect();
        fams.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

        Ok(fams.into_iter().map(|fam| fam.with_extension("")).collect())
    }

    /// Verify one batch directory. The batch id defaults to the directory name.
    pub fn verify_batch(&self, batch_dir: &Path, batch_id: Option<&str>) -> Result<BatchReport> {
        let batch_id = match batch_id.filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => default_batch_id(batch_dir),
        };

        let units = self
            .discover_prefixes(batch_dir)?
            .iter()
            .map(|prefix| self.verifier.verify_sub_batch(prefix))
            .collect::<Result<Vec<SubBatchUnit>>>()?;

        let complete = units.iter().filter(|u| u.is_complete()).count();
        tracing::info!(
            "🔍 Batch {}: {}/{} sub-batches complete",
            batch_id,
            complete,
            units.len()
        );

        let mut report = BatchReport::new();
        report.insert(batch_id, units);
        Ok(report)
    }

    /// Verify several batch directories into one report, each keyed by its
    /// directory name.
    pub fn verify_batches<P: AsRef<Path>>(&self, batch_dirs: &[P]) -> Result<BatchReport> {
        let mut report = BatchReport::new();
        for dir in batch_dirs {
            report.merge(self.verify_batch(dir.as_ref(), None)?);
        }
        Ok(report)
    }
}

fn default_batch_id(batch_dir: &Path) -> String {
    batch_dir
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| batch_dir.display().to_string())
}
