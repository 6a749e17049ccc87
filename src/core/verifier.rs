use crate::config::toml_config::VerifySettings;
use crate::domain::model::{ArtifactKind, SubBatchUnit};
use crate::domain::ports::Storage;
use crate::utils::error::{PipelineError, Result};
use std::io::ErrorKind;
use std::path::Path;

/// Checks the output artifacts of a single sub-batch.
///
/// A missing or malformed artifact is reported through the unit's flags and
/// never as an error, so a half-finished batch can be verified like any other.
/// Failures of the file system itself, such as permission errors, are returned.
pub struct ArtifactVerifier<S: Storage> {
    storage: S,
    settings: VerifySettings,
    keywords: Vec<String>,
}

impl<S: Storage> ArtifactVerifier<S> {
    pub fn new(storage: S, settings: VerifySettings) -> Self {
        let keywords = settings
            .completion_keywords
            .iter()
            .map(|k| k.to_lowercase())
            .collect();
        Self {
            storage,
            settings,
            keywords,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Verify the sub-batch whose artifacts share `prefix`, e.g.
    /// `/data/batch1/sub_batch_001` for `sub_batch_001.bed`, `.bim` and so on.
    pub fn verify_sub_batch(&self, prefix: &Path) -> Result<SubBatchUnit> {
        let name = prefix
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut unit = SubBatchUnit::new(name);

        for kind in ArtifactKind::ALL {
            let path = kind.path_for(prefix);
            let present = self.storage.exists(&path)?;
            tracing::debug!("{} {}: {}", unit.name, kind.label(), present);
            unit.presence.set(kind, present);
        }

        if unit.presence.marker_map {
            unit.marker_count = self.count_markers(&ArtifactKind::MarkerMap.path_for(prefix))?;
        }
        if unit.presence.log {
            unit.log_completed =
                self.log_reports_completion(&ArtifactKind::Log.path_for(prefix))?;
        }

        if !unit.is_complete() {
            tracing::debug!(
                "{} incomplete: missing {:?}, markers {}, log completed {}",
                unit.name,
                unit.presence.missing(),
                unit.marker_count,
                unit.log_completed
            );
        }
        Ok(unit)
    }

    /// Lines of the marker map containing the marker tag (case-sensitive).
    pub fn count_markers(&self, marker_map: &Path) -> Result<usize> {
        let Some(content) = self.read_artifact(marker_map)? else {
            return Ok(0);
        };
        Ok(content
            .lines()
            .filter(|line| line.contains(self.settings.marker_tag.as_str()))
            .count())
    }

    /// Whether any log line mentions a completion keyword, ignoring case.
    pub fn log_reports_completion(&self, log: &Path) -> Result<bool> {
        let Some(content) = self.read_artifact(log)? else {
            return Ok(false);
        };
        Ok(content.lines().any(|line| {
            let line = line.to_lowercase();
            self.keywords.iter().any(|k| line.contains(k.as_str()))
        }))
    }

    /// Artifact text, or `None` when the file is gone or is not valid text.
    fn read_artifact(&self, path: &Path) -> Result<Option<String>> {
        match self.storage.read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(PipelineError::IoError(e))
                if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::InvalidData) =>
            {
                tracing::warn!("Could not read {}: {}", path.display(), e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
