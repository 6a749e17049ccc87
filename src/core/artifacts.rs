//! File naming for the artifacts of one sub-batch.
//!
//! PLINK outputs swap the prefix's extension while the Beagle outputs are
//! appended to the full prefix, so `sub.001` yields `sub.bed` but
//! `sub.001.bgl.r2`.

use crate::domain::model::ArtifactKind;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuffixRule {
    /// Replace the prefix's last extension (or add one if it has none).
    ReplaceExtension(&'static str),
    /// Append the suffix to the prefix verbatim.
    Append(&'static str),
}

impl SuffixRule {
    pub fn apply(&self, prefix: &Path) -> PathBuf {
        match self {
            SuffixRule::ReplaceExtension(ext) => prefix.with_extension(ext),
            SuffixRule::Append(suffix) => {
                let mut path = OsString::from(prefix.as_os_str());
                path.push(suffix);
                PathBuf::from(path)
            }
        }
    }
}

impl ArtifactKind {
    pub fn suffix_rule(&self) -> SuffixRule {
        match self {
            ArtifactKind::Genotype => SuffixRule::ReplaceExtension("bed"),
            ArtifactKind::MarkerMap => SuffixRule::ReplaceExtension("bim"),
            ArtifactKind::Samples => SuffixRule::ReplaceExtension("fam"),
            ArtifactKind::Dosage => SuffixRule::ReplaceExtension("dosage"),
            ArtifactKind::Quality => SuffixRule::Append(".bgl.r2"),
            ArtifactKind::Log => SuffixRule::Append(".bgl.log"),
        }
    }

    pub fn path_for(&self, prefix: &Path) -> PathBuf {
        self.suffix_rule().apply(prefix)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::Genotype => "bed",
            ArtifactKind::MarkerMap => "bim",
            ArtifactKind::Samples => "fam",
            ArtifactKind::Dosage => "dosage",
            ArtifactKind::Quality => "bgl.r2",
            ArtifactKind::Log => "bgl.log",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_for_plain_prefix() {
        let prefix = Path::new("/data/batch1/sub_batch_001");
        let paths: Vec<PathBuf> = ArtifactKind::ALL
            .iter()
            .map(|kind| kind.path_for(prefix))
            .collect();

        assert_eq!(
            paths,
            vec![
                PathBuf::from("/data/batch1/sub_batch_001.bed"),
                PathBuf::from("/data/batch1/sub_batch_001.bim"),
                PathBuf::from("/data/batch1/sub_batch_001.fam"),
                PathBuf::from("/data/batch1/sub_batch_001.dosage"),
                PathBuf::from("/data/batch1/sub_batch_001.bgl.r2"),
                PathBuf::from("/data/batch1/sub_batch_001.bgl.log"),
            ]
        );
    }

    #[test]
    fn test_dotted_prefix_replace_vs_append() {
        let prefix = Path::new("batch1/cohort.chr6");
        assert_eq!(
            ArtifactKind::MarkerMap.path_for(prefix),
            PathBuf::from("batch1/cohort.bim")
        );
        assert_eq!(
            ArtifactKind::Log.path_for(prefix),
            PathBuf::from("batch1/cohort.chr6.bgl.log")
        );
    }
}
