use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// The six output artifacts expected for every sub-batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Genotype,
    MarkerMap,
    Samples,
    Dosage,
    Quality,
    Log,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 6] = [
        ArtifactKind::Genotype,
        ArtifactKind::MarkerMap,
        ArtifactKind::Samples,
        ArtifactKind::Dosage,
        ArtifactKind::Quality,
        ArtifactKind::Log,
    ];
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactPresence {
    pub genotype: bool,
    pub marker_map: bool,
    pub samples: bool,
    pub dosage: bool,
    pub quality: bool,
    pub log: bool,
}

impl ArtifactPresence {
    pub fn get(&self, kind: ArtifactKind) -> bool {
        match kind {
            ArtifactKind::Genotype => self.genotype,
            ArtifactKind::MarkerMap => self.marker_map,
            ArtifactKind::Samples => self.samples,
            ArtifactKind::Dosage => self.dosage,
            ArtifactKind::Quality => self.quality,
            ArtifactKind::Log => self.log,
        }
    }

    pub fn set(&mut self, kind: ArtifactKind, present: bool) {
        let flag = match kind {
            ArtifactKind::Genotype => &mut self.genotype,
            ArtifactKind::MarkerMap => &mut self.marker_map,
            ArtifactKind::Samples => &mut self.samples,
            ArtifactKind::Dosage => &mut self.dosage,
            ArtifactKind::Quality => &mut self.quality,
            ArtifactKind::Log => &mut self.log,
        };
        *flag = present;
    }

    pub fn all_present(&self) -> bool {
        ArtifactKind::ALL.iter().all(|kind| self.get(*kind))
    }

    pub fn missing(&self) -> Vec<ArtifactKind> {
        ArtifactKind::ALL
            .into_iter()
            .filter(|kind| !self.get(*kind))
            .collect()
    }
}

/// Verification outcome for one sub-batch. Completeness is always computed
/// from the flags, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "SubBatchRecord")]
pub struct SubBatchUnit {
    pub name: String,
    pub presence: ArtifactPresence,
    pub marker_count: usize,
    pub log_completed: bool,
}

impl SubBatchUnit {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            presence: ArtifactPresence::default(),
            marker_count: 0,
            log_completed: false,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.presence.all_present() && self.marker_count > 0 && self.log_completed
    }
}

#[derive(Serialize)]
struct SubBatchRecord {
    name: String,
    #[serde(flatten)]
    presence: ArtifactPresence,
    marker_count: usize,
    log_completed: bool,
    is_complete: bool,
}

impl From<SubBatchUnit> for SubBatchRecord {
    fn from(unit: SubBatchUnit) -> Self {
        let is_complete = unit.is_complete();
        Self {
            name: unit.name,
            presence: unit.presence,
            marker_count: unit.marker_count,
            log_completed: unit.log_completed,
            is_complete,
        }
    }
}

/// Sub-batch results keyed by batch id. Batch ids iterate in sorted order;
/// units keep the order they were discovered in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub batches: BTreeMap<String, Vec<SubBatchUnit>>,
}

impl BatchReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, batch_id: impl Into<String>, units: Vec<SubBatchUnit>) {
        self.batches.insert(batch_id.into(), units);
    }

    /// Later entries replace earlier ones with the same batch id.
    pub fn merge(&mut self, other: BatchReport) {
        self.batches.extend(other.batches);
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn total_sub_batches(&self) -> usize {
        self.batches.values().map(Vec::len).sum()
    }

    pub fn complete_sub_batches(&self) -> usize {
        self.batches
            .values()
            .flatten()
            .filter(|unit| unit.is_complete())
            .count()
    }

    pub fn completeness_rate(&self) -> f64 {
        let total = self.total_sub_batches();
        if total == 0 {
            return 0.0;
        }
        self.complete_sub_batches() as f64 / total as f64
    }

    pub fn incomplete_units(&self) -> Vec<(&str, &SubBatchUnit)> {
        self.batches
            .iter()
            .flat_map(|(batch_id, units)| {
                units
                    .iter()
                    .filter(|unit| !unit.is_complete())
                    .map(move |unit| (batch_id.as_str(), unit))
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenotypeCall {
    Homozygous,
    Heterozygous,
    Negative,
}

impl GenotypeCall {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenotypeCall::Homozygous => "homozygous",
            GenotypeCall::Heterozygous => "heterozygous",
            GenotypeCall::Negative => "negative",
        }
    }

    pub fn is_carrier(&self) -> bool {
        !matches!(self, GenotypeCall::Negative)
    }
}

impl fmt::Display for GenotypeCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticipantGenotype {
    pub participant_id: String,
    pub allele: String,
    pub dosage: f64,
    pub call: GenotypeCall,
    pub r2_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClinicalReport {
    pub allele: String,
    pub genotypes: Vec<ParticipantGenotype>,
}

impl ClinicalReport {
    pub fn new(allele: impl Into<String>) -> Self {
        Self {
            allele: allele.into(),
            genotypes: Vec::new(),
        }
    }

    pub fn carrier_count(&self) -> usize {
        self.genotypes.iter().filter(|g| g.call.is_carrier()).count()
    }

    pub fn total_participants(&self) -> usize {
        self.genotypes.len()
    }
}

/// Planning summary for one batch run through the imputation tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutionResult {
    pub batch_id: String,
    pub total_samples: usize,
    pub sub_batches: usize,
    pub completed: usize,
    pub failed: usize,
    pub sub_batch_files: Vec<PathBuf>,
}

impl ExecutionResult {
    pub fn new(batch_id: impl Into<String>) -> Self {
        Self {
            batch_id: batch_id.into(),
            total_samples: 0,
            sub_batches: 0,
            completed: 0,
            failed: 0,
            sub_batch_files: Vec::new(),
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.sub_batches == 0 {
            return 0.0;
        }
        self.completed as f64 / self.sub_batches as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeploymentReport {
    pub source_dir: PathBuf,
    pub target_dir: PathBuf,
    pub backup_dir: Option<PathBuf>,
    pub files_deployed: Vec<String>,
    pub files_backed_up: Vec<String>,
    pub verified: bool,
}

impl DeploymentReport {
    pub fn new(source_dir: PathBuf, target_dir: PathBuf) -> Self {
        Self {
            source_dir,
            target_dir,
            backup_dir: None,
            files_deployed: Vec::new(),
            files_backed_up: Vec::new(),
            verified: false,
        }
    }

    pub fn deployment_count(&self) -> usize {
        self.files_deployed.len()
    }
}
