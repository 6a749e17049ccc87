pub mod aggregator;
pub mod artifacts;
pub mod deployer;
pub mod executor;
pub mod genotype;
pub mod report;
pub mod splitter;
pub mod verifier;

pub use crate::domain::model::{
    ArtifactKind, ArtifactPresence, BatchReport, ClinicalReport, DeploymentReport,
    ExecutionResult, GenotypeCall, ParticipantGenotype, SubBatchUnit,
};
pub use crate::domain::ports::Storage;
pub use crate::utils::error::Result;
