pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::Cli;
pub use config::HlaConfig;

pub use adapters::LocalStorage;
pub use crate::core::{
    aggregator::BatchAggregator, deployer::ResultDeployer, executor::BatchExecutor,
    genotype::ClinicalReporter, verifier::ArtifactVerifier,
};
pub use domain::model::{BatchReport, ClinicalReport, DeploymentReport, SubBatchUnit};
pub use domain::ports::Storage;
pub use utils::error::{PipelineError, Result};
