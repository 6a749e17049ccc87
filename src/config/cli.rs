use crate::config::toml_config::HlaConfig;
use crate::utils::error::{PipelineError, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "hla-pipeline")]
#[command(about = "Split, verify, report on and deploy HLA imputation batches")]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Log time and memory use per stage
    #[arg(long, global = true)]
    pub monitor: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Split a sample file into sub-batch sample files
    Split(SplitArgs),
    /// Plan a batch run and print the imputation commands
    Plan(PlanArgs),
    /// Check the output artifacts of one or more batch directories
    Verify(VerifyArgs),
    /// Call genotypes for one allele from a dosage file
    Report(ReportArgs),
    /// Back up production and deploy new results
    Deploy(DeployArgs),
}

#[derive(Debug, Clone, Args)]
pub struct SplitArgs {
    /// Sample (.fam) file to split
    #[arg(long)]
    pub fam: PathBuf,

    #[arg(long)]
    pub output_dir: PathBuf,

    /// Samples per sub-batch (overrides pipeline.sub_batch_size)
    #[arg(long)]
    pub batch_size: Option<usize>,
}

#[derive(Debug, Clone, Args)]
pub struct PlanArgs {
    #[arg(long)]
    pub batch_id: String,

    /// Sample (.fam) file of the batch
    #[arg(long)]
    pub fam: PathBuf,

    #[arg(long)]
    pub work_dir: PathBuf,

    /// Prefix of the batch's PLINK fileset
    #[arg(long)]
    pub input_prefix: Option<String>,

    /// Probe annotation CSV used to rename array ids to rsIDs
    #[arg(long)]
    pub rename_map: Option<PathBuf>,

    #[arg(long)]
    pub batch_size: Option<usize>,
}

#[derive(Debug, Clone, Args)]
pub struct VerifyArgs {
    /// Batch directories containing sub-batch outputs
    #[arg(required = true)]
    pub batch_dirs: Vec<PathBuf>,

    /// Batch id to use instead of the directory name (single directory only)
    #[arg(long)]
    pub batch_id: Option<String>,

    /// Tag identifying HLA markers (overrides verify.marker_tag)
    #[arg(long)]
    pub marker_tag: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Exit with status 4 when any sub-batch is incomplete
    #[arg(long)]
    pub strict: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ReportArgs {
    /// Tab-separated dosage file
    #[arg(long)]
    pub dosage: PathBuf,

    /// Allele column to report on
    #[arg(long)]
    pub allele: String,

    /// Quality (r²) file to annotate calls with
    #[arg(long)]
    pub r2: Option<PathBuf>,

    #[arg(long)]
    pub sample_column: Option<String>,

    #[arg(long)]
    pub homozygous_threshold: Option<f64>,

    #[arg(long)]
    pub heterozygous_threshold: Option<f64>,

    /// CSV output path
    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Debug, Clone, Args)]
pub struct DeployArgs {
    #[arg(long)]
    pub source: PathBuf,

    #[arg(long)]
    pub target: PathBuf,

    #[arg(long)]
    pub backup_root: Option<PathBuf>,

    /// Extensions to deploy, e.g. .bed,.bim,.fam
    #[arg(long, value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Show what would be deployed without copying
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    /// Configuration file (or defaults) with this command's overrides applied.
    pub fn load_config(&self) -> Result<HlaConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path.display());
                HlaConfig::from_file(path)?
            }
            None => HlaConfig::default(),
        };
        self.command.apply_overrides(&mut config)?;
        Ok(config)
    }
}

impl Command {
    /// Fold command-line values into `config`. A zero `--batch-size` is
    /// rejected here as invalid input.
    pub fn apply_overrides(&self, config: &mut HlaConfig) -> Result<()> {
        match self {
            Command::Split(args) => apply_batch_size(config, args.batch_size)?,
            Command::Plan(args) => apply_batch_size(config, args.batch_size)?,
            Command::Verify(args) => {
                if let Some(tag) = &args.marker_tag {
                    config.verify.marker_tag = tag.clone();
                }
            }
            Command::Report(args) => {
                if let Some(column) = &args.sample_column {
                    config.genotype.sample_column = column.clone();
                }
                if let Some(threshold) = args.homozygous_threshold {
                    config.genotype.homozygous_threshold = threshold;
                }
                if let Some(threshold) = args.heterozygous_threshold {
                    config.genotype.heterozygous_threshold = threshold;
                }
            }
            Command::Deploy(args) => {
                if !args.extensions.is_empty() {
                    config.deploy.extensions = args.extensions.clone();
                }
                if let Some(root) = &args.backup_root {
                    config.deploy.backup_root = Some(root.clone());
                }
            }
        }
        Ok(())
    }
}

fn apply_batch_size(config: &mut HlaConfig, batch_size: Option<usize>) -> Result<()> {
    match batch_size {
        Some(0) => Err(PipelineError::invalid_input(
            "--batch-size must be a positive integer",
        )),
        Some(size) => {
            config.pipeline.sub_batch_size = size;
            Ok(())
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_verify() {
        let cli = Cli::try_parse_from([
            "hla-pipeline",
            "verify",
            "/data/B001",
            "/data/B002",
            "--json",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        match cli.command {
            Command::Verify(args) => {
                assert_eq!(args.batch_dirs.len(), 2);
                assert!(args.json);
                assert!(!args.strict);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_verify_requires_directory() {
        assert!(Cli::try_parse_from(["hla-pipeline", "verify"]).is_err());
    }

    #[test]
    fn test_overrides_apply_to_defaults() {
        let cli = Cli::try_parse_from([
            "hla-pipeline",
            "report",
            "--dosage",
            "d.raw",
            "--allele",
            "HLA_A_0201",
            "--heterozygous-threshold",
            "0.4",
            "-o",
            "out.csv",
        ])
        .unwrap();

        let config = cli.load_config().unwrap();
        assert_eq!(config.genotype.heterozygous_threshold, 0.4);
        assert_eq!(config.genotype.homozygous_threshold, 1.5);
    }

    #[test]
    fn test_deploy_extensions_delimited() {
        let cli = Cli::try_parse_from([
            "hla-pipeline",
            "deploy",
            "--source",
            "out",
            "--target",
            "prod",
            "--extensions",
            ".bed,.bim,.fam,.dosage",
            "--dry-run",
        ])
        .unwrap();

        let config = cli.load_config().unwrap();
        assert_eq!(config.deploy.extensions.len(), 4);
        assert!(matches!(cli.command, Command::Deploy(ref args) if args.dry_run));
    }

    #[test]
    fn test_zero_batch_size_is_invalid_input() {
        for command in ["split", "plan"] {
            let mut argv = vec!["hla-pipeline", command, "--fam", "B001.fam", "--batch-size", "0"];
            if command == "split" {
                argv.extend(["--output-dir", "subs"]);
            } else {
                argv.extend(["--batch-id", "B001", "--work-dir", "work"]);
            }
            let cli = Cli::try_parse_from(argv).unwrap();
            let err = cli.load_config().unwrap_err();
            assert!(matches!(err, PipelineError::InvalidInput { .. }), "{}", command);
        }

        let cli = Cli::try_parse_from([
            "hla-pipeline", "split", "--fam", "B001.fam", "--output-dir", "subs", "--batch-size", "250",
        ])
        .unwrap();
        assert_eq!(cli.load_config().unwrap().pipeline.sub_batch_size, 250);
    }
}
