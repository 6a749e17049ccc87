use clap::Parser;
use hla_pipeline::config::cli::{Command, DeployArgs, PlanArgs, ReportArgs, SplitArgs, VerifyArgs};
use hla_pipeline::core::{genotype, report, splitter};
use hla_pipeline::utils::error::ErrorSeverity;
use hla_pipeline::utils::monitor::StageMonitor;
use hla_pipeline::utils::{logger, validation::Validate};
use hla_pipeline::{
    ArtifactVerifier, BatchAggregator, BatchExecutor, Cli, ClinicalReporter, HlaConfig,
    LocalStorage, PipelineError, ResultDeployer,
};

/// Exit status of `verify --strict` when some sub-batch is incomplete.
const EXIT_INCOMPLETE: i32 = 4;

fn main() {
    let cli = Cli::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting hla-pipeline");
    if cli.verbose {
        tracing::debug!("CLI args: {:?}", cli);
    }

    let mut monitor = StageMonitor::new(cli.monitor);
    if monitor.is_enabled() {
        tracing::info!("🔍 Stage monitoring enabled");
    }

    let exit_code = match run(&cli, &mut monitor) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(
                "❌ {} (Category: {:?}, Severity: {:?})",
                e,
                e.category(),
                e.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());

            // 根據錯誤嚴重程度決定退出碼
            match e.severity() {
                ErrorSeverity::Low => 0,
                ErrorSeverity::Medium => 2,
                ErrorSeverity::High => 1,
                ErrorSeverity::Critical => 3,
            }
        }
    };

    monitor.log_stage("finished");
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli, monitor: &mut StageMonitor) -> Result<i32, PipelineError> {
    let config = cli.load_config()?;
    config.validate()?;
    monitor.log_stage("configuration");

    match &cli.command {
        Command::Split(args) => run_split(&config, args),
        Command::Plan(args) => run_plan(&config, args),
        Command::Verify(args) => run_verify(&config, args),
        Command::Report(args) => run_report(&config, args),
        Command::Deploy(args) => run_deploy(&config, args),
    }
}

fn run_split(config: &HlaConfig, args: &SplitArgs) -> Result<i32, PipelineError> {
    let paths = splitter::split_fam(
        &LocalStorage::new(),
        &args.fam,
        &args.output_dir,
        config.pipeline.sub_batch_size,
    )?;
    for path in &paths {
        println!("{}", path.display());
    }
    Ok(0)
}

fn run_plan(config: &HlaConfig, args: &PlanArgs) -> Result<i32, PipelineError> {
    let executor = BatchExecutor::new(config.pipeline.clone());
    let result = executor.execute_batch(&args.batch_id, &args.fam, &args.work_dir)?;

    println!("📋 Batch {}", result.batch_id);
    println!("  Samples:     {}", result.total_samples);
    println!("  Sub-batches: {}", result.sub_batches);

    if let Some(mapping) = &args.rename_map {
        let rename = executor.build_rename_map(mapping, "probesetid", "rsid")?;
        println!("  Renamable probe ids: {}", rename.len());
    }

    if let Some(input_prefix) = &args.input_prefix {
        let mhc_prefix = args.work_dir.join(format!("{}_mhc", result.batch_id));
        let mhc_prefix = mhc_prefix.to_string_lossy();
        println!();
        println!("{}", executor.region_extract_command(input_prefix, &mhc_prefix).join(" "));
    }

    println!();
    for sub_batch in &result.sub_batch_files {
        let prefix = sub_batch.with_extension("");
        let prefix = prefix.to_string_lossy();
        let output = format!("{}_imputed", prefix);
        println!("{}", executor.prepare_pipeline_command(&prefix, &output).join(" "));
    }
    Ok(0)
}

fn run_verify(config: &HlaConfig, args: &VerifyArgs) -> Result<i32, PipelineError> {
    let verifier = ArtifactVerifier::new(LocalStorage::new(), config.verify.clone());
    let aggregator = BatchAggregator::new(verifier);

    let batch_report = match (&args.batch_id, args.batch_dirs.as_slice()) {
        (Some(id), [dir]) => aggregator.verify_batch(dir, Some(id.as_str()))?,
        (Some(_), _) => {
            return Err(PipelineError::invalid_input(
                "--batch-id can only be used with a single batch directory",
            ))
        }
        (None, dirs) => aggregator.verify_batches(dirs)?,
    };

    let text = if args.json {
        report::report_json(&batch_report)?
    } else {
        report::format_report(&batch_report)
    };

    match &args.output {
        Some(path) => {
            std::fs::write(path, text + "\n")?;
            tracing::info!("📁 Report saved to: {}", path.display());
        }
        None => println!("{}", text),
    }

    if args.strict && batch_report.complete_sub_batches() < batch_report.total_sub_batches() {
        for (batch_id, unit) in batch_report.incomplete_units() {
            tracing::warn!("Incomplete: {}/{}", batch_id, unit.name);
        }
        return Ok(EXIT_INCOMPLETE);
    }
    Ok(0)
}

fn run_report(config: &HlaConfig, args: &ReportArgs) -> Result<i32, PipelineError> {
    let r2_scores = match &args.r2 {
        Some(path) => Some(genotype::load_r2_scores(path)?),
        None => None,
    };

    let reporter = ClinicalReporter::new(config.genotype.clone());
    let clinical = reporter.generate_report(&args.dosage, &args.allele, r2_scores.as_ref())?;
    genotype::export_csv(&clinical, &args.output)?;

    println!(
        "✅ {}: {} participants, {} carriers → {}",
        clinical.allele,
        clinical.total_participants(),
        clinical.carrier_count(),
        args.output.display()
    );
    Ok(0)
}

fn run_deploy(config: &HlaConfig, args: &DeployArgs) -> Result<i32, PipelineError> {
    let deployer = ResultDeployer::new(&args.target, config.deploy.clone());
    let deployment = deployer.deploy(&args.source, args.dry_run)?;

    if args.dry_run {
        println!("🔍 DRY RUN - no files were copied");
    }
    println!(
        "Deployed {} files to {}",
        deployment.deployment_count(),
        deployment.target_dir.display()
    );
    for name in &deployment.files_deployed {
        println!("  {}", name);
    }
    if let Some(backup_dir) = &deployment.backup_dir {
        println!(
            "Backed up {} files to {}",
            deployment.files_backed_up.len(),
            backup_dir.display()
        );
    }

    if !args.dry_run && deployment.deployment_count() > 0 && !deployment.verified {
        return Err(PipelineError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "deployed files could not be found in the target directory",
        )));
    }
    Ok(0)
}
