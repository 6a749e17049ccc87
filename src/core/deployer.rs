use crate::adapters::local_storage::LocalStorage;
use crate::config::toml_config::DeploySettings;
use crate::domain::model::DeploymentReport;
use crate::domain::ports::Storage;
use crate::utils::error::{PipelineError, Result};
use chrono::Local;
use std::path::{Path, PathBuf};

const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Copies verified results into production, backing up what is already there.
pub struct ResultDeployer<S: Storage = LocalStorage> {
    storage: S,
    target_dir: PathBuf,
    backup_root: PathBuf,
    extensions: Vec<String>,
}

impl ResultDeployer {
    pub fn new(target_dir: impl Into<PathBuf>, settings: DeploySettings) -> Self {
        Self::with_storage(LocalStorage::new(), target_dir, settings)
    }
}

impl<S: Storage> ResultDeployer<S> {
    pub fn with_storage(storage: S, target_dir: impl Into<PathBuf>, settings: DeploySettings) -> Self {
        let target_dir = target_dir.into();
        let backup_root = settings
            .backup_root
            .unwrap_or_else(|| default_backup_root(&target_dir));
        Self {
            storage,
            target_dir,
            backup_root,
            extensions: settings.extensions,
        }
    }

    pub fn backup_root(&self) -> &Path {
        &self.backup_root
    }

    /// Files in `dir` whose names end with one of the extensions, grouped by
    /// extension in configured order and sorted by name within each group.
    pub fn matching_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut names: Vec<String> = self
            .storage
            .list_files(dir)?
            .iter()
            .map(|path| file_name(path))
            .collect();
        names.sort();

        let mut files = Vec::new();
        for ext in &self.extensions {
            files.extend(
                names
                    .iter()
                    .filter(|name| name.ends_with(ext.as_str()))
                    .map(|name| dir.join(name)),
            );
        }
        Ok(files)
    }

    /// Refuse to deploy files onto themselves: copying a file over its own
    /// path truncates it.
    fn ensure_distinct(&self, source_dir: &Path, files: &[PathBuf]) -> Result<()> {
        if !self.storage.exists(&self.target_dir)? {
            return Ok(());
        }

        if self.storage.canonicalize(source_dir)? == self.storage.canonicalize(&self.target_dir)? {
            return Err(PipelineError::invalid_input(format!(
                "source {} and target {} are the same directory",
                source_dir.display(),
                self.target_dir.display()
            )));
        }

        for file in files {
            let dest = self.target_dir.join(file_name(file));
            if self.storage.exists(&dest)?
                && self.storage.canonicalize(file)? == self.storage.canonicalize(&dest)?
            {
                return Err(PipelineError::invalid_input(format!(
                    "{} and {} are the same file",
                    file.display(),
                    dest.display()
                )));
            }
        }
        Ok(())
    }

    /// Copy every matching production file into a new timestamped backup
    /// directory and return it with the names that were copied.
    fn create_backup(&self) -> Result<(PathBuf, Vec<String>)> {
        let timestamp = Local::now().format(BACKUP_TIMESTAMP_FORMAT).to_string();
        let backup_dir = self.backup_root.join(timestamp);
        self.storage.create_dir_all(&backup_dir)?;

        let mut backed_up = Vec::new();
        for file in self.matching_files(&self.target_dir)? {
            let name = file_name(&file);
            self.storage.copy_file(&file, &backup_dir.join(&name))?;
            backed_up.push(name);
        }

        tracing::info!(
            "💾 Backed up {} files to {}",
            backed_up.len(),
            backup_dir.display()
        );
        Ok((backup_dir, backed_up))
    }

    /// Deploy matching files from `source_dir`. A dry run only reports what
    /// would be copied and leaves the file system untouched.
    pub fn deploy(&self, source_dir: &Path, dry_run: bool) -> Result<DeploymentReport> {
        let mut report = DeploymentReport::new(source_dir.to_path_buf(), self.target_dir.clone());

        let files = self.matching_files(source_dir)?;
        if files.is_empty() {
            tracing::warn!(
                "No files matching {:?} in {}",
                self.extensions,
                source_dir.display()
            );
            return Ok(report);
        }
        self.ensure_distinct(source_dir, &files)?;

        if dry_run {
            report.files_deployed = files.iter().map(|f| file_name(f)).collect();
            tracing::info!(
                "🔍 Dry run: would deploy {} files to {}",
                report.deployment_count(),
                self.target_dir.display()
            );
            return Ok(report);
        }

        if self.storage.exists(&self.target_dir)? {
            let (backup_dir, backed_up) = self.create_backup()?;
            report.backup_dir = Some(backup_dir);
            report.files_backed_up = backed_up;
        }

        self.storage.create_dir_all(&self.target_dir)?;
        for file in &files {
            let name = file_name(file);
            self.storage.copy_file(file, &self.target_dir.join(&name))?;
            tracing::debug!("Deployed {}", name);
            report.files_deployed.push(name);
        }

        report.verified = true;
        for name in &report.files_deployed {
            if !self.storage.exists(&self.target_dir.join(name))? {
                tracing::warn!("{} missing from {} after copy", name, self.target_dir.display());
                report.verified = false;
            }
        }

        tracing::info!(
            "🚀 Deployed {} files to {} (verified: {})",
            report.deployment_count(),
            self.target_dir.display(),
            report.verified
        );
        Ok(report)
    }
}

fn default_backup_root(target_dir: &Path) -> PathBuf {
    match target_dir.parent() {
        Some(parent) => parent.join("backups"),
        None => PathBuf::from("backups"),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::verifier::tests::MockStorage;
    use std::fs;
    use tempfile::TempDir;

    fn source_dir(root: &Path) -> PathBuf {
        let src = root.join("source");
        fs::create_dir(&src).unwrap();
        fs::write(src.join("imputed.bed"), [0u8]).unwrap();
        fs::write(src.join("imputed.bim"), "6\tHLA_DRB1_0101\t0\t32000000\tA\tG\n").unwrap();
        fs::write(src.join("imputed.fam"), "S001 S001 0 0 1 -9\n").unwrap();
        fs::write(src.join("imputed.bgl.log"), "finished\n").unwrap();
        src
    }

    #[test]
    fn test_default_backup_root_is_sibling() {
        let deployer = ResultDeployer::new("/data/production", DeploySettings::default());
        assert_eq!(deployer.backup_root(), Path::new("/data/backups"));
    }

    #[test]
    fn test_matching_files_order() {
        let root = TempDir::new().unwrap();
        let src = source_dir(root.path());
        fs::write(src.join("another.bed"), [1u8]).unwrap();

        let deployer = ResultDeployer::new(root.path().join("prod"), DeploySettings::default());
        let names: Vec<String> = deployer
            .matching_files(&src)
            .unwrap()
            .iter()
            .map(|p| file_name(p))
            .collect();
        assert_eq!(names, vec!["another.bed", "imputed.bed", "imputed.bim", "imputed.fam"]);
    }

    #[test]
    fn test_deploy_fresh() {
        let root = TempDir::new().unwrap();
        let src = source_dir(root.path());
        let target = root.path().join("production");

        let report = ResultDeployer::new(&target, DeploySettings::default())
            .deploy(&src, false)
            .unwrap();

        assert_eq!(report.deployment_count(), 3);
        assert!(report.verified);
        assert!(report.backup_dir.is_none());
        assert!(report.files_backed_up.is_empty());
        assert!(target.join("imputed.bed").exists());
        assert!(!target.join("imputed.bgl.log").exists());
    }

    #[test]
    fn test_deploy_with_backup() {
        let root = TempDir::new().unwrap();
        let src = source_dir(root.path());
        let target = root.path().join("production");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("old.bed"), [0xFFu8]).unwrap();
        fs::write(target.join("README.txt"), "keep").unwrap();

        let settings = DeploySettings {
            backup_root: Some(root.path().join("backups")),
            ..DeploySettings::default()
        };
        let report = ResultDeployer::new(&target, settings)
            .deploy(&src, false)
            .unwrap();

        assert_eq!(report.deployment_count(), 3);
        assert_eq!(report.files_backed_up, vec!["old.bed"]);
        let backup_dir = report.backup_dir.unwrap();
        assert!(backup_dir.starts_with(root.path().join("backups")));
        assert_eq!(fs::read(backup_dir.join("old.bed")).unwrap(), vec![0xFF]);
        assert!(!backup_dir.join("README.txt").exists());
        assert!(target.join("imputed.bed").exists());
        assert!(report.verified);
    }

    #[test]
    fn test_backup_dir_name_is_timestamp() {
        let root = TempDir::new().unwrap();
        let src = source_dir(root.path());
        let target = root.path().join("production");
        fs::create_dir(&target).unwrap();

        let report = ResultDeployer::new(&target, DeploySettings::default())
            .deploy(&src, false)
            .unwrap();

        let backup_dir = report.backup_dir.unwrap();
        let name = backup_dir.file_name().unwrap().to_string_lossy().into_owned();
        assert!(chrono::NaiveDateTime::parse_from_str(&name, BACKUP_TIMESTAMP_FORMAT).is_ok());
        assert_eq!(backup_dir.parent().unwrap(), root.path().join("backups"));
    }

    #[test]
    fn test_dry_run() {
        let root = TempDir::new().unwrap();
        let src = source_dir(root.path());
        let target = root.path().join("production");

        let report = ResultDeployer::new(&target, DeploySettings::default())
            .deploy(&src, true)
            .unwrap();

        assert_eq!(report.deployment_count(), 3);
        assert!(!report.verified);
        assert!(!target.exists());
        assert!(!root.path().join("backups").exists());
    }

    #[test]
    fn test_nothing_to_deploy() {
        let root = TempDir::new().unwrap();
        let src = root.path().join("empty");
        fs::create_dir(&src).unwrap();
        let target = root.path().join("production");

        let report = ResultDeployer::new(&target, DeploySettings::default())
            .deploy(&src, false)
            .unwrap();
        assert_eq!(report.deployment_count(), 0);
        assert!(!report.verified);
        assert!(!target.exists());
    }

    #[test]
    fn test_same_directory_is_rejected() {
        let root = TempDir::new().unwrap();
        let prod = source_dir(root.path());
        let bim_before = fs::read(prod.join("imputed.bim")).unwrap();

        let deployer = ResultDeployer::new(&prod, DeploySettings::default());
        for dry_run in [true, false] {
            let err = deployer.deploy(&prod, dry_run).unwrap_err();
            assert!(matches!(err, PipelineError::InvalidInput { .. }));
        }

        // same directory reached through another path
        let dotted = prod.join("..").join("source");
        assert!(deployer.deploy(&dotted, false).is_err());

        assert_eq!(fs::read(prod.join("imputed.bim")).unwrap(), bim_before);
        assert!(!root.path().join("backups").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_source_linking_to_deployed_file_is_rejected() {
        let root = TempDir::new().unwrap();
        let target = root.path().join("production");
        fs::create_dir(&target).unwrap();
        fs::write(target.join("imputed.bim"), "6\tHLA_A_01\n").unwrap();

        let src = root.path().join("staging");
        fs::create_dir(&src).unwrap();
        std::os::unix::fs::symlink(target.join("imputed.bim"), src.join("imputed.bim")).unwrap();

        let err = ResultDeployer::new(&target, DeploySettings::default())
            .deploy(&src, false)
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidInput { .. }));
        assert_eq!(fs::read_to_string(target.join("imputed.bim")).unwrap(), "6\tHLA_A_01\n");
    }

    #[test]
    fn test_deploy_through_storage() {
        let storage = MockStorage::new();
        storage.add("/staging/imputed.bed", "bed");
        storage.add("/staging/imputed.fam", "S001\n");
        storage.add("/staging/notes.md", "skip");

        let report = ResultDeployer::with_storage(storage.clone(), "/prod", DeploySettings::default())
            .deploy(Path::new("/staging"), false)
            .unwrap();

        assert_eq!(report.files_deployed, vec!["imputed.bed", "imputed.fam"]);
        assert!(report.verified);
        assert!(report.backup_dir.is_none());
        assert_eq!(storage.content(Path::new("/prod/imputed.fam")).as_deref(), Some("S001\n"));
        assert!(storage.content(Path::new("/prod/notes.md")).is_none());
    }
}
