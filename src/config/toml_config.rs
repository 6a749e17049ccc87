use crate::utils::error::{PipelineError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HlaConfig {
    pub pipeline: PipelineSettings,
    pub verify: VerifySettings,
    pub genotype: GenotypeSettings,
    pub deploy: DeploySettings,
}

/// External tool locations and the shape of the imputation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub plink_path: String,
    pub snp2hla_path: String,
    pub reference_panel: String,
    pub chromosome: u8,
    pub mhc_start_bp: u64,
    pub mhc_end_bp: u64,
    pub sub_batch_size: usize,
    pub max_parallel: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            plink_path: "plink".to_string(),
            snp2hla_path: "SNP2HLA.csh".to_string(),
            reference_panel: String::new(),
            chromosome: 6,
            mhc_start_bp: 26_000_000,
            mhc_end_bp: 34_000_000,
            sub_batch_size: 500,
            max_parallel: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifySettings {
    /// Case-sensitive tag identifying HLA markers in the marker map.
    pub marker_tag: String,
    /// Matched case-insensitively against each line of the imputation log.
    pub completion_keywords: Vec<String>,
}

impl Default for VerifySettings {
    fn default() -> Self {
        Self {
            marker_tag: "HLA_".to_string(),
            completion_keywords: vec!["finished".to_string(), "completed".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenotypeSettings {
    pub homozygous_threshold: f64,
    pub heterozygous_threshold: f64,
    pub sample_column: String,
}

impl Default for GenotypeSettings {
    fn default() -> Self {
        Self {
            homozygous_threshold: 1.5,
            heterozygous_threshold: 0.5,
            sample_column: "IID".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploySettings {
    pub extensions: Vec<String>,
    /// Defaults to a `backups` directory next to the deployment target.
    pub backup_root: Option<PathBuf>,
}

impl Default for DeploySettings {
    fn default() -> Self {
        Self {
            extensions: vec![".bed".to_string(), ".bim".to_string(), ".fam".to_string()],
            backup_root: None,
        }
    }
}

impl HlaConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PipelineError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PipelineError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${REFERENCE_PANEL})
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PipelineError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        let pipeline = &self.pipeline;
        validation::validate_non_empty_string("pipeline.plink_path", &pipeline.plink_path)?;
        validation::validate_non_empty_string("pipeline.snp2hla_path", &pipeline.snp2hla_path)?;
        validation::validate_range("pipeline.chromosome", pipeline.chromosome, 1, 26)?;
        validation::validate_positive_number("pipeline.sub_batch_size", pipeline.sub_batch_size, 1)?;
        validation::validate_positive_number("pipeline.max_parallel", pipeline.max_parallel, 1)?;
        if pipeline.mhc_start_bp >= pipeline.mhc_end_bp {
            return Err(PipelineError::InvalidConfigValueError {
                field: "pipeline.mhc_end_bp".to_string(),
                value: pipeline.mhc_end_bp.to_string(),
                reason: format!(
                    "Region end must be greater than start ({})",
                    pipeline.mhc_start_bp
                ),
            });
        }

        validation::validate_non_empty_string("verify.marker_tag", &self.verify.marker_tag)?;
        if self.verify.completion_keywords.is_empty() {
            return Err(PipelineError::MissingConfigError {
                field: "verify.completion_keywords".to_string(),
            });
        }
        for keyword in &self.verify.completion_keywords {
            validation::validate_non_empty_string("verify.completion_keywords", keyword)?;
        }

        let genotype = &self.genotype;
        validation::validate_finite("genotype.homozygous_threshold", genotype.homozygous_threshold)?;
        validation::validate_finite(
            "genotype.heterozygous_threshold",
            genotype.heterozygous_threshold,
        )?;
        validation::validate_non_empty_string("genotype.sample_column", &genotype.sample_column)?;
        if genotype.homozygous_threshold <= genotype.heterozygous_threshold {
            tracing::warn!(
                "⚠️ homozygous_threshold ({}) is not above heterozygous_threshold ({}); heterozygous calls will never be made",
                genotype.homozygous_threshold,
                genotype.heterozygous_threshold
            );
        }

        validation::validate_extensions("deploy.extensions", &self.deploy.extensions)?;
        if let Some(root) = &self.deploy.backup_root {
            validation::validate_path("deploy.backup_root", &root.to_string_lossy())?;
        }

        Ok(())
    }
}

impl Validate for HlaConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = HlaConfig::from_toml_str("").unwrap();
        assert_eq!(config, HlaConfig::default());
        assert_eq!(config.pipeline.sub_batch_size, 500);
        assert_eq!(config.verify.marker_tag, "HLA_");
        assert_eq!(config.genotype.homozygous_threshold, 1.5);
        assert_eq!(config.deploy.extensions, vec![".bed", ".bim", ".fam"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml_config() {
        let toml_content = r#"
[pipeline]
reference_panel = "/ref/HM_CEU_REF"
sub_batch_size = 250

[genotype]
heterozygous_threshold = 0.4

[deploy]
extensions = [".bed", ".bim", ".fam", ".dosage"]
backup_root = "/data/backups"
"#;

        let config = HlaConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.pipeline.reference_panel, "/ref/HM_CEU_REF");
        assert_eq!(config.pipeline.sub_batch_size, 250);
        assert_eq!(config.pipeline.max_parallel, 4);
        assert_eq!(config.genotype.homozygous_threshold, 1.5);
        assert_eq!(config.genotype.heterozygous_threshold, 0.4);
        assert_eq!(config.deploy.extensions.len(), 4);
        assert_eq!(
            config.deploy.backup_root,
            Some(PathBuf::from("/data/backups"))
        );
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("HLA_TEST_REFERENCE_PANEL", "/ref/T1DGC");

        let toml_content = r#"
[pipeline]
reference_panel = "${HLA_TEST_REFERENCE_PANEL}"
snp2hla_path = "${HLA_TEST_UNSET_VARIABLE}"
"#;

        let config = HlaConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.pipeline.reference_panel, "/ref/T1DGC");
        assert_eq!(config.pipeline.snp2hla_path, "${HLA_TEST_UNSET_VARIABLE}");

        std::env::remove_var("HLA_TEST_REFERENCE_PANEL");
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = HlaConfig::from_toml_str("[pipeline\nsub_batch_size = 1").unwrap_err();
        assert!(matches!(err, PipelineError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_config_validation() {
        let zero_batch = HlaConfig::from_toml_str("[pipeline]\nsub_batch_size = 0\n").unwrap();
        assert!(zero_batch.validate().is_err());

        let inverted_region =
            HlaConfig::from_toml_str("[pipeline]\nmhc_start_bp = 34000000\nmhc_end_bp = 26000000\n")
                .unwrap();
        assert!(inverted_region.validate().is_err());

        let bad_extension = HlaConfig::from_toml_str("[deploy]\nextensions = [\"bed\"]\n").unwrap();
        assert!(bad_extension.validate().is_err());

        let no_keywords =
            HlaConfig::from_toml_str("[verify]\ncompletion_keywords = []\n").unwrap();
        assert!(matches!(
            no_keywords.validate(),
            Err(PipelineError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_inverted_thresholds_are_only_warned() {
        let config = HlaConfig::from_toml_str(
            "[genotype]\nhomozygous_threshold = 0.5\nheterozygous_threshold = 1.5\n",
        )
        .unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[verify]\nmarker_tag = \"HLA_DQ\"\n")
            .unwrap();

        let config = HlaConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.verify.marker_tag, "HLA_DQ");
        assert_eq!(config.verify.completion_keywords.len(), 2);
    }
}
