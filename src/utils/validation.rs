use crate::utils::error::{PipelineError, Result};

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(PipelineError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(PipelineError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(PipelineError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

/// Deployment extensions are matched as filename suffixes, so each one must
/// carry its leading dot.
pub fn validate_extensions(field_name: &str, extensions: &[String]) -> Result<()> {
    if extensions.is_empty() {
        return Err(PipelineError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: "[]".to_string(),
            reason: "At least one extension is required".to_string(),
        });
    }

    for ext in extensions {
        if !ext.starts_with('.') || ext.len() < 2 {
            return Err(PipelineError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: ext.clone(),
                reason: "Extension must start with '.' followed by a name, e.g. '.bed'".to_string(),
            });
        }
        if ext.contains('/') || ext.contains('\\') {
            return Err(PipelineError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: ext.clone(),
                reason: "Extension cannot contain path separators".to_string(),
            });
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PipelineError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(PipelineError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

pub fn validate_finite(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() {
        return Err(PipelineError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must be a finite number".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("deploy.target", "/data/production").is_ok());
        assert!(validate_path("deploy.target", "").is_err());
        assert!(validate_path("deploy.target", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_positive_number() {
        assert!(validate_positive_number("pipeline.sub_batch_size", 500, 1).is_ok());
        assert!(validate_positive_number("pipeline.sub_batch_size", 0, 1).is_err());
    }

    #[test]
    fn test_validate_extensions() {
        let plink = vec![".bed".to_string(), ".bim".to_string(), ".fam".to_string()];
        assert!(validate_extensions("deploy.extensions", &plink).is_ok());

        assert!(validate_extensions("deploy.extensions", &[]).is_err());
        assert!(validate_extensions("deploy.extensions", &["bed".to_string()]).is_err());
        assert!(validate_extensions("deploy.extensions", &[".".to_string()]).is_err());
        assert!(validate_extensions("deploy.extensions", &["./x".to_string()]).is_err());
    }

    #[test]
    fn test_validate_range_and_finite() {
        assert!(validate_range("pipeline.chromosome", 6u8, 1, 26).is_ok());
        assert!(validate_range("pipeline.chromosome", 0u8, 1, 26).is_err());
        assert!(validate_finite("genotype.homozygous_threshold", 1.5).is_ok());
        assert!(validate_finite("genotype.homozygous_threshold", f64::NAN).is_err());
    }
}
