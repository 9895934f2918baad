use crate::utils::error::{PricingError, Result};
use std::collections::HashSet;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(PricingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(PricingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_file_extensions(
    field_name: &str,
    files: &[&str],
    allowed_extensions: &[&str],
) -> Result<()> {
    let allowed_set: HashSet<&str> = allowed_extensions.iter().copied().collect();

    for file in files {
        match std::path::Path::new(file)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(extension) if allowed_set.contains(extension) => {}
            Some(extension) => {
                return Err(PricingError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.to_string(),
                    reason: format!(
                        "Unsupported file extension: {}. Allowed extensions: {}",
                        extension,
                        allowed_extensions.join(", ")
                    ),
                });
            }
            None => {
                return Err(PricingError::InvalidConfigValueError {
                    field: field_name.to_string(),
                    value: file.to_string(),
                    reason: "File has no extension or invalid filename".to_string(),
                });
            }
        }
    }

    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PricingError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Request-side check: the value must be finite and strictly greater than zero.
pub fn validate_positive(field_name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(PricingError::ValidationError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value must be greater than 0".to_string(),
        });
    }
    Ok(())
}

/// Request-side inclusive range check.
pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(PricingError::ValidationError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_path() {
        assert!(validate_path("dataset.path", "data/processed/data_processed.csv").is_ok());
        assert!(validate_path("dataset.path", "").is_err());
        assert!(validate_path("dataset.path", "bad\0path").is_err());
    }

    #[test]
    fn test_validate_file_extensions() {
        assert!(validate_file_extensions("model", &["price_model.onnx"], &["onnx"]).is_ok());
        assert!(validate_file_extensions("model", &["price_model.joblib"], &["json"]).is_err());
        assert!(validate_file_extensions("model", &["price_model"], &["json"]).is_err());
    }

    #[test]
    fn test_validate_positive() {
        assert!(validate_positive("area", 85.0).is_ok());
        assert!(validate_positive("area", 0.0).is_err());
        assert!(validate_positive("area", -1.5).is_err());
        assert!(validate_positive("area", f64::NAN).is_err());
    }

    #[test]
    fn test_validate_range_is_inclusive() {
        assert!(validate_range("year_constructed", 1900, 1900, 2025).is_ok());
        assert!(validate_range("year_constructed", 2025, 1900, 2025).is_ok());
        assert!(matches!(
            validate_range("year_constructed", 1899, 1900, 2025),
            Err(PricingError::ValidationError { .. })
        ));
        assert!(validate_range("year_constructed", 2026, 1900, 2025).is_err());
    }
}
