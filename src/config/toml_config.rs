use crate::core::artifact::ArtifactPaths;
use crate::utils::error::{PricingError, Result};
use crate::utils::validation::{
    validate_file_extensions, validate_non_empty_string, validate_path, Validate,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Directory the model and dataset paths are resolved against.
    #[serde(default = "default_base_dir")]
    pub base_dir: String,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub metadata: ModelMetadata,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub dir: String,
    pub model_file: String,
    pub encoders_file: String,
    pub features_file: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            dir: "models".to_string(),
            model_file: "price_model.onnx".to_string(),
            encoders_file: "label_encoders.json".to_string(),
            features_file: "features.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub path: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: "data/processed/data_processed.csv".to_string(),
        }
    }
}

/// Descriptive facts about the trained model, reported by `info`.
/// `algorithm` and `features_used` fall back to what the artifact says.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelMetadata {
    pub model_type: String,
    pub algorithm: Option<String>,
    pub features_used: Option<Vec<String>>,
    pub training_samples: u64,
    pub test_r2_score: f64,
    pub test_rmse: f64,
    pub test_mae: f64,
}

impl Default for ModelMetadata {
    fn default() -> Self {
        Self {
            model_type: "Regression".to_string(),
            algorithm: Some("Random Forest Regressor".to_string()),
            features_used: Some(
                [
                    "Area (m²)",
                    "Number of rooms",
                    "year_const",
                    "Heating",
                    "Building material",
                    "Building type",
                    "Market",
                    "voivodeship",
                    "city",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            ),
            training_samples: 19344,
            test_r2_score: 0.6364,
            test_rmse: 148161.29,
            test_mae: 112492.14,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_format: Option<String>,
}

fn default_base_dir() -> String {
    ".".to_string()
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            base_dir: default_base_dir(),
            model: ModelConfig::default(),
            dataset: DatasetConfig::default(),
            metadata: ModelMetadata::default(),
            monitoring: None,
        }
    }
}

impl ServiceConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(PricingError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| PricingError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the value of the environment variable; unknown
    /// variables are left as written.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| PricingError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn artifact_paths(&self) -> ArtifactPaths {
        let join = |file: &str| {
            Path::new(&self.model.dir)
                .join(file)
                .to_string_lossy()
                .into_owned()
        };
        ArtifactPaths {
            model: join(&self.model.model_file),
            encoders: join(&self.model.encoders_file),
            features: join(&self.model.features_file),
        }
    }

    pub fn dataset_path(&self) -> &str {
        &self.dataset.path
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logs(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
            .map(|f| f.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }

    pub fn validate_config(&self) -> Result<()> {
        validate_path("base_dir", &self.base_dir)?;
        validate_path("model.dir", &self.model.dir)?;
        validate_file_extensions("model.model_file", &[self.model.model_file.as_str()], &["onnx"])?;
        validate_file_extensions(
            "model",
            &[
                self.model.encoders_file.as_str(),
                self.model.features_file.as_str(),
            ],
            &["json"],
        )?;
        validate_path("dataset.path", &self.dataset.path)?;
        validate_file_extensions("dataset.path", &[self.dataset.path.as_str()], &["csv"])?;
        validate_non_empty_string("metadata.model_type", &self.metadata.model_type)?;
        Ok(())
    }
}

impl Validate for ServiceConfig {
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
    fn test_defaults_match_standard_layout() {
        let config = ServiceConfig::from_toml_str("").unwrap();
        assert_eq!(config.base_dir, ".");
        let paths = config.artifact_paths();
        assert_eq!(paths.model, "models/price_model.onnx");
        assert_eq!(paths.encoders, "models/label_encoders.json");
        assert_eq!(paths.features, "models/features.json");
        assert_eq!(config.dataset_path(), "data/processed/data_processed.csv");
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
base_dir = "/srv/pricer"

[model]
dir = "artifacts/v2"
model_file = "forest.onnx"

[dataset]
path = "data/listings.csv"

[metadata]
model_type = "Regression"
algorithm = "Gradient Boosting"
training_samples = 1000
test_r2_score = 0.7
test_rmse = 1.0
test_mae = 2.0

[monitoring]
enabled = true
log_format = "json"
"#;
        let config = ServiceConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.base_dir, "/srv/pricer");
        assert_eq!(config.artifact_paths().model, "artifacts/v2/forest.onnx");
        assert_eq!(config.artifact_paths().features, "artifacts/v2/features.json");
        assert_eq!(config.dataset_path(), "data/listings.csv");
        assert_eq!(config.metadata.algorithm.as_deref(), Some("Gradient Boosting"));
        assert_eq!(config.metadata.training_samples, 1000);
        assert!(config.monitoring_enabled());
        assert!(config.json_logs());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PRICER_TEST_DATASET", "data/from_env.csv");

        let toml_content = r#"
[dataset]
path = "${PRICER_TEST_DATASET}"
"#;
        let config = ServiceConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.dataset_path(), "data/from_env.csv");

        std::env::remove_var("PRICER_TEST_DATASET");
    }

    #[test]
    fn test_config_validation() {
        let toml_content = r#"
[model]
model_file = "price_model.joblib"
"#;
        let config = ServiceConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());

        let toml_content = r#"
[dataset]
path = ""
"#;
        let config = ServiceConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        assert!(matches!(
            ServiceConfig::from_toml_str("[model"),
            Err(PricingError::ConfigError { .. })
        ));
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[dataset]\npath = \"data/file.csv\"\n")
            .unwrap();

        let config = ServiceConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.dataset_path(), "data/file.csv");
    }
}
