use thiserror::Error;

#[derive(Error, Debug)]
pub enum PricingError {
    #[error("Model artifact '{name}' not found at {path}")]
    MissingArtifact { name: String, path: String },

    #[error("Model artifact '{name}' could not be loaded: {message}")]
    InvalidArtifact { name: String, message: String },

    #[error("Invalid value '{value}' for field '{field}': {reason}")]
    ValidationError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Encoder for column '{column}' has no code for value '{value}'")]
    UnknownCategory { column: String, value: String },

    #[error("Feature '{feature}' expected by the model cannot be built from the request")]
    SchemaMismatch { feature: String },

    #[error("Prediction failed: {message}")]
    PredictionFailure { message: String },

    #[error("No properties found matching the filter criteria")]
    NotFound,

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid configuration value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The service cannot start; no request can proceed.
    Startup,
    /// Bad input from the caller.
    Request,
    /// Artifact or schema drift, or a regressor fault.
    Internal,
    /// Reference dataset problems or empty query results.
    Data,
    Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PricingError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PricingError::MissingArtifact { .. } | PricingError::InvalidArtifact { .. } => {
                ErrorCategory::Startup
            }
            PricingError::ValidationError { .. } => ErrorCategory::Request,
            PricingError::UnknownCategory { .. }
            | PricingError::SchemaMismatch { .. }
            | PricingError::PredictionFailure { .. } => ErrorCategory::Internal,
            PricingError::NotFound
            | PricingError::CsvError(_)
            | PricingError::IoError(_)
            | PricingError::ProcessingError { .. } => ErrorCategory::Data,
            PricingError::SerializationError(_)
            | PricingError::ConfigError { .. }
            | PricingError::InvalidConfigValueError { .. } => ErrorCategory::Config,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PricingError::NotFound => ErrorSeverity::Low,
            PricingError::ValidationError { .. } => ErrorSeverity::Medium,
            PricingError::UnknownCategory { .. }
            | PricingError::SchemaMismatch { .. }
            | PricingError::PredictionFailure { .. }
            | PricingError::CsvError(_)
            | PricingError::ProcessingError { .. } => ErrorSeverity::High,
            PricingError::MissingArtifact { .. }
            | PricingError::InvalidArtifact { .. }
            | PricingError::IoError(_)
            | PricingError::SerializationError(_)
            | PricingError::ConfigError { .. }
            | PricingError::InvalidConfigValueError { .. } => ErrorSeverity::Critical,
        }
    }

    /// Fatal errors stop the process; everything else fails a single request.
    pub fn is_fatal(&self) -> bool {
        self.category() == ErrorCategory::Startup || self.category() == ErrorCategory::Config
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PricingError::MissingArtifact { name, path } => format!(
                "The {} file is missing ({}). Train or copy the model artifacts before starting.",
                name, path
            ),
            PricingError::InvalidArtifact { name, message } => format!(
                "The {} artifact could not be loaded ({}). Re-export the model artifacts.",
                name, message
            ),
            PricingError::ValidationError { field, reason, .. } => {
                format!("Request field '{}' is invalid: {}", field, reason)
            }
            PricingError::NotFound => {
                "No properties found matching the filter criteria".to_string()
            }
            PricingError::UnknownCategory { .. } | PricingError::SchemaMismatch { .. } => format!(
                "The model artifacts do not match the request schema: {}",
                self
            ),
            other => format!("Error making prediction: {}", other),
        }
    }
}

pub type Result<T> = std::result::Result<T, PricingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_artifact_is_fatal() {
        let err = PricingError::MissingArtifact {
            name: "model".to_string(),
            path: "models/price_model.onnx".to_string(),
        };
        assert!(err.is_fatal());
        assert_eq!(err.severity(), ErrorSeverity::Critical);
        assert!(err.user_friendly_message().contains("models/price_model.onnx"));

        let corrupt = PricingError::InvalidArtifact {
            name: "model".to_string(),
            message: "protobuf parsing failed".to_string(),
        };
        assert!(corrupt.is_fatal());
        assert_eq!(corrupt.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_request_errors_are_not_fatal() {
        let validation = PricingError::ValidationError {
            field: "rooms".to_string(),
            value: "0".to_string(),
            reason: "must be positive".to_string(),
        };
        assert!(!validation.is_fatal());
        assert_eq!(validation.category(), ErrorCategory::Request);

        assert!(!PricingError::NotFound.is_fatal());
        assert_eq!(PricingError::NotFound.severity(), ErrorSeverity::Low);

        let drift = PricingError::SchemaMismatch {
            feature: "city".to_string(),
        };
        assert_eq!(drift.category(), ErrorCategory::Internal);
    }
}
