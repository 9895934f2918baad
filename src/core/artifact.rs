//! Loading and sharing of the trained model bundle.
//!
//! The bundle is the regressor exported to ONNX plus two JSON blobs: one
//! label encoder per categorical column, and the feature order the regressor
//! was trained on. It is loaded once and then shared read-only behind an `Arc`.

use crate::core::regressor::OnnxRegressor;
use crate::domain::ports::{Regressor, Storage};
use crate::utils::error::{PricingError, Result};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Bijective label <-> code mapping fixed at training time. Codes are the
/// positions of the labels in `classes`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelEncoder {
    classes: Vec<String>,
    index: BTreeMap<String, u32>,
}

impl LabelEncoder {
    pub fn new(column: &str, classes: Vec<String>) -> Result<Self> {
        let mut index = BTreeMap::new();
        for (code, class) in classes.iter().enumerate() {
            let code = u32::try_from(code).map_err(|_| PricingError::ProcessingError {
                message: format!("encoder '{}' has too many classes", column),
            })?;
            if index.insert(class.clone(), code).is_some() {
                return Err(PricingError::ProcessingError {
                    message: format!("encoder '{}' lists class '{}' twice", column, class),
                });
            }
        }
        Ok(Self { classes, index })
    }

    pub fn encode(&self, value: &str) -> Option<u32> {
        self.index.get(value).copied()
    }

    pub fn decode(&self, code: u32) -> Option<&str> {
        self.classes.get(code as usize).map(String::as_str)
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub model: String,
    pub encoders: String,
    pub features: String,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            model: "models/price_model.onnx".to_string(),
            encoders: "models/label_encoders.json".to_string(),
            features: "models/features.json".to_string(),
        }
    }
}

/// Reported when the configured metadata does not name the algorithm.
pub const ONNX_ALGORITHM: &str = "ONNX Regressor";

pub struct ModelArtifact {
    regressor: Box<dyn Regressor>,
    encoders: BTreeMap<String, LabelEncoder>,
    feature_order: Vec<String>,
    algorithm: String,
    loaded_at: DateTime<Utc>,
}

impl std::fmt::Debug for ModelArtifact {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArtifact")
            .field("algorithm", &self.algorithm)
            .field("encoders", &self.encoders.keys().collect::<Vec<_>>())
            .field("feature_order", &self.feature_order)
            .field("loaded_at", &self.loaded_at)
            .finish()
    }
}

impl ModelArtifact {
    pub fn new(
        regressor: Box<dyn Regressor>,
        encoders: BTreeMap<String, LabelEncoder>,
        feature_order: Vec<String>,
    ) -> Result<Self> {
        if feature_order.is_empty() {
            return Err(PricingError::ProcessingError {
                message: "feature order is empty".to_string(),
            });
        }
        let mut seen = HashSet::new();
        for name in &feature_order {
            if !seen.insert(name.as_str()) {
                return Err(PricingError::ProcessingError {
                    message: format!("feature '{}' appears twice in the feature order", name),
                });
            }
        }
        if regressor.n_features() != feature_order.len() {
            tracing::warn!(
                "Regressor expects {} features but the feature order lists {}",
                regressor.n_features(),
                feature_order.len()
            );
        }

        Ok(Self {
            regressor,
            encoders,
            feature_order,
            algorithm: "Custom Regressor".to_string(),
            loaded_at: Utc::now(),
        })
    }

    pub async fn load<S: Storage>(storage: &S, paths: &ArtifactPaths) -> Result<Self> {
        tracing::info!("Loading model artifacts");

        let model_bytes = read_blob(storage, "model", &paths.model).await?;
        let encoder_bytes = read_blob(storage, "encoders", &paths.encoders).await?;
        let feature_bytes = read_blob(storage, "features", &paths.features).await?;

        let raw_encoders: BTreeMap<String, Vec<String>> = serde_json::from_slice(&encoder_bytes)?;
        let feature_order: Vec<String> = serde_json::from_slice(&feature_bytes)?;
        let regressor = OnnxRegressor::from_bytes(&model_bytes, feature_order.len()).map_err(
            |e| PricingError::InvalidArtifact {
                name: "model".to_string(),
                message: e.to_string(),
            },
        )?;

        let mut encoders = BTreeMap::new();
        for (column, classes) in raw_encoders {
            let encoder = LabelEncoder::new(&column, classes)?;
            encoders.insert(column, encoder);
        }

        let mut artifact = Self::new(Box::new(regressor), encoders, feature_order)?;
        artifact.algorithm = ONNX_ALGORITHM.to_string();

        tracing::info!(
            "Model loaded: {} with {} features and {} encoders",
            artifact.algorithm,
            artifact.feature_order.len(),
            artifact.encoders.len()
        );
        Ok(artifact)
    }

    pub fn regressor(&self) -> &dyn Regressor {
        self.regressor.as_ref()
    }

    pub fn encoder(&self, column: &str) -> Option<&LabelEncoder> {
        self.encoders.get(column)
    }

    pub fn encoders(&self) -> &BTreeMap<String, LabelEncoder> {
        &self.encoders
    }

    pub fn feature_order(&self) -> &[String] {
        &self.feature_order
    }

    pub fn algorithm(&self) -> &str {
        &self.algorithm
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

async fn read_blob<S: Storage>(storage: &S, name: &str, path: &str) -> Result<Vec<u8>> {
    match storage.read_file(path).await {
        Ok(data) => Ok(data),
        Err(PricingError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(PricingError::MissingArtifact {
                name: name.to_string(),
                path: path.to_string(),
            })
        }
        Err(e) => Err(e),
    }
}

/// Load-once holder for the artifact. The first `get_or_load` reads storage;
/// every later call returns the same `Arc`.
pub struct ArtifactCell<S: Storage> {
    storage: S,
    paths: ArtifactPaths,
    cell: OnceCell<Arc<ModelArtifact>>,
}

impl<S: Storage> ArtifactCell<S> {
    pub fn new(storage: S, paths: ArtifactPaths) -> Self {
        Self {
            storage,
            paths,
            cell: OnceCell::new(),
        }
    }

    pub async fn get_or_load(&self) -> Result<Arc<ModelArtifact>> {
        self.cell
            .get_or_try_init(|| async {
                ModelArtifact::load(&self.storage, &self.paths)
                    .await
                    .map(Arc::new)
            })
            .await
            .map(Arc::clone)
    }

    pub fn get(&self) -> Option<Arc<ModelArtifact>> {
        self.cell.get().cloned()
    }

    pub fn paths(&self) -> &ArtifactPaths {
        &self.paths
    }
}
