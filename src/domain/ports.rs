use crate::domain::model::{
    LocationFilter, ModelInfo, PredictionRequest, PredictionResponse, PropertyRecord,
    StatisticsSnapshot,
};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

/// Read-only access to the historical listings used for local statistics.
/// Implementations may re-read their backing file on every call.
pub trait DatasetSource: Send + Sync {
    fn load_records(&self) -> impl std::future::Future<Output = Result<Vec<PropertyRecord>>> + Send;
}

/// A trained model reduced to a pure numeric function.
pub trait Regressor: Send + Sync {
    fn n_features(&self) -> usize;
    fn predict(&self, features: &[f64]) -> Result<f64>;
}

#[async_trait]
pub trait PricingService: Send + Sync {
    async fn predict(&self, request: PredictionRequest) -> Result<PredictionResponse>;
    async fn filter(&self, filter: LocationFilter) -> Result<StatisticsSnapshot>;
    fn model_info(&self) -> ModelInfo;
}
