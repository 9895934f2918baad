use crate::config::toml_config::ModelMetadata;
use crate::core::artifact::{ArtifactCell, ModelArtifact};
use crate::core::{confidence, encoder, predictor, statistics};
use crate::domain::model::{
    round2, LocationFilter, ModelInfo, PredictionOutcome, PredictionRequest, PredictionResponse,
    PropertyDescriptor, StatisticsSnapshot,
};
use crate::domain::ports::{DatasetSource, PricingService, Storage};
use crate::utils::error::Result;
use std::sync::Arc;

pub const CURRENCY: &str = "PLN";

/// Request -> response orchestration over a shared, already-loaded artifact.
pub struct PricingPipeline<D: DatasetSource> {
    artifact: Arc<ModelArtifact>,
    dataset: D,
    metadata: ModelMetadata,
}

impl<D: DatasetSource> PricingPipeline<D> {
    pub fn new(artifact: Arc<ModelArtifact>, dataset: D, metadata: ModelMetadata) -> Self {
        Self {
            artifact,
            dataset,
            metadata,
        }
    }

    /// Loads the artifact through `cell` (a no-op if it is already loaded)
    /// and builds the pipeline. A load failure here is meant to stop startup.
    pub async fn initialize<S: Storage>(
        cell: &ArtifactCell<S>,
        dataset: D,
        metadata: ModelMetadata,
    ) -> Result<Self> {
        let artifact = cell.get_or_load().await?;
        Ok(Self::new(artifact, dataset, metadata))
    }

    pub fn artifact(&self) -> &Arc<ModelArtifact> {
        &self.artifact
    }

    /// encode -> predict -> confidence, without touching the dataset.
    pub fn estimate(&self, descriptor: &PropertyDescriptor) -> Result<PredictionOutcome> {
        let vector = encoder::encode(descriptor, &self.artifact)?;
        let price = predictor::predict(&vector, &self.artifact)?;
        let confidence = confidence::estimate(descriptor, price);
        Ok(PredictionOutcome { price, confidence })
    }

    /// Local statistics for the descriptor's city/district. Any failure is
    /// logged and reported as "no statistics".
    async fn local_stats(&self, descriptor: &PropertyDescriptor) -> Option<StatisticsSnapshot> {
        if !descriptor.wants_local_stats() {
            return None;
        }

        let records = match self.dataset.load_records().await {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Could not load local statistics: {}", e);
                return None;
            }
        };

        match statistics::aggregate(
            &records,
            descriptor.city.as_deref(),
            descriptor.district.as_deref(),
        ) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                tracing::warn!("Could not compute local statistics: {}", e);
                None
            }
        }
    }

    pub async fn predict_with_context(
        &self,
        descriptor: &PropertyDescriptor,
    ) -> Result<(PredictionOutcome, Option<StatisticsSnapshot>)> {
        let outcome = self.estimate(descriptor)?;
        let stats = self.local_stats(descriptor).await;
        tracing::info!(
            "Predicted {:.2} {} ({} confidence, local stats: {})",
            outcome.price,
            CURRENCY,
            outcome.confidence,
            stats.as_ref().map_or(0, |s| s.count)
        );
        Ok((outcome, stats))
    }

    pub async fn filter_query(&self, filter: &LocationFilter) -> Result<StatisticsSnapshot> {
        let filter = LocationFilter::new(
            filter.province.as_deref(),
            filter.city.as_deref(),
            filter.district.as_deref(),
        );
        let records = self.dataset.load_records().await?;
        let snapshot = statistics::filter_by_location(&records, &filter)?;
        tracing::info!("Location query {:?} matched {} properties", filter, snapshot.count);
        Ok(snapshot)
    }
}

#[async_trait::async_trait]
impl<D: DatasetSource> PricingService for PricingPipeline<D> {
    async fn predict(&self, request: PredictionRequest) -> Result<PredictionResponse> {
        let descriptor = PropertyDescriptor::try_from(&request)?;
        let (outcome, local_stats) = self.predict_with_context(&descriptor).await?;

        Ok(PredictionResponse {
            predicted_price: round2(outcome.price),
            currency: CURRENCY.to_string(),
            confidence: outcome.confidence,
            input_features: request,
            local_stats,
        })
    }

    async fn filter(&self, filter: LocationFilter) -> Result<StatisticsSnapshot> {
        self.filter_query(&filter).await
    }

    fn model_info(&self) -> ModelInfo {
        let algorithm = self
            .metadata
            .algorithm
            .clone()
            .unwrap_or_else(|| self.artifact.algorithm().to_string());
        let features_used = self
            .metadata
            .features_used
            .clone()
            .unwrap_or_else(|| self.artifact.feature_order().to_vec());

        ModelInfo {
            model_type: self.metadata.model_type.clone(),
            algorithm,
            features_used,
            training_samples: self.metadata.training_samples,
            test_r2_score: self.metadata.test_r2_score,
            test_rmse: self.metadata.test_rmse,
            test_mae: self.metadata.test_mae,
            last_updated: self.artifact.loaded_at().to_rfc3339(),
        }
    }
}
