pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::Cli;
pub use config::{ModelMetadata, ServiceConfig};

pub use adapters::{CsvDataset, LocalStorage};
pub use core::artifact::{ArtifactCell, ArtifactPaths, ModelArtifact};
pub use core::engine::{BatchEngine, BatchReport};
pub use core::pipeline::PricingPipeline;
pub use domain::model::{
    ConfidenceLevel, LocationFilter, ModelInfo, PredictionRequest, PredictionResponse,
    PropertyDescriptor, StatisticsSnapshot,
};
pub use domain::ports::PricingService;
pub use utils::error::{PricingError, Result};
