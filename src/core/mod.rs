pub mod artifact;
pub mod confidence;
pub mod encoder;
pub mod engine;
pub mod pipeline;
pub mod predictor;
pub mod regressor;
pub mod statistics;

pub use crate::domain::model::{
    ConfidenceLevel, LocationFilter, PredictionOutcome, PropertyDescriptor, StatisticsSnapshot,
};
pub use crate::domain::ports::{DatasetSource, PricingService, Regressor, Storage};
pub use crate::utils::error::Result;
