use crate::config::toml_config::ServiceConfig;
use crate::domain::model::{LocationFilter, PredictionRequest};
use crate::utils::error::{PricingError, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "property-pricer")]
#[command(about = "Predict residential property prices and summarize comparable listings")]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the directory model and dataset paths are resolved against
    #[arg(long)]
    pub base_dir: Option<String>,

    /// Override the reference dataset path
    #[arg(long)]
    pub dataset: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Predict the price of one property
    Predict(PredictArgs),
    /// Statistics for properties matching a location
    Filter(FilterArgs),
    /// Show model information
    Info,
    /// Predict every request in a JSON array file
    Batch(BatchArgs),
}

#[derive(Debug, Clone, Args)]
pub struct PredictArgs {
    /// JSON file holding a prediction request
    #[arg(long, conflicts_with_all = ["area", "rooms", "year", "heating", "material", "building_type", "market", "voivodeship"])]
    pub request: Option<PathBuf>,

    #[arg(long, required_unless_present = "request")]
    pub area: Option<f64>,
    #[arg(long, required_unless_present = "request")]
    pub rooms: Option<i64>,
    #[arg(long, required_unless_present = "request")]
    pub year: Option<i64>,
    #[arg(long, required_unless_present = "request")]
    pub heating: Option<String>,
    #[arg(long, required_unless_present = "request")]
    pub material: Option<String>,
    #[arg(long, required_unless_present = "request")]
    pub building_type: Option<String>,
    #[arg(long, required_unless_present = "request")]
    pub market: Option<String>,
    #[arg(long, alias = "province", required_unless_present = "request")]
    pub voivodeship: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub district: Option<String>,
}

impl PredictArgs {
    pub fn to_request(&self) -> Result<PredictionRequest> {
        if let Some(path) = &self.request {
            let content = std::fs::read(path)?;
            return Ok(serde_json::from_slice(&content)?);
        }

        Ok(PredictionRequest {
            area: required("area", self.area)?,
            rooms: required("rooms", self.rooms)?,
            year_constructed: required("year", self.year)?,
            heating: required("heating", self.heating.clone())?,
            building_material: required("material", self.material.clone())?,
            building_type: required("building-type", self.building_type.clone())?,
            market: required("market", self.market.clone())?,
            voivodeship: required("voivodeship", self.voivodeship.clone())?,
            city: self.city.clone(),
            district: self.district.clone(),
        })
    }
}

fn required<T>(field: &str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| PricingError::ConfigError {
        message: format!("--{} is required unless --request is given", field),
    })
}

#[derive(Debug, Clone, Args)]
pub struct FilterArgs {
    #[arg(long, alias = "province")]
    pub voivodeship: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub district: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> LocationFilter {
        LocationFilter::new(
            self.voivodeship.as_deref(),
            self.city.as_deref(),
            self.district.as_deref(),
        )
    }
}

#[derive(Debug, Clone, Args)]
pub struct BatchArgs {
    /// JSON file with an array of prediction requests
    #[arg(long)]
    pub input: PathBuf,

    /// Report prediction throughput, latency and memory for the batch
    #[arg(long)]
    pub monitor: bool,
}

impl Cli {
    /// Loads the configuration file (or defaults) and applies overrides.
    pub fn service_config(&self) -> Result<ServiceConfig> {
        let mut config = match &self.config {
            Some(path) => ServiceConfig::from_file(path)?,
            None => ServiceConfig::default(),
        };
        if let Some(base_dir) = &self.base_dir {
            config.base_dir = base_dir.clone();
        }
        if let Some(dataset) = &self.dataset {
            config.dataset.path = dataset.clone();
        }
        Ok(config)
    }
}
