use crate::domain::categories::{
    BuildingMaterial, BuildingType, Categorical, Heating, Market, Province,
};
use crate::utils::error::{PricingError, Result};
use crate::utils::validation::{validate_positive, validate_range};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub const MIN_YEAR_CONSTRUCTED: i64 = 1900;
pub const MAX_YEAR_CONSTRUCTED: i64 = 2025;

/// Inbound request as decoded by the transport: categorical attributes are
/// still raw strings and numeric fields are unchecked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub area: f64,
    #[serde(deserialize_with = "whole_number")]
    pub rooms: i64,
    #[serde(deserialize_with = "whole_number")]
    pub year_constructed: i64,
    pub heating: String,
    pub building_material: String,
    pub building_type: String,
    pub market: String,
    #[serde(alias = "province")]
    pub voivodeship: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
}

/// A request that passed semantic validation.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDescriptor {
    pub area: f64,
    pub rooms: u32,
    pub year_constructed: i32,
    pub heating: Heating,
    pub building_material: BuildingMaterial,
    pub building_type: BuildingType,
    pub market: Market,
    pub province: Province,
    pub city: Option<String>,
    pub district: Option<String>,
}

impl PropertyDescriptor {
    /// Local statistics are only computed when a city or district is given.
    pub fn wants_local_stats(&self) -> bool {
        self.city.is_some() || self.district.is_some()
    }
}

impl TryFrom<&PredictionRequest> for PropertyDescriptor {
    type Error = PricingError;

    fn try_from(request: &PredictionRequest) -> Result<Self> {
        validate_positive("area", request.area)?;
        validate_range("rooms", request.rooms, 1, i64::from(u32::MAX))?;
        validate_range(
            "year_constructed",
            request.year_constructed,
            MIN_YEAR_CONSTRUCTED,
            MAX_YEAR_CONSTRUCTED,
        )?;

        Ok(Self {
            area: request.area,
            rooms: request.rooms as u32,
            year_constructed: request.year_constructed as i32,
            heating: Heating::parse_label(&request.heating)?,
            building_material: BuildingMaterial::parse_label(&request.building_material)?,
            building_type: BuildingType::parse_label(&request.building_type)?,
            market: Market::parse_label(&request.market)?,
            province: Province::parse_label(&request.voivodeship)?,
            city: non_blank(request.city.as_deref()),
            district: non_blank(request.district.as_deref()),
        })
    }
}

impl TryFrom<PredictionRequest> for PropertyDescriptor {
    type Error = PricingError;

    fn try_from(request: PredictionRequest) -> Result<Self> {
        PropertyDescriptor::try_from(&request)
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value.filter(|v| !v.is_empty()).map(str::to_string)
}

/// Accepts `3` as well as `3.0`; a fractional part is rejected.
fn whole_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Number {
        Int(i64),
        Float(f64),
    }

    match Number::deserialize(deserializer)? {
        Number::Int(n) => Ok(n),
        Number::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
        Number::Float(f) => Err(serde::de::Error::custom(format!(
            "expected a whole number, got {}",
            f
        ))),
    }
}

fn blank_as_none<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(non_blank(value.as_deref()))
}

/// Location criteria for the statistics queries. Empty strings count as
/// "not given".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationFilter {
    #[serde(
        alias = "province",
        rename = "voivodeship",
        default,
        deserialize_with = "blank_as_none"
    )]
    pub province: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "blank_as_none")]
    pub district: Option<String>,
}

impl LocationFilter {
    pub fn new(province: Option<&str>, city: Option<&str>, district: Option<&str>) -> Self {
        Self {
            province: non_blank(province),
            city: non_blank(city),
            district: non_blank(district),
        }
    }

    pub fn city_district(city: Option<&str>, district: Option<&str>) -> Self {
        Self::new(None, city, district)
    }

    pub fn is_empty(&self) -> bool {
        self.province.is_none() && self.city.is_none() && self.district.is_none()
    }
}

/// One historical listing from the reference dataset.
///
/// Numeric cells that are empty or unparsable are read as `None` and skipped
/// by the summaries; extra CSV columns are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    #[serde(rename = "Price", default, deserialize_with = "csv::invalid_option")]
    pub price: Option<f64>,
    #[serde(rename = "Area (m²)", default, deserialize_with = "csv::invalid_option")]
    pub area: Option<f64>,
    #[serde(rename = "Number of rooms", default, deserialize_with = "csv::invalid_option")]
    pub rooms: Option<f64>,
    #[serde(rename = "year_const", default, deserialize_with = "csv::invalid_option")]
    pub year: Option<f64>,
    #[serde(rename = "voivodeship", alias = "province", default)]
    pub province: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub district: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfidenceLevel::Low => "Low",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::High => "High",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionOutcome {
    /// Raw regressor output, unrounded.
    pub price: f64,
    pub confidence: ConfidenceLevel,
}

/// Descriptive statistics over a location-filtered slice of the dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticsSnapshot {
    pub count: usize,
    pub avg_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    pub avg_area: f64,
    pub avg_rooms: f64,
    /// Truncated mean construction year; absent when no matching row has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avg_year: Option<i64>,
    pub filters_applied: LocationFilter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub predicted_price: f64,
    pub currency: String,
    pub confidence: ConfidenceLevel,
    pub input_features: PredictionRequest,
    pub local_stats: Option<StatisticsSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_type: String,
    pub algorithm: String,
    pub features_used: Vec<String>,
    pub training_samples: u64,
    pub test_r2_score: f64,
    pub test_rmse: f64,
    pub test_mae: f64,
    pub last_updated: String,
}

/// Rounds to two decimal places, the precision used for prices and
/// statistics in responses.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
