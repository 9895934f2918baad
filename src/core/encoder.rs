//! Descriptor -> model input.
//!
//! The regressor only sees a bare `Vec<f64>` and knows nothing about column
//! names, so a vector with the right values in the wrong order yields a wrong
//! price rather than an error. The final step therefore always rebuilds the
//! vector from the artifact's feature order.

use crate::core::artifact::ModelArtifact;
use crate::domain::categories::{
    BuildingMaterial, BuildingType, Categorical, Heating, Market, Province,
};
use crate::domain::model::PropertyDescriptor;
use crate::utils::error::{PricingError, Result};
use std::collections::BTreeMap;

pub const AREA_COLUMN: &str = "Area (m²)";
pub const ROOMS_COLUMN: &str = "Number of rooms";
pub const YEAR_COLUMN: &str = "year_const";

#[derive(Debug, Clone, PartialEq)]
enum FeatureValue {
    Numeric(f64),
    Label(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFeatureVector {
    names: Vec<String>,
    values: Vec<f64>,
}

impl EncodedFeatureVector {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.values[idx])
    }
}

fn named_features(descriptor: &PropertyDescriptor) -> BTreeMap<&'static str, FeatureValue> {
    BTreeMap::from([
        (AREA_COLUMN, FeatureValue::Numeric(descriptor.area)),
        (ROOMS_COLUMN, FeatureValue::Numeric(f64::from(descriptor.rooms))),
        (
            YEAR_COLUMN,
            FeatureValue::Numeric(f64::from(descriptor.year_constructed)),
        ),
        (Heating::COLUMN, FeatureValue::Label(descriptor.heating.label())),
        (
            BuildingMaterial::COLUMN,
            FeatureValue::Label(descriptor.building_material.label()),
        ),
        (
            BuildingType::COLUMN,
            FeatureValue::Label(descriptor.building_type.label()),
        ),
        (Market::COLUMN, FeatureValue::Label(descriptor.market.label())),
        (Province::COLUMN, FeatureValue::Label(descriptor.province.label())),
    ])
}

pub fn encode(
    descriptor: &PropertyDescriptor,
    artifact: &ModelArtifact,
) -> Result<EncodedFeatureVector> {
    let mut features = named_features(descriptor);

    for (column, value) in features.iter_mut() {
        let FeatureValue::Label(label) = *value else {
            continue;
        };
        let Some(encoder) = artifact.encoder(column) else {
            continue;
        };
        let code = encoder
            .encode(label)
            .ok_or_else(|| PricingError::UnknownCategory {
                column: column.to_string(),
                value: label.to_string(),
            })?;
        *value = FeatureValue::Numeric(f64::from(code));
    }

    let mut values = Vec::with_capacity(artifact.feature_order().len());
    for name in artifact.feature_order() {
        match features.get(name.as_str()) {
            Some(FeatureValue::Numeric(v)) => values.push(*v),
            // A label with no encoder, or a column the request never carries.
            Some(FeatureValue::Label(_)) | None => {
                return Err(PricingError::SchemaMismatch {
                    feature: name.clone(),
                })
            }
        }
    }

    tracing::debug!("Encoded {} features", values.len());
    Ok(EncodedFeatureVector {
        names: artifact.feature_order().to_vec(),
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::artifact::LabelEncoder;
    use crate::core::regressor::testing::LinearRegressor;

    fn descriptor() -> PropertyDescriptor {
        PropertyDescriptor {
            area: 85.0,
            rooms: 3,
            year_constructed: 2015,
            heating: Heating::Gas,
            building_material: BuildingMaterial::Brick,
            building_type: BuildingType::Block,
            market: Market::Secondary,
            province: Province::Masovian,
            city: None,
            district: None,
        }
    }

    fn encoder_for<C: Categorical>() -> (String, LabelEncoder) {
        let mut classes: Vec<String> = C::labels().into_iter().map(str::to_string).collect();
        classes.sort();
        (
            C::COLUMN.to_string(),
            LabelEncoder::new(C::COLUMN, classes).unwrap(),
        )
    }

    fn artifact(order: &[&str], encoders: Vec<(String, LabelEncoder)>) -> ModelArtifact {
        ModelArtifact::new(
            Box::new(LinearRegressor {
                intercept: 0.0,
                coefficients: vec![0.0; order.len()],
            }),
            encoders.into_iter().collect(),
            order.iter().map(|s| s.to_string()).collect(),
        )
        .unwrap()
    }

    fn all_encoders() -> Vec<(String, LabelEncoder)> {
        vec![
            encoder_for::<Heating>(),
            encoder_for::<BuildingMaterial>(),
            encoder_for::<BuildingType>(),
            encoder_for::<Market>(),
            encoder_for::<Province>(),
        ]
    }

    const TRAINING_ORDER: [&str; 8] = [
        "Area (m²)",
        "Number of rooms",
        "year_const",
        "Heating",
        "Building material",
        "Building type",
        "Market",
        "voivodeship",
    ];

    #[test]
    fn test_encode_follows_feature_order() {
        let artifact = artifact(&TRAINING_ORDER, all_encoders());
        let vector = encode(&descriptor(), &artifact).unwrap();

        assert_eq!(vector.len(), TRAINING_ORDER.len());
        assert_eq!(vector.names(), artifact.feature_order());
        assert_eq!(vector.values()[0], 85.0);
        assert_eq!(vector.values()[1], 3.0);
        assert_eq!(vector.values()[2], 2015.0);
        // Sorted market classes: pierwotny=0, wtórny=1
        assert_eq!(vector.get("Market"), Some(1.0));
        // "gazowe" is second after "elektryczne" in sorted order.
        assert_eq!(vector.get("Heating"), Some(1.0));
    }

    #[test]
    fn test_reordered_artifact_reorders_vector() {
        let reversed: Vec<&str> = TRAINING_ORDER.iter().rev().copied().collect();
        let forward = encode(&descriptor(), &artifact(&TRAINING_ORDER, all_encoders())).unwrap();
        let backward = encode(&descriptor(), &artifact(&reversed, all_encoders())).unwrap();

        let mut expected = forward.values().to_vec();
        expected.reverse();
        assert_eq!(backward.values(), expected.as_slice());
    }

    #[test]
    fn test_encode_is_deterministic() {
        let artifact = artifact(&TRAINING_ORDER, all_encoders());
        let a = encode(&descriptor(), &artifact).unwrap();
        let b = encode(&descriptor(), &artifact).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_unknown_category_from_narrow_encoder() {
        let narrow = LabelEncoder::new("Market", vec!["pierwotny".to_string()]).unwrap();
        let mut encoders = all_encoders();
        encoders.retain(|(c, _)| c != "Market");
        encoders.push(("Market".to_string(), narrow));

        match encode(&descriptor(), &artifact(&TRAINING_ORDER, encoders)) {
            Err(PricingError::UnknownCategory { column, value }) => {
                assert_eq!(column, "Market");
                assert_eq!(value, "wtórny");
            }
            other => panic!("expected UnknownCategory, got {other:?}"),
        }
    }

    #[test]
    fn test_feature_outside_request_is_schema_mismatch() {
        let mut order = TRAINING_ORDER.to_vec();
        order.push("city");
        match encode(&descriptor(), &artifact(&order, all_encoders())) {
            Err(PricingError::SchemaMismatch { feature }) => assert_eq!(feature, "city"),
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_unencoded_label_is_schema_mismatch() {
        let mut encoders = all_encoders();
        encoders.retain(|(c, _)| c != "Heating");
        match encode(&descriptor(), &artifact(&TRAINING_ORDER, encoders)) {
            Err(PricingError::SchemaMismatch { feature }) => assert_eq!(feature, "Heating"),
            other => panic!("expected SchemaMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_subset_order_only_uses_listed_features() {
        let artifact = artifact(&["year_const", "Area (m²)"], vec![]);
        let vector = encode(&descriptor(), &artifact).unwrap();
        assert_eq!(vector.values(), &[2015.0, 85.0]);
    }
}
