use crate::core::artifact::ModelArtifact;
use crate::core::encoder::EncodedFeatureVector;
use crate::utils::error::Result;

/// Runs the artifact's regressor on an encoded vector. Failures are returned
/// as-is; there is no retry or fallback value.
pub fn predict(vector: &EncodedFeatureVector, artifact: &ModelArtifact) -> Result<f64> {
    let price = artifact.regressor().predict(vector.values())?;
    tracing::debug!("Raw prediction: {:.2}", price);
    Ok(price)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::encoder::encode;
    use crate::core::regressor::testing::LinearRegressor;
    use crate::domain::categories::*;
    use crate::domain::model::PropertyDescriptor;
    use crate::utils::error::PricingError;
    use std::collections::BTreeMap;

    fn descriptor() -> PropertyDescriptor {
        PropertyDescriptor {
            area: 100.0,
            rooms: 4,
            year_constructed: 2000,
            heating: Heating::Municipal,
            building_material: BuildingMaterial::LargePanel,
            building_type: BuildingType::Block,
            market: Market::Secondary,
            province: Province::Pomeranian,
            city: None,
            district: None,
        }
    }

    fn artifact(coefficients: Vec<f64>, order: &[&str]) -> ModelArtifact {
        ModelArtifact::new(
            Box::new(LinearRegressor {
                intercept: 50000.0,
                coefficients,
            }),
            BTreeMap::new(),
            order.iter().map(|s| s.to_string()).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_predict_calls_through() {
        let artifact = artifact(vec![5000.0, 10000.0], &["Area (m²)", "Number of rooms"]);
        let vector = encode(&descriptor(), &artifact).unwrap();
        assert_eq!(predict(&vector, &artifact).unwrap(), 590000.0);
    }

    #[test]
    fn test_shape_mismatch_propagates() {
        let artifact = artifact(vec![1.0, 1.0, 1.0], &["Area (m²)", "Number of rooms"]);
        let vector = encode(&descriptor(), &artifact).unwrap();
        assert!(matches!(
            predict(&vector, &artifact),
            Err(PricingError::PredictionFailure { .. })
        ));
    }
}
