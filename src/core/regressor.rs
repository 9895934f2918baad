//! ONNX Runtime backed regressor standing behind the [`Regressor`] port.
//!
//! The trained estimator is exported to ONNX (for scikit-learn forests this
//! is a single `TreeEnsembleRegressor` node) with one `[N, n_features]`
//! float input and one `[N, 1]` float output.

use crate::domain::ports::Regressor;
use crate::utils::error::{PricingError, Result};
use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Tensor;
use std::fmt::Display;
use std::sync::Mutex;

pub struct OnnxRegressor {
    // `Session::run` needs exclusive access.
    session: Mutex<Session>,
    n_features: usize,
    output: String,
}

impl std::fmt::Debug for OnnxRegressor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxRegressor")
            .field("n_features", &self.n_features)
            .field("output", &self.output)
            .finish()
    }
}

impl OnnxRegressor {
    /// Builds a session from the serialized model. `n_features` is the width
    /// of the input row the model was trained on.
    pub fn from_bytes(model: &[u8], n_features: usize) -> Result<Self> {
        let session = Session::builder()
            .map_err(|e| onnx_error("create session builder", e))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| onnx_error("set optimization level", e))?
            .with_intra_threads(1)
            .map_err(|e| onnx_error("set intra-op threads", e))?
            .commit_from_memory(model)
            .map_err(|e| onnx_error("load model", e))?;

        if session.inputs.len() != 1 {
            return Err(PricingError::PredictionFailure {
                message: format!(
                    "price model must take exactly one input, found {}",
                    session.inputs.len()
                ),
            });
        }
        let output = session
            .outputs
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| PricingError::PredictionFailure {
                message: "price model has no outputs".to_string(),
            })?;

        tracing::debug!(
            "ONNX session ready: input '{}', output '{}'",
            session.inputs[0].name,
            output
        );

        Ok(Self {
            session: Mutex::new(session),
            n_features,
            output,
        })
    }
}

impl Regressor for OnnxRegressor {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        check_shape(self.n_features, features)?;

        let row: Vec<f32> = features.iter().map(|&x| x as f32).collect();
        let input = Array2::from_shape_vec((1, self.n_features), row)
            .map_err(|e| onnx_error("shape input", e))?;
        let input_tensor = Tensor::from_array(input).map_err(|e| onnx_error("build input", e))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| PricingError::PredictionFailure {
                message: "ONNX session lock poisoned".to_string(),
            })?;
        let outputs = session
            .run(ort::inputs![input_tensor])
            .map_err(|e| onnx_error("run inference", e))?;

        let output = outputs
            .get(&self.output)
            .ok_or_else(|| PricingError::PredictionFailure {
                message: format!("model output '{}' missing", self.output),
            })?;
        let tensor_data = output
            .try_extract_tensor::<f32>()
            .map_err(|e| onnx_error("read output", e))?;
        let price = tensor_data
            .1
            .first()
            .copied()
            .ok_or_else(|| PricingError::PredictionFailure {
                message: "model returned an empty output".to_string(),
            })?;

        finite(f64::from(price))
    }
}

fn onnx_error(stage: &str, e: impl Display) -> PricingError {
    PricingError::PredictionFailure {
        message: format!("ONNX Runtime failed to {}: {}", stage, e),
    }
}

pub(crate) fn check_shape(expected: usize, features: &[f64]) -> Result<()> {
    if features.len() != expected {
        return Err(PricingError::PredictionFailure {
            message: format!("expected {} features, got {}", expected, features.len()),
        });
    }
    Ok(())
}

pub(crate) fn finite(value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(PricingError::PredictionFailure {
            message: format!("regressor produced a non-finite value: {}", value),
        })
    }
}

/// In-process regressor for unit tests that do not need a runtime session.
#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub struct LinearRegressor {
        pub intercept: f64,
        pub coefficients: Vec<f64>,
    }

    impl Regressor for LinearRegressor {
        fn n_features(&self) -> usize {
            self.coefficients.len()
        }

        fn predict(&self, features: &[f64]) -> Result<f64> {
            check_shape(self.coefficients.len(), features)?;
            let dot: f64 = self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum();
            finite(self.intercept + dot)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::LinearRegressor;
    use super::*;

    const FOREST: &[u8] = include_bytes!("../../tests/fixtures/price_model.onnx");
    const LINEAR: &[u8] = include_bytes!("../../tests/fixtures/linear_model.onnx");

    #[test]
    fn test_forest_averages_its_trees() {
        let model = OnnxRegressor::from_bytes(FOREST, 8).unwrap();
        // area <= 100 -> 400k, secondary market -> 300k
        let row = [85.0, 3.0, 2015.0, 1.0, 2.0, 2.0, 1.0, 4.0];
        assert_eq!(model.predict(&row).unwrap(), 350_000.0);

        let mut big = row;
        big[0] = 100.5;
        big[6] = 0.0;
        assert_eq!(model.predict(&big).unwrap(), 700_000.0);
    }

    #[test]
    fn test_split_threshold_is_inclusive() {
        let model = OnnxRegressor::from_bytes(FOREST, 8).unwrap();
        let row = [100.0, 3.0, 2015.0, 1.0, 2.0, 2.0, 1.0, 4.0];
        assert_eq!(model.predict(&row).unwrap(), 350_000.0);
    }

    #[test]
    fn test_linear_graph() {
        let model = OnnxRegressor::from_bytes(LINEAR, 2).unwrap();
        assert_eq!(model.predict(&[2.0, 1.0]).unwrap(), 5.0);
    }

    #[test]
    fn test_shape_mismatch_is_prediction_failure() {
        let model = OnnxRegressor::from_bytes(LINEAR, 2).unwrap();
        assert!(matches!(
            model.predict(&[1.0]),
            Err(PricingError::PredictionFailure { .. })
        ));
    }

    #[test]
    fn test_garbage_model_is_rejected() {
        assert!(matches!(
            OnnxRegressor::from_bytes(b"not a model", 2),
            Err(PricingError::PredictionFailure { .. })
        ));
    }

    #[test]
    fn test_non_finite_output_is_rejected() {
        let model = LinearRegressor {
            intercept: 1000.0,
            coefficients: vec![2.0, 0.5],
        };
        assert_eq!(model.predict(&[10.0, 4.0]).unwrap(), 1022.0);
        assert!(matches!(
            model.predict(&[f64::INFINITY, 0.0]),
            Err(PricingError::PredictionFailure { .. })
        ));
    }
}
