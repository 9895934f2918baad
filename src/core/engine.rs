use crate::domain::model::{PredictionRequest, PredictionResponse};
use crate::domain::ports::PricingService;
use crate::utils::error::Result;
use crate::utils::monitor::{BatchMonitor, BatchThroughput};
use serde::{Deserialize, Serialize};
use std::time::Instant;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<PredictionResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
    pub items: Vec<BatchItem>,
    /// Present when the batch ran with monitoring enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throughput: Option<BatchThroughput>,
}

/// Runs many prediction requests against one service. A failing request is
/// recorded in the report and the batch carries on.
pub struct BatchEngine<P: PricingService> {
    service: P,
    monitoring: bool,
}

impl<P: PricingService> BatchEngine<P> {
    pub fn new(service: P) -> Self {
        Self::new_with_monitoring(service, false)
    }

    pub fn new_with_monitoring(service: P, enabled: bool) -> Self {
        Self {
            service,
            monitoring: enabled,
        }
    }

    pub fn service(&self) -> &P {
        &self.service
    }

    pub async fn run(&self, requests: Vec<PredictionRequest>) -> Result<BatchReport> {
        tracing::info!("Starting batch of {} predictions", requests.len());
        let mut monitor = BatchMonitor::start(self.monitoring, requests.len());

        let mut items = Vec::with_capacity(requests.len());
        let mut failed = 0;

        for (index, request) in requests.into_iter().enumerate() {
            let started = Instant::now();
            let result = self.service.predict(request).await;
            monitor.record(started.elapsed(), result.is_ok());

            match result {
                Ok(response) => items.push(BatchItem {
                    index,
                    response: Some(response),
                    error: None,
                }),
                Err(e) if e.is_fatal() => return Err(e),
                Err(e) => {
                    tracing::warn!("Request {} failed: {}", index, e);
                    failed += 1;
                    items.push(BatchItem {
                        index,
                        response: None,
                        error: Some(e.user_friendly_message()),
                    });
                }
            }
        }

        let throughput = monitor.finish();

        let succeeded = items.len() - failed;
        tracing::info!("Batch finished: {} succeeded, {} failed", succeeded, failed);
        Ok(BatchReport {
            succeeded,
            failed,
            items,
            throughput,
        })
    }
}

pub fn parse_batch(data: &[u8]) -> Result<Vec<PredictionRequest>> {
    Ok(serde_json::from_slice(data)?)
}
