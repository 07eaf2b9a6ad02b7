//! Client side of the prediction service.

use crate::error::PredictionError;
use async_trait::async_trait;
use brain_tumor::{TumorClass, config::join_url};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const PREDICT_URL_PATH: &str = "brain-tumor/predict-url";
pub const HEALTH_PATH: &str = "health";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PredictUrlRequest {
    pub url: String,
}

/// Response body of the prediction endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    #[serde(default = "default_success")]
    pub success: bool,
    pub classification: i64,
    #[serde(default)]
    pub confidence: Option<f64>,
    #[serde(default)]
    pub error_message: Option<String>,
}

fn default_success() -> bool {
    true
}

impl PredictionResult {
    pub fn class(&self) -> Option<TumorClass> {
        TumorClass::from_code(self.classification)
    }
}

/// What happened to one sample URL.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionOutcome {
    Predicted {
        url: String,
        result: PredictionResult,
    },
    Failed {
        url: String,
        error: PredictionError,
    },
}

impl PredictionOutcome {
    pub fn url(&self) -> &str {
        match self {
            PredictionOutcome::Predicted { url, .. } | PredictionOutcome::Failed { url, .. } => url,
        }
    }

    pub fn result(&self) -> Option<&PredictionResult> {
        match self {
            PredictionOutcome::Predicted { result, .. } => Some(result),
            PredictionOutcome::Failed { .. } => None,
        }
    }
}

#[async_trait]
pub trait Predictor: Send + Sync {
    /// Classifies the image behind `url`.
    async fn predict(&self, url: &str) -> Result<PredictionResult, PredictionError>;

    async fn health(&self) -> Result<(), PredictionError> {
        Ok(())
    }
}

/// [`Predictor`] backed by the HTTP prediction service.
#[derive(Debug, Clone)]
pub struct HttpPredictor {
    client: reqwest::Client,
    predict_endpoint: String,
    health_endpoint: String,
    timeout: Option<Duration>,
}

impl HttpPredictor {
    pub fn new(api_url: &str, timeout: Option<Duration>) -> Self {
        Self::with_client(reqwest::Client::new(), api_url, timeout)
    }

    pub fn with_client(client: reqwest::Client, api_url: &str, timeout: Option<Duration>) -> Self {
        Self {
            client,
            predict_endpoint: join_url(api_url, PREDICT_URL_PATH),
            health_endpoint: join_url(api_url, HEALTH_PATH),
            timeout,
        }
    }

    pub fn predict_endpoint(&self) -> &str {
        &self.predict_endpoint
    }

    async fn send_prediction(&self, url: &str) -> Result<PredictionResult, PredictionError> {
        let request_error = |e: reqwest::Error| PredictionError::Request {
            url: url.to_string(),
            message: e.to_string(),
        };

        let response = self
            .client
            .post(&self.predict_endpoint)
            .json(&PredictUrlRequest {
                url: url.to_string(),
            })
            .send()
            .await
            .map_err(request_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PredictionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await.map_err(request_error)?;
        let result: PredictionResult = serde_json::from_slice(&body)
            .map_err(|e| PredictionError::Decode(e.to_string()))?;

        if !result.success {
            return Err(PredictionError::Rejected(
                result
                    .error_message
                    .unwrap_or_else(|| "no error message".to_string()),
            ));
        }

        Ok(result)
    }
}

#[async_trait]
impl Predictor for HttpPredictor {
    async fn predict(&self, url: &str) -> Result<PredictionResult, PredictionError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.send_prediction(url))
                .await
                .map_err(|_| PredictionError::Timeout(limit))?,
            None => self.send_prediction(url).await,
        }
    }

    async fn health(&self) -> Result<(), PredictionError> {
        let response = self
            .client
            .get(&self.health_endpoint)
            .send()
            .await
            .map_err(|e| PredictionError::Request {
                url: self.health_endpoint.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PredictionError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }
}
