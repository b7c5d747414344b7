//! Image classifier collaborator.
//!
//! Provides the `LabelSource` trait and an HTTP implementation. The scoring
//! core never talks to a classifier itself; callers resolve labels here and
//! hand them over already sorted by descending probability.

use ecocert_model::LabelPrediction;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// Errors from classifier operations.
#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Classifier returned {0}")]
    Status(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Classifier not available")]
    Unavailable,
}

impl From<reqwest::Error> for ClassifierError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::Unavailable
        } else if e.is_decode() {
            Self::ParseError(e.to_string())
        } else {
            Self::Connection(e.to_string())
        }
    }
}

/// Anything that turns image bytes into label predictions.
pub trait LabelSource {
    /// Classify an image. Predictions come back sorted by descending probability.
    fn classify(
        &self,
        image: Vec<u8>,
    ) -> impl Future<Output = Result<Vec<LabelPrediction>, ClassifierError>> + Send;

    /// Check if the classifier is reachable.
    fn health_check(&self) -> impl Future<Output = Result<(), ClassifierError>> + Send;

    /// Name for logging.
    fn name(&self) -> &'static str;
}

/// HTTP classifier configuration.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Base URL of the classifier service
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Keep at most this many predictions
    pub top_k: usize,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8501".to_string(),
            timeout_secs: 30,
            top_k: 20,
        }
    }
}

/// Classifier reached over HTTP.
pub struct HttpClassifier {
    config: ClassifierConfig,
    client: reqwest::Client,
}

impl HttpClassifier {
    pub fn new(config: ClassifierConfig) -> Result<Self, ClassifierError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClassifierError::Connection(e.to_string()))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Parse a classifier response into sorted, truncated predictions.
    ///
    /// Accepts the native `predictions` shape or a Vision-style
    /// `responses[0].labelAnnotations` body.
    fn parse_response(&self, response: serde_json::Value) -> Result<Vec<LabelPrediction>, ClassifierError> {
        let mut predictions = if let Some(items) = response.get("predictions").and_then(|p| p.as_array()) {
            items
                .iter()
                .map(|item| {
                    let label = item
                        .get("label")
                        .or_else(|| item.get("className"))
                        .and_then(|v| v.as_str())
                        .ok_or_else(|| ClassifierError::ParseError("Prediction without label".to_string()))?;
                    let probability = item
                        .get("probability")
                        .and_then(|v| v.as_f64())
                        .unwrap_or(0.0);
                    Ok(LabelPrediction::new(label, probability))
                })
                .collect::<Result<Vec<_>, ClassifierError>>()?
        } else if let Some(items) = response
            .get("responses")
            .and_then(|r| r.get(0))
            .and_then(|r| r.get("labelAnnotations"))
            .and_then(|a| a.as_array())
        {
            items
                .iter()
                .filter_map(|item| {
                    let label = item.get("description").and_then(|v| v.as_str())?;
                    let score = item.get("score").and_then(|v| v.as_f64()).unwrap_or(0.0);
                    Some(LabelPrediction::new(label, score))
                })
                .collect()
        } else {
            return Err(ClassifierError::ParseError("Missing predictions array".to_string()));
        };

        predictions.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        predictions.truncate(self.config.top_k);

        Ok(predictions)
    }
}

impl LabelSource for HttpClassifier {
    async fn classify(&self, image: Vec<u8>) -> Result<Vec<LabelPrediction>, ClassifierError> {
        tracing::debug!(bytes = image.len(), url = %self.config.base_url, "Sending image to classifier");

        let response = self
            .client
            .post(self.url("classify"))
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(image)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClassifierError::Status(format!("HTTP {}: {}", status, body)));
        }

        let json: serde_json::Value = response.json().await?;
        let predictions = self.parse_response(json)?;

        tracing::debug!(labels = predictions.len(), "Classifier responded");
        Ok(predictions)
    }

    async fn health_check(&self) -> Result<(), ClassifierError> {
        let response = self.client.get(self.url("health")).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ClassifierError::Unavailable)
        }
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
