//! Immutable service context shared by all handlers

use crate::config::ServerConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use veritrust_classifiers::{load_classifier, Classifier, SignalExtractor};
use veritrust_core::{
    round_confidence, Error, Label, PredictionResponse, ReviewRequest, Result,
};

/// Shared application state
///
/// Built once at startup. A classifier that failed to load is recorded as
/// `None`; the server still starts and reports `model_loaded: false`.
#[derive(Clone)]
pub struct AppState {
    classifier: Option<Arc<dyn Classifier>>,
    signals: Arc<SignalExtractor>,
    metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(classifier: Option<Arc<dyn Classifier>>, signals: SignalExtractor) -> Self {
        Self {
            classifier,
            signals: Arc::new(signals),
            metrics: None,
        }
    }

    /// Load the classifier from configuration, tolerating load failure
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        let classifier = match load_classifier(&config.model) {
            Ok(classifier) => {
                tracing::info!("Model loaded successfully: {}", classifier.name());
                Some(classifier)
            }
            Err(e) => {
                tracing::error!("Error loading model: {}", e);
                tracing::error!("Expected model path: {}", config.model.location());
                None
            }
        };

        Ok(Self::new(classifier, SignalExtractor::standard()?))
    }

    /// Attach the Prometheus handle rendered by `/metrics`
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    pub fn model_loaded(&self) -> bool {
        self.classifier.is_some()
    }

    pub fn metrics_handle(&self) -> Option<&PrometheusHandle> {
        self.metrics.as_ref()
    }

    /// Classify a review and attach explainability signals
    pub async fn predict(&self, request: &ReviewRequest) -> Result<PredictionResponse> {
        if !request.is_acceptable() {
            return Err(Error::EmptyInput);
        }

        let classifier = self.classifier.as_ref().ok_or(Error::ModelNotLoaded)?;
        let result = classifier.classify(&request.text).await?;

        metrics::histogram!("veritrust_inference_latency_us").record(result.latency_us as f64);

        let label = Label::from_class_index(result.class_index);
        let confidence = round_confidence(f64::from(result.score));
        let signals = self.signals.extract(&request.text, confidence);

        Ok(PredictionResponse {
            label,
            confidence,
            signals,
        })
    }
}
