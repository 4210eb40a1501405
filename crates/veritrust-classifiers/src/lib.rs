//! VeriTrust Classifiers
//!
//! The review classifier and the rule-based explainability signals that
//! accompany every prediction.
//!
//! - `model_loader`: Candle RoBERTa sequence classifier (behind `ml-models`)
//! - `signals`: ordered heuristic rule table
//!
//! All classifiers run on CPU by default; CUDA is used when available.

pub mod classifier;
#[cfg(feature = "ml-models")]
pub mod model_loader;
pub mod model_config;
pub mod signals;

use std::sync::Arc;
use veritrust_core::Result;

pub use classifier::{ClassificationMetadata, ClassificationResult, Classifier};
#[cfg(feature = "ml-models")]
pub use model_loader::RobertaSequenceClassifier;
pub use model_config::{DeviceSpec, ModelConfig, ModelSource, DEFAULT_MODEL_PATH};
pub use signals::{SignalExtractor, SignalRule};

/// Load the configured review classifier as a shareable trait object
#[cfg(feature = "ml-models")]
pub fn load_classifier(config: &ModelConfig) -> Result<Arc<dyn Classifier>> {
    let classifier = RobertaSequenceClassifier::load(config)?;
    Ok(Arc::new(classifier))
}

/// Load the configured review classifier as a shareable trait object
#[cfg(not(feature = "ml-models"))]
pub fn load_classifier(config: &ModelConfig) -> Result<Arc<dyn Classifier>> {
    config.validate()?;
    Err(veritrust_core::Error::classifier(
        "ML models require 'ml-models' feature flag",
    ))
}
