//! Model configuration structures

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use veritrust_core::{Error, Result};

/// Directory the fine-tuned classifier is read from when nothing else is configured
pub const DEFAULT_MODEL_PATH: &str = "models/roberta_finetuned";

/// Configuration for the review classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model name used in logs and metadata
    #[serde(default = "default_name")]
    pub name: String,

    /// Model source (where to load from)
    #[serde(default)]
    pub source: ModelSource,

    /// Maximum sequence length; longer inputs are truncated
    #[serde(default = "default_max_length")]
    pub max_length: usize,

    /// Device to run on
    #[serde(default)]
    pub device: DeviceSpec,

    /// Number of output classes
    #[serde(default = "default_num_labels")]
    pub num_labels: usize,

    /// Class names in index order
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,
}

/// Model source configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModelSource {
    /// Load from local filesystem
    Local { path: PathBuf },

    /// Download from HuggingFace Hub
    HuggingFace {
        repo: String,
        #[serde(default = "default_revision")]
        revision: String,
    },
}

impl Default for ModelSource {
    fn default() -> Self {
        Self::Local {
            path: PathBuf::from(DEFAULT_MODEL_PATH),
        }
    }
}

/// Device selection for inference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceSpec {
    /// CUDA when available, otherwise CPU
    #[default]
    Auto,
    Cpu,
    Cuda,
    Metal,
}

fn default_name() -> String {
    "roberta-finetuned".to_string()
}

fn default_revision() -> String {
    "main".to_string()
}

fn default_max_length() -> usize {
    256
}

fn default_num_labels() -> usize {
    2
}

fn default_labels() -> Vec<String> {
    vec!["real".to_string(), "fake".to_string()]
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            source: ModelSource::default(),
            max_length: default_max_length(),
            device: DeviceSpec::default(),
            num_labels: default_num_labels(),
            labels: default_labels(),
        }
    }
}

impl ModelConfig {
    /// Create a configuration that loads from a local directory
    pub fn from_local(path: impl Into<PathBuf>) -> Self {
        Self {
            source: ModelSource::Local { path: path.into() },
            ..Default::default()
        }
    }

    /// Set device
    pub fn with_device(mut self, device: DeviceSpec) -> Self {
        self.device = device;
        self
    }

    /// Set maximum sequence length
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Reject configurations the binary review contract cannot serve
    pub fn validate(&self) -> Result<()> {
        if self.num_labels != 2 {
            return Err(Error::config(format!(
                "review classifier must have exactly 2 labels, got {}",
                self.num_labels
            )));
        }
        if self.max_length == 0 {
            return Err(Error::config("max_length must be greater than zero"));
        }
        Ok(())
    }

    /// Human-readable location of the model, for logs
    pub fn location(&self) -> String {
        match &self.source {
            ModelSource::Local { path } => path.display().to_string(),
            ModelSource::HuggingFace { repo, revision } => format!("hf://{}@{}", repo, revision),
        }
    }
}
