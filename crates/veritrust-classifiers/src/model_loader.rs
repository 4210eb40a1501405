//! Candle-backed RoBERTa sequence classifier
//!
//! Loads a fine-tuned RoBERTa checkpoint (`config.json`, weights, tokenizer) once
//! and serves read-only forward passes. The model is immutable after loading, so a
//! single instance is shared across requests without locking.

use crate::classifier::{ClassificationMetadata, ClassificationResult, Classifier};
use crate::model_config::{DeviceSpec, ModelConfig, ModelSource};
use async_trait::async_trait;
use candle_core::{DType, Device, Tensor, D};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{
    Config as RobertaConfig, XLMRobertaForSequenceClassification,
};
use hf_hub::{api::sync::Api, Repo, RepoType};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokenizers::{Tokenizer, TruncationParams};
use veritrust_core::{Error, Result};

const SAFETENSORS_FILE: &str = "model.safetensors";
const PYTORCH_FILE: &str = "pytorch_model.bin";

/// RoBERTa-for-sequence-classification model with its tokenizer
pub struct RobertaSequenceClassifier {
    name: String,
    tokenizer: Tokenizer,
    model: XLMRobertaForSequenceClassification,
    device: Device,
    labels: Vec<String>,
}

impl RobertaSequenceClassifier {
    /// Load the model and tokenizer described by `config`
    pub fn load(config: &ModelConfig) -> Result<Self> {
        config.validate()?;

        let model_dir = resolve_model_dir(&config.source)?;
        let device = create_device(config.device)?;
        let tokenizer = load_tokenizer(&model_dir, config.max_length)?;
        let roberta_config: RobertaConfig = parse_json_config(&model_dir.join("config.json"))?;
        let vb = load_var_builder(&model_dir, &device)?;
        let model = load_sequence_model(&vb, config.num_labels, &roberta_config)?;

        tracing::info!(
            "Loaded RoBERTa classifier '{}' from {} on {:?} (max_length={}, labels={:?})",
            config.name,
            model_dir.display(),
            device,
            config.max_length,
            config.labels
        );

        Ok(Self {
            name: config.name.clone(),
            tokenizer,
            model,
            device,
            labels: config.labels.clone(),
        })
    }

    fn forward_probabilities(&self, text: &str) -> Result<(Vec<f32>, usize)> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| Error::classifier(format!("Tokenization failed: {}", e)))?;

        let input_ids = self.row_tensor(encoding.get_ids(), "input ids")?;
        let attention_mask = self.row_tensor(encoding.get_attention_mask(), "attention mask")?;
        let token_type_ids = self.row_tensor(encoding.get_type_ids(), "token type ids")?;

        let logits = self
            .model
            .forward(&input_ids, &attention_mask, &token_type_ids)
            .map_err(|e| Error::classifier(format!("Model forward pass failed: {}", e)))?;

        Ok((to_probabilities(&logits)?, encoding.len()))
    }

    /// Build a `[1, seq_len]` tensor from one encoding field
    fn row_tensor(&self, values: &[u32], what: &str) -> Result<Tensor> {
        Tensor::new(values, &self.device)
            .map_err(|e| Error::classifier(format!("Failed to create {} tensor: {}", what, e)))?
            .unsqueeze(0)
            .map_err(|e| Error::classifier(format!("Failed to unsqueeze {}: {}", what, e)))
    }
}

#[async_trait]
impl Classifier for RobertaSequenceClassifier {
    async fn classify(&self, text: &str) -> Result<ClassificationResult> {
        let start = Instant::now();

        let (probabilities, num_tokens) = self.forward_probabilities(text)?;
        let mut result = ClassificationResult::from_probabilities(&probabilities, &self.labels)?;

        result.metadata = ClassificationMetadata {
            model: Some(self.name.clone()),
            num_tokens: Some(num_tokens),
            ..result.metadata
        };
        result.latency_us = start.elapsed().as_micros() as u64;

        tracing::debug!(
            label = %result.label,
            score = result.score,
            num_tokens,
            latency_us = result.latency_us,
            "classified review"
        );

        Ok(result)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Resolve the artifact directory, downloading from the Hub when configured
fn resolve_model_dir(source: &ModelSource) -> Result<PathBuf> {
    match source {
        ModelSource::Local { path } => {
            if !path.is_dir() {
                return Err(Error::config(format!(
                    "Model directory not found: {}",
                    path.display()
                )));
            }
            Ok(path.clone())
        }
        ModelSource::HuggingFace { repo, revision } => download_from_huggingface(repo, revision),
    }
}

fn download_from_huggingface(repo: &str, revision: &str) -> Result<PathBuf> {
    tracing::info!("Downloading model from HuggingFace: {} @ {}", repo, revision);

    let api = Api::new()
        .map_err(|e| Error::config(format!("Failed to initialize HuggingFace API: {}", e)))?;
    let repo_obj = api.repo(Repo::with_revision(
        repo.to_string(),
        RepoType::Model,
        revision.to_string(),
    ));

    let config_path = repo_obj
        .get("config.json")
        .map_err(|e| Error::config(format!("Failed to download config.json: {}", e)))?;

    if repo_obj.get(SAFETENSORS_FILE).is_err() {
        repo_obj.get(PYTORCH_FILE).map_err(|e| {
            Error::config(format!("Failed to download model weights from {}: {}", repo, e))
        })?;
    }

    // Tokenizer files are optional individually; load_tokenizer reports if none exist.
    for file in ["tokenizer.json", "vocab.json", "merges.txt"] {
        if let Err(e) = repo_obj.get(file) {
            tracing::debug!("{} not available in {}: {}", file, repo, e);
        }
    }

    // All files of a revision share one snapshot directory.
    config_path
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| Error::config("Invalid HuggingFace cache path"))
}

fn create_device(spec: DeviceSpec) -> Result<Device> {
    match spec {
        DeviceSpec::Cpu => Ok(Device::Cpu),
        DeviceSpec::Auto => Device::cuda_if_available(0)
            .map_err(|e| Error::classifier(format!("Failed to probe CUDA: {}", e))),
        DeviceSpec::Cuda => Device::new_cuda(0)
            .map_err(|e| Error::classifier(format!("Failed to initialize CUDA: {}", e))),
        DeviceSpec::Metal => Device::new_metal(0)
            .map_err(|e| Error::classifier(format!("Failed to initialize Metal: {}", e))),
    }
}

fn parse_json_config<T: DeserializeOwned>(config_path: &Path) -> Result<T> {
    let config_str = std::fs::read_to_string(config_path).map_err(|e| {
        Error::config(format!(
            "Failed to read config {}: {}",
            config_path.display(),
            e
        ))
    })?;

    serde_json::from_str(&config_str).map_err(|e| {
        Error::config(format!(
            "Failed to parse config {}: {}",
            config_path.display(),
            e
        ))
    })
}

/// Load a tokenizer that truncates to `max_length` tokens and never pads
pub(crate) fn load_tokenizer(model_dir: &Path, max_length: usize) -> Result<Tokenizer> {
    let mut tokenizer = read_tokenizer(model_dir)?;

    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length,
            ..Default::default()
        }))
        .map_err(|e| Error::classifier(format!("Failed to configure truncation: {}", e)))?;
    tokenizer.with_padding(None);

    Ok(tokenizer)
}

fn read_tokenizer(model_dir: &Path) -> Result<Tokenizer> {
    let tokenizer_json_path = model_dir.join("tokenizer.json");
    if tokenizer_json_path.exists() {
        tracing::debug!("Loading tokenizer from tokenizer.json");
        return Tokenizer::from_file(&tokenizer_json_path)
            .map_err(|e| Error::classifier(format!("Failed to load tokenizer.json: {}", e)));
    }

    let vocab_path = model_dir.join("vocab.json");
    let merges_path = model_dir.join("merges.txt");
    if vocab_path.exists() && merges_path.exists() {
        tracing::debug!("Building byte-level BPE tokenizer from vocab.json + merges.txt");

        use tokenizers::models::bpe::BPE;
        use tokenizers::pre_tokenizers::byte_level::ByteLevel;
        use tokenizers::processors::roberta::RobertaProcessing;

        let bpe = BPE::from_file(
            vocab_path.to_string_lossy().as_ref(),
            merges_path.to_string_lossy().as_ref(),
        )
        .build()
        .map_err(|e| Error::classifier(format!("Failed to build BPE model: {}", e)))?;

        let mut tokenizer = Tokenizer::new(bpe);
        tokenizer.with_pre_tokenizer(Some(ByteLevel::new(false, true, true)));

        let cls_id = tokenizer.token_to_id("<s>").unwrap_or(0);
        let sep_id = tokenizer.token_to_id("</s>").unwrap_or(2);
        tokenizer.with_post_processor(Some(RobertaProcessing::new(
            ("</s>".to_string(), sep_id),
            ("<s>".to_string(), cls_id),
        )));

        return Ok(tokenizer);
    }

    Err(Error::classifier(format!(
        "No tokenizer found in {} (tried tokenizer.json, vocab.json + merges.txt)",
        model_dir.display()
    )))
}

fn load_var_builder(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let safetensors_path = model_dir.join(SAFETENSORS_FILE);
    if safetensors_path.exists() {
        // SAFETY: the weights file is not modified while the process holds the mapping.
        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[safetensors_path], DType::F32, device)
                .map_err(|e| Error::classifier(format!("Failed to load SafeTensors: {}", e)))?
        };
        return Ok(vb);
    }

    let pytorch_path = model_dir.join(PYTORCH_FILE);
    if pytorch_path.exists() {
        return VarBuilder::from_pth(&pytorch_path, DType::F32, device)
            .map_err(|e| Error::classifier(format!("Failed to load PyTorch weights: {}", e)));
    }

    Err(Error::classifier(format!(
        "No weights found in {} (tried {}, {})",
        model_dir.display(),
        SAFETENSORS_FILE,
        PYTORCH_FILE
    )))
}

fn load_sequence_model(
    vb: &VarBuilder,
    num_labels: usize,
    config: &RobertaConfig,
) -> Result<XLMRobertaForSequenceClassification> {
    let mut errors = Vec::new();

    for prefix in ["", "model"] {
        let vb_prefix = if prefix.is_empty() {
            vb.clone()
        } else {
            vb.pp(prefix)
        };

        match XLMRobertaForSequenceClassification::new(num_labels, config, vb_prefix) {
            Ok(model) => {
                let effective_prefix = if prefix.is_empty() { "<root>" } else { prefix };
                tracing::info!("Loaded RoBERTa weights from '{}'", effective_prefix);
                return Ok(model);
            }
            Err(e) => {
                errors.push(format!(
                    "{}: {}",
                    if prefix.is_empty() { "<root>" } else { prefix },
                    e
                ));
            }
        }
    }

    Err(Error::classifier(format!(
        "Failed to load RoBERTa sequence model with tried prefixes [{}]",
        errors.join(" | ")
    )))
}

fn to_probabilities(logits: &Tensor) -> Result<Vec<f32>> {
    candle_nn::ops::softmax(logits, D::Minus1)
        .map_err(|e| Error::classifier(format!("Softmax failed: {}", e)))?
        .squeeze(0)
        .map_err(|e| Error::classifier(format!("Squeeze failed: {}", e)))?
        .to_vec1()
        .map_err(|e| Error::classifier(format!("Failed to convert to vec: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_local_directory() {
        let config = ModelConfig::from_local("/nonexistent/veritrust/model");
        let err = RobertaSequenceClassifier::load(&config).err().unwrap();
        assert!(matches!(err, Error::Config(_)));
        assert!(err.to_string().contains("Model directory not found"));
    }

    #[test]
    fn test_invalid_config_fails_before_io() {
        let mut config = ModelConfig::from_local("/nonexistent/veritrust/model");
        config.num_labels = 5;
        let err = RobertaSequenceClassifier::load(&config).err().unwrap();
        assert!(err.to_string().contains("exactly 2 labels"));
    }

    #[test]
    fn test_directory_without_tokenizer() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_tokenizer(dir.path(), 256).err().unwrap();
        assert!(err.to_string().contains("No tokenizer found"));
    }

    #[test]
    fn test_directory_without_weights() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_var_builder(dir.path(), &Device::Cpu).err().unwrap();
        assert!(err.to_string().contains("No weights found"));
    }

    #[test]
    fn test_softmax_probabilities_sum_to_one() {
        let logits = Tensor::new(&[[1.0f32, 3.0]], &Device::Cpu).unwrap();
        let probs = to_probabilities(&logits).unwrap();
        assert_eq!(probs.len(), 2);
        assert!((probs.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        assert!(probs[1] > probs[0]);
    }
}
