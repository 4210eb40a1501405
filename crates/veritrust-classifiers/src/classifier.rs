//! Classifier trait and common types

use async_trait::async_trait;
use veritrust_core::{Error, Label, Result};

/// Trait for all review classifiers
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Classify the given text
    async fn classify(&self, text: &str) -> Result<ClassificationResult>;

    /// Get the classifier name
    fn name(&self) -> &str;
}

/// Result of classification
#[derive(Debug, Clone)]
pub struct ClassificationResult {
    /// Index of the winning class
    pub class_index: usize,

    /// Classification label
    pub label: String,

    /// Probability of the winning class (0.0-1.0)
    pub score: f32,

    /// Additional metadata
    pub metadata: ClassificationMetadata,

    /// Latency in microseconds
    pub latency_us: u64,
}

impl ClassificationResult {
    /// Build a result by taking the argmax of a probability distribution.
    ///
    /// Ties resolve to the lowest index. Classes without a configured name
    /// are reported as `label_{idx}`.
    pub fn from_probabilities(probabilities: &[f32], labels: &[String]) -> Result<Self> {
        let (class_index, score) = argmax(probabilities)
            .ok_or_else(|| Error::classifier("Model produced an empty probability distribution"))?;

        let label = class_label(labels, class_index);
        let all_scores = probabilities
            .iter()
            .enumerate()
            .map(|(idx, p)| (class_label(labels, idx), *p))
            .collect();

        Ok(Self {
            class_index,
            label,
            score,
            metadata: ClassificationMetadata {
                all_scores: Some(all_scores),
                ..Default::default()
            },
            latency_us: 0,
        })
    }

    /// Binary review verdict for this result
    pub fn verdict(&self) -> Label {
        Label::from_class_index(self.class_index)
    }
}

/// Metadata about classification
#[derive(Debug, Clone, Default)]
pub struct ClassificationMetadata {
    /// Model name or version
    pub model: Option<String>,

    /// All class scores
    pub all_scores: Option<Vec<(String, f32)>>,

    /// Number of tokens fed to the model after truncation
    pub num_tokens: Option<usize>,
}

fn class_label(labels: &[String], idx: usize) -> String {
    labels
        .get(idx)
        .cloned()
        .unwrap_or_else(|| format!("label_{}", idx))
}

fn argmax(values: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (idx, &value) in values.iter().enumerate() {
        match best {
            Some((_, current)) if value <= current => {}
            _ => best = Some((idx, value)),
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels() -> Vec<String> {
        vec!["real".to_string(), "fake".to_string()]
    }

    #[test]
    fn test_argmax_picks_fake_class() {
        let result = ClassificationResult::from_probabilities(&[0.2, 0.8], &labels()).unwrap();
        assert_eq!(result.class_index, 1);
        assert_eq!(result.label, "fake");
        assert_eq!(result.verdict(), Label::Fake);
        assert!((result.score - 0.8).abs() < f32::EPSILON);
    }

    #[test]
    fn test_tie_resolves_to_lowest_index() {
        let result = ClassificationResult::from_probabilities(&[0.5, 0.5], &labels()).unwrap();
        assert_eq!(result.class_index, 0);
        assert_eq!(result.verdict(), Label::Real);
    }

    #[test]
    fn test_unnamed_classes_get_generic_labels() {
        let result = ClassificationResult::from_probabilities(&[0.1, 0.2, 0.7], &labels()).unwrap();
        assert_eq!(result.label, "label_2");
        // Only index 1 is fake
        assert_eq!(result.verdict(), Label::Real);
        let scores = result.metadata.all_scores.unwrap();
        assert_eq!(scores[1].0, "fake");
    }

    #[test]
    fn test_empty_distribution_is_error() {
        assert!(ClassificationResult::from_probabilities(&[], &labels()).is_err());
    }
}
