//! Held-out evaluation of the served classifier

use crate::split::{stratified_split, DEFAULT_SEED, DEFAULT_TEST_SIZE};
use serde::Serialize;
use std::fmt;
use std::time::Instant;
use tracing::{debug, info};
use veritrust_classifiers::Classifier;
use veritrust_core::{Error, Label, Result};

/// How often progress is logged while classifying
const PROGRESS_EVERY: usize = 100;

/// Map a raw dataset label onto the binary verdict.
///
/// Accepts the numeric encoding and the common corpus tags, case-insensitive:
/// `1`, `fake`, `cg`, `deceptive`, `spam` are fake; `0`, `real`, `or`,
/// `truthful`, `genuine`, `ham` are real.
pub fn parse_label(raw: &str) -> Result<Label> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "fake" | "cg" | "deceptive" | "spam" => Ok(Label::Fake),
        "0" | "real" | "or" | "truthful" | "genuine" | "ham" => Ok(Label::Real),
        _ => Err(Error::UnknownLabel(raw.to_string())),
    }
}

/// A review with its ground-truth verdict
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledReview {
    pub text: String,
    pub label: Label,
}

/// Which reviews to score
#[derive(Debug, Clone)]
pub struct HoldoutOptions {
    pub test_size: f64,
    pub seed: u64,

    /// Score every review instead of the held-out split
    pub all: bool,
    pub limit: Option<usize>,
}

impl Default for HoldoutOptions {
    fn default() -> Self {
        Self {
            test_size: DEFAULT_TEST_SIZE,
            seed: DEFAULT_SEED,
            all: false,
            limit: None,
        }
    }
}

/// Pick the evaluation set: the stratified test split unless `all` is set
pub fn select_holdout(
    reviews: Vec<LabeledReview>,
    options: &HoldoutOptions,
) -> Result<Vec<LabeledReview>> {
    let mut selected = if options.all {
        reviews
    } else {
        stratified_split(reviews, options.test_size, options.seed, |r| r.label)?.test
    };

    if let Some(limit) = options.limit {
        selected.truncate(limit);
    }
    Ok(selected)
}

/// 2x2 confusion matrix; rows are actual classes, columns predicted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionMatrix {
    counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    pub fn record(&mut self, actual: Label, predicted: Label) {
        self.counts[actual.class_index()][predicted.class_index()] += 1;
    }

    pub fn get(&self, actual: Label, predicted: Label) -> usize {
        self.counts[actual.class_index()][predicted.class_index()]
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn correct(&self) -> usize {
        Label::ALL.iter().map(|&l| self.get(l, l)).sum()
    }

    /// Number of samples whose actual class is `label`
    pub fn support(&self, label: Label) -> usize {
        self.counts[label.class_index()].iter().sum()
    }

    fn predicted(&self, label: Label) -> usize {
        Label::ALL.iter().map(|&actual| self.get(actual, label)).sum()
    }

    pub fn class_metrics(&self, label: Label) -> ClassMetrics {
        let tp = self.get(label, label) as f64;
        let precision = ratio(tp, self.predicted(label) as f64);
        let recall = ratio(tp, self.support(label) as f64);
        let f1 = ratio(2.0 * precision * recall, precision + recall);

        ClassMetrics {
            label,
            precision,
            recall,
            f1,
            support: self.support(label),
        }
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>14}{:>10}{:>10}", "", "pred real", "pred fake")?;
        for actual in Label::ALL {
            writeln!(
                f,
                "{:>14}{:>10}{:>10}",
                format!("actual {}", actual),
                self.get(actual, Label::Real),
                self.get(actual, Label::Fake)
            )?;
        }
        Ok(())
    }
}

/// Zero when the denominator is zero
fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub label: Label,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AveragedMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Result of running the classifier over a labeled set
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub model: String,
    pub confusion: ConfusionMatrix,
    pub per_class: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AveragedMetrics,
    pub weighted_avg: AveragedMetrics,
    pub elapsed_ms: u128,
}

impl EvaluationReport {
    pub fn from_confusion(model: impl Into<String>, confusion: ConfusionMatrix) -> Self {
        let per_class: Vec<ClassMetrics> = Label::ALL
            .iter()
            .map(|&label| confusion.class_metrics(label))
            .collect();

        let n = per_class.len() as f64;
        let macro_avg = AveragedMetrics {
            precision: per_class.iter().map(|m| m.precision).sum::<f64>() / n,
            recall: per_class.iter().map(|m| m.recall).sum::<f64>() / n,
            f1: per_class.iter().map(|m| m.f1).sum::<f64>() / n,
        };

        let total = confusion.total() as f64;
        let weighted = |metric: fn(&ClassMetrics) -> f64| {
            ratio(
                per_class
                    .iter()
                    .map(|m| metric(m) * m.support as f64)
                    .sum::<f64>(),
                total,
            )
        };
        let weighted_avg = AveragedMetrics {
            precision: weighted(|m| m.precision),
            recall: weighted(|m| m.recall),
            f1: weighted(|m| m.f1),
        };

        Self {
            model: model.into(),
            accuracy: ratio(confusion.correct() as f64, total),
            confusion,
            per_class,
            macro_avg,
            weighted_avg,
            elapsed_ms: 0,
        }
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.confusion.total();

        writeln!(f, "Model: {}", self.model)?;
        writeln!(f)?;
        writeln!(
            f,
            "{:>14}{:>11}{:>11}{:>11}{:>11}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for m in &self.per_class {
            writeln!(
                f,
                "{:>14}{:>11.4}{:>11.4}{:>11.4}{:>11}",
                m.label.as_str(),
                m.precision,
                m.recall,
                m.f1,
                m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>14}{:>11}{:>11}{:>11.4}{:>11}",
            "accuracy", "", "", self.accuracy, total
        )?;
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>14}{:>11.4}{:>11.4}{:>11.4}{:>11}",
                name, avg.precision, avg.recall, avg.f1, total
            )?;
        }
        writeln!(f)?;
        writeln!(f, "Confusion matrix:")?;
        write!(f, "{}", self.confusion)
    }
}

/// Classify every review and score the verdicts against ground truth
pub async fn evaluate(
    classifier: &dyn Classifier,
    reviews: &[LabeledReview],
) -> Result<EvaluationReport> {
    let start = Instant::now();
    let mut confusion = ConfusionMatrix::default();

    info!(
        "Evaluating {} on {} reviews",
        classifier.name(),
        reviews.len()
    );

    for (idx, review) in reviews.iter().enumerate() {
        let result = classifier.classify(&review.text).await?;
        confusion.record(review.label, result.verdict());

        if (idx + 1) % PROGRESS_EVERY == 0 {
            debug!("Classified {}/{}", idx + 1, reviews.len());
        }
    }

    let mut report = EvaluationReport::from_confusion(classifier.name(), confusion);
    report.elapsed_ms = start.elapsed().as_millis();

    info!(
        "Evaluation finished: accuracy {:.4} in {}ms",
        report.accuracy, report.elapsed_ms
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_label_encodings() {
        for raw in ["1", "fake", "CG", " Deceptive ", "spam"] {
            assert_eq!(parse_label(raw).unwrap(), Label::Fake, "{raw}");
        }
        for raw in ["0", "REAL", "or", "truthful", "Genuine", "ham"] {
            assert_eq!(parse_label(raw).unwrap(), Label::Real, "{raw}");
        }
        assert!(matches!(parse_label("maybe"), Err(Error::UnknownLabel(l)) if l == "maybe"));
    }

    fn reviews(n_real: usize, n_fake: usize) -> Vec<LabeledReview> {
        (0..n_real + n_fake)
            .map(|i| LabeledReview {
                text: format!("review {i}"),
                label: if i < n_real { Label::Real } else { Label::Fake },
            })
            .collect()
    }

    #[test]
    fn test_select_holdout() {
        let held_out = select_holdout(reviews(50, 50), &HoldoutOptions::default()).unwrap();
        assert_eq!(held_out.len(), 20);

        let all = HoldoutOptions {
            all: true,
            limit: Some(7),
            ..Default::default()
        };
        let selected = select_holdout(reviews(50, 50), &all).unwrap();
        assert_eq!(selected.len(), 7);
        assert_eq!(selected[0].text, "review 0");
    }

    fn matrix(tn: usize, fp: usize, fn_: usize, tp: usize) -> ConfusionMatrix {
        let mut m = ConfusionMatrix::default();
        for _ in 0..tn {
            m.record(Label::Real, Label::Real);
        }
        for _ in 0..fp {
            m.record(Label::Real, Label::Fake);
        }
        for _ in 0..fn_ {
            m.record(Label::Fake, Label::Real);
        }
        for _ in 0..tp {
            m.record(Label::Fake, Label::Fake);
        }
        m
    }

    #[test]
    fn test_class_metrics() {
        let m = matrix(40, 10, 5, 45);
        let fake = m.class_metrics(Label::Fake);

        assert_eq!(fake.support, 50);
        assert!((fake.precision - 45.0 / 55.0).abs() < 1e-12);
        assert!((fake.recall - 0.9).abs() < 1e-12);

        let report = EvaluationReport::from_confusion("test", m);
        assert!((report.accuracy - 0.85).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_average_uses_support() {
        let report = EvaluationReport::from_confusion("test", matrix(90, 0, 10, 0));

        // Nothing predicted fake: fake precision and recall are zero.
        assert_eq!(report.per_class[1].precision, 0.0);
        assert_eq!(report.per_class[1].recall, 0.0);
        assert!((report.weighted_avg.recall - 0.9).abs() < 1e-12);
        assert!((report.macro_avg.recall - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_empty_matrix_has_zero_metrics() {
        let report = EvaluationReport::from_confusion("test", ConfusionMatrix::default());
        assert_eq!(report.accuracy, 0.0);
        assert_eq!(report.weighted_avg.f1, 0.0);
    }

    #[test]
    fn test_report_display() {
        let text = EvaluationReport::from_confusion("roberta", matrix(3, 1, 1, 3)).to_string();
        assert!(text.contains("precision"));
        assert!(text.contains("weighted avg"));
        assert!(text.contains("actual fake"));
        assert!(text.contains("0.7500"));
    }
}
