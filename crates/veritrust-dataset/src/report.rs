//! Dataset validation report

use crate::dataset::ReviewDataset;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use veritrust_classifiers::signals::SHORT_REVIEW_MIN_WORDS;
use veritrust_core::word_count;

/// Majority/minority class ratio above which the dataset is flagged as imbalanced
pub const IMBALANCE_WARN_RATIO: f64 = 1.5;

/// Count and share of one label value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelShare {
    pub label: String,
    pub count: usize,
    pub share: f64,
}

/// Summary statistics over a length distribution
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LengthStats {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
    pub median: f64,
}

impl LengthStats {
    pub fn from_lengths(mut lengths: Vec<usize>) -> Self {
        if lengths.is_empty() {
            return Self::default();
        }
        lengths.sort_unstable();

        let n = lengths.len();
        let mean = lengths.iter().sum::<usize>() as f64 / n as f64;
        let median = if n % 2 == 1 {
            lengths[n / 2] as f64
        } else {
            (lengths[n / 2 - 1] + lengths[n / 2]) as f64 / 2.0
        };

        Self {
            min: lengths[0],
            max: lengths[n - 1],
            mean,
            median,
        }
    }
}

/// Everything `veritrust-data validate` prints
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub path: String,
    pub text_column: String,
    pub label_column: String,
    pub total_rows: usize,
    pub usable_rows: usize,
    pub dropped_rows: usize,
    pub label_distribution: Vec<LabelShare>,
    pub imbalance_ratio: Option<f64>,
    pub char_lengths: LengthStats,
    pub word_lengths: LengthStats,
    pub short_reviews: usize,
    pub short_review_share: f64,
    pub duplicate_texts: usize,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn build(dataset: &ReviewDataset) -> Self {
        let records = &dataset.records;
        let usable = records.len();

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for record in records {
            *counts.entry(record.label.as_str()).or_default() += 1;
        }
        let mut label_distribution: Vec<LabelShare> = counts
            .into_iter()
            .map(|(label, count)| LabelShare {
                label: label.to_string(),
                count,
                share: count as f64 / usable as f64,
            })
            .collect();
        // Largest class first; BTreeMap order breaks ties by label.
        label_distribution.sort_by(|a, b| b.count.cmp(&a.count));

        let imbalance_ratio = match (label_distribution.first(), label_distribution.last()) {
            (Some(major), Some(minor)) if label_distribution.len() > 1 => {
                Some(major.count as f64 / minor.count as f64)
            }
            _ => None,
        };

        let word_counts: Vec<usize> = records
            .iter()
            .map(|r| word_count(&r.text))
            .collect();
        let short_reviews = word_counts
            .iter()
            .filter(|&&words| words < SHORT_REVIEW_MIN_WORDS)
            .count();
        let char_lengths =
            LengthStats::from_lengths(records.iter().map(|r| r.text.chars().count()).collect());
        let word_lengths = LengthStats::from_lengths(word_counts);

        let mut seen = HashSet::new();
        let duplicate_texts = records
            .iter()
            .filter(|r| !seen.insert(r.text.as_str()))
            .count();

        let mut report = Self {
            path: dataset.path.display().to_string(),
            text_column: dataset.columns.text_name.clone(),
            label_column: dataset.columns.label_name.clone(),
            total_rows: dataset.total_rows,
            usable_rows: usable,
            dropped_rows: dataset.dropped_rows(),
            label_distribution,
            imbalance_ratio,
            char_lengths,
            word_lengths,
            short_reviews,
            short_review_share: if usable == 0 {
                0.0
            } else {
                short_reviews as f64 / usable as f64
            },
            duplicate_texts,
            warnings: Vec::new(),
        };
        report.warnings = report.collect_warnings();
        report
    }

    fn collect_warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.usable_rows == 0 {
            warnings.push("Dataset has no usable rows".to_string());
        } else if self.label_distribution.len() < 2 {
            warnings.push(format!(
                "Only {} label value(s) present; a binary classifier needs two",
                self.label_distribution.len()
            ));
        }

        if let Some(ratio) = self.imbalance_ratio {
            if ratio > IMBALANCE_WARN_RATIO {
                warnings.push(format!(
                    "Class imbalance: majority/minority ratio is {:.2} (threshold {:.1})",
                    ratio, IMBALANCE_WARN_RATIO
                ));
            }
        }

        if self.duplicate_texts > 0 {
            warnings.push(format!(
                "{} duplicate review text(s) found",
                self.duplicate_texts
            ));
        }

        if self.dropped_rows > 0 {
            warnings.push(format!(
                "{} row(s) dropped for missing text or label",
                self.dropped_rows
            ));
        }

        warnings
    }

    /// True when the dataset is usable as-is
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== DATASET VALIDATION ===")?;
        writeln!(f, "File          : {}", self.path)?;
        writeln!(f, "Text column   : {}", self.text_column)?;
        writeln!(f, "Label column  : {}", self.label_column)?;
        writeln!(f, "Total rows    : {}", self.total_rows)?;
        writeln!(f, "Usable rows   : {}", self.usable_rows)?;
        writeln!(f, "Dropped rows  : {}", self.dropped_rows)?;
        writeln!(f)?;

        writeln!(f, "=== LABEL DISTRIBUTION ===")?;
        for share in &self.label_distribution {
            writeln!(
                f,
                "{:>12} : {:>8} ({:>5.1}%)",
                share.label,
                share.count,
                share.share * 100.0
            )?;
        }
        if let Some(ratio) = self.imbalance_ratio {
            writeln!(f, "Imbalance ratio: {:.2}", ratio)?;
        }
        writeln!(f)?;

        writeln!(f, "=== TEXT LENGTH ===")?;
        writeln!(
            f,
            "Characters : min {} / max {} / mean {:.1} / median {:.1}",
            self.char_lengths.min,
            self.char_lengths.max,
            self.char_lengths.mean,
            self.char_lengths.median
        )?;
        writeln!(
            f,
            "Words      : min {} / max {} / mean {:.1} / median {:.1}",
            self.word_lengths.min,
            self.word_lengths.max,
            self.word_lengths.mean,
            self.word_lengths.median
        )?;
        writeln!(
            f,
            "Short reviews (< {} words): {} ({:.1}%)",
            SHORT_REVIEW_MIN_WORDS,
            self.short_reviews,
            self.short_review_share * 100.0
        )?;
        writeln!(f, "Duplicate texts: {}", self.duplicate_texts)?;
        writeln!(f)?;

        if self.warnings.is_empty() {
            writeln!(f, "No issues found.")?;
        } else {
            writeln!(f, "=== WARNINGS ===")?;
            for warning in &self.warnings {
                writeln!(f, "! {}", warning)?;
            }
        }
        Ok(())
    }
}
