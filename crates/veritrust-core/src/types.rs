//! Wire types for the VeriTrust HTTP contract

use serde::{Deserialize, Serialize};
use std::fmt;

/// Service name reported by the health endpoint
pub const SERVICE_NAME: &str = "veritrust";

/// Number of decimal places kept on a reported confidence
pub const CONFIDENCE_DECIMALS: i32 = 4;

/// Whitespace for review text: Unicode `White_Space` plus the ASCII
/// information separators U+001C..=U+001F, which clients treat as blanks.
pub fn is_review_whitespace(c: char) -> bool {
    c.is_whitespace() || ('\u{1c}'..='\u{1f}').contains(&c)
}

/// Number of whitespace-separated words in `text`
pub fn word_count(text: &str) -> usize {
    text.split(is_review_whitespace)
        .filter(|word| !word.is_empty())
        .count()
}

/// Body of `POST /predict`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewRequest {
    /// Raw review text
    pub text: String,
}

impl ReviewRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// True when the text has at least one non-whitespace character
    pub fn is_acceptable(&self) -> bool {
        self.text.chars().any(|c| !is_review_whitespace(c))
    }
}

/// Final binary classification outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Real,
    Fake,
}

impl Label {
    /// Both labels in class-index order
    pub const ALL: [Label; 2] = [Label::Real, Label::Fake];

    /// Map a model class index to a label. Index 1 is the fake class.
    pub fn from_class_index(index: usize) -> Self {
        if index == 1 {
            Self::Fake
        } else {
            Self::Real
        }
    }

    /// Class index the model uses for this label
    pub fn class_index(self) -> usize {
        match self {
            Self::Real => 0,
            Self::Fake => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Real => "real",
            Self::Fake => "fake",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body returned by a successful `POST /predict`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub label: Label,

    /// Winning-class probability, rounded to four decimals
    pub confidence: f64,

    /// Heuristic reasons the review may be suspicious, in rule order
    pub signals: Vec<String>,
}

/// Body returned by `GET /health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub model_loaded: bool,
}

impl HealthResponse {
    pub fn ok(model_loaded: bool) -> Self {
        Self {
            status: "ok".to_string(),
            service: SERVICE_NAME.to_string(),
            model_loaded,
        }
    }
}

/// Error body for non-2xx responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Clamp a probability into [0, 1] and round it to four decimals.
///
/// Halves round to even, so exact binary ties such as 29/32 give 0.9062.
/// Non-finite input is reported as 0.
pub fn round_confidence(probability: f64) -> f64 {
    if !probability.is_finite() {
        return 0.0;
    }
    let scale = 10f64.powi(CONFIDENCE_DECIMALS);
    (probability.clamp(0.0, 1.0) * scale).round_ties_even() / scale
}
