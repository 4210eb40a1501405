//! Error types for VeriTrust

use std::fmt;
use std::path::PathBuf;

/// Result type alias using VeriTrust's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Which dataset column a lookup was trying to resolve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnRole {
    Text,
    Label,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Label => f.write_str("label"),
        }
    }
}

/// Core error type for VeriTrust operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The classifier failed to load at startup
    #[error("Model not loaded. Check server logs for loading errors.")]
    ModelNotLoaded,

    /// Request text was empty or whitespace-only
    #[error("Review text cannot be empty")]
    EmptyInput,

    /// None of the candidate column names exist in the dataset header
    #[error("could not find a {role} column; checked candidates: {}", .candidates.join(", "))]
    MissingColumn {
        role: ColumnRole,
        candidates: Vec<String>,
    },

    /// Dataset file does not exist
    #[error("dataset not found: {}", .0.display())]
    MissingDataset(PathBuf),

    /// Dataset label value that maps to neither class
    #[error("unrecognized label value: {0:?}")]
    UnknownLabel(String),

    /// Classifier loading or execution errors
    #[error("classifier error: {0}")]
    Classifier(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// Dataset parsing errors
    #[error("dataset error: {0}")]
    Dataset(String),

    /// IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new classifier error
    pub fn classifier(msg: impl Into<String>) -> Self {
        Self::Classifier(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new dataset error
    pub fn dataset(msg: impl Into<String>) -> Self {
        Self::Dataset(msg.into())
    }

    /// Create a missing-column error naming every candidate that was checked
    pub fn missing_column<S: AsRef<str>>(role: ColumnRole, candidates: &[S]) -> Self {
        Self::MissingColumn {
            role,
            candidates: candidates.iter().map(|c| c.as_ref().to_string()).collect(),
        }
    }
}
