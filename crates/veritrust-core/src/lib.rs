//! VeriTrust Core
//!
//! Core types and utilities shared across VeriTrust components.
//!
//! This crate provides:
//! - The HTTP wire contract (`ReviewRequest`, `PredictionResponse`, `HealthResponse`)
//! - The binary `Label` and the confidence rounding rule
//! - Error types and result handling

pub mod error;
pub mod types;

pub use error::{ColumnRole, Error, Result};
pub use types::{
    is_review_whitespace, round_confidence, word_count, ErrorBody, HealthResponse, Label,
    PredictionResponse, ReviewRequest, SERVICE_NAME,
};
