//! VeriTrust Dataset Tools
//!
//! Offline helpers around the labeled review corpus:
//! - `columns`: text/label column autodetection
//! - `dataset`: CSV loading with incomplete rows dropped
//! - `report`: validation report (distribution, lengths, duplicates)
//! - `split`: seeded stratified train/test split
//! - `evaluation`: scoring the served classifier on a held-out split

pub mod cli;
pub mod columns;
pub mod dataset;
pub mod evaluation;
pub mod report;
pub mod split;

pub use columns::{ColumnSelection, ResolvedColumns};
pub use dataset::{ReviewDataset, ReviewRecord, DEFAULT_DATASET_PATH};
pub use evaluation::{
    evaluate, parse_label, select_holdout, ConfusionMatrix, EvaluationReport, HoldoutOptions,
    LabeledReview,
};
pub use report::ValidationReport;
pub use split::{stratified_split, Split};
