//! CSV loading for labeled review datasets

use crate::columns::{ColumnSelection, ResolvedColumns};
use crate::evaluation::{parse_label, LabeledReview};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use veritrust_core::{Error, Result};

/// Default dataset location, relative to the repository root
pub const DEFAULT_DATASET_PATH: &str = "data/raw/final_labeled_fake_reviews.csv";

/// One usable row: both text and label present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRecord {
    pub text: String,
    pub label: String,
}

/// A loaded dataset with rows missing text or label already dropped
#[derive(Debug, Clone)]
pub struct ReviewDataset {
    pub path: PathBuf,
    pub columns: ResolvedColumns,
    pub records: Vec<ReviewRecord>,

    /// Data rows read from the file, before dropping
    pub total_rows: usize,
}

impl ReviewDataset {
    /// Read a CSV file, autodetecting the text and label columns
    pub fn load(path: impl AsRef<Path>, selection: &ColumnSelection) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::MissingDataset(path.to_path_buf()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|e| Error::dataset(format!("Failed to open {}: {}", path.display(), e)))?;

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| Error::dataset(format!("Failed to read header: {}", e)))?
            .iter()
            .map(str::to_string)
            .collect();
        let columns = selection.resolve(&headers)?;
        debug!(
            "Using text column '{}' and label column '{}'",
            columns.text_name, columns.label_name
        );

        let mut records = Vec::new();
        let mut total_rows = 0;
        for (line, row) in reader.records().enumerate() {
            let row = row.map_err(|e| {
                Error::dataset(format!("Failed to parse data row {}: {}", line + 1, e))
            })?;
            total_rows += 1;

            let text = row.get(columns.text_index).unwrap_or_default();
            let label = row.get(columns.label_index).unwrap_or_default().trim();
            if text.is_empty() || label.is_empty() {
                continue;
            }

            records.push(ReviewRecord {
                text: text.to_string(),
                label: label.to_string(),
            });
        }

        info!(
            "Loaded {} of {} rows from {}",
            records.len(),
            total_rows,
            path.display()
        );

        Ok(Self {
            path: path.to_path_buf(),
            columns,
            records,
            total_rows,
        })
    }

    /// Rows dropped for a missing text or label
    pub fn dropped_rows(&self) -> usize {
        self.total_rows - self.records.len()
    }

    /// Map every raw label to a verdict; fails on the first unknown label
    pub fn labeled_reviews(&self) -> Result<Vec<LabeledReview>> {
        self.records
            .iter()
            .map(|r| {
                Ok(LabeledReview {
                    text: r.text.clone(),
                    label: parse_label(&r.label)?,
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_drops_incomplete_rows() {
        let file = write_csv(
            "category,rating,label,text_\n\
             Home,5,CG,\"Love this, best ever!\"\n\
             Home,4,OR,\n\
             Toys,3,,\"Decent, but the battery died\"\n\
             Toys,2,OR,\"Broke after a week\"\n",
        );

        let dataset = ReviewDataset::load(file.path(), &ColumnSelection::default()).unwrap();

        assert_eq!(dataset.total_rows, 4);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.dropped_rows(), 2);
        assert_eq!(dataset.records[0].text, "Love this, best ever!");
        assert_eq!(dataset.records[0].label, "CG");
        assert_eq!(dataset.columns.text_name, "text_");
    }

    #[test]
    fn test_short_rows_are_dropped_not_fatal() {
        let file = write_csv("label,text\n1,great\n0\n");
        let dataset = ReviewDataset::load(file.path(), &ColumnSelection::default()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.dropped_rows(), 1);
    }

    #[test]
    fn test_labeled_reviews_map_corpus_tags() {
        let file = write_csv("label,text\nCG,too good to be true\nOR,arrived late\n");
        let dataset = ReviewDataset::load(file.path(), &ColumnSelection::default()).unwrap();
        let reviews = dataset.labeled_reviews().unwrap();
        assert_eq!(reviews[0].label, veritrust_core::Label::Fake);
        assert_eq!(reviews[1].label, veritrust_core::Label::Real);

        let file = write_csv("label,text\nunsure,hmm\n");
        let dataset = ReviewDataset::load(file.path(), &ColumnSelection::default()).unwrap();
        assert!(matches!(
            dataset.labeled_reviews(),
            Err(Error::UnknownLabel(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = ReviewDataset::load("/nonexistent/reviews.csv", &ColumnSelection::default())
            .unwrap_err();
        assert!(matches!(err, Error::MissingDataset(_)));
    }

    #[test]
    fn test_missing_column() {
        let file = write_csv("comment,stars\nnice,5\n");
        let err = ReviewDataset::load(file.path(), &ColumnSelection::default()).unwrap_err();
        assert!(matches!(err, Error::MissingColumn { .. }));
    }
}
