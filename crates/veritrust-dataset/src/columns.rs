//! Column autodetection
//!
//! Labeled review exports name their columns inconsistently. Each role has an
//! ordered candidate list; the first candidate present in the header wins. An
//! exact match is preferred over a case-insensitive one.

use veritrust_core::{ColumnRole, Error, Result};

/// Candidate names for the review text column, in priority order
pub const TEXT_COLUMN_CANDIDATES: &[&str] =
    &["text", "text_", "review", "review_text", "content", "body"];

/// Candidate names for the label column, in priority order
pub const LABEL_COLUMN_CANDIDATES: &[&str] = &["label", "labels", "class", "target", "is_fake"];

/// Explicit column names that bypass detection
#[derive(Debug, Clone, Default)]
pub struct ColumnSelection {
    pub text: Option<String>,
    pub label: Option<String>,
}

/// Resolved column positions in a header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedColumns {
    pub text_index: usize,
    pub text_name: String,
    pub label_index: usize,
    pub label_name: String,
}

impl ColumnSelection {
    /// Resolve both columns against a header row
    pub fn resolve(&self, headers: &[String]) -> Result<ResolvedColumns> {
        let text_index = match &self.text {
            Some(name) => find_column(headers, &[name.as_str()], ColumnRole::Text)?,
            None => find_column(headers, TEXT_COLUMN_CANDIDATES, ColumnRole::Text)?,
        };
        let label_index = match &self.label {
            Some(name) => find_column(headers, &[name.as_str()], ColumnRole::Label)?,
            None => find_column(headers, LABEL_COLUMN_CANDIDATES, ColumnRole::Label)?,
        };

        if text_index == label_index {
            return Err(Error::dataset(format!(
                "text and label resolve to the same column '{}'",
                headers[text_index]
            )));
        }

        Ok(ResolvedColumns {
            text_index,
            text_name: headers[text_index].clone(),
            label_index,
            label_name: headers[label_index].clone(),
        })
    }
}

/// Index of the first candidate present in `headers`
pub fn find_column(headers: &[String], candidates: &[&str], role: ColumnRole) -> Result<usize> {
    for candidate in candidates {
        if let Some(idx) = headers.iter().position(|h| h == candidate) {
            return Ok(idx);
        }
        if let Some(idx) = headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(candidate))
        {
            return Ok(idx);
        }
    }
    Err(Error::missing_column(role, candidates))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_detects_common_export_layout() {
        let h = headers(&["category", "rating", "label", "text_"]);
        let resolved = ColumnSelection::default().resolve(&h).unwrap();
        assert_eq!(resolved.text_name, "text_");
        assert_eq!(resolved.text_index, 3);
        assert_eq!(resolved.label_name, "label");
        assert_eq!(resolved.label_index, 2);
    }

    #[test]
    fn test_candidate_order_wins_over_header_order() {
        let h = headers(&["review", "text", "class"]);
        assert_eq!(find_column(&h, TEXT_COLUMN_CANDIDATES, ColumnRole::Text).unwrap(), 1);
    }

    #[test]
    fn test_case_insensitive_fallback() {
        let h = headers(&[" Review_Text ", "Label"]);
        let resolved = ColumnSelection::default().resolve(&h).unwrap();
        assert_eq!(resolved.text_index, 0);
        assert_eq!(resolved.label_index, 1);
    }

    #[test]
    fn test_missing_column_lists_candidates() {
        let h = headers(&["text", "stars"]);
        let err = ColumnSelection::default().resolve(&h).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("label column"));
        assert!(message.contains("label, labels, class, target, is_fake"));
    }

    #[test]
    fn test_explicit_selection_overrides_detection() {
        let h = headers(&["text", "label", "comment", "verdict"]);
        let selection = ColumnSelection {
            text: Some("comment".to_string()),
            label: Some("verdict".to_string()),
        };
        let resolved = selection.resolve(&h).unwrap();
        assert_eq!(resolved.text_index, 2);
        assert_eq!(resolved.label_index, 3);
    }

    #[test]
    fn test_same_column_for_both_roles_is_error() {
        let h = headers(&["text", "label"]);
        let selection = ColumnSelection {
            text: Some("text".to_string()),
            label: Some("text".to_string()),
        };
        assert!(selection.resolve(&h).is_err());
    }
}
