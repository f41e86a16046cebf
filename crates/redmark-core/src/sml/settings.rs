use crate::error::{RedmarkError, Result};
use crate::util::color::is_hex_rgb;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Settings for the SpreadsheetML comparer. All facet switches default to
/// on; row alignment is on and can be disabled for direct per-address
/// comparison.
#[derive(Clone, Serialize, Deserialize)]
pub struct SmlComparerSettings {
    pub compare_values: bool,
    pub compare_formulas: bool,
    pub compare_formatting: bool,
    pub compare_named_ranges: bool,
    pub compare_comments: bool,
    pub compare_data_validations: bool,
    pub compare_merged_cells: bool,
    pub compare_hyperlinks: bool,
    pub compare_conditional_formatting: bool,

    /// Align rows with LCS so inserted/deleted rows don't cascade into
    /// per-cell noise.
    pub enable_row_alignment: bool,

    /// Detect renamed sheets by content hash and fuzzy row similarity.
    pub enable_sheet_rename_detection: bool,

    /// Minimum row-LCS similarity for the fuzzy rename pass.
    pub sheet_rename_similarity_threshold: f64,

    /// Author recorded on markup comments and the summary sheet.
    pub author: String,

    // Highlight fills (RRGGBB hex, no '#').
    pub added_color: String,
    pub modified_value_color: String,
    pub modified_formula_color: String,
    pub modified_format_color: String,

    #[serde(skip)]
    pub log_callback: Option<Arc<dyn Fn(&str) + Send + Sync>>,
}

impl Default for SmlComparerSettings {
    fn default() -> Self {
        Self {
            compare_values: true,
            compare_formulas: true,
            compare_formatting: true,
            compare_named_ranges: true,
            compare_comments: true,
            compare_data_validations: true,
            compare_merged_cells: true,
            compare_hyperlinks: true,
            compare_conditional_formatting: true,
            enable_row_alignment: true,
            enable_sheet_rename_detection: true,
            sheet_rename_similarity_threshold: 0.5,
            author: "redline".to_string(),
            added_color: "90EE90".to_string(),
            modified_value_color: "FFD700".to_string(),
            modified_formula_color: "87CEEB".to_string(),
            modified_format_color: "E6E6FA".to_string(),
            log_callback: None,
        }
    }
}

impl SmlComparerSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_author(mut self, author: &str) -> Self {
        self.author = author.to_string();
        self
    }

    pub fn with_row_alignment(mut self, enable: bool) -> Self {
        self.enable_row_alignment = enable;
        self
    }

    pub fn with_rename_threshold(mut self, threshold: f64) -> Self {
        self.sheet_rename_similarity_threshold = threshold;
        self
    }

    pub fn with_formatting(mut self, compare: bool) -> Self {
        self.compare_formatting = compare;
        self
    }

    pub fn log(&self, message: &str) {
        if let Some(callback) = &self.log_callback {
            callback(message);
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.sheet_rename_similarity_threshold) {
            return Err(RedmarkError::invalid_setting(format!(
                "sheet_rename_similarity_threshold must be within [0, 1], got {}",
                self.sheet_rename_similarity_threshold
            )));
        }
        for (label, color) in [
            ("added_color", &self.added_color),
            ("modified_value_color", &self.modified_value_color),
            ("modified_formula_color", &self.modified_formula_color),
            ("modified_format_color", &self.modified_format_color),
        ] {
            if !is_hex_rgb(color) {
                return Err(RedmarkError::invalid_setting(format!(
                    "{label} must be 6-digit hex, got '{color}'"
                )));
            }
        }
        Ok(())
    }
}
