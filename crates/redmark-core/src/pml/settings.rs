use crate::error::{RedmarkError, Result};
use crate::util::color::is_hex_rgb;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Settings for the PresentationML comparer. Facets default on except
/// notes, transitions and shape styles.
#[derive(Clone, Serialize, Deserialize)]
pub struct PmlComparerSettings {
    pub compare_slide_structure: bool,
    pub compare_shape_structure: bool,
    pub compare_text_content: bool,
    pub compare_text_formatting: bool,
    pub compare_shape_transforms: bool,
    pub compare_image_content: bool,
    pub compare_charts: bool,
    pub compare_tables: bool,
    pub compare_notes: bool,
    pub compare_transitions: bool,
    pub compare_shape_styles: bool,

    /// Similarity-matrix slide matching after the title and fingerprint
    /// passes.
    pub use_slide_alignment_lcs: bool,
    pub enable_fuzzy_shape_matching: bool,
    pub slide_similarity_threshold: f64,
    pub shape_similarity_threshold: f64,

    /// Move/resize threshold in EMU (914400 per inch).
    pub position_tolerance: i64,

    pub author: String,
    pub add_summary_slide: bool,
    pub add_notes_annotations: bool,

    // Overlay colors (RRGGBB hex).
    pub inserted_color: String,
    pub deleted_color: String,
    pub modified_color: String,
    pub moved_color: String,
    pub formatting_color: String,

    #[serde(skip)]
    pub log_callback: Option<Arc<dyn Fn(&str) + Send + Sync>>,
}

impl Default for PmlComparerSettings {
    fn default() -> Self {
        Self {
            compare_slide_structure: true,
            compare_shape_structure: true,
            compare_text_content: true,
            compare_text_formatting: true,
            compare_shape_transforms: true,
            compare_image_content: true,
            compare_charts: true,
            compare_tables: true,
            compare_notes: false,
            compare_transitions: false,
            compare_shape_styles: false,
            use_slide_alignment_lcs: true,
            enable_fuzzy_shape_matching: true,
            slide_similarity_threshold: 0.4,
            shape_similarity_threshold: 0.7,
            position_tolerance: 91440,
            author: "redline".to_string(),
            add_summary_slide: true,
            add_notes_annotations: true,
            inserted_color: "00AA00".to_string(),
            deleted_color: "FF0000".to_string(),
            modified_color: "FFA500".to_string(),
            moved_color: "0000FF".to_string(),
            formatting_color: "9932CC".to_string(),
            log_callback: None,
        }
    }
}

impl PmlComparerSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_author(mut self, author: &str) -> Self {
        self.author = author.to_string();
        self
    }

    pub fn with_position_tolerance(mut self, tolerance: i64) -> Self {
        self.position_tolerance = tolerance;
        self
    }

    pub fn with_slide_similarity_threshold(mut self, threshold: f64) -> Self {
        self.slide_similarity_threshold = threshold;
        self
    }

    pub fn with_shape_similarity_threshold(mut self, threshold: f64) -> Self {
        self.shape_similarity_threshold = threshold;
        self
    }

    pub fn log(&self, message: &str) {
        if let Some(callback) = &self.log_callback {
            callback(message);
        }
    }

    pub fn validate(&self) -> Result<()> {
        for (label, value) in [
            ("slide_similarity_threshold", self.slide_similarity_threshold),
            ("shape_similarity_threshold", self.shape_similarity_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(RedmarkError::invalid_setting(format!(
                    "{label} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.position_tolerance < 0 {
            return Err(RedmarkError::invalid_setting(format!(
                "position_tolerance must be non-negative, got {}",
                self.position_tolerance
            )));
        }
        for (label, color) in [
            ("inserted_color", &self.inserted_color),
            ("deleted_color", &self.deleted_color),
            ("modified_color", &self.modified_color),
            ("moved_color", &self.moved_color),
            ("formatting_color", &self.formatting_color),
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_surface() {
        let settings = PmlComparerSettings::default();
        assert!(settings.compare_slide_structure);
        assert!(settings.compare_text_content);
        assert!(!settings.compare_notes);
        assert!(!settings.compare_transitions);
        assert!(!settings.compare_shape_styles);
        assert!(settings.enable_fuzzy_shape_matching);
        assert_eq!(settings.position_tolerance, 91440);
        assert!((settings.slide_similarity_threshold - 0.4).abs() < f64::EPSILON);
        assert!((settings.shape_similarity_threshold - 0.7).abs() < f64::EPSILON);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn negative_tolerance_is_rejected() {
        let settings = PmlComparerSettings::new().with_position_tolerance(-1);
        assert!(matches!(
            settings.validate(),
            Err(RedmarkError::InvalidSetting { .. })
        ));
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        let settings = PmlComparerSettings::new().with_slide_similarity_threshold(2.0);
        assert!(settings.validate().is_err());
    }
}
