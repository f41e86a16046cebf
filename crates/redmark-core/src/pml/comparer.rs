//! Entry points for PresentationML comparison.

use super::canonicalize::PmlCanonicalizer;
use super::diff::compute_diff;
use super::document::PmlDocument;
use super::markup::render_marked_presentation;
use super::settings::PmlComparerSettings;
use super::types::PmlComparisonResult;
use crate::cancel::CancelToken;
use crate::error::Result;

pub struct PmlComparer;

impl PmlComparer {
    /// Compares two presentations and returns the structured change
    /// report.
    pub fn compare(
        older: &PmlDocument,
        newer: &PmlDocument,
        settings: Option<&PmlComparerSettings>,
    ) -> Result<PmlComparisonResult> {
        Self::compare_with_cancel(older, newer, settings, &CancelToken::new())
    }

    pub fn compare_with_cancel(
        older: &PmlDocument,
        newer: &PmlDocument,
        settings: Option<&PmlComparerSettings>,
        cancel: &CancelToken,
    ) -> Result<PmlComparisonResult> {
        let settings = settings.cloned().unwrap_or_default();
        settings.validate()?;

        cancel.check()?;
        settings.log("PmlComparer: canonicalizing");
        let mut warnings = Vec::new();
        let sig1 = PmlCanonicalizer::canonicalize(older, &settings, cancel, &mut warnings)?;
        let sig2 = PmlCanonicalizer::canonicalize(newer, &settings, cancel, &mut warnings)?;
        settings.log(&format!(
            "PmlComparer: {} slides vs {} slides",
            sig1.slides.len(),
            sig2.slides.len()
        ));

        cancel.check()?;
        settings.log("PmlComparer: matching and diffing");
        let changes = compute_diff(&sig1, &sig2, &settings, cancel)?;

        settings.log(&format!("PmlComparer: {} changes", changes.len()));
        Ok(PmlComparisonResult { changes, warnings })
    }

    /// Produces a marked presentation based on the newer input with
    /// overlays, notes annotations and a summary slide.
    pub fn produce_marked_presentation(
        older: &PmlDocument,
        newer: &PmlDocument,
        settings: Option<&PmlComparerSettings>,
    ) -> Result<PmlDocument> {
        let (document, _) = Self::compare_and_render(older, newer, settings)?;
        Ok(document)
    }

    /// Compares and renders in one pass, returning both artifacts.
    pub fn compare_and_render(
        older: &PmlDocument,
        newer: &PmlDocument,
        settings: Option<&PmlComparerSettings>,
    ) -> Result<(PmlDocument, PmlComparisonResult)> {
        let resolved = settings.cloned().unwrap_or_default();
        resolved.validate()?;
        let cancel = CancelToken::new();

        let mut warnings = Vec::new();
        let sig1 = PmlCanonicalizer::canonicalize(older, &resolved, &cancel, &mut warnings)?;
        let sig2 = PmlCanonicalizer::canonicalize(newer, &resolved, &cancel, &mut warnings)?;
        let changes = compute_diff(&sig1, &sig2, &resolved, &cancel)?;
        let result = PmlComparisonResult { changes, warnings };

        resolved.log("PmlComparer: rendering marked presentation");
        let marked = render_marked_presentation(newer, &sig2, &result.changes, &resolved)?;
        Ok((marked, result))
    }
}
