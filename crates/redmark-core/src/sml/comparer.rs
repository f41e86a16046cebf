//! Entry points for SpreadsheetML comparison.

use super::canonicalize::SmlCanonicalizer;
use super::diff::compute_diff;
use super::document::SmlDocument;
use super::markup::render_marked_workbook;
use super::settings::SmlComparerSettings;
use super::types::SmlComparisonResult;
use crate::cancel::CancelToken;
use crate::error::Result;

pub struct SmlComparer;

impl SmlComparer {
    /// Compares two workbooks and returns the structured change report.
    pub fn compare(
        older: &SmlDocument,
        newer: &SmlDocument,
        settings: Option<&SmlComparerSettings>,
    ) -> Result<SmlComparisonResult> {
        Self::compare_with_cancel(older, newer, settings, &CancelToken::new())
    }

    pub fn compare_with_cancel(
        older: &SmlDocument,
        newer: &SmlDocument,
        settings: Option<&SmlComparerSettings>,
        cancel: &CancelToken,
    ) -> Result<SmlComparisonResult> {
        let settings = settings.cloned().unwrap_or_default();
        settings.validate()?;

        cancel.check()?;
        settings.log("SmlComparer: canonicalizing");
        let mut warnings = Vec::new();
        let sig1 = SmlCanonicalizer::canonicalize(older, &settings, cancel, &mut warnings)?;
        let sig2 = SmlCanonicalizer::canonicalize(newer, &settings, cancel, &mut warnings)?;
        settings.log(&format!(
            "SmlComparer: {} sheets vs {} sheets",
            sig1.sheets.len(),
            sig2.sheets.len()
        ));

        cancel.check()?;
        settings.log("SmlComparer: matching and diffing");
        let changes = compute_diff(&sig1, &sig2, &settings, cancel)?;

        settings.log(&format!("SmlComparer: {} changes", changes.len()));
        Ok(SmlComparisonResult { changes, warnings })
    }

    /// Produces a marked workbook based on the newer input with highlight
    /// fills, comments and a `_DiffSummary` sheet.
    pub fn produce_marked_workbook(
        older: &SmlDocument,
        newer: &SmlDocument,
        settings: Option<&SmlComparerSettings>,
    ) -> Result<SmlDocument> {
        let (document, _) = Self::compare_and_render(older, newer, settings)?;
        Ok(document)
    }

    /// Compares and renders in one pass, returning both artifacts.
    pub fn compare_and_render(
        older: &SmlDocument,
        newer: &SmlDocument,
        settings: Option<&SmlComparerSettings>,
    ) -> Result<(SmlDocument, SmlComparisonResult)> {
        let resolved = settings.cloned().unwrap_or_default();
        resolved.validate()?;
        let result = Self::compare(older, newer, Some(&resolved))?;
        resolved.log("SmlComparer: rendering marked workbook");
        let marked = render_marked_workbook(newer, &result.changes, &resolved)?;
        Ok((marked, result))
    }
}
