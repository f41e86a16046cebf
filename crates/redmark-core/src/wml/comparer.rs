//! Entry points for WordprocessingML comparison.

use super::canonicalize::collect_units;
use super::diff::diff_units;
use super::document::{WmlDocument, WmlSource};
use super::markup::render_marked_document;
use super::settings::WmlComparerSettings;
use super::types::WmlComparisonResult;
use crate::cancel::CancelToken;
use crate::error::Result;

pub struct WmlComparer;

impl WmlComparer {
    /// Compares two documents and returns the change set (no output
    /// document).
    pub fn compare(
        older: &WmlDocument,
        newer: &WmlDocument,
        settings: Option<&WmlComparerSettings>,
    ) -> Result<WmlComparisonResult> {
        Self::run(older, newer, settings, &CancelToken::new(), false)
    }

    /// Compares two documents and renders the redlined output based on
    /// the newer one; the result's `document` holds the package bytes.
    pub fn produce_marked_document(
        older: &WmlDocument,
        newer: &WmlDocument,
        settings: Option<&WmlComparerSettings>,
    ) -> Result<WmlComparisonResult> {
        Self::run(older, newer, settings, &CancelToken::new(), true)
    }

    pub fn compare_with_cancel(
        older: &WmlDocument,
        newer: &WmlDocument,
        settings: Option<&WmlComparerSettings>,
        cancel: &CancelToken,
        render: bool,
    ) -> Result<WmlComparisonResult> {
        Self::run(older, newer, settings, cancel, render)
    }

    fn run(
        older: &WmlDocument,
        newer: &WmlDocument,
        settings: Option<&WmlComparerSettings>,
        cancel: &CancelToken,
        render: bool,
    ) -> Result<WmlComparisonResult> {
        let settings = settings.cloned().unwrap_or_default();
        settings.validate()?;

        cancel.check()?;
        settings.log("WmlComparer: canonicalizing");
        let src1 = WmlSource::load(older)?;
        let src2 = WmlSource::load(newer)?;
        let units1 = collect_units(&src1, older.package())?;
        let units2 = collect_units(&src2, newer.package())?;
        settings.log(&format!(
            "WmlComparer: {} units vs {} units",
            units1.len(),
            units2.len()
        ));

        cancel.check()?;
        settings.log("WmlComparer: aligning and diffing");
        let outcome = diff_units(&units1, &units2, &src1, &src2, &settings);

        let mut result = WmlComparisonResult {
            changes: outcome.changes,
            insertions: outcome.insertions,
            deletions: outcome.deletions,
            warnings: Vec::new(),
            document: None,
        };

        if render {
            cancel.check()?;
            settings.log("WmlComparer: rendering markup");
            let bytes = render_marked_document(newer, &src1, &src2, &outcome.edits, &settings)?;
            result.document = Some(bytes);
        }

        cancel.check()?;
        settings.log(&format!(
            "WmlComparer: {} insertions, {} deletions",
            result.insertions, result.deletions
        ));
        Ok(result)
    }
}

/// Plain text of the whole document, body first, then footnotes, then
/// endnotes; one line per paragraph or table row.
pub fn extract_all_text(document: &WmlDocument) -> Result<String> {
    let source = WmlSource::load(document)?;
    let units = collect_units(&source, document.package())?;
    Ok(units
        .iter()
        .map(|u| u.text.as_str())
        .collect::<Vec<_>>()
        .join("\n"))
}
