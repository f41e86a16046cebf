use serde::{Deserialize, Serialize};

/// Kinds of paragraph- and row-level changes reported by the comparer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum WmlChangeType {
    ParagraphInserted,
    ParagraphDeleted,
    ParagraphModified,
    RowInserted,
    RowDeleted,
    RowModified,
}

/// One reported change. `region` locates the containing part
/// (`body`, `footnote:<id>`, `endnote:<id>`); `insertions`/`deletions`
/// are the revision counts this change contributes under the grouping
/// policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WmlChange {
    pub change_type: WmlChangeType,
    pub region: String,
    pub old_text: Option<String>,
    pub new_text: Option<String>,
    pub insertions: usize,
    pub deletions: usize,
}

impl WmlChange {
    pub fn describe(&self) -> String {
        match self.change_type {
            WmlChangeType::ParagraphInserted => format!(
                "Paragraph inserted in {}: '{}'",
                self.region,
                preview(self.new_text.as_deref())
            ),
            WmlChangeType::ParagraphDeleted => format!(
                "Paragraph deleted from {}: '{}'",
                self.region,
                preview(self.old_text.as_deref())
            ),
            WmlChangeType::ParagraphModified => format!(
                "Paragraph modified in {}: '{}' -> '{}'",
                self.region,
                preview(self.old_text.as_deref()),
                preview(self.new_text.as_deref())
            ),
            WmlChangeType::RowInserted => format!("Table row inserted in {}", self.region),
            WmlChangeType::RowDeleted => format!("Table row deleted from {}", self.region),
            WmlChangeType::RowModified => format!("Table row modified in {}", self.region),
        }
    }
}

fn preview(text: Option<&str>) -> String {
    let text = text.unwrap_or("");
    if text.chars().count() <= 60 {
        return text.to_string();
    }
    let prefix: String = text.chars().take(57).collect();
    format!("{prefix}...")
}

/// Outcome of one WML comparison.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WmlComparisonResult {
    pub changes: Vec<WmlChange>,
    pub insertions: usize,
    pub deletions: usize,
    pub warnings: Vec<String>,
    /// Redlined output package; present when markup rendering was
    /// requested.
    #[serde(skip)]
    pub document: Option<Vec<u8>>,
}

impl WmlComparisonResult {
    pub fn revision_count(&self) -> usize {
        self.insertions + self.deletions
    }

    pub fn is_identical(&self) -> bool {
        self.changes.is_empty()
    }
}
