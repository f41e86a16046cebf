use super::signatures::CellFormatSignature;
use serde::{Deserialize, Serialize};

/// Kinds of changes detected during workbook comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum SmlChangeType {
    SheetAdded,
    SheetDeleted,
    SheetRenamed,

    RowInserted,
    RowDeleted,

    CellAdded,
    CellDeleted,
    ValueChanged,
    FormulaChanged,
    FormatChanged,

    NamedRangeAdded,
    NamedRangeDeleted,
    NamedRangeChanged,

    CommentAdded,
    CommentDeleted,
    CommentChanged,

    DataValidationAdded,
    DataValidationDeleted,

    MergedRangeAdded,
    MergedRangeDeleted,

    ConditionalFormatAdded,
    ConditionalFormatDeleted,
    ConditionalFormatChanged,

    HyperlinkAdded,
    HyperlinkDeleted,
    HyperlinkChanged,
}

/// A single detected change; only the fields relevant to the change type
/// are populated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmlChange {
    pub change_type: Option<SmlChangeType>,
    pub sheet_name: Option<String>,
    pub cell_address: Option<String>,
    pub row_index: Option<u32>,
    pub column_index: Option<u32>,
    pub old_sheet_name: Option<String>,

    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub old_formula: Option<String>,
    pub new_formula: Option<String>,
    pub old_format: Option<CellFormatSignature>,
    pub new_format: Option<CellFormatSignature>,

    pub name: Option<String>,
    pub range: Option<String>,
    pub author: Option<String>,
    pub old_detail: Option<String>,
    pub new_detail: Option<String>,
}

impl SmlChange {
    pub fn of(change_type: SmlChangeType) -> Self {
        Self {
            change_type: Some(change_type),
            ..Self::default()
        }
    }

    pub fn kind(&self) -> SmlChangeType {
        self.change_type.unwrap_or(SmlChangeType::ValueChanged)
    }

    pub fn describe(&self) -> String {
        let sheet = self.sheet_name.as_deref().unwrap_or("");
        let address = self.cell_address.as_deref().unwrap_or("");
        match self.kind() {
            SmlChangeType::SheetAdded => format!("Sheet '{sheet}' was added"),
            SmlChangeType::SheetDeleted => format!("Sheet '{sheet}' was deleted"),
            SmlChangeType::SheetRenamed => format!(
                "Sheet '{}' was renamed to '{sheet}'",
                self.old_sheet_name.as_deref().unwrap_or("")
            ),
            SmlChangeType::RowInserted => format!(
                "Row {} was inserted in '{sheet}'",
                self.row_index.unwrap_or(0)
            ),
            SmlChangeType::RowDeleted => format!(
                "Row {} was deleted from '{sheet}'",
                self.row_index.unwrap_or(0)
            ),
            SmlChangeType::CellAdded => format!(
                "Cell {sheet}!{address} was added with '{}'",
                self.new_value.as_deref().unwrap_or("")
            ),
            SmlChangeType::CellDeleted => format!(
                "Cell {sheet}!{address} was deleted (had '{}')",
                self.old_value.as_deref().unwrap_or("")
            ),
            SmlChangeType::ValueChanged => format!(
                "Cell {sheet}!{address} changed from '{}' to '{}'",
                self.old_value.as_deref().unwrap_or(""),
                self.new_value.as_deref().unwrap_or("")
            ),
            SmlChangeType::FormulaChanged => format!(
                "Cell {sheet}!{address} formula changed from '{}' to '{}'",
                self.old_formula.as_deref().unwrap_or(""),
                self.new_formula.as_deref().unwrap_or("")
            ),
            SmlChangeType::FormatChanged => {
                format!("Cell {sheet}!{address} formatting changed")
            }
            SmlChangeType::NamedRangeAdded => format!(
                "Named range '{}' was added",
                self.name.as_deref().unwrap_or("")
            ),
            SmlChangeType::NamedRangeDeleted => format!(
                "Named range '{}' was deleted",
                self.name.as_deref().unwrap_or("")
            ),
            SmlChangeType::NamedRangeChanged => format!(
                "Named range '{}' changed from '{}' to '{}'",
                self.name.as_deref().unwrap_or(""),
                self.old_detail.as_deref().unwrap_or(""),
                self.new_detail.as_deref().unwrap_or("")
            ),
            SmlChangeType::CommentAdded => format!("Comment added at {sheet}!{address}"),
            SmlChangeType::CommentDeleted => format!("Comment deleted from {sheet}!{address}"),
            SmlChangeType::CommentChanged => format!("Comment changed at {sheet}!{address}"),
            SmlChangeType::DataValidationAdded => format!(
                "Data validation added on {} in '{sheet}'",
                self.range.as_deref().unwrap_or("")
            ),
            SmlChangeType::DataValidationDeleted => format!(
                "Data validation removed from {} in '{sheet}'",
                self.range.as_deref().unwrap_or("")
            ),
            SmlChangeType::MergedRangeAdded => format!(
                "Merged range {} added in '{sheet}'",
                self.range.as_deref().unwrap_or("")
            ),
            SmlChangeType::MergedRangeDeleted => format!(
                "Merged range {} removed from '{sheet}'",
                self.range.as_deref().unwrap_or("")
            ),
            SmlChangeType::ConditionalFormatAdded => format!(
                "Conditional formatting added on {} in '{sheet}'",
                self.range.as_deref().unwrap_or("")
            ),
            SmlChangeType::ConditionalFormatDeleted => format!(
                "Conditional formatting removed from {} in '{sheet}'",
                self.range.as_deref().unwrap_or("")
            ),
            SmlChangeType::ConditionalFormatChanged => format!(
                "Conditional formatting changed on {} in '{sheet}'",
                self.range.as_deref().unwrap_or("")
            ),
            SmlChangeType::HyperlinkAdded => format!("Hyperlink added at {sheet}!{address}"),
            SmlChangeType::HyperlinkDeleted => {
                format!("Hyperlink removed from {sheet}!{address}")
            }
            SmlChangeType::HyperlinkChanged => format!(
                "Hyperlink at {sheet}!{address} changed from '{}' to '{}'",
                self.old_detail.as_deref().unwrap_or(""),
                self.new_detail.as_deref().unwrap_or("")
            ),
        }
    }
}

/// Outcome of one workbook comparison.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmlComparisonResult {
    pub changes: Vec<SmlChange>,
    pub warnings: Vec<String>,
}

impl SmlComparisonResult {
    pub fn total_changes(&self) -> usize {
        self.changes.len()
    }

    fn count(&self, kind: SmlChangeType) -> usize {
        self.changes.iter().filter(|c| c.kind() == kind).count()
    }

    pub fn value_changes(&self) -> usize {
        self.count(SmlChangeType::ValueChanged)
    }

    pub fn formula_changes(&self) -> usize {
        self.count(SmlChangeType::FormulaChanged)
    }

    pub fn format_changes(&self) -> usize {
        self.count(SmlChangeType::FormatChanged)
    }

    pub fn cells_added(&self) -> usize {
        self.count(SmlChangeType::CellAdded)
    }

    pub fn cells_deleted(&self) -> usize {
        self.count(SmlChangeType::CellDeleted)
    }

    pub fn is_identical(&self) -> bool {
        self.changes.is_empty()
    }
}


impl From<SmlChangeType> for SmlChange {
    fn from(change_type: SmlChangeType) -> Self {
        SmlChange::of(change_type)
    }
}
