//! Canonical signatures for workbook comparison: every indirection
//! (shared strings, style indices, relationship targets) is resolved
//! before diffing, so the diff engine only ever compares values and
//! hashes.

use crate::hash::sha256_hex_str;
use crate::lcs::Hashable;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Fully expanded cell formatting; style indices never escape the
/// canonicalizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellFormatSignature {
    pub number_format: Option<String>,

    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub font_name: Option<String>,
    pub font_size: Option<f64>,
    pub font_color: Option<String>,

    pub fill_pattern: Option<String>,
    pub fill_foreground: Option<String>,
    pub fill_background: Option<String>,

    pub border_left_style: Option<String>,
    pub border_left_color: Option<String>,
    pub border_right_style: Option<String>,
    pub border_right_color: Option<String>,
    pub border_top_style: Option<String>,
    pub border_top_color: Option<String>,
    pub border_bottom_style: Option<String>,
    pub border_bottom_color: Option<String>,

    pub horizontal_alignment: Option<String>,
    pub vertical_alignment: Option<String>,
    pub wrap_text: bool,
    pub indent: Option<u32>,
}

impl CellFormatSignature {
    /// The workbook-default format an unstyled cell resolves to.
    pub fn standard() -> Self {
        Self {
            number_format: Some("General".to_string()),
            bold: false,
            italic: false,
            underline: false,
            strikethrough: false,
            font_name: Some("Calibri".to_string()),
            font_size: Some(11.0),
            font_color: None,
            fill_pattern: None,
            fill_foreground: None,
            fill_background: None,
            border_left_style: None,
            border_left_color: None,
            border_right_style: None,
            border_right_color: None,
            border_top_style: None,
            border_top_color: None,
            border_bottom_style: None,
            border_bottom_color: None,
            horizontal_alignment: Some("general".to_string()),
            vertical_alignment: Some("bottom".to_string()),
            wrap_text: false,
            indent: None,
        }
    }

    /// Human-readable summary of what differs from `older`; used in
    /// markup comments and the summary sheet.
    pub fn describe_difference(&self, older: &CellFormatSignature) -> String {
        if self == older {
            return "no difference".to_string();
        }

        let mut parts = Vec::new();
        if self.number_format != older.number_format {
            parts.push(format!(
                "number format '{}' -> '{}'",
                older.number_format.as_deref().unwrap_or(""),
                self.number_format.as_deref().unwrap_or("")
            ));
        }
        if self.bold != older.bold {
            parts.push(if self.bold { "bold added" } else { "bold removed" }.to_string());
        }
        if self.italic != older.italic {
            parts.push(if self.italic { "italic added" } else { "italic removed" }.to_string());
        }
        if self.underline != older.underline {
            parts.push(
                if self.underline {
                    "underline added"
                } else {
                    "underline removed"
                }
                .to_string(),
            );
        }
        if self.font_name != older.font_name {
            parts.push(format!(
                "font '{}' -> '{}'",
                older.font_name.as_deref().unwrap_or(""),
                self.font_name.as_deref().unwrap_or("")
            ));
        }
        if self.font_size != older.font_size {
            parts.push("font size changed".to_string());
        }
        if self.font_color != older.font_color {
            parts.push("font color changed".to_string());
        }
        if self.fill_foreground != older.fill_foreground
            || self.fill_pattern != older.fill_pattern
        {
            parts.push("fill changed".to_string());
        }
        if self.horizontal_alignment != older.horizontal_alignment
            || self.vertical_alignment != older.vertical_alignment
        {
            parts.push("alignment changed".to_string());
        }
        if self.wrap_text != older.wrap_text {
            parts.push("wrap changed".to_string());
        }

        if parts.is_empty() {
            "formatting changed".to_string()
        } else {
            parts.join("; ")
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellSignature {
    pub address: String,
    pub row: u32,
    pub column: u32,
    /// Shared strings already expanded.
    pub value: Option<String>,
    pub formula: Option<String>,
    pub content_hash: String,
    pub format: CellFormatSignature,
}

impl CellSignature {
    pub fn content_hash_for(value: Option<&str>, formula: Option<&str>) -> String {
        sha256_hex_str(&format!(
            "{}|{}",
            value.unwrap_or(""),
            formula.unwrap_or("")
        ))
    }

    pub fn is_empty(&self) -> bool {
        self.value.as_deref().unwrap_or("").is_empty()
            && self.formula.as_deref().unwrap_or("").is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentSignature {
    pub address: String,
    pub author: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataValidationSignature {
    pub range: String,
    pub validation_type: String,
    pub operator: Option<String>,
    pub formula1: Option<String>,
    pub formula2: Option<String>,
}

impl DataValidationSignature {
    /// Equality hash over (range, type, operator, formula1, formula2).
    pub fn content_hash(&self) -> String {
        sha256_hex_str(&format!(
            "{}|{}|{}|{}|{}",
            self.range,
            self.validation_type,
            self.operator.as_deref().unwrap_or(""),
            self.formula1.as_deref().unwrap_or(""),
            self.formula2.as_deref().unwrap_or("")
        ))
    }

    pub fn describe(&self) -> String {
        let mut parts = vec![format!("type {}", self.validation_type)];
        if let Some(op) = &self.operator {
            parts.push(format!("operator {op}"));
        }
        if let Some(f1) = &self.formula1 {
            parts.push(format!("formula1 {f1}"));
        }
        if let Some(f2) = &self.formula2 {
            parts.push(format!("formula2 {f2}"));
        }
        parts.join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HyperlinkSignature {
    pub address: String,
    pub target: String,
    pub display: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionalFormatSignature {
    pub range: String,
    pub rules_hash: String,
}

/// One row's identity for LCS alignment: the hash of its cell content
/// hashes in column order.
#[derive(Debug, Clone)]
pub struct RowKey {
    pub row: u32,
    pub hash: String,
}

impl Hashable for RowKey {
    fn key(&self) -> &str {
        &self.hash
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorksheetSignature {
    pub name: String,
    pub part_uri: String,
    pub cells: BTreeMap<String, CellSignature>,
    pub populated_rows: BTreeSet<u32>,
    pub populated_columns: BTreeSet<u32>,
    pub row_hashes: BTreeMap<u32, String>,
    pub column_hashes: BTreeMap<u32, String>,
    pub comments: BTreeMap<String, CommentSignature>,
    pub data_validations: Vec<DataValidationSignature>,
    pub merged_ranges: BTreeSet<String>,
    pub hyperlinks: BTreeMap<String, HyperlinkSignature>,
    pub conditional_formats: Vec<ConditionalFormatSignature>,
}

impl WorksheetSignature {
    pub fn new(name: &str, part_uri: &str) -> Self {
        Self {
            name: name.to_string(),
            part_uri: part_uri.to_string(),
            ..Self::default()
        }
    }

    pub fn cells_in_row(&self, row: u32) -> Vec<&CellSignature> {
        let mut cells: Vec<&CellSignature> =
            self.cells.values().filter(|c| c.row == row).collect();
        cells.sort_by_key(|c| c.column);
        cells
    }

    /// Content hash over every cell's address and resolved value; used
    /// for rename detection.
    pub fn content_hash(&self) -> String {
        let mut cells: Vec<&CellSignature> = self.cells.values().collect();
        cells.sort_by_key(|c| (c.row, c.column));

        let mut content = String::new();
        for cell in cells {
            content.push_str(&cell.address);
            content.push(':');
            content.push_str(cell.value.as_deref().unwrap_or(""));
            content.push('|');
        }
        sha256_hex_str(&content)
    }

    /// Row keys in row order, for row-level LCS.
    pub fn row_keys(&self) -> Vec<RowKey> {
        self.populated_rows
            .iter()
            .map(|&row| RowKey {
                row,
                hash: self.row_hashes.get(&row).cloned().unwrap_or_default(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorkbookSignature {
    /// Sheets in workbook order.
    pub sheets: Vec<WorksheetSignature>,
    pub defined_names: BTreeMap<String, String>,
}

impl WorkbookSignature {
    pub fn sheet(&self, name: &str) -> Option<&WorksheetSignature> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}
