//! Workbook diff engine: three-pass sheet matching (name, content hash,
//! fuzzy row similarity), row-LCS alignment within matched sheets, and
//! per-cell comparison policy.

use super::settings::SmlComparerSettings;
use super::signatures::{CellSignature, WorkbookSignature, WorksheetSignature};
use super::types::{SmlChange, SmlChangeType};
use crate::cancel::CancelToken;
use crate::error::Result;
use crate::lcs::{correlate, equal_length, LcsOptions, SegmentKind};
use crate::util::cell_ref::make_a1;
use std::collections::BTreeSet;

struct SheetPair<'a> {
    left: &'a WorksheetSignature,
    right: &'a WorksheetSignature,
    renamed: bool,
}

pub fn compute_diff(
    sig1: &WorkbookSignature,
    sig2: &WorkbookSignature,
    settings: &SmlComparerSettings,
    cancel: &CancelToken,
) -> Result<Vec<SmlChange>> {
    let mut changes = Vec::new();

    let (pairs, deleted, added) = match_sheets(sig1, sig2, settings);

    // Workbook-order walk of the newer side keeps output ordering stable.
    for sheet2 in &sig2.sheets {
        cancel.check()?;
        if let Some(pair) = pairs.iter().find(|p| p.right.name == sheet2.name) {
            if pair.renamed {
                let mut change = SmlChange::of(SmlChangeType::SheetRenamed);
                change.sheet_name = Some(pair.right.name.clone());
                change.old_sheet_name = Some(pair.left.name.clone());
                changes.push(change);
            }
            diff_worksheet(pair.left, pair.right, settings, &mut changes);
        } else if added.contains(&sheet2.name) {
            let mut change = SmlChange::of(SmlChangeType::SheetAdded);
            change.sheet_name = Some(sheet2.name.clone());
            changes.push(change);
        }
    }

    for name in deleted {
        let mut change = SmlChange::of(SmlChangeType::SheetDeleted);
        change.sheet_name = Some(name);
        changes.push(change);
    }

    if settings.compare_named_ranges {
        diff_defined_names(sig1, sig2, &mut changes);
    }

    Ok(changes)
}

fn match_sheets<'a>(
    sig1: &'a WorkbookSignature,
    sig2: &'a WorkbookSignature,
    settings: &SmlComparerSettings,
) -> (Vec<SheetPair<'a>>, Vec<String>, BTreeSet<String>) {
    let mut used_left = vec![false; sig1.sheets.len()];
    let mut used_right = vec![false; sig2.sheets.len()];
    let mut pairs = Vec::new();

    // Pass 1: exact name match.
    for (ri, right) in sig2.sheets.iter().enumerate() {
        if let Some(li) = sig1.sheets.iter().position(|left| left.name == right.name) {
            if !used_left[li] {
                used_left[li] = true;
                used_right[ri] = true;
                pairs.push(SheetPair {
                    left: &sig1.sheets[li],
                    right,
                    renamed: false,
                });
            }
        }
    }

    // Pass 2: identical content hash catches straight renames.
    for (ri, right) in sig2.sheets.iter().enumerate() {
        if used_right[ri] {
            continue;
        }
        let right_hash = right.content_hash();
        if let Some(li) = (0..sig1.sheets.len())
            .find(|&li| !used_left[li] && sig1.sheets[li].content_hash() == right_hash)
        {
            used_left[li] = true;
            used_right[ri] = true;
            pairs.push(SheetPair {
                left: &sig1.sheets[li],
                right,
                renamed: true,
            });
        }
    }

    // Pass 3: fuzzy rename by row-LCS similarity.
    if settings.enable_sheet_rename_detection {
        for li in 0..sig1.sheets.len() {
            if used_left[li] {
                continue;
            }
            let mut best: Option<(usize, f64)> = None;
            for (ri, right) in sig2.sheets.iter().enumerate() {
                if used_right[ri] {
                    continue;
                }
                let score = row_similarity(&sig1.sheets[li], right);
                if score >= settings.sheet_rename_similarity_threshold
                    && best.map(|(_, b)| score > b).unwrap_or(true)
                {
                    best = Some((ri, score));
                }
            }
            if let Some((ri, _)) = best {
                used_left[li] = true;
                used_right[ri] = true;
                pairs.push(SheetPair {
                    left: &sig1.sheets[li],
                    right: &sig2.sheets[ri],
                    renamed: true,
                });
            }
        }
    }

    let deleted: Vec<String> = sig1
        .sheets
        .iter()
        .enumerate()
        .filter(|(li, _)| !used_left[*li])
        .map(|(_, s)| s.name.clone())
        .collect();
    let added: BTreeSet<String> = sig2
        .sheets
        .iter()
        .enumerate()
        .filter(|(ri, _)| !used_right[*ri])
        .map(|(_, s)| s.name.clone())
        .collect();

    (pairs, deleted, added)
}

/// Row-LCS similarity of two sheets in [0, 1].
fn row_similarity(left: &WorksheetSignature, right: &WorksheetSignature) -> f64 {
    let rows1 = left.row_keys();
    let rows2 = right.row_keys();
    if rows1.is_empty() && rows2.is_empty() {
        return 1.0;
    }
    if rows1.is_empty() || rows2.is_empty() {
        return 0.0;
    }
    let segments = correlate(&rows1, &rows2, &LcsOptions::new());
    2.0 * equal_length(&segments) as f64 / (rows1.len() + rows2.len()) as f64
}

fn diff_worksheet(
    left: &WorksheetSignature,
    right: &WorksheetSignature,
    settings: &SmlComparerSettings,
    changes: &mut Vec<SmlChange>,
) {
    let sheet_name = &right.name;

    if settings.enable_row_alignment {
        diff_rows_aligned(left, right, sheet_name, settings, changes);
    } else {
        let addresses: BTreeSet<&String> =
            left.cells.keys().chain(right.cells.keys()).collect();
        for address in addresses {
            compare_cell(
                left.cells.get(address.as_str()),
                right.cells.get(address.as_str()),
                address,
                sheet_name,
                settings,
                changes,
            );
        }
    }

    if settings.compare_comments {
        diff_comments(left, right, sheet_name, changes);
    }
    if settings.compare_data_validations {
        diff_data_validations(left, right, sheet_name, changes);
    }
    if settings.compare_merged_cells {
        for range in left.merged_ranges.difference(&right.merged_ranges) {
            let mut change = SmlChange::of(SmlChangeType::MergedRangeDeleted);
            change.sheet_name = Some(sheet_name.clone());
            change.range = Some(range.clone());
            changes.push(change);
        }
        for range in right.merged_ranges.difference(&left.merged_ranges) {
            let mut change = SmlChange::of(SmlChangeType::MergedRangeAdded);
            change.sheet_name = Some(sheet_name.clone());
            change.range = Some(range.clone());
            changes.push(change);
        }
    }
    if settings.compare_hyperlinks {
        diff_hyperlinks(left, right, sheet_name, changes);
    }
    if settings.compare_conditional_formatting {
        diff_conditional_formats(left, right, sheet_name, changes);
    }
}

fn diff_rows_aligned(
    left: &WorksheetSignature,
    right: &WorksheetSignature,
    sheet_name: &str,
    settings: &SmlComparerSettings,
    changes: &mut Vec<SmlChange>,
) {
    let rows1 = left.row_keys();
    let rows2 = right.row_keys();
    let segments = correlate(&rows1, &rows2, &LcsOptions::new());

    let mut i = 0;
    while i < segments.len() {
        match segments[i].kind {
            SegmentKind::Equal => {
                for (r1, r2) in segments[i].left.iter().zip(&segments[i].right) {
                    compare_row_cells(left, r1.row, right, r2.row, sheet_name, settings, changes);
                }
            }
            SegmentKind::Deleted => {
                // A deletion followed directly by an insertion is a run of
                // modified rows: pair positionally, compare cell-by-cell.
                if i + 1 < segments.len() && segments[i + 1].kind == SegmentKind::Inserted {
                    let dels = &segments[i].left;
                    let inss = &segments[i + 1].right;
                    let paired = dels.len().min(inss.len());
                    for k in 0..paired {
                        compare_row_cells(
                            left,
                            dels[k].row,
                            right,
                            inss[k].row,
                            sheet_name,
                            settings,
                            changes,
                        );
                    }
                    for key in &dels[paired..] {
                        push_row_change(SmlChangeType::RowDeleted, key.row, sheet_name, changes);
                    }
                    for key in &inss[paired..] {
                        push_row_change(SmlChangeType::RowInserted, key.row, sheet_name, changes);
                    }
                    i += 2;
                    continue;
                }
                for key in &segments[i].left {
                    push_row_change(SmlChangeType::RowDeleted, key.row, sheet_name, changes);
                }
            }
            SegmentKind::Inserted => {
                for key in &segments[i].right {
                    push_row_change(SmlChangeType::RowInserted, key.row, sheet_name, changes);
                }
            }
        }
        i += 1;
    }
}

fn push_row_change(
    kind: SmlChangeType,
    row: u32,
    sheet_name: &str,
    changes: &mut Vec<SmlChange>,
) {
    let mut change = SmlChange::of(kind);
    change.sheet_name = Some(sheet_name.to_string());
    change.row_index = Some(row);
    changes.push(change);
}

#[allow(clippy::too_many_arguments)]
fn compare_row_cells(
    left: &WorksheetSignature,
    row1: u32,
    right: &WorksheetSignature,
    row2: u32,
    sheet_name: &str,
    settings: &SmlComparerSettings,
    changes: &mut Vec<SmlChange>,
) {
    let cells1 = left.cells_in_row(row1);
    let cells2 = right.cells_in_row(row2);
    let columns: BTreeSet<u32> = cells1
        .iter()
        .map(|c| c.column)
        .chain(cells2.iter().map(|c| c.column))
        .collect();

    for column in columns {
        let c1 = cells1.iter().find(|c| c.column == column).copied();
        let c2 = cells2.iter().find(|c| c.column == column).copied();
        let address = c2
            .map(|c| c.address.clone())
            .unwrap_or_else(|| make_a1(row2, column));
        compare_cell(c1, c2, &address, sheet_name, settings, changes);
    }
}

fn compare_cell(
    c1: Option<&CellSignature>,
    c2: Option<&CellSignature>,
    address: &str,
    sheet_name: &str,
    settings: &SmlComparerSettings,
    changes: &mut Vec<SmlChange>,
) {
    match (c1, c2) {
        (Some(c1), Some(c2)) => {
            if c1.content_hash == c2.content_hash {
                // Content identical; formatting may still differ since
                // style state is outside the content hash.
                if settings.compare_formatting && c1.format != c2.format {
                    let mut change = SmlChange::of(SmlChangeType::FormatChanged);
                    change.sheet_name = Some(sheet_name.to_string());
                    change.cell_address = Some(address.to_string());
                    change.row_index = Some(c2.row);
                    change.column_index = Some(c2.column);
                    change.old_format = Some(c1.format.clone());
                    change.new_format = Some(c2.format.clone());
                    changes.push(change);
                }
                return;
            }

            if settings.compare_values && c1.value != c2.value {
                let mut change = SmlChange::of(SmlChangeType::ValueChanged);
                change.sheet_name = Some(sheet_name.to_string());
                change.cell_address = Some(address.to_string());
                change.row_index = Some(c2.row);
                change.column_index = Some(c2.column);
                change.old_value = c1.value.clone();
                change.new_value = c2.value.clone();
                changes.push(change);
            }
            if settings.compare_formulas && c1.formula != c2.formula {
                let mut change = SmlChange::of(SmlChangeType::FormulaChanged);
                change.sheet_name = Some(sheet_name.to_string());
                change.cell_address = Some(address.to_string());
                change.row_index = Some(c2.row);
                change.column_index = Some(c2.column);
                change.old_formula = c1.formula.clone();
                change.new_formula = c2.formula.clone();
                changes.push(change);
            }
            if settings.compare_formatting && c1.format != c2.format {
                let mut change = SmlChange::of(SmlChangeType::FormatChanged);
                change.sheet_name = Some(sheet_name.to_string());
                change.cell_address = Some(address.to_string());
                change.row_index = Some(c2.row);
                change.column_index = Some(c2.column);
                change.old_format = Some(c1.format.clone());
                change.new_format = Some(c2.format.clone());
                changes.push(change);
            }
        }
        (Some(c1), None) => {
            if !c1.is_empty() {
                let mut change = SmlChange::of(SmlChangeType::CellDeleted);
                change.sheet_name = Some(sheet_name.to_string());
                change.cell_address = Some(address.to_string());
                change.row_index = Some(c1.row);
                change.column_index = Some(c1.column);
                change.old_value = c1.value.clone();
                change.old_formula = c1.formula.clone();
                changes.push(change);
            }
        }
        (None, Some(c2)) => {
            if !c2.is_empty() {
                let mut change = SmlChange::of(SmlChangeType::CellAdded);
                change.sheet_name = Some(sheet_name.to_string());
                change.cell_address = Some(address.to_string());
                change.row_index = Some(c2.row);
                change.column_index = Some(c2.column);
                change.new_value = c2.value.clone();
                change.new_formula = c2.formula.clone();
                changes.push(change);
            }
        }
        (None, None) => {}
    }
}

fn diff_defined_names(
    sig1: &WorkbookSignature,
    sig2: &WorkbookSignature,
    changes: &mut Vec<SmlChange>,
) {
    let names: BTreeSet<&String> = sig1
        .defined_names
        .keys()
        .chain(sig2.defined_names.keys())
        .collect();
    for name in names {
        match (sig1.defined_names.get(name), sig2.defined_names.get(name)) {
            (Some(old), Some(new)) if old != new => {
                let mut change = SmlChange::of(SmlChangeType::NamedRangeChanged);
                change.name = Some(name.to_string());
                change.old_detail = Some(old.clone());
                change.new_detail = Some(new.clone());
                changes.push(change);
            }
            (Some(old), None) => {
                let mut change = SmlChange::of(SmlChangeType::NamedRangeDeleted);
                change.name = Some(name.to_string());
                change.old_detail = Some(old.clone());
                changes.push(change);
            }
            (None, Some(new)) => {
                let mut change = SmlChange::of(SmlChangeType::NamedRangeAdded);
                change.name = Some(name.to_string());
                change.new_detail = Some(new.clone());
                changes.push(change);
            }
            _ => {}
        }
    }
}

fn diff_comments(
    left: &WorksheetSignature,
    right: &WorksheetSignature,
    sheet_name: &str,
    changes: &mut Vec<SmlChange>,
) {
    let addresses: BTreeSet<&String> =
        left.comments.keys().chain(right.comments.keys()).collect();
    for address in addresses {
        match (left.comments.get(address.as_str()), right.comments.get(address.as_str())) {
            (Some(old), Some(new)) => {
                if old.text != new.text || old.author != new.author {
                    let mut change = SmlChange::of(SmlChangeType::CommentChanged);
                    change.sheet_name = Some(sheet_name.to_string());
                    change.cell_address = Some(address.to_string());
                    change.author = Some(new.author.clone());
                    change.old_detail = Some(old.text.clone());
                    change.new_detail = Some(new.text.clone());
                    changes.push(change);
                }
            }
            (Some(old), None) => {
                let mut change = SmlChange::of(SmlChangeType::CommentDeleted);
                change.sheet_name = Some(sheet_name.to_string());
                change.cell_address = Some(address.to_string());
                change.author = Some(old.author.clone());
                change.old_detail = Some(old.text.clone());
                changes.push(change);
            }
            (None, Some(new)) => {
                let mut change = SmlChange::of(SmlChangeType::CommentAdded);
                change.sheet_name = Some(sheet_name.to_string());
                change.cell_address = Some(address.to_string());
                change.author = Some(new.author.clone());
                change.new_detail = Some(new.text.clone());
                changes.push(change);
            }
            (None, None) => {}
        }
    }
}

fn diff_data_validations(
    left: &WorksheetSignature,
    right: &WorksheetSignature,
    sheet_name: &str,
    changes: &mut Vec<SmlChange>,
) {
    let left_hashes: BTreeSet<String> = left
        .data_validations
        .iter()
        .map(|v| v.content_hash())
        .collect();
    let right_hashes: BTreeSet<String> = right
        .data_validations
        .iter()
        .map(|v| v.content_hash())
        .collect();

    for validation in &left.data_validations {
        if !right_hashes.contains(&validation.content_hash()) {
            let mut change = SmlChange::of(SmlChangeType::DataValidationDeleted);
            change.sheet_name = Some(sheet_name.to_string());
            change.range = Some(validation.range.clone());
            change.old_detail = Some(validation.describe());
            changes.push(change);
        }
    }
    for validation in &right.data_validations {
        if !left_hashes.contains(&validation.content_hash()) {
            let mut change = SmlChange::of(SmlChangeType::DataValidationAdded);
            change.sheet_name = Some(sheet_name.to_string());
            change.range = Some(validation.range.clone());
            change.new_detail = Some(validation.describe());
            changes.push(change);
        }
    }
}

fn diff_hyperlinks(
    left: &WorksheetSignature,
    right: &WorksheetSignature,
    sheet_name: &str,
    changes: &mut Vec<SmlChange>,
) {
    let addresses: BTreeSet<&String> =
        left.hyperlinks.keys().chain(right.hyperlinks.keys()).collect();
    for address in addresses {
        match (
            left.hyperlinks.get(address.as_str()),
            right.hyperlinks.get(address.as_str()),
        ) {
            (Some(old), Some(new)) => {
                if old.target != new.target {
                    let mut change = SmlChange::of(SmlChangeType::HyperlinkChanged);
                    change.sheet_name = Some(sheet_name.to_string());
                    change.cell_address = Some(address.to_string());
                    change.old_detail = Some(old.target.clone());
                    change.new_detail = Some(new.target.clone());
                    changes.push(change);
                }
            }
            (Some(old), None) => {
                let mut change = SmlChange::of(SmlChangeType::HyperlinkDeleted);
                change.sheet_name = Some(sheet_name.to_string());
                change.cell_address = Some(address.to_string());
                change.old_detail = Some(old.target.clone());
                changes.push(change);
            }
            (None, Some(new)) => {
                let mut change = SmlChange::of(SmlChangeType::HyperlinkAdded);
                change.sheet_name = Some(sheet_name.to_string());
                change.cell_address = Some(address.to_string());
                change.new_detail = Some(new.target.clone());
                changes.push(change);
            }
            (None, None) => {}
        }
    }
}

fn diff_conditional_formats(
    left: &WorksheetSignature,
    right: &WorksheetSignature,
    sheet_name: &str,
    changes: &mut Vec<SmlChange>,
) {
    let ranges: BTreeSet<&String> = left
        .conditional_formats
        .iter()
        .map(|cf| &cf.range)
        .chain(right.conditional_formats.iter().map(|cf| &cf.range))
        .collect();

    for range in ranges {
        let old = left.conditional_formats.iter().find(|cf| &cf.range == range);
        let new = right
            .conditional_formats
            .iter()
            .find(|cf| &cf.range == range);
        match (old, new) {
            (Some(old), Some(new)) => {
                if old.rules_hash != new.rules_hash {
                    let mut change = SmlChange::of(SmlChangeType::ConditionalFormatChanged);
                    change.sheet_name = Some(sheet_name.to_string());
                    change.range = Some(range.to_string());
                    changes.push(change);
                }
            }
            (Some(_), None) => {
                let mut change = SmlChange::of(SmlChangeType::ConditionalFormatDeleted);
                change.sheet_name = Some(sheet_name.to_string());
                change.range = Some(range.to_string());
                changes.push(change);
            }
            (None, Some(_)) => {
                let mut change = SmlChange::of(SmlChangeType::ConditionalFormatAdded);
                change.sheet_name = Some(sheet_name.to_string());
                change.range = Some(range.to_string());
                changes.push(change);
            }
            (None, None) => {}
        }
    }
}
