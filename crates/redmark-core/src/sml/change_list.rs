//! UI-facing change list with adjacent-cell grouping: consecutive rows in
//! the same sheet/column with the same change type collapse into one item
//! spanning a range. Grouping only changes presentation, never the
//! underlying change multiset.

use super::types::{SmlChange, SmlChangeType};
use crate::util::cell_ref::{column_letter, make_a1, parse_a1};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmlChangeListItem {
    pub id: String,
    pub change_type: SmlChangeType,
    pub sheet_name: Option<String>,
    /// Single address ("B2") or collapsed range ("B2:B9").
    pub cell_range: Option<String>,
    /// Number of per-cell changes this item stands for.
    pub count: usize,
    pub summary: String,
}

pub fn build_change_list(changes: &[SmlChange]) -> Vec<SmlChangeListItem> {
    let mut items = Vec::new();
    let mut next_id = 0usize;
    let mut make_id = move || {
        next_id += 1;
        format!("chg-{next_id}")
    };

    // Cell-addressed changes group; everything else passes through in
    // emission order.
    let mut groupable: Vec<(usize, &SmlChange, u32, u32)> = Vec::new();
    for (index, change) in changes.iter().enumerate() {
        let parsed = change
            .cell_address
            .as_deref()
            .and_then(parse_a1);
        match parsed {
            Some((row, column)) => groupable.push((index, change, row, column)),
            None => {
                items.push(SmlChangeListItem {
                    id: String::new(),
                    change_type: change.kind(),
                    sheet_name: change.sheet_name.clone(),
                    cell_range: change.range.clone(),
                    count: 1,
                    summary: change.describe(),
                });
            }
        }
    }

    groupable.sort_by(|a, b| {
        let ka = (a.1.sheet_name.as_deref().unwrap_or(""), a.1.kind() as u32, a.3, a.2);
        let kb = (b.1.sheet_name.as_deref().unwrap_or(""), b.1.kind() as u32, b.3, b.2);
        ka.cmp(&kb).then(a.0.cmp(&b.0))
    });

    let mut run: Vec<&(usize, &SmlChange, u32, u32)> = Vec::new();
    let mut flush = |run: &mut Vec<&(usize, &SmlChange, u32, u32)>,
                     items: &mut Vec<SmlChangeListItem>| {
        if run.is_empty() {
            return;
        }
        let first = run[0];
        let last = run[run.len() - 1];
        let range = if run.len() == 1 {
            make_a1(first.2, first.3)
        } else {
            format!("{}:{}", make_a1(first.2, first.3), make_a1(last.2, last.3))
        };
        let summary = if run.len() == 1 {
            first.1.describe()
        } else {
            format!(
                "{:?} x{} in column {} ({})",
                first.1.kind(),
                run.len(),
                column_letter(first.3),
                range
            )
        };
        items.push(SmlChangeListItem {
            id: String::new(),
            change_type: first.1.kind(),
            sheet_name: first.1.sheet_name.clone(),
            cell_range: Some(range),
            count: run.len(),
            summary,
        });
        run.clear();
    };

    for entry in &groupable {
        let extends = run.last().map(|prev| {
            prev.1.sheet_name == entry.1.sheet_name
                && prev.1.kind() == entry.1.kind()
                && prev.3 == entry.3
                && entry.2 == prev.2 + 1
        });
        if extends == Some(true) {
            run.push(entry);
        } else {
            flush(&mut run, &mut items);
            run.push(entry);
        }
    }
    flush(&mut run, &mut items);

    for item in &mut items {
        item.id = make_id();
    }
    items
}
