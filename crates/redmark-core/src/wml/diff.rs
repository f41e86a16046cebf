//! Paragraph/row alignment and word-level diffing.
//!
//! Unit alignment runs LCS over content hashes; a `Deleted` segment
//! immediately followed by an `Inserted` segment is treated as a
//! modification and paired item-by-item (positionally when lengths agree,
//! otherwise by word-overlap similarity). Matched paragraphs descend to
//! word-level LCS.

use super::canonicalize::{cell_texts, ComparisonUnit};
use super::document::{Region, WmlSource};
use super::settings::WmlComparerSettings;
use super::tokenize::{tokenize, Token};
use super::types::{WmlChange, WmlChangeType};
use crate::hash::sha1_hex_str;
use crate::lcs::{correlate, LcsOptions, Segment, SegmentKind};
use crate::util::text::word_jaccard;
use indextree::NodeId;

/// Similarity floor for pairing a deleted paragraph with an inserted one.
const MODIFICATION_SIMILARITY: f64 = 0.2;

/// Below this word-overlap similarity, a modified paragraph counts as one
/// whole-paragraph replacement (one deletion + one insertion).
const REPLACEMENT_SIMILARITY: f64 = 0.4;

/// Ordered edit script consumed by the markup renderer.
pub enum ParaEdit {
    Unchanged {
        region: Region,
        node2: NodeId,
    },
    InsertedPara {
        region: Region,
        node2: NodeId,
    },
    DeletedPara {
        region: Region,
        node1: NodeId,
    },
    ModifiedPara {
        region: Region,
        node1: NodeId,
        node2: NodeId,
        segments: Vec<Segment<Token>>,
    },
    UnchangedRow {
        region: Region,
        node2: NodeId,
    },
    InsertedRow {
        region: Region,
        node2: NodeId,
    },
    DeletedRow {
        region: Region,
        node1: NodeId,
    },
    ModifiedRow {
        region: Region,
        node1: NodeId,
        node2: NodeId,
    },
}

impl ParaEdit {
    pub fn is_row_edit(&self) -> bool {
        matches!(
            self,
            ParaEdit::UnchangedRow { .. }
                | ParaEdit::InsertedRow { .. }
                | ParaEdit::DeletedRow { .. }
                | ParaEdit::ModifiedRow { .. }
        )
    }

    pub fn region(&self) -> &Region {
        match self {
            ParaEdit::Unchanged { region, .. }
            | ParaEdit::InsertedPara { region, .. }
            | ParaEdit::DeletedPara { region, .. }
            | ParaEdit::ModifiedPara { region, .. }
            | ParaEdit::UnchangedRow { region, .. }
            | ParaEdit::InsertedRow { region, .. }
            | ParaEdit::DeletedRow { region, .. }
            | ParaEdit::ModifiedRow { region, .. } => region,
        }
    }
}

#[derive(Default)]
pub struct WmlDiffOutcome {
    pub edits: Vec<ParaEdit>,
    pub changes: Vec<WmlChange>,
    pub insertions: usize,
    pub deletions: usize,
}

pub fn diff_units(
    units1: &[ComparisonUnit],
    units2: &[ComparisonUnit],
    src1: &WmlSource,
    src2: &WmlSource,
    settings: &WmlComparerSettings,
) -> WmlDiffOutcome {
    let empty_para = sha1_hex_str("");
    let empty_row = sha1_hex_str("TR:");
    let options = LcsOptions::new()
        .detail_threshold(settings.detail_threshold)
        .skip_as_anchor(move |key| key == empty_para || key == empty_row);

    let segments = correlate(units1, units2, &options);

    let mut out = WmlDiffOutcome::default();
    let mut i = 0;
    while i < segments.len() {
        match segments[i].kind {
            SegmentKind::Equal => {
                for unit in &segments[i].right {
                    out.edits.push(if unit.is_row() {
                        ParaEdit::UnchangedRow {
                            region: unit.region.clone(),
                            node2: unit.node,
                        }
                    } else {
                        ParaEdit::Unchanged {
                            region: unit.region.clone(),
                            node2: unit.node,
                        }
                    });
                }
            }
            SegmentKind::Deleted => {
                if i + 1 < segments.len() && segments[i + 1].kind == SegmentKind::Inserted {
                    handle_replacement(
                        &segments[i].left,
                        &segments[i + 1].right,
                        src1,
                        src2,
                        &mut out,
                    );
                    i += 2;
                    continue;
                }
                handle_pure_deletion(&segments[i].left, &mut out);
            }
            SegmentKind::Inserted => {
                handle_pure_insertion(&segments[i].right, &mut out);
            }
        }
        i += 1;
    }

    out
}

/// A contiguous block of deleted units counts as one deletion revision.
fn handle_pure_deletion(units: &[ComparisonUnit], out: &mut WmlDiffOutcome) {
    for (idx, unit) in units.iter().enumerate() {
        let counted = usize::from(idx == 0);
        if unit.is_row() {
            out.edits.push(ParaEdit::DeletedRow {
                region: unit.region.clone(),
                node1: unit.node,
            });
            out.changes.push(WmlChange {
                change_type: WmlChangeType::RowDeleted,
                region: unit.region.label(),
                old_text: Some(unit.text.clone()),
                new_text: None,
                insertions: 0,
                deletions: counted,
            });
        } else {
            out.edits.push(ParaEdit::DeletedPara {
                region: unit.region.clone(),
                node1: unit.node,
            });
            out.changes.push(WmlChange {
                change_type: WmlChangeType::ParagraphDeleted,
                region: unit.region.label(),
                old_text: Some(unit.text.clone()),
                new_text: None,
                insertions: 0,
                deletions: counted,
            });
        }
    }
    if !units.is_empty() {
        out.deletions += 1;
    }
}

fn handle_pure_insertion(units: &[ComparisonUnit], out: &mut WmlDiffOutcome) {
    for (idx, unit) in units.iter().enumerate() {
        let counted = usize::from(idx == 0);
        if unit.is_row() {
            out.edits.push(ParaEdit::InsertedRow {
                region: unit.region.clone(),
                node2: unit.node,
            });
            out.changes.push(WmlChange {
                change_type: WmlChangeType::RowInserted,
                region: unit.region.label(),
                old_text: None,
                new_text: Some(unit.text.clone()),
                insertions: counted,
                deletions: 0,
            });
        } else {
            out.edits.push(ParaEdit::InsertedPara {
                region: unit.region.clone(),
                node2: unit.node,
            });
            out.changes.push(WmlChange {
                change_type: WmlChangeType::ParagraphInserted,
                region: unit.region.label(),
                old_text: None,
                new_text: Some(unit.text.clone()),
                insertions: counted,
                deletions: 0,
            });
        }
    }
    if !units.is_empty() {
        out.insertions += 1;
    }
}

fn handle_replacement(
    dels: &[ComparisonUnit],
    inss: &[ComparisonUnit],
    src1: &WmlSource,
    src2: &WmlSource,
    out: &mut WmlDiffOutcome,
) {
    let all_rows = dels.iter().all(ComparisonUnit::is_row) && inss.iter().all(ComparisonUnit::is_row);
    if all_rows {
        replace_rows(dels, inss, src1, src2, out);
        return;
    }

    let same_shape = dels.len() == inss.len()
        && dels
            .iter()
            .zip(inss)
            .all(|(d, i)| d.kind == i.kind);
    if same_shape {
        for (d, i) in dels.iter().zip(inss) {
            if d.is_row() {
                modified_row(d, i, src1, src2, out);
            } else {
                modified_paragraph(d, i, out);
            }
        }
        return;
    }

    // Mixed or unequal: rows pair positionally among themselves, then
    // paragraphs pair by best word overlap.
    let row_dels: Vec<&ComparisonUnit> = dels.iter().filter(|u| u.is_row()).collect();
    let row_inss: Vec<&ComparisonUnit> = inss.iter().filter(|u| u.is_row()).collect();
    let para_dels: Vec<&ComparisonUnit> = dels.iter().filter(|u| !u.is_row()).collect();
    let para_inss: Vec<&ComparisonUnit> = inss.iter().filter(|u| !u.is_row()).collect();

    let paired_rows = row_dels.len().min(row_inss.len());
    for k in 0..paired_rows {
        modified_row(row_dels[k], row_inss[k], src1, src2, out);
    }

    let (matched, unmatched_left, unmatched_right) = pair_by_similarity(&para_dels, &para_inss);
    for (d, i) in matched {
        modified_paragraph(d, i, out);
    }

    let extra_dels: Vec<ComparisonUnit> = unmatched_left
        .into_iter()
        .cloned()
        .chain(row_dels[paired_rows..].iter().map(|u| (*u).clone()))
        .collect();
    let extra_inss: Vec<ComparisonUnit> = unmatched_right
        .into_iter()
        .cloned()
        .chain(row_inss[paired_rows..].iter().map(|u| (*u).clone()))
        .collect();

    handle_pure_deletion(&extra_dels, out);
    handle_pure_insertion(&extra_inss, out);
}

/// Row-only replacement: positional pairing, extras grouped into a single
/// insertion or deletion revision.
fn replace_rows(
    dels: &[ComparisonUnit],
    inss: &[ComparisonUnit],
    src1: &WmlSource,
    src2: &WmlSource,
    out: &mut WmlDiffOutcome,
) {
    let paired = dels.len().min(inss.len());
    for k in 0..paired {
        modified_row(&dels[k], &inss[k], src1, src2, out);
    }
    handle_pure_deletion(&dels[paired..], out);
    handle_pure_insertion(&inss[paired..], out);
}

/// Greedy best-pair matching of modified paragraphs by word overlap.
fn pair_by_similarity<'a>(
    dels: &[&'a ComparisonUnit],
    inss: &[&'a ComparisonUnit],
) -> (
    Vec<(&'a ComparisonUnit, &'a ComparisonUnit)>,
    Vec<&'a ComparisonUnit>,
    Vec<&'a ComparisonUnit>,
) {
    let mut scores: Vec<(usize, usize, f64)> = Vec::new();
    for (di, d) in dels.iter().enumerate() {
        for (ii, i) in inss.iter().enumerate() {
            let score = word_jaccard(&d.text, &i.text);
            if score >= MODIFICATION_SIMILARITY {
                scores.push((di, ii, score));
            }
        }
    }
    // Highest score first; ties break on earliest positions for
    // determinism.
    scores.sort_by(|a, b| {
        b.2.partial_cmp(&a.2)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.0.cmp(&b.0))
            .then(a.1.cmp(&b.1))
    });

    let mut used_left = vec![false; dels.len()];
    let mut used_right = vec![false; inss.len()];
    let mut pairs: Vec<(usize, usize)> = Vec::new();
    for (di, ii, _) in scores {
        if !used_left[di] && !used_right[ii] {
            used_left[di] = true;
            used_right[ii] = true;
            pairs.push((di, ii));
        }
    }
    pairs.sort();

    let matched: Vec<_> = pairs.iter().map(|&(di, ii)| (dels[di], inss[ii])).collect();
    let unmatched_left: Vec<_> = dels
        .iter()
        .enumerate()
        .filter(|(di, _)| !used_left[*di])
        .map(|(_, u)| *u)
        .collect();
    let unmatched_right: Vec<_> = inss
        .iter()
        .enumerate()
        .filter(|(ii, _)| !used_right[*ii])
        .map(|(_, u)| *u)
        .collect();

    (matched, unmatched_left, unmatched_right)
}

fn modified_paragraph(d: &ComparisonUnit, i: &ComparisonUnit, out: &mut WmlDiffOutcome) {
    let tokens1 = tokenize(&d.text);
    let tokens2 = tokenize(&i.text);
    let segments = correlate(&tokens1, &tokens2, &LcsOptions::new());

    let similarity = word_jaccard(&d.text, &i.text);
    let (ins, del) = count_word_revisions(&segments, similarity);
    out.insertions += ins;
    out.deletions += del;

    out.changes.push(WmlChange {
        change_type: WmlChangeType::ParagraphModified,
        region: i.region.label(),
        old_text: Some(d.text.clone()),
        new_text: Some(i.text.clone()),
        insertions: ins,
        deletions: del,
    });
    out.edits.push(ParaEdit::ModifiedPara {
        region: i.region.clone(),
        node1: d.node,
        node2: i.node,
        segments,
    });
}

fn modified_row(
    d: &ComparisonUnit,
    i: &ComparisonUnit,
    src1: &WmlSource,
    src2: &WmlSource,
    out: &mut WmlDiffOutcome,
) {
    let cells1 = src1
        .tree(&d.region)
        .map(|tree| cell_texts(tree, d.node, None))
        .unwrap_or_default();
    let cells2 = src2
        .tree(&i.region)
        .map(|tree| cell_texts(tree, i.node, None))
        .unwrap_or_default();

    let (ins, del) = count_cell_revisions(&cells1, &cells2);
    out.insertions += ins;
    out.deletions += del;

    out.changes.push(WmlChange {
        change_type: WmlChangeType::RowModified,
        region: i.region.label(),
        old_text: Some(d.text.clone()),
        new_text: Some(i.text.clone()),
        insertions: ins,
        deletions: del,
    });
    out.edits.push(ParaEdit::ModifiedRow {
        region: i.region.clone(),
        node1: d.node,
        node2: i.node,
    });
}

/// Revision counting for a modified paragraph (spec'd grouping policy):
/// insert-only edits count one insertion; a dissimilar rewrite or one
/// whose surviving anchors are all short structural tokens counts one
/// deletion plus one insertion; otherwise each contiguous run of
/// same-status word segments counts once.
pub fn count_word_revisions(segments: &[Segment<Token>], similarity: f64) -> (usize, usize) {
    let has_ins = segments.iter().any(|s| s.kind == SegmentKind::Inserted);
    let has_del = segments.iter().any(|s| s.kind == SegmentKind::Deleted);

    match (has_ins, has_del) {
        (false, false) => (0, 0),
        (true, false) => (1, 0),
        (false, true) => (0, 1),
        (true, true) => {
            if similarity < REPLACEMENT_SIMILARITY
                || interior_anchors_all_structural(segments)
            {
                return (1, 1);
            }
            let mut ins = 0;
            let mut del = 0;
            for segment in segments {
                match segment.kind {
                    SegmentKind::Inserted => ins += 1,
                    SegmentKind::Deleted => del += 1,
                    SegmentKind::Equal => {}
                }
            }
            (ins, del)
        }
    }
}

/// True when every `Equal` block strictly between the first and last
/// change is a single structural token.
fn interior_anchors_all_structural(segments: &[Segment<Token>]) -> bool {
    let first_change = segments
        .iter()
        .position(|s| s.kind != SegmentKind::Equal);
    let last_change = segments
        .iter()
        .rposition(|s| s.kind != SegmentKind::Equal);
    let (Some(first), Some(last)) = (first_change, last_change) else {
        return false;
    };
    if last <= first + 1 {
        return false;
    }

    let mut saw_interior_equal = false;
    for segment in &segments[first + 1..last] {
        if segment.kind == SegmentKind::Equal {
            saw_interior_equal = true;
            if segment.left.len() != 1 || !segment.left[0].is_structural() {
                return false;
            }
        }
    }
    saw_interior_equal
}

/// Per-cell revision counting for a modified table row: each cell
/// contributes at most one insertion and at most one deletion.
pub fn count_cell_revisions(cells1: &[String], cells2: &[String]) -> (usize, usize) {
    let mut ins = 0;
    let mut del = 0;
    let max = cells1.len().max(cells2.len());
    for idx in 0..max {
        match (cells1.get(idx), cells2.get(idx)) {
            (Some(c1), Some(c2)) => {
                if c1 == c2 {
                    continue;
                }
                let segments = correlate(&tokenize(c1), &tokenize(c2), &LcsOptions::new());
                let (cell_ins, cell_del) = count_word_revisions(&segments, word_jaccard(c1, c2));
                ins += cell_ins.min(1);
                del += cell_del.min(1);
            }
            (Some(_), None) => del += 1,
            (None, Some(_)) => ins += 1,
            (None, None) => {}
        }
    }
    (ins, del)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word_segments(old: &str, new: &str) -> Vec<Segment<Token>> {
        correlate(&tokenize(old), &tokenize(new), &LcsOptions::new())
    }

    #[test]
    fn single_word_swap_counts_one_of_each() {
        let segments = word_segments("The quick brown fox", "The slow brown fox");
        let similarity = word_jaccard("The quick brown fox", "The slow brown fox");
        assert_eq!(count_word_revisions(&segments, similarity), (1, 1));
    }

    #[test]
    fn insert_only_edit_counts_one_insertion() {
        let segments = word_segments("alpha beta", "alpha new words beta");
        assert_eq!(count_word_revisions(&segments, 0.9), (1, 0));
    }

    #[test]
    fn dissimilar_rewrite_counts_as_replacement() {
        let old = "completely original sentence here";
        let new = "utterly different words now appear";
        let segments = word_segments(old, new);
        let similarity = word_jaccard(old, new);
        assert!(similarity < 0.4);
        assert_eq!(count_word_revisions(&segments, similarity), (1, 1));
    }

    #[test]
    fn structural_anchor_between_changes_collapses_counts() {
        let old = "alpha beta FOOTNOTE_REF_1 gamma delta";
        let new = "one two FOOTNOTE_REF_1 three four";
        let segments = word_segments(old, new);
        assert_eq!(count_word_revisions(&segments, 0.9), (1, 1));
    }

    #[test]
    fn distant_changes_count_separately() {
        let old = "aa xx cc dd ee yy gg";
        let new = "aa bb cc dd ee ff gg";
        let segments = word_segments(old, new);
        let similarity = word_jaccard(old, new);
        assert!(similarity >= 0.4);
        assert_eq!(count_word_revisions(&segments, similarity), (2, 2));
    }

    #[test]
    fn cell_revisions_cap_at_one_per_kind_per_cell() {
        let cells1 = vec!["one two three".to_string(), "same".to_string()];
        let cells2 = vec!["one 2 three 4".to_string(), "same".to_string()];
        // First cell has scattered edits but still contributes at most
        // one insertion and one deletion.
        let (ins, del) = count_cell_revisions(&cells1, &cells2);
        assert_eq!((ins, del), (1, 1));
    }

    #[test]
    fn extra_cells_count_individually() {
        let cells1 = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let cells2 = vec!["a".to_string()];
        assert_eq!(count_cell_revisions(&cells1, &cells2), (0, 2));
    }
}
