//! Construction of the redlined output document: the newer package is
//! cloned, body/footnote/endnote content is replaced by the reconstructed
//! unit sequence with `w:ins`/`w:del` markup, revision ids are renumbered,
//! and orphaned relationship references are dropped.

use super::canonicalize::paragraph_text;
use super::diff::ParaEdit;
use super::document::{find_body, Region, WmlDocument, WmlSource};
use super::revision::{fix_up_revision_ids, RevisionContext};
use super::settings::WmlComparerSettings;
use super::tokenize::{tokenize, Token, STRUCTURAL_PREFIXES};
use crate::error::Result;
use crate::lcs::{correlate, LcsOptions, Segment, SegmentKind};
use crate::package::OpcPackage;
use crate::xml::namespaces::{r, w};
use crate::xml::{copy_subtree, Attr, QName, XmlData, XmlTree};
use indextree::NodeId;
use std::collections::{HashMap, HashSet};

pub fn render_marked_document(
    newer: &WmlDocument,
    src1: &WmlSource,
    src2: &WmlSource,
    edits: &[ParaEdit],
    settings: &WmlComparerSettings,
) -> Result<Vec<u8>> {
    let mut pkg = newer.package().clone();
    let mut ctx = RevisionContext::new(&settings.author, &settings.date_string());

    let mut out_doc = src2.doc.clone();
    let body_edits: Vec<&ParaEdit> = edits
        .iter()
        .filter(|e| *e.region() == Region::Body)
        .collect();
    rebuild_body(&mut out_doc, &body_edits, src1, src2, &mut ctx)?;

    let mut out_footnotes = src2.footnotes.clone();
    let mut out_endnotes = src2.endnotes.clone();
    for (region, note_edits) in group_note_edits(edits) {
        let (tree, note_name, id) = match &region {
            Region::Footnote(id) => match out_footnotes.as_mut() {
                Some(tree) => (tree, w::footnote(), id.clone()),
                None => continue,
            },
            Region::Endnote(id) => match out_endnotes.as_mut() {
                Some(tree) => (tree, w::endnote(), id.clone()),
                None => continue,
            },
            Region::Body => continue,
        };
        rebuild_note(tree, &note_name, &id, &note_edits, src1, src2, &mut ctx)?;
    }

    {
        let mut trees: Vec<&mut XmlTree> = vec![&mut out_doc];
        if let Some(tree) = out_footnotes.as_mut() {
            trees.push(tree);
        }
        if let Some(tree) = out_endnotes.as_mut() {
            trees.push(tree);
        }
        fix_up_revision_ids(&mut trees);
    }

    remove_orphan_references(&mut out_doc, &pkg, &src2.main_uri);
    pkg.set_xml_part(&src2.main_uri, &out_doc)?;

    if let (Some(tree), Some(uri)) = (out_footnotes.as_mut(), src2.footnotes_uri.as_deref()) {
        remove_orphan_references(tree, &pkg, uri);
        pkg.set_xml_part(uri, tree)?;
    }
    if let (Some(tree), Some(uri)) = (out_endnotes.as_mut(), src2.endnotes_uri.as_deref()) {
        remove_orphan_references(tree, &pkg, uri);
        pkg.set_xml_part(uri, tree)?;
    }

    pkg.save()
}

fn group_note_edits(edits: &[ParaEdit]) -> Vec<(Region, Vec<&ParaEdit>)> {
    let mut groups: Vec<(Region, Vec<&ParaEdit>)> = Vec::new();
    for edit in edits {
        let region = edit.region();
        if *region == Region::Body {
            continue;
        }
        match groups.iter_mut().find(|(r, _)| r == region) {
            Some((_, list)) => list.push(edit),
            None => groups.push((region.clone(), vec![edit])),
        }
    }
    groups
}

fn rebuild_body(
    out: &mut XmlTree,
    edits: &[&ParaEdit],
    src1: &WmlSource,
    src2: &WmlSource,
    ctx: &mut RevisionContext,
) -> Result<()> {
    let body = find_body(out)?;
    let children = out.children(body);
    let sect_pr = children
        .iter()
        .copied()
        .find(|&c| out.is_named(c, &w::sect_pr()));
    for child in children {
        out.detach(child);
    }

    render_edits(out, body, edits, src1, src2, ctx);

    if let Some(sp) = sect_pr {
        out.reattach(sp, body);
    }
    Ok(())
}

/// Renders an edit sequence under `parent`, regrouping consecutive row
/// edits into a rebuilt `w:tbl` (row units leave their table container
/// behind during canonicalization).
fn render_edits(
    out: &mut XmlTree,
    parent: NodeId,
    edits: &[&ParaEdit],
    src1: &WmlSource,
    src2: &WmlSource,
    ctx: &mut RevisionContext,
) {
    let mut current_table: Option<NodeId> = None;
    for edit in edits {
        if edit.is_row_edit() {
            let table = match current_table {
                Some(table) => table,
                None => {
                    let table = start_table(out, parent, edit, src1, src2);
                    current_table = Some(table);
                    table
                }
            };
            render_edit(out, table, edit, src1, src2, ctx);
        } else {
            current_table = None;
            render_edit(out, parent, edit, src1, src2, ctx);
        }
    }
}

/// Opens a new output table, carrying over `tblPr`/`tblGrid` from the
/// source table that held the first row of the run.
fn start_table(
    out: &mut XmlTree,
    parent: NodeId,
    first_row: &ParaEdit,
    src1: &WmlSource,
    src2: &WmlSource,
) -> NodeId {
    let table = out.add_child(parent, XmlData::element(w::tbl()));

    let source = match first_row {
        ParaEdit::UnchangedRow { region, node2 }
        | ParaEdit::InsertedRow { region, node2 }
        | ParaEdit::ModifiedRow { region, node2, .. } => {
            src2.tree(region).map(|tree| (tree, *node2))
        }
        ParaEdit::DeletedRow { region, node1 } => src1.tree(region).map(|tree| (tree, *node1)),
        _ => None,
    };

    if let Some((tree, row)) = source {
        if let Some(src_table) = tree.parent(row) {
            for child in tree.children(src_table) {
                if let Some(name) = tree.name(child) {
                    if name.ns.as_deref() == Some(w::NS)
                        && matches!(name.local.as_str(), "tblPr" | "tblGrid")
                    {
                        copy_subtree(tree, child, out, Some(table));
                    }
                }
            }
        }
    }

    table
}

fn rebuild_note(
    out: &mut XmlTree,
    note_name: &QName,
    note_id: &str,
    edits: &[&ParaEdit],
    src1: &WmlSource,
    src2: &WmlSource,
    ctx: &mut RevisionContext,
) -> Result<()> {
    let Some(root) = out.root() else { return Ok(()) };
    let Some(note) = out
        .find_children(root, note_name)
        .into_iter()
        .find(|&n| out.attr(n, &w::id()) == Some(note_id))
    else {
        // The note only exists on the older side; its deletions are
        // reported in the change set but have no anchor in the output.
        return Ok(());
    };

    for child in out.children(note) {
        out.detach(child);
    }
    render_edits(out, note, edits, src1, src2, ctx);
    Ok(())
}

fn render_edit(
    out: &mut XmlTree,
    parent: NodeId,
    edit: &ParaEdit,
    src1: &WmlSource,
    src2: &WmlSource,
    ctx: &mut RevisionContext,
) {
    match edit {
        ParaEdit::Unchanged { region, node2 } | ParaEdit::UnchangedRow { region, node2 } => {
            if let Some(tree2) = src2.tree(region) {
                copy_subtree(tree2, *node2, out, Some(parent));
            }
        }
        ParaEdit::InsertedPara { region, node2 } => {
            if let Some(tree2) = src2.tree(region) {
                let p = copy_subtree(tree2, *node2, out, Some(parent));
                wrap_runs_in_ins(out, p, ctx);
            }
        }
        ParaEdit::DeletedPara { region, node1 } => {
            if let Some(tree1) = src1.tree(region) {
                let p = copy_subtree(tree1, *node1, out, Some(parent));
                wrap_runs_in_del(out, p, ctx);
            }
        }
        ParaEdit::ModifiedPara {
            region,
            node1,
            node2,
            segments,
        } => {
            if let (Some(tree1), Some(tree2)) = (src1.tree(region), src2.tree(region)) {
                append_modified_paragraph(out, parent, tree1, *node1, tree2, *node2, segments, ctx);
            }
        }
        ParaEdit::InsertedRow { region, node2 } => {
            if let Some(tree2) = src2.tree(region) {
                let row = copy_subtree(tree2, *node2, out, Some(parent));
                for p in out.find_descendants(row, &w::p()) {
                    wrap_runs_in_ins(out, p, ctx);
                }
                ctx.row_mark(out, row, false);
            }
        }
        ParaEdit::DeletedRow { region, node1 } => {
            if let Some(tree1) = src1.tree(region) {
                let row = copy_subtree(tree1, *node1, out, Some(parent));
                for p in out.find_descendants(row, &w::p()) {
                    wrap_runs_in_del(out, p, ctx);
                }
                ctx.row_mark(out, row, true);
            }
        }
        ParaEdit::ModifiedRow {
            region,
            node1,
            node2,
        } => {
            if let (Some(tree1), Some(tree2)) = (src1.tree(region), src2.tree(region)) {
                append_modified_row(out, parent, tree1, *node1, tree2, *node2, ctx);
            }
        }
    }
}

/// Moves every non-`pPr` child of a paragraph into a fresh `w:ins` and
/// marks the paragraph mark itself as inserted.
fn wrap_runs_in_ins(out: &mut XmlTree, paragraph: NodeId, ctx: &mut RevisionContext) {
    mark_paragraph_mark(out, paragraph, false, ctx);
    let kids: Vec<NodeId> = out
        .children(paragraph)
        .into_iter()
        .filter(|&k| !out.is_named(k, &w::p_pr()))
        .collect();
    if kids.is_empty() {
        return;
    }
    let ins = ctx.insertion(out, paragraph);
    for kid in kids {
        out.reattach(kid, ins);
    }
}

/// Moves every non-`pPr` child into a `w:del` (converting contained
/// `w:t` to `w:delText`) and marks the paragraph mark as deleted.
fn wrap_runs_in_del(out: &mut XmlTree, paragraph: NodeId, ctx: &mut RevisionContext) {
    mark_paragraph_mark(out, paragraph, true, ctx);
    let kids: Vec<NodeId> = out
        .children(paragraph)
        .into_iter()
        .filter(|&k| !out.is_named(k, &w::p_pr()))
        .collect();
    if kids.is_empty() {
        return;
    }
    let del = ctx.deletion(out, paragraph);
    for kid in kids {
        out.reattach(kid, del);
    }
    convert_texts_to_del(out, del);
}

/// Records the insertion/deletion of the paragraph mark in
/// `pPr/rPr` so accepting or rejecting removes the paragraph as a whole.
fn mark_paragraph_mark(
    out: &mut XmlTree,
    paragraph: NodeId,
    deleted: bool,
    ctx: &mut RevisionContext,
) {
    let p_pr = match out.find_child(paragraph, &w::p_pr()) {
        Some(p_pr) => p_pr,
        None => match out.children(paragraph).first() {
            Some(&first) => out.insert_before(first, XmlData::element(w::p_pr())),
            None => out.add_child(paragraph, XmlData::element(w::p_pr())),
        },
    };
    let r_pr = match out.find_child(p_pr, &w::r_pr()) {
        Some(r_pr) => r_pr,
        None => out.add_child(p_pr, XmlData::element(w::r_pr())),
    };
    if deleted {
        ctx.deletion(out, r_pr);
    } else {
        ctx.insertion(out, r_pr);
    }
}

fn convert_texts_to_del(out: &mut XmlTree, scope: NodeId) {
    let targets: Vec<NodeId> = out
        .descendants(scope)
        .into_iter()
        .filter(|&n| out.is_named(n, &w::t()))
        .collect();
    for t in targets {
        if let Some(XmlData::Element { name, .. }) = out.get_mut(t) {
            *name = w::del_text();
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn append_modified_paragraph(
    out: &mut XmlTree,
    parent: NodeId,
    tree1: &XmlTree,
    node1: NodeId,
    tree2: &XmlTree,
    node2: NodeId,
    segments: &[Segment<Token>],
    ctx: &mut RevisionContext,
) -> NodeId {
    let p = out.add_child(parent, XmlData::element(w::p()));
    if let Some(p_pr) = tree2.find_child(node2, &w::p_pr()) {
        copy_subtree(tree2, p_pr, out, Some(p));
    }

    let rpr1 = base_run_properties(tree1, node1);
    let rpr2 = base_run_properties(tree2, node2);
    let mut counters1: HashMap<&'static str, usize> = HashMap::new();
    let mut counters2: HashMap<&'static str, usize> = HashMap::new();

    for segment in segments {
        match segment.kind {
            SegmentKind::Equal => {
                emit_tokens(
                    out, p, &segment.right, false, tree2, node2, rpr2, &mut counters2,
                );
            }
            SegmentKind::Inserted => {
                let ins = ctx.insertion(out, p);
                emit_tokens(
                    out, ins, &segment.right, false, tree2, node2, rpr2, &mut counters2,
                );
            }
            SegmentKind::Deleted => {
                let del = ctx.deletion(out, p);
                emit_tokens(
                    out, del, &segment.left, true, tree1, node1, rpr1, &mut counters1,
                );
            }
        }
    }

    p
}

/// Run properties of the first text run; applied to every generated run
/// so the rebuilt paragraph keeps its dominant formatting.
fn base_run_properties(tree: &XmlTree, paragraph: NodeId) -> Option<NodeId> {
    tree.find_descendants(paragraph, &w::r())
        .into_iter()
        .find_map(|run| tree.find_child(run, &w::r_pr()))
}

#[allow(clippy::too_many_arguments)]
fn emit_tokens(
    out: &mut XmlTree,
    parent: NodeId,
    tokens: &[Token],
    deleted: bool,
    src_tree: &XmlTree,
    src_para: NodeId,
    base_rpr: Option<NodeId>,
    counters: &mut HashMap<&'static str, usize>,
) {
    let mut buffer = String::new();

    for token in tokens {
        if token.is_structural() {
            if !buffer.is_empty() {
                emit_text_run(out, parent, &buffer, deleted, src_tree, base_rpr);
                buffer.clear();
            }
            match find_structural_run(src_tree, src_para, &token.text, counters) {
                Some(run) => {
                    let copied = copy_subtree(src_tree, run, out, Some(parent));
                    if deleted {
                        convert_texts_to_del(out, copied);
                    }
                }
                None => {
                    // Identity element vanished from the source; keep the
                    // token text so no content silently drops.
                    if token.leading_space {
                        buffer.push(' ');
                    }
                    buffer.push_str(&token.text);
                }
            }
            continue;
        }

        if token.leading_space {
            buffer.push(' ');
        }
        buffer.push_str(&token.text);
    }

    if !buffer.is_empty() {
        emit_text_run(out, parent, &buffer, deleted, src_tree, base_rpr);
    }
}

fn emit_text_run(
    out: &mut XmlTree,
    parent: NodeId,
    text: &str,
    deleted: bool,
    rpr_tree: &XmlTree,
    base_rpr: Option<NodeId>,
) {
    let run = out.add_child(parent, XmlData::element(w::r()));
    if let Some(rpr) = base_rpr {
        copy_subtree(rpr_tree, rpr, out, Some(run));
    }
    let text_name = if deleted { w::del_text() } else { w::t() };
    let mut attrs = Vec::new();
    if text.starts_with(' ') || text.ends_with(' ') {
        attrs.push(Attr::new(
            QName::new("http://www.w3.org/XML/1998/namespace", "space"),
            "preserve",
        ));
    }
    let t = out.add_child(run, XmlData::element_with_attrs(text_name, attrs));
    out.add_child(t, XmlData::Text(text.to_string()));
}

/// Locates the run containing the n-th structural element of the token's
/// kind within the source paragraph.
fn find_structural_run(
    tree: &XmlTree,
    paragraph: NodeId,
    token_text: &str,
    counters: &mut HashMap<&'static str, usize>,
) -> Option<NodeId> {
    let (prefix, name) = structural_element_name(token_text)?;
    let occurrence = counters.entry(prefix).or_insert(0);
    let candidates = tree.find_descendants(paragraph, &name);
    let element = candidates.get(*occurrence).copied();
    *occurrence += 1;
    let element = element?;
    tree.ancestors(element)
        .into_iter()
        .find(|&a| tree.is_named(a, &w::r()))
        .or(Some(element))
}

fn structural_element_name(token_text: &str) -> Option<(&'static str, QName)> {
    for prefix in STRUCTURAL_PREFIXES {
        if token_text.starts_with(prefix) {
            let name = match *prefix {
                "FOOTNOTE_REF_" => w::footnote_reference(),
                "ENDNOTE_REF_" => w::endnote_reference(),
                "DRAWING_" => w::drawing(),
                _ => w::pict(),
            };
            return Some((prefix, name));
        }
    }
    None
}

#[allow(clippy::too_many_arguments)]
fn append_modified_row(
    out: &mut XmlTree,
    parent: NodeId,
    tree1: &XmlTree,
    node1: NodeId,
    tree2: &XmlTree,
    node2: NodeId,
    ctx: &mut RevisionContext,
) -> NodeId {
    let row = out.add_child(parent, XmlData::element(w::tr()));

    // Row-level properties come from the newer side.
    for child in tree2.children(node2) {
        if let Some(name) = tree2.name(child) {
            if name.ns.as_deref() == Some(w::NS)
                && matches!(name.local.as_str(), "trPr" | "tblPrEx")
            {
                copy_subtree(tree2, child, out, Some(row));
            }
        }
    }

    let cells1 = tree1.find_children(node1, &w::tc());
    let cells2 = tree2.find_children(node2, &w::tc());
    let max = cells1.len().max(cells2.len());

    for idx in 0..max {
        match (cells1.get(idx).copied(), cells2.get(idx).copied()) {
            (Some(c1), Some(c2)) => {
                append_modified_cell(out, row, tree1, c1, tree2, c2, ctx);
            }
            (Some(c1), None) => {
                let copied = copy_subtree(tree1, c1, out, Some(row));
                for p in out.find_descendants(copied, &w::p()) {
                    wrap_runs_in_del(out, p, ctx);
                }
                mark_cell(out, copied, true, ctx);
            }
            (None, Some(c2)) => {
                let copied = copy_subtree(tree2, c2, out, Some(row));
                for p in out.find_descendants(copied, &w::p()) {
                    wrap_runs_in_ins(out, p, ctx);
                }
                mark_cell(out, copied, false, ctx);
            }
            (None, None) => {}
        }
    }

    row
}

#[allow(clippy::too_many_arguments)]
fn append_modified_cell(
    out: &mut XmlTree,
    row: NodeId,
    tree1: &XmlTree,
    cell1: NodeId,
    tree2: &XmlTree,
    cell2: NodeId,
    ctx: &mut RevisionContext,
) {
    let cell = out.add_child(row, XmlData::element(w::tc()));
    if let Some(tc_pr) = tree2.find_child(cell2, &w::tc_pr()) {
        copy_subtree(tree2, tc_pr, out, Some(cell));
    }

    let paras1 = tree1.find_children(cell1, &w::p());
    let paras2 = tree2.find_children(cell2, &w::p());
    let max = paras1.len().max(paras2.len());

    for idx in 0..max {
        match (paras1.get(idx).copied(), paras2.get(idx).copied()) {
            (Some(p1), Some(p2)) => {
                let text1 = paragraph_text(tree1, p1, None);
                let text2 = paragraph_text(tree2, p2, None);
                if text1 == text2 {
                    copy_subtree(tree2, p2, out, Some(cell));
                } else {
                    let segments =
                        correlate(&tokenize(&text1), &tokenize(&text2), &LcsOptions::new());
                    append_modified_paragraph(out, cell, tree1, p1, tree2, p2, &segments, ctx);
                }
            }
            (None, Some(p2)) => {
                let p = copy_subtree(tree2, p2, out, Some(cell));
                wrap_runs_in_ins(out, p, ctx);
            }
            (Some(p1), None) => {
                let p = copy_subtree(tree1, p1, out, Some(cell));
                wrap_runs_in_del(out, p, ctx);
            }
            (None, None) => {}
        }
    }

    // Non-paragraph cell content (nested tables, bookmarks) carries over
    // from the newer side untouched.
    for child in tree2.children(cell2) {
        if let Some(name) = tree2.name(child) {
            if name.ns.as_deref() == Some(w::NS)
                && !matches!(name.local.as_str(), "p" | "tcPr")
            {
                copy_subtree(tree2, child, out, Some(cell));
            }
        }
    }
}

/// Stamps a `w:cellIns`/`w:cellDel` marker into the cell's `tcPr` so the
/// structural edit survives accept/reject.
fn mark_cell(out: &mut XmlTree, cell: NodeId, deleted: bool, ctx: &mut RevisionContext) {
    let tc_pr = match out.find_child(cell, &w::tc_pr()) {
        Some(tc_pr) => tc_pr,
        None => match out.children(cell).first() {
            Some(&first) => out.insert_before(first, XmlData::element(w::tc_pr())),
            None => out.add_child(cell, XmlData::element(w::tc_pr())),
        },
    };
    let local = if deleted { "cellDel" } else { "cellIns" };
    let id = ctx.next_id().to_string();
    let attrs = vec![
        Attr::new(w::id(), &id),
        Attr::new(w::author(), &ctx.author),
        Attr::new(w::date(), &ctx.date),
    ];
    out.add_child(
        tc_pr,
        XmlData::element_with_attrs(QName::new(w::NS, local), attrs),
    );
}

/// Drops any element whose `r:id`/`r:embed` no longer resolves in the
/// part's relationship set, preventing orphan references after deletions.
fn remove_orphan_references(tree: &mut XmlTree, pkg: &OpcPackage, part_uri: &str) {
    let valid: HashSet<&str> = pkg
        .relationships(part_uri)
        .iter()
        .map(|rel| rel.id.as_str())
        .collect();

    let Some(root) = tree.root() else { return };
    let mut orphans: Vec<NodeId> = Vec::new();
    for node in tree.descendants(root) {
        let Some(XmlData::Element { attrs, .. }) = tree.get(node) else {
            continue;
        };
        let broken = attrs.iter().any(|attr| {
            attr.name.ns.as_deref() == Some(r::NS)
                && matches!(attr.name.local.as_str(), "id" | "embed")
                && !valid.contains(attr.value.as_str())
        });
        if broken {
            orphans.push(node);
        }
    }
    for node in orphans {
        tree.detach(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parser;

    const NS_DECL: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    #[test]
    fn wrap_runs_in_ins_preserves_p_pr() {
        let xml = format!(
            r#"<w:p {NS_DECL}><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:t>text</w:t></w:r></w:p>"#
        );
        let mut tree = parser::parse(&xml).unwrap();
        let p = tree.root().unwrap();
        let mut ctx = RevisionContext::new("redline", "2026-01-01T00:00:00Z");
        wrap_runs_in_ins(&mut tree, p, &mut ctx);

        let kids = tree.child_elements(p);
        assert_eq!(tree.name(kids[0]), Some(&w::p_pr()));
        assert_eq!(tree.name(kids[1]), Some(&w::ins()));
        let ins = kids[1];
        assert!(tree.find_child(ins, &w::r()).is_some());
    }

    #[test]
    fn wrap_runs_in_del_converts_text_elements() {
        let xml = format!(r#"<w:p {NS_DECL}><w:r><w:t>bye</w:t></w:r></w:p>"#);
        let mut tree = parser::parse(&xml).unwrap();
        let p = tree.root().unwrap();
        let mut ctx = RevisionContext::new("redline", "2026-01-01T00:00:00Z");
        wrap_runs_in_del(&mut tree, p, &mut ctx);

        assert!(tree.find_descendant(p, &w::t()).is_none());
        let del_text = tree.find_descendant(p, &w::del_text()).unwrap();
        assert_eq!(tree.direct_text(del_text), "bye");
    }

    #[test]
    fn orphan_references_are_dropped() {
        let xml = format!(
            r#"<w:document {NS_DECL} xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body><w:p><w:hyperlink r:id="rId99"><w:r><w:t>link</w:t></w:r></w:hyperlink></w:p></w:body></w:document>"#
        );
        let mut tree = parser::parse(&xml).unwrap();

        // A package with no relationships for the part.
        let pkg = {
            let mut buffer = std::io::Cursor::new(Vec::new());
            let mut writer = zip::write::ZipWriter::new(&mut buffer);
            let options: zip::write::FileOptions<'_, ()> = zip::write::FileOptions::default();
            writer.start_file("[Content_Types].xml", options).unwrap();
            use std::io::Write as _;
            writer
                .write_all(br#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)
                .unwrap();
            writer.finish().unwrap();
            OpcPackage::open(&buffer.into_inner()).unwrap()
        };

        remove_orphan_references(&mut tree, &pkg, "word/document.xml");
        let root = tree.root().unwrap();
        assert!(tree.find_descendant(root, &w::hyperlink()).is_none());
    }

    #[test]
    fn modified_paragraph_produces_ins_and_del() {
        let xml1 = format!(r#"<w:p {NS_DECL}><w:r><w:t>The quick brown fox</w:t></w:r></w:p>"#);
        let xml2 = format!(r#"<w:p {NS_DECL}><w:r><w:t>The slow brown fox</w:t></w:r></w:p>"#);
        let tree1 = parser::parse(&xml1).unwrap();
        let tree2 = parser::parse(&xml2).unwrap();

        let segments = correlate(
            &tokenize("The quick brown fox"),
            &tokenize("The slow brown fox"),
            &LcsOptions::new(),
        );

        let mut out = XmlTree::new();
        let body = out.add_root(XmlData::element(w::body()));
        let mut ctx = RevisionContext::new("redline", "2026-01-01T00:00:00Z");
        let p = append_modified_paragraph(
            &mut out,
            body,
            &tree1,
            tree1.root().unwrap(),
            &tree2,
            tree2.root().unwrap(),
            &segments,
            &mut ctx,
        );

        let ins = out.find_child(p, &w::ins()).unwrap();
        let del = out.find_child(p, &w::del()).unwrap();
        assert_eq!(out.text_content(ins).trim(), "slow");
        assert_eq!(out.text_content(del).trim(), "quick");
        // Full surface text of the paragraph reads as old+new overlay.
        assert_eq!(out.text_content(p), "The quick slow brown fox");
    }
}
