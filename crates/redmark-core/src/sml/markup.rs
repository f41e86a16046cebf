//! Marked-workbook rendering: highlight fills on changed cells, authored
//! comments describing each change, and a `_DiffSummary` sheet with
//! aggregate statistics.

use super::document::SmlDocument;
use super::settings::SmlComparerSettings;
use super::types::{SmlChange, SmlChangeType};
use crate::error::{RedmarkError, Result};
use crate::package::OpcPackage;
use crate::util::cell_ref::{make_a1, parse_a1};
use crate::util::color::to_argb;
use crate::xml::namespaces::{content_type, r, rel_type, s};
use crate::xml::{builder, parser, Attr, QName, XmlData, XmlTree};
use indextree::NodeId;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
struct HighlightStyles {
    added: usize,
    modified_value: usize,
    modified_formula: usize,
    modified_format: usize,
}

impl HighlightStyles {
    fn for_change(&self, kind: SmlChangeType) -> Option<usize> {
        match kind {
            SmlChangeType::CellAdded => Some(self.added),
            SmlChangeType::ValueChanged => Some(self.modified_value),
            SmlChangeType::FormulaChanged => Some(self.modified_formula),
            SmlChangeType::FormatChanged => Some(self.modified_format),
            _ => None,
        }
    }
}

pub fn render_marked_workbook(
    source: &SmlDocument,
    changes: &[SmlChange],
    settings: &SmlComparerSettings,
) -> Result<SmlDocument> {
    let mut pkg = source.package().clone();
    let workbook_uri = source.workbook_uri();

    let styles_uri = match pkg.relationship_of_type(&workbook_uri, rel_type::STYLES) {
        Some(rel) => crate::package::uri::resolve(&workbook_uri, &rel.target),
        None => "xl/styles.xml".to_string(),
    };
    let mut styles_tree = match pkg.try_xml_part(&styles_uri)? {
        Some(tree) => tree,
        None => minimal_stylesheet()?,
    };
    let highlight = add_highlight_styles(&mut styles_tree, settings)?;
    pkg.set_xml_part(&styles_uri, &styles_tree)?;

    let sheet_uris = sheet_part_uris(&pkg, &workbook_uri)?;

    let mut by_sheet: HashMap<&str, Vec<&SmlChange>> = HashMap::new();
    for change in changes {
        if change.cell_address.is_none() {
            continue;
        }
        if let Some(sheet) = change.sheet_name.as_deref() {
            by_sheet.entry(sheet).or_default().push(change);
        }
    }

    let mut sheets: Vec<&&str> = by_sheet.keys().collect();
    sheets.sort();
    for sheet_name in sheets {
        let Some(sheet_uri) = sheet_uris.get(*sheet_name) else {
            continue;
        };
        let sheet_changes = &by_sheet[*sheet_name];

        let mut sheet_tree = pkg.xml_part(sheet_uri)?;
        for change in sheet_changes.iter() {
            let Some(address) = change.cell_address.as_deref() else {
                continue;
            };
            if let Some(style) = highlight.for_change(change.kind()) {
                apply_cell_highlight(&mut sheet_tree, address, style)?;
            }
        }
        pkg.set_xml_part(sheet_uri, &sheet_tree)?;

        add_change_comments(&mut pkg, sheet_uri, sheet_changes, settings)?;
    }

    add_summary_sheet(&mut pkg, &workbook_uri, changes, settings)?;

    Ok(SmlDocument::from_package(pkg))
}

fn minimal_stylesheet() -> Result<XmlTree> {
    parser::parse(
        r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs></styleSheet>"#,
    )
}

/// Appends four solid fills and four `xf` entries referencing them;
/// returns the new style indices.
fn add_highlight_styles(
    tree: &mut XmlTree,
    settings: &SmlComparerSettings,
) -> Result<HighlightStyles> {
    let root = tree
        .root()
        .ok_or_else(|| RedmarkError::malformed("empty styles part"))?;

    let fills = match tree.find_child(root, &s::fills()) {
        Some(fills) => fills,
        None => match tree.find_child(root, &s::cell_xfs()) {
            Some(cell_xfs) => tree.insert_before(
                cell_xfs,
                XmlData::element_with_attrs(
                    s::fills(),
                    vec![Attr::new(QName::local("count"), "0")],
                ),
            ),
            None => tree.add_child(
                root,
                XmlData::element_with_attrs(
                    s::fills(),
                    vec![Attr::new(QName::local("count"), "0")],
                ),
            ),
        },
    };

    let fill_base = tree.find_children(fills, &s::fill()).len();
    for color in [
        &settings.added_color,
        &settings.modified_value_color,
        &settings.modified_formula_color,
        &settings.modified_format_color,
    ] {
        let fill = tree.add_child(fills, XmlData::element(s::fill()));
        let pattern = tree.add_child(
            fill,
            XmlData::element_with_attrs(
                s::pattern_fill(),
                vec![Attr::new(QName::local("patternType"), "solid")],
            ),
        );
        tree.add_child(
            pattern,
            XmlData::element_with_attrs(
                s::fg_color(),
                vec![Attr::new(QName::local("rgb"), &to_argb(color))],
            ),
        );
        tree.add_child(
            pattern,
            XmlData::element_with_attrs(
                s::bg_color(),
                vec![Attr::new(QName::local("indexed"), "64")],
            ),
        );
    }
    let fill_count = tree.find_children(fills, &s::fill()).len();
    tree.set_attr(fills, &QName::local("count"), &fill_count.to_string());

    let cell_xfs = match tree.find_child(root, &s::cell_xfs()) {
        Some(cell_xfs) => cell_xfs,
        None => tree.add_child(
            root,
            XmlData::element_with_attrs(
                s::cell_xfs(),
                vec![Attr::new(QName::local("count"), "0")],
            ),
        ),
    };
    let xf_base = tree.find_children(cell_xfs, &s::xf()).len();
    for i in 0..4usize {
        tree.add_child(
            cell_xfs,
            XmlData::element_with_attrs(
                s::xf(),
                vec![
                    Attr::new(QName::local("numFmtId"), "0"),
                    Attr::new(QName::local("fontId"), "0"),
                    Attr::new(QName::local("fillId"), &(fill_base + i).to_string()),
                    Attr::new(QName::local("borderId"), "0"),
                    Attr::new(QName::local("xfId"), "0"),
                    Attr::new(QName::local("applyFill"), "1"),
                ],
            ),
        );
    }
    let xf_count = tree.find_children(cell_xfs, &s::xf()).len();
    tree.set_attr(cell_xfs, &QName::local("count"), &xf_count.to_string());

    Ok(HighlightStyles {
        added: xf_base,
        modified_value: xf_base + 1,
        modified_formula: xf_base + 2,
        modified_format: xf_base + 3,
    })
}

/// Sheet display name -> worksheet part URI, via the workbook's sheet
/// list and relationship set.
fn sheet_part_uris(pkg: &OpcPackage, workbook_uri: &str) -> Result<HashMap<String, String>> {
    let workbook = pkg.xml_part(workbook_uri)?;
    let mut uris = HashMap::new();
    let Some(root) = workbook.root() else {
        return Ok(uris);
    };
    let Some(sheets) = workbook.find_descendant(root, &s::sheets()) else {
        return Ok(uris);
    };
    for sheet in workbook.find_children(sheets, &s::sheet()) {
        let (Some(name), Some(r_id)) =
            (workbook.attr_local(sheet, "name"), workbook.attr(sheet, &r::id()))
        else {
            continue;
        };
        if let Ok(uri) = pkg.resolve_relationship(workbook_uri, r_id) {
            uris.insert(name.to_string(), uri);
        }
    }
    Ok(uris)
}

/// Finds or creates the `row`/`c` pair for an address (keeping
/// `sheetData` sorted) and stamps the highlight style.
fn apply_cell_highlight(tree: &mut XmlTree, address: &str, style: usize) -> Result<()> {
    let (row_n, col_n) = parse_a1(address)
        .ok_or_else(|| RedmarkError::internal("bad-address", address.to_string()))?;
    let root = tree
        .root()
        .ok_or_else(|| RedmarkError::malformed("empty worksheet part"))?;
    let sheet_data = match tree.find_descendant(root, &s::sheet_data()) {
        Some(sd) => sd,
        None => tree.add_child(root, XmlData::element(s::sheet_data())),
    };

    let row = find_or_create_row(tree, sheet_data, row_n);
    let cell = find_or_create_cell(tree, row, address, col_n);
    tree.set_attr(cell, &QName::local("s"), &style.to_string());
    Ok(())
}

fn find_or_create_row(tree: &mut XmlTree, sheet_data: NodeId, row_n: u32) -> NodeId {
    let rows = tree.find_children(sheet_data, &s::row());
    for &row in &rows {
        if tree.attr_u32(row, "r") == Some(row_n) {
            return row;
        }
    }
    let data = XmlData::element_with_attrs(
        s::row(),
        vec![Attr::new(QName::local("r"), &row_n.to_string())],
    );
    match rows
        .iter()
        .find(|&&row| tree.attr_u32(row, "r").map(|r| r > row_n).unwrap_or(false))
    {
        Some(&after) => tree.insert_before(after, data),
        None => tree.add_child(sheet_data, data),
    }
}

fn find_or_create_cell(tree: &mut XmlTree, row: NodeId, address: &str, col_n: u32) -> NodeId {
    let cells = tree.find_children(row, &s::c());
    for &cell in &cells {
        if tree.attr_local(cell, "r") == Some(address) {
            return cell;
        }
    }
    let data = XmlData::element_with_attrs(
        s::c(),
        vec![Attr::new(QName::local("r"), address)],
    );
    match cells.iter().find(|&&cell| {
        tree.attr_local(cell, "r")
            .and_then(parse_a1)
            .map(|(_, col)| col > col_n)
            .unwrap_or(false)
    }) {
        Some(&after) => tree.insert_before(after, data),
        None => tree.add_child(row, data),
    }
}

/// Adds (or extends) the sheet's comments part with one authored comment
/// per change, describing old and new content.
fn add_change_comments(
    pkg: &mut OpcPackage,
    sheet_uri: &str,
    changes: &[&SmlChange],
    settings: &SmlComparerSettings,
) -> Result<()> {
    let existing = pkg
        .relationship_of_type(sheet_uri, rel_type::COMMENTS)
        .map(|rel| crate::package::uri::resolve(sheet_uri, &rel.target));

    let (comments_uri, mut tree, is_new) = match existing {
        Some(uri) => {
            let tree = pkg
                .try_xml_part(&uri)?
                .unwrap_or_else(|| empty_comments_tree(&settings.author));
            (uri, tree, false)
        }
        None => {
            let mut n = 1;
            let uri = loop {
                let candidate = format!("xl/comments_rm{n}.xml");
                if !pkg.has_part(&candidate) {
                    break candidate;
                }
                n += 1;
            };
            (uri, empty_comments_tree(&settings.author), true)
        }
    };

    let root = tree
        .root()
        .ok_or_else(|| RedmarkError::malformed("empty comments part"))?;
    let author_id = ensure_author(&mut tree, root, &settings.author)?;
    let list = match tree.find_child(root, &s::comment_list()) {
        Some(list) => list,
        None => tree.add_child(root, XmlData::element(s::comment_list())),
    };

    for change in changes {
        let Some(address) = change.cell_address.as_deref() else {
            continue;
        };
        let already = tree
            .find_children(list, &s::comment())
            .into_iter()
            .any(|c| tree.attr_local(c, "ref") == Some(address));
        if already {
            continue;
        }
        let comment = tree.add_child(
            list,
            XmlData::element_with_attrs(
                s::comment(),
                vec![
                    Attr::new(QName::local("ref"), address),
                    Attr::new(QName::local("authorId"), &author_id.to_string()),
                ],
            ),
        );
        let text = tree.add_child(comment, XmlData::element(s::text()));
        let run = tree.add_child(text, XmlData::element(s::r()));
        let t = tree.add_child(run, XmlData::element(s::t()));
        tree.add_child(t, XmlData::Text(change.describe()));
    }

    let bytes = builder::serialize_bytes(&tree)?;
    if is_new {
        pkg.add_part_with_relationship(
            sheet_uri,
            &comments_uri,
            bytes,
            rel_type::COMMENTS,
            content_type::SPREADSHEET_COMMENTS,
        );
    } else {
        pkg.set_part(&comments_uri, bytes);
    }
    Ok(())
}

fn empty_comments_tree(author: &str) -> XmlTree {
    let mut tree = XmlTree::new();
    let root = tree.add_root(XmlData::element_with_attrs(
        s::comments(),
        vec![Attr::new(QName::local("xmlns"), s::NS)],
    ));
    let authors = tree.add_child(root, XmlData::element(s::authors()));
    let author_el = tree.add_child(authors, XmlData::element(s::author()));
    tree.add_child(author_el, XmlData::text(author));
    tree.add_child(root, XmlData::element(s::comment_list()));
    tree
}

fn ensure_author(tree: &mut XmlTree, root: NodeId, author: &str) -> Result<usize> {
    let authors = match tree.find_child(root, &s::authors()) {
        Some(authors) => authors,
        None => tree.add_child(root, XmlData::element(s::authors())),
    };
    let existing = tree.find_children(authors, &s::author());
    for (index, a) in existing.iter().enumerate() {
        if tree.direct_text(*a) == author {
            return Ok(index);
        }
    }
    let author_el = tree.add_child(authors, XmlData::element(s::author()));
    tree.add_child(author_el, XmlData::text(author));
    Ok(existing.len())
}

/// Builds the `_DiffSummary` worksheet (header, aggregate counts, one row
/// per change) and registers its relationship, content type and workbook
/// sheet entry.
fn add_summary_sheet(
    pkg: &mut OpcPackage,
    workbook_uri: &str,
    changes: &[SmlChange],
    settings: &SmlComparerSettings,
) -> Result<()> {
    let mut tree = XmlTree::new();
    let root = tree.add_root(XmlData::element_with_attrs(
        s::worksheet(),
        vec![Attr::new(QName::local("xmlns"), s::NS)],
    ));
    let sheet_data = tree.add_child(root, XmlData::element(s::sheet_data()));

    let mut row_n = 1u32;
    let mut push_row = |tree: &mut XmlTree, values: &[&str]| {
        let row = tree.add_child(
            sheet_data,
            XmlData::element_with_attrs(
                s::row(),
                vec![Attr::new(QName::local("r"), &row_n.to_string())],
            ),
        );
        for (i, value) in values.iter().enumerate() {
            if value.is_empty() {
                continue;
            }
            let address = make_a1(row_n, i as u32 + 1);
            let cell = tree.add_child(
                row,
                XmlData::element_with_attrs(
                    s::c(),
                    vec![
                        Attr::new(QName::local("r"), &address),
                        Attr::new(QName::local("t"), "inlineStr"),
                    ],
                ),
            );
            let is = tree.add_child(cell, XmlData::element(s::is_()));
            let t = tree.add_child(is, XmlData::element(s::t()));
            tree.add_child(t, XmlData::Text(value.to_string()));
        }
        row_n += 1;
    };

    push_row(&mut tree, &["Comparison summary"]);
    push_row(&mut tree, &["Author", &settings.author]);
    push_row(&mut tree, &["Total changes", &changes.len().to_string()]);
    push_row(&mut tree, &[]);
    push_row(&mut tree, &["Sheet", "Change", "Cell", "Detail"]);
    for change in changes {
        push_row(
            &mut tree,
            &[
                change.sheet_name.as_deref().unwrap_or(""),
                &format!("{:?}", change.kind()),
                change
                    .cell_address
                    .as_deref()
                    .or(change.range.as_deref())
                    .unwrap_or(""),
                &change.describe(),
            ],
        );
    }

    let part_uri = "xl/worksheets/sheetDiffSummary.xml";
    let bytes = builder::serialize_bytes(&tree)?;
    let r_id = pkg.add_part_with_relationship(
        workbook_uri,
        part_uri,
        bytes,
        rel_type::WORKSHEET,
        content_type::WORKSHEET,
    );

    let mut workbook = pkg.xml_part(workbook_uri)?;
    let Some(wb_root) = workbook.root() else {
        return Err(RedmarkError::malformed("empty workbook part"));
    };
    let sheets = match workbook.find_descendant(wb_root, &s::sheets()) {
        Some(sheets) => sheets,
        None => workbook.add_child(wb_root, XmlData::element(s::sheets())),
    };
    let max_sheet_id = workbook
        .find_children(sheets, &s::sheet())
        .into_iter()
        .filter_map(|sh| workbook.attr_u32(sh, "sheetId"))
        .max()
        .unwrap_or(0);
    workbook.add_child(
        sheets,
        XmlData::element_with_attrs(
            s::sheet(),
            vec![
                Attr::new(QName::local("name"), "_DiffSummary"),
                Attr::new(QName::local("sheetId"), &(max_sheet_id + 1).to_string()),
                Attr::new(r::id(), &r_id),
            ],
        ),
    );
    pkg.set_xml_part(workbook_uri, &workbook)?;
    Ok(())
}
