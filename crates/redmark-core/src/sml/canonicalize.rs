//! Workbook canonicalization: walks the package, expands shared strings
//! and style indices, and produces position-indexed signatures for the
//! diff engine.

use super::document::SmlDocument;
use super::settings::SmlComparerSettings;
use super::signatures::{
    CellSignature, CommentSignature, ConditionalFormatSignature, DataValidationSignature,
    HyperlinkSignature, WorkbookSignature, WorksheetSignature,
};
use super::styles::Stylesheet;
use crate::cancel::CancelToken;
use crate::error::{RedmarkError, Result};
use crate::hash::sha256_hex_str;
use crate::package::OpcPackage;
use crate::util::cell_ref::{make_a1, parse_a1};
use crate::xml::namespaces::{r, rel_type, s};
use crate::xml::{builder, XmlTree};
use indextree::NodeId;
use std::collections::BTreeMap;

pub struct SmlCanonicalizer;

impl SmlCanonicalizer {
    pub fn canonicalize(
        document: &SmlDocument,
        settings: &SmlComparerSettings,
        cancel: &CancelToken,
        warnings: &mut Vec<String>,
    ) -> Result<WorkbookSignature> {
        let package = document.package();
        let workbook_uri = document.workbook_uri();
        let workbook = package.xml_part(&workbook_uri)?;
        let workbook_root = workbook
            .root()
            .ok_or_else(|| RedmarkError::malformed("empty workbook part"))?;

        let shared_strings = load_shared_strings(package, &workbook_uri)?;
        let styles = load_stylesheet(package, &workbook_uri)?;

        let mut signature = WorkbookSignature::default();

        if let Some(defined_names) = workbook.find_descendant(workbook_root, &s::defined_names()) {
            for defined in workbook.find_children(defined_names, &s::defined_name()) {
                if let Some(name) = workbook.attr_local(defined, "name") {
                    signature
                        .defined_names
                        .insert(name.to_string(), workbook.text_content(defined));
                }
            }
        }

        let Some(sheets) = workbook.find_descendant(workbook_root, &s::sheets()) else {
            return Ok(signature);
        };

        for sheet in workbook.find_children(sheets, &s::sheet()) {
            cancel.check()?;
            let Some(name) = workbook.attr_local(sheet, "name") else {
                continue;
            };
            let Some(r_id) = workbook.attr(sheet, &r::id()) else {
                continue;
            };
            let part_uri = match package.resolve_relationship(&workbook_uri, r_id) {
                Ok(uri) => uri,
                Err(_) => {
                    // Broken sheet reference: recover by skipping the
                    // sheet, surfacing a warning on the change set.
                    warnings.push(format!(
                        "sheet '{name}' references missing relationship '{r_id}'"
                    ));
                    continue;
                }
            };
            let sheet_signature = canonicalize_sheet(
                package,
                &part_uri,
                name,
                &shared_strings,
                &styles,
                settings,
            )?;
            signature.sheets.push(sheet_signature);
        }

        Ok(signature)
    }
}

fn load_shared_strings(package: &OpcPackage, workbook_uri: &str) -> Result<Vec<String>> {
    let uri = match package.relationship_of_type(workbook_uri, rel_type::SHARED_STRINGS) {
        Some(rel) => crate::package::uri::resolve(workbook_uri, &rel.target),
        None => "xl/sharedStrings.xml".to_string(),
    };
    let Some(tree) = package.try_xml_part(&uri)? else {
        return Ok(Vec::new());
    };
    let Some(root) = tree.root() else {
        return Ok(Vec::new());
    };

    // Each <si> expands to one string; rich-text runs concatenate.
    Ok(tree
        .find_children(root, &s::si())
        .into_iter()
        .map(|si| shared_string_text(&tree, si))
        .collect())
}

fn shared_string_text(tree: &XmlTree, si: NodeId) -> String {
    let mut text = String::new();
    for child in tree.child_elements(si) {
        let Some(name) = tree.name(child) else { continue };
        if name == &s::t() {
            text.push_str(&tree.direct_text(child));
        } else if name == &s::r() {
            if let Some(t) = tree.find_child(child, &s::t()) {
                text.push_str(&tree.direct_text(t));
            }
        }
    }
    text
}

fn load_stylesheet(package: &OpcPackage, workbook_uri: &str) -> Result<Stylesheet> {
    let uri = match package.relationship_of_type(workbook_uri, rel_type::STYLES) {
        Some(rel) => crate::package::uri::resolve(workbook_uri, &rel.target),
        None => "xl/styles.xml".to_string(),
    };
    match package.try_xml_part(&uri)? {
        Some(tree) => Ok(Stylesheet::parse(&tree)),
        None => Ok(Stylesheet::default()),
    }
}

fn canonicalize_sheet(
    package: &OpcPackage,
    part_uri: &str,
    name: &str,
    shared_strings: &[String],
    styles: &Stylesheet,
    settings: &SmlComparerSettings,
) -> Result<WorksheetSignature> {
    let tree = package.xml_part(part_uri)?;
    let root = tree
        .root()
        .ok_or_else(|| RedmarkError::malformed(format!("empty worksheet part '{part_uri}'")))?;

    let mut sheet = WorksheetSignature::new(name, part_uri);

    if let Some(sheet_data) = tree.find_child(root, &s::sheet_data()) {
        for (row_position, row) in tree.find_children(sheet_data, &s::row()).into_iter().enumerate()
        {
            let row_number = tree
                .attr_u32(row, "r")
                .unwrap_or(row_position as u32 + 1);
            let mut column_position = 0u32;
            for c in tree.find_children(row, &s::c()) {
                column_position += 1;
                let address = match tree.attr_local(c, "r") {
                    Some(a) => a.to_string(),
                    None => make_a1(row_number, column_position),
                };
                let Some((row_n, col_n)) = parse_a1(&address) else {
                    continue;
                };
                column_position = col_n;

                let cell = read_cell(&tree, c, &address, row_n, col_n, shared_strings, styles);
                if cell.is_empty() && cell.format == styles.resolve(usize::MAX) {
                    continue;
                }
                sheet.populated_rows.insert(row_n);
                sheet.populated_columns.insert(col_n);
                sheet.cells.insert(address, cell);
            }
        }
    }

    compute_row_and_column_hashes(&mut sheet);

    if let Some(merge_cells) = tree.find_child(root, &s::merge_cells()) {
        for merge in tree.find_children(merge_cells, &s::merge_cell()) {
            if let Some(range) = tree.attr_local(merge, "ref") {
                sheet.merged_ranges.insert(range.to_string());
            }
        }
    }

    if settings.compare_hyperlinks {
        if let Some(hyperlinks) = tree.find_child(root, &s::hyperlinks()) {
            for link in tree.find_children(hyperlinks, &s::hyperlink()) {
                let Some(address) = tree.attr_local(link, "ref") else {
                    continue;
                };
                let target = match tree.attr(link, &r::id()) {
                    Some(r_id) => package
                        .relationship_by_id(part_uri, r_id)
                        .map(|rel| rel.target.clone())
                        .unwrap_or_default(),
                    None => tree.attr_local(link, "location").unwrap_or("").to_string(),
                };
                sheet.hyperlinks.insert(
                    address.to_string(),
                    HyperlinkSignature {
                        address: address.to_string(),
                        target,
                        display: tree.attr_local(link, "display").map(str::to_string),
                    },
                );
            }
        }
    }

    if settings.compare_data_validations {
        if let Some(validations) = tree.find_child(root, &s::data_validations()) {
            for validation in tree.find_children(validations, &s::data_validation()) {
                sheet.data_validations.push(DataValidationSignature {
                    range: tree.attr_local(validation, "sqref").unwrap_or("").to_string(),
                    validation_type: tree
                        .attr_local(validation, "type")
                        .unwrap_or("none")
                        .to_string(),
                    operator: tree.attr_local(validation, "operator").map(str::to_string),
                    formula1: tree
                        .find_child(validation, &s::formula1())
                        .map(|f| tree.text_content(f)),
                    formula2: tree
                        .find_child(validation, &s::formula2())
                        .map(|f| tree.text_content(f)),
                });
            }
        }
    }

    if settings.compare_conditional_formatting {
        for cf in tree.find_children(root, &s::conditional_formatting()) {
            let range = tree.attr_local(cf, "sqref").unwrap_or("").to_string();
            let mut rules = String::new();
            for rule in tree.find_children(cf, &s::cf_rule()) {
                if let Ok(fragment) = builder::serialize_fragment(&tree, rule) {
                    rules.push_str(&fragment);
                }
            }
            sheet.conditional_formats.push(ConditionalFormatSignature {
                range,
                rules_hash: sha256_hex_str(&rules),
            });
        }
    }

    if settings.compare_comments {
        load_comments(package, part_uri, &mut sheet)?;
    }

    Ok(sheet)
}

fn read_cell(
    tree: &XmlTree,
    c: NodeId,
    address: &str,
    row: u32,
    column: u32,
    shared_strings: &[String],
    styles: &Stylesheet,
) -> CellSignature {
    let cell_type = tree.attr_local(c, "t").unwrap_or("n");
    let raw_value = tree
        .find_child(c, &s::v())
        .map(|v| tree.direct_text(v));
    let formula = tree
        .find_child(c, &s::f())
        .map(|f| {
            let body = tree.text_content(f);
            if body.is_empty() {
                body
            } else {
                format!("={body}")
            }
        })
        .filter(|f| !f.is_empty());

    let value = match cell_type {
        "s" => raw_value
            .as_deref()
            .and_then(|v| v.parse::<usize>().ok())
            .and_then(|idx| shared_strings.get(idx))
            .cloned(),
        "inlineStr" => tree
            .find_child(c, &s::is_())
            .map(|is| tree.text_content(is)),
        _ => raw_value,
    };

    let style_index = tree.attr_u32(c, "s").map(|i| i as usize);
    let format = match style_index {
        Some(index) => styles.resolve(index),
        None => styles.resolve(usize::MAX),
    };

    CellSignature {
        address: address.to_string(),
        row,
        column,
        content_hash: CellSignature::content_hash_for(value.as_deref(), formula.as_deref()),
        value,
        formula,
        format,
    }
}

/// Row and column content hashes: the hash of the joined cell content
/// hashes within that row/column, in position order.
fn compute_row_and_column_hashes(sheet: &mut WorksheetSignature) {
    let mut row_parts: BTreeMap<u32, Vec<(u32, &str)>> = BTreeMap::new();
    let mut column_parts: BTreeMap<u32, Vec<(u32, &str)>> = BTreeMap::new();
    for cell in sheet.cells.values() {
        row_parts
            .entry(cell.row)
            .or_default()
            .push((cell.column, &cell.content_hash));
        column_parts
            .entry(cell.column)
            .or_default()
            .push((cell.row, &cell.content_hash));
    }

    let join = |parts: &mut Vec<(u32, &str)>| {
        parts.sort();
        let joined: Vec<&str> = parts.iter().map(|(_, h)| *h).collect();
        sha256_hex_str(&joined.join("|"))
    };

    let row_hashes: BTreeMap<u32, String> = row_parts
        .into_iter()
        .map(|(row, mut parts)| (row, join(&mut parts)))
        .collect();
    let column_hashes: BTreeMap<u32, String> = column_parts
        .into_iter()
        .map(|(col, mut parts)| (col, join(&mut parts)))
        .collect();

    sheet.row_hashes = row_hashes;
    sheet.column_hashes = column_hashes;
}

fn load_comments(
    package: &OpcPackage,
    part_uri: &str,
    sheet: &mut WorksheetSignature,
) -> Result<()> {
    let Some(rel) = package.relationship_of_type(part_uri, rel_type::COMMENTS) else {
        return Ok(());
    };
    let comments_uri = crate::package::uri::resolve(part_uri, &rel.target);
    let Some(tree) = package.try_xml_part(&comments_uri)? else {
        return Ok(());
    };
    let Some(root) = tree.root() else {
        return Ok(());
    };

    let authors: Vec<String> = tree
        .find_child(root, &s::authors())
        .map(|authors| {
            tree.find_children(authors, &s::author())
                .into_iter()
                .map(|a| tree.direct_text(a))
                .collect()
        })
        .unwrap_or_default();

    if let Some(list) = tree.find_child(root, &s::comment_list()) {
        for comment in tree.find_children(list, &s::comment()) {
            let Some(address) = tree.attr_local(comment, "ref") else {
                continue;
            };
            let author = tree
                .attr_u32(comment, "authorId")
                .and_then(|id| authors.get(id as usize))
                .cloned()
                .unwrap_or_default();
            let text = tree
                .find_child(comment, &s::text())
                .map(|t| tree.text_content(t))
                .unwrap_or_default();
            sheet.comments.insert(
                address.to_string(),
                CommentSignature {
                    address: address.to_string(),
                    author,
                    text,
                },
            );
        }
    }

    Ok(())
}
