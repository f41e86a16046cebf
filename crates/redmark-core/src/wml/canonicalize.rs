//! Extraction of comparison units (paragraphs, table rows) from a
//! WordprocessingML source, in document order: body first, then each
//! non-separator footnote, then each non-separator endnote.

use super::document::{find_body, Region, WmlSource};
use crate::error::Result;
use crate::hash::{sha1_hex_str, short_hash};
use crate::lcs::Hashable;
use crate::package::OpcPackage;
use crate::xml::namespaces::{mc, r, w};
use crate::xml::{builder, XmlData, XmlTree};
use indextree::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitKind {
    Paragraph,
    TableRow,
}

/// One comparison unit: a hash over the unit's canonical text plus the
/// subtree it came from.
#[derive(Clone)]
pub struct ComparisonUnit {
    pub hash: String,
    pub text: String,
    pub node: NodeId,
    pub region: Region,
    pub kind: UnitKind,
}

impl Hashable for ComparisonUnit {
    fn key(&self) -> &str {
        &self.hash
    }
}

impl ComparisonUnit {
    pub fn is_row(&self) -> bool {
        self.kind == UnitKind::TableRow
    }
}

/// Collects every comparison unit of the source. `package` is consulted to
/// resolve embedded image bytes for drawing identity hashing.
pub fn collect_units(source: &WmlSource, package: &OpcPackage) -> Result<Vec<ComparisonUnit>> {
    let mut units = Vec::new();

    let body = find_body(&source.doc)?;
    collect_block(
        &source.doc,
        body,
        &Region::Body,
        package,
        &source.main_uri,
        &mut units,
    );

    if let (Some(tree), Some(uri)) = (&source.footnotes, &source.footnotes_uri) {
        collect_notes(tree, uri, package, &w::footnote(), Region::Footnote, &mut units);
    }
    if let (Some(tree), Some(uri)) = (&source.endnotes, &source.endnotes_uri) {
        collect_notes(tree, uri, package, &w::endnote(), Region::Endnote, &mut units);
    }

    Ok(units)
}

fn collect_notes<F>(
    tree: &XmlTree,
    part_uri: &str,
    package: &OpcPackage,
    note_name: &crate::xml::QName,
    region_of: F,
    out: &mut Vec<ComparisonUnit>,
) where
    F: Fn(String) -> Region,
{
    let Some(root) = tree.root() else { return };
    for note in tree.find_children(root, note_name) {
        if matches!(
            tree.attr(note, &w::type_attr()),
            Some("separator") | Some("continuationSeparator")
        ) {
            continue;
        }
        let id = tree.attr(note, &w::id()).unwrap_or_default().to_string();
        collect_block(tree, note, &region_of(id), package, part_uri, out);
    }
}

fn collect_block(
    tree: &XmlTree,
    scope: NodeId,
    region: &Region,
    package: &OpcPackage,
    part_uri: &str,
    out: &mut Vec<ComparisonUnit>,
) {
    for child in tree.child_elements(scope) {
        let Some(name) = tree.name(child) else { continue };

        if name == &w::p() {
            let text = paragraph_text(tree, child, Some((package, part_uri)));
            out.push(ComparisonUnit {
                hash: sha1_hex_str(&text),
                text,
                node: child,
                region: region.clone(),
                kind: UnitKind::Paragraph,
            });
        } else if name == &w::tr() {
            let text = row_text(tree, child, Some((package, part_uri)));
            out.push(ComparisonUnit {
                hash: sha1_hex_str(&text),
                text,
                node: child,
                region: region.clone(),
                kind: UnitKind::TableRow,
            });
        } else if name == &mc::alternate_content() {
            // The source behavior prefers Fallback over Choice; preserved
            // for equivalence with existing outputs.
            let branch = tree
                .find_child(child, &mc::fallback())
                .or_else(|| tree.find_child(child, &mc::choice()));
            if let Some(branch) = branch {
                collect_block(tree, branch, region, package, part_uri, out);
            }
        } else if name == &w::sect_pr() || name == &w::txbx_content() {
            // Section properties carry no units; textbox paragraphs stay
            // with their anchoring drawing.
        } else {
            collect_block(tree, child, region, package, part_uri, out);
        }
    }
}

/// Canonical text of one paragraph. Text runs concatenate; tabs and
/// breaks normalize to whitespace; note references, drawings and legacy
/// pictures contribute structural tokens so they participate in word
/// alignment without exposing their XML.
pub fn paragraph_text(
    tree: &XmlTree,
    paragraph: NodeId,
    resolver: Option<(&OpcPackage, &str)>,
) -> String {
    let mut text = String::new();
    paragraph_text_into(tree, paragraph, resolver, &mut text);
    text
}

fn paragraph_text_into(
    tree: &XmlTree,
    node: NodeId,
    resolver: Option<(&OpcPackage, &str)>,
    out: &mut String,
) {
    for child in tree.children(node) {
        let Some(data) = tree.get(child) else { continue };
        let Some(name) = data.name() else { continue };

        if name.ns.as_deref() == Some(w::NS) {
            match name.local.as_str() {
                "t" | "instrText" => out.push_str(&tree.direct_text(child)),
                "delText" | "delInstrText" => {}
                "tab" => out.push('\t'),
                "br" | "cr" => out.push('\n'),
                "noBreakHyphen" => out.push('-'),
                "txbxContent" => {}
                "footnoteReference" => {
                    let id = tree.attr(child, &w::id()).unwrap_or_default();
                    out.push_str(&format!(" FOOTNOTE_REF_{id} "));
                }
                "endnoteReference" => {
                    let id = tree.attr(child, &w::id()).unwrap_or_default();
                    out.push_str(&format!(" ENDNOTE_REF_{id} "));
                }
                "drawing" => {
                    out.push_str(&format!(" DRAWING_{} ", embedded_identity(tree, child, resolver)));
                }
                "pict" => {
                    out.push_str(&format!(" PICT_{} ", embedded_identity(tree, child, resolver)));
                }
                _ => paragraph_text_into(tree, child, resolver, out),
            }
        } else {
            paragraph_text_into(tree, child, resolver, out);
        }
    }
}

/// Identity of an embedded drawing or picture: the hash of the referenced
/// image bytes when the relationship resolves, otherwise the hash of the
/// element's own XML.
fn embedded_identity(
    tree: &XmlTree,
    element: NodeId,
    resolver: Option<(&OpcPackage, &str)>,
) -> String {
    if let Some((package, part_uri)) = resolver {
        if let Some(r_id) = find_embed_reference(tree, element) {
            if let Ok(target) = package.resolve_relationship(part_uri, &r_id) {
                if let Some(bytes) = package.part(&target) {
                    return short_hash(bytes);
                }
            }
        }
    }
    match builder::serialize_fragment(tree, element) {
        Ok(xml) => short_hash(xml.as_bytes()),
        Err(_) => "unknown".to_string(),
    }
}

fn find_embed_reference(tree: &XmlTree, element: NodeId) -> Option<String> {
    for node in tree.descendants(element) {
        if let Some(XmlData::Element { attrs, .. }) = tree.get(node) {
            for attr in attrs {
                if attr.name.ns.as_deref() == Some(r::NS)
                    && matches!(attr.name.local.as_str(), "embed" | "id" | "link")
                {
                    return Some(attr.value.clone());
                }
            }
        }
    }
    None
}

/// Canonical text of one table row: the join of its cell texts, prefixed
/// with `TR:` so a row never collides with a paragraph of the same text.
pub fn row_text(tree: &XmlTree, row: NodeId, resolver: Option<(&OpcPackage, &str)>) -> String {
    let mut text = String::from("TR:");
    let cells = cell_texts(tree, row, resolver);
    text.push_str(&cells.join("|"));
    text
}

/// Per-cell canonical texts of a row, each cell joining its paragraph
/// texts with newlines.
pub fn cell_texts(
    tree: &XmlTree,
    row: NodeId,
    resolver: Option<(&OpcPackage, &str)>,
) -> Vec<String> {
    tree.find_children(row, &w::tc())
        .into_iter()
        .map(|tc| {
            tree.find_descendants(tc, &w::p())
                .into_iter()
                .map(|p| paragraph_text(tree, p, resolver))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect()
}
