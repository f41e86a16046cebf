//! Acceptance (and rejection) of existing tracked revisions, applied to
//! both inputs before canonicalization so prior markup never perturbs the
//! diff.

use crate::xml::namespaces::{m, w, w14};
use crate::xml::{QName, XmlTree};
use indextree::NodeId;

/// Accepts all tracked revisions in a document part, in place:
///
/// - `w:ins` / `w:moveTo` are unwrapped (children kept in place);
/// - `w:del`, `w:delText`, `w:delInstrText`, `w:moveFrom` are removed;
/// - property-change and custom-XML/move range markers are removed;
/// - rows whose `w:trPr` holds a `w:del` are removed, as are `m:f`
///   fractions whose control properties hold a `w:del`;
/// - `w:rsid*` and `w14:paraId`/`w14:textId` attributes are stripped.
pub fn accept_revisions(tree: &mut XmlTree) {
    let Some(root) = tree.root() else { return };

    let mut unwraps: Vec<NodeId> = Vec::new();
    let mut removals: Vec<NodeId> = Vec::new();

    for node in tree.descendants(root) {
        let Some(name) = tree.name(node) else { continue };
        if name.ns.as_deref() == Some(w::NS) {
            match name.local.as_str() {
                "ins" | "moveTo" => unwraps.push(node),
                "del" | "delText" | "delInstrText" | "moveFrom" => removals.push(node),
                "tr" => {
                    if row_is_deleted(tree, node) {
                        removals.push(node);
                    }
                }
                // A deleted paragraph mark takes the whole paragraph with
                // it on acceptance; a deleted cell mark takes the cell.
                "p" => {
                    if paragraph_mark_revised(tree, node, &w::del()) {
                        removals.push(node);
                    }
                }
                "tc" => {
                    if cell_mark_revised(tree, node, "cellDel") {
                        removals.push(node);
                    }
                }
                local if w::ACCEPT_REMOVE_TAGS.contains(&local) => removals.push(node),
                _ => {}
            }
        } else if name.ns.as_deref() == Some(m::NS)
            && name.local == "f"
            && fraction_is_deleted(tree, node)
        {
            removals.push(node);
        }
    }

    for node in removals {
        tree.detach(node);
    }
    for node in unwraps {
        tree.unwrap_node(node);
    }

    strip_revision_attributes(tree);
}

fn row_is_deleted(tree: &XmlTree, tr: NodeId) -> bool {
    row_mark_revised(tree, tr, &w::del())
}

fn row_mark_revised(tree: &XmlTree, tr: NodeId, mark: &QName) -> bool {
    tree.find_child(tr, &w::tr_pr())
        .map(|tr_pr| tree.find_child(tr_pr, mark).is_some())
        .unwrap_or(false)
}

fn paragraph_mark_revised(tree: &XmlTree, p: NodeId, mark: &QName) -> bool {
    tree.find_child(p, &w::p_pr())
        .and_then(|p_pr| tree.find_child(p_pr, &w::r_pr()))
        .map(|r_pr| tree.find_child(r_pr, mark).is_some())
        .unwrap_or(false)
}

fn cell_mark_revised(tree: &XmlTree, tc: NodeId, mark_local: &str) -> bool {
    tree.find_child(tc, &w::tc_pr())
        .map(|tc_pr| tree.find_child(tc_pr, &QName::new(w::NS, mark_local)).is_some())
        .unwrap_or(false)
}

fn fraction_is_deleted(tree: &XmlTree, f: NodeId) -> bool {
    let Some(f_pr) = tree.find_child(f, &m::f_pr()) else {
        return false;
    };
    let Some(ctrl_pr) = tree.find_child(f_pr, &m::ctrl_pr()) else {
        return false;
    };
    tree.find_descendant(ctrl_pr, &w::del()).is_some()
}

fn strip_revision_attributes(tree: &mut XmlTree) {
    let Some(root) = tree.root() else { return };
    for node in tree.descendants(root) {
        tree.retain_attrs(node, |attr| {
            let ns = attr.name.ns.as_deref();
            if ns == Some(w::NS) && attr.name.local.starts_with("rsid") {
                return false;
            }
            if ns == Some(w14::NS) && matches!(attr.name.local.as_str(), "paraId" | "textId") {
                return false;
            }
            true
        });
    }
}

/// Rejects all tracked revisions: `w:ins` content is removed, `w:del`
/// content is restored (with `w:delText` renamed back to `w:t`), moves
/// revert to their source. Used by the reject round-trip property.
pub fn reject_revisions(tree: &mut XmlTree) {
    let Some(root) = tree.root() else { return };

    let mut unwraps: Vec<NodeId> = Vec::new();
    let mut removals: Vec<NodeId> = Vec::new();
    let mut renames: Vec<NodeId> = Vec::new();

    for node in tree.descendants(root) {
        let Some(name) = tree.name(node) else { continue };
        if name.ns.as_deref() != Some(w::NS) {
            continue;
        }
        match name.local.as_str() {
            "ins" | "moveTo" => removals.push(node),
            "del" | "moveFrom" => unwraps.push(node),
            "delText" | "delInstrText" => renames.push(node),
            "tr" => {
                if row_mark_revised(tree, node, &w::ins()) {
                    removals.push(node);
                }
            }
            // An inserted paragraph mark takes the whole paragraph with
            // it on rejection; same for inserted cells.
            "p" => {
                if paragraph_mark_revised(tree, node, &w::ins()) {
                    removals.push(node);
                }
            }
            "tc" => {
                if cell_mark_revised(tree, node, "cellIns") {
                    removals.push(node);
                }
            }
            local if w::ACCEPT_REMOVE_TAGS.contains(&local) => removals.push(node),
            _ => {}
        }
    }

    for node in removals {
        tree.detach(node);
    }
    for node in unwraps {
        tree.unwrap_node(node);
    }
    for node in renames {
        let new_name = match tree.name(node).map(|n| n.local.as_str()) {
            Some("delText") => w::t(),
            _ => QName::new(w::NS, "instrText"),
        };
        if let Some(crate::xml::XmlData::Element { name, .. }) = tree.get_mut(node) {
            *name = new_name;
        }
    }

    strip_revision_attributes(tree);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parser;

    const NS_DECL: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    fn body_text(tree: &XmlTree) -> String {
        tree.text_content(tree.root().unwrap())
    }

    #[test]
    fn accept_unwraps_insertions() {
        let xml = format!(
            r#"<w:p {NS_DECL}><w:ins w:id="1"><w:r><w:t>kept</w:t></w:r></w:ins></w:p>"#
        );
        let mut tree = parser::parse(&xml).unwrap();
        accept_revisions(&mut tree);
        assert_eq!(body_text(&tree), "kept");
        let root = tree.root().unwrap();
        assert!(tree.find_descendant(root, &w::ins()).is_none());
        assert!(tree.find_descendant(root, &w::r()).is_some());
    }

    #[test]
    fn accept_removes_deletions() {
        let xml = format!(
            r#"<w:p {NS_DECL}><w:del w:id="1"><w:r><w:delText>gone</w:delText></w:r></w:del><w:r><w:t>stays</w:t></w:r></w:p>"#
        );
        let mut tree = parser::parse(&xml).unwrap();
        accept_revisions(&mut tree);
        assert_eq!(body_text(&tree), "stays");
    }

    #[test]
    fn accept_removes_deleted_rows() {
        let xml = format!(
            r#"<w:tbl {NS_DECL}><w:tr><w:trPr><w:del w:id="1"/></w:trPr><w:tc><w:p><w:r><w:t>dead row</w:t></w:r></w:p></w:tc></w:tr><w:tr><w:tc><w:p><w:r><w:t>live row</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#
        );
        let mut tree = parser::parse(&xml).unwrap();
        accept_revisions(&mut tree);
        assert_eq!(body_text(&tree), "live row");
        assert_eq!(
            tree.find_descendants(tree.root().unwrap(), &w::tr()).len(),
            1
        );
    }

    #[test]
    fn accept_strips_rsid_and_para_id_attributes() {
        let xml = format!(
            r#"<w:p {NS_DECL} xmlns:w14="http://schemas.microsoft.com/office/word/2010/wordml" w:rsidR="00AB12CD" w14:paraId="12345678"><w:r><w:t>x</w:t></w:r></w:p>"#
        );
        let mut tree = parser::parse(&xml).unwrap();
        accept_revisions(&mut tree);
        let root = tree.root().unwrap();
        assert!(tree.attr_local(root, "rsidR").is_none());
        assert!(tree.attr_local(root, "paraId").is_none());
    }

    #[test]
    fn accept_removes_property_changes() {
        let xml = format!(
            r#"<w:p {NS_DECL}><w:pPr><w:pPrChange w:id="5" w:author="a" w:date="d"/></w:pPr><w:r><w:t>x</w:t></w:r></w:p>"#
        );
        let mut tree = parser::parse(&xml).unwrap();
        accept_revisions(&mut tree);
        let root = tree.root().unwrap();
        assert!(tree
            .find_descendant(root, &QName::new(w::NS, "pPrChange"))
            .is_none());
    }

    #[test]
    fn reject_restores_deleted_text() {
        let xml = format!(
            r#"<w:p {NS_DECL}><w:del w:id="1"><w:r><w:delText>restored</w:delText></w:r></w:del><w:ins w:id="2"><w:r><w:t>dropped</w:t></w:r></w:ins></w:p>"#
        );
        let mut tree = parser::parse(&xml).unwrap();
        reject_revisions(&mut tree);
        assert_eq!(body_text(&tree), "restored");
        let root = tree.root().unwrap();
        assert!(tree.find_descendant(root, &w::del_text()).is_none());
        assert!(tree.find_descendant(root, &w::t()).is_some());
    }
}
