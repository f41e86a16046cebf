//! Revision element construction and the final id fix-up pass.
//!
//! The id counter lives in a per-comparison context rather than process
//! scope, so concurrent comparisons stay deterministic.

use crate::xml::namespaces::w;
use crate::xml::{Attr, QName, XmlData, XmlTree};
use indextree::NodeId;

pub struct RevisionContext {
    next_id: i32,
    pub author: String,
    pub date: String,
}

impl RevisionContext {
    pub fn new(author: &str, date: &str) -> Self {
        Self {
            next_id: 1,
            author: author.to_string(),
            date: date.to_string(),
        }
    }

    pub fn next_id(&mut self) -> i32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn tracking_attrs(&mut self) -> Vec<Attr> {
        vec![
            Attr::new(w::id(), &self.next_id().to_string()),
            Attr::new(w::author(), &self.author),
            Attr::new(w::date(), &self.date),
        ]
    }

    /// Appends a `w:ins` wrapper under `parent`.
    pub fn insertion(&mut self, tree: &mut XmlTree, parent: NodeId) -> NodeId {
        let attrs = self.tracking_attrs();
        tree.add_child(parent, XmlData::element_with_attrs(w::ins(), attrs))
    }

    /// Appends a `w:del` wrapper under `parent`.
    pub fn deletion(&mut self, tree: &mut XmlTree, parent: NodeId) -> NodeId {
        let attrs = self.tracking_attrs();
        tree.add_child(parent, XmlData::element_with_attrs(w::del(), attrs))
    }

    /// Appends a row-mark revision (`w:ins` or `w:del`) into a `w:trPr`,
    /// creating the property element when absent.
    pub fn row_mark(&mut self, tree: &mut XmlTree, tr: NodeId, deleted: bool) {
        let tr_pr = tree.find_child(tr, &w::tr_pr()).unwrap_or_else(|| {
            let children = tree.children(tr);
            match children.first() {
                Some(&first) => tree.insert_before(first, XmlData::element(w::tr_pr())),
                None => tree.add_child(tr, XmlData::element(w::tr_pr())),
            }
        });
        let attrs = self.tracking_attrs();
        let name = if deleted { w::del() } else { w::ins() };
        tree.add_child(tr_pr, XmlData::element_with_attrs(name, attrs));
    }
}

/// Creates a plain text run under `parent`, adding `xml:space="preserve"`
/// when the text has significant edge whitespace. `deleted` selects
/// `w:delText` over `w:t`.
pub fn append_text_run(
    tree: &mut XmlTree,
    parent: NodeId,
    text: &str,
    deleted: bool,
) -> NodeId {
    let run = tree.add_child(parent, XmlData::element(w::r()));
    let text_name = if deleted { w::del_text() } else { w::t() };
    let mut attrs = Vec::new();
    if text.starts_with(' ') || text.ends_with(' ') {
        attrs.push(Attr::new(
            QName::new("http://www.w3.org/XML/1998/namespace", "space"),
            "preserve",
        ));
    }
    let t = tree.add_child(run, XmlData::element_with_attrs(text_name, attrs));
    tree.add_child(t, XmlData::Text(text.to_string()));
    run
}

pub fn is_revision_tag(local: &str) -> bool {
    w::REVISION_TAGS.contains(&local)
}

/// Renumbers every revision-bearing element across the given trees with
/// fresh sequential ids starting at 1, in tree-then-document order.
pub fn fix_up_revision_ids(trees: &mut [&mut XmlTree]) {
    let mut next_id = 1i32;
    for tree in trees.iter_mut() {
        let Some(root) = tree.root() else { continue };
        let targets: Vec<NodeId> = tree
            .descendants(root)
            .into_iter()
            .filter(|&node| {
                tree.name(node)
                    .map(|name| {
                        name.ns.as_deref() == Some(w::NS)
                            && is_revision_tag(&name.local)
                            && tree.attr(node, &w::id()).is_some()
                    })
                    .unwrap_or(false)
            })
            .collect();
        for node in targets {
            tree.set_attr(node, &w::id(), &next_id.to_string());
            next_id += 1;
        }
    }
}

/// Collects every `w:id` value on revision-bearing elements, in document
/// order. Used by tests asserting uniqueness and contiguity.
pub fn revision_ids(tree: &XmlTree) -> Vec<i32> {
    let Some(root) = tree.root() else {
        return Vec::new();
    };
    tree.descendants(root)
        .into_iter()
        .filter(|&node| {
            tree.name(node)
                .map(|name| name.ns.as_deref() == Some(w::NS) && is_revision_tag(&name.local))
                .unwrap_or(false)
        })
        .filter_map(|node| tree.attr(node, &w::id())?.parse().ok())
        .collect()
}
