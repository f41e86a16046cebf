use super::arena::XmlTree;
use super::node::XmlData;
use super::xname::{Attr, QName};
use crate::error::{RedmarkError, Result};

pub const XMLNS_NS: &str = "http://www.w3.org/2000/xmlns/";

pub fn parse(xml: &str) -> Result<XmlTree> {
    parse_bytes(xml.as_bytes())
}

pub fn parse_bytes(bytes: &[u8]) -> Result<XmlTree> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| RedmarkError::malformed(format!("part is not valid UTF-8: {e}")))?;
    let doc = roxmltree::Document::parse_with_options(
        text,
        roxmltree::ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        },
    )
    .map_err(|e| {
        RedmarkError::malformed(format!("XML parse error at line {}: {}", e.pos().row, e))
    })?;

    let mut tree = XmlTree::new();
    build_tree(doc.root_element(), &mut tree, None);
    Ok(tree)
}

fn build_tree(node: roxmltree::Node, tree: &mut XmlTree, parent: Option<indextree::NodeId>) {
    let data = match node.node_type() {
        roxmltree::NodeType::Element => {
            let name = QName::new(
                node.tag_name().namespace().unwrap_or(""),
                node.tag_name().name(),
            );

            let mut attrs: Vec<Attr> = node
                .attributes()
                .map(|attr| {
                    Attr::new(
                        QName::new(attr.namespace().unwrap_or(""), attr.name()),
                        attr.value(),
                    )
                })
                .collect();

            // roxmltree separates namespace declarations from attributes;
            // fold them back in so the writer can re-emit them verbatim.
            for ns in node.namespaces() {
                if let Some(prefix) = ns.name() {
                    attrs.push(Attr::new(QName::new(XMLNS_NS, prefix), ns.uri()));
                } else {
                    attrs.push(Attr::new(QName::local("xmlns"), ns.uri()));
                }
            }

            XmlData::Element { name, attrs }
        }
        roxmltree::NodeType::Text => match node.text() {
            Some(text) => XmlData::Text(text.to_string()),
            None => return,
        },
        roxmltree::NodeType::Comment => match node.text() {
            Some(text) => XmlData::Comment(text.to_string()),
            None => return,
        },
        roxmltree::NodeType::PI => XmlData::ProcessingInstruction {
            target: node
                .pi()
                .map(|pi| pi.target.to_string())
                .unwrap_or_default(),
            data: node
                .pi()
                .and_then(|pi| pi.value.map(|s| s.to_string()))
                .unwrap_or_default(),
        },
        _ => return,
    };

    let new_id = match parent {
        Some(parent_id) => tree.add_child(parent_id, data),
        None => tree.add_root(data),
    };

    for child in node.children() {
        build_tree(child, tree, Some(new_id));
    }
}
