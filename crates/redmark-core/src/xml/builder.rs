use super::arena::XmlTree;
use super::node::XmlData;
use super::parser::XMLNS_NS;
use crate::error::{RedmarkError, Result};
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::collections::HashMap;
use std::io::Cursor;

/// Serializes the tree with a stable XML 1.0 / UTF-8 declaration.
pub fn serialize(tree: &XmlTree) -> Result<String> {
    let bytes = serialize_bytes(tree)?;
    String::from_utf8(bytes).map_err(|e| RedmarkError::internal("xml-utf8", e.to_string()))
}

pub fn serialize_bytes(tree: &XmlTree) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));

    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
        .map_err(write_err)?;

    if let Some(root) = tree.root() {
        let mut ns_map = NamespaceMap::new();
        if let Some(attrs) = tree.get(root).and_then(XmlData::attrs) {
            extend_namespace_map(&mut ns_map, attrs);
        }
        write_node(tree, root, &mut writer, &ns_map)?;
    }

    Ok(writer.into_inner().into_inner())
}

/// Serializes a single subtree without a declaration; used for hashing
/// element content (backgrounds, geometries, chart parts).
pub fn serialize_fragment(tree: &XmlTree, node: indextree::NodeId) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    let mut ns_map = NamespaceMap::new();
    if let Some(attrs) = tree.get(node).and_then(XmlData::attrs) {
        extend_namespace_map(&mut ns_map, attrs);
    }
    write_node(tree, node, &mut writer, &ns_map)?;
    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| RedmarkError::internal("xml-utf8", e.to_string()))
}

fn write_err<E: std::fmt::Display>(e: E) -> RedmarkError {
    RedmarkError::internal("xml-write", e.to_string())
}

/// Maps namespace URI -> prefix ("" means default namespace).
type NamespaceMap = HashMap<String, String>;

fn extend_namespace_map(ns_map: &mut NamespaceMap, attrs: &[super::xname::Attr]) {
    for attr in attrs {
        let Some(ns) = &attr.name.ns else {
            if attr.name.local == "xmlns" {
                ns_map.entry(attr.value.clone()).or_insert_with(String::new);
            }
            continue;
        };
        if ns == XMLNS_NS {
            ns_map
                .entry(attr.value.clone())
                .or_insert_with(|| attr.name.local.clone());
        }
    }
}

fn prefix_for_element<'a>(namespace: &str, ns_map: &'a NamespaceMap) -> &'a str {
    match ns_map.get(namespace) {
        Some(prefix) => prefix.as_str(),
        None => fallback_prefix(namespace),
    }
}

fn prefix_for_attribute<'a>(namespace: &str, ns_map: &'a NamespaceMap) -> &'a str {
    if namespace == XMLNS_NS {
        return "xmlns";
    }
    // Attributes never take the default namespace; an empty prefix would
    // silently move them out of their namespace.
    match ns_map.get(namespace) {
        Some(prefix) if !prefix.is_empty() => prefix.as_str(),
        _ => fallback_prefix(namespace),
    }
}

fn write_node<W: std::io::Write>(
    tree: &XmlTree,
    node: indextree::NodeId,
    writer: &mut Writer<W>,
    ns_map: &NamespaceMap,
) -> Result<()> {
    let Some(data) = tree.get(node) else {
        return Ok(());
    };

    match data {
        XmlData::Element { name, attrs } => {
            let mut scoped = ns_map.clone();
            extend_namespace_map(&mut scoped, attrs);

            let tag = match &name.ns {
                Some(ns) => {
                    let prefix = prefix_for_element(ns, &scoped);
                    if prefix.is_empty() {
                        name.local.clone()
                    } else {
                        format!("{}:{}", prefix, name.local)
                    }
                }
                None => name.local.clone(),
            };

            let mut elem = BytesStart::new(&tag);
            for attr in attrs {
                let attr_name = match &attr.name.ns {
                    Some(ns) => {
                        let prefix = prefix_for_attribute(ns, &scoped);
                        if prefix.is_empty() {
                            attr.name.local.clone()
                        } else {
                            format!("{}:{}", prefix, attr.name.local)
                        }
                    }
                    None => attr.name.local.clone(),
                };
                elem.push_attribute((attr_name.as_str(), attr.value.as_str()));
            }

            let children = tree.children(node);
            if children.is_empty() {
                writer.write_event(Event::Empty(elem)).map_err(write_err)?;
            } else {
                writer.write_event(Event::Start(elem)).map_err(write_err)?;
                for child in children {
                    write_node(tree, child, writer, &scoped)?;
                }
                writer
                    .write_event(Event::End(BytesEnd::new(&tag)))
                    .map_err(write_err)?;
            }
        }
        XmlData::Text(text) => {
            writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(write_err)?;
        }
        XmlData::CData(text) => {
            writer
                .write_event(Event::CData(BytesCData::new(text)))
                .map_err(write_err)?;
        }
        XmlData::Comment(text) => {
            writer
                .write_event(Event::Comment(BytesText::new(text)))
                .map_err(write_err)?;
        }
        XmlData::ProcessingInstruction { target, data } => {
            let content = if data.is_empty() {
                target.clone()
            } else {
                format!("{} {}", target, data)
            };
            writer
                .write_event(Event::PI(BytesPI::new(&content)))
                .map_err(write_err)?;
        }
    }

    Ok(())
}

fn fallback_prefix(namespace: &str) -> &'static str {
    match namespace {
        "http://schemas.openxmlformats.org/wordprocessingml/2006/main" => "w",
        "http://schemas.openxmlformats.org/spreadsheetml/2006/main" => "x",
        "http://schemas.openxmlformats.org/presentationml/2006/main" => "p",
        "http://schemas.openxmlformats.org/drawingml/2006/main" => "a",
        "http://schemas.openxmlformats.org/drawingml/2006/chart" => "c",
        "http://schemas.openxmlformats.org/officeDocument/2006/relationships" => "r",
        "http://schemas.openxmlformats.org/markup-compatibility/2006" => "mc",
        "http://www.w3.org/2000/xmlns/" => "xmlns",
        "http://www.w3.org/XML/1998/namespace" => "xml",
        _ => "ns",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::xname::QName;

    #[test]
    fn serialize_simple_document() {
        let mut tree = XmlTree::new();
        let root = tree.add_root(XmlData::element(QName::local("root")));
        tree.add_child(root, XmlData::text("content"));

        let xml = serialize(&tree).unwrap();
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>"));
        assert!(xml.contains("<root>content</root>"));
    }

    #[test]
    fn serialize_empty_element_self_closes() {
        let mut tree = XmlTree::new();
        tree.add_root(XmlData::element(QName::local("empty")));
        assert!(serialize(&tree).unwrap().contains("<empty/>"));
    }

    #[test]
    fn roundtrip_preserves_prefixes_and_attr_order() {
        let xml = r#"<w:p xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:r><w:t xml:space="preserve"> hi </w:t></w:r></w:p>"#;
        let tree = crate::xml::parser::parse(xml).unwrap();
        let out = serialize(&tree).unwrap();
        assert!(out.contains("<w:p"));
        assert!(out.contains("xml:space=\"preserve\""));
        assert!(out.contains("> hi <"));
    }

    #[test]
    fn roundtrip_is_stable() {
        let xml = r#"<root b="2" a="1"><child/>text</root>"#;
        let once = serialize(&crate::xml::parser::parse(xml).unwrap()).unwrap();
        let twice = serialize(&crate::xml::parser::parse(&once).unwrap()).unwrap();
        assert_eq!(once, twice);
    }
}
