use crate::error::Result;
use crate::xml::namespaces::pkg;
use crate::xml::{parser, Attr, QName, XmlData, XmlTree};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TargetMode {
    #[default]
    Internal,
    External,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: String,
    pub rel_type: String,
    pub target: String,
    #[serde(default)]
    pub target_mode: TargetMode,
}

impl Relationship {
    pub fn new(id: &str, rel_type: &str, target: &str) -> Self {
        Self {
            id: id.to_string(),
            rel_type: rel_type.to_string(),
            target: target.to_string(),
            target_mode: TargetMode::Internal,
        }
    }

    pub fn external(id: &str, rel_type: &str, target: &str) -> Self {
        Self {
            target_mode: TargetMode::External,
            ..Self::new(id, rel_type, target)
        }
    }

    pub fn is_internal(&self) -> bool {
        self.target_mode == TargetMode::Internal
    }
}

/// Parses a `.rels` part into its relationship list.
pub fn parse_relationships(bytes: &[u8]) -> Result<Vec<Relationship>> {
    let tree = parser::parse_bytes(bytes)?;
    let mut rels = Vec::new();
    let Some(root) = tree.root() else {
        return Ok(rels);
    };

    for child in tree.child_elements(root) {
        let Some(name) = tree.name(child) else { continue };
        if name.local != "Relationship" {
            continue;
        }
        let id = tree.attr_local(child, "Id").unwrap_or_default().to_string();
        let rel_type = tree.attr_local(child, "Type").unwrap_or_default().to_string();
        let target = tree.attr_local(child, "Target").unwrap_or_default().to_string();
        let target_mode = match tree.attr_local(child, "TargetMode") {
            Some("External") => TargetMode::External,
            _ => TargetMode::Internal,
        };
        rels.push(Relationship {
            id,
            rel_type,
            target,
            target_mode,
        });
    }

    Ok(rels)
}

/// Serializes a relationship list back to a `.rels` part.
pub fn build_relationships_tree(rels: &[Relationship]) -> XmlTree {
    let mut tree = XmlTree::new();
    let root = tree.add_root(XmlData::element_with_attrs(
        QName::new(pkg::RELATIONSHIPS_NS, "Relationships"),
        vec![Attr::new(QName::local("xmlns"), pkg::RELATIONSHIPS_NS)],
    ));

    for rel in rels {
        let mut attrs = vec![
            Attr::new(QName::local("Id"), &rel.id),
            Attr::new(QName::local("Type"), &rel.rel_type),
            Attr::new(QName::local("Target"), &rel.target),
        ];
        if rel.target_mode == TargetMode::External {
            attrs.push(Attr::new(QName::local("TargetMode"), "External"));
        }
        tree.add_child(
            root,
            XmlData::element_with_attrs(QName::new(pkg::RELATIONSHIPS_NS, "Relationship"), attrs),
        );
    }

    tree
}

/// Allocates the next unused `rId<n>` by scanning existing numeric ids.
pub fn next_relationship_id(rels: &[Relationship]) -> String {
    let max = rels
        .iter()
        .filter_map(|r| r.id.strip_prefix("rId"))
        .filter_map(|n| n.parse::<u32>().ok())
        .max()
        .unwrap_or(0);
    format!("rId{}", max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::builder;

    #[test]
    fn parse_and_rebuild_roundtrip() {
        let xml = br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/>
</Relationships>"#;

        let rels = parse_relationships(xml).unwrap();
        assert_eq!(rels.len(), 2);
        assert_eq!(rels[0].id, "rId1");
        assert!(rels[0].is_internal());
        assert_eq!(rels[1].target_mode, TargetMode::External);

        let rebuilt = builder::serialize(&build_relationships_tree(&rels)).unwrap();
        let reparsed = parse_relationships(rebuilt.as_bytes()).unwrap();
        assert_eq!(rels, reparsed);
    }

    #[test]
    fn next_id_skips_gaps_to_max_plus_one() {
        let rels = vec![
            Relationship::new("rId1", "t", "a.xml"),
            Relationship::new("rId7", "t", "b.xml"),
        ];
        assert_eq!(next_relationship_id(&rels), "rId8");
        assert_eq!(next_relationship_id(&[]), "rId1");
    }
}
