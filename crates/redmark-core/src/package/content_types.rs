use crate::error::Result;
use crate::xml::namespaces::pkg;
use crate::xml::{parser, Attr, QName, XmlData, XmlTree};
use std::collections::BTreeMap;

/// Typed view of `[Content_Types].xml`: extension defaults plus per-part
/// overrides. Kept sorted so the saved part is deterministic.
#[derive(Debug, Clone, Default)]
pub struct ContentTypes {
    defaults: BTreeMap<String, String>,
    overrides: BTreeMap<String, String>,
}

impl ContentTypes {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let tree = parser::parse_bytes(bytes)?;
        let mut types = Self::default();
        let Some(root) = tree.root() else {
            return Ok(types);
        };

        for child in tree.child_elements(root) {
            let Some(name) = tree.name(child) else { continue };
            match name.local.as_str() {
                "Default" => {
                    if let (Some(ext), Some(ct)) = (
                        tree.attr_local(child, "Extension"),
                        tree.attr_local(child, "ContentType"),
                    ) {
                        types.defaults.insert(ext.to_ascii_lowercase(), ct.to_string());
                    }
                }
                "Override" => {
                    if let (Some(part), Some(ct)) = (
                        tree.attr_local(child, "PartName"),
                        tree.attr_local(child, "ContentType"),
                    ) {
                        types
                            .overrides
                            .insert(part.trim_start_matches('/').to_string(), ct.to_string());
                    }
                }
                _ => {}
            }
        }

        Ok(types)
    }

    pub fn to_tree(&self) -> XmlTree {
        let mut tree = XmlTree::new();
        let root = tree.add_root(XmlData::element_with_attrs(
            QName::new(pkg::CONTENT_TYPES_NS, "Types"),
            vec![Attr::new(QName::local("xmlns"), pkg::CONTENT_TYPES_NS)],
        ));

        for (ext, ct) in &self.defaults {
            tree.add_child(
                root,
                XmlData::element_with_attrs(
                    QName::new(pkg::CONTENT_TYPES_NS, "Default"),
                    vec![
                        Attr::new(QName::local("Extension"), ext),
                        Attr::new(QName::local("ContentType"), ct),
                    ],
                ),
            );
        }
        for (part, ct) in &self.overrides {
            tree.add_child(
                root,
                XmlData::element_with_attrs(
                    QName::new(pkg::CONTENT_TYPES_NS, "Override"),
                    vec![
                        Attr::new(QName::local("PartName"), &format!("/{}", part)),
                        Attr::new(QName::local("ContentType"), ct),
                    ],
                ),
            );
        }

        tree
    }

    pub fn content_type_of(&self, part: &str) -> Option<&str> {
        let part = part.trim_start_matches('/');
        if let Some(ct) = self.overrides.get(part) {
            return Some(ct);
        }
        let ext = part.rsplit('.').next()?.to_ascii_lowercase();
        self.defaults.get(&ext).map(String::as_str)
    }

    pub fn has_default_for(&self, part: &str) -> bool {
        part.rsplit('.')
            .next()
            .map(|ext| self.defaults.contains_key(&ext.to_ascii_lowercase()))
            .unwrap_or(false)
    }

    /// Registers an Override unless the extension already carries a Default
    /// with the same type.
    pub fn ensure(&mut self, part: &str, content_type: &str) {
        let part = part.trim_start_matches('/');
        if self.content_type_of(part) == Some(content_type) {
            return;
        }
        self.overrides.insert(part.to_string(), content_type.to_string());
    }

    pub fn add_default(&mut self, extension: &str, content_type: &str) {
        self.defaults
            .insert(extension.to_ascii_lowercase(), content_type.to_string());
    }

    pub fn remove_override(&mut self, part: &str) {
        self.overrides.remove(part.trim_start_matches('/'));
    }
}
