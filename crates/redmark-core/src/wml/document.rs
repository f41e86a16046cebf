use crate::error::{RedmarkError, Result};
use crate::package::OpcPackage;
use crate::xml::namespaces::{rel_type, w};
use crate::xml::XmlTree;
use indextree::NodeId;

/// A WordprocessingML package plus the part URIs the comparer works with.
pub struct WmlDocument {
    package: OpcPackage,
}

impl WmlDocument {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let package = OpcPackage::open(bytes)?;
        Ok(Self { package })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.package.save()
    }

    pub fn package(&self) -> &OpcPackage {
        &self.package
    }

    pub fn package_mut(&mut self) -> &mut OpcPackage {
        &mut self.package
    }

    /// Main document part, resolved through the package root relationship
    /// with the conventional path as fallback.
    pub fn main_part_uri(&self) -> String {
        self.package
            .main_document_part()
            .unwrap_or_else(|_| "word/document.xml".to_string())
    }

    pub fn footnotes_uri(&self) -> Option<String> {
        let main = self.main_part_uri();
        self.package
            .relationship_of_type(&main, rel_type::FOOTNOTES)
            .map(|rel| crate::package::uri::resolve(&main, &rel.target))
            .or_else(|| {
                self.package
                    .has_part("word/footnotes.xml")
                    .then(|| "word/footnotes.xml".to_string())
            })
    }

    pub fn endnotes_uri(&self) -> Option<String> {
        let main = self.main_part_uri();
        self.package
            .relationship_of_type(&main, rel_type::ENDNOTES)
            .map(|rel| crate::package::uri::resolve(&main, &rel.target))
            .or_else(|| {
                self.package
                    .has_part("word/endnotes.xml")
                    .then(|| "word/endnotes.xml".to_string())
            })
    }
}

/// Which part of the document a comparison unit belongs to. Units are
/// collected body first, then footnotes, then endnotes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Region {
    Body,
    Footnote(String),
    Endnote(String),
}

impl Region {
    pub fn label(&self) -> String {
        match self {
            Region::Body => "body".to_string(),
            Region::Footnote(id) => format!("footnote:{id}"),
            Region::Endnote(id) => format!("endnote:{id}"),
        }
    }
}

/// Parsed trees of the parts that contribute comparison units, with prior
/// tracked revisions already accepted.
pub struct WmlSource {
    pub main_uri: String,
    pub doc: XmlTree,
    pub footnotes_uri: Option<String>,
    pub footnotes: Option<XmlTree>,
    pub endnotes_uri: Option<String>,
    pub endnotes: Option<XmlTree>,
}

impl WmlSource {
    pub fn load(document: &WmlDocument) -> Result<Self> {
        let main_uri = document.main_part_uri();
        let mut doc = document.package().xml_part(&main_uri)?;
        super::accept::accept_revisions(&mut doc);

        let footnotes_uri = document.footnotes_uri();
        let footnotes = match &footnotes_uri {
            Some(uri) => {
                let mut tree = document.package().xml_part(uri)?;
                super::accept::accept_revisions(&mut tree);
                Some(tree)
            }
            None => None,
        };

        let endnotes_uri = document.endnotes_uri();
        let endnotes = match &endnotes_uri {
            Some(uri) => {
                let mut tree = document.package().xml_part(uri)?;
                super::accept::accept_revisions(&mut tree);
                Some(tree)
            }
            None => None,
        };

        Ok(Self {
            main_uri,
            doc,
            footnotes_uri,
            footnotes,
            endnotes_uri,
            endnotes,
        })
    }

    pub fn tree(&self, region: &Region) -> Option<&XmlTree> {
        match region {
            Region::Body => Some(&self.doc),
            Region::Footnote(_) => self.footnotes.as_ref(),
            Region::Endnote(_) => self.endnotes.as_ref(),
        }
    }

    pub fn part_uri(&self, region: &Region) -> Option<&str> {
        match region {
            Region::Body => Some(&self.main_uri),
            Region::Footnote(_) => self.footnotes_uri.as_deref(),
            Region::Endnote(_) => self.endnotes_uri.as_deref(),
        }
    }
}

pub fn find_body(tree: &XmlTree) -> Result<NodeId> {
    let root = tree
        .root()
        .ok_or_else(|| RedmarkError::malformed("empty document part"))?;
    tree.find_descendant(root, &w::body())
        .ok_or_else(|| RedmarkError::malformed("document part has no w:body"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_labels() {
        assert_eq!(Region::Body.label(), "body");
        assert_eq!(Region::Footnote("2".to_string()).label(), "footnote:2");
        assert_eq!(Region::Endnote("3".to_string()).label(), "endnote:3");
    }

    #[test]
    fn find_body_rejects_non_wml() {
        let tree = crate::xml::parser::parse("<root/>").unwrap();
        assert!(find_body(&tree).is_err());
    }
}
