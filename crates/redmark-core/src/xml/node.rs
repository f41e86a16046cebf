use super::xname::{Attr, QName};

/// Node payload stored in the arena. Text and CData are first-class
/// children; whitespace-only text nodes are preserved.
#[derive(Clone, Debug)]
pub enum XmlData {
    Element { name: QName, attrs: Vec<Attr> },
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction { target: String, data: String },
}

impl XmlData {
    pub fn element(name: QName) -> Self {
        Self::Element {
            name,
            attrs: Vec::new(),
        }
    }

    pub fn element_with_attrs(name: QName, attrs: Vec<Attr>) -> Self {
        Self::Element { name, attrs }
    }

    pub fn text(content: &str) -> Self {
        Self::Text(content.to_string())
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Self::Element { .. })
    }

    pub fn name(&self) -> Option<&QName> {
        match self {
            Self::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn attrs(&self) -> Option<&[Attr]> {
        match self {
            Self::Element { attrs, .. } => Some(attrs),
            _ => None,
        }
    }

    pub fn attrs_mut(&mut self) -> Option<&mut Vec<Attr>> {
        match self {
            Self::Element { attrs, .. } => Some(attrs),
            _ => None,
        }
    }

    pub fn text_value(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::CData(s) => Some(s),
            _ => None,
        }
    }
}
