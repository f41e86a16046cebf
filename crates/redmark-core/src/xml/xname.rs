use std::fmt;

/// Namespace-qualified name for elements and attributes.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QName {
    pub ns: Option<String>,
    pub local: String,
}

impl QName {
    pub fn new(ns: &str, local: &str) -> Self {
        Self {
            ns: if ns.is_empty() {
                None
            } else {
                Some(ns.to_string())
            },
            local: local.to_string(),
        }
    }

    pub fn local(local: &str) -> Self {
        Self {
            ns: None,
            local: local.to_string(),
        }
    }

    pub fn matches(&self, ns: &str, local: &str) -> bool {
        self.local == local && self.ns.as_deref() == Some(ns)
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ns {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

/// A single attribute; order within an element is preserved on write.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attr {
    pub name: QName,
    pub value: String,
}

impl Attr {
    pub fn new(name: QName, value: &str) -> Self {
        Self {
            name,
            value: value.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn qualified_name_displays_in_expanded_form() {
        let name = QName::new("http://example.com", "body");
        assert_eq!(name.to_string(), "{http://example.com}body");
    }

    #[test]
    fn unqualified_name_displays_local_only() {
        assert_eq!(QName::local("count").to_string(), "count");
    }

    #[test]
    fn matches_requires_namespace_and_local() {
        let name = QName::new("http://example.com", "p");
        assert!(name.matches("http://example.com", "p"));
        assert!(!name.matches("http://other.com", "p"));
        assert!(!name.matches("http://example.com", "r"));
    }
}
