use crate::error::Result;
use crate::package::OpcPackage;

/// A PresentationML package.
pub struct PmlDocument {
    package: OpcPackage,
}

impl PmlDocument {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let package = OpcPackage::open(bytes)?;
        Ok(Self { package })
    }

    pub fn from_package(package: OpcPackage) -> Self {
        Self { package }
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

    pub fn presentation_uri(&self) -> String {
        self.package
            .main_document_part()
            .unwrap_or_else(|_| "ppt/presentation.xml".to_string())
    }
}
