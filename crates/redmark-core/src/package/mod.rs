pub mod content_types;
pub mod opc;
pub mod relationships;
pub mod uri;

pub use content_types::ContentTypes;
pub use opc::OpcPackage;
pub use relationships::{Relationship, TargetMode};
