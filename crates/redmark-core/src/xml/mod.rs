pub mod arena;
pub mod builder;
pub mod namespaces;
pub mod node;
pub mod parser;
pub mod xname;

pub use arena::{copy_subtree, XmlTree};
pub use node::XmlData;
pub use xname::{Attr, QName};
