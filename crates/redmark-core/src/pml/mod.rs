mod canonicalize;
mod comparer;
mod diff;
mod document;
mod markup;
mod settings;
mod shape_match;
mod signatures;
mod slide_match;
mod types;

pub use comparer::PmlComparer;
pub use document::PmlDocument;
pub use settings::PmlComparerSettings;
pub use signatures::{
    ParagraphSignature, Placeholder, PresentationSignature, RunProperties, RunSignature,
    ShapeKind, ShapeSignature, SlideSignature, TextBodySignature, Transform,
};
pub use types::{PmlChange, PmlChangeType, PmlComparisonResult};
