mod canonicalize;
mod change_list;
mod comparer;
mod diff;
mod document;
mod markup;
mod settings;
mod signatures;
mod styles;
mod types;

pub use change_list::{build_change_list, SmlChangeListItem};
pub use comparer::SmlComparer;
pub use document::SmlDocument;
pub use settings::SmlComparerSettings;
pub use signatures::CellFormatSignature;
pub use types::{SmlChange, SmlChangeType, SmlComparisonResult};
