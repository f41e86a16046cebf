mod accept;
mod canonicalize;
mod comparer;
mod diff;
mod document;
mod markup;
mod revision;
mod settings;
mod tokenize;
mod types;

pub use accept::{accept_revisions, reject_revisions};
pub use canonicalize::{collect_units, paragraph_text, row_text, ComparisonUnit, UnitKind};
pub use comparer::{extract_all_text, WmlComparer};
pub use diff::{count_word_revisions, ParaEdit};
pub use document::{find_body, Region, WmlDocument, WmlSource};
pub use revision::{fix_up_revision_ids, revision_ids, RevisionContext};
pub use settings::WmlComparerSettings;
pub use tokenize::{is_structural_token, join_tokens, tokenize, Token};
pub use types::{WmlChange, WmlChangeType, WmlComparisonResult};
