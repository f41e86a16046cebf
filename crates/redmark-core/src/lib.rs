//! Semantic comparison and redlining of OOXML documents.
//!
//! Three comparers share one pattern: a canonicalizer resolves every
//! indirection in the package (shared strings, style tables, relationship
//! targets, embedded images) into a position-indexed signature; an
//! LCS-based matcher aligns the two signatures; a diff engine walks the
//! aligned pair into typed change records and, on request, a markup
//! renderer expresses them in an output package — tracked revisions for
//! word documents, highlights/comments/summary artifacts for workbooks
//! and presentations.

pub mod cancel;
pub mod error;
pub mod hash;
pub mod lcs;
pub mod package;
pub mod pml;
pub mod sml;
pub mod util;
pub mod wml;
pub mod xml;

pub use cancel::CancelToken;
pub use error::{RedmarkError, Result};

pub use wml::{WmlComparer, WmlComparerSettings, WmlComparisonResult, WmlDocument};

pub use sml::{SmlComparer, SmlComparerSettings, SmlComparisonResult, SmlDocument};

pub use pml::{PmlComparer, PmlComparerSettings, PmlComparisonResult, PmlDocument};
