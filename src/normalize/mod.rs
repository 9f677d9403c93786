//! Flattening of API response pages into rows.
//!
//! Every endpoint returns records wrapped in an `MRData` envelope, a table object and, for standings, one more
//! list level. A [`PageShape`] declares that structure per endpoint, [`parse_page`] uses it to produce one
//! [`FlatRow`] per record, and [`decompose`] splits the nested objects declared by the shape out of those rows.

mod decompose;
mod page;
mod shape;

pub use decompose::{Decomposed, decompose};
pub use page::{Page, parse_page};
pub use shape::{NestedColumn, NestedKind, PageShape};

/// A single record as column name to scalar value.
pub type FlatRow = serde_json::Map<String, serde_json::Value>;
