//! Typed tables and the store that owns them.
//!
//! Every persisted table is a flat collection of uniquely keyed records. A [`Table`] is an immutable snapshot
//! kept sorted by its record key; merging a batch of freshly fetched records consumes the snapshot and produces
//! a replacement in which the last occurrence of every key wins.
//!
//! The [`TableStore`] owns the current snapshot of each table and moves them to and from one CSV file per table.
//! Which file backs which table, and how far back each table is re-fetched, is declared by the [`Catalog`].

mod catalog;
mod lenient;
mod record;
mod rows;
mod store;
mod table;
mod views;

pub use catalog::{Catalog, TableDef, TableId};
pub use lenient::{float, integer, optional_integer};
pub use record::Record;
pub use rows::{Circuit, Constructor, ConstructorStanding, Driver, DriverStanding, Race, RaceRef, Standing};
pub use store::{DanglingReference, Stored, TableStore};
pub use table::Table;
