//! f1db crate
//!
//! Keeps a local, CSV-backed snapshot of Formula 1 history (races, circuits, drivers, constructors and
//! championship standings) in sync with the Jolpica/Ergast API, and exposes the derived views used by the
//! image enrichment job.

/// Result type alias using `ohno::AppError` as the default error type.
pub type Result<T, E = ohno::AppError> = core::result::Result<T, E>;

#[doc(hidden)]
pub mod api;

#[doc(hidden)]
pub mod config;

#[doc(hidden)]
pub mod images;

#[doc(hidden)]
pub mod normalize;

#[doc(hidden)]
pub mod sync;

#[doc(hidden)]
pub mod tables;
