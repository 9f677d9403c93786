//! Incremental synchronization of the stored tables with the API.
//!
//! Each cycle re-fetches a bounded window of recent data rather than everything: the last few seasons of
//! races, and the standings of every race from shortly before the newest stored standings up to the newest
//! standings the API has. Fetched rows are merged with last-write-wins semantics, so re-fetching data that
//! did not change leaves the tables as they were.

mod engine;
mod window;

pub use engine::{StandingsTable, SyncEngine, SyncOptions};
pub use window::race_window;
