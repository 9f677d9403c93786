//! Configuration for the sync engine, the API client and the image job.

mod config;

pub use config::{Config, DEFAULT_CONFIG_TOML};
