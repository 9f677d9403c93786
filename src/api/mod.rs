//! Access to the Jolpica (Ergast-compatible) Formula 1 API.
//!
//! [`F1Api`] is the seam between the sync engine and the network: the engine only ever asks for single pages
//! and paginates itself, so tests can substitute an in-memory implementation.

mod client;
mod endpoint;
mod resilient_http;

pub use client::JolpicaClient;
pub use endpoint::{Endpoint, PageRequest, Scope};
pub(crate) use resilient_http::resilient_get;

use crate::Result;
use serde_json::Value;

/// A source of raw API response pages.
pub trait F1Api {
    /// Fetches one page and returns its JSON body.
    fn get_page(&self, request: &PageRequest) -> impl Future<Output = Result<Value>>;
}
