//! Remote text retrieval for CI console logs.
//!
//! Provides the [`TextFetcher`] seam used by the notification pipeline, its
//! reqwest-backed implementation, and the indirection step that turns a
//! "latest build" document into the console log URL.

pub mod log_url;
pub mod text_fetcher;

pub use log_url::{format_log_url, resolve_log_url, LOG_URL_PLACEHOLDER};
pub use text_fetcher::{FetchError, HttpTextFetcher, TextFetcher};
