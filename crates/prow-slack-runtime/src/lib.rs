//! Slack delivery runtime for CI result notifications.
//!
//! Locates the day's notification thread in a channel and posts replies into
//! it through the Slack Web API, validating every acknowledgment.

pub mod slack_runtime;

pub use slack_runtime::*;
