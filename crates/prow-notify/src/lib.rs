//! One-shot CI summary notifier.
//!
//! Fetches a Prow console log through its indirection document, extracts the
//! job result, and posts reportable results into today's Slack thread.

pub mod notify_pipeline;
pub mod pipeline_config;

pub use notify_pipeline::{run_notify_pipeline, PipelineOutcome};
pub use pipeline_config::{DeliveryConfig, DryRunFormat, PipelineConfig, PipelineMode, PostMode};
