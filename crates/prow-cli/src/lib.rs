//! CLI argument models for the prow-notify binary.
//!
//! Every flag can also be supplied through its `PROW_NOTIFY_*` environment
//! variable so scheduled CI jobs can configure runs without arguments.

pub mod cli_args;
pub mod cli_types;

pub use cli_args::Cli;
pub use cli_types::*;
