use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliPostMode {
    /// Reply inside the thread started today; fail when none exists.
    Thread,
    /// Post a new top-level channel message.
    Channel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CliDryRunFormat {
    Text,
    Json,
}
