use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Validate the Gateway API example resources used by the docs site.
#[derive(Debug, Parser)]
#[command(name = "validate-content", version)]
pub struct Cli {
    /// Directory holding one sub-directory per example category.
    #[arg(env = "EXAMPLES_DIR", default_value = "content/examples")]
    pub examples_dir: PathBuf,

    /// Output format for the report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
