//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};

/// Converts React class components into hook-based function components.
#[derive(Debug, Parser)]
#[command(name = "hookify")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Working directory; relative input, output and config paths resolve against it
    #[arg(long, default_value = ".")]
    pub workspace: Utf8PathBuf,

    /// Path to a config file (defaults to hookify.json in the workspace)
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Directory containing class components [default: src/components/class]
    #[arg(long)]
    pub input: Option<Utf8PathBuf>,

    /// Directory receiving function components [default: src/components/functional]
    #[arg(long)]
    pub output: Option<Utf8PathBuf>,

    /// File extensions to convert (comma-separated) [default: js,jsx]
    #[arg(long, value_delimiter = ',')]
    pub extensions: Vec<String>,

    /// Glob patterns to ignore, relative to the input directory
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Instance receiver keyword to rewrite (repeatable) [default: this, self]
    #[arg(long = "receiver")]
    pub receivers: Vec<String>,

    /// Descend into subdirectories of the input directory
    #[arg(long)]
    pub recursive: bool,

    /// Keep previously generated files in the output directory
    #[arg(long = "no-clean")]
    pub no_clean: bool,

    /// Convert well-known component names structurally instead of using fixed outputs
    #[arg(long = "no-special-cases")]
    pub no_special_cases: bool,

    /// Print generated code instead of writing files
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Report format
    #[arg(long, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Exit with an error code when any file fails to convert
    #[arg(long = "fail-on-error")]
    pub fail_on_error: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Report format options.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output
    Json,
}
