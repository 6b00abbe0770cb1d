use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Verify annotated TypeScript code samples in markdown content.
#[derive(Debug, Parser)]
#[command(name = "twoslash-verify", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Type-check every twoslash-annotated code block under the content
    /// directory and fail on any error.
    Verify(VerifyArgs),
}

#[derive(Debug, Args)]
pub struct VerifyArgs {
    /// Project root directory.
    #[arg(long, default_value = ".")]
    pub root_dir: PathBuf,

    /// Build output directory holding generated configs and type
    /// declarations [default: <root>/.nuxt].
    #[arg(long)]
    pub build_dir: Option<PathBuf>,

    /// Directory scanned for markdown documents [default: <root>/content].
    #[arg(long)]
    pub content_dir: Option<PathBuf>,

    /// Comma-separated additional fence languages to accept (highlight-only,
    /// not type-checked).
    #[arg(long)]
    pub languages: Option<String>,

    /// Read project configuration and type declarations from the build
    /// directory.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub resolve_project: bool,

    /// Re-verify changed files until cancelled.
    #[arg(long)]
    pub watch: bool,

    /// TypeScript compiler executable.
    #[arg(long, default_value = "tsc")]
    pub compiler: String,
}
