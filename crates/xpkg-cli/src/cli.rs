use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "xpkg",
    about = "Parse and classify multi-document package streams",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Parse a package and list its metadata and content objects
    Parse(ParseArgs),
    /// List the metadata kinds the parser recognizes
    Kinds,
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Package directory (or single file) to read
    pub dir: Option<PathBuf>,

    /// Backend configuration file (TOML)
    #[arg(short, long, conflicts_with_all = ["dir", "echo"])]
    pub config: Option<PathBuf>,

    /// Parse this literal text instead of reading files
    #[arg(long, conflicts_with = "dir")]
    pub echo: Option<String>,

    /// Skip files whose name matches this glob; repeatable
    #[arg(long = "skip", value_name = "PATTERN")]
    pub skip: Vec<String>,

    /// Also read files that are not .yaml or .yml
    #[arg(long)]
    pub all_files: bool,

    /// Skip empty files
    #[arg(long)]
    pub skip_empty: bool,

    /// Give up after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}
