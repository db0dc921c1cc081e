//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `extract`: Locate Chinese literals, rewrite them to lookup references
//!   and update the catalog
//! - `init`: Initialize a kiwi-config.json configuration file

use clap::{Args, Parser, Subcommand};

use crate::rewrite::LOOKUP;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct ExtractCommand {
    /// Target: a directory, or a comma-separated list of files
    #[arg(default_value = "./")]
    pub target: String,

    /// Key prefix overriding the path-derived suggestion
    /// (a leading "I18N." segment is stripped)
    #[arg(long)]
    pub prefix: Option<String>,

    /// Also extract from .html files
    #[arg(long)]
    pub html: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl ExtractCommand {
    /// The effective prefix with the lookup-symbol segment stripped.
    pub fn normalized_prefix(&self) -> Option<String> {
        self.prefix.as_ref().map(|p| {
            p.strip_prefix(&format!("{}.", LOOKUP))
                .unwrap_or(p)
                .to_string()
        })
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract Chinese literals and rewrite them to I18N references
    Extract(ExtractCommand),
    /// Initialize a new kiwi-config.json configuration file
    Init,
}
