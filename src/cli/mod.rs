pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "goa-diary")]
#[command(about = "Goa Diary headlines in the terminal", long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.config/goa-diary/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Preference database (default: <data dir>/goa-diary/preferences.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List every source in display order
    Sources,
    /// Show one page of headlines for a source
    Headlines {
        /// Source name as listed by `sources`
        name: String,

        /// Page number, starting at 0
        #[arg(short, long, default_value_t = 0)]
        page: u32,

        /// Print share text instead of the headline list
        #[arg(long)]
        share: bool,
    },
    /// First page of every enabled source
    Digest,
    /// Always show a source
    Enable {
        name: String,
    },
    /// Never show a source
    Disable {
        name: String,
    },
    /// Forget every enable/disable choice
    Clear,
    /// Print the contact and subscribe links
    Links,
    /// Launch the TUI
    Tui,
}
