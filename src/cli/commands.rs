use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "flatpages")]
#[command(
    author,
    version,
    about = "Flat-file pages with front matter, loaded and rendered on demand"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file (searches upward for .flatpages.yml by default)
    #[arg(long, global = true, env = "FLATPAGES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Page root directory (overrides config)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write JSON logs to this file (rotated daily)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new flatpages project in the current directory
    Init {
        /// Page root directory, relative to the project
        #[arg(long, default_value = "pages")]
        pages_dir: String,

        /// Accepted page extension(s), comma separated
        #[arg(short, long, default_value = ".html")]
        extension: String,
    },

    /// List all pages
    #[command(visible_alias = "ls")]
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a page's metadata and body
    Show {
        /// Logical page path, e.g. blog/hello
        path: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print a page's rendered output
    Render {
        /// Logical page path
        path: String,
    },

    /// Load every page and report the first error
    Check,

    /// Create or overwrite a page
    #[command(visible_alias = "create")]
    New {
        /// Logical page path
        path: String,

        /// Front matter in the syntax of the page's extension
        #[arg(short, long)]
        meta: Option<String>,

        /// Body content (use '-' to read from stdin)
        #[arg(short = 'd', long)]
        body: Option<String>,
    },

    /// Delete a page
    #[command(visible_alias = "rm")]
    Delete {
        /// Logical page path
        path: String,

        /// Skip confirmation
        #[arg(short, long)]
        force: bool,
    },
}
