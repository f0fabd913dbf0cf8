use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mediacook")]
#[command(author, version, about = "Turns uploaded media into web-ready encodings")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process a single file through its content type's recipe
    Process {
        /// Input file to process
        #[arg(required = true)]
        input: PathBuf,

        /// Content type key (e.g. "video", "image/png")
        #[arg(long = "type", value_name = "CONTENT_KEY")]
        content_type: String,

        /// Object hash to store artifacts under (derived from the file if omitted)
        #[arg(long)]
        hash: Option<String>,

        /// Run the sync phase only
        #[arg(long)]
        sync_only: bool,
    },

    /// Print the compression rate of an object's artifacts
    Rate {
        /// The original file to compare against
        #[arg(required = true)]
        original: PathBuf,

        /// Content type key used to pick the recipe
        #[arg(long = "type", value_name = "CONTENT_KEY")]
        content_type: String,

        /// Object hash the artifacts are stored under
        #[arg(long)]
        hash: String,
    },

    /// Show which recipe handles a content type
    Resolve {
        /// Content type key
        content_key: String,
    },

    /// Probe a media file's streams and display them
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
