use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "image-handler")]
#[command(author, version, about = "On-the-fly image transformation service")]
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
    /// Start the HTTP server
    Start {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Apply an action chain to a local image
    Process {
        /// Source image
        #[arg(required = true)]
        input: PathBuf,

        /// Chain such as "image/resize,w_100/quality,q_80"
        #[arg(required = true)]
        chain: String,

        /// Where to write the result (defaults to stdout for info chains)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the registered actions
    Actions,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses --config if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
