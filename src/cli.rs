use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "staffline")]
#[command(author, version, about = "Optical music recognition service (sheet music to MusicXML)")]
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
    /// Start the HTTP conversion service
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Convert a single document without starting the server
    Convert {
        /// Input image or PDF
        #[arg(required = true)]
        input: PathBuf,

        /// Where to write the MusicXML (defaults to the input path with a
        /// .musicxml extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a configuration file
    Validate {
        /// Config file to validate (uses --config if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
