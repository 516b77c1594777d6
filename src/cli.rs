use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "attachforge")]
#[command(author, version, about = "Record file attachments with resized image styles")]
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
    /// Check which imaging backends are available
    CheckBackends,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        #[arg(value_name = "CONFIG")]
        file: Option<PathBuf>,
    },

    /// Print the rendered path template for a record
    Path {
        #[command(flatten)]
        target: Target,

        /// Value for the :custom token
        #[arg(long)]
        custom: Option<String>,
    },

    /// Store a file as a record's attachment and generate its styles
    Attach {
        #[command(flatten)]
        target: Target,

        /// File to attach (copied, the original is left in place)
        #[arg(required = true)]
        file: PathBuf,

        /// Name to store the upload under (defaults to the file's name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Show a record's attachment
    Show {
        #[command(flatten)]
        target: Target,

        /// Show a style variant instead of the stored file
        #[arg(long)]
        style: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Delete a record's attachment and all of its styles
    Detach {
        #[command(flatten)]
        target: Target,
    },

    /// Resize a single image
    Resize {
        /// Image to resize
        #[arg(required = true)]
        input: PathBuf,

        /// Where to write the result
        #[arg(required = true)]
        output: PathBuf,

        /// Size spec such as 150x75, or !100x60 for exact dimensions
        #[arg(short, long)]
        size: String,

        /// Backend to use (auto, raster, magick)
        #[arg(long, default_value = "auto")]
        backend: String,
    },

    /// Display version information
    Version,
}

/// The record and attachment a command works on.
#[derive(clap::Args)]
pub struct Target {
    /// JSON record file
    #[arg(short, long)]
    pub record: PathBuf,

    /// Attachment name from the config file
    #[arg(short, long, default_value = "default")]
    pub attachment: String,
}
