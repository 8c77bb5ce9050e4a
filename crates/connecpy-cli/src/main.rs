//! Connecpy CLI
//!
//! Offline driver for stub generation:
//! - Generating `_connecpy.py` modules from a descriptor set on disk
//! - Inspecting the resolved model (symbols, imports) as JSON
//!
//! Descriptor sets come from `buf build -o descriptor.json` (JSON) or
//! `buf build -o descriptor.binpb` / `protoc --descriptor_set_out` (binary).

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod generate;

#[derive(Parser)]
#[command(name = "connecpy")]
#[command(author, version, about = "Generate connecpy service stubs from protobuf descriptors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate stub modules for files in a descriptor set.
    Generate {
        /// Descriptor set (`.json` for Buf JSON, anything else is read as binary).
        descriptor: PathBuf,
        /// Output directory; generated paths mirror the `.proto` paths.
        #[arg(short, long)]
        out: PathBuf,
        /// Files to generate (default: every file that declares a service).
        #[arg(long = "file")]
        files: Vec<String>,
        /// Generated file suffix (same as the plugin `suffix=` parameter).
        #[arg(long)]
        suffix: Option<String>,
    },

    /// Print the resolved model (imports, symbols) as JSON.
    Inspect {
        /// Descriptor set (`.json` for Buf JSON, anything else is read as binary).
        descriptor: PathBuf,
        /// Files to inspect (default: every file that declares a service).
        #[arg(long = "file")]
        files: Vec<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate {
            descriptor,
            out,
            files,
            suffix,
        } => generate::cmd_generate(&descriptor, &out, &files, suffix.as_deref()),
        Commands::Inspect { descriptor, files } => generate::cmd_inspect(&descriptor, &files),
    }
}
