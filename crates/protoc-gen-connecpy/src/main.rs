//! `protoc-gen-connecpy`
//!
//! Usage: `protoc --connecpy_out=. --connecpy_opt=suffix=_connecpy.py foo.proto`
//! (or a `buf.gen.yaml` plugin entry). Logs go to stderr; stdout carries the
//! plugin response.

use std::io;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    protoc_gen_connecpy::run_plugin(io::stdin().lock(), io::stdout().lock())
}
