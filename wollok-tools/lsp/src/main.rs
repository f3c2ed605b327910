//! Wollok Language Server Binary
//!
//! Run with: `wollok-lsp [--analyzer <PROGRAM>] [--analyzer-arg <ARG>]...`
//!
//! The server communicates via stdin/stdout using the Language Server Protocol.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wollok_lsp::{run_server, Args};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stdout is the protocol channel
    let filter = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    run_server(args).await
}
