//! qrdrop CLI - share one file on the local network
//!
//! Serves a single file over HTTP and prints a link plus a QR code that a
//! phone on the same network can scan to download it.
//!
//! ## Quick Start
//!
//! ```bash
//! qrdrop --file ./video.mp4
//! qrdrop -f ./video.mp4 -p 9000
//! ```

#![allow(clippy::doc_markdown)]

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

mod commands;
pub mod ui;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    commands::serve::run(cli).await
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let default_filter = if verbose {
        "warn,qrdrop=debug,qrdrop_core=debug"
    } else {
        "warn,qrdrop=info,qrdrop_core=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}
