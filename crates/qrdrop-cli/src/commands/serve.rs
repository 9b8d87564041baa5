//! Serve command implementation.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;

use qrdrop_core::config::Config;
use qrdrop_core::error::Error as QrdropError;
use qrdrop_core::file::{format_size, ServedFile};
use qrdrop_core::net::{access_url, local_ip_or_loopback};
use qrdrop_core::qr::AccessQr;
use qrdrop_core::transfer::{LogObserver, TransferObserver};
use qrdrop_core::web::{AppState, WebServer, WebServerConfig};

use super::Cli;
use crate::ui::{AccessBox, ConsoleObserver};

/// Run the server until it is stopped or fails to start.
pub async fn run(cli: Cli) -> Result<ExitCode> {
    let Some(path) = cli.file.as_deref().filter(|p| !p.as_os_str().is_empty()) else {
        print_usage();
        return Ok(ExitCode::SUCCESS);
    };

    let mut config = super::load_config();
    cli.apply_to(&mut config);

    match serve(path, &config, &cli).await {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(e) if e.is_fatal() => {
            handle_error(&e);
            Ok(ExitCode::FAILURE)
        }
        Err(e) => Err(e.into()),
    }
}

async fn serve(path: &Path, config: &Config, cli: &Cli) -> qrdrop_core::Result<()> {
    let file = ServedFile::open(path)?;
    let web_config = WebServerConfig::from_config(config);

    let observer: Arc<dyn TransferObserver> = if cli.quiet {
        Arc::new(LogObserver)
    } else {
        Arc::new(ConsoleObserver::new())
    };

    let name = file.name.clone();
    let size = file.size;

    let server = WebServer::bind(AppState::new(file, web_config, observer)).await?;
    let port = server.local_addr()?.port();
    let url = access_url(&local_ip_or_loopback(), port, &name);

    if cli.quiet {
        println!("{url}");
    } else {
        println!();
        println!("qrdrop v{}", qrdrop_core::VERSION);
        println!("{}", "-".repeat(37));
        println!();
        println!("  Sharing {name} ({})", format_size(size));
        println!();
        AccessBox::new(&url).display();
        println!();

        if config.ui.show_qr {
            display_qr(&url);
        }

        println!("  Press Ctrl+C to stop");
        println!();
    }

    server.run().await
}

fn display_qr(url: &str) {
    match AccessQr::new(url) {
        Ok(qr) => {
            for line in qr.to_ascii().lines() {
                println!("  {line}");
            }
            println!();
        }
        Err(e) => tracing::warn!("{e}"),
    }
}

fn print_usage() {
    eprintln!("No file to share.");
    eprintln!();
    eprintln!("Usage: qrdrop --file <PATH> [--port <PORT>]");
    eprintln!();
    eprintln!("Run 'qrdrop --help' for all options.");
}

fn handle_error(err: &QrdropError) {
    eprintln!("Error: {err}");

    if let Some(suggestion) = err.suggestion() {
        eprintln!();
        eprintln!("Suggestion:");
        for line in suggestion.lines() {
            eprintln!("  {line}");
        }
    }
}
