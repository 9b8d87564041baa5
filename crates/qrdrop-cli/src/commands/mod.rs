//! CLI argument definitions and handlers.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;

use qrdrop_core::config::Config;

pub mod serve;

/// Load configuration with graceful fallback to defaults.
///
/// A broken config file is reported as a warning; it never stops the
/// file from being shared.
pub fn load_config() -> Config {
    match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!("{e}; using default settings");
            Config::default()
        }
    }
}

/// qrdrop - share one file on the local network
#[derive(Parser, Debug)]
#[command(name = "qrdrop")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// File to share
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Port to listen on [default: 8989]
    #[arg(short, long, env = "QRDROP_PORT")]
    pub port: Option<u16>,

    /// Address to bind [default: 0.0.0.0]
    #[arg(long, value_name = "ADDR")]
    pub bind: Option<IpAddr>,

    /// Don't print the QR code
    #[arg(long)]
    pub no_qr: bool,

    /// Minimal output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Detailed logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(bind) = self.bind {
            config.server.bind_address = bind;
        }
        if self.no_qr {
            config.ui.show_qr = false;
        }
    }
}
