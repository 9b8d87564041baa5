//! # qrdrop Core Library
//!
//! `qrdrop-core` serves one local file to browsers on the same network and
//! keeps an exact account of what each connection delivered.
//!
//! ## Features
//!
//! - **Resumable downloads**: `Range: bytes=N-` requests continue where the
//!   client stopped, answered with `206 Partial Content`
//! - **Per-connection progress**: every write is counted against the
//!   session's start offset and the file size
//! - **Scannable links**: the access URL is rendered as a terminal QR code
//!
//! ## Modules
//!
//! - [`config`] - Configuration management
//! - [`mod@file`] - The shared file and size formatting
//! - [`net`] - Local address discovery and URL building
//! - [`qr`] - QR code rendering
//! - [`transfer`] - Transfer sessions and the progress-observing body
//! - [`web`] - HTTP routing, range handling, and the server loop
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use qrdrop_core::{file::ServedFile, transfer::LogObserver, web};
//!
//! let file = ServedFile::open("video.mp4".as_ref())?;
//! let state = web::AppState::new(file, web::WebServerConfig::default(), Arc::new(LogObserver));
//! web::WebServer::bind(state).await?.run().await?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_const_for_fn)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::doc_markdown)]

pub mod config;
pub mod error;
pub mod file;
pub mod net;
pub mod qr;
pub mod transfer;
pub mod web;

pub use error::{Error, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 8989;

/// Default buffer between the file reader and the response body (64 KB)
pub const DEFAULT_STREAM_BUFFER: usize = 64 * 1024;
