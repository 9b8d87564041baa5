//! HTTP server for the shared file.
//!
//! A single fallback route answers every path with the one shared file,
//! except favicon probes. The router is built from an explicit
//! [`AppState`] so handlers can be exercised without a listener:
//!
//! ```rust,ignore
//! use qrdrop_core::web::{router, AppState, WebServerConfig};
//!
//! let state = AppState::new(file, WebServerConfig::default(), Arc::new(LogObserver));
//! let response = router(state).oneshot(request).await?;
//! ```
//!
//! ## Responses
//!
//! | Request | Response |
//! |---------|----------|
//! | path containing `favicon` | 404 |
//! | method other than GET/HEAD | 405 |
//! | in-app browser user agent | 200 HTML hint page |
//! | no/unsupported `Range` | 200 whole file |
//! | `Range: bytes=N-`, N < size | 206 bytes N..size |
//! | `Range: bytes=N-`, N >= size > 0 | 416 |
//! | empty file, any `Range` | 200, empty body |

pub mod handlers;
pub mod range;

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::file::ServedFile;
use crate::transfer::TransferObserver;

/// Configuration for the web server.
#[derive(Debug, Clone)]
pub struct WebServerConfig {
    /// Port to listen on
    pub port: u16,
    /// Address to bind
    pub bind_address: IpAddr,
    /// Bytes buffered between the file reader and the response body
    pub stream_buffer_size: usize,
    /// User-agent substrings that get the "open in browser" page
    pub in_app_agents: Vec<String>,
}

impl Default for WebServerConfig {
    fn default() -> Self {
        Self {
            port: crate::DEFAULT_PORT,
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            stream_buffer_size: crate::DEFAULT_STREAM_BUFFER,
            in_app_agents: vec!["MicroMessenger".to_string()],
        }
    }
}

impl WebServerConfig {
    /// Build from a loaded [`Config`].
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            port: config.server.port,
            bind_address: config.server.bind_address,
            stream_buffer_size: config.server.stream_buffer_size.max(1),
            in_app_agents: config.web.in_app_agents.clone(),
        }
    }

    /// Get the bind address for the server.
    #[must_use]
    pub const fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_address, self.port)
    }

    /// Whether `user_agent` belongs to a configured in-app browser.
    #[must_use]
    pub fn is_in_app_browser(&self, user_agent: &str) -> bool {
        self.in_app_agents
            .iter()
            .any(|agent| !agent.is_empty() && user_agent.contains(agent.as_str()))
    }
}

/// Read-only state shared by every connection.
#[derive(Clone)]
pub struct AppState {
    /// The file being shared
    pub file: Arc<ServedFile>,
    /// Server settings
    pub config: Arc<WebServerConfig>,
    /// Receives transfer events
    pub observer: Arc<dyn TransferObserver>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("file", &self.file)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Bundle the shared state.
    pub fn new(
        file: ServedFile,
        config: WebServerConfig,
        observer: Arc<dyn TransferObserver>,
    ) -> Self {
        Self {
            file: Arc::new(file),
            config: Arc::new(config),
            observer,
        }
    }
}

/// Build the route table.
pub fn router(state: AppState) -> Router {
    Router::new().fallback(handlers::serve).with_state(state)
}

/// The web server instance.
#[derive(Debug)]
pub struct WebServer {
    listener: TcpListener,
    state: AppState,
}

impl WebServer {
    /// Bind the listening socket.
    ///
    /// # Errors
    ///
    /// Returns [`Error::BindFailed`] if the address cannot be bound.
    pub async fn bind(state: AppState) -> Result<Self> {
        let addr = state.config.bind_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| Error::BindFailed { addr, source })?;

        tracing::info!("Listening on {}", listener.local_addr().unwrap_or(addr));
        Ok(Self { listener, state })
    }

    /// Address actually bound (useful with port 0).
    ///
    /// # Errors
    ///
    /// Returns an error if the socket address cannot be read.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until the process is stopped or accepting fails fatally.
    ///
    /// # Errors
    ///
    /// Returns an error if the accept loop fails.
    pub async fn run(self) -> Result<()> {
        let app = router(self.state).into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(self.listener, app).await?;
        Ok(())
    }
}
