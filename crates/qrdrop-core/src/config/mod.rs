//! Configuration management for qrdrop.
//!
//! Settings come from an optional TOML file; command-line flags override
//! anything set there.
//!
//! ## Configuration File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/qrdrop/config.toml` |
//! | macOS | `~/Library/Application Support/com.qrdrop.qrdrop/config.toml` |
//! | Windows | `%APPDATA%\qrdrop\qrdrop\config\config.toml` |
//!
//! ## Example
//!
//! ```toml
//! [server]
//! port = 9000
//!
//! [web]
//! in_app_agents = ["MicroMessenger", "QQ/"]
//!
//! [ui]
//! show_qr = false
//! ```

use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration struct for qrdrop.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listener settings
    pub server: ServerSection,
    /// Request handling settings
    pub web: WebSection,
    /// Console settings
    pub ui: UiSection,
}

/// Listener configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// TCP port to listen on
    pub port: u16,
    /// Address to bind
    pub bind_address: IpAddr,
    /// Bytes buffered between the file reader and the response body
    pub stream_buffer_size: usize,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: crate::DEFAULT_PORT,
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            stream_buffer_size: crate::DEFAULT_STREAM_BUFFER,
        }
    }
}

/// Request handling configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSection {
    /// User-agent substrings of in-app browsers that cannot save downloads
    pub in_app_agents: Vec<String>,
}

impl Default for WebSection {
    fn default() -> Self {
        Self {
            in_app_agents: vec!["MicroMessenger".to_string()],
        }
    }
}

/// Console configuration options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSection {
    /// Print a QR code for the access URL
    pub show_qr: bool,
}

impl Default for UiSection {
    fn default() -> Self {
        Self { show_qr: true }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// If the configuration file doesn't exist, returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, defaulting when it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("Failed to read config: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Get the default configuration directory path.
    #[must_use]
    pub fn config_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "qrdrop", "qrdrop")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the full path to the configuration file.
    #[must_use]
    pub fn config_path() -> PathBuf {
        Self::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.server.port, 8989);
        assert_eq!(config.server.bind_address, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(config.web.in_app_agents, vec!["MicroMessenger".to_string()]);
        assert!(config.ui.show_qr);
    }

    #[test]
    fn test_config_deserialization_partial() {
        let partial_toml = r#"
[server]
port = 9999

[ui]
show_qr = false
"#;

        let config: Config = toml::from_str(partial_toml).expect("parse partial config");

        assert_eq!(config.server.port, 9999);
        assert_eq!(config.server.stream_buffer_size, crate::DEFAULT_STREAM_BUFFER);
        assert!(!config.ui.show_qr);
        assert_eq!(config.web.in_app_agents.len(), 1);
    }

    #[test]
    fn test_load_from_missing_file_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(&temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(config.server.port, crate::DEFAULT_PORT);
    }

    #[test]
    fn test_load_from_invalid_file_errors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = \"not a port\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");

        let mut original = Config::default();
        original.server.port = 12345;
        original.server.bind_address = "127.0.0.1".parse().unwrap();
        original.web.in_app_agents.push("QQ/".to_string());

        std::fs::write(&path, toml::to_string_pretty(&original).unwrap()).unwrap();
        let loaded = Config::load_from(&path).unwrap();

        assert_eq!(loaded.server.port, 12345);
        assert_eq!(loaded.server.bind_address.to_string(), "127.0.0.1");
        assert_eq!(loaded.web.in_app_agents, vec!["MicroMessenger", "QQ/"]);
    }

    #[test]
    fn test_config_path() {
        let path = Config::config_path();
        assert!(path.ends_with("config.toml"));
    }
}
