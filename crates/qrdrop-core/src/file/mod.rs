//! The file being shared and helpers for describing it.
//!
//! A [`ServedFile`] is resolved once at startup and never changes while the
//! server runs. Every request reads its metadata; nothing writes to it.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::error::{Error, Result};

/// Characters left alone in an RFC 5987 `filename*` value.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// Metadata of the single file offered for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServedFile {
    /// Absolute path on disk
    pub path: PathBuf,
    /// Name shown to the operator and sent to browsers
    pub name: String,
    /// Total size in bytes
    pub size: u64,
    /// Last modification time, if the platform reports one
    pub modified: Option<SystemTime>,
}

impl ServedFile {
    /// Resolve `path` and capture its metadata.
    ///
    /// # Errors
    ///
    /// Returns [`Error::FileNotFound`] if nothing exists at `path`,
    /// [`Error::NotAFile`] for directories and other non-regular files, and
    /// [`Error::PermissionDenied`] when the metadata cannot be read.
    pub fn open(path: &Path) -> Result<Self> {
        let display = path.display().to_string();

        let absolute = std::fs::canonicalize(path).map_err(|e| Error::from_open(&display, e))?;
        let metadata = std::fs::metadata(&absolute).map_err(|e| Error::from_open(&display, e))?;

        if !metadata.is_file() {
            return Err(Error::NotAFile(display));
        }

        let name = absolute
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| Error::NotAFile(display.clone()))?;

        tracing::debug!(path = %absolute.display(), size = metadata.len(), "resolved served file");

        Ok(Self {
            path: absolute,
            name,
            size: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }

    /// MIME type guessed from the file name.
    #[must_use]
    pub fn content_type(&self) -> String {
        mime_guess::from_path(&self.name)
            .first_or_octet_stream()
            .to_string()
    }

    /// `Last-Modified` value in IMF-fixdate form.
    #[must_use]
    pub fn last_modified(&self) -> Option<String> {
        self.modified.map(http_date)
    }

    /// `Content-Disposition` value that forces a download.
    ///
    /// Non-ASCII names get an additional `filename*` parameter so browsers
    /// keep the original spelling.
    #[must_use]
    pub fn content_disposition(&self) -> String {
        let fallback: String = self
            .name
            .chars()
            .map(|c| {
                if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        if self.name.is_ascii() && fallback == self.name {
            format!("attachment; filename=\"{fallback}\"")
        } else {
            format!(
                "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
                utf8_percent_encode(&self.name, ATTR_CHAR)
            )
        }
    }
}

/// Format a timestamp as an HTTP date (`Sun, 06 Nov 1994 08:49:37 GMT`).
#[must_use]
pub fn http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// Format a file size for display using binary units.
///
/// Sizes below 1 KB are printed as whole bytes; larger sizes use the largest
/// power-of-1024 unit not exceeding the value, with one decimal place.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const UNIT: u64 = 1024;
    const PREFIXES: [char; 6] = ['K', 'M', 'G', 'T', 'P', 'E'];

    if bytes < UNIT {
        return format!("{bytes} B");
    }

    let mut div = UNIT;
    let mut exp = 0;
    let mut n = bytes / UNIT;
    while n >= UNIT {
        div *= UNIT;
        exp += 1;
        n /= UNIT;
    }

    format!("{:.1} {}B", bytes as f64 / div as f64, PREFIXES[exp])
}
