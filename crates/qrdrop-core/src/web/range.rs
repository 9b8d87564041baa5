//! `Range` header handling.
//!
//! Only the open-ended form `bytes=<start>-` is honored, which is what
//! browsers and download managers send when resuming. Closed ranges,
//! suffix ranges, multiple ranges and anything unparseable are treated as
//! if no `Range` header had been sent, and the whole file is served.

use axum::http::{header, HeaderMap, StatusCode};

/// What part of the file a request will receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeRange {
    /// The whole file, `200 OK`
    Full {
        /// File size
        total: u64,
    },
    /// `[start, total)`, `206 Partial Content`
    From {
        /// First byte sent
        start: u64,
        /// File size
        total: u64,
    },
    /// Start offset at or past the end, `416 Range Not Satisfiable`
    Unsatisfiable {
        /// File size
        total: u64,
    },
}

impl ServeRange {
    /// Decide the range for a file of `total` bytes.
    ///
    /// An empty file has no satisfiable range, so it is always served whole.
    pub const fn resolve(start: Option<u64>, total: u64) -> Self {
        match start {
            None => Self::Full { total },
            Some(_) if total == 0 => Self::Full { total },
            Some(start) if start >= total => Self::Unsatisfiable { total },
            Some(start) => Self::From { start, total },
        }
    }

    /// Status code to answer with.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Full { .. } => StatusCode::OK,
            Self::From { .. } => StatusCode::PARTIAL_CONTENT,
            Self::Unsatisfiable { .. } => StatusCode::RANGE_NOT_SATISFIABLE,
        }
    }

    /// First byte to send.
    pub const fn start(&self) -> u64 {
        match self {
            Self::From { start, .. } => *start,
            Self::Full { .. } | Self::Unsatisfiable { .. } => 0,
        }
    }

    /// Number of body bytes.
    pub const fn len(&self) -> u64 {
        match self {
            Self::Full { total } => *total,
            Self::From { start, total } => *total - *start,
            Self::Unsatisfiable { .. } => 0,
        }
    }

    /// Whether the response carries no body bytes.
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `Content-Range` value, for partial and unsatisfiable responses.
    pub fn content_range(&self) -> Option<String> {
        match self {
            Self::Full { .. } => None,
            Self::From { start, total } => Some(format!("bytes {start}-{}/{total}", total - 1)),
            Self::Unsatisfiable { total } => Some(format!("bytes */{total}")),
        }
    }
}

/// Parse `bytes=<start>-` into `start`.
///
/// Returns `None` for every other shape of header value.
pub fn parse_open_range(value: &str) -> Option<u64> {
    let spec = value.trim().strip_prefix("bytes=")?;
    let start = spec.trim().strip_suffix('-')?;
    let start = start.trim();
    if start.is_empty() || !start.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    start.parse().ok()
}

/// Start offset requested by `headers`, honoring `If-Range`.
///
/// An `If-Range` that does not match the file's `Last-Modified` value means
/// the client's partial copy is stale, so the range is dropped.
pub fn requested_start(headers: &HeaderMap, last_modified: Option<&str>) -> Option<u64> {
    let value = headers.get(header::RANGE)?.to_str().ok()?;

    if let Some(if_range) = headers.get(header::IF_RANGE) {
        let matches = match (if_range.to_str(), last_modified) {
            (Ok(validator), Some(modified)) => validator.trim() == modified,
            _ => false,
        };
        if !matches {
            tracing::debug!("If-Range validator mismatch, serving full file");
            return None;
        }
    }

    let start = parse_open_range(value);
    if start.is_none() {
        tracing::debug!("Ignoring unsupported Range header: {value}");
    }
    start
}
