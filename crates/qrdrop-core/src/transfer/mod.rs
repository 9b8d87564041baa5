//! Per-connection transfer bookkeeping.
//!
//! Every accepted download gets its own [`TransferSession`]. The session is
//! moved into the [`ProgressStream`] that carries the response bytes, so
//! only the connection's own body ever touches its counters.
//!
//! A resumed download is just another session whose `start_offset` is
//! where the client says it left off; nothing is remembered between
//! connections.

pub mod observer;
pub mod stream;

pub use observer::{LogObserver, TransferObserver};
pub use stream::ProgressStream;

use std::io;
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::file::ServedFile;

/// Whether a connection starts a download or continues an earlier one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferKind {
    /// Download from the first byte
    New,
    /// Download continuing from a client-supplied offset
    Resumed,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// `start_offset + bytes_written == total_size`
    Complete,
    /// The stream stopped short of the end of the file
    Interrupted,
}

/// Bookkeeping for one connection's download.
#[derive(Debug, Clone)]
pub struct TransferSession {
    id: Uuid,
    remote: String,
    file_name: String,
    start_offset: u64,
    bytes_written: u64,
    total_size: u64,
    started_at: Instant,
}

impl TransferSession {
    /// Start a session for `file`, beginning at `start_offset`.
    ///
    /// Offsets past the end of the file are clamped to its size.
    #[must_use]
    pub fn new(remote: impl Into<String>, file: &ServedFile, start_offset: u64) -> Self {
        Self::with_size(remote, file.name.clone(), start_offset, file.size)
    }

    /// Start a session without a [`ServedFile`], for callers that only know
    /// the name and size.
    #[must_use]
    pub fn with_size(
        remote: impl Into<String>,
        file_name: impl Into<String>,
        start_offset: u64,
        total_size: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            remote: remote.into(),
            file_name: file_name.into(),
            start_offset: start_offset.min(total_size),
            bytes_written: 0,
            total_size,
            started_at: Instant::now(),
        }
    }

    /// Unique id for correlating log lines.
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Remote peer address, as reported by the HTTP layer.
    pub fn remote(&self) -> &str {
        &self.remote
    }

    /// Name of the file being sent.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Offset the client asked to start from.
    pub const fn start_offset(&self) -> u64 {
        self.start_offset
    }

    /// Total size of the file.
    pub const fn total_size(&self) -> u64 {
        self.total_size
    }

    /// New or resumed download.
    pub const fn kind(&self) -> TransferKind {
        if self.start_offset > 0 {
            TransferKind::Resumed
        } else {
            TransferKind::New
        }
    }

    /// Account for `n` more bytes and return the updated snapshot.
    pub fn record(&mut self, n: usize) -> TransferProgress {
        self.bytes_written += n as u64;
        debug_assert!(
            self.start_offset + self.bytes_written <= self.total_size,
            "wrote past the end of the file"
        );
        self.progress()
    }

    /// Current progress snapshot.
    pub fn progress(&self) -> TransferProgress {
        TransferProgress {
            session_id: self.id,
            start_offset: self.start_offset,
            bytes_written: self.bytes_written,
            total_size: self.total_size,
        }
    }

    /// Whether the whole file has now been delivered.
    pub const fn is_complete(&self) -> bool {
        self.start_offset + self.bytes_written == self.total_size
    }

    /// Classify the session and produce its final summary.
    pub fn finish(&self, error: Option<&io::Error>) -> TransferSummary {
        TransferSummary {
            session_id: self.id,
            remote: self.remote.clone(),
            file_name: self.file_name.clone(),
            kind: self.kind(),
            start_offset: self.start_offset,
            bytes_written: self.bytes_written,
            total_size: self.total_size,
            outcome: if self.is_complete() {
                TransferOutcome::Complete
            } else {
                TransferOutcome::Interrupted
            },
            elapsed: self.started_at.elapsed(),
            error: error.map(ToString::to_string),
        }
    }
}

/// A progress event emitted after every successful write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferProgress {
    /// Session this event belongs to
    pub session_id: Uuid,
    /// Offset the session started at
    pub start_offset: u64,
    /// Bytes written on this connection
    pub bytes_written: u64,
    /// Total file size
    pub total_size: u64,
}

impl TransferProgress {
    /// Position in the file the client now holds.
    pub const fn transferred(&self) -> u64 {
        self.start_offset + self.bytes_written
    }

    /// Percent of the file the client holds (0.0 - 100.0).
    ///
    /// An empty file counts as fully transferred.
    pub fn percentage(&self) -> f64 {
        if self.total_size == 0 {
            100.0
        } else {
            self.transferred() as f64 / self.total_size as f64 * 100.0
        }
    }
}

/// Final accounting for a finished or aborted session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSummary {
    /// Session id
    pub session_id: Uuid,
    /// Remote peer address
    pub remote: String,
    /// File name
    pub file_name: String,
    /// New or resumed
    pub kind: TransferKind,
    /// Offset the session started at
    pub start_offset: u64,
    /// Bytes written on this connection
    pub bytes_written: u64,
    /// Total file size
    pub total_size: u64,
    /// Complete or interrupted
    pub outcome: TransferOutcome,
    /// Wall time spent streaming
    pub elapsed: Duration,
    /// Error that stopped the stream, if any
    pub error: Option<String>,
}

impl TransferSummary {
    /// Position in the file the client reached.
    pub const fn transferred(&self) -> u64 {
        self.start_offset + self.bytes_written
    }

    /// Whether the client now holds the whole file.
    pub fn is_complete(&self) -> bool {
        self.outcome == TransferOutcome::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(start: u64, total: u64) -> TransferSession {
        TransferSession::with_size("127.0.0.1:50000", "file.bin", start, total)
    }

    #[test]
    fn test_new_session_kind() {
        assert_eq!(session(0, 100).kind(), TransferKind::New);
        assert_eq!(session(40, 100).kind(), TransferKind::Resumed);
    }

    #[test]
    fn test_record_and_percentage() {
        let mut s = session(2500, 5000);
        let p = s.record(1250);
        assert_eq!(p.bytes_written, 1250);
        assert_eq!(p.transferred(), 3750);
        assert!((p.percentage() - 75.0).abs() < f64::EPSILON);
        assert!(!s.is_complete());

        s.record(1250);
        assert!(s.is_complete());
        assert!((s.progress().percentage() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_size_is_complete() {
        let s = session(0, 0);
        assert!(s.is_complete());
        assert!((s.progress().percentage() - 100.0).abs() < f64::EPSILON);
        assert_eq!(s.finish(None).outcome, TransferOutcome::Complete);
    }

    #[test]
    fn test_start_offset_clamped() {
        let s = session(500, 100);
        assert_eq!(s.start_offset(), 100);
        assert!(s.is_complete());
    }

    #[test]
    fn test_finish_interrupted_keeps_error() {
        let mut s = session(0, 10);
        s.record(4);
        let err = io::Error::from(io::ErrorKind::BrokenPipe);
        let summary = s.finish(Some(&err));

        assert_eq!(summary.outcome, TransferOutcome::Interrupted);
        assert_eq!(summary.transferred(), 4);
        assert!(summary.error.is_some());
        assert!(!summary.is_complete());
    }

    #[test]
    fn test_sessions_have_distinct_ids() {
        assert_ne!(session(0, 1).id(), session(0, 1).id());
    }
}
