//! Hooks for watching transfers as they happen.

use super::{TransferKind, TransferOutcome, TransferProgress, TransferSession, TransferSummary};
use crate::file::format_size;

/// Receives events from every transfer session.
///
/// Implementations are shared by all connections and called from their
/// tasks concurrently. Events of one session arrive in order; events of
/// different sessions may interleave.
pub trait TransferObserver: Send + Sync {
    /// A download was accepted and is about to stream.
    fn on_start(&self, session: &TransferSession);

    /// Bytes were handed to the client.
    fn on_progress(&self, progress: &TransferProgress);

    /// The stream ended, completely or not.
    fn on_finish(&self, summary: &TransferSummary);
}

/// Reports transfers through `tracing` only.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl TransferObserver for LogObserver {
    fn on_start(&self, session: &TransferSession) {
        match session.kind() {
            TransferKind::New => tracing::info!(
                session = %session.id(),
                "New connection from {}: {} ({})",
                session.remote(),
                session.file_name(),
                format_size(session.total_size())
            ),
            TransferKind::Resumed => tracing::info!(
                session = %session.id(),
                "Resumed download from {} at {}: {} ({})",
                session.remote(),
                format_size(session.start_offset()),
                session.file_name(),
                format_size(session.total_size())
            ),
        }
    }

    fn on_progress(&self, progress: &TransferProgress) {
        tracing::trace!(
            session = %progress.session_id,
            "{:.1}% ({}/{})",
            progress.percentage(),
            format_size(progress.transferred()),
            format_size(progress.total_size)
        );
    }

    fn on_finish(&self, summary: &TransferSummary) {
        match summary.outcome {
            TransferOutcome::Complete => tracing::info!(
                session = %summary.session_id,
                "Transfer complete: {} to {}",
                format_size(summary.total_size),
                summary.remote
            ),
            TransferOutcome::Interrupted => tracing::info!(
                session = %summary.session_id,
                "Transfer interrupted at {} of {} ({})",
                format_size(summary.transferred()),
                format_size(summary.total_size),
                summary.error.as_deref().unwrap_or("stream ended early")
            ),
        }
    }
}
