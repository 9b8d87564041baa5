//! Common test utilities for `qrdrop` integration tests.
//!
//! This module provides shared functionality for integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, Response};
use tokio::sync::mpsc;

use qrdrop_core::file::ServedFile;
use qrdrop_core::transfer::{
    TransferKind, TransferObserver, TransferProgress, TransferSession, TransferSummary,
};
use qrdrop_core::web::{AppState, WebServerConfig};

/// How long a test waits for a transfer event before failing.
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(10);

/// Create a temporary directory for test files.
///
/// The directory will be automatically cleaned up when the returned
/// `TempDir` is dropped.
pub fn create_temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

/// Create a test file with the given content.
pub fn create_test_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("Failed to write test file");
    path
}

/// Generate random bytes for testing.
pub fn random_bytes(size: usize) -> Vec<u8> {
    use rand::RngCore;
    let mut bytes = vec![0u8; size];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

/// An observed transfer event.
#[derive(Debug, Clone)]
pub enum Event {
    /// `on_start`
    Start {
        /// Session id as text
        session_id: String,
        /// New or resumed
        kind: TransferKind,
        /// Start offset
        start_offset: u64,
        /// Remote address
        remote: String,
    },
    /// `on_progress`
    Progress(TransferProgress),
    /// `on_finish`
    Finish(TransferSummary),
}

/// Forwards every event into a channel.
pub struct RecordingObserver {
    tx: mpsc::UnboundedSender<Event>,
}

impl TransferObserver for RecordingObserver {
    fn on_start(&self, session: &TransferSession) {
        let _ = self.tx.send(Event::Start {
            session_id: session.id().to_string(),
            kind: session.kind(),
            start_offset: session.start_offset(),
            remote: session.remote().to_string(),
        });
    }

    fn on_progress(&self, progress: &TransferProgress) {
        let _ = self.tx.send(Event::Progress(*progress));
    }

    fn on_finish(&self, summary: &TransferSummary) {
        let _ = self.tx.send(Event::Finish(summary.clone()));
    }
}

/// Create an observer plus the receiving end of its events.
pub fn recording_observer() -> (Arc<RecordingObserver>, mpsc::UnboundedReceiver<Event>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Arc::new(RecordingObserver { tx }), rx)
}

/// Wait for the next `on_finish`, skipping other events.
pub async fn next_finish(rx: &mut mpsc::UnboundedReceiver<Event>) -> TransferSummary {
    tokio::time::timeout(EVENT_TIMEOUT, async {
        loop {
            match rx.recv().await.expect("observer channel closed") {
                Event::Finish(summary) => return summary,
                Event::Start { .. } | Event::Progress(_) => {}
            }
        }
    })
    .await
    .expect("timed out waiting for transfer to finish")
}

/// Receive every event up to and including the `sessions`-th `on_finish`.
pub async fn collect_until_finished(
    rx: &mut mpsc::UnboundedReceiver<Event>,
    sessions: usize,
) -> Vec<Event> {
    tokio::time::timeout(EVENT_TIMEOUT, async {
        let mut events = Vec::new();
        let mut finished = 0;
        while finished < sessions {
            let event = rx.recv().await.expect("observer channel closed");
            if matches!(event, Event::Finish(_)) {
                finished += 1;
            }
            events.push(event);
        }
        events
    })
    .await
    .expect("timed out waiting for transfers to finish")
}

/// Drain whatever events are already queued.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// State serving `path` with a recording observer.
pub fn state_for(
    path: &Path,
    config: WebServerConfig,
) -> (AppState, mpsc::UnboundedReceiver<Event>) {
    let file = ServedFile::open(path).expect("Failed to open served file");
    let (observer, rx) = recording_observer();
    (AppState::new(file, config, observer), rx)
}

/// A GET request for `uri` with optional `Range` header.
pub fn get(uri: &str, range: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(range) = range {
        builder = builder.header(header::RANGE, range);
    }
    builder.body(Body::empty()).expect("valid request")
}

/// Collect a response body.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body")
        .to_vec()
}

/// A header value as text, if present.
pub fn header_str<'a>(response: &'a Response<Body>, name: header::HeaderName) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}
