//! The progress-observing response body.
//!
//! [`ProgressStream`] wraps the chunk stream read from the file and is
//! handed to the HTTP layer as the response body. A chunk is counted when
//! the HTTP layer pulls it, so bytes the client never asked for are never
//! reported as sent. Chunks pass through unchanged; nothing is retried.
//!
//! The session is settled exactly once: on end-of-stream, on a read error,
//! or when the HTTP layer drops the body because the client went away.

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{ready, Context, Poll};

use axum::body::Bytes;
use futures::stream::Stream;

use super::{TransferObserver, TransferSession};

/// A body stream that tracks one session's progress.
pub struct ProgressStream<S> {
    inner: S,
    session: TransferSession,
    observer: Arc<dyn TransferObserver>,
    finished: bool,
}

impl<S> std::fmt::Debug for ProgressStream<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressStream")
            .field("session", &self.session)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl<S> ProgressStream<S> {
    /// Wrap `inner`, accounting chunks to `session`.
    pub fn new(inner: S, session: TransferSession, observer: Arc<dyn TransferObserver>) -> Self {
        Self {
            inner,
            session,
            observer,
            finished: false,
        }
    }

    fn finish(&mut self, error: Option<&io::Error>) {
        if self.finished {
            return;
        }
        self.finished = true;

        if let Some(e) = error {
            tracing::debug!(session = %self.session.id(), "stream aborted: {e}");
        }
        let summary = self.session.finish(error);
        self.observer.on_finish(&summary);
    }
}

impl<S> Stream for ProgressStream<S>
where
    S: Stream<Item = io::Result<Bytes>> + Unpin,
{
    type Item = io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }

        match ready!(Pin::new(&mut this.inner).poll_next(cx)) {
            Some(Ok(chunk)) => {
                if !chunk.is_empty() {
                    let progress = this.session.record(chunk.len());
                    this.observer.on_progress(&progress);
                }
                Poll::Ready(Some(Ok(chunk)))
            }
            Some(Err(e)) => {
                this.finish(Some(&e));
                Poll::Ready(Some(Err(e)))
            }
            None if this.session.is_complete() => {
                this.finish(None);
                Poll::Ready(None)
            }
            None => {
                // The file got shorter than the Content-Length already sent.
                let e = io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "file ended after {} of {} bytes",
                        this.session.progress().transferred(),
                        this.session.total_size()
                    ),
                );
                this.finish(Some(&e));
                Poll::Ready(Some(Err(e)))
            }
        }
    }
}

impl<S> Drop for ProgressStream<S> {
    fn drop(&mut self) {
        if self.session.is_complete() {
            self.finish(None);
        } else {
            let e = io::Error::new(io::ErrorKind::ConnectionAborted, "client went away");
            self.finish(Some(&e));
        }
    }
}
