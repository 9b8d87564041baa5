//! Console output for the qrdrop CLI.

use std::io::{self, Write};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use qrdrop_core::file::format_size;
use qrdrop_core::transfer::{
    TransferKind, TransferObserver, TransferOutcome, TransferProgress, TransferSession,
    TransferSummary,
};

const BOX_MIN_WIDTH: usize = 33;

/// Minimum time between two redraws of the progress line.
pub const REDRAW_INTERVAL: Duration = Duration::from_millis(100);

/// A formatted box around the access URL.
pub struct AccessBox<'a> {
    url: &'a str,
}

impl<'a> AccessBox<'a> {
    /// Create a new access box.
    #[must_use]
    pub const fn new(url: &'a str) -> Self {
        Self { url }
    }

    /// Display the box to stdout.
    pub fn display(&self) {
        for line in self.lines() {
            println!("{line}");
        }
    }

    fn lines(&self) -> Vec<String> {
        let width = (self.url.chars().count() + 4).max(BOX_MIN_WIDTH);
        vec![
            format!("  ┌{}┐", "─".repeat(width)),
            format!("  │{}│", center_in_box("Open on your phone:", width)),
            format!("  │{}│", " ".repeat(width)),
            format!("  │{}│", center_in_box(self.url, width)),
            format!("  └{}┘", "─".repeat(width)),
        ]
    }
}

fn center_in_box(content: &str, width: usize) -> String {
    let content_len = content.chars().count();
    let padding = width.saturating_sub(content_len);
    let left = padding / 2;
    let right = padding - left;
    format!("{}{}{}", " ".repeat(left), content, " ".repeat(right))
}

/// Format the line printed when a connection starts streaming.
pub fn format_start_line(session: &TransferSession) -> String {
    match session.kind() {
        TransferKind::New => format!(
            "  New connection from {}: {} ({})",
            session.remote(),
            session.file_name(),
            format_size(session.total_size())
        ),
        TransferKind::Resumed => format!(
            "  Resumed download from {} at {}: {} ({})",
            session.remote(),
            format_size(session.start_offset()),
            session.file_name(),
            format_size(session.total_size())
        ),
    }
}

/// Format the live progress line, e.g. `"  42.0% (2.1 MB/5.0 MB)"`.
pub fn format_progress_line(progress: &TransferProgress) -> String {
    format!(
        "  {:.1}% ({}/{})",
        progress.percentage(),
        format_size(progress.transferred()),
        format_size(progress.total_size)
    )
}

/// Format the line printed when a session ends.
pub fn format_summary_line(summary: &TransferSummary) -> String {
    match summary.outcome {
        TransferOutcome::Complete => format!(
            "  Transfer complete: {} sent to {} in {:.1}s",
            format_size(summary.total_size),
            summary.remote,
            summary.elapsed.as_secs_f64()
        ),
        TransferOutcome::Interrupted => format!(
            "  Transfer interrupted: {} of {} ({} sent to {})",
            format_size(summary.transferred()),
            format_size(summary.total_size),
            format_size(summary.bytes_written),
            summary.remote
        ),
    }
}

/// Prints per-connection lines and a single self-overwriting progress line.
///
/// Output from concurrent downloads interleaves on the same line.
#[derive(Debug)]
pub struct ConsoleObserver {
    last_draw: Mutex<Option<Instant>>,
}

impl Default for ConsoleObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleObserver {
    /// Create an observer that has not drawn anything yet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            last_draw: Mutex::new(None),
        }
    }

    /// Whether the progress line should be redrawn at `now`.
    ///
    /// A line at 100% is always drawn.
    fn should_draw(&self, progress: &TransferProgress, now: Instant) -> bool {
        let mut last = self.last_draw.lock().unwrap_or_else(PoisonError::into_inner);
        let due = progress.transferred() >= progress.total_size
            || last.is_none_or(|at| now.duration_since(at) >= REDRAW_INTERVAL);
        if due {
            *last = Some(now);
        }
        due
    }
}

impl TransferObserver for ConsoleObserver {
    fn on_start(&self, session: &TransferSession) {
        println!();
        println!("{}", format_start_line(session));
    }

    fn on_progress(&self, progress: &TransferProgress) {
        if self.should_draw(progress, Instant::now()) {
            print!("\r{}   ", format_progress_line(progress));
            // A stdout that cannot flush must not stop the transfer.
            let _ = io::stdout().flush();
        }
    }

    fn on_finish(&self, summary: &TransferSummary) {
        println!();
        println!("{}", format_summary_line(summary));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress(start: u64, written: u64, total: u64) -> TransferProgress {
        let mut session = TransferSession::with_size("peer", "f", start, total);
        let mut p = session.progress();
        if written > 0 {
            p = session.record(usize::try_from(written).unwrap());
        }
        p
    }

    #[test]
    fn test_center_in_box() {
        assert_eq!(center_in_box("hello", 11), "   hello   ");
        assert_eq!(center_in_box("hi", 6), "  hi  ");
    }

    #[test]
    fn test_access_box_fits_long_url() {
        let url = "http://192.168.100.200:8989/a-rather-long-file-name.mp4";
        let lines = AccessBox::new(url).lines();
        let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|w| *w == widths[0]));
        assert!(lines[3].contains(url));
    }

    #[test]
    fn test_format_start_lines() {
        let fresh = TransferSession::with_size("10.0.0.7:5000", "video.mp4", 0, 5000);
        assert_eq!(
            format_start_line(&fresh),
            "  New connection from 10.0.0.7:5000: video.mp4 (4.9 KB)"
        );

        let resumed = TransferSession::with_size("10.0.0.7:5001", "video.mp4", 2048, 5000);
        assert_eq!(
            format_start_line(&resumed),
            "  Resumed download from 10.0.0.7:5001 at 2.0 KB: video.mp4 (4.9 KB)"
        );
    }

    #[test]
    fn test_format_progress_line() {
        let line = format_progress_line(&progress(2560, 1536, 8192));
        assert_eq!(line, "  50.0% (4.0 KB/8.0 KB)");
    }

    #[test]
    fn test_format_progress_line_empty_file() {
        let line = format_progress_line(&progress(0, 0, 0));
        assert_eq!(line, "  100.0% (0 B/0 B)");
    }

    #[test]
    fn test_format_summary_lines() {
        let mut session = TransferSession::with_size("10.0.0.7:5000", "f", 2500, 5000);
        session.record(2500);
        let done = session.finish(None);
        assert!(format_summary_line(&done)
            .starts_with("  Transfer complete: 4.9 KB sent to 10.0.0.7:5000"));

        let mut session = TransferSession::with_size("10.0.0.7:5001", "f", 0, 5000);
        session.record(1024);
        let cut = session.finish(None);
        assert_eq!(
            format_summary_line(&cut),
            "  Transfer interrupted: 1.0 KB of 4.9 KB (1.0 KB sent to 10.0.0.7:5001)"
        );
    }

    #[test]
    fn test_redraw_is_throttled() {
        let observer = ConsoleObserver::new();
        let t0 = Instant::now();
        let partial = progress(0, 10, 100);

        assert!(observer.should_draw(&partial, t0));
        assert!(!observer.should_draw(&partial, t0 + Duration::from_millis(50)));
        assert!(observer.should_draw(&partial, t0 + Duration::from_millis(150)));
    }

    #[test]
    fn test_completion_always_drawn() {
        let observer = ConsoleObserver::new();
        let t0 = Instant::now();

        assert!(observer.should_draw(&progress(0, 10, 100), t0));
        assert!(observer.should_draw(&progress(0, 100, 100), t0 + Duration::from_millis(1)));
    }
}
