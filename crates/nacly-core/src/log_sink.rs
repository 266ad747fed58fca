// ── Decision log sinks ──
//
// The decision log is an append-only audit trail, one structured line
// per event. It's separate from diagnostic `tracing` output, though one
// sink forwards into it for embedders that already collect traces.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::Local;
use tracing::warn;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use crate::error::CoreError;

/// Append-only sink for single-line structured records.
///
/// Implementations must tolerate concurrent callers.
pub trait LogSink: Send + Sync {
    fn append(&self, line: &str);
}

// ── File ────────────────────────────────────────────────────────────

/// Appends `<timestamp> - <line>` records to a file.
///
/// Writes are serialized through a mutex, so concurrent appends never
/// interleave within a line.
pub struct FileLogSink {
    path: PathBuf,
    writer: Mutex<RollingFileAppender>,
}

impl FileLogSink {
    /// Open (or create) the log file, creating parent directories.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref().to_path_buf();
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| CoreError::validation(format!("invalid log file path: {}", path.display())))?
            .to_owned();

        std::fs::create_dir_all(&dir).map_err(|source| CoreError::Io {
            path: dir.display().to_string(),
            source,
        })?;

        let appender = RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(file_name)
            .build(&dir)
            .map_err(|e| CoreError::Io {
                path: path.display().to_string(),
                source: std::io::Error::other(e),
            })?;

        Ok(Self {
            path,
            writer: Mutex::new(appender),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LogSink for FileLogSink {
    fn append(&self, line: &str) {
        let record = format!("{} - {line}\n", Local::now().format("%Y-%m-%d %H:%M:%S%.6f"));
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writer.write_all(record.as_bytes()).and_then(|()| writer.flush()) {
            warn!(path = %self.path.display(), error = %e, "decision log append failed");
        }
    }
}

// ── Tracing ─────────────────────────────────────────────────────────

/// Forwards every line to `tracing` at INFO under the `nacly::audit` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn append(&self, line: &str) {
        tracing::info!(target: "nacly::audit", "{line}");
    }
}

// ── Memory ──────────────────────────────────────────────────────────

/// Captures lines in memory. Handy for tests and embedders that render
/// the log themselves.
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    lines: Mutex<Vec<String>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Lines that start with `prefix`.
    pub fn lines_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|l| l.starts_with(prefix))
            .collect()
    }
}

impl LogSink for MemoryLogSink {
    fn append(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_owned());
    }
}
