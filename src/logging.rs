// ABOUTME: Per-run structured logging.
// ABOUTME: Appends JSON-line records to a timestamped file and echoes to the console.

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Record severity. ERROR records are terminal: the caller exits with the
/// recorded code right after emitting one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Success,
    Error,
}

#[derive(Serialize)]
struct LogRecord<'a> {
    timestamp: DateTime<Utc>,
    severity: Severity,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    exit_code: Option<i32>,
}

/// Append-only log for one run, passed explicitly into every pipeline
/// stage. No global handler, no ambient state.
pub struct RunLog {
    file: Mutex<File>,
    path: PathBuf,
}

impl RunLog {
    /// Create `slipway-YYYYMMDD-HHMMSS.log` in `dir` and write the run
    /// header.
    pub fn create(dir: &Path) -> std::io::Result<Self> {
        let stamp = Utc::now().format("%Y%m%d-%H%M%S");
        let path = dir.join(format!("slipway-{stamp}.log"));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let log = Self {
            file: Mutex::new(file),
            path,
        };
        let host = gethostname::gethostname();
        log.write(
            Severity::Info,
            &format!("run started on {}", host.to_string_lossy()),
            None,
        );
        Ok(log)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&self, message: &str) {
        println!("→ {message}");
        self.write(Severity::Info, message, None);
    }

    pub fn success(&self, message: &str) {
        println!("✓ {message}");
        self.write(Severity::Success, message, None);
    }

    pub fn error(&self, message: &str, exit_code: i32) {
        eprintln!("✗ {message}");
        self.write(Severity::Error, message, Some(exit_code));
    }

    fn write(&self, severity: Severity, message: &str, exit_code: Option<i32>) {
        let record = LogRecord {
            timestamp: Utc::now(),
            severity,
            message,
            exit_code,
        };
        if let Ok(line) = serde_json::to_string(&record) {
            let mut file = self.file.lock();
            if let Err(e) = writeln!(file, "{line}") {
                tracing::warn!("failed to append run log record: {e}");
            }
        }
    }
}
