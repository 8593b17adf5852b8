//! Queueing files for mailing.
//!
//! The shell only records the request; a separate mailer process consumes the
//! queue file, one task per line: `<absolute path> <file name> "<address>"`.

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// File name of the default queue inside the system temp directory.
pub const DEFAULT_QUEUE_NAME: &str = "easy_shell_mail_tasks";

/// One queued mail task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailTask {
    pub path: PathBuf,
    pub file_name: String,
    pub destination: String,
}

impl MailTask {
    /// The queue line for this task, without the trailing newline.
    ///
    /// Path and file name are quoted only when they contain whitespace or a
    /// quote, which keeps plain records identical to the historical format.
    pub fn record(&self) -> String {
        format!(
            "{} {} {}",
            quote_if_needed(&self.path.to_string_lossy()),
            quote_if_needed(&self.file_name),
            quote(&self.destination)
        )
    }
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn quote_if_needed(field: &str) -> String {
    if field.chars().any(|c| c.is_whitespace() || c == '"') {
        quote(field)
    } else {
        field.to_string()
    }
}

/// Destination for mail tasks.
pub trait TaskSink {
    fn append(&mut self, task: &MailTask) -> Result<()>;
}

/// Appends tasks to a shared queue file, creating it on first use.
#[derive(Debug, Clone)]
pub struct FileTaskSink {
    path: PathBuf,
}

impl FileTaskSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<temp dir>/easy_shell_mail_tasks`.
    pub fn default_path() -> PathBuf {
        std::env::temp_dir().join(DEFAULT_QUEUE_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TaskSink for FileTaskSink {
    fn append(&mut self, task: &MailTask) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("can't open task queue {}", self.path.display()))?;
        writeln!(file, "{}", task.record())
            .with_context(|| format!("can't write task queue {}", self.path.display()))?;
        Ok(())
    }
}
