use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;

use crate::config::ResolvedConfiguration;
use crate::utils::auto_log_name;

/// Writes run messages to the console and, when configured, to a log file.
///
/// `info` and `warn` are silenced by `-mute`; `error` and `always` are not.
/// The log file receives every message regardless of muting.
pub struct Logger {
    muted: bool,
    sink: Option<LogSink>,
}

struct LogSink {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl Logger {
    pub fn console(muted: bool) -> Self {
        Self { muted, sink: None }
    }

    /// Creates (or truncates) the log file at `path`.
    pub fn with_file(muted: bool, path: &Path) -> Result<Self> {
        let file = File::create(path).with_context(|| format!("Failed to open log file {}", path.display()))?;
        Ok(Self {
            muted,
            sink: Some(LogSink {
                path: path.to_path_buf(),
                writer: BufWriter::new(file),
            }),
        })
    }

    /// Builds the logger for a run. A log file that cannot be opened is reported
    /// and the run continues with console output only.
    pub fn for_config(config: &ResolvedConfiguration) -> Self {
        let path = if config.auto_log_name() {
            Some(PathBuf::from(auto_log_name()))
        } else {
            config.log_path().map(Path::to_path_buf)
        };
        match path {
            None => Self::console(config.muted()),
            Some(path) => Self::with_file(config.muted(), &path).unwrap_or_else(|e| {
                eprintln!("[ERROR] {:#}. Continuing without a log file.", e);
                Self::console(config.muted())
            }),
        }
    }

    pub fn log_path(&self) -> Option<&Path> {
        self.sink.as_ref().map(|sink| sink.path.as_path())
    }

    pub fn info(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        if !self.muted {
            println!("[INFO] {}", message);
        }
        self.write_line("INFO", message);
    }

    pub fn warn(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        if !self.muted {
            println!("[WARN] {}", message);
        }
        self.write_line("WARN", message);
    }

    pub fn error(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        eprintln!("[ERROR] {}", message);
        self.write_line("ERROR", &format!("ERROR: {}", message));
    }

    /// Banner, prompts and the final summary: shown even when muted.
    pub fn always(&mut self, message: impl AsRef<str>) {
        let message = message.as_ref();
        println!("{}", message);
        self.write_line("INFO", message);
    }

    /// Appends a raw line to the log file only.
    pub fn record(&mut self, line: &str) {
        if let Some(sink) = self.sink.as_mut() {
            if let Err(e) = writeln!(sink.writer, "{}", line) {
                log::warn!("could not write to {}: {}", sink.path.display(), e);
            }
        }
    }

    fn write_line(&mut self, level: &str, message: &str) {
        if self.sink.is_some() {
            let stamp = Local::now().format("%Y-%m-%d %H:%M:%S");
            self.record(&format!("{} [{}] {}", stamp, level, message));
        }
    }

    /// Flushes and closes the log file.
    pub fn close(mut self) -> Result<()> {
        if let Some(mut sink) = self.sink.take() {
            sink.writer
                .flush()
                .with_context(|| format!("Failed to flush log file {}", sink.path.display()))?;
        }
        Ok(())
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            let _ = sink.writer.flush();
        }
    }
}
