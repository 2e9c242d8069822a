use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use serde::Serialize;

/// Outcome of one candidate PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExtractionResult {
    SkippedEncrypted,
    SkippedExisting,
    SkippedDeclined,
    Written { words: usize },
    Overwritten { words: usize },
    Failed { error: String },
}

impl ExtractionResult {
    pub fn words(&self) -> usize {
        match self {
            ExtractionResult::Written { words } | ExtractionResult::Overwritten { words } => *words,
            _ => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExtractionResult::SkippedEncrypted => "skipped, encrypted",
            ExtractionResult::SkippedExisting => "skipped, text file exists",
            ExtractionResult::SkippedDeclined => "skipped, overwrite declined",
            ExtractionResult::Written { .. } => "written",
            ExtractionResult::Overwritten { .. } => "overwritten",
            ExtractionResult::Failed { .. } => "failed",
        }
    }
}

/// Running totals folded from every [`ExtractionResult`] of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct RunTotals {
    pub words: u64,
    pub files: usize,
    pub written: usize,
    pub overwritten: usize,
    pub skipped_encrypted: usize,
    pub skipped_existing: usize,
    pub skipped_declined: usize,
    pub failed: usize,
}

impl RunTotals {
    pub fn record(&mut self, result: &ExtractionResult) {
        self.files += 1;
        self.words += result.words() as u64;
        match result {
            ExtractionResult::SkippedEncrypted => self.skipped_encrypted += 1,
            ExtractionResult::SkippedExisting => self.skipped_existing += 1,
            ExtractionResult::SkippedDeclined => self.skipped_declined += 1,
            ExtractionResult::Written { .. } => self.written += 1,
            ExtractionResult::Overwritten { .. } => self.overwritten += 1,
            ExtractionResult::Failed { .. } => self.failed += 1,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    #[serde(flatten)]
    pub totals: RunTotals,
    pub elapsed_ms: u64,
    pub finished_at: String,
}

impl RunSummary {
    pub fn new(totals: RunTotals, elapsed: Duration) -> Self {
        Self {
            totals,
            elapsed_ms: elapsed.as_millis() as u64,
            finished_at: Local::now().to_rfc3339(),
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Success! {} words were extracted from {} PDF files in {:.2}s ({} written, {} overwritten, {} skipped, {} failed).",
            self.totals.words,
            self.totals.files,
            self.elapsed_ms as f64 / 1000.0,
            self.totals.written,
            self.totals.overwritten,
            self.totals.skipped_encrypted + self.totals.skipped_existing + self.totals.skipped_declined,
            self.totals.failed,
        )
    }
}

/// Sent to an optional observer after each candidate is finished.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    FileCompleted {
        index: usize,
        total: usize,
        path: PathBuf,
        result: ExtractionResult,
    },
}
