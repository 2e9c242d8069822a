use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::time::Instant;

use anyhow::{Context, Result};

use crate::config::OverwritePolicy;
use crate::logger::Logger;
use crate::models::{ExtractionResult, ProgressEvent, RunSummary, RunTotals};
use crate::pdf_processor::{OpenOutcome, PdfDecoder, PdfDocument};
use crate::prompt::{interpret, Answer, OverwritePrompt};
use crate::utils::{count_words, text_path_for};

/// Extracts the candidates one by one, folding each outcome into the run totals.
///
/// A failing file is logged and counted; it never stops the batch.
pub struct Orchestrator<'a> {
    decoder: &'a dyn PdfDecoder,
    prompt: &'a mut dyn OverwritePrompt,
    logger: &'a mut Logger,
    overwrite: OverwritePolicy,
    progress: Option<Sender<ProgressEvent>>,
    totals: RunTotals,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        decoder: &'a dyn PdfDecoder,
        prompt: &'a mut dyn OverwritePrompt,
        logger: &'a mut Logger,
        overwrite: OverwritePolicy,
    ) -> Self {
        Self {
            decoder,
            prompt,
            logger,
            overwrite,
            progress: None,
            totals: RunTotals::default(),
        }
    }

    pub fn with_progress(mut self, progress: Sender<ProgressEvent>) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn run(mut self, candidates: &[PathBuf]) -> RunSummary {
        let started = Instant::now();
        let total = candidates.len();
        for (index, pdf) in candidates.iter().enumerate() {
            let result = self.extract_one(pdf);
            self.totals.record(&result);
            if let Some(progress) = &self.progress {
                // The observer may have gone away; progress is best effort.
                let _ = progress.send(ProgressEvent::FileCompleted {
                    index: index + 1,
                    total,
                    path: pdf.clone(),
                    result,
                });
            }
        }
        RunSummary::new(self.totals, started.elapsed())
    }

    pub fn extract_one(&mut self, pdf: &Path) -> ExtractionResult {
        match self.try_extract(pdf) {
            Ok(result) => result,
            Err(e) => {
                self.logger
                    .error(format!("Could not extract text from {}: {:#}", pdf.display(), e));
                ExtractionResult::Failed {
                    error: format!("{:#}", e),
                }
            }
        }
    }

    fn try_extract(&mut self, pdf: &Path) -> Result<ExtractionResult> {
        self.logger.info(format!("Starting extraction from {}...", pdf.display()));

        let document = match self.decoder.open(pdf)? {
            OpenOutcome::Encrypted => {
                self.logger.info("Encrypted PDF, skipping it.");
                return Ok(ExtractionResult::SkippedEncrypted);
            }
            OpenOutcome::Document(document) => document,
        };

        let text_path = text_path_for(pdf);
        let existed = text_path.exists();
        if existed {
            match self.overwrite {
                OverwritePolicy::All => {
                    self.logger
                        .info(format!("{} already exists, overwriting it.", text_path.display()));
                }
                OverwritePolicy::None => {
                    self.logger.info(format!(
                        "{} already exists and overwriting is off, skipping it.",
                        text_path.display()
                    ));
                    return Ok(ExtractionResult::SkippedExisting);
                }
                OverwritePolicy::Select => {
                    if !self.confirm_overwrite(&text_path) {
                        return Ok(ExtractionResult::SkippedDeclined);
                    }
                }
            }
        }

        self.logger
            .info(format!("This PDF has {} pages.", document.page_count()));
        let text = collect_text(document.as_ref())?;
        if text.is_empty() {
            self.logger
                .warn(format!("No text could be extracted from {}!", pdf.display()));
        }
        let words = count_words(&text);

        fs::write(&text_path, &text)
            .with_context(|| format!("Failed to write {}", text_path.display()))?;
        self.logger.info(format!(
            "Extracted {} words into {}.",
            words,
            text_path.display()
        ));

        Ok(if existed {
            ExtractionResult::Overwritten { words }
        } else {
            ExtractionResult::Written { words }
        })
    }

    fn confirm_overwrite(&mut self, text_path: &Path) -> bool {
        self.logger
            .always(format!("{} already exists. Overwrite it? (y/n)", text_path.display()));
        match interpret(self.prompt.read_answer().as_deref()) {
            Answer::Yes => {
                self.logger.info("The answer is YES, overwriting.");
                true
            }
            Answer::No => {
                self.logger.info("The answer is NO, skipping.");
                false
            }
            Answer::Unrecognized(answer) => {
                self.logger.info(format!(
                    "The answer '{}' is not understood, skipping the file.",
                    answer
                ));
                false
            }
        }
    }
}

/// Joins the pages in order with a single line break between them.
pub fn collect_text(document: &dyn PdfDocument) -> Result<String> {
    let pages = (0..document.page_count())
        .map(|index| document.page_text(index))
        .collect::<Result<Vec<_>>>()?;
    Ok(pages.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::ScriptedPrompt;
    use std::collections::HashMap;
    use std::sync::mpsc;
    use tempfile::TempDir;

    enum Fake {
        Pages(Vec<&'static str>),
        Encrypted,
        BadPage,
    }

    struct FakeDocument {
        pages: Vec<&'static str>,
        bad_page: bool,
    }

    impl PdfDocument for FakeDocument {
        fn page_count(&self) -> usize {
            self.pages.len().max(usize::from(self.bad_page))
        }

        fn page_text(&self, index: usize) -> Result<String> {
            if self.bad_page {
                anyhow::bail!("page {} is damaged", index + 1);
            }
            Ok(self.pages[index].to_string())
        }
    }

    #[derive(Default)]
    struct FakeDecoder {
        files: HashMap<PathBuf, Fake>,
    }

    impl FakeDecoder {
        fn with(mut self, path: PathBuf, fake: Fake) -> Self {
            self.files.insert(path, fake);
            self
        }
    }

    impl PdfDecoder for FakeDecoder {
        fn open(&self, path: &Path) -> Result<OpenOutcome> {
            match self.files.get(path) {
                Some(Fake::Pages(pages)) => Ok(OpenOutcome::Document(Box::new(FakeDocument {
                    pages: pages.clone(),
                    bad_page: false,
                }))),
                Some(Fake::BadPage) => Ok(OpenOutcome::Document(Box::new(FakeDocument {
                    pages: Vec::new(),
                    bad_page: true,
                }))),
                Some(Fake::Encrypted) => Ok(OpenOutcome::Encrypted),
                None => anyhow::bail!("not a pdf: {}", path.display()),
            }
        }
    }

    fn run(
        decoder: &FakeDecoder,
        prompt: &mut ScriptedPrompt,
        overwrite: OverwritePolicy,
        candidates: &[PathBuf],
    ) -> RunSummary {
        let mut logger = Logger::console(true);
        Orchestrator::new(decoder, prompt, &mut logger, overwrite).run(candidates)
    }

    #[test]
    fn test_pages_joined_and_words_counted() {
        let dir = TempDir::new().unwrap();
        let pdf = dir.path().join("a.pdf");
        let decoder = FakeDecoder::default().with(pdf.clone(), Fake::Pages(vec!["hello world", "foo"]));
        let mut prompt = ScriptedPrompt::new(&[]);

        let summary = run(&decoder, &mut prompt, OverwritePolicy::All, &[pdf]);

        let text = fs::read_to_string(dir.path().join("a.txt")).unwrap();
        assert_eq!(text, "hello world\nfoo");
        assert_eq!(summary.totals.words, 3);
        assert_eq!(summary.totals.written, 1);
        assert_eq!(summary.totals.files, 1);
    }

    #[test]
    fn test_encrypted_is_skipped_without_output() {
        let dir = TempDir::new().unwrap();
        let pdf = dir.path().join("secret.pdf");
        let decoder = FakeDecoder::default().with(pdf.clone(), Fake::Encrypted);
        let mut prompt = ScriptedPrompt::new(&[]);

        let summary = run(&decoder, &mut prompt, OverwritePolicy::All, &[pdf]);

        assert_eq!(summary.totals.skipped_encrypted, 1);
        assert!(!dir.path().join("secret.txt").exists());
    }

    #[test]
    fn test_overwrite_none_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let pdf = dir.path().join("b.pdf");
        let existing = dir.path().join("b.txt");
        fs::write(&existing, "keep me").unwrap();
        let decoder = FakeDecoder::default().with(pdf.clone(), Fake::Pages(vec!["new text"]));
        let mut prompt = ScriptedPrompt::new(&[]);

        let first = run(&decoder, &mut prompt, OverwritePolicy::None, &[pdf.clone()]);
        let second = run(&decoder, &mut prompt, OverwritePolicy::None, &[pdf]);

        assert_eq!(first.totals, second.totals);
        assert_eq!(first.totals.skipped_existing, 1);
        assert_eq!(first.totals.words, 0);
        assert_eq!(fs::read_to_string(&existing).unwrap(), "keep me");
        assert_eq!(prompt.asked, 0);
    }

    #[test]
    fn test_overwrite_all_replaces_existing() {
        let dir = TempDir::new().unwrap();
        let pdf = dir.path().join("b.pdf");
        fs::write(dir.path().join("b.txt"), "old old old old").unwrap();
        let decoder = FakeDecoder::default().with(pdf.clone(), Fake::Pages(vec!["new"]));
        let mut prompt = ScriptedPrompt::new(&[]);

        let summary = run(&decoder, &mut prompt, OverwritePolicy::All, &[pdf]);

        assert_eq!(summary.totals.overwritten, 1);
        assert_eq!(fs::read_to_string(dir.path().join("b.txt")).unwrap(), "new");
        assert_eq!(prompt.asked, 0);
    }

    #[test]
    fn test_select_declined_keeps_file() {
        let dir = TempDir::new().unwrap();
        let pdf = dir.path().join("b.pdf");
        fs::write(dir.path().join("b.txt"), "original").unwrap();
        let decoder = FakeDecoder::default().with(pdf.clone(), Fake::Pages(vec!["replacement words"]));
        let mut prompt = ScriptedPrompt::new(&["N"]);

        let summary = run(&decoder, &mut prompt, OverwritePolicy::Select, &[pdf]);

        assert_eq!(summary.totals.skipped_declined, 1);
        assert_eq!(summary.totals.words, 0);
        assert_eq!(fs::read_to_string(dir.path().join("b.txt")).unwrap(), "original");
        assert_eq!(prompt.asked, 1);
    }

    #[test]
    fn test_select_answers_per_file() {
        let dir = TempDir::new().unwrap();
        let mut candidates = Vec::new();
        let mut decoder = FakeDecoder::default();
        for name in ["one", "two", "three", "four"] {
            let pdf = dir.path().join(format!("{}.pdf", name));
            fs::write(dir.path().join(format!("{}.txt", name)), "old").unwrap();
            decoder = decoder.with(pdf.clone(), Fake::Pages(vec!["fresh text"]));
            candidates.push(pdf);
        }
        // The last question finds no input left and is declined.
        let mut prompt = ScriptedPrompt::new(&["y", "what", "YES"]);

        let summary = run(&decoder, &mut prompt, OverwritePolicy::Select, &candidates);

        assert_eq!(summary.totals.overwritten, 2);
        assert_eq!(summary.totals.skipped_declined, 2);
        assert_eq!(summary.totals.words, 4);
        assert_eq!(fs::read_to_string(dir.path().join("one.txt")).unwrap(), "fresh text");
        assert_eq!(fs::read_to_string(dir.path().join("two.txt")).unwrap(), "old");
        assert_eq!(fs::read_to_string(dir.path().join("three.txt")).unwrap(), "fresh text");
        assert_eq!(fs::read_to_string(dir.path().join("four.txt")).unwrap(), "old");
    }

    #[test]
    fn test_select_never_asks_without_existing_output() {
        let dir = TempDir::new().unwrap();
        let pdf = dir.path().join("fresh.pdf");
        let decoder = FakeDecoder::default().with(pdf.clone(), Fake::Pages(vec!["a b"]));
        let mut prompt = ScriptedPrompt::new(&[]);

        let summary = run(&decoder, &mut prompt, OverwritePolicy::Select, &[pdf]);

        assert_eq!(summary.totals.written, 1);
        assert_eq!(prompt.asked, 0);
    }

    #[test]
    fn test_empty_text_still_written() {
        let dir = TempDir::new().unwrap();
        let pdf = dir.path().join("blank.pdf");
        let decoder = FakeDecoder::default().with(pdf.clone(), Fake::Pages(vec![""]));
        let mut prompt = ScriptedPrompt::new(&[]);

        let summary = run(&decoder, &mut prompt, OverwritePolicy::None, &[pdf]);

        assert_eq!(summary.totals.written, 1);
        assert_eq!(summary.totals.words, 0);
        assert_eq!(fs::read_to_string(dir.path().join("blank.txt")).unwrap(), "");
    }

    #[test]
    fn test_failures_do_not_stop_the_batch() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("unknown.pdf");
        let damaged = dir.path().join("damaged.pdf");
        let good = dir.path().join("good.pdf");
        let decoder = FakeDecoder::default()
            .with(damaged.clone(), Fake::BadPage)
            .with(good.clone(), Fake::Pages(vec!["one two", "three"]));
        let mut prompt = ScriptedPrompt::new(&[]);

        let summary = run(&decoder, &mut prompt, OverwritePolicy::None, &[missing, damaged, good]);

        assert_eq!(summary.totals.files, 3);
        assert_eq!(summary.totals.failed, 2);
        assert_eq!(summary.totals.written, 1);
        assert_eq!(summary.totals.words, 3);
        assert!(!dir.path().join("damaged.txt").exists());
    }

    #[test]
    fn test_write_failure_is_recorded() {
        let dir = TempDir::new().unwrap();
        let pdf = dir.path().join("blocked.pdf");
        // A directory where the text file should go makes the write fail.
        fs::create_dir(dir.path().join("blocked.txt")).unwrap();
        let decoder = FakeDecoder::default().with(pdf.clone(), Fake::Pages(vec!["text"]));
        let mut prompt = ScriptedPrompt::new(&[]);
        let mut logger = Logger::console(true);

        let result = Orchestrator::new(&decoder, &mut prompt, &mut logger, OverwritePolicy::All).extract_one(&pdf);

        assert!(matches!(result, ExtractionResult::Failed { ref error } if error.contains("blocked.txt")));
    }

    #[test]
    fn test_word_total_is_reproducible() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");
        let decoder = FakeDecoder::default()
            .with(a.clone(), Fake::Pages(vec!["alpha beta", "gamma"]))
            .with(b.clone(), Fake::Pages(vec!["  delta\n\tepsilon  "]));
        let mut prompt = ScriptedPrompt::new(&[]);

        let first = run(&decoder, &mut prompt, OverwritePolicy::All, &[a.clone(), b.clone()]);
        let second = run(&decoder, &mut prompt, OverwritePolicy::All, &[a, b]);

        assert_eq!(first.totals.words, 5);
        assert_eq!(second.totals.words, 5);
        assert_eq!(second.totals.overwritten, 2);
    }

    #[test]
    fn test_progress_events_follow_each_file() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.pdf");
        let b = dir.path().join("b.pdf");
        let decoder = FakeDecoder::default()
            .with(a.clone(), Fake::Pages(vec!["x"]))
            .with(b.clone(), Fake::Encrypted);
        let mut prompt = ScriptedPrompt::new(&[]);
        let mut logger = Logger::console(true);
        let (tx, rx) = mpsc::channel();

        Orchestrator::new(&decoder, &mut prompt, &mut logger, OverwritePolicy::None)
            .with_progress(tx)
            .run(&[a.clone(), b]);

        let events: Vec<ProgressEvent> = rx.iter().collect();
        assert_eq!(events.len(), 2);
        let ProgressEvent::FileCompleted { index, total, path, result } = &events[0];
        assert_eq!((*index, *total), (1, 2));
        assert_eq!(path, &a);
        assert_eq!(result, &ExtractionResult::Written { words: 1 });
    }

    #[test]
    fn test_dropped_observer_does_not_block() {
        let dir = TempDir::new().unwrap();
        let a = dir.path().join("a.pdf");
        let decoder = FakeDecoder::default().with(a.clone(), Fake::Pages(vec!["x"]));
        let mut prompt = ScriptedPrompt::new(&[]);
        let mut logger = Logger::console(true);
        let (tx, rx) = mpsc::channel();
        drop(rx);

        let summary = Orchestrator::new(&decoder, &mut prompt, &mut logger, OverwritePolicy::None)
            .with_progress(tx)
            .run(&[a]);

        assert_eq!(summary.totals.written, 1);
    }

    #[test]
    fn test_errors_reach_the_log_file() {
        let dir = TempDir::new().unwrap();
        let log_path = dir.path().join("run.log");
        let decoder = FakeDecoder::default();
        let mut prompt = ScriptedPrompt::new(&[]);
        let mut logger = Logger::with_file(true, &log_path).unwrap();

        Orchestrator::new(&decoder, &mut prompt, &mut logger, OverwritePolicy::None)
            .run(&[dir.path().join("nothing.pdf")]);
        logger.close().unwrap();

        let log = fs::read_to_string(&log_path).unwrap();
        assert!(log.contains("ERROR: Could not extract text from"));
        assert!(log.contains("not a pdf"));
    }
}
