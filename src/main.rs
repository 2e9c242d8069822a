mod args;
mod config;
mod error;
mod logger;
mod models;
mod orchestrator;
mod pdf_processor;
mod prompt;
mod selector;
mod utils;

use std::path::Path;
use std::process::ExitCode;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use anyhow::Result;
use config::ResolvedConfiguration;
use logger::Logger;
use models::ProgressEvent;
use orchestrator::Orchestrator;
use pdf_processor::PdfProcessor;
use prompt::StdinPrompt;

fn main() -> ExitCode {
    env_logger::init();

    let config = match ResolvedConfiguration::from_args(std::env::args().skip(1)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ERROR: {:#}", anyhow::Error::new(e));
            return ExitCode::from(2);
        }
    };

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &ResolvedConfiguration) -> Result<()> {
    let mut logger = Logger::for_config(config);
    logger.always(config.to_string());
    if let Some(path) = logger.log_path().map(Path::to_path_buf) {
        logger.info(format!("Logging to {}", path.display()));
    }

    log::debug!(
        "mode {:?}, path {:?}, regex {:?}, folder {:?}, absolute paths: {}, log file: {}",
        config.mode(),
        config.single_path(),
        config.regex_pattern().map(|p| p.as_str()),
        config.search_folder(),
        config.path_is_absolute(),
        config.logging_enabled()
    );

    let candidates = selector::select_candidates(config);
    logger.always(format!("Found {} PDF files, extracting...", candidates.len()));

    let (tx, rx) = mpsc::channel();
    let printer = spawn_progress_printer(rx, config.muted());
    let mut prompt = StdinPrompt;
    let summary = Orchestrator::new(&PdfProcessor, &mut prompt, &mut logger, config.overwrite())
        .with_progress(tx)
        .run(&candidates);
    // The sender went away with the orchestrator, so the printer has finished its queue.
    if printer.join().is_err() {
        log::warn!("progress printer panicked");
    }

    logger.always(summary.to_string());
    match serde_json::to_string(&summary) {
        Ok(json) => logger.record(&json),
        Err(e) => log::warn!("could not serialize run summary: {}", e),
    }
    logger.close()
}

fn spawn_progress_printer(events: Receiver<ProgressEvent>, muted: bool) -> JoinHandle<()> {
    thread::spawn(move || {
        for event in events {
            let ProgressEvent::FileCompleted { index, total, path, result } = event;
            if !muted {
                println!("[PROGRESS] {}/{} {} ({})", index, total, path.display(), result.label());
            }
        }
    })
}
