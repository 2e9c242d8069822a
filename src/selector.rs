use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::config::{ResolvedConfiguration, Selection};
use crate::utils::has_pdf_extension;

/// Lists the PDF files a run should attempt, in directory walk order.
pub fn select_candidates(config: &ResolvedConfiguration) -> Vec<PathBuf> {
    match config.selection() {
        Selection::Single { path } => vec![path.clone()],
        Selection::All { folder } => find_pdfs(folder, config.recursive()),
        Selection::Regex { pattern, folder } => find_pdfs(folder, config.recursive())
            .into_iter()
            .filter(|path| {
                path.file_name()
                    .map_or(false, |name| pattern.matches(&name.to_string_lossy()))
            })
            .collect(),
    }
}

/// Every `.pdf` file in `folder`, descending into subfolders only when `recursive`.
pub fn find_pdfs(folder: &Path, recursive: bool) -> Vec<PathBuf> {
    let mut walker = WalkDir::new(folder).min_depth(1);
    if !recursive {
        walker = walker.max_depth(1);
    }
    walker
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::debug!("skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file() && has_pdf_extension(entry.path()))
        .map(|entry| entry.into_path())
        .collect()
}
