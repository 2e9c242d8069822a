use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use chrono::Utc;

/// The text file written next to a PDF: same folder, same base name, `.txt`.
pub fn text_path_for(pdf: &Path) -> PathBuf {
    pdf.with_extension("txt")
}

/// Case-sensitive check for a `.pdf` extension.
pub fn has_pdf_extension(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "pdf")
}

pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Drops trailing separators, keeping a lone root as it is.
pub fn normalize_folder(value: &str) -> PathBuf {
    let trimmed = value.trim_end_matches(|c| c == '/' || c == MAIN_SEPARATOR);
    if trimmed.is_empty() && !value.is_empty() {
        PathBuf::from(&value[..1])
    } else {
        PathBuf::from(trimmed)
    }
}

pub fn auto_log_name() -> String {
    format!("log_{}.log", Utc::now().timestamp_millis())
}
