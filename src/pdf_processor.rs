use std::path::Path;

use anyhow::{Context, Result};
use pdf::content::{Content, Op, TextDrawAdjusted};
use pdf::error::PdfError;
use pdf::file::{CachedFile, FileOptions};
use pdf::object::Resolve;

/// Result of opening a PDF: either a readable document or an encrypted one we skip.
pub enum OpenOutcome {
    Document(Box<dyn PdfDocument>),
    Encrypted,
}

/// A PDF whose pages can be read as text.
pub trait PdfDocument {
    fn page_count(&self) -> usize;

    /// Text of the page at zero-based `index`.
    fn page_text(&self, index: usize) -> Result<String>;
}

pub trait PdfDecoder {
    fn open(&self, path: &Path) -> Result<OpenOutcome>;
}

/// Kerning in a `TJ` array below this (thousandths of an em) is read as a word gap.
const WORD_GAP: f32 = -200.0;

/// Decoder backed by the `pdf` crate.
pub struct PdfProcessor;

impl PdfDecoder for PdfProcessor {
    fn open(&self, path: &Path) -> Result<OpenOutcome> {
        log::debug!("Opening PDF: {}", path.display());
        let file = match FileOptions::cached().open(path) {
            Err(PdfError::InvalidPassword) => return Ok(OpenOutcome::Encrypted),
            other => other.with_context(|| format!("Failed to open PDF at {}", path.display()))?,
        };
        if file.trailer.encrypt_dict.is_some() {
            return Ok(OpenOutcome::Encrypted);
        }
        log::debug!("PDF has {} pages", file.num_pages());
        Ok(OpenOutcome::Document(Box::new(LoadedPdf { file })))
    }
}

struct LoadedPdf {
    file: CachedFile<Vec<u8>>,
}

impl PdfDocument for LoadedPdf {
    fn page_count(&self) -> usize {
        self.file.num_pages() as usize
    }

    fn page_text(&self, index: usize) -> Result<String> {
        let page = self
            .file
            .get_page(index as u32)
            .with_context(|| format!("Failed to get page {}", index + 1))?;
        let mut text = String::new();
        if let Some(content) = &page.contents {
            extract_text_from_content(&self.file, content, &mut text)
                .with_context(|| format!("Failed to read the content of page {}", index + 1))?;
        }
        Ok(text.trim_end().to_string())
    }
}

fn extract_text_from_content(resolver: &impl Resolve, content: &Content, text: &mut String) -> Result<()> {
    for op in content.operations(resolver)? {
        match op {
            Op::TextDraw { text: t } => {
                text.push_str(&t.to_string_lossy());
            }
            Op::TextDrawAdjusted { array } => {
                for item in array {
                    match item {
                        TextDrawAdjusted::Text(t) => text.push_str(&t.to_string_lossy()),
                        TextDrawAdjusted::Spacing(gap) if gap < WORD_GAP => push_separator(text, ' '),
                        TextDrawAdjusted::Spacing(_) => {}
                    }
                }
            }
            Op::TextNewline => push_separator(text, '\n'),
            Op::MoveTextPosition { translation } => {
                if translation.y.abs() > f32::EPSILON {
                    push_separator(text, '\n');
                } else if translation.x > 0.0 {
                    push_separator(text, ' ');
                }
            }
            _ => {}
        }
    }
    Ok(())
}

/// Avoids stacking separators, and never starts a page with one.
fn push_separator(text: &mut String, separator: char) {
    match text.chars().last() {
        None => {}
        Some(last) if last == '\n' => {}
        Some(last) if last == ' ' && separator == '\n' => {
            text.pop();
            text.push('\n');
        }
        Some(last) if last == ' ' => {}
        Some(_) => text.push(separator),
    }
}
