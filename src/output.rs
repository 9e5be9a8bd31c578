//! Data model shared by the pipeline stages.

use serde::{Deserialize, Serialize};

/// One entry of a document outline: a named jump target.
///
/// Entries are kept in outline (depth-first) order; `level` starts at 1 for
/// top-level bookmarks and `page` is 1-indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub level: usize,
    pub title: String,
    pub page: usize,
}

impl TocEntry {
    pub fn new(level: usize, title: impl Into<String>, page: usize) -> Self {
        Self {
            level,
            title: title.into(),
            page,
        }
    }
}

/// A contiguous page range treated as one unit of generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    /// First page, 1-indexed, inclusive.
    pub start_page: usize,
    /// Last page, 1-indexed, inclusive. Never smaller than `start_page`.
    pub end_page: usize,
    pub text: String,
}

impl Section {
    /// Number of pages the section spans (always at least 1).
    pub fn page_span(&self) -> usize {
        self.end_page - self.start_page + 1
    }
}

/// A maximal piece of a line sharing one styling attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextRun {
    pub content: String,
    pub bold: bool,
}

impl TextRun {
    pub fn plain(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            bold: false,
        }
    }

    pub fn bold(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            bold: true,
        }
    }
}

/// Text and outline pulled out of a PDF, ready for section extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfText {
    /// Raw text of every page, in page order (index 0 is page 1).
    pub pages: Vec<String>,
    /// Flattened outline, empty when the document has no bookmarks.
    pub toc: Vec<TocEntry>,
}

impl PdfText {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Raw text of a 1-indexed page; empty for out-of-range pages.
    pub fn page_text(&self, page: usize) -> &str {
        page.checked_sub(1)
            .and_then(|idx| self.pages.get(idx))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// Terminal artefact of one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Public URL (or local path) of the uploaded .docx.
    pub output_location: String,
    /// Number of sections sent through generation.
    pub section_count: usize,
}
