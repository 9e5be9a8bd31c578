//! PDF reading: page text and outline via pdfium.
//!
//! ## Why spawn_blocking?
//!
//! `pdfium-render` wraps the pdfium C++ library, which keeps thread-local
//! state and must not be driven from an async worker thread. The whole
//! document is read inside `spawn_blocking` and handed back as an owned
//! [`PdfText`], so nothing pdfium-related crosses an `.await`.

use crate::error::Pdf2DocxError;
use crate::output::{PdfText, TocEntry};
use async_trait::async_trait;
use pdfium_render::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Source of page text and outline for a PDF on disk.
#[async_trait]
pub trait DocumentReader: Send + Sync {
    async fn read(&self, path: &Path) -> Result<PdfText, Pdf2DocxError>;
}

/// [`DocumentReader`] backed by pdfium.
#[derive(Debug, Clone, Default)]
pub struct PdfiumReader {
    lib_dir: Option<PathBuf>,
}

impl PdfiumReader {
    /// `lib_dir` is the directory holding the pdfium shared library;
    /// `None` binds to the system library.
    pub fn new(lib_dir: Option<PathBuf>) -> Self {
        Self { lib_dir }
    }

    /// Bind once to surface a missing library at startup instead of on the
    /// first request.
    pub fn check_binding(&self) -> Result<(), Pdf2DocxError> {
        bind_pdfium(self.lib_dir.as_deref()).map(|_| ())
    }
}

#[async_trait]
impl DocumentReader for PdfiumReader {
    async fn read(&self, path: &Path) -> Result<PdfText, Pdf2DocxError> {
        let path = path.to_path_buf();
        let lib_dir = self.lib_dir.clone();

        tokio::task::spawn_blocking(move || read_blocking(&path, lib_dir.as_deref()))
            .await
            .map_err(|e| Pdf2DocxError::Internal(format!("PDF read task panicked: {}", e)))?
    }
}

fn bind_pdfium(lib_dir: Option<&Path>) -> Result<Pdfium, Pdf2DocxError> {
    let bindings = match lib_dir {
        Some(dir) => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(dir)),
        None => Pdfium::bind_to_system_library(),
    }
    .map_err(|e| Pdf2DocxError::PdfiumBindingFailed(format!("{:?}", e)))?;

    Ok(Pdfium::new(bindings))
}

/// Blocking implementation of [`PdfiumReader::read`].
fn read_blocking(pdf_path: &Path, lib_dir: Option<&Path>) -> Result<PdfText, Pdf2DocxError> {
    let pdfium = bind_pdfium(lib_dir)?;

    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| Pdf2DocxError::CorruptPdf {
            path: pdf_path.to_path_buf(),
            detail: format!("{:?}", e),
        })?;

    let pages = document.pages();
    let mut texts = Vec::with_capacity(pages.len() as usize);
    for (idx, page) in pages.iter().enumerate() {
        let text = page.text().map_err(|e| Pdf2DocxError::PageTextFailed {
            page: idx + 1,
            detail: format!("{:?}", e),
        })?;
        texts.push(text.all());
    }

    let mut toc = Vec::new();
    if let Some(first) = document.bookmarks().root() {
        collect_bookmarks(first, 1, &mut toc);
    }

    info!(
        "PDF loaded: {} pages, {} outline entries",
        texts.len(),
        toc.len()
    );

    Ok(PdfText { pages: texts, toc })
}

/// Walk a bookmark sibling chain depth-first, recording each entry's level.
///
/// Bookmarks whose destination does not resolve to a page are skipped.
fn collect_bookmarks(first: PdfBookmark<'_>, level: usize, out: &mut Vec<TocEntry>) {
    let mut current = Some(first);

    while let Some(bookmark) = current {
        let title = bookmark.title().unwrap_or_default();
        let page = bookmark
            .destination()
            .and_then(|dest| dest.page_index().ok())
            .map(|idx| idx as usize + 1);

        match page {
            Some(page) => out.push(TocEntry::new(level, title, page)),
            None => debug!("Skipping bookmark '{}' without a page destination", title),
        }

        if let Some(child) = bookmark.first_child() {
            collect_bookmarks(child, level + 1, out);
        }

        current = bookmark.next_sibling();
    }
}
