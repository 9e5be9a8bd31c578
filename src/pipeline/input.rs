//! Input handling: upload filenames, PDF validation and scratch storage.
//!
//! pdfium needs a file-system path, and the output package is staged on disk
//! before upload. Every request gets its own [`ScratchDir`] backed by a
//! `TempDir`; staged files are removed when it is dropped.

use crate::error::Pdf2DocxError;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;

/// Leading bytes of every PDF file.
pub const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Reduce an uploaded filename to a safe object name.
///
/// Decomposes to ASCII, turns path separators and whitespace runs into
/// underscores, drops anything outside `[A-Za-z0-9_.-]` and strips leading
/// or trailing dots and underscores. `Informe Año 2024.pdf` becomes
/// `Informe_Ano_2024.pdf`; `../../etc/passwd` becomes `etc_passwd`.
pub fn sanitize_filename(name: &str) -> Result<String, Pdf2DocxError> {
    let ascii: String = name.nfkd().filter(char::is_ascii).collect();
    let spaced = ascii.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");

    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    let cleaned = kept.trim_matches(|c| c == '.' || c == '_');

    if cleaned.is_empty() {
        return Err(Pdf2DocxError::InvalidFilename {
            original: name.to_string(),
        });
    }
    Ok(cleaned.to_string())
}

/// Verify that `bytes` start with the PDF header.
pub fn check_pdf_magic(path: &Path, bytes: &[u8]) -> Result<(), Pdf2DocxError> {
    if bytes.starts_with(PDF_MAGIC) {
        return Ok(());
    }
    Err(Pdf2DocxError::NotAPdf {
        path: path.to_path_buf(),
        magic: bytes.iter().take(4).copied().collect(),
    })
}

/// Per-request scratch directory, deleted on drop.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    pub fn new() -> Result<Self, Pdf2DocxError> {
        let dir = tempfile::Builder::new()
            .prefix("pdf2docx-")
            .tempdir()
            .map_err(|e| Pdf2DocxError::Internal(format!("tempdir: {e}")))?;
        debug!("Scratch directory: {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Path for `name` inside the scratch directory (not created).
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Write `bytes` to `name` inside the scratch directory.
    pub async fn write(&self, name: &str, bytes: &[u8]) -> Result<PathBuf, Pdf2DocxError> {
        let path = self.file_path(name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| Pdf2DocxError::OutputWriteFailed {
                path: path.clone(),
                source: e,
            })?;
        Ok(path)
    }
}
