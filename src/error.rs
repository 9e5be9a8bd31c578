//! Error types for the pdf2docx-api library.
//!
//! A single request either produces a complete document or fails as a whole,
//! so there is one error type, [`Pdf2DocxError`]. Variants are grouped by the
//! stage that raised them; [`Pdf2DocxError::status`] folds them into the two
//! outcomes the HTTP surface distinguishes (bad request vs. server failure).

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pdf2docx-api library.
#[derive(Debug, Error)]
pub enum Pdf2DocxError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The multipart body carried no `file` field.
    #[error("No hay archivo en la solicitud")]
    MissingFile,

    /// The `file` field was present but its filename was empty.
    #[error("No se ha seleccionado ningún archivo")]
    EmptyFilename,

    /// The filename contained nothing usable as an object name.
    #[error("Invalid filename '{original}': nothing left after sanitising")]
    InvalidFilename { original: String },

    /// The multipart body could not be read.
    #[error("Malformed upload: {0}")]
    MalformedUpload(String),

    // ── PDF errors ────────────────────────────────────────────────────────
    /// The uploaded payload does not start with the `%PDF` header.
    #[error("Error al abrir el PDF: '{path}' is not a PDF (first bytes: {magic:?})")]
    NotAPdf { path: PathBuf, magic: Vec<u8> },

    /// pdfium could not open or parse the document.
    #[error("Error al abrir el PDF: '{path}': {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// Text extraction failed for a specific page.
    #[error("Text extraction failed for page {page}: {detail}")]
    PageTextFailed { page: usize, detail: String },

    // ── Downstream service errors ─────────────────────────────────────────
    /// The generative model call failed.
    #[error("Generation failed for section '{section}': {detail}")]
    GenerationFailed { section: String, detail: String },

    /// The translation call failed.
    #[error("Translation failed: {0}")]
    TranslationFailed(String),

    /// An object-storage operation failed.
    #[error("Storage {operation} failed for '{path}': {detail}")]
    StorageFailed {
        operation: &'static str,
        path: String,
        detail: String,
    },

    /// An OAuth access token could not be obtained.
    #[error("Could not obtain an access token: {0}")]
    CredentialsUnavailable(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Scratch-file or output-package I/O failed.
    #[error("Failed to write '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The .docx package could not be serialised.
    #[error("Failed to build document package: {0}")]
    DocumentPackage(String),

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH to the directory containing libpdfium, or install it system-wide."
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse outcome classes exposed over HTTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The caller sent something unusable (HTTP 400).
    Input,
    /// Extraction, downstream services, packaging or anything else (HTTP 500).
    Server,
}

impl Pdf2DocxError {
    /// Classify the error for the HTTP surface.
    pub fn status(&self) -> ErrorClass {
        match self {
            Self::MissingFile
            | Self::EmptyFilename
            | Self::InvalidFilename { .. }
            | Self::MalformedUpload(_) => ErrorClass::Input,
            _ => ErrorClass::Server,
        }
    }

    /// Shorthand for a storage failure.
    pub(crate) fn storage(
        operation: &'static str,
        path: impl Into<String>,
        detail: impl std::fmt::Display,
    ) -> Self {
        Self::StorageFailed {
            operation,
            path: path.into(),
            detail: detail.to_string(),
        }
    }
}
