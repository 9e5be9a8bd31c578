//! # pdf2docx-api
//!
//! HTTP service that turns a PDF into a rewritten, translated Word document.
//!
//! ## Pipeline Overview
//!
//! ```text
//! POST /api/extraer (multipart: file, indicaciones)
//!  │
//!  ├─ 1. Store     upload the source PDF to object storage
//!  ├─ 2. Read      page text + outline via pdfium
//!  ├─ 3. Split     one section per level-2 outline entry (or per page)
//!  ├─ 4. Rewrite   LLM call per section with the caller's instructions
//!  ├─ 5. Translate into the configured target language
//!  ├─ 6. Format    headings/lists flattened, **bold** spans kept as runs
//!  └─ 7. Publish   .docx uploaded next to the source, URL returned
//! ```
//!
//! Sections are processed sequentially; any failure fails the whole request
//! and nothing is published.
//!
//! ## Embedding the router
//!
//! ```rust,no_run
//! use pdf2docx_api::{api, PipelineContext};
//!
//! # async fn serve(ctx: PipelineContext) -> std::io::Result<()> {
//! let app = api::router(ctx);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2docx-server` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod api;
pub mod auth;
pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod prompts;
pub mod storage;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ServiceConfig, ServiceConfigBuilder};
pub use convert::{process_upload, PipelineContext, Upload};
pub use error::{ErrorClass, Pdf2DocxError};
pub use output::{PdfText, PipelineResult, Section, TextRun, TocEntry};
pub use pipeline::extract::extract_sections;
pub use pipeline::postprocess::{reformat, split_runs};
