//! Request pipeline: uploaded PDF in, published Word document out.
//!
//! ```text
//! upload ──▶ store ──▶ scratch ──▶ read ──▶ extract ──▶ per section:
//!                                                        generate ─▶ translate ─▶ reformat
//!        ──▶ assemble ──▶ .docx ──▶ store ──▶ PipelineResult
//! ```
//!
//! Sections are processed one at a time in outline order. The first failure
//! aborts the run; nothing is uploaded for a request that did not finish.

use crate::config::ServiceConfig;
use crate::error::Pdf2DocxError;
use crate::output::{PipelineResult, Section};
use crate::pipeline::llm::TextGenerator;
use crate::pipeline::pdf::DocumentReader;
use crate::pipeline::translate::Translator;
use crate::pipeline::{assemble, docx, extract, input, postprocess};
use crate::prompts::section_prompt;
use crate::storage::ObjectStore;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Collaborators and settings shared by every request.
///
/// Built once at startup and cloned cheaply into handlers. Tests swap any
/// field for a fake.
#[derive(Clone)]
pub struct PipelineContext {
    pub config: Arc<ServiceConfig>,
    pub storage: Arc<dyn ObjectStore>,
    pub generator: Arc<dyn TextGenerator>,
    pub translator: Arc<dyn Translator>,
    pub reader: Arc<dyn DocumentReader>,
}

/// A validated multipart upload.
#[derive(Debug, Clone)]
pub struct Upload {
    /// Filename as sent by the client (sanitised by the pipeline).
    pub filename: String,
    pub bytes: Vec<u8>,
    /// Free-text instructions inserted verbatim into every prompt.
    pub instructions: String,
}

/// Run the full pipeline for one uploaded PDF.
pub async fn process_upload(
    ctx: &PipelineContext,
    upload: Upload,
) -> Result<PipelineResult, Pdf2DocxError> {
    let total_start = Instant::now();
    let filename = input::sanitize_filename(&upload.filename)?;
    info!(
        "Processing '{}' ({} bytes)",
        filename,
        upload.bytes.len()
    );

    // ── Step 1: Persist the source ───────────────────────────────────────
    let source_path = ctx.config.object_path(&filename);
    ctx.storage.put(&source_path, upload.bytes).await?;

    // ── Step 2: Stage it locally ─────────────────────────────────────────
    let scratch = input::ScratchDir::new()?;
    let stored = ctx.storage.get(&source_path).await?;
    let local_pdf = scratch.write(&filename, &stored).await?;
    input::check_pdf_magic(&local_pdf, &stored)?;

    // ── Step 3: Read and split ───────────────────────────────────────────
    let pdf = ctx.reader.read(&local_pdf).await?;
    let has_toc = !pdf.toc.is_empty();
    let sections = extract::extract_sections(&pdf, &pdf.toc);
    info!(
        "{} pages, outline: {}, {} sections",
        pdf.page_count(),
        has_toc,
        sections.len()
    );

    // ── Step 4: Generate, translate, reformat ────────────────────────────
    let mut rendered = Vec::with_capacity(sections.len());
    for (idx, section) in sections.iter().enumerate() {
        debug!(
            "Section {}/{} '{}' (pages {}-{})",
            idx + 1,
            sections.len(),
            section.title,
            section.start_page,
            section.end_page
        );
        rendered.push(render_section(ctx, &upload.instructions, section).await?);
    }

    // ── Step 5: Assemble and publish ─────────────────────────────────────
    let document = assemble::assemble(&sections, &rendered, has_toc);
    let package = docx::to_bytes(&document)?;

    let output_name = output_filename(&filename, Utc::now());
    let output_path = ctx.config.object_path(&output_name);
    ctx.storage.put(&output_path, package).await?;

    let result = PipelineResult {
        output_location: ctx.storage.public_url(&output_path),
        section_count: rendered.len(),
    };
    info!(
        "Published {} ({} sections) in {}ms",
        result.output_location,
        result.section_count,
        total_start.elapsed().as_millis()
    );
    Ok(result)
}

/// Generate → translate → reformat one section.
async fn render_section(
    ctx: &PipelineContext,
    instructions: &str,
    section: &Section,
) -> Result<String, Pdf2DocxError> {
    let prompt = section_prompt(instructions, &section.text);
    let generated = ctx
        .generator
        .generate(&prompt)
        .await
        .map_err(|e| match e {
            Pdf2DocxError::GenerationFailed { detail, .. } => Pdf2DocxError::GenerationFailed {
                section: section.title.clone(),
                detail,
            },
            other => other,
        })?;

    let translated = ctx
        .translator
        .translate(&generated, &ctx.config.target_language)
        .await?;

    Ok(postprocess::reformat(&translated))
}

/// `<filename>_<YYYYMMDD_HHMMSS>.docx`, timestamp in UTC.
pub fn output_filename(filename: &str, now: DateTime<Utc>) -> String {
    format!("{}_{}.docx", filename, now.format("%Y%m%d_%H%M%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn output_filename_format() {
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(
            output_filename("informe.pdf", now),
            "informe.pdf_20240307_090501.docx"
        );
    }
}
