//! HTTP-level tests for the extraction endpoint.
//!
//! The router is driven in-process with `tower::ServiceExt::oneshot`; the
//! PDF reader, LLM and translator are replaced with fakes and objects land in
//! a `FilesystemStore` inside a temp directory, so no network or pdfium
//! library is needed.

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use pdf2docx_api::api::{self, ExtractResponse, LIVENESS_TEXT, SUCCESS_MESSAGE};
use pdf2docx_api::pipeline::llm::TextGenerator;
use pdf2docx_api::pipeline::pdf::DocumentReader;
use pdf2docx_api::pipeline::translate::Translator;
use pdf2docx_api::storage::FilesystemStore;
use pdf2docx_api::{PdfText, Pdf2DocxError, PipelineContext, ServiceConfig, TocEntry};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "pdf2docx-test-boundary";
const FAKE_PDF: &[u8] = b"%PDF-1.7\n%fake body\n";

// ── Fakes ────────────────────────────────────────────────────────────────────

struct FixedReader(PdfText);

#[async_trait]
impl DocumentReader for FixedReader {
    async fn read(&self, _path: &Path) -> Result<PdfText, Pdf2DocxError> {
        Ok(self.0.clone())
    }
}

/// Rejects every document the way pdfium does for a damaged file.
struct BrokenReader;

#[async_trait]
impl DocumentReader for BrokenReader {
    async fn read(&self, path: &Path) -> Result<PdfText, Pdf2DocxError> {
        Err(Pdf2DocxError::CorruptPdf {
            path: path.to_path_buf(),
            detail: "FormatError".into(),
        })
    }
}

/// Echoes a markdown-flavoured rewrite and records every prompt; fails on
/// the call numbered `fail_on` (1-based).
struct EchoGenerator {
    prompts: Mutex<Vec<String>>,
    fail_on: Option<usize>,
}

#[async_trait]
impl TextGenerator for EchoGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, Pdf2DocxError> {
        let n = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            prompts.len()
        };
        if self.fail_on == Some(n) {
            return Err(Pdf2DocxError::GenerationFailed {
                section: String::new(),
                detail: "model overloaded".into(),
            });
        }
        Ok(format!("## Apartado {n}\n**Negrita** resumen\n* punto"))
    }
}

/// Returns text unchanged; fails on the call numbered `fail_on` (1-based).
struct CountingTranslator {
    calls: AtomicUsize,
    fail_on: Option<usize>,
    targets: Mutex<Vec<String>>,
}

impl CountingTranslator {
    fn new(fail_on: Option<usize>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_on,
            targets: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Translator for CountingTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, Pdf2DocxError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.targets
            .lock()
            .unwrap()
            .push(target_language.to_string());
        if self.fail_on == Some(call) {
            return Err(Pdf2DocxError::TranslationFailed("quota exceeded".into()));
        }
        Ok(text.to_string())
    }
}

// ── Harness ──────────────────────────────────────────────────────────────────

struct Harness {
    app: Router,
    storage_dir: TempDir,
    generator: Arc<EchoGenerator>,
    translator: Arc<CountingTranslator>,
}

impl Harness {
    async fn new(pdf: PdfText, fail_translation_on: Option<usize>) -> Self {
        Self::build(Arc::new(FixedReader(pdf)), None, fail_translation_on).await
    }

    async fn build(
        reader: Arc<dyn DocumentReader>,
        fail_generation_on: Option<usize>,
        fail_translation_on: Option<usize>,
    ) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let storage_dir = TempDir::new().unwrap();
        let config = ServiceConfig::builder()
            .project_id("test-project")
            .region("us-central1")
            .bucket("test-bucket")
            .target_language("es")
            .build()
            .unwrap();
        let generator = Arc::new(EchoGenerator {
            prompts: Mutex::new(Vec::new()),
            fail_on: fail_generation_on,
        });
        let translator = Arc::new(CountingTranslator::new(fail_translation_on));

        let ctx = PipelineContext {
            config: Arc::new(config),
            storage: Arc::new(FilesystemStore::new(storage_dir.path()).await.unwrap()),
            generator: generator.clone(),
            translator: translator.clone(),
            reader,
        };

        Self {
            app: api::router(ctx),
            storage_dir,
            generator,
            translator,
        }
    }

    fn stored_files(&self, extension: &str) -> Vec<PathBuf> {
        let dir = self.storage_dir.path().join("documentos");
        let Ok(entries) = std::fs::read_dir(dir) else {
            return Vec::new();
        };
        entries
            .filter_map(|e| e.ok().map(|e| e.path()))
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(extension))
            .collect()
    }
}

fn three_section_pdf() -> PdfText {
    PdfText {
        pages: vec![
            "Introducción\nTexto inicial".into(),
            "Métodos\nDetalle".into(),
            "Resultados\nCifras".into(),
        ],
        toc: vec![
            TocEntry::new(1, "Informe", 1),
            TocEntry::new(2, "Introducción", 1),
            TocEntry::new(2, "Métodos", 2),
            TocEntry::new(2, "Resultados", 3),
        ],
    }
}

fn untitled_pdf(pages: usize) -> PdfText {
    PdfText {
        pages: (1..=pages).map(|n| format!("contenido {n}")).collect(),
        toc: Vec::new(),
    }
}

enum Part<'a> {
    File { filename: &'a str, bytes: &'a [u8] },
    Text { name: &'a str, value: &'a str },
}

fn multipart_request(parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::File { filename, bytes } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
                         Content-Type: application/pdf\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
            Part::Text { name, value } => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}")
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/extraer")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body.to_vec())
}

fn error_message(body: &[u8]) -> String {
    let value: serde_json::Value = serde_json::from_slice(body).unwrap();
    value["error"].as_str().unwrap().to_string()
}

fn document_xml(path: &Path) -> String {
    let file = std::fs::File::open(path).unwrap();
    let mut archive = zip::ZipArchive::new(file).unwrap();
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .unwrap()
        .read_to_string(&mut xml)
        .unwrap();
    xml
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn liveness() {
    let h = Harness::new(untitled_pdf(1), None).await;
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let (status, body) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(String::from_utf8(body).unwrap(), LIVENESS_TEXT);
}

#[tokio::test]
async fn missing_file_field_is_rejected() {
    let h = Harness::new(untitled_pdf(1), None).await;
    let request = multipart_request(&[Part::Text {
        name: "indicaciones",
        value: "Resume",
    }]);

    let (status, body) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "No hay archivo en la solicitud");
    assert!(h.generator.prompts.lock().unwrap().is_empty());
}

#[tokio::test]
async fn non_multipart_body_counts_as_missing_file() {
    let h = Harness::new(untitled_pdf(1), None).await;
    let request = Request::builder()
        .method("POST")
        .uri("/api/extraer")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let (status, body) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "No hay archivo en la solicitud");
}

#[tokio::test]
async fn empty_filename_is_rejected() {
    let h = Harness::new(untitled_pdf(1), None).await;
    let request = multipart_request(&[Part::File {
        filename: "",
        bytes: FAKE_PDF,
    }]);

    let (status, body) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_message(&body), "No se ha seleccionado ningún archivo");
}

#[tokio::test]
async fn filename_without_safe_characters_is_rejected() {
    let h = Harness::new(untitled_pdf(1), None).await;
    let request = multipart_request(&[Part::File {
        filename: "../..",
        bytes: FAKE_PDF,
    }]);

    let (status, _) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(h.stored_files("pdf").is_empty());
}

#[tokio::test]
async fn outline_sections_become_document_headings() {
    let h = Harness::new(three_section_pdf(), None).await;
    let request = multipart_request(&[
        Part::File {
            filename: "informe anual.pdf",
            bytes: FAKE_PDF,
        },
        Part::Text {
            name: "indicaciones",
            value: "Resume en tono formal",
        },
    ]);

    let (status, body) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::OK, "{}", String::from_utf8_lossy(&body));
    let response: ExtractResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.message, SUCCESS_MESSAGE);
    assert_eq!(response.cantidad_peticiones, 3);
    assert!(response.output_url.contains("informe_anual.pdf_"));
    assert!(response.output_url.ends_with(".docx"));

    // Source stored under its sanitised name.
    let sources = h.stored_files("pdf");
    assert_eq!(sources.len(), 1);
    assert!(sources[0].ends_with("informe_anual.pdf"));

    // One prompt per section, each carrying the instructions.
    let prompts = h.generator.prompts.lock().unwrap().clone();
    assert_eq!(prompts.len(), 3);
    assert!(prompts.iter().all(|p| p.contains("Resume en tono formal")));
    assert!(prompts[1].contains("Detalle"));
    assert_eq!(*h.translator.targets.lock().unwrap(), vec!["es"; 3]);

    let outputs = h.stored_files("docx");
    assert_eq!(outputs.len(), 1);
    let xml = document_xml(&outputs[0]);
    for title in ["Introducción", "Métodos", "Resultados"] {
        assert!(xml.contains(title), "missing heading {title}");
    }
    assert!(xml.contains("Apartado 3"));
    assert!(xml.contains("• punto"));
    assert!(xml.contains("<w:b/>"));
    assert!(!xml.contains("##"));
    assert!(!xml.contains("**"));
}

#[tokio::test]
async fn document_without_outline_gets_one_section_per_page() {
    let h = Harness::new(untitled_pdf(2), None).await;
    let request = multipart_request(&[Part::File {
        filename: "notas.pdf",
        bytes: FAKE_PDF,
    }]);

    let (status, body) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::OK);
    let response: ExtractResponse = serde_json::from_slice(&body).unwrap();
    assert_eq!(response.cantidad_peticiones, 2);

    let xml = document_xml(&h.stored_files("docx")[0]);
    assert!(!xml.contains("Page 1"));
    assert!(xml.contains("Apartado 2"));
}

#[tokio::test]
async fn translation_failure_publishes_nothing() {
    let h = Harness::new(three_section_pdf(), Some(2)).await;
    let request = multipart_request(&[Part::File {
        filename: "informe.pdf",
        bytes: FAKE_PDF,
    }]);

    let (status, body) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(error_message(&body).contains("quota exceeded"));
    assert_eq!(h.generator.prompts.lock().unwrap().len(), 2);
    assert!(h.stored_files("docx").is_empty());
}

#[tokio::test]
async fn non_pdf_upload_fails_before_generation() {
    let h = Harness::new(untitled_pdf(1), None).await;
    let request = multipart_request(&[Part::File {
        filename: "foto.pdf",
        bytes: b"\x89PNG\r\n\x1a\n",
    }]);

    let (status, _) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(h.generator.prompts.lock().unwrap().is_empty());
    assert!(h.stored_files("docx").is_empty());
}

#[tokio::test]
async fn unreadable_pdf_publishes_nothing() {
    let h = Harness::build(Arc::new(BrokenReader), None, None).await;
    let request = multipart_request(&[Part::File {
        filename: "roto.pdf",
        bytes: FAKE_PDF,
    }]);

    let (status, body) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(error_message(&body).starts_with("Error al abrir el PDF"));
    assert!(h.generator.prompts.lock().unwrap().is_empty());
    assert!(h.stored_files("docx").is_empty());
}

#[tokio::test]
async fn generation_failure_names_the_section_and_publishes_nothing() {
    let h = Harness::build(Arc::new(FixedReader(three_section_pdf())), Some(2), None).await;
    let request = multipart_request(&[Part::File {
        filename: "informe.pdf",
        bytes: FAKE_PDF,
    }]);

    let (status, body) = send(&h.app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = error_message(&body);
    assert!(
        message.starts_with("Generation failed for section 'Métodos'"),
        "got: {message}"
    );
    assert!(message.contains("model overloaded"));
    // Only the first section reached translation.
    assert_eq!(h.translator.targets.lock().unwrap().len(), 1);
    assert!(h.stored_files("docx").is_empty());
}
