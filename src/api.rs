//! HTTP surface.
//!
//! | Method | Path           | Purpose                                     |
//! |--------|----------------|---------------------------------------------|
//! | GET    | `/`            | Liveness text                               |
//! | POST   | `/api/extraer` | Multipart `file` (+ optional `indicaciones`) |
//!
//! Errors are returned as `{"error": "<message>"}` with status 400 for input
//! problems and 500 for everything else.

use crate::convert::{process_upload, PipelineContext, Upload};
use crate::error::{ErrorClass, Pdf2DocxError};
use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

/// Multipart field carrying the PDF.
pub const FILE_FIELD: &str = "file";
/// Multipart field carrying the free-text instructions.
pub const INSTRUCTIONS_FIELD: &str = "indicaciones";
/// Body of `GET /`.
pub const LIVENESS_TEXT: &str = "Servicios web en ejecución";
/// `message` of a successful extraction.
pub const SUCCESS_MESSAGE: &str = "Documento generado con éxito";

/// Successful response of `POST /api/extraer`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub message: String,
    pub output_url: String,
    pub cantidad_peticiones: usize,
}

/// Build the application router.
pub fn router(ctx: PipelineContext) -> Router {
    let body_limit = ctx.config.max_upload_bytes();

    Router::new()
        .route("/", get(index))
        .route("/api/extraer", post(extract_document))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn index() -> &'static str {
    LIVENESS_TEXT
}

async fn extract_document(
    State(ctx): State<PipelineContext>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractResponse>, Pdf2DocxError> {
    let multipart = multipart.map_err(|e| {
        warn!("Rejected non-multipart request: {}", e);
        Pdf2DocxError::MissingFile
    })?;

    let upload = read_upload(multipart).await?;
    let result = process_upload(&ctx, upload).await?;

    Ok(Json(ExtractResponse {
        message: SUCCESS_MESSAGE.to_string(),
        output_url: result.output_location,
        cantidad_peticiones: result.section_count,
    }))
}

/// Collect the `file` and `indicaciones` fields; other fields are ignored.
async fn read_upload(mut multipart: Multipart) -> Result<Upload, Pdf2DocxError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut instructions = String::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Pdf2DocxError::MalformedUpload(e.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some(FILE_FIELD) => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| Pdf2DocxError::MalformedUpload(e.to_string()))?;
                file = Some((filename, bytes.to_vec()));
            }
            Some(INSTRUCTIONS_FIELD) => {
                instructions = field
                    .text()
                    .await
                    .map_err(|e| Pdf2DocxError::MalformedUpload(e.to_string()))?;
            }
            _ => {}
        }
    }

    let (filename, bytes) = file.ok_or(Pdf2DocxError::MissingFile)?;
    if filename.is_empty() {
        return Err(Pdf2DocxError::EmptyFilename);
    }

    info!(
        "Upload '{}' ({} bytes, {} chars of instructions)",
        filename,
        bytes.len(),
        instructions.len()
    );
    Ok(Upload {
        filename,
        bytes,
        instructions,
    })
}

impl IntoResponse for Pdf2DocxError {
    fn into_response(self) -> Response {
        let status = match self.status() {
            ErrorClass::Input => StatusCode::BAD_REQUEST,
            ErrorClass::Server => {
                error!("Request failed: {}", self);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
