//! HTTP server binary for pdf2docx-api.
//!
//! Maps flags and environment variables to `ServiceConfig`, wires the
//! collaborators into a `PipelineContext` and serves the router.

use anyhow::{Context, Result};
use clap::Parser;
use pdf2docx_api::api;
use pdf2docx_api::auth::TokenSource;
use pdf2docx_api::pipeline::llm::LlmGenerator;
use pdf2docx_api::pipeline::pdf::PdfiumReader;
use pdf2docx_api::pipeline::translate::CloudTranslator;
use pdf2docx_api::storage::{FilesystemStore, GcsStore, ObjectStore};
use pdf2docx_api::{PipelineContext, ServiceConfig};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Rewrite and translate PDF documents into Word files over HTTP.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2docx-server",
    version,
    about = "Rewrite and translate PDF documents into Word files over HTTP"
)]
struct Cli {
    /// Cloud project used for translation and storage billing.
    #[arg(long, env = "PROJECT_ID")]
    project_id: String,

    /// Cloud region of the generative model.
    #[arg(long, env = "REGION")]
    region: String,

    /// Bucket receiving uploads and generated documents.
    #[arg(long, env = "GCS_BUCKET_NAME")]
    bucket: String,

    /// Cloud Translation location (`global` or `us-central1` for the default model).
    #[arg(long, env = "TRANSLATION_LOCATION", default_value = "global")]
    translation_location: String,

    /// Language code generated text is translated into.
    #[arg(long, env = "TARGET_LANGUAGE", default_value = "es")]
    target_language: String,

    /// LLM model used to rewrite each section.
    #[arg(long, env = "PDF2DOCX_MODEL", default_value = "gemini-2.0-flash")]
    model: String,

    /// LLM provider (gemini, openai, anthropic, ollama, ...).
    #[arg(long, env = "PDF2DOCX_PROVIDER", default_value = "gemini")]
    provider: String,

    /// Directory containing the pdfium shared library.
    #[arg(long, env = "PDFIUM_LIB_PATH")]
    pdfium_lib_path: Option<PathBuf>,

    /// Address to listen on.
    #[arg(long, env = "PDF2DOCX_BIND", default_value = "0.0.0.0:8080")]
    bind: String,

    /// Largest accepted upload, in megabytes.
    #[arg(long, env = "PDF2DOCX_MAX_UPLOAD_MB", default_value_t = 50)]
    max_upload_mb: usize,

    /// Pre-issued OAuth access token. Without it credentials are discovered
    /// (`GOOGLE_APPLICATION_CREDENTIALS`, metadata server, gcloud).
    #[arg(long, env = "GOOGLE_OAUTH_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Store objects in this local directory instead of the bucket.
    #[arg(long, env = "PDF2DOCX_STORAGE_DIR")]
    storage_dir: Option<PathBuf>,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let mut builder = ServiceConfig::builder()
        .project_id(cli.project_id)
        .region(cli.region)
        .translation_location(cli.translation_location)
        .bucket(cli.bucket)
        .target_language(cli.target_language)
        .provider_name(cli.provider)
        .model(cli.model)
        .bind_addr(cli.bind)
        .max_upload_mb(cli.max_upload_mb);
    if let Some(dir) = cli.pdfium_lib_path {
        builder = builder.pdfium_lib_dir(dir);
    }
    let config = Arc::new(builder.build().context("Invalid configuration")?);

    // ── Collaborators ────────────────────────────────────────────────────
    let client = reqwest::Client::builder()
        .build()
        .context("Failed to build HTTP client")?;
    let tokens = TokenSource::resolve(cli.access_token)
        .await
        .context("No Google Cloud credentials available")?;
    tokens
        .access_token()
        .await
        .context("No Google Cloud credentials available")?;

    let storage: Arc<dyn ObjectStore> = match cli.storage_dir {
        Some(dir) => {
            warn!("Using local storage at {}", dir.display());
            Arc::new(
                FilesystemStore::new(dir)
                    .await
                    .context("Failed to prepare storage directory")?,
            )
        }
        None => Arc::new(GcsStore::new(
            client.clone(),
            tokens.clone(),
            config.bucket.clone(),
            config.public_url_base.clone(),
        )),
    };

    let generator =
        LlmGenerator::from_config(&config).context("Failed to initialise LLM provider")?;
    let translator = CloudTranslator::new(client, tokens, &config);

    let reader = PdfiumReader::new(config.pdfium_lib_dir.clone());
    reader
        .check_binding()
        .context("pdfium library is not available")?;

    let ctx = PipelineContext {
        config: Arc::clone(&config),
        storage,
        generator: Arc::new(generator),
        translator: Arc::new(translator),
        reader: Arc::new(reader),
    };

    // ── Serve ────────────────────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind_addr))?;
    info!(
        "Listening on {} (model {}/{}, target language '{}')",
        config.bind_addr, config.provider_name, config.model, config.target_language
    );

    axum::serve(listener, api::router(ctx))
        .await
        .context("Server error")?;
    Ok(())
}
