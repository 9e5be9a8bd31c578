//! Service configuration.
//!
//! Every knob lives in [`ServiceConfig`], built through
//! [`ServiceConfigBuilder`]. The binary fills the builder from CLI flags and
//! environment variables once at startup; a missing project, region or bucket
//! makes [`ServiceConfigBuilder::build`] fail, which aborts the process before
//! the listener is bound.

use crate::error::Pdf2DocxError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the PDF-to-Word service.
///
/// # Example
/// ```rust
/// use pdf2docx_api::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .project_id("my-project")
///     .region("us-central1")
///     .bucket("my-bucket")
///     .build()
///     .unwrap();
/// assert_eq!(config.target_language, "es");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Cloud project that owns the translation quota.
    pub project_id: String,

    /// Cloud region of the generative model deployment.
    pub region: String,

    /// Cloud Translation location. Default: `global`.
    pub translation_location: String,

    /// Bucket receiving both the uploaded source and the generated document.
    pub bucket: String,

    /// Object-name prefix for every stored file. Default: `documentos`.
    pub object_prefix: String,

    /// Base of the public retrieval URL. Default: `https://storage.cloud.google.com`.
    pub public_url_base: String,

    /// Language every generated section is translated into. Default: `es`.
    pub target_language: String,

    /// LLM provider name understood by `edgequake_llm::ProviderFactory`. Default: `gemini`.
    pub provider_name: String,

    /// LLM model identifier. Default: `gemini-2.0-flash`.
    pub model: String,

    /// Sampling temperature for generation. Default: 0.4.
    pub temperature: f32,

    /// Maximum tokens generated per section. Default: 8192.
    pub max_tokens: usize,

    /// Directory holding the pdfium shared library. `None` uses the system library.
    pub pdfium_lib_dir: Option<PathBuf>,

    /// Socket address the HTTP server listens on. Default: `0.0.0.0:8080`.
    pub bind_addr: String,

    /// Largest accepted request body, in megabytes. Default: 50.
    pub max_upload_mb: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            project_id: String::new(),
            region: String::new(),
            translation_location: "global".to_string(),
            bucket: String::new(),
            object_prefix: "documentos".to_string(),
            public_url_base: "https://storage.cloud.google.com".to_string(),
            target_language: "es".to_string(),
            provider_name: "gemini".to_string(),
            model: "gemini-2.0-flash".to_string(),
            temperature: 0.4,
            max_tokens: 8192,
            pdfium_lib_dir: None,
            bind_addr: "0.0.0.0:8080".to_string(),
            max_upload_mb: 50,
        }
    }
}

impl ServiceConfig {
    /// Create a new builder for `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }

    /// Object name for a file stored under the configured prefix.
    pub fn object_path(&self, filename: &str) -> String {
        let prefix = self.object_prefix.trim_matches('/');
        if prefix.is_empty() {
            filename.to_string()
        } else {
            format!("{}/{}", prefix, filename)
        }
    }

    /// Request body limit in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn project_id(mut self, id: impl Into<String>) -> Self {
        self.config.project_id = id.into();
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.config.region = region.into();
        self
    }

    pub fn translation_location(mut self, location: impl Into<String>) -> Self {
        self.config.translation_location = location.into();
        self
    }

    pub fn bucket(mut self, bucket: impl Into<String>) -> Self {
        self.config.bucket = bucket.into();
        self
    }

    pub fn object_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.object_prefix = prefix.into();
        self
    }

    pub fn public_url_base(mut self, base: impl Into<String>) -> Self {
        self.config.public_url_base = base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn target_language(mut self, lang: impl Into<String>) -> Self {
        self.config.target_language = lang.into();
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = name.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn pdfium_lib_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.pdfium_lib_dir = Some(dir.into());
        self
    }

    pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.bind_addr = addr.into();
        self
    }

    pub fn max_upload_mb(mut self, mb: usize) -> Self {
        self.config.max_upload_mb = mb.max(1);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServiceConfig, Pdf2DocxError> {
        let c = &self.config;
        for (name, value) in [
            ("project id", &c.project_id),
            ("region", &c.region),
            ("bucket name", &c.bucket),
            ("translation location", &c.translation_location),
        ] {
            if value.trim().is_empty() {
                return Err(Pdf2DocxError::InvalidConfig(format!("{} is not set", name)));
            }
        }
        if c.target_language.trim().is_empty() {
            return Err(Pdf2DocxError::InvalidConfig(
                "target language must not be empty".into(),
            ));
        }
        if c.max_tokens == 0 {
            return Err(Pdf2DocxError::InvalidConfig("max_tokens must be ≥ 1".into()));
        }
        Ok(self.config)
    }
}
