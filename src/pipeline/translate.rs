//! Translation of generated text.
//!
//! The service translates every section into one configured language using
//! Cloud Translation v3 (`translateText`, plain-text MIME type so markdown
//! markers pass through untouched).

use crate::auth::TokenSource;
use crate::config::ServiceConfig;
use crate::error::Pdf2DocxError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Text translation into a target language code (`es`, `en`, …).
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, Pdf2DocxError>;
}

/// [`Translator`] calling the Cloud Translation v3 REST API.
#[derive(Debug, Clone)]
pub struct CloudTranslator {
    client: reqwest::Client,
    tokens: TokenSource,
    endpoint: String,
    project_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TranslateRequest<'a> {
    contents: [&'a str; 1],
    target_language_code: &'a str,
    mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: String,
}

impl CloudTranslator {
    pub fn new(client: reqwest::Client, tokens: TokenSource, config: &ServiceConfig) -> Self {
        Self {
            client,
            tokens,
            endpoint: translate_endpoint(&config.project_id, &config.translation_location),
            project_id: config.project_id.clone(),
        }
    }
}

/// `translateText` URL for a project and location.
pub fn translate_endpoint(project_id: &str, location: &str) -> String {
    format!(
        "https://translation.googleapis.com/v3/projects/{}/locations/{}:translateText",
        project_id, location
    )
}

#[async_trait]
impl Translator for CloudTranslator {
    async fn translate(&self, text: &str, target_language: &str) -> Result<String, Pdf2DocxError> {
        let token = self.tokens.access_token().await?;
        let body = TranslateRequest {
            contents: [text],
            target_language_code: target_language,
            mime_type: "text/plain",
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .header("x-goog-user-project", &self.project_id)
            .json(&body)
            .send()
            .await
            .map_err(|e| Pdf2DocxError::TranslationFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(Pdf2DocxError::TranslationFailed(format!(
                "HTTP {}: {}",
                status,
                detail.trim()
            )));
        }

        let parsed: TranslateResponse = response
            .json()
            .await
            .map_err(|e| Pdf2DocxError::TranslationFailed(e.to_string()))?;

        let translated = parsed
            .translations
            .into_iter()
            .next()
            .map(|t| t.translated_text)
            .ok_or_else(|| {
                Pdf2DocxError::TranslationFailed("response contained no translations".into())
            })?;

        debug!(
            "Translated {} → {} chars into '{}'",
            text.len(),
            translated.len(),
            target_language
        );
        Ok(translated)
    }
}
