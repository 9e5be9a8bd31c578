//! OAuth bearer tokens for the Google Cloud APIs.
//!
//! Chosen once at startup. A token handed in through the environment wins;
//! otherwise `gcp_auth` discovers credentials in its usual order: the
//! service-account key named by `GOOGLE_APPLICATION_CREDENTIALS`, the user's
//! application-default credentials, the instance metadata server, then the
//! `gcloud` CLI. Discovered providers cache tokens and refresh them before
//! they expire.

use crate::error::Pdf2DocxError;
use gcp_auth::TokenProvider;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// Scope requested for Cloud Storage and Cloud Translation.
pub const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Environment variable naming a service-account key file.
pub const CREDENTIALS_ENV: &str = "GOOGLE_APPLICATION_CREDENTIALS";

#[derive(Clone)]
pub enum TokenSource {
    /// A pre-issued access token.
    Static(String),
    /// Credentials discovered by `gcp_auth`.
    Provider(Arc<dyn TokenProvider>),
}

impl TokenSource {
    /// Use `token` when present and non-empty, otherwise discover credentials.
    ///
    /// Fails when no credential source is available, or when the key file
    /// named by [`CREDENTIALS_ENV`] cannot be loaded.
    pub async fn resolve(token: Option<String>) -> Result<Self, Pdf2DocxError> {
        if let Some(t) = token.filter(|t| !t.trim().is_empty()) {
            info!("Using the access token from the environment");
            return Ok(TokenSource::Static(t.trim().to_string()));
        }

        let provider = gcp_auth::provider()
            .await
            .map_err(|e| Pdf2DocxError::CredentialsUnavailable(e.to_string()))?;
        info!("Using discovered Google Cloud credentials");
        Ok(TokenSource::Provider(provider))
    }

    pub async fn access_token(&self) -> Result<String, Pdf2DocxError> {
        match self {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::Provider(provider) => {
                let token = provider
                    .token(&[CLOUD_PLATFORM_SCOPE])
                    .await
                    .map_err(|e| Pdf2DocxError::CredentialsUnavailable(e.to_string()))?;
                debug!("Access token obtained from provider");
                Ok(token.as_str().to_string())
            }
        }
    }
}

impl fmt::Debug for TokenSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenSource::Static(_) => f.write_str("TokenSource::Static(<redacted>)"),
            TokenSource::Provider(_) => f.write_str("TokenSource::Provider"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn resolve_prefers_explicit_token() {
        let src = TokenSource::resolve(Some(" ya29.token ".into())).await.unwrap();
        assert!(matches!(src, TokenSource::Static(ref t) if t == "ya29.token"));
        assert_eq!(src.access_token().await.unwrap(), "ya29.token");
    }

    #[tokio::test]
    async fn resolve_fails_without_usable_credentials() {
        let dir = tempfile::TempDir::new().unwrap();

        // Key file that does not exist.
        std::env::set_var(CREDENTIALS_ENV, dir.path().join("missing.json"));
        let missing = TokenSource::resolve(None).await;

        // Key file that is not a service-account key.
        let garbage = dir.path().join("garbage.json");
        std::fs::write(&garbage, "not json").unwrap();
        std::env::set_var(CREDENTIALS_ENV, &garbage);
        let malformed = TokenSource::resolve(Some("   ".into())).await;

        std::env::remove_var(CREDENTIALS_ENV);

        assert!(matches!(
            missing,
            Err(Pdf2DocxError::CredentialsUnavailable(_))
        ));
        assert!(matches!(
            malformed,
            Err(Pdf2DocxError::CredentialsUnavailable(_))
        ));
    }

    #[test]
    fn debug_redacts_static_token() {
        let src = TokenSource::Static("secret".into());
        let shown = format!("{:?}", src);
        assert!(!shown.contains("secret"));
    }
}
