//! Secrets backend access and service-token verification.
//!
//! Secret documents are flat JSON objects fetched by path. The token
//! verifier keeps a process-wide cache in front of the backend so the
//! hot path (one lookup per request) stays off the network.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

/// Path suffix of the service-token allow-list document.
pub const TOKEN_DOCUMENT_SUFFIX: &str = "/authorizations";

/// Path suffix of the database credentials document.
pub const DATABASE_DOCUMENT_SUFFIX: &str = "/database";

const MAX_FETCH_ATTEMPTS: u32 = 3;
const CACHE_TTL: Duration = Duration::from_secs(10 * 60);
const CACHE_CAPACITY: u64 = 1000;

#[derive(Debug, Error)]
pub enum SecretsError {
    #[error("secrets request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("secrets backend returned {status} for '{path}'")]
    Status { path: String, status: u16 },

    #[error("secret '{path}' is not a JSON object: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to fetch secret '{path}' after {attempts} attempts")]
    Exhausted { path: String, attempts: u32 },
}

/// Raw access to the secrets backend. The HTTP implementation below is
/// the production one; tests substitute their own.
#[async_trait]
pub trait SecretsClient: Send + Sync {
    async fn fetch_raw(&self, path: &str) -> Result<String, SecretsError>;
}

/// Fetches secret documents over HTTP from a KV-style endpoint
/// (`GET <base_url>/<path>`).
pub struct HttpSecretsClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpSecretsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl SecretsClient for HttpSecretsClient {
    async fn fetch_raw(&self, path: &str) -> Result<String, SecretsError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let response = self.http.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SecretsError::Status { path: path.to_string(), status: status.as_u16() });
        }

        Ok(response.text().await?)
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Secret value '{0}' not found in Contact Authorizations secrets set")]
    BadCredentials(String),

    #[error(transparent)]
    Backend(#[from] SecretsError),
}

/// Verifies presented service tokens against the secrets-backed
/// allow-list. Constructed once at startup and shared by reference;
/// the cache refreshes lazily with a write-time expiry.
pub struct TokenVerifier {
    client: Arc<dyn SecretsClient>,
    cache: Cache<String, Arc<Map<String, Value>>>,
    token_path: String,
}

impl TokenVerifier {
    pub fn new(client: Arc<dyn SecretsClient>, base_path: &str) -> Self {
        Self {
            client,
            cache: Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(CACHE_TTL)
                .build(),
            token_path: format!("{}{}", base_path, TOKEN_DOCUMENT_SUFFIX),
        }
    }

    /// Returns the label of the allow-list entry whose value equals the
    /// presented token (exact, case-sensitive match).
    pub async fn verify_service_token(&self, token: &str) -> Result<String, AuthError> {
        let document = self.secret_document(&self.token_path).await?;

        for (label, value) in document.iter() {
            if value.as_str() == Some(token) {
                return Ok(label.clone());
            }
        }

        Err(AuthError::BadCredentials(token.to_string()))
    }

    /// Cached fetch of a secret document. Failed fetches are not cached;
    /// transient backend errors are retried up to `MAX_FETCH_ATTEMPTS`.
    async fn secret_document(
        &self,
        path: &str,
    ) -> Result<Arc<Map<String, Value>>, SecretsError> {
        for attempt in 1..=MAX_FETCH_ATTEMPTS {
            let result = self
                .cache
                .try_get_with(path.to_string(), async {
                    let raw = self.client.fetch_raw(path).await?;
                    let document: Map<String, Value> = serde_json::from_str(&raw)
                        .map_err(|source| SecretsError::Parse {
                            path: path.to_string(),
                            source,
                        })?;
                    Ok::<_, SecretsError>(Arc::new(document))
                })
                .await;

            match result {
                Ok(document) => return Ok(document),
                Err(err) => warn!(attempt, error = %err, "secrets fetch failed"),
            }
        }

        Err(SecretsError::Exhausted {
            path: path.to_string(),
            attempts: MAX_FETCH_ATTEMPTS,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` fetches, then serves the document.
    struct FlakySecretsClient {
        document: String,
        failures: u32,
        calls: AtomicU32,
    }

    impl FlakySecretsClient {
        fn new(document: &str, failures: u32) -> Self {
            Self { document: document.to_string(), failures, calls: AtomicU32::new(0) }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SecretsClient for FlakySecretsClient {
        async fn fetch_raw(&self, path: &str) -> Result<String, SecretsError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(SecretsError::Status { path: path.to_string(), status: 500 });
            }
            Ok(self.document.clone())
        }
    }

    const DOCUMENT: &str = r#"{"reporting-ui": "token-abc", "batch-loader": "token-xyz"}"#;

    fn verifier(client: Arc<FlakySecretsClient>) -> TokenVerifier {
        TokenVerifier::new(client, "contacts/test")
    }

    #[tokio::test]
    async fn matching_token_returns_its_label() {
        let client = Arc::new(FlakySecretsClient::new(DOCUMENT, 0));
        let verifier = verifier(client);

        let label = verifier.verify_service_token("token-xyz").await.unwrap();
        assert_eq!(label, "batch-loader");
    }

    #[tokio::test]
    async fn unknown_token_is_bad_credentials_and_names_the_token() {
        let client = Arc::new(FlakySecretsClient::new(DOCUMENT, 0));
        let verifier = verifier(client);

        let err = verifier.verify_service_token("nope").await.unwrap_err();
        match &err {
            AuthError::BadCredentials(token) => assert_eq!(token, "nope"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.to_string().contains("'nope'"));
    }

    #[tokio::test]
    async fn second_verification_is_served_from_cache() {
        let client = Arc::new(FlakySecretsClient::new(DOCUMENT, 0));
        let verifier = verifier(client.clone());

        verifier.verify_service_token("token-abc").await.unwrap();
        verifier.verify_service_token("token-xyz").await.unwrap();

        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn transient_fetch_failures_are_retried() {
        let client = Arc::new(FlakySecretsClient::new(DOCUMENT, 2));
        let verifier = verifier(client.clone());

        let label = verifier.verify_service_token("token-abc").await.unwrap();
        assert_eq!(label, "reporting-ui");
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn persistent_fetch_failure_exhausts_after_three_attempts() {
        let client = Arc::new(FlakySecretsClient::new(DOCUMENT, u32::MAX));
        let verifier = verifier(client.clone());

        let err = verifier.verify_service_token("token-abc").await.unwrap_err();
        assert!(matches!(err, AuthError::Backend(SecretsError::Exhausted { attempts: 3, .. })));
        assert_eq!(client.calls(), 3);
    }

    #[tokio::test]
    async fn non_object_document_is_a_backend_error() {
        let client = Arc::new(FlakySecretsClient::new("[1, 2, 3]", 0));
        let verifier = verifier(client);

        let err = verifier.verify_service_token("token-abc").await.unwrap_err();
        assert!(matches!(err, AuthError::Backend(_)));
    }
}
