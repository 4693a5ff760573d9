//! Provider credentials: static bearer tokens and cached OAuth2 tokens.
//!
//! The Cloud API is configured with a long-lived token that never changes at
//! runtime. Serpro issues short-lived tokens through an OAuth2 client
//! credentials exchange; the token is kept in the shared [`TokenCache`] and
//! fetched again only when a delivery is rejected with `401`.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, info};

use crate::cache::{CacheError, SharedTokenCache};
use crate::http::sanitize_body;

/// Cache key of the Serpro access token.
pub const SERPRO_TOKEN_CACHE_KEY: &str = "serpro_access_token";

/// Where a token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// Configured once, never refreshed.
    Static,
    /// Obtained from an OAuth2 token endpoint.
    OAuth2,
}

/// A bearer token ready to be attached to provider requests.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
    source: TokenSource,
    expiry_known: bool,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"[REDACTED]")
            .field("source", &self.source)
            .field("expiry_known", &self.expiry_known)
            .finish()
    }
}

impl Credentials {
    /// Credentials for a configured, non-expiring token.
    pub fn fixed(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            source: TokenSource::Static,
            expiry_known: false,
        }
    }

    /// Credentials for a token issued by an OAuth2 endpoint.
    ///
    /// Expiry is not tracked; the token is replaced when rejected.
    pub fn oauth2(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            source: TokenSource::OAuth2,
            expiry_known: false,
        }
    }

    /// The raw token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Where the token came from.
    pub fn source(&self) -> TokenSource {
        self.source
    }

    /// Whether the token's expiry time is known.
    pub fn expiry_known(&self) -> bool {
        self.expiry_known
    }

    /// Value of the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// Errors while obtaining credentials.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// HTTP request to the token endpoint failed.
    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The token endpoint answered with something other than `200`.
    #[error("token endpoint returned status {status}: {body}")]
    AuthService {
        /// HTTP status code.
        status: u16,
        /// Sanitized response body.
        body: String,
    },

    /// The token endpoint answered `200` without an `access_token`.
    #[error("token endpoint response has no access_token")]
    MissingAccessToken,

    /// The token cache failed.
    #[error(transparent)]
    Cache(#[from] CacheError),
}

/// Supplies the credentials attached to provider requests.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Current credentials, obtaining them first if needed.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] when no token can be obtained.
    async fn current(&self) -> Result<Credentials, CredentialError>;

    /// Discard the current token and obtain a fresh one.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError`] when no token can be obtained. Callers treat
    /// this as fatal.
    async fn reauthenticate(&self) -> Result<Credentials, CredentialError>;
}

/// A configured token that is always valid.
#[derive(Debug, Clone)]
pub struct StaticToken {
    credentials: Credentials,
}

impl StaticToken {
    /// Wrap a configured token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            credentials: Credentials::fixed(token),
        }
    }
}

#[async_trait]
impl CredentialProvider for StaticToken {
    async fn current(&self) -> Result<Credentials, CredentialError> {
        Ok(self.credentials.clone())
    }

    async fn reauthenticate(&self) -> Result<Credentials, CredentialError> {
        Ok(self.credentials.clone())
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// OAuth2 client-credentials token, cached in a shared [`TokenCache`].
///
/// [`TokenCache`]: crate::cache::TokenCache
pub struct OAuth2ClientCredentials {
    client: reqwest::Client,
    token_url: String,
    client_id: String,
    client_secret: String,
    cache: SharedTokenCache,
    cache_key: String,
}

impl std::fmt::Debug for OAuth2ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OAuth2ClientCredentials")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("cache_key", &self.cache_key)
            .finish()
    }
}

impl OAuth2ClientCredentials {
    /// Create a credential manager for the given token endpoint.
    ///
    /// Tokens are cached under [`SERPRO_TOKEN_CACHE_KEY`].
    pub fn new(
        client: reqwest::Client,
        token_url: String,
        client_id: String,
        client_secret: String,
        cache: SharedTokenCache,
    ) -> Self {
        Self {
            client,
            token_url,
            client_id,
            client_secret,
            cache,
            cache_key: SERPRO_TOKEN_CACHE_KEY.to_owned(),
        }
    }

    /// Exchange the client credentials for a token and store it in the cache.
    async fn fetch(&self) -> Result<Credentials, CredentialError> {
        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];
        let response = self.client.post(&self.token_url).form(&form).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if status != StatusCode::OK {
            return Err(CredentialError::AuthService {
                status: status.as_u16(),
                body: sanitize_body(&body),
            });
        }

        let token = serde_json::from_str::<TokenResponse>(&body)
            .ok()
            .and_then(|parsed| parsed.access_token)
            .filter(|token| !token.is_empty())
            .ok_or(CredentialError::MissingAccessToken)?;

        self.cache.set(&self.cache_key, &token).await?;
        info!(token_url = %self.token_url, "obtained new access token");
        Ok(Credentials::oauth2(token))
    }
}

#[async_trait]
impl CredentialProvider for OAuth2ClientCredentials {
    async fn current(&self) -> Result<Credentials, CredentialError> {
        if let Some(token) = self.cache.get(&self.cache_key).await? {
            if !token.is_empty() {
                debug!(cache_key = %self.cache_key, "using cached access token");
                return Ok(Credentials::oauth2(token));
            }
        }
        self.fetch().await
    }

    async fn reauthenticate(&self) -> Result<Credentials, CredentialError> {
        self.fetch().await
    }
}
