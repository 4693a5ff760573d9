//! WhatsApp adapter: inbound envelope parsing, outbound rendering, delivery, and dispatch.
//!
//! Two provider families are supported. The Meta Cloud API wraps every event in
//! `entry[0].changes[0].value` and authenticates with a static bearer token.
//! Serpro posts a flat envelope and authenticates through OAuth2 client
//! credentials with a token that is cached and refreshed on `401`.

use serde_json::Value;

use crate::answers::AnswerError;
use crate::credentials::CredentialError;

pub mod client;
pub mod events;
pub mod outbound;
pub mod phone;
pub mod router;

/// Top-level `object` value that marks a Cloud API webhook envelope.
pub const CLOUD_API_OBJECT: &str = "whatsapp_business_account";

/// Messaging backend a webhook came from and replies are delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// Meta WhatsApp Cloud API (`graph.facebook.com`).
    CloudApi,
    /// Serpro WhatsApp API.
    Serpro,
}

impl Provider {
    /// Pick the provider for an envelope.
    ///
    /// Envelopes whose top-level `object` is `"whatsapp_business_account"`
    /// come from the Cloud API; everything else is treated as Serpro.
    pub fn detect(envelope: &Value) -> Self {
        match envelope.get("object").and_then(Value::as_str) {
            Some(CLOUD_API_OBJECT) => Self::CloudApi,
            _ => Self::Serpro,
        }
    }

    /// Read a named field from an envelope using this provider's layout.
    ///
    /// Missing intermediate nodes yield `None`.
    pub fn event_field<'a>(self, envelope: &'a Value, key: &str) -> Option<&'a Value> {
        match self {
            Self::CloudApi => envelope
                .get("entry")?
                .get(0)?
                .get("changes")?
                .get(0)?
                .get("value")?
                .get(key),
            Self::Serpro => envelope.get(key),
        }
    }

    /// Short lowercase name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::CloudApi => "cloud_api",
            Self::Serpro => "serpro",
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from the WhatsApp adapter.
#[derive(Debug, thiserror::Error)]
pub enum WhatsAppError {
    /// HTTP request to the provider failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider rejected the request with `401` again after a forced
    /// re-authentication.
    #[error("unauthorized by {provider} after re-authentication: {body}")]
    Unauthorized {
        /// Provider that rejected the delivery.
        provider: Provider,
        /// Sanitized response body of the second `401`.
        body: String,
    },

    /// Credentials could not be obtained.
    #[error(transparent)]
    Credentials(#[from] CredentialError),

    /// The answer source failed to produce replies.
    #[error(transparent)]
    Answers(#[from] AnswerError),
}
