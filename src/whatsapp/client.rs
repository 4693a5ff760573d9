//! HTTP delivery of rendered payloads to a provider.
//!
//! Every request carries the current bearer token. A `401` triggers exactly one
//! forced re-authentication and one retry; a second `401` is fatal. All other
//! statuses are handed back to the caller untouched.

use std::sync::Arc;

use reqwest::StatusCode;
use tracing::{debug, warn};

use super::outbound::{Layout, OutboundPayload};
use super::{Provider, WhatsAppError};
use crate::credentials::{CredentialProvider, Credentials};
use crate::http::sanitize_body;

/// Provider endpoints, one per [`Layout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    /// Plain text messages.
    pub text: String,
    /// Reply-button messages.
    pub buttons: String,
    /// List messages.
    pub list: String,
}

impl Endpoints {
    /// Cloud API endpoints: every layout goes to `{api_base}/{phone_number_id}/messages`.
    pub fn cloud_api(api_base: &str, phone_number_id: &str) -> Self {
        let messages = format!("{}/{phone_number_id}/messages", api_base.trim_end_matches('/'));
        Self {
            text: messages.clone(),
            buttons: messages.clone(),
            list: messages,
        }
    }

    /// Serpro endpoints under `{base_url}/client/{client_id}/v2`.
    pub fn serpro(base_url: &str, client_id: &str) -> Self {
        let client_url = serpro_client_url(base_url, client_id);
        Self {
            text: format!("{client_url}/requisicao/mensagem/texto"),
            buttons: format!("{client_url}/requisicao/mensagem/interativa-botoes"),
            list: format!("{client_url}/requisicao/mensagem/interativa-lista"),
        }
    }

    /// Endpoint for a layout.
    pub fn for_layout(&self, layout: Layout) -> &str {
        match layout {
            Layout::Text => &self.text,
            Layout::Buttons => &self.buttons,
            Layout::List => &self.list,
        }
    }
}

/// Base URL of one Serpro client's API.
pub fn serpro_client_url(base_url: &str, client_id: &str) -> String {
    format!("{}/client/{client_id}/v2", base_url.trim_end_matches('/'))
}

/// Serpro OAuth2 token endpoint.
pub fn serpro_token_url(base_url: &str) -> String {
    format!("{}/oauth2/token", base_url.trim_end_matches('/'))
}

/// Serpro webhook registration endpoint.
pub fn serpro_webhook_url(base_url: &str, client_id: &str) -> String {
    format!("{}/webhook", serpro_client_url(base_url, client_id))
}

/// Status and body of a provider response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

impl DeliveryResponse {
    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Sends payloads to one provider.
pub struct DeliveryClient {
    provider: Provider,
    client: reqwest::Client,
    endpoints: Endpoints,
    credentials: Arc<dyn CredentialProvider>,
}

impl DeliveryClient {
    /// Create a client for `provider`.
    pub fn new(
        provider: Provider,
        client: reqwest::Client,
        endpoints: Endpoints,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            provider,
            client,
            endpoints,
            credentials,
        }
    }

    /// Provider this client delivers to.
    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Endpoints this client posts to.
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Post one payload to the endpoint matching its layout.
    ///
    /// # Errors
    ///
    /// Returns [`WhatsAppError::Unauthorized`] when the provider answers `401`
    /// both before and after a forced re-authentication,
    /// [`WhatsAppError::Credentials`] when no token can be obtained, and
    /// [`WhatsAppError::Http`] on transport failure.
    pub async fn send(&self, payload: &OutboundPayload) -> Result<DeliveryResponse, WhatsAppError> {
        let url = self.endpoints.for_layout(payload.layout());
        let response = self
            .authorized(|credentials| {
                self.client
                    .post(url)
                    .header(reqwest::header::AUTHORIZATION, credentials.bearer())
                    .json(payload)
            })
            .await?;
        debug!(provider = %self.provider, url, status = response.status, "payload delivered");
        Ok(response)
    }

    /// Register `webhook_url` as the destination of inbound events.
    ///
    /// Posts the URL as `text/plain` to `registration_url`.
    ///
    /// # Errors
    ///
    /// Same as [`DeliveryClient::send`].
    pub async fn register_webhook(
        &self,
        registration_url: &str,
        webhook_url: &str,
    ) -> Result<DeliveryResponse, WhatsAppError> {
        self.authorized(|credentials| {
            self.client
                .post(registration_url)
                .header(reqwest::header::AUTHORIZATION, credentials.bearer())
                .header(reqwest::header::CONTENT_TYPE, "text/plain")
                .body(webhook_url.to_owned())
        })
        .await
    }

    /// Run a request with current credentials, re-authenticating once on `401`.
    async fn authorized<F>(&self, build: F) -> Result<DeliveryResponse, WhatsAppError>
    where
        F: Fn(&Credentials) -> reqwest::RequestBuilder,
    {
        let credentials = self.credentials.current().await?;
        let response = execute(build(&credentials)).await?;
        if response.status != StatusCode::UNAUTHORIZED.as_u16() {
            return Ok(response);
        }

        warn!(provider = %self.provider, "provider rejected token, re-authenticating");
        let credentials = self.credentials.reauthenticate().await?;
        let response = execute(build(&credentials)).await?;
        if response.status == StatusCode::UNAUTHORIZED.as_u16() {
            return Err(WhatsAppError::Unauthorized {
                provider: self.provider,
                body: sanitize_body(&response.body),
            });
        }
        Ok(response)
    }
}

async fn execute(request: reqwest::RequestBuilder) -> Result<DeliveryResponse, WhatsAppError> {
    let response = request.send().await?;
    let status = response.status().as_u16();
    let body = response.text().await?;
    Ok(DeliveryResponse { status, body })
}
