//! Route one inbound webhook event to its replies.
//!
//! The event's provider selects both the translator and the delivery client.
//! Replies are sent strictly in answer order; the first error aborts the rest
//! of the sequence.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::client::{DeliveryClient, DeliveryResponse};
use super::events::WhatsAppEvent;
use super::outbound::Translator;
use super::{Provider, WhatsAppError};
use crate::answers::AnswerSource;

/// Translator and delivery client for one provider.
pub struct Channel {
    /// Renders answers into this provider's payloads.
    pub translator: Translator,
    /// Delivers payloads to this provider.
    pub client: DeliveryClient,
}

/// Outcome of handling one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    /// Provider the event came from.
    pub provider: Provider,
    /// One response per delivered payload, in send order.
    pub deliveries: Vec<DeliveryResponse>,
}

/// Turns inbound envelopes into delivered replies.
pub struct Dispatcher {
    answers: Arc<dyn AnswerSource>,
    cloud_api: Channel,
    serpro: Channel,
}

impl Dispatcher {
    /// Create a dispatcher over both provider channels.
    pub fn new(answers: Arc<dyn AnswerSource>, cloud_api: Channel, serpro: Channel) -> Self {
        Self {
            answers,
            cloud_api,
            serpro,
        }
    }

    fn channel(&self, provider: Provider) -> &Channel {
        match provider {
            Provider::CloudApi => &self.cloud_api,
            Provider::Serpro => &self.serpro,
        }
    }

    /// Handle one webhook envelope.
    ///
    /// # Errors
    ///
    /// Returns the first [`WhatsAppError`] raised by the answer source or by a
    /// delivery; remaining replies are not sent.
    pub async fn handle(&self, envelope: Value) -> Result<DispatchReport, WhatsAppError> {
        let event = WhatsAppEvent::new(envelope);
        let provider = event.provider();
        let message = event.message();
        let contact = event.contact();
        debug!(%provider, ?message, phone = %contact.phone, "inbound event");

        let answers = self.answers.answers(&message, &contact).await?;
        let mut report = DispatchReport {
            provider,
            deliveries: Vec::with_capacity(answers.len()),
        };
        if answers.is_empty() {
            return Ok(report);
        }
        if contact.phone.is_empty() {
            warn!(%provider, count = answers.len(), "event has no contact phone, dropping answers");
            return Ok(report);
        }

        let channel = self.channel(provider);
        for payload in channel.translator.render_all(&answers, &contact.phone) {
            let response = channel.client.send(&payload).await?;
            if !response.is_success() {
                warn!(
                    %provider,
                    status = response.status,
                    body = %crate::http::sanitize_body(&response.body),
                    "provider did not accept message"
                );
            }
            report.deliveries.push(response);
        }

        info!(%provider, sent = report.deliveries.len(), "replies delivered");
        Ok(report)
    }
}
