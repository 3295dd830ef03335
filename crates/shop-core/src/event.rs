//! # Webhook Events
//!
//! Provider-pushed event envelope: `{ "type": ..., "data": { "object": ... } }`.

use crate::error::{CheckoutError, CheckoutResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Event type tag for `checkout.session.completed`
pub const CHECKOUT_SESSION_COMPLETED: &str = "checkout.session.completed";

/// Event type tag for `checkout.session.expired`
pub const CHECKOUT_SESSION_EXPIRED: &str = "checkout.session.expired";

/// Webhook event types we care about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    /// Customer paid; the hosted session is done
    CheckoutCompleted,
    /// Session timed out without payment
    CheckoutExpired,
    /// Anything else (passthrough)
    Other(String),
}

impl WebhookEventType {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            CHECKOUT_SESSION_COMPLETED => WebhookEventType::CheckoutCompleted,
            CHECKOUT_SESSION_EXPIRED => WebhookEventType::CheckoutExpired,
            other => WebhookEventType::Other(other.to_string()),
        }
    }

    /// The provider's tag for this event type
    pub fn as_str(&self) -> &str {
        match self {
            WebhookEventType::CheckoutCompleted => CHECKOUT_SESSION_COMPLETED,
            WebhookEventType::CheckoutExpired => CHECKOUT_SESSION_EXPIRED,
            WebhookEventType::Other(tag) => tag.as_str(),
        }
    }
}

impl std::fmt::Display for WebhookEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event ID from provider, if the envelope carried one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,

    /// Event type
    pub event_type: WebhookEventType,

    /// `data.object` from the envelope
    pub object: serde_json::Value,

    /// Whether the payload passed signature verification
    pub verified: bool,

    /// When we received it
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "type")]
    event_type: String,
    data: EnvelopeData,
}

#[derive(Debug, Deserialize)]
struct EnvelopeData {
    object: serde_json::Value,
}

impl WebhookEvent {
    /// Parse an event envelope from a raw body.
    ///
    /// `verified` records whether the caller checked the signature over these
    /// exact bytes.
    pub fn from_payload(payload: &[u8], verified: bool) -> CheckoutResult<Self> {
        let envelope: Envelope = serde_json::from_slice(payload)
            .map_err(|e| CheckoutError::WebhookParseError(format!("Failed to parse event: {}", e)))?;

        Ok(Self {
            event_id: envelope.id,
            event_type: WebhookEventType::from_tag(&envelope.event_type),
            object: envelope.data.object,
            verified,
            received_at: Utc::now(),
        })
    }

    /// The `id` of the object the event is about (the session for checkout events)
    pub fn object_id(&self) -> Option<&str> {
        self.object.get("id").and_then(|v| v.as_str())
    }
}
