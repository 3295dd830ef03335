//! # Stripe Webhook Handling
//!
//! Signature verification for the `Stripe-Signature` header and dispatch of
//! parsed events to a [`WebhookHandler`].
//!
//! The header looks like `t=1492774577,v1=5257a869...,v0=...`. The expected
//! `v1` value is the hex HMAC-SHA256 of `"{t}.{raw body}"` keyed with the
//! endpoint's signing secret.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use shop_core::{CheckoutError, CheckoutResult, WebhookEvent, WebhookEventType};
use tracing::{debug, info, warn};

type HmacSha256 = Hmac<Sha256>;

/// Name of the header Stripe signs webhook deliveries with
pub const SIGNATURE_HEADER: &str = "stripe-signature";

/// Maximum age of a signed delivery, in seconds
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

// =============================================================================
// Signature Verification
// =============================================================================

#[derive(Debug)]
struct SignatureHeader {
    timestamp: i64,
    signatures: Vec<String>,
}

fn parse_signature_header(header: &str) -> CheckoutResult<SignatureHeader> {
    let mut timestamp = None;
    let mut signatures = Vec::new();

    for part in header.split(',') {
        let Some((key, value)) = part.trim().split_once('=') else {
            continue;
        };
        match key {
            "t" => timestamp = value.parse().ok(),
            "v1" => signatures.push(value.to_string()),
            _ => {}
        }
    }

    let timestamp = timestamp.ok_or_else(|| {
        CheckoutError::WebhookVerificationFailed("Missing timestamp in signature".to_string())
    })?;

    if signatures.is_empty() {
        return Err(CheckoutError::WebhookVerificationFailed(
            "No v1 signature found".to_string(),
        ));
    }

    Ok(SignatureHeader {
        timestamp,
        signatures,
    })
}

fn signed_mac(secret: &str, timestamp: i64, payload: &[u8]) -> CheckoutResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| CheckoutError::Internal(format!("HMAC key rejected: {}", e)))?;
    mac.update(timestamp.to_string().as_bytes());
    mac.update(b".");
    mac.update(payload);
    Ok(mac)
}

/// Hex signature Stripe would send for `payload` at `timestamp`
pub fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> CheckoutResult<String> {
    let mac = signed_mac(secret, timestamp, payload)?;
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Build a complete `Stripe-Signature` header value.
///
/// Used by local tooling and tests to produce deliveries the verifier accepts.
pub fn signature_header(secret: &str, timestamp: i64, payload: &[u8]) -> CheckoutResult<String> {
    Ok(format!(
        "t={},v1={}",
        timestamp,
        compute_signature(secret, timestamp, payload)?
    ))
}

/// Check `header` against `payload`.
///
/// Succeeds when any `v1` entry matches and the timestamp is within
/// `tolerance_secs` of `now`.
pub fn verify_signature_at(
    payload: &[u8],
    header: &str,
    secret: &str,
    tolerance_secs: i64,
    now: i64,
) -> CheckoutResult<()> {
    let parsed = parse_signature_header(header)?;

    if now.abs_diff(parsed.timestamp) > tolerance_secs.unsigned_abs() {
        return Err(CheckoutError::WebhookVerificationFailed(
            "Timestamp outside tolerance".to_string(),
        ));
    }

    let valid = parsed.signatures.iter().any(|sig| {
        let Ok(expected) = hex::decode(sig) else {
            return false;
        };
        // verify_slice compares in constant time
        signed_mac(secret, parsed.timestamp, payload)
            .map(|mac| mac.verify_slice(&expected).is_ok())
            .unwrap_or(false)
    });

    if !valid {
        return Err(CheckoutError::WebhookVerificationFailed(
            "Signature mismatch".to_string(),
        ));
    }

    Ok(())
}

/// [`verify_signature_at`] against the current clock
pub fn verify_signature(payload: &[u8], header: &str, secret: &str) -> CheckoutResult<()> {
    verify_signature_at(
        payload,
        header,
        secret,
        DEFAULT_TOLERANCE_SECS,
        Utc::now().timestamp(),
    )
}

// =============================================================================
// Event Dispatch
// =============================================================================

/// Parsed checkout.session.completed object
#[derive(Debug, Clone, Default)]
pub struct CheckoutCompletedData {
    pub session_id: Option<String>,
    pub payment_status: Option<String>,
    pub amount_total: Option<i64>,
    pub currency: Option<String>,
    pub customer_email: Option<String>,
}

impl CheckoutCompletedData {
    /// Pick the interesting fields out of `data.object`; absent fields stay `None`
    pub fn from_event(event: &WebhookEvent) -> Self {
        let obj = &event.object;
        let string = |key: &str| obj.get(key).and_then(|v| v.as_str()).map(String::from);

        Self {
            session_id: string("id"),
            payment_status: string("payment_status"),
            amount_total: obj.get("amount_total").and_then(|v| v.as_i64()),
            currency: string("currency"),
            customer_email: obj
                .get("customer_details")
                .and_then(|cd| cd.get("email"))
                .and_then(|v| v.as_str())
                .map(String::from),
        }
    }

    /// Check if payment was collected
    pub fn is_paid(&self) -> bool {
        self.payment_status.as_deref() == Some("paid")
    }
}

/// Webhook event handler trait
///
/// Implement this trait to react to events. Every method has a logging default.
#[allow(unused_variables)]
pub trait WebhookHandler: Send + Sync {
    /// Called for every event before the type-specific hook
    fn on_event_received(&self, event: &WebhookEvent) {
        info!(
            event_type = %event.event_type,
            verified = event.verified,
            object = %event.object,
            "Webhook event received"
        );
    }

    /// Called when a checkout session is completed
    fn on_checkout_completed(&self, data: CheckoutCompletedData) -> CheckoutResult<()> {
        info!(
            session_id = ?data.session_id,
            paid = data.is_paid(),
            amount_total = ?data.amount_total,
            currency = ?data.currency,
            "🔔 Payment succeeded!"
        );
        Ok(())
    }

    /// Called when a checkout session expires unpaid
    fn on_checkout_expired(&self, event: &WebhookEvent) -> CheckoutResult<()> {
        warn!(session_id = ?event.object_id(), "Checkout session expired");
        Ok(())
    }

    /// Called for event types we do not act on
    fn on_other_event(&self, event: &WebhookEvent) -> CheckoutResult<()> {
        debug!("Unhandled webhook event: {}", event.event_type);
        Ok(())
    }
}

/// Default webhook handler (just logs events)
pub struct LoggingWebhookHandler;

impl WebhookHandler for LoggingWebhookHandler {}

/// Dispatch a webhook event to the appropriate handler method
pub fn dispatch_webhook_event(
    handler: &dyn WebhookHandler,
    event: &WebhookEvent,
) -> CheckoutResult<()> {
    handler.on_event_received(event);

    match &event.event_type {
        WebhookEventType::CheckoutCompleted => {
            handler.on_checkout_completed(CheckoutCompletedData::from_event(event))
        }
        WebhookEventType::CheckoutExpired => handler.on_checkout_expired(event),
        WebhookEventType::Other(_) => handler.on_other_event(event),
    }
}

/// Events to enable on the Stripe endpoint
pub const REQUIRED_WEBHOOK_EVENTS: &[&str] = &[
    shop_core::CHECKOUT_SESSION_COMPLETED,
    shop_core::CHECKOUT_SESSION_EXPIRED,
];
