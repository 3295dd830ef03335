//! # Payment Strategy Trait
//!
//! The seam between the HTTP layer and the payment provider. The service
//! ships with a Stripe implementation; tests and alternative providers plug
//! in behind the same trait.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PaymentStrategy (trait)                  │
//! │  ├── create_checkout()                                      │
//! │  ├── retrieve_session()                                     │
//! │  ├── verify_webhook()                                       │
//! │  └── provider_name()                                        │
//! └─────────────────────────────────────────────────────────────┘
//!                            ▲
//!                    ┌───────┴───────┐
//!                    │StripeCheckout │
//!                    │   Strategy    │
//!                    └───────────────┘
//! ```

use crate::error::CheckoutResult;
use crate::event::WebhookEvent;
use crate::order::{CheckoutRequest, CheckoutSession};
use async_trait::async_trait;
use std::sync::Arc;

/// Core trait for payment provider implementations.
#[async_trait]
pub trait PaymentStrategy: Send + Sync {
    /// Create a hosted checkout session.
    ///
    /// # Returns
    /// A `CheckoutSession` whose id is issued by the provider.
    async fn create_checkout(&self, request: &CheckoutRequest) -> CheckoutResult<CheckoutSession>;

    /// Fetch a session by id and return the provider's JSON untouched.
    async fn retrieve_session(&self, session_id: &str) -> CheckoutResult<serde_json::Value>;

    /// Verify a webhook signature and parse the event.
    ///
    /// # Arguments
    /// * `payload` - Raw webhook body bytes
    /// * `signature` - Signature header from the request
    async fn verify_webhook(&self, payload: &[u8], signature: &str)
        -> CheckoutResult<WebhookEvent>;

    /// Whether this provider has a signing secret to verify webhooks with.
    fn verifies_webhooks(&self) -> bool;

    /// Get the provider name (for logging).
    fn provider_name(&self) -> &'static str;
}

/// Type alias for a boxed payment strategy (dynamic dispatch)
pub type BoxedPaymentStrategy = Arc<dyn PaymentStrategy>;

/// Redirect URLs handed to the provider
#[derive(Debug, Clone)]
pub struct CheckoutUrls {
    /// Public origin of the shop (e.g., "https://shop.example.com")
    pub domain: String,
    /// Success page path
    pub success_path: String,
    /// Cancel page path
    pub cancel_path: String,
}

/// Placeholder the provider substitutes with the real session id on redirect
pub const SESSION_ID_PLACEHOLDER: &str = "{CHECKOUT_SESSION_ID}";

impl CheckoutUrls {
    pub fn new(domain: impl Into<String>) -> Self {
        let domain: String = domain.into();
        Self {
            domain: domain.trim_end_matches('/').to_string(),
            success_path: "/order_success".to_string(),
            cancel_path: "/failed".to_string(),
        }
    }

    /// Success URL carrying the session id placeholder as `session_id`
    pub fn success_url(&self) -> String {
        format!(
            "{}{}?session_id={}",
            self.domain, self.success_path, SESSION_ID_PLACEHOLDER
        )
    }

    pub fn cancel_url(&self) -> String {
        format!("{}{}", self.domain, self.cancel_path)
    }
}

impl Default for CheckoutUrls {
    fn default() -> Self {
        Self::new("http://localhost:4242")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_urls() {
        let urls = CheckoutUrls::new("https://shop.example.com");

        assert_eq!(
            urls.success_url(),
            "https://shop.example.com/order_success?session_id={CHECKOUT_SESSION_ID}"
        );
        assert_eq!(urls.cancel_url(), "https://shop.example.com/failed");
    }

    #[test]
    fn test_checkout_urls_trailing_slash() {
        let urls = CheckoutUrls::new("http://localhost:4242/");
        assert_eq!(urls.cancel_url(), "http://localhost:4242/failed");
    }
}
