//! # shop-stripe
//!
//! Stripe payment strategy for the photo-checkout service.
//!
//! [`StripeCheckoutStrategy`] talks to the Checkout Sessions API over plain
//! HTTPS with form-encoded bodies, the same wire format Stripe's own
//! libraries use:
//! - `POST /v1/checkout/sessions` to open a hosted payment page
//! - `GET /v1/checkout/sessions/{id}` to read a session back
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shop_stripe::StripeCheckoutStrategy;
//! use shop_core::PaymentStrategy;
//!
//! let strategy = StripeCheckoutStrategy::from_env()?;
//! let session = strategy.create_checkout(&request).await?;
//! // Hand session.session_id to Stripe.js redirectToCheckout
//! ```
//!
//! ## Webhook Handling
//!
//! ```rust,ignore
//! use shop_stripe::{dispatch_webhook_event, CheckoutCompletedData, WebhookHandler};
//!
//! struct Fulfilment;
//!
//! impl WebhookHandler for Fulfilment {
//!     fn on_checkout_completed(&self, data: CheckoutCompletedData) -> CheckoutResult<()> {
//!         ship(data.session_id);
//!         Ok(())
//!     }
//! }
//!
//! let event = strategy.verify_webhook(payload, signature).await?;
//! dispatch_webhook_event(&Fulfilment, &event)?;
//! ```

pub mod checkout;
pub mod config;
pub mod webhook;

// Re-exports
pub use checkout::StripeCheckoutStrategy;
pub use config::StripeConfig;
pub use webhook::{
    dispatch_webhook_event, signature_header, verify_signature, CheckoutCompletedData,
    LoggingWebhookHandler, WebhookHandler, REQUIRED_WEBHOOK_EVENTS, SIGNATURE_HEADER,
};
