//! # shop-core
//!
//! Core types and traits for the photo-checkout service.
//!
//! This crate provides:
//! - `PaymentStrategy` trait implemented by payment providers
//! - `Product` and `Pricing` for the single item on sale
//! - `OrderRequest`, `LineItem`, `CheckoutRequest` and `CheckoutSession` for the checkout flow
//! - `WebhookEvent` for provider-pushed notifications
//! - `CheckoutError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use shop_core::{CheckoutRequest, CheckoutUrls, LineItem, OrderRequest, Pricing, Product};
//!
//! let order = OrderRequest::new(2);
//! order.validate()?;
//!
//! let price = Pricing::new(Some("500".into()), Some("usd".into())).unit_price()?;
//! let item = LineItem::from_product(&Product::default(), price, order.quantity);
//!
//! let urls = CheckoutUrls::new("https://shop.example.com");
//! let request = CheckoutRequest::single_item(item, urls.success_url(), urls.cancel_url());
//!
//! let session = strategy.create_checkout(&request).await?;
//! ```

pub mod error;
pub mod event;
pub mod order;
pub mod product;
pub mod strategy;

// Re-exports for convenience
pub use error::{CheckoutError, CheckoutResult};
pub use event::{WebhookEvent, WebhookEventType, CHECKOUT_SESSION_COMPLETED, CHECKOUT_SESSION_EXPIRED};
pub use order::{CheckoutRequest, CheckoutSession, LineItem, OrderRequest};
pub use product::{Price, Pricing, Product};
pub use strategy::{BoxedPaymentStrategy, CheckoutUrls, PaymentStrategy, SESSION_ID_PLACEHOLDER};
