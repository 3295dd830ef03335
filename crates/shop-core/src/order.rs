//! # Order Types
//!
//! Order request, line items and checkout session types.

use crate::error::{CheckoutError, CheckoutResult};
use crate::product::{Price, Product};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the order page submits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub quantity: u32,
}

impl OrderRequest {
    pub fn new(quantity: u32) -> Self {
        Self { quantity }
    }

    /// Quantity must be a positive integer
    pub fn validate(&self) -> CheckoutResult<()> {
        if self.quantity == 0 {
            return Err(CheckoutError::InvalidRequest(
                "quantity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A line item sent to the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    /// Product name (denormalized for display)
    pub name: String,

    /// Image URLs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,

    /// Unit price
    pub unit_price: Price,

    /// Quantity
    pub quantity: u32,
}

impl LineItem {
    /// Create a line item from a product
    pub fn from_product(product: &Product, unit_price: Price, quantity: u32) -> Self {
        Self {
            name: product.name.clone(),
            images: product.image_url.iter().cloned().collect(),
            unit_price,
            quantity,
        }
    }

    /// Calculate the total price for this line item
    pub fn total(&self) -> CheckoutResult<Price> {
        let amount = self
            .unit_price
            .amount
            .checked_mul(i64::from(self.quantity))
            .ok_or_else(|| {
                CheckoutError::InvalidRequest(format!(
                    "Order total overflows: {} x {}",
                    self.unit_price.amount, self.quantity
                ))
            })?;

        Ok(Price {
            amount,
            currency: self.unit_price.currency.clone(),
        })
    }
}

/// Everything the provider needs to open a hosted checkout
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub line_items: Vec<LineItem>,
    /// Redirect after payment; may carry the provider's session id placeholder
    pub success_url: String,
    /// Redirect when the customer backs out
    pub cancel_url: String,
}

impl CheckoutRequest {
    /// A checkout for a single line item
    pub fn single_item(
        item: LineItem,
        success_url: impl Into<String>,
        cancel_url: impl Into<String>,
    ) -> Self {
        Self {
            line_items: vec![item],
            success_url: success_url.into(),
            cancel_url: cancel_url.into(),
        }
    }

    /// Check if request is empty
    pub fn is_empty(&self) -> bool {
        self.line_items.is_empty()
    }

    /// Get item count
    pub fn item_count(&self) -> u32 {
        self.line_items.iter().map(|i| i.quantity).sum()
    }
}

/// A checkout session created by a payment provider.
///
/// Only the identifier is forwarded to the browser; the session itself stays
/// with the provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's session ID
    pub session_id: String,

    /// Provider name (e.g., "stripe")
    pub provider: String,

    /// Hosted page URL, when the provider returns one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,

    /// When the session expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl CheckoutSession {
    pub fn new(session_id: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            provider: provider.into(),
            checkout_url: None,
            expires_at: None,
        }
    }
}
