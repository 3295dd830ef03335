//! # Product & Pricing
//!
//! The shop sells exactly one product. Its price and currency come from
//! configuration as raw strings and are only interpreted when a checkout
//! session is requested.

use crate::error::{CheckoutError, CheckoutResult};
use serde::{Deserialize, Serialize};

/// Default product name shown on the hosted checkout page
pub const DEFAULT_PRODUCT_NAME: &str = "Pasha photo";

/// Default product image
pub const DEFAULT_PRODUCT_IMAGE: &str = "https://picsum.photos/300/300?random=4";

/// The product offered on the order page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Display name
    pub name: String,
    /// Image URL passed to the provider
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Product {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image_url: None,
        }
    }

    /// Builder: set the image URL
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.image_url = Some(url.into());
        self
    }
}

impl Default for Product {
    fn default() -> Self {
        Self::new(DEFAULT_PRODUCT_NAME).with_image(DEFAULT_PRODUCT_IMAGE)
    }
}

/// Price with amount in smallest currency unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    /// Amount in smallest currency unit (cents for USD)
    pub amount: i64,
    /// ISO 4217 code, exactly as configured
    pub currency: String,
}

impl Price {
    pub fn new(amount: i64, currency: impl Into<String>) -> Self {
        Self {
            amount,
            currency: currency.into(),
        }
    }
}

/// Pricing values as read from the environment.
///
/// Kept as strings so `/config` can echo them back untouched; `unset` stays
/// `None` and is serialized as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pricing {
    pub base_price: Option<String>,
    pub currency: Option<String>,
}

impl Pricing {
    pub fn new(base_price: Option<String>, currency: Option<String>) -> Self {
        Self {
            base_price,
            currency,
        }
    }

    /// Interpret the configured strings as a unit price
    pub fn unit_price(&self) -> CheckoutResult<Price> {
        let raw = self
            .base_price
            .as_deref()
            .ok_or_else(|| CheckoutError::Configuration("BASE_PRICE not set".to_string()))?;

        let amount: i64 = raw.trim().parse().map_err(|_| {
            CheckoutError::Configuration(format!(
                "BASE_PRICE must be an integer amount in the smallest currency unit, got {:?}",
                raw
            ))
        })?;

        if amount < 0 {
            return Err(CheckoutError::Configuration(
                "BASE_PRICE must not be negative".to_string(),
            ));
        }

        let currency = self
            .currency
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| CheckoutError::Configuration("CURRENCY not set".to_string()))?;

        Ok(Price::new(amount, currency))
    }
}
