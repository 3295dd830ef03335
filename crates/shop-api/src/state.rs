//! # Application State
//!
//! Shared state for the Axum application.
//! Built once at startup and cloned into every request; nothing in it mutates.

use anyhow::{bail, Context};
use serde::Serialize;
use shop_core::{BoxedPaymentStrategy, CheckoutUrls, Pricing, Product};
use shop_stripe::{LoggingWebhookHandler, StripeCheckoutStrategy, StripeConfig, WebhookHandler};
use std::sync::Arc;

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Public origin used for the provider's redirect URLs
    pub domain: String,
    /// Environment (development, staging, production)
    pub environment: String,
    /// The item on sale
    pub product: Product,
    /// Raw price/currency strings
    pub pricing: Pricing,
}

impl AppConfig {
    /// Load from environment variables
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; missing values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Product::default();
        let product = Product {
            name: lookup("PRODUCT_NAME").unwrap_or(defaults.name),
            image_url: lookup("PRODUCT_IMAGE").or(defaults.image_url),
        };

        Self {
            host: lookup("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: lookup("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(4242),
            domain: lookup("DOMAIN").unwrap_or_else(|| "http://localhost:4242".to_string()),
            // Development mode (unsigned webhooks) must be asked for explicitly
            environment: lookup("APP_ENV").unwrap_or_else(|| "production".to_string()),
            product,
            pricing: Pricing::new(lookup("BASE_PRICE"), lookup("CURRENCY")),
        }
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("Invalid socket address {}:{}", self.host, self.port))
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Unsigned webhooks are only trusted while developing locally
    pub fn allows_unverified_webhooks(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

/// Values the order page needs in the browser.
///
/// Serialized as-is by `GET /config`; unset values become `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicConfig {
    pub public_key: Option<String>,
    pub base_price: Option<String>,
    pub currency: Option<String>,
}

/// How incoming webhooks are authenticated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookMode {
    /// Signature checked with the configured secret
    Verified,
    /// Body trusted as-is (development only)
    Unverified,
    /// No secret and not in development: webhooks are refused
    Disabled,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Payment provider
    pub strategy: BoxedPaymentStrategy,
    /// Receives dispatched webhook events
    pub webhook_handler: Arc<dyn WebhookHandler>,
    /// Checkout URLs
    pub urls: CheckoutUrls,
    /// Browser-facing config
    pub public_config: Arc<PublicConfig>,
    /// Application config
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Create a new AppState with the Stripe strategy, both configured from the environment
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env();
        let stripe_config = StripeConfig::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to load Stripe config: {}", e))?;

        let state = Self::with_stripe(config, stripe_config)?;

        if state.webhook_mode() == WebhookMode::Disabled {
            bail!(
                "STRIPE_WEBHOOK_SECRET must be set when APP_ENV={} (unsigned webhooks are accepted only in development)",
                state.config.environment
            );
        }

        Ok(state)
    }

    /// Build state around a Stripe strategy
    pub fn with_stripe(config: AppConfig, stripe_config: StripeConfig) -> anyhow::Result<Self> {
        let public_key = stripe_config.publishable_key.clone();
        let strategy = StripeCheckoutStrategy::new(stripe_config)
            .map_err(|e| anyhow::anyhow!("Failed to initialize Stripe: {}", e))?;

        Ok(Self::from_parts(config, Arc::new(strategy), public_key))
    }

    /// Assemble state from already-built parts
    pub fn from_parts(
        config: AppConfig,
        strategy: BoxedPaymentStrategy,
        public_key: Option<String>,
    ) -> Self {
        let urls = CheckoutUrls::new(&config.domain);
        let public_config = PublicConfig {
            public_key,
            base_price: config.pricing.base_price.clone(),
            currency: config.pricing.currency.clone(),
        };

        Self {
            strategy,
            webhook_handler: Arc::new(LoggingWebhookHandler),
            urls,
            public_config: Arc::new(public_config),
            config: Arc::new(config),
        }
    }

    /// Builder: replace the webhook handler
    pub fn with_webhook_handler(mut self, handler: Arc<dyn WebhookHandler>) -> Self {
        self.webhook_handler = handler;
        self
    }

    pub fn webhook_mode(&self) -> WebhookMode {
        if self.strategy.verifies_webhooks() {
            WebhookMode::Verified
        } else if self.config.allows_unverified_webhooks() {
            WebhookMode::Unverified
        } else {
            WebhookMode::Disabled
        }
    }
}
