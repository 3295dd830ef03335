//! # Checkout Error Types
//!
//! Typed error handling for the photo-checkout service.
//! All provider and request operations return `Result<T, CheckoutError>`.

use thiserror::Error;

/// Core error type for checkout and webhook operations
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Configuration errors (missing keys, unparsable price)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Invalid request data from the browser
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The provider refused the request (4xx from its API)
    #[error("Rejected by {provider}: {message}")]
    ProviderRejected { provider: String, message: String },

    /// The provider failed or answered with something we could not read
    #[error("Provider error [{provider}]: {message}")]
    ProviderError { provider: String, message: String },

    /// Network/HTTP error communicating with provider
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Provider has no session with this id
    #[error("Session not found: {session_id}")]
    SessionNotFound { session_id: String },

    /// Webhook signature verification failed
    #[error("Webhook verification failed: {0}")]
    WebhookVerificationFailed(String),

    /// Webhook payload parsing error
    #[error("Webhook parse error: {0}")]
    WebhookParseError(String),

    /// Internal error (should not happen)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CheckoutError {
    /// Returns the HTTP status code appropriate for this error.
    ///
    /// Every value is a valid standard status; callers can pass it straight to
    /// `StatusCode::from_u16`.
    pub fn status_code(&self) -> u16 {
        match self {
            CheckoutError::Configuration(_) => 500,
            CheckoutError::InvalidRequest(_) => 400,
            CheckoutError::ProviderRejected { .. } => 400,
            CheckoutError::ProviderError { .. } => 502,
            CheckoutError::NetworkError(_) => 502,
            CheckoutError::SessionNotFound { .. } => 404,
            CheckoutError::WebhookVerificationFailed(_) => 400,
            CheckoutError::WebhookParseError(_) => 400,
            CheckoutError::Internal(_) => 500,
        }
    }

    /// True when the failure happened on the provider side of the call
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            CheckoutError::ProviderRejected { .. }
                | CheckoutError::ProviderError { .. }
                | CheckoutError::NetworkError(_)
        )
    }
}

/// Result type alias for checkout operations
pub type CheckoutResult<T> = Result<T, CheckoutError>;
