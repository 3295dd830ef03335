//! # Request Handlers
//!
//! Axum request handlers for the checkout API and webhook receiver.

use crate::state::{AppState, WebhookMode};
use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use shop_core::{CheckoutError, CheckoutRequest, LineItem, OrderRequest, WebhookEvent};
use shop_stripe::{dispatch_webhook_event, SIGNATURE_HEADER};
use tracing::{error, info, instrument, warn};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Create checkout response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCheckoutResponse {
    /// Provider session ID, handed to Stripe.js for the redirect
    pub session_id: String,
}

/// Query for `GET /checkout-session`
#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// Webhook acknowledgment
#[derive(Debug, Serialize, Deserialize)]
pub struct WebhookAck {
    pub status: String,
}

impl WebhookAck {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>, code: u16) -> Self {
        Self {
            message: message.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn checkout_error_to_response(err: CheckoutError) -> ApiError {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse::new(message, 400)),
    )
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "photo-shop",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Browser config: publishable key, price and currency
pub async fn get_config(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.public_config.as_ref().clone())
}

/// Create a checkout session for the configured product
#[instrument(skip(state, payload))]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> Result<Json<CreateCheckoutResponse>, ApiError> {
    let Json(order) = payload.map_err(|rejection| {
        let body = ErrorResponse::new(
            "Request body must be JSON with a positive integer `quantity`",
            400,
        )
        .with_details(rejection.body_text());
        (StatusCode::BAD_REQUEST, Json(body))
    })?;

    order.validate().map_err(checkout_error_to_response)?;

    let unit_price = state
        .config
        .pricing
        .unit_price()
        .map_err(|e| {
            error!("Checkout pricing misconfigured: {}", e);
            checkout_error_to_response(e)
        })?;

    let item = LineItem::from_product(&state.config.product, unit_price, order.quantity);
    let total = item.total().map_err(|e| {
        warn!("Rejected order: {}", e);
        checkout_error_to_response(e)
    })?;
    let request =
        CheckoutRequest::single_item(item, state.urls.success_url(), state.urls.cancel_url());

    info!(
        "Creating checkout: quantity={}, total={} {}",
        order.quantity, total.amount, total.currency
    );

    let session = state
        .strategy
        .create_checkout(&request)
        .await
        .map_err(|e| {
            if e.is_provider_failure() {
                error!("Provider failed to create checkout: {}", e);
            } else {
                warn!("Failed to create checkout: {}", e);
            }
            checkout_error_to_response(e)
        })?;

    info!("Created checkout session: {}", session.session_id);

    Ok(Json(CreateCheckoutResponse {
        session_id: session.session_id,
    }))
}

/// Fetch a checkout session for the success page
#[instrument(skip(state))]
pub async fn get_checkout_session(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let session_id = query
        .session_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| bad_request("Missing sessionId query parameter"))?;

    let session = state
        .strategy
        .retrieve_session(&session_id)
        .await
        .map_err(|e| {
            warn!("Failed to retrieve checkout session {}: {}", session_id, e);
            checkout_error_to_response(e)
        })?;

    Ok(Json(session))
}

/// Handle provider webhook
#[instrument(skip(state, headers, body))]
pub async fn webhook_received(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<WebhookAck>, ApiError> {
    let event = match state.webhook_mode() {
        WebhookMode::Verified => {
            let signature = headers
                .get(SIGNATURE_HEADER)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| bad_request("Missing Stripe-Signature header"))?;

            state
                .strategy
                .verify_webhook(&body, signature)
                .await
                .map_err(|e| {
                    error!("Webhook verification failed: {}", e);
                    checkout_error_to_response(e)
                })?
        }
        WebhookMode::Unverified => {
            warn!("STRIPE_WEBHOOK_SECRET not set; trusting unsigned webhook body");
            WebhookEvent::from_payload(&body, false).map_err(|e| {
                error!("Webhook parse failed: {}", e);
                checkout_error_to_response(e)
            })?
        }
        WebhookMode::Disabled => {
            error!("Webhook received but no signing secret is configured");
            return Err(checkout_error_to_response(CheckoutError::Configuration(
                "Webhook signing secret not configured".to_string(),
            )));
        }
    };

    info!(
        "Received webhook: type={}, id={:?}",
        event.event_type, event.event_id
    );

    dispatch_webhook_event(state.webhook_handler.as_ref(), &event).map_err(|e| {
        error!("Webhook handler error: {}", e);
        checkout_error_to_response(e)
    })?;

    Ok(Json(WebhookAck::success()))
}
