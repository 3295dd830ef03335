//! # Routes
//!
//! Axum router configuration.

use crate::handlers;
use crate::pages;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Create the main application router
///
/// Routes:
/// - Pages:
///   - GET  / - Order form
///   - GET  /order_success - Success page
///   - GET  /failed - Cancel page
///
/// - API:
///   - GET  /config - Publishable key, base price, currency
///   - GET  /checkout-session?sessionId= - Provider session JSON
///   - POST /create-checkout-session - Create checkout
///
/// - Webhooks:
///   - POST /webhook - Provider event receiver
///
/// - GET /health
pub fn create_router(state: AppState) -> Router {
    let page_routes = Router::new()
        .route("/", get(pages::order))
        .route("/order_success", get(pages::order_success))
        .route("/failed", get(pages::failed));

    let api_routes = Router::new()
        .route("/config", get(handlers::get_config))
        .route("/checkout-session", get(handlers::get_checkout_session))
        .route(
            "/create-checkout-session",
            post(handlers::create_checkout_session),
        );

    // Must see the raw body for signature checks
    let webhook_routes = Router::new().route("/webhook", post(handlers::webhook_received));

    Router::new()
        .route("/health", get(handlers::health))
        .merge(page_routes)
        .merge(api_routes)
        .merge(webhook_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
