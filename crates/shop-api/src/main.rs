//! # Photo Shop
//!
//! One-product checkout demo backed by Stripe Checkout.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables (or put them in .env)
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_PUBLIC_KEY=pk_test_...
//! export STRIPE_WEBHOOK_SECRET=whsec_...
//! export BASE_PRICE=500
//! export CURRENCY=usd
//! export DOMAIN=http://localhost:4242
//! export APP_ENV=development   # local only: accept unsigned webhooks
//!
//! # Run the server
//! photo-shop
//! ```

use shop_api::{routes, state::AppState, WebhookMode};
use shop_stripe::REQUIRED_WEBHOOK_EVENTS;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter, Layer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    // Print banner
    print_banner();

    // Initialize application state
    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;
    let is_prod = state.config.is_production();

    info!("Environment: {}", state.config.environment);
    info!("Payment provider: {}", state.strategy.provider_name());
    info!(
        "Selling {:?} at {:?} {:?}",
        state.config.product.name,
        state.config.pricing.base_price,
        state.config.pricing.currency
    );

    match state.webhook_mode() {
        WebhookMode::Verified => info!("Webhook signatures will be verified"),
        WebhookMode::Unverified => {
            warn!("STRIPE_WEBHOOK_SECRET not set: webhook bodies are trusted unverified")
        }
        WebhookMode::Disabled => warn!("Webhooks are disabled"),
    }

    if let Err(e) = state.config.pricing.unit_price() {
        warn!("Checkout will fail until pricing is fixed: {}", e);
    }

    // Create router
    let app = routes::create_router(state);

    info!("🚀 Photo shop starting on http://{}", addr);

    if !is_prod {
        info!("🛒 Order page: http://{}/", addr);
        info!(
            "🔔 Webhook: POST http://{}/webhook (events: {})",
            addr,
            REQUIRED_WEBHOOK_EVENTS.join(", ")
        );
    }

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// `RUST_LOG` controls the filter; `LOG_FORMAT=json` switches to JSON lines
fn init_tracing() {
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let fmt_layer = if json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().boxed()
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

fn print_banner() {
    println!(
        r#"
  📷 Photo Shop 📷
  ━━━━━━━━━━━━━━━━━━━━━━━
  Stripe Checkout demo
  Version: {}

"#,
        env!("CARGO_PKG_VERSION")
    );
}
