//! # shop-api
//!
//! HTTP layer for the photo-checkout service.
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/` | Order page |
//! | GET | `/order_success` | Success page |
//! | GET | `/failed` | Cancel page |
//! | GET | `/config` | `{publicKey, basePrice, currency}` |
//! | GET | `/checkout-session?sessionId=` | Session JSON from the provider |
//! | POST | `/create-checkout-session` | `{quantity}` → `{sessionId}` |
//! | POST | `/webhook` | Provider events |
//! | GET | `/health` | Health check |

pub mod handlers;
pub mod pages;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState, PublicConfig, WebhookMode};
