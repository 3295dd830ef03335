//! # Static Pages
//!
//! Order, success and failure pages, compiled into the binary from `client/`.

use axum::response::Html;

const ORDER_PAGE: &str = include_str!("../client/order.html");
const SUCCESS_PAGE: &str = include_str!("../client/order_success.html");
const FAILED_PAGE: &str = include_str!("../client/failed.html");

/// Order form
pub async fn order() -> Html<&'static str> {
    Html(ORDER_PAGE)
}

/// Where the provider sends the customer after paying
pub async fn order_success() -> Html<&'static str> {
    Html(SUCCESS_PAGE)
}

/// Where the provider sends the customer after cancelling
pub async fn failed() -> Html<&'static str> {
    Html(FAILED_PAGE)
}
