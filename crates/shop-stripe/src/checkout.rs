//! # Stripe Checkout Sessions
//!
//! Implementation of the Stripe Checkout Sessions API: create a hosted
//! session, read one back, and verify webhook deliveries.

use crate::config::StripeConfig;
use crate::webhook::verify_signature;
use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::Deserialize;
use shop_core::{
    CheckoutError, CheckoutRequest, CheckoutResult, CheckoutSession, PaymentStrategy, WebhookEvent,
};
use tracing::{debug, error, info, instrument};

const PROVIDER: &str = "stripe";

/// Stripe Checkout Session strategy
///
/// Uses Stripe's hosted checkout page; card details never touch this service.
pub struct StripeCheckoutStrategy {
    config: StripeConfig,
    client: Client,
}

impl StripeCheckoutStrategy {
    /// Create a new Stripe checkout strategy
    pub fn new(config: StripeConfig) -> CheckoutResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| CheckoutError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            test_mode = config.is_test_mode(),
            api_base = %config.api_base_url,
            "Stripe client ready"
        );

        Ok(Self::with_client(config, client))
    }

    /// Create with an existing HTTP client
    pub fn with_client(config: StripeConfig, client: Client) -> Self {
        Self { config, client }
    }

    /// Create from environment variables
    pub fn from_env() -> CheckoutResult<Self> {
        Self::new(StripeConfig::from_env()?)
    }

    pub fn config(&self) -> &StripeConfig {
        &self.config
    }

    /// Form fields for `POST /v1/checkout/sessions`
    fn build_form(request: &CheckoutRequest) -> Vec<(String, String)> {
        let mut form_params: Vec<(String, String)> = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("success_url".to_string(), request.success_url.clone()),
            ("cancel_url".to_string(), request.cancel_url.clone()),
        ];

        for (i, item) in request.line_items.iter().enumerate() {
            form_params.push((
                format!("line_items[{}][price_data][currency]", i),
                item.unit_price.currency.clone(),
            ));
            form_params.push((
                format!("line_items[{}][price_data][unit_amount]", i),
                item.unit_price.amount.to_string(),
            ));
            form_params.push((
                format!("line_items[{}][price_data][product_data][name]", i),
                item.name.clone(),
            ));
            for (j, img) in item.images.iter().enumerate() {
                form_params.push((
                    format!("line_items[{}][price_data][product_data][images][{}]", i, j),
                    img.clone(),
                ));
            }
            form_params.push((
                format!("line_items[{}][quantity]", i),
                item.quantity.to_string(),
            ));
        }

        form_params
    }

    fn sessions_url(&self) -> CheckoutResult<Url> {
        Url::parse(&format!("{}/v1/checkout/sessions", self.config.api_base_url))
            .map_err(|e| CheckoutError::Configuration(format!("Invalid Stripe API base URL: {}", e)))
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.header("Authorization", self.config.auth_header());
        match &self.config.api_version {
            Some(version) => builder.header("Stripe-Version", version),
            None => builder,
        }
    }

    /// Send a request and return the body of a successful response
    async fn send(&self, builder: RequestBuilder) -> CheckoutResult<(StatusCode, String)> {
        let response = self
            .authorize(builder)
            .send()
            .await
            .map_err(|e| CheckoutError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CheckoutError::NetworkError(e.to_string()))?;

        Ok((status, body))
    }
}

/// Turn a non-2xx Stripe answer into a `CheckoutError`
fn api_error(status: StatusCode, body: &str) -> CheckoutError {
    error!("Stripe API error: status={}, body={}", status, body);

    let message = serde_json::from_str::<StripeErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| format!("HTTP {}", status));

    if status.is_client_error() {
        CheckoutError::ProviderRejected {
            provider: PROVIDER.to_string(),
            message,
        }
    } else {
        CheckoutError::ProviderError {
            provider: PROVIDER.to_string(),
            message,
        }
    }
}

#[async_trait]
impl PaymentStrategy for StripeCheckoutStrategy {
    #[instrument(skip(self, request), fields(items = request.item_count()))]
    async fn create_checkout(&self, request: &CheckoutRequest) -> CheckoutResult<CheckoutSession> {
        if request.is_empty() {
            return Err(CheckoutError::InvalidRequest(
                "Checkout has no line items".to_string(),
            ));
        }

        let form_params = Self::build_form(request);
        debug!(
            "Creating Stripe checkout session: {} line items",
            request.line_items.len()
        );

        let url = self.sessions_url()?;
        let (status, body) = self.send(self.client.post(url).form(&form_params)).await?;

        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        let session: StripeCheckoutSessionResponse =
            serde_json::from_str(&body).map_err(|e| CheckoutError::ProviderError {
                provider: PROVIDER.to_string(),
                message: format!("Failed to parse Stripe response: {}", e),
            })?;

        info!("Created Stripe checkout session: id={}", session.id);

        Ok(CheckoutSession {
            session_id: session.id,
            provider: PROVIDER.to_string(),
            checkout_url: session.url,
            expires_at: session
                .expires_at
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
        })
    }

    #[instrument(skip(self))]
    async fn retrieve_session(&self, session_id: &str) -> CheckoutResult<serde_json::Value> {
        // Url::push treats these as path navigation, which would land on the list endpoint
        if session_id.is_empty() || session_id == "." || session_id == ".." {
            return Err(CheckoutError::InvalidRequest(format!(
                "Invalid checkout session id: {:?}",
                session_id
            )));
        }

        let mut url = self.sessions_url()?;
        url.path_segments_mut()
            .map_err(|_| CheckoutError::Configuration("Stripe API base URL cannot be a base".to_string()))?
            .push(session_id);

        let (status, body) = self.send(self.client.get(url)).await?;

        if status == StatusCode::NOT_FOUND {
            return Err(CheckoutError::SessionNotFound {
                session_id: session_id.to_string(),
            });
        }
        if !status.is_success() {
            return Err(api_error(status, &body));
        }

        serde_json::from_str(&body).map_err(|e| CheckoutError::ProviderError {
            provider: PROVIDER.to_string(),
            message: format!("Failed to parse Stripe response: {}", e),
        })
    }

    #[instrument(skip(self, payload, signature))]
    async fn verify_webhook(&self, payload: &[u8], signature: &str) -> CheckoutResult<WebhookEvent> {
        let secret = self.config.webhook_secret.as_deref().ok_or_else(|| {
            CheckoutError::Configuration("STRIPE_WEBHOOK_SECRET not set".to_string())
        })?;

        verify_signature(payload, signature, secret)?;

        let event = WebhookEvent::from_payload(payload, true)?;
        debug!("Verified Stripe webhook: type={}", event.event_type);
        Ok(event)
    }

    fn verifies_webhooks(&self) -> bool {
        self.config.webhook_secret.is_some()
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeCheckoutSessionResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webhook::signature_header;
    use chrono::Utc;
    use serde_json::json;
    use shop_core::{LineItem, Price, Product};
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn checkout_request(quantity: u32) -> CheckoutRequest {
        let item = LineItem::from_product(&Product::default(), Price::new(500, "usd"), quantity);
        CheckoutRequest::single_item(
            item,
            "http://localhost:4242/order_success?session_id={CHECKOUT_SESSION_ID}",
            "http://localhost:4242/failed",
        )
    }

    fn strategy(server: &MockServer) -> StripeCheckoutStrategy {
        let config = StripeConfig::new("sk_test_abc")
            .with_api_base_url(server.uri())
            .with_api_version("2020-08-27");
        StripeCheckoutStrategy::new(config).unwrap()
    }

    fn form_value<'a>(form: &'a [(String, String)], key: &str) -> Option<&'a str> {
        form.iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_build_form() {
        let form = StripeCheckoutStrategy::build_form(&checkout_request(2));

        assert_eq!(form_value(&form, "mode"), Some("payment"));
        assert_eq!(form_value(&form, "payment_method_types[0]"), Some("card"));
        assert_eq!(form_value(&form, "line_items[0][quantity]"), Some("2"));
        assert_eq!(form_value(&form, "line_items[0][price_data][unit_amount]"), Some("500"));
        assert_eq!(form_value(&form, "line_items[0][price_data][currency]"), Some("usd"));
        assert_eq!(
            form_value(&form, "line_items[0][price_data][product_data][name]"),
            Some("Pasha photo")
        );
        assert_eq!(
            form_value(&form, "line_items[0][price_data][product_data][images][0]"),
            Some("https://picsum.photos/300/300?random=4")
        );
        assert_eq!(form_value(&form, "cancel_url"), Some("http://localhost:4242/failed"));
    }

    #[tokio::test]
    async fn test_create_checkout() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(header("authorization", "Bearer sk_test_abc"))
            .and(header("stripe-version", "2020-08-27"))
            .and(body_string_contains("line_items%5B0%5D%5Bquantity%5D=3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_test_123",
                "object": "checkout.session",
                "url": "https://checkout.stripe.com/c/pay/cs_test_123",
                "expires_at": 1_700_086_400
            })))
            .expect(1)
            .mount(&server)
            .await;

        let session = strategy(&server)
            .create_checkout(&checkout_request(3))
            .await
            .unwrap();

        assert_eq!(session.session_id, "cs_test_123");
        assert_eq!(session.provider, "stripe");
        assert!(session.checkout_url.is_some());
        assert!(session.expires_at.is_some());
    }

    #[tokio::test]
    async fn test_create_checkout_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "type": "invalid_request_error", "message": "Invalid currency: zzz" }
            })))
            .mount(&server)
            .await;

        let err = strategy(&server)
            .create_checkout(&checkout_request(1))
            .await
            .unwrap_err();

        match err {
            CheckoutError::ProviderRejected { message, .. } => {
                assert_eq!(message, "Invalid currency: zzz")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_create_checkout_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&server)
            .await;

        let err = strategy(&server)
            .create_checkout(&checkout_request(1))
            .await
            .unwrap_err();

        assert!(matches!(err, CheckoutError::ProviderError { .. }));
        assert_eq!(err.status_code(), 502);
    }

    #[tokio::test]
    async fn test_create_checkout_empty_request() {
        let server = MockServer::start().await;
        let request = CheckoutRequest {
            line_items: Vec::new(),
            success_url: "a".into(),
            cancel_url: "b".into(),
        };

        let err = strategy(&server).create_checkout(&request).await.unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_retrieve_session() {
        let server = MockServer::start().await;
        let body = json!({
            "id": "cs_test_123",
            "object": "checkout.session",
            "payment_status": "paid",
            "amount_total": 1000
        });
        Mock::given(method("GET"))
            .and(path("/v1/checkout/sessions/cs_test_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
            .mount(&server)
            .await;

        let session = strategy(&server).retrieve_session("cs_test_123").await.unwrap();
        assert_eq!(session, body);
    }

    #[tokio::test]
    async fn test_retrieve_session_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "error": { "code": "resource_missing", "message": "No such checkout.session" }
            })))
            .mount(&server)
            .await;

        let err = strategy(&server).retrieve_session("cs_nope").await.unwrap_err();
        assert!(matches!(err, CheckoutError::SessionNotFound { .. }));
    }

    #[tokio::test]
    async fn test_retrieve_session_escapes_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/checkout/sessions/a%2Fb"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "a/b"})))
            .expect(1)
            .mount(&server)
            .await;

        let session = strategy(&server).retrieve_session("a/b").await.unwrap();
        assert_eq!(session["id"], "a/b");
    }

    #[tokio::test]
    async fn test_retrieve_session_rejects_dot_segments() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "object": "list",
                "data": [{ "id": "cs_other_customer" }]
            })))
            .expect(0)
            .mount(&server)
            .await;

        let strategy = strategy(&server);
        for id in [".", "..", ""] {
            let err = strategy.retrieve_session(id).await.unwrap_err();
            assert!(matches!(err, CheckoutError::InvalidRequest(_)), "id {id:?}: {err:?}");
            assert_eq!(err.status_code(), 400);
        }
    }

    #[tokio::test]
    async fn test_create_checkout_network_error() {
        let config = StripeConfig::new("sk_test_abc").with_api_base_url("http://127.0.0.1:1");
        let strategy = StripeCheckoutStrategy::new(config).unwrap();

        let err = strategy.create_checkout(&checkout_request(1)).await.unwrap_err();
        assert!(matches!(err, CheckoutError::NetworkError(_)));
    }

    #[tokio::test]
    async fn test_verify_webhook() {
        let config = StripeConfig::new("sk_test_abc").with_webhook_secret("whsec_abc");
        let strategy = StripeCheckoutStrategy::new(config).unwrap();
        assert!(strategy.verifies_webhooks());

        let payload = br#"{"type":"checkout.session.completed","data":{"object":{"id":"cs_1"}}}"#;
        let header = signature_header("whsec_abc", Utc::now().timestamp(), payload).unwrap();

        let event = strategy.verify_webhook(payload, &header).await.unwrap();
        assert!(event.verified);
        assert_eq!(event.object_id(), Some("cs_1"));

        let err = strategy.verify_webhook(payload, "t=1,v1=00").await.unwrap_err();
        assert!(matches!(err, CheckoutError::WebhookVerificationFailed(_)));
    }

    #[tokio::test]
    async fn test_verify_webhook_without_secret() {
        let strategy = StripeCheckoutStrategy::new(StripeConfig::new("sk_test_abc")).unwrap();
        assert!(!strategy.verifies_webhooks());

        let err = strategy.verify_webhook(b"{}", "t=1,v1=00").await.unwrap_err();
        assert!(matches!(err, CheckoutError::Configuration(_)));
    }
}
