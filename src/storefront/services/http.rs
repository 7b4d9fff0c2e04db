//! # HTTP Service
//!
//! Knows the storefront's endpoints, the headers each one expects and how their
//! responses are normalized. Everything below the transport is a byte pipe;
//! everything above this service sees typed results.

use crate::storefront::io::{Transport, TransportRequest, TransportResponse};
use crate::storefront::models::{CartAction, CartRequest, CartSnapshot};
use anyhow::{anyhow, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

/// Header marking a request as an in-page (AJAX) request
pub const AJAX_HEADER: &str = "X-Requested-With";
pub const AJAX_HEADER_VALUE: &str = "XMLHttpRequest";

/// Header carrying the page's CSRF token on mutating requests
pub const CSRF_HEADER: &str = "X-CSRFToken";

pub const CART_COUNT_PATH: &str = "/order/cart/count";

/// Which account attribute an availability check is about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityKind {
    Username,
    Email,
}

impl AvailabilityKind {
    fn path(&self) -> &'static str {
        match self {
            AvailabilityKind::Username => "/auth/check-username",
            AvailabilityKind::Email => "/auth/check-email",
        }
    }

    fn param(&self) -> &'static str {
        match self {
            AvailabilityKind::Username => "username",
            AvailabilityKind::Email => "email",
        }
    }
}

#[derive(Debug, Deserialize)]
struct AvailabilityReply {
    #[serde(default)]
    available: bool,
}

/// Service for the storefront's HTTP endpoints
#[derive(Clone)]
pub struct HttpService {
    transport: Arc<dyn Transport>,
    base_url: Url,
}

impl HttpService {
    pub fn new(transport: Arc<dyn Transport>, base_url: Url) -> Self {
        Self {
            transport,
            base_url,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a site path against the base URL
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("invalid endpoint path '{path}'"))
    }

    async fn send_checked(&self, request: TransportRequest) -> Result<TransportResponse> {
        let url = request.url.clone();
        let response = self.transport.send(request).await?;
        if !response.is_success() {
            return Err(anyhow!("{} answered HTTP {}", url, response.status));
        }
        Ok(response)
    }

    /// Fetch a full page
    pub async fn get_page(&self, url: &Url) -> Result<String> {
        let response = self.send_checked(TransportRequest::get(url.clone())).await?;
        Ok(response.body)
    }

    /// Fetch a page as an in-page request, for splicing fragments out of it
    pub async fn get_partial(&self, url: &Url) -> Result<String> {
        let request =
            TransportRequest::get(url.clone()).with_header(AJAX_HEADER, AJAX_HEADER_VALUE);
        let response = self.send_checked(request).await?;
        Ok(response.body)
    }

    async fn get_json<T: DeserializeOwned>(&self, request: TransportRequest) -> Result<T> {
        let url = request.url.clone();
        let response = self.send_checked(request).await?;
        serde_json::from_str(&response.body)
            .with_context(|| format!("{url} did not answer with the expected JSON"))
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
        csrf_token: &str,
    ) -> Result<T> {
        let request = TransportRequest::post(url, serde_json::to_string(body)?)
            .with_header("Content-Type", "application/json")
            .with_header(CSRF_HEADER, csrf_token);
        self.get_json(request).await
    }

    /// Current cart count; transport failures normalize to a network-error snapshot
    pub async fn cart_count(&self) -> CartSnapshot {
        let result = async {
            let request = TransportRequest::get(self.endpoint(CART_COUNT_PATH)?)
                .with_header(AJAX_HEADER, AJAX_HEADER_VALUE);
            self.get_json::<CartSnapshot>(request).await
        }
        .await;
        normalize(CART_COUNT_PATH, result)
    }

    /// Run a cart mutation; transport failures normalize to a network-error snapshot
    pub async fn cart_mutation(
        &self,
        action: CartAction,
        request: &CartRequest,
        csrf_token: &str,
    ) -> CartSnapshot {
        let path = action.path();
        let result = async {
            let url = self.endpoint(&path)?;
            self.post_json::<_, CartSnapshot>(url, request, csrf_token)
                .await
        }
        .await;
        normalize(&path, result)
    }

    /// Ask the server whether a username or email is still free.
    /// A reply without `available` counts as taken.
    pub async fn check_availability(&self, kind: AvailabilityKind, value: &str) -> Result<bool> {
        let mut url = self.endpoint(kind.path())?;
        url.query_pairs_mut().append_pair(kind.param(), value);
        let reply: AvailabilityReply = self.get_json(TransportRequest::get(url)).await?;
        Ok(reply.available)
    }
}

fn normalize(path: &str, result: Result<CartSnapshot>) -> CartSnapshot {
    result.unwrap_or_else(|e| {
        tracing::warn!("cart request {} failed: {:#}", path, e);
        CartSnapshot::network_error()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storefront::io::{Method, MockReply, MockTransport};
    use crate::storefront::models::cart_model::NETWORK_ERROR_MESSAGE;
    use serde_json::json;

    fn service(transport: &MockTransport) -> HttpService {
        HttpService::new(
            Arc::new(transport.clone()),
            Url::parse("http://shop.test/").unwrap(),
        )
    }

    #[tokio::test]
    async fn cart_count_should_send_ajax_header() {
        let transport = MockTransport::new();
        transport.on(
            Method::Get,
            CART_COUNT_PATH,
            MockReply::json(json!({"success": true, "cart_count": 4})),
        );

        let snapshot = service(&transport).cart_count().await;

        assert!(snapshot.success);
        assert_eq!(snapshot.cart_count, Some(4));
        let sent = &transport.requests()[0];
        assert_eq!(sent.header("x-requested-with"), Some(AJAX_HEADER_VALUE));
    }

    #[tokio::test]
    async fn cart_mutation_should_post_json_with_csrf_header() {
        let transport = MockTransport::new();
        transport.on(
            Method::Post,
            "/order/cart/add",
            MockReply::json(json!({"success": true, "cart_count": 1})),
        );

        let request = CartRequest {
            product_id: Some(9),
            quantity: Some(1),
        };
        service(&transport)
            .cart_mutation(CartAction::Add, &request, "tok")
            .await;

        let sent = &transport.requests_to("/order/cart/add")[0];
        assert_eq!(sent.method, Method::Post);
        assert_eq!(sent.header(CSRF_HEADER), Some("tok"));
        assert_eq!(sent.header("content-type"), Some("application/json"));
        assert_eq!(sent.body.as_deref(), Some(r#"{"product_id":9,"quantity":1}"#));
    }

    #[tokio::test]
    async fn failures_should_normalize_to_network_error() {
        let transport = MockTransport::new();
        transport.on(Method::Post, "/order/cart/remove", MockReply::fail());
        transport.on(Method::Post, "/order/cart/clear", MockReply::status(500, "{}"));
        transport.on(Method::Post, "/order/cart/update", MockReply::html("<html>"));
        let service = service(&transport);

        for action in [CartAction::Remove, CartAction::Clear, CartAction::Update] {
            let snapshot = service
                .cart_mutation(action, &CartRequest::default(), "")
                .await;
            assert!(!snapshot.success);
            assert_eq!(snapshot.message.as_deref(), Some(NETWORK_ERROR_MESSAGE));
        }
    }

    #[tokio::test]
    async fn availability_should_encode_value_and_default_to_taken() {
        let transport = MockTransport::new();
        transport.on(
            Method::Get,
            "/auth/check-email",
            MockReply::json(json!({"available": true})),
        );
        transport.on(Method::Get, "/auth/check-username", MockReply::json(json!({})));
        let service = service(&transport);

        assert!(service
            .check_availability(AvailabilityKind::Email, "a+b@shop.test")
            .await
            .unwrap());
        assert!(!service
            .check_availability(AvailabilityKind::Username, "alice")
            .await
            .unwrap());

        let sent = &transport.requests_to("/auth/check-email")[0];
        assert_eq!(sent.url.query(), Some("email=a%2Bb%40shop.test"));
    }

    #[tokio::test]
    async fn availability_transport_errors_should_propagate() {
        let transport = MockTransport::new();
        transport.on(Method::Get, "/auth/check-username", MockReply::fail());
        assert!(service(&transport)
            .check_availability(AvailabilityKind::Username, "bob")
            .await
            .is_err());
    }
}
