//! # Reqwest Transport
//!
//! Production transport. Bodies are read as bytes and decoded with the charset
//! announced in `Content-Type`, falling back to UTF-8.

use super::{Method, Transport, TransportRequest, TransportResponse};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;

/// Transport backed by a cookie-keeping reqwest client, so server sessions
/// (and therefore the cart) survive across requests
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("shopline/", env!("CARGO_PKG_VERSION")))
            .cookie_store(true)
            .build()?;
        tracing::debug!("reqwest client created");
        Ok(Self { client })
    }
}

/// Extract the `charset` parameter from a `Content-Type` value
pub fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches('"').to_string())
    })
}

/// Decode a response body with the given charset label
pub fn decode_body(bytes: &[u8], charset: Option<&str>) -> String {
    let encoding = charset
        .and_then(|label| encoding_rs::Encoding::for_label(label.as_bytes()))
        .unwrap_or(encoding_rs::UTF_8);
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::warn!("response body had invalid {} sequences", encoding.name());
    }
    text.into_owned()
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse> {
        let mut builder = match request.method {
            Method::Get => self.client.get(request.url.clone()),
            Method::Post => self.client.post(request.url.clone()),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        tracing::debug!("{} {}", request.method.as_str(), request.url);
        let response = builder
            .send()
            .await
            .map_err(|e| anyhow!("HTTP request failed: {e}"))?;

        let status = response.status().as_u16();
        let charset = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(charset_from_content_type);
        let bytes: Bytes = response.bytes().await?;
        tracing::debug!("{} -> {} ({} bytes)", request.url, status, bytes.len());

        Ok(TransportResponse {
            status,
            body: decode_body(&bytes, charset.as_deref()),
        })
    }
}
