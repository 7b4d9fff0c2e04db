//! # I/O Abstraction Layer
//!
//! Trait seams for everything the page controllers need from the outside world,
//! so production code and tests share the same controllers.
//!
//! ## Architecture
//!
//! ```text
//! Production:  HttpService ──▶ ReqwestTransport      ──▶ reqwest::Client
//!              ThemeController ──▶ IniPreferenceStore ──▶ ~/.shopline/preferences
//!
//! Testing:     HttpService ──▶ MockTransport          ──▶ canned routes
//!              ThemeController ──▶ MemoryPreferenceStore
//! ```

use anyhow::Result;
use async_trait::async_trait;
use url::Url;

pub mod clipboard;
pub mod http;
pub mod mock;
pub mod preferences;

pub use clipboard::LocalClipboard;
pub use http::ReqwestTransport;
pub use mock::{MockClipboard, MockReply, MockTransport};
pub use preferences::{IniPreferenceStore, MemoryPreferenceStore};

/// HTTP methods the storefront uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

/// Outgoing request handed to a transport
#[derive(Debug, Clone, PartialEq)]
pub struct TransportRequest {
    pub method: Method,
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl TransportRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: Method::Get,
            url,
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn post(url: Url, body: String) -> Self {
        Self {
            method: Method::Post,
            url,
            headers: Vec::new(),
            body: Some(body),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Response as seen by the controllers: status and decoded body text
#[derive(Debug, Clone, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP transport abstraction
///
/// Implementations only move bytes; they never interpret status codes.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse>;
}

/// Persisted key/value preferences (the browser's local storage)
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// System clipboard abstraction
#[async_trait]
pub trait Clipboard: Send + Sync {
    /// Whether the async clipboard API is usable (secure context)
    fn async_api_available(&self) -> bool;

    /// Async clipboard write
    async fn write_text(&self, text: &str) -> Result<()>;

    /// Legacy copy command over the current selection
    fn exec_copy(&self, text: &str) -> Result<()>;
}
