//! Configuration constants and profile loading for shopline
//!
//! A profile is a section of an INI file. Every key is optional; missing keys
//! fall back to the storefront defaults.
//!
//! ```ini
//! [default]
//! base_url = http://localhost:5000
//! currency_symbol = ¥
//! notice_duration_ms = 3200
//! message.required = 此项为必填项
//! ```

use crate::storefront::models::ValidationMessages;
use anyhow::{anyhow, Context, Result};
use ini::Ini;
use std::time::Duration;
use url::Url;

/// Default profile file path for shopline
pub const DEFAULT_PROFILE_PATH: &str = "~/.shopline/profile";

/// Environment variable name for overriding the profile path
pub const PROFILE_PATH_ENV_VAR: &str = "SHOPLINE_PROFILE_PATH";

/// Default preference file (theme and other persisted UI state)
pub const DEFAULT_PREFERENCES_PATH: &str = "~/.shopline/preferences";

/// Environment variable read by the log filter
pub const LOG_LEVEL_ENV_VAR: &str = "SHOPLINE_LOG_LEVEL";

/// Storefront the CLI talks to when no profile names one
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/";

/// Prefix of profile keys that override validation messages
const MESSAGE_KEY_PREFIX: &str = "message.";

/// Get the profile file path, checking environment variable first, then falling back to default
pub fn get_profile_path() -> String {
    std::env::var_os(PROFILE_PATH_ENV_VAR)
        .and_then(|val| val.into_string().ok())
        .unwrap_or_else(|| DEFAULT_PROFILE_PATH.to_string())
}

/// Settings shared by every page controller
#[derive(Debug, Clone, PartialEq)]
pub struct StorefrontConfig {
    pub base_url: Url,
    pub currency_symbol: String,
    /// How long a notice stays on screen
    pub notice_duration: Duration,
    /// Quiet period before a search-box edit triggers a reload
    pub search_debounce: Duration,
    /// Quiet period before a username/email availability check
    pub availability_debounce: Duration,
    pub checkout_path: String,
    /// Path fragment identifying the cart page
    pub cart_path_marker: String,
    pub preferences_path: String,
    pub messages: ValidationMessages,
}

impl StorefrontConfig {
    /// Defaults for a storefront served at `base_url`
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            currency_symbol: "¥".to_string(),
            notice_duration: Duration::from_millis(3200),
            search_debounce: Duration::from_millis(300),
            availability_debounce: Duration::from_millis(500),
            checkout_path: "/order/checkout".to_string(),
            cart_path_marker: "/cart".to_string(),
            preferences_path: DEFAULT_PREFERENCES_PATH.to_string(),
            messages: ValidationMessages::default(),
        }
    }

    fn with_default_url() -> Result<Self> {
        Ok(Self::new(Url::parse(DEFAULT_BASE_URL)?))
    }

    /// Load `profile` from the INI file at `path`.
    ///
    /// A missing file yields the defaults; a file without the requested section
    /// is an error, since the user asked for a profile that does not exist.
    pub fn load(path: &str, profile: &str) -> Result<Self> {
        let expanded = shellexpand::full(path)
            .with_context(|| format!("cannot expand profile path {path}"))?
            .into_owned();
        if !std::path::Path::new(&expanded).exists() {
            tracing::debug!("profile file {} not found, using defaults", expanded);
            return Self::with_default_url();
        }

        let ini = Ini::load_from_file(&expanded)
            .with_context(|| format!("cannot read profile file {expanded}"))?;
        Self::from_ini(&ini, profile)
    }

    pub fn from_ini(ini: &Ini, profile: &str) -> Result<Self> {
        let section = ini
            .section(Some(profile))
            .ok_or_else(|| anyhow!("profile '{profile}' is not configured"))?;
        let mut config = Self::with_default_url()?;

        if let Some(base_url) = section.get("base_url") {
            config.base_url =
                Url::parse(base_url).with_context(|| format!("invalid base_url '{base_url}'"))?;
        }
        if let Some(symbol) = section.get("currency_symbol") {
            config.currency_symbol = symbol.to_string();
        }
        if let Some(ms) = parse_millis(section.get("notice_duration_ms"))? {
            config.notice_duration = ms;
        }
        if let Some(ms) = parse_millis(section.get("search_debounce_ms"))? {
            config.search_debounce = ms;
        }
        if let Some(ms) = parse_millis(section.get("availability_debounce_ms"))? {
            config.availability_debounce = ms;
        }
        if let Some(path) = section.get("checkout_path") {
            config.checkout_path = path.to_string();
        }
        if let Some(marker) = section.get("cart_path_marker") {
            config.cart_path_marker = marker.to_string();
        }
        if let Some(path) = section.get("preferences_path") {
            config.preferences_path = path.to_string();
        }

        let overrides: serde_json::Map<String, serde_json::Value> = section
            .iter()
            .filter_map(|(key, value)| {
                key.strip_prefix(MESSAGE_KEY_PREFIX)
                    .map(|name| (name.to_string(), serde_json::Value::from(value)))
            })
            .collect();
        if !overrides.is_empty() {
            config.messages = serde_json::from_value(serde_json::Value::Object(overrides))
                .context("invalid message override")?;
        }

        tracing::debug!("loaded profile '{}' ({})", profile, config.base_url);
        Ok(config)
    }

    /// Resolve a site path against the base URL
    pub fn url_for(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("invalid path '{path}'"))
    }
}

fn parse_millis(raw: Option<&str>) -> Result<Option<Duration>> {
    raw.map(|raw| {
        raw.trim()
            .parse::<u64>()
            .map(Duration::from_millis)
            .with_context(|| format!("expected milliseconds, got '{raw}'"))
    })
    .transpose()
}
