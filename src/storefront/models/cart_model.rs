//! Cart model
//!
//! The client never owns cart contents. These types only carry what the server
//! reports after each request and what the badge/totals should show.

use serde::{Deserialize, Serialize};

/// Message used when a cart request never produced a usable response
pub const NETWORK_ERROR_MESSAGE: &str = "network error";

/// Server reply to any cart endpoint, consumed once and discarded
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CartSnapshot {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub cart_count: Option<i64>,
    #[serde(default)]
    pub total: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
}

impl CartSnapshot {
    /// Synthetic failure standing in for transport errors
    pub fn network_error() -> Self {
        Self {
            success: false,
            message: Some(NETWORK_ERROR_MESSAGE.to_string()),
            ..Self::default()
        }
    }

    /// Count to show; a missing count is treated as an empty cart
    pub fn count_or_zero(&self) -> i64 {
        self.cart_count.unwrap_or(0)
    }

    /// Server message, or `fallback` when it sent none
    pub fn message_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.message
            .as_deref()
            .filter(|m| !m.is_empty())
            .unwrap_or(fallback)
    }
}

/// Cart mutations exposed by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartAction {
    Add,
    Remove,
    Update,
    Clear,
}

impl CartAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartAction::Add => "add",
            CartAction::Remove => "remove",
            CartAction::Update => "update",
            CartAction::Clear => "clear",
        }
    }

    /// Endpoint path for this action
    pub fn path(&self) -> String {
        format!("/order/cart/{}", self.as_str())
    }
}

/// JSON body of a cart mutation
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CartRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
}

/// Visibility and text of the cart badge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeState {
    pub count: i64,
    pub visible: bool,
}

impl BadgeState {
    pub fn from_count(count: i64) -> Self {
        Self {
            count,
            visible: count > 0,
        }
    }
}

/// View-state of everything CartSync renders
#[derive(Debug, Clone, PartialEq)]
pub struct CartView {
    /// `None` until the first successful response
    pub badge: Option<BadgeState>,
    pub total: Option<f64>,
    pub currency_symbol: String,
}

impl CartView {
    pub fn new(currency_symbol: &str) -> Self {
        Self {
            badge: None,
            total: None,
            currency_symbol: currency_symbol.to_string(),
        }
    }

    pub fn set_count(&mut self, count: i64) {
        self.badge = Some(BadgeState::from_count(count));
    }

    /// Record a total, ignoring responses that carry none
    pub fn set_total(&mut self, total: Option<f64>) {
        if let Some(total) = total.filter(|t| t.is_finite()) {
            self.total = Some(total);
        }
    }

    pub fn total_text(&self) -> Option<String> {
        self.total
            .map(|total| format!("{}{:.2}", self.currency_symbol, total))
    }
}

/// Price with two decimals and comma-grouped thousands, e.g. `¥1,234.50`
pub fn format_price(currency_symbol: &str, amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}{currency_symbol}{grouped}.{fraction}")
}
