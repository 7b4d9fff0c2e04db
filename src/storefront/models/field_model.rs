//! Form field validation model

use serde::Deserialize;
use std::collections::HashMap;

/// Validation outcome of one field.
///
/// A field is `Pristine` until its first validation pass. After that it is either
/// `Valid` or `Invalid` with a non-empty message, never both.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldStatus {
    #[default]
    Pristine,
    Valid,
    Invalid(String),
}

impl FieldStatus {
    pub fn invalid(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.is_empty() {
            FieldStatus::Invalid(ValidationMessages::default().invalid)
        } else {
            FieldStatus::Invalid(message)
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, FieldStatus::Invalid(_))
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, FieldStatus::Valid)
    }

    /// Text for the field's error node; empty unless invalid
    pub fn error_text(&self) -> &str {
        match self {
            FieldStatus::Invalid(message) => message,
            _ => "",
        }
    }
}

/// View-state of one form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormView {
    /// Set after the first submit attempt; makes every field's error visible
    pub was_validated: bool,
    pub fields: HashMap<String, FieldStatus>,
}

impl FormView {
    pub fn status(&self, field_id: &str) -> FieldStatus {
        self.fields.get(field_id).cloned().unwrap_or_default()
    }
}

/// Message catalog for validation failures.
///
/// `{min}` and `{max}` are replaced with the field's configured bounds.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValidationMessages {
    pub required: String,
    pub email: String,
    pub url: String,
    pub number: String,
    pub type_mismatch: String,
    pub pattern: String,
    pub too_short: String,
    pub too_long: String,
    pub range_underflow: String,
    pub range_overflow: String,
    pub step: String,
    pub invalid: String,
}

impl Default for ValidationMessages {
    fn default() -> Self {
        Self {
            required: "This field is required".to_string(),
            email: "Please enter a valid email address".to_string(),
            url: "Please enter a valid URL".to_string(),
            number: "Please enter a valid number".to_string(),
            type_mismatch: "Please enter a valid value".to_string(),
            pattern: "Please match the requested format".to_string(),
            too_short: "Please use at least {min} characters".to_string(),
            too_long: "Please use no more than {max} characters".to_string(),
            range_underflow: "Value must be at least {min}".to_string(),
            range_overflow: "Value must be at most {max}".to_string(),
            step: "Value does not match the allowed step".to_string(),
            invalid: "Invalid value".to_string(),
        }
    }
}

pub fn interpolate(template: &str, key: &str, value: &str) -> String {
    template.replace(&format!("{{{key}}}"), value)
}
