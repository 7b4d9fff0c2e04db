//! Native constraint validation for form controls.

use super::{Document, NodeId};
use regex::Regex;

/// Mirror of the browser `ValidityState` flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidityState {
    pub value_missing: bool,
    pub type_mismatch: bool,
    pub pattern_mismatch: bool,
    pub too_long: bool,
    pub too_short: bool,
    pub range_underflow: bool,
    pub range_overflow: bool,
    pub step_mismatch: bool,
    pub custom_error: bool,
}

impl ValidityState {
    pub fn valid(&self) -> bool {
        !(self.value_missing
            || self.type_mismatch
            || self.pattern_mismatch
            || self.too_long
            || self.too_short
            || self.range_underflow
            || self.range_overflow
            || self.step_mismatch
            || self.custom_error)
    }
}

fn participates_in_validation(input_type: &str) -> bool {
    !matches!(input_type, "button" | "submit" | "reset" | "hidden" | "image")
}

fn is_text_like(input_type: &str) -> bool {
    matches!(
        input_type,
        "text" | "search" | "url" | "tel" | "email" | "password"
    )
}

fn is_email_local_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || "!#$%&'*+/=?^_`{|}~.-".contains(ch)
}

pub fn is_simple_email(value: &str) -> bool {
    let Some((local, domain)) = value.trim().split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    if !local.chars().all(is_email_local_char) {
        return false;
    }
    domain.split('.').all(|label| {
        !label.is_empty()
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}

impl Document {
    fn attr_i64(&self, node: NodeId, name: &str) -> Option<i64> {
        self.attr(node, name).and_then(|raw| raw.trim().parse().ok())
    }

    fn attr_f64(&self, node: NodeId, name: &str) -> Option<f64> {
        self.attr(node, name)
            .and_then(|raw| raw.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite())
    }

    fn check_length(&self, node: NodeId, value: &str, validity: &mut ValidityState) {
        let len = value.chars().count() as i64;
        if let Some(min) = self.attr_i64(node, "minlength") {
            if min >= 0 && len < min {
                validity.too_short = true;
            }
        }
        if let Some(max) = self.attr_i64(node, "maxlength") {
            if max >= 0 && len > max {
                validity.too_long = true;
            }
        }
    }

    fn check_number(&self, node: NodeId, number: f64, validity: &mut ValidityState) {
        let min = self.attr_f64(node, "min");
        if let Some(min) = min {
            if number < min {
                validity.range_underflow = true;
            }
        }
        if let Some(max) = self.attr_f64(node, "max") {
            if number > max {
                validity.range_overflow = true;
            }
        }
        let step_attr = self.attr(node, "step").unwrap_or_default();
        if !step_attr.eq_ignore_ascii_case("any") {
            let step = step_attr
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|step| step.is_finite() && *step > 0.0)
                .unwrap_or(1.0);
            let ratio = (number - min.unwrap_or(0.0)) / step;
            if (ratio - ratio.round()).abs() > 1e-7 {
                validity.step_mismatch = true;
            }
        }
    }

    /// Compute the constraint-validation state of a form control
    pub fn validity(&self, node: NodeId) -> ValidityState {
        let mut validity = ValidityState::default();
        let Some(tag) = self.tag_name(node) else {
            return validity;
        };
        if self.attr(node, "disabled").is_some() {
            return validity;
        }

        let value = self.value(node);
        let required = self.attr(node, "required").is_some();
        let readonly = self.attr(node, "readonly").is_some();

        match tag {
            "textarea" => {
                validity.value_missing = required && !readonly && value.is_empty();
                if !value.is_empty() {
                    self.check_length(node, &value, &mut validity);
                }
            }
            "select" => {
                validity.value_missing = required && value.is_empty();
            }
            "input" => {
                let input_type = self
                    .attr(node, "type")
                    .map(str::to_ascii_lowercase)
                    .unwrap_or_else(|| "text".to_string());
                if !participates_in_validation(&input_type) {
                    return validity;
                }

                if required && !readonly {
                    validity.value_missing = match input_type.as_str() {
                        "checkbox" | "radio" => !self.checked(node),
                        _ => value.is_empty(),
                    };
                }

                if !value.is_empty() && !matches!(input_type.as_str(), "checkbox" | "radio") {
                    match input_type.as_str() {
                        "email" => validity.type_mismatch = !is_simple_email(&value),
                        "url" => validity.type_mismatch = url::Url::parse(&value).is_err(),
                        "number" | "range" => match value.trim().parse::<f64>() {
                            Ok(number) if number.is_finite() => {
                                self.check_number(node, number, &mut validity)
                            }
                            _ => validity.type_mismatch = true,
                        },
                        _ => {}
                    }

                    if is_text_like(&input_type) {
                        self.check_length(node, &value, &mut validity);
                        if let Some(pattern) = self.attr(node, "pattern").filter(|p| !p.is_empty())
                        {
                            match Regex::new(&format!("^(?:{pattern})$")) {
                                Ok(regex) => validity.pattern_mismatch = !regex.is_match(&value),
                                Err(e) => tracing::warn!("ignoring invalid pattern '{}': {}", pattern, e),
                            }
                        }
                    }
                }
            }
            _ => {}
        }

        validity.custom_error = !self.custom_validity(node).is_empty();
        validity
    }
}
