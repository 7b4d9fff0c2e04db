//! Per-field validation feedback

use super::HIDDEN_CLASS;
use crate::storefront::dom::{Document, NodeId};
use crate::storefront::models::FieldStatus;

pub const VALID_CLASS: &str = "is-valid";
pub const INVALID_CLASS: &str = "is-invalid";
pub const WAS_VALIDATED_CLASS: &str = "was-validated";

/// Id of the element holding a field's error text
pub fn error_node_id(field_id: &str) -> String {
    format!("{field_id}-error")
}

/// Project a field status onto the field and its `#<id>-error` node inside `form`
pub fn render_field(document: &mut Document, form: NodeId, field: NodeId, status: &FieldStatus) {
    if matches!(status, FieldStatus::Pristine) {
        return;
    }
    document.set_class(field, VALID_CLASS, status.is_valid());
    document.set_class(field, INVALID_CLASS, status.is_invalid());

    let Some(field_id) = document.id(field).map(str::to_string) else {
        return;
    };
    if let Some(error) = document.get_element_by_id_in(form, &error_node_id(&field_id)) {
        document.set_text_content(error, status.error_text());
        document.set_class(error, HIDDEN_CLASS, !status.is_invalid());
    }
}

pub fn render_form(document: &mut Document, form: NodeId, was_validated: bool) {
    if was_validated {
        document.add_class(form, WAS_VALIDATED_CLASS);
    }
}
