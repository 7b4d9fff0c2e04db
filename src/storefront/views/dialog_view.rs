//! Input dialog markup

use crate::storefront::dom::html::{escape_attr, escape_text};
use crate::storefront::dom::{Document, NodeId};
use anyhow::{anyhow, Result};

pub const CONTAINER_ID: &str = "dialog-container";
pub const DIALOG_CLASS: &str = "input-dialog";

/// What a dialog asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DialogSpec {
    pub title: String,
    pub placeholder: String,
    pub default_value: String,
    pub cancel_label: String,
    pub confirm_label: String,
}

/// Handles to the interactive parts of a rendered dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogNodes {
    pub dialog: NodeId,
    pub textarea: NodeId,
    pub cancel: NodeId,
    pub confirm: NodeId,
}

pub fn ensure_container(document: &mut Document) -> NodeId {
    if let Some(container) = document.get_element_by_id(CONTAINER_ID) {
        return container;
    }
    let container = document.create_element("div", &[("id", CONTAINER_ID)]);
    let body = document.body();
    document.append_child(body, container);
    container
}

/// Render a dialog into `container`. Title, placeholder and default value are
/// escaped, so user text never becomes markup.
pub fn render_dialog(
    document: &mut Document,
    container: NodeId,
    spec: &DialogSpec,
) -> Result<DialogNodes> {
    let dialog = document.create_element("div", &[("class", DIALOG_CLASS)]);
    document.set_inner_html(
        dialog,
        &format!(
            concat!(
                "<h5>{}</h5>",
                "<textarea placeholder=\"{}\">{}</textarea>",
                "<div class=\"dialog-buttons\">",
                "<button class=\"btn btn-outline-secondary dialog-cancel\">{}</button>",
                "<button class=\"btn btn-primary dialog-confirm\">{}</button>",
                "</div>"
            ),
            escape_text(&spec.title),
            escape_attr(&spec.placeholder),
            escape_text(&spec.default_value),
            escape_text(&spec.cancel_label),
            escape_text(&spec.confirm_label),
        ),
    )?;
    document.append_child(container, dialog);

    let find = |selector: &str| {
        document
            .query_selector_in(dialog, selector)
            .ok_or_else(|| anyhow!("dialog markup lost {selector}"))
    };
    Ok(DialogNodes {
        dialog,
        textarea: find("textarea")?,
        cancel: find(".dialog-cancel")?,
        confirm: find(".dialog-confirm")?,
    })
}

/// Remove a dialog, and the container once it holds no dialogs
pub fn teardown(document: &mut Document, container: NodeId, dialog: NodeId) {
    document.release(dialog);
    if document.element_children(container).is_empty() {
        document.release(container);
    }
}
