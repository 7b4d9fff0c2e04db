//! Notice stack markup

use crate::storefront::dom::{Document, NodeId};
use crate::storefront::models::Notice;

pub const CONTAINER_ID: &str = "notice-container";
pub const ITEM_CLASS: &str = "notice-item";

/// The notice container, created at the end of the body on first use
pub fn ensure_container(document: &mut Document) -> NodeId {
    if let Some(container) = document.get_element_by_id(CONTAINER_ID) {
        return container;
    }
    let container = document.create_element("div", &[("id", CONTAINER_ID)]);
    let body = document.body();
    document.append_child(body, container);
    container
}

/// Append a notice item and return its node
pub fn render_notice(document: &mut Document, container: NodeId, notice: &Notice) -> NodeId {
    let class = format!("{} {}", ITEM_CLASS, notice.kind.css_class());
    let item = document.create_element("div", &[("class", class.as_str())]);
    document.set_text_content(item, &notice.message);
    document.append_child(container, item);
    item
}

pub fn remove_notice(document: &mut Document, item: NodeId) {
    document.release(item);
}
