//! Theme attribute on the root element

use crate::storefront::dom::Document;
use crate::storefront::models::Theme;

pub const THEME_ATTR: &str = "data-theme";

pub fn render_theme(document: &mut Document, theme: Theme) {
    if let Some(html) = document.document_element() {
        document.set_attr(html, THEME_ATTR, theme.as_str());
    }
}

/// Theme currently written on the page, if any
pub fn current_theme(document: &Document) -> Option<Theme> {
    let html = document.document_element()?;
    document.attr(html, THEME_ATTR)?.parse().ok()
}
