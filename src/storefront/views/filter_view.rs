//! Product filter chrome: loading indicator and mobile sidebar

use super::HIDDEN_CLASS;
use crate::storefront::dom::Document;

pub const LOADING_SELECTOR: &str = ".loading-indicator";
pub const SIDEBAR_SELECTOR: &str = ".filter-sidebar";
pub const OVERLAY_SELECTOR: &str = ".filter-overlay";
pub const ACTIVE_CLASS: &str = "active";

const SCROLL_LOCK_PROPERTY: &str = "overflow";
const SCROLL_LOCK_VALUE: &str = "hidden";

pub fn render_loading(document: &mut Document, loading: bool) {
    if let Some(indicator) = document.query_selector(LOADING_SELECTOR) {
        document.set_class(indicator, HIDDEN_CLASS, !loading);
    }
}

/// Open or close the sidebar, locking body scroll while it is open
pub fn render_sidebar(document: &mut Document, open: bool) {
    for selector in [SIDEBAR_SELECTOR, OVERLAY_SELECTOR] {
        if let Some(node) = document.query_selector(selector) {
            document.set_class(node, ACTIVE_CLASS, open);
        }
    }
    let body = document.body();
    let current = document.attr(body, "style").unwrap_or_default();
    let value = open.then_some(SCROLL_LOCK_VALUE);
    let style = with_style_property(current, SCROLL_LOCK_PROPERTY, value);
    if style.is_empty() {
        document.remove_attr(body, "style");
    } else {
        document.set_attr(body, "style", &style);
    }
}

/// Inline `style` with `property` set to `value`, or dropped when `None`.
/// Other declarations keep their order.
fn with_style_property(style: &str, property: &str, value: Option<&str>) -> String {
    let mut declarations: Vec<String> = style
        .split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty())
        .filter(|decl| {
            let name = decl.split_once(':').map_or(*decl, |(name, _)| name);
            !name.trim().eq_ignore_ascii_case(property)
        })
        .map(str::to_string)
        .collect();
    if let Some(value) = value {
        declarations.push(format!("{property}: {value}"));
    }
    declarations.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn page() -> Document {
        Document::parse(
            r#"<body><div class="loading-indicator d-none"></div>
               <aside class="filter-sidebar"></aside><div class="filter-overlay"></div></body>"#,
            Url::parse("http://shop.test/product/list").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn loading_indicator_should_follow_state() {
        let mut doc = page();
        let indicator = doc.query_selector(LOADING_SELECTOR).unwrap();

        render_loading(&mut doc, true);
        assert!(!doc.has_class(indicator, HIDDEN_CLASS));
        render_loading(&mut doc, false);
        assert!(doc.has_class(indicator, HIDDEN_CLASS));
    }

    #[test]
    fn sidebar_should_lock_and_unlock_scroll() {
        let mut doc = page();
        render_sidebar(&mut doc, true);

        let body = doc.body();
        let sidebar = doc.query_selector(SIDEBAR_SELECTOR).unwrap();
        let overlay = doc.query_selector(OVERLAY_SELECTOR).unwrap();
        assert!(doc.has_class(sidebar, ACTIVE_CLASS));
        assert!(doc.has_class(overlay, ACTIVE_CLASS));
        assert_eq!(doc.attr(body, "style"), Some("overflow: hidden"));

        render_sidebar(&mut doc, false);
        assert!(!doc.has_class(sidebar, ACTIVE_CLASS));
        assert_eq!(doc.attr(body, "style"), None);
    }

    #[test]
    fn sidebar_should_keep_other_body_styles() {
        let mut doc = page();
        let body = doc.body();
        doc.set_attr(body, "style", "color: red; overflow: auto");

        render_sidebar(&mut doc, true);
        assert_eq!(doc.attr(body, "style"), Some("color: red; overflow: hidden"));

        render_sidebar(&mut doc, false);
        assert_eq!(doc.attr(body, "style"), Some("color: red"));
    }
}
