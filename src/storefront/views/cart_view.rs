//! Cart badge and totals

use super::HIDDEN_CLASS;
use crate::storefront::dom::Document;
use crate::storefront::models::CartView;

pub const BADGE_SELECTOR: &str = ".cart-badge";
pub const TOTAL_IDS: [&str; 2] = ["cart-total", "cart-total-final"];

/// Project the cart view onto the badge and total elements.
///
/// A hidden badge keeps whatever text it showed last.
pub fn render_cart(document: &mut Document, view: &CartView) {
    if let Some(badge_state) = view.badge {
        if let Some(badge) = document.query_selector(BADGE_SELECTOR) {
            if badge_state.visible {
                document.set_text_content(badge, &badge_state.count.to_string());
                document.remove_class(badge, HIDDEN_CLASS);
            } else {
                document.add_class(badge, HIDDEN_CLASS);
            }
        }
    }

    if let Some(text) = view.total_text() {
        for id in TOTAL_IDS {
            if let Some(node) = document.get_element_by_id(id) {
                document.set_text_content(node, &text);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn page() -> Document {
        Document::parse(
            r#"<body><span class="cart-badge d-none">5</span>
               <span id="cart-total"></span><strong id="cart-total-final"></strong></body>"#,
            Url::parse("http://shop.test/order/cart").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn visible_badge_should_show_count() {
        let mut doc = page();
        let mut view = CartView::new("¥");
        view.set_count(3);
        render_cart(&mut doc, &view);

        let badge = doc.query_selector(BADGE_SELECTOR).unwrap();
        assert_eq!(doc.text_content(badge), "3");
        assert!(!doc.has_class(badge, HIDDEN_CLASS));
    }

    #[test]
    fn zero_count_should_hide_badge_and_keep_text() {
        let mut doc = page();
        let mut view = CartView::new("¥");
        view.set_count(2);
        render_cart(&mut doc, &view);
        view.set_count(0);
        render_cart(&mut doc, &view);

        let badge = doc.query_selector(BADGE_SELECTOR).unwrap();
        assert!(doc.has_class(badge, HIDDEN_CLASS));
        assert_eq!(doc.text_content(badge), "2");
    }

    #[test]
    fn totals_should_render_both_targets() {
        let mut doc = page();
        let mut view = CartView::new("¥");
        view.set_total(Some(99.0));
        render_cart(&mut doc, &view);

        for id in TOTAL_IDS {
            let node = doc.get_element_by_id(id).unwrap();
            assert_eq!(doc.text_content(node), "¥99.00");
        }
    }

    #[test]
    fn untouched_view_should_leave_page_alone() {
        let mut doc = page();
        render_cart(&mut doc, &CartView::new("¥"));

        let badge = doc.query_selector(BADGE_SELECTOR).unwrap();
        assert_eq!(doc.text_content(badge), "5");
        assert!(doc.has_class(badge, HIDDEN_CLASS));
    }
}
