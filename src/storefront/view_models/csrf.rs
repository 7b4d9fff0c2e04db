//! CSRF token helpers

use crate::storefront::dom::Document;

pub const CSRF_META_SELECTOR: &str = r#"meta[name="csrf-token"]"#;
pub const CSRF_FIELD_NAME: &str = "csrf_token";

/// Token from `<meta name="csrf-token">`, empty when the page has none
pub fn csrf_token(document: &Document) -> String {
    document
        .query_selector(CSRF_META_SELECTOR)
        .and_then(|meta| document.attr(meta, "content"))
        .unwrap_or_default()
        .to_string()
}

/// Give every POST form lacking one a hidden `csrf_token` input.
/// Returns the number of forms changed; does nothing without a token.
pub fn attach_csrf_to_forms(document: &mut Document) -> usize {
    let token = csrf_token(document);
    if token.is_empty() {
        return 0;
    }

    let mut attached = 0;
    for form in document.query_selector_all("form") {
        let is_post = document
            .attr(form, "method")
            .is_some_and(|method| method.eq_ignore_ascii_case("post"));
        if !is_post {
            continue;
        }
        let selector = format!(r#"input[name="{CSRF_FIELD_NAME}"]"#);
        if document.query_selector_in(form, &selector).is_some() {
            continue;
        }
        let input = document.create_element(
            "input",
            &[
                ("type", "hidden"),
                ("name", CSRF_FIELD_NAME),
                ("value", token.as_str()),
            ],
        );
        document.append_child(form, input);
        attached += 1;
    }
    tracing::debug!("csrf token attached to {} form(s)", attached);
    attached
}
