//! Integration tests driving page controllers over real HTTP
//!
//! A wiremock server plays the storefront; the production reqwest transport
//! talks to it, so headers, JSON bodies and charsets are exercised end to end.

use serde_json::json;
use shopline::app::{App, CART_PAGE_PATH, PRODUCT_LIST_PATH};
use shopline::cmd_args::{CartCommand, Command};
use shopline::config::StorefrontConfig;
use shopline::storefront::dom;
use shopline::storefront::io::{MemoryPreferenceStore, MockClipboard, ReqwestTransport};
use shopline::storefront::models::filter_model::PARAM_QUERY;
use shopline::{PageController, PageServices};
use std::sync::Arc;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CART_PAGE: &str = r#"<html>
<head><meta name="csrf-token" content="tok-123"></head>
<body>
  <span class="cart-badge">0</span>
  <button class="add-to-cart-btn" data-product-id="5">Add</button>
</body>
</html>"#;

const LIST_PAGE: &str = r#"<html><body>
  <input class="product-search-input" value="">
  <div class="product-list-container"><div class="card">All products</div></div>
  <div class="pagination-container"></div>
</body></html>"#;

const FILTERED_PAGE: &str = r#"<html><body>
  <div class="product-list-container"><div class="card">Blue Shoe</div></div>
  <div class="pagination-container"><ul class="pagination"><li><a href="/product/list?q=shoe&page=2">2</a></li></ul></div>
</body></html>"#;

fn services(server: &MockServer) -> PageServices {
    PageServices::new(
        Arc::new(ReqwestTransport::new().unwrap()),
        Arc::new(MemoryPreferenceStore::new()),
        Arc::new(MockClipboard::insecure()),
        StorefrontConfig::new(Url::parse(&server.uri()).unwrap()),
    )
}

fn page_url(server: &MockServer, page: &str) -> Url {
    Url::parse(&server.uri()).unwrap().join(page).unwrap()
}

async fn mount_cart_page(server: &MockServer, count: i64) {
    Mock::given(method("GET"))
        .and(path(CART_PAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_raw(CART_PAGE, "text/html"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/order/cart/count"))
        .and(header("X-Requested-With", "XMLHttpRequest"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "cart_count": count})),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn boot_should_refresh_badge_from_count_endpoint() {
    let server = MockServer::start().await;
    mount_cart_page(&server, 3).await;

    let page = PageController::load(page_url(&server, CART_PAGE_PATH), services(&server))
        .await
        .unwrap();

    let badge = page.cart().view().badge.unwrap();
    assert_eq!(badge.count, 3);
    assert!(badge.visible);
    let doc = dom::lock(page.document());
    let node = doc.query_selector(".cart-badge").unwrap();
    assert_eq!(doc.text_content(node), "3");
}

#[tokio::test]
async fn add_to_cart_click_should_post_json_with_csrf_header() {
    let server = MockServer::start().await;
    mount_cart_page(&server, 0).await;
    Mock::given(method("POST"))
        .and(path("/order/cart/add"))
        .and(header("X-CSRFToken", "tok-123"))
        .and(body_json(json!({"product_id": 5, "quantity": 1})))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            json!({"success": true, "cart_count": 1, "message": "Added"}),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let page = PageController::load(page_url(&server, CART_PAGE_PATH), services(&server))
        .await
        .unwrap();
    let button = page.find(".add-to-cart-btn").unwrap();

    assert!(page.click(button).await);
    assert_eq!(page.cart().view().badge.unwrap().count, 1);
}

#[tokio::test]
async fn server_error_should_leave_badge_untouched() {
    let server = MockServer::start().await;
    mount_cart_page(&server, 2).await;
    Mock::given(method("POST"))
        .and(path("/order/cart/add"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let page = PageController::load(page_url(&server, CART_PAGE_PATH), services(&server))
        .await
        .unwrap();
    let snapshot = page.cart().add(5, 1, false).await;

    assert!(!snapshot.success);
    assert_eq!(page.cart().view().badge.unwrap().count, 2);
}

#[tokio::test]
async fn page_in_gbk_should_be_decoded() {
    let server = MockServer::start().await;
    let (body, _, _) = encoding_rs::GBK.encode("<html><body><h1>购物车</h1></body></html>");
    Mock::given(method("GET"))
        .and(path("/gbk"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(body.into_owned(), "text/html; charset=GBK"),
        )
        .mount(&server)
        .await;

    let page = PageController::load(page_url(&server, "/gbk"), services(&server))
        .await
        .unwrap();

    let doc = dom::lock(page.document());
    let heading = doc.query_selector("h1").unwrap();
    assert_eq!(doc.text_content(heading), "购物车");
}

#[tokio::test]
async fn filter_should_splice_partial_list_and_rebind_pagination() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PRODUCT_LIST_PATH))
        .and(query_param(PARAM_QUERY, "shoe"))
        .and(header("X-Requested-With", "XMLHttpRequest"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(FILTERED_PAGE, "text/html"))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PRODUCT_LIST_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_raw(LIST_PAGE, "text/html"))
        .mount(&server)
        .await;

    let page = PageController::load(page_url(&server, PRODUCT_LIST_PATH), services(&server))
        .await
        .unwrap();
    let filter = page.filter();
    let mut state = filter.state();
    state.set(PARAM_QUERY, "shoe");

    assert!(filter.navigate(state).await);

    let doc = dom::lock(page.document());
    assert_eq!(doc.location().query(), Some("q=shoe"));
    let list = doc.query_selector(".product-list-container").unwrap();
    assert_eq!(doc.text_content(list).trim(), "Blue Shoe");
    assert!(doc.query_selector(".pagination a").is_some());
}

#[tokio::test]
async fn cart_count_command_should_report_server_count() {
    let server = MockServer::start().await;
    mount_cart_page(&server, 4).await;

    let app = App::with_services(services(&server));
    let lines = app
        .execute(&Command::Cart {
            action: CartCommand::Count,
        })
        .await
        .unwrap();

    assert_eq!(lines, vec!["cart: 4 item(s)"]);
}
