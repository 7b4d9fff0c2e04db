//! # Product Filter
//!
//! Search, price/tag filters, sorting and pagination on the product list page.
//! Every control rewrites the query string of the page URL, then the list and
//! its pagination are reloaded from the server as an HTML partial.
//!
//! Loads are ticketed: a response that arrives after a newer load was issued
//! is dropped, so the list always reflects the most recent URL.

use super::cart_sync::CartSync;
use crate::config::StorefrontConfig;
use crate::storefront::dom::{self, Document, NodeId, SharedDocument};
use crate::storefront::events::{publish, ModelEvent, SharedEventBus};
use crate::storefront::models::filter_model::{
    page_from_href, DEFAULT_SORT, PARAM_MAX_PRICE, PARAM_MIN_PRICE, PARAM_PAGE, PARAM_QUERY,
    PARAM_SORT,
};
use crate::storefront::models::FilterState;
use crate::storefront::services::HttpService;
use crate::storefront::timing::Debouncer;
use crate::storefront::views::filter_view;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use url::Url;

pub const SEARCH_INPUT_SELECTOR: &str = ".product-search-input";
pub const SEARCH_BUTTON_SELECTOR: &str = ".product-search-btn";
pub const PRICE_INPUT_SELECTOR: &str = ".price-range-input";
pub const TAG_CHECKBOX_SELECTOR: &str = ".tag-checkbox";
pub const SORT_SELECT_SELECTOR: &str = ".sort-select";
pub const RESET_BUTTON_SELECTOR: &str = ".reset-filters-btn";
pub const PRODUCT_LIST_SELECTOR: &str = ".product-list-container";
pub const PAGINATION_SELECTOR: &str = ".pagination-container";
pub const PAGINATION_LINK_SELECTOR: &str = ".pagination a";
pub const FILTER_TOGGLE_SELECTOR: &str = ".filter-toggle";
pub const FILTER_CLOSE_SELECTOR: &str = ".filter-close";

const MIN_PRICE_ID: &str = "min_price";
const MAX_PRICE_ID: &str = "max_price";

pub struct ProductFilter {
    document: SharedDocument,
    http: HttpService,
    bus: SharedEventBus,
    cart: Arc<CartSync>,
    search: Debouncer<()>,
    latest_ticket: AtomicU64,
    /// Pagination link → page number it points at
    pagination: Mutex<HashMap<NodeId, String>>,
}

impl ProductFilter {
    pub fn new(
        document: SharedDocument,
        http: HttpService,
        bus: SharedEventBus,
        cart: Arc<CartSync>,
        config: &StorefrontConfig,
    ) -> Arc<Self> {
        let filter = Arc::new_cyclic(|this: &Weak<Self>| {
            let this = this.clone();
            let search = Debouncer::new(config.search_debounce, move |()| {
                let this = this.clone();
                async move {
                    if let Some(filter) = this.upgrade() {
                        filter.perform_search().await;
                    }
                }
            });
            Self {
                document,
                http,
                bus,
                cart,
                search,
                latest_ticket: AtomicU64::new(0),
                pagination: Mutex::new(HashMap::new()),
            }
        });
        filter.bind_pagination();
        filter
    }

    /// Query-string state of the current page URL
    pub fn state(&self) -> FilterState {
        FilterState::new(dom::lock(&self.document).location().clone())
    }

    /// Ticket of the most recently issued load
    pub fn latest_ticket(&self) -> u64 {
        self.latest_ticket.load(Ordering::SeqCst)
    }

    pub fn is_search_pending(&self) -> bool {
        self.search.is_pending()
    }

    fn push(&self, state: FilterState) {
        let url = state.into_url();
        dom::lock(&self.document).push_state(url.clone());
        publish(
            &self.bus,
            ModelEvent::FilterChanged {
                url: url.to_string(),
            },
        );
    }

    /// Set `q` from the search box (blank removes it) and reload
    pub async fn perform_search(&self) {
        let query = {
            let doc = dom::lock(&self.document);
            let Some(input) = doc.query_selector(SEARCH_INPUT_SELECTOR) else {
                return;
            };
            doc.value(input).trim().to_string()
        };
        let mut state = self.state();
        state.set(PARAM_QUERY, &query);
        self.push(state);
        self.load_products().await;
    }

    /// Rebuild price and tag parameters from the controls, back to page 1, and reload
    pub async fn apply_filters(&self) {
        let mut state = self.state();
        {
            let doc = dom::lock(&self.document);
            let price = |id: &str| {
                doc.get_element_by_id(id)
                    .map(|input| doc.value(input))
                    .unwrap_or_default()
            };
            state.set(PARAM_MIN_PRICE, &price(MIN_PRICE_ID));
            state.set(PARAM_MAX_PRICE, &price(MAX_PRICE_ID));

            let tags: Vec<String> = doc
                .query_selector_all(TAG_CHECKBOX_SELECTOR)
                .into_iter()
                .filter(|checkbox| doc.checked(*checkbox))
                .map(|checkbox| doc.value(checkbox))
                .collect();
            state.set_tags(&tags);
        }
        state.set_page("1");
        self.push(state);
        self.load_products().await;
    }

    /// Set `sort` from the sort control, back to page 1, and reload
    pub async fn apply_sort(&self) {
        let sort = {
            let doc = dom::lock(&self.document);
            let Some(select) = doc.query_selector(SORT_SELECT_SELECTOR) else {
                return;
            };
            doc.value(select)
        };
        let mut state = self.state();
        state.set(PARAM_SORT, &sort);
        state.set_page("1");
        self.push(state);
        self.load_products().await;
    }

    /// Clear every control, drop every parameter but `page`, and reload
    pub async fn reset_filters(&self) {
        {
            let mut doc = dom::lock(&self.document);
            for input in doc.query_selector_all(PRICE_INPUT_SELECTOR) {
                doc.set_value(input, "");
            }
            for checkbox in doc.query_selector_all(TAG_CHECKBOX_SELECTOR) {
                doc.set_checked(checkbox, false);
            }
            if let Some(search) = doc.query_selector(SEARCH_INPUT_SELECTOR) {
                doc.set_value(search, "");
            }
            if let Some(sort) = doc.query_selector(SORT_SELECT_SELECTOR) {
                doc.set_value(sort, DEFAULT_SORT);
            }
        }
        self.search.cancel();

        let mut state = self.state();
        state.retain_only(&[PARAM_PAGE]);
        self.push(state);
        self.load_products().await;
    }

    /// Jump to `page` and reload
    pub async fn go_to_page(&self, page: &str) {
        let mut state = self.state();
        state.set_page(page);
        self.navigate(state).await;
    }

    /// Move to a prepared filter state and reload; returns whether the response was applied
    pub async fn navigate(&self, state: FilterState) -> bool {
        self.push(state);
        self.load_products().await
    }

    /// Fetch the current URL as a partial and splice the product list and
    /// pagination from it. Returns whether the response was applied.
    pub async fn load_products(&self) -> bool {
        let ticket = self.latest_ticket.fetch_add(1, Ordering::SeqCst) + 1;
        let url = {
            let mut doc = dom::lock(&self.document);
            filter_view::render_loading(&mut doc, true);
            doc.location().clone()
        };
        tracing::debug!("loading products #{} from {}", ticket, url);

        let result = self.http.get_partial(&url).await;

        let latest = self.latest_ticket();
        if ticket != latest {
            tracing::debug!("dropping stale product response #{} (latest #{})", ticket, latest);
            publish(&self.bus, ModelEvent::StaleProductsDiscarded { ticket, latest });
            return false;
        }

        let outcome = result.and_then(|html| Document::parse(&html, url.clone()));
        match outcome {
            Ok(response) => {
                let (list_replaced, pagination_replaced) = {
                    let mut doc = dom::lock(&self.document);
                    let list = splice(&mut doc, &response, PRODUCT_LIST_SELECTOR);
                    let pagination = splice(&mut doc, &response, PAGINATION_SELECTOR);
                    filter_view::render_loading(&mut doc, false);
                    (list, pagination)
                };
                if list_replaced {
                    self.cart.bind_add_to_cart_buttons();
                }
                if pagination_replaced {
                    self.bind_pagination();
                }
                publish(
                    &self.bus,
                    ModelEvent::ProductsLoaded {
                        url: url.to_string(),
                    },
                );
                true
            }
            Err(e) => {
                tracing::error!("loading products from {} failed: {:#}", url, e);
                filter_view::render_loading(&mut dom::lock(&self.document), false);
                publish(
                    &self.bus,
                    ModelEvent::ProductsLoadFailed {
                        url: url.to_string(),
                        message: format!("{e:#}"),
                    },
                );
                false
            }
        }
    }

    /// Map every pagination link to the page in its href; returns how many were bound
    pub fn bind_pagination(&self) -> usize {
        let links: HashMap<NodeId, String> = {
            let doc = dom::lock(&self.document);
            let base = doc.location().clone();
            doc.query_selector_all(PAGINATION_LINK_SELECTOR)
                .into_iter()
                .filter_map(|link| {
                    let href = doc.attr(link, "href")?;
                    page_from_href(&base, href).map(|page| (link, page))
                })
                .collect()
        };
        let count = links.len();
        if let Ok(mut pagination) = self.pagination.lock() {
            *pagination = links;
        }
        count
    }

    fn page_link_for(&self, node: NodeId) -> Option<String> {
        let ancestors = dom::lock(&self.document).ancestors_inclusive(node);
        let pagination = self.pagination.lock().ok()?;
        ancestors
            .into_iter()
            .find_map(|candidate| pagination.get(&candidate).cloned())
    }

    pub fn open_sidebar(&self) {
        filter_view::render_sidebar(&mut dom::lock(&self.document), true);
    }

    pub fn close_sidebar(&self) {
        filter_view::render_sidebar(&mut dom::lock(&self.document), false);
    }

    fn closest_control(&self, node: NodeId, selectors: &[&'static str]) -> Option<&'static str> {
        let doc = dom::lock(&self.document);
        selectors
            .iter()
            .copied()
            .find(|selector| doc.closest(node, selector).is_some())
    }

    /// Handle a click; returns whether a filter control took it
    pub async fn handle_click(&self, node: NodeId) -> bool {
        if let Some(page) = self.page_link_for(node) {
            self.go_to_page(&page).await;
            return true;
        }
        let control = self.closest_control(
            node,
            &[
                SEARCH_BUTTON_SELECTOR,
                RESET_BUTTON_SELECTOR,
                FILTER_TOGGLE_SELECTOR,
                FILTER_CLOSE_SELECTOR,
                filter_view::OVERLAY_SELECTOR,
            ],
        );
        match control {
            Some(SEARCH_BUTTON_SELECTOR) => self.perform_search().await,
            Some(RESET_BUTTON_SELECTOR) => self.reset_filters().await,
            Some(FILTER_TOGGLE_SELECTOR) => self.open_sidebar(),
            Some(_) => self.close_sidebar(),
            None => return false,
        }
        true
    }

    /// Handle an input event; search-box edits reload after the debounce
    pub fn handle_input(&self, node: NodeId) -> bool {
        if !dom::lock(&self.document).matches(node, SEARCH_INPUT_SELECTOR) {
            return false;
        }
        self.search.call(());
        true
    }

    /// Handle a change event on price inputs, tag checkboxes or the sort control
    pub async fn handle_change(&self, node: NodeId) -> bool {
        let (filters, sort) = {
            let doc = dom::lock(&self.document);
            (
                doc.matches(node, PRICE_INPUT_SELECTOR) || doc.matches(node, TAG_CHECKBOX_SELECTOR),
                doc.matches(node, SORT_SELECT_SELECTOR),
            )
        };
        if filters {
            self.apply_filters().await;
        } else if sort {
            self.apply_sort().await;
        } else {
            return false;
        }
        true
    }
}

/// Replace the inner markup of `selector` in `doc` with that of the same
/// element in `response`; false when either side lacks it
fn splice(doc: &mut Document, response: &Document, selector: &str) -> bool {
    let (Some(target), Some(source)) = (
        doc.query_selector(selector),
        response.query_selector(selector),
    ) else {
        return false;
    };
    match doc.set_inner_html(target, &response.inner_html(source)) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!("cannot splice {}: {:#}", selector, e);
            false
        }
    }
}

/// Resolve the product list URL of a storefront
pub fn product_list_url(config: &StorefrontConfig, query: &[(&str, &str)]) -> anyhow::Result<Url> {
    let mut url = config.url_for("/product/list")?;
    if !query.is_empty() {
        url.query_pairs_mut().extend_pairs(query);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storefront::events::{subscribe, SimpleEventBus};
    use crate::storefront::io::{Method, MockReply, MockTransport};
    use crate::storefront::services::http::AJAX_HEADER;
    use crate::storefront::views::HIDDEN_CLASS;
    use std::time::Duration;

    const PAGE: &str = r##"<html><body>
        <input class="product-search-input" value="">
        <button class="product-search-btn">Search</button>
        <input id="min_price" class="price-range-input" type="number">
        <input id="max_price" class="price-range-input" type="number">
        <input class="tag-checkbox" type="checkbox" value="sale">
        <input class="tag-checkbox" type="checkbox" value="new">
        <select class="sort-select">
          <option value="default">Default</option>
          <option value="price_asc">Price</option>
        </select>
        <a href="#" class="reset-filters-btn">Reset</a>
        <button class="filter-toggle">Filters</button>
        <aside class="filter-sidebar"><button class="filter-close">x</button></aside>
        <div class="filter-overlay"></div>
        <div class="loading-indicator d-none"></div>
        <div class="product-list-container"><p>old</p></div>
        <div class="pagination-container">
          <ul class="pagination"><li><a href="/product/list?page=2"><span id="page-two">2</span></a></li></ul>
        </div>
        </body></html>"##;

    fn response(label: &str, next_page: u32) -> String {
        format!(
            r#"<html><body>
            <div class="product-list-container">
              <div class="card"><h5>{label}</h5>
              <button class="add-to-cart-btn" data-product-id="9">Add</button></div>
            </div>
            <div class="pagination-container">
              <ul class="pagination"><li><a id="next" href="/product/list?page={next_page}">Next</a></li></ul>
            </div></body></html>"#
        )
    }

    struct Fixture {
        document: SharedDocument,
        transport: MockTransport,
        cart: Arc<CartSync>,
        filter: Arc<ProductFilter>,
        events: Arc<Mutex<Vec<ModelEvent>>>,
    }

    fn fixture(url: &str) -> Fixture {
        let document = Arc::new(Mutex::new(
            Document::parse(PAGE, Url::parse(url).unwrap()).unwrap(),
        ));
        let transport = MockTransport::new();
        let base = Url::parse("http://shop.test/").unwrap();
        let http = HttpService::new(Arc::new(transport.clone()), base.clone());
        let bus = SimpleEventBus::shared();
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        subscribe(
            &bus,
            Box::new(move |event: &ModelEvent| sink.lock().unwrap().push(event.clone())),
        );
        let config = StorefrontConfig::new(base);
        let cart = Arc::new(CartSync::new(document.clone(), http.clone(), bus.clone(), &config));
        let filter = ProductFilter::new(document.clone(), http, bus, cart.clone(), &config);
        Fixture {
            document,
            transport,
            cart,
            filter,
            events,
        }
    }

    fn node(f: &Fixture, selector: &str) -> NodeId {
        f.document.lock().unwrap().query_selector(selector).unwrap()
    }

    fn location(f: &Fixture) -> String {
        f.document.lock().unwrap().location().to_string()
    }

    fn list_text(f: &Fixture) -> String {
        let doc = f.document.lock().unwrap();
        let list = doc.query_selector(PRODUCT_LIST_SELECTOR).unwrap();
        doc.text_content(list).trim().to_string()
    }

    #[tokio::test]
    async fn search_should_set_query_and_splice_results() {
        let f = fixture("http://shop.test/product/list?page=2");
        f.transport
            .on(Method::Get, "/product/list", MockReply::html(&response("Shoes", 3)));
        let input = node(&f, SEARCH_INPUT_SELECTOR);
        f.document.lock().unwrap().set_value(input, "  shoe ");

        f.filter.perform_search().await;

        assert_eq!(location(&f), "http://shop.test/product/list?page=2&q=shoe");
        assert!(list_text(&f).contains("Shoes"));
        let sent = f.transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].header(AJAX_HEADER), Some("XMLHttpRequest"));
        assert_eq!(sent[0].url.query(), Some("page=2&q=shoe"));

        let button = node(&f, ".add-to-cart-btn");
        assert!(f.cart.binding_for(button).is_some());
        assert_eq!(f.document.lock().unwrap().history().len(), 2);
    }

    #[tokio::test]
    async fn apply_filters_should_rebuild_price_and_tags() {
        let f = fixture("http://shop.test/product/list?page=4&tags=old");
        f.transport
            .on(Method::Get, "/product/list", MockReply::html(&response("Sale", 2)));
        {
            let mut doc = f.document.lock().unwrap();
            let min = doc.get_element_by_id("min_price").unwrap();
            doc.set_value(min, "10");
            let tags = doc.query_selector_all(TAG_CHECKBOX_SELECTOR);
            doc.set_checked(tags[0], true);
            doc.set_checked(tags[1], true);
        }

        f.filter.apply_filters().await;

        let state = f.filter.state();
        assert_eq!(state.get(PARAM_MIN_PRICE).as_deref(), Some("10"));
        assert!(!state.has(PARAM_MAX_PRICE));
        assert_eq!(state.tags(), vec!["sale", "new"]);
        assert_eq!(state.page(), 1);
        assert_eq!(f.document.lock().unwrap().history().len(), 2);
    }

    #[tokio::test]
    async fn single_tag_with_empty_prices_should_drop_price_keys() {
        let f = fixture("http://shop.test/product/list?min_price=5&max_price=50");
        {
            let mut doc = f.document.lock().unwrap();
            let tags = doc.query_selector_all(TAG_CHECKBOX_SELECTOR);
            doc.set_checked(tags[0], true);
        }

        f.filter.apply_filters().await;

        assert_eq!(
            location(&f),
            "http://shop.test/product/list?tags=sale&page=1"
        );
        let state = f.filter.state();
        assert!(!state.has(PARAM_MIN_PRICE));
        assert!(!state.has(PARAM_MAX_PRICE));
    }

    #[tokio::test]
    async fn reset_should_reduce_query_to_page() {
        let f = fixture("http://shop.test/product/list?q=shoe&page=3&tags=sale");

        f.filter.reset_filters().await;

        assert_eq!(location(&f), "http://shop.test/product/list?page=3");
        assert_eq!(
            f.transport.requests()[0].url.query(),
            Some("page=3")
        );
    }

    #[tokio::test]
    async fn unchecking_every_tag_should_remove_the_key() {
        let f = fixture("http://shop.test/product/list?tags=sale");
        f.filter.apply_filters().await;
        assert!(!f.filter.state().has("tags"));
    }

    #[tokio::test]
    async fn sort_change_should_reset_page() {
        let f = fixture("http://shop.test/product/list?page=5");
        let select = node(&f, SORT_SELECT_SELECTOR);
        f.document.lock().unwrap().set_value(select, "price_asc");

        assert!(f.filter.handle_change(select).await);
        assert_eq!(
            location(&f),
            "http://shop.test/product/list?page=1&sort=price_asc"
        );
    }

    #[tokio::test]
    async fn reset_should_clear_controls_and_keep_only_page() {
        let f = fixture("http://shop.test/product/list?q=shoe&page=3&min_price=5&sort=price_asc");
        {
            let mut doc = f.document.lock().unwrap();
            let search = doc.query_selector(SEARCH_INPUT_SELECTOR).unwrap();
            doc.set_value(search, "shoe");
            let tag = doc.query_selector(TAG_CHECKBOX_SELECTOR).unwrap();
            doc.set_checked(tag, true);
        }
        let reset = node(&f, RESET_BUTTON_SELECTOR);

        assert!(f.filter.handle_click(reset).await);

        assert_eq!(location(&f), "http://shop.test/product/list?page=3");
        let doc = f.document.lock().unwrap();
        let search = doc.query_selector(SEARCH_INPUT_SELECTOR).unwrap();
        let sort = doc.query_selector(SORT_SELECT_SELECTOR).unwrap();
        assert_eq!(doc.value(search), "");
        assert_eq!(doc.value(sort), "default");
        assert!(doc.query_selector(".tag-checkbox:checked").is_none());
    }

    #[tokio::test]
    async fn failed_load_should_keep_list_and_hide_indicator() {
        let f = fixture("http://shop.test/product/list");
        f.transport
            .on(Method::Get, "/product/list", MockReply::status(500, "boom"));

        assert!(!f.filter.load_products().await);

        assert_eq!(list_text(&f), "old");
        let indicator = node(&f, ".loading-indicator");
        assert!(f.document.lock().unwrap().has_class(indicator, HIDDEN_CLASS));
        assert!(f
            .events
            .lock()
            .unwrap()
            .iter()
            .any(|e| matches!(e, ModelEvent::ProductsLoadFailed { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn stale_response_should_never_overwrite_newer_one() {
        let f = fixture("http://shop.test/product/list");
        f.transport.once(
            Method::Get,
            "/product/list",
            MockReply::html(&response("Slow", 2)).delayed(Duration::from_millis(300)),
        );
        f.transport.once(
            Method::Get,
            "/product/list",
            MockReply::html(&response("Fast", 2)).delayed(Duration::from_millis(50)),
        );

        let (slow, fast) = tokio::join!(f.filter.load_products(), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            f.filter.load_products().await
        });

        assert!(!slow);
        assert!(fast);
        assert!(list_text(&f).contains("Fast"));
        assert!(f.events.lock().unwrap().iter().any(|e| matches!(
            e,
            ModelEvent::StaleProductsDiscarded { ticket: 1, latest: 2 }
        )));
    }

    #[tokio::test]
    async fn pagination_links_should_work_before_and_after_reload() {
        let f = fixture("http://shop.test/product/list?q=shoe");
        f.transport
            .on(Method::Get, "/product/list", MockReply::html(&response("Page", 3)));

        let label = node(&f, "#page-two");
        assert!(f.filter.handle_click(label).await);
        assert_eq!(f.filter.state().page(), 2);

        let next = node(&f, "#next");
        assert!(f.filter.handle_click(next).await);
        assert_eq!(f.filter.state().page(), 3);
        assert_eq!(f.filter.state().get(PARAM_QUERY).as_deref(), Some("shoe"));
    }

    #[tokio::test(start_paused = true)]
    async fn search_typing_should_reload_once_after_debounce() {
        let f = fixture("http://shop.test/product/list");
        let input = node(&f, SEARCH_INPUT_SELECTOR);
        for text in ["s", "sh", "shoe"] {
            f.document.lock().unwrap().set_value(input, text);
            assert!(f.filter.handle_input(input));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        assert!(f.transport.requests().is_empty());

        tokio::time::sleep(Duration::from_millis(400)).await;
        let sent = f.transport.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url.query(), Some("q=shoe"));
    }

    #[tokio::test]
    async fn sidebar_controls_should_toggle_scroll_lock() {
        let f = fixture("http://shop.test/product/list");
        let toggle = node(&f, FILTER_TOGGLE_SELECTOR);
        let overlay = node(&f, filter_view::OVERLAY_SELECTOR);
        let body = f.document.lock().unwrap().body();

        assert!(f.filter.handle_click(toggle).await);
        assert_eq!(
            f.document.lock().unwrap().attr(body, "style"),
            Some("overflow: hidden")
        );

        assert!(f.filter.handle_click(overlay).await);
        assert_eq!(f.document.lock().unwrap().attr(body, "style"), None);
        assert!(f.transport.requests().is_empty());
    }

    #[test]
    fn product_list_url_should_carry_query() {
        let config = StorefrontConfig::new(Url::parse("http://shop.test/").unwrap());
        let url = product_list_url(&config, &[("q", "shoe"), ("sort", "price_asc")]).unwrap();
        assert_eq!(url.as_str(), "http://shop.test/product/list?q=shoe&sort=price_asc");
    }
}
