//! # Cart Sync
//!
//! Keeps the cart badge and totals in step with the server-side cart. The
//! client never holds cart contents: every operation is one request, and the
//! badge shows whatever the server answered.

use super::csrf::csrf_token;
use super::notices::{NoopNotifier, Notifier};
use crate::config::StorefrontConfig;
use crate::storefront::dom::{self, NodeId, SharedDocument};
use crate::storefront::events::{publish, ModelEvent, Navigation, SharedEventBus};
use crate::storefront::models::{CartAction, CartRequest, CartSnapshot, CartView, NoticeKind};
use crate::storefront::services::HttpService;
use crate::storefront::views::cart_view;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const ADD_TO_CART_SELECTOR: &str = ".add-to-cart-btn";
pub const UPDATE_QUANTITY_SELECTOR: &str = ".update-quantity-btn";
pub const REMOVE_FROM_CART_SELECTOR: &str = ".remove-from-cart-btn";
pub const CLEAR_CART_SELECTOR: &str = ".clear-cart-btn";

pub const ADDED_MESSAGE: &str = "Added to cart";
pub const ADD_FAILED_MESSAGE: &str = "Failed to add to cart";
pub const REMOVE_FAILED_MESSAGE: &str = "Failed to remove item";
pub const UPDATE_FAILED_MESSAGE: &str = "Failed to update quantity";
pub const CLEAR_FAILED_MESSAGE: &str = "Failed to clear cart";
pub const CLEAR_CART_PROMPT: &str = "Remove every item from your cart?";

/// Attribute marking a button as already bound
const BOUND_ATTR: &str = "data-bound";

/// Yes/no question put to the user before destructive actions
pub trait Confirm: Send + Sync {
    fn confirm(&self, message: &str) -> bool;
}

/// Confirm that always agrees, for non-interactive sessions
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysConfirm;

impl Confirm for AlwaysConfirm {
    fn confirm(&self, _message: &str) -> bool {
        true
    }
}

/// What a bound cart button does when clicked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartBinding {
    AddToCart { product_id: u64, quantity: i64 },
    UpdateQuantity { product_id: u64 },
    Remove { product_id: u64 },
    Clear,
}

pub struct CartSync {
    document: SharedDocument,
    http: HttpService,
    bus: SharedEventBus,
    notifier: Arc<dyn Notifier>,
    confirm: Arc<dyn Confirm>,
    checkout_path: String,
    cart_path_marker: String,
    view: Mutex<CartView>,
    bindings: Mutex<HashMap<NodeId, CartBinding>>,
}

impl CartSync {
    pub fn new(
        document: SharedDocument,
        http: HttpService,
        bus: SharedEventBus,
        config: &StorefrontConfig,
    ) -> Self {
        Self {
            document,
            http,
            bus,
            notifier: Arc::new(NoopNotifier),
            confirm: Arc::new(AlwaysConfirm),
            checkout_path: config.checkout_path.clone(),
            cart_path_marker: config.cart_path_marker.clone(),
            view: Mutex::new(CartView::new(&config.currency_symbol)),
            bindings: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_confirm(mut self, confirm: Arc<dyn Confirm>) -> Self {
        self.confirm = confirm;
        self
    }

    /// Current badge and totals view-state
    pub fn view(&self) -> CartView {
        self.view
            .lock()
            .map(|view| view.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    fn is_cart_page(&self) -> bool {
        dom::lock(&self.document)
            .location()
            .path()
            .contains(&self.cart_path_marker)
    }

    fn apply(&self, count: Option<i64>, total: Option<f64>) {
        let view = {
            let Ok(mut view) = self.view.lock() else {
                return;
            };
            if let Some(count) = count {
                view.set_count(count);
            }
            view.set_total(total);
            view.clone()
        };
        cart_view::render_cart(&mut dom::lock(&self.document), &view);

        if let Some(count) = count {
            publish(&self.bus, ModelEvent::CartCountChanged { count });
        }
        if let Some(total) = total.filter(|t| t.is_finite()) {
            publish(&self.bus, ModelEvent::CartTotalChanged { total });
        }
    }

    async fn mutate(&self, action: CartAction, request: CartRequest) -> CartSnapshot {
        let token = csrf_token(&dom::lock(&self.document));
        let snapshot = self.http.cart_mutation(action, &request, &token).await;
        tracing::debug!(
            "cart {} -> success={} count={:?} total={:?}",
            action.as_str(),
            snapshot.success,
            snapshot.cart_count,
            snapshot.total
        );
        snapshot
    }

    fn warn(&self, snapshot: &CartSnapshot, fallback: &str) {
        self.notifier
            .notify(snapshot.message_or(fallback), NoticeKind::Warning);
    }

    fn request_navigation(&self, navigation: Navigation) {
        tracing::debug!("navigation requested: {:?}", navigation);
        publish(&self.bus, ModelEvent::NavigationRequested(navigation));
    }

    /// Refresh the badge from the server. Failures leave it untouched.
    pub async fn refresh(&self) {
        let snapshot = self.http.cart_count().await;
        if snapshot.success {
            self.apply(Some(snapshot.count_or_zero()), None);
        } else {
            tracing::debug!("cart count refresh failed: {:?}", snapshot.message);
        }
    }

    pub async fn add(&self, product_id: u64, quantity: i64, redirect_after: bool) -> CartSnapshot {
        let snapshot = self
            .mutate(
                CartAction::Add,
                CartRequest {
                    product_id: Some(product_id),
                    quantity: Some(quantity),
                },
            )
            .await;

        if !snapshot.success {
            self.warn(&snapshot, ADD_FAILED_MESSAGE);
            return snapshot;
        }
        self.apply(Some(snapshot.count_or_zero()), None);
        self.notifier
            .notify(snapshot.message_or(ADDED_MESSAGE), NoticeKind::Success);
        if redirect_after {
            let target = dom::lock(&self.document)
                .location()
                .join(&self.checkout_path);
            match target {
                Ok(url) => self.request_navigation(Navigation::Assign(url)),
                Err(e) => tracing::warn!("invalid checkout path '{}': {}", self.checkout_path, e),
            }
        }
        snapshot
    }

    pub async fn remove(&self, product_id: u64) -> CartSnapshot {
        let snapshot = self
            .mutate(
                CartAction::Remove,
                CartRequest {
                    product_id: Some(product_id),
                    quantity: None,
                },
            )
            .await;

        if !snapshot.success {
            self.warn(&snapshot, REMOVE_FAILED_MESSAGE);
            return snapshot;
        }
        self.apply(Some(snapshot.count_or_zero()), snapshot.total);
        if self.is_cart_page() {
            self.request_navigation(Navigation::Reload);
        }
        snapshot
    }

    /// Set a line's quantity; zero or less removes the line instead
    pub async fn update_quantity(&self, product_id: u64, quantity: i64) -> CartSnapshot {
        if quantity <= 0 {
            return self.remove(product_id).await;
        }
        let snapshot = self
            .mutate(
                CartAction::Update,
                CartRequest {
                    product_id: Some(product_id),
                    quantity: Some(quantity),
                },
            )
            .await;

        if !snapshot.success {
            self.warn(&snapshot, UPDATE_FAILED_MESSAGE);
            return snapshot;
        }
        self.apply(Some(snapshot.count_or_zero()), snapshot.total);
        snapshot
    }

    pub async fn clear(&self) -> CartSnapshot {
        let snapshot = self.mutate(CartAction::Clear, CartRequest::default()).await;

        if !snapshot.success {
            self.warn(&snapshot, CLEAR_FAILED_MESSAGE);
            return snapshot;
        }
        self.apply(Some(0), None);
        if self.is_cart_page() {
            self.request_navigation(Navigation::Reload);
        }
        snapshot
    }

    fn bind(&self, node: NodeId, binding: CartBinding) {
        if let Ok(mut bindings) = self.bindings.lock() {
            bindings.insert(node, binding);
        }
    }

    /// Bind every add-to-cart button not bound yet; returns how many were new.
    /// Safe to call again after the product list is replaced.
    pub fn bind_add_to_cart_buttons(&self) -> usize {
        let mut document = dom::lock(&self.document);
        if let Ok(mut bindings) = self.bindings.lock() {
            bindings.retain(|node, _| document.is_connected(*node));
        }
        let mut bound = 0;
        for button in document.query_selector_all(ADD_TO_CART_SELECTOR) {
            if document.attr(button, BOUND_ATTR) == Some("1") {
                continue;
            }
            let Some(product_id) = product_id_of(&document, button) else {
                tracing::warn!("add-to-cart button without a valid data-product-id skipped");
                continue;
            };
            let quantity = document
                .attr(button, "data-quantity")
                .and_then(|q| q.trim().parse().ok())
                .unwrap_or(1);
            self.bind(
                button,
                CartBinding::AddToCart {
                    product_id,
                    quantity,
                },
            );
            document.set_attr(button, BOUND_ATTR, "1");
            bound += 1;
        }
        tracing::debug!("bound {} add-to-cart button(s)", bound);
        bound
    }

    /// Bind the quantity, remove and clear buttons of the cart page
    pub fn bind_cart_page_buttons(&self) -> usize {
        if !self.is_cart_page() {
            return 0;
        }
        let document = dom::lock(&self.document);
        let mut bound = self.bind_product_buttons(&document, UPDATE_QUANTITY_SELECTOR, |product_id| {
            CartBinding::UpdateQuantity { product_id }
        });
        bound += self.bind_product_buttons(&document, REMOVE_FROM_CART_SELECTOR, |product_id| {
            CartBinding::Remove { product_id }
        });
        if let Some(button) = document.query_selector(CLEAR_CART_SELECTOR) {
            self.bind(button, CartBinding::Clear);
            bound += 1;
        }
        bound
    }

    fn bind_product_buttons(
        &self,
        document: &dom::Document,
        selector: &str,
        make: fn(u64) -> CartBinding,
    ) -> usize {
        let mut bound = 0;
        for button in document.query_selector_all(selector) {
            match product_id_of(document, button) {
                Some(product_id) => {
                    self.bind(button, make(product_id));
                    bound += 1;
                }
                None => tracing::warn!("{} without a valid data-product-id skipped", selector),
            }
        }
        bound
    }

    /// Binding of the clicked node or its nearest bound ancestor
    pub fn binding_for(&self, node: NodeId) -> Option<(NodeId, CartBinding)> {
        let ancestors = dom::lock(&self.document).ancestors_inclusive(node);
        let bindings = self.bindings.lock().ok()?;
        ancestors
            .into_iter()
            .find_map(|candidate| bindings.get(&candidate).map(|b| (candidate, *b)))
    }

    /// Handle a click; returns whether a cart button took it
    pub async fn handle_click(&self, node: NodeId) -> bool {
        let Some((_, binding)) = self.binding_for(node) else {
            return false;
        };
        match binding {
            CartBinding::AddToCart {
                product_id,
                quantity,
            } => {
                self.add(product_id, quantity, false).await;
            }
            CartBinding::UpdateQuantity { product_id } => {
                let quantity = {
                    let document = dom::lock(&self.document);
                    let selector = format!(r#".quantity-input[data-product-id="{product_id}"]"#);
                    document
                        .query_selector(&selector)
                        .and_then(|input| document.value(input).trim().parse::<i64>().ok())
                };
                match quantity {
                    Some(quantity) => {
                        self.update_quantity(product_id, quantity).await;
                    }
                    None => tracing::warn!("no usable quantity for product {}", product_id),
                }
            }
            CartBinding::Remove { product_id } => {
                self.remove(product_id).await;
            }
            CartBinding::Clear => {
                if self.confirm.confirm(CLEAR_CART_PROMPT) {
                    self.clear().await;
                }
            }
        }
        true
    }
}

fn product_id_of(document: &dom::Document, node: NodeId) -> Option<u64> {
    document
        .attr(node, "data-product-id")
        .and_then(|id| id.trim().parse().ok())
}
