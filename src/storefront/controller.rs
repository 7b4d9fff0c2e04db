//! # Page Controller
//!
//! Boots every component on a loaded page and routes injected user events to
//! them. The first component that owns an event's target handles it.

use crate::config::StorefrontConfig;
use crate::storefront::dom::{self, Document, NodeId, SharedDocument};
use crate::storefront::events::{subscribe, ModelEvent, Navigation, SharedEventBus, SimpleEventBus};
use crate::storefront::io::{Clipboard, PreferenceStore, Transport};
use crate::storefront::models::NoticeKind;
use crate::storefront::services::HttpService;
use crate::storefront::view_models::{
    attach_csrf_to_forms, AlwaysConfirm, CartSync, ClipboardCopy, Confirm, FormValidator,
    InputDialogs, IntersectionEntry, LazyImageLoader, NoticeQueue, PendingInput, ProductFilter,
    ThemeController,
};
use crate::storefront::views::field_view;
use anyhow::Result;
use std::sync::{Arc, Mutex};
use url::Url;

/// Outside-world dependencies of a page
#[derive(Clone)]
pub struct PageServices {
    pub transport: Arc<dyn Transport>,
    pub preferences: Arc<dyn PreferenceStore>,
    pub clipboard: Arc<dyn Clipboard>,
    pub confirm: Arc<dyn Confirm>,
    pub config: StorefrontConfig,
    /// OS-level dark mode preference, used until the user picks a theme
    pub system_prefers_dark: bool,
}

impl PageServices {
    pub fn new(
        transport: Arc<dyn Transport>,
        preferences: Arc<dyn PreferenceStore>,
        clipboard: Arc<dyn Clipboard>,
        config: StorefrontConfig,
    ) -> Self {
        Self {
            transport,
            preferences,
            clipboard,
            confirm: Arc::new(AlwaysConfirm),
            config,
            system_prefers_dark: false,
        }
    }

    pub fn with_confirm(mut self, confirm: Arc<dyn Confirm>) -> Self {
        self.confirm = confirm;
        self
    }

    pub fn with_system_dark_mode(mut self, prefers_dark: bool) -> Self {
        self.system_prefers_dark = prefers_dark;
        self
    }
}

pub struct PageController {
    services: PageServices,
    document: SharedDocument,
    bus: SharedEventBus,
    http: HttpService,
    notices: NoticeQueue,
    dialogs: InputDialogs,
    theme: ThemeController,
    lazy_images: LazyImageLoader,
    clipboard: ClipboardCopy,
    cart: Arc<CartSync>,
    filter: Arc<ProductFilter>,
    validators: Vec<Arc<FormValidator>>,
    navigations: Arc<Mutex<Vec<Navigation>>>,
}

impl PageController {
    /// Fetch the page at `url` and boot a controller on it
    pub async fn load(url: Url, services: PageServices) -> Result<Self> {
        let http = HttpService::new(services.transport.clone(), services.config.base_url.clone());
        let html = http.get_page(&url).await?;
        let document = Document::parse(&html, url)?;
        Ok(Self::boot(document, services).await)
    }

    /// Wire every component onto `document`
    pub async fn boot(document: Document, services: PageServices) -> Self {
        tracing::debug!("booting page {}", document.location());
        let config = &services.config;
        let document: SharedDocument = Arc::new(Mutex::new(document));
        let bus = SimpleEventBus::shared();
        let navigations = Arc::new(Mutex::new(Vec::new()));
        let sink = navigations.clone();
        subscribe(
            &bus,
            Box::new(move |event: &ModelEvent| {
                if let ModelEvent::NavigationRequested(navigation) = event {
                    if let Ok(mut navigations) = sink.lock() {
                        navigations.push(navigation.clone());
                    }
                }
            }),
        );

        let http = HttpService::new(services.transport.clone(), config.base_url.clone());
        let notices = NoticeQueue::new(document.clone(), bus.clone(), config.notice_duration);
        let dialogs = InputDialogs::new(document.clone(), bus.clone());

        let theme = ThemeController::new(document.clone(), services.preferences.clone(), bus.clone());
        theme.init(services.system_prefers_dark);

        let injected = attach_csrf_to_forms(&mut dom::lock(&document));
        tracing::debug!("csrf token injected into {} form(s)", injected);

        let lazy_images = LazyImageLoader::new(document.clone());
        lazy_images.observe_all();

        let clipboard = ClipboardCopy::new(
            document.clone(),
            services.clipboard.clone(),
            Arc::new(notices.clone()),
        );

        let cart = Arc::new(
            CartSync::new(document.clone(), http.clone(), bus.clone(), config)
                .with_notifier(Arc::new(notices.clone()))
                .with_confirm(services.confirm.clone()),
        );
        cart.bind_add_to_cart_buttons();
        cart.bind_cart_page_buttons();
        cart.refresh().await;

        let filter = ProductFilter::new(document.clone(), http.clone(), bus.clone(), cart.clone(), config);

        let forms: Vec<NodeId> = {
            let doc = dom::lock(&document);
            doc.query_selector_all("form[id]")
                .into_iter()
                .filter(|form| doc.id(*form).is_some())
                .collect()
        };
        let validators = forms
            .into_iter()
            .map(|form| FormValidator::for_form(document.clone(), form, http.clone(), bus.clone(), config))
            .collect();

        Self {
            services,
            document,
            bus,
            http,
            notices,
            dialogs,
            theme,
            lazy_images,
            clipboard,
            cart,
            filter,
            validators,
            navigations,
        }
    }

    pub fn document(&self) -> &SharedDocument {
        &self.document
    }

    pub fn bus(&self) -> &SharedEventBus {
        &self.bus
    }

    pub fn http(&self) -> &HttpService {
        &self.http
    }

    pub fn cart(&self) -> &Arc<CartSync> {
        &self.cart
    }

    pub fn filter(&self) -> &Arc<ProductFilter> {
        &self.filter
    }

    pub fn theme(&self) -> &ThemeController {
        &self.theme
    }

    pub fn notices(&self) -> &NoticeQueue {
        &self.notices
    }

    pub fn dialogs(&self) -> &InputDialogs {
        &self.dialogs
    }

    /// Validator of the form with id `form_id`
    pub fn validator(&self, form_id: &str) -> Option<Arc<FormValidator>> {
        self.validators
            .iter()
            .find(|validator| validator.form_id() == form_id)
            .cloned()
    }

    fn validator_owning(&self, node: NodeId) -> Option<&Arc<FormValidator>> {
        self.validators.iter().find(|validator| validator.owns(node))
    }

    /// First element matching `selector`
    pub fn find(&self, selector: &str) -> Option<NodeId> {
        dom::lock(&self.document).query_selector(selector)
    }

    // ---- event entry points --------------------------------------------

    pub async fn click(&self, node: NodeId) -> bool {
        if self.dialogs.handle_click(node) || self.theme.handle_click(node) {
            return true;
        }
        if self.cart.handle_click(node).await {
            return true;
        }
        self.filter.handle_click(node).await
    }

    pub fn input(&self, node: NodeId) -> bool {
        let validated = match self.validator_owning(node) {
            Some(validator) => {
                validator.handle_input(node);
                true
            }
            None => false,
        };
        self.filter.handle_input(node) || validated
    }

    /// Set a control's value, then fire an input event on it
    pub fn type_text(&self, node: NodeId, text: &str) -> bool {
        dom::lock(&self.document).set_value(node, text);
        self.input(node)
    }

    pub async fn change(&self, node: NodeId) -> bool {
        self.filter.handle_change(node).await
    }

    pub fn blur(&self, node: NodeId) -> bool {
        match self.validator_owning(node) {
            Some(validator) => {
                validator.handle_blur(node);
                true
            }
            None => false,
        }
    }

    /// Submit attempt on `form`; returns whether the submission may proceed.
    /// Forms without an id get the plain native check.
    pub fn submit(&self, form: NodeId) -> bool {
        if let Some(validator) = self.validators.iter().find(|v| v.form() == form) {
            return validator.handle_submit();
        }
        let mut doc = dom::lock(&self.document);
        let valid = doc
            .descendants(form)
            .into_iter()
            .all(|node| doc.validity(node).valid());
        field_view::render_form(&mut doc, form, true);
        valid
    }

    pub fn key_down(&self, key: &str) -> bool {
        self.dialogs.handle_key_down(key)
    }

    /// Visibility report from the embedder; returns how many images loaded
    pub fn report_visibility(&self, entries: &[IntersectionEntry]) -> usize {
        self.lazy_images.on_intersection(entries)
    }

    // ---- utilities -----------------------------------------------------

    pub fn show_notice(&self, message: &str, kind: NoticeKind) -> u64 {
        self.notices.show_notice(message, kind)
    }

    pub fn show_input_dialog(&self, title: &str, placeholder: &str, default_value: &str) -> PendingInput {
        self.dialogs.show(title, placeholder, default_value)
    }

    pub async fn copy_to_clipboard(&self, text: &str) -> bool {
        self.clipboard.copy_to_clipboard(text).await
    }

    // ---- navigation ----------------------------------------------------

    /// Navigations requested so far, oldest first
    pub fn navigations(&self) -> Vec<Navigation> {
        self.navigations
            .lock()
            .map(|navigations| navigations.clone())
            .unwrap_or_default()
    }

    /// Perform the latest requested navigation by loading its page; `None`
    /// when nothing asked to navigate
    pub async fn follow_navigation(&self) -> Result<Option<PageController>> {
        let latest = self
            .navigations
            .lock()
            .ok()
            .and_then(|mut navigations| navigations.drain(..).last());
        let target = match latest {
            Some(Navigation::Reload) => dom::lock(&self.document).location().clone(),
            Some(Navigation::Assign(url)) => url,
            None => return Ok(None),
        };
        tracing::debug!("following navigation to {}", target);
        let page = Self::load(target, self.services.clone()).await?;
        Ok(Some(page))
    }
}
