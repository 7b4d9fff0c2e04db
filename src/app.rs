//! # Application
//!
//! Runs one CLI command against a storefront by booting the page controllers
//! on the relevant page, the way a browser would, and reporting what changed.

use crate::cmd_args::{CartCommand, Command, CommandLineArgs, ProductQuery, ThemeCommand};
use crate::config::{self, StorefrontConfig};
use crate::storefront::dom::{self, Document};
use crate::storefront::events::SimpleEventBus;
use crate::storefront::io::{IniPreferenceStore, LocalClipboard, ReqwestTransport};
use crate::storefront::models::filter_model::{
    PARAM_MAX_PRICE, PARAM_MIN_PRICE, PARAM_PAGE, PARAM_QUERY, PARAM_SORT,
};
use crate::storefront::models::{format_price, CartSnapshot, Theme};
use crate::storefront::view_models::cart_sync::{
    ADD_FAILED_MESSAGE, CLEAR_FAILED_MESSAGE, REMOVE_FAILED_MESSAGE, UPDATE_FAILED_MESSAGE,
};
use crate::storefront::view_models::product_filter::PRODUCT_LIST_SELECTOR;
use crate::storefront::view_models::ThemeController;
use crate::storefront::{PageController, PageServices};
use anyhow::{anyhow, Result};
use std::sync::{Arc, Mutex};
use url::Url;

pub const CART_PAGE_PATH: &str = "/order/cart";
pub const PRODUCT_LIST_PATH: &str = "/product/list";

pub struct App {
    services: PageServices,
}

impl App {
    /// Production wiring: profile config, reqwest transport, INI preferences
    pub fn new(args: &CommandLineArgs) -> Result<Self> {
        let profile_path = config::get_profile_path();
        tracing::debug!("loading profile '{}' from '{}'", args.profile(), profile_path);
        let mut config = StorefrontConfig::load(&profile_path, args.profile())?;
        if let Some(url) = args.url() {
            config.base_url = Url::parse(url).map_err(|e| anyhow!("invalid --url '{url}': {e}"))?;
        }

        let secure = config.base_url.scheme() == "https";
        let preferences = Arc::new(IniPreferenceStore::new(&config.preferences_path));
        let services = PageServices::new(
            Arc::new(ReqwestTransport::new()?),
            preferences,
            Arc::new(LocalClipboard::new(secure)),
            config,
        );
        Ok(Self::with_services(services))
    }

    pub fn with_services(services: PageServices) -> Self {
        Self { services }
    }

    fn config(&self) -> &StorefrontConfig {
        &self.services.config
    }

    /// Run `command`; returns the lines to print
    pub async fn execute(&self, command: &Command) -> Result<Vec<String>> {
        match command {
            Command::Cart { action } => self.cart(action).await,
            Command::Products(query) => self.products(query).await,
            Command::Theme { action } => self.theme(*action),
        }
    }

    async fn open(&self, path: &str) -> Result<PageController> {
        let url = self.config().url_for(path)?;
        PageController::load(url, self.services.clone()).await
    }

    async fn cart(&self, action: &CartCommand) -> Result<Vec<String>> {
        let page = self.open(CART_PAGE_PATH).await?;
        let cart = page.cart();

        let (snapshot, fallback) = match action {
            CartCommand::Count => return Ok(vec![self.cart_summary(&page)]),
            CartCommand::Add {
                product_id,
                quantity,
                checkout,
            } => (
                cart.add(*product_id, *quantity, *checkout).await,
                ADD_FAILED_MESSAGE,
            ),
            CartCommand::Remove { product_id } => {
                (cart.remove(*product_id).await, REMOVE_FAILED_MESSAGE)
            }
            CartCommand::Update {
                product_id,
                quantity,
            } => (
                cart.update_quantity(*product_id, *quantity).await,
                UPDATE_FAILED_MESSAGE,
            ),
            CartCommand::Clear => (cart.clear().await, CLEAR_FAILED_MESSAGE),
        };
        if !snapshot.success {
            return Err(anyhow!("{}", snapshot.message_or(fallback)));
        }

        let mut lines = Vec::new();
        if let Some(message) = &snapshot.message {
            lines.push(message.clone());
        }
        lines.push(self.cart_summary_from(&page, &snapshot));
        if let Some(next) = page.follow_navigation().await? {
            lines.push(format!(
                "now at {}",
                dom::lock(next.document()).location()
            ));
        }
        Ok(lines)
    }

    fn cart_summary(&self, page: &PageController) -> String {
        let view = page.cart().view();
        let count = view.badge.map(|badge| badge.count).unwrap_or(0);
        match view.total {
            Some(total) => format!(
                "cart: {count} item(s), total {}",
                format_price(&self.config().currency_symbol, total)
            ),
            None => format!("cart: {count} item(s)"),
        }
    }

    fn cart_summary_from(&self, page: &PageController, snapshot: &CartSnapshot) -> String {
        match snapshot.total {
            Some(total) => format!(
                "cart: {} item(s), total {}",
                snapshot.count_or_zero(),
                format_price(&self.config().currency_symbol, total)
            ),
            None => self.cart_summary(page),
        }
    }

    async fn products(&self, query: &ProductQuery) -> Result<Vec<String>> {
        let page = self.open(PRODUCT_LIST_PATH).await?;
        let filter = page.filter();

        let mut state = filter.state();
        if let Some(q) = &query.query {
            state.set(PARAM_QUERY, q.trim());
        }
        if let Some(min) = &query.min_price {
            state.set(PARAM_MIN_PRICE, min);
        }
        if let Some(max) = &query.max_price {
            state.set(PARAM_MAX_PRICE, max);
        }
        if !query.tags.is_empty() {
            state.set_tags(&query.tags);
        }
        if let Some(sort) = &query.sort {
            state.set(PARAM_SORT, sort);
        }
        if let Some(number) = query.page {
            state.set(PARAM_PAGE, &number.to_string());
        }
        if state != filter.state() && !filter.navigate(state).await {
            return Err(anyhow!("could not load products"));
        }

        let doc = dom::lock(page.document());
        let mut lines = vec![format!("{}", doc.location())];
        if let Some(list) = doc.query_selector(PRODUCT_LIST_SELECTOR) {
            for item in doc.element_children(list) {
                let text = collapse_whitespace(&doc.text_content(item));
                if text.is_empty() {
                    continue;
                }
                let product_id = doc
                    .query_selector_in(item, "[data-product-id]")
                    .and_then(|node| doc.attr(node, "data-product-id"));
                lines.push(match product_id {
                    Some(id) => format!("#{id}  {text}"),
                    None => text,
                });
            }
        }
        Ok(lines)
    }

    fn theme(&self, action: ThemeCommand) -> Result<Vec<String>> {
        let document = Document::parse("<html><body></body></html>", self.config().base_url.clone())?;
        let themes = ThemeController::new(
            Arc::new(Mutex::new(document)),
            self.services.preferences.clone(),
            SimpleEventBus::shared(),
        );
        let theme: Theme = themes.init(self.services.system_prefers_dark);
        let theme = match action {
            ThemeCommand::Show => theme,
            ThemeCommand::Toggle => themes.toggle(),
        };
        Ok(vec![format!("theme: {theme}")])
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Entry point used by the binary
pub async fn run(args: CommandLineArgs) -> Result<()> {
    let app = App::new(&args)?;
    for line in app.execute(args.command()).await? {
        println!("{line}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storefront::io::{
        MemoryPreferenceStore, Method, MockClipboard, MockReply, MockTransport,
    };
    use crate::storefront::models::theme_model::THEME_KEY;
    use crate::storefront::io::PreferenceStore;
    use serde_json::json;

    const CART_PAGE: &str = r#"<html><head><meta name="csrf-token" content="t"></head>
        <body><span class="cart-badge">1</span></body></html>"#;

    fn app(transport: &MockTransport, preferences: Arc<MemoryPreferenceStore>) -> App {
        App::with_services(PageServices::new(
            Arc::new(transport.clone()),
            preferences,
            Arc::new(MockClipboard::insecure()),
            StorefrontConfig::new(Url::parse("http://shop.test/").unwrap()),
        ))
    }

    #[tokio::test]
    async fn cart_add_should_report_count_and_total() {
        let transport = MockTransport::new();
        transport
            .on(Method::Get, CART_PAGE_PATH, MockReply::html(CART_PAGE))
            .on(
                Method::Get,
                "/order/cart/count",
                MockReply::json(json!({"success": true, "cart_count": 1})),
            )
            .on(
                Method::Post,
                "/order/cart/add",
                MockReply::json(json!({"success": true, "cart_count": 2, "total": 1234.5, "message": "Added"})),
            );
        let app = app(&transport, Arc::new(MemoryPreferenceStore::new()));

        let lines = app
            .execute(&Command::Cart {
                action: CartCommand::Add {
                    product_id: 5,
                    quantity: 1,
                    checkout: false,
                },
            })
            .await
            .unwrap();
        assert_eq!(lines, vec!["Added", "cart: 2 item(s), total ¥1,234.50"]);
    }

    #[tokio::test]
    async fn failed_cart_command_should_be_an_error() {
        let transport = MockTransport::new();
        transport
            .on(Method::Get, CART_PAGE_PATH, MockReply::html(CART_PAGE))
            .on(
                Method::Post,
                "/order/cart/remove",
                MockReply::json(json!({"success": false})),
            );
        let app = app(&transport, Arc::new(MemoryPreferenceStore::new()));

        let err = app
            .execute(&Command::Cart {
                action: CartCommand::Remove { product_id: 5 },
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), REMOVE_FAILED_MESSAGE);
    }

    #[tokio::test]
    async fn products_should_list_cards_of_filtered_page() {
        let listing = r#"<html><body><div class="product-list-container">
            <div class="card"><h5>Blue   Shoe</h5> <button class="add-to-cart-btn" data-product-id="3">Add</button></div>
            <div class="card"><h5>Red Hat</h5></div>
            </div><div class="pagination-container"></div></body></html>"#;
        let transport = MockTransport::new();
        transport.on(Method::Get, PRODUCT_LIST_PATH, MockReply::html(listing));
        let app = app(&transport, Arc::new(MemoryPreferenceStore::new()));

        let query = ProductQuery {
            query: Some(" shoe ".to_string()),
            tags: vec!["sale".to_string()],
            ..ProductQuery::default()
        };
        let lines = app.execute(&Command::Products(query)).await.unwrap();

        assert_eq!(
            lines,
            vec![
                "http://shop.test/product/list?q=shoe&tags=sale",
                "#3  Blue Shoe Add",
                "Red Hat"
            ]
        );
        let sent = transport.requests_to(PRODUCT_LIST_PATH);
        assert_eq!(sent.last().unwrap().url.query(), Some("q=shoe&tags=sale"));
    }

    #[tokio::test]
    async fn theme_toggle_should_persist() {
        let preferences = Arc::new(MemoryPreferenceStore::new());
        let app = app(&MockTransport::new(), preferences.clone());

        let shown = app
            .execute(&Command::Theme {
                action: ThemeCommand::Show,
            })
            .await
            .unwrap();
        assert_eq!(shown, vec!["theme: light"]);
        assert_eq!(preferences.get(THEME_KEY), None);

        let toggled = app
            .execute(&Command::Theme {
                action: ThemeCommand::Toggle,
            })
            .await
            .unwrap();
        assert_eq!(toggled, vec!["theme: dark"]);
        assert_eq!(preferences.get(THEME_KEY).as_deref(), Some("dark"));
    }
}
