//! # Theme Controller
//!
//! Light/dark theme on `<html data-theme>`. An explicit choice is persisted;
//! the OS preference only applies until the user toggles once.

use crate::storefront::dom::{self, NodeId, SharedDocument};
use crate::storefront::events::{publish, ModelEvent, SharedEventBus};
use crate::storefront::io::PreferenceStore;
use crate::storefront::models::theme_model::THEME_KEY;
use crate::storefront::models::Theme;
use crate::storefront::views::theme_view;
use std::sync::Arc;

pub const THEME_TOGGLE_ID: &str = "theme-toggle";

pub struct ThemeController {
    document: SharedDocument,
    preferences: Arc<dyn PreferenceStore>,
    bus: SharedEventBus,
}

impl ThemeController {
    pub fn new(
        document: SharedDocument,
        preferences: Arc<dyn PreferenceStore>,
        bus: SharedEventBus,
    ) -> Self {
        Self {
            document,
            preferences,
            bus,
        }
    }

    /// Apply the saved theme, else the OS preference. Nothing is persisted here.
    pub fn init(&self, system_prefers_dark: bool) -> Theme {
        let saved = self
            .preferences
            .get(THEME_KEY)
            .and_then(|raw| match raw.parse::<Theme>() {
                Ok(theme) => Some(theme),
                Err(e) => {
                    tracing::warn!("ignoring saved theme: {:#}", e);
                    None
                }
            });
        let theme = saved.unwrap_or_else(|| Theme::from_system(system_prefers_dark));
        self.apply(theme);
        theme
    }

    /// Theme currently on the page; light when none was applied
    pub fn current(&self) -> Theme {
        theme_view::current_theme(&dom::lock(&self.document)).unwrap_or(Theme::Light)
    }

    /// Flip the theme and persist the choice
    pub fn toggle(&self) -> Theme {
        let theme = self.current().toggled();
        self.apply(theme);
        if let Err(e) = self.preferences.set(THEME_KEY, theme.as_str()) {
            tracing::warn!("cannot persist theme: {:#}", e);
        }
        theme
    }

    fn apply(&self, theme: Theme) {
        theme_view::render_theme(&mut dom::lock(&self.document), theme);
        publish(&self.bus, ModelEvent::ThemeChanged { theme });
    }

    /// Toggle when `#theme-toggle` (or something inside it) is clicked
    pub fn handle_click(&self, node: NodeId) -> bool {
        let hit = {
            let doc = dom::lock(&self.document);
            doc.get_element_by_id(THEME_TOGGLE_ID)
                .is_some_and(|toggle| doc.contains(toggle, node))
        };
        if hit {
            self.toggle();
        }
        hit
    }
}
