//! # Model Events
//!
//! Events emitted when controller state changes.
//! Observers (the page controller, the CLI, tests) subscribe through the event bus.

use crate::storefront::models::{FieldStatus, NoticeKind, Theme};
use url::Url;

/// A full-page navigation a controller asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// Reload the current page
    Reload,
    /// Navigate to another page
    Assign(Url),
}

/// Events emitted when models change
#[derive(Debug, Clone, PartialEq)]
pub enum ModelEvent {
    /// Badge count rendered from a server response
    CartCountChanged { count: i64 },

    /// Cart totals rendered from a server response
    CartTotalChanged { total: f64 },

    /// A field finished a validation pass
    FieldValidated {
        form_id: String,
        field_id: String,
        status: FieldStatus,
    },

    /// A submit attempt was checked
    FormSubmitted { form_id: String, accepted: bool },

    /// Filter controls rewrote the page URL
    FilterChanged { url: String },

    /// Product list and pagination were spliced from a partial reload
    ProductsLoaded { url: String },

    /// A partial reload failed; the list was left as it was
    ProductsLoadFailed { url: String, message: String },

    /// A partial reload finished after a newer one was issued and was dropped
    StaleProductsDiscarded { ticket: u64, latest: u64 },

    /// A notice was shown
    NoticePosted {
        id: u64,
        kind: NoticeKind,
        message: String,
    },

    /// A notice removed itself
    NoticeExpired { id: u64 },

    /// Theme applied to the document
    ThemeChanged { theme: Theme },

    /// An input dialog resolved
    DialogClosed { dialog_id: u64, value: Option<String> },

    /// A controller asked for a full-page navigation
    NavigationRequested(Navigation),
}
