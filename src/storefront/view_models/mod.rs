//! # ViewModel Module
//!
//! Page controllers, one per concern. Each holds its own view-state, talks to
//! the server through `HttpService`, and projects its state through the views.

pub mod cart_sync;
pub mod clipboard;
pub mod csrf;
pub mod form_validator;
pub mod input_dialog;
pub mod lazy_images;
pub mod notices;
pub mod product_filter;
pub mod theme;

pub use cart_sync::{AlwaysConfirm, CartBinding, CartSync, Confirm};
pub use clipboard::ClipboardCopy;
pub use csrf::{attach_csrf_to_forms, csrf_token};
pub use form_validator::FormValidator;
pub use input_dialog::{InputDialogs, PendingInput};
pub use lazy_images::{IntersectionEntry, LazyImageLoader};
pub use notices::{NoopNotifier, NoticeQueue, Notifier};
pub use product_filter::ProductFilter;
pub use theme::ThemeController;
