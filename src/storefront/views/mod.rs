//! # Views
//!
//! Pure projections of view-state records onto the document. A view function
//! reads nothing but its arguments and writes classes, text and attributes;
//! controllers decide *what* to show, views decide *how* it looks in markup.

pub mod cart_view;
pub mod dialog_view;
pub mod field_view;
pub mod filter_view;
pub mod notice_view;
pub mod theme_view;

/// Bootstrap utility class that hides an element
pub const HIDDEN_CLASS: &str = "d-none";
