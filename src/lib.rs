//! # shopline - Headless Storefront Client
//!
//! Loads server-rendered storefront pages into an in-memory document and runs
//! the storefront's page controllers against them: cart badge sync, form
//! validation, product filtering, and the small UI utilities around them.
//!
//! ## Architecture
//!
//! The controllers follow the Model-View-ViewModel (MVVM) pattern:
//!
//! ```text
//! ┌─────────────┐   Projects   ┌──────────────┐    Updates   ┌─────────┐
//! │    View     │◄─────────────│  ViewModel   │─────────────▶│ Models  │
//! │             │              │              │              │         │
//! │ - Classes   │              │ - CartSync   │              │ - Cart  │
//! │ - Text      │              │ - Validator  │              │ - Field │
//! │ - Attrs     │              │ - Filter     │              │ - Filter│
//! └─────────────┘              └──────────────┘              └─────────┘
//!                                      ▲
//!                                      │ Events
//!                                      ▼
//!                               ┌────────────────┐
//!                               │ PageController │
//!                               │                │
//!                               │ - Boot         │
//!                               │ - Routing      │
//!                               └────────────────┘
//! ```

pub mod app;
pub mod cmd_args;
pub mod config;
pub mod storefront;

// Re-export main types for easy access
pub use app::App;
pub use storefront::*;
