//! # Storefront
//!
//! Headless storefront runtime: an in-memory document, the page controllers
//! that drive it, and the I/O seams they talk through.
//!
//! ```text
//!   PageController ── routes events ──▶ view_models ── state ──▶ views ──▶ dom
//!                                            │
//!                                            ├──▶ services::HttpService ──▶ io::Transport
//!                                            └──▶ events::EventBus
//! ```

pub mod controller;
pub mod dom;
pub mod events;
pub mod io;
pub mod models;
pub mod services;
pub mod timing;
pub mod view_models;
pub mod views;

pub use controller::{PageController, PageServices};
pub use dom::{Document, NodeId, SharedDocument};
pub use events::{ModelEvent, Navigation};
