//! # Services
//!
//! Endpoint-level clients used by the page controllers.

pub mod http;

pub use http::{AvailabilityKind, HttpService};
