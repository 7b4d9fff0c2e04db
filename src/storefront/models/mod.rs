//! # Models
//!
//! Plain view-state records. Models hold what each controller knows; they carry
//! no I/O and no document access.

pub mod cart_model;
pub mod field_model;
pub mod filter_model;
pub mod notice_model;
pub mod theme_model;

pub use cart_model::{format_price, BadgeState, CartAction, CartRequest, CartSnapshot, CartView};
pub use field_model::{FieldStatus, FormView, ValidationMessages};
pub use filter_model::FilterState;
pub use notice_model::{Notice, NoticeKind};
pub use theme_model::Theme;
