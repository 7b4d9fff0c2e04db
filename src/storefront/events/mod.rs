//! # Events Module
//!
//! Model events and the bus that distributes them.

pub mod event_bus;
pub mod model_events;

pub use event_bus::{publish, subscribe, EventBus, ModelEventHandler, SharedEventBus, SimpleEventBus};
pub use model_events::{ModelEvent, Navigation};
