//! # Event Bus
//!
//! Central event distribution for decoupled communication between
//! page controllers using the observer pattern.

use super::model_events::ModelEvent;
use std::sync::{Arc, Mutex};

/// Type alias for model event handlers to reduce complexity
pub type ModelEventHandler = Box<dyn Fn(&ModelEvent) + Send + Sync>;

/// Bus shared by every controller on a page
pub type SharedEventBus = Arc<Mutex<dyn EventBus>>;

/// Event bus for decoupled communication between components
pub trait EventBus: Send + Sync {
    /// Publish a model event
    fn publish_model_event(&mut self, event: ModelEvent);

    /// Subscribe to model events
    fn subscribe_to_model_events(&mut self, handler: ModelEventHandler);
}

/// Simple in-memory event bus implementation
pub struct SimpleEventBus {
    model_handlers: Vec<ModelEventHandler>,
}

impl SimpleEventBus {
    pub fn new() -> Self {
        Self {
            model_handlers: Vec::new(),
        }
    }

    /// Create a bus ready to be shared between controllers
    pub fn shared() -> SharedEventBus {
        Arc::new(Mutex::new(Self::new()))
    }
}

impl Default for SimpleEventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus for SimpleEventBus {
    fn publish_model_event(&mut self, event: ModelEvent) {
        for handler in &self.model_handlers {
            handler(&event);
        }
    }

    fn subscribe_to_model_events(&mut self, handler: ModelEventHandler) {
        self.model_handlers.push(handler);
    }
}

/// Publish on a shared bus. Handlers run while the bus is locked and must not publish.
pub fn publish(bus: &SharedEventBus, event: ModelEvent) {
    match bus.lock() {
        Ok(mut bus) => bus.publish_model_event(event),
        Err(_) => tracing::warn!("event bus poisoned, dropping {:?}", event),
    }
}

/// Subscribe on a shared bus
pub fn subscribe(bus: &SharedEventBus, handler: ModelEventHandler) {
    if let Ok(mut bus) = bus.lock() {
        bus.subscribe_to_model_events(handler);
    }
}
