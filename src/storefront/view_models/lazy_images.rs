//! # Lazy Images
//!
//! Deferred image loading. Every `img[data-src]` is observed once; when the
//! embedder reports it visible, its real source is swapped in and it is no
//! longer observed.

use crate::storefront::dom::{self, NodeId, SharedDocument};
use std::collections::BTreeSet;
use std::sync::Mutex;

pub const LAZY_IMAGE_SELECTOR: &str = "img[data-src]";
pub const LAZY_CLASS: &str = "lazy";

/// Visibility report for one observed element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntersectionEntry {
    pub target: NodeId,
    pub is_intersecting: bool,
}

impl IntersectionEntry {
    pub fn visible(target: NodeId) -> Self {
        Self {
            target,
            is_intersecting: true,
        }
    }
}

pub struct LazyImageLoader {
    document: SharedDocument,
    observed: Mutex<BTreeSet<NodeId>>,
}

impl LazyImageLoader {
    pub fn new(document: SharedDocument) -> Self {
        Self {
            document,
            observed: Mutex::new(BTreeSet::new()),
        }
    }

    /// Observe every lazy image on the page; returns how many are observed
    pub fn observe_all(&self) -> usize {
        let images = dom::lock(&self.document).query_selector_all(LAZY_IMAGE_SELECTOR);
        match self.observed.lock() {
            Ok(mut observed) => {
                observed.extend(images);
                observed.len()
            }
            Err(_) => 0,
        }
    }

    pub fn observed(&self) -> Vec<NodeId> {
        self.observed
            .lock()
            .map(|observed| observed.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Load every visible observed image; returns how many were loaded
    pub fn on_intersection(&self, entries: &[IntersectionEntry]) -> usize {
        let Ok(mut observed) = self.observed.lock() else {
            return 0;
        };
        let mut doc = dom::lock(&self.document);
        let mut loaded = 0;
        for entry in entries.iter().filter(|e| e.is_intersecting) {
            if !observed.remove(&entry.target) {
                continue;
            }
            let Some(source) = doc.attr(entry.target, "data-src").map(str::to_string) else {
                continue;
            };
            doc.set_attr(entry.target, "src", &source);
            doc.remove_class(entry.target, LAZY_CLASS);
            loaded += 1;
        }
        if loaded > 0 {
            tracing::debug!("loaded {} lazy image(s)", loaded);
        }
        loaded
    }
}
