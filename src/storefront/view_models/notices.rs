//! # Notice Queue
//!
//! Transient in-page notices. Each notice removes itself after the display time
//! on its own timer; notices never wait for each other.

use crate::storefront::dom::{self, NodeId, SharedDocument};
use crate::storefront::events::{publish, ModelEvent, SharedEventBus};
use crate::storefront::models::{Notice, NoticeKind};
use crate::storefront::views::notice_view;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::runtime::Handle;

/// Anything that can show a user-facing notice
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, kind: NoticeKind);
}

/// Notifier used when a page has no notice area wired up
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, message: &str, kind: NoticeKind) {
        tracing::debug!("notice dropped ({}): {}", kind, message);
    }
}

#[derive(Default)]
struct NoticeState {
    next_id: u64,
    active: Vec<(Notice, NodeId)>,
}

/// Stack of notices rendered into `#notice-container`
#[derive(Clone)]
pub struct NoticeQueue {
    document: SharedDocument,
    bus: SharedEventBus,
    display_time: Duration,
    state: Arc<Mutex<NoticeState>>,
}

impl NoticeQueue {
    pub fn new(document: SharedDocument, bus: SharedEventBus, display_time: Duration) -> Self {
        Self {
            document,
            bus,
            display_time,
            state: Arc::new(Mutex::new(NoticeState::default())),
        }
    }

    /// Show a notice and schedule its removal; returns the notice id
    pub fn show_notice(&self, message: &str, kind: NoticeKind) -> u64 {
        let id = match self.state.lock() {
            Ok(mut state) => {
                state.next_id += 1;
                state.next_id
            }
            Err(_) => return 0,
        };
        let notice = Notice {
            id,
            message: message.to_string(),
            kind,
        };

        let item = {
            let mut document = dom::lock(&self.document);
            let container = notice_view::ensure_container(&mut document);
            notice_view::render_notice(&mut document, container, &notice)
        };
        if let Ok(mut state) = self.state.lock() {
            state.active.push((notice, item));
        }
        tracing::debug!("notice {} ({}): {}", id, kind, message);
        publish(
            &self.bus,
            ModelEvent::NoticePosted {
                id,
                kind,
                message: message.to_string(),
            },
        );

        self.schedule_removal(id);
        id
    }

    fn schedule_removal(&self, id: u64) {
        match Handle::try_current() {
            Ok(handle) => {
                let queue = self.clone();
                handle.spawn(async move {
                    tokio::time::sleep(queue.display_time).await;
                    queue.expire(id);
                });
            }
            Err(_) => tracing::warn!("no runtime to expire notice {}, it stays", id),
        }
    }

    /// Remove a notice now. Unknown ids are ignored.
    pub fn expire(&self, id: u64) {
        let removed = match self.state.lock() {
            Ok(mut state) => state
                .active
                .iter()
                .position(|(notice, _)| notice.id == id)
                .map(|index| state.active.remove(index)),
            Err(_) => None,
        };
        let Some((_, item)) = removed else {
            return;
        };
        notice_view::remove_notice(&mut dom::lock(&self.document), item);
        publish(&self.bus, ModelEvent::NoticeExpired { id });
    }

    /// Notices currently on screen, oldest first
    pub fn active(&self) -> Vec<Notice> {
        self.state
            .lock()
            .map(|state| state.active.iter().map(|(n, _)| n.clone()).collect())
            .unwrap_or_default()
    }
}

impl Notifier for NoticeQueue {
    fn notify(&self, message: &str, kind: NoticeKind) {
        self.show_notice(message, kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storefront::dom::Document;
    use crate::storefront::events::SimpleEventBus;
    use url::Url;

    fn queue() -> (NoticeQueue, SharedDocument) {
        let document = Arc::new(Mutex::new(
            Document::parse("<html><body></body></html>", Url::parse("http://shop.test/").unwrap())
                .unwrap(),
        ));
        let queue = NoticeQueue::new(
            document.clone(),
            SimpleEventBus::shared(),
            Duration::from_millis(3200),
        );
        (queue, document)
    }

    #[tokio::test(start_paused = true)]
    async fn notice_should_render_then_expire_after_display_time() {
        let (queue, document) = queue();
        queue.show_notice("Added to cart", NoticeKind::Success);

        {
            let doc = document.lock().unwrap();
            let item = doc.query_selector("#notice-container .notice-item.success").unwrap();
            assert_eq!(doc.text_content(item), "Added to cart");
        }

        tokio::time::sleep(Duration::from_millis(3100)).await;
        assert_eq!(queue.active().len(), 1);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert!(queue.active().is_empty());
        let doc = document.lock().unwrap();
        assert!(doc.query_selector(".notice-item").is_none());
        assert!(doc.get_element_by_id("notice-container").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn notices_should_expire_independently() {
        let (queue, _document) = queue();
        queue.show_notice("first", NoticeKind::Info);
        tokio::time::sleep(Duration::from_millis(1000)).await;
        queue.show_notice("second", NoticeKind::Warning);

        tokio::time::sleep(Duration::from_millis(2300)).await;
        let active = queue.active();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].message, "second");
        assert_eq!(active[0].kind, NoticeKind::Warning);
    }

    #[tokio::test]
    async fn container_should_be_created_once() {
        let (queue, document) = queue();
        queue.show_notice("a", NoticeKind::Info);
        queue.show_notice("b", NoticeKind::Danger);

        let doc = document.lock().unwrap();
        let containers: Vec<_> = doc
            .descendants(doc.root())
            .into_iter()
            .filter(|n| doc.id(*n) == Some("notice-container"))
            .collect();
        assert_eq!(containers.len(), 1);
        assert_eq!(doc.query_selector_all(".notice-item").len(), 2);
    }
}
