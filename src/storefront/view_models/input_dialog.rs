//! # Input Dialogs
//!
//! Modal text prompts. Each dialog resolves exactly once: confirm yields the
//! trimmed text, cancel, backdrop click and Escape yield `None`. The dialog is
//! torn down and its key listener dropped before the value is delivered.

use crate::storefront::dom::{self, NodeId, SharedDocument};
use crate::storefront::events::{publish, ModelEvent, SharedEventBus};
use crate::storefront::views::dialog_view::{self, DialogNodes, DialogSpec};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

pub const CANCEL_LABEL: &str = "Cancel";
pub const CONFIRM_LABEL: &str = "Confirm";
pub const ESCAPE_KEY: &str = "Escape";

/// Value of a dialog that is still open
pub struct PendingInput {
    id: u64,
    receiver: oneshot::Receiver<Option<String>>,
}

impl PendingInput {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the dialog to close
    pub async fn wait(self) -> Option<String> {
        self.receiver.await.ok().flatten()
    }

    /// The value, if the dialog has already closed
    pub fn try_value(&mut self) -> Option<Option<String>> {
        self.receiver.try_recv().ok()
    }
}

struct OpenDialog {
    id: u64,
    container: NodeId,
    nodes: DialogNodes,
    sender: oneshot::Sender<Option<String>>,
}

/// Every input dialog on the page. The open list doubles as the table of
/// per-dialog key listeners.
pub struct InputDialogs {
    document: SharedDocument,
    bus: SharedEventBus,
    next_id: AtomicU64,
    open: Mutex<Vec<OpenDialog>>,
    cancel_label: String,
    confirm_label: String,
}

impl InputDialogs {
    pub fn new(document: SharedDocument, bus: SharedEventBus) -> Self {
        Self {
            document,
            bus,
            next_id: AtomicU64::new(1),
            open: Mutex::new(Vec::new()),
            cancel_label: CANCEL_LABEL.to_string(),
            confirm_label: CONFIRM_LABEL.to_string(),
        }
    }

    pub fn with_labels(mut self, cancel: &str, confirm: &str) -> Self {
        self.cancel_label = cancel.to_string();
        self.confirm_label = confirm.to_string();
        self
    }

    /// Number of dialogs still waiting for an answer
    pub fn open_count(&self) -> usize {
        self.open.lock().map(|open| open.len()).unwrap_or(0)
    }

    /// Open a dialog with the textarea pre-filled and focused
    pub fn show(&self, title: &str, placeholder: &str, default_value: &str) -> PendingInput {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (sender, receiver) = oneshot::channel();
        let spec = DialogSpec {
            title: title.to_string(),
            placeholder: placeholder.to_string(),
            default_value: default_value.to_string(),
            cancel_label: self.cancel_label.clone(),
            confirm_label: self.confirm_label.clone(),
        };

        let rendered = {
            let mut doc = dom::lock(&self.document);
            let container = dialog_view::ensure_container(&mut doc);
            match dialog_view::render_dialog(&mut doc, container, &spec) {
                Ok(nodes) => {
                    doc.focus(nodes.textarea);
                    Ok((container, nodes))
                }
                Err(e) => {
                    if doc.element_children(container).is_empty() {
                        doc.release(container);
                    }
                    Err(e)
                }
            }
        };

        match rendered {
            Ok((container, nodes)) => {
                tracing::debug!("input dialog #{} opened: {}", id, title);
                if let Ok(mut open) = self.open.lock() {
                    open.push(OpenDialog {
                        id,
                        container,
                        nodes,
                        sender,
                    });
                }
            }
            Err(e) => {
                tracing::error!("cannot render input dialog: {:#}", e);
                let _ = sender.send(None);
            }
        }
        PendingInput { id, receiver }
    }

    /// Resolve dialog `id`; later calls for the same dialog are ignored
    pub fn resolve(&self, id: u64, value: Option<String>) -> bool {
        let dialog = match self.open.lock() {
            Ok(mut open) => match open.iter().position(|d| d.id == id) {
                Some(index) => open.remove(index),
                None => return false,
            },
            Err(_) => return false,
        };

        dialog_view::teardown(
            &mut dom::lock(&self.document),
            dialog.container,
            dialog.nodes.dialog,
        );
        tracing::debug!("input dialog #{} closed", id);
        publish(
            &self.bus,
            ModelEvent::DialogClosed {
                dialog_id: id,
                value: value.clone(),
            },
        );
        if dialog.sender.send(value).is_err() {
            tracing::debug!("input dialog #{} closed after its caller gave up", id);
        }
        true
    }

    /// Handle a click on confirm, cancel, or the backdrop
    pub fn handle_click(&self, node: NodeId) -> bool {
        let targets: Vec<(u64, Option<String>)> = {
            let Ok(open) = self.open.lock() else {
                return false;
            };
            let doc = dom::lock(&self.document);
            let mut targets = Vec::new();
            for dialog in open.iter() {
                if doc.contains(dialog.nodes.confirm, node) {
                    let text = doc.value(dialog.nodes.textarea).trim().to_string();
                    targets.push((dialog.id, Some(text)));
                } else if doc.contains(dialog.nodes.cancel, node) || node == dialog.container {
                    targets.push((dialog.id, None));
                }
            }
            targets
        };

        let handled = !targets.is_empty();
        for (id, value) in targets {
            self.resolve(id, value);
        }
        handled
    }

    /// Escape cancels every open dialog
    pub fn handle_key_down(&self, key: &str) -> bool {
        if key != ESCAPE_KEY {
            return false;
        }
        let ids: Vec<u64> = match self.open.lock() {
            Ok(open) => open.iter().map(|d| d.id).collect(),
            Err(_) => return false,
        };
        for id in &ids {
            self.resolve(*id, None);
        }
        !ids.is_empty()
    }
}
