//! Copy-to-clipboard with a notice on the outcome

use super::notices::Notifier;
use crate::storefront::dom::{self, SharedDocument};
use crate::storefront::io::Clipboard;
use crate::storefront::models::NoticeKind;
use std::sync::Arc;

pub const COPIED_MESSAGE: &str = "Copied";
pub const COPY_FAILED_MESSAGE: &str = "Copy failed";

/// Off-screen placement of the temporary textarea used by the legacy path
const OFFSCREEN_STYLE: &str = "position: fixed; left: -999999px; top: -999999px";

pub struct ClipboardCopy {
    document: SharedDocument,
    clipboard: Arc<dyn Clipboard>,
    notifier: Arc<dyn Notifier>,
}

impl ClipboardCopy {
    pub fn new(
        document: SharedDocument,
        clipboard: Arc<dyn Clipboard>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            document,
            clipboard,
            notifier,
        }
    }

    /// Copy `text`, through the async clipboard when the page may use it and
    /// through a temporary textarea otherwise. Returns whether the copy worked.
    pub async fn copy_to_clipboard(&self, text: &str) -> bool {
        let result = if self.clipboard.async_api_available() {
            self.clipboard.write_text(text).await
        } else {
            self.legacy_copy(text)
        };

        match result {
            Ok(()) => {
                self.notifier.notify(COPIED_MESSAGE, NoticeKind::Success);
                true
            }
            Err(e) => {
                tracing::warn!("copy to clipboard failed: {:#}", e);
                self.notifier.notify(COPY_FAILED_MESSAGE, NoticeKind::Danger);
                false
            }
        }
    }

    fn legacy_copy(&self, text: &str) -> anyhow::Result<()> {
        let textarea = {
            let mut doc = dom::lock(&self.document);
            let textarea = doc.create_element("textarea", &[("style", OFFSCREEN_STYLE)]);
            doc.set_value(textarea, text);
            let body = doc.body();
            doc.append_child(body, textarea);
            doc.focus(textarea);
            textarea
        };

        let result = self.clipboard.exec_copy(text);
        dom::lock(&self.document).release(textarea);
        result
    }
}
