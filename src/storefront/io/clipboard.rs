//! # Local Clipboard
//!
//! A process-local clipboard for headless sessions.

use super::Clipboard;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// Clipboard that keeps the last copied text in memory
pub struct LocalClipboard {
    secure_context: bool,
    contents: Mutex<Option<String>>,
}

impl LocalClipboard {
    /// `secure_context` mirrors whether the page was served over a secure origin
    pub fn new(secure_context: bool) -> Self {
        Self {
            secure_context,
            contents: Mutex::new(None),
        }
    }

    pub fn contents(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }

    fn store(&self, text: &str) -> Result<()> {
        *self
            .contents
            .lock()
            .map_err(|_| anyhow!("clipboard poisoned"))? = Some(text.to_string());
        Ok(())
    }
}

#[async_trait]
impl Clipboard for LocalClipboard {
    fn async_api_available(&self) -> bool {
        self.secure_context
    }

    async fn write_text(&self, text: &str) -> Result<()> {
        self.store(text)
    }

    fn exec_copy(&self, text: &str) -> Result<()> {
        self.store(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn both_copy_paths_should_store_text() {
        let clipboard = LocalClipboard::new(true);
        clipboard.write_text("ORDER-1").await.unwrap();
        assert_eq!(clipboard.contents().as_deref(), Some("ORDER-1"));

        clipboard.exec_copy("ORDER-2").unwrap();
        assert_eq!(clipboard.contents().as_deref(), Some("ORDER-2"));
    }
}
