//! # Preference Stores
//!
//! Persisted preferences, the headless counterpart of browser local storage.

use super::PreferenceStore;
use anyhow::Result;
use ini::Ini;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Section all storefront preferences live in
pub const PREFERENCES_SECTION: &str = "storefront";

/// INI-file backed preference store
pub struct IniPreferenceStore {
    path: PathBuf,
}

impl IniPreferenceStore {
    /// Create a store at `path`; `~` and environment variables are expanded
    pub fn new(path: &str) -> Self {
        let expanded = shellexpand::full(path)
            .map(|p| p.into_owned())
            .unwrap_or_else(|_| path.to_string());
        Self {
            path: PathBuf::from(expanded),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for IniPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        let ini = Ini::load_from_file(&self.path).ok()?;
        ini.section(Some(PREFERENCES_SECTION))?
            .get(key)
            .map(str::to_string)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut ini = Ini::load_from_file(&self.path).unwrap_or_default();
        ini.with_section(Some(PREFERENCES_SECTION)).set(key, value);
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        ini.write_to_file(&self.path)?;
        tracing::debug!("preference {}={} saved to {:?}", key, value, self.path);
        Ok(())
    }
}

/// In-memory preference store
#[derive(Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut values) = store.values.lock() {
            values.insert(key.to_string(), value.to_string());
        }
        store
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .map_err(|_| anyhow::anyhow!("preference store poisoned"))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
