//! Persisted display preferences.
//!
//! The display locale is the only value the catalog keeps between runs. It
//! is stored under the `language` key of a small JSON object so other keys
//! written by other tools survive a save.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use coupon_codes_core::Locale;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

const LANGUAGE_KEY: &str = "language";

/// Errors reading or writing the preference file.
#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("preference file I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("preference file is not a JSON object: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// JSON file holding the preferences.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved locale, or English when nothing usable is saved.
    ///
    /// # Errors
    ///
    /// Returns error only when an existing file cannot be read or parsed.
    pub async fn load_locale(&self) -> Result<Locale, PreferenceError> {
        let entries = self.read().await?;
        let locale = match entries.get(LANGUAGE_KEY) {
            None => Locale::default(),
            Some(Value::String(code)) => code.parse().unwrap_or_else(|_| {
                warn!(value = %code, "Ignoring unknown saved language");
                Locale::default()
            }),
            Some(other) => {
                warn!(value = %other, "Ignoring non-text saved language");
                Locale::default()
            }
        };
        Ok(locale)
    }

    /// Persist the locale, keeping any other saved keys.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed or written.
    pub async fn save_locale(&self, locale: Locale) -> Result<(), PreferenceError> {
        let mut entries = self.read().await?;
        entries.insert(LANGUAGE_KEY.to_owned(), Value::from(locale.code()));
        let contents = serde_json::to_vec_pretty(&Value::Object(entries))?;
        tokio::fs::write(&self.path, contents).await?;
        debug!(path = %self.path.display(), locale = %locale, "Saved language");
        Ok(())
    }

    async fn read(&self) -> Result<Map<String, Value>, PreferenceError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }
}
