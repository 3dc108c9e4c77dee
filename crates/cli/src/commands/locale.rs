//! Saved display language.

use std::io::Write;

use coupon_codes_catalog::PreferenceStore;
use coupon_codes_core::Locale;
use tracing::info;

use super::CliError;

pub async fn show(preferences: &PreferenceStore) -> Result<(), CliError> {
    let locale = preferences.load_locale().await?;
    writeln!(std::io::stdout().lock(), "{locale}")?;
    Ok(())
}

pub async fn set(preferences: &PreferenceStore, locale: Locale) -> Result<(), CliError> {
    preferences.save_locale(locale).await?;
    info!(locale = %locale, path = %preferences.path().display(), "Language saved");
    writeln!(std::io::stdout().lock(), "{locale}")?;
    Ok(())
}

/// Switch between English and Arabic.
pub async fn toggle(preferences: &PreferenceStore) -> Result<(), CliError> {
    let locale = preferences.load_locale().await?.toggled();
    set(preferences, locale).await
}
