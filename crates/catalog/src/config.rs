//! Catalog configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `FIREBASE_API_KEY` - Firebase web API key
//! - `FIREBASE_PROJECT_ID` - Firebase project ID (e.g., coupon-codes-prod)
//!
//! ## Optional
//! - `FIRESTORE_DATABASE` - Firestore database ID (default: `(default)`)
//! - `FIRESTORE_BASE_URL` - Firestore REST endpoint (default: `https://firestore.googleapis.com`)
//! - `FIREBASE_AUTH_BASE_URL` - Identity Toolkit endpoint (default: `https://identitytoolkit.googleapis.com`)
//! - `COUPONS_PREFERENCES_PATH` - Locale preference file (default: `.coupon-codes.json`)
//! - `COUPONS_ADMIN_EMAIL` - Admin email for dashboard commands
//! - `COUPONS_ADMIN_PASSWORD` - Admin password for dashboard commands

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_DATABASE: &str = "(default)";
const DEFAULT_FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com";
const DEFAULT_AUTH_BASE_URL: &str = "https://identitytoolkit.googleapis.com";
const DEFAULT_PREFERENCES_PATH: &str = ".coupon-codes.json";

/// Firebase project IDs: 6-30 chars of lowercase letters, digits and hyphens.
const MIN_PROJECT_ID_LENGTH: usize = 6;
const MAX_PROJECT_ID_LENGTH: usize = 30;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Top-level catalog configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub firebase: FirebaseConfig,
    /// Where the display locale is persisted.
    pub preferences_path: PathBuf,
    /// Admin email for non-interactive sign-in.
    pub admin_email: Option<String>,
    /// Admin password for non-interactive sign-in (redacted in Debug output)
    pub admin_password: Option<SecretString>,
}

/// Firebase project connection settings.
#[derive(Debug, Clone)]
pub struct FirebaseConfig {
    /// Web API key (redacted in Debug output)
    pub api_key: SecretString,
    pub project_id: String,
    pub database_id: String,
    pub firestore_base_url: String,
    pub auth_base_url: String,
}

impl CatalogConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        Ok(Self {
            firebase: FirebaseConfig::from_env()?,
            preferences_path: Self::preferences_path_from_env(),
            admin_email: get_optional_env("COUPONS_ADMIN_EMAIL"),
            admin_password: get_optional_env("COUPONS_ADMIN_PASSWORD").map(SecretString::from),
        })
    }

    /// Preference file location alone; needs no Firebase settings.
    #[must_use]
    pub fn preferences_path_from_env() -> PathBuf {
        PathBuf::from(get_env_or_default(
            "COUPONS_PREFERENCES_PATH",
            DEFAULT_PREFERENCES_PATH,
        ))
    }
}

impl FirebaseConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let project_id = get_required_env("FIREBASE_PROJECT_ID")?;
        validate_project_id(&project_id)
            .map_err(|e| ConfigError::InvalidEnvVar("FIREBASE_PROJECT_ID".to_string(), e))?;

        Ok(Self {
            api_key: get_required_secret("FIREBASE_API_KEY")?,
            project_id,
            database_id: get_env_or_default("FIRESTORE_DATABASE", DEFAULT_DATABASE),
            firestore_base_url: get_env_or_default("FIRESTORE_BASE_URL", DEFAULT_FIRESTORE_BASE_URL),
            auth_base_url: get_env_or_default("FIREBASE_AUTH_BASE_URL", DEFAULT_AUTH_BASE_URL),
        })
    }

    /// Root of the document tree for this project and database.
    #[must_use]
    pub fn documents_url(&self) -> String {
        format!(
            "{}/v1/projects/{}/databases/{}/documents",
            self.firestore_base_url.trim_end_matches('/'),
            self.project_id,
            self.database_id
        )
    }

    /// Identity Toolkit password sign-in endpoint (without the key).
    #[must_use]
    pub fn sign_in_url(&self) -> String {
        format!(
            "{}/v1/accounts:signInWithPassword",
            self.auth_base_url.trim_end_matches('/')
        )
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get an optional environment variable, treating empty as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

fn validate_project_id(project_id: &str) -> Result<(), String> {
    let len = project_id.len();
    if !(MIN_PROJECT_ID_LENGTH..=MAX_PROJECT_ID_LENGTH).contains(&len) {
        return Err(format!(
            "must be {MIN_PROJECT_ID_LENGTH}-{MAX_PROJECT_ID_LENGTH} characters, got {len}"
        ));
    }
    if !project_id
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err("only lowercase letters, digits and hyphens are allowed".to_string());
    }
    if project_id.starts_with('-') || project_id.ends_with('-') {
        return Err("cannot start or end with a hyphen".to_string());
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn firebase() -> FirebaseConfig {
        FirebaseConfig {
            api_key: SecretString::from("AIzaSyD-super-secret-value"),
            project_id: "coupon-codes-prod".to_string(),
            database_id: DEFAULT_DATABASE.to_string(),
            firestore_base_url: "http://localhost:8080/".to_string(),
            auth_base_url: DEFAULT_AUTH_BASE_URL.to_string(),
        }
    }

    #[test]
    fn test_documents_url() {
        assert_eq!(
            firebase().documents_url(),
            "http://localhost:8080/v1/projects/coupon-codes-prod/databases/(default)/documents"
        );
    }

    #[test]
    fn test_sign_in_url() {
        assert_eq!(
            firebase().sign_in_url(),
            "https://identitytoolkit.googleapis.com/v1/accounts:signInWithPassword"
        );
    }

    #[test]
    fn test_validate_project_id() {
        assert!(validate_project_id("coupon-codes-prod").is_ok());
        assert!(validate_project_id("short").is_err());
        assert!(validate_project_id("Coupon-Codes").is_err());
        assert!(validate_project_id("-coupons-").is_err());
        assert!(validate_project_id(&"a".repeat(31)).is_err());
    }

    #[test]
    fn test_firebase_config_debug_redacts_api_key() {
        let debug_output = format!("{:?}", firebase());
        assert!(debug_output.contains("coupon-codes-prod"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret-value"));
    }

    #[test]
    fn test_catalog_config_debug_redacts_password() {
        let config = CatalogConfig {
            firebase: firebase(),
            preferences_path: PathBuf::from(DEFAULT_PREFERENCES_PATH),
            admin_email: Some("admin@example.com".to_string()),
            admin_password: Some(SecretString::from("hunter2-password")),
        };
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("admin@example.com"));
        assert!(debug_output.contains(".coupon-codes.json"));
        assert!(!debug_output.contains("hunter2-password"));
    }
}
