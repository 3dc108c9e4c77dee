//! Command implementations.

pub mod admin;
pub mod browse;
pub mod locale;

use std::io::Write;

use coupon_codes_catalog::{
    AuthError, CatalogError, CatalogViewModel, ConfigError, CouponCard, PreferenceError,
    RemoteError,
};
use coupon_codes_core::{CategoryId, CouponForm, EmailError};
use thiserror::Error;

/// Errors that can end a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("Backend error: {0}")]
    Remote(#[from] RemoteError),

    #[error("Preference error: {0}")]
    Preferences(#[from] PreferenceError),

    #[error("Invalid admin email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Admin email or password not supplied.
    #[error("Missing admin {0}: pass --email or set COUPONS_ADMIN_EMAIL and COUPONS_ADMIN_PASSWORD")]
    MissingCredential(&'static str),

    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

impl CliError {
    /// Message printed for the person running the command.
    pub fn user_message(&self) -> String {
        match self {
            Self::Catalog(err) => err.user_message(),
            Self::Remote(_) => "Something went wrong. Please try again.".to_string(),
            Self::Preferences(_) => "Could not read or save your language preference.".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Where a new coupon's category labels come from.
pub enum CategoryChoice {
    /// Copy both names of a loaded category.
    Existing(String),
    /// Free-text labels.
    Labels { en: String, ar: String },
}

/// A coupon as entered on the command line.
pub struct CouponInput {
    pub title_en: String,
    pub title_ar: String,
    pub value_en: String,
    pub value_ar: String,
    pub code: String,
    pub logo_url: String,
    pub category: CategoryChoice,
}

/// Fill the catalog's coupon form from command-line input.
fn fill_form(catalog: &CatalogViewModel, input: CouponInput) -> Result<(), CliError> {
    let (category_en, category_ar) = match &input.category {
        CategoryChoice::Labels { en, ar } => (en.clone(), ar.clone()),
        CategoryChoice::Existing(_) => (String::new(), String::new()),
    };
    catalog.set_coupon_form(CouponForm {
        title_en: input.title_en,
        title_ar: input.title_ar,
        code_value_en: input.value_en,
        code_value_ar: input.value_ar,
        code: input.code,
        logo_url: input.logo_url,
        category_en,
        category_ar,
    });
    if let CategoryChoice::Existing(id) = input.category {
        catalog.choose_form_category(&CategoryId::new(id))?;
    }
    Ok(())
}

/// One coupon, one line.
fn write_card(out: &mut impl Write, card: &CouponCard) -> std::io::Result<()> {
    let order = card
        .order
        .map_or_else(|| "-".to_string(), |order| order.to_string());
    writeln!(
        out,
        "[{order:>3}] {title}  {code}  {value}  ({category})  {id}",
        title = card.title,
        code = card.code,
        value = card.code_value,
        category = card.category,
        id = card.id,
    )
}
