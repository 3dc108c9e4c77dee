//! Category records and the catalog's category selection.

use serde::{Deserialize, Serialize};

use super::id::CategoryId;
use super::locale::Locale;
use crate::validation::{ValidationError, require};

/// A bilingual label used to group coupons.
///
/// Names are free text and never checked for uniqueness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name_en: String,
    pub name_ar: String,
}

impl Category {
    /// Label shown in the category picker.
    ///
    /// Uses the locale's name, or the other name when that one is empty.
    #[must_use]
    pub fn display_name(&self, locale: Locale) -> &str {
        locale.pick_or_fallback(&self.name_en, &self.name_ar)
    }
}

/// A validated category ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCategory {
    pub name_en: String,
    pub name_ar: String,
}

impl NewCategory {
    /// Validate both names.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingField`] if either name is empty or
    /// whitespace.
    pub fn new(name_en: &str, name_ar: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            name_en: require("name_en", name_en)?,
            name_ar: require("name_ar", name_ar)?,
        })
    }
}

/// Category selection of the public catalog.
///
/// A named selection holds the display string the shopper picked, not a
/// category ID.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CategoryFilter {
    #[default]
    All,
    Named(String),
}

impl CategoryFilter {
    /// Selection for a picked display string.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// The selected display string, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::All => None,
            Self::Named(name) => Some(name),
        }
    }
}
