//! Display locale.

use serde::{Deserialize, Serialize};

/// Language used to pick between the English and Arabic fields of a record.
///
/// Every display derivation takes a `Locale` argument; there is no global
/// "current language".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ar,
}

impl Locale {
    /// ISO 639-1 code, also the persisted preference value.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ar => "ar",
        }
    }

    /// The other supported locale.
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::En => Self::Ar,
            Self::Ar => Self::En,
        }
    }

    /// Whether text in this locale is laid out right-to-left.
    #[must_use]
    pub const fn is_rtl(self) -> bool {
        matches!(self, Self::Ar)
    }

    /// Pick the field matching this locale.
    #[must_use]
    pub const fn pick<'a>(self, en: &'a str, ar: &'a str) -> &'a str {
        match self {
            Self::En => en,
            Self::Ar => ar,
        }
    }

    /// Pick the field matching this locale, falling back to the other one
    /// when it is empty.
    #[must_use]
    pub fn pick_or_fallback<'a>(self, en: &'a str, ar: &'a str) -> &'a str {
        let (preferred, fallback) = match self {
            Self::En => (en, ar),
            Self::Ar => (ar, en),
        };
        if preferred.is_empty() {
            fallback
        } else {
            preferred
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "ar" => Ok(Self::Ar),
            other => Err(format!("unsupported locale: {other}")),
        }
    }
}
