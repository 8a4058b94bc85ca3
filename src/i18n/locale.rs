//! Locale type: the closed set of content languages served by the site.

use crate::i18n::{LocaleInfo, LocaleRegistry};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A content locale.
///
/// Every translatable record in the store is tagged with exactly one of these
/// (per-locale rows) or carries one column per variant (multi-locale rows).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    Ru,
    Kk,
}

/// Error returned when a locale code is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocaleError {
    #[error("Unknown locale code: '{0}'")]
    Unknown(String),

    #[error("Locale '{0}' is not enabled")]
    Disabled(Locale),
}

impl Locale {
    /// All locales in fixed preference order.
    ///
    /// This is the order used when every preferred variant of a field is
    /// empty and the localizer has to scan for any usable value.
    pub const ALL: [Locale; 3] = [Locale::En, Locale::Ru, Locale::Kk];

    /// Parse a locale code.
    ///
    /// Matching ignores case and surrounding whitespace, and a region suffix
    /// is dropped, so `"RU"`, `" ru "` and `"ru-RU"` all yield `Locale::Ru`.
    pub fn from_code(code: &str) -> Result<Locale, LocaleError> {
        let trimmed = code.trim();
        let primary = trimmed
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();

        LocaleRegistry::get_by_code(&primary)
            .map(|info| info.locale)
            .ok_or_else(|| LocaleError::Unknown(trimmed.to_string()))
    }

    /// Two-letter code used on the wire and as the column suffix.
    pub fn code(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Ru => "ru",
            Locale::Kk => "kk",
        }
    }

    /// Static metadata for this locale.
    pub fn info(&self) -> &'static LocaleInfo {
        LocaleRegistry::info(*self)
    }

    /// English name of the language (e.g., "Russian").
    pub fn name(&self) -> &'static str {
        self.info().name
    }

    /// Native name of the language (e.g., "Русский").
    pub fn native_name(&self) -> &'static str {
        self.info().native_name
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Locale::from_code(s)
    }
}
