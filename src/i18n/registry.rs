//! Locale registry: single source of truth for per-locale metadata.
//!
//! The set of locales is fixed at compile time. Which of them a deployment
//! actually serves, and which one is the fallback, is decided by
//! [`LocaleSettings`](crate::i18n::LocaleSettings).

use crate::i18n::Locale;
use serde::Serialize;

/// Static metadata for a supported locale.
#[derive(Debug, Clone, Serialize)]
pub struct LocaleInfo {
    #[serde(skip)]
    pub locale: Locale,

    /// ISO 639-1 code (e.g., "en", "ru", "kk")
    pub code: &'static str,

    /// English name of the language
    pub name: &'static str,

    /// Native name of the language
    pub native_name: &'static str,
}

static LOCALES: [LocaleInfo; 3] = [
    LocaleInfo {
        locale: Locale::En,
        code: "en",
        name: "English",
        native_name: "English",
    },
    LocaleInfo {
        locale: Locale::Ru,
        code: "ru",
        name: "Russian",
        native_name: "Русский",
    },
    LocaleInfo {
        locale: Locale::Kk,
        code: "kk",
        name: "Kazakh",
        native_name: "Қазақша",
    },
];

/// Read-only registry of locale metadata.
#[derive(Debug)]
pub struct LocaleRegistry;

impl LocaleRegistry {
    /// Look up metadata by exact lowercase code.
    pub fn get_by_code(code: &str) -> Option<&'static LocaleInfo> {
        LOCALES.iter().find(|info| info.code == code)
    }

    /// Metadata for a locale. Every variant has an entry.
    pub fn info(locale: Locale) -> &'static LocaleInfo {
        match locale {
            Locale::En => &LOCALES[0],
            Locale::Ru => &LOCALES[1],
            Locale::Kk => &LOCALES[2],
        }
    }

    /// All known locales in preference order.
    pub fn list_all() -> &'static [LocaleInfo] {
        &LOCALES
    }
}
