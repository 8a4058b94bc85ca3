//! Per-deployment locale settings: which locales are served and which one
//! content falls back to.

use crate::i18n::{Locale, LocaleError};

/// Locale configuration handed to the resolver and the API at construction.
///
/// Invariant: `default_locale` is always part of `enabled`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleSettings {
    default_locale: Locale,
    enabled: Vec<Locale>,
}

impl LocaleSettings {
    /// Build settings, validating that the default locale is enabled.
    ///
    /// `enabled` is normalized to preference order without duplicates.
    pub fn new(default_locale: Locale, enabled: &[Locale]) -> Result<Self, LocaleError> {
        if !enabled.contains(&default_locale) {
            return Err(LocaleError::Disabled(default_locale));
        }

        let enabled = Locale::ALL
            .into_iter()
            .filter(|locale| enabled.contains(locale))
            .collect();

        Ok(Self {
            default_locale,
            enabled,
        })
    }

    /// Parse settings from raw config values such as `"en"` and `"en,ru,kk"`.
    pub fn parse(default_code: &str, enabled_codes: &str) -> Result<Self, LocaleError> {
        let default_locale = Locale::from_code(default_code)?;
        let enabled = enabled_codes
            .split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(Locale::from_code)
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(default_locale, &enabled)
    }

    pub fn default_locale(&self) -> Locale {
        self.default_locale
    }

    pub fn enabled(&self) -> &[Locale] {
        &self.enabled
    }

    pub fn is_enabled(&self, locale: Locale) -> bool {
        self.enabled.contains(&locale)
    }

    /// Pick the locale to serve for a raw request value.
    ///
    /// Missing, unknown and disabled codes all resolve to the default locale.
    pub fn negotiate(&self, requested: Option<&str>) -> Locale {
        requested
            .and_then(|code| Locale::from_code(code).ok())
            .filter(|locale| self.is_enabled(*locale))
            .unwrap_or(self.default_locale)
    }
}

impl Default for LocaleSettings {
    fn default() -> Self {
        Self {
            default_locale: Locale::En,
            enabled: Locale::ALL.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== Construction Tests ====================

    #[test]
    fn test_default_settings() {
        let settings = LocaleSettings::default();
        assert_eq!(settings.default_locale(), Locale::En);
        assert_eq!(settings.enabled(), &Locale::ALL);
    }

    #[test]
    fn test_new_rejects_disabled_default() {
        let result = LocaleSettings::new(Locale::Kk, &[Locale::En, Locale::Ru]);
        assert_eq!(result.unwrap_err(), LocaleError::Disabled(Locale::Kk));
    }

    #[test]
    fn test_new_normalizes_order_and_duplicates() {
        let settings =
            LocaleSettings::new(Locale::Ru, &[Locale::Kk, Locale::Ru, Locale::Kk]).unwrap();
        assert_eq!(settings.enabled(), &[Locale::Ru, Locale::Kk]);
    }

    #[test]
    fn test_parse_from_config_values() {
        let settings = LocaleSettings::parse("ru", " en, ru ,kk,").unwrap();
        assert_eq!(settings.default_locale(), Locale::Ru);
        assert_eq!(settings.enabled().len(), 3);
    }

    #[test]
    fn test_parse_unknown_code_fails() {
        assert!(LocaleSettings::parse("en", "en,de").is_err());
        assert!(LocaleSettings::parse("de", "en").is_err());
    }

    // ==================== negotiate Tests ====================

    #[test]
    fn test_negotiate_enabled_locale() {
        let settings = LocaleSettings::default();
        assert_eq!(settings.negotiate(Some("kk")), Locale::Kk);
        assert_eq!(settings.negotiate(Some("ru-RU")), Locale::Ru);
    }

    #[test]
    fn test_negotiate_missing_or_unknown_uses_default() {
        let settings = LocaleSettings::default();
        assert_eq!(settings.negotiate(None), Locale::En);
        assert_eq!(settings.negotiate(Some("fr")), Locale::En);
        assert_eq!(settings.negotiate(Some("")), Locale::En);
    }

    #[test]
    fn test_negotiate_disabled_uses_default() {
        let settings = LocaleSettings::new(Locale::Ru, &[Locale::Ru, Locale::En]).unwrap();
        assert_eq!(settings.negotiate(Some("kk")), Locale::Ru);
    }
}
