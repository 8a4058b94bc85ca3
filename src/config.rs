use crate::i18n::LocaleSettings;
use anyhow::{Context, Result};

#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_url: String,

    // Server
    pub port: u16,

    // Locales
    pub locales: LocaleSettings,

    // Pagination
    pub default_page_size: u32,
    pub max_page_size: u32,

    // Preview (optional shared token for draft access)
    pub preview_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let default_locale = std::env::var("DEFAULT_LOCALE").unwrap_or_else(|_| "en".to_string());
        let supported_locales =
            std::env::var("SUPPORTED_LOCALES").unwrap_or_else(|_| "en,ru,kk".to_string());
        let locales = LocaleSettings::parse(&default_locale, &supported_locales).with_context(|| {
            format!(
                "Invalid locale configuration (DEFAULT_LOCALE={default_locale}, SUPPORTED_LOCALES={supported_locales})"
            )
        })?;

        let max_page_size = std::env::var("MAX_PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&v: &u32| v > 0)
            .unwrap_or(100);

        let default_page_size = std::env::var("DEFAULT_PAGE_SIZE")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&v: &u32| v > 0)
            .unwrap_or(12)
            .min(max_page_size);

        Ok(Self {
            // Database
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL not set")?,

            // Server
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),

            locales,
            default_page_size,
            max_page_size,

            preview_token: std::env::var("PREVIEW_TOKEN")
                .ok()
                .filter(|token| !token.trim().is_empty()),
        })
    }

    /// Clamp a requested page size into `[1, max_page_size]`.
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_page_size)
            .clamp(1, self.max_page_size)
    }
}
