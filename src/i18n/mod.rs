//! Internationalization (i18n) module for locale handling.
//!
//! # Architecture
//!
//! - `registry`: static metadata for every locale the site knows about
//! - `locale`: the `Locale` enum and code parsing
//! - `settings`: per-deployment default and enabled locales
//!
//! # Example
//!
//! ```rust,ignore
//! use marine_site::i18n::{Locale, LocaleSettings};
//!
//! let settings = LocaleSettings::parse("en", "en,ru,kk")?;
//! assert_eq!(settings.negotiate(Some("ru-RU")), Locale::Ru);
//! assert_eq!(settings.negotiate(Some("fr")), Locale::En);
//! ```

mod locale;
mod registry;
mod settings;

pub use locale::{Locale, LocaleError};
pub use registry::{LocaleInfo, LocaleRegistry};
pub use settings::LocaleSettings;
