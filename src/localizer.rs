//! Field localization for multi-locale records.
//!
//! Priority for every field: requested locale, then the default locale, then
//! the first non-blank variant in [`Locale::ALL`] order, then `""`.

use crate::content::{AboutItem, AboutKind, LocalizedText};
use crate::i18n::Locale;
use serde::Serialize;

/// Pick the best available value of a field for `requested`.
pub fn localize_field(text: &LocalizedText, requested: Locale, default: Locale) -> String {
    [requested, default]
        .into_iter()
        .chain(Locale::ALL)
        .find_map(|locale| text.non_blank(locale))
        .unwrap_or_default()
        .to_string()
}

/// Locale the value returned by [`localize_field`] came from, if any.
pub fn source_locale(text: &LocalizedText, requested: Locale, default: Locale) -> Option<Locale> {
    [requested, default]
        .into_iter()
        .chain(Locale::ALL)
        .find(|locale| text.non_blank(*locale).is_some())
}

/// Flat, single-locale view of an [`AboutItem`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocalizedAboutItem {
    pub id: i64,
    pub kind: AboutKind,
    pub title: String,
    pub description: String,
    pub file_url: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: i32,
    /// True when the title came from a locale other than the requested one
    pub used_fallback: bool,
}

pub fn localize_about_item(item: &AboutItem, requested: Locale, default: Locale) -> LocalizedAboutItem {
    let used_fallback = source_locale(&item.title, requested, default) != Some(requested);

    LocalizedAboutItem {
        id: item.id,
        kind: item.kind,
        title: localize_field(&item.title, requested, default),
        description: localize_field(&item.description, requested, default),
        file_url: item.file_url.clone(),
        image_url: item.image_url.clone(),
        sort_order: item.sort_order,
        used_fallback,
    }
}
