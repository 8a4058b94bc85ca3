//! Content model shared by the store, the resolver and the API.
//!
//! Two storage shapes exist side by side:
//! - per-locale rows ([`LocalizedContentItem`]): one row per `(type, slug, locale)`
//! - multi-locale rows ([`AboutItem`]): one row per entity with a column per locale

use crate::i18n::Locale;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind}: '{value}'")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

// ==================== ContentType ====================

/// Kind of per-locale content, one store table each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    News,
    Projects,
    Services,
    Catalog,
}

impl ContentType {
    pub const ALL: [ContentType; 4] = [
        ContentType::News,
        ContentType::Projects,
        ContentType::Services,
        ContentType::Catalog,
    ];

    /// Store table holding rows of this type.
    pub fn table(&self) -> &'static str {
        match self {
            ContentType::News => "news",
            ContentType::Projects => "projects",
            ContentType::Services => "services",
            ContentType::Catalog => "catalog_products",
        }
    }

    /// URL segment under `/api`.
    pub fn segment(&self) -> &'static str {
        match self {
            ContentType::News => "news",
            ContentType::Projects => "projects",
            ContentType::Services => "services",
            ContentType::Catalog => "catalog",
        }
    }

    pub fn from_segment(segment: &str) -> Option<ContentType> {
        Self::ALL.into_iter().find(|ct| ct.segment() == segment)
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

// ==================== Status ====================

/// Publication status. Public readers only see `Published` unless previewing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Draft,
    Published,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Draft => "draft",
            Status::Published => "published",
        }
    }
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(Status::Draft),
            "published" => Ok(Status::Published),
            other => Err(ParseEnumError::new("status", other)),
        }
    }
}

// ==================== LocalizedContentItem ====================

/// One locale variant of a news post, project, service or catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalizedContentItem {
    pub id: i64,
    pub content_type: ContentType,
    pub slug: String,
    pub locale: Locale,
    pub status: Status,
    pub title: String,
    pub summary: Option<String>,
    /// Rich body as stored by the CMS editor (HTML)
    pub body: Option<String>,
    pub image_url: Option<String>,
    pub file_url: Option<String>,
    pub category_id: Option<i64>,
    pub sort_order: i32,
    pub is_featured: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LocalizedContentItem {
    pub fn is_published(&self) -> bool {
        self.status == Status::Published
    }
}

// ==================== Multi-locale items ====================

/// One optional value per locale, stored as sibling columns (`*_en`, `*_ru`, `*_kk`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub en: Option<String>,
    pub ru: Option<String>,
    pub kk: Option<String>,
}

impl LocalizedText {
    pub fn get(&self, locale: Locale) -> Option<&str> {
        match locale {
            Locale::En => self.en.as_deref(),
            Locale::Ru => self.ru.as_deref(),
            Locale::Kk => self.kk.as_deref(),
        }
    }

    pub fn slot_mut(&mut self, locale: Locale) -> &mut Option<String> {
        match locale {
            Locale::En => &mut self.en,
            Locale::Ru => &mut self.ru,
            Locale::Kk => &mut self.kk,
        }
    }

    /// Non-blank value for a locale, if any.
    pub fn non_blank(&self, locale: Locale) -> Option<&str> {
        self.get(locale).filter(|value| !value.trim().is_empty())
    }

    /// True when no locale carries a non-blank value.
    pub fn is_blank(&self) -> bool {
        Locale::ALL
            .into_iter()
            .all(|locale| self.non_blank(locale).is_none())
    }
}

/// Category of an "about" page entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AboutKind {
    Distribution,
    Certificate,
    License,
}

impl AboutKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AboutKind::Distribution => "distribution",
            AboutKind::Certificate => "certificate",
            AboutKind::License => "license",
        }
    }
}

impl fmt::Display for AboutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AboutKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "distribution" => Ok(AboutKind::Distribution),
            "certificate" => Ok(AboutKind::Certificate),
            "license" => Ok(AboutKind::License),
            _ => Err(ParseEnumError::new("about kind", s)),
        }
    }
}

/// Distribution partner, certificate or license shown on the about pages.
///
/// Writes do not require a title; items without any non-blank title variant
/// are stored but never displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AboutItem {
    pub id: i64,
    pub kind: AboutKind,
    pub title: LocalizedText,
    pub description: LocalizedText,
    pub file_url: Option<String>,
    pub image_url: Option<String>,
    pub sort_order: i32,
}

impl AboutItem {
    pub fn is_displayable(&self) -> bool {
        !self.title.is_blank()
    }
}
