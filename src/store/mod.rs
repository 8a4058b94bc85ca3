//! Content store capability consumed by the resolver and the API.
//!
//! The Postgres implementation lives in [`crate::db`]; [`MemoryContentStore`]
//! mirrors its filter and ordering semantics in process.

mod memory;

pub use memory::MemoryContentStore;

use crate::content::{AboutItem, AboutKind, ContentType, LocalizedContentItem};
use crate::i18n::Locale;
use async_trait::async_trait;
use std::cmp::Ordering;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt row {id} in {table}: {reason}")]
    Corrupt {
        table: &'static str,
        id: i64,
        reason: String,
    },

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Filters for a single store query.
///
/// `published_only = false` is preview mode: drafts are returned too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFilter {
    pub locale: Locale,
    pub slug: Option<String>,
    pub published_only: bool,
    pub search: Option<String>,
    pub category_id: Option<i64>,
    /// 1-based page number
    pub page: u32,
    pub page_size: u32,
}

impl ContentFilter {
    /// Filter for a single-item lookup by slug.
    pub fn by_slug(locale: Locale, slug: &str, published_only: bool) -> Self {
        Self {
            locale,
            slug: Some(slug.to_string()),
            published_only,
            search: None,
            category_id: None,
            page: 1,
            page_size: 1,
        }
    }

    /// Same filter, different locale. Used for the default-locale retry.
    pub fn with_locale(&self, locale: Locale) -> Self {
        Self {
            locale,
            ..self.clone()
        }
    }

    pub fn limit(&self) -> u32 {
        self.page_size.max(1)
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.max(1) - 1) * u64::from(self.limit())
    }
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Fetch rows of one content type matching `filter`, in listing order.
    async fn query(
        &self,
        content_type: ContentType,
        filter: &ContentFilter,
    ) -> Result<Vec<LocalizedContentItem>, StoreError>;

    /// Fetch multi-locale about items, optionally restricted to one kind,
    /// ordered by `sort_order` then `id`.
    async fn about_items(&self, kind: Option<AboutKind>) -> Result<Vec<AboutItem>, StoreError>;

    /// Cheap connectivity check for the health endpoint.
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Listing order: featured first, then `sort_order`, then newest, then highest id.
pub(crate) fn listing_order(a: &LocalizedContentItem, b: &LocalizedContentItem) -> Ordering {
    b.is_featured
        .cmp(&a.is_featured)
        .then(a.sort_order.cmp(&b.sort_order))
        .then_with(|| {
            let a_time = a.published_at.unwrap_or(a.created_at);
            let b_time = b.published_at.unwrap_or(b.created_at);
            b_time.cmp(&a_time)
        })
        .then(b.id.cmp(&a.id))
}

/// Escape `LIKE` metacharacters so a search term matches literally.
pub(crate) fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
