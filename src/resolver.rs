//! Locale resolution for per-locale content rows.
//!
//! A lookup first runs in the requested locale. When that yields nothing and
//! the requested locale is not the default, the same lookup runs once more in
//! the default locale. There is no caching and no retry: one or two store
//! queries per call.

use crate::content::{ContentType, LocalizedContentItem};
use crate::i18n::{Locale, LocaleSettings};
use crate::store::{ContentFilter, ContentStore, StoreError};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::debug;

/// List lookup parameters (everything except locale and visibility).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub category_id: Option<i64>,
    pub page: u32,
    pub page_size: u32,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            search: None,
            category_id: None,
            page: 1,
            page_size: 12,
        }
    }
}

/// What to look up: one item by slug, or a filtered page of items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Matcher {
    Slug(String),
    Filter(ListQuery),
}

impl Matcher {
    fn to_filter(&self, locale: Locale, published_only: bool) -> ContentFilter {
        match self {
            Matcher::Slug(slug) => ContentFilter::by_slug(locale, slug, published_only),
            Matcher::Filter(query) => ContentFilter {
                locale,
                slug: None,
                published_only,
                search: query
                    .search
                    .as_deref()
                    .map(str::trim)
                    .filter(|term| !term.is_empty())
                    .map(str::to_string),
                category_id: query.category_id,
                page: query.page.max(1),
                page_size: query.page_size.max(1),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Item(LocalizedContentItem),
    List(Vec<LocalizedContentItem>),
    NotFound,
}

impl Resolution {
    fn from_rows(matcher: &Matcher, mut rows: Vec<LocalizedContentItem>) -> Self {
        match matcher {
            Matcher::Slug(_) if rows.is_empty() => Resolution::NotFound,
            Matcher::Slug(_) => Resolution::Item(rows.swap_remove(0)),
            Matcher::Filter(_) => Resolution::List(rows),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            Resolution::Item(_) => false,
            Resolution::List(rows) => rows.is_empty(),
            Resolution::NotFound => true,
        }
    }
}

/// A resolved value together with where it came from.
///
/// `locale` is the locale of the returned content. For empty results it is
/// the requested locale and `used_fallback` is `false`.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved<T> {
    pub value: T,
    pub locale: Locale,
    pub used_fallback: bool,
}

/// Counters describing how lookups were satisfied.
#[derive(Debug, Default)]
pub struct FallbackMetrics {
    /// Lookups answered in the requested locale
    direct_hits: AtomicUsize,

    /// Lookups answered by the default-locale retry
    fallback_hits: AtomicUsize,

    /// Lookups with no content in either locale
    misses: AtomicUsize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FallbackSnapshot {
    pub direct_hits: usize,
    pub fallback_hits: usize,
    pub misses: usize,
    pub fallback_rate: f64,
}

impl FallbackMetrics {
    fn record(&self, resolution: &Resolution, used_fallback: bool) {
        let counter = if resolution.is_empty() {
            &self.misses
        } else if used_fallback {
            &self.fallback_hits
        } else {
            &self.direct_hits
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> FallbackSnapshot {
        let direct_hits = self.direct_hits.load(Ordering::Relaxed);
        let fallback_hits = self.fallback_hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let answered = direct_hits + fallback_hits;
        let fallback_rate = if answered == 0 {
            0.0
        } else {
            fallback_hits as f64 / answered as f64
        };

        FallbackSnapshot {
            direct_hits,
            fallback_hits,
            misses,
            fallback_rate,
        }
    }
}

/// Resolves content lookups with default-locale fallback.
#[derive(Clone)]
pub struct LocaleResolver {
    store: Arc<dyn ContentStore>,
    settings: LocaleSettings,
    metrics: Arc<FallbackMetrics>,
}

impl std::fmt::Debug for LocaleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocaleResolver")
            .field("settings", &self.settings)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

impl LocaleResolver {
    pub fn new(store: Arc<dyn ContentStore>, settings: LocaleSettings) -> Self {
        Self {
            store,
            settings,
            metrics: Arc::new(FallbackMetrics::default()),
        }
    }

    pub fn settings(&self) -> &LocaleSettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    pub fn metrics(&self) -> &FallbackMetrics {
        &self.metrics
    }

    /// Resolve `matcher` in `requested`, retrying once in the default locale.
    ///
    /// Drafts are visible only when `preview` is set. An empty outcome is
    /// `Resolution::NotFound` for slugs and an empty list for filters; store
    /// failures are returned as errors.
    pub async fn resolve(
        &self,
        content_type: ContentType,
        matcher: &Matcher,
        requested: Locale,
        preview: bool,
    ) -> Result<Resolved<Resolution>, StoreError> {
        let default = self.settings.default_locale();
        let filter = matcher.to_filter(requested, !preview);

        let rows = self.store.query(content_type, &filter).await?;
        let mut resolved = Resolved {
            value: Resolution::from_rows(matcher, rows),
            locale: requested,
            used_fallback: false,
        };

        if resolved.value.is_empty() && requested != default {
            debug!(
                "No {} content for {:?} in {}, retrying in {}",
                content_type, matcher, requested, default
            );
            let rows = self
                .store
                .query(content_type, &filter.with_locale(default))
                .await?;
            let fallback = Resolution::from_rows(matcher, rows);

            if !fallback.is_empty() {
                resolved = Resolved {
                    value: fallback,
                    locale: default,
                    used_fallback: true,
                };
            }
        }

        self.metrics.record(&resolved.value, resolved.used_fallback);
        Ok(resolved)
    }

    /// Single-item lookup by slug. `None` means not found in either locale.
    pub async fn find(
        &self,
        content_type: ContentType,
        slug: &str,
        requested: Locale,
        preview: bool,
    ) -> Result<Resolved<Option<LocalizedContentItem>>, StoreError> {
        let resolved = self
            .resolve(content_type, &Matcher::Slug(slug.to_string()), requested, preview)
            .await?;

        let value = match resolved.value {
            Resolution::Item(item) => Some(item),
            Resolution::List(_) | Resolution::NotFound => None,
        };
        Ok(Resolved {
            value,
            locale: resolved.locale,
            used_fallback: resolved.used_fallback,
        })
    }

    /// Filtered list lookup. An empty list is a normal outcome.
    pub async fn list(
        &self,
        content_type: ContentType,
        query: &ListQuery,
        requested: Locale,
        preview: bool,
    ) -> Result<Resolved<Vec<LocalizedContentItem>>, StoreError> {
        let resolved = self
            .resolve(content_type, &Matcher::Filter(query.clone()), requested, preview)
            .await?;

        let value = match resolved.value {
            Resolution::List(rows) => rows,
            Resolution::Item(item) => vec![item],
            Resolution::NotFound => Vec::new(),
        };
        Ok(Resolved {
            value,
            locale: resolved.locale,
            used_fallback: resolved.used_fallback,
        })
    }
}
