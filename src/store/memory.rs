use super::{listing_order, ContentFilter, ContentStore, StoreError};
use crate::content::{AboutItem, AboutKind, ContentType, LocalizedContentItem};
use async_trait::async_trait;
use std::sync::RwLock;

/// In-process content store with the same semantics as the Postgres store.
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    items: RwLock<Vec<LocalizedContentItem>>,
    about: RwLock<Vec<AboutItem>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the row with the same `(content_type, slug, locale)`.
    pub fn insert(&self, item: LocalizedContentItem) -> Result<(), StoreError> {
        let mut items = self.items.write().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        items.retain(|existing| {
            !(existing.content_type == item.content_type
                && existing.slug == item.slug
                && existing.locale == item.locale)
        });
        items.push(item);
        Ok(())
    }

    pub fn insert_about(&self, item: AboutItem) -> Result<(), StoreError> {
        let mut about = self.about.write().map_err(|e| StoreError::Unavailable(e.to_string()))?;
        about.retain(|existing| existing.id != item.id);
        about.push(item);
        Ok(())
    }
}

fn matches(item: &LocalizedContentItem, content_type: ContentType, filter: &ContentFilter) -> bool {
    if item.content_type != content_type || item.locale != filter.locale {
        return false;
    }
    if filter.published_only && !item.is_published() {
        return false;
    }
    if let Some(slug) = &filter.slug {
        if &item.slug != slug {
            return false;
        }
    }
    if let Some(category_id) = filter.category_id {
        if item.category_id != Some(category_id) {
            return false;
        }
    }
    if let Some(term) = &filter.search {
        let term = term.to_lowercase();
        let in_title = item.title.to_lowercase().contains(&term);
        let in_summary = item
            .summary
            .as_deref()
            .is_some_and(|summary| summary.to_lowercase().contains(&term));
        if !in_title && !in_summary {
            return false;
        }
    }
    true
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn query(
        &self,
        content_type: ContentType,
        filter: &ContentFilter,
    ) -> Result<Vec<LocalizedContentItem>, StoreError> {
        let items = self.items.read().map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let mut rows: Vec<_> = items
            .iter()
            .filter(|item| matches(item, content_type, filter))
            .cloned()
            .collect();
        rows.sort_by(listing_order);

        let offset = usize::try_from(filter.offset()).unwrap_or(usize::MAX);
        Ok(rows
            .into_iter()
            .skip(offset)
            .take(filter.limit() as usize)
            .collect())
    }

    async fn about_items(&self, kind: Option<AboutKind>) -> Result<Vec<AboutItem>, StoreError> {
        let about = self.about.read().map_err(|e| StoreError::Unavailable(e.to_string()))?;

        let mut rows: Vec<_> = about
            .iter()
            .filter(|item| kind.map_or(true, |k| item.kind == k))
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then(a.id.cmp(&b.id)));
        Ok(rows)
    }
}
