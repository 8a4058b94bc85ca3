use crate::content::{
    AboutItem, AboutKind, ContentType, LocalizedContentItem, LocalizedText, Status,
};
use crate::i18n::Locale;
use crate::store::{escape_like, ContentFilter, ContentStore, StoreError};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};

const CONTENT_COLUMNS: &str = "id, slug, locale, status, title, summary, body, image_url, \
     file_url, category_id, sort_order, is_featured, published_at, created_at, updated_at";

const ABOUT_COLUMNS: &str = "id, kind, title_en, title_ru, title_kk, description_en, \
     description_ru, description_kk, file_url, image_url, sort_order";

#[derive(Debug, sqlx::FromRow)]
struct ContentRow {
    id: i64,
    slug: String,
    locale: String,
    status: String,
    title: String,
    summary: Option<String>,
    body: Option<String>,
    image_url: Option<String>,
    file_url: Option<String>,
    category_id: Option<i64>,
    sort_order: i32,
    is_featured: bool,
    published_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl ContentRow {
    fn into_item(self, content_type: ContentType) -> Result<LocalizedContentItem, StoreError> {
        let corrupt = |reason: String| StoreError::Corrupt {
            table: content_type.table(),
            id: self.id,
            reason,
        };
        let locale = Locale::from_code(&self.locale).map_err(|e| corrupt(e.to_string()))?;
        let status = self
            .status
            .parse::<Status>()
            .map_err(|e| corrupt(e.to_string()))?;

        Ok(LocalizedContentItem {
            id: self.id,
            content_type,
            slug: self.slug,
            locale,
            status,
            title: self.title,
            summary: self.summary,
            body: self.body,
            image_url: self.image_url,
            file_url: self.file_url,
            category_id: self.category_id,
            sort_order: self.sort_order,
            is_featured: self.is_featured,
            published_at: self.published_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AboutRow {
    id: i64,
    kind: String,
    title_en: Option<String>,
    title_ru: Option<String>,
    title_kk: Option<String>,
    description_en: Option<String>,
    description_ru: Option<String>,
    description_kk: Option<String>,
    file_url: Option<String>,
    image_url: Option<String>,
    sort_order: i32,
}

impl TryFrom<AboutRow> for AboutItem {
    type Error = StoreError;

    fn try_from(row: AboutRow) -> Result<Self, Self::Error> {
        let kind = row.kind.parse::<AboutKind>().map_err(|e| StoreError::Corrupt {
            table: "about_items",
            id: row.id,
            reason: e.to_string(),
        })?;

        Ok(AboutItem {
            id: row.id,
            kind,
            title: LocalizedText {
                en: row.title_en,
                ru: row.title_ru,
                kk: row.title_kk,
            },
            description: LocalizedText {
                en: row.description_en,
                ru: row.description_ru,
                kk: row.description_kk,
            },
            file_url: row.file_url,
            image_url: row.image_url,
            sort_order: row.sort_order,
        })
    }
}

/// Postgres-backed content store.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to Postgres and create tables if they don't exist yet
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;

        let db = Self { pool };
        db.init_schema().await?;
        Ok(db)
    }

    async fn init_schema(&self) -> Result<()> {
        for content_type in ContentType::ALL {
            let table = content_type.table();
            sqlx::query(&format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id BIGSERIAL PRIMARY KEY,
                    slug TEXT NOT NULL,
                    locale TEXT NOT NULL,
                    status TEXT NOT NULL DEFAULT 'draft'
                        CHECK (status IN ('draft', 'published')),
                    title TEXT NOT NULL,
                    summary TEXT,
                    body TEXT,
                    image_url TEXT,
                    file_url TEXT,
                    category_id BIGINT,
                    sort_order INTEGER NOT NULL DEFAULT 0,
                    is_featured BOOLEAN NOT NULL DEFAULT FALSE,
                    published_at TIMESTAMPTZ,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                    UNIQUE (slug, locale)
                )"
            ))
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to create {table} table"))?;

            sqlx::query(&format!(
                "CREATE INDEX IF NOT EXISTS {table}_locale_status_idx ON {table} (locale, status)"
            ))
            .execute(&self.pool)
            .await
            .with_context(|| format!("Failed to create index on {table}"))?;
        }

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS about_items (
                id BIGSERIAL PRIMARY KEY,
                kind TEXT NOT NULL
                    CHECK (kind IN ('distribution', 'certificate', 'license')),
                title_en TEXT,
                title_ru TEXT,
                title_kk TEXT,
                description_en TEXT,
                description_ru TEXT,
                description_kk TEXT,
                file_url TEXT,
                image_url TEXT,
                sort_order INTEGER NOT NULL DEFAULT 0
            )",
        )
        .execute(&self.pool)
        .await
        .context("Failed to create about_items table")?;

        info!("Database schema ready");
        Ok(())
    }

    /// Insert or update one locale variant, keyed by `(slug, locale)`.
    /// Returns the row id.
    pub async fn upsert_item(&self, item: &LocalizedContentItem) -> Result<i64> {
        let table = item.content_type.table();
        let id: i64 = sqlx::query_scalar(&format!(
            "INSERT INTO {table} (slug, locale, status, title, summary, body, image_url,
                 file_url, category_id, sort_order, is_featured, published_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             ON CONFLICT (slug, locale) DO UPDATE SET
                 status = EXCLUDED.status,
                 title = EXCLUDED.title,
                 summary = EXCLUDED.summary,
                 body = EXCLUDED.body,
                 image_url = EXCLUDED.image_url,
                 file_url = EXCLUDED.file_url,
                 category_id = EXCLUDED.category_id,
                 sort_order = EXCLUDED.sort_order,
                 is_featured = EXCLUDED.is_featured,
                 published_at = EXCLUDED.published_at,
                 updated_at = NOW()
             RETURNING id"
        ))
        .bind(&item.slug)
        .bind(item.locale.code())
        .bind(item.status.as_str())
        .bind(&item.title)
        .bind(&item.summary)
        .bind(&item.body)
        .bind(&item.image_url)
        .bind(&item.file_url)
        .bind(item.category_id)
        .bind(item.sort_order)
        .bind(item.is_featured)
        .bind(item.published_at)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("Failed to upsert {}/{} into {table}", item.slug, item.locale))?;

        Ok(id)
    }

    /// Insert a merged about item. The id is assigned by the database.
    pub async fn insert_about_item(&self, item: &AboutItem) -> Result<i64> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO about_items (kind, title_en, title_ru, title_kk, description_en,
                 description_ru, description_kk, file_url, image_url, sort_order)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING id",
        )
        .bind(item.kind.as_str())
        .bind(&item.title.en)
        .bind(&item.title.ru)
        .bind(&item.title.kk)
        .bind(&item.description.en)
        .bind(&item.description.ru)
        .bind(&item.description.kk)
        .bind(&item.file_url)
        .bind(&item.image_url)
        .bind(item.sort_order)
        .fetch_one(&self.pool)
        .await
        .context("Failed to insert about item")?;

        Ok(id)
    }
}

#[async_trait]
impl ContentStore for Database {
    async fn query(
        &self,
        content_type: ContentType,
        filter: &ContentFilter,
    ) -> Result<Vec<LocalizedContentItem>, StoreError> {
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
            "SELECT {CONTENT_COLUMNS} FROM {} WHERE locale = ",
            content_type.table()
        ));
        qb.push_bind(filter.locale.code());

        if filter.published_only {
            qb.push(" AND status = 'published'");
        }
        if let Some(slug) = &filter.slug {
            qb.push(" AND slug = ").push_bind(slug.clone());
        }
        if let Some(category_id) = filter.category_id {
            qb.push(" AND category_id = ").push_bind(category_id);
        }
        if let Some(term) = &filter.search {
            let pattern = format!("%{}%", escape_like(term));
            qb.push(" AND (title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR summary ILIKE ")
                .push_bind(pattern)
                .push(")");
        }

        qb.push(
            " ORDER BY is_featured DESC, sort_order ASC, \
             COALESCE(published_at, created_at) DESC, id DESC LIMIT ",
        )
        .push_bind(i64::from(filter.limit()))
        .push(" OFFSET ")
        .push_bind(i64::try_from(filter.offset()).unwrap_or(i64::MAX));

        let rows = qb
            .build_query_as::<ContentRow>()
            .fetch_all(&self.pool)
            .await?;

        debug!(
            "Query {} locale={} slug={:?} returned {} rows",
            content_type,
            filter.locale,
            filter.slug,
            rows.len()
        );

        rows.into_iter()
            .map(|row| row.into_item(content_type))
            .collect()
    }

    async fn about_items(&self, kind: Option<AboutKind>) -> Result<Vec<AboutItem>, StoreError> {
        let mut qb: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {ABOUT_COLUMNS} FROM about_items"));
        if let Some(kind) = kind {
            qb.push(" WHERE kind = ").push_bind(kind.as_str());
        }
        qb.push(" ORDER BY sort_order ASC, id ASC");

        let rows = qb
            .build_query_as::<AboutRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(AboutItem::try_from).collect()
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
