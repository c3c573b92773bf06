use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool};
use ts_rs::TS;

const CATEGORY_COLUMNS: &str =
    "id, name, slug, description, icon, color, created_at, updated_at";

/// A product grouping. `slug` is what `Product::category` refers to.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
pub struct Category {
    #[ts(type = "number")]
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub icon: String,  // single emoji/glyph
    pub color: String, // free text, usually a hex colour
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct CreateCategory {
    pub name: String,
    /// Derived from `name` when absent or blank.
    pub slug: Option<String>,
    pub description: String,
    pub icon: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct UpdateCategory {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

impl Category {
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY id ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(pool)
        .await
    }

    pub async fn slug_exists(
        pool: &SqlitePool,
        slug: &str,
        excluding_id: Option<i64>,
    ) -> Result<bool, sqlx::Error> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM categories WHERE slug = $1 AND ($2 IS NULL OR id != $2)",
        )
        .bind(slug)
        .bind(excluding_id)
        .fetch_one(pool)
        .await?;
        Ok(count > 0)
    }

    /// Insert a category under an already-resolved `slug`.
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateCategory,
        slug: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Category>(&format!(
            r#"INSERT INTO categories (name, slug, description, icon, color)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING {CATEGORY_COLUMNS}"#
        ))
        .bind(&data.name)
        .bind(slug)
        .bind(&data.description)
        .bind(&data.icon)
        .bind(&data.color)
        .fetch_one(pool)
        .await
    }

    /// Apply the provided fields, leaving absent ones untouched.
    pub async fn update<'e, E>(
        executor: E,
        id: i64,
        data: &UpdateCategory,
    ) -> Result<Option<Self>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Category>(&format!(
            r#"UPDATE categories
               SET name        = COALESCE($2, name),
                   slug        = COALESCE($3, slug),
                   description = COALESCE($4, description),
                   icon        = COALESCE($5, icon),
                   color       = COALESCE($6, color),
                   updated_at  = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING {CATEGORY_COLUMNS}"#
        ))
        .bind(id)
        .bind(&data.name)
        .bind(&data.slug)
        .bind(&data.description)
        .bind(&data.icon)
        .bind(&data.color)
        .fetch_optional(executor)
        .await
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
