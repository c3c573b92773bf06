use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Executor, FromRow, Sqlite, SqlitePool, types::Json};
use ts_rs::TS;

const PRODUCT_COLUMNS: &str = "id, name, slug, category, description, images, video, featured, tags, created_at, updated_at";

#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, TS)]
pub struct Product {
    #[ts(type = "number")]
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub category: String, // Category::slug, validated on write
    pub description: String,
    /// Index 0 is the primary image. May be empty.
    #[sqlx(json)]
    pub images: Vec<String>,
    pub video: Option<String>,
    pub featured: bool,
    #[sqlx(json)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct CreateProduct {
    pub name: String,
    pub category: String,
    pub description: String,
    pub images: Vec<String>,
    pub video: Option<String>,
    pub featured: bool,
    pub tags: Vec<String>,
}

/// Partial update; `None` fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<String>>,
    pub video: Option<String>,
    pub featured: Option<bool>,
    pub tags: Option<Vec<String>>,
}

impl UpdateProduct {
    pub fn featured(featured: bool) -> Self {
        Self {
            featured: Some(featured),
            ..Default::default()
        }
    }
}

impl Product {
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }

    /// Every product, in store order (ascending id).
    pub async fn find_all(pool: &SqlitePool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id ASC"
        ))
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE slug = $1"
        ))
        .bind(slug)
        .fetch_optional(pool)
        .await
    }

    /// Slugs equal to `base` or of the form `base-<suffix>`, for disambiguation.
    pub async fn find_slugs_like(
        pool: &SqlitePool,
        base: &str,
        excluding_id: Option<i64>,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar::<_, String>(
            r#"SELECT slug FROM products
               WHERE (slug = $1 OR substr(slug, 1, length($1) + 1) = $1 || '-')
                 AND ($2 IS NULL OR id != $2)"#,
        )
        .bind(base)
        .bind(excluding_id)
        .fetch_all(pool)
        .await
    }

    pub async fn count_by_category(pool: &SqlitePool, category: &str) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM products WHERE category = $1")
            .bind(category)
            .fetch_one(pool)
            .await
    }

    /// Insert a product under an already-resolved `slug`.
    pub async fn create(
        pool: &SqlitePool,
        data: &CreateProduct,
        slug: &str,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            r#"INSERT INTO products (name, slug, category, description, images, video, featured, tags)
               VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
               RETURNING {PRODUCT_COLUMNS}"#
        ))
        .bind(&data.name)
        .bind(slug)
        .bind(&data.category)
        .bind(&data.description)
        .bind(Json(&data.images))
        .bind(&data.video)
        .bind(data.featured)
        .bind(Json(&data.tags))
        .fetch_one(pool)
        .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: i64,
        data: &UpdateProduct,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Product>(&format!(
            r#"UPDATE products
               SET name        = COALESCE($2, name),
                   slug        = COALESCE($3, slug),
                   category    = COALESCE($4, category),
                   description = COALESCE($5, description),
                   images      = COALESCE($6, images),
                   video       = COALESCE($7, video),
                   featured    = COALESCE($8, featured),
                   tags        = COALESCE($9, tags),
                   updated_at  = datetime('now', 'subsec')
               WHERE id = $1
               RETURNING {PRODUCT_COLUMNS}"#
        ))
        .bind(id)
        .bind(&data.name)
        .bind(&data.slug)
        .bind(&data.category)
        .bind(&data.description)
        .bind(data.images.as_ref().map(Json))
        .bind(&data.video)
        .bind(data.featured)
        .bind(data.tags.as_ref().map(Json))
        .fetch_optional(pool)
        .await
    }

    /// Point every product of category `from` at category `to`.
    pub async fn reassign_category<'e, E>(
        executor: E,
        from: &str,
        to: &str,
    ) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "UPDATE products SET category = $2, updated_at = datetime('now', 'subsec') WHERE category = $1",
        )
        .bind(from)
        .bind(to)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DBService;

    fn rose() -> CreateProduct {
        CreateProduct {
            name: "Mawar Merah".to_string(),
            category: "bunga".to_string(),
            description: "bunga segar".to_string(),
            images: vec!["https://cdn.example/mawar.jpg".to_string()],
            tags: vec!["valentine".to_string(), "romantis".to_string()],
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_round_trips_list_columns() {
        let db = DBService::new_in_memory().await.unwrap();
        let created = Product::create(&db.pool, &rose(), "mawar-merah").await.unwrap();

        let found = Product::find_by_slug(&db.pool, "mawar-merah")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, created);
        assert_eq!(found.tags, vec!["valentine", "romantis"]);
        assert_eq!(found.primary_image(), Some("https://cdn.example/mawar.jpg"));
        assert!(!found.featured);
    }

    #[tokio::test]
    async fn ids_increase_with_insertion() {
        let db = DBService::new_in_memory().await.unwrap();
        let first = Product::create(&db.pool, &rose(), "a").await.unwrap();
        let second = Product::create(&db.pool, &rose(), "b").await.unwrap();
        Product::delete(&db.pool, second.id).await.unwrap();
        let third = Product::create(&db.pool, &rose(), "c").await.unwrap();
        assert!(second.id > first.id);
        assert!(third.id > second.id);
    }

    #[tokio::test]
    async fn featured_only_update_keeps_other_fields() {
        let db = DBService::new_in_memory().await.unwrap();
        let created = Product::create(&db.pool, &rose(), "mawar-merah").await.unwrap();

        let updated = Product::update(&db.pool, created.id, &UpdateProduct::featured(true))
            .await
            .unwrap()
            .unwrap();

        assert!(updated.featured);
        assert_eq!(updated.name, created.name);
        assert_eq!(updated.images, created.images);
        assert_eq!(updated.tags, created.tags);
    }

    #[tokio::test]
    async fn update_of_missing_product_returns_none() {
        let db = DBService::new_in_memory().await.unwrap();
        let updated = Product::update(&db.pool, 42, &UpdateProduct::featured(true))
            .await
            .unwrap();
        assert!(updated.is_none());
    }

    #[tokio::test]
    async fn slug_lookup_matches_base_and_suffixes_only() {
        let db = DBService::new_in_memory().await.unwrap();
        Product::create(&db.pool, &rose(), "mawar").await.unwrap();
        Product::create(&db.pool, &rose(), "mawar-2").await.unwrap();
        Product::create(&db.pool, &rose(), "mawarku").await.unwrap();

        let mut slugs = Product::find_slugs_like(&db.pool, "mawar", None).await.unwrap();
        slugs.sort();
        assert_eq!(slugs, vec!["mawar", "mawar-2"]);
    }

    #[tokio::test]
    async fn reassign_moves_products_between_categories() {
        let db = DBService::new_in_memory().await.unwrap();
        Product::create(&db.pool, &rose(), "mawar").await.unwrap();

        let moved = Product::reassign_category(&db.pool, "bunga", "tanaman")
            .await
            .unwrap();
        assert_eq!(moved, 1);
        assert_eq!(Product::count_by_category(&db.pool, "bunga").await.unwrap(), 0);
        assert_eq!(Product::count_by_category(&db.pool, "tanaman").await.unwrap(), 1);
    }
}
