//! Catalog reads and admin mutations against the catalog store.
//!
//! Reads go through [`CatalogSnapshot`], an immutable copy of both
//! collections taken for a single request. Every admin mutation is followed by
//! a full re-fetch of the affected collection, returned as a [`Resynced`].

use std::collections::BTreeMap;

use db::models::{
    category::{Category, CreateCategory, UpdateCategory},
    product::{CreateProduct, Product, UpdateProduct},
};
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};
use ts_rs::TS;

use super::{
    catalog_query::{CatalogPage, CatalogQuery},
    slug::{derive_slug, disambiguate},
};

const RELATED_PRODUCTS_LIMIT: usize = 4;
const DEFAULT_CATEGORY_ICON: &str = "📦";
const DEFAULT_CATEGORY_COLOR: &str = "#d4a5a5";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("database error: {0}")]
    Database(sqlx::Error),
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
}

impl From<sqlx::Error> for CatalogError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                CatalogError::Conflict("slug is already in use".to_string())
            }
            _ => CatalogError::Database(err),
        }
    }
}

/// Both catalog collections as read for one request.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub products: Vec<Product>,
    pub categories: Vec<Category>,
}

/// A product together with up to four others from its category.
#[derive(Debug, Clone, Serialize, TS)]
pub struct ProductDetail {
    pub product: Product,
    pub category: Option<Category>,
    pub related: Vec<Product>,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct CategoryCount {
    pub slug: String,
    pub name: Option<String>,
    pub products: usize,
}

#[derive(Debug, Clone, Serialize, TS)]
pub struct CatalogStats {
    pub total_products: usize,
    pub featured_products: usize,
    pub total_categories: usize,
    /// One entry per category slug in use or defined, sorted by slug.
    pub per_category: Vec<CategoryCount>,
}

/// The outcome of a mutation plus the re-fetched collection it touched.
#[derive(Debug, Clone, Serialize, TS)]
pub struct Resynced<T> {
    pub item: Option<T>,
    pub collection: Vec<T>,
}

impl CatalogSnapshot {
    /// Fetch products and categories concurrently. Fails if either read fails.
    pub async fn load(pool: &SqlitePool) -> Result<Self, CatalogError> {
        let (products, categories) =
            tokio::try_join!(Product::find_all(pool), Category::find_all(pool))?;
        Ok(Self {
            products,
            categories,
        })
    }

    pub fn page(&self, query: &CatalogQuery) -> CatalogPage {
        CatalogPage::build(&self.products, query)
    }

    pub fn category(&self, slug: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.slug == slug)
    }

    /// `None` for an unknown slug; that is an ordinary "not found" page.
    pub fn product_detail(&self, slug: &str) -> Option<ProductDetail> {
        let product = self.products.iter().find(|p| p.slug == slug)?;
        let related = self
            .products
            .iter()
            .filter(|p| p.category == product.category && p.id != product.id)
            .take(RELATED_PRODUCTS_LIMIT)
            .cloned()
            .collect();
        Some(ProductDetail {
            product: product.clone(),
            category: self.category(&product.category).cloned(),
            related,
        })
    }

    pub fn stats(&self) -> CatalogStats {
        let mut per_category: BTreeMap<&str, CategoryCount> = self
            .categories
            .iter()
            .map(|c| {
                (
                    c.slug.as_str(),
                    CategoryCount {
                        slug: c.slug.clone(),
                        name: Some(c.name.clone()),
                        products: 0,
                    },
                )
            })
            .collect();
        for product in &self.products {
            per_category
                .entry(product.category.as_str())
                .or_insert_with(|| CategoryCount {
                    slug: product.category.clone(),
                    name: None,
                    products: 0,
                })
                .products += 1;
        }
        CatalogStats {
            total_products: self.products.len(),
            featured_products: self.products.iter().filter(|p| p.featured).count(),
            total_categories: self.categories.len(),
            per_category: per_category.into_values().collect(),
        }
    }
}

/// Admin mutations. Each call is one store round trip plus a re-fetch; there
/// is no retry and no write serialisation.
pub struct CatalogAdmin<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CatalogAdmin<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_product(
        &self,
        mut data: CreateProduct,
    ) -> Result<Resynced<Product>, CatalogError> {
        data.name = data.name.trim().to_string();
        if data.name.is_empty() {
            return Err(CatalogError::Validation("product name is required".to_string()));
        }
        if data.images.is_empty() {
            return Err(CatalogError::Validation(
                "at least one product image is required".to_string(),
            ));
        }
        self.ensure_category_exists(&data.category).await?;

        let slug = self.free_product_slug(&derive_slug(&data.name), None).await?;
        let product = Product::create(self.pool, &data, &slug).await?;
        info!(product_id = product.id, slug = %product.slug, "Product created");
        self.resync_products(Some(product)).await
    }

    pub async fn update_product(
        &self,
        id: i64,
        mut changes: UpdateProduct,
    ) -> Result<Resynced<Product>, CatalogError> {
        if let Some(name) = changes.name.as_mut() {
            *name = name.trim().to_string();
            if name.is_empty() {
                return Err(CatalogError::Validation("product name is required".to_string()));
            }
        }
        if let Some(category) = &changes.category {
            self.ensure_category_exists(category).await?;
        }
        if let Some(slug) = changes.slug.take() {
            let slug = derive_slug(slug.trim());
            if !slug.is_empty() {
                changes.slug = Some(self.free_product_slug(&slug, Some(id)).await?);
            }
        }

        let product = Product::update(self.pool, id, &changes)
            .await?
            .ok_or(CatalogError::NotFound("product"))?;
        info!(product_id = product.id, featured = product.featured, "Product updated");
        self.resync_products(Some(product)).await
    }

    pub async fn toggle_featured(&self, id: i64) -> Result<Resynced<Product>, CatalogError> {
        let current = Product::find_by_id(self.pool, id)
            .await?
            .ok_or(CatalogError::NotFound("product"))?;
        self.update_product(id, UpdateProduct::featured(!current.featured))
            .await
    }

    pub async fn delete_product(&self, id: i64) -> Result<Resynced<Product>, CatalogError> {
        if Product::delete(self.pool, id).await? == 0 {
            return Err(CatalogError::NotFound("product"));
        }
        info!(product_id = id, "Product deleted");
        self.resync_products(None).await
    }

    pub async fn create_category(
        &self,
        mut data: CreateCategory,
    ) -> Result<Resynced<Category>, CatalogError> {
        data.name = data.name.trim().to_string();
        if data.name.is_empty() {
            return Err(CatalogError::Validation("category name is required".to_string()));
        }
        if data.icon.trim().is_empty() {
            data.icon = DEFAULT_CATEGORY_ICON.to_string();
        }
        if data.color.trim().is_empty() {
            data.color = DEFAULT_CATEGORY_COLOR.to_string();
        }
        let slug = match data.slug.as_deref().map(str::trim) {
            Some(slug) if !slug.is_empty() => slug.to_string(),
            _ => derive_slug(&data.name),
        };
        if Category::slug_exists(self.pool, &slug, None).await? {
            return Err(CatalogError::Conflict(format!(
                "category slug '{slug}' is already in use"
            )));
        }

        let category = Category::create(self.pool, &data, &slug).await?;
        info!(category_id = category.id, slug = %category.slug, "Category created");
        self.resync_categories(Some(category)).await
    }

    /// Renaming a slug moves the category's products along with it.
    pub async fn update_category(
        &self,
        id: i64,
        mut changes: UpdateCategory,
    ) -> Result<Resynced<Category>, CatalogError> {
        if let Some(name) = changes.name.as_mut() {
            *name = name.trim().to_string();
            if name.is_empty() {
                return Err(CatalogError::Validation("category name is required".to_string()));
            }
        }
        let current = Category::find_by_id(self.pool, id)
            .await?
            .ok_or(CatalogError::NotFound("category"))?;

        let new_slug = changes
            .slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != current.slug)
            .map(str::to_string);
        changes.slug = new_slug.clone();
        if let Some(slug) = &new_slug
            && Category::slug_exists(self.pool, slug, Some(id)).await?
        {
            return Err(CatalogError::Conflict(format!(
                "category slug '{slug}' is already in use"
            )));
        }

        let mut tx = self.pool.begin().await?;
        let category = Category::update(&mut *tx, id, &changes)
            .await?
            .ok_or(CatalogError::NotFound("category"))?;
        if let Some(slug) = &new_slug {
            let moved = Product::reassign_category(&mut *tx, &current.slug, slug).await?;
            info!(from = %current.slug, to = %slug, moved, "Category slug renamed");
        }
        tx.commit().await?;

        info!(category_id = category.id, "Category updated");
        self.resync_categories(Some(category)).await
    }

    /// Refused while any product still belongs to the category.
    pub async fn delete_category(&self, id: i64) -> Result<Resynced<Category>, CatalogError> {
        let category = Category::find_by_id(self.pool, id)
            .await?
            .ok_or(CatalogError::NotFound("category"))?;
        let in_use = Product::count_by_category(self.pool, &category.slug).await?;
        if in_use > 0 {
            return Err(CatalogError::Conflict(format!(
                "category '{}' still has {in_use} product(s)",
                category.slug
            )));
        }

        Category::delete(self.pool, id).await?;
        info!(category_id = id, slug = %category.slug, "Category deleted");
        self.resync_categories(None).await
    }

    async fn ensure_category_exists(&self, slug: &str) -> Result<(), CatalogError> {
        if Category::find_by_slug(self.pool, slug).await?.is_none() {
            warn!(category = %slug, "Rejected product with unknown category");
            return Err(CatalogError::Validation(format!("unknown category '{slug}'")));
        }
        Ok(())
    }

    async fn free_product_slug(
        &self,
        base: &str,
        excluding_id: Option<i64>,
    ) -> Result<String, CatalogError> {
        if base.is_empty() {
            return Err(CatalogError::Validation("product slug cannot be empty".to_string()));
        }
        let taken = Product::find_slugs_like(self.pool, base, excluding_id).await?;
        Ok(disambiguate(base, &taken))
    }

    async fn resync_products(
        &self,
        item: Option<Product>,
    ) -> Result<Resynced<Product>, CatalogError> {
        Ok(Resynced {
            item,
            collection: Product::find_all(self.pool).await?,
        })
    }

    async fn resync_categories(
        &self,
        item: Option<Category>,
    ) -> Result<Resynced<Category>, CatalogError> {
        Ok(Resynced {
            item,
            collection: Category::find_all(self.pool).await?,
        })
    }
}
