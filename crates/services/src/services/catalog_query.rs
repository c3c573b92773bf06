//! Filtering and ordering of the product catalog.
//!
//! Everything here is pure: the same products and query always produce the
//! same ordered result, so it can be re-run on every keystroke.

use std::{cmp::Ordering, str::FromStr};

use db::models::product::Product;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use ts_rs::TS;
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Category selector. `"all"` disables the category stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Slug(String),
}

impl CategoryFilter {
    pub const ALL: &'static str = "all";

    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None | Some(Self::ALL) => CategoryFilter::All,
            Some(slug) => CategoryFilter::Slug(slug.to_string()),
        }
    }
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS, EnumString, Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum SortKey {
    /// Highest id first.
    #[default]
    Newest,
    #[strum(to_string = "name_asc", serialize = "nameasc", serialize = "name-asc")]
    NameAsc,
    #[strum(to_string = "name_desc", serialize = "namedesc", serialize = "name-desc")]
    NameDesc,
}

impl SortKey {
    /// Unrecognised or missing input falls back to [`SortKey::Newest`].
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        raw.and_then(|s| SortKey::from_str(s.trim()).ok())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub search_term: String,
    pub category: CategoryFilter,
    pub sort: SortKey,
    pub featured_only: bool,
}

/// Raw query-string form of [`CatalogQuery`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogQueryParams {
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort: Option<String>,
    pub featured: Option<bool>,
}

impl From<CatalogQueryParams> for CatalogQuery {
    fn from(params: CatalogQueryParams) -> Self {
        Self {
            search_term: params.search.unwrap_or_default(),
            category: CategoryFilter::parse(params.category.as_deref()),
            sort: SortKey::parse_lenient(params.sort.as_deref()),
            featured_only: params.featured.unwrap_or(false),
        }
    }
}

impl CatalogQuery {
    pub fn featured() -> Self {
        Self {
            featured_only: true,
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: CategoryFilter) -> Self {
        self.category = category;
        self
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    pub fn with_sort(mut self, sort: SortKey) -> Self {
        self.sort = sort;
        self
    }

    /// Run the featured, category, search and sort stages in that order.
    pub fn apply<'a>(&self, products: &'a [Product]) -> Vec<&'a Product> {
        let needle = self.search_term.to_lowercase();
        let mut result: Vec<&Product> = products
            .iter()
            .filter(|p| !self.featured_only || p.featured)
            .filter(|p| match &self.category {
                CategoryFilter::All => true,
                CategoryFilter::Slug(slug) => p.category == *slug,
            })
            .filter(|p| needle.is_empty() || matches_search(p, &needle))
            .collect();

        // sort_by is stable: equal keys keep their input order.
        match self.sort {
            SortKey::NameAsc => result.sort_by(|a, b| locale_cmp(&a.name, &b.name)),
            SortKey::NameDesc => result.sort_by(|a, b| locale_cmp(&b.name, &a.name)),
            SortKey::Newest => result.sort_by(|a, b| b.id.cmp(&a.id)),
        }
        result
    }
}

/// `needle` must already be lowercase.
fn matches_search(product: &Product, needle: &str) -> bool {
    product.name.to_lowercase().contains(needle)
        || product.description.to_lowercase().contains(needle)
        || product
            .tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(needle))
}

/// Accent- and case-insensitive ordering. Ties go to the unaccented form,
/// then to the lowercase form.
fn locale_cmp(a: &str, b: &str) -> Ordering {
    collation_key(a)
        .cmp(&collation_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| b.cmp(a))
}

/// NFD with combining marks dropped, lowercased: `"Édelweiss"` -> `"edelweiss"`.
fn collation_key(name: &str) -> String {
    name.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// One page of catalog results plus the counters shown next to it.
#[derive(Debug, Clone, Serialize, TS)]
pub struct CatalogPage {
    pub products: Vec<Product>,
    /// Size of the unfiltered catalog.
    pub total: usize,
    pub featured_total: usize,
}

impl CatalogPage {
    pub fn build(products: &[Product], query: &CatalogQuery) -> Self {
        Self {
            products: query.apply(products).into_iter().cloned().collect(),
            total: products.len(),
            featured_total: products.iter().filter(|p| p.featured).count(),
        }
    }
}
