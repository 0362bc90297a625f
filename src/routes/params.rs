use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::entity::{categories::CategoryKind, stock_sizes::Size};

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// Deepest page an admin list will serve; keeps the offset far from overflow.
pub const MAX_PAGE: i64 = 100_000;

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).clamp(1, MAX_PAGE);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1).saturating_mul(per_page);
        (page, per_page, offset)
    }
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CategoryListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub q: Option<String>,
    pub kind: Option<CategoryKind>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ProductListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub q: Option<String>,
    pub category_id: Option<i32>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub pants_type: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StockListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub q: Option<String>,
    pub category_id: Option<i32>,
    pub size: Option<Size>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ImageListQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub is_primary: Option<bool>,
    pub category_id: Option<i32>,
}

macro_rules! paginated {
    ($($query:ty),*) => {
        $(impl $query {
            pub fn pagination(&self) -> Pagination {
                Pagination {
                    page: self.page,
                    per_page: self.per_page,
                }
            }
        })*
    };
}

paginated!(CategoryListQuery, ProductListQuery, StockListQuery, ImageListQuery);

/// Decoded storefront query string. Keys may repeat; single-valued lookups
/// take the last occurrence.
#[derive(Debug, Default)]
pub struct QueryPairs(Vec<(String, String)>);

impl QueryPairs {
    pub fn parse(raw: Option<&str>) -> Self {
        let pairs = raw
            .map(|query| url::form_urlencoded::parse(query.as_bytes()).into_owned().collect())
            .unwrap_or_default();
        Self(pairs)
    }

    pub fn last(&self, key: &str) -> Option<&str> {
        self.all(key).last()
    }

    pub fn all<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a str> {
        self.0
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn non_empty(&self, key: &str) -> Option<&str> {
        self.last(key).map(str::trim).filter(|v| !v.is_empty())
    }
}

/// Filters accepted by `/catalogo/`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogFilter {
    pub category_id: Option<i32>,
    pub size: Option<Size>,
    pub search: Option<String>,
}

impl CatalogFilter {
    pub fn from_query(pairs: &QueryPairs) -> Self {
        Self {
            category_id: pairs.non_empty("categoria").and_then(|v| v.parse().ok()),
            size: pairs.non_empty("talla").and_then(|v| v.parse().ok()),
            search: pairs.non_empty("q").map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategorySort {
    Name,
    PriceAsc,
    PriceDesc,
}

impl CategorySort {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "nombre" => Some(CategorySort::Name),
            "precio_asc" => Some(CategorySort::PriceAsc),
            "precio_desc" => Some(CategorySort::PriceDesc),
            _ => None,
        }
    }
}

/// Filters accepted by `/categoria/<id>/`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryFilter {
    pub sizes: Vec<Size>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub sort: Option<CategorySort>,
}

impl CategoryFilter {
    pub fn from_query(pairs: &QueryPairs) -> Self {
        let mut sizes: Vec<Size> = pairs
            .all("talla")
            .filter_map(|v| v.parse().ok())
            .collect();
        sizes.sort();
        sizes.dedup();
        Self {
            sizes,
            min_price: pairs
                .non_empty("precio_min")
                .and_then(|v| parse_price_bound(v, f64::ceil)),
            max_price: pairs
                .non_empty("precio_max")
                .and_then(|v| parse_price_bound(v, f64::floor)),
            sort: pairs.non_empty("orden").and_then(CategorySort::parse),
        }
    }
}

/// Prices are whole units, so a fractional bound is rounded towards the
/// inside of the range by `round`.
fn parse_price_bound(value: &str, round: fn(f64) -> f64) -> Option<i64> {
    if let Ok(whole) = value.parse::<i64>() {
        return Some(whole);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| round(v) as i64)
}
