use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    display::StockBadge,
    entity::stock_sizes::Size,
    models::{Category, Product, ProductImage},
};

/// A product as listed on storefront pages.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductCard {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub price: i64,
    pub formatted_price: String,
    pub category_id: i32,
    pub is_featured: bool,
    pub total_stock: i64,
    pub primary_image: Option<ProductImage>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HomePage {
    pub products: Vec<ProductCard>,
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AboutPage {
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CatalogPage {
    pub products: Vec<ProductCard>,
    pub categories: Vec<Category>,
    pub selected_category: Option<i32>,
    pub selected_size: Option<Size>,
    pub search: Option<String>,
    pub sizes: Vec<Size>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SizeAvailability {
    pub size: Size,
    pub quantity: i32,
    pub badge: StockBadge,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductPage {
    pub product: Product,
    pub category: Category,
    pub formatted_price: String,
    pub primary_image: Option<ProductImage>,
    pub images: Vec<ProductImage>,
    /// Present only for sized categories.
    pub stock_by_size: Option<Vec<SizeAvailability>>,
    pub related: Vec<ProductCard>,
    pub categories: Vec<Category>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryPage {
    pub category: Category,
    pub products: Vec<ProductCard>,
    /// Present only for sized categories.
    pub sizes: Option<Vec<Size>>,
    pub selected_sizes: Vec<Size>,
    pub categories: Vec<Category>,
}
