use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    display::StockBadge,
    dto::stock::StockRow,
    models::{Category, Product, ProductImage},
};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateProductRequest {
    pub name: String,
    /// Derived from `name` when omitted.
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: i64,
    pub category_id: i32,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub pants_type: Option<String>,
    pub material: Option<String>,
    pub dimensions: Option<String>,
    pub accessory_stock: Option<u32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub category_id: Option<i32>,
    pub is_active: Option<bool>,
    pub is_featured: Option<bool>,
    pub pants_type: Option<String>,
    pub material: Option<String>,
    pub dimensions: Option<String>,
    pub accessory_stock: Option<u32>,
}

/// Admin list row with the computed columns.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProductRow {
    #[serde(flatten)]
    pub product: Product,
    pub category_name: String,
    pub formatted_price: String,
    pub total_stock: i64,
    pub stock_badge: StockBadge,
    pub primary_image: Option<ProductImage>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ProductList {
    #[schema(value_type = Vec<ProductRow>)]
    pub items: Vec<ProductRow>,
}

/// Which set of type-specific fields the edit form shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FieldGroup {
    Sized,
    Accessory,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    pub product: Product,
    pub category: Category,
    pub field_group: FieldGroup,
    pub formatted_price: String,
    pub total_stock: i64,
    pub stock_badge: StockBadge,
    /// Present only for sized categories.
    pub stock: Option<Vec<StockRow>>,
    pub images: Vec<ProductImage>,
    pub primary_image: Option<ProductImage>,
}
