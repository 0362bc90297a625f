use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entity::{
    categories::{self, CategoryKind},
    product_images, products,
    stock_sizes::{self, Size},
    users,
};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Category {
    pub id: i32,
    pub name: String,
    pub kind: CategoryKind,
    pub description: String,
    pub is_active: bool,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Product {
    pub id: i32,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub price: i64,
    pub category_id: i32,
    pub is_active: bool,
    pub is_featured: bool,
    pub pants_type: Option<String>,
    pub material: Option<String>,
    pub dimensions: Option<String>,
    pub accessory_stock: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct StockBySize {
    pub id: i32,
    pub product_id: i32,
    pub size: Size,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductImage {
    pub id: i32,
    pub product_id: i32,
    pub url: String,
    pub display_order: i32,
    pub is_primary: bool,
}

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            role: model.role,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            kind: model.kind,
            description: model.description,
            is_active: model.is_active,
            display_order: model.display_order,
            created_at: model.created_at.with_timezone(&Utc),
        }
    }
}

impl From<products::Model> for Product {
    fn from(model: products::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            slug: model.slug,
            description: model.description,
            price: model.price,
            category_id: model.category_id,
            is_active: model.is_active,
            is_featured: model.is_featured,
            pants_type: model.pants_type,
            material: model.material,
            dimensions: model.dimensions,
            accessory_stock: model.accessory_stock,
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<stock_sizes::Model> for StockBySize {
    fn from(model: stock_sizes::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            size: model.size,
            quantity: model.quantity,
        }
    }
}

impl From<product_images::Model> for ProductImage {
    fn from(model: product_images::Model) -> Self {
        Self {
            id: model.id,
            product_id: model.product_id,
            url: model.url,
            display_order: model.display_order,
            is_primary: model.is_primary,
        }
    }
}
