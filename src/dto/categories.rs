use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{entity::categories::CategoryKind, models::Category};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategoryRequest {
    pub name: String,
    pub kind: CategoryKind,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub display_order: Option<i32>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateCategoryRequest {
    pub name: Option<String>,
    pub kind: Option<CategoryKind>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub display_order: Option<i32>,
}

/// Admin list row: the category plus how many products it owns.
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryRow {
    #[serde(flatten)]
    pub category: Category,
    pub product_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct CategoryList {
    #[schema(value_type = Vec<CategoryRow>)]
    pub items: Vec<CategoryRow>,
}
