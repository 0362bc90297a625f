use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::ProductImage;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateImageRequest {
    pub url: String,
    pub display_order: Option<i32>,
    pub is_primary: Option<bool>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateImageRequest {
    pub url: Option<String>,
    pub display_order: Option<i32>,
    pub is_primary: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct ImageList {
    #[schema(value_type = Vec<ProductImage>)]
    pub items: Vec<ProductImage>,
}
