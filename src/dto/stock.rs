use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{display::StockBadge, entity::stock_sizes::Size, models::StockBySize};

#[derive(Debug, Serialize, ToSchema)]
pub struct StockRow {
    #[serde(flatten)]
    pub stock: StockBySize,
    pub product_name: String,
    pub badge: StockBadge,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct StockList {
    #[schema(value_type = Vec<StockRow>)]
    pub items: Vec<StockRow>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStockRequest {
    pub quantity: u32,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct SizeQuantity {
    pub size: Size,
    pub quantity: u32,
}

/// Inline editor payload: quantities for some or all sizes of one product.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SetProductStockRequest {
    pub quantities: Vec<SizeQuantity>,
}
