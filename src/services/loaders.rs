//! Batch loaders for the rows hanging off a page of products, one query per
//! relation instead of one per product.

use std::collections::HashMap;

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};

use crate::{
    entity::{
        categories::{self, Column as CatCol, Entity as Categories},
        product_images::{Column as ImageCol, Entity as ProductImages},
        stock_sizes::{Column as StockCol, Entity as StockSizes},
    },
    error::AppResult,
    models::{ProductImage, StockBySize},
};

pub async fn categories_by_id<C: ConnectionTrait>(
    conn: &C,
    ids: impl IntoIterator<Item = i32>,
) -> AppResult<HashMap<i32, categories::Model>> {
    let mut ids: Vec<i32> = ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = Categories::find()
        .filter(CatCol::Id.is_in(ids))
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(|c| (c.id, c)).collect())
}

/// Stock rows per product, each list ordered S, M, L, XL.
pub async fn stock_by_product<C: ConnectionTrait>(
    conn: &C,
    product_ids: &[i32],
) -> AppResult<HashMap<i32, Vec<StockBySize>>> {
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = StockSizes::find()
        .filter(StockCol::ProductId.is_in(product_ids.iter().copied()))
        .all(conn)
        .await?;

    let mut grouped: HashMap<i32, Vec<StockBySize>> = HashMap::new();
    for row in rows {
        grouped
            .entry(row.product_id)
            .or_default()
            .push(StockBySize::from(row));
    }
    for rows in grouped.values_mut() {
        rows.sort_by_key(|row| row.size);
    }
    Ok(grouped)
}

/// Images per product in display order.
pub async fn images_by_product<C: ConnectionTrait>(
    conn: &C,
    product_ids: &[i32],
) -> AppResult<HashMap<i32, Vec<ProductImage>>> {
    if product_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let rows = ProductImages::find()
        .filter(ImageCol::ProductId.is_in(product_ids.iter().copied()))
        .order_by_asc(ImageCol::DisplayOrder)
        .order_by_asc(ImageCol::Id)
        .all(conn)
        .await?;

    let mut grouped: HashMap<i32, Vec<ProductImage>> = HashMap::new();
    for row in rows {
        grouped
            .entry(row.product_id)
            .or_default()
            .push(ProductImage::from(row));
    }
    Ok(grouped)
}
