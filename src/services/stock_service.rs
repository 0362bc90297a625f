use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
    ActiveValue::NotSet,
};

use crate::{
    audit,
    display::size_stock_badge,
    dto::stock::{SetProductStockRequest, StockList, StockRow, UpdateStockRequest},
    entity::{
        categories::Entity as Categories,
        products::{Column as ProdCol, Entity as Products},
        stock_sizes::{self, ActiveModel, Column, Entity as StockSizes, Size},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::StockBySize,
    response::{ApiResponse, Meta},
    routes::params::StockListQuery,
    services::catalog_service::contains_insensitive,
    state::AppState,
};

/// Creates a zero-quantity row for every size the product is missing.
/// Returns how many rows were created.
pub async fn ensure_size_rows<C: ConnectionTrait>(conn: &C, product_id: i32) -> AppResult<usize> {
    let existing: Vec<Size> = StockSizes::find()
        .filter(Column::ProductId.eq(product_id))
        .all(conn)
        .await?
        .into_iter()
        .map(|row| row.size)
        .collect();

    let missing: Vec<ActiveModel> = Size::ALL
        .into_iter()
        .filter(|size| !existing.contains(size))
        .map(|size| ActiveModel {
            id: NotSet,
            product_id: Set(product_id),
            size: Set(size),
            quantity: Set(0),
        })
        .collect();

    let created = missing.len();
    if created > 0 {
        StockSizes::insert_many(missing).exec(conn).await?;
        tracing::debug!(product_id, created, "provisioned size rows");
    }
    Ok(created)
}

pub fn stock_row(stock: StockBySize, product_name: String) -> StockRow {
    StockRow {
        badge: size_stock_badge(stock.quantity),
        stock,
        product_name,
    }
}

pub async fn list_stock(
    state: &AppState,
    user: &AuthUser,
    query: StockListQuery,
) -> AppResult<ApiResponse<StockList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(search) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(contains_insensitive((Products, ProdCol::Name), search));
    }
    if let Some(category_id) = query.category_id {
        condition = condition.add(ProdCol::CategoryId.eq(category_id));
    }
    if let Some(size) = query.size {
        condition = condition.add(Column::Size.eq(size));
    }

    let finder = StockSizes::find()
        .join(JoinType::InnerJoin, stock_sizes::Relation::Products.def())
        .filter(condition)
        .order_by_asc(Column::ProductId)
        .order_by_asc(Column::Id);

    let total = finder.clone().count(&state.orm).await? as i64;

    let rows = finder
        .select_also(Products)
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let items = rows
        .into_iter()
        .map(|(stock, product)| {
            let name = product.map(|p| p.name).unwrap_or_default();
            stock_row(StockBySize::from(stock), name)
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Stock", StockList { items }, Some(meta)))
}

pub async fn update_stock(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateStockRequest,
) -> AppResult<ApiResponse<StockRow>> {
    ensure_admin(user)?;
    let quantity = i32::try_from(payload.quantity)
        .map_err(|_| AppError::BadRequest("quantity is too large".into()))?;

    let (existing, product) = StockSizes::find_by_id(id)
        .find_also_related(Products)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    active.quantity = Set(quantity);
    let updated = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "stock_update",
        "stock_sizes",
        serde_json::json!({ "stock_id": updated.id, "quantity": updated.quantity }),
    )
    .await;

    let name = product.map(|p| p.name).unwrap_or_default();
    Ok(ApiResponse::success(
        "Stock updated",
        stock_row(StockBySize::from(updated), name),
        Some(Meta::empty()),
    ))
}

/// Inline editor save: get-or-create the row for each listed size and set
/// its quantity, then fill in any size still missing.
pub async fn set_product_stock(
    state: &AppState,
    user: &AuthUser,
    product_id: i32,
    payload: SetProductStockRequest,
) -> AppResult<ApiResponse<StockList>> {
    ensure_admin(user)?;

    let (product, category) = Products::find_by_id(product_id)
        .find_also_related(Categories)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let sized = category.map(|c| c.kind.is_sized()).unwrap_or(false);
    if !sized {
        return Err(AppError::BadRequest(
            "stock by size is only tracked for sized categories".into(),
        ));
    }

    let txn = state.orm.begin().await?;
    for entry in &payload.quantities {
        let quantity = i32::try_from(entry.quantity)
            .map_err(|_| AppError::BadRequest("quantity is too large".into()))?;
        let existing = StockSizes::find()
            .filter(Column::ProductId.eq(product_id))
            .filter(Column::Size.eq(entry.size))
            .one(&txn)
            .await?;
        match existing {
            Some(row) => {
                let mut active: ActiveModel = row.into();
                active.quantity = Set(quantity);
                active.update(&txn).await?;
            }
            None => {
                ActiveModel {
                    id: NotSet,
                    product_id: Set(product_id),
                    size: Set(entry.size),
                    quantity: Set(quantity),
                }
                .insert(&txn)
                .await?;
            }
        }
    }
    ensure_size_rows(&txn, product_id).await?;
    txn.commit().await?;

    audit::record(
        &state.orm,
        user.user_id,
        "stock_set",
        "stock_sizes",
        serde_json::json!({ "product_id": product_id, "sizes": payload.quantities.len() }),
    )
    .await;

    let mut rows: Vec<StockBySize> = StockSizes::find()
        .filter(Column::ProductId.eq(product_id))
        .all(&state.orm)
        .await?
        .into_iter()
        .map(StockBySize::from)
        .collect();
    rows.sort_by_key(|row| row.size);

    let items: Vec<StockRow> = rows
        .into_iter()
        .map(|row| stock_row(row, product.name.clone()))
        .collect();
    let meta = Meta::total(items.len() as i64);
    Ok(ApiResponse::success("Stock updated", StockList { items }, Some(meta)))
}
