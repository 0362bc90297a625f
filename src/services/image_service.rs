use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, JoinType, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Set, ActiveValue::NotSet,
};

use crate::{
    audit,
    dto::images::{CreateImageRequest, ImageList, UpdateImageRequest},
    entity::{
        product_images::{self, ActiveModel, Column, Entity as ProductImages},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::ProductImage,
    response::{ApiResponse, Meta},
    routes::params::ImageListQuery,
    state::AppState,
};

pub async fn list_images(
    state: &AppState,
    user: &AuthUser,
    query: ImageListQuery,
) -> AppResult<ApiResponse<ImageList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(is_primary) = query.is_primary {
        condition = condition.add(Column::IsPrimary.eq(is_primary));
    }
    if let Some(category_id) = query.category_id {
        condition = condition.add(ProdCol::CategoryId.eq(category_id));
    }

    let finder = ProductImages::find()
        .join(JoinType::InnerJoin, product_images::Relation::Products.def())
        .filter(condition)
        .order_by_asc(Column::ProductId)
        .order_by_asc(Column::DisplayOrder)
        .order_by_asc(Column::Id);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(ProductImage::from)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Images", ImageList { items }, Some(meta)))
}

pub async fn create_image(
    state: &AppState,
    user: &AuthUser,
    product_id: i32,
    payload: CreateImageRequest,
) -> AppResult<ApiResponse<ProductImage>> {
    ensure_admin(user)?;
    let url = payload.url.trim().to_string();
    if url.is_empty() {
        return Err(AppError::BadRequest("url must not be empty".into()));
    }
    Products::find_by_id(product_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let image = ActiveModel {
        id: NotSet,
        product_id: Set(product_id),
        url: Set(url),
        display_order: Set(payload.display_order.unwrap_or(0)),
        is_primary: Set(payload.is_primary.unwrap_or(false)),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    audit::record(
        &state.orm,
        user.user_id,
        "image_create",
        "product_images",
        serde_json::json!({ "image_id": image.id, "product_id": product_id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Image created",
        ProductImage::from(image),
        Some(Meta::empty()),
    ))
}

pub async fn update_image(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateImageRequest,
) -> AppResult<ApiResponse<ProductImage>> {
    ensure_admin(user)?;
    let existing = ProductImages::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    if let Some(url) = payload.url {
        let url = url.trim().to_string();
        if url.is_empty() {
            return Err(AppError::BadRequest("url must not be empty".into()));
        }
        active.url = Set(url);
    }
    if let Some(display_order) = payload.display_order {
        active.display_order = Set(display_order);
    }
    if let Some(is_primary) = payload.is_primary {
        active.is_primary = Set(is_primary);
    }
    let image = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "image_update",
        "product_images",
        serde_json::json!({ "image_id": image.id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Updated",
        ProductImage::from(image),
        Some(Meta::empty()),
    ))
}

pub async fn delete_image(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = ProductImages::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        user.user_id,
        "image_delete",
        "product_images",
        serde_json::json!({ "image_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}
