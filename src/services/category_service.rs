use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, ActiveValue::NotSet, sea_query::Expr,
};

use crate::{
    audit,
    dto::categories::{CategoryList, CategoryRow, CreateCategoryRequest, UpdateCategoryRequest},
    entity::{
        categories::{ActiveModel, Column, Entity as Categories, Model as CategoryModel},
        products::{Column as ProdCol, Entity as Products},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::Category,
    response::{ApiResponse, Meta},
    routes::params::CategoryListQuery,
    services::catalog_service::contains_insensitive,
    state::AppState,
};

pub async fn list_categories(
    state: &AppState,
    user: &AuthUser,
    query: CategoryListQuery,
) -> AppResult<ApiResponse<CategoryList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();

    let mut condition = Condition::all();
    if let Some(search) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(
            Condition::any()
                .add(contains_insensitive((Categories, Column::Name), search))
                .add(contains_insensitive((Categories, Column::Description), search)),
        );
    }
    if let Some(kind) = query.kind {
        condition = condition.add(Column::Kind.eq(kind));
    }
    if let Some(is_active) = query.is_active {
        condition = condition.add(Column::IsActive.eq(is_active));
    }

    let finder = Categories::find()
        .filter(condition)
        .order_by_asc(Column::DisplayOrder)
        .order_by_asc(Column::Name);
    let total = finder.clone().count(&state.orm).await? as i64;

    let categories = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let counts = product_counts(&state.orm, categories.iter().map(|c| c.id).collect()).await?;
    let items = categories
        .into_iter()
        .map(|category| CategoryRow {
            product_count: counts.get(&category.id).copied().unwrap_or(0),
            category: Category::from(category),
        })
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Categories", CategoryList { items }, Some(meta)))
}

pub async fn get_category(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<CategoryRow>> {
    ensure_admin(user)?;
    let category = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let row = category_row(&state.orm, category).await?;
    Ok(ApiResponse::success("Category", row, Some(Meta::empty())))
}

pub async fn create_category(
    state: &AppState,
    user: &AuthUser,
    payload: CreateCategoryRequest,
) -> AppResult<ApiResponse<CategoryRow>> {
    ensure_admin(user)?;
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }

    let category = ActiveModel {
        id: NotSet,
        name: Set(name),
        kind: Set(payload.kind),
        description: Set(payload.description.unwrap_or_default()),
        is_active: Set(payload.is_active.unwrap_or(true)),
        display_order: Set(payload.display_order.unwrap_or(0)),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;

    tracing::info!(category_id = category.id, name = %category.name, "category created");
    audit::record(
        &state.orm,
        user.user_id,
        "category_create",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    let row = category_row(&state.orm, category).await?;
    Ok(ApiResponse::success("Category created", row, Some(Meta::empty())))
}

pub async fn update_category(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateCategoryRequest,
) -> AppResult<ApiResponse<CategoryRow>> {
    ensure_admin(user)?;
    let existing = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("name must not be empty".into()));
        }
        active.name = Set(name);
    }
    if let Some(kind) = payload.kind {
        active.kind = Set(kind);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(display_order) = payload.display_order {
        active.display_order = Set(display_order);
    }

    let category = active.update(&state.orm).await?;

    audit::record(
        &state.orm,
        user.user_id,
        "category_update",
        "categories",
        serde_json::json!({ "category_id": category.id }),
    )
    .await;

    let row = category_row(&state.orm, category).await?;
    Ok(ApiResponse::success("Updated", row, Some(Meta::empty())))
}

pub async fn delete_category(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Categories::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        user.user_id,
        "category_delete",
        "categories",
        serde_json::json!({ "category_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn category_row<C: ConnectionTrait>(conn: &C, category: CategoryModel) -> AppResult<CategoryRow> {
    let counts = product_counts(conn, vec![category.id]).await?;
    Ok(CategoryRow {
        product_count: counts.get(&category.id).copied().unwrap_or(0),
        category: Category::from(category),
    })
}

/// Products per category, counting inactive ones too.
async fn product_counts<C: ConnectionTrait>(
    conn: &C,
    category_ids: Vec<i32>,
) -> AppResult<HashMap<i32, i64>> {
    if category_ids.is_empty() {
        return Ok(HashMap::new());
    }
    let counts: Vec<(i32, i64)> = Products::find()
        .select_only()
        .column(ProdCol::CategoryId)
        .column_as(Expr::col((Products, ProdCol::Id)).count(), "product_count")
        .filter(ProdCol::CategoryId.is_in(category_ids))
        .group_by(ProdCol::CategoryId)
        .into_tuple()
        .all(conn)
        .await?;
    Ok(counts.into_iter().collect())
}
