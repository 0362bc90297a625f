use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    DbErr, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
    ActiveValue::NotSet,
};

use crate::{
    audit,
    display::{format_price, primary_image, total_stock, total_stock_badge},
    dto::products::{
        CreateProductRequest, FieldGroup, ProductDetail, ProductList, ProductRow,
        UpdateProductRequest,
    },
    entity::{
        categories::{self, Entity as Categories},
        products::{ActiveModel, Column, Entity as Products, Model as ProductModel},
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin},
    models::{Category, Product},
    response::{ApiResponse, Meta},
    routes::params::ProductListQuery,
    services::{catalog_service::search_condition, loaders, stock_service},
    slug::slugify,
    state::AppState,
};

pub async fn list_products(
    state: &AppState,
    user: &AuthUser,
    query: ProductListQuery,
) -> AppResult<ApiResponse<ProductList>> {
    ensure_admin(user)?;
    let (page, limit, offset) = query.pagination().normalize();
    let mut condition = Condition::all();

    if let Some(search) = query.q.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        condition = condition.add(search_condition(search));
    }
    if let Some(category_id) = query.category_id {
        condition = condition.add(Column::CategoryId.eq(category_id));
    }
    if let Some(is_active) = query.is_active {
        condition = condition.add(Column::IsActive.eq(is_active));
    }
    if let Some(is_featured) = query.is_featured {
        condition = condition.add(Column::IsFeatured.eq(is_featured));
    }
    if let Some(pants_type) = query.pants_type.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Column::PantsType.eq(pants_type.clone()));
    }

    let finder = Products::find().filter(condition).order_by_desc(Column::Id);
    let total = finder.clone().count(&state.orm).await? as i64;

    let products = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?;

    let items = product_rows(&state.orm, products).await?;
    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Products", ProductList { items }, Some(meta)))
}

pub async fn get_product(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<ProductDetail>> {
    ensure_admin(user)?;
    let product = Products::find_by_id(id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;
    let detail = product_detail(&state.orm, product).await?;
    Ok(ApiResponse::success("Product", detail, Some(Meta::empty())))
}

pub async fn create_product(
    state: &AppState,
    user: &AuthUser,
    payload: CreateProductRequest,
) -> AppResult<ApiResponse<ProductDetail>> {
    ensure_admin(user)?;
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("name must not be empty".into()));
    }
    let slug = match payload.slug.as_deref().map(str::trim) {
        Some(slug) if !slug.is_empty() => slugify(slug),
        _ => slugify(&name),
    };
    let accessory_stock = stock_count(payload.accessory_stock.unwrap_or(0))?;

    let txn = state.orm.begin().await?;
    let category = find_category(&txn, payload.category_id).await?;
    ensure_slug_available(&txn, &slug, None).await?;

    let now = Utc::now();
    let product = ActiveModel {
        id: NotSet,
        name: Set(name),
        slug: Set(slug),
        description: Set(payload.description.unwrap_or_default()),
        price: Set(payload.price),
        category_id: Set(category.id),
        is_active: Set(payload.is_active.unwrap_or(true)),
        is_featured: Set(payload.is_featured.unwrap_or(false)),
        pants_type: Set(payload.pants_type),
        material: Set(payload.material),
        dimensions: Set(payload.dimensions),
        accessory_stock: Set(accessory_stock),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(&txn)
    .await
    .map_err(slug_conflict)?;

    if category.kind.is_sized() {
        stock_service::ensure_size_rows(&txn, product.id).await?;
    }
    txn.commit().await?;

    tracing::info!(product_id = product.id, slug = %product.slug, "product created");
    audit::record(
        &state.orm,
        user.user_id,
        "product_create",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    let detail = product_detail(&state.orm, product).await?;
    Ok(ApiResponse::success("Product created", detail, Some(Meta::empty())))
}

pub async fn update_product(
    state: &AppState,
    user: &AuthUser,
    id: i32,
    payload: UpdateProductRequest,
) -> AppResult<ApiResponse<ProductDetail>> {
    ensure_admin(user)?;

    let txn = state.orm.begin().await?;
    let existing = Products::find_by_id(id)
        .one(&txn)
        .await?
        .ok_or(AppError::NotFound)?;
    let category_id = payload.category_id.unwrap_or(existing.category_id);
    let category = find_category(&txn, category_id).await?;

    let mut active: ActiveModel = existing.into();
    if let Some(name) = payload.name {
        let name = name.trim().to_string();
        if name.is_empty() {
            return Err(AppError::BadRequest("name must not be empty".into()));
        }
        active.name = Set(name);
    }
    if let Some(slug) = payload.slug {
        let slug = slugify(&slug);
        ensure_slug_available(&txn, &slug, Some(id)).await?;
        active.slug = Set(slug);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if payload.category_id.is_some() {
        active.category_id = Set(category.id);
    }
    if let Some(is_active) = payload.is_active {
        active.is_active = Set(is_active);
    }
    if let Some(is_featured) = payload.is_featured {
        active.is_featured = Set(is_featured);
    }
    if let Some(pants_type) = payload.pants_type {
        active.pants_type = Set(Some(pants_type).filter(|s| !s.is_empty()));
    }
    if let Some(material) = payload.material {
        active.material = Set(Some(material).filter(|s| !s.is_empty()));
    }
    if let Some(dimensions) = payload.dimensions {
        active.dimensions = Set(Some(dimensions).filter(|s| !s.is_empty()));
    }
    if let Some(accessory_stock) = payload.accessory_stock {
        active.accessory_stock = Set(stock_count(accessory_stock)?);
    }
    active.updated_at = Set(Utc::now().into());

    let product = active.update(&txn).await.map_err(slug_conflict)?;
    if category.kind.is_sized() {
        stock_service::ensure_size_rows(&txn, product.id).await?;
    }
    txn.commit().await?;

    audit::record(
        &state.orm,
        user.user_id,
        "product_update",
        "products",
        serde_json::json!({ "product_id": product.id }),
    )
    .await;

    let detail = product_detail(&state.orm, product).await?;
    Ok(ApiResponse::success("Updated", detail, Some(Meta::empty())))
}

pub async fn delete_product(
    state: &AppState,
    user: &AuthUser,
    id: i32,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    let result = Products::delete_by_id(id).exec(&state.orm).await?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    audit::record(
        &state.orm,
        user.user_id,
        "product_delete",
        "products",
        serde_json::json!({ "product_id": id }),
    )
    .await;

    Ok(ApiResponse::success(
        "Deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

async fn find_category<C: ConnectionTrait>(conn: &C, id: i32) -> AppResult<categories::Model> {
    Categories::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| AppError::BadRequest(format!("category {id} does not exist")))
}

async fn ensure_slug_available<C: ConnectionTrait>(
    conn: &C,
    slug: &str,
    except: Option<i32>,
) -> AppResult<()> {
    if slug.is_empty() {
        return Err(AppError::BadRequest("slug must not be empty".into()));
    }
    let mut finder = Products::find().filter(Column::Slug.eq(slug));
    if let Some(id) = except {
        finder = finder.filter(Column::Id.ne(id));
    }
    if finder.one(conn).await?.is_some() {
        return Err(slug_taken());
    }
    Ok(())
}

fn slug_taken() -> AppError {
    AppError::BadRequest("Slug is already taken".into())
}

/// A concurrent save can claim the slug between the check and the write;
/// the unique index then rejects it.
fn slug_conflict(err: DbErr) -> AppError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => slug_taken(),
        _ => AppError::from(err),
    }
}

fn stock_count(value: u32) -> AppResult<i32> {
    i32::try_from(value).map_err(|_| AppError::BadRequest("stock is too large".into()))
}

async fn product_rows<C: ConnectionTrait>(
    conn: &C,
    products: Vec<ProductModel>,
) -> AppResult<Vec<ProductRow>> {
    let ids: Vec<i32> = products.iter().map(|p| p.id).collect();
    let categories = loaders::categories_by_id(conn, products.iter().map(|p| p.category_id)).await?;
    let stock = loaders::stock_by_product(conn, &ids).await?;
    let images = loaders::images_by_product(conn, &ids).await?;

    let rows = products
        .into_iter()
        .map(|product| {
            let category = categories.get(&product.category_id);
            let kind = category.map_or(categories::CategoryKind::Otro, |c| c.kind);
            let rows = stock.get(&product.id).map(Vec::as_slice).unwrap_or_default();
            let product_images = images.get(&product.id).map(Vec::as_slice).unwrap_or_default();
            let total = total_stock(kind, product.accessory_stock, rows);
            ProductRow {
                category_name: category.map(|c| c.name.clone()).unwrap_or_default(),
                formatted_price: format_price(product.price),
                total_stock: total,
                stock_badge: total_stock_badge(total),
                primary_image: primary_image(product_images).cloned(),
                product: Product::from(product),
            }
        })
        .collect();
    Ok(rows)
}

pub async fn product_detail<C: ConnectionTrait>(
    conn: &C,
    product: ProductModel,
) -> AppResult<ProductDetail> {
    let category = Categories::find_by_id(product.category_id)
        .one(conn)
        .await?
        .ok_or(AppError::NotFound)?;
    let sized = category.kind.is_sized();

    let rows = loaders::stock_by_product(conn, &[product.id])
        .await?
        .remove(&product.id)
        .unwrap_or_default();
    let images = loaders::images_by_product(conn, &[product.id])
        .await?
        .remove(&product.id)
        .unwrap_or_default();

    let total = total_stock(category.kind, product.accessory_stock, &rows);
    let stock = sized.then(|| {
        rows.into_iter()
            .map(|row| stock_service::stock_row(row, product.name.clone()))
            .collect()
    });

    Ok(ProductDetail {
        field_group: if sized {
            FieldGroup::Sized
        } else {
            FieldGroup::Accessory
        },
        formatted_price: format_price(product.price),
        total_stock: total,
        stock_badge: total_stock_badge(total),
        stock,
        primary_image: primary_image(&images).cloned(),
        images,
        product: Product::from(product),
        category: Category::from(category),
    })
}

#[cfg(test)]
mod tests {
    use sea_orm::{ConnectOptions, Database};

    use super::*;
    use crate::{db::run_migrations, entity::categories::CategoryKind};

    fn row(category_id: i32, slug: &str) -> ActiveModel {
        let now = Utc::now();
        ActiveModel {
            id: NotSet,
            name: Set("Polera".into()),
            slug: Set(slug.into()),
            description: Set(String::new()),
            price: Set(9990),
            category_id: Set(category_id),
            is_active: Set(true),
            is_featured: Set(false),
            pants_type: Set(None),
            material: Set(None),
            dimensions: Set(None),
            accessory_stock: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
    }

    #[tokio::test]
    async fn duplicate_slug_writes_become_bad_requests() -> anyhow::Result<()> {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).min_connections(1).sqlx_logging(false);
        let conn = Database::connect(options).await?;
        run_migrations(&conn).await?;

        let category = categories::ActiveModel {
            id: NotSet,
            name: Set("Poleras".into()),
            kind: Set(CategoryKind::Polera),
            description: Set(String::new()),
            is_active: Set(true),
            display_order: Set(0),
            created_at: Set(Utc::now().into()),
        }
        .insert(&conn)
        .await?;

        row(category.id, "polera-azul").insert(&conn).await?;
        let err = row(category.id, "polera-azul")
            .insert(&conn)
            .await
            .map_err(slug_conflict)
            .expect_err("unique index rejects the second row");
        assert!(
            matches!(&err, AppError::BadRequest(msg) if msg == "Slug is already taken"),
            "{err:?}"
        );

        let other = slug_conflict(DbErr::Custom("boom".into()));
        assert!(matches!(other, AppError::OrmError(_)));
        Ok(())
    }
}
