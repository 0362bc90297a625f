#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use sea_orm::{ColumnTrait, ConnectOptions, Database, EntityTrait, QueryFilter};
use serde_json::Value;
use tienda_online::{
    app,
    db::run_migrations,
    dto::{
        categories::CreateCategoryRequest,
        products::{CreateProductRequest, ProductDetail},
        stock::{SetProductStockRequest, SizeQuantity},
    },
    entity::{
        categories::CategoryKind,
        stock_sizes::Size,
        users::{Column as UserCol, Entity as Users},
    },
    middleware::auth::AuthUser,
    services::{auth_service, category_service, product_service, stock_service},
    state::AppState,
};
use tower::ServiceExt;

pub const JWT_SECRET: &str = "test-secret";
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Fresh in-memory database with the schema applied. A single pooled
/// connection keeps every query on the same SQLite memory database.
pub async fn setup_state() -> anyhow::Result<AppState> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let orm = Database::connect(options).await?;
    run_migrations(&orm).await?;
    Ok(AppState::new(orm, JWT_SECRET))
}

pub async fn admin(state: &AppState) -> anyhow::Result<AuthUser> {
    auth_service::ensure_superuser(&state.orm, ADMIN_USERNAME, "admin@tienda.cl", ADMIN_PASSWORD)
        .await?;
    let user = Users::find()
        .filter(UserCol::Username.eq(ADMIN_USERNAME))
        .one(&state.orm)
        .await?
        .ok_or_else(|| anyhow::anyhow!("admin missing"))?;
    Ok(AuthUser {
        user_id: user.id,
        role: user.role,
    })
}

pub async fn category(
    state: &AppState,
    admin: &AuthUser,
    name: &str,
    kind: CategoryKind,
) -> anyhow::Result<i32> {
    let resp = category_service::create_category(
        state,
        admin,
        CreateCategoryRequest {
            name: name.into(),
            kind,
            description: None,
            is_active: None,
            display_order: None,
        },
    )
    .await?;
    Ok(resp.data.expect("category").category.id)
}

pub fn new_product(name: &str, category_id: i32, price: i64) -> CreateProductRequest {
    CreateProductRequest {
        name: name.into(),
        slug: None,
        description: None,
        price,
        category_id,
        is_active: None,
        is_featured: None,
        pants_type: None,
        material: None,
        dimensions: None,
        accessory_stock: None,
    }
}

pub async fn product(
    state: &AppState,
    admin: &AuthUser,
    payload: CreateProductRequest,
) -> anyhow::Result<ProductDetail> {
    let resp = product_service::create_product(state, admin, payload).await?;
    Ok(resp.data.expect("product"))
}

pub async fn set_stock(
    state: &AppState,
    admin: &AuthUser,
    product_id: i32,
    quantities: &[(Size, u32)],
) -> anyhow::Result<()> {
    stock_service::set_product_stock(
        state,
        admin,
        product_id,
        SetProductStockRequest {
            quantities: quantities
                .iter()
                .map(|&(size, quantity)| SizeQuantity { size, quantity })
                .collect(),
        },
    )
    .await?;
    Ok(())
}

pub async fn get_json(
    router: Router,
    uri: &str,
    token: Option<&str>,
) -> anyhow::Result<(StatusCode, Value)> {
    let mut request = Request::builder().uri(uri);
    if let Some(token) = token {
        request = request.header(header::AUTHORIZATION, token);
    }
    send(router, request.body(Body::empty())?).await
}

pub async fn post_json(router: Router, uri: &str, body: Value) -> anyhow::Result<(StatusCode, Value)> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body)?))?;
    send(router, request).await
}

async fn send(router: Router, request: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
    let response = router.oneshot(request).await?;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes)?
    };
    Ok((status, body))
}

pub fn router(state: &AppState) -> Router {
    app(state.clone())
}
