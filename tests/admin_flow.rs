mod common;

use axum::http::StatusCode;
use chrono::Utc;
use common::{
    ADMIN_PASSWORD, ADMIN_USERNAME, admin, category, new_product, product, set_stock, setup_state,
};
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};
use serde_json::json;
use tienda_online::{
    dto::{auth::LoginRequest, products::UpdateProductRequest, stock::UpdateStockRequest},
    entity::{AuditLogs, Products, Users, categories::CategoryKind, stock_sizes::Size, users},
    error::AppError,
    middleware::auth::AuthUser,
    routes::params::{CategoryListQuery, MAX_PAGE, StockListQuery},
    services::{auth_service, category_service, product_service, stock_service},
};
use uuid::Uuid;

fn empty_update() -> UpdateProductRequest {
    UpdateProductRequest {
        name: None,
        slug: None,
        description: None,
        price: None,
        category_id: None,
        is_active: None,
        is_featured: None,
        pants_type: None,
        material: None,
        dimensions: None,
        accessory_stock: None,
    }
}

#[tokio::test]
async fn superuser_provisioning_is_idempotent() -> anyhow::Result<()> {
    let state = setup_state().await?;

    let created =
        auth_service::ensure_superuser(&state.orm, "root", "root@tienda.cl", "s3cret").await?;
    let again =
        auth_service::ensure_superuser(&state.orm, "root", "root@tienda.cl", "other").await?;

    assert!(created);
    assert!(!again);
    assert_eq!(Users::find().count(&state.orm).await?, 1);
    assert!(AuditLogs::find().count(&state.orm).await? >= 1);
    Ok(())
}

#[tokio::test]
async fn login_rejects_a_wrong_password() -> anyhow::Result<()> {
    let state = setup_state().await?;
    admin(&state).await?;

    let result = auth_service::login_user(
        &state,
        LoginRequest {
            username: ADMIN_USERNAME.into(),
            password: "nope".into(),
        },
    )
    .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
    Ok(())
}

#[tokio::test]
async fn admin_routes_require_an_admin_token() -> anyhow::Result<()> {
    let state = setup_state().await?;
    admin(&state).await?;
    let router = common::router(&state);

    let (status, body) = common::get_json(router.clone(), "/api/admin/categories", None).await?;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["data"]["code"], "unauthorized");

    let (status, body) = common::post_json(
        router.clone(),
        "/api/auth/login",
        json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }),
    )
    .await?;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().expect("token").to_string();
    assert!(token.starts_with("Bearer "));
    assert_eq!(body["data"]["username"], ADMIN_USERNAME);

    let (status, body) =
        common::get_json(router.clone(), "/api/admin/categories", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));

    users::ActiveModel {
        id: Set(Uuid::new_v4()),
        username: Set("cliente".into()),
        email: Set("cliente@tienda.cl".into()),
        password_hash: Set(auth_service::hash_password("cliente123")?),
        role: Set("user".into()),
        created_at: Set(Utc::now().into()),
    }
    .insert(&state.orm)
    .await?;
    let (_, body) = common::post_json(
        router.clone(),
        "/api/auth/login",
        json!({ "username": "cliente", "password": "cliente123" }),
    )
    .await?;
    let token = body["data"]["token"].as_str().expect("token").to_string();
    let (status, _) = common::get_json(router, "/api/admin/products", Some(&token)).await?;
    assert_eq!(status, StatusCode::FORBIDDEN);
    Ok(())
}

#[tokio::test]
async fn non_admins_cannot_call_admin_services() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let shopper = AuthUser {
        user_id: Uuid::new_v4(),
        role: "user".into(),
    };
    let result =
        category_service::list_categories(&state, &shopper, CategoryListQuery::default()).await;
    assert!(matches!(result, Err(AppError::Forbidden)));
    Ok(())
}

#[tokio::test]
async fn category_listing_counts_products() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = admin(&state).await?;
    let poleras = category(&state, &admin, "Poleras", CategoryKind::Polera).await?;
    category(&state, &admin, "Accesorios", CategoryKind::Accesorio).await?;

    product(&state, &admin, new_product("Polera 1", poleras, 1000)).await?;
    let mut hidden = new_product("Polera 2", poleras, 1000);
    hidden.is_active = Some(false);
    product(&state, &admin, hidden).await?;

    let list = category_service::list_categories(&state, &admin, CategoryListQuery::default())
        .await?
        .data
        .expect("categories");
    let counts: Vec<(&str, i64)> = list
        .items
        .iter()
        .map(|row| (row.category.name.as_str(), row.product_count))
        .collect();
    assert_eq!(counts, [("Accesorios", 0), ("Poleras", 2)]);
    Ok(())
}

#[tokio::test]
async fn slugs_are_derived_from_names_and_must_be_unique() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = admin(&state).await?;
    let pantalones = category(&state, &admin, "Pantalones", CategoryKind::Pantalon).await?;

    let detail = product(&state, &admin, new_product("Pantalón Cargo", pantalones, 24990)).await?;
    assert_eq!(detail.product.slug, "pantalon-cargo");
    assert_eq!(detail.formatted_price, "$24.990");

    let result =
        product_service::create_product(&state, &admin, new_product("Pantalon cargo", pantalones, 1))
            .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
    Ok(())
}

#[tokio::test]
async fn moving_a_product_into_a_sized_category_provisions_sizes() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = admin(&state).await?;
    let otros = category(&state, &admin, "Otros", CategoryKind::Otro).await?;
    let poleras = category(&state, &admin, "Poleras", CategoryKind::Polera).await?;

    let detail = product(&state, &admin, new_product("Polera suelta", otros, 1000)).await?;
    assert!(detail.stock.is_none());

    let mut update = empty_update();
    update.category_id = Some(poleras);
    let moved = product_service::update_product(&state, &admin, detail.product.id, update)
        .await?
        .data
        .expect("product");
    assert_eq!(moved.stock.map(|rows| rows.len()), Some(4));
    Ok(())
}

#[tokio::test]
async fn stock_editing_for_sized_products() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = admin(&state).await?;
    let poleras = category(&state, &admin, "Poleras", CategoryKind::Polera).await?;
    let accesorios = category(&state, &admin, "Accesorios", CategoryKind::Accesorio).await?;

    let shirt = product(&state, &admin, new_product("Polera", poleras, 1000)).await?;
    set_stock(&state, &admin, shirt.product.id, &[(Size::L, 12), (Size::S, 1)]).await?;

    let query = StockListQuery {
        size: Some(Size::L),
        ..Default::default()
    };
    let list = stock_service::list_stock(&state, &admin, query)
        .await?
        .data
        .expect("stock");
    assert_eq!(list.items.len(), 1);
    let row = &list.items[0];
    assert_eq!(row.product_name, "Polera");
    assert_eq!(row.stock.quantity, 12);
    assert_eq!(row.badge.label, "BUEN STOCK");

    let updated = stock_service::update_stock(
        &state,
        &admin,
        row.stock.id,
        UpdateStockRequest { quantity: 3 },
    )
    .await?
    .data
    .expect("stock row");
    assert_eq!(updated.stock.quantity, 3);
    assert_eq!(updated.badge.label, "POCO STOCK");

    let cap = product(&state, &admin, new_product("Jockey", accesorios, 1000)).await?;
    let result = stock_service::set_product_stock(
        &state,
        &admin,
        cap.product.id,
        tienda_online::dto::stock::SetProductStockRequest { quantities: vec![] },
    )
    .await;
    assert!(matches!(result, Err(AppError::BadRequest(_))));
    Ok(())
}

#[tokio::test]
async fn deleting_a_category_removes_its_products() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = admin(&state).await?;
    let poleras = category(&state, &admin, "Poleras", CategoryKind::Polera).await?;
    product(&state, &admin, new_product("Polera", poleras, 1000)).await?;

    category_service::delete_category(&state, &admin, poleras).await?;
    assert_eq!(Products::find().count(&state.orm).await?, 0);

    let again = category_service::delete_category(&state, &admin, poleras).await;
    assert!(matches!(again, Err(AppError::NotFound)));
    Ok(())
}

#[tokio::test]
async fn out_of_range_pages_return_an_empty_listing() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = admin(&state).await?;
    let otros = category(&state, &admin, "Otros", CategoryKind::Otro).await?;
    product(&state, &admin, new_product("Llavero", otros, 1990)).await?;

    let router = common::router(&state);
    let (_, body) = common::post_json(
        router.clone(),
        "/api/auth/login",
        json!({ "username": ADMIN_USERNAME, "password": ADMIN_PASSWORD }),
    )
    .await?;
    let token = body["data"]["token"].as_str().expect("token").to_string();

    for resource in ["categories", "products", "stock", "images"] {
        let uri = format!("/api/admin/{resource}?page={}&per_page=50", i64::MAX);
        let (status, body) = common::get_json(router.clone(), &uri, Some(&token)).await?;
        assert_eq!(status, StatusCode::OK, "{resource}");
        assert_eq!(body["data"], json!([]), "{resource}");
        assert_eq!(body["meta"]["page"], json!(MAX_PAGE), "{resource}");
    }
    Ok(())
}
