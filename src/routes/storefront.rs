use axum::{
    Json, Router,
    extract::{Path, RawQuery, State},
    routing::get,
};

use crate::{
    dto::storefront::{AboutPage, CatalogPage, CategoryPage, HomePage, ProductPage},
    error::{AppError, AppResult},
    response::ApiResponse,
    routes::params::{CatalogFilter, CategoryFilter, QueryPairs},
    services::catalog_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/nosotros/", get(about))
        .route("/catalogo/", get(catalog))
        .route("/producto/{slug}/", get(product_detail))
        .route("/categoria/{id}/", get(category_detail))
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Featured products and active categories", body = ApiResponse<HomePage>)
    ),
    tag = "Storefront"
)]
pub async fn home(State(state): State<AppState>) -> AppResult<Json<ApiResponse<HomePage>>> {
    let resp = catalog_service::home_page(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/nosotros/",
    responses(
        (status = 200, description = "About page", body = ApiResponse<AboutPage>)
    ),
    tag = "Storefront"
)]
pub async fn about(State(state): State<AppState>) -> AppResult<Json<ApiResponse<AboutPage>>> {
    let resp = catalog_service::about_page(&state).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/catalogo/",
    params(
        ("categoria" = Option<i32>, Query, description = "Category id"),
        ("talla" = Option<String>, Query, description = "Size with stock: S, M, L, XL"),
        ("q" = Option<String>, Query, description = "Search in name or description"),
    ),
    responses(
        (status = 200, description = "Filtered catalog", body = ApiResponse<CatalogPage>)
    ),
    tag = "Storefront"
)]
pub async fn catalog(
    State(state): State<AppState>,
    RawQuery(raw): RawQuery,
) -> AppResult<Json<ApiResponse<CatalogPage>>> {
    let filter = CatalogFilter::from_query(&QueryPairs::parse(raw.as_deref()));
    let resp = catalog_service::catalog_page(&state, filter).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/producto/{slug}/",
    params(
        ("slug" = String, Path, description = "Product slug")
    ),
    responses(
        (status = 200, description = "Active product with images and stock", body = ApiResponse<ProductPage>),
        (status = 404, description = "Product missing or inactive"),
    ),
    tag = "Storefront"
)]
pub async fn product_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<ApiResponse<ProductPage>>> {
    let resp = catalog_service::product_page(&state, &slug).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/categoria/{id}/",
    params(
        ("id" = i32, Path, description = "Category id"),
        ("talla" = Option<Vec<String>>, Query, description = "Repeatable size filter, sized categories only"),
        ("precio_min" = Option<i64>, Query, description = "Inclusive lower price bound"),
        ("precio_max" = Option<i64>, Query, description = "Inclusive upper price bound"),
        ("orden" = Option<String>, Query, description = "nombre, precio_asc or precio_desc"),
    ),
    responses(
        (status = 200, description = "Products of an active category", body = ApiResponse<CategoryPage>),
        (status = 404, description = "Category missing or inactive"),
    ),
    tag = "Storefront"
)]
pub async fn category_detail(
    State(state): State<AppState>,
    Path(id): Path<String>,
    RawQuery(raw): RawQuery,
) -> AppResult<Json<ApiResponse<CategoryPage>>> {
    let id: i32 = id.parse().map_err(|_| AppError::NotFound)?;
    let filter = CategoryFilter::from_query(&QueryPairs::parse(raw.as_deref()));
    let resp = catalog_service::category_page(&state, id, filter).await?;
    Ok(Json(resp))
}
