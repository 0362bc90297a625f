mod common;

use axum::http::StatusCode;
use common::{admin, category, new_product, product, set_stock, setup_state};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use tienda_online::{
    dto::{
        categories::CreateCategoryRequest, images::CreateImageRequest,
        products::UpdateProductRequest, storefront::ProductCard,
    },
    entity::{
        categories::CategoryKind,
        stock_sizes::{Column as StockCol, Entity as StockSizes, Size},
    },
    error::AppError,
    routes::params::{CatalogFilter, CategoryFilter, CategorySort, QueryPairs},
    services::{catalog_service, category_service, image_service, product_service},
};

fn names(cards: &[ProductCard]) -> Vec<&str> {
    cards.iter().map(|c| c.name.as_str()).collect()
}

fn category_filter(raw: &str) -> CategoryFilter {
    CategoryFilter::from_query(&QueryPairs::parse(Some(raw)))
}

fn catalog_filter(raw: &str) -> CatalogFilter {
    CatalogFilter::from_query(&QueryPairs::parse(Some(raw)))
}

#[tokio::test]
async fn saving_a_sized_product_provisions_every_size_once() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = admin(&state).await?;
    let poleras = category(&state, &admin, "Poleras", CategoryKind::Polera).await?;

    let detail = product(&state, &admin, new_product("Polera Azul", poleras, 9990)).await?;
    let sizes: Vec<Size> = detail
        .stock
        .as_ref()
        .expect("sized products expose stock")
        .iter()
        .map(|row| row.stock.size)
        .collect();
    assert_eq!(sizes, Size::ALL.to_vec());
    assert!(detail.stock.iter().flatten().all(|row| row.stock.quantity == 0));

    set_stock(&state, &admin, detail.product.id, &[(Size::M, 3)]).await?;
    product_service::update_product(
        &state,
        &admin,
        detail.product.id,
        UpdateProductRequest {
            name: None,
            slug: None,
            description: Some("Algodon".into()),
            price: None,
            category_id: None,
            is_active: None,
            is_featured: None,
            pants_type: None,
            material: None,
            dimensions: None,
            accessory_stock: None,
        },
    )
    .await?;

    let rows = StockSizes::find()
        .filter(StockCol::ProductId.eq(detail.product.id))
        .all(&state.orm)
        .await?;
    assert_eq!(rows.len(), 4);
    let medium = rows.iter().find(|r| r.size == Size::M).expect("M row");
    assert_eq!(medium.quantity, 3);
    Ok(())
}

#[tokio::test]
async fn accessories_have_no_size_rows() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = admin(&state).await?;
    let accesorios = category(&state, &admin, "Accesorios", CategoryKind::Accesorio).await?;

    let mut payload = new_product("Gorro", accesorios, 4990);
    payload.accessory_stock = Some(7);
    let detail = product(&state, &admin, payload).await?;

    assert!(detail.stock.is_none());
    assert_eq!(detail.total_stock, 7);
    let count = StockSizes::find()
        .filter(StockCol::ProductId.eq(detail.product.id))
        .count(&state.orm)
        .await?;
    assert_eq!(count, 0);
    Ok(())
}

#[tokio::test]
async fn total_stock_follows_the_category_kind() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = admin(&state).await?;
    let poleras = category(&state, &admin, "Poleras", CategoryKind::Polera).await?;
    let accesorios = category(&state, &admin, "Accesorios", CategoryKind::Accesorio).await?;

    let mut shirt = new_product("Polera", poleras, 9990);
    shirt.accessory_stock = Some(50);
    let shirt = product(&state, &admin, shirt).await?;
    set_stock(&state, &admin, shirt.product.id, &[(Size::S, 2), (Size::M, 3)]).await?;

    let mut cap = new_product("Jockey", accesorios, 5990);
    cap.accessory_stock = Some(7);
    product(&state, &admin, cap).await?;

    let page = catalog_service::catalog_page(&state, CatalogFilter::default()).await?;
    let cards = page.data.expect("catalog");
    let stock_of = |name: &str| {
        cards
            .products
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.total_stock)
    };
    assert_eq!(stock_of("Polera"), Some(5));
    assert_eq!(stock_of("Jockey"), Some(7));
    Ok(())
}

#[tokio::test]
async fn search_matches_name_or_description_ignoring_case() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = admin(&state).await?;
    let otros = category(&state, &admin, "Otros", CategoryKind::Otro).await?;

    let mut a = new_product("Blue Shirt", otros, 1000);
    a.description = Some("cotton".into());
    let mut b = new_product("Jeans", otros, 2000);
    b.description = Some("goes well with a SHIRT".into());
    let mut c = new_product("Hat", otros, 3000);
    c.description = Some("wool".into());
    for payload in [a, b, c] {
        product(&state, &admin, payload).await?;
    }

    let page = catalog_service::catalog_page(&state, catalog_filter("q=shirt")).await?;
    assert_eq!(names(&page.data.expect("catalog").products), ["Blue Shirt", "Jeans"]);

    let page = catalog_service::catalog_page(&state, catalog_filter("q=100%25")).await?;
    assert!(page.data.expect("catalog").products.is_empty());
    Ok(())
}

#[tokio::test]
async fn catalog_lists_only_active_products_and_ignores_bad_params() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = admin(&state).await?;
    let otros = category(&state, &admin, "Otros", CategoryKind::Otro).await?;

    product(&state, &admin, new_product("Visible", otros, 1000)).await?;
    let mut hidden = new_product("Oculto", otros, 1000);
    hidden.is_active = Some(false);
    product(&state, &admin, hidden).await?;

    let page =
        catalog_service::catalog_page(&state, catalog_filter("categoria=abc&talla=XXL")).await?;
    let data = page.data.expect("catalog");
    assert_eq!(names(&data.products), ["Visible"]);
    assert_eq!(data.selected_category, None);
    assert_eq!(data.selected_size, None);
    Ok(())
}

#[tokio::test]
async fn catalog_size_filter_requires_positive_stock() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = admin(&state).await?;
    let poleras = category(&state, &admin, "Poleras", CategoryKind::Polera).await?;

    let a = product(&state, &admin, new_product("Con M", poleras, 1000)).await?;
    let b = product(&state, &admin, new_product("Sin M", poleras, 1000)).await?;
    set_stock(&state, &admin, a.product.id, &[(Size::M, 2)]).await?;
    set_stock(&state, &admin, b.product.id, &[(Size::M, 0), (Size::L, 5)]).await?;

    let filter = catalog_filter(&format!("categoria={poleras}&talla=m"));
    let page = catalog_service::catalog_page(&state, filter).await?;
    assert_eq!(names(&page.data.expect("catalog").products), ["Con M"]);
    Ok(())
}

#[tokio::test]
async fn category_sizes_combine_with_or_without_duplicates() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = admin(&state).await?;
    let poleras = category(&state, &admin, "Poleras", CategoryKind::Polera).await?;

    let both = product(&state, &admin, new_product("Ambas", poleras, 1000)).await?;
    let large = product(&state, &admin, new_product("Solo L", poleras, 1000)).await?;
    let small = product(&state, &admin, new_product("Solo S", poleras, 1000)).await?;
    set_stock(&state, &admin, both.product.id, &[(Size::M, 1), (Size::L, 1)]).await?;
    set_stock(&state, &admin, large.product.id, &[(Size::L, 4)]).await?;
    set_stock(&state, &admin, small.product.id, &[(Size::S, 9)]).await?;

    let page =
        catalog_service::category_page(&state, poleras, category_filter("talla=M&talla=L")).await?;
    let data = page.data.expect("category");
    assert_eq!(names(&data.products), ["Ambas", "Solo L"]);
    assert_eq!(data.selected_sizes, vec![Size::M, Size::L]);
    assert_eq!(data.sizes, Some(Size::ALL.to_vec()));
    Ok(())
}

#[tokio::test]
async fn category_price_range_is_inclusive() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = admin(&state).await?;
    let otros = category(&state, &admin, "Otros", CategoryKind::Otro).await?;
    for price in [5, 10, 15, 20, 25] {
        product(&state, &admin, new_product(&format!("P{price}"), otros, price)).await?;
    }

    let page = catalog_service::category_page(
        &state,
        otros,
        category_filter("precio_min=10&precio_max=20&orden=precio_desc"),
    )
    .await?;
    assert_eq!(names(&page.data.expect("category").products), ["P20", "P15", "P10"]);
    Ok(())
}

#[tokio::test]
async fn size_filter_is_ignored_for_unsized_categories() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = admin(&state).await?;
    let accesorios = category(&state, &admin, "Accesorios", CategoryKind::Accesorio).await?;
    product(&state, &admin, new_product("Bolso", accesorios, 1000)).await?;

    let page =
        catalog_service::category_page(&state, accesorios, category_filter("talla=M")).await?;
    let data = page.data.expect("category");
    assert_eq!(names(&data.products), ["Bolso"]);
    assert!(data.sizes.is_none());
    Ok(())
}

#[tokio::test]
async fn category_sort_by_name() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = admin(&state).await?;
    let otros = category(&state, &admin, "Otros", CategoryKind::Otro).await?;
    for name in ["Zapato", "Anillo", "Mochila"] {
        product(&state, &admin, new_product(name, otros, 1000)).await?;
    }

    let filter = CategoryFilter {
        sort: Some(CategorySort::Name),
        ..Default::default()
    };
    let page = catalog_service::category_page(&state, otros, filter).await?;
    assert_eq!(
        names(&page.data.expect("category").products),
        ["Anillo", "Mochila", "Zapato"]
    );
    Ok(())
}

#[tokio::test]
async fn home_shows_at_most_eight_featured_products() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = admin(&state).await?;
    let otros = category(&state, &admin, "Otros", CategoryKind::Otro).await?;
    for i in 0..10 {
        let mut payload = new_product(&format!("Destacado {i}"), otros, 1000);
        payload.is_featured = Some(true);
        product(&state, &admin, payload).await?;
    }
    product(&state, &admin, new_product("Normal", otros, 1000)).await?;

    let page = catalog_service::home_page(&state).await?;
    let data = page.data.expect("home");
    assert_eq!(data.products.len(), 8);
    assert!(data.products.iter().all(|card| card.is_featured));
    assert_eq!(data.categories.len(), 1);
    Ok(())
}

#[tokio::test]
async fn product_page_falls_back_to_first_image_and_excludes_itself() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = admin(&state).await?;
    let pantalones = category(&state, &admin, "Pantalones", CategoryKind::Pantalon).await?;

    let main = product(&state, &admin, new_product("Jeans Slim", pantalones, 19990)).await?;
    product(&state, &admin, new_product("Jeans Recto", pantalones, 18990)).await?;
    for (url, order) in [("/b.jpg", 2), ("/a.jpg", 1)] {
        image_service::create_image(
            &state,
            &admin,
            main.product.id,
            CreateImageRequest {
                url: url.into(),
                display_order: Some(order),
                is_primary: Some(false),
            },
        )
        .await?;
    }

    let page = catalog_service::product_page(&state, "jeans-slim").await?;
    let data = page.data.expect("product");
    assert_eq!(data.formatted_price, "$19.990");
    assert_eq!(data.primary_image.map(|i| i.url).as_deref(), Some("/a.jpg"));
    assert_eq!(names(&data.related), ["Jeans Recto"]);
    assert_eq!(data.stock_by_size.map(|rows| rows.len()), Some(4));
    Ok(())
}

#[tokio::test]
async fn inactive_product_and_category_are_not_found() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = admin(&state).await?;
    let otros = category(&state, &admin, "Otros", CategoryKind::Otro).await?;
    let mut hidden = new_product("Oculto", otros, 1000);
    hidden.is_active = Some(false);
    product(&state, &admin, hidden).await?;

    let err = catalog_service::product_page(&state, "oculto").await;
    assert!(matches!(err, Err(AppError::NotFound)));

    let archived = category_service::create_category(
        &state,
        &admin,
        CreateCategoryRequest {
            name: "Archivada".into(),
            kind: CategoryKind::Otro,
            description: None,
            is_active: Some(false),
            display_order: None,
        },
    )
    .await?
    .data
    .expect("category")
    .category
    .id;

    let router = common::router(&state);
    let (status, _) = common::get_json(router.clone(), "/producto/oculto/", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) =
        common::get_json(router.clone(), &format!("/categoria/{archived}/"), None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = common::get_json(router, "/categoria/abc/", None).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn storefront_routes_render_json_pages() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = admin(&state).await?;
    let poleras = category(&state, &admin, "Poleras", CategoryKind::Polera).await?;
    let shirt = product(&state, &admin, new_product("Polera Roja", poleras, 12990)).await?;
    set_stock(&state, &admin, shirt.product.id, &[(Size::M, 2), (Size::L, 8)]).await?;

    let router = common::router(&state);
    let (status, body) =
        common::get_json(router.clone(), &format!("/categoria/{poleras}/?talla=M&talla=L"), None)
            .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["products"][0]["slug"], "polera-roja");
    assert_eq!(body["data"]["products"][0]["formatted_price"], "$12.990");
    assert_eq!(body["data"]["selected_sizes"], serde_json::json!(["M", "L"]));

    let (status, body) = common::get_json(router.clone(), "/producto/polera-roja/", None).await?;
    assert_eq!(status, StatusCode::OK);
    let badges: Vec<&str> = body["data"]["stock_by_size"]
        .as_array()
        .expect("stock rows")
        .iter()
        .filter_map(|row| row["badge"]["label"].as_str())
        .collect();
    assert_eq!(badges, ["SIN STOCK", "POCO STOCK", "BUEN STOCK", "SIN STOCK"]);

    let (status, body) = common::get_json(router, "/nosotros/", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["categories"][0]["name"], "Poleras");
    Ok(())
}

#[tokio::test]
async fn search_folds_accented_letters_in_either_case() -> anyhow::Result<()> {
    let state = setup_state().await?;
    let admin = admin(&state).await?;
    let pantalones = category(&state, &admin, "Pantalones", CategoryKind::Pantalon).await?;
    product(&state, &admin, new_product("PANTALÓN CARGO", pantalones, 24990)).await?;
    product(&state, &admin, new_product("Pantalón Slim", pantalones, 19990)).await?;
    product(&state, &admin, new_product("Short", pantalones, 9990)).await?;

    let router = common::router(&state);
    let (status, body) = common::get_json(router, "/catalogo/?q=pantal%C3%B3n", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["products"].as_array().map(Vec::len), Some(2));

    let page = catalog_service::catalog_page(&state, catalog_filter("q=PANTAL%C3%93N")).await?;
    assert_eq!(
        names(&page.data.expect("catalog").products),
        ["PANTALÓN CARGO", "Pantalón Slim"]
    );
    Ok(())
}
