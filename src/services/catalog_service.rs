use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Select,
    sea_query::{Expr, Func, IntoColumnRef, LikeExpr, Query, SimpleExpr},
};

use crate::{
    display::{format_price, primary_image, size_stock_badge, total_stock},
    dto::storefront::{
        AboutPage, CatalogPage, CategoryPage, HomePage, ProductCard, ProductPage, SizeAvailability,
    },
    entity::{
        categories::{CategoryKind, Column as CatCol, Entity as Categories},
        products::{self, Column, Entity as Products},
        stock_sizes::{Column as StockCol, Entity as StockSizes, Size},
    },
    error::{AppError, AppResult},
    models::{Category, Product},
    response::{ApiResponse, Meta},
    routes::params::{CatalogFilter, CategoryFilter, CategorySort},
    services::loaders,
    state::AppState,
};

pub const HOME_FEATURED_LIMIT: u64 = 8;
pub const RELATED_LIMIT: u64 = 4;

/// Case-insensitive substring match with `%`, `_` and `\` taken literally.
///
/// SQLite's `LOWER`/`UPPER` only fold ASCII, so the column is compared both
/// lower-cased and upper-cased against the matching form of the term. A
/// name stored as `PANTALÓN` is then found by `pantalón` on either backend.
pub fn contains_insensitive(column: impl IntoColumnRef, term: &str) -> SimpleExpr {
    let column = column.into_column_ref();
    let pattern = |folded: String| {
        let escaped = folded
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        LikeExpr::new(format!("%{escaped}%")).escape('\\')
    };
    let lower = Expr::expr(Func::lower(Expr::col(column.clone())))
        .like(pattern(term.to_lowercase()));
    let upper = Expr::expr(Func::upper(Expr::col(column))).like(pattern(term.to_uppercase()));
    lower.or(upper)
}

/// Name OR description contains `term`.
pub fn search_condition(term: &str) -> Condition {
    Condition::any()
        .add(contains_insensitive((Products, Column::Name), term))
        .add(contains_insensitive((Products, Column::Description), term))
}

/// Products holding a positive quantity in at least one of `sizes`. A
/// subquery keeps each product once no matter how many sizes match.
pub fn in_stock_for(sizes: &[Size]) -> SimpleExpr {
    Column::Id.in_subquery(
        Query::select()
            .column(StockCol::ProductId)
            .from(StockSizes)
            .and_where(StockCol::Size.is_in(sizes.iter().copied()))
            .and_where(StockCol::Quantity.gt(0))
            .to_owned(),
    )
}

pub fn catalog_condition(filter: &CatalogFilter) -> Condition {
    let mut condition = Condition::all().add(Column::IsActive.eq(true));

    if let Some(category_id) = filter.category_id {
        condition = condition.add(Column::CategoryId.eq(category_id));
    }

    if let Some(size) = filter.size {
        condition = condition.add(in_stock_for(&[size]));
    }

    if let Some(search) = filter.search.as_deref().filter(|s| !s.is_empty()) {
        condition = condition.add(search_condition(search));
    }

    condition
}

/// Size filters only apply to sized categories and are ignored otherwise.
pub fn category_condition(category_id: i32, kind: CategoryKind, filter: &CategoryFilter) -> Condition {
    let mut condition = Condition::all()
        .add(Column::CategoryId.eq(category_id))
        .add(Column::IsActive.eq(true));

    if kind.is_sized() && !filter.sizes.is_empty() {
        condition = condition.add(in_stock_for(&filter.sizes));
    }

    if let Some(min_price) = filter.min_price {
        condition = condition.add(Column::Price.gte(min_price));
    }

    if let Some(max_price) = filter.max_price {
        condition = condition.add(Column::Price.lte(max_price));
    }

    condition
}

pub fn apply_sort(finder: Select<Products>, sort: Option<CategorySort>) -> Select<Products> {
    let finder = match sort {
        Some(CategorySort::Name) => finder.order_by_asc(Column::Name),
        Some(CategorySort::PriceAsc) => finder.order_by_asc(Column::Price),
        Some(CategorySort::PriceDesc) => finder.order_by_desc(Column::Price),
        None => finder,
    };
    finder.order_by_asc(Column::Id)
}

pub async fn active_categories<C: ConnectionTrait>(conn: &C) -> AppResult<Vec<Category>> {
    let categories = Categories::find()
        .filter(CatCol::IsActive.eq(true))
        .order_by_asc(CatCol::DisplayOrder)
        .order_by_asc(CatCol::Name)
        .all(conn)
        .await?
        .into_iter()
        .map(Category::from)
        .collect();
    Ok(categories)
}

pub async fn product_cards<C: ConnectionTrait>(
    conn: &C,
    products: Vec<products::Model>,
) -> AppResult<Vec<ProductCard>> {
    let ids: Vec<i32> = products.iter().map(|p| p.id).collect();
    let categories = loaders::categories_by_id(conn, products.iter().map(|p| p.category_id)).await?;
    let stock = loaders::stock_by_product(conn, &ids).await?;
    let images = loaders::images_by_product(conn, &ids).await?;

    let cards = products
        .into_iter()
        .map(|product| {
            let kind = categories
                .get(&product.category_id)
                .map_or(CategoryKind::Otro, |c| c.kind);
            let rows = stock.get(&product.id).map(Vec::as_slice).unwrap_or_default();
            let product_images = images.get(&product.id).map(Vec::as_slice).unwrap_or_default();
            ProductCard {
                id: product.id,
                formatted_price: format_price(product.price),
                total_stock: total_stock(kind, product.accessory_stock, rows),
                primary_image: primary_image(product_images).cloned(),
                name: product.name,
                slug: product.slug,
                price: product.price,
                category_id: product.category_id,
                is_featured: product.is_featured,
            }
        })
        .collect();
    Ok(cards)
}

pub async fn home_page(state: &AppState) -> AppResult<ApiResponse<HomePage>> {
    let featured = Products::find()
        .filter(Column::IsActive.eq(true))
        .filter(Column::IsFeatured.eq(true))
        .order_by_asc(Column::Id)
        .limit(HOME_FEATURED_LIMIT)
        .all(&state.orm)
        .await?;

    let products = product_cards(&state.orm, featured).await?;
    let categories = active_categories(&state.orm).await?;
    let meta = Meta::total(products.len() as i64);
    Ok(ApiResponse::success(
        "Home",
        HomePage {
            products,
            categories,
        },
        Some(meta),
    ))
}

pub async fn about_page(state: &AppState) -> AppResult<ApiResponse<AboutPage>> {
    let categories = active_categories(&state.orm).await?;
    Ok(ApiResponse::success(
        "Nosotros",
        AboutPage { categories },
        Some(Meta::empty()),
    ))
}

pub async fn catalog_page(
    state: &AppState,
    filter: CatalogFilter,
) -> AppResult<ApiResponse<CatalogPage>> {
    let found = Products::find()
        .filter(catalog_condition(&filter))
        .order_by_asc(Column::Id)
        .all(&state.orm)
        .await?;

    tracing::debug!(
        category = ?filter.category_id,
        size = ?filter.size,
        search = ?filter.search,
        results = found.len(),
        "catalog query"
    );

    let products = product_cards(&state.orm, found).await?;
    let categories = active_categories(&state.orm).await?;
    let meta = Meta::total(products.len() as i64);
    Ok(ApiResponse::success(
        "Catalog",
        CatalogPage {
            products,
            categories,
            selected_category: filter.category_id,
            selected_size: filter.size,
            search: filter.search,
            sizes: Size::ALL.to_vec(),
        },
        Some(meta),
    ))
}

pub async fn product_page(state: &AppState, slug: &str) -> AppResult<ApiResponse<ProductPage>> {
    let product = Products::find()
        .filter(Column::Slug.eq(slug))
        .filter(Column::IsActive.eq(true))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let category = Categories::find_by_id(product.category_id)
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let images = loaders::images_by_product(&state.orm, &[product.id])
        .await?
        .remove(&product.id)
        .unwrap_or_default();

    let stock_by_size = if category.kind.is_sized() {
        let rows = loaders::stock_by_product(&state.orm, &[product.id])
            .await?
            .remove(&product.id)
            .unwrap_or_default();
        Some(
            rows.into_iter()
                .map(|row| SizeAvailability {
                    size: row.size,
                    quantity: row.quantity,
                    badge: size_stock_badge(row.quantity),
                })
                .collect(),
        )
    } else {
        None
    };

    let related = Products::find()
        .filter(Column::CategoryId.eq(product.category_id))
        .filter(Column::IsActive.eq(true))
        .filter(Column::Id.ne(product.id))
        .order_by_asc(Column::Id)
        .limit(RELATED_LIMIT)
        .all(&state.orm)
        .await?;
    let related = product_cards(&state.orm, related).await?;
    let categories = active_categories(&state.orm).await?;

    let page = ProductPage {
        formatted_price: format_price(product.price),
        primary_image: primary_image(&images).cloned(),
        product: Product::from(product),
        category: Category::from(category),
        images,
        stock_by_size,
        related,
        categories,
    };
    Ok(ApiResponse::success("Product", page, None))
}

pub async fn category_page(
    state: &AppState,
    category_id: i32,
    filter: CategoryFilter,
) -> AppResult<ApiResponse<CategoryPage>> {
    let category = Categories::find_by_id(category_id)
        .filter(CatCol::IsActive.eq(true))
        .one(&state.orm)
        .await?
        .ok_or(AppError::NotFound)?;

    let finder = Products::find().filter(category_condition(category.id, category.kind, &filter));
    let found = apply_sort(finder, filter.sort).all(&state.orm).await?;

    let products = product_cards(&state.orm, found).await?;
    let categories = active_categories(&state.orm).await?;
    let sized = category.kind.is_sized();
    let meta = Meta::total(products.len() as i64);
    Ok(ApiResponse::success(
        "Category",
        CategoryPage {
            category: Category::from(category),
            products,
            sizes: sized.then(|| Size::ALL.to_vec()),
            selected_sizes: filter.sizes,
            categories,
        },
        Some(meta),
    ))
}
