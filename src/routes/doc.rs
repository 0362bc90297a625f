use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    display::{BadgeColor, StockBadge},
    dto::{
        auth::{LoginRequest, LoginResponse},
        categories::{CategoryList, CategoryRow, CreateCategoryRequest, UpdateCategoryRequest},
        images::{CreateImageRequest, ImageList, UpdateImageRequest},
        products::{
            CreateProductRequest, FieldGroup, ProductDetail, ProductList, ProductRow,
            UpdateProductRequest,
        },
        stock::{SetProductStockRequest, SizeQuantity, StockList, StockRow, UpdateStockRequest},
        storefront::{
            AboutPage, CatalogPage, CategoryPage, HomePage, ProductCard, ProductPage,
            SizeAvailability,
        },
    },
    entity::{categories::CategoryKind, stock_sizes::Size},
    models::{Category, Product, ProductImage, StockBySize, User},
    response::{ApiResponse, Meta},
    routes::{admin, auth, health, storefront},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        storefront::home,
        storefront::about,
        storefront::catalog,
        storefront::product_detail,
        storefront::category_detail,
        auth::login,
        admin::list_categories,
        admin::get_category,
        admin::create_category,
        admin::update_category,
        admin::delete_category,
        admin::list_products,
        admin::get_product,
        admin::create_product,
        admin::update_product,
        admin::delete_product,
        admin::set_product_stock,
        admin::list_stock,
        admin::update_stock,
        admin::list_images,
        admin::create_image,
        admin::update_image,
        admin::delete_image
    ),
    components(
        schemas(
            User,
            Category,
            CategoryKind,
            Product,
            ProductImage,
            StockBySize,
            Size,
            BadgeColor,
            StockBadge,
            LoginRequest,
            LoginResponse,
            CategoryRow,
            CategoryList,
            CreateCategoryRequest,
            UpdateCategoryRequest,
            ProductRow,
            ProductList,
            ProductDetail,
            FieldGroup,
            CreateProductRequest,
            UpdateProductRequest,
            StockRow,
            StockList,
            UpdateStockRequest,
            SizeQuantity,
            SetProductStockRequest,
            ImageList,
            CreateImageRequest,
            UpdateImageRequest,
            ProductCard,
            SizeAvailability,
            HomePage,
            AboutPage,
            CatalogPage,
            ProductPage,
            CategoryPage,
            Meta,
            ApiResponse<HomePage>,
            ApiResponse<CatalogPage>,
            ApiResponse<ProductPage>,
            ApiResponse<CategoryPage>,
            ApiResponse<ProductDetail>,
            ApiResponse<ProductList>,
            ApiResponse<CategoryList>
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Storefront", description = "Catalog browsing pages"),
        (name = "Auth", description = "Staff authentication"),
        (name = "Admin", description = "Catalog administration"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
