pub mod auth_service;
pub mod catalog_service;
pub mod category_service;
pub mod image_service;
pub mod loaders;
pub mod product_service;
pub mod stock_service;
