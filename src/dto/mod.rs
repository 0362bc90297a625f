pub mod auth;
pub mod categories;
pub mod images;
pub mod products;
pub mod stock;
pub mod storefront;
