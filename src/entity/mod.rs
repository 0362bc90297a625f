pub mod audit_logs;
pub mod categories;
pub mod product_images;
pub mod products;
pub mod stock_sizes;
pub mod users;

pub use audit_logs::Entity as AuditLogs;
pub use categories::Entity as Categories;
pub use product_images::Entity as ProductImages;
pub use products::Entity as Products;
pub use stock_sizes::Entity as StockSizes;
pub use users::Entity as Users;
