//! Derived values shown next to catalog records: formatted prices, stock
//! badges and the image picked to represent a product.

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    entity::categories::CategoryKind,
    models::{ProductImage, StockBySize},
};

/// Totals at or below this count are flagged as running low.
pub const LOW_TOTAL_STOCK: i64 = 10;
/// Per-size quantities at or below this count are flagged as running low.
pub const LOW_SIZE_STOCK: i32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum BadgeColor {
    Red,
    Orange,
    Green,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct StockBadge {
    pub color: BadgeColor,
    pub label: String,
}

/// Renders a whole-unit price as `$12.990`.
pub fn format_price(price: i64) -> String {
    let digits = price.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if price < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}

/// Stock a product has on hand. Sized categories sum their per-size rows,
/// everything else uses the product's own counter.
pub fn total_stock(kind: CategoryKind, accessory_stock: i32, rows: &[StockBySize]) -> i64 {
    if kind.is_sized() {
        rows.iter().map(|row| i64::from(row.quantity)).sum()
    } else {
        i64::from(accessory_stock)
    }
}

pub fn total_stock_badge(total: i64) -> StockBadge {
    if total <= 0 {
        StockBadge {
            color: BadgeColor::Red,
            label: "SIN STOCK".to_string(),
        }
    } else {
        let color = if total <= LOW_TOTAL_STOCK {
            BadgeColor::Orange
        } else {
            BadgeColor::Green
        };
        StockBadge {
            color,
            label: format!("{total} unidades"),
        }
    }
}

pub fn size_stock_badge(quantity: i32) -> StockBadge {
    let (color, label) = if quantity <= 0 {
        (BadgeColor::Red, "SIN STOCK")
    } else if quantity <= LOW_SIZE_STOCK {
        (BadgeColor::Orange, "POCO STOCK")
    } else {
        (BadgeColor::Green, "BUEN STOCK")
    };
    StockBadge {
        color,
        label: label.to_string(),
    }
}

/// The flagged primary image, else the first image by display order.
pub fn primary_image(images: &[ProductImage]) -> Option<&ProductImage> {
    let order = |image: &&ProductImage| (image.display_order, image.id);
    images
        .iter()
        .filter(|image| image.is_primary)
        .min_by_key(order)
        .or_else(|| images.iter().min_by_key(order))
}
