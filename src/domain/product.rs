use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Glyph shown when a product has no uploaded image.
pub const DEFAULT_PRODUCT_IMAGE: &str = "☕";

/// Represents a product on the menu.
///
/// `price` is in the smallest currency unit (đồng). Inactive products stay on
/// the menu but cannot be ordered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "product_id")]
    pub id: String,
    #[serde(rename = "product_name")]
    pub name: String,
    #[serde(rename = "product_price")]
    pub price: u64,
    /// Public image URL or a symbolic glyph.
    #[serde(rename = "product_img")]
    pub image: String,
    pub category_id: String,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a new product.
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub name: String,
    pub price: u64,
    pub image: Option<String>,
    pub category_id: String,
    pub is_active: bool,
}

/// Partial update of a product; `None` leaves the field unchanged.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<u64>,
    pub image: Option<String>,
    pub category_id: Option<String>,
    pub is_active: Option<bool>,
}

impl ProductCreate {
    pub fn new(name: impl Into<String>, price: u64, category_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price,
            image: None,
            category_id: category_id.into(),
            is_active: true,
        }
    }
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.price.is_none()
            && self.image.is_none()
            && self.category_id.is_none()
            && self.is_active.is_none()
    }
}
