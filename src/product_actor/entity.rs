use chrono::{DateTime, Utc};

use crate::actor_framework::Entity;
use crate::domain::{Product, ProductCreate, ProductPatch, DEFAULT_PRODUCT_IMAGE};

impl Entity for Product {
    type Id = String;
    type CreatePayload = ProductCreate;
    type Patch = ProductPatch;

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new Product from creation parameters.
    ///
    /// # Notes
    /// Name and category are required. A missing or blank image falls back to
    /// the default glyph.
    fn from_create(id: String, created_at: DateTime<Utc>, params: ProductCreate) -> Result<Self, String> {
        let name = required("name", &params.name)?;
        let category_id = required("category", &params.category_id)?;
        Ok(Self {
            id,
            name,
            price: params.price,
            image: image_or_default(params.image),
            category_id,
            is_active: params.is_active,
            created_at,
        })
    }

    /// Updates whichever product fields the patch carries.
    fn on_update(&mut self, patch: ProductPatch) -> Result<(), String> {
        if let Some(name) = patch.name {
            self.name = required("name", &name)?;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(image) = patch.image {
            self.image = image_or_default(Some(image));
        }
        if let Some(category_id) = patch.category_id {
            self.category_id = required("category", &category_id)?;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        Ok(())
    }
}

fn required(field: &str, value: &str) -> Result<String, String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(format!("Product {field} is required"));
    }
    Ok(trimmed.to_string())
}

fn image_or_default(image: Option<String>) -> String {
    match image {
        Some(image) if !image.trim().is_empty() => image,
        _ => DEFAULT_PRODUCT_IMAGE.to_string(),
    }
}
