use chrono::{DateTime, Utc};

use crate::actor_framework::Entity;
use crate::domain::{Category, CategoryCreate, CategoryPatch};

impl Entity for Category {
    type Id = String;
    type CreatePayload = CategoryCreate;
    type Patch = CategoryPatch;

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create(id: String, created_at: DateTime<Utc>, params: CategoryCreate) -> Result<Self, String> {
        Ok(Self {
            id,
            name: category_name(&params.name)?,
            created_at,
        })
    }

    fn on_update(&mut self, patch: CategoryPatch) -> Result<(), String> {
        self.name = category_name(&patch.name)?;
        Ok(())
    }
}

/// Names are stored trimmed and may not be blank.
pub fn category_name(raw: &str) -> Result<String, String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err("Category name is required".to_string());
    }
    Ok(name.to_string())
}
