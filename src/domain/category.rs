use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A menu section such as "Trà sữa" or "Cà phê".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "category_id")]
    pub id: String,
    #[serde(rename = "category_name")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a new category.
#[derive(Debug, Clone)]
pub struct CategoryCreate {
    pub name: String,
}

/// Payload for renaming a category.
#[derive(Debug, Clone)]
pub struct CategoryPatch {
    pub name: String,
}
