use tracing::{debug, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::category_actor::entity::category_name;
use crate::category_actor::CategoryError;
use crate::domain::{Category, CategoryCreate, CategoryPatch};

/// Client for the category table.
#[derive(Clone)]
pub struct CategoryClient {
    inner: ResourceClient<Category>,
}

impl_basic_client!(CategoryClient, Category, CategoryError, category);

impl CategoryClient {
    /// Categories in creation order.
    #[instrument(skip(self))]
    pub async fn list_categories(&self) -> Result<Vec<Category>, CategoryError> {
        debug!("Sending request");
        self.inner.list().await.map_err(CategoryError::from_store)
    }

    #[instrument(skip(self))]
    pub async fn create_category(&self, name: &str) -> Result<Category, CategoryError> {
        let name = category_name(name).map_err(CategoryError::ValidationError)?;
        let category = self
            .inner
            .create(CategoryCreate { name })
            .await
            .map_err(CategoryError::from_store)?;
        info!(category_id = %category.id, "Category created");
        Ok(category)
    }

    #[instrument(skip(self))]
    pub async fn rename_category(&self, id: String, name: &str) -> Result<Category, CategoryError> {
        let name = category_name(name).map_err(CategoryError::ValidationError)?;
        self.inner
            .update(id, CategoryPatch { name })
            .await
            .map_err(CategoryError::from_store)
    }

    /// Removes the category only. Products pointing at it keep their reference.
    #[instrument(skip(self))]
    pub async fn delete_category(&self, id: String) -> Result<(), CategoryError> {
        self.inner.delete(id).await.map_err(CategoryError::from_store)?;
        info!("Category deleted");
        Ok(())
    }
}
