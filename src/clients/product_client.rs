use tracing::{debug, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::clients::AssetClient;
use crate::domain::{Product, ProductCreate, ProductPatch};
use crate::product_actor::ProductError;

/// Client for the product table, with image uploads through the asset bucket.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
    assets: AssetClient,
}

impl_client_methods!(ProductClient, Product, ProductError, product);

impl ProductClient {
    pub fn new(inner: ResourceClient<Product>, assets: AssetClient) -> Self {
        Self { inner, assets }
    }

    /// Products in creation order, inactive ones included.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<Product>, ProductError> {
        debug!("Sending request");
        self.inner.list().await.map_err(ProductError::from_store)
    }

    #[instrument(skip(self))]
    pub async fn create_product(&self, params: ProductCreate) -> Result<Product, ProductError> {
        let product = self.inner.create(params).await.map_err(ProductError::from_store)?;
        info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    #[instrument(skip(self))]
    pub async fn update_product(&self, id: String, patch: ProductPatch) -> Result<Product, ProductError> {
        if patch.is_empty() {
            return Err(ProductError::ValidationError("Nothing to update".to_string()));
        }
        self.inner.update(id, patch).await.map_err(ProductError::from_store)
    }

    /// Shows or hides a product on the ordering screen.
    #[instrument(skip(self))]
    pub async fn set_active(&self, id: String, is_active: bool) -> Result<Product, ProductError> {
        self.update_product(
            id,
            ProductPatch {
                is_active: Some(is_active),
                ..ProductPatch::default()
            },
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn delete_product(&self, id: String) -> Result<(), ProductError> {
        self.inner.delete(id).await.map_err(ProductError::from_store)?;
        info!("Product deleted");
        Ok(())
    }

    /// Uploads an image to the bucket and returns its public URL.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload_image(&self, path_hint: String, file_name: String, bytes: Vec<u8>) -> Result<String, ProductError> {
        let url = self.assets.upload(path_hint, file_name, bytes).await?;
        debug!(%url, "Image uploaded");
        Ok(url)
    }

    /// Uploads a new image for an existing product and points the product at it.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn replace_image(&self, id: String, file_name: String, bytes: Vec<u8>) -> Result<Product, ProductError> {
        if self.get_product(id.clone()).await?.is_none() {
            return Err(ProductError::NotFound(id));
        }
        let url = self.upload_image(id.clone(), file_name, bytes).await?;
        self.update_product(
            id,
            ProductPatch {
                image: Some(url),
                ..ProductPatch::default()
            },
        )
        .await
    }
}
