use std::sync::Arc;

use recall_shared::document::{DocumentData, DocumentStore};
use recall_shared::error::Result;

use crate::models::Product;

pub const COLLECTION: &str = "products";

#[derive(Clone)]
pub struct ProductRepository {
    store: Arc<dyn DocumentStore>,
}

impl ProductRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn get(&self, sku: &str) -> Result<Option<Product>> {
        self.store
            .get(COLLECTION, sku)
            .await?
            .map(|doc| doc.decode(COLLECTION))
            .transpose()
    }

    pub async fn put(&self, product: &Product) -> Result<()> {
        self.store
            .set(COLLECTION, &product.id, DocumentData::from_serializable(product)?)
            .await?;
        Ok(())
    }
}
