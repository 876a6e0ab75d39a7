use std::sync::Arc;

use recall_shared::document::{DocumentData, DocumentStore, Query};
use recall_shared::error::Result;

use super::decode_all;
use crate::models::Purchase;

pub const COLLECTION: &str = "purchases";

#[derive(Clone)]
pub struct PurchaseRepository {
    store: Arc<dyn DocumentStore>,
}

impl PurchaseRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// 按 SKU + 批次等值查询
    pub async fn find_by_sku_batch(&self, sku: &str, batch: &str) -> Result<Vec<Purchase>> {
        let query = Query::collection(COLLECTION)
            .where_eq("sku", sku)
            .where_eq("batch", batch);
        let docs = self.store.query(&query).await?;
        decode_all(COLLECTION, &docs)
    }

    pub async fn put(&self, purchase: &Purchase) -> Result<()> {
        self.store
            .set(COLLECTION, &purchase.id, DocumentData::from_serializable(purchase)?)
            .await?;
        Ok(())
    }
}
