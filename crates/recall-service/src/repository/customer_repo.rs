use std::collections::HashMap;
use std::sync::Arc;

use recall_shared::document::{DocumentData, DocumentStore};
use recall_shared::error::Result;

use crate::models::Customer;

pub const COLLECTION: &str = "customers";

#[derive(Clone)]
pub struct CustomerRepository {
    store: Arc<dyn DocumentStore>,
}

impl CustomerRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// 按 ID 集合批量读取，返回 ID -> 客户映射；不存在的 ID 不出现在结果中
    pub async fn get_many(&self, ids: &[String]) -> Result<HashMap<String, Customer>> {
        let docs = self.store.get_many(COLLECTION, ids).await?;
        docs.iter()
            .map(|doc| {
                doc.decode::<Customer>(COLLECTION)
                    .map(|customer| (customer.id.clone(), customer))
            })
            .collect()
    }

    pub async fn put(&self, customer: &Customer) -> Result<()> {
        self.store
            .set(COLLECTION, &customer.id, DocumentData::from_serializable(customer)?)
            .await?;
        Ok(())
    }
}
