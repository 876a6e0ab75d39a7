use std::sync::Arc;

use recall_shared::document::{Direction, DocumentData, DocumentStore, Fields, Query};
use recall_shared::error::Result;

use super::decode_all;
use crate::models::Recall;

pub const COLLECTION: &str = "recalls";

#[derive(Clone)]
pub struct RecallRepository {
    store: Arc<dyn DocumentStore>,
}

impl RecallRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// 追加召回事件，timestamp 由存储填充，返回生成的 ID
    pub async fn append(&self, fields: Fields) -> Result<String> {
        let data = fields
            .into_iter()
            .fold(DocumentData::new(), |data, (field, value)| data.set(field, value))
            .server_timestamp("timestamp");

        let doc = self.store.add(COLLECTION, data).await?;
        Ok(doc.id)
    }

    /// 最近的召回事件，按 timestamp 倒序
    pub async fn recent(&self, limit: usize) -> Result<Vec<Recall>> {
        let query = Query::collection(COLLECTION)
            .order_by("timestamp", Direction::Descending)
            .limit(limit);
        let docs = self.store.query(&query).await?;
        decode_all(COLLECTION, &docs)
    }
}
