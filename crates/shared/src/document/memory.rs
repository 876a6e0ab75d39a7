//! 进程内文档存储
//!
//! 以 DashMap 按集合分片，集合内的写入在分片锁内完成，因此单文档的
//! 条件更新是原子的。进程重启后数据丢失。

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;

use super::{
    Direction, Document, DocumentData, DocumentStore, Fields, Precondition, Query,
    UpdateOutcome, generate_id, timestamp,
};
use crate::error::Result;

#[derive(Debug, Clone)]
struct StoredDocument {
    fields: Fields,
    /// 插入序号，排序值相同时作为稳定次序
    seq: u64,
}

/// 基于 DashMap 的内存文档存储
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    collections: Arc<DashMap<String, HashMap<String, StoredDocument>>>,
    sequence: Arc<AtomicU64>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_seq(&self) -> u64 {
        self.sequence.fetch_add(1, AtomicOrdering::SeqCst)
    }

    /// 集合中的文档数
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }
}

/// JSON 值排序：null < bool < number < string < array < object
fn value_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => {
            let x = x.as_f64().unwrap_or_default();
            let y = y.as_f64().unwrap_or_default();
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => value_rank(a).cmp(&value_rank(b)),
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        Ok(self.collections.get(collection).and_then(|docs| {
            docs.get(id)
                .map(|stored| Document::new(id, stored.fields.clone()))
        }))
    }

    async fn get_many(&self, collection: &str, ids: &[String]) -> Result<Vec<Document>> {
        let Some(docs) = self.collections.get(collection) else {
            return Ok(Vec::new());
        };

        let mut seen = HashSet::new();
        Ok(ids
            .iter()
            .filter(|id| seen.insert(id.as_str()))
            .filter_map(|id| {
                docs.get(id)
                    .map(|stored| Document::new(id.clone(), stored.fields.clone()))
            })
            .collect())
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>> {
        let Some(docs) = self.collections.get(&query.collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<(&String, &StoredDocument)> = docs
            .iter()
            .filter(|(_, stored)| query.matches(&stored.fields))
            .collect();

        match &query.order_by {
            Some((field, direction)) => {
                matched.sort_by(|(_, a), (_, b)| {
                    let ordering = match (a.fields.get(field), b.fields.get(field)) {
                        (Some(x), Some(y)) => compare_values(x, y),
                        _ => Ordering::Equal,
                    }
                    .then(a.seq.cmp(&b.seq));
                    match direction {
                        Direction::Ascending => ordering,
                        Direction::Descending => ordering.reverse(),
                    }
                });
            }
            None => matched.sort_by_key(|(_, stored)| stored.seq),
        }

        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(matched
            .into_iter()
            .take(limit)
            .map(|(id, stored)| Document::new(id.clone(), stored.fields.clone()))
            .collect())
    }

    async fn add(&self, collection: &str, data: DocumentData) -> Result<Document> {
        let id = generate_id();
        let fields = data.resolve(timestamp::now());
        let seq = self.next_seq();

        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(
                id.clone(),
                StoredDocument {
                    fields: fields.clone(),
                    seq,
                },
            );

        debug!(collection, id = %id, "文档已追加");
        Ok(Document::new(id, fields))
    }

    async fn set(&self, collection: &str, id: &str, data: DocumentData) -> Result<Document> {
        let fields = data.resolve(timestamp::now());
        let mut docs = self.collections.entry(collection.to_string()).or_default();

        // 覆盖写入保留原插入序号
        let seq = match docs.get(id) {
            Some(existing) => existing.seq,
            None => self.next_seq(),
        };
        docs.insert(
            id.to_string(),
            StoredDocument {
                fields: fields.clone(),
                seq,
            },
        );

        Ok(Document::new(id, fields))
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        data: DocumentData,
        precondition: Precondition,
    ) -> Result<UpdateOutcome> {
        let Some(mut docs) = self.collections.get_mut(collection) else {
            return Ok(UpdateOutcome::NotFound);
        };
        let Some(stored) = docs.get_mut(id) else {
            return Ok(UpdateOutcome::NotFound);
        };

        if !precondition.is_satisfied_by(&stored.fields) {
            return Ok(UpdateOutcome::PreconditionFailed(Document::new(
                id,
                stored.fields.clone(),
            )));
        }

        for (field, value) in data.resolve(timestamp::now()) {
            stored.fields.insert(field, value);
        }

        Ok(UpdateOutcome::Updated(Document::new(
            id,
            stored.fields.clone(),
        )))
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
