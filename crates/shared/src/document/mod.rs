//! 文档存储适配层
//!
//! 以集合 + 文档 ID 组织的无模式存储抽象，提供读取、等值查询、追加、
//! 覆盖写入以及带前置条件的合并更新。服务端时间戳由存储在写入时分配，
//! 不信任调用方时间。
//!
//! 两个后端实现：
//! - `MemoryDocumentStore`: 基于 DashMap 的进程内存储
//! - `PgDocumentStore`: PostgreSQL JSONB 文档表

pub mod memory;
pub mod postgres;
pub mod timestamp;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::{Result, StoreError};

pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// 文档字段集合
pub type Fields = Map<String, Value>;

/// 存储中读出的一条文档
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// 读取单个字段
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// 解码为实体类型
    ///
    /// 文档 ID 以 `id` 字段合并后再反序列化；结构不符时返回 `InvalidDocument`。
    pub fn decode<T: DeserializeOwned>(&self, collection: &str) -> Result<T> {
        let mut fields = self.fields.clone();
        fields.insert("id".to_string(), Value::String(self.id.clone()));
        serde_json::from_value(Value::Object(fields))
            .map_err(|e| StoreError::invalid_document(collection, &self.id, e))
    }
}

/// 待写入的文档内容
///
/// 普通字段原样写入；`server_timestamp` 标记的字段由存储在写入时以自身时钟填充。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentData {
    fields: Fields,
    server_timestamps: Vec<String>,
}

impl DocumentData {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从可序列化的实体构造
    ///
    /// 实体必须序列化为 JSON 对象；其中的 `id` 字段会被剔除（ID 由文档键承载）。
    pub fn from_serializable<T: Serialize>(value: &T) -> Result<Self> {
        match serde_json::to_value(value)? {
            Value::Object(mut fields) => {
                fields.remove("id");
                Ok(Self {
                    fields,
                    server_timestamps: Vec::new(),
                })
            }
            other => Err(StoreError::Internal(format!(
                "文档内容必须是 JSON 对象，实际为: {}",
                other
            ))),
        }
    }

    /// 设置字段
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(field.into(), value.into());
        self
    }

    /// 标记字段为服务端时间戳
    pub fn server_timestamp(mut self, field: impl Into<String>) -> Self {
        self.server_timestamps.push(field.into());
        self
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn server_timestamp_fields(&self) -> &[String] {
        &self.server_timestamps
    }

    /// 用存储时钟填充服务端时间戳，得到最终写入的字段
    pub fn resolve(self, now: DateTime<Utc>) -> Fields {
        let mut fields = self.fields;
        for field in self.server_timestamps {
            fields.insert(field, timestamp::to_value(&now));
        }
        fields
    }
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    pub fn as_sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// 集合查询
///
/// 仅支持等值过滤和单字段排序。指定排序字段时，缺少该字段的文档不会出现在结果中。
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<(String, Value)>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn collection(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    pub fn where_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// 过滤条件合并为单个 JSON 对象（用于包含匹配）
    pub fn filter_object(&self) -> Value {
        let fields: Fields = self
            .filters
            .iter()
            .map(|(field, value)| (field.clone(), value.clone()))
            .collect();
        Value::Object(fields)
    }

    /// 判断文档字段是否满足所有等值条件和排序字段存在性
    pub fn matches(&self, fields: &Fields) -> bool {
        let filters_ok = self
            .filters
            .iter()
            .all(|(field, value)| fields.get(field) == Some(value));
        let order_ok = self
            .order_by
            .as_ref()
            .is_none_or(|(field, _)| fields.contains_key(field));
        filters_ok && order_ok
    }
}

/// 更新前置条件
#[derive(Debug, Clone, PartialEq)]
pub enum Precondition {
    /// 无条件合并
    None,
    /// 仅当字段当前值等于期望值时更新（乐观并发控制）
    FieldEquals { field: String, value: Value },
}

impl Precondition {
    pub fn field_equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::FieldEquals {
            field: field.into(),
            value: value.into(),
        }
    }

    /// 前置条件对应的包含匹配对象
    pub fn as_object(&self) -> Value {
        let mut fields = Fields::new();
        if let Self::FieldEquals { field, value } = self {
            fields.insert(field.clone(), value.clone());
        }
        Value::Object(fields)
    }

    pub fn is_satisfied_by(&self, fields: &Fields) -> bool {
        match self {
            Self::None => true,
            Self::FieldEquals { field, value } => fields.get(field) == Some(value),
        }
    }
}

/// 更新结果
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// 已更新，携带更新后的文档
    Updated(Document),
    NotFound,
    /// 前置条件不满足，携带当前文档
    PreconditionFailed(Document),
}

/// 文档存储接口
///
/// 单文档写入是原子的；不提供跨文档事务。
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// 后端名称，用于日志和就绪探针
    fn backend(&self) -> &'static str;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// 批量读取，不存在的 ID 直接省略
    async fn get_many(&self, collection: &str, ids: &[String]) -> Result<Vec<Document>>;

    async fn query(&self, query: &Query) -> Result<Vec<Document>>;

    /// 以生成的 ID 追加文档
    async fn add(&self, collection: &str, data: DocumentData) -> Result<Document>;

    /// 以调用方指定的 ID 创建或整体覆盖文档
    async fn set(&self, collection: &str, id: &str, data: DocumentData) -> Result<Document>;

    /// 合并更新字段
    async fn update(
        &self,
        collection: &str,
        id: &str,
        data: DocumentData,
        precondition: Precondition,
    ) -> Result<UpdateOutcome>;

    async fn health_check(&self) -> Result<()>;
}

/// 生成文档 ID（UUID v7，无连字符），按时间单调递增
pub fn generate_id() -> String {
    Uuid::now_v7().simple().to_string()
}
