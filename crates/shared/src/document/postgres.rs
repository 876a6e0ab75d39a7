//! PostgreSQL 文档存储
//!
//! 所有集合共用 `documents` 表，文档内容存为 JSONB。等值过滤与前置条件
//! 都转换为 `@>` 包含匹配；条件更新在单条 UPDATE 中完成，由行锁保证原子性。

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::types::Json;
use sqlx::FromRow;
use tracing::{debug, info, instrument};

use super::{
    Document, DocumentData, DocumentStore, Fields, Precondition, Query, UpdateOutcome,
    generate_id, timestamp,
};
use crate::config::DatabaseConfig;
use crate::error::Result;

/// PostgreSQL 文档存储
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct DocumentRow {
    id: String,
    data: Json<Fields>,
}

impl From<DocumentRow> for Document {
    fn from(row: DocumentRow) -> Self {
        Document::new(row.id, row.data.0)
    }
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 按配置建立连接池并执行表结构迁移
    #[instrument(skip(config), fields(max_connections = config.max_connections))]
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(Duration::from_secs(config.connect_timeout_seconds))
            .idle_timeout(Duration::from_secs(config.idle_timeout_seconds))
            .connect(&config.url)
            .await?;
        info!("Document store connection pool created");

        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// 关闭连接池
    pub async fn close(&self) {
        self.pool.close().await;
        info!("Document store connection pool closed");
    }

    /// 执行内嵌的表结构迁移
    #[instrument(skip(self))]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Document store schema is up to date");
        Ok(())
    }

    /// 构造查询 SQL，有排序字段时占用 $3，LIMIT 顺延
    fn build_query_sql(query: &Query) -> String {
        let mut sql = String::from(
            "SELECT id, data FROM documents WHERE collection = $1 AND data @> $2",
        );
        match &query.order_by {
            Some((_, direction)) => {
                let dir = direction.as_sql();
                sql.push_str(&format!(
                    " AND data ? $3 ORDER BY data -> $3 {dir}, seq {dir} LIMIT $4"
                ));
            }
            None => sql.push_str(" ORDER BY seq ASC LIMIT $3"),
        }
        sql
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, data FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Document::from))
    }

    async fn get_many(&self, collection: &str, ids: &[String]) -> Result<Vec<Document>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, data FROM documents
            WHERE collection = $1 AND id = ANY($2)
            ORDER BY seq
            "#,
        )
        .bind(collection)
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>> {
        let sql = Self::build_query_sql(query);
        let limit = query.limit.map(|n| n as i64);

        let mut q = sqlx::query_as::<_, DocumentRow>(&sql)
            .bind(&query.collection)
            .bind(Json(query.filter_object()));
        if let Some((field, _)) = &query.order_by {
            q = q.bind(field);
        }
        let rows = q.bind(limit).fetch_all(&self.pool).await?;

        debug!(
            collection = %query.collection,
            count = rows.len(),
            "文档查询完成"
        );
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn add(&self, collection: &str, data: DocumentData) -> Result<Document> {
        let id = generate_id();
        let fields = data.resolve(timestamp::now());

        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            RETURNING id, data
            "#,
        )
        .bind(collection)
        .bind(&id)
        .bind(Json(&fields))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn set(&self, collection: &str, id: &str, data: DocumentData) -> Result<Document> {
        let fields = data.resolve(timestamp::now());

        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            INSERT INTO documents (collection, id, data)
            VALUES ($1, $2, $3)
            ON CONFLICT (collection, id)
            DO UPDATE SET data = EXCLUDED.data, updated_at = NOW()
            RETURNING id, data
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(&fields))
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        data: DocumentData,
        precondition: Precondition,
    ) -> Result<UpdateOutcome> {
        let fields = data.resolve(timestamp::now());

        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            UPDATE documents
            SET data = data || $3, updated_at = NOW()
            WHERE collection = $1 AND id = $2 AND data @> $4
            RETURNING id, data
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(Json(&fields))
        .bind(Json(precondition.as_object()))
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = row {
            return Ok(UpdateOutcome::Updated(row.into()));
        }

        // 未命中：区分文档不存在与前置条件不满足
        Ok(match self.get(collection, id).await? {
            Some(current) => UpdateOutcome::PreconditionFailed(current),
            None => UpdateOutcome::NotFound,
        })
    }

    async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
