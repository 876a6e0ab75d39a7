//! 退款仓储
//!
//! `refunds` 集合的读写。状态流转只有 pending -> issued 一次，
//! 通过 `status = pending` 前置条件的条件更新完成。

use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use recall_shared::document::{
    Direction, DocumentData, DocumentStore, Precondition, Query, UpdateOutcome,
};
use recall_shared::error::Result;
use tracing::debug;

use super::decode_all;
use crate::models::{NewRefund, Refund, RefundState, RefundStatus};

pub const COLLECTION: &str = "refunds";

/// 标记发放结果
#[derive(Debug, Clone, PartialEq)]
pub enum MarkIssuedOutcome {
    Issued(Refund),
    NotFound,
    /// 已被其他请求发放，携带当前记录
    AlreadyIssued(Refund),
}

#[derive(Clone)]
pub struct RefundRepository {
    store: Arc<dyn DocumentStore>,
}

impl RefundRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// 创建待处理退款，createdAt 由存储填充
    pub async fn create_pending(&self, refund: &NewRefund) -> Result<Refund> {
        let data = DocumentData::from_serializable(refund)?
            .set("status", RefundStatus::Pending.as_str())
            .server_timestamp("createdAt");

        let doc = self.store.add(COLLECTION, data).await?;
        debug!(refund_id = %doc.id, "Pending refund stored");
        doc.decode(COLLECTION)
    }

    pub async fn get(&self, id: &str) -> Result<Option<Refund>> {
        self.store
            .get(COLLECTION, id)
            .await?
            .map(|doc| doc.decode(COLLECTION))
            .transpose()
    }

    /// 按创建时间倒序列出退款，可按状态过滤
    pub async fn list(&self, status: Option<RefundStatus>) -> Result<Vec<Refund>> {
        let mut query = Query::collection(COLLECTION).order_by("createdAt", Direction::Descending);
        if let Some(status) = status {
            query = query.where_eq("status", status.as_str());
        }

        let docs = self.store.query(&query).await?;
        decode_all(COLLECTION, &docs)
    }

    /// 全量扫描（统计用）
    pub async fn scan_all(&self) -> Result<Vec<Refund>> {
        let docs = self.store.query(&Query::collection(COLLECTION)).await?;
        decode_all(COLLECTION, &docs)
    }

    /// 条件更新为已发放
    pub async fn mark_issued(&self, id: &str, settlement_ref: &str) -> Result<MarkIssuedOutcome> {
        let data = DocumentData::new()
            .set("status", RefundStatus::Issued.as_str())
            .set("settlementRef", settlement_ref)
            .server_timestamp("issuedAt");

        let outcome = self
            .store
            .update(
                COLLECTION,
                id,
                data,
                Precondition::field_equals("status", RefundStatus::Pending.as_str()),
            )
            .await?;

        Ok(match outcome {
            UpdateOutcome::Updated(doc) => MarkIssuedOutcome::Issued(doc.decode(COLLECTION)?),
            UpdateOutcome::NotFound => MarkIssuedOutcome::NotFound,
            UpdateOutcome::PreconditionFailed(doc) => {
                MarkIssuedOutcome::AlreadyIssued(doc.decode(COLLECTION)?)
            }
        })
    }

    /// 以指定 ID 写入完整记录（样例数据用）
    ///
    /// `created_at` 为空时由存储时钟填充。
    pub async fn put(&self, refund: &Refund) -> Result<()> {
        let mut data = DocumentData::from_serializable(refund)?;
        if refund.created_at.is_none() {
            data = data.server_timestamp("createdAt");
        }
        self.store.set(COLLECTION, &refund.id, data).await?;
        Ok(())
    }
}

/// 构造已发放状态（样例数据用），时间截断到存储精度
pub fn issued_state(issued_at: DateTime<Utc>, settlement_ref: impl Into<String>) -> RefundState {
    RefundState::Issued {
        issued_at: issued_at.trunc_subsecs(6),
        settlement_ref: settlement_ref.into(),
    }
}
