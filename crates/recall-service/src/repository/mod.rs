//! 仓储层
//!
//! 在无模式文档存储之上提供按实体类型的读写接口，负责集合命名、字段编码与解码。

pub mod customer_repo;
pub mod product_repo;
pub mod purchase_repo;
pub mod recall_repo;
pub mod refund_repo;

pub use customer_repo::CustomerRepository;
pub use product_repo::ProductRepository;
pub use purchase_repo::PurchaseRepository;
pub use recall_repo::RecallRepository;
pub use refund_repo::{MarkIssuedOutcome, RefundRepository};

use recall_shared::document::Document;
use recall_shared::error::Result;
use serde::de::DeserializeOwned;

/// 批量解码
fn decode_all<T: DeserializeOwned>(collection: &str, docs: &[Document]) -> Result<Vec<T>> {
    docs.iter().map(|doc| doc.decode(collection)).collect()
}
