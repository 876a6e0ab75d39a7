//! 领域模型
//!
//! 每个实体对应文档存储中的一个集合，ID 由文档键承载并在读取时合并回实体。

pub mod customer;
pub mod product;
pub mod purchase;
pub mod recall;
pub mod refund;

pub use customer::Customer;
pub use product::Product;
pub use purchase::Purchase;
pub use recall::Recall;
pub use refund::{MAX_REFUND_AMOUNT, NewRefund, Refund, RefundState, RefundStatus};
