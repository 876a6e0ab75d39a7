//! 请求与响应 DTO

pub mod request;
pub mod response;

pub use request::{
    AffectedCustomersRequest, CreatePendingRefundRequest, ListRefundsQuery, RefundIdRequest,
    SendEmailRequest,
};
pub use response::{
    CreatedRefundResponse, EmailResponse, IssueRefundResponse, RecallCreatedResponse,
    RecallListResponse, RefundListResponse, RefundStatusResponse, SeedResponse,
};
