//! 共享库
//!
//! 包含召回服务共用的配置、错误处理、文档存储适配层与可观测性等基础设施代码。

pub mod config;
pub mod document;
pub mod error;
pub mod observability;
