//! API 模块
//!
//! HTTP 边界：路由、multipart 解析、错误到状态码的映射

pub mod upload;

pub use upload::{router, AppState};
