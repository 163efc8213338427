//! # PDF Compare
//!
//! 上传两个 PDF 文档，提取文字，交给 LLM 总结两者在内容上的差异
//!
//! ## 架构设计
//!
//! 本系统采用分层架构，依赖只向下：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有请求级临时资源，只暴露能力
//! - `StagedDocument` - 临时文件的唯一持有者，drop 时删除
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心流程
//! - `PdfExtractor` - 按页顺序提取文字
//! - `LlmService` - 比较两段文本（超时 + 重试）
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/upload_processor` - 校验 → 暂存 → 提取 → 比较 → 响应 → 清理
//!
//! ### ④ 接口层（API）
//! - `api/` - axum 路由、multipart 解析、状态码映射、panic 兜底

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use app::App;
pub use config::Config;
pub use error::{ExtractError, LlmError, UploadError, ValidationError};
pub use infrastructure::StagedDocument;
pub use models::{ComparisonResult, ResponseBody, UploadFile, UploadPair};
pub use orchestrator::UploadProcessor;
pub use services::{DocumentComparer, LlmService, PdfExtractor, TextExtractor};
