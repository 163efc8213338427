//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责单次上传请求的完整流程，是整个系统的"指挥中心"。
//!
//! ### `upload_processor` - 上传处理器
//! - 校验两个上传槽位（存在、文件名后缀）
//! - 将上传内容暂存为请求级临时文件（`StagedDocument`）
//! - 并发提取两份文本，汇合后调用比较服务
//! - 把内部错误转换为对外的 `UploadError`（只在这里转换一次）
//! - 无论成功失败都释放临时文件
//!
//! ## 层次关系
//!
//! ```text
//! api (HTTP 边界)
//!     ↓
//! upload_processor (处理 UploadPair)
//!     ↓
//! services (能力层：extract / compare)
//!     ↓
//! infrastructure (基础设施：StagedDocument)
//! ```

pub mod upload_processor;

pub use upload_processor::UploadProcessor;
