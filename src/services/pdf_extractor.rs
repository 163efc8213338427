//! 文本提取服务 - 业务能力层
//!
//! 只负责"从文档中读出文字"能力，不关心流程

use std::path::Path;

use lopdf::Document;
use tracing::debug;

use crate::error::ExtractError;

/// 文本提取能力
pub trait TextExtractor: Send + Sync {
    /// 读取 `path` 指向的文档，返回按页顺序拼接的纯文本
    ///
    /// 只读，不修改也不删除文件。
    fn extract(&self, path: &Path) -> Result<String, ExtractError>;
}

/// PDF 文本提取
///
/// 职责：
/// - 按页码升序读取每一页的文字层
/// - 页与页之间直接拼接，不插入分隔符
/// - 解析失败、没有文字层时返回错误
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let document = Document::load(path).map_err(|e| ExtractError::OpenFailed {
            path: path.display().to_string(),
            source: e,
        })?;

        // BTreeMap，按页码升序
        let pages = document.get_pages();
        debug!("文档 {} 共 {} 页", path.display(), pages.len());

        let mut text = String::new();
        for &page in pages.keys() {
            let page_text = document
                .extract_text(&[page])
                .map_err(|e| ExtractError::PageFailed { page, source: e })?;
            // 提取器会在每个文本块后追加换行
            text.push_str(page_text.trim_end_matches(|c| c == '\r' || c == '\n'));
        }

        if text.trim().is_empty() {
            return Err(ExtractError::NoTextLayer {
                path: path.display().to_string(),
            });
        }

        Ok(text)
    }
}
