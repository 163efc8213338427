//! 上传处理器 - 编排层
//!
//! ## 流程
//!
//! 1. **校验**：两个槽位都有文件名，且都以 `.pdf` 结尾
//! 2. **暂存**：写入临时目录下唯一命名的文件
//! 3. **提取**：两份文档并发提取文本
//! 4. **比较**：调用比较服务
//! 5. **响应**：先序列化，确认结果完整
//! 6. **清理**：删除两个临时文件（任何退出路径都会执行）

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::{UploadError, ValidationError};
use crate::infrastructure::StagedDocument;
use crate::models::{ComparisonResult, UploadFile, UploadPair};
use crate::services::{DocumentComparer, TextExtractor};

/// 上传处理器
///
/// 所有依赖都由外部注入；本身不持有请求级状态，可被多个请求并发共享。
pub struct UploadProcessor {
    extractor: Arc<dyn TextExtractor>,
    comparer: Arc<dyn DocumentComparer>,
    scratch_dir: PathBuf,
}

impl UploadProcessor {
    pub fn new(
        extractor: Arc<dyn TextExtractor>,
        comparer: Arc<dyn DocumentComparer>,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            extractor,
            comparer,
            scratch_dir: scratch_dir.into(),
        }
    }

    /// 处理一次上传
    pub async fn handle_upload(&self, pair: UploadPair) -> Result<ComparisonResult, UploadError> {
        let (first, second) = validate(pair).map_err(|e| {
            warn!("上传校验失败: {}", e);
            e
        })?;

        info!(
            "📄 收到上传: {} ({} 字节) / {} ({} 字节)",
            first.filename,
            first.content.len(),
            second.filename,
            second.content.len()
        );

        let (staged_first, staged_second) = self.stage(first, second).await?;

        let outcome = self.compare_staged(&staged_first, &staged_second).await;

        // 清理（出错时同样走到这里；panic 时由 drop 兜底）
        staged_first.release();
        staged_second.release();

        outcome
    }

    /// 暂存两个上传文件
    async fn stage(
        &self,
        first: UploadFile,
        second: UploadFile,
    ) -> Result<(StagedDocument, StagedDocument), UploadError> {
        let dir = self.scratch_dir.clone();

        tokio::task::spawn_blocking(move || {
            let staged_first = StagedDocument::stage(&dir, &first.content)?;
            let staged_second = StagedDocument::stage(&dir, &second.content)?;
            Ok::<_, std::io::Error>((staged_first, staged_second))
        })
        .await
        .map_err(|e| {
            error!("暂存任务异常终止: {}", e);
            UploadError::Unexpected
        })?
        .map_err(|e| {
            error!("暂存上传文件失败 ({}): {}", self.scratch_dir.display(), e);
            UploadError::Unexpected
        })
    }

    /// 提取 → 比较 → 序列化
    async fn compare_staged(
        &self,
        first: &StagedDocument,
        second: &StagedDocument,
    ) -> Result<ComparisonResult, UploadError> {
        let (first_text, second_text) =
            tokio::try_join!(self.extract(first.path()), self.extract(second.path()))?;

        info!(
            "✓ 文本提取完成: {} / {} 字符",
            first_text.chars().count(),
            second_text.chars().count()
        );

        let comparison = self
            .comparer
            .compare(&first_text, &second_text)
            .await
            .map_err(|e| {
                error!("❌ 文档比较失败: {}", e);
                UploadError::Comparison
            })?;

        if comparison.trim().is_empty() {
            error!("❌ 比较服务返回了空结果");
            return Err(UploadError::Comparison);
        }

        ComparisonResult::new(comparison).map_err(|e| {
            error!("❌ 比较结果序列化失败: {}", e);
            UploadError::Serialization
        })
    }

    /// 在阻塞线程池中提取单个文档
    async fn extract(&self, path: &Path) -> Result<String, UploadError> {
        let extractor = Arc::clone(&self.extractor);
        let path = path.to_path_buf();

        tokio::task::spawn_blocking(move || extractor.extract(&path))
            .await
            .map_err(|e| {
                error!("文本提取任务异常终止: {}", e);
                UploadError::Unexpected
            })?
            .map_err(|e| {
                error!("❌ 文本提取失败: {}", e);
                UploadError::Extraction
            })
    }
}

/// 校验两个槽位
///
/// 只看文件名后缀，不检查文件内容。
fn validate(pair: UploadPair) -> Result<(UploadFile, UploadFile), ValidationError> {
    let first = pair.file1.filter(UploadFile::is_selected);
    let second = pair.file2.filter(UploadFile::is_selected);

    let (Some(first), Some(second)) = (first, second) else {
        return Err(ValidationError::MissingFile);
    };

    if !(first.has_pdf_extension() && second.has_pdf_extension()) {
        return Err(ValidationError::NotPdf);
    }

    Ok((first, second))
}
