//! 临时文档 - 基础设施层
//!
//! 持有一次请求内的临时文件，只暴露"路径"这一能力

use std::io::Write;
use std::path::Path;

use tempfile::TempPath;
use tracing::{debug, warn};

/// 临时文档
///
/// 职责：
/// - 把上传的字节写入临时目录下一个唯一命名的文件
/// - 被 drop 时删除该文件（成功、出错、panic、请求被取消都会走到这里）
/// - 删除失败只记日志，不影响已经确定的结果
/// - 不认识 PDF，不参与文本提取
pub struct StagedDocument {
    path: Option<TempPath>,
}

impl StagedDocument {
    /// 在 `dir` 下创建新文件并写入 `content`
    ///
    /// 写入失败时已创建的文件会被立即删除。
    pub fn stage(dir: &Path, content: &[u8]) -> std::io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(".pdf")
            .tempfile_in(dir)?;
        file.write_all(content)?;
        file.flush()?;

        let path = file.into_temp_path();
        debug!("已暂存上传文件: {} ({} 字节)", path.display(), content.len());

        Ok(Self { path: Some(path) })
    }

    /// 临时文件的路径
    pub fn path(&self) -> &Path {
        self.path
            .as_deref()
            .expect("path is only taken in drop")
    }

    /// 显式释放（删除临时文件）
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for StagedDocument {
    fn drop(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        let shown = path.display().to_string();
        match path.close() {
            Ok(()) => debug!("已删除临时文件: {}", shown),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("临时文件已不存在: {}", shown)
            }
            Err(e) => warn!("删除临时文件失败 ({}): {}", shown, e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_stage_writes_content() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagedDocument::stage(dir.path(), b"%PDF-1.5 test").unwrap();

        assert!(staged.path().starts_with(dir.path()));
        assert_eq!(std::fs::read(staged.path()).unwrap(), b"%PDF-1.5 test");
        assert_eq!(entries(dir.path()), 1);
    }

    #[test]
    fn test_release_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagedDocument::stage(dir.path(), b"abc").unwrap();
        let path = staged.path().to_path_buf();

        staged.release();

        assert!(!path.exists());
        assert_eq!(entries(dir.path()), 0);
    }

    #[test]
    fn test_unique_names() {
        let dir = tempfile::tempdir().unwrap();
        let a = StagedDocument::stage(dir.path(), b"same").unwrap();
        let b = StagedDocument::stage(dir.path(), b"same").unwrap();

        assert_ne!(a.path(), b.path());
        assert_eq!(entries(dir.path()), 2);
    }

    #[test]
    fn test_already_removed_file_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagedDocument::stage(dir.path(), b"abc").unwrap();
        std::fs::remove_file(staged.path()).unwrap();

        // 不应 panic
        staged.release();
    }

    #[test]
    fn test_drop_logs_with_debug_subscriber() {
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let dir = tempfile::tempdir().unwrap();
        let kept = StagedDocument::stage(dir.path(), b"abc").unwrap();
        let gone = StagedDocument::stage(dir.path(), b"def").unwrap();
        std::fs::remove_file(gone.path()).unwrap();

        drop(kept);
        drop(gone);

        assert_eq!(entries(dir.path()), 0);
    }

    #[test]
    fn test_missing_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        assert!(StagedDocument::stage(&missing, b"abc").is_err());
    }
}
