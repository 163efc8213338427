//! 上传数据
//!
//! 只在单个请求的生命周期内存在，由编排层独占

use bytes::Bytes;

/// 单个上传文件（声明的文件名 + 原始字节）
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub content: Bytes,
}

impl UploadFile {
    pub fn new(filename: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }

    /// 文件名非空才算"已选择"
    pub fn is_selected(&self) -> bool {
        !self.filename.is_empty()
    }

    /// 只检查文件名后缀（不区分大小写），不检查文件内容
    pub fn has_pdf_extension(&self) -> bool {
        self.filename.to_ascii_lowercase().ends_with(".pdf")
    }
}

/// 一次请求中的两个上传槽位
#[derive(Debug, Clone, Default)]
pub struct UploadPair {
    pub file1: Option<UploadFile>,
    pub file2: Option<UploadFile>,
}

impl UploadPair {
    pub fn new(file1: UploadFile, file2: UploadFile) -> Self {
        Self {
            file1: Some(file1),
            file2: Some(file2),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_extension() {
        assert!(UploadFile::new("a.pdf", "x").has_pdf_extension());
        assert!(UploadFile::new("Protocol.PDF", "x").has_pdf_extension());
        assert!(UploadFile::new(".pdf", "x").has_pdf_extension());
        assert!(!UploadFile::new("b.txt", "x").has_pdf_extension());
        assert!(!UploadFile::new("pdf", "x").has_pdf_extension());
        assert!(!UploadFile::new("a.pdf.exe", "x").has_pdf_extension());
    }

    #[test]
    fn test_is_selected() {
        assert!(!UploadFile::new("", "x").is_selected());
        assert!(UploadFile::new("a.pdf", "").is_selected());
    }
}
