use std::time::Duration;

use async_openai::error::{ApiError, OpenAIError};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ResponseBody;

/// 上传请求的错误类型
///
/// 这是唯一会返回给调用方的错误，`Display` 即对外消息。
/// 底层错误（解析器、LLM 服务）在转换为本类型之前记录日志，细节不会进入这里。
#[derive(Debug, Error)]
pub enum UploadError {
    /// 输入不合法（缺文件、类型不对）
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// 请求体超过上限
    #[error("upload exceeds maximum size of {limit} bytes")]
    PayloadTooLarge { limit: usize },

    /// 文档无法读取
    #[error("could not read document")]
    Extraction,

    /// 比较服务不可用、超时或返回空结果
    #[error("comparison failed, please try again later")]
    Comparison,

    /// 结果无法安全编码
    #[error("failed to encode comparison result")]
    Serialization,

    /// 兜底
    #[error("an unexpected error occurred")]
    Unexpected,
}

/// 输入校验错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("both files required")]
    MissingFile,

    #[error("both files must be PDFs")]
    NotPdf,

    #[error("malformed upload")]
    MalformedUpload,
}

impl UploadError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            UploadError::Validation(_) => StatusCode::BAD_REQUEST,
            UploadError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            UploadError::Extraction
            | UploadError::Comparison
            | UploadError::Serialization
            | UploadError::Unexpected => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for UploadError {
    fn into_response(self) -> Response {
        let body = ResponseBody::Error {
            error: self.to_string(),
        };
        (self.status_code(), Json(body)).into_response()
    }
}

/// 文本提取错误
#[derive(Debug, Error)]
pub enum ExtractError {
    /// 无法作为 PDF 打开
    #[error("无法解析文档 ({path}): {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: lopdf::Error,
    },

    /// 读取某一页失败
    #[error("读取第 {page} 页失败: {source}")]
    PageFailed {
        page: u32,
        #[source]
        source: lopdf::Error,
    },

    /// 没有可提取的文字层
    #[error("文档没有可提取的文字 ({path})")]
    NoTextLayer { path: String },
}

/// LLM 服务错误
#[derive(Debug, Error)]
pub enum LlmError {
    /// API 调用失败
    #[error("LLM API调用失败 (模型: {model}): {source}")]
    ApiCallFailed {
        model: String,
        #[source]
        source: OpenAIError,
    },

    /// 单次调用超时
    #[error("LLM 调用超时 (模型: {model}, 超时: {timeout:?})")]
    Timeout { model: String, timeout: Duration },

    /// 返回结果为空
    #[error("LLM返回结果为空 (模型: {model})")]
    EmptyResponse { model: String },

    /// 返回内容为空
    #[error("LLM返回内容为空 (模型: {model})")]
    EmptyContent { model: String },

    /// 请求构建失败
    #[error("构建 LLM 请求失败: {0}")]
    InvalidRequest(#[source] OpenAIError),

    /// HTTP 客户端初始化失败
    #[error("初始化 HTTP 客户端失败: {0}")]
    HttpClient(#[source] reqwest::Error),
}

impl LlmError {
    /// 是否值得重试
    ///
    /// 超时、网络层错误、服务端 5xx 和限流是瞬时的；
    /// API 明确拒绝（鉴权、参数、额度）、空结果不重试。
    pub fn is_transient(&self) -> bool {
        match self {
            LlmError::Timeout { .. } => true,
            LlmError::ApiCallFailed { source, .. } => match source {
                OpenAIError::Reqwest(_) => true,
                OpenAIError::ApiError(api) => is_transient_api_error(api),
                _ => false,
            },
            LlmError::EmptyResponse { .. }
            | LlmError::EmptyContent { .. }
            | LlmError::InvalidRequest(_)
            | LlmError::HttpClient(_) => false,
        }
    }
}

/// 服务端错误或限流
///
/// 5xx 响应体不会被解析，只保留原文，因此没有 type 和 code。
fn is_transient_api_error(api: &ApiError) -> bool {
    let kind = api.r#type.as_deref();
    let code = api.code.as_deref();

    if kind == Some("insufficient_quota") || code == Some("insufficient_quota") {
        return false;
    }

    match (kind, code) {
        (None, None) => true,
        (Some("server_error"), _) => true,
        (Some("rate_limit_exceeded" | "requests" | "tokens"), _) => true,
        (_, Some("rate_limit_exceeded")) => true,
        _ => false,
    }
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("TOML解析失败 ({path}): {source}")]
    ParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            UploadError::from(ValidationError::MissingFile).to_string(),
            "both files required"
        );
        assert_eq!(
            UploadError::from(ValidationError::NotPdf).to_string(),
            "both files must be PDFs"
        );
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            UploadError::Validation(ValidationError::NotPdf).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            UploadError::PayloadTooLarge { limit: 10 }.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        for err in [
            UploadError::Extraction,
            UploadError::Comparison,
            UploadError::Serialization,
            UploadError::Unexpected,
        ] {
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_transient_classification() {
        let timeout = LlmError::Timeout {
            model: "gpt-4o".to_string(),
            timeout: Duration::from_secs(1),
        };
        assert!(timeout.is_transient());

        let empty = LlmError::EmptyContent {
            model: "gpt-4o".to_string(),
        };
        assert!(!empty.is_transient());

        let rejected = LlmError::ApiCallFailed {
            model: "gpt-4o".to_string(),
            source: OpenAIError::InvalidArgument("bad".to_string()),
        };
        assert!(!rejected.is_transient());
    }

    fn api_failure(kind: Option<&str>, code: Option<&str>) -> LlmError {
        LlmError::ApiCallFailed {
            model: "gpt-4o".to_string(),
            source: OpenAIError::ApiError(ApiError {
                message: "upstream said no".to_string(),
                r#type: kind.map(str::to_string),
                param: None,
                code: code.map(str::to_string),
            }),
        }
    }

    #[test]
    fn test_api_error_classification() {
        // 5xx：原文保留，无 type/code
        assert!(api_failure(None, None).is_transient());
        assert!(api_failure(Some("server_error"), None).is_transient());
        assert!(api_failure(Some("requests"), Some("rate_limit_exceeded")).is_transient());

        assert!(!api_failure(Some("insufficient_quota"), Some("insufficient_quota")).is_transient());
        assert!(!api_failure(Some("invalid_request_error"), Some("invalid_api_key")).is_transient());
        assert!(!api_failure(Some("invalid_request_error"), None).is_transient());
    }
}
