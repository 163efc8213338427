//! 上传接口
//!
//! - `GET /`：上传页面
//! - `POST /upload`：multipart 字段 `file1`、`file2`

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, State,
    },
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Router,
};
use futures::FutureExt;
use tracing::{debug, error, warn};

use crate::error::{UploadError, ValidationError};
use crate::models::{UploadFile, UploadPair};
use crate::orchestrator::UploadProcessor;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// 路由共享状态
#[derive(Clone)]
pub struct AppState {
    pub processor: Arc<UploadProcessor>,
    pub max_content_length: usize,
}

/// 构建路由
pub fn router(processor: Arc<UploadProcessor>, max_content_length: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
        .layer(DefaultBodyLimit::max(max_content_length))
        .with_state(AppState {
            processor,
            max_content_length,
        })
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// 上传并比较两个文件
///
/// 这里是最外层边界：任何 panic 都被转换成统一的 "unexpected error"。
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let pair = match read_upload_pair(multipart, state.max_content_length).await {
        Ok(pair) => pair,
        Err(e) => return e.into_response(),
    };

    let outcome = AssertUnwindSafe(state.processor.handle_upload(pair))
        .catch_unwind()
        .await;

    match outcome {
        Ok(Ok(result)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            result.into_json(),
        )
            .into_response(),
        Ok(Err(e)) => e.into_response(),
        Err(panic) => {
            error!("处理上传时发生 panic: {}", panic_message(panic.as_ref()));
            UploadError::Unexpected.into_response()
        }
    }
}

/// 从 multipart 中读取两个槽位，其余字段忽略
async fn read_upload_pair(
    multipart: Result<Multipart, MultipartRejection>,
    limit: usize,
) -> Result<UploadPair, UploadError> {
    let mut multipart = multipart.map_err(|e| {
        warn!("无法解析 multipart 请求: {}", e);
        ValidationError::MalformedUpload
    })?;

    let mut pair = UploadPair::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        let slot = match field.name() {
            Some("file1") => &mut pair.file1,
            Some("file2") => &mut pair.file2,
            other => {
                debug!("忽略字段: {:?}", other);
                continue;
            }
        };

        let filename = field.file_name().unwrap_or_default().to_string();
        let content = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
        *slot = Some(UploadFile::new(filename, content));
    }

    Ok(pair)
}

fn multipart_error(e: MultipartError, limit: usize) -> UploadError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!("上传超过大小上限 {} 字节", limit);
        UploadError::PayloadTooLarge { limit }
    } else {
        warn!("读取 multipart 数据失败: {}", e);
        ValidationError::MalformedUpload.into()
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic"
    }
}
