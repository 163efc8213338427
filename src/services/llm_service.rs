//! LLM 服务 - 业务能力层
//!
//! 只负责"比较两段文本"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 支持自定义 API 端点和模型
//! - 兼容 OpenAI API 的服务（如 Azure, Gemini, Doubao 等）
//! - 单次调用由 `tokio::time::timeout` 限时，瞬时失败由 `tokio-retry` 重试
//! - 关闭客户端自带的退避重试，重试次数只由 `llm_max_retries` 决定

use std::time::{Duration, Instant};

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use backoff::ExponentialBackoff;
use tokio_retry::strategy::{jitter, ExponentialBackoff as RetryBackoff};
use tokio_retry::RetryIf;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::LlmError;
use crate::utils::logging::truncate_text;

/// 比较指令（系统消息）
pub const COMPARE_INSTRUCTION: &str = "Compare the differences between the first document and the second document. \
Formatting is unimportant, only the substantive content matters.";

/// 文档比较能力
///
/// 一次调用只发出一个请求，不拆分、不合并长文本。
#[async_trait]
pub trait DocumentComparer: Send + Sync {
    async fn compare(&self, first: &str, second: &str) -> Result<String, LlmError>;
}

/// LLM 服务
///
/// 职责：
/// - 持有长期复用的 API 客户端（无请求级状态，可并发使用）
/// - 构造比较请求并返回模型的原始回答
/// - 超时、网络错误按配置重试
/// - 不接触临时文件，不关心上传流程
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    timeout: Duration,
    max_retries: usize,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Result<Self, LlmError> {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let http_client = reqwest::Client::builder()
            .connect_timeout(config.llm_connect_timeout())
            .build()
            .map_err(LlmError::HttpClient)?;

        // 客户端默认会对 5xx/429 退避重试最长 15 分钟，这里一次失败即返回
        let no_backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::ZERO),
            ..Default::default()
        };

        let client = Client::with_config(openai_config)
            .with_http_client(http_client)
            .with_backoff(no_backoff);

        Ok(Self {
            client,
            model_name: config.llm_model_name.clone(),
            timeout: config.llm_timeout(),
            max_retries: config.llm_max_retries,
        })
    }

    /// 覆盖单次调用超时
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 构建比较请求
    ///
    /// 系统消息是固定指令，用户消息依次嵌入两份文本。
    pub fn build_request(
        &self,
        first: &str,
        second: &str,
    ) -> Result<CreateChatCompletionRequest, LlmError> {
        let system_msg = ChatCompletionRequestSystemMessageArgs::default()
            .content(COMPARE_INSTRUCTION)
            .build()
            .map_err(LlmError::InvalidRequest)?;

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(build_user_message(first, second))
            .build()
            .map_err(LlmError::InvalidRequest)?;

        CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![
                ChatCompletionRequestMessage::System(system_msg),
                ChatCompletionRequestMessage::User(user_msg),
            ])
            .build()
            .map_err(LlmError::InvalidRequest)
    }

    /// 发送一次请求（不重试）
    async fn send_once(&self, request: &CreateChatCompletionRequest) -> Result<String, LlmError> {
        debug!("调用 LLM API，模型: {}", self.model_name);

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request.clone()))
            .await
            .map_err(|_| LlmError::Timeout {
                model: self.model_name.clone(),
                timeout: self.timeout,
            })?
            .map_err(|e| LlmError::ApiCallFailed {
                model: self.model_name.clone(),
                source: e,
            })?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::EmptyResponse {
                model: self.model_name.clone(),
            })?;

        // 原样返回，只拒绝空白回答
        let content = choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| LlmError::EmptyContent {
                model: self.model_name.clone(),
            })?;

        debug!("LLM 回答: {}", truncate_text(&content, 200));

        Ok(content)
    }
}

#[async_trait]
impl DocumentComparer for LlmService {
    async fn compare(&self, first: &str, second: &str) -> Result<String, LlmError> {
        info!(
            "🤖 调用 LLM 比较文档，模型: {}，文本长度: {} / {} 字符",
            self.model_name,
            first.chars().count(),
            second.chars().count()
        );

        let request = self.build_request(first, second)?;

        // 约 0.5s, 1s, 2s ... 上限 5s
        let strategy = RetryBackoff::from_millis(2)
            .factor(250)
            .max_delay(Duration::from_secs(5))
            .map(jitter)
            .take(self.max_retries);

        let attempts = self.max_retries + 1;
        let mut failures = 0usize;
        let started = Instant::now();

        // 重试次数由 strategy 的 take 限定
        let result = RetryIf::start(
            strategy,
            || self.send_once(&request),
            |e: &LlmError| {
                failures += 1;
                let retry = e.is_transient();
                if retry && failures < attempts {
                    warn!("LLM 调用失败 (尝试 {}/{}), 准备重试: {}", failures, attempts, e);
                }
                retry
            },
        )
        .await;

        match &result {
            Ok(_) => info!("✓ LLM 比较完成，耗时 {:.1?}", started.elapsed()),
            Err(e) => warn!("LLM 比较失败，耗时 {:.1?}: {}", started.elapsed(), e),
        }

        result
    }
}

/// 用户消息：两份文档依次嵌入
fn build_user_message(first: &str, second: &str) -> String {
    format!(
        "Here are the documents:\n\nFirst document:\n{}\n\nSecond document:\n{}",
        first, second
    )
}
