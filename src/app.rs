//! 应用生命周期
//!
//! 初始化（临时目录、服务、路由）→ 运行（监听、优雅退出）

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::api;
use crate::config::Config;
use crate::orchestrator::UploadProcessor;
use crate::services::{LlmService, PdfExtractor};
use crate::utils::logging::log_startup;

/// 应用主结构
pub struct App {
    config: Config,
    router: Router,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        // 创建临时目录
        let upload_dir = config.upload_dir();
        tokio::fs::create_dir_all(&upload_dir)
            .await
            .with_context(|| format!("无法创建临时目录: {}", upload_dir.display()))?;

        if config.llm_api_key.is_empty() {
            warn!("⚠️ 未设置 OPENAI_API_KEY，比较请求将会失败");
        }

        // 长期复用的服务，显式注入处理器
        let comparer = Arc::new(LlmService::new(&config).context("无法初始化 LLM 服务")?);
        let extractor = Arc::new(PdfExtractor::new());
        let processor = Arc::new(UploadProcessor::new(extractor, comparer, upload_dir));

        let router = api::router(processor, config.max_content_length);

        Ok(Self { config, router })
    }

    /// 运行应用主逻辑
    pub async fn run(self) -> Result<()> {
        let listener = TcpListener::bind(&self.config.bind_addr)
            .await
            .with_context(|| format!("无法监听地址: {}", self.config.bind_addr))?;

        info!("✓ 服务已启动: http://{}", listener.local_addr()?);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("服务异常退出")?;

        info!("服务已停止");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("收到退出信号，正在关闭..."),
        Err(e) => {
            error!("无法监听退出信号: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
