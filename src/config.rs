use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;

/// 默认配置文件
const DEFAULT_CONFIG_FILE: &str = "config.toml";

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 监听地址
    pub bind_addr: String,
    /// 上传文件的临时目录
    pub upload_folder: String,
    /// 单次请求的最大字节数
    pub max_content_length: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 单次 LLM 调用的超时（秒）
    pub llm_timeout_secs: u64,
    /// 建立连接的超时（秒）
    pub llm_connect_timeout_secs: u64,
    /// 瞬时失败后的最大重试次数
    pub llm_max_retries: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".to_string(),
            upload_folder: "uploads".to_string(),
            max_content_length: 16 * 1024 * 1024,
            verbose_logging: false,
            llm_api_key: String::new(),
            llm_api_base_url: "https://api.openai.com/v1".to_string(),
            llm_model_name: "gpt-4o".to_string(),
            llm_timeout_secs: 60,
            llm_connect_timeout_secs: 10,
            llm_max_retries: 3,
        }
    }
}

impl Config {
    /// 加载配置：默认值 → TOML 文件（可选）→ 环境变量
    ///
    /// 工作目录下的 `.env` 会先被读入环境变量，已存在的环境变量优先。
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenv::dotenv();

        let base = match std::env::var("PDF_COMPARE_CONFIG") {
            Ok(path) => Self::from_file(Path::new(&path))?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            Err(_) => Self::default(),
        };

        Ok(base.with_env())
    }

    /// 从 TOML 文件读取配置，缺省字段使用默认值
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::ParseFailed { source, .. } => ConfigError::ParseFailed {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseFailed {
            path: String::new(),
            source: e,
        })
    }

    /// 用环境变量覆盖当前配置
    pub fn with_env(self) -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(self.bind_addr),
            upload_folder: std::env::var("UPLOAD_FOLDER").unwrap_or(self.upload_folder),
            max_content_length: std::env::var("MAX_CONTENT_LENGTH").ok().and_then(|v| v.parse().ok()).unwrap_or(self.max_content_length),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
            llm_api_key: std::env::var("OPENAI_API_KEY").unwrap_or(self.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(self.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(self.llm_model_name),
            llm_timeout_secs: std::env::var("LLM_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.llm_timeout_secs),
            llm_connect_timeout_secs: std::env::var("LLM_CONNECT_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.llm_connect_timeout_secs),
            llm_max_retries: std::env::var("LLM_MAX_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(self.llm_max_retries),
        }
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    pub fn llm_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_connect_timeout_secs)
    }

    pub fn upload_dir(&self) -> PathBuf {
        PathBuf::from(&self.upload_folder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.max_content_length, 16 * 1024 * 1024);
        assert_eq!(config.llm_model_name, "gpt-4o");
        assert_eq!(config.llm_timeout(), Duration::from_secs(60));
        assert_eq!(config.llm_connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.llm_max_retries, 3);
        assert!(config.llm_api_key.is_empty());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            bind_addr = "0.0.0.0:8080"
            llm_max_retries = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.llm_max_retries, 5);
        assert_eq!(config.upload_folder, "uploads");
        assert_eq!(config.llm_timeout_secs, 60);
    }

    #[test]
    fn test_malformed_toml() {
        let err = Config::from_toml_str("llm_max_retries = \"many\"").unwrap_err();
        assert!(matches!(err, ConfigError::ParseFailed { .. }));
    }

    #[test]
    fn test_from_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "max_content_length = [").unwrap();

        match Config::from_file(&path) {
            Err(ConfigError::ParseFailed { path: reported, .. }) => {
                assert!(reported.ends_with("broken.toml"));
            }
            other => panic!("意外结果: {:?}", other),
        }
    }
}
