use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::{AppResult, ConfigError, FileError};

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 智评后端地址
    pub api_base_url: String,
    /// 登录 token，为空时不带 Authorization 头
    pub token: String,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 轮询批改状态的间隔（毫秒）
    pub poll_interval_ms: u64,
    /// 等待批改完成的最长时间（秒）
    pub grading_timeout_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_string(),
            token: String::new(),
            request_timeout_secs: 30,
            poll_interval_ms: 3000,
            grading_timeout_secs: 300,
            verbose_logging: false,
            output_log_file: "zhiping.log".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_base_url: std::env::var("ZHIPING_API_BASE_URL").unwrap_or(default.api_base_url),
            token: std::env::var("ZHIPING_TOKEN").unwrap_or(default.token),
            request_timeout_secs: std::env::var("ZHIPING_REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            poll_interval_ms: std::env::var("ZHIPING_POLL_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.poll_interval_ms),
            grading_timeout_secs: std::env::var("ZHIPING_GRADING_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.grading_timeout_secs),
            verbose_logging: std::env::var("ZHIPING_VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("ZHIPING_OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }

    /// 从 TOML 文件读取配置，缺省字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let display = path.display().to_string();
        if !path.exists() {
            return Err(FileError::NotFound { path: display }.into());
        }
        let content = std::fs::read_to_string(path).map_err(|e| FileError::ReadFailed {
            path: display.clone(),
            source: Box::new(e),
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| FileError::TomlParseFailed {
            path: display,
            source: Box::new(e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// 检查取值范围
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(ConfigError::Invalid {
                field: "api_base_url".to_string(),
                reason: format!("必须以 http:// 或 https:// 开头: {}", self.api_base_url),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "poll_interval_ms".to_string(),
                reason: "轮询间隔必须大于 0".to_string(),
            });
        }
        if self.grading_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "grading_timeout_secs".to_string(),
                reason: "批改等待时间必须大于 0".to_string(),
            });
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn grading_timeout(&self) -> Duration {
        Duration::from_secs(self.grading_timeout_secs)
    }
}
