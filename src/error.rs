use thiserror::Error;

use crate::models::question::QuestionId;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 答案审阅错误（本地校验，不会发送到服务器）
    #[error("审阅错误: {0}")]
    Review(#[from] ReviewError),
    /// 批改状态错误
    #[error("批改错误: {0}")]
    Grading(#[from] GradingError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 其他错误
    #[error("错误: {0}")]
    Other(String),
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败（无法连接、超时等）
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// HTTP 状态码异常，且响应体不是合法的信封
    #[error("API返回HTTP错误 ({endpoint}): status={status}")]
    HttpStatus { endpoint: String, status: u16 },
    /// 信封 code != 1000
    #[error("API返回错误响应 ({endpoint}): code={code}, message={message}")]
    Domain {
        endpoint: String,
        code: i64,
        message: String,
    },
    /// 成功响应中缺少 data
    #[error("API返回空结果: {endpoint}")]
    EmptyResponse { endpoint: String },
    /// data 内容不符合约定
    #[error("API返回数据异常 ({endpoint}): {detail}")]
    UnexpectedData { endpoint: String, detail: String },
    /// JSON 解析失败
    #[error("JSON解析失败: {source}")]
    JsonParseFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 本地校验错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReviewError {
    /// 仍有题目处于编辑状态
    #[error("请先完成题目 {id} 的编辑")]
    StillEditing { id: QuestionId },
    /// 对未处于编辑状态的题目修改草稿
    #[error("题目 {id} 未处于编辑状态")]
    NotEditing { id: QuestionId },
    /// 题目不存在
    #[error("题目不存在: {id}")]
    QuestionNotFound { id: QuestionId },
    /// 未上传任何图片
    #[error("请至少上传一张试卷图片")]
    NoImages,
    /// 页面已关闭
    #[error("页面已关闭，结果已丢弃")]
    ScreenClosed,
}

/// 批改状态错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GradingError {
    /// 批改尚未完成，不能获取报告
    #[error("批改尚未完成，无法获取报告")]
    NotDone,
    /// 等待批改超时
    #[error("等待批改超时 ({waited_secs} 秒)，请稍后重试")]
    TimedOut { waited_secs: u64 },
    /// 服务器报告批改失败
    #[error("批改失败: {message}")]
    Failed { message: String },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 配置项取值非法
    #[error("配置项 {field} 非法: {reason}")]
    Invalid { field: String, reason: String },
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed {
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::File(FileError::ReadFailed {
            path: String::new(),
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建API请求失败错误
    pub fn api_request_failed(
        endpoint: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source: Box::new(source),
        })
    }

    /// 面向用户的提示文案
    ///
    /// - 网络错误：统一的"加载失败"提示，附带重试
    /// - 业务错误：直接使用服务器返回的 message
    /// - 本地校验错误：行内提示
    pub fn user_message(&self) -> String {
        match self {
            AppError::Api(ApiError::Domain { message, .. }) => message.clone(),
            AppError::Api(_) => "加载失败，请检查网络后重试".to_string(),
            AppError::Review(e) => e.to_string(),
            AppError::Grading(e) => e.to_string(),
            AppError::File(e) => e.to_string(),
            AppError::Config(e) => e.to_string(),
            AppError::Other(msg) => msg.clone(),
        }
    }

    /// 是否值得提供"重试"操作
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::Api(_) => true,
            AppError::Grading(GradingError::TimedOut { .. }) => true,
            AppError::Grading(GradingError::Failed { .. }) => true,
            _ => false,
        }
    }

    /// 是否为本地校验错误（不应发送到服务器）
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::Review(
                ReviewError::StillEditing { .. }
                    | ReviewError::NotEditing { .. }
                    | ReviewError::QuestionNotFound { .. }
                    | ReviewError::NoImages
            )
        )
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
