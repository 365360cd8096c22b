//! 服务器响应信封 `{code, message, data}`

use serde::Deserialize;

use crate::error::ApiError;

/// 业务成功码
pub const SUCCESS_CODE: i64 = 1000;

#[derive(Debug, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

impl<T> ApiEnvelope<T> {
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// 取出 data，code != 1000 视为业务错误，成功但缺少 data 视为空结果
    pub fn into_data(self, endpoint: &str) -> Result<T, ApiError> {
        if !self.is_success() {
            return Err(self.into_domain_error(endpoint));
        }
        self.data.ok_or_else(|| ApiError::EmptyResponse {
            endpoint: endpoint.to_string(),
        })
    }

    /// 只关心是否成功的接口（ack）
    pub fn into_ack(self, endpoint: &str) -> Result<(), ApiError> {
        if !self.is_success() {
            return Err(self.into_domain_error(endpoint));
        }
        Ok(())
    }

    fn into_domain_error(self, endpoint: &str) -> ApiError {
        ApiError::Domain {
            endpoint: endpoint.to_string(),
            code: self.code,
            message: self.message,
        }
    }
}
