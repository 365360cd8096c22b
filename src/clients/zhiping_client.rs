/// 智评 API 客户端
///
/// 封装所有与智评后端的 REST 调用
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::clients::GradingApi;
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::{
    AnswerPayload, ApiEnvelope, GradingReport, PaperImage, PaperInfo, TaskStatus,
};

const PAPER_INFO: &str = "paper/info";
const BATCH_UPDATE: &str = "paper/answers/batch";
const SUBMIT_PAPER: &str = "paper/submit";
const TASK_STATUS: &str = "task/status";
const GRADING_RESULT: &str = "grading/result";

#[derive(Debug, Deserialize)]
struct TaskStatusData {
    status: u8,
}

/// 智评 API 客户端
pub struct ZhipingClient {
    client: Client,
    base_url: String,
    token: String,
}

impl ZhipingClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| AppError::api_request_failed("client/build", e))?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        if self.token.is_empty() {
            request
        } else {
            request.bearer_auth(&self.token)
        }
    }

    /// 发送请求并解析信封
    ///
    /// 能解析出信封就交给调用方判断 code；解析不出来时，
    /// HTTP 状态异常报 `HttpStatus`，否则报 JSON 解析失败。
    async fn send(
        &self,
        endpoint: &str,
        request: RequestBuilder,
    ) -> Result<ApiEnvelope<Value>, ApiError> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed {
                endpoint: endpoint.to_string(),
                source: Box::new(e),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| ApiError::RequestFailed {
            endpoint: endpoint.to_string(),
            source: Box::new(e),
        })?;

        debug!("{} 响应 ({}): {}", endpoint, status, body);

        match serde_json::from_str::<ApiEnvelope<Value>>(&body) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => Err(ApiError::HttpStatus {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            }),
            Err(e) => Err(ApiError::JsonParseFailed {
                source: Box::new(e),
            }),
        }
    }
}

/// 成功信封中的 data 解析为具体类型
fn decode_data<T: DeserializeOwned>(
    endpoint: &str,
    envelope: ApiEnvelope<Value>,
) -> Result<T, ApiError> {
    let data = envelope.into_data(endpoint)?;
    serde_json::from_value(data).map_err(|e| ApiError::JsonParseFailed {
        source: Box::new(e),
    })
}

#[async_trait]
impl GradingApi for ZhipingClient {
    async fn get_paper_info(&self, task_id: i64) -> Result<PaperInfo, ApiError> {
        let request = self
            .client
            .get(self.url(PAPER_INFO))
            .query(&[("taskId", task_id)]);

        decode_data(PAPER_INFO, self.send(PAPER_INFO, request).await?)
    }

    async fn batch_update_answers(
        &self,
        task_id: i64,
        answers: &[AnswerPayload],
    ) -> Result<(), ApiError> {
        let payload = json!({
            "taskId": task_id,
            "answers": answers,
        });

        debug!("批量更新答案 Payload: {}", payload);

        let request = self.client.post(self.url(BATCH_UPDATE)).json(&payload);
        self.send(BATCH_UPDATE, request)
            .await?
            .into_ack(BATCH_UPDATE)
    }

    async fn submit_paper(&self, task_id: i64, images: &[PaperImage]) -> Result<(), ApiError> {
        let mut form = Form::new().text("taskId", task_id.to_string());
        for image in images {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(image.mime)
                .map_err(|e| ApiError::RequestFailed {
                    endpoint: SUBMIT_PAPER.to_string(),
                    source: Box::new(e),
                })?;
            form = form.part("images", part);
        }

        debug!("上传试卷图片: 任务 {} | {} 张", task_id, images.len());

        let request = self.client.post(self.url(SUBMIT_PAPER)).multipart(form);
        self.send(SUBMIT_PAPER, request)
            .await?
            .into_ack(SUBMIT_PAPER)
    }

    async fn get_task_status(&self, task_id: i64) -> Result<TaskStatus, ApiError> {
        let request = self
            .client
            .get(self.url(TASK_STATUS))
            .query(&[("taskId", task_id)]);

        let data: TaskStatusData = decode_data(TASK_STATUS, self.send(TASK_STATUS, request).await?)?;

        TaskStatus::from_id(data.status).ok_or_else(|| ApiError::UnexpectedData {
            endpoint: TASK_STATUS.to_string(),
            detail: format!("未知的任务状态: {}", data.status),
        })
    }

    async fn get_grading_result(&self, task_id: i64) -> Result<GradingReport, ApiError> {
        let request = self
            .client
            .get(self.url(GRADING_RESULT))
            .query(&[("taskId", task_id)]);

        decode_data(GRADING_RESULT, self.send(GRADING_RESULT, request).await?)
    }
}
