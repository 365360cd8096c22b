use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::{AnswerPayload, GradingReport, PaperImage, PaperInfo, TaskStatus};

/// 智评后端提供的远程操作
///
/// 每个方法都是一次网络调用，返回 `ApiError` 区分网络错误与业务错误
#[async_trait]
pub trait GradingApi: Send + Sync {
    /// 获取试卷信息（题目 + 已识别的作答）
    async fn get_paper_info(&self, task_id: i64) -> Result<PaperInfo, ApiError>;

    /// 批量更新作答
    async fn batch_update_answers(
        &self,
        task_id: i64,
        answers: &[AnswerPayload],
    ) -> Result<(), ApiError>;

    /// 上传试卷图片，服务器确认后开始异步批改
    async fn submit_paper(&self, task_id: i64, images: &[PaperImage]) -> Result<(), ApiError>;

    /// 查询批改任务状态
    async fn get_task_status(&self, task_id: i64) -> Result<TaskStatus, ApiError>;

    /// 获取批改结果
    async fn get_grading_result(&self, task_id: i64) -> Result<GradingReport, ApiError>;
}
