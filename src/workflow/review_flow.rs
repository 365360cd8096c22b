//! 答案审阅流程 - 流程层
//!
//! 核心职责：定义"一张试卷"从审阅到出报告的完整流程
//!
//! 流程顺序：
//! 1. 加载试卷 → 合并题目与作答
//! 2. 逐题编辑 → 保存
//! 3. 整卷提交（编辑中拒绝提交）→ 开始批改周期
//! 4. 轮询批改状态 → 完成后刷新一次试卷数据
//! 5. 获取批改报告（批改未完成时拒绝）

use std::sync::Arc;
use tokio::time::{sleep_until, timeout_at, Instant};
use tracing::{error, info, warn};

use crate::clients::GradingApi;
use crate::error::{AppError, AppResult, GradingError, ReviewError};
use crate::models::{
    AnswerPayload, GradingReport, PaperImage, PaperInfo, QuestionId, QuestionView, TaskStatus,
};
use crate::services::{
    assemble_submission, merge_paper, normalize_choice_keys, AnswerEditor, GradingPoller, GradingStatus, JobObservation,
    PollOutcome, SaveOutcome,
};
use crate::workflow::review_ctx::{PollSettings, ReviewCtx};
use crate::workflow::screen_guard::ScreenGuard;

/// 单张试卷的审阅会话
///
/// - 独占编辑状态（AnswerEditor），不与其它页面共享
/// - 批改状态（GradingPoller）只能由提交流程推进
/// - 每次网络调用返回后先检查页面是否仍然存在
pub struct ReviewSession {
    api: Arc<dyn GradingApi>,
    ctx: ReviewCtx,
    settings: PollSettings,
    guard: ScreenGuard,
    paper: PaperInfo,
    views: Vec<QuestionView>,
    editor: AnswerEditor,
    poller: GradingPoller,
}

impl ReviewSession {
    /// 加载试卷并建立会话
    pub async fn load(
        api: Arc<dyn GradingApi>,
        ctx: ReviewCtx,
        settings: PollSettings,
        guard: ScreenGuard,
    ) -> AppResult<Self> {
        info!("{} 📄 加载试卷...", ctx);

        let paper = api.get_paper_info(ctx.task_id).await.map_err(|e| {
            error!("{} 试卷加载失败: {}", ctx, e);
            AppError::from(e)
        })?;

        if !guard.is_active() {
            return Err(ReviewError::ScreenClosed.into());
        }

        let mut ctx = ctx;
        ctx.paper_name = Some(paper.name.clone());
        ctx.subject_name = Some(paper.subject_name().to_string());

        let views = merge_paper(&paper.question_details, &paper.user_answers);
        log_paper_loaded(&ctx, &paper, &views);

        Ok(Self {
            api,
            ctx,
            settings,
            guard,
            paper,
            views,
            editor: AnswerEditor::new(),
            poller: GradingPoller::new(),
        })
    }

    pub fn ctx(&self) -> &ReviewCtx {
        &self.ctx
    }

    pub fn paper(&self) -> &PaperInfo {
        &self.paper
    }

    pub fn views(&self) -> &[QuestionView] {
        &self.views
    }

    pub fn editor(&self) -> &AnswerEditor {
        &self.editor
    }

    pub fn grading_status(&self) -> GradingStatus {
        self.poller.status()
    }

    /// 某道题当前生效的答案
    pub fn current_answer(&self, id: QuestionId) -> Option<&str> {
        self.views
            .iter()
            .find(|v| v.id() == id)
            .and_then(|v| self.editor.answer_for(v))
    }

    /// 当前待提交的答案
    pub fn pending_submission(&self) -> Vec<AnswerPayload> {
        assemble_submission(&self.views, self.editor.committed())
    }

    // ========== 编辑 ==========

    pub fn begin_edit(&mut self, id: QuestionId) -> AppResult<Option<SaveOutcome>> {
        let previous = self.editor.begin_edit(&self.views, id)?;
        if let Some(SaveOutcome::NotFound { id: prev }) = &previous {
            warn!("{} ⚠️ 题目 {} 自动保存失败", self.ctx, prev);
        }
        Ok(previous)
    }

    /// 修改草稿，选择题的选项字母在这里规范化，保存前学生就能看到结果
    pub fn update_draft(&mut self, id: QuestionId, content: impl Into<String>) -> AppResult<()> {
        let mut content = content.into();
        let options = self
            .views
            .iter()
            .find(|v| v.id() == id)
            .and_then(|v| v.question.options());
        if let Some(keys) = options.and_then(|o| normalize_choice_keys(o, &content)) {
            content = keys;
        }
        Ok(self.editor.update_draft(id, content)?)
    }

    pub fn save_answer(&mut self, id: QuestionId) -> SaveOutcome {
        let outcome = self.editor.save(id);
        match &outcome {
            SaveOutcome::Saved { .. } => info!("{} ✓ 题目 {} 已保存", self.ctx, id),
            SaveOutcome::NotFound { .. } => warn!("{} ⚠️ 题目 {} 保存失败", self.ctx, id),
        }
        outcome
    }

    pub fn cancel_edit(&mut self) -> Option<QuestionId> {
        self.editor.cancel()
    }

    // ========== 提交 ==========

    /// 批量保存答案，不开始批改
    pub async fn save_answers(&mut self) -> AppResult<usize> {
        self.editor.ensure_not_editing()?;
        let answers = self.pending_submission();

        info!("{} 💾 批量保存 {} 条答案...", self.ctx, answers.len());
        self.api
            .batch_update_answers(self.ctx.task_id, &answers)
            .await?;
        self.ensure_mounted()?;

        self.apply_committed();
        info!("{} ✓ 答案保存成功", self.ctx);
        Ok(answers.len())
    }

    /// 整卷提交并开始批改周期
    ///
    /// 有题目处于编辑状态时直接拒绝，不发起任何网络请求
    pub async fn submit_for_grading(&mut self) -> AppResult<u64> {
        self.editor.ensure_not_editing()?;
        let answers = self.pending_submission();

        info!("{} 📋 提交整卷答案 ({} 题)...", self.ctx, answers.len());
        self.api
            .batch_update_answers(self.ctx.task_id, &answers)
            .await?;
        self.ensure_mounted()?;

        self.apply_committed();
        let cycle = self.poller.begin_cycle();
        info!("{} ✓ 提交成功，等待批改", self.ctx);
        Ok(cycle)
    }

    /// 上传试卷图片，服务器确认后开始批改周期
    pub async fn upload_paper(&mut self, images: &[PaperImage]) -> AppResult<u64> {
        if images.is_empty() {
            return Err(ReviewError::NoImages.into());
        }

        info!("{} 📤 上传 {} 张试卷图片...", self.ctx, images.len());
        self.api.submit_paper(self.ctx.task_id, images).await?;
        self.ensure_mounted()?;

        let cycle = self.poller.begin_cycle();
        info!("{} ✓ 上传成功，后台开始批改", self.ctx);
        Ok(cycle)
    }

    // ========== 批改状态 ==========

    /// 根据服务器上的任务状态同步本地批改状态
    ///
    /// 用于直接打开一个已经在批改或已经批改完成的任务
    pub async fn sync_status(&mut self) -> AppResult<GradingStatus> {
        let status = self.api.get_task_status(self.ctx.task_id).await?;
        self.ensure_mounted()?;

        info!("{} 任务状态: {}", self.ctx, status);
        match (self.poller.status(), status) {
            (GradingStatus::Idle, TaskStatus::Grading) => {
                self.poller.begin_cycle();
            }
            (GradingStatus::Idle, TaskStatus::Completed) => self.poller.mark_done(),
            _ => {}
        }
        Ok(self.poller.status())
    }

    /// 等待批改完成
    ///
    /// 在 `grading_timeout` 内按 `poll_interval` 轮询任务状态。完成时刷新一次试卷数据。
    /// 超时、失败都不会改变批改状态，调用方可以再次调用以重试；
    /// 完成后的刷新失败时，再次调用只会重新刷新。
    /// 页面关闭时立即返回，服务器上的批改继续进行。
    pub async fn await_grading(&mut self) -> AppResult<()> {
        match self.poller.status() {
            GradingStatus::Done => return self.refetch_if_needed().await,
            GradingStatus::Idle => return Err(GradingError::NotDone.into()),
            GradingStatus::Processing => {}
        }

        let started = Instant::now();
        let deadline = started + self.settings.grading_timeout;
        let timed_out = || GradingError::TimedOut {
            waited_secs: started.elapsed().as_secs(),
        };

        loop {
            let polled = tokio::select! {
                _ = self.guard.closed() => return Err(ReviewError::ScreenClosed.into()),
                polled = timeout_at(deadline, self.api.get_task_status(self.ctx.task_id)) => polled,
            };
            let status = match polled {
                Ok(result) => result?,
                Err(_) => return Err(timed_out().into()),
            };
            self.ensure_mounted()?;

            match self.poller.observe(&JobObservation::from_status(status)) {
                PollOutcome::Completed { .. } => return self.refetch_if_needed().await,
                PollOutcome::Failed(message) => {
                    return Err(GradingError::Failed { message }.into());
                }
                PollOutcome::Ignored => return Err(GradingError::NotDone.into()),
                PollOutcome::Pending => {}
            }

            let next = Instant::now() + self.settings.poll_interval;
            tokio::select! {
                _ = self.guard.closed() => return Err(ReviewError::ScreenClosed.into()),
                _ = sleep_until(next.min(deadline)) => {}
            }
            if next >= deadline {
                warn!("{} ⏱️ 等待批改超时", self.ctx);
                return Err(timed_out().into());
            }
        }
    }

    /// 获取批改报告，批改未完成时拒绝
    pub async fn fetch_report(&self) -> AppResult<GradingReport> {
        self.poller.ensure_done()?;

        info!("{} 📊 获取批改报告...", self.ctx);
        let report = self.api.get_grading_result(self.ctx.task_id).await?;
        self.ensure_mounted()?;
        Ok(report)
    }

    /// 重新获取试卷数据，丢弃本地修改
    pub async fn reload(&mut self) -> AppResult<()> {
        let paper = self.api.get_paper_info(self.ctx.task_id).await?;
        self.ensure_mounted()?;

        self.views = merge_paper(&paper.question_details, &paper.user_answers);
        self.paper = paper;
        self.editor.reset();
        info!("{} 🔄 试卷数据已刷新", self.ctx);
        Ok(())
    }

    /// 离开页面前的提示
    pub fn leave_warning(&self) -> Option<&'static str> {
        self.poller.leave_warning()
    }

    /// 关闭页面
    pub fn close(&self) {
        if let Some(hint) = self.leave_warning() {
            warn!("{} {}", self.ctx, hint);
        }
        self.guard.close();
    }

    // ========== 内部辅助 ==========

    /// 完成后刷新一次试卷数据，刷新成功才确认，失败时下次等待会再刷新
    async fn refetch_if_needed(&mut self) -> AppResult<()> {
        if self.poller.needs_refetch() {
            self.reload().await?;
            self.poller.confirm_refetch();
        }
        Ok(())
    }

    fn ensure_mounted(&self) -> Result<(), ReviewError> {
        if self.guard.is_active() {
            Ok(())
        } else {
            warn!("{} 页面已关闭，丢弃返回结果", self.ctx);
            Err(ReviewError::ScreenClosed)
        }
    }

    /// 服务器已确认的修改写回视图，然后清空编辑状态
    fn apply_committed(&mut self) {
        for view in &mut self.views {
            if let Some(content) = self.editor.committed().get(&view.id()) {
                view.user_answer = Some(content.clone());
            }
        }
        self.editor.reset();
    }
}

fn log_paper_loaded(ctx: &ReviewCtx, paper: &PaperInfo, views: &[QuestionView]) {
    let answered = views.iter().filter(|v| v.is_answered()).count();
    info!("{} 名称: {}", ctx, paper.name);
    info!("{} 年级: {}", ctx, paper.grade_name);
    info!(
        "{} 题目总数: {}，已识别作答: {}",
        ctx,
        views.len(),
        answered
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::models::{GradingDetail, Question, QuestionKind, QuestionType, UserAnswer};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Default)]
    struct FakeState {
        paper_info_calls: usize,
        batch_calls: Vec<Vec<AnswerPayload>>,
        submit_calls: usize,
        statuses: VecDeque<TaskStatus>,
        result_calls: usize,
        reject_batch: Option<String>,
        fail_paper_info: bool,
    }

    struct FakeApi {
        paper: PaperInfo,
        state: Mutex<FakeState>,
    }

    impl FakeApi {
        fn new(statuses: &[TaskStatus]) -> Arc<Self> {
            Arc::new(Self {
                paper: sample_paper(),
                state: Mutex::new(FakeState {
                    statuses: statuses.iter().copied().collect(),
                    ..Default::default()
                }),
            })
        }

        fn state(&self) -> std::sync::MutexGuard<'_, FakeState> {
            self.state.lock().unwrap()
        }
    }

    #[async_trait]
    impl GradingApi for FakeApi {
        async fn get_paper_info(&self, _task_id: i64) -> Result<PaperInfo, ApiError> {
            let mut state = self.state();
            state.paper_info_calls += 1;
            if state.fail_paper_info {
                return Err(ApiError::UnexpectedData {
                    endpoint: "paper/info".into(),
                    detail: "连接中断".into(),
                });
            }
            Ok(self.paper.clone())
        }

        async fn batch_update_answers(
            &self,
            _task_id: i64,
            answers: &[AnswerPayload],
        ) -> Result<(), ApiError> {
            let mut state = self.state();
            if let Some(message) = state.reject_batch.clone() {
                return Err(ApiError::Domain {
                    endpoint: "paper/answers/batch".into(),
                    code: 3001,
                    message,
                });
            }
            state.batch_calls.push(answers.to_vec());
            Ok(())
        }

        async fn submit_paper(&self, _task_id: i64, _images: &[PaperImage]) -> Result<(), ApiError> {
            self.state().submit_calls += 1;
            Ok(())
        }

        async fn get_task_status(&self, _task_id: i64) -> Result<TaskStatus, ApiError> {
            let mut state = self.state();
            Ok(state.statuses.pop_front().unwrap_or(TaskStatus::Grading))
        }

        async fn get_grading_result(&self, _task_id: i64) -> Result<GradingReport, ApiError> {
            self.state().result_calls += 1;
            Ok(GradingReport {
                grading_details: vec![GradingDetail {
                    question_id: 1,
                    question_type: QuestionType::Choice,
                    score: 5.0,
                    max_score: 5.0,
                    user_answer: "A".into(),
                    question_answer: "A".into(),
                    correct: true,
                }],
                type_statistics: serde_json::Value::Null,
                over_all_comment: "不错".into(),
                wrong_count: 0,
            })
        }
    }

    fn sample_paper() -> PaperInfo {
        PaperInfo {
            id: 1,
            name: "单元测验".into(),
            subject: 2,
            grade_name: "七年级".into(),
            question_details: vec![
                Question {
                    id: 1,
                    sequence: 1,
                    content: "1+1=?".into(),
                    kind: QuestionKind::Choice { options: Default::default() },
                    correct_answer: None,
                },
                Question {
                    id: 2,
                    sequence: 2,
                    content: "6*7=__".into(),
                    kind: QuestionKind::FillBlank,
                    correct_answer: None,
                },
            ],
            user_answers: vec![
                UserAnswer { sequence: 1, content: "A".into() },
                UserAnswer { sequence: 2, content: "42".into() },
            ],
        }
    }

    fn fast_settings() -> PollSettings {
        PollSettings {
            poll_interval: Duration::from_millis(5),
            grading_timeout: Duration::from_millis(200),
        }
    }

    async fn session(api: &Arc<FakeApi>) -> ReviewSession {
        ReviewSession::load(
            api.clone(),
            ReviewCtx::new(7),
            fast_settings(),
            ScreenGuard::new(),
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_happy_path_edit_and_submit() {
        let api = FakeApi::new(&[TaskStatus::Grading, TaskStatus::Completed]);
        let mut session = session(&api).await;

        assert_eq!(session.views()[0].user_answer.as_deref(), Some("A"));
        assert_eq!(session.views()[1].user_answer.as_deref(), Some("42"));
        assert_eq!(session.ctx().to_string(), "[任务 7 数学·单元测验]");

        session.begin_edit(2).unwrap();
        session.update_draft(2, "43").unwrap();
        assert!(session.save_answer(2).is_saved());

        assert_eq!(session.submit_for_grading().await.unwrap(), 1);
        assert_eq!(
            api.state().batch_calls[0],
            vec![
                AnswerPayload { sequence: 1, content: "A".into() },
                AnswerPayload { sequence: 2, content: "43".into() },
            ]
        );
        assert_eq!(session.current_answer(2), Some("43"));
        assert_eq!(session.grading_status(), GradingStatus::Processing);

        session.await_grading().await.unwrap();
        assert_eq!(session.grading_status(), GradingStatus::Done);
        // 初次加载 + 完成后刷新一次
        assert_eq!(api.state().paper_info_calls, 2);

        // 再次等待不会重复刷新
        session.await_grading().await.unwrap();
        assert_eq!(api.state().paper_info_calls, 2);

        let report = session.fetch_report().await.unwrap();
        assert_eq!(report.summary().user_score, 5.0);
    }

    #[tokio::test]
    async fn test_submit_blocked_while_editing() {
        let api = FakeApi::new(&[]);
        let mut session = session(&api).await;

        session.begin_edit(1).unwrap();
        let err = session.submit_for_grading().await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Review(ReviewError::StillEditing { id: 1 })
        ));
        assert!(err.is_validation());
        assert!(api.state().batch_calls.is_empty());
        assert_eq!(session.grading_status(), GradingStatus::Idle);

        assert!(session.save_answers().await.is_err());
        assert!(api.state().batch_calls.is_empty());
    }

    #[tokio::test]
    async fn test_upload_requires_images() {
        let api = FakeApi::new(&[]);
        let mut session = session(&api).await;

        let err = session.upload_paper(&[]).await.unwrap_err();
        assert!(matches!(err, AppError::Review(ReviewError::NoImages)));
        assert_eq!(api.state().submit_calls, 0);

        let image = PaperImage::new("p1.jpg", vec![0xff, 0xd8]);
        assert_eq!(session.upload_paper(&[image]).await.unwrap(), 1);
        assert_eq!(api.state().submit_calls, 1);
        assert_eq!(session.grading_status(), GradingStatus::Processing);
    }

    #[tokio::test]
    async fn test_report_requires_done() {
        let api = FakeApi::new(&[]);
        let mut session = session(&api).await;

        assert!(matches!(
            session.fetch_report().await,
            Err(AppError::Grading(GradingError::NotDone))
        ));
        session.submit_for_grading().await.unwrap();
        assert!(matches!(
            session.fetch_report().await,
            Err(AppError::Grading(GradingError::NotDone))
        ));
        assert_eq!(api.state().result_calls, 0);
    }

    #[tokio::test]
    async fn test_await_grading_times_out_and_can_retry() {
        let api = FakeApi::new(&[]);
        let mut session = session(&api).await;
        session.submit_for_grading().await.unwrap();

        let err = session.await_grading().await.unwrap_err();
        assert!(matches!(err, AppError::Grading(GradingError::TimedOut { .. })));
        assert!(err.is_retryable());
        assert_eq!(session.grading_status(), GradingStatus::Processing);
        assert!(session.leave_warning().is_some());

        api.state().statuses.push_back(TaskStatus::Completed);
        session.await_grading().await.unwrap();
        assert_eq!(session.grading_status(), GradingStatus::Done);
    }

    #[tokio::test]
    async fn test_failed_refetch_is_retried_on_next_wait() {
        let api = FakeApi::new(&[TaskStatus::Completed]);
        let mut session = session(&api).await;
        session.submit_for_grading().await.unwrap();

        api.state().fail_paper_info = true;
        let err = session.await_grading().await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(session.grading_status(), GradingStatus::Done);
        assert_eq!(api.state().paper_info_calls, 2);

        api.state().fail_paper_info = false;
        session.await_grading().await.unwrap();
        assert_eq!(api.state().paper_info_calls, 3);

        // 刷新成功后不再重复
        session.await_grading().await.unwrap();
        assert_eq!(api.state().paper_info_calls, 3);
    }

    #[tokio::test]
    async fn test_close_during_last_interval_returns_immediately() {
        let api = FakeApi::new(&[]);
        let guard = ScreenGuard::new();
        let settings = PollSettings {
            poll_interval: Duration::from_secs(30),
            grading_timeout: Duration::from_secs(30),
        };
        let mut session =
            ReviewSession::load(api.clone(), ReviewCtx::new(7), settings, guard.clone())
                .await
                .unwrap();
        session.submit_for_grading().await.unwrap();

        let closer = guard.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            closer.close();
        });

        let result = tokio::time::timeout(Duration::from_secs(5), session.await_grading())
            .await
            .expect("closing the screen should end the wait");
        assert!(matches!(
            result,
            Err(AppError::Review(ReviewError::ScreenClosed))
        ));
    }

    #[tokio::test]
    async fn test_choice_draft_normalized_while_editing() {
        let api = FakeApi::new(&[]);
        let mut session = session(&api).await;

        session.begin_edit(1).unwrap();
        session.update_draft(1, " b ").unwrap();
        assert!(session.save_answer(1).is_saved());
        assert_eq!(session.current_answer(1), Some("B"));

        // 非选项字母的文字保持原样
        session.begin_edit(1).unwrap();
        session.update_draft(1, "a bad guess").unwrap();
        session.save_answer(1);
        session.begin_edit(2).unwrap();
        session.update_draft(2, " a ").unwrap();
        session.save_answer(2);

        assert_eq!(
            session.pending_submission(),
            vec![
                AnswerPayload { sequence: 1, content: "a bad guess".into() },
                AnswerPayload { sequence: 2, content: " a ".into() },
            ]
        );
    }

    #[tokio::test]
    async fn test_grading_failure_surfaces_and_stays_processing() {
        let api = FakeApi::new(&[TaskStatus::Failed]);
        let mut session = session(&api).await;
        session.submit_for_grading().await.unwrap();

        let err = session.await_grading().await.unwrap_err();
        assert!(matches!(err, AppError::Grading(GradingError::Failed { .. })));
        assert_eq!(session.grading_status(), GradingStatus::Processing);
    }

    #[tokio::test]
    async fn test_domain_error_keeps_local_edits() {
        let api = FakeApi::new(&[]);
        let mut session = session(&api).await;
        api.state().reject_batch = Some("任务已关闭".into());

        session.begin_edit(1).unwrap();
        session.update_draft(1, "B").unwrap();
        session.save_answer(1);

        let err = session.submit_for_grading().await.unwrap_err();
        assert_eq!(err.user_message(), "任务已关闭");
        assert_eq!(session.current_answer(1), Some("B"));
        assert_eq!(session.grading_status(), GradingStatus::Idle);
    }

    #[tokio::test]
    async fn test_closed_screen_discards_results() {
        let api = FakeApi::new(&[]);
        let mut session = session(&api).await;
        session.submit_for_grading().await.unwrap();

        session.close();
        let err = session.await_grading().await.unwrap_err();
        assert!(matches!(err, AppError::Review(ReviewError::ScreenClosed)));
        assert_eq!(session.grading_status(), GradingStatus::Processing);
    }

    #[tokio::test]
    async fn test_sync_status_attaches_to_finished_task() {
        let api = FakeApi::new(&[TaskStatus::Completed]);
        let mut session = session(&api).await;

        assert_eq!(session.sync_status().await.unwrap(), GradingStatus::Done);
        assert!(session.fetch_report().await.is_ok());
        assert_eq!(api.state().paper_info_calls, 1);
    }

    #[tokio::test]
    async fn test_await_without_submission() {
        let api = FakeApi::new(&[TaskStatus::Completed]);
        let mut session = session(&api).await;
        assert!(matches!(
            session.await_grading().await,
            Err(AppError::Grading(GradingError::NotDone))
        ));
    }
}
