//! 批改状态跟踪 - 业务能力层
//!
//! 状态只能前进：idle → processing → done。
//! 每个提交周期内，完成后的数据刷新只触发一次。

use tracing::{debug, info, warn};

use crate::error::GradingError;
use crate::models::subject::TaskStatus;

/// 批改状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradingStatus {
    Idle,
    Processing,
    Done,
}

/// 一次对后台任务的观测结果（loading / success 标志）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobObservation {
    pub loading: bool,
    pub success: bool,
    pub error: Option<String>,
}

impl JobObservation {
    pub fn loading() -> Self {
        Self {
            loading: true,
            success: false,
            error: None,
        }
    }

    pub fn succeeded() -> Self {
        Self {
            loading: false,
            success: true,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            loading: false,
            success: false,
            error: Some(message.into()),
        }
    }

    /// 由服务器任务状态换算
    pub fn from_status(status: TaskStatus) -> Self {
        match status {
            TaskStatus::Pending | TaskStatus::Grading => Self::loading(),
            TaskStatus::Completed => Self::succeeded(),
            TaskStatus::Failed => Self::failed(format!("任务状态: {}", status.name())),
        }
    }
}

/// 观测处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// 当前没有进行中的批改，忽略本次观测
    Ignored,
    /// 仍在批改
    Pending,
    /// 批改完成；本周期的刷新还没有成功确认时 `refetch` 为 true
    Completed { refetch: bool },
    /// 后台任务报告失败，状态保持 processing
    Failed(String),
}

#[derive(Debug)]
pub struct GradingPoller {
    status: GradingStatus,
    cycle: u64,
    refetched: bool,
    last_error: Option<String>,
}

impl Default for GradingPoller {
    fn default() -> Self {
        Self::new()
    }
}

impl GradingPoller {
    pub fn new() -> Self {
        Self {
            status: GradingStatus::Idle,
            cycle: 0,
            refetched: false,
            last_error: None,
        }
    }

    pub fn status(&self) -> GradingStatus {
        self.status
    }

    /// 当前提交周期编号，从 1 开始，0 表示从未提交
    pub fn cycle(&self) -> u64 {
        self.cycle
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_processing(&self) -> bool {
        self.status == GradingStatus::Processing
    }

    /// 提交已被服务器确认，开始新的批改周期
    ///
    /// 已在 processing 时保持当前周期不变。
    pub fn begin_cycle(&mut self) -> u64 {
        if self.status == GradingStatus::Processing {
            debug!("批改周期 {} 仍在进行，忽略重复的开始", self.cycle);
            return self.cycle;
        }
        self.cycle += 1;
        self.status = GradingStatus::Processing;
        self.refetched = false;
        self.last_error = None;
        info!("🚀 开始第 {} 个批改周期", self.cycle);
        self.cycle
    }

    /// 处理一次观测
    pub fn observe(&mut self, observation: &JobObservation) -> PollOutcome {
        match self.status {
            GradingStatus::Idle => PollOutcome::Ignored,
            GradingStatus::Done => PollOutcome::Completed {
                refetch: !self.refetched,
            },
            GradingStatus::Processing => {
                if observation.loading {
                    return PollOutcome::Pending;
                }
                if observation.success {
                    self.status = GradingStatus::Done;
                    self.last_error = None;
                    info!("✓ 第 {} 个批改周期完成", self.cycle);
                    return PollOutcome::Completed {
                        refetch: !self.refetched,
                    };
                }

                let message = observation
                    .error
                    .clone()
                    .unwrap_or_else(|| "批改任务失败".to_string());
                warn!("⚠️ 第 {} 个批改周期报告失败: {}", self.cycle, message);
                self.last_error = Some(message.clone());
                PollOutcome::Failed(message)
            }
        }
    }

    /// 批改已完成但刷新还没有成功
    pub fn needs_refetch(&self) -> bool {
        self.status == GradingStatus::Done && !self.refetched
    }

    /// 完成后的刷新已成功，本周期不再刷新
    pub fn confirm_refetch(&mut self) {
        if self.status == GradingStatus::Done {
            self.refetched = true;
        }
    }

    /// 获取报告前的校验
    pub fn ensure_done(&self) -> Result<(), GradingError> {
        match self.status {
            GradingStatus::Done => Ok(()),
            GradingStatus::Idle | GradingStatus::Processing => Err(GradingError::NotDone),
        }
    }

    /// 离开页面时的提示，只有批改进行中才需要
    pub fn leave_warning(&self) -> Option<&'static str> {
        self.is_processing()
            .then_some("批改仍在后台进行，离开页面不会中止批改")
    }

    /// 标记为已完成（例如服务器已经有报告），用于直接查看历史报告
    pub fn mark_done(&mut self) {
        if self.status != GradingStatus::Done {
            self.status = GradingStatus::Done;
            self.refetched = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rank(status: GradingStatus) -> u8 {
        match status {
            GradingStatus::Idle => 0,
            GradingStatus::Processing => 1,
            GradingStatus::Done => 2,
        }
    }

    #[test]
    fn test_idle_ignores_observations() {
        let mut poller = GradingPoller::new();
        assert_eq!(poller.observe(&JobObservation::succeeded()), PollOutcome::Ignored);
        assert_eq!(poller.status(), GradingStatus::Idle);
        assert_eq!(poller.ensure_done(), Err(GradingError::NotDone));
    }

    #[test]
    fn test_refetch_triggered_once_per_cycle() {
        let mut poller = GradingPoller::new();
        assert_eq!(poller.begin_cycle(), 1);

        assert_eq!(poller.observe(&JobObservation::loading()), PollOutcome::Pending);
        assert_eq!(
            poller.observe(&JobObservation::succeeded()),
            PollOutcome::Completed { refetch: true }
        );
        poller.confirm_refetch();
        assert_eq!(
            poller.observe(&JobObservation::succeeded()),
            PollOutcome::Completed { refetch: false }
        );
        assert!(poller.ensure_done().is_ok());

        assert_eq!(poller.begin_cycle(), 2);
        assert_eq!(
            poller.observe(&JobObservation::succeeded()),
            PollOutcome::Completed { refetch: true }
        );
    }

    #[test]
    fn test_failure_keeps_processing() {
        let mut poller = GradingPoller::new();
        poller.begin_cycle();

        assert_eq!(
            poller.observe(&JobObservation::failed("OCR 失败")),
            PollOutcome::Failed("OCR 失败".into())
        );
        assert_eq!(poller.status(), GradingStatus::Processing);
        assert_eq!(poller.last_error(), Some("OCR 失败"));
        assert!(poller.leave_warning().is_some());

        assert_eq!(
            poller.observe(&JobObservation::succeeded()),
            PollOutcome::Completed { refetch: true }
        );
        assert!(poller.last_error().is_none());
    }

    #[test]
    fn test_status_never_moves_backward() {
        let mut poller = GradingPoller::new();
        poller.begin_cycle();
        let observations = [
            JobObservation::loading(),
            JobObservation::failed("x"),
            JobObservation::succeeded(),
            JobObservation::loading(),
            JobObservation::failed("y"),
        ];

        let mut last = rank(poller.status());
        for obs in &observations {
            poller.observe(obs);
            let now = rank(poller.status());
            assert!(now >= last);
            last = now;
        }
        assert_eq!(poller.status(), GradingStatus::Done);
    }

    #[test]
    fn test_begin_cycle_while_processing_is_noop() {
        let mut poller = GradingPoller::new();
        assert_eq!(poller.begin_cycle(), 1);
        assert_eq!(poller.begin_cycle(), 1);
        assert_eq!(poller.cycle(), 1);
    }

    #[test]
    fn test_observation_from_status() {
        assert!(JobObservation::from_status(TaskStatus::Grading).loading);
        assert!(JobObservation::from_status(TaskStatus::Completed).success);
        let failed = JobObservation::from_status(TaskStatus::Failed);
        assert!(!failed.loading && !failed.success && failed.error.is_some());
    }

    #[test]
    fn test_unconfirmed_refetch_is_requested_again() {
        let mut poller = GradingPoller::new();
        poller.begin_cycle();
        assert_eq!(
            poller.observe(&JobObservation::succeeded()),
            PollOutcome::Completed { refetch: true }
        );

        // 刷新失败，没有确认
        assert!(poller.needs_refetch());
        assert_eq!(
            poller.observe(&JobObservation::succeeded()),
            PollOutcome::Completed { refetch: true }
        );

        poller.confirm_refetch();
        assert!(!poller.needs_refetch());
        assert_eq!(poller.status(), GradingStatus::Done);
    }

    #[test]
    fn test_confirm_refetch_ignored_while_processing() {
        let mut poller = GradingPoller::new();
        poller.begin_cycle();
        poller.confirm_refetch();
        assert_eq!(
            poller.observe(&JobObservation::succeeded()),
            PollOutcome::Completed { refetch: true }
        );
    }

    #[test]
    fn test_mark_done_does_not_request_refetch() {
        let mut poller = GradingPoller::new();
        poller.mark_done();
        assert!(poller.ensure_done().is_ok());
        assert_eq!(
            poller.observe(&JobObservation::succeeded()),
            PollOutcome::Completed { refetch: false }
        );
        assert!(poller.leave_warning().is_none());
    }
}
