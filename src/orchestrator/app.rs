//! 应用编排 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：日志文件、HTTP 客户端
//! 2. **命令调度**：每个命令对应一次完整的审阅会话
//! 3. **错误兜底**：所有错误在这里转换为用户可见的提示，不向外抛出 panic
//! 4. **资源管理**：持有 API 客户端和页面生命周期（ScreenGuard）

use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::clients::{GradingApi, ZhipingClient};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{load_answer_sheet, AnswerSheet, PaperImage};
use crate::services::GradingStatus;
use crate::utils::logging;
use crate::workflow::{PollSettings, ReviewCtx, ReviewSession, ScreenGuard};

/// 要执行的命令
#[derive(Debug, Clone, clap::Subcommand)]
pub enum Command {
    /// 查看试卷题目与已识别的作答
    Paper { task_id: i64 },
    /// 用答案文件批量修改并保存作答（不开始批改）
    UpdateAnswers {
        task_id: i64,
        #[arg(long)]
        file: PathBuf,
    },
    /// 提交整卷答案并开始批改
    Submit {
        task_id: i64,
        /// 提交前先应用的答案文件
        #[arg(long)]
        file: Option<PathBuf>,
        /// 等待批改完成并输出报告
        #[arg(long)]
        wait: bool,
    },
    /// 上传试卷图片，服务器开始识别和批改
    Upload {
        task_id: i64,
        #[arg(required = true)]
        images: Vec<PathBuf>,
        #[arg(long)]
        wait: bool,
    },
    /// 等待进行中的批改完成
    Wait { task_id: i64 },
    /// 查看批改报告
    Report { task_id: i64 },
}

impl Command {
    pub fn task_id(&self) -> i64 {
        match self {
            Command::Paper { task_id }
            | Command::UpdateAnswers { task_id, .. }
            | Command::Submit { task_id, .. }
            | Command::Upload { task_id, .. }
            | Command::Wait { task_id }
            | Command::Report { task_id } => *task_id,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Command::Paper { .. } => "paper",
            Command::UpdateAnswers { .. } => "update-answers",
            Command::Submit { .. } => "submit",
            Command::Upload { .. } => "upload",
            Command::Wait { .. } => "wait",
            Command::Report { .. } => "report",
        }
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    api: Arc<dyn GradingApi>,
    guard: ScreenGuard,
}

impl App {
    /// 初始化应用
    pub fn initialize(config: Config) -> Result<Self> {
        config.validate()?;
        logging::init_log_file(&config.output_log_file)?;
        let api: Arc<dyn GradingApi> = Arc::new(ZhipingClient::new(&config)?);
        Ok(Self::with_api(config, api))
    }

    /// 使用指定的 API 实现创建应用
    pub fn with_api(config: Config, api: Arc<dyn GradingApi>) -> Self {
        Self {
            config,
            api,
            guard: ScreenGuard::new(),
        }
    }

    /// 页面生命周期，关闭后进行中的等待立即返回
    pub fn guard(&self) -> ScreenGuard {
        self.guard.clone()
    }

    /// 运行命令
    ///
    /// 错误在这里统一转换为用户提示并写入日志文件
    pub async fn run(&self, command: Command) -> AppResult<()> {
        logging::log_startup(&self.config.api_base_url, command.name());
        let task_id = command.task_id();

        let result = self.dispatch(command).await;
        match &result {
            Ok(()) => self.record(&format!("任务 {} 执行成功", task_id)),
            Err(e) => {
                error!("[任务 {}] ❌ {}", task_id, e.user_message());
                if e.is_retryable() {
                    info!("[任务 {}] 💡 可以稍后重新执行该命令重试", task_id);
                }
                self.record(&format!("任务 {} 执行失败: {}", task_id, e));
            }
        }
        result
    }

    async fn dispatch(&self, command: Command) -> AppResult<()> {
        match command {
            Command::Paper { task_id } => {
                let session = self.open(task_id).await?;
                logging::log_question_views(session.ctx(), session.views());
                Ok(())
            }
            Command::UpdateAnswers { task_id, file } => {
                let sheet = read_sheet(&file).await?;
                let mut session = self.open(task_id).await?;
                apply_answer_sheet(&mut session, &sheet)?;
                session.save_answers().await?;
                Ok(())
            }
            Command::Submit {
                task_id,
                file,
                wait,
            } => {
                let mut session = self.open(task_id).await?;
                if let Some(file) = file {
                    let sheet = read_sheet(&file).await?;
                    apply_answer_sheet(&mut session, &sheet)?;
                }
                session.submit_for_grading().await?;
                if wait {
                    self.finish(&mut session).await?;
                }
                Ok(())
            }
            Command::Upload {
                task_id,
                images,
                wait,
            } => {
                let mut loaded = Vec::with_capacity(images.len());
                for path in &images {
                    let image = PaperImage::from_path(path)
                        .await
                        .map_err(|e| AppError::Other(e.to_string()))?;
                    loaded.push(image);
                }
                let mut session = self.open(task_id).await?;
                session.upload_paper(&loaded).await?;
                if wait {
                    self.finish(&mut session).await?;
                }
                Ok(())
            }
            Command::Wait { task_id } => {
                let mut session = self.open(task_id).await?;
                session.sync_status().await?;
                self.finish(&mut session).await
            }
            Command::Report { task_id } => {
                let mut session = self.open(task_id).await?;
                match session.sync_status().await? {
                    GradingStatus::Done => self.print_report(&session).await,
                    status => {
                        warn!("{} ⚠️ 批改尚未完成 ({:?})", session.ctx(), status);
                        Ok(())
                    }
                }
            }
        }
    }

    async fn open(&self, task_id: i64) -> AppResult<ReviewSession> {
        ReviewSession::load(
            self.api.clone(),
            ReviewCtx::new(task_id),
            PollSettings::from_config(&self.config),
            self.guard.clone(),
        )
        .await
    }

    /// 等待批改完成并输出报告
    async fn finish(&self, session: &mut ReviewSession) -> AppResult<()> {
        if let Some(hint) = session.leave_warning() {
            info!("{} ⏳ {}", session.ctx(), hint);
        }
        session.await_grading().await?;
        self.print_report(session).await
    }

    async fn print_report(&self, session: &ReviewSession) -> AppResult<()> {
        let report = session.fetch_report().await?;
        let summary = report.summary();
        logging::log_report(session.ctx(), &report, &summary);
        self.record(&format!(
            "任务 {} 得分 {:.1}/{:.1}",
            session.ctx().task_id,
            summary.user_score,
            summary.total_score
        ));
        Ok(())
    }

    fn record(&self, line: &str) {
        if let Err(e) = logging::append_log_line(&self.config.output_log_file, line) {
            warn!("写入日志文件失败: {}", e);
        }
    }
}

async fn read_sheet(path: &std::path::Path) -> AppResult<AnswerSheet> {
    load_answer_sheet(path)
        .await
        .map_err(|e| AppError::Other(format!("{:#}", e)))
}

/// 把答案文件逐题写入会话（编辑 → 修改 → 保存）
///
/// 题号在试卷中不存在时跳过；返回实际修改的题目数量
pub fn apply_answer_sheet(session: &mut ReviewSession, sheet: &AnswerSheet) -> AppResult<usize> {
    let mut applied = 0;
    for answer in &sheet.answers {
        let Some(id) = session
            .views()
            .iter()
            .find(|v| v.sequence() == answer.sequence)
            .map(|v| v.id())
        else {
            warn!(
                "{} ⚠️ 题号 {} 不在试卷中，已跳过",
                session.ctx(),
                answer.sequence
            );
            continue;
        };

        session.begin_edit(id)?;
        session.update_draft(id, answer.content.clone())?;
        if session.save_answer(id).is_saved() {
            applied += 1;
        }
    }
    info!("{} ✓ 已应用 {} 条答案", session.ctx(), applied);
    Ok(applied)
}
