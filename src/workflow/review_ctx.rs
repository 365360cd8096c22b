//! 审阅上下文
//!
//! 封装"我正在审阅哪个任务的哪张试卷"这一信息，主要用于日志

use std::fmt::Display;
use std::time::Duration;

use crate::config::Config;

/// 审阅上下文
#[derive(Debug, Clone)]
pub struct ReviewCtx {
    /// 任务ID
    pub task_id: i64,

    /// 试卷名称（加载后填充，仅用于日志显示）
    pub paper_name: Option<String>,

    /// 学科显示名（加载后填充）
    pub subject_name: Option<String>,
}

impl ReviewCtx {
    pub fn new(task_id: i64) -> Self {
        Self {
            task_id,
            paper_name: None,
            subject_name: None,
        }
    }
}

impl Display for ReviewCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.paper_name, &self.subject_name) {
            (Some(name), Some(subject)) => {
                write!(f, "[任务 {} {}·{}]", self.task_id, subject, name)
            }
            _ => write!(f, "[任务 {}]", self.task_id),
        }
    }
}

/// 轮询相关的时间参数
#[derive(Debug, Clone, Copy)]
pub struct PollSettings {
    pub poll_interval: Duration,
    pub grading_timeout: Duration,
}

impl PollSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            grading_timeout: config.grading_timeout(),
        }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}
