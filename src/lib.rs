//! # 智评客户端
//!
//! 智评批改平台的答案审阅与提交客户端
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 基础设施层（Clients）
//! - `clients/` - 与后端的 REST 交互
//! - `GradingApi` - 远程操作的抽象，`ZhipingClient` 为 HTTP 实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 纯逻辑，不发起网络请求
//! - `merge_paper` - 按题号合并题目与作答
//! - `AnswerEditor` - 单题编辑状态
//! - `assemble_submission` - 组装提交数据
//! - `GradingPoller` - 批改状态跟踪
//! - `summarize` - 报告分数汇总
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一张试卷"的审阅流程
//! - `ReviewCtx` - 上下文封装（task_id + 试卷信息）
//! - `ReviewSession` - 流程编排（加载 → 编辑 → 提交 → 等待批改 → 报告）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/app` - 命令调度、错误兜底
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{GradingApi, ZhipingClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{PaperInfo, Question, QuestionType, QuestionView};
pub use orchestrator::{App, Command};
pub use workflow::{ReviewCtx, ReviewSession};
