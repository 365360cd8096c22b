//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (处理命令)
//!     ↓
//! workflow::ReviewSession (处理单张试卷)
//!     ↓
//! services (能力层：merge / edit / submit / poll / aggregate)
//!     ↓
//! clients (基础设施：GradingApi / ZhipingClient)
//! ```
//!
//! 编排层只做调度、错误兜底和日志，不做具体业务判断

pub mod app;

pub use app::{apply_answer_sheet, App, Command};
