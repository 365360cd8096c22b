/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use anyhow::Result;
use std::fs::{self, OpenOptions};
use std::io::Write;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::models::{GradingReport, QuestionView, ReportSummary};
use crate::services::wrong_details;
use crate::workflow::ReviewCtx;

/// 初始化 tracing
///
/// 优先使用 `RUST_LOG`，否则根据 `verbose` 选择 debug / info
pub fn init(verbose: bool) {
    let default_level = if verbose { "zhiping=debug" } else { "zhiping=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 测试中可能重复初始化，忽略错误
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// 初始化日志文件
///
/// # 参数
/// - `log_file_path`: 日志文件路径
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    let log_header = format!(
        "{}\n智评任务日志 - {}\n{}\n\n",
        "=".repeat(60),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
        "=".repeat(60)
    );
    fs::write(log_file_path, log_header)?;
    Ok(())
}

/// 追加一行记录到日志文件
pub fn append_log_line(log_file_path: &str, line: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)?;
    writeln!(
        file,
        "[{}] {}",
        chrono::Local::now().format("%H:%M:%S"),
        line
    )?;
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(api_base_url: &str, command: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 智评客户端启动");
    info!("🌐 服务地址: {}", api_base_url);
    info!("📌 执行命令: {}", command);
    info!("{}", "=".repeat(60));
}

/// 打印题目列表
pub fn log_question_views(ctx: &ReviewCtx, views: &[QuestionView]) {
    for view in views {
        let answer = view
            .user_answer
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .map(|a| truncate_text(a, 30))
            .unwrap_or_else(|| "（未作答）".to_string());
        info!(
            "{} 第 {} 题 [{}] {} → {}",
            ctx,
            view.sequence(),
            view.question.question_type(),
            truncate_text(&view.question.content, 40),
            answer
        );
    }
}

/// 打印批改报告
pub fn log_report(ctx: &ReviewCtx, report: &GradingReport, summary: &ReportSummary) {
    info!("\n{}", "=".repeat(60));
    info!("📊 {} 批改报告", ctx);
    info!("{}", "=".repeat(60));
    info!(
        "得分: {:.1} / {:.1}  得分率: {:.1}%",
        summary.user_score,
        summary.total_score,
        summary.accuracy * 100.0
    );
    for (kind, stats) in &summary.by_type {
        info!(
            "  {}: 得分 {:.1}  得分率 {:.1}%",
            kind,
            stats.total_score,
            stats.accuracy * 100.0
        );
    }

    let wrong = wrong_details(&report.grading_details);
    info!("❌ 错题: {}", wrong.len());
    for detail in wrong {
        info!(
            "  题目 {}: 作答 {} | 参考答案 {}",
            detail.question_id,
            truncate_text(&detail.user_answer, 20),
            truncate_text(&detail.question_answer, 20)
        );
    }

    if !report.over_all_comment.is_empty() {
        info!("💬 总评: {}", report.over_all_comment);
    }
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}
