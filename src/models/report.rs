use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::question::{QuestionId, QuestionType};
use crate::services::report_aggregator;

/// 单题批改明细
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingDetail {
    pub question_id: QuestionId,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub score: f64,
    pub max_score: f64,
    #[serde(default)]
    pub user_answer: String,
    #[serde(default)]
    pub question_answer: String,
    #[serde(default)]
    pub correct: bool,
}

/// 分题型统计
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStatistics {
    /// 该题型得分之和
    pub total_score: f64,
    /// 得分率，满分为 0 时为 0
    pub accuracy: f64,
}

/// 服务器返回的批改结果
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingReport {
    #[serde(default)]
    pub grading_details: Vec<GradingDetail>,
    /// 服务器计算的分题型统计，仅作参考，展示时总是重新计算
    #[serde(default)]
    pub type_statistics: serde_json::Value,
    #[serde(default)]
    pub over_all_comment: String,
    #[serde(default)]
    pub wrong_count: u32,
}

impl GradingReport {
    /// 由批改明细重新计算汇总，不缓存
    pub fn summary(&self) -> ReportSummary {
        report_aggregator::summarize(&self.grading_details)
    }
}

/// 报告汇总
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportSummary {
    pub user_score: f64,
    pub total_score: f64,
    pub accuracy: f64,
    pub by_type: BTreeMap<QuestionType, TypeStatistics>,
}
