//! 报告分数汇总 - 业务能力层
//!
//! 纯函数，结果只取决于批改明细

use std::collections::BTreeMap;

use crate::models::question::QuestionType;
use crate::models::report::{GradingDetail, ReportSummary, TypeStatistics};

/// 满分为 0 时得分率为 0
fn ratio(score: f64, max_score: f64) -> f64 {
    if max_score == 0.0 {
        0.0
    } else {
        score / max_score
    }
}

/// 汇总总分、得分率和分题型统计
pub fn summarize(details: &[GradingDetail]) -> ReportSummary {
    let user_score: f64 = details.iter().map(|d| d.score).sum();
    let total_score: f64 = details.iter().map(|d| d.max_score).sum();

    // (得分之和, 满分之和)
    let mut groups: BTreeMap<QuestionType, (f64, f64)> = BTreeMap::new();
    for detail in details {
        let entry = groups.entry(detail.question_type).or_insert((0.0, 0.0));
        entry.0 += detail.score;
        entry.1 += detail.max_score;
    }

    let by_type = groups
        .into_iter()
        .map(|(kind, (score, max_score))| {
            (
                kind,
                TypeStatistics {
                    total_score: score,
                    accuracy: ratio(score, max_score),
                },
            )
        })
        .collect();

    ReportSummary {
        user_score,
        total_score,
        accuracy: ratio(user_score, total_score),
        by_type,
    }
}

/// 错题列表
pub fn wrong_details(details: &[GradingDetail]) -> Vec<&GradingDetail> {
    details.iter().filter(|d| !d.correct).collect()
}
