//! 试卷数据合并 - 业务能力层
//!
//! 按题号把服务器记录的作答挂到题目上

use crate::models::question::{Question, QuestionView, UserAnswer};

/// 合并题目与作答
///
/// 对每道题取题号相同的第一条作答；没有作答的题目 `user_answer` 为 None。
/// 输出顺序与 `questions` 一致。
pub fn merge_paper(questions: &[Question], answers: &[UserAnswer]) -> Vec<QuestionView> {
    questions
        .iter()
        .map(|question| QuestionView {
            question: question.clone(),
            user_answer: answers
                .iter()
                .find(|answer| answer.sequence == question.sequence)
                .map(|answer| answer.content.clone()),
        })
        .collect()
}
