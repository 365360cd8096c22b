//! 提交数据组装 - 业务能力层

use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::OnceLock;

use crate::models::question::{AnswerPayload, QuestionId, QuestionView};

/// 组装提交数据
///
/// 每道题输出一条 `{sequence, content}`，已保存的修改优先，其次是合并后的作答，
/// 都没有时为空字符串（不能省略，服务器要求每个题号都有一条）。内容原样发送。
pub fn assemble_submission(
    views: &[QuestionView],
    committed: &HashMap<QuestionId, String>,
) -> Vec<AnswerPayload> {
    views
        .iter()
        .map(|view| {
            let content = committed
                .get(&view.id())
                .map(String::as_str)
                .or(view.user_answer.as_deref())
                .unwrap_or_default();

            AnswerPayload {
                sequence: view.sequence(),
                content: content.to_string(),
            }
        })
        .collect()
}

/// 编辑选择题时规范化选项字母
///
/// 只有整段输入都是选项字母（可用空白、逗号、顿号分隔）时才改写，
/// 例如 "a、c" → "AC"；题目带选项时每个字母还必须是其中之一。
/// 其他输入返回 `None`，保持学生原文。
pub fn normalize_choice_keys(options: &BTreeMap<String, String>, raw: &str) -> Option<String> {
    if !choice_keys_regex().is_match(raw) {
        return None;
    }

    let keys: String = raw
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    let known = options.is_empty()
        || keys
            .chars()
            .all(|c| options.contains_key(&c.to_string()));
    known.then_some(keys)
}

fn choice_keys_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*[a-hA-H](?:[\s,，、]*[a-hA-H])*\s*$").expect("valid option key regex")
    })
}
