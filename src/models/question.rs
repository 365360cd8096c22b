use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::subject;

/// 题目 ID（服务器分配）
pub type QuestionId = i64;

/// 题号（从 1 开始，试卷内唯一，题目与答案的关联键）
pub type Sequence = u32;

/// 题型
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum QuestionType {
    /// 选择题
    Choice,
    /// 填空题
    FillBlank,
    /// 简答题
    ShortAnswer,
}

impl QuestionType {
    /// 服务器使用的中文标签
    pub fn label(self) -> &'static str {
        match self {
            QuestionType::Choice => "选择题",
            QuestionType::FillBlank => "填空题",
            QuestionType::ShortAnswer => "简答题",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "选择题" | "单选题" => Some(QuestionType::Choice),
            "填空题" => Some(QuestionType::FillBlank),
            "简答题" | "解答题" => Some(QuestionType::ShortAnswer),
            _ => None,
        }
    }
}

impl TryFrom<String> for QuestionType {
    type Error = String;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        QuestionType::from_label(&label).ok_or_else(|| format!("未知的题型: {}", label))
    }
}

impl From<QuestionType> for String {
    fn from(kind: QuestionType) -> Self {
        kind.label().to_string()
    }
}

impl std::fmt::Display for QuestionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// 题目形态，选项只存在于选择题
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    Choice { options: BTreeMap<String, String> },
    FillBlank,
    ShortAnswer,
}

impl QuestionKind {
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::Choice { .. } => QuestionType::Choice,
            QuestionKind::FillBlank => QuestionType::FillBlank,
            QuestionKind::ShortAnswer => QuestionType::ShortAnswer,
        }
    }
}

/// 试卷中的一道题
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawQuestion")]
pub struct Question {
    pub id: QuestionId,
    pub sequence: Sequence,
    pub content: String,
    pub kind: QuestionKind,
    /// 参考答案，只在报告页使用
    pub correct_answer: Option<String>,
}

impl Question {
    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }

    /// 选择题的选项，其它题型为 None
    pub fn options(&self) -> Option<&BTreeMap<String, String>> {
        match &self.kind {
            QuestionKind::Choice { options } => Some(options),
            QuestionKind::FillBlank | QuestionKind::ShortAnswer => None,
        }
    }
}

/// 服务器返回的题目结构
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    id: QuestionId,
    sequence: Sequence,
    #[serde(rename = "type")]
    question_type: QuestionType,
    #[serde(default)]
    content: String,
    #[serde(default)]
    options: Option<BTreeMap<String, String>>,
    #[serde(default)]
    correct_answer: Option<String>,
}

impl TryFrom<RawQuestion> for Question {
    type Error = String;

    fn try_from(raw: RawQuestion) -> Result<Self, Self::Error> {
        if raw.sequence == 0 {
            return Err(format!("题目 {} 的题号必须从 1 开始", raw.id));
        }
        let kind = match raw.question_type {
            QuestionType::Choice => QuestionKind::Choice {
                options: raw.options.unwrap_or_default(),
            },
            QuestionType::FillBlank => QuestionKind::FillBlank,
            QuestionType::ShortAnswer => QuestionKind::ShortAnswer,
        };
        Ok(Question {
            id: raw.id,
            sequence: raw.sequence,
            content: raw.content,
            kind,
            correct_answer: raw.correct_answer,
        })
    }
}

/// 学生作答（按题号关联）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAnswer {
    pub sequence: Sequence,
    #[serde(default)]
    pub content: String,
}

/// 合并后的单题视图
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionView {
    pub question: Question,
    /// None 表示未作答
    pub user_answer: Option<String>,
}

impl QuestionView {
    pub fn id(&self) -> QuestionId {
        self.question.id
    }

    pub fn sequence(&self) -> Sequence {
        self.question.sequence
    }

    pub fn is_answered(&self) -> bool {
        self.user_answer.as_deref().is_some_and(|a| !a.trim().is_empty())
    }
}

/// 提交给服务器的单题答案
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerPayload {
    pub sequence: Sequence,
    pub content: String,
}

/// 试卷信息
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaperInfo {
    pub id: i64,
    pub name: String,
    /// 学科 ID
    pub subject: u8,
    #[serde(default)]
    pub grade_name: String,
    #[serde(default)]
    pub question_details: Vec<Question>,
    #[serde(default)]
    pub user_answers: Vec<UserAnswer>,
}

impl PaperInfo {
    pub fn subject_name(&self) -> &'static str {
        subject::subject_name(self.subject)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_choice_question_with_options() {
        let q: Question = serde_json::from_value(json!({
            "id": 11,
            "sequence": 1,
            "type": "选择题",
            "content": "1+1=?",
            "options": {"A": "1", "B": "2"}
        }))
        .unwrap();
        assert_eq!(q.question_type(), QuestionType::Choice);
        assert_eq!(q.options().unwrap().get("B").map(String::as_str), Some("2"));
        assert!(q.correct_answer.is_none());
    }

    #[test]
    fn test_options_dropped_for_fill_blank() {
        let q: Question = serde_json::from_value(json!({
            "id": 12,
            "sequence": 2,
            "type": "填空题",
            "content": "6*7=__",
            "options": {"A": "ignored"},
            "correctAnswer": "42"
        }))
        .unwrap();
        assert_eq!(q.kind, QuestionKind::FillBlank);
        assert!(q.options().is_none());
        assert_eq!(q.correct_answer.as_deref(), Some("42"));
    }

    #[test]
    fn test_unknown_question_type_is_error() {
        let result = serde_json::from_value::<Question>(json!({
            "id": 13,
            "sequence": 3,
            "type": "作文题",
            "content": "..."
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_sequence_is_error() {
        let result = serde_json::from_value::<Question>(json!({
            "id": 14,
            "sequence": 0,
            "type": "简答题",
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_paper_info() {
        let paper: PaperInfo = serde_json::from_value(json!({
            "id": 7,
            "name": "期中测验",
            "subject": 2,
            "gradeName": "七年级",
            "questionDetails": [
                {"id": 1, "sequence": 1, "type": "解答题", "content": "证明"}
            ],
            "userAnswers": [{"sequence": 1, "content": "略"}]
        }))
        .unwrap();
        assert_eq!(paper.subject_name(), "数学");
        assert_eq!(paper.question_details[0].question_type(), QuestionType::ShortAnswer);
        assert_eq!(paper.user_answers.len(), 1);
    }
}
