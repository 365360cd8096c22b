//! 答案编辑状态 - 业务能力层
//!
//! 记录每道题的本地修改，同一时间最多只有一道题处于编辑状态

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::ReviewError;
use crate::models::question::{QuestionId, QuestionView};

/// 保存结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// 已保存该题的草稿
    Saved { id: QuestionId, content: String },
    /// 该题没有草稿，什么也没做，调用方应提示保存失败
    NotFound { id: QuestionId },
}

impl SaveOutcome {
    pub fn is_saved(&self) -> bool {
        matches!(self, SaveOutcome::Saved { .. })
    }
}

/// 答案编辑器
///
/// 职责：
/// - 维护"正在编辑哪道题"
/// - 维护草稿（drafts）与已保存的修改（committed）
/// - 不发起任何网络请求
#[derive(Debug, Default)]
pub struct AnswerEditor {
    editing: Option<QuestionId>,
    drafts: HashMap<QuestionId, String>,
    committed: HashMap<QuestionId, String>,
}

impl AnswerEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前正在编辑的题目
    pub fn editing(&self) -> Option<QuestionId> {
        self.editing
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    /// 已保存的修改
    pub fn committed(&self) -> &HashMap<QuestionId, String> {
        &self.committed
    }

    /// 当前草稿
    pub fn draft(&self, id: QuestionId) -> Option<&str> {
        self.drafts.get(&id).map(String::as_str)
    }

    /// 进入编辑状态
    ///
    /// 如果另一道题正在编辑，先同步保存它，再切换到新题目，返回那次保存的结果。
    /// 草稿以已保存的修改为准，其次是合并后的作答，都没有则为空字符串。
    pub fn begin_edit(
        &mut self,
        views: &[QuestionView],
        id: QuestionId,
    ) -> Result<Option<SaveOutcome>, ReviewError> {
        let view = views
            .iter()
            .find(|v| v.id() == id)
            .ok_or(ReviewError::QuestionNotFound { id })?;

        let previous = match self.editing {
            Some(current) if current == id => return Ok(None),
            Some(current) => {
                debug!("切换编辑题目 {} → {}，自动保存", current, id);
                Some(self.save(current))
            }
            None => None,
        };

        let seed = self
            .committed
            .get(&id)
            .cloned()
            .or_else(|| view.user_answer.clone())
            .unwrap_or_default();
        self.drafts.entry(id).or_insert(seed);
        self.editing = Some(id);

        Ok(previous)
    }

    /// 修改草稿，只允许修改正在编辑的题目
    pub fn update_draft(
        &mut self,
        id: QuestionId,
        content: impl Into<String>,
    ) -> Result<(), ReviewError> {
        if self.editing != Some(id) {
            return Err(ReviewError::NotEditing { id });
        }
        self.drafts.insert(id, content.into());
        Ok(())
    }

    /// 保存草稿并退出编辑状态
    pub fn save(&mut self, id: QuestionId) -> SaveOutcome {
        let Some(content) = self.drafts.remove(&id) else {
            warn!("题目 {} 没有可保存的草稿", id);
            return SaveOutcome::NotFound { id };
        };

        self.committed.insert(id, content.clone());
        if self.editing == Some(id) {
            self.editing = None;
        }
        SaveOutcome::Saved { id, content }
    }

    /// 放弃当前草稿并退出编辑状态
    pub fn cancel(&mut self) -> Option<QuestionId> {
        let id = self.editing.take()?;
        self.drafts.remove(&id);
        Some(id)
    }

    /// 整卷提交前的校验
    pub fn ensure_not_editing(&self) -> Result<(), ReviewError> {
        match self.editing {
            Some(id) => Err(ReviewError::StillEditing { id }),
            None => Ok(()),
        }
    }

    /// 该题当前生效的答案（已保存的修改优先）
    pub fn answer_for<'a>(&'a self, view: &'a QuestionView) -> Option<&'a str> {
        self.committed
            .get(&view.id())
            .map(String::as_str)
            .or(view.user_answer.as_deref())
    }

    /// 提交成功后丢弃全部本地状态
    pub fn reset(&mut self) {
        self.editing = None;
        self.drafts.clear();
        self.committed.clear();
    }
}
