//! 学科 / 任务状态查找表
//!
//! 服务器只返回数字 ID，这里负责映射为中文显示名和英文 key

use phf::phf_map;

/// 学科 ID → (显示名, 英文 key)
static SUBJECTS: phf::Map<u8, (&'static str, &'static str)> = phf_map! {
    1u8 => ("语文", "chinese"),
    2u8 => ("数学", "math"),
    3u8 => ("英语", "english"),
    4u8 => ("物理", "physics"),
    5u8 => ("化学", "chemistry"),
    6u8 => ("生物", "biology"),
    7u8 => ("历史", "history"),
    8u8 => ("政治", "politics"),
    9u8 => ("地理", "geography"),
};

/// 任务状态 ID → (显示名, 英文 key)
static STATUSES: phf::Map<u8, (&'static str, &'static str)> = phf_map! {
    0u8 => ("待提交", "pending"),
    1u8 => ("批改中", "grading"),
    2u8 => ("已完成", "completed"),
    3u8 => ("批改失败", "failed"),
};

const UNKNOWN_NAME: &str = "未知";
const UNKNOWN_KEY: &str = "unknown";

/// 科目枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Subject {
    /// 语文
    Chinese = 1,
    /// 数学
    Math = 2,
    /// 英语
    English = 3,
    /// 物理
    Physics = 4,
    /// 化学
    Chemistry = 5,
    /// 生物
    Biology = 6,
    /// 历史
    History = 7,
    /// 政治
    Politics = 8,
    /// 地理
    Geography = 9,
}

impl Subject {
    const ALL: [Subject; 9] = [
        Subject::Chinese,
        Subject::Math,
        Subject::English,
        Subject::Physics,
        Subject::Chemistry,
        Subject::Biology,
        Subject::History,
        Subject::Politics,
        Subject::Geography,
    ];

    /// 获取科目 ID
    pub fn id(self) -> u8 {
        self as u8
    }

    /// 获取中文名称
    pub fn name(self) -> &'static str {
        SUBJECTS.get(&self.id()).map(|(name, _)| *name).unwrap_or(UNKNOWN_NAME)
    }

    /// 获取英文 key
    pub fn key(self) -> &'static str {
        SUBJECTS.get(&self.id()).map(|(_, key)| *key).unwrap_or(UNKNOWN_KEY)
    }

    /// 从 ID 解析科目
    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }

    /// 从英文 key 解析科目
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase();
        Self::ALL.into_iter().find(|s| s.key() == key)
    }
}

impl TryFrom<u8> for Subject {
    type Error = String;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Subject::from_id(id).ok_or_else(|| format!("未知的学科 ID: {}", id))
    }
}

impl From<Subject> for u8 {
    fn from(subject: Subject) -> Self {
        subject.id()
    }
}

impl std::fmt::Display for Subject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Pending = 0,
    Grading = 1,
    Completed = 2,
    Failed = 3,
}

impl TaskStatus {
    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn from_id(id: u8) -> Option<Self> {
        match id {
            0 => Some(TaskStatus::Pending),
            1 => Some(TaskStatus::Grading),
            2 => Some(TaskStatus::Completed),
            3 => Some(TaskStatus::Failed),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        status_name(self.id())
    }

    pub fn key(self) -> &'static str {
        status_key(self.id())
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 学科显示名，未知 ID 返回 "未知"
pub fn subject_name(id: u8) -> &'static str {
    SUBJECTS.get(&id).map(|(name, _)| *name).unwrap_or(UNKNOWN_NAME)
}

/// 学科英文 key，未知 ID 返回 "unknown"
pub fn subject_key(id: u8) -> &'static str {
    SUBJECTS.get(&id).map(|(_, key)| *key).unwrap_or(UNKNOWN_KEY)
}

/// 状态显示名
pub fn status_name(id: u8) -> &'static str {
    STATUSES.get(&id).map(|(name, _)| *name).unwrap_or(UNKNOWN_NAME)
}

/// 状态英文 key
pub fn status_key(id: u8) -> &'static str {
    STATUSES.get(&id).map(|(_, key)| *key).unwrap_or(UNKNOWN_KEY)
}
