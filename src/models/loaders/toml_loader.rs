use crate::models::question::AnswerPayload;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use tokio::fs;

/// 本地答案文件
///
/// ```toml
/// [[answers]]
/// sequence = 1
/// content = "A"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnswerSheet {
    #[serde(default)]
    pub answers: Vec<AnswerPayload>,
}

impl AnswerSheet {
    /// 解析 TOML 文本，同一题号出现多次视为错误
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let sheet: AnswerSheet = toml::from_str(content).context("无法解析答案文件")?;

        let mut seen = HashSet::new();
        for answer in &sheet.answers {
            if !seen.insert(answer.sequence) {
                anyhow::bail!("答案文件中题号 {} 重复", answer.sequence);
            }
        }

        Ok(sheet)
    }
}

/// 从 TOML 文件加载答案
pub async fn load_answer_sheet(toml_file_path: &Path) -> Result<AnswerSheet> {
    if !toml_file_path.exists() {
        anyhow::bail!("文件不存在: {}", toml_file_path.display());
    }

    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let sheet = AnswerSheet::from_toml_str(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    tracing::info!(
        "成功加载 {} 条答案: {}",
        sheet.answers.len(),
        toml_file_path.file_name().unwrap_or_default().to_string_lossy()
    );

    Ok(sheet)
}
