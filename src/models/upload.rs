use anyhow::{Context, Result};
use std::path::Path;

/// 待上传的试卷图片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaperImage {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

impl PaperImage {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = mime_for(&file_name);
        Self {
            file_name,
            mime,
            bytes,
        }
    }

    /// 从磁盘读取图片
    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("无法读取图片: {}", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "image.jpg".to_string());
        Ok(Self::new(file_name, bytes))
    }
}

fn mime_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "webp" => "image/webp",
        "heic" => "image/heic",
        _ => "image/jpeg",
    }
}
