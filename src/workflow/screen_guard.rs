//! 页面生命周期
//!
//! 网络请求不会被主动取消，但请求完成后必须先确认页面仍然存在才能更新状态

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default)]
pub struct ScreenGuard {
    token: CancellationToken,
}

impl ScreenGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// 页面是否仍然存在
    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// 关闭页面，只影响本地状态，服务器上的批改任务继续进行
    pub fn close(&self) {
        self.token.cancel();
    }

    /// 等待页面关闭
    pub async fn closed(&self) {
        self.token.cancelled().await
    }
}
