pub mod review_ctx;
pub mod review_flow;
pub mod screen_guard;

pub use review_ctx::{PollSettings, ReviewCtx};
pub use review_flow::ReviewSession;
pub use screen_guard::ScreenGuard;
