pub mod grading_api;
pub mod zhiping_client;

pub use grading_api::GradingApi;
pub use zhiping_client::ZhipingClient;
