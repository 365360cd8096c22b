pub mod answer_editor;
pub mod grading_poller;
pub mod paper_merger;
pub mod report_aggregator;
pub mod submission;

pub use answer_editor::{AnswerEditor, SaveOutcome};
pub use grading_poller::{GradingPoller, GradingStatus, JobObservation, PollOutcome};
pub use paper_merger::merge_paper;
pub use report_aggregator::{summarize, wrong_details};
pub use submission::{assemble_submission, normalize_choice_keys};
