pub mod envelope;
pub mod loaders;
pub mod question;
pub mod report;
pub mod subject;
pub mod upload;

pub use envelope::{ApiEnvelope, SUCCESS_CODE};
pub use loaders::{load_answer_sheet, AnswerSheet};
pub use question::{
    AnswerPayload, PaperInfo, Question, QuestionId, QuestionKind, QuestionType, QuestionView,
    Sequence, UserAnswer,
};
pub use report::{GradingDetail, GradingReport, ReportSummary, TypeStatistics};
pub use subject::{Subject, TaskStatus};
pub use upload::PaperImage;
