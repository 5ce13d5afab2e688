pub(crate) mod countdown;
pub(crate) mod ledger;
pub(crate) mod projection;
pub(crate) mod question;
pub(crate) mod scoring;
pub(crate) mod sections;
pub(crate) mod session;
pub(crate) mod shuffle;

use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum EngineError {
    #[error("question set could not be normalized: {0}")]
    Normalization(String),
    #[error("no questions remain after filtering")]
    EmptyWorkingSet,
    #[error("invalid subject selection: {0}")]
    SubjectSelection(String),
    #[error("exam is not currently available")]
    NotAvailable,
    #[error("unknown question id: {0}")]
    UnknownQuestion(String),
    #[error("option index {index} out of range for question {question_id}")]
    InvalidOption { question_id: String, index: usize },
    #[error("session is no longer accepting input")]
    SessionClosed,
}
