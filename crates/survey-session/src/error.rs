use survey_spec::Language;
use thiserror::Error;

use crate::backend::BackendError;
use crate::i18n::tr;

/// Why respondent details were rejected before contacting storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RespondentProblem {
    MissingName,
    MissingEmail,
    InvalidEmail,
}

/// Per-action session failures. None of them end the session.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid respondent details: {0:?}")]
    InvalidRespondent(RespondentProblem),
    #[error("question {question_id} needs an answer before moving on")]
    AnswerRequired { question_id: String },
    #[error("'{option}' is not an option of question {question_id}")]
    NotAnOption { question_id: String, option: String },
    #[error("question {question_id} is a {kind} question")]
    WrongQuestionType {
        question_id: String,
        kind: &'static str,
    },
    #[error("survey has no question at the current position")]
    NoQuestion,
    #[error("a submission is already in progress")]
    SubmitInFlight,
    #[error("saving answers failed: {0}")]
    SaveFailed(#[source] BackendError),
    #[error("session is not authorized")]
    Unauthorized,
    #[error(transparent)]
    Backend(BackendError),
}

impl From<BackendError> for SessionError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Unauthorized => SessionError::Unauthorized,
            other => SessionError::Backend(other),
        }
    }
}

impl SessionError {
    /// Catalog key of the inline message shown to the respondent.
    pub fn message_key(&self) -> &'static str {
        match self {
            SessionError::InvalidRespondent(RespondentProblem::MissingName) => {
                "session.error.name_required"
            }
            SessionError::InvalidRespondent(RespondentProblem::MissingEmail) => {
                "session.error.email_required"
            }
            SessionError::InvalidRespondent(RespondentProblem::InvalidEmail) => {
                "session.error.invalid_email"
            }
            SessionError::AnswerRequired { .. } => "session.error.answer_required",
            SessionError::NotAnOption { .. } => "session.error.not_an_option",
            SessionError::WrongQuestionType { .. } | SessionError::NoQuestion => {
                "session.error.wrong_question_type"
            }
            SessionError::SubmitInFlight => "session.error.submit_in_flight",
            SessionError::SaveFailed(_) => "session.error.save_failed",
            SessionError::Unauthorized => "session.error.unauthorized",
            SessionError::Backend(_) => "session.error.generic",
        }
    }

    pub fn user_message(&self, language: Language) -> String {
        tr(language, self.message_key())
    }

    /// Whether repeating the same action may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SessionError::SaveFailed(_) | SessionError::Backend(_) | SessionError::SubmitInFlight
        )
    }
}
