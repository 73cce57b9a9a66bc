//! Storage collaborator seam.
//!
//! The session never talks to a database directly: it goes through
//! [`SurveyBackend`], injected as an `Arc`, so the hosted REST store and the
//! in-memory store are interchangeable.

use async_trait::async_trait;
use survey_spec::{Answer, RespondentId, SubmissionRecord};
use thiserror::Error;

/// Failures reported by a storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    /// The respondent row a write refers to does not exist (foreign-key violation).
    #[error("respondent record is missing")]
    MissingRespondent,
    #[error("not authorized")]
    Unauthorized,
    #[error("not found: {0}")]
    NotFound(String),
}

/// Respondent-facing storage operations.
#[async_trait]
pub trait SurveyBackend: Send + Sync {
    /// Returns the id registered for `email`, creating the respondent when absent.
    async fn create_or_get_respondent(
        &self,
        full_name: &str,
        email: &str,
    ) -> Result<RespondentId, BackendError>;

    async fn has_submitted(&self, respondent: &RespondentId) -> Result<bool, BackendError>;

    async fn fetch_answers(&self, respondent: &RespondentId) -> Result<Vec<Answer>, BackendError>;

    /// Insert-or-update keyed by `(respondent, question_id)`.
    async fn upsert_answers(
        &self,
        respondent: &RespondentId,
        answers: &[Answer],
    ) -> Result<(), BackendError>;

    async fn sign_out(&self) -> Result<(), BackendError>;
}

/// Read access used by the admin dashboard.
#[async_trait]
pub trait AdminBackend: Send + Sync {
    async fn list_submissions(&self) -> Result<Vec<SubmissionRecord>, BackendError>;
}
