//! Entry point of a respondent session.
//!
//! Registers the respondent, then either hands back a ready session or, for
//! someone who already submitted, the sign-out / continue-and-update choice.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use survey_spec::{AnswerStore, Language, Respondent, Survey};
use tracing::info;

use crate::backend::SurveyBackend;
use crate::error::{RespondentProblem, SessionError};
use crate::session::SurveySession;

static EMAIL_SHAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\S+@\S+\.\S+").expect("email pattern"));

/// Details typed on the welcome form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RespondentInput {
    pub full_name: String,
    pub email: String,
}

impl RespondentInput {
    pub fn new(full_name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
        }
    }

    pub fn validate(&self) -> Result<(), SessionError> {
        if self.full_name.trim().is_empty() {
            return Err(SessionError::InvalidRespondent(
                RespondentProblem::MissingName,
            ));
        }
        let email = self.email.trim();
        if email.is_empty() {
            return Err(SessionError::InvalidRespondent(
                RespondentProblem::MissingEmail,
            ));
        }
        if !EMAIL_SHAPE.is_match(email) {
            return Err(SessionError::InvalidRespondent(
                RespondentProblem::InvalidEmail,
            ));
        }
        Ok(())
    }
}

pub enum StartOutcome<B: ?Sized> {
    Ready(SurveySession<B>),
    AlreadySubmitted(ReturningRespondent<B>),
}

/// A respondent with a stored submission, waiting for their choice.
pub struct ReturningRespondent<B: ?Sized> {
    backend: Arc<B>,
    survey: Arc<Survey>,
    respondent: Respondent,
    language: Language,
}

impl<B: SurveyBackend + ?Sized> ReturningRespondent<B> {
    pub fn respondent(&self) -> &Respondent {
        &self.respondent
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub async fn sign_out(self) -> Result<(), SessionError> {
        self.backend.sign_out().await?;
        info!(respondent = %self.respondent.id, "returning respondent signed out");
        Ok(())
    }

    /// Loads the stored answers into a fresh session at the first question.
    pub async fn continue_and_update(self) -> Result<SurveySession<B>, SessionError> {
        let stored = self.backend.fetch_answers(&self.respondent.id).await?;
        let mut answers = AnswerStore::new();
        for answer in stored {
            answers.upsert(answer.question_id, answer.text);
        }
        info!(
            respondent = %self.respondent.id,
            answers = answers.len(),
            "resuming previous submission"
        );
        Ok(SurveySession::from_parts(
            self.backend,
            self.survey,
            self.respondent,
            self.language,
            answers,
        ))
    }
}

impl<B: SurveyBackend + ?Sized> SurveySession<B> {
    /// Validates the welcome form, registers the respondent and checks for a prior submission.
    pub async fn start(
        backend: Arc<B>,
        survey: Arc<Survey>,
        input: RespondentInput,
        language: Language,
    ) -> Result<StartOutcome<B>, SessionError> {
        input.validate()?;
        let full_name = input.full_name.trim().to_string();
        let email = input.email.trim().to_string();

        let id = backend.create_or_get_respondent(&full_name, &email).await?;
        let respondent = Respondent {
            id,
            full_name,
            email,
        };

        if backend.has_submitted(&respondent.id).await? {
            info!(respondent = %respondent.id, "respondent has already submitted");
            return Ok(StartOutcome::AlreadySubmitted(ReturningRespondent {
                backend,
                survey,
                respondent,
                language,
            }));
        }

        Ok(StartOutcome::Ready(SurveySession::from_parts(
            backend,
            survey,
            respondent,
            language,
            AnswerStore::new(),
        )))
    }
}
