use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use survey_spec::{Answer, Respondent, RespondentId, SubmissionRecord};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::backend::{AdminBackend, BackendError, SurveyBackend};

#[derive(Debug, Clone)]
struct StoredResponse {
    text: String,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

#[derive(Debug, Default)]
struct MemoryState {
    profiles: Vec<Respondent>,
    responses: BTreeMap<(RespondentId, String), StoredResponse>,
}

impl MemoryState {
    fn has_profile(&self, id: &RespondentId) -> bool {
        self.profiles.iter().any(|profile| &profile.id == id)
    }

    fn responses_for<'a>(
        &'a self,
        id: &'a RespondentId,
    ) -> impl Iterator<Item = (&'a String, &'a StoredResponse)> + 'a {
        self.responses
            .iter()
            .filter(move |((owner, _), _)| owner == id)
            .map(|((_, question_id), stored)| (question_id, stored))
    }
}

/// In-process storage with the same upsert semantics as the hosted store.
///
/// Used by tests and the CLI's offline mode. Failures can be injected with
/// [`MemoryBackend::fail_next_upserts`] and [`MemoryBackend::forget_respondent`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    failing_upserts: AtomicUsize,
    sign_outs: AtomicUsize,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` upserts for known respondents fail with `Unavailable`.
    pub fn fail_next_upserts(&self, count: usize) {
        self.failing_upserts.store(count, Ordering::SeqCst);
    }

    /// Drops the respondent row while keeping their responses, so the next
    /// write hits a missing foreign key.
    pub async fn forget_respondent(&self, id: &RespondentId) -> bool {
        let mut state = self.state.lock().await;
        let before = state.profiles.len();
        state.profiles.retain(|profile| &profile.id != id);
        state.profiles.len() != before
    }

    /// Persisted answers for `id`, ordered by question id.
    pub async fn stored_answers(&self, id: &RespondentId) -> Vec<Answer> {
        let state = self.state.lock().await;
        state
            .responses_for(id)
            .map(|(question_id, stored)| Answer::new(question_id.clone(), stored.text.clone()))
            .collect()
    }

    /// Total persisted response rows across all respondents.
    pub async fn response_rows(&self) -> usize {
        self.state.lock().await.responses.len()
    }

    pub async fn respondents(&self) -> Vec<Respondent> {
        self.state.lock().await.profiles.clone()
    }

    pub fn sign_out_count(&self) -> usize {
        self.sign_outs.load(Ordering::SeqCst)
    }

    fn take_injected_failure(&self) -> bool {
        self.failing_upserts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |remaining| {
                remaining.checked_sub(1)
            })
            .is_ok()
    }
}

fn timestamp(at: OffsetDateTime) -> Result<String, BackendError> {
    at.format(&Rfc3339)
        .map_err(|err| BackendError::Unavailable(err.to_string()))
}

#[async_trait]
impl SurveyBackend for MemoryBackend {
    async fn create_or_get_respondent(
        &self,
        full_name: &str,
        email: &str,
    ) -> Result<RespondentId, BackendError> {
        let mut state = self.state.lock().await;
        if let Some(existing) = state.profiles.iter().find(|profile| profile.email == email) {
            debug!(respondent = %existing.id, "respondent already registered");
            return Ok(existing.id.clone());
        }
        let id = RespondentId::new(Uuid::new_v4().to_string());
        state.profiles.push(Respondent {
            id: id.clone(),
            full_name: full_name.to_string(),
            email: email.to_string(),
        });
        info!(respondent = %id, "created respondent");
        Ok(id)
    }

    async fn has_submitted(&self, respondent: &RespondentId) -> Result<bool, BackendError> {
        let state = self.state.lock().await;
        Ok(state.responses_for(respondent).next().is_some())
    }

    async fn fetch_answers(&self, respondent: &RespondentId) -> Result<Vec<Answer>, BackendError> {
        Ok(self.stored_answers(respondent).await)
    }

    async fn upsert_answers(
        &self,
        respondent: &RespondentId,
        answers: &[Answer],
    ) -> Result<(), BackendError> {
        // Suspend like a network call would.
        tokio::task::yield_now().await;

        let mut state = self.state.lock().await;
        if !state.has_profile(respondent) {
            return Err(BackendError::MissingRespondent);
        }
        if self.take_injected_failure() {
            return Err(BackendError::Unavailable("injected upsert failure".into()));
        }

        let now = OffsetDateTime::now_utc();
        for answer in answers {
            state
                .responses
                .entry((respondent.clone(), answer.question_id.clone()))
                .and_modify(|stored| {
                    stored.text = answer.text.clone();
                    stored.updated_at = now;
                })
                .or_insert_with(|| StoredResponse {
                    text: answer.text.clone(),
                    created_at: now,
                    updated_at: now,
                });
        }
        debug!(respondent = %respondent, count = answers.len(), "upserted answers");
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), BackendError> {
        self.sign_outs.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl AdminBackend for MemoryBackend {
    async fn list_submissions(&self) -> Result<Vec<SubmissionRecord>, BackendError> {
        let state = self.state.lock().await;
        let mut records = Vec::new();
        for profile in &state.profiles {
            let rows: Vec<_> = state.responses_for(&profile.id).collect();
            let (Some(first), Some(last)) = (
                rows.iter().map(|(_, stored)| stored.created_at).min(),
                rows.iter().map(|(_, stored)| stored.updated_at).max(),
            ) else {
                continue;
            };
            records.push(SubmissionRecord {
                respondent: profile.clone(),
                answers: rows
                    .iter()
                    .map(|(question_id, stored)| {
                        Answer::new((*question_id).clone(), stored.text.clone())
                    })
                    .collect(),
                submitted_at: Some(timestamp(first)?),
                updated_at: if last > first {
                    Some(timestamp(last)?)
                } else {
                    None
                },
            });
        }
        Ok(records)
    }
}
