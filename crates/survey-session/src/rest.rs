//! PostgREST-backed storage (the hosted survey database).
//!
//! Tables: `user_profiles(id, full_name, email)` and
//! `survey_responses(user_id, question_id, answer, created_at, updated_at)`
//! with a unique `(user_id, question_id)` constraint.

use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use survey_spec::{Answer, Respondent, RespondentId, SubmissionRecord};
use tracing::{debug, info};
use url::Url;

use crate::backend::{AdminBackend, BackendError, SurveyBackend};
use crate::config::BackendConfig;

const PROFILES: &str = "user_profiles";
const RESPONSES: &str = "survey_responses";
const FOREIGN_KEY_VIOLATION: &str = "23503";

#[derive(Debug, Clone)]
pub struct RestBackend {
    client: Client,
    base: Url,
    anon_key: String,
}

#[derive(Debug, Deserialize)]
struct IdRow {
    id: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ProfileRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    full_name: String,
    email: String,
}

#[derive(Debug, Serialize)]
struct ResponseWrite<'a> {
    user_id: &'a str,
    question_id: &'a str,
    answer: &'a str,
}

#[derive(Debug, Deserialize)]
struct ResponseRead {
    #[serde(default)]
    user_id: Option<String>,
    question_id: String,
    answer: String,
    #[serde(default)]
    created_at: Option<String>,
    #[serde(default)]
    updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl RestBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        Self::with_client(Client::new(), config)
    }

    pub fn with_client(client: Client, config: &BackendConfig) -> Result<Self, BackendError> {
        let mut base = Url::parse(&config.url)
            .map_err(|err| BackendError::Unavailable(format!("invalid backend url: {err}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client,
            base,
            anon_key: config.anon_key.clone(),
        })
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url, BackendError> {
        let mut url = self
            .base
            .join(path)
            .map_err(|err| BackendError::Unavailable(err.to_string()))?;
        if !params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn table(&self, table: &str, params: &[(&str, String)]) -> Result<Url, BackendError> {
        self.endpoint(&format!("rest/v1/{table}"), params)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|err| BackendError::Unavailable(err.to_string()))?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(classify(status, &body))
    }

    async fn read<T: for<'de> Deserialize<'de>>(response: Response) -> Result<T, BackendError> {
        response
            .json()
            .await
            .map_err(|err| BackendError::Unavailable(format!("unexpected response body: {err}")))
    }
}

/// Maps a failed PostgREST response onto the collaborator error taxonomy.
fn classify(status: StatusCode, body: &str) -> BackendError {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return BackendError::Unauthorized;
    }
    let detail = serde_json::from_str::<PostgrestError>(body).ok();
    if detail
        .as_ref()
        .and_then(|detail| detail.code.as_deref())
        .is_some_and(|code| code == FOREIGN_KEY_VIOLATION)
    {
        return BackendError::MissingRespondent;
    }
    let message = detail
        .and_then(|detail| detail.message)
        .unwrap_or_else(|| body.trim().to_string());
    BackendError::Unavailable(format!("{status}: {message}"))
}

fn eq(value: &str) -> String {
    format!("eq.{value}")
}

#[async_trait]
impl SurveyBackend for RestBackend {
    async fn create_or_get_respondent(
        &self,
        full_name: &str,
        email: &str,
    ) -> Result<RespondentId, BackendError> {
        let url = self.table(
            PROFILES,
            &[("select", "id".into()), ("email", eq(email)), ("limit", "1".into())],
        )?;
        let existing: Vec<IdRow> = Self::read(self.send(self.client.get(url)).await?).await?;
        if let Some(row) = existing.into_iter().next() {
            debug!(respondent = %row.id, "respondent already registered");
            return Ok(RespondentId::new(row.id));
        }

        let url = self.table(PROFILES, &[("select", "id".into())])?;
        let body = [ProfileRow {
            id: None,
            full_name: full_name.to_string(),
            email: email.to_string(),
        }];
        let request = self
            .client
            .post(url)
            .header("Prefer", "return=representation")
            .json(&body);
        let created: Vec<IdRow> = Self::read(self.send(request).await?).await?;
        let row = created
            .into_iter()
            .next()
            .ok_or_else(|| BackendError::NotFound("created respondent row".into()))?;
        info!(respondent = %row.id, "created respondent");
        Ok(RespondentId::new(row.id))
    }

    async fn has_submitted(&self, respondent: &RespondentId) -> Result<bool, BackendError> {
        let url = self.table(
            RESPONSES,
            &[
                ("select", "question_id".into()),
                ("user_id", eq(respondent.as_str())),
                ("limit", "1".into()),
            ],
        )?;
        let rows: Vec<serde_json::Value> = Self::read(self.send(self.client.get(url)).await?).await?;
        Ok(!rows.is_empty())
    }

    async fn fetch_answers(&self, respondent: &RespondentId) -> Result<Vec<Answer>, BackendError> {
        let url = self.table(
            RESPONSES,
            &[
                ("select", "question_id,answer".into()),
                ("user_id", eq(respondent.as_str())),
            ],
        )?;
        let rows: Vec<ResponseRead> = Self::read(self.send(self.client.get(url)).await?).await?;
        Ok(rows
            .into_iter()
            .map(|row| Answer::new(row.question_id, row.answer))
            .collect())
    }

    async fn upsert_answers(
        &self,
        respondent: &RespondentId,
        answers: &[Answer],
    ) -> Result<(), BackendError> {
        let url = self.table(RESPONSES, &[("on_conflict", "user_id,question_id".into())])?;
        let body: Vec<ResponseWrite<'_>> = answers
            .iter()
            .map(|answer| ResponseWrite {
                user_id: respondent.as_str(),
                question_id: &answer.question_id,
                answer: &answer.text,
            })
            .collect();
        let request = self
            .client
            .post(url)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&body);
        self.send(request).await?;
        debug!(respondent = %respondent, count = answers.len(), "upserted answers");
        Ok(())
    }

    /// Requests only ever carry the anon key, so there is no server session to end.
    async fn sign_out(&self) -> Result<(), BackendError> {
        debug!("signed out; no server session held");
        Ok(())
    }
}

#[async_trait]
impl AdminBackend for RestBackend {
    async fn list_submissions(&self) -> Result<Vec<SubmissionRecord>, BackendError> {
        let url = self.table(PROFILES, &[("select", "id,full_name,email".into())])?;
        let profiles: Vec<ProfileRow> = Self::read(self.send(self.client.get(url)).await?).await?;

        let url = self.table(
            RESPONSES,
            &[(
                "select",
                "user_id,question_id,answer,created_at,updated_at".into(),
            )],
        )?;
        let responses: Vec<ResponseRead> =
            Self::read(self.send(self.client.get(url)).await?).await?;

        let mut by_user: BTreeMap<String, Vec<ResponseRead>> = BTreeMap::new();
        for row in responses {
            if let Some(user_id) = row.user_id.clone() {
                by_user.entry(user_id).or_default().push(row);
            }
        }

        Ok(profiles
            .into_iter()
            .filter_map(|profile| {
                let id = profile.id?;
                let rows = by_user.remove(&id)?;
                let submitted_at = rows.iter().filter_map(|row| row.created_at.clone()).min();
                let updated_at = rows
                    .iter()
                    .filter_map(|row| row.updated_at.clone())
                    .max()
                    .filter(|updated| Some(updated) != submitted_at.as_ref());
                Some(SubmissionRecord {
                    respondent: Respondent {
                        id: RespondentId::new(id),
                        full_name: profile.full_name,
                        email: profile.email,
                    },
                    answers: rows
                        .into_iter()
                        .map(|row| Answer::new(row.question_id, row.answer))
                        .collect(),
                    submitted_at,
                    updated_at,
                })
            })
            .collect())
    }
}
