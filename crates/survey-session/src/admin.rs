//! Admin sign-in and the response dashboard.

use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use survey_spec::{
    ResponsePage, ResponseQuery, ResponseSummary, Row, SummaryColumns, Survey,
    flatten_submissions, summarize, to_csv, to_json,
};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::{info, warn};

use crate::backend::{AdminBackend, BackendError};

pub const DEFAULT_TOKEN_TTL: Duration = Duration::hours(24);

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("invalid admin credentials")]
    InvalidCredentials,
    #[error("admin token is malformed or has a bad signature")]
    InvalidToken,
    #[error("admin token has expired")]
    Expired,
    #[error("loading responses failed: {0}")]
    Backend(#[from] BackendError),
    #[error("rendering responses failed: {0}")]
    Render(#[from] serde_json::Error),
    #[error("signing admin token failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl AdminError {
    /// Auth failures send the admin back to the sign-in form.
    pub fn requires_sign_in(&self) -> bool {
        matches!(
            self,
            AdminError::InvalidCredentials | AdminError::InvalidToken | AdminError::Expired
        )
    }
}

/// HS256 JWT carrying the admin e-mail and an expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdminToken(String);

impl AdminToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AdminToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    email: String,
    exp: i64,
}

/// The single admin account and the key its tokens are signed with.
#[derive(Clone)]
pub struct AdminAuth {
    email: String,
    password: String,
    secret: String,
    ttl: Duration,
}

impl fmt::Debug for AdminAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminAuth")
            .field("email", &self.email)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl AdminAuth {
    pub fn new(
        email: impl Into<String>,
        password: impl Into<String>,
        secret: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            secret: secret.into(),
            ttl,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn sign_in(
        &self,
        email: &str,
        password: &str,
        now: OffsetDateTime,
    ) -> Result<AdminToken, AdminError> {
        if email.trim() != self.email || password != self.password {
            warn!("rejected admin sign-in");
            return Err(AdminError::InvalidCredentials);
        }
        let claims = Claims {
            email: self.email.clone(),
            exp: (now + self.ttl).unix_timestamp(),
        };
        let token = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(AdminError::Signing)?;
        info!(email = %self.email, "admin signed in");
        Ok(AdminToken(token))
    }

    /// Checks signature, expiry and that the token names the configured admin.
    pub fn verify(&self, token: &AdminToken, now: OffsetDateTime) -> Result<(), AdminError> {
        // Expiry is compared against `now` below rather than the system clock.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        let claims = jsonwebtoken::decode::<Claims>(
            token.as_str(),
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|_| AdminError::InvalidToken)?
        .claims;
        if claims.exp <= now.unix_timestamp() {
            return Err(AdminError::Expired);
        }
        if claims.email != self.email {
            return Err(AdminError::InvalidToken);
        }
        Ok(())
    }
}

/// Flattened responses loaded behind a verified admin token.
#[derive(Debug, Clone)]
pub struct AdminDashboard {
    survey: Arc<Survey>,
    rows: Vec<Row>,
}

impl AdminDashboard {
    pub async fn open<B: AdminBackend + ?Sized>(
        auth: &AdminAuth,
        token: &AdminToken,
        backend: &B,
        survey: Arc<Survey>,
        now: OffsetDateTime,
    ) -> Result<Self, AdminError> {
        auth.verify(token, now)?;
        let submissions = backend.list_submissions().await?;
        let rows = flatten_submissions(&survey, &submissions);
        info!(responses = rows.len(), "admin dashboard loaded");
        Ok(Self { survey, rows })
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn query(&self, query: &ResponseQuery) -> ResponsePage {
        query.run(&self.rows)
    }

    pub fn export_csv(&self) -> String {
        to_csv(&self.rows)
    }

    pub fn export_json(&self) -> Result<String, AdminError> {
        Ok(to_json(&self.rows)?)
    }

    pub fn summary(&self) -> ResponseSummary {
        summarize(&self.rows, &SummaryColumns::from_survey(&self.survey))
    }
}
