#![allow(missing_docs)]

pub mod admin;
pub mod backend;
pub mod config;
pub mod error;
pub mod gate;
pub mod i18n;
pub mod memory;
#[cfg(feature = "rest")]
pub mod rest;
pub mod session;

pub use admin::{AdminAuth, AdminDashboard, AdminError, AdminToken, DEFAULT_TOKEN_TTL};
pub use backend::{AdminBackend, BackendError, SurveyBackend};
pub use config::{AdminConfig, BackendConfig, ConfigError, SurveyConfig};
pub use error::{RespondentProblem, SessionError};
pub use gate::{RespondentInput, ReturningRespondent, StartOutcome};
pub use memory::MemoryBackend;
#[cfg(feature = "rest")]
pub use rest::RestBackend;
pub use session::{NextOutcome, SurveySession};
