use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminView {
    Csv,
    Json,
    Summary,
}

#[derive(Args, Debug, Clone)]
pub struct AdminArgs {
    /// survey.toml with backend and admin settings
    #[arg(long, value_name = "FILE")]
    pub config: PathBuf,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub password: String,
    #[arg(long, value_enum, default_value = "csv")]
    pub format: AdminView,
    /// Only export rows containing this text
    #[arg(long)]
    pub search: Option<String>,
    /// Write to this file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

#[cfg(feature = "rest")]
pub fn run(args: AdminArgs) -> Result<()> {
    use std::sync::Arc;

    use survey_session::{AdminDashboard, RestBackend, SurveyConfig};
    use survey_spec::{ResponseQuery, to_csv, to_json};
    use time::OffsetDateTime;

    use crate::cmd::{emit, load_survey};

    let config = SurveyConfig::load(&args.config)?;
    let survey = Arc::new(load_survey(&config.survey_path)?);
    let auth = config
        .admin_auth()
        .context("no admin account configured; fill [admin] or set SURVEY_ADMIN_* variables")?;
    let now = OffsetDateTime::now_utc();
    let token = auth.sign_in(&args.email, &args.password, now)?;
    let backend = RestBackend::new(&config.backend)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let dashboard =
        runtime.block_on(AdminDashboard::open(&auth, &token, &backend, survey, now))?;

    let rows = match &args.search {
        Some(search) => {
            let query = ResponseQuery {
                search: search.clone(),
                per_page: dashboard.rows().len().max(1),
                ..ResponseQuery::default()
            };
            dashboard.query(&query).rows
        }
        None => dashboard.rows().to_vec(),
    };

    let text = match args.format {
        AdminView::Csv => to_csv(&rows),
        AdminView::Json => to_json(&rows)?,
        AdminView::Summary => serde_json::to_string_pretty(&dashboard.summary())?,
    };
    emit(&text, args.out.as_deref())
}

#[cfg(not(feature = "rest"))]
pub fn run(args: AdminArgs) -> Result<()> {
    let _ = args;
    anyhow::bail!("this build has no REST backend; rebuild with the `rest` feature")
}
