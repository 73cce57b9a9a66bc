use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use survey_spec::{SubmissionRecord, flatten_submissions, to_csv, to_json};

use crate::cmd::{emit, load_rows, load_survey, read_to_string};

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// JSON array of flat rows, or of submission records when --survey is given
    #[arg(long, value_name = "FILE")]
    pub input: PathBuf,
    #[arg(long, value_enum, default_value = "csv")]
    pub format: ExportFormat,
    /// Survey used to flatten submission records into rows
    #[arg(long, value_name = "SURVEY")]
    pub survey: Option<PathBuf>,
    /// Write to this file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

pub fn run(args: ExportArgs) -> Result<()> {
    let rows = match &args.survey {
        Some(survey_path) => {
            let survey = load_survey(survey_path)?;
            let raw = read_to_string(&args.input)?;
            let submissions: Vec<SubmissionRecord> = serde_json::from_str(&raw).with_context(
                || format!("{} is not a JSON array of submissions", args.input.display()),
            )?;
            flatten_submissions(&survey, &submissions)
        }
        None => load_rows(&args.input)?,
    };
    if rows.is_empty() {
        tracing::warn!("no rows to export");
    }

    let text = match args.format {
        ExportFormat::Csv => to_csv(&rows),
        ExportFormat::Json => to_json(&rows)?,
    };
    emit(&text, args.out.as_deref())
}
