use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use survey_spec::{SummaryColumns, summarize};

use crate::cmd::{load_rows, load_survey};

#[derive(Args, Debug, Clone)]
pub struct SummaryArgs {
    /// JSON array of flat response rows
    #[arg(long, value_name = "FILE")]
    pub input: PathBuf,
    /// Survey whose text questions feed the average response length
    #[arg(long, value_name = "SURVEY")]
    pub survey: PathBuf,
}

pub fn run(args: SummaryArgs) -> Result<()> {
    let survey = load_survey(&args.survey)?;
    let rows = load_rows(&args.input)?;
    let summary = summarize(&rows, &SummaryColumns::from_survey(&survey));
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
