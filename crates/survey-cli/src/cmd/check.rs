use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use survey_spec::{Survey, validate};

use crate::cmd::read_to_string;

#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// Survey configuration to validate
    #[arg(value_name = "SURVEY")]
    pub survey: PathBuf,
    /// Print the validation result as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let raw = read_to_string(&args.survey)?;
    let survey: Survey = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", args.survey.display()))?;
    let result = validate(&survey);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        for error in &result.errors {
            let location = error
                .question_id
                .as_deref()
                .or(error.category_id.as_deref())
                .unwrap_or("survey");
            eprintln!("{location}: {} ({})", error.message, error.code);
        }
    }
    if !result.valid {
        bail!(
            "{} has {} validation error(s)",
            args.survey.display(),
            result.errors.len()
        );
    }

    if !args.json {
        for category in &survey.categories {
            println!(
                "{}  {} / {}  ({} questions)",
                category.id,
                category.title.english,
                category.title.french,
                category.len()
            );
        }
        println!(
            "{} sections, {} questions",
            survey.categories.len(),
            survey.total_questions()
        );
    }
    Ok(())
}
