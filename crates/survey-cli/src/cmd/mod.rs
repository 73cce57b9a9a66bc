pub mod admin;
pub mod check;
pub mod export;
pub mod run;
pub mod schema;
pub mod summary;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use survey_spec::{Row, Survey};

pub(crate) fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub(crate) fn load_survey(path: &Path) -> Result<Survey> {
    let raw = read_to_string(path)?;
    Survey::from_json(&raw).with_context(|| format!("failed to load survey {}", path.display()))
}

pub(crate) fn load_rows(path: &Path) -> Result<Vec<Row>> {
    let raw = read_to_string(path)?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a JSON array of row objects", path.display()))
}

/// Writes `text` to `out` when given, otherwise to stdout.
pub(crate) fn emit(text: &str, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display())),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}
