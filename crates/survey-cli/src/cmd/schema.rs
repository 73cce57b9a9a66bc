use anyhow::Result;
use survey_spec::Survey;

pub fn run() -> Result<()> {
    let schema = schemars::schema_for!(Survey);
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
