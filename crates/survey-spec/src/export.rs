use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::answers::{Answer, AnswerStore};
use crate::spec::respondent::Respondent;
use crate::spec::survey::Survey;

/// Flat response row keyed by column name, in column order.
pub type Row = Map<String, Value>;

pub const USER_ID: &str = "user_id";
pub const FULL_NAME: &str = "full_name";
pub const EMAIL: &str = "email";
pub const SUBMISSION_DATE: &str = "submission_date";
pub const LAST_UPDATED: &str = "last_updated";

/// Columns every row carries besides the question labels.
pub const RESERVED_COLUMNS: &[&str] =
    &[USER_ID, FULL_NAME, EMAIL, SUBMISSION_DATE, LAST_UPDATED];

/// A respondent together with their persisted answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SubmissionRecord {
    pub respondent: Respondent,
    pub answers: Vec<Answer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// One row per respondent: identity columns, then one column per question label.
pub fn flatten_submissions(survey: &Survey, submissions: &[SubmissionRecord]) -> Vec<Row> {
    submissions
        .iter()
        .map(|record| {
            let answers = AnswerStore::from_answers(record.answers.iter().cloned());
            let mut row = Row::new();
            row.insert(
                USER_ID.into(),
                Value::String(record.respondent.id.to_string()),
            );
            row.insert(
                FULL_NAME.into(),
                Value::String(record.respondent.full_name.clone()),
            );
            row.insert(EMAIL.into(), Value::String(record.respondent.email.clone()));
            for question in survey.questions() {
                let value = if answers.contains(&question.id) {
                    Value::String(answers.get(&question.id).to_string())
                } else {
                    Value::Null
                };
                row.insert(question.label.clone(), value);
            }
            row.insert(SUBMISSION_DATE.into(), optional(&record.submitted_at));
            row.insert(LAST_UPDATED.into(), optional(&record.updated_at));
            row
        })
        .collect()
}

fn optional(value: &Option<String>) -> Value {
    value.clone().map(Value::String).unwrap_or(Value::Null)
}

/// CSV with an unquoted header row taken from the first row's columns.
///
/// Every present value is double-quoted with inner quotes doubled; null and
/// missing values become empty cells.
pub fn to_csv(rows: &[Row]) -> String {
    let Some(first) = rows.first() else {
        return String::new();
    };
    let headers: Vec<&String> = first.keys().collect();

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(
        headers
            .iter()
            .map(|header| header.as_str())
            .collect::<Vec<_>>()
            .join(","),
    );
    for row in rows {
        let cells = headers
            .iter()
            .map(|header| csv_cell(row.get(header.as_str())))
            .collect::<Vec<_>>();
        lines.push(cells.join(","));
    }
    lines.join("\n")
}

fn csv_cell(value: Option<&Value>) -> String {
    let text = match value {
        None | Some(Value::Null) => return String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    };
    format!("\"{}\"", text.replace('"', "\"\""))
}

/// Pretty-printed JSON array of rows.
pub fn to_json(rows: &[Row]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(rows)
}
