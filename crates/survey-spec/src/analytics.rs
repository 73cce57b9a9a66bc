use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::export::Row;
use crate::spec::question::QuestionKind;
use crate::spec::survey::Survey;

const UNKNOWN: &str = "Unknown";

/// Which columns feed the dashboard summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryColumns {
    /// Columns whose values are counted.
    pub group_by: Vec<String>,
    /// Free-text columns used for the average response length.
    pub text_columns: Vec<String>,
}

impl SummaryColumns {
    /// Groups by `Industry` and `Region`; every text question's label is a text column.
    pub fn from_survey(survey: &Survey) -> Self {
        Self {
            group_by: vec!["Industry".into(), "Region".into()],
            text_columns: survey
                .questions()
                .filter(|question| question.kind == QuestionKind::Text)
                .map(|question| question.label.clone())
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseSummary {
    pub total_responses: usize,
    pub by_group: BTreeMap<String, BTreeMap<String, usize>>,
    pub average_response_length: usize,
}

pub fn summarize(rows: &[Row], columns: &SummaryColumns) -> ResponseSummary {
    let mut by_group: BTreeMap<String, BTreeMap<String, usize>> = columns
        .group_by
        .iter()
        .map(|column| (column.clone(), BTreeMap::new()))
        .collect();

    let mut total_length = 0usize;
    let mut total_fields = 0usize;

    for row in rows {
        for column in &columns.group_by {
            let key = match row.get(column) {
                Some(Value::String(text)) if !text.is_empty() => text.clone(),
                _ => UNKNOWN.to_string(),
            };
            *by_group
                .entry(column.clone())
                .or_default()
                .entry(key)
                .or_insert(0) += 1;
        }
        for column in &columns.text_columns {
            if let Some(Value::String(text)) = row.get(column)
                && !text.is_empty()
            {
                total_length += text.chars().count();
                total_fields += 1;
            }
        }
    }

    let average_response_length = if total_fields == 0 {
        0
    } else {
        (total_length as f64 / total_fields as f64).round() as usize
    };

    ResponseSummary {
        total_responses: rows.len(),
        by_group,
        average_response_length,
    }
}
