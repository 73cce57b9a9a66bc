use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::export::RESERVED_COLUMNS;
use crate::spec::survey::Survey;

static QUESTION_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]-\d{2}$").expect("question id pattern"));

/// Validation error metadata reported for a survey configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_id: Option<String>,
    pub message: String,
    pub code: String,
}

/// Result returned from [`validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationError>,
}

/// True for empty or whitespace-only answers.
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

pub fn validate(survey: &Survey) -> ValidationResult {
    let mut errors = Vec::new();

    if survey.categories.is_empty() {
        errors.push(ValidationError {
            category_id: None,
            question_id: None,
            message: "survey has no categories".into(),
            code: "no_categories".into(),
        });
    }

    let mut seen_ids = BTreeSet::new();
    let mut seen_labels = BTreeSet::new();

    for category in &survey.categories {
        if category.questions.is_empty() {
            errors.push(ValidationError {
                category_id: Some(category.id.clone()),
                question_id: None,
                message: format!("category '{}' has no questions", category.id),
                code: "empty_category".into(),
            });
        }

        for question in &category.questions {
            let error = |message: String, code: &str| ValidationError {
                category_id: Some(category.id.clone()),
                question_id: Some(question.id.clone()),
                message,
                code: code.into(),
            };

            if !QUESTION_ID.is_match(&question.id) {
                errors.push(error(
                    format!("question id '{}' is not of the form X-00", question.id),
                    "invalid_id",
                ));
            }
            if !seen_ids.insert(question.id.as_str()) {
                errors.push(error(
                    format!("duplicate question id '{}'", question.id),
                    "duplicate_id",
                ));
            }
            if is_blank(&question.label) {
                errors.push(error(
                    format!("question '{}' has an empty label", question.id),
                    "empty_label",
                ));
            } else if RESERVED_COLUMNS.contains(&question.label.as_str()) {
                errors.push(error(
                    format!(
                        "question '{}' uses reserved column name '{}'",
                        question.id, question.label
                    ),
                    "reserved_label",
                ));
            } else if !seen_labels.insert(question.label.as_str()) {
                errors.push(error(
                    format!(
                        "question '{}' reuses label '{}'",
                        question.id, question.label
                    ),
                    "duplicate_label",
                ));
            }
            if question.kind.has_options() && question.options.is_empty() {
                errors.push(error(
                    format!(
                        "{} question '{}' declares no options",
                        question.kind.as_str(),
                        question.id
                    ),
                    "missing_options",
                ));
            }
        }
    }

    ValidationResult {
        valid: errors.is_empty(),
        errors,
    }
}
