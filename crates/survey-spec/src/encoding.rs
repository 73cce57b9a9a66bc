//! Specify-other answer encoding.
//!
//! A choice answer is stored in a single text field. When the respondent picks
//! an "other / please specify" option and types a value, the value rides along
//! after a `": "` separator: `Other: Robotics`. Multi-choice answers join their
//! entries with `,`, and at most one entry carries free text.
//!
//! A literal `:` inside an option label or a `,` inside an entry cannot be told
//! apart from the separators. No escaping is applied.

use serde::{Deserialize, Serialize};

use crate::spec::question::QuestionKind;

const SPECIFY_VOCABULARY: &[&str] = &[
    "other",
    "others",
    "specify",
    "please specify",
    "other (please specify)",
    "autre",
    "autres",
    "préciser",
    "précisez",
    "veuillez préciser",
    "autre (veuillez préciser)",
    "autre (précisez)",
];

const OTHER_WORDS: &[&str] = &["other", "others", "autre", "autres"];

const SPECIFY_MARKERS: &[&str] = &["specify", "préciser", "précisez", "preciser", "precisez"];

/// True when `label` names an option that accepts free text.
pub fn is_specify_option(label: &str) -> bool {
    let lower = label.trim().to_lowercase();
    if lower.is_empty() {
        return false;
    }
    if SPECIFY_VOCABULARY.contains(&lower.as_str()) {
        return true;
    }
    let first_word = lower
        .split(|c: char| !c.is_alphabetic())
        .next()
        .unwrap_or_default();
    OTHER_WORDS.contains(&first_word) || SPECIFY_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Decoded single-choice answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleChoice {
    pub option: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_text: Option<String>,
}

/// One entry of a multi-choice answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub option: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_text: Option<String>,
}

impl Selection {
    pub fn new(option: impl Into<String>) -> Self {
        Self {
            option: option.into(),
            free_text: None,
        }
    }

    pub fn with_free_text(option: impl Into<String>, free_text: impl Into<String>) -> Self {
        Self {
            option: option.into(),
            free_text: Some(free_text.into()),
        }
    }
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn split_entry(entry: &str) -> (String, Option<String>) {
    match entry.split_once(':') {
        Some((option, rest)) => (option.to_string(), non_blank(rest)),
        None => (entry.to_string(), None),
    }
}

pub fn encode_single(option: &str, free_text: Option<&str>) -> String {
    match free_text.and_then(non_blank) {
        Some(text) if is_specify_option(option) => format!("{option}: {text}"),
        _ => option.to_string(),
    }
}

pub fn decode_single(text: &str) -> SingleChoice {
    let (option, free_text) = split_entry(text);
    SingleChoice { option, free_text }
}

pub fn encode_multi(selections: &[Selection]) -> String {
    let mut free_text_used = false;
    selections
        .iter()
        .map(|selection| {
            match selection.free_text.as_deref().and_then(non_blank) {
                Some(text) if !free_text_used && is_specify_option(&selection.option) => {
                    free_text_used = true;
                    format!("{}: {}", selection.option, text)
                }
                _ => selection.option.clone(),
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

pub fn decode_multi(text: &str) -> Vec<Selection> {
    text.split(',')
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (option, free_text) = split_entry(entry);
            Selection { option, free_text }
        })
        .collect()
}

/// Adds `option` to a multi-choice value, or removes it when already selected.
///
/// A specify option also matches its encoded `"option: text"` entry.
pub fn toggle_option(current: &str, option: &str) -> String {
    let specify = is_specify_option(option);
    let prefix = format!("{option}:");
    let mut entries: Vec<&str> = current.split(',').filter(|entry| !entry.is_empty()).collect();

    match entries
        .iter()
        .position(|entry| *entry == option || (specify && entry.starts_with(&prefix)))
    {
        Some(index) => {
            entries.remove(index);
        }
        None => entries.push(option),
    }
    entries.join(",")
}

/// Sets the free text of `option` inside a multi-choice value, selecting it if needed.
pub fn set_specify_text(current: &str, option: &str, text: &str) -> String {
    let mut selections = decode_multi(current);
    match selections
        .iter_mut()
        .find(|selection| selection.option == option)
    {
        Some(selection) => selection.free_text = non_blank(text),
        None => selections.push(Selection {
            option: option.to_string(),
            free_text: non_blank(text),
        }),
    }
    encode_multi(&selections)
}

/// Typed view of an answer's stored text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnswerValue {
    Text { text: String },
    Single(SingleChoice),
    Multi { selections: Vec<Selection> },
}

impl AnswerValue {
    pub fn text(text: impl Into<String>) -> Self {
        AnswerValue::Text { text: text.into() }
    }

    pub fn single(option: impl Into<String>, free_text: Option<String>) -> Self {
        AnswerValue::Single(SingleChoice {
            option: option.into(),
            free_text,
        })
    }

    pub fn multi(selections: Vec<Selection>) -> Self {
        AnswerValue::Multi { selections }
    }

    pub fn decode(kind: QuestionKind, text: &str) -> Self {
        match kind {
            QuestionKind::Text => AnswerValue::text(text),
            QuestionKind::Select | QuestionKind::Radio => AnswerValue::Single(decode_single(text)),
            QuestionKind::Multiselect => AnswerValue::multi(decode_multi(text)),
        }
    }

    pub fn encode(&self) -> String {
        match self {
            AnswerValue::Text { text } => text.clone(),
            AnswerValue::Single(choice) => {
                encode_single(&choice.option, choice.free_text.as_deref())
            }
            AnswerValue::Multi { selections } => encode_multi(selections),
        }
    }
}
