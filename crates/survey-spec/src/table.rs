use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::export::Row;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Search, sort and pagination over flat response rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub sort: Option<(String, SortDirection)>,
    /// One-based page index.
    pub page: usize,
    pub per_page: usize,
}

impl Default for ResponseQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: None,
            page: 1,
            per_page: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of query results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponsePage {
    pub rows: Vec<Row>,
    pub page: usize,
    pub total_pages: usize,
    pub total_matches: usize,
}

impl ResponseQuery {
    /// Sorts by `column`, flipping to descending when it is already sorted ascending.
    pub fn request_sort(&mut self, column: &str) {
        let direction = match &self.sort {
            Some((current, SortDirection::Ascending)) if current == column => {
                SortDirection::Descending
            }
            _ => SortDirection::Ascending,
        };
        self.sort = Some((column.to_string(), direction));
    }

    pub fn run(&self, rows: &[Row]) -> ResponsePage {
        let needle = self.search.trim().to_lowercase();
        let mut matches: Vec<&Row> = rows
            .iter()
            .filter(|row| needle.is_empty() || row_matches(row, &needle))
            .collect();

        if let Some((column, direction)) = &self.sort {
            matches.sort_by(|a, b| compare(a.get(column), b.get(column), *direction));
        }

        let per_page = self.per_page.max(1);
        let total_matches = matches.len();
        let total_pages = total_matches.div_ceil(per_page);
        let page = self.page.max(1);
        let rows = matches
            .into_iter()
            .skip((page - 1).saturating_mul(per_page))
            .take(per_page)
            .cloned()
            .collect();

        ResponsePage {
            rows,
            page,
            total_pages,
            total_matches,
        }
    }
}

fn cell_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn row_matches(row: &Row, needle: &str) -> bool {
    row.values()
        .filter_map(cell_text)
        .any(|text| text.to_lowercase().contains(needle))
}

// Missing values sort last in both directions.
fn compare(a: Option<&Value>, b: Option<&Value>, direction: SortDirection) -> Ordering {
    let a = a.and_then(cell_text);
    let b = b.and_then(cell_text);
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => match direction {
            SortDirection::Ascending => a.cmp(&b),
            SortDirection::Descending => b.cmp(&a),
        },
    }
}
