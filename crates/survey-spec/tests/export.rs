use serde_json::{Value, json};
use survey_spec::{
    Answer, Respondent, RespondentId, ResponseQuery, Row, SortDirection, SubmissionRecord,
    SummaryColumns, Survey, flatten_submissions, summarize, to_csv, to_json,
};

const SMALL_SURVEY: &str = include_str!("fixtures/small_survey.json");

fn row(value: Value) -> Row {
    value.as_object().cloned().expect("row object")
}

fn record(id: &str, name: &str, answers: &[(&str, &str)]) -> SubmissionRecord {
    SubmissionRecord {
        respondent: Respondent {
            id: RespondentId::new(id),
            full_name: name.into(),
            email: format!("{id}@example.org"),
        },
        answers: answers
            .iter()
            .map(|(question, text)| Answer::new(*question, *text))
            .collect(),
        submitted_at: Some("2025-03-01T10:00:00Z".into()),
        updated_at: None,
    }
}

#[test]
fn csv_quotes_every_value_but_not_the_header() {
    let rows = vec![row(json!({ "a": "1", "b": "x,y" }))];
    assert_eq!(to_csv(&rows), "a,b\n\"1\",\"x,y\"");
}

#[test]
fn csv_of_no_rows_is_empty() {
    assert_eq!(to_csv(&[]), "");
}

#[test]
fn csv_uses_first_row_columns_for_every_line() {
    let rows = vec![
        row(json!({ "name": "Ada", "note": null })),
        row(json!({ "note": "said \"yes\"", "name": "Grace", "extra": "dropped" })),
    ];
    assert_eq!(
        to_csv(&rows),
        "name,note\n\"Ada\",\n\"Grace\",\"said \"\"yes\"\"\""
    );
}

#[test]
fn json_export_is_a_pretty_array() {
    let rows = vec![row(json!({ "a": "1" }))];
    assert_eq!(
        to_json(&rows).expect("json"),
        "[\n  {\n    \"a\": \"1\"\n  }\n]"
    );
}

#[test]
fn flatten_orders_columns_by_survey_and_nulls_missing_answers() {
    let survey = Survey::from_json(SMALL_SURVEY).expect("fixture survey");
    let rows = flatten_submissions(
        &survey,
        &[record("u1", "Ada", &[("B-01", "Teamwork"), ("A-01", "Manufacturing")])],
    );

    assert_eq!(rows.len(), 1);
    let columns: Vec<&str> = rows[0].keys().map(String::as_str).collect();
    assert_eq!(
        columns,
        vec![
            "user_id",
            "full_name",
            "email",
            "Industry",
            "Region",
            "Key_Skills",
            "submission_date",
            "last_updated",
        ]
    );
    assert_eq!(rows[0]["Industry"], "Manufacturing");
    assert_eq!(rows[0]["Region"], Value::Null);
    assert_eq!(rows[0]["Key_Skills"], "Teamwork");
    assert_eq!(rows[0]["last_updated"], Value::Null);
}

fn table() -> Vec<Row> {
    vec![
        row(json!({ "full_name": "Charlie", "Industry": "Energy" })),
        row(json!({ "full_name": "alice", "Industry": null })),
        row(json!({ "full_name": "Bob", "Industry": "Manufacturing" })),
    ]
}

#[test]
fn query_searches_case_insensitively() {
    let query = ResponseQuery {
        search: "MANUF".into(),
        ..ResponseQuery::default()
    };
    let page = query.run(&table());
    assert_eq!(page.total_matches, 1);
    assert_eq!(page.rows[0]["full_name"], "Bob");
}

#[test]
fn query_sorts_with_missing_values_last() {
    let mut query = ResponseQuery::default();
    query.request_sort("Industry");
    let names = |query: &ResponseQuery| -> Vec<String> {
        query
            .run(&table())
            .rows
            .iter()
            .map(|row| row["full_name"].as_str().unwrap_or_default().to_string())
            .collect()
    };
    assert_eq!(names(&query), vec!["Charlie", "Bob", "alice"]);

    query.request_sort("Industry");
    assert_eq!(
        query.sort,
        Some(("Industry".to_string(), SortDirection::Descending))
    );
    assert_eq!(names(&query), vec!["Bob", "Charlie", "alice"]);
}

#[test]
fn query_paginates_one_based() {
    let query = ResponseQuery {
        page: 2,
        per_page: 2,
        ..ResponseQuery::default()
    };
    let page = query.run(&table());
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.rows.len(), 1);
    assert_eq!(page.rows[0]["full_name"], "Bob");
}

#[test]
fn query_past_the_last_page_is_empty() {
    let query = ResponseQuery {
        page: usize::MAX,
        per_page: 2,
        ..ResponseQuery::default()
    };
    let page = query.run(&table());
    assert!(page.rows.is_empty());
    assert_eq!(page.total_matches, 3);
    assert_eq!(page.page, usize::MAX);
}

#[test]
fn summary_counts_groups_and_averages_text_length() {
    let columns = SummaryColumns {
        group_by: vec!["Industry".into()],
        text_columns: vec!["Strengths".into(), "Comments".into()],
    };
    let rows = vec![
        row(json!({ "Industry": "Energy", "Strengths": "abcd", "Comments": "" })),
        row(json!({ "Industry": "Energy", "Strengths": "ab", "Comments": null })),
        row(json!({ "Industry": null, "Strengths": "abc" })),
    ];

    let summary = summarize(&rows, &columns);
    assert_eq!(summary.total_responses, 3);
    assert_eq!(summary.by_group["Industry"]["Energy"], 2);
    assert_eq!(summary.by_group["Industry"]["Unknown"], 1);
    assert_eq!(summary.average_response_length, 3);
}

#[test]
fn summary_columns_come_from_text_questions() {
    let survey = Survey::from_json(SMALL_SURVEY).expect("fixture survey");
    let columns = SummaryColumns::from_survey(&survey);
    assert_eq!(columns.group_by, vec!["Industry", "Region"]);
    assert_eq!(columns.text_columns, vec!["Region"]);
}
