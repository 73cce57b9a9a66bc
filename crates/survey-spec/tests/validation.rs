use serde_json::json;
use survey_spec::{Language, Position, QuestionKind, Survey, SurveyError, validate};

const SMALL_SURVEY: &str = include_str!("fixtures/small_survey.json");
const BUNDLED_SURVEY: &str = include_str!("../../../assets/survey.json");

#[test]
fn fixture_survey_loads_with_defaults() {
    let survey = Survey::from_json(SMALL_SURVEY).expect("fixture survey");
    assert_eq!(survey.total_questions(), 3);
    assert_eq!(survey.section_sizes(), vec![2, 1]);

    let region = survey.question("A-02").expect("A-02 exists");
    assert_eq!(region.kind, QuestionKind::Text);
    assert!(region.options.is_empty());

    let skills = survey
        .question_at(Position::new(1, 0))
        .expect("question at (1,0)");
    assert_eq!(skills.id, "B-01");
    assert_eq!(
        skills.option_labels(Language::French),
        vec!["Travail en équipe", "Communication", "Autre (veuillez préciser)"]
    );
}

#[test]
fn bundled_survey_is_valid() {
    let survey = Survey::from_json(BUNDLED_SURVEY).expect("bundled survey");
    assert_eq!(survey.categories.len(), 5);
    assert_eq!(survey.total_questions(), 26);
}

#[test]
fn validation_reports_each_broken_rule() {
    let survey: Survey = serde_json::from_value(json!({
        "categories": [
            {
                "id": "A",
                "title": { "english": "A", "french": "A" },
                "questions": [
                    { "id": "A-1", "label": "One", "english": "?", "french": "?" },
                    { "id": "A-02", "label": "One", "english": "?", "french": "?", "type": "radio" },
                    { "id": "A-02", "label": "Two", "english": "?", "french": "?" }
                ]
            },
            { "id": "B", "title": { "english": "B", "french": "B" }, "questions": [] }
        ]
    }))
    .expect("structurally valid json");

    let result = validate(&survey);
    assert!(!result.valid);
    let codes: Vec<&str> = result.errors.iter().map(|error| error.code.as_str()).collect();
    assert_eq!(
        codes,
        vec![
            "invalid_id",
            "duplicate_label",
            "missing_options",
            "duplicate_id",
            "empty_category",
        ]
    );
}

#[test]
fn from_json_distinguishes_parse_and_validation_failures() {
    assert!(matches!(
        Survey::from_json("{ not json"),
        Err(SurveyError::Parse(_))
    ));
    let err = Survey::from_json(r#"{ "categories": [] }"#).expect_err("empty survey");
    match err {
        SurveyError::Invalid(messages) => {
            assert_eq!(messages, vec!["survey has no categories".to_string()])
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn labels_may_not_shadow_identity_columns() {
    let survey: Survey = serde_json::from_value(json!({
        "categories": [
            {
                "id": "A",
                "title": { "english": "A", "french": "A" },
                "questions": [
                    { "id": "A-01", "label": "email", "english": "?", "french": "?" },
                    { "id": "A-02", "label": "last_updated", "english": "?", "french": "?" },
                    { "id": "A-03", "label": "Email_Opt_In", "english": "?", "french": "?" }
                ]
            }
        ]
    }))
    .expect("structurally valid json");

    let result = validate(&survey);
    let flagged: Vec<(&str, &str)> = result
        .errors
        .iter()
        .map(|error| {
            (
                error.question_id.as_deref().unwrap_or_default(),
                error.code.as_str(),
            )
        })
        .collect();
    assert_eq!(
        flagged,
        vec![("A-01", "reserved_label"), ("A-02", "reserved_label")]
    );
}
