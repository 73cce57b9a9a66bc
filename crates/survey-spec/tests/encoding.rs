use proptest::prelude::*;
use survey_spec::{
    AnswerValue, QuestionKind, Selection, decode_multi, decode_single, encode_multi,
    encode_single, is_specify_option, set_specify_text, toggle_option,
};

#[test]
fn specify_vocabulary_matches_both_languages() {
    for label in [
        "Other",
        "OTHER",
        "Other (please specify)",
        "Please specify",
        "Autre",
        "Autre (veuillez préciser)",
        "Autres",
    ] {
        assert!(is_specify_option(label), "{label} should accept free text");
    }
    for label in ["Manufacturing", "Otherwise", "Teamwork", ""] {
        assert!(!is_specify_option(label), "{label} should not accept free text");
    }
}

#[test]
fn single_choice_appends_free_text_only_for_specify_options() {
    assert_eq!(
        encode_single("Other (please specify)", Some("  Robotics ")),
        "Other (please specify): Robotics"
    );
    assert_eq!(encode_single("Manufacturing", Some("ignored")), "Manufacturing");
    assert_eq!(encode_single("Other", Some("   ")), "Other");
    assert_eq!(encode_single("Other", None), "Other");
}

#[test]
fn decode_single_splits_on_first_colon() {
    let choice = decode_single("Other: Aerospace");
    assert_eq!(choice.option, "Other");
    assert_eq!(choice.free_text.as_deref(), Some("Aerospace"));

    let plain = decode_single("Energy");
    assert_eq!(plain.option, "Energy");
    assert_eq!(plain.free_text, None);
}

#[test]
fn multi_choice_keeps_at_most_one_free_text() {
    let encoded = encode_multi(&[
        Selection::new("Teamwork"),
        Selection::with_free_text("Other", "Negotiation"),
        Selection::with_free_text("Autre", "second"),
    ]);
    assert_eq!(encoded, "Teamwork,Other: Negotiation,Autre");
}

#[test]
fn toggle_adds_and_removes_options() {
    let value = toggle_option("", "Teamwork");
    assert_eq!(value, "Teamwork");
    let value = toggle_option(&value, "Communication");
    assert_eq!(value, "Teamwork,Communication");
    let value = toggle_option(&value, "Teamwork");
    assert_eq!(value, "Communication");
}

#[test]
fn toggle_removes_specify_entry_carrying_free_text() {
    let value = "Teamwork,Other (please specify): Negotiation";
    assert_eq!(toggle_option(value, "Other (please specify)"), "Teamwork");
}

#[test]
fn toggle_does_not_prefix_match_ordinary_options() {
    let value = "Team: lead";
    assert_eq!(toggle_option(value, "Team"), "Team: lead,Team");
}

#[test]
fn set_specify_text_updates_or_selects_the_option() {
    let value = set_specify_text("Teamwork", "Other", "Negotiation");
    assert_eq!(value, "Teamwork,Other: Negotiation");
    let value = set_specify_text(&value, "Other", "Leadership");
    assert_eq!(value, "Teamwork,Other: Leadership");
    let value = set_specify_text(&value, "Other", "");
    assert_eq!(value, "Teamwork,Other");
}

#[test]
fn answer_value_decodes_by_question_kind() {
    assert_eq!(
        AnswerValue::decode(QuestionKind::Text, "Note: free form"),
        AnswerValue::text("Note: free form")
    );
    assert_eq!(
        AnswerValue::decode(QuestionKind::Radio, "Other: x"),
        AnswerValue::single("Other", Some("x".into()))
    );
    assert_eq!(
        AnswerValue::decode(QuestionKind::Multiselect, "a,b"),
        AnswerValue::multi(vec![Selection::new("a"), Selection::new("b")])
    );
    assert_eq!(
        AnswerValue::decode(QuestionKind::Multiselect, ""),
        AnswerValue::multi(Vec::new())
    );
}

fn label() -> impl Strategy<Value = String> {
    "[A-Za-z][A-Za-z0-9 ]{0,15}"
}

fn specify_label() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Other".to_string()),
        Just("Other (please specify)".to_string()),
        Just("Autre (veuillez préciser)".to_string()),
        "[a-z]{1,8}".prop_map(|suffix| format!("Other {suffix}")),
    ]
}

fn free_text() -> impl Strategy<Value = String> {
    "[A-Za-z0-9][A-Za-z0-9 :]{0,20}[A-Za-z0-9]"
}

proptest! {
    #[test]
    fn single_choice_round_trips(option in specify_label(), text in free_text()) {
        let decoded = decode_single(&encode_single(&option, Some(&text)));
        prop_assert_eq!(decoded.option, option);
        prop_assert_eq!(decoded.free_text, Some(text));
    }

    #[test]
    fn plain_single_choice_round_trips(option in label()) {
        let decoded = decode_single(&encode_single(&option, None));
        prop_assert_eq!(decoded.option, option);
        prop_assert_eq!(decoded.free_text, None);
    }

    #[test]
    fn multi_choice_round_trips(
        plain in prop::collection::btree_set(label(), 0..5),
        other in prop::option::of((specify_label(), free_text())),
    ) {
        let mut selections: Vec<Selection> = plain
            .into_iter()
            .filter(|option| !is_specify_option(option))
            .map(Selection::new)
            .collect();
        if let Some((option, text)) = other {
            selections.push(Selection::with_free_text(option, text));
        }
        let decoded = decode_multi(&encode_multi(&selections));
        prop_assert_eq!(decoded, selections);
    }
}
