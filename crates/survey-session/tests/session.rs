use std::sync::Arc;

use survey_session::{
    BackendError, MemoryBackend, NextOutcome, RespondentInput, SessionError, StartOutcome,
    SurveySession,
};
use survey_spec::{Answer, Language, NavigationPolicy, Position, Progress, Survey};

const OTHER: &str = "Other (please specify)";

fn survey() -> Arc<Survey> {
    Arc::new(Survey::from_json(include_str!("fixtures/two_sections.json")).expect("fixture survey"))
}

fn ada() -> RespondentInput {
    RespondentInput::new("Ada Lovelace", "ada@example.org")
}

async fn ready(backend: &Arc<MemoryBackend>) -> SurveySession<MemoryBackend> {
    match SurveySession::start(backend.clone(), survey(), ada(), Language::English)
        .await
        .expect("start")
    {
        StartOutcome::Ready(session) => session,
        StartOutcome::AlreadySubmitted(_) => panic!("expected a ready session"),
    }
}

#[tokio::test]
async fn resubmission_keeps_one_row_per_question() {
    let backend = Arc::new(MemoryBackend::new());
    let mut session = ready(&backend).await;

    session.choose("Manufacturing", None).expect("choose");
    assert_eq!(
        session.next().await.expect("next"),
        NextOutcome::Moved(Position::new(0, 1))
    );
    session.answer("Ontario").expect("answer");
    assert_eq!(
        session.next().await.expect("next"),
        NextOutcome::Moved(Position::new(1, 0))
    );
    session.toggle_option("Teamwork").expect("toggle");
    assert_eq!(
        session.next().await.expect("submit"),
        NextOutcome::Submitted
    );
    assert!(session.is_complete());
    let id = session.respondent().id;
    assert_eq!(backend.response_rows().await, 3);

    let outcome = SurveySession::start(backend.clone(), survey(), ada(), Language::English)
        .await
        .expect("restart");
    let StartOutcome::AlreadySubmitted(returning) = outcome else {
        panic!("submitted respondent should be recognised");
    };
    let mut session = returning.continue_and_update().await.expect("resume");
    assert_eq!(session.answers().len(), 3);

    session.next().await.expect("next");
    session.answer("Quebec").expect("edit");
    session.next().await.expect("next");
    assert_eq!(
        session.next().await.expect("resubmit"),
        NextOutcome::Submitted
    );

    assert_eq!(backend.response_rows().await, 3);
    assert_eq!(
        backend.stored_answers(&id).await,
        vec![
            Answer::new("A-01", "Manufacturing"),
            Answer::new("A-02", "Quebec"),
            Answer::new("B-01", "Teamwork"),
        ]
    );
}

#[tokio::test]
async fn blank_answers_block_navigation_by_default() {
    let backend = Arc::new(MemoryBackend::new());
    let mut session = ready(&backend).await;
    assert_eq!(session.policy(), NavigationPolicy::Block);

    let err = session.next().await.expect_err("blank answer");
    assert!(matches!(
        err,
        SessionError::AnswerRequired { ref question_id } if question_id == "A-01"
    ));
    assert_eq!(
        err.user_message(Language::French),
        "Veuillez répondre à cette question avant de continuer."
    );

    session.answer("   ").expect("answer");
    assert!(session.next().await.is_err());
    assert_eq!(session.position(), Position::new(0, 0));
}

#[tokio::test]
async fn auto_fill_stores_an_empty_answer_and_moves_on() {
    let backend = Arc::new(MemoryBackend::new());
    let mut session = ready(&backend)
        .await
        .with_policy(NavigationPolicy::AutoFill);

    assert_eq!(
        session.next().await.expect("next"),
        NextOutcome::Moved(Position::new(0, 1))
    );
    assert!(session.answers().contains("A-01"));
    assert_eq!(session.answers().get("A-01"), "");
    assert_eq!(session.progress(), Progress::new(1, 3));
}

#[tokio::test]
async fn previous_is_a_no_op_on_the_first_question() {
    let backend = Arc::new(MemoryBackend::new());
    let mut session = ready(&backend).await;
    assert!(session.is_first());
    assert!(!session.previous());
    assert_eq!(session.position(), Position::new(0, 0));

    session.choose("Manufacturing", None).expect("choose");
    session.next().await.expect("next");
    session.answer("Ontario").expect("answer");
    session.next().await.expect("next");
    assert!(session.is_last());
    assert!(session.previous());
    assert_eq!(session.position(), Position::new(0, 1));
    assert_eq!(session.current_answer(), "Ontario");
}

#[tokio::test]
async fn multiselect_helpers_edit_the_current_answer() {
    let backend = Arc::new(MemoryBackend::new());
    let mut session = ready(&backend)
        .await
        .with_policy(NavigationPolicy::AutoFill);
    session.next().await.expect("next");
    session.next().await.expect("next");
    assert_eq!(session.current_question().map(|q| q.id.as_str()), Some("B-01"));

    session.toggle_option(OTHER).expect("toggle other");
    session
        .set_specify_text(OTHER, "Negotiation")
        .expect("specify");
    session.toggle_option("Travail en équipe").expect("toggle french");
    assert_eq!(
        session.current_answer(),
        "Other (please specify): Negotiation,Teamwork"
    );

    session.toggle_option(OTHER).expect("untoggle other");
    assert_eq!(session.current_answer(), "Teamwork");

    assert!(matches!(
        session.toggle_option("Juggling"),
        Err(SessionError::NotAnOption { .. })
    ));
    assert!(matches!(
        session.choose("Teamwork", None),
        Err(SessionError::WrongQuestionType { .. })
    ));
}

#[tokio::test]
async fn switching_language_keeps_one_entry_per_option() {
    let backend = Arc::new(MemoryBackend::new());
    let mut session = ready(&backend)
        .await
        .with_policy(NavigationPolicy::AutoFill);
    session.next().await.expect("next");
    session.next().await.expect("next");

    session.toggle_option(OTHER).expect("toggle other");
    session.toggle_option("Communication").expect("toggle");
    session.set_specify_text(OTHER, "old").expect("specify");
    assert_eq!(
        session.current_answer(),
        "Other (please specify): old,Communication"
    );

    session.set_language(Language::French);
    session
        .set_specify_text("Autre (veuillez préciser)", "nouveau")
        .expect("specify in french");
    assert_eq!(
        session.current_answer(),
        "Autre (veuillez préciser): nouveau,Communication"
    );

    session.set_language(Language::English);
    session.toggle_option(OTHER).expect("deselect other");
    assert_eq!(session.current_answer(), "Communication");
}

#[tokio::test]
async fn single_choice_is_stored_in_the_session_language() {
    let backend = Arc::new(MemoryBackend::new());
    let mut session = ready(&backend).await;
    session.set_language(Language::French);

    session.choose("Manufacturing", None).expect("choose");
    assert_eq!(session.current_answer(), "Fabrication");

    session.set_specify_text(OTHER, "Pêche").expect("specify");
    assert_eq!(session.current_answer(), "Autre (veuillez préciser): Pêche");
}

#[tokio::test]
async fn single_choice_specify_text_is_encoded() {
    let backend = Arc::new(MemoryBackend::new());
    let mut session = ready(&backend).await;

    session.set_specify_text(OTHER, " Fisheries ").expect("specify");
    assert_eq!(session.current_answer(), "Other (please specify): Fisheries");

    session.choose("Manufacturing", Some("ignored")).expect("choose");
    assert_eq!(session.current_answer(), "Manufacturing");
}

#[tokio::test]
async fn concurrent_submit_is_refused_while_one_is_in_flight() {
    let backend = Arc::new(MemoryBackend::new());
    let mut session = ready(&backend).await;
    session.choose("Manufacturing", None).expect("choose");

    let (first, second) = tokio::join!(session.submit(), session.submit());
    assert!(first.is_ok());
    assert!(matches!(second, Err(SessionError::SubmitInFlight)));
    assert!(!session.is_submitting());

    session.submit().await.expect("submit again once idle");
    assert_eq!(backend.response_rows().await, 1);
}

#[tokio::test]
async fn missing_respondent_is_recreated_once_before_retrying() {
    let backend = Arc::new(MemoryBackend::new());
    let mut session = ready(&backend).await;
    session.choose("Manufacturing", None).expect("choose");

    let original = session.respondent().id;
    assert!(backend.forget_respondent(&original).await);

    session.submit().await.expect("recovered save");
    let recovered = session.respondent().id;
    assert_ne!(recovered, original);
    assert_eq!(
        backend.stored_answers(&recovered).await,
        vec![Answer::new("A-01", "Manufacturing")]
    );
}

#[tokio::test]
async fn failed_recovery_surfaces_a_save_error() {
    let backend = Arc::new(MemoryBackend::new());
    let mut session = ready(&backend).await;
    session.choose("Manufacturing", None).expect("choose");

    backend.forget_respondent(&session.respondent().id).await;
    backend.fail_next_upserts(1);

    let err = session.submit().await.expect_err("second failure");
    assert!(matches!(
        err,
        SessionError::SaveFailed(BackendError::Unavailable(_))
    ));
    assert!(err.is_retryable());
    assert_eq!(
        err.user_message(Language::English),
        "An error occurred while saving your responses. Please try again."
    );
    assert!(!session.is_complete());

    session.submit().await.expect("user retry succeeds");
    assert!(session.is_complete());
}

#[tokio::test]
async fn restart_clears_answers_and_position() {
    let backend = Arc::new(MemoryBackend::new());
    let mut session = ready(&backend).await;
    session.choose("Manufacturing", None).expect("choose");
    session.next().await.expect("next");
    session.set_language(Language::French);

    session.restart();
    assert!(session.answers().is_empty());
    assert_eq!(session.position(), Position::new(0, 0));
    assert_eq!(session.language(), Language::French);
    assert_eq!(session.position_summary().section_count, 2);
}
