use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use survey_spec::encoding;
use survey_spec::{
    AnswerStore, AnswerValue, Category, Language, LocalizedText, NavigationPolicy, Navigator,
    Position, PositionSummary, Progress, Question, QuestionKind, Respondent, RespondentId,
    Selection, Step, Survey, is_blank,
};
use tracing::{debug, info, warn};

use crate::backend::{BackendError, SurveyBackend};
use crate::error::SessionError;

/// Result of a successful `next` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextOutcome {
    Moved(Position),
    /// The last question was confirmed and the answers were saved.
    Submitted,
}

/// Clears the in-flight flag when the submission finishes, however it finishes.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn begin(flag: &'a AtomicBool) -> Result<Self, SessionError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| SessionError::SubmitInFlight)?;
        Ok(Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One respondent working through the survey.
///
/// Owns its answer store and navigator; the storage collaborator is shared.
/// Created through [`SurveySession::start`] or
/// [`ReturningRespondent::continue_and_update`](crate::gate::ReturningRespondent::continue_and_update).
pub struct SurveySession<B: ?Sized> {
    backend: Arc<B>,
    survey: Arc<Survey>,
    respondent: Mutex<Respondent>,
    answers: AnswerStore,
    navigator: Navigator,
    language: Language,
    policy: NavigationPolicy,
    submitting: AtomicBool,
    completed: AtomicBool,
}

impl<B: SurveyBackend + ?Sized> SurveySession<B> {
    pub(crate) fn from_parts(
        backend: Arc<B>,
        survey: Arc<Survey>,
        respondent: Respondent,
        language: Language,
        answers: AnswerStore,
    ) -> Self {
        let navigator = Navigator::new(survey.section_sizes());
        Self {
            backend,
            survey,
            respondent: Mutex::new(respondent),
            answers,
            navigator,
            language,
            policy: NavigationPolicy::default(),
            submitting: AtomicBool::new(false),
            completed: AtomicBool::new(false),
        }
    }

    pub fn with_policy(mut self, policy: NavigationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> NavigationPolicy {
        self.policy
    }

    pub fn set_policy(&mut self, policy: NavigationPolicy) {
        self.policy = policy;
    }

    pub fn survey(&self) -> &Survey {
        &self.survey
    }

    pub fn respondent(&self) -> Respondent {
        self.respondent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn replace_respondent_id(&self, id: RespondentId) {
        self.respondent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .id = id;
    }

    pub fn answers(&self) -> &AnswerStore {
        &self.answers
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    pub fn position(&self) -> Position {
        self.navigator.position()
    }

    pub fn position_summary(&self) -> PositionSummary {
        Progress::position_summary(&self.survey, self.position())
    }

    pub fn progress(&self) -> Progress {
        Progress::from_store(&self.survey, &self.answers)
    }

    pub fn is_first(&self) -> bool {
        self.navigator.is_first()
    }

    pub fn is_last(&self) -> bool {
        self.navigator.is_last()
    }

    pub fn current_category(&self) -> Option<&Category> {
        self.survey.category_at(self.position())
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.survey.question_at(self.position())
    }

    /// Stored text for the current question, `""` when unanswered.
    pub fn current_answer(&self) -> &str {
        self.current_question()
            .map(|question| self.answers.get(&question.id))
            .unwrap_or("")
    }

    pub fn current_value(&self) -> Option<AnswerValue> {
        self.current_question()
            .map(|question| AnswerValue::decode(question.kind, self.answers.get(&question.id)))
    }

    /// Writes `text` verbatim as the current question's answer.
    pub fn answer(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        let survey = Arc::clone(&self.survey);
        let question = current(&survey, self.position())?;
        self.answers.upsert(question.id.clone(), text);
        Ok(())
    }

    /// Encodes a typed value for the current question after checking it fits the question.
    pub fn answer_value(&mut self, value: &AnswerValue) -> Result<(), SessionError> {
        let survey = Arc::clone(&self.survey);
        let question = current(&survey, self.position())?;
        match (question.kind, value) {
            (QuestionKind::Text, AnswerValue::Text { .. }) => {}
            (kind, AnswerValue::Single(choice)) if kind.is_single_choice() => {
                ensure_option(question, &choice.option)?;
            }
            (QuestionKind::Multiselect, AnswerValue::Multi { selections }) => {
                for selection in selections {
                    ensure_option(question, &selection.option)?;
                }
            }
            (kind, _) => return Err(wrong_kind(question, kind)),
        }
        self.answers.upsert(question.id.clone(), value.encode());
        Ok(())
    }

    /// Picks `option` on a single-choice question, with optional specify text.
    ///
    /// `option` may be given in either language; it is stored in the session language.
    pub fn choose(&mut self, option: &str, free_text: Option<&str>) -> Result<(), SessionError> {
        let survey = Arc::clone(&self.survey);
        let question = current(&survey, self.position())?;
        if !question.kind.is_single_choice() {
            return Err(wrong_kind(question, question.kind));
        }
        let label = find_option(question, option)?.get(self.language);
        self.answers
            .upsert(question.id.clone(), encoding::encode_single(label, free_text));
        Ok(())
    }

    /// Selects or deselects `option` on a multi-choice question.
    ///
    /// A selection stored under the other language's label counts as the same option.
    pub fn toggle_option(&mut self, option: &str) -> Result<(), SessionError> {
        let survey = Arc::clone(&self.survey);
        let question = current(&survey, self.position())?;
        if question.kind != QuestionKind::Multiselect {
            return Err(wrong_kind(question, question.kind));
        }
        let label = find_option(question, option)?.get(self.language);
        let stored = localize_multi(question, self.answers.get(&question.id), self.language);
        let updated = encoding::toggle_option(&stored, label);
        self.answers.upsert(question.id.clone(), updated);
        Ok(())
    }

    /// Attaches free text to a specify option of the current choice question.
    pub fn set_specify_text(&mut self, option: &str, text: &str) -> Result<(), SessionError> {
        let survey = Arc::clone(&self.survey);
        let question = current(&survey, self.position())?;
        let label = find_option(question, option)?.get(self.language);
        let updated = match question.kind {
            kind if kind.is_single_choice() => encoding::encode_single(label, Some(text)),
            QuestionKind::Multiselect => {
                let stored =
                    localize_multi(question, self.answers.get(&question.id), self.language);
                encoding::set_specify_text(&stored, label, text)
            }
            kind => return Err(wrong_kind(question, kind)),
        };
        self.answers.upsert(question.id.clone(), updated);
        Ok(())
    }

    /// Moves back one question; `false` when already on the first one.
    pub fn previous(&mut self) -> bool {
        self.navigator.previous()
    }

    /// Advances past the current question, submitting when it is the last one.
    ///
    /// A blank answer is refused under [`NavigationPolicy::Block`] and stored
    /// as an empty entry under [`NavigationPolicy::AutoFill`].
    pub async fn next(&mut self) -> Result<NextOutcome, SessionError> {
        let survey = Arc::clone(&self.survey);
        let question = current(&survey, self.position())?;
        if is_blank(self.answers.get(&question.id)) {
            match self.policy {
                NavigationPolicy::Block => {
                    return Err(SessionError::AnswerRequired {
                        question_id: question.id.clone(),
                    });
                }
                NavigationPolicy::AutoFill => {
                    if !self.answers.contains(&question.id) {
                        debug!(question = %question.id, "auto-filling empty answer");
                        self.answers.upsert(question.id.clone(), "");
                    }
                }
            }
        }

        match self.navigator.next() {
            Step::Moved(position) => Ok(NextOutcome::Moved(position)),
            Step::Submit => {
                self.submit().await?;
                Ok(NextOutcome::Submitted)
            }
        }
    }

    /// Upserts every stored answer for this respondent.
    ///
    /// Refused with [`SessionError::SubmitInFlight`] while another submit is
    /// outstanding. A missing respondent row is recreated once before retrying.
    pub async fn submit(&self) -> Result<(), SessionError> {
        let _in_flight = InFlight::begin(&self.submitting)?;
        let answers = self.answers.to_list();
        let respondent = self.respondent();

        match self.backend.upsert_answers(&respondent.id, &answers).await {
            Ok(()) => {}
            Err(BackendError::MissingRespondent) => {
                warn!(
                    respondent = %respondent.id,
                    "respondent record missing; recreating before retrying the save"
                );
                let id = self
                    .backend
                    .create_or_get_respondent(&respondent.full_name, &respondent.email)
                    .await
                    .map_err(SessionError::SaveFailed)?;
                self.backend
                    .upsert_answers(&id, &answers)
                    .await
                    .map_err(SessionError::SaveFailed)?;
                self.replace_respondent_id(id);
            }
            Err(BackendError::Unauthorized) => return Err(SessionError::Unauthorized),
            Err(err) => return Err(SessionError::SaveFailed(err)),
        }

        self.completed.store(true, Ordering::Release);
        info!(
            respondent = %self.respondent().id,
            answers = answers.len(),
            "survey submitted"
        );
        Ok(())
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    /// Whether a submission has succeeded since the session started or restarted.
    pub fn is_complete(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    /// Clears answers and returns to the first question.
    pub fn restart(&mut self) {
        self.answers.clear();
        self.navigator.reset();
        self.completed.store(false, Ordering::Release);
    }
}

fn current(survey: &Survey, position: Position) -> Result<&Question, SessionError> {
    survey.question_at(position).ok_or(SessionError::NoQuestion)
}

fn find_option<'q>(
    question: &'q Question,
    option: &str,
) -> Result<&'q LocalizedText, SessionError> {
    question
        .options
        .iter()
        .find(|label| label.matches(option))
        .ok_or_else(|| SessionError::NotAnOption {
            question_id: question.id.clone(),
            option: option.to_string(),
        })
}

fn ensure_option(question: &Question, option: &str) -> Result<(), SessionError> {
    find_option(question, option).map(|_| ())
}

/// Re-labels stored selections in `language`, merging entries that name the same option.
fn localize_multi(question: &Question, stored: &str, language: Language) -> String {
    let mut merged: Vec<Selection> = Vec::new();
    for mut selection in encoding::decode_multi(stored) {
        if let Some(label) = question
            .options
            .iter()
            .find(|label| label.matches(&selection.option))
        {
            selection.option = label.get(language).to_string();
        }
        match merged
            .iter_mut()
            .find(|existing| existing.option == selection.option)
        {
            Some(existing) => {
                if existing.free_text.is_none() {
                    existing.free_text = selection.free_text;
                }
            }
            None => merged.push(selection),
        }
    }
    encoding::encode_multi(&merged)
}

fn wrong_kind(question: &Question, kind: QuestionKind) -> SessionError {
    SessionError::WrongQuestionType {
        question_id: question.id.clone(),
        kind: kind.as_str(),
    }
}
