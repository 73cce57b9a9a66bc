use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use survey_session::i18n::{tr, trf};
use survey_session::{
    MemoryBackend, NextOutcome, RespondentInput, SessionError, StartOutcome, SurveyBackend,
    SurveyConfig, SurveySession,
};
use survey_spec::{
    AnswerValue, Language, NavigationPolicy, Question, QuestionKind, Selection, is_specify_option,
};

use crate::cmd::load_survey;

const BACK: &str = ":back";

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum BackendKind {
    /// Keep answers in memory for this run only
    #[default]
    Memory,
    /// Use the hosted REST store from the config file
    Rest,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PolicyArg {
    Block,
    AutoFill,
}

impl From<PolicyArg> for NavigationPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Block => NavigationPolicy::Block,
            PolicyArg::AutoFill => NavigationPolicy::AutoFill,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Survey configuration; defaults to `survey_path` from --config
    #[arg(long, value_name = "SURVEY")]
    pub survey: Option<PathBuf>,
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    /// english, french, or a locale such as fr-CA
    #[arg(long)]
    pub language: Option<Language>,
    #[arg(long, value_enum, default_value = "memory")]
    pub backend: BackendKind,
    /// What to do with unanswered questions
    #[arg(long, value_enum)]
    pub policy: Option<PolicyArg>,
    /// survey.toml with backend settings and defaults
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

pub fn run(args: RunArgs) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();
    runtime.block_on(run_wizard(args, &mut input, &mut output))
}

async fn run_wizard<R: BufRead, W: Write>(
    args: RunArgs,
    input: &mut R,
    output: &mut W,
) -> Result<()> {
    let config = match &args.config {
        Some(path) => SurveyConfig::load(path)?,
        None => SurveyConfig::default(),
    };
    let survey_path = args.survey.clone().unwrap_or(config.survey_path.clone());
    let survey = Arc::new(load_survey(&survey_path)?);
    let language = args.language.unwrap_or(config.default_language);
    let policy = args
        .policy
        .map(NavigationPolicy::from)
        .unwrap_or(config.navigation_policy);
    let backend = backend(args.backend, &config)?;

    let respondent = RespondentInput::new(args.name, args.email);
    let outcome = SurveySession::start(backend, survey, respondent, language)
        .await
        .map_err(|err| user_error(&err, language))?;

    let session = match outcome {
        StartOutcome::Ready(session) => session,
        StartOutcome::AlreadySubmitted(returning) => {
            writeln!(output, "{}", tr(language, "gate.already_submitted.title"))?;
            writeln!(output, "{}", tr(language, "gate.already_submitted.body"))?;
            writeln!(output, "  1. {}", tr(language, "gate.continue"))?;
            writeln!(output, "  2. {}", tr(language, "gate.sign_out"))?;
            if read_line(input, output, "> ")? == "2" {
                returning
                    .sign_out()
                    .await
                    .map_err(|err| user_error(&err, language))?;
                return Ok(());
            }
            returning
                .continue_and_update()
                .await
                .map_err(|err| user_error(&err, language))?
        }
    };

    answer_questions(session.with_policy(policy), input, output).await
}

fn backend(kind: BackendKind, config: &SurveyConfig) -> Result<Arc<dyn SurveyBackend>> {
    match kind {
        BackendKind::Memory => Ok(Arc::new(MemoryBackend::new())),
        #[cfg(feature = "rest")]
        BackendKind::Rest => Ok(Arc::new(survey_session::RestBackend::new(&config.backend)?)),
        #[cfg(not(feature = "rest"))]
        BackendKind::Rest => {
            let _ = config;
            bail!("this build has no REST backend; rebuild with the `rest` feature")
        }
    }
}

fn user_error(err: &SessionError, language: Language) -> anyhow::Error {
    anyhow::anyhow!("{} ({err})", err.user_message(language))
}

async fn answer_questions<B, R, W>(
    mut session: SurveySession<B>,
    input: &mut R,
    output: &mut W,
) -> Result<()>
where
    B: SurveyBackend + ?Sized,
    R: BufRead,
    W: Write,
{
    writeln!(output, "{}", tr(session.language(), "nav.back_hint"))?;
    loop {
        let language = session.language();
        let Some(question) = session.current_question().cloned() else {
            bail!("survey has no questions");
        };
        show_question(&session, &question, output)?;

        let line = read_line(input, output, &prompt(&question, language))?;
        if line == BACK {
            session.previous();
            continue;
        }
        if !line.is_empty()
            && let Err(message) = apply_answer(&mut session, &question, &line, input, output)
        {
            writeln!(output, "{message}")?;
            continue;
        }

        match session.next().await {
            Ok(NextOutcome::Moved(_)) => {}
            Ok(NextOutcome::Submitted) => {
                writeln!(output, "{}", tr(language, "completion.title"))?;
                writeln!(output, "{}", tr(language, "completion.body"))?;
                return Ok(());
            }
            Err(SessionError::Unauthorized) => {
                return Err(user_error(&SessionError::Unauthorized, language));
            }
            Err(err) => writeln!(output, "{}", err.user_message(language))?,
        }
    }
}

fn show_question<B, W>(session: &SurveySession<B>, question: &Question, output: &mut W) -> Result<()>
where
    B: SurveyBackend + ?Sized,
    W: Write,
{
    let language = session.language();
    let summary = session.position_summary();
    let title = session
        .current_category()
        .map(|category| category.title.get(language))
        .unwrap_or_default();
    let section = trf(
        language,
        "header.section",
        &[
            summary.section_number.to_string().as_str(),
            summary.section_count.to_string().as_str(),
        ],
    );
    let position = trf(
        language,
        "header.question",
        &[
            summary.question_number.to_string().as_str(),
            summary.questions_in_section.to_string().as_str(),
        ],
    );
    let progress = trf(
        language,
        "progress.percent",
        &[format!("{:.0}", session.progress().percent()).as_str()],
    );
    writeln!(output)?;
    writeln!(output, "{section} - {title}")?;
    writeln!(output, "{position} | {progress}")?;
    writeln!(output, "{}", question.text(language))?;
    for (index, label) in question.option_labels(language).iter().enumerate() {
        writeln!(output, "  {}. {label}", index + 1)?;
    }
    let current = session.current_answer();
    if !current.is_empty() {
        writeln!(output, "[{current}]")?;
    }
    Ok(())
}

fn prompt(question: &Question, language: Language) -> String {
    match question.kind {
        QuestionKind::Text => "> ".to_string(),
        QuestionKind::Select | QuestionKind::Radio => {
            format!("{}: ", tr(language, "prompt.choose_one"))
        }
        QuestionKind::Multiselect => format!("{}: ", tr(language, "prompt.choose_many")),
    }
}

/// Stores `line` as the answer; `Err` carries the message to show before asking again.
fn apply_answer<B, R, W>(
    session: &mut SurveySession<B>,
    question: &Question,
    line: &str,
    input: &mut R,
    output: &mut W,
) -> Result<(), String>
where
    B: SurveyBackend + ?Sized,
    R: BufRead,
    W: Write,
{
    let language = session.language();
    let invalid = || tr(language, "session.error.not_an_option");
    let labels = question.option_labels(language);

    let result = match question.kind {
        QuestionKind::Text => session.answer(line),
        QuestionKind::Select | QuestionKind::Radio => {
            let option = pick(&labels, line).ok_or_else(invalid)?;
            let free_text = if is_specify_option(option) {
                Some(
                    read_line(input, output, &format!("{}: ", tr(language, "prompt.specify")))
                        .map_err(|err| err.to_string())?,
                )
            } else {
                None
            };
            session.choose(option, free_text.as_deref())
        }
        QuestionKind::Multiselect => {
            let mut selections = Vec::new();
            for entry in line.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
                let option = pick(&labels, entry).ok_or_else(invalid)?;
                if is_specify_option(option) {
                    let text =
                        read_line(input, output, &format!("{}: ", tr(language, "prompt.specify")))
                            .map_err(|err| err.to_string())?;
                    selections.push(Selection::with_free_text(option, text));
                } else {
                    selections.push(Selection::new(option));
                }
            }
            session.answer_value(&AnswerValue::multi(selections))
        }
    };
    result.map_err(|err| err.user_message(language))
}

/// Resolves a 1-based option number or an exact label.
fn pick<'a>(labels: &[&'a str], entry: &str) -> Option<&'a str> {
    if let Ok(number) = entry.parse::<usize>()
        && number > 0
        && number <= labels.len()
    {
        return Some(labels[number - 1]);
    }
    labels.iter().copied().find(|label| *label == entry)
}

fn read_line<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> Result<String> {
    write!(output, "{prompt}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("stdin closed");
    }
    Ok(line.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pick_accepts_numbers_and_labels() {
        let labels = ["Manufacturing", "Other (please specify)"];
        assert_eq!(pick(&labels, "2"), Some("Other (please specify)"));
        assert_eq!(pick(&labels, "Manufacturing"), Some("Manufacturing"));
        assert_eq!(pick(&labels, "0"), None);
        assert_eq!(pick(&labels, "3"), None);
        assert_eq!(pick(&labels, "manufacturing"), None);
    }

    #[test]
    fn read_line_fails_on_closed_input() {
        let mut input: &[u8] = b"";
        let mut output = Vec::new();
        assert!(read_line(&mut input, &mut output, "> ").is_err());
    }

    #[tokio::test]
    async fn wizard_walks_the_survey_and_submits() {
        let survey = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/two_sections.json");
        let args = RunArgs {
            survey: Some(PathBuf::from(survey)),
            name: "Ada".into(),
            email: "ada@example.org".into(),
            language: Some(Language::English),
            backend: BackendKind::Memory,
            policy: None,
            config: None,
        };
        let mut input: &[u8] = b"9\n1\n\n:back\n\nOntario\n1,3\nNegotiation\n";
        let mut output = Vec::new();

        run_wizard(args, &mut input, &mut output)
            .await
            .expect("wizard");
        let text = String::from_utf8(output).expect("utf8");
        assert!(text.contains("Please choose one of the listed options."));
        assert!(text.contains("Please answer this question before continuing."));
        assert!(text.contains("[Manufacturing]"));
        assert!(text.contains("Section 2 of 2 - Skills"));
        assert!(text.ends_with("Your responses have been recorded. Thank you for your time.\n"));
    }
}
