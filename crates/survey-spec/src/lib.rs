#![allow(missing_docs)]

pub mod analytics;
pub mod answers;
pub mod encoding;
pub mod export;
pub mod navigation;
pub mod progress;
pub mod spec;
pub mod table;
pub mod validate;

pub use analytics::{ResponseSummary, SummaryColumns, summarize};
pub use answers::{Answer, AnswerStore};
pub use encoding::{
    AnswerValue, Selection, SingleChoice, decode_multi, decode_single, encode_multi,
    encode_single, is_specify_option, set_specify_text, toggle_option,
};
pub use export::{Row, SubmissionRecord, flatten_submissions, to_csv, to_json};
pub use navigation::{NavigationPolicy, Navigator, Position, Step};
pub use progress::{PositionSummary, Progress};
pub use spec::{
    Category, Language, LocalizedText, Question, QuestionKind, Respondent, RespondentId, Survey,
    SurveyError, UnknownLanguage,
};
pub use table::{ResponsePage, ResponseQuery, SortDirection};
pub use validate::{ValidationError, ValidationResult, is_blank, validate};
