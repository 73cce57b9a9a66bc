pub mod category;
pub mod language;
pub mod question;
pub mod respondent;
pub mod survey;

pub use category::Category;
pub use language::{Language, LocalizedText, UnknownLanguage};
pub use question::{Question, QuestionKind};
pub use respondent::{Respondent, RespondentId};
pub use survey::{Survey, SurveyError};
