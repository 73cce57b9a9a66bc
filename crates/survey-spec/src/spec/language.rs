use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use unic_langid::LanguageIdentifier;

/// Languages the survey is authored in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Language {
    #[default]
    English,
    French,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::French => "french",
        }
    }

    /// Short locale code used by the message catalogs.
    pub fn code(&self) -> &'static str {
        match self {
            Language::English => "en",
            Language::French => "fr",
        }
    }

    /// Resolves a locale tag (`fr`, `fr-CA`, `fr_FR.UTF-8`) to a survey language.
    ///
    /// Anything that is not French falls back to English.
    pub fn from_locale(raw: &str) -> Language {
        normalize_locale(raw)
            .filter(|lid| lid.language.as_str() == "fr")
            .map(|_| Language::French)
            .unwrap_or(Language::English)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported language '{0}'; expected english, french or a locale such as fr-CA")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    /// Accepts language names in either language, or an `en`/`fr` locale tag.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "english" | "anglais" => return Ok(Language::English),
            "french" | "français" | "francais" => return Ok(Language::French),
            _ => {}
        }
        match normalize_locale(trimmed).as_ref().map(|lid| lid.language.as_str()) {
            Some("en") => Ok(Language::English),
            Some("fr") => Ok(Language::French),
            _ => Err(UnknownLanguage(trimmed.to_string())),
        }
    }
}

fn normalize_locale(raw: &str) -> Option<LanguageIdentifier> {
    let mut cleaned = raw.trim();
    if cleaned.is_empty() {
        return None;
    }
    if let Some((head, _)) = cleaned.split_once('.') {
        cleaned = head;
    }
    if let Some((head, _)) = cleaned.split_once('@') {
        cleaned = head;
    }
    cleaned.replace('_', "-").parse::<LanguageIdentifier>().ok()
}

/// A string authored in both survey languages.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct LocalizedText {
    pub english: String,
    pub french: String,
}

impl LocalizedText {
    pub fn new(english: impl Into<String>, french: impl Into<String>) -> Self {
        Self {
            english: english.into(),
            french: french.into(),
        }
    }

    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::English => &self.english,
            Language::French => &self.french,
        }
    }

    /// True when `value` equals the text in either language.
    pub fn matches(&self, value: &str) -> bool {
        self.english == value || self.french == value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_tags_resolve_to_languages() {
        assert_eq!(Language::from_locale("fr"), Language::French);
        assert_eq!(Language::from_locale("fr_CA.UTF-8"), Language::French);
        assert_eq!(Language::from_locale("en-GB"), Language::English);
        assert_eq!(Language::from_locale("de"), Language::English);
        assert_eq!(Language::from_locale(""), Language::English);
    }

    #[test]
    fn parses_language_names() {
        assert_eq!("French".parse::<Language>().unwrap(), Language::French);
        assert_eq!("english".parse::<Language>().unwrap(), Language::English);
        assert_eq!("fr-FR".parse::<Language>().unwrap(), Language::French);
        assert_eq!("Français".parse::<Language>().unwrap(), Language::French);
        assert_eq!("francais".parse::<Language>().unwrap(), Language::French);
        assert_eq!("en_US.UTF-8".parse::<Language>().unwrap(), Language::English);
    }

    #[test]
    fn rejects_languages_the_survey_is_not_written_in() {
        assert_eq!(
            "de".parse::<Language>(),
            Err(UnknownLanguage("de".to_string()))
        );
        assert!("".parse::<Language>().is_err());
        assert!("klingon".parse::<Language>().is_err());
    }
}
