use std::collections::BTreeMap;
use std::sync::OnceLock;

use survey_spec::Language;

static EN_MESSAGES: OnceLock<BTreeMap<String, String>> = OnceLock::new();
static FR_MESSAGES: OnceLock<BTreeMap<String, String>> = OnceLock::new();

fn en_messages() -> &'static BTreeMap<String, String> {
    EN_MESSAGES.get_or_init(|| {
        serde_json::from_str(include_str!("../i18n/en.json"))
            .expect("parse embedded i18n/en.json catalog")
    })
}

fn fr_messages() -> &'static BTreeMap<String, String> {
    FR_MESSAGES.get_or_init(|| {
        serde_json::from_str(include_str!("../i18n/fr.json"))
            .expect("parse embedded i18n/fr.json catalog")
    })
}

/// Embedded message catalog for `language`.
pub fn catalog(language: Language) -> &'static BTreeMap<String, String> {
    match language {
        Language::English => en_messages(),
        Language::French => fr_messages(),
    }
}

/// Looks up `key`, falling back to English and then to the key itself.
pub fn tr(language: Language, key: &str) -> String {
    catalog(language)
        .get(key)
        .or_else(|| en_messages().get(key))
        .cloned()
        .unwrap_or_else(|| key.to_string())
}

/// Like [`tr`], replacing each `{}` placeholder in order.
pub fn trf(language: Language, key: &str, args: &[&str]) -> String {
    let mut msg = tr(language, key);
    for arg in args {
        msg = msg.replacen("{}", arg, 1);
    }
    msg
}
