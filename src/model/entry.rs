use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Location {
    pub filename: String,

    #[serde(default)]
    pub line: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct TsMessage {
    pub source: String,

    /// Disambiguation comment. Part of the lookup key.
    #[serde(default)]
    pub comment: Option<String>,

    #[serde(default)]
    pub extra_comment: Option<String>,

    #[serde(default)]
    pub translator_comment: Option<String>,

    #[serde(default)]
    pub translation: String,

    #[serde(default)]
    pub numerus: bool,

    #[serde(default)]
    pub numerus_forms: Vec<String>,

    #[serde(default)]
    pub status: TranslationStatus,

    #[serde(default)]
    pub locations: Vec<Location>,
}

impl TsMessage {
    pub fn new(source: impl Into<String>) -> Self {
        TsMessage {
            source: source.into(),
            ..Default::default()
        }
    }

    pub fn has_translation(&self) -> bool {
        if self.numerus {
            self.numerus_forms.iter().any(|f| !f.trim().is_empty())
        } else {
            !self.translation.trim().is_empty()
        }
    }

    /// False for entries whose source string is gone from the application.
    pub fn is_active(&self) -> bool {
        !matches!(
            self.status,
            TranslationStatus::Vanished | TranslationStatus::Obsolete
        )
    }

    pub fn key(&self) -> (&str, Option<&str>) {
        (self.source.as_str(), self.comment.as_deref())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TranslationStatus {
    Finished,
    Unfinished,
    Vanished,
    Obsolete,
}

impl TranslationStatus {
    /// Value of the `type` attribute on `<translation>`. Finished entries carry none.
    pub fn as_type_attr(&self) -> Option<&'static str> {
        match self {
            TranslationStatus::Finished => None,
            TranslationStatus::Unfinished => Some("unfinished"),
            TranslationStatus::Vanished => Some("vanished"),
            TranslationStatus::Obsolete => Some("obsolete"),
        }
    }

    pub fn from_type_attr(value: Option<&str>) -> Option<Self> {
        match value {
            None => Some(TranslationStatus::Finished),
            Some("unfinished") => Some(TranslationStatus::Unfinished),
            Some("vanished") => Some(TranslationStatus::Vanished),
            Some("obsolete") => Some(TranslationStatus::Obsolete),
            Some(_) => None,
        }
    }
}

impl Default for TranslationStatus {
    fn default() -> Self {
        TranslationStatus::Unfinished
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_attr_maps_both_ways() {
        for status in [
            TranslationStatus::Finished,
            TranslationStatus::Unfinished,
            TranslationStatus::Vanished,
            TranslationStatus::Obsolete,
        ] {
            assert_eq!(
                TranslationStatus::from_type_attr(status.as_type_attr()),
                Some(status)
            );
        }
        assert_eq!(TranslationStatus::from_type_attr(Some("bogus")), None);
    }

    #[test]
    fn numerus_translation_checks_forms() {
        let mut m = TsMessage::new("%n file(s)");
        m.numerus = true;
        m.translation = "ignored".into();
        assert!(!m.has_translation());

        m.numerus_forms = vec!["".into(), "%n 个文件".into()];
        assert!(m.has_translation());
    }

    #[test]
    fn vanished_and_obsolete_are_inactive() {
        let mut m = TsMessage::new("Cancel");
        assert!(m.is_active());
        m.status = TranslationStatus::Vanished;
        assert!(!m.is_active());
        m.status = TranslationStatus::Obsolete;
        assert!(!m.is_active());
    }
}
