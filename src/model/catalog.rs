use serde::{Deserialize, Serialize};

use super::entry::TsMessage;

fn default_version() -> String {
    "2.1".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TsDocument {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub language: String,

    #[serde(default, alias = "sourcelanguage")]
    pub source_language: Option<String>,

    #[serde(default)]
    pub contexts: Vec<TsContext>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct TsContext {
    pub name: String,

    #[serde(default)]
    pub comment: Option<String>,

    #[serde(default)]
    pub messages: Vec<TsMessage>,
}

impl Default for TsDocument {
    fn default() -> Self {
        TsDocument {
            version: default_version(),
            language: String::new(),
            source_language: None,
            contexts: Vec::new(),
        }
    }
}

impl TsDocument {
    pub fn new(language: impl Into<String>) -> Self {
        TsDocument {
            language: language.into(),
            ..Default::default()
        }
    }

    pub fn context(&self, name: &str) -> Option<&TsContext> {
        self.contexts.iter().find(|c| c.name == name)
    }

    pub fn context_or_insert(&mut self, name: &str) -> &mut TsContext {
        let idx = match self.contexts.iter().position(|c| c.name == name) {
            Some(i) => i,
            None => {
                self.contexts.push(TsContext {
                    name: name.to_string(),
                    ..Default::default()
                });
                self.contexts.len() - 1
            }
        };
        &mut self.contexts[idx]
    }

    /// All messages in document order, paired with their context name.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &TsMessage)> {
        self.contexts
            .iter()
            .flat_map(|c| c.messages.iter().map(move |m| (c.name.as_str(), m)))
    }

    pub fn message_count(&self) -> usize {
        self.contexts.iter().map(|c| c.messages.len()).sum()
    }
}

impl TsContext {
    pub fn find(&self, source: &str, comment: Option<&str>) -> Option<&TsMessage> {
        self.messages.iter().find(|m| m.key() == (source, comment))
    }
}
