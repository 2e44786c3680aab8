use std::borrow::Cow;
use std::collections::HashMap;

use crate::model::catalog::TsDocument;
use crate::model::entry::TranslationStatus;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct Key {
    context: String,
    source: String,
    comment: Option<String>,
}

#[derive(Debug, Clone)]
enum Target {
    Single(String),
    Plural(Vec<String>),
}

/// Runtime view of a catalog. Only finished translations are served; anything
/// else falls back to the source text.
#[derive(Debug, Clone, Default)]
pub struct Translator {
    language: String,
    table: HashMap<Key, Target>,
}

impl Translator {
    pub fn from_document(doc: &TsDocument) -> Self {
        let mut table = HashMap::new();

        for (context, m) in doc.entries() {
            // unfinished drafts and removed strings never reach the UI
            if m.status != TranslationStatus::Finished || !m.has_translation() {
                continue;
            }

            let target = if m.numerus {
                Target::Plural(m.numerus_forms.clone())
            } else {
                Target::Single(m.translation.clone())
            };

            // a duplicate key overwrites: the last occurrence in the file wins
            table.insert(
                Key {
                    context: context.to_string(),
                    source: m.source.clone(),
                    comment: m.comment.clone(),
                },
                target,
            );
        }

        Translator {
            language: doc.language.clone(),
            table,
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    fn get(&self, context: &str, source: &str, comment: Option<&str>) -> Option<&Target> {
        self.table.get(&Key {
            context: context.to_string(),
            source: source.to_string(),
            comment: comment.map(str::to_string),
        })
    }

    pub fn contains(&self, context: &str, source: &str, comment: Option<&str>) -> bool {
        self.get(context, source, comment).is_some()
    }

    pub fn translate<'a>(
        &'a self,
        context: &str,
        source: &'a str,
        comment: Option<&str>,
    ) -> Cow<'a, str> {
        match self.get(context, source, comment) {
            Some(Target::Single(t)) => Cow::Borrowed(t.as_str()),
            // plural entry looked up without a count: first usable form
            Some(Target::Plural(forms)) => match forms.iter().find(|f| !f.trim().is_empty()) {
                Some(f) => Cow::Borrowed(f.as_str()),
                None => Cow::Borrowed(source),
            },
            None => Cow::Borrowed(source),
        }
    }

    /// Plural lookup with `%n` replaced by `n`. Form 0 is used for n == 1,
    /// form 1 otherwise, clamped to the forms the catalog has.
    pub fn translate_plural(
        &self,
        context: &str,
        source: &str,
        comment: Option<&str>,
        n: i64,
    ) -> String {
        let template = match self.get(context, source, comment) {
            Some(Target::Plural(forms)) if !forms.is_empty() => {
                let idx: usize = if n == 1 { 0 } else { 1 };
                let form = &forms[idx.min(forms.len() - 1)];
                // a blank form is treated as missing, not as an intentional empty string
                if form.trim().is_empty() {
                    source
                } else {
                    form.as_str()
                }
            }
            // catalog has no plural for this source; still substitute %n
            Some(Target::Single(t)) => t.as_str(),
            _ => source,
        };

        template.replace("%n", &n.to_string())
    }
}

/// Fills `{}` tokens left to right. Surplus tokens stay, surplus args are dropped.
pub fn format(template: &str, args: &[String]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut rest = template;

    while let Some(pos) = rest.find("{}") {
        out.push_str(&rest[..pos]);
        match args.next() {
            Some(a) => out.push_str(a),
            None => out.push_str("{}"),
        }
        rest = &rest[pos + 2..];
    }

    out.push_str(rest);
    out
}
