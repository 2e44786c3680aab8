use crate::model::catalog::TsDocument;
use crate::model::entry::{TranslationStatus, TsMessage};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct QaIssue {
    pub context: String,
    pub source: String,
    pub code: String,
    pub severity: Severity,
    pub message: String,
}

fn placeholder_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\{[A-Za-z0-9_]*\}|%L?[0-9]+|%n|%[sd]").expect("placeholder regex")
    })
}

/// Placeholder tokens in `text`, in order of appearance.
pub fn placeholders(text: &str) -> Vec<&str> {
    placeholder_re().find_iter(text).map(|m| m.as_str()).collect()
}

/// Tokens whose meaning comes from their position rather than a number or name.
fn is_positional(token: &str) -> bool {
    matches!(token, "{}" | "%s" | "%d")
}

pub fn run(doc: &TsDocument) -> Vec<QaIssue> {
    let mut issues: Vec<QaIssue> = Vec::new();

    for ctx in &doc.contexts {
        if ctx.name.trim().is_empty() {
            issues.push(QaIssue {
                context: ctx.name.clone(),
                source: String::new(),
                code: "EMPTY_CONTEXT_NAME".to_string(),
                severity: Severity::Error,
                message: "Context has an empty name".to_string(),
            });
        }

        let mut seen: HashSet<(&str, Option<&str>)> = HashSet::new();

        for m in &ctx.messages {
            let mut push = |code: &str, severity: Severity, message: String| {
                issues.push(QaIssue {
                    context: ctx.name.clone(),
                    source: m.source.clone(),
                    code: code.to_string(),
                    severity,
                    message,
                });
            };

            if !seen.insert(m.key()) {
                push(
                    "DUPLICATE_SOURCE",
                    Severity::Error,
                    "Source text appears more than once in this context".to_string(),
                );
            }

            if m.source.trim().is_empty() {
                push(
                    "EMPTY_SOURCE",
                    Severity::Error,
                    "Message has an empty source text".to_string(),
                );
            }

            if !m.is_active() && !m.locations.is_empty() {
                push(
                    "VANISHED_WITH_LOCATION",
                    Severity::Error,
                    format!(
                        "Removed message still has {} location(s)",
                        m.locations.len()
                    ),
                );
            }

            if m.status == TranslationStatus::Finished && !m.has_translation() {
                push(
                    "STATUS_FINISHED_BUT_EMPTY",
                    Severity::Error,
                    "Status is finished but the translation is empty".to_string(),
                );
            }

            // every status, vanished and obsolete included
            for (code, message) in placeholder_problems(m) {
                push(code, Severity::Error, message);
            }

            let source_trim = m.source.trim();
            let translation_trim = m.translation.trim();
            if !m.numerus && !translation_trim.is_empty() && translation_trim == source_trim {
                push(
                    "SAME_AS_SOURCE",
                    Severity::Warning,
                    "Translation is identical to the source text".to_string(),
                );
            }

            if m.numerus
                && m.status == TranslationStatus::Finished
                && m.numerus_forms.iter().any(|f| f.trim().is_empty())
            {
                push(
                    "NUMERUS_FORM_EMPTY",
                    Severity::Warning,
                    "At least one plural form is empty".to_string(),
                );
            }
        }
    }

    issues
}

fn placeholder_problems(m: &TsMessage) -> Vec<(&'static str, String)> {
    let mut out = Vec::new();

    if m.numerus {
        // plural forms may legitimately drop %n (e.g. "one file")
        let source: Vec<&str> = placeholders(&m.source)
            .into_iter()
            .filter(|t| *t != "%n")
            .collect();
        for (i, form) in m.numerus_forms.iter().enumerate() {
            if form.trim().is_empty() {
                continue;
            }
            let target: Vec<&str> = placeholders(form)
                .into_iter()
                .filter(|t| *t != "%n")
                .collect();
            if let Some(p) = compare(&source, &target) {
                out.push((p.0, format!("plural form {}: {}", i, p.1)));
            }
        }
        return out;
    }

    if m.translation.trim().is_empty() {
        return out;
    }

    let source = placeholders(&m.source);
    let target = placeholders(&m.translation);
    if let Some(p) = compare(&source, &target) {
        out.push(p);
    }
    out
}

fn compare(source: &[&str], target: &[&str]) -> Option<(&'static str, String)> {
    if source.len() != target.len() {
        return Some((
            "PLACEHOLDER_COUNT_MISMATCH",
            format!(
                "Source has {} placeholder(s), translation has {}",
                source.len(),
                target.len()
            ),
        ));
    }

    let positional = |v: &[&str]| -> Vec<String> {
        v.iter()
            .filter(|t| is_positional(t))
            .map(|t| t.to_string())
            .collect()
    };
    let numbered = |v: &[&str]| -> Vec<String> {
        let mut out: Vec<String> = v
            .iter()
            .filter(|t| !is_positional(t))
            .map(|t| t.to_string())
            .collect();
        out.sort();
        out
    };

    if positional(source) != positional(target) || numbered(source) != numbered(target) {
        return Some((
            "PLACEHOLDER_ORDER_MISMATCH",
            format!(
                "Placeholders {:?} do not line up with {:?}",
                source, target
            ),
        ));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entry::Location;
    use crate::parsers::ts::{self, fixtures};

    fn doc_with(messages: Vec<TsMessage>) -> TsDocument {
        let mut doc = TsDocument::new("zh_CN");
        doc.context_or_insert("UpdateWidget").messages = messages;
        doc
    }

    fn finished(source: &str, translation: &str) -> TsMessage {
        let mut m = TsMessage::new(source);
        m.translation = translation.into();
        m.status = TranslationStatus::Finished;
        m
    }

    fn codes(issues: &[QaIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.code.as_str()).collect()
    }

    #[test]
    fn sample_catalog_is_clean() {
        let doc = ts::parse(fixtures::ZH_CN).unwrap();
        assert!(run(&doc).is_empty());
    }

    #[test]
    fn placeholder_tokens_are_found_in_order() {
        assert_eq!(placeholders("发现新版本：{}"), vec!["{}"]);
        assert_eq!(
            placeholders("%1 of %L2 ({name}) %n"),
            vec!["%1", "%L2", "{name}", "%n"]
        );
        assert!(placeholders("100% sure").is_empty());
    }

    #[test]
    fn dropped_placeholder_is_a_count_mismatch() {
        let issues = run(&doc_with(vec![finished(
            "Found new version: {}",
            "发现新版本",
        )]));
        assert_eq!(codes(&issues), vec!["PLACEHOLDER_COUNT_MISMATCH"]);
        assert_eq!(issues[0].severity, Severity::Error);
    }

    #[test]
    fn numbered_tokens_may_move_but_positional_may_not() {
        let reordered = finished("Copy %1 to %2", "将 %2 复制自 %1");
        let swapped = finished("{} of {name}", "{name} 的 {}");
        let issues = run(&doc_with(vec![reordered, swapped]));

        assert!(codes(&issues).is_empty());

        let kinds = finished("%s has %d items", "%d 项属于 %s");
        let issues = run(&doc_with(vec![kinds]));
        assert_eq!(codes(&issues), vec!["PLACEHOLDER_ORDER_MISMATCH"]);
    }

    #[test]
    fn status_and_location_invariants() {
        let empty_finished = finished("Cancel", "  ");

        let mut vanished = finished("Extracting new version...", "正在解压文件...");
        vanished.status = TranslationStatus::Vanished;
        vanished.locations.push(Location {
            filename: "../builtin/update_widget.py".into(),
            line: Some(50),
        });

        let issues = run(&doc_with(vec![empty_finished, vanished]));
        assert_eq!(
            codes(&issues),
            vec!["STATUS_FINISHED_BUT_EMPTY", "VANISHED_WITH_LOCATION"]
        );
    }

    #[test]
    fn duplicates_respect_disambiguation() {
        let a = finished("Update", "更新");
        let b = finished("Update", "升级");
        let mut c = finished("Update", "更新中");
        c.comment = Some("status".into());

        let issues = run(&doc_with(vec![a, b, c]));
        assert_eq!(codes(&issues), vec!["DUPLICATE_SOURCE"]);
        assert_eq!(issues[0].source, "Update");
    }

    #[test]
    fn removed_entries_still_get_placeholder_checks() {
        let mut vanished = finished("Found new version: {}", "发现新版本");
        vanished.status = TranslationStatus::Vanished;

        let mut obsolete = TsMessage::new("Copy %1 to %2");
        obsolete.translation = "复制 %1".into();
        obsolete.status = TranslationStatus::Obsolete;

        let issues = run(&doc_with(vec![vanished, obsolete]));
        assert_eq!(
            codes(&issues),
            vec!["PLACEHOLDER_COUNT_MISMATCH", "PLACEHOLDER_COUNT_MISMATCH"]
        );
    }

    #[test]
    fn warnings_for_untranslated_looking_text() {
        let same = finished("OK", "OK");

        let mut plural = TsMessage::new("%n file(s)");
        plural.numerus = true;
        plural.status = TranslationStatus::Finished;
        plural.numerus_forms = vec!["%n 个文件".into(), "".into()];

        let mut single_form = TsMessage::new("%n file(s) in %1");
        single_form.numerus = true;
        single_form.status = TranslationStatus::Finished;
        single_form.numerus_forms = vec!["一个文件在 %1".into(), "%n 个文件在 %1".into()];

        let issues = run(&doc_with(vec![same, plural, single_form]));
        assert_eq!(codes(&issues), vec!["SAME_AS_SOURCE", "NUMERUS_FORM_EMPTY"]);
        assert!(issues.iter().all(|i| i.severity == Severity::Warning));
    }
}
