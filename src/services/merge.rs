use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::catalog::TsDocument;
use crate::model::entry::{Location, TranslationStatus, TsMessage};

/// A string as currently found in the application's sources.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ExtractedMessage {
    pub context: String,
    pub source: String,

    #[serde(default)]
    pub comment: Option<String>,

    #[serde(default)]
    pub extra_comment: Option<String>,

    #[serde(default)]
    pub numerus: bool,

    #[serde(default)]
    pub locations: Vec<Location>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default)]
pub struct MergeOptions {
    /// Delete vanished/obsolete entries instead of keeping them.
    #[serde(default)]
    pub drop_obsolete: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub added: usize,
    pub updated: usize,
    pub restored: usize,
    pub vanished: usize,
    pub removed: usize,
}

/// Brings `doc` in line with `extracted`, the application's current strings.
pub fn merge(doc: &mut TsDocument, extracted: &[ExtractedMessage], opts: MergeOptions) -> MergeReport {
    let mut report = MergeReport::default();

    // which existing messages were seen, by (context index, message index)
    let mut seen: Vec<Vec<bool>> = doc
        .contexts
        .iter()
        .map(|c| vec![false; c.messages.len()])
        .collect();

    for ex in extracted {
        let ctx_idx = match doc.contexts.iter().position(|c| c.name == ex.context) {
            Some(i) => i,
            None => {
                doc.context_or_insert(&ex.context);
                seen.push(Vec::new());
                doc.contexts.len() - 1
            }
        };
        let ctx = &mut doc.contexts[ctx_idx];

        let existing = ctx
            .messages
            .iter()
            .position(|m| m.key() == (ex.source.as_str(), ex.comment.as_deref()));

        match existing {
            Some(i) => {
                if seen[ctx_idx].get(i).copied().unwrap_or(false) {
                    // same string extracted twice: collect its extra locations
                    let m = &mut ctx.messages[i];
                    for loc in &ex.locations {
                        if !m.locations.contains(loc) {
                            m.locations.push(loc.clone());
                        }
                    }
                    continue;
                }

                let m = &mut ctx.messages[i];
                match m.status {
                    TranslationStatus::Vanished => {
                        // finished requires text; an emptied record goes back to the translator
                        m.status = if m.has_translation() {
                            TranslationStatus::Finished
                        } else {
                            TranslationStatus::Unfinished
                        };
                        report.restored += 1;
                    }
                    TranslationStatus::Obsolete => {
                        m.status = TranslationStatus::Unfinished;
                        report.restored += 1;
                    }
                    _ => {
                        if m.locations != ex.locations || m.extra_comment != ex.extra_comment {
                            report.updated += 1;
                        }
                    }
                }
                m.locations = ex.locations.clone();
                m.extra_comment = ex.extra_comment.clone();
                if let Some(flag) = seen[ctx_idx].get_mut(i) {
                    *flag = true;
                }
            }
            None => {
                ctx.messages.push(TsMessage {
                    source: ex.source.clone(),
                    comment: ex.comment.clone(),
                    extra_comment: ex.extra_comment.clone(),
                    numerus: ex.numerus,
                    locations: ex.locations.clone(),
                    status: TranslationStatus::Unfinished,
                    ..Default::default()
                });
                seen[ctx_idx].push(true);
                report.added += 1;
            }
        }
    }

    for (ctx, flags) in doc.contexts.iter_mut().zip(seen.iter()) {
        let mut idx = 0usize;
        ctx.messages.retain_mut(|m| {
            let was_seen = flags.get(idx).copied().unwrap_or(false);
            idx += 1;
            if was_seen {
                return true;
            }

            if m.is_active() {
                m.locations.clear();
                if m.status == TranslationStatus::Finished {
                    m.status = TranslationStatus::Vanished;
                } else if m.has_translation() {
                    m.status = TranslationStatus::Obsolete;
                } else {
                    report.removed += 1;
                    return false;
                }
                report.vanished += 1;
            }

            if opts.drop_obsolete {
                report.removed += 1;
                return false;
            }
            true
        });
    }

    doc.contexts.retain(|c| !c.messages.is_empty());

    debug!(?report, "merged extracted messages");
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::ts::{self, fixtures};
    use crate::services::qa;

    fn loc(file: &str, line: u32) -> Location {
        Location {
            filename: file.into(),
            line: Some(line),
        }
    }

    fn ex(context: &str, source: &str, locations: Vec<Location>) -> ExtractedMessage {
        ExtractedMessage {
            context: context.into(),
            source: source.into(),
            comment: None,
            extra_comment: None,
            numerus: false,
            locations,
        }
    }

    /// The sample's strings as extracted from the next release.
    fn next_release() -> Vec<ExtractedMessage> {
        vec![
            ex("MainWindow", "MainWindow", vec![loc("../main_window.py", 31)]),
            ex("MainWindow", "Check me", vec![loc("../ui/main_window.ui", 35)]),
            ex("MainWindow", "Warning", vec![loc("../main_window.py", 53)]),
            ex("MainWindow", "Failed to check for updates", vec![loc("../main_window.py", 54)]),
            ex("MainWindow", "Hello World!", vec![loc("../main_window.py", 70)]),
            ex("UpdateDialog", "Downloading new version...", vec![loc("../builtin/update_dialog.py", 12)]),
            ex("UpdateWidget", "Updater", vec![loc("../ui/builtin/update_widget.ui", 19)]),
            ex("UpdateWidget", "Found new version: {}", vec![loc("../ui/builtin/update_widget.ui", 25)]),
            ex("UpdateWidget", "Update", vec![loc("../ui/builtin/update_widget.ui", 57)]),
        ]
    }

    #[test]
    fn lifecycle_follows_application_changes() {
        let mut doc = ts::parse(fixtures::ZH_CN).unwrap();
        let report = merge(&mut doc, &next_release(), MergeOptions::default());

        assert_eq!(
            report,
            MergeReport {
                added: 1,
                updated: 2,
                restored: 1,
                vanished: 1,
                removed: 0,
            }
        );

        let dialog = doc.context("UpdateDialog").unwrap();
        let restored = dialog.find("Downloading new version...", None).unwrap();
        assert_eq!(restored.status, TranslationStatus::Finished);
        assert_eq!(restored.translation, "正在下载新版本...");
        assert_eq!(restored.locations.len(), 1);

        let widget = doc.context("UpdateWidget").unwrap();
        let cancel = widget.find("Cancel", None).unwrap();
        assert_eq!(cancel.status, TranslationStatus::Vanished);
        assert!(cancel.locations.is_empty());
        assert_eq!(cancel.translation, "取消");

        let update = widget.find("Update", None).unwrap();
        assert_eq!(update.status, TranslationStatus::Unfinished);
        assert!(update.translation.is_empty());

        let main = doc.context("MainWindow").unwrap().find("MainWindow", None).unwrap();
        assert_eq!(main.locations, vec![loc("../main_window.py", 31)]);

        assert!(qa::run(&doc).is_empty());
    }

    #[test]
    fn unfinished_entries_become_obsolete_or_disappear() {
        let mut doc = TsDocument::new("zh_CN");
        let ctx = doc.context_or_insert("UpdateWidget");
        let mut drafted = TsMessage::new("Updater");
        drafted.translation = "更新器".into();
        ctx.messages.push(drafted);
        ctx.messages.push(TsMessage::new("Retry"));

        let report = merge(&mut doc, &[], MergeOptions::default());
        assert_eq!(report.vanished, 1);
        assert_eq!(report.removed, 1);

        let ctx = doc.context("UpdateWidget").unwrap();
        assert_eq!(ctx.messages.len(), 1);
        assert_eq!(ctx.messages[0].status, TranslationStatus::Obsolete);

        let report = merge(
            &mut doc,
            &[ex("UpdateWidget", "Updater", vec![])],
            MergeOptions::default(),
        );
        assert_eq!(report.restored, 1);
        assert_eq!(
            doc.context("UpdateWidget").unwrap().messages[0].status,
            TranslationStatus::Unfinished
        );
    }

    #[test]
    fn drop_obsolete_prunes_removed_strings_and_empty_contexts() {
        let mut doc = ts::parse(fixtures::ZH_CN).unwrap();
        let keep = vec![ex("MainWindow", "Warning", vec![loc("../main_window.py", 53)])];

        let report = merge(&mut doc, &keep, MergeOptions { drop_obsolete: true });

        assert_eq!(doc.contexts.len(), 1);
        assert_eq!(doc.message_count(), 1);
        assert_eq!(report.removed, 9);
    }

    #[test]
    fn duplicate_extraction_accumulates_locations() {
        let mut doc = TsDocument::new("zh_CN");
        let extracted = vec![
            ex("UpdateWidget", "Found new version: {}", vec![loc("../ui/builtin/update_widget.ui", 25)]),
            ex("UpdateWidget", "Found new version: {}", vec![loc("../builtin/update_widget.py", 33)]),
        ];

        let report = merge(&mut doc, &extracted, MergeOptions::default());
        assert_eq!(report.added, 1);

        let m = &doc.context("UpdateWidget").unwrap().messages[0];
        assert_eq!(m.locations.len(), 2);
    }

    #[test]
    fn empty_vanished_entry_is_restored_as_unfinished() {
        let mut doc = TsDocument::new("zh_CN");
        let mut retry = TsMessage::new("Retry");
        retry.status = TranslationStatus::Vanished;
        doc.context_or_insert("UpdateWidget").messages.push(retry);

        let report = merge(
            &mut doc,
            &[ex("UpdateWidget", "Retry", vec![loc("../builtin/update_widget.py", 61)])],
            MergeOptions::default(),
        );
        assert_eq!(report.restored, 1);

        let m = doc.context("UpdateWidget").unwrap().find("Retry", None).unwrap();
        assert_eq!(m.status, TranslationStatus::Unfinished);
        assert!(qa::run(&doc).is_empty());
    }
}
