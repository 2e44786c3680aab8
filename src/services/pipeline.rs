use crate::error::Result;
use crate::model::catalog::TsDocument;
use crate::model::entry::TranslationStatus;
use crate::services::qa::placeholders;
use crate::services::translation_memory::TmStore;

use tracing::info;

pub struct PipelineConfig<'a> {
    pub source_lang: &'a str,
    pub target_lang: &'a str,
}

#[derive(Debug, serde::Serialize, PartialEq, Eq)]
pub struct PipelineReport {
    pub used_tm: usize,
    pub skipped_placeholder: usize,
    pub harvested: usize,
}

/// Fills empty active entries from the translation memory, then feeds the
/// document's finished entries back into it.
pub fn run(doc: &mut TsDocument, store: &mut TmStore, cfg: PipelineConfig) -> Result<PipelineReport> {
    let mut used_tm = 0usize;
    let mut skipped_placeholder = 0usize;

    for ctx in doc.contexts.iter_mut() {
        for m in ctx.messages.iter_mut() {
            if !m.is_active() || m.numerus || m.has_translation() {
                continue;
            }

            let Some(tm) = store.lookup(cfg.source_lang, cfg.target_lang, &m.source) else {
                continue;
            };

            // normalization ignores case and decoration, never placeholder count
            if placeholders(&tm.translation).len() != placeholders(&m.source).len() {
                skipped_placeholder += 1;
                continue;
            }

            m.translation = tm.translation.clone();
            // a memory hit still needs a reviewer
            m.status = TranslationStatus::Unfinished;
            used_tm += 1;
        }
    }

    let harvested = store.harvest(doc, cfg.source_lang, cfg.target_lang);
    store.save()?;

    info!(
        language = %doc.language,
        used_tm,
        skipped_placeholder,
        harvested,
        "translation memory pass finished"
    );

    Ok(PipelineReport {
        used_tm,
        skipped_placeholder,
        harvested,
    })
}
