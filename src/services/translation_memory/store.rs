use super::model::TmEntry;
use super::{hash, matcher, normalize};
use crate::error::Result;
use crate::model::catalog::TsDocument;
use crate::model::entry::TranslationStatus;
use crate::services::atomic::write_atomic;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

const TM_FILE: &str = "translation_memory.json";

pub fn default_path() -> PathBuf {
    match std::env::var("TS_CORE_TM_PATH") {
        Ok(p) if !p.trim().is_empty() => PathBuf::from(p),
        _ => PathBuf::from(TM_FILE),
    }
}

#[derive(Debug)]
pub struct TmStore {
    path: PathBuf,
    entries: Vec<TmEntry>,
}

impl TmStore {
    /// Loads the store at `path`. A missing or unreadable file yields an empty
    /// store; legacy files without normalized/hash fields are migrated in place.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = load(&path);
        TmStore { path, entries }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[TmEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn lookup(&self, source_lang: &str, target_lang: &str, original: &str) -> Option<&TmEntry> {
        matcher::exact_match(&self.entries, source_lang, target_lang, original)
    }

    pub fn insert(&mut self, source_lang: &str, target_lang: &str, original: &str, translation: &str) {
        let normalized = normalize::normalize(original);
        let hash = hash::hash_norm(&normalized);
        self.entries.push(TmEntry {
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
            original: original.to_string(),
            translation: translation.to_string(),
            normalized,
            hash,
        });
    }

    /// Adds every finished, active, non-plural message of `doc`. Returns how
    /// many entries were new or improved after dedup.
    pub fn harvest(&mut self, doc: &TsDocument, source_lang: &str, target_lang: &str) -> usize {
        let before: Vec<TmEntry> = self.entries.clone();

        for (_, m) in doc.entries() {
            if m.status != TranslationStatus::Finished || m.numerus || !m.has_translation() {
                continue;
            }
            self.insert(source_lang, target_lang, &m.source, &m.translation);
        }

        let (mut deduped, _) = dedup(std::mem::take(&mut self.entries));
        sort_entries(&mut deduped);
        self.entries = deduped;

        let added = self.entries.iter().filter(|e| !before.contains(e)).count();
        debug!(added, total = self.entries.len(), "harvested translation memory");
        added
    }

    pub fn save(&self) -> Result<()> {
        save(&self.path, &self.entries)
    }
}

fn load(path: &Path) -> Vec<TmEntry> {
    if !path.exists() {
        return Vec::new();
    }

    let data = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read translation memory");
            return Vec::new();
        }
    };

    let mut entries: Vec<TmEntry> = match serde_json::from_str(&data) {
        Ok(v) => v,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to parse translation memory");
            return Vec::new();
        }
    };

    // older files were written before normalized/hash existed
    let mut migrated = false;

    for e in entries.iter_mut() {
        migrated |= ensure_norm_hash(e);
    }

    let (deduped, removed) = dedup(entries);
    if removed > 0 {
        migrated = true;
    }

    let mut final_entries = deduped;
    sort_entries(&mut final_entries);

    // write the migrated form back; a failure is retried on the next open
    if migrated {
        if let Err(e) = save(path, &final_entries) {
            warn!(path = %path.display(), error = %e, "failed to persist migration");
        }
    }

    final_entries
}

pub fn save(path: &Path, entries: &[TmEntry]) -> Result<()> {
    let mut v: Vec<TmEntry> = entries.to_vec();

    for e in v.iter_mut() {
        ensure_norm_hash(e);
    }

    let (mut v, _removed) = dedup(v);
    sort_entries(&mut v);

    let json = serde_json::to_string_pretty(&v)?;

    write_atomic(path, json.as_bytes())?;

    Ok(())
}

fn ensure_norm_hash(e: &mut TmEntry) -> bool {
    let mut changed = false;

    if e.normalized.is_empty() {
        e.normalized = normalize::normalize(&e.original);
        changed = true;
    }

    if e.hash.is_empty() {
        e.hash = hash::hash_norm(&e.normalized);
        changed = true;
    }

    changed
}

fn dedup(entries: Vec<TmEntry>) -> (Vec<TmEntry>, usize) {
    let mut map: HashMap<(String, String, String), TmEntry> = HashMap::new();
    let mut removed = 0usize;

    for mut e in entries {
        ensure_norm_hash(&mut e);

        // one entry per language pair and normalized text
        let key = (e.source_lang.clone(), e.target_lang.clone(), e.hash.clone());

        match map.get_mut(&key) {
            None => {
                map.insert(key, e);
            }
            Some(existing) => {
                if pick_better(existing, &e) {
                    *existing = e;
                }
                removed += 1;
            }
        }
    }

    (map.into_values().collect(), removed)
}

fn pick_better(current: &TmEntry, candidate: &TmEntry) -> bool {
    let cur_empty = current.translation.trim().is_empty();
    let cand_empty = candidate.translation.trim().is_empty();

    // any text beats none; otherwise the longer translation wins
    if cur_empty && !cand_empty {
        return true;
    }
    if !cur_empty && cand_empty {
        return false;
    }

    candidate.translation.len() > current.translation.len()
}

// deterministic on-disk order
fn sort_entries(entries: &mut [TmEntry]) {
    entries.sort_by(|a, b| {
        (
            a.source_lang.as_str(),
            a.target_lang.as_str(),
            a.hash.as_str(),
            a.normalized.as_str(),
            a.original.as_str(),
            a.translation.as_str(),
        )
            .cmp(&(
                b.source_lang.as_str(),
                b.target_lang.as_str(),
                b.hash.as_str(),
                b.normalized.as_str(),
                b.original.as_str(),
                b.translation.as_str(),
            ))
    });
}
