use super::model::TmEntry;
use super::{hash, normalize};

pub fn exact_match<'a>(
    entries: &'a [TmEntry],
    source_lang: &str,
    target_lang: &str,
    original: &str,
) -> Option<&'a TmEntry> {
    let trimmed = original.trim();
    if trimmed.is_empty() {
        return None;
    }

    let norm = normalize::normalize(trimmed);
    let h = hash::hash_norm(&norm);

    entries.iter().find(|e| {
        e.source_lang == source_lang
            && e.target_lang == target_lang
            && e.hash == h
            && e.normalized == norm
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(original: &str, translation: &str, target: &str) -> TmEntry {
        let normalized = normalize::normalize(original);
        TmEntry {
            source_lang: "en".into(),
            target_lang: target.into(),
            original: original.into(),
            translation: translation.into(),
            hash: hash::hash_norm(&normalized),
            normalized,
        }
    }

    #[test]
    fn matches_normalized_text_within_language_pair() {
        let entries = vec![
            entry("Cancel", "Abbrechen", "de_DE"),
            entry("Cancel", "取消", "zh_CN"),
        ];

        let hit = exact_match(&entries, "en", "zh_CN", "  &Cancel ").unwrap();
        assert_eq!(hit.translation, "取消");

        assert!(exact_match(&entries, "en", "ja_JP", "Cancel").is_none());
        assert!(exact_match(&entries, "en", "zh_CN", "   ").is_none());
    }
}
