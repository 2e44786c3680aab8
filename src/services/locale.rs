use std::path::PathBuf;

use tracing::debug;

use crate::error::{CoreError, Result};
use crate::model::project::CatalogProject;

/// BCP-47 tag (`zh-Hans-CN`, `en-us`) to POSIX-style locale (`zh_CN`, `en_US`).
/// Scripts and variants are dropped; the first two-letter or three-digit
/// subtag after the language is taken as region.
pub fn bcp47_to_locale(tag: &str) -> String {
    let tag = tag.trim();
    if tag.is_empty() {
        return String::new();
    }

    // "en_US.UTF-8" style input: drop the codeset
    let tag = tag.split('.').next().unwrap_or(tag);

    let normalized = tag.replace('-', "_");
    let mut parts = normalized.split('_');
    let language = parts.next().unwrap_or("").to_lowercase();

    let region = parts.find_map(|p| {
        if p.len() == 2 && p.chars().all(|c| c.is_ascii_alphabetic()) {
            Some(p.to_uppercase())
        } else if p.len() == 3 && p.chars().all(|c| c.is_ascii_digit()) {
            Some(p.to_string())
        } else {
            None
        }
    });

    match region {
        Some(r) => format!("{language}_{r}"),
        None => language,
    }
}

/// Most specific first: `zh_CN` -> `[zh_CN, zh]`.
pub fn fallback_chain(locale: &str) -> Vec<String> {
    let mut chain = Vec::new();
    if locale.is_empty() {
        return chain;
    }
    chain.push(locale.to_string());
    if let Some((lang, _)) = locale.split_once('_') {
        if !lang.is_empty() {
            chain.push(lang.to_string());
        }
    }
    chain
}

fn language_of(locale: &str) -> &str {
    locale.split('_').next().unwrap_or(locale)
}

/// Finds the `.ts` file to use for `tag` in `project`. Returns the path and
/// the locale it belongs to.
pub fn resolve_catalog(project: &CatalogProject, tag: &str) -> Result<(PathBuf, String)> {
    let locale = bcp47_to_locale(tag);

    let allowed = |candidate: &str| {
        project.languages.is_empty() || project.languages.iter().any(|l| l == candidate)
    };

    let mut candidates: Vec<String> = fallback_chain(&locale)
        .into_iter()
        .filter(|c| allowed(c))
        .collect();

    // "zh" requested, project ships "zh_CN"
    if !locale.is_empty() {
        let lang = language_of(&locale);
        for l in &project.languages {
            if language_of(l) == lang && !candidates.contains(l) {
                candidates.push(l.clone());
            }
        }
    }

    if !project.default_language.is_empty() && !candidates.contains(&project.default_language) {
        candidates.push(project.default_language.clone());
    }

    for c in candidates {
        let path = project.ts_path_for(&c);
        if path.is_file() {
            debug!(tag, locale = %c, path = %path.display(), "resolved catalog");
            return Ok((path, c));
        }
    }

    Err(CoreError::NotFound(format!(
        "no catalog for {tag:?} in {}",
        project.i18n_root().display()
    )))
}
