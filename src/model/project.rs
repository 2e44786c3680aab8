use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_i18n_dir() -> String {
    "i18n".to_string()
}

fn default_encoding() -> String {
    "utf-8".to_string()
}

fn default_source_language() -> String {
    "en".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CatalogProject {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub project_path: String,

    #[serde(default = "default_i18n_dir", alias = "ts_dir")]
    pub i18n_dir: String,

    #[serde(default = "default_source_language", alias = "source_lang")]
    pub source_language: String,

    #[serde(default)]
    pub languages: Vec<String>,

    #[serde(default)]
    pub default_language: String,

    #[serde(default = "default_encoding")]
    pub encoding: String,
}

impl Default for CatalogProject {
    fn default() -> Self {
        CatalogProject {
            name: String::new(),
            project_path: String::new(),
            i18n_dir: default_i18n_dir(),
            source_language: default_source_language(),
            languages: Vec::new(),
            default_language: String::new(),
            encoding: default_encoding(),
        }
    }
}

impl CatalogProject {
    pub fn i18n_root(&self) -> PathBuf {
        let dir = Path::new(&self.i18n_dir);
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            Path::new(&self.project_path).join(dir)
        }
    }

    pub fn ts_path_for(&self, locale: &str) -> PathBuf {
        self.i18n_root().join(format!("{locale}.ts"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_i18n_dir_resolves_against_project() {
        let p = CatalogProject {
            project_path: "/work/app".into(),
            ..Default::default()
        };
        assert_eq!(p.ts_path_for("zh_CN"), PathBuf::from("/work/app/i18n/zh_CN.ts"));
    }

    #[test]
    fn legacy_aliases_are_accepted() {
        let p: CatalogProject =
            serde_json::from_str(r#"{"name":"App","ts_dir":"app/i18n","source_lang":"ja"}"#)
                .unwrap();
        assert_eq!(p.i18n_dir, "app/i18n");
        assert_eq!(p.source_language, "ja");
        assert_eq!(p.encoding, "utf-8");
    }
}
