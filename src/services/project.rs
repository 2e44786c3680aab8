use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{CoreError, Result};
use crate::model::project::CatalogProject;

const PROJECT_FILE: &str = "project.json";

pub fn projects_base_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TS_CORE_PROJECTS_DIR") {
        if !dir.trim().is_empty() {
            return PathBuf::from(dir);
        }
    }
    if let Ok(local) = std::env::var("LOCALAPPDATA") {
        return PathBuf::from(local).join("TsCore").join("Projects");
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join("Projects")
}

fn ensure_dir(dir: &Path) -> Result<()> {
    if !dir.exists() {
        fs::create_dir_all(dir)?;
    }
    Ok(())
}

/// Directory-safe form of a display name. Path-like names keep only their
/// last component; anything outside `[A-Za-z0-9 _.-]` becomes `_`.
pub fn safe_project_dir_name(name: &str) -> String {
    let mut n = name.trim().to_string();

    if n.contains('\\') || n.contains('/') {
        let last = n
            .rsplit(['\\', '/'])
            .find(|s| !s.trim().is_empty())
            .map(str::to_string);
        if let Some(bn) = last {
            n = bn;
        }
    }

    let mut out = String::with_capacity(n.len());
    for ch in n.chars() {
        let ok = ch.is_ascii_alphanumeric() || ch == ' ' || ch == '_' || ch == '-' || ch == '.';
        out.push(if ok { ch } else { '_' });
    }

    let out = out.trim().trim_matches('.').to_string();
    if out.is_empty() {
        "Project".to_string()
    } else {
        out
    }
}

pub fn list_projects(base: &Path) -> Result<Vec<CatalogProject>> {
    ensure_dir(base)?;
    let mut projects = Vec::new();

    for entry in fs::read_dir(base)?.flatten() {
        let path = entry.path().join(PROJECT_FILE);
        if !path.exists() {
            continue;
        }
        let parsed = fs::read_to_string(&path)
            .map_err(CoreError::from)
            .and_then(|data| serde_json::from_str::<CatalogProject>(&data).map_err(CoreError::from));
        match parsed {
            Ok(project) => projects.push(project),
            Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable project"),
        }
    }

    projects.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(projects)
}

pub fn create_project(base: &Path, mut project: CatalogProject) -> Result<CatalogProject> {
    ensure_dir(base)?;

    let project_dir = base.join(safe_project_dir_name(&project.name));

    if project_dir.exists() {
        return Err(CoreError::Project("project already exists".into()));
    }

    fs::create_dir_all(&project_dir)?;

    project.project_path = project_dir.to_string_lossy().to_string();
    if project.default_language.is_empty() {
        if let Some(first) = project.languages.first() {
            project.default_language = first.clone();
        }
    }

    write_project(&project_dir, &project)?;
    debug!(path = %project_dir.display(), "created project");

    Ok(project)
}

pub fn open_project(project_path: &Path) -> Result<CatalogProject> {
    let path = project_path.join(PROJECT_FILE);

    if !path.exists() {
        return Err(CoreError::NotFound(format!("{PROJECT_FILE} in {}", project_path.display())));
    }

    let data = fs::read_to_string(&path)?;
    let mut project: CatalogProject = serde_json::from_str(&data)
        .map_err(|e| CoreError::Project(format!("invalid {PROJECT_FILE}: {e}")))?;

    if project.project_path.trim().is_empty() {
        project.project_path = project_path.to_string_lossy().to_string();
    }

    Ok(project)
}

pub fn save_project(base: &Path, mut project: CatalogProject) -> Result<CatalogProject> {
    let project_dir: PathBuf = {
        let pp = project.project_path.trim().to_string();
        if pp.is_empty() {
            base.join(safe_project_dir_name(&project.name))
        } else {
            PathBuf::from(pp)
        }
    };

    fs::create_dir_all(&project_dir)?;

    project.project_path = project_dir.to_string_lossy().to_string();

    if project.i18n_dir.trim().is_empty() {
        project.i18n_dir = CatalogProject::default().i18n_dir;
    }

    write_project(&project_dir, &project)?;

    Ok(project)
}

fn write_project(dir: &Path, project: &CatalogProject) -> Result<()> {
    let json = serde_json::to_string_pretty(project)?;
    fs::write(dir.join(PROJECT_FILE), json)?;
    Ok(())
}
