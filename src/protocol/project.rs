use serde_json::{json, Value};
use std::path::Path;

use super::command::Command;
use crate::model::project::CatalogProject;
use crate::services::project as service;

pub fn handle(cmd: Command, payload: &Value) -> Result<Value, String> {
    let base = service::projects_base_dir();

    match cmd {
        Command::ProjectList => {
            let projects = service::list_projects(&base).map_err(|e| e.to_string())?;
            Ok(json!({ "projects": projects }))
        }

        Command::ProjectCreate => {
            let project_val = payload.get("project").cloned().unwrap_or_else(|| payload.clone());
            let project: CatalogProject = serde_json::from_value(project_val)
                .map_err(|e| format!("invalid payload.project: {e}"))?;

            if project.name.trim().is_empty() {
                return Err("payload.name is required".into());
            }

            let created = service::create_project(&base, project).map_err(|e| e.to_string())?;
            Ok(json!({ "project_path": created.project_path }))
        }

        Command::ProjectOpen => {
            let path = payload
                .get("project_path")
                .and_then(|v| v.as_str())
                .unwrap_or("");
            if path.is_empty() {
                return Err("payload.project_path is required".into());
            }

            let project = service::open_project(Path::new(path)).map_err(|e| e.to_string())?;
            Ok(json!({ "project": project }))
        }

        Command::ProjectSave => {
            let project_val = payload.get("project").cloned().unwrap_or(Value::Null);
            if project_val.is_null() {
                return Err("payload.project is required".into());
            }

            let project: CatalogProject = serde_json::from_value(project_val)
                .map_err(|e| format!("invalid payload.project: {e}"))?;

            let saved = service::save_project(&base, project).map_err(|e| e.to_string())?;
            Ok(json!({ "project": saved }))
        }

        _ => Err("unknown command".into()),
    }
}
