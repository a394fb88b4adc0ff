//! 项目与微服务的最小目录骨架

use crate::compose::{self, ComposeUpdate};
use crate::constants::{layout, ports};
use crate::naming;
use crate::workspace::{Microservice, Project};
use crate::{MicrodockError, Result};
use serde_json::json;
use std::fs;
use std::path::Path;
use tracing::info;

fn dockerfile_content() -> String {
    format!(
        r#"FROM tiangolo/uvicorn-gunicorn-fastapi:python3.8

WORKDIR /app

COPY ./app /app/app
COPY ./requirements.txt /app/requirements.txt

RUN pip install --no-cache-dir --upgrade -r /app/requirements.txt

EXPOSE {port}

CMD ["uvicorn", "app.main:app", "--host", "0.0.0.0", "--port", "{port}"]
"#,
        port = ports::CONTAINER_PORT
    )
}

fn write_project_config(project_path: &Path, name: &str) -> Result<()> {
    let content = serde_json::to_string_pretty(&json!({ "name": name }))?;
    fs::write(project_path.join(layout::PROJECT_CONFIG_FILE), content)?;
    Ok(())
}

/// 在工作区根目录下创建项目
pub fn create_project(root: &Path, name: &str) -> Result<Project> {
    let normalized = naming::normalize_name(name);
    if normalized.is_empty() {
        return Err(MicrodockError::InvalidName(name.to_string()));
    }

    let project_path = root.join(&normalized);
    if project_path.exists() {
        return Err(MicrodockError::ProjectExists(normalized));
    }

    fs::create_dir_all(&project_path)?;
    write_project_config(&project_path, &normalized)?;

    info!("📁 已创建项目 {} ({})", normalized, project_path.display());
    Ok(Project::new(normalized, project_path))
}

/// 在项目下创建微服务目录并登记到 docker-compose.yml
///
/// 项目目录不存在时一并创建；微服务已存在时只确保 compose 条目存在。
pub fn create_microservice(
    root: &Path,
    project: &str,
    name: &str,
) -> Result<(Microservice, ComposeUpdate)> {
    let project_name = naming::normalize_name(project);
    let normalized = naming::normalize_name(name);
    if project_name.is_empty() {
        return Err(MicrodockError::InvalidName(project.to_string()));
    }
    if normalized.is_empty() {
        return Err(MicrodockError::InvalidName(name.to_string()));
    }

    let project = Project::new(project_name.clone(), root.join(&project_name));
    let microservice_path = project.microservices_dir().join(&normalized);

    fs::create_dir_all(&microservice_path)?;
    fs::create_dir_all(project.deployment_dir())?;

    let dockerfile = microservice_path.join("Dockerfile");
    if !dockerfile.exists() {
        fs::write(&dockerfile, dockerfile_content())?;
    }
    if !project.path.join(layout::PROJECT_CONFIG_FILE).exists() {
        write_project_config(&project.path, &project_name)?;
    }

    let update = compose::update_docker_compose(&project.path, &project_name, &normalized)?;
    info!("🧩 已创建微服务 {}/{}", project_name, normalized);

    Ok((
        Microservice::new(normalized, microservice_path, project),
        update,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace;
    use tempfile::tempdir;

    #[test]
    fn test_create_project() {
        let dir = tempdir().unwrap();
        let project = create_project(dir.path(), "My Shop").unwrap();
        assert_eq!(project.name, "myshop");

        let config = fs::read_to_string(project.path.join("project-config.json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&config).unwrap();
        assert_eq!(value["name"], "myshop");

        assert_eq!(workspace::list_projects(dir.path()), vec![project]);
    }

    #[test]
    fn test_create_project_refuses_existing() {
        let dir = tempdir().unwrap();
        create_project(dir.path(), "demo").unwrap();
        let result = create_project(dir.path(), "Demo");
        assert!(matches!(result, Err(MicrodockError::ProjectExists(name)) if name == "demo"));
    }

    #[test]
    fn test_create_microservice_registers_compose_service() {
        let dir = tempdir().unwrap();
        create_project(dir.path(), "demo").unwrap();

        let (auth, update) = create_microservice(dir.path(), "demo", "Auth").unwrap();
        assert_eq!(auth.name, "auth");
        assert!(auth.path.join("Dockerfile").is_file());
        match update {
            ComposeUpdate::Added(entry) => assert_eq!(entry.host_port, 8000),
            other => panic!("expected Added, got {other:?}"),
        }

        let (_, again) = create_microservice(dir.path(), "demo", "auth").unwrap();
        assert!(matches!(again, ComposeUpdate::AlreadyPresent { .. }));

        let project = workspace::find_project(dir.path(), "demo").unwrap();
        let names: Vec<_> = workspace::list_microservices(&project)
            .into_iter()
            .map(|ms| ms.name)
            .collect();
        assert_eq!(names, vec!["auth"]);
    }

    #[test]
    fn test_create_microservice_creates_missing_project() {
        let dir = tempdir().unwrap();
        create_microservice(dir.path(), "fresh", "users").unwrap();
        assert!(workspace::find_project(dir.path(), "fresh").is_some());
    }
}
