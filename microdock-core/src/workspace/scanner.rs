use super::types::{Microservice, Project};
use crate::constants::layout;
use std::fs;
use std::path::Path;
use tracing::debug;

/// 列出目录下的直接子目录名（跳过隐藏目录和符号链接），按名称排序
fn child_directories(dir: &Path) -> Vec<String> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!("无法读取目录 {}: {}", dir.display(), e);
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| !name.starts_with('.'))
        .collect();

    names.sort();
    names
}

/// 列出工作区根目录下的所有项目
///
/// 根目录不存在时返回空列表。
pub fn list_projects(root: &Path) -> Vec<Project> {
    child_directories(root)
        .into_iter()
        .map(|name| {
            let path = root.join(&name);
            (name, path)
        })
        .filter(|(_, path)| path.join(layout::PROJECT_CONFIG_FILE).is_file())
        .map(|(name, path)| Project::new(name, path))
        .collect()
}

/// 列出项目下的所有微服务
pub fn list_microservices(project: &Project) -> Vec<Microservice> {
    let microservices_dir = project.microservices_dir();

    child_directories(&microservices_dir)
        .into_iter()
        .map(|name| {
            let path = microservices_dir.join(&name);
            Microservice::new(name, path, project.clone())
        })
        .collect()
}

/// 按名称查找项目
pub fn find_project(root: &Path, name: &str) -> Option<Project> {
    list_projects(root)
        .into_iter()
        .find(|project| project.name == name)
}

/// 按名称查找微服务
pub fn find_microservice(project: &Project, name: &str) -> Option<Microservice> {
    list_microservices(project)
        .into_iter()
        .find(|microservice| microservice.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn make_project(root: &Path, name: &str, services: &[&str]) {
        let project = root.join(name);
        fs::create_dir_all(&project).unwrap();
        fs::write(project.join("project-config.json"), "{}").unwrap();
        for service in services {
            fs::create_dir_all(project.join("microservices").join(service)).unwrap();
        }
    }

    #[test]
    fn test_list_projects_requires_marker_file() {
        let dir = tempdir().unwrap();
        make_project(dir.path(), "demo", &[]);
        make_project(dir.path(), "another", &[]);
        fs::create_dir_all(dir.path().join("not-a-project")).unwrap();
        fs::write(dir.path().join("loose-file.txt"), "x").unwrap();

        let projects = list_projects(dir.path());
        let names: Vec<_> = projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["another", "demo"]);
        assert_eq!(projects[1].path, dir.path().join("demo"));
    }

    #[test]
    fn test_list_projects_missing_root() {
        let projects = list_projects(Path::new("/nonexistent/microdock/root"));
        assert!(projects.is_empty());
    }

    #[test]
    fn test_list_microservices_only_directories() {
        let dir = tempdir().unwrap();
        make_project(dir.path(), "demo", &["billing", "auth"]);
        let microservices_dir = dir.path().join("demo").join("microservices");
        fs::write(microservices_dir.join("README.md"), "docs").unwrap();
        fs::create_dir_all(microservices_dir.join(".cache")).unwrap();

        let project = find_project(dir.path(), "demo").unwrap();
        let services = list_microservices(&project);
        let names: Vec<_> = services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["auth", "billing"]);
        assert_eq!(services[0].project, project);
        assert_eq!(services[0].service_name(), "microservice-auth");
    }

    #[test]
    fn test_list_microservices_without_directory() {
        let dir = tempdir().unwrap();
        make_project(dir.path(), "empty", &[]);

        let project = find_project(dir.path(), "empty").unwrap();
        assert!(list_microservices(&project).is_empty());
        assert!(find_microservice(&project, "auth").is_none());
    }
}
