use super::types::{MicroserviceEntry, MicroserviceStatus, ProjectStatus, WorkspaceSnapshot};
use crate::container::{ContainerEngine, ContainerSummary};
use crate::naming;
use crate::workspace::{self, Microservice, Project};
use chrono::Local;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

/// 在容器列表中查找微服务对应的容器（按列表顺序取第一个名称匹配的）
pub fn find_container<'a>(
    containers: &'a [ContainerSummary],
    microservice_name: &str,
) -> Option<&'a ContainerSummary> {
    let keyword = naming::compose_service_name(microservice_name);
    containers.iter().find(|c| c.name_contains(&keyword))
}

/// 根据容器列表推导微服务状态（守护进程可用时）
pub fn resolve_status(
    containers: &[ContainerSummary],
    microservice_name: &str,
) -> MicroserviceStatus {
    match find_container(containers, microservice_name) {
        None => MicroserviceStatus::NotDeployed,
        Some(container) if container.is_running() => MicroserviceStatus::Running,
        Some(_) => MicroserviceStatus::Stopped,
    }
}

/// Docker 状态探测
#[derive(Clone)]
pub struct StatusInspector {
    engine: Arc<dyn ContainerEngine>,
}

impl StatusInspector {
    pub fn new(engine: Arc<dyn ContainerEngine>) -> Self {
        Self { engine }
    }

    /// docker 命令存在且守护进程可达
    pub async fn docker_available(&self) -> bool {
        if !self.engine.is_installed().await {
            warn!("Docker 未安装或不在 PATH 中");
            return false;
        }
        if !self.engine.is_daemon_running().await {
            warn!("Docker 守护进程未运行");
            return false;
        }
        true
    }

    /// 探测单个微服务的状态
    pub async fn inspect(&self, microservice: &Microservice) -> MicroserviceStatus {
        let mut statuses = self.inspect_all(std::slice::from_ref(microservice)).await;
        statuses
            .pop()
            .map(|entry| entry.status)
            .unwrap_or(MicroserviceStatus::NotDeployed)
    }

    /// 探测多个微服务的状态，容器列表只获取一次
    pub async fn inspect_all(&self, microservices: &[Microservice]) -> Vec<MicroserviceEntry> {
        if microservices.is_empty() {
            return Vec::new();
        }
        let docker_available = self.docker_available().await;
        self.entries_for(microservices, docker_available).await
    }

    async fn entries_for(
        &self,
        microservices: &[Microservice],
        docker_available: bool,
    ) -> Vec<MicroserviceEntry> {
        let statuses = if microservices.is_empty() {
            Vec::new()
        } else if !docker_available {
            vec![MicroserviceStatus::NeedsDocker; microservices.len()]
        } else {
            match self.engine.list_containers().await {
                Ok(containers) => {
                    debug!("获取到 {} 个容器", containers.len());
                    microservices
                        .iter()
                        .map(|ms| resolve_status(&containers, &ms.name))
                        .collect()
                }
                Err(e) => {
                    warn!("获取容器列表失败: {}", e);
                    vec![MicroserviceStatus::Error(e.to_string()); microservices.len()]
                }
            }
        };

        microservices
            .iter()
            .cloned()
            .zip(statuses)
            .map(|(microservice, status)| MicroserviceEntry {
                microservice,
                status,
            })
            .collect()
    }

    /// 扫描工作区并探测所有微服务的状态
    pub async fn snapshot(&self, root: &Path) -> WorkspaceSnapshot {
        let grouped: Vec<(Project, Vec<Microservice>)> = workspace::list_projects(root)
            .into_iter()
            .map(|project| {
                let microservices = workspace::list_microservices(&project);
                (project, microservices)
            })
            .collect();
        let all: Vec<Microservice> = grouped
            .iter()
            .flat_map(|(_, microservices)| microservices.iter().cloned())
            .collect();

        let docker_available = self.docker_available().await;
        let mut entries = self.entries_for(&all, docker_available).await.into_iter();

        let projects = grouped
            .into_iter()
            .map(|(project, microservices)| ProjectStatus {
                project,
                microservices: entries.by_ref().take(microservices.len()).collect(),
            })
            .collect();

        WorkspaceSnapshot {
            taken_at: Local::now(),
            docker_available,
            projects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::ContainerState;
    use crate::container::fake::FakeEngine;
    use std::fs;
    use tempfile::tempdir;

    fn setup_workspace(root: &Path) {
        for (project, services) in [("demo", vec!["auth", "billing"]), ("shop", vec!["cart"])] {
            let project_dir = root.join(project);
            fs::create_dir_all(&project_dir).unwrap();
            fs::write(project_dir.join("project-config.json"), "{}").unwrap();
            for service in services {
                fs::create_dir_all(project_dir.join("microservices").join(service)).unwrap();
            }
        }
    }

    fn summary(names: &str, state: ContainerState) -> ContainerSummary {
        ContainerSummary {
            id: names.to_string(),
            names: names.to_string(),
            image: String::new(),
            state,
            ports: String::new(),
        }
    }

    #[test]
    fn test_resolve_status() {
        let containers = vec![
            summary("demo-microservice-auth", ContainerState::Running),
            summary("demo-microservice-billing", ContainerState::Exited),
        ];
        assert_eq!(resolve_status(&containers, "auth"), MicroserviceStatus::Running);
        assert_eq!(resolve_status(&containers, "billing"), MicroserviceStatus::Stopped);
        assert_eq!(
            resolve_status(&containers, "cart"),
            MicroserviceStatus::NotDeployed
        );
        assert_eq!(resolve_status(&[], "auth"), MicroserviceStatus::NotDeployed);
    }

    #[test]
    fn test_first_matching_container_wins() {
        let containers = vec![
            summary("old-microservice-auth", ContainerState::Exited),
            summary("demo-microservice-auth", ContainerState::Running),
        ];
        assert_eq!(resolve_status(&containers, "Auth"), MicroserviceStatus::Stopped);
    }

    #[tokio::test]
    async fn test_daemon_down_means_needs_docker() {
        let dir = tempdir().unwrap();
        setup_workspace(dir.path());

        let engine = Arc::new(FakeEngine::new());
        engine.add_container("demo-microservice-auth", ContainerState::Running, Some(8000));
        engine.set_daemon_running(false);

        let inspector = StatusInspector::new(engine.clone());
        let snapshot = inspector.snapshot(dir.path()).await;

        assert!(!snapshot.docker_available);
        let statuses: Vec<_> = snapshot
            .projects
            .iter()
            .flat_map(|p| p.microservices.iter().map(|e| e.status.clone()))
            .collect();
        assert_eq!(statuses.len(), 3);
        assert!(statuses.iter().all(|s| *s == MicroserviceStatus::NeedsDocker));
        assert!(!engine.calls().contains(&"list".to_string()));
    }

    #[tokio::test]
    async fn test_missing_docker_cli_means_needs_docker() {
        let dir = tempdir().unwrap();
        setup_workspace(dir.path());
        let engine = Arc::new(FakeEngine::new());
        engine.set_installed(false);

        let inspector = StatusInspector::new(engine);
        let demo = workspace::find_project(dir.path(), "demo").unwrap();
        let auth = workspace::find_microservice(&demo, "auth").unwrap();
        assert_eq!(inspector.inspect(&auth).await, MicroserviceStatus::NeedsDocker);
    }

    #[tokio::test]
    async fn test_list_failure_means_error() {
        let dir = tempdir().unwrap();
        setup_workspace(dir.path());
        let engine = Arc::new(FakeEngine::new());
        engine.set_list_error(Some("boom"));

        let inspector = StatusInspector::new(engine);
        let demo = workspace::find_project(dir.path(), "demo").unwrap();
        let auth = workspace::find_microservice(&demo, "auth").unwrap();
        assert!(matches!(
            inspector.inspect(&auth).await,
            MicroserviceStatus::Error(_)
        ));
    }

    #[tokio::test]
    async fn test_snapshot_groups_by_project() {
        let dir = tempdir().unwrap();
        setup_workspace(dir.path());

        let engine = Arc::new(FakeEngine::new());
        engine.add_container("demo-microservice-auth", ContainerState::Running, Some(8000));
        engine.add_container("demo-microservice-billing", ContainerState::Exited, Some(8001));

        let inspector = StatusInspector::new(engine.clone());
        let snapshot = inspector.snapshot(dir.path()).await;

        let demo = snapshot.project("demo").unwrap();
        assert_eq!((demo.running_count(), demo.total()), (1, 2));
        assert_eq!(demo.microservices[0].microservice.name, "auth");
        assert_eq!(demo.microservices[0].status, MicroserviceStatus::Running);
        assert_eq!(demo.microservices[1].status, MicroserviceStatus::Stopped);

        let shop = snapshot.project("shop").unwrap();
        assert_eq!(shop.microservices[0].status, MicroserviceStatus::NotDeployed);

        // 容器列表只获取一次
        let lists = engine.calls().iter().filter(|c| *c == "list").count();
        assert_eq!(lists, 1);
    }
}
